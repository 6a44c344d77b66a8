use addressbook::app::build_router;
use addressbook::contacts::ContactStore;
use addressbook::orm::{Db, auto_migrate};
use addressbook::router::AppState;
use addressbook::seed::{ContactService, HttpUserSource};
use addressbook::settings::Settings;
use addressbook::template::set_display_logs;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env()?;
    set_display_logs(settings.template.debug);

    let db = Arc::new(Db::connect(&settings.database_url).await?);
    auto_migrate(db.clone()).await?;

    let contacts = ContactService::new(
        ContactStore::new(db),
        Arc::new(HttpUserSource::new(settings.seed_url.clone())),
    );
    let state = AppState {
        contacts: Arc::new(contacts),
        settings: settings.clone(),
    };

    build_router(state).run(&settings).await
}
