//! Runtime configuration: defaults layered under `ADDRESSBOOK_*` environment
//! variables.
use crate::error::SettingsError;
use figment::Figment;
use figment::providers::{Env, Serialized};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ENV_PREFIX: &str = "ADDRESSBOOK_";

/// Prefix-stripped, lower-cased keys that map onto `Settings` fields.
const KNOWN_KEYS: &[&str] = &[
    "debug",
    "host",
    "port",
    "database_url",
    "seed_url",
    "template_dir",
    "template_debug",
];

pub const DEFAULT_SEED_URL: &str = "https://dummyjson.com/users";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateSettings {
    pub dir: String,
    pub debug: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Turns on template debug logging as well.
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Endpoint queried once when the contact store is empty.
    pub seed_url: String,
    pub template: TemplateSettings,
    #[serde(default)]
    pub other: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            debug: false,
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: "sqlite://addressbook.db".to_string(),
            seed_url: DEFAULT_SEED_URL.to_string(),
            template: TemplateSettings {
                dir: "templates".to_string(),
                debug: false,
            },
            other: HashMap::new(),
        }
    }
}

/// `ADDRESSBOOK_TEMPLATE_DIR` lands on `template.dir`, the rest on top-level
/// fields.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| key.as_str().replacen("template_", "template.", 1).into())
}

impl Settings {
    /// Defaults merged with the environment.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Settings::default())).merge(env_provider())
    }

    /// Build settings from the process environment. Unrecognised
    /// `ADDRESSBOOK_*` variables are kept in `other`, keyed without the prefix.
    pub fn from_env() -> Result<Self, SettingsError> {
        let mut settings = Self::from_figment(&Self::figment())?;
        settings.other.extend(
            Env::prefixed(ENV_PREFIX)
                .iter()
                .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.to_string(), value)),
        );
        Ok(settings)
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, SettingsError> {
        let mut settings: Settings = figment.extract()?;
        settings.template.debug |= settings.debug;
        Ok(settings)
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
