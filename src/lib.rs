pub mod app;
pub mod client;
pub mod contacts;
pub mod error;
pub mod orm;
pub mod router;
pub mod seed;
pub mod settings;
pub mod template;
pub mod view;

inventory::collect!(crate::orm::Migration);
