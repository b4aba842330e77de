//! Process-wide configuration: defaults, YAML persistence, change notification

pub mod models;
pub mod store;

pub use models::get_provider_from_model;
pub use store::{Config, ConfigStore};
