pub mod app_config;
pub mod config;
pub mod display;
pub mod lead;
pub mod query;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use lead::{Lead, LeadPage, SavedList, SavedListSummary};
pub use query::{QueryError, SearchQuery};
