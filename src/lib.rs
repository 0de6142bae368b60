pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod reports;
pub mod summary;

pub use analytics::{format_duration, reconstruct, DurationStrategy};
pub use config::AppConfig;
pub use db::Database;
pub use reports::ReportStore;
