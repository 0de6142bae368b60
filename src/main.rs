use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use log::info;

use classpulse::{
    api::{self, AppState},
    config::AppConfig,
    db::Database,
    reports::ReportStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("classpulse starting up...");

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("classpulse.json"));
    let config = AppConfig::load(&config_path)?;

    std::fs::create_dir_all(&config.report_root)?;

    let db = Database::new(config.db_path.clone())?;
    let reports = ReportStore::new(config.report_root.clone());

    let state = Arc::new(AppState {
        db,
        reports,
        config,
    });

    api::serve(state).await
}
