pub mod config_cmd;
pub mod grocery;
pub mod plan;
pub mod sync_cmd;

pub use config_cmd::ConfigCommand;
pub use grocery::GroceryCommand;
pub use plan::PlanCommand;
pub use sync_cmd::SyncCommand;

use clap::ValueEnum;
use std::sync::Arc;

use nutriplan_core::{HttpPlanClient, LocalPlanStorage, PlanSession};

use crate::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Opens a planning session on the local cache and, when a remote store
/// and user are configured, adopts the remote plan.
pub async fn open_session(config: &Config) -> Result<PlanSession, Box<dyn std::error::Error>> {
    let cache = LocalPlanStorage::new(config.data_dir.value.clone());
    let mut session = PlanSession::open(cache, config.debounce());

    if let Some(url) = &config.server_url.value {
        let client = HttpPlanClient::new(url.clone())?;
        session = session.with_remote(Arc::new(client), config.user_id.value.clone());
        session.init().await;
    }

    Ok(session)
}
