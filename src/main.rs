use std::sync::Arc;

use anyhow::Result;
use entity_gateway::analysis::LanguageClient;
use entity_gateway::api::{api_loop, AppState};
use entity_gateway::{environment, logging};

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();

    let settings = environment::provider_settings();
    let provider = Arc::new(LanguageClient::new(settings.endpoint, settings.api_key));

    api_loop(AppState { provider }).await
}
