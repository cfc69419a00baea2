mod config;
mod terminal;

use std::sync::{Arc, Mutex};

use anyhow::Context;
use enricher_core::FormRecord;
use enricher_engine::{EnrichmentPipeline, ReqwestEnrichmentClient};
use enricher_logging::enrich_info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = config::config_path();
    let config = config::load(&path)?;
    enricher_logging::initialize(config.log_destination()?, config.log_level()?);
    enrich_info!("Using config {:?}", path);

    let client = ReqwestEnrichmentClient::new(config.client_settings())
        .context("building enrichment client")?;
    let form = Arc::new(Mutex::new(FormRecord::new()));
    let settings = config.pipeline_settings();
    let quiet_period = settings.debounce;

    let pipeline = EnrichmentPipeline::spawn(
        settings,
        Arc::new(client),
        form.clone(),
        Arc::new(terminal::TerminalSink),
    );
    terminal::run(pipeline, form, config.field_names(), quiet_period).await
}
