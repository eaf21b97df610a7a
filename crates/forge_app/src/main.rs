use anyhow::Context;
use tracing::{info, warn};

use forge_app::{Pipeline, Session, discover_documents};
use forge_core::ForgeConfig;
use forge_docs::DocxExtractor;
use forge_qa::Normalizer;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = ForgeConfig::from_env().context("Invalid configuration")?;
    let Session {
        client,
        log_guard: _log_guard,
    } = forge_app::start(&config)?;
    let normalizer = Normalizer::new(config.diagnostics_dir.clone());

    let sources = discover_documents(&config.documents_dir)?;
    if sources.is_empty() {
        warn!(
            dir = %config.documents_dir.display(),
            "No .docx files found; add at least one requirement document"
        );
        return Ok(());
    }
    info!(count = sources.len(), "Documents found");

    let pipeline = Pipeline::new(&config, &client, &normalizer, DocxExtractor);
    let summary = pipeline.run(&sources).await?;
    summary.log();

    Ok(())
}
