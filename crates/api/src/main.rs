mod config;
mod error;
mod metrics;
mod routes;

use analysis::{Analyzer, Collaborators};
use anyhow::{Context, Result};
use models::{OllamaClient, OllamaSentiment, OllamaSummarizer, OllamaTagger};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LogFormat};
use crate::metrics::Metrics;
use crate::routes::{AppState, router};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(config.server.log_format);

    let llm_client = OllamaClient::new(
        config.models.ollama_url.clone(),
        config.models.generation_model.clone(),
    )
    .with_policy(config.retry_policy());

    // Collaborators are built once and shared by every request
    let collaborators = Collaborators {
        tagger: Arc::new(OllamaTagger::new(llm_client.clone())),
        sentiment: Arc::new(OllamaSentiment::new(llm_client.clone())),
        summarizer: Arc::new(OllamaSummarizer::new(llm_client.clone())),
    };
    let analyzer = Analyzer::new(collaborators, &config.analysis())?;

    let state = AppState {
        analyzer: Arc::new(analyzer),
        backend: llm_client,
        metrics: Metrics::new(),
    };

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    tracing::info!(
        bind = %config.server.bind,
        model = %config.models.generation_model,
        "Server listening"
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
