use anyhow::{Context, Result};
use clap::Parser;
use eval::{ConsistencyConfig, ConsistencyEvaluator, ConsistencyReport, HttpPromptTarget};
use models::{EmbeddingClient, RetryPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "run_consistency")]
#[command(about = "Send one prompt repeatedly and score how similar the responses are", long_about = None)]
struct Args {
    /// Endpoint receiving `{"prompt": ...}` POSTs
    #[arg(long, default_value = "http://localhost:8000/generate")]
    endpoint: String,

    /// Prompt text
    #[arg(short, long, conflicts_with = "prompt_file")]
    prompt: Option<String>,

    /// Read the prompt from a file
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    #[arg(short, long, default_value = "5")]
    retries: usize,

    #[arg(short, long, default_value = "0.95")]
    threshold: f64,

    /// Request field carrying the prompt
    #[arg(long, default_value = "prompt")]
    prompt_field: String,

    /// Response field carrying the text to compare
    #[arg(long, default_value = "response")]
    response_field: String,

    #[arg(long, default_value = "http://localhost:11434")]
    embedding_url: String,

    #[arg(long, default_value = "all-minilm")]
    embedding_model: String,

    /// Per-call timeout in seconds
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Write the full report as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let prompt = match (&args.prompt, &args.prompt_file) {
        (Some(prompt), _) => prompt.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file {}", path.display()))?,
        (None, None) => anyhow::bail!("Provide --prompt or --prompt-file"),
    };

    let timeout = Duration::from_secs(args.timeout_secs);
    let target = HttpPromptTarget::new(args.endpoint.clone(), timeout)
        .with_fields(args.prompt_field.clone(), args.response_field.clone());
    // Failures abort the run, so embeddings are not retried either
    let embedder = EmbeddingClient::new(args.embedding_url.clone(), args.embedding_model.clone())
        .with_policy(RetryPolicy::no_retry().with_timeout(timeout));

    let evaluator = ConsistencyEvaluator::new(
        Arc::new(target),
        Arc::new(embedder),
        ConsistencyConfig {
            retries: args.retries,
            similarity_threshold: args.threshold,
            request_timeout: timeout,
        },
    );

    println!("=== Consistency run: {} x {} ===\n", args.retries, args.endpoint);
    let report = evaluator.evaluate(&prompt).await?;
    print_report(&report);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\nReport saved to {}", path.display());
    }

    Ok(())
}

fn print_report(report: &ConsistencyReport) {
    let score = &report.score;
    println!("  Responses: {}  Pairs: {}", report.num_responses, report.num_pairs);
    println!("  Avg Similarity: {:.4}", score.average_similarity);
    println!("  Min / Median / Max: {:.4} / {:.4} / {:.4}", score.min, score.median, score.max);
    if let Some(std_dev) = score.std_dev {
        println!("  Std Dev: {:.4}", std_dev);
    }
    println!(
        "  Consistent: {} (threshold {:.2})",
        score.consistent, report.threshold
    );
}
