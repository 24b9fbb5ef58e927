use std::path::PathBuf;

use clap::Parser;
use quorum::{Generator, GeneratorConfig, ModelId, types::TranscriptSummarizer};
use tracing_subscriber::EnvFilter;

/// ---------------------------------------------------------------------------
/// Example  –  Summarize a meeting transcript with one model
///
/// **Running the demo**
/// ```bash
/// export GOOGLE_API_KEY=…         # or the key of the model you pick
/// cargo run -p quorum --example summarize_meeting -- \
///     --transcript transcripts/10_50523.txt \
///     --agenda "1 ROLL CALL AND PLEDGE OF ALLEGIANCE" --agenda "14 ADJOURNMENT"
/// ```
/// ---------------------------------------------------------------------------
#[derive(Parser)]
#[command(name = "summarize_meeting", about = "Summarize a meeting transcript")]
struct Cli {
    /// Plain-text transcript file
    #[arg(long)]
    transcript: PathBuf,

    /// Agenda item title; repeat for every item
    #[arg(long = "agenda")]
    agenda: Vec<String>,

    /// Model symbol or model string, e.g. GEMINI_2 or sonar-pro
    #[arg(long, env = "QUORUM_SUMMARY_MODEL", default_value = "GEMINI_2")]
    model: String,

    /// Directory holding summarization_{system,user}_prompt.txt
    #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/examples/prompts"))]
    prompts: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let model: ModelId = cli.model.parse()?;

    let generator = Generator::with_config(quorum::default_registry(), GeneratorConfig::from_env()?);
    let summary = TranscriptSummarizer::new(model)
        .with_prompt_dir(&cli.prompts)
        .summarize_file(&generator, &cli.transcript, cli.agenda)
        .await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
