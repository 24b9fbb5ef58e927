use quorum::{GenerationTask, Generator, GeneratorConfig, ModelId, template::Metadata};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// ---------------------------------------------------------------------------
/// Example  –  Ask every configured model the same question
///
/// Models without credentials are reported as failures; the rest answer.
///
/// ```bash
/// export OPENAI_API_KEY=sk-…  GOOGLE_API_KEY=…  PERPLEXITY_API_KEY=pplx-…
/// cargo run -p quorum --example fan_out
/// ```
/// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
struct Headline {
    /// Headline of at most ten words.
    headline: String,
    /// Confidence rating from 0.0 to 1.0.
    confidence: f32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let generator = Generator::with_config(quorum::default_registry(), GeneratorConfig::from_env()?);

    let task = GenerationTask::builder("Headline")
        .models(ModelId::ALL)
        .prompt_text(
            "You write newspaper headlines. Reply with JSON matching {schema}",
            "Write a headline for: {story}",
        )
        .metadata(Metadata::new().with(
            "story",
            "The Board of Supervisors approved a lease for Pier 80 with TEC of California.",
        ))
        .structured::<Headline>()
        .schema_variable("schema")
        .build()?;

    let report = generator.generate_report(&task).await;

    for (model, answer) in &report.results {
        println!("{model:>18}: {} ({:.2})", answer.headline, answer.confidence);
    }
    for failure in &report.failures {
        println!("{:>18}: failed while {}: {}", failure.model, failure.stage, failure.error);
    }
    Ok(())
}
