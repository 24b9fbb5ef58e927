use std::sync::Arc;

use quorum::{
    GenerationTask, Generator, ModelId,
    prompt::PromptFiles,
    template::Metadata,
    tool::{FunctionTool, Tool},
};
use serde_json::json;

/// ---------------------------------------------------------------------------
/// Example  –  Tool-using agent
///
/// The model looks agenda items up through a local tool before answering.
///
/// ```bash
/// export OPENAI_API_KEY=sk-…
/// cargo run -p quorum --example agenda_agent
/// ```
/// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let agenda_item: Arc<dyn Tool> = Arc::new(FunctionTool::new(
        "agenda_item",
        "Look up the title of an agenda item by its file number.",
        json!({
            "type": "object",
            "properties": {
                "file_number": {"type": "string", "description": "Six digit file number, e.g. 250652"}
            },
            "required": ["file_number"]
        }),
        |args| {
            let title = match args["file_number"].as_str() {
                Some("250652") => "Real Property Lease - TEC of California, Inc. - Pier 80 - Not to Exceed $2,735,362",
                Some("250760") => "Commemorative Plaques - San Francisco Little Italy Honor Walk Expansion",
                _ => "no such item",
            };
            Ok(title.to_string())
        },
    ));

    let prompts = PromptFiles::named(concat!(env!("CARGO_MANIFEST_DIR"), "/examples/prompts"), "agenda_qa");
    let task = GenerationTask::builder("Agenda QA")
        .models([ModelId::Gpt4o, ModelId::Qwen3])
        .prompts(prompts)
        .metadata(Metadata::new().with("question", "What is file 250652 about?"))
        .tools([agenda_item])
        .build()?;

    let generator = Generator::new(quorum::default_registry());
    for (model, answer) in generator.generate_all(&task).await {
        println!("{model}: {answer}");
    }
    Ok(())
}
