mod common;

use std::{
    collections::HashSet,
    fs,
    sync::Arc,
    time::{Duration, Instant},
};

use common::{Behaviour, stub_registry};
use quorum_core::{
    ModelId, QuorumError,
    generic::GenericRole,
    normalize::{FenceExtraction, NormalizePolicy},
    template::Metadata,
    tool::{FunctionTool, Tool},
};
use quorum_generator::{GenerationStage, GenerationTask, Generator, GeneratorConfig};
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, PartialEq, Deserialize, JsonSchema)]
struct Tally {
    name: String,
    count: i64,
}

fn echo_task(models: &[ModelId]) -> GenerationTask {
    GenerationTask::builder("Echo")
        .models(models.iter().copied())
        .prompt_text("You repeat what you are told.", "Echo: {input}")
        .metadata(Metadata::new().with("input", "hi"))
        .build()
        .unwrap()
}

// ─── Happy path ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn echo_scenario_returns_one_trimmed_answer_per_model() {
    let stubs = stub_registry(
        &[(ModelId::Gpt4o, Behaviour::Echo), (ModelId::Gemini2, Behaviour::Echo)],
        &[],
    );
    let generator = Generator::new(stubs.registry);

    let answers = generator
        .generate_all(&echo_task(&[ModelId::Gpt4o, ModelId::Gemini2]))
        .await;

    let keys: HashSet<_> = answers.keys().copied().collect();
    assert_eq!(keys, HashSet::from([ModelId::Gpt4o, ModelId::Gemini2]));
    for (model, text) in &answers {
        assert_eq!(text, &format!("{model} says: Echo: hi"));
        assert!(!text.starts_with('"'), "quotes should be trimmed: {text}");
    }
}

#[tokio::test]
async fn every_model_sees_the_same_prompt() {
    let stubs = stub_registry(
        &[(ModelId::Sonar, Behaviour::Echo), (ModelId::SonarPro, Behaviour::Echo)],
        &[],
    );
    let calls = Arc::clone(&stubs.calls);
    let generator = Generator::new(stubs.registry);

    generator
        .generate_all(&echo_task(&[ModelId::Sonar, ModelId::SonarPro]))
        .await;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].messages, calls[1].messages);
    assert_eq!(calls[0].messages[0].role, GenericRole::System);
    assert_eq!(calls[0].messages[1].text(), "Echo: hi");
    assert!(calls[0].tools.is_none());
}

#[tokio::test]
async fn structured_scenario_unwraps_fenced_properties() {
    let raw = "```json\n{\"properties\": {\"name\": \"x\", \"count\": 3}}\n```";
    let stubs = stub_registry(&[(ModelId::Gemini2, Behaviour::Fixed(raw.into()))], &[]);
    let generator = Generator::new(stubs.registry);

    let task = GenerationTask::builder("Tally")
        .model(ModelId::Gemini2)
        .prompt_text("Reply with JSON matching {schema}", "Count {thing}")
        .metadata(Metadata::new().with("thing", "items"))
        .structured::<Tally>()
        .schema_variable("schema")
        .build()
        .unwrap();

    let tally = generator.generate_one(&task, ModelId::Gemini2).await.unwrap();
    assert_eq!(tally, Tally { name: "x".into(), count: 3 });
}

#[tokio::test]
async fn prompt_files_are_loaded_before_generation() {
    let dir = tempfile::tempdir().unwrap();
    let system = dir.path().join("echo_system_prompt.txt");
    let user = dir.path().join("echo_user_prompt.txt");
    fs::write(&system, "You repeat what you are told.").unwrap();
    fs::write(&user, "Echo: {input}").unwrap();

    let stubs = stub_registry(&[(ModelId::Qwen3, Behaviour::Echo)], &[]);
    let generator = Generator::new(stubs.registry);
    let task = GenerationTask::builder("Echo")
        .model(ModelId::Qwen3)
        .prompt_files(&system, &user)
        .metadata(Metadata::new().with("input", "hi"))
        .build()
        .unwrap();

    let answers = generator.generate_all(&task).await;
    assert_eq!(answers[&ModelId::Qwen3], "qwen3-235b-a22b says: Echo: hi");

    let missing = GenerationTask::builder("Echo")
        .model(ModelId::Qwen3)
        .prompt_files(dir.path().join("nope.txt"), &user)
        .build()
        .unwrap_err();
    assert!(matches!(missing, QuorumError::ResourceNotFound { .. }));
}

// ─── Isolation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_constructor_does_not_abort_the_batch() {
    let stubs = stub_registry(
        &[(ModelId::Gpt4o, Behaviour::Echo), (ModelId::Sonar, Behaviour::Echo)],
        &[ModelId::Gemini2],
    );
    let generator = Generator::new(stubs.registry);
    let task = echo_task(&[ModelId::Gpt4o, ModelId::Gemini2, ModelId::Sonar]);

    let report = generator.generate_report(&task).await;

    let keys: HashSet<_> = report.results.keys().copied().collect();
    assert_eq!(keys, HashSet::from([ModelId::Gpt4o, ModelId::Sonar]));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].model, ModelId::Gemini2);
    assert_eq!(report.failures[0].stage, GenerationStage::SelectingClient);
    assert!(matches!(report.failures[0].error, QuorumError::Configuration(_)));
    assert!(!report.is_complete());
}

#[tokio::test]
async fn provider_and_format_failures_are_isolated() {
    let stubs = stub_registry(
        &[
            (ModelId::Gpt4o, Behaviour::Fixed("{\"name\": \"ok\", \"count\": 1}".into())),
            (ModelId::Sonar, Behaviour::Fail("503 from upstream".into())),
            (ModelId::SonarPro, Behaviour::Fixed("I'd rather not answer in JSON".into())),
        ],
        &[],
    );
    let generator = Generator::new(stubs.registry);
    let task = GenerationTask::builder("Tally")
        .models([ModelId::Gpt4o, ModelId::Sonar, ModelId::SonarPro])
        .prompt_text("sys", "user")
        .structured::<Tally>()
        .build()
        .unwrap();

    let report = generator.generate_report(&task).await;

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[&ModelId::Gpt4o].name, "ok");

    let stage_of = |model| {
        report
            .failures
            .iter()
            .find(|f| f.model == model)
            .map(|f| f.stage)
    };
    assert_eq!(stage_of(ModelId::Sonar), Some(GenerationStage::Invoking));
    assert_eq!(stage_of(ModelId::SonarPro), Some(GenerationStage::Normalizing));
}

#[tokio::test]
async fn unregistered_model_is_reported_not_raised() {
    let stubs = stub_registry(&[(ModelId::Gpt4o, Behaviour::Echo)], &[]);
    let generator = Generator::new(stubs.registry);

    let report = generator
        .generate_report(&echo_task(&[ModelId::Gpt4o, ModelId::SonarReasoning]))
        .await;

    assert_eq!(report.results.len(), 1);
    assert!(matches!(
        report.failures[0].error,
        QuorumError::UnregisteredModel(ModelId::SonarReasoning)
    ));
}

#[tokio::test]
async fn generate_one_propagates_errors() {
    let stubs = stub_registry(&[(ModelId::Sonar, Behaviour::Fail("boom".into()))], &[]);
    let generator = Generator::new(stubs.registry);

    let err = generator
        .generate_one(&echo_task(&[ModelId::Sonar]), ModelId::Sonar)
        .await
        .unwrap_err();
    assert!(matches!(err, QuorumError::ProviderInvocation(_)));
}

#[tokio::test]
async fn panicking_unit_is_contained() {
    let stubs = stub_registry(
        &[(ModelId::Gpt4o, Behaviour::Panic), (ModelId::Gemini2, Behaviour::Echo)],
        &[],
    );
    let generator = Generator::new(stubs.registry);

    let report = generator
        .generate_report(&echo_task(&[ModelId::Gpt4o, ModelId::Gemini2]))
        .await;

    assert!(report.results.contains_key(&ModelId::Gemini2));
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(&report.failures[0].error, QuorumError::Internal(msg) if msg.contains("exploded")));
    assert_eq!(report.failures[0].stage, GenerationStage::Invoking);
}

#[tokio::test]
async fn empty_model_list_yields_empty_mapping() {
    let stubs = stub_registry(&[], &[]);
    let generator = Generator::new(stubs.registry);

    let report = generator.generate_report(&echo_task(&[])).await;
    assert!(report.results.is_empty());
    assert!(report.is_complete());
}

// ─── Timeouts and pool ──────────────────────────────────────────────────────

#[tokio::test]
async fn call_timeout_only_drops_the_slow_model() {
    let stubs = stub_registry(
        &[
            (ModelId::Gpt4o, Behaviour::Echo),
            (ModelId::Gemini2, Behaviour::Slow(Duration::from_secs(30))),
        ],
        &[],
    );
    let config = GeneratorConfig::default().with_call_timeout(Duration::from_millis(50));
    let generator = Generator::with_config(stubs.registry, config);

    let report = generator
        .generate_report(&echo_task(&[ModelId::Gpt4o, ModelId::Gemini2]))
        .await;

    assert!(report.results.contains_key(&ModelId::Gpt4o));
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].model, ModelId::Gemini2);
    assert!(matches!(report.failures[0].error, QuorumError::Timeout(_)));
}

#[tokio::test]
async fn batch_timeout_keeps_finished_results() {
    let stubs = stub_registry(
        &[
            (ModelId::Gpt4o, Behaviour::Echo),
            (ModelId::Sonar, Behaviour::Slow(Duration::from_secs(30))),
        ],
        &[],
    );
    let config = GeneratorConfig::default().with_batch_timeout(Duration::from_millis(100));
    let generator = Generator::with_config(stubs.registry, config);

    let report = generator
        .generate_report(&echo_task(&[ModelId::Gpt4o, ModelId::Sonar]))
        .await;

    assert!(report.results.contains_key(&ModelId::Gpt4o));
    assert_eq!(report.timed_out, vec![ModelId::Sonar]);
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn pool_of_one_still_completes_every_model() {
    let models = [ModelId::Gpt4o, ModelId::Gemini2, ModelId::Sonar, ModelId::Qwen3];
    let behaviours: Vec<_> = models.iter().map(|m| (*m, Behaviour::Echo)).collect();
    let stubs = stub_registry(&behaviours, &[]);
    let generator = Generator::with_config(stubs.registry, GeneratorConfig::default().with_pool_size(1));

    let answers = generator.generate_all(&echo_task(&models)).await;
    assert_eq!(answers.len(), models.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn blocking_clients_run_in_parallel() {
    let models = [ModelId::Gpt4o, ModelId::Gemini2, ModelId::Sonar, ModelId::Qwen3];
    let behaviours: Vec<_> = models
        .iter()
        .map(|m| (*m, Behaviour::Blocking(Duration::from_millis(300))))
        .collect();
    let stubs = stub_registry(&behaviours, &[]);
    let generator = Generator::with_config(stubs.registry, GeneratorConfig::default().with_pool_size(4));

    let started = Instant::now();
    let answers = generator.generate_all(&echo_task(&models)).await;
    let elapsed = started.elapsed();

    assert_eq!(answers.len(), models.len());
    assert!(elapsed < Duration::from_millis(900), "units ran serially: {elapsed:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn blocking_tools_run_in_parallel() {
    let models = [ModelId::Gpt4o, ModelId::Gemini2, ModelId::Sonar, ModelId::Qwen3];
    let behaviours: Vec<_> = models
        .iter()
        .map(|m| (*m, Behaviour::CallTool("agenda_item".into())))
        .collect();
    let stubs = stub_registry(&behaviours, &[]);
    let generator = Generator::with_config(stubs.registry, GeneratorConfig::default().with_pool_size(4));

    let tool: Arc<dyn Tool> = Arc::new(FunctionTool::new(
        "agenda_item",
        "Look up an agenda item by file number",
        serde_json::json!({"type": "object"}),
        |_| {
            std::thread::sleep(Duration::from_millis(300));
            Ok("a lease".to_string())
        },
    ));
    let task = GenerationTask::builder("Agenda QA")
        .models(models)
        .prompt_text("You answer questions about the agenda.", "{input}")
        .metadata(Metadata::new().with("input", "What is 250652?"))
        .tools([tool])
        .build()
        .unwrap();

    let started = Instant::now();
    let answers = generator.generate_all(&task).await;
    let elapsed = started.elapsed();

    assert_eq!(answers.len(), models.len());
    assert!(answers.values().all(|a| a == "tool said a lease"));
    assert!(elapsed < Duration::from_millis(900), "tools ran serially: {elapsed:?}");
}

// ─── Tools and policies ─────────────────────────────────────────────────────

#[tokio::test]
async fn tasks_with_tools_run_the_agent_loop() {
    let stubs = stub_registry(
        &[(ModelId::Gpt4o, Behaviour::CallTool("agenda_item".into()))],
        &[],
    );
    let calls = Arc::clone(&stubs.calls);
    let generator = Generator::new(stubs.registry);

    let tool: Arc<dyn Tool> = Arc::new(FunctionTool::new(
        "agenda_item",
        "Look up an agenda item by file number",
        serde_json::json!({"type": "object"}),
        |args| Ok(format!("{} is a Pier 80 lease", args["file_number"].as_str().unwrap_or("?"))),
    ));
    let task = GenerationTask::builder("Agenda QA")
        .model(ModelId::Gpt4o)
        .prompt_text("You answer questions about the agenda.", "{input}")
        .metadata(Metadata::new().with("input", "What is 250652?"))
        .tools([tool])
        .build()
        .unwrap();

    let answer = generator.generate_one(&task, ModelId::Gpt4o).await.unwrap();
    assert_eq!(answer, "tool said 250652 is a Pier 80 lease");

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.tools.as_ref().map(Vec::len) == Some(1)));
}

#[tokio::test]
async fn fence_policy_applies_to_text_answers() {
    let raw = "Here it is:\n```\nRoll call at 2pm\n```";
    let stubs = stub_registry(&[(ModelId::Gpt4o, Behaviour::Fixed(raw.into()))], &[]);
    let policy = NormalizePolicy::default().with_fence_extraction(FenceExtraction::Always);
    let generator = Generator::with_config(
        stubs.registry,
        GeneratorConfig::default().with_normalize_policy(policy),
    );

    let answer = generator
        .generate_one(&echo_task(&[ModelId::Gpt4o]), ModelId::Gpt4o)
        .await
        .unwrap();
    assert_eq!(answer, "Roll call at 2pm");
}
