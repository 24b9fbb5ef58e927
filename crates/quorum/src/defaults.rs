use quorum_core::ModelRegistry;
#[cfg(any(feature = "openai", feature = "gemini"))]
use quorum_core::{ChatClient, ModelId, model::Provider};

/// Registry with a constructor for every model the enabled backends serve.
///
/// | Models                                   | Backend          | Credential           |
/// |------------------------------------------|------------------|----------------------|
/// | `GPT4O`                                  | `quorum-openai`  | `OPENAI_API_KEY`     |
/// | `SONAR`, `SONAR_PRO`, `SONAR_REASONING`  | `quorum-openai`  | `PERPLEXITY_API_KEY` |
/// | `QWEN_3`                                 | `quorum-openai`  | `DASHSCOPE_API_KEY`  |
/// | `GEMINI_2`                               | `quorum-gemini`  | `GOOGLE_API_KEY`     |
///
/// Keys are read when a client is constructed, so a missing key only fails
/// the models that need it.
pub fn default_registry() -> ModelRegistry {
    #[allow(unused_mut)]
    let mut registry = ModelRegistry::new();

    #[cfg(feature = "openai")]
    {
        let openai_compatible = ModelId::ALL
            .into_iter()
            .filter(|model| model.provider() != Provider::Google);
        registry = registry.register_all(openai_compatible, |model, params| {
            let adapter = quorum_openai::OpenAiAdapterBuilder::for_model_from_env(model)?
                .with_params(params)
                .build(model)?;
            Ok(Box::new(adapter) as Box<dyn ChatClient>)
        });
    }

    #[cfg(feature = "gemini")]
    {
        let google = ModelId::ALL
            .into_iter()
            .filter(|model| model.provider() == Provider::Google);
        registry = registry.register_all(google, |model, params| {
            let adapter = quorum_gemini::GeminiAdapterBuilder::new_from_env()
                .with_params(params)
                .build(model)?;
            Ok(Box::new(adapter) as Box<dyn ChatClient>)
        });
    }

    registry
}
