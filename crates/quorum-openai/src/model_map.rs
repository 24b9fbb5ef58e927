use quorum_core::{
    error::{QuorumError, Result},
    model::{ModelId, Provider},
};

/// Resolve the wire model name for `model`, provided it belongs to the API
/// family this adapter talks to.
pub(crate) fn map_model(family: Provider, model: ModelId) -> Result<&'static str> {
    if model.provider() == family {
        Ok(model.as_str())
    } else {
        Err(QuorumError::ModelNotSupported {
            provider: family.name(),
            model,
        })
    }
}
