//! Invocable tools offered to a model during a tool-calling task.
//!
//! Implement [`Tool`] for anything asynchronous; wrap a plain closure in a
//! [`FunctionTool`] when a synchronous function is enough.  The closure runs
//! on tokio's blocking pool, so it may block without stalling other models:
//!
//! ```rust
//! use quorum_core::tool::{FunctionTool, Tool};
//! use serde_json::json;
//!
//! let tool = FunctionTool::new(
//!     "agenda_item",
//!     "Look up the title of an agenda item by file number.",
//!     json!({
//!         "type": "object",
//!         "properties": { "file_number": { "type": "string" } },
//!         "required": ["file_number"]
//!     }),
//!     |args| Ok(format!("title of {}", args["file_number"])),
//! );
//! assert_eq!(tool.spec().name, "agenda_item");
//! ```
use std::{fmt, sync::Arc};

use futures_core::future::BoxFuture;
use serde_json::Value;

use crate::{
    error::{QuorumError, Result},
    generic::GenericFunctionSpec,
};

pub trait Tool: Send + Sync {
    /// Name, description and argument schema announced to the model.
    fn spec(&self) -> GenericFunctionSpec;

    /// Run the tool. The returned text is fed back to the model verbatim.
    fn call<'a>(&'a self, arguments: Value) -> BoxFuture<'a, Result<String>>;
}

type ToolFn = Arc<dyn Fn(Value) -> Result<String> + Send + Sync>;

/// [`Tool`] backed by a synchronous closure.
///
/// Calling it requires a tokio runtime.
pub struct FunctionTool {
    spec: GenericFunctionSpec,
    function: ToolFn,
}

impl FunctionTool {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        function: F,
    ) -> Self
    where
        F: Fn(Value) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            spec: GenericFunctionSpec {
                name: name.into(),
                description: description.into(),
                parameters,
            },
            function: Arc::new(function),
        }
    }
}

impl Tool for FunctionTool {
    fn spec(&self) -> GenericFunctionSpec {
        self.spec.clone()
    }

    fn call<'a>(&'a self, arguments: Value) -> BoxFuture<'a, Result<String>> {
        let function = Arc::clone(&self.function);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || function(arguments))
                .await
                .map_err(|err| QuorumError::Tool {
                    name: self.spec.name.clone(),
                    message: if err.is_panic() {
                        "tool panicked".to_string()
                    } else {
                        err.to_string()
                    },
                })?
        })
    }
}

impl fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTool").field("spec", &self.spec).finish()
    }
}
