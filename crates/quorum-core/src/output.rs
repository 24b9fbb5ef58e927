//! Output modes decide what a generation task hands back per model.
//!
//! * [`Text`] – the normalized answer as a `String`.
//! * [`Structured<T>`] – the answer decoded and validated into `T`.
//!
//! ```rust
//! use quorum_core::{normalize::NormalizePolicy, output::{OutputMode, Structured}};
//!
//! #[derive(serde::Deserialize, schemars::JsonSchema)]
//! struct Tally { name: String, count: i64 }
//!
//! let tally = Structured::<Tally>::normalize(
//!     r#"{"name": "x", "count": 3}"#,
//!     &NormalizePolicy::default(),
//! )
//! .unwrap();
//! assert_eq!(tally.count, 3);
//! ```
use std::marker::PhantomData;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::Result,
    normalize::{normalize_structured, normalize_text, NormalizePolicy},
    schema_util::derive_response_schema,
};

pub trait OutputMode: Send + Sync + 'static {
    type Output: Send + 'static;

    fn normalize(raw: &str, policy: &NormalizePolicy) -> Result<Self::Output>;

    /// JSON Schema of [`Self::Output`], if the mode has one.
    fn response_schema() -> Result<Option<Value>> {
        Ok(None)
    }
}

/// Plain text answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

impl OutputMode for Text {
    type Output = String;

    fn normalize(raw: &str, policy: &NormalizePolicy) -> Result<String> {
        Ok(normalize_text(raw, policy))
    }
}

/// Answers validated against the schema of `T`.
pub struct Structured<T>(PhantomData<fn() -> T>);

impl<T> OutputMode for Structured<T>
where
    T: JsonSchema + DeserializeOwned + Send + 'static,
{
    type Output = T;

    fn normalize(raw: &str, policy: &NormalizePolicy) -> Result<T> {
        normalize_structured(raw, policy)
    }

    fn response_schema() -> Result<Option<Value>> {
        derive_response_schema::<T>().map(Some)
    }
}
