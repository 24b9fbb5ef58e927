//! Helpers for turning Rust type information into JSON Schema that can be
//! shipped alongside a prompt.
//!
//! Structured generation tasks expose the schema of their output type to
//! the prompt (usually as a `{schema}` template variable) so the model knows
//! which fields to produce.  The schema is produced with [`schemars`].

use schemars::{
    r#gen::{SchemaGenerator, SchemaSettings},
    JsonSchema,
};
use serde_json::Value;

use crate::error::Result;

/// Generate a JSON Schema for `T` **inline**, i.e. without `$ref` pointers
/// to external definitions, which most models follow far more reliably.
///
/// # Example
///
/// ```
/// use quorum_core::schema_util::derive_response_schema;
/// use schemars::JsonSchema;
///
/// #[derive(JsonSchema)]
/// struct Tally { name: String, count: i64 }
///
/// let schema = derive_response_schema::<Tally>().unwrap();
/// assert!(schema["properties"]["count"].is_object());
/// ```
pub fn derive_response_schema<T>() -> Result<Value>
where
    T: JsonSchema + 'static,
{
    let mut settings = SchemaSettings::draft07();
    settings.inline_subschemas = true;

    let generator = SchemaGenerator::new(settings);
    let root = generator.into_root_schema_for::<T>();

    Ok(serde_json::to_value(root)?)
}
