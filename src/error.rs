//! Error types for decoding collaborator payloads

use thiserror::Error;

/// A collaborator response that cannot be turned into layout data at all.
///
/// Missing or mistyped fields are not errors; they are defaulted during
/// decoding. Only a payload that is not a JSON object fails.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("response contains no JSON object")]
    NotAnObject,
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
