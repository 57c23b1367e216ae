use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected before any request was sent.
    ClientValidation,
    /// Well-formed response with `ok: false`.
    Application,
    /// Network failure, non-2xx without an envelope, or a malformed body.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind:?}: {message}")]
pub struct AssistFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl AssistFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
