use review_shared::error::FailureKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("assist request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("assist endpoint answered {status} without a response envelope: {source}")]
    Status {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed assist response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl AssistError {
    pub fn kind(&self) -> FailureKind {
        FailureKind::Transport
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeSelectionError {
    #[error("review form has no mode selector")]
    NoSelector,
    #[error("mode selector has no option '{0}'")]
    UnknownMode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("star value {value} outside 1..={max}")]
    StarOutOfRange { value: u8, max: u8 },
}
