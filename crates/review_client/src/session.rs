use review_shared::{domain::AssistMode, protocol::ProsCons};
use serde::Serialize;

use crate::render::{pros_cons_markup, pros_cons_text};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum ModalBody {
    Message(String),
    ProsCons(ProsCons),
}

impl ModalBody {
    pub fn markup(&self) -> String {
        match self {
            Self::Message(message) => maud::html! { (message) }.into_string(),
            Self::ProsCons(report) => pros_cons_markup(report).into_string(),
        }
    }

    pub fn plain_text(&self) -> String {
        match self {
            Self::Message(message) => message.clone(),
            Self::ProsCons(report) => pros_cons_text(report),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Modal {
    pub title: String,
    pub body: ModalBody,
    pub is_error: bool,
}

/// Transient assist state of one bound review form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistSession {
    pub current_text: String,
    /// Pre-Generate snapshot; `Some` exactly while Undo is available.
    pub previous_text: Option<String>,
    pub mode: AssistMode,
    pub status: Option<Status>,
    /// `None` while the dialog is hidden.
    pub modal: Option<Modal>,
    /// Number of Generate requests issued so far.
    pub generation: u64,
}

impl AssistSession {
    pub fn new(current_text: impl Into<String>, mode: AssistMode) -> Self {
        Self {
            current_text: current_text.into(),
            previous_text: None,
            mode,
            status: None,
            modal: None,
            generation: 0,
        }
    }

    pub fn undo_available(&self) -> bool {
        self.previous_text.is_some()
    }
}
