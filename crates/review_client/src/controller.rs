//! Generate / Undo / Extract pros-cons flow of one review form.

use std::sync::Arc;

use review_shared::{
    domain::AssistMode,
    error::{AssistFailure, FailureKind},
    protocol::{Envelope, ExtractForm, GenerateForm},
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::ModeSelectionError,
    form::ReviewForm,
    session::{AssistSession, Modal, ModalBody, Status},
    AssistBackend,
};

pub const GENERATING: &str = "Generating...";
pub const DONE: &str = "Done";
pub const EXTRACTING: &str = "Extracting...";
pub const WRITE_REVIEW_FIRST: &str = "Write a review first";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";
pub const GENERATE_FALLBACK: &str = "AI failed";
pub const PROS_CONS_FALLBACK: &str = "Pros/Cons failed";
pub const CARD_PROS_CONS_FALLBACK: &str = "Failed";
pub const PROS_CONS_TITLE: &str = "Pros & Cons";
pub const OWN_PROS_CONS_TITLE: &str = "Pros & Cons (Your Review)";

/// What to do with a Generate response that completes after a newer
/// Generate was issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Whichever response completes last overwrites the text.
    #[default]
    LastWriterWins,
    /// Only the most recently issued request may touch the session.
    DiscardStale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Failed(AssistFailure),
    /// The control is missing from the form, or Undo has nothing to restore.
    Unavailable,
    /// Dropped under [`StalePolicy::DiscardStale`].
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    CloseButton,
    Backdrop,
    Escape,
}

pub struct ReviewAssistController {
    form: ReviewForm,
    backend: Arc<dyn AssistBackend>,
    session: Mutex<AssistSession>,
    stale_policy: StalePolicy,
}

impl ReviewAssistController {
    pub fn new(form: ReviewForm, backend: Arc<dyn AssistBackend>) -> Self {
        let session = AssistSession::new(form.initial_text.clone(), form.initial_mode());
        Self {
            form,
            backend,
            session: Mutex::new(session),
            stale_policy: StalePolicy::default(),
        }
    }

    pub fn with_stale_policy(mut self, stale_policy: StalePolicy) -> Self {
        self.stale_policy = stale_policy;
        self
    }

    pub fn form(&self) -> &ReviewForm {
        &self.form
    }

    pub async fn session(&self) -> AssistSession {
        self.session.lock().await.clone()
    }

    pub async fn undo_available(&self) -> bool {
        self.session.lock().await.undo_available()
    }

    /// User edit of the review text field.
    pub async fn set_text(&self, text: impl Into<String>) {
        self.session.lock().await.current_text = text.into();
    }

    pub async fn select_mode(&self, mode: &AssistMode) -> Result<(), ModeSelectionError> {
        let selector = self
            .form
            .mode_selector
            .as_ref()
            .ok_or(ModeSelectionError::NoSelector)?;
        if !selector.offers(mode) {
            return Err(ModeSelectionError::UnknownMode(mode.to_string()));
        }
        self.session.lock().await.mode = mode.clone();
        Ok(())
    }

    pub async fn generate(&self) -> Outcome {
        let Some(url) = self.form.generate_url.clone() else {
            return Outcome::Unavailable;
        };

        let (form, generation) = {
            let mut session = self.session.lock().await;
            if self.form.undo_control {
                session.previous_text = Some(session.current_text.clone());
            }
            session.generation += 1;
            self.show_status(&mut session, GENERATING, false);
            let form = GenerateForm {
                text: session.current_text.trim().to_string(),
                mode: session.mode.clone(),
            };
            (form, session.generation)
        };

        info!(
            generation,
            mode = %form.mode,
            chars = form.text.chars().count(),
            "assist: generate requested"
        );
        let reply = self
            .backend
            .generate(&url, &self.form.csrf_token, &form)
            .await;

        let mut session = self.session.lock().await;
        if self.stale_policy == StalePolicy::DiscardStale && generation != session.generation {
            debug!(
                generation,
                latest = session.generation,
                "assist: dropping stale generate response"
            );
            return Outcome::Superseded;
        }

        match reply {
            Ok(Envelope::Success(generated)) => {
                session.current_text = generated.result;
                self.show_status(&mut session, DONE, false);
                Outcome::Applied
            }
            Ok(Envelope::Rejected { error }) => {
                let message = error.unwrap_or_else(|| GENERATE_FALLBACK.to_string());
                info!(generation, reason = %message, "assist: generate rejected");
                self.show_status(&mut session, &message, true);
                Outcome::Failed(AssistFailure::new(FailureKind::Application, message))
            }
            Err(err) => {
                warn!(generation, error = %err, "assist: generate request failed");
                self.show_status(&mut session, SOMETHING_WENT_WRONG, true);
                Outcome::Failed(AssistFailure::new(err.kind(), SOMETHING_WENT_WRONG))
            }
        }
    }

    pub async fn undo(&self) -> Outcome {
        if !self.form.undo_control {
            return Outcome::Unavailable;
        }
        let mut session = self.session.lock().await;
        let Some(previous) = session.previous_text.take() else {
            return Outcome::Unavailable;
        };
        session.current_text = previous;
        self.hide_status(&mut session);
        Outcome::Applied
    }

    /// Pros/cons of the review being written.
    pub async fn extract_pros_cons(&self) -> Outcome {
        let Some(url) = self.form.pros_cons_url.clone() else {
            return Outcome::Unavailable;
        };

        let text = {
            let mut session = self.session.lock().await;
            let text = session.current_text.trim().to_string();
            if text.is_empty() {
                self.open_modal(
                    &mut session,
                    PROS_CONS_TITLE,
                    ModalBody::Message(WRITE_REVIEW_FIRST.into()),
                    true,
                );
                return Outcome::Failed(AssistFailure::new(
                    FailureKind::ClientValidation,
                    WRITE_REVIEW_FIRST,
                ));
            }
            text
        };

        self.run_extract(
            url,
            OWN_PROS_CONS_TITLE,
            Some(ExtractForm { text }),
            PROS_CONS_FALLBACK,
        )
        .await
    }

    /// Pros/cons of a published review; the review is identified by the
    /// card's endpoint URL.
    pub async fn extract_card_pros_cons(&self, card_index: usize) -> Outcome {
        let Some((review_id, url)) = self.form.review_cards.get(card_index).and_then(|card| {
            card.pros_cons_url
                .clone()
                .map(|url| (card.review_id, url))
        }) else {
            return Outcome::Unavailable;
        };

        match review_id {
            Some(review_id) => info!(card_index, %review_id, "assist: review card extract"),
            None => info!(card_index, "assist: review card extract"),
        }
        self.run_extract(url, PROS_CONS_TITLE, None, CARD_PROS_CONS_FALLBACK)
            .await
    }

    pub async fn close_modal(&self, trigger: CloseTrigger) {
        if !self.form.modal {
            return;
        }
        let mut session = self.session.lock().await;
        if session.modal.take().is_some() {
            debug!(?trigger, "assist: modal closed");
        }
    }

    /// Keyboard hook of the page; only Escape is handled.
    pub async fn handle_key(&self, key: &str) {
        if key == "Escape" {
            self.close_modal(CloseTrigger::Escape).await;
        }
    }

    async fn run_extract(
        &self,
        url: Url,
        title: &str,
        form: Option<ExtractForm>,
        fallback: &str,
    ) -> Outcome {
        {
            let mut session = self.session.lock().await;
            self.open_modal(
                &mut session,
                title,
                ModalBody::Message(EXTRACTING.into()),
                false,
            );
        }

        info!(url = %url, own_review = form.is_some(), "assist: pros/cons requested");
        let reply = self
            .backend
            .extract_pros_cons(&url, &self.form.csrf_token, form.as_ref())
            .await;

        let mut session = self.session.lock().await;
        match reply {
            Ok(Envelope::Success(report)) => {
                debug!(
                    pros = report.pros.len(),
                    cons = report.cons.len(),
                    "assist: pros/cons extracted"
                );
                self.open_modal(&mut session, title, ModalBody::ProsCons(report), false);
                Outcome::Applied
            }
            Ok(Envelope::Rejected { error }) => {
                let message = error.unwrap_or_else(|| fallback.to_string());
                info!(reason = %message, "assist: pros/cons rejected");
                self.open_modal(
                    &mut session,
                    PROS_CONS_TITLE,
                    ModalBody::Message(message.clone()),
                    true,
                );
                Outcome::Failed(AssistFailure::new(FailureKind::Application, message))
            }
            Err(err) => {
                warn!(error = %err, "assist: pros/cons request failed");
                self.open_modal(
                    &mut session,
                    PROS_CONS_TITLE,
                    ModalBody::Message(SOMETHING_WENT_WRONG.into()),
                    true,
                );
                Outcome::Failed(AssistFailure::new(err.kind(), SOMETHING_WENT_WRONG))
            }
        }
    }

    fn show_status(&self, session: &mut AssistSession, message: &str, is_error: bool) {
        if !self.form.status_element {
            return;
        }
        session.status = Some(Status {
            message: message.to_string(),
            is_error,
        });
    }

    fn hide_status(&self, session: &mut AssistSession) {
        if self.form.status_element {
            session.status = None;
        }
    }

    fn open_modal(&self, session: &mut AssistSession, title: &str, body: ModalBody, is_error: bool) {
        if !self.form.modal {
            return;
        }
        session.modal = Some(Modal {
            title: title.to_string(),
            body,
            is_error,
        });
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
