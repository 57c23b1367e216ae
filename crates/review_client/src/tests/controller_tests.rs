use std::collections::VecDeque;

use super::*;
use async_trait::async_trait;
use review_shared::{
    domain::{ModeOption, ReviewId},
    protocol::{GenerateResult, ProsCons},
};
use tokio::sync::{mpsc, oneshot};

use crate::{
    error::AssistError,
    form::{ModeSelector, ReviewCardControl},
};

enum Scripted<T> {
    Reply(Envelope<T>),
    Transport,
}

impl<T> Scripted<T> {
    fn into_result(self) -> Result<Envelope<T>, AssistError> {
        match self {
            Scripted::Reply(envelope) => Ok(envelope),
            Scripted::Transport => Err(AssistError::Decode(
                serde_json::from_str::<serde_json::Value>("{\"ok\":").expect_err("truncated json"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Generate {
        url: String,
        csrf_token: String,
        form: GenerateForm,
    },
    Extract {
        url: String,
        form: Option<ExtractForm>,
    },
}

#[derive(Default)]
struct ScriptedBackend {
    generate: Mutex<VecDeque<Scripted<GenerateResult>>>,
    extract: Mutex<VecDeque<Scripted<ProsCons>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    async fn script_generate(&self, reply: Scripted<GenerateResult>) {
        self.generate.lock().await.push_back(reply);
    }

    async fn script_extract(&self, reply: Scripted<ProsCons>) {
        self.extract.lock().await.push_back(reply);
    }

    async fn calls(&self) -> Vec<Call> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl AssistBackend for ScriptedBackend {
    async fn generate(
        &self,
        url: &Url,
        csrf_token: &str,
        form: &GenerateForm,
    ) -> Result<Envelope<GenerateResult>, AssistError> {
        self.calls.lock().await.push(Call::Generate {
            url: url.to_string(),
            csrf_token: csrf_token.to_string(),
            form: form.clone(),
        });
        self.generate
            .lock()
            .await
            .pop_front()
            .expect("unexpected generate call")
            .into_result()
    }

    async fn extract_pros_cons(
        &self,
        url: &Url,
        _csrf_token: &str,
        form: Option<&ExtractForm>,
    ) -> Result<Envelope<ProsCons>, AssistError> {
        self.calls.lock().await.push(Call::Extract {
            url: url.to_string(),
            form: form.cloned(),
        });
        self.extract
            .lock()
            .await
            .pop_front()
            .expect("unexpected extract call")
            .into_result()
    }
}

fn url(path: &str) -> Url {
    Url::parse("https://reviews.example/")
        .expect("base url")
        .join(path)
        .expect("endpoint url")
}

fn full_form(text: &str) -> ReviewForm {
    ReviewForm::complete(
        text,
        "csrf-abc",
        url("movie/1/ai/assist/"),
        url("movie/1/ai/pros-cons/"),
    )
}

fn controller(form: ReviewForm, backend: &Arc<ScriptedBackend>) -> ReviewAssistController {
    ReviewAssistController::new(form, backend.clone())
}

fn generated(result: &str) -> Scripted<GenerateResult> {
    Scripted::Reply(Envelope::Success(GenerateResult {
        result: result.to_string(),
    }))
}

fn rejected<T>(error: Option<&str>) -> Scripted<T> {
    Scripted::Reply(Envelope::Rejected {
        error: error.map(str::to_string),
    })
}

fn status(message: &str, is_error: bool) -> Option<Status> {
    Some(Status {
        message: message.to_string(),
        is_error,
    })
}

#[tokio::test]
async fn generate_sends_trimmed_text_and_replaces_it_on_success() {
    let backend = ScriptedBackend::new();
    backend.script_generate(generated("A tight, funny thriller.")).await;
    let controller = controller(full_form("  tight funny thriller \n"), &backend);

    let outcome = controller.generate().await;

    assert_eq!(outcome, Outcome::Applied);
    let session = controller.session().await;
    assert_eq!(session.current_text, "A tight, funny thriller.");
    assert_eq!(session.status, status(DONE, false));
    assert_eq!(
        backend.calls().await,
        vec![Call::Generate {
            url: "https://reviews.example/movie/1/ai/assist/".into(),
            csrf_token: "csrf-abc".into(),
            form: GenerateForm {
                text: "tight funny thriller".into(),
                mode: AssistMode::rewrite(),
            },
        }]
    );
}

#[tokio::test]
async fn undo_restores_untrimmed_text_after_successful_generate() {
    let backend = ScriptedBackend::new();
    backend.script_generate(generated("Polished.")).await;
    let controller = controller(full_form("  rough draft  "), &backend);

    controller.generate().await;
    assert_eq!(controller.undo().await, Outcome::Applied);

    let session = controller.session().await;
    assert_eq!(session.current_text, "  rough draft  ");
    assert_eq!(session.status, None);
}

#[tokio::test]
async fn undo_restores_text_after_failed_generate() {
    let backend = ScriptedBackend::new();
    backend.script_generate(Scripted::Transport).await;
    let controller = controller(full_form("before"), &backend);

    controller.generate().await;
    controller.set_text("edited after the failure").await;
    assert_eq!(controller.undo().await, Outcome::Applied);

    assert_eq!(controller.session().await.current_text, "before");
}

#[tokio::test]
async fn undo_is_single_shot_and_needs_a_prior_generate() {
    let backend = ScriptedBackend::new();
    backend.script_generate(generated("new")).await;
    let controller = controller(full_form("old"), &backend);

    assert!(!controller.undo_available().await);
    assert_eq!(controller.undo().await, Outcome::Unavailable);

    controller.generate().await;
    assert!(controller.undo_available().await);

    assert_eq!(controller.undo().await, Outcome::Applied);
    assert!(!controller.undo_available().await);
    assert_eq!(controller.undo().await, Outcome::Unavailable);
    assert_eq!(controller.session().await.current_text, "old");
}

#[tokio::test]
async fn rejected_generate_keeps_text_and_shows_server_message() {
    let backend = ScriptedBackend::new();
    backend.script_generate(rejected(Some("rate limited"))).await;
    let controller = controller(full_form("my review"), &backend);

    let outcome = controller.generate().await;

    assert_eq!(
        outcome,
        Outcome::Failed(AssistFailure::new(FailureKind::Application, "rate limited"))
    );
    let session = controller.session().await;
    assert_eq!(session.current_text, "my review");
    assert_eq!(session.status, status("rate limited", true));
}

#[tokio::test]
async fn rejected_generate_without_message_uses_fallback() {
    let backend = ScriptedBackend::new();
    backend.script_generate(rejected(None)).await;
    let controller = controller(full_form("my review"), &backend);

    controller.generate().await;

    assert_eq!(
        controller.session().await.status,
        status(GENERATE_FALLBACK, true)
    );
}

#[tokio::test]
async fn transport_failure_during_generate_shows_generic_message() {
    let backend = ScriptedBackend::new();
    backend.script_generate(Scripted::Transport).await;
    let controller = controller(full_form("my review"), &backend);

    let outcome = controller.generate().await;

    assert_eq!(
        outcome,
        Outcome::Failed(AssistFailure::new(
            FailureKind::Transport,
            SOMETHING_WENT_WRONG
        ))
    );
    let session = controller.session().await;
    assert_eq!(session.current_text, "my review");
    assert_eq!(session.status, status(SOMETHING_WENT_WRONG, true));
}

#[tokio::test]
async fn empty_text_is_still_sent_to_generate() {
    let backend = ScriptedBackend::new();
    backend.script_generate(generated("A fresh review.")).await;
    let controller = controller(full_form("   "), &backend);

    assert_eq!(controller.generate().await, Outcome::Applied);
    match &backend.calls().await[..] {
        [Call::Generate { form, .. }] => assert_eq!(form.text, ""),
        other => panic!("unexpected calls: {other:?}"),
    }
}

#[tokio::test]
async fn selected_mode_is_sent_with_generate() {
    let backend = ScriptedBackend::new();
    backend.script_generate(generated("HYPE!")).await;
    let controller = controller(full_form("good"), &backend);

    controller
        .select_mode(&AssistMode::new("hype"))
        .await
        .expect("stock selector offers hype");
    controller.generate().await;

    match &backend.calls().await[..] {
        [Call::Generate { form, .. }] => assert_eq!(form.mode, AssistMode::new("hype")),
        other => panic!("unexpected calls: {other:?}"),
    }
}

#[tokio::test]
async fn mode_selection_is_checked_against_selector_options() {
    let backend = ScriptedBackend::new();
    let custom = full_form("x").with_mode_selector(ModeSelector::new(vec![
        ModeOption::new("rewrite", "Rewrite"),
        ModeOption::new("haiku", "Haiku"),
    ]));
    let controller = controller(custom, &backend);

    assert_eq!(
        controller.select_mode(&AssistMode::new("roast")).await,
        Err(ModeSelectionError::UnknownMode("roast".into()))
    );
    assert!(controller.select_mode(&AssistMode::new("haiku")).await.is_ok());
    assert_eq!(controller.session().await.mode, AssistMode::new("haiku"));

    let bare = ReviewAssistController::new(ReviewForm::new("x"), backend.clone());
    assert_eq!(
        bare.select_mode(&AssistMode::new("haiku")).await,
        Err(ModeSelectionError::NoSelector)
    );
    assert_eq!(bare.session().await.mode, AssistMode::rewrite());
}

#[tokio::test]
async fn blank_own_review_extract_never_contacts_backend() {
    let backend = ScriptedBackend::new();
    let controller = controller(full_form("  \n\t "), &backend);

    let outcome = controller.extract_pros_cons().await;

    assert_eq!(
        outcome,
        Outcome::Failed(AssistFailure::new(
            FailureKind::ClientValidation,
            WRITE_REVIEW_FIRST
        ))
    );
    assert!(backend.calls().await.is_empty());
    assert_eq!(
        controller.session().await.modal,
        Some(Modal {
            title: PROS_CONS_TITLE.into(),
            body: ModalBody::Message(WRITE_REVIEW_FIRST.into()),
            is_error: true,
        })
    );
}

#[tokio::test]
async fn extract_renders_placeholder_for_empty_pros() {
    let backend = ScriptedBackend::new();
    backend
        .script_extract(Scripted::Reply(Envelope::Success(ProsCons {
            pros: Vec::new(),
            cons: vec!["slow pacing".into()],
        })))
        .await;
    let controller = controller(full_form(" Great cast but slow pacing. "), &backend);

    assert_eq!(controller.extract_pros_cons().await, Outcome::Applied);

    let modal = controller.session().await.modal.expect("modal open");
    assert_eq!(modal.title, OWN_PROS_CONS_TITLE);
    assert!(!modal.is_error);
    let markup = modal.body.markup();
    assert!(markup.contains("No pros found"));
    assert!(markup.contains("<li>slow pacing</li>"));
    assert!(!markup.contains("No cons found"));
    assert_eq!(
        backend.calls().await,
        vec![Call::Extract {
            url: "https://reviews.example/movie/1/ai/pros-cons/".into(),
            form: Some(ExtractForm {
                text: "Great cast but slow pacing.".into()
            }),
        }]
    );
}

#[tokio::test]
async fn transport_failure_during_extract_is_closable_with_escape() {
    let backend = ScriptedBackend::new();
    backend.script_extract(Scripted::Transport).await;
    let controller = controller(full_form("Loved the soundtrack."), &backend);

    let outcome = controller.extract_pros_cons().await;

    assert_eq!(
        outcome,
        Outcome::Failed(AssistFailure::new(
            FailureKind::Transport,
            SOMETHING_WENT_WRONG
        ))
    );
    let modal = controller.session().await.modal.expect("modal open");
    assert_eq!(modal.body, ModalBody::Message(SOMETHING_WENT_WRONG.into()));
    assert!(modal.is_error);

    controller.handle_key("Escape").await;
    assert_eq!(controller.session().await.modal, None);
}

#[tokio::test]
async fn rejected_own_extract_uses_pros_cons_fallback() {
    let backend = ScriptedBackend::new();
    backend.script_extract(rejected(None)).await;
    let controller = controller(full_form("Loved it."), &backend);

    controller.extract_pros_cons().await;

    let modal = controller.session().await.modal.expect("modal open");
    assert_eq!(modal.title, PROS_CONS_TITLE);
    assert_eq!(modal.body, ModalBody::Message(PROS_CONS_FALLBACK.into()));
    assert!(modal.is_error);
}

#[tokio::test]
async fn card_extract_sends_no_fields_and_uses_card_fallback() {
    let backend = ScriptedBackend::new();
    backend.script_extract(rejected(None)).await;
    let form = ReviewForm::new("")
        .with_modal()
        .with_review_card(ReviewCardControl {
            review_id: Some(ReviewId(42)),
            pros_cons_url: Some(url("reviews/42/pros-cons/")),
        });
    let controller = controller(form, &backend);

    controller.extract_card_pros_cons(0).await;

    assert_eq!(
        backend.calls().await,
        vec![Call::Extract {
            url: "https://reviews.example/reviews/42/pros-cons/".into(),
            form: None,
        }]
    );
    let modal = controller.session().await.modal.expect("modal open");
    assert_eq!(modal.body, ModalBody::Message(CARD_PROS_CONS_FALLBACK.into()));
    assert!(modal.is_error);
}

#[tokio::test]
async fn card_without_url_is_inert() {
    let backend = ScriptedBackend::new();
    let form = ReviewForm::new("").with_modal().with_review_card(ReviewCardControl {
        review_id: Some(ReviewId(3)),
        pros_cons_url: None,
    });
    let controller = controller(form, &backend);

    assert_eq!(controller.extract_card_pros_cons(0).await, Outcome::Unavailable);
    assert_eq!(controller.extract_card_pros_cons(5).await, Outcome::Unavailable);
    assert!(backend.calls().await.is_empty());
    assert_eq!(controller.session().await.modal, None);
}

#[tokio::test]
async fn missing_controls_disable_their_operations() {
    let backend = ScriptedBackend::new();
    let controller = controller(ReviewForm::new("text only"), &backend);

    assert_eq!(controller.generate().await, Outcome::Unavailable);
    assert_eq!(controller.undo().await, Outcome::Unavailable);
    assert_eq!(controller.extract_pros_cons().await, Outcome::Unavailable);
    controller.close_modal(CloseTrigger::CloseButton).await;

    assert!(backend.calls().await.is_empty());
    assert_eq!(
        controller.session().await,
        AssistSession::new("text only", AssistMode::rewrite())
    );
}

#[tokio::test]
async fn generate_without_status_element_still_updates_text() {
    let backend = ScriptedBackend::new();
    backend.script_generate(generated("Better.")).await;
    let form = ReviewForm::new("ok").with_generate_url(url("assist/"));
    let controller = controller(form, &backend);

    assert_eq!(controller.generate().await, Outcome::Applied);

    let session = controller.session().await;
    assert_eq!(session.current_text, "Better.");
    assert_eq!(session.status, None);
    assert_eq!(session.previous_text, None);
}

#[tokio::test]
async fn status_and_modal_are_independent() {
    let backend = ScriptedBackend::new();
    backend.script_generate(generated("Crisp review.")).await;
    backend
        .script_extract(Scripted::Reply(Envelope::Success(ProsCons {
            pros: vec!["crisp".into()],
            cons: Vec::new(),
        })))
        .await;
    let controller = controller(full_form("draft"), &backend);

    controller.generate().await;
    controller.extract_pros_cons().await;
    let session = controller.session().await;
    assert_eq!(session.status, status(DONE, false));
    assert!(session.modal.is_some());

    controller.close_modal(CloseTrigger::Backdrop).await;
    let session = controller.session().await;
    assert_eq!(session.status, status(DONE, false));
    assert_eq!(session.modal, None);
}

#[tokio::test]
async fn only_escape_closes_the_modal_from_the_keyboard() {
    let backend = ScriptedBackend::new();
    let controller = controller(full_form(""), &backend);

    controller.extract_pros_cons().await;
    controller.handle_key("Enter").await;
    assert!(controller.session().await.modal.is_some());

    controller.close_modal(CloseTrigger::CloseButton).await;
    assert_eq!(controller.session().await.modal, None);
}

struct GatedBackend {
    started: mpsc::UnboundedSender<()>,
    gates: Mutex<VecDeque<oneshot::Receiver<Envelope<GenerateResult>>>>,
}

#[async_trait]
impl AssistBackend for GatedBackend {
    async fn generate(
        &self,
        _url: &Url,
        _csrf_token: &str,
        _form: &GenerateForm,
    ) -> Result<Envelope<GenerateResult>, AssistError> {
        let gate = self.gates.lock().await.pop_front().expect("gate");
        let _ = self.started.send(());
        Ok(gate.await.expect("gate sender dropped"))
    }

    async fn extract_pros_cons(
        &self,
        _url: &Url,
        _csrf_token: &str,
        _form: Option<&ExtractForm>,
    ) -> Result<Envelope<ProsCons>, AssistError> {
        unreachable!("race tests only generate")
    }
}

/// Issues two Generates and completes the newer one first.
async fn race_generates(policy: StalePolicy) -> (Outcome, Outcome, AssistSession) {
    let (first_tx, first_rx) = oneshot::channel();
    let (second_tx, second_rx) = oneshot::channel();
    let (started_tx, mut started_rx) = mpsc::unbounded_channel();
    let backend = Arc::new(GatedBackend {
        started: started_tx,
        gates: Mutex::new(VecDeque::from([first_rx, second_rx])),
    });
    let controller =
        Arc::new(ReviewAssistController::new(full_form("draft"), backend).with_stale_policy(policy));

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.generate().await }
    });
    started_rx.recv().await.expect("first request started");
    let second = tokio::spawn({
        let controller = controller.clone();
        async move { controller.generate().await }
    });
    started_rx.recv().await.expect("second request started");

    second_tx
        .send(Envelope::Success(GenerateResult {
            result: "second".into(),
        }))
        .expect("second gate");
    let second_outcome = second.await.expect("second task");
    first_tx
        .send(Envelope::Success(GenerateResult {
            result: "first".into(),
        }))
        .expect("first gate");
    let first_outcome = first.await.expect("first task");

    (first_outcome, second_outcome, controller.session().await)
}

#[tokio::test]
async fn concurrent_generates_are_last_writer_wins_by_default() {
    let (first, second, session) = race_generates(StalePolicy::LastWriterWins).await;

    assert_eq!(first, Outcome::Applied);
    assert_eq!(second, Outcome::Applied);
    assert_eq!(session.current_text, "first");
    assert_eq!(session.generation, 2);
    assert_eq!(session.previous_text.as_deref(), Some("draft"));
}

#[tokio::test]
async fn discard_stale_ignores_older_generate_completion() {
    let (first, second, session) = race_generates(StalePolicy::DiscardStale).await;

    assert_eq!(first, Outcome::Superseded);
    assert_eq!(second, Outcome::Applied);
    assert_eq!(session.current_text, "second");
    assert_eq!(session.status, status(DONE, false));
}
