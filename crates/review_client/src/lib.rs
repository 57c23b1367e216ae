use async_trait::async_trait;
use review_shared::protocol::{Envelope, ExtractForm, GenerateForm, GenerateResult, ProsCons};
use url::Url;

pub mod controller;
pub mod error;
pub mod form;
pub mod render;
pub mod session;
pub mod transport;
pub mod widgets;

pub use controller::{CloseTrigger, Outcome, ReviewAssistController, StalePolicy};
pub use error::AssistError;
pub use form::{ModeSelector, ReviewCardControl, ReviewForm};
pub use session::{AssistSession, Modal, ModalBody, Status};
pub use transport::HttpAssistBackend;

/// One request/response round trip to an assist endpoint.
///
/// Implementations return the decoded envelope for any well-formed reply,
/// `ok: false` included; only transport and decoding problems are errors.
#[async_trait]
pub trait AssistBackend: Send + Sync {
    async fn generate(
        &self,
        url: &Url,
        csrf_token: &str,
        form: &GenerateForm,
    ) -> Result<Envelope<GenerateResult>, AssistError>;

    /// `form` is `None` for review-card requests, which send no fields.
    async fn extract_pros_cons(
        &self,
        url: &Url,
        csrf_token: &str,
        form: Option<&ExtractForm>,
    ) -> Result<Envelope<ProsCons>, AssistError>;
}
