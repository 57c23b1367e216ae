use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

use crate::domain::AssistMode;

pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
pub const REQUESTED_WITH_AJAX: &str = "XMLHttpRequest";

/// Form fields of a Generate request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateForm {
    pub text: String,
    pub mode: AssistMode,
}

/// Form fields of an own-review pros/cons request. Review-card requests
/// carry no fields at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractForm {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResult {
    pub result: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProsCons {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pros: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cons: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Deserialize)]
struct EnvelopeHeader {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Decoded `{ok, error?, ...}` response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope<T> {
    Success(T),
    Rejected { error: Option<String> },
}

/// Parses a response body into an [`Envelope`].
///
/// `ok` is mandatory. A success envelope must carry the success fields of
/// `T`; anything else is reported as a JSON error.
pub fn decode_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<Envelope<T>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    let header = EnvelopeHeader::deserialize(&value)?;
    if !header.ok {
        return Ok(Envelope::Rejected {
            error: header.error.filter(|message| !message.is_empty()),
        });
    }
    let payload = T::deserialize(value)?;
    Ok(Envelope::Success(payload))
}
