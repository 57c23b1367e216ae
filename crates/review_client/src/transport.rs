//! HTTP wrapper for the assist endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use review_shared::protocol::{
    decode_envelope, Envelope, ExtractForm, GenerateForm, GenerateResult, ProsCons, CSRF_HEADER,
    REQUESTED_WITH_AJAX, REQUESTED_WITH_HEADER,
};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::{error::AssistError, AssistBackend};

/// [`AssistBackend`] that posts form-encoded requests with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpAssistBackend {
    http: Client,
}

impl HttpAssistBackend {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Bounds every request; a hung request fails as a transport error
    /// instead of staying in progress forever.
    pub fn with_timeout(timeout: Duration) -> Result<Self, AssistError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    fn request(&self, url: &Url, csrf_token: &str) -> RequestBuilder {
        self.http
            .post(url.clone())
            .header(CSRF_HEADER, csrf_token)
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_AJAX)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, AssistError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        match decode_envelope::<T>(&body) {
            Ok(envelope) => {
                if !status.is_success() {
                    debug!(status = status.as_u16(), "assist: envelope on non-2xx response");
                }
                Ok(envelope)
            }
            Err(source) if !status.is_success() => Err(AssistError::Status {
                status: status.as_u16(),
                source,
            }),
            Err(err) => Err(AssistError::Decode(err)),
        }
    }
}

impl Default for HttpAssistBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssistBackend for HttpAssistBackend {
    async fn generate(
        &self,
        url: &Url,
        csrf_token: &str,
        form: &GenerateForm,
    ) -> Result<Envelope<GenerateResult>, AssistError> {
        self.send(self.request(url, csrf_token).form(form)).await
    }

    async fn extract_pros_cons(
        &self,
        url: &Url,
        csrf_token: &str,
        form: Option<&ExtractForm>,
    ) -> Result<Envelope<ProsCons>, AssistError> {
        let request = self.request(url, csrf_token);
        let request = match form {
            Some(form) => request.form(form),
            None => request,
        };
        self.send(request).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
