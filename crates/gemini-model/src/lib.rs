//! A model provider for the Gemini API (`generativelanguage.googleapis.com`).

#[macro_use]
extern crate tracing;

mod config;
mod io;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use gemini_chat_model::{
    ErrorKind, ModelCompletion, ModelProvider, ModelProviderError,
    ModelRequest,
};
use mime::Mime;
use reqwest::{Client, RequestBuilder, Response, header};

pub use config::{GeminiConfig, GeminiConfigBuilder};
use io::{Chunks, Sse};
use proto::{ErrorEnvelope, GenerateContentResponse, ServiceError};
pub use response::GeminiResponse;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Error type for [`GeminiProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    fn from_service(err: ServiceError) -> Self {
        let status = err.status.as_deref().unwrap_or("UNKNOWN");
        let message = match err.code {
            Some(code) => format!("{code} {status}: {}", err.message),
            None => format!("{status}: {}", err.message),
        };
        Self::new(message, ErrorKind::Transport)
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Gemini model provider.
///
/// The provider is cheap to clone, and clones share one connection pool.
/// Create it once at startup and hand it to the chat client.
#[derive(Clone, Debug)]
pub struct GeminiProvider {
    client: Client,
    config: Arc<GeminiConfig>,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider` with the given configuration.
    #[inline]
    pub fn new(config: GeminiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Creates a new `GeminiProvider` that sends requests through an
    /// existing HTTP client.
    #[inline]
    pub fn with_client(client: Client, config: GeminiConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    fn post(&self, req: &ModelRequest, url: String) -> RequestBuilder {
        let gemini_req = proto::create_request(req);
        self.client
            .post(url)
            .header(API_KEY_HEADER, self.config.api_key.expose())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&gemini_req)
    }
}

impl ModelProvider for GeminiProvider {
    type Error = Error;
    type Response = GeminiResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let url = self.config.endpoint(&req.model, "streamGenerateContent");
        let resp_fut = self
            .post(req, format!("{url}?alt=sse"))
            .header(header::ACCEPT, "text/event-stream")
            .send();

        async move {
            let resp = check_status(resp_fut.await).await?;

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_valid_content_type = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.subtype().as_str() == "event-stream")
                .unwrap_or(false);
            if !is_valid_content_type {
                return Err(Error::new(
                    format!("Unexpected content type: {content_type:?}"),
                    ErrorKind::Transport,
                ));
            }

            // Here we got a successful response.
            debug!("event stream opened");
            let chunks = Chunks::from_response(resp);
            let sse = Sse::new(chunks);
            Ok(GeminiResponse::from_sse(sse))
        }
    }

    fn complete_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelCompletion, Self::Error>> + Send + 'static
    {
        let url = self.config.endpoint(&req.model, "generateContent");
        let resp_fut = self
            .post(req, url)
            .header(header::ACCEPT, "application/json")
            .send();

        async move {
            let resp = check_status(resp_fut.await).await?;
            let body = resp.json::<GenerateContentResponse>().await.map_err(
                |err| {
                    Error::new(
                        format!("Unexpected response body: {err}"),
                        ErrorKind::Transport,
                    )
                },
            )?;
            Ok(body.to_completion())
        }
    }
}

/// Turns connection failures and non-success statuses into transport
/// errors, keeping the service's own error message when it sent one.
async fn check_status(
    resp_or_err: Result<Response, reqwest::Error>,
) -> Result<Response, Error> {
    let resp = resp_or_err
        .map_err(|err| Error::new(format!("{err}"), ErrorKind::Transport))?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    warn!("request failed with status {status}");
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => Err(Error::from_service(envelope.error)),
        Err(_) => Err(Error::new(
            format!("HTTP {status}: {body}"),
            ErrorKind::Transport,
        )),
    }
}
