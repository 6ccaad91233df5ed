use std::error::Error;

use crate::error::ErrorKind;
use crate::request::ModelRequest;
use crate::response::{ModelCompletion, ModelResponse};

/// The error type for a model provider.
pub trait ModelProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a model provider, which is an entry for
/// sampling requests from a remote model.
///
/// Once the provider is created, it should behave like a stateless object.
/// It can still have internal state (like a connection pool), but callers
/// should not rely on it, and the provider should be prepared for being
/// dropped anytime. Two identical requests are two independent calls.
pub trait ModelProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// The response type for this provider.
    type Response: ModelResponse<Error = Self::Error>;

    /// Sends a request and returns a response that streams its result.
    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static;

    /// Sends a request and waits for the complete result.
    fn complete_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelCompletion, Self::Error>> + Send + 'static;
}
