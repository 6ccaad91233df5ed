use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};

use gemini_chat_model::{ErrorKind, ModelProviderError};

/// The facade operation an error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Looking up the API key.
    ResolveCredentials,
    /// [`ChatClient::create_chat_session`](crate::ChatClient::create_chat_session).
    CreateSession,
    /// [`ChatSession::stream_message`](crate::ChatSession::stream_message).
    StreamMessage,
    /// [`ChatClient::analyze_text`](crate::ChatClient::analyze_text).
    AnalyzeText,
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ResolveCredentials => write!(f, "resolve credentials"),
            Operation::CreateSession => write!(f, "create chat session"),
            Operation::StreamMessage => write!(f, "stream message"),
            Operation::AnalyzeText => write!(f, "analyze text"),
        }
    }
}

/// An error returned by the chat facade.
///
/// The [`kind`](Error::kind) tells configuration, validation and transport
/// failures apart, and [`operation`](Error::operation) names the call that
/// failed. Errors reported by the model provider are kept as the
/// [`source`](StdError::source).
#[derive(Debug, thiserror::Error)]
#[error("{operation}: {kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    operation: Operation,
    message: String,
    #[source]
    source: Option<ProviderError>,
}

impl Error {
    pub(crate) fn configuration<S: Into<String>>(message: S) -> Self {
        Self {
            kind: ErrorKind::Configuration,
            operation: Operation::ResolveCredentials,
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn validation<S: Into<String>>(
        operation: Operation,
        message: S,
    ) -> Self {
        Self {
            kind: ErrorKind::Validation,
            operation,
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn from_provider(
        operation: Operation,
        err: Box<dyn ModelProviderError>,
    ) -> Self {
        Self {
            kind: err.kind(),
            operation,
            message: err.to_string(),
            source: Some(ProviderError(err)),
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the operation that failed.
    #[inline]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the error message, without the operation and kind prefix.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An error reported by the model provider.
pub struct ProviderError(Box<dyn ModelProviderError>);

impl ProviderError {
    /// Returns the kind the provider assigned to this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }
}

impl Debug for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl StdError for ProviderError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}
