use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A credential is missing or invalid. Raised before any network
    /// attempt.
    Configuration,
    /// The caller supplied an input that can never succeed, such as an
    /// empty message. Raised before any network attempt.
    Validation,
    /// The network or the remote service failed.
    Transport,
    /// A single streamed frame could not be decoded. The response that
    /// reported it keeps producing events.
    FrameDecode,
}

impl ErrorKind {
    /// Returns `true` if a response may continue producing events after
    /// reporting an error of this kind.
    #[inline]
    pub fn is_recoverable(self) -> bool {
        matches!(self, ErrorKind::FrameDecode)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration error"),
            ErrorKind::Validation => write!(f, "validation error"),
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::FrameDecode => write!(f, "frame decode error"),
        }
    }
}
