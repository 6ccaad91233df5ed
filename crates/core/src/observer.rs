//! Hooks for watching what the facade does.

use std::fmt::{self, Debug};
use std::sync::Arc;

use gemini_chat_model::ErrorKind;

use crate::error::{Error, Operation};

/// Something the facade did, reported to the [`Observer`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClientEvent {
    /// An API key was found in the named environment variable.
    CredentialResolved {
        /// The variable the key was read from.
        variable: &'static str,
    },
    /// A chat session was created.
    SessionCreated {
        /// The session's model.
        model: String,
        /// Whether web grounding is attached.
        use_search: bool,
    },
    /// A request is about to be sent.
    RequestStarted {
        /// The operation sending it.
        operation: Operation,
    },
    /// A streamed chunk was handed to the caller.
    ChunkReceived {
        /// Zero-based position of the chunk in its stream.
        index: usize,
        /// Length of the chunk text in bytes.
        text_len: usize,
        /// Number of citations attached to the chunk.
        grounding_chunks: usize,
    },
    /// A malformed frame was dropped and the stream continued.
    FrameSkipped {
        /// What was wrong with the frame.
        reason: String,
    },
    /// An operation finished successfully.
    Completed {
        /// The operation.
        operation: Operation,
        /// Number of chunks delivered, `1` for non-streamed replies.
        chunks: usize,
    },
    /// An operation failed. The same error is returned to the caller.
    Failed {
        /// The operation.
        operation: Operation,
        /// The kind of the error.
        kind: ErrorKind,
        /// The error message.
        message: String,
    },
}

type Callback = Arc<dyn Fn(&ClientEvent) + Send + Sync>;

/// A callback invoked with every [`ClientEvent`].
///
/// Cloning an observer is cheap and clones invoke the same callback. The
/// default observer ignores all events. Events are also logged through
/// `tracing` regardless of the observer.
#[derive(Clone, Default)]
pub struct Observer(Option<Callback>);

impl Observer {
    /// Creates an observer that invokes `callback` for every event.
    #[inline]
    pub fn new(callback: impl Fn(&ClientEvent) + Send + Sync + 'static) -> Self {
        Self(Some(Arc::new(callback)))
    }

    #[inline]
    pub(crate) fn emit(&self, event: ClientEvent) {
        if let Some(callback) = &self.0 {
            callback(&event);
        }
    }

    /// Logs `err`, reports it as [`ClientEvent::Failed`], and hands it
    /// back for returning.
    pub(crate) fn report_failure(&self, err: Error) -> Error {
        error!("{err}");
        self.emit(ClientEvent::Failed {
            operation: err.operation(),
            kind: err.kind(),
            message: err.message().to_owned(),
        });
        err
    }
}

impl Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observer")
            .field(&self.0.as_ref().map(|_| "<callback>"))
            .finish()
    }
}
