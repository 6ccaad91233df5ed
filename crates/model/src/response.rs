use std::pin::Pin;
use std::task::{self, Poll};

use serde::{Deserialize, Serialize};

use crate::grounding::{GroundingChunk, StreamChunk};
use crate::provider::ModelProviderError;

/// A streamed response from the model provider.
pub trait ModelResponse: Sized + Send + 'static {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Attempts to pull out the next event from the response.
    ///
    /// # Return value
    ///
    /// There are several possible return values, each indicating a
    /// distinct response state:
    ///
    /// - `Poll::Pending` means that this response is still waiting for
    ///   the next event. Implementations will ensure that the current
    ///   task will be notified when the next event may be ready.
    /// - `Poll::Ready(Ok(Some(event)))` means the response has an event
    ///   to deliver, and may produce further events on subsequent
    ///   `poll_next_event` calls.
    /// - `Poll::Ready(Ok(None))` means the response has completed.
    /// - `Poll::Ready(Err(error))` means an error occurred while
    ///   processing the response. If the error kind is recoverable (see
    ///   [`ErrorKind::is_recoverable`](crate::ErrorKind::is_recoverable))
    ///   only the offending frame was lost and the response may produce
    ///   further events. Otherwise the response has terminated.
    ///
    /// Calling this method after completion or after a terminal error
    /// should always return `None`.
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>>;
}

/// The reason why a model response has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model has finished generating text.
    Stop,
    /// The output token limit was reached.
    MaxTokens,
    /// The reply was withheld for safety reasons.
    Safety,
    /// The reply was withheld because it recited protected content.
    Recitation,
    /// Any other reason reported by the service.
    Other,
}

/// The event from a model response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelResponseEvent {
    /// Received one frame of the reply.
    Chunk(StreamChunk),
    /// The service reported why it stopped generating. Always follows
    /// the chunk of the frame that carried it.
    Completed(ModelFinishReason),
}

/// A completely received, non-streamed reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModelCompletion {
    /// The full reply text.
    pub text: String,
    /// Citations attached to the reply.
    pub grounding_chunks: Vec<GroundingChunk>,
    /// The reason the model finished generating, if reported.
    pub finish_reason: Option<ModelFinishReason>,
}
