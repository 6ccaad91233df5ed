use std::pin::Pin;
use std::task::{Context, Poll, ready};

use gemini_chat_model::{
    ErrorKind, ModelFinishReason, ModelProviderError, ModelResponse,
    ModelResponseEvent,
};
use pin_project_lite::pin_project;

use crate::Error;
use crate::io::{Sse, SseError};
use crate::proto::StreamFrame;

struct PartialState {
    sse: Sse,
    // Number of events read so far, used to point at bad frames in logs.
    frame_count: usize,
    // A frame's finish reason is reported after the frame's chunk.
    pending_finish_reason: Option<ModelFinishReason>,
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = (Result<Option<ModelResponseEvent>, Error>, PartialState);

pin_project! {
    /// A streamed reply from `streamGenerateContent`.
    ///
    /// Dropping the response drops the underlying HTTP body, which closes
    /// the connection (or returns it to the pool) without reading further
    /// frames.
    pub struct GeminiResponse {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
    }
}

impl GeminiResponse {
    #[inline]
    pub(crate) fn from_sse(sse: Sse) -> Self {
        let partial_state = PartialState {
            sse,
            frame_count: 0,
            pending_finish_reason: None,
        };
        Self {
            next_event_fut: Some(Box::pin(next_event(partial_state))),
        }
    }
}

impl ModelResponse for GeminiResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        let (result, partial_state) = ready!(next_event_fut.as_mut().poll(cx));
        match result {
            Ok(Some(event)) => {
                *this.next_event_fut = Some(Box::pin(next_event(partial_state)));
                Poll::Ready(Ok(Some(event)))
            }
            Ok(None) => {
                *this.next_event_fut = None;
                Poll::Ready(Ok(None))
            }
            Err(err) if err.kind().is_recoverable() => {
                // Only one frame is lost, keep reading from the same stream.
                *this.next_event_fut = Some(Box::pin(next_event(partial_state)));
                Poll::Ready(Err(err))
            }
            Err(err) => {
                *this.next_event_fut = None;
                Poll::Ready(Err(err))
            }
        }
    }
}

async fn next_event(mut partial_state: PartialState) -> NextEvent {
    if let Some(finish_reason) = partial_state.pending_finish_reason.take() {
        return (
            Ok(Some(ModelResponseEvent::Completed(finish_reason))),
            partial_state,
        );
    }

    let sse_event = match partial_state.sse.next_event().await {
        Ok(Some(event)) => event,
        Ok(None) => return (Ok(None), partial_state),
        Err(SseError::InvalidPayload(reason)) => {
            partial_state.frame_count += 1;
            let err = Error::new(
                format!(
                    "malformed frame #{}: {reason}",
                    partial_state.frame_count
                ),
                ErrorKind::FrameDecode,
            );
            return (Err(err), partial_state);
        }
        Err(SseError::ChunksError(err)) => {
            let err = Error::new(
                format!("stream interrupted: {}", err.0),
                ErrorKind::Transport,
            );
            return (Err(err), partial_state);
        }
    };
    partial_state.frame_count += 1;
    trace!("got sse event: {sse_event}");

    let frame = match serde_json::from_str::<StreamFrame>(&sse_event) {
        Ok(StreamFrame::Response(frame)) => frame,
        Ok(StreamFrame::Error(envelope)) => {
            let err = Error::from_service(envelope.error);
            return (Err(err), partial_state);
        }
        Err(err) => {
            let err = Error::new(
                format!(
                    "malformed frame #{}: {err}",
                    partial_state.frame_count
                ),
                ErrorKind::FrameDecode,
            );
            return (Err(err), partial_state);
        }
    };

    partial_state.pending_finish_reason = frame.finish_reason();
    (
        Ok(Some(ModelResponseEvent::Chunk(frame.to_chunk()))),
        partial_state,
    )
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use bytes::Bytes;

    use super::*;
    use crate::io::{Chunks, ChunksError};

    async fn collect_events(
        chunks: Chunks,
    ) -> Vec<Result<ModelResponseEvent, Error>> {
        let mut resp = pin!(GeminiResponse::from_sse(Sse::new(chunks)));
        let mut events = vec![];
        loop {
            match poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await {
                Ok(Some(event)) => events.push(Ok(event)),
                Ok(None) => break,
                Err(err) => events.push(Err(err)),
            }
        }
        events
    }

    fn texts(events: &[Result<ModelResponseEvent, Error>]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                Ok(ModelResponseEvent::Chunk(chunk)) => Some(chunk.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_simple_events() {
        let chunks = Chunks::from_vec_deque(
            vec![Bytes::from_static(include_bytes!(
                "../fixtures/stream_response.txt"
            ))]
            .into(),
        );
        let events = collect_events(chunks).await;
        assert!(events.iter().all(Result::is_ok));
        assert_eq!(
            texts(&events),
            ["The Rust ", "1.0 release shipped ", "on May 15, 2015."]
        );

        let grounded = events
            .iter()
            .filter_map(|event| match event {
                Ok(ModelResponseEvent::Chunk(chunk)) => Some(chunk),
                _ => None,
            })
            .flat_map(|chunk| chunk.grounding_chunks.iter())
            .count();
        assert_eq!(grounded, 2);

        assert_eq!(
            events.last().unwrap().as_ref().unwrap(),
            &ModelResponseEvent::Completed(ModelFinishReason::Stop)
        );
    }

    #[tokio::test]
    async fn test_malformed_frame_is_skipped() {
        let chunks = Chunks::from_vec_deque(
            vec![
                Bytes::from_static(
                    b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"a\"}]}}]}\n\n",
                ),
                Bytes::from_static(b"data: {\"candidates\": [\n\n"),
                Bytes::from_static(
                    b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"b\"}]}}]}\n\n",
                ),
            ]
            .into(),
        );
        let events = collect_events(chunks).await;
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1].as_ref().unwrap_err().kind(),
            ErrorKind::FrameDecode
        );
        assert!(events[1].as_ref().unwrap_err().message().contains("#2"));
        assert_eq!(texts(&events), ["a", "b"]);
    }

    #[tokio::test]
    async fn test_transport_failure_terminates() {
        let chunks = Chunks::from_results(
            vec![
                Ok(Bytes::from_static(
                    b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"a\"}]}}]}\n\n",
                )),
                Err(ChunksError("connection reset".to_owned())),
                Ok(Bytes::from_static(
                    b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"b\"}]}}]}\n\n",
                )),
            ]
            .into(),
        );
        let events = collect_events(chunks).await;
        assert_eq!(events.len(), 2);
        let err = events[1].as_ref().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.message().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_error_frame_terminates() {
        let chunks = Chunks::from_vec_deque(
            vec![
                Bytes::from_static(
                    b"data: {\"error\":{\"code\":503,\"message\":\"overloaded\",\"status\":\"UNAVAILABLE\"}}\n\n",
                ),
                Bytes::from_static(
                    b"data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"b\"}]}}]}\n\n",
                ),
            ]
            .into(),
        );
        let events = collect_events(chunks).await;
        assert_eq!(events.len(), 1);
        let err = events[0].as_ref().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.message().contains("overloaded"));
    }
}
