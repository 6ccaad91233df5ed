use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use futures_util::stream::Stream;
use gemini_chat_model::{
    ModelFinishReason, ModelMessage, ModelRequest, ModelResponseEvent,
    StreamChunk,
};
use tracing::Span;

use crate::conversation::Conversation;
use crate::error::{Error, Operation};
use crate::model_client::{
    BoxedFuture, BoxedProviderError, BoxedResponse, ErasedResponse as _,
    ModelClient,
};
use crate::observer::{ClientEvent, Observer};

/// A conversation with one model.
///
/// The session carries the settings it was created with and the turns
/// exchanged so far. It is owned by the caller and independent of every
/// other session; the client that created it keeps no reference to it.
pub struct ChatSession {
    model_client: ModelClient,
    observer: Observer,
    // Model, system instruction, temperature and tools; `messages` is
    // always empty here.
    template: ModelRequest,
    conversation: Conversation,
}

impl ChatSession {
    pub(crate) fn new(
        model_client: ModelClient,
        observer: Observer,
        template: ModelRequest,
    ) -> Self {
        Self {
            model_client,
            observer,
            template,
            conversation: Default::default(),
        }
    }

    /// Returns the model this session talks to.
    #[inline]
    pub fn model(&self) -> &str {
        &self.template.model
    }

    /// Returns the turns committed so far.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Sends `message` and returns a stream of the reply.
    ///
    /// Blank messages are rejected with a validation error and nothing is
    /// sent. Otherwise the request goes out when the stream is first
    /// polled, together with the previously committed turns.
    ///
    /// The exchange is committed to the session only when the stream runs
    /// to its end. Dropping the stream early closes the connection and
    /// leaves the session as it was.
    pub fn stream_message(
        &mut self,
        message: &str,
    ) -> Result<MessageStream<'_>, Error> {
        if message.trim().is_empty() {
            let err = Error::validation(
                Operation::StreamMessage,
                "message must not be empty",
            );
            return Err(self.observer.report_failure(err));
        }

        let mut request = self.template.clone();
        request.messages = self.conversation.messages.clone();
        request.messages.push(ModelMessage::User(message.to_owned()));

        Ok(MessageStream {
            span: debug_span!("stream message", model = %self.template.model),
            session: self,
            input: message.to_owned(),
            state: StreamState::Idle(request),
            transcript: String::new(),
            chunk_count: 0,
            finish_reason: None,
        })
    }
}

enum StreamState {
    Idle(ModelRequest),
    Connecting(BoxedFuture<Result<BoxedResponse, BoxedProviderError>>),
    Receiving(BoxedResponse),
    Done,
}

/// The streamed reply to one message, returned by
/// [`ChatSession::stream_message`].
///
/// Yields one [`StreamChunk`] per frame received, in order. Malformed
/// frames are skipped. A transport failure is yielded once as an error,
/// after which the stream ends.
pub struct MessageStream<'a> {
    session: &'a mut ChatSession,
    input: String,
    state: StreamState,
    transcript: String,
    chunk_count: usize,
    finish_reason: Option<ModelFinishReason>,
    span: Span,
}

impl MessageStream<'_> {
    /// Returns the finish reason reported by the service, once the stream
    /// has seen it.
    #[inline]
    pub fn finish_reason(&self) -> Option<ModelFinishReason> {
        self.finish_reason
    }

    /// Returns the text received so far.
    #[inline]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    fn fail(&mut self, err: BoxedProviderError) -> Error {
        self.state = StreamState::Done;
        let err = Error::from_provider(Operation::StreamMessage, err);
        self.session.observer.report_failure(err)
    }

    fn finish(&mut self) {
        self.state = StreamState::Done;
        let observer = &self.session.observer;
        debug!(
            "reply finished after {} chunks: {:?}",
            self.chunk_count, self.finish_reason
        );
        observer.emit(ClientEvent::Completed {
            operation: Operation::StreamMessage,
            chunks: self.chunk_count,
        });

        // An empty reply cannot be sent back as a model turn.
        if self.transcript.is_empty() {
            debug!("empty reply, nothing committed");
            return;
        }
        self.session.conversation.commit_exchange(
            mem::take(&mut self.input),
            mem::take(&mut self.transcript),
        );
    }
}

impl Stream for MessageStream<'_> {
    type Item = Result<StreamChunk, Error>;

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let span = this.span.clone();
        let _entered = span.enter();

        loop {
            match &mut this.state {
                StreamState::Idle(_) => {
                    let StreamState::Idle(request) =
                        mem::replace(&mut this.state, StreamState::Done)
                    else {
                        unreachable!();
                    };
                    this.session.observer.emit(ClientEvent::RequestStarted {
                        operation: Operation::StreamMessage,
                    });
                    this.state = StreamState::Connecting(
                        this.session.model_client.send_request(request),
                    );
                }
                StreamState::Connecting(fut) => match ready!(fut.as_mut().poll(cx))
                {
                    Ok(resp) => this.state = StreamState::Receiving(resp),
                    Err(err) => return Poll::Ready(Some(Err(this.fail(err)))),
                },
                StreamState::Receiving(resp) => {
                    let event = match ready!(resp.as_mut().poll_next_event(cx)) {
                        Ok(event) => event,
                        Err(err) if err.kind().is_recoverable() => {
                            warn!("skipping frame: {err}");
                            this.session.observer.emit(ClientEvent::FrameSkipped {
                                reason: err.to_string(),
                            });
                            continue;
                        }
                        Err(err) => return Poll::Ready(Some(Err(this.fail(err)))),
                    };
                    match event {
                        Some(ModelResponseEvent::Chunk(chunk)) => {
                            trace!("got a chunk: {chunk:?}");
                            this.session.observer.emit(ClientEvent::ChunkReceived {
                                index: this.chunk_count,
                                text_len: chunk.text.len(),
                                grounding_chunks: chunk.grounding_chunks.len(),
                            });
                            this.chunk_count += 1;
                            this.transcript.push_str(&chunk.text);
                            return Poll::Ready(Some(Ok(chunk)));
                        }
                        Some(ModelResponseEvent::Completed(reason)) => {
                            this.finish_reason = Some(reason);
                        }
                        None => {
                            this.finish();
                            return Poll::Ready(None);
                        }
                    }
                }
                StreamState::Done => return Poll::Ready(None),
            }
        }
    }
}
