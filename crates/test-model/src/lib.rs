//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use gemini_chat_model::{
    ErrorKind, ModelCompletion, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse, ModelResponseEvent,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

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

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Shared {
    script: Mutex<VecDeque<PresetResponse>>,
    requests: Mutex<Vec<ModelRequest>>,
    frames_served: AtomicUsize,
}

impl Shared {
    fn take_response(&self, req: &ModelRequest) -> Result<PresetResponse, Error> {
        self.requests
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .push(req.clone());

        let preset = self
            .script
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .pop_front()
            .ok_or_else(|| {
                Error::new("no scripted response left", ErrorKind::Transport)
            })?;
        match &preset.rejection {
            Some(message) => Err(Error::new(message, ErrorKind::Transport)),
            None => Ok(preset),
        }
    }
}

pub struct TestModelResponse {
    shared: Arc<Shared>,
    preset: PresetResponse,
    frame_idx: usize,
    finished: bool,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl TestModelResponse {
    fn next_event(&mut self) -> Result<Option<ModelResponseEvent>, Error> {
        if self.finished {
            return Ok(None);
        }

        let Some(frame) = self.preset.frames.get(self.frame_idx) else {
            self.finished = true;
            return Ok(self
                .preset
                .finish_reason
                .map(ModelResponseEvent::Completed));
        };
        self.frame_idx += 1;
        self.shared.frames_served.fetch_add(1, Ordering::SeqCst);

        match frame {
            PresetFrame::Chunk(chunk) => {
                Ok(Some(ModelResponseEvent::Chunk(chunk.clone())))
            }
            PresetFrame::Malformed(reason) => Err(Error::new(
                format!("malformed frame #{}: {reason}", self.frame_idx),
                ErrorKind::FrameDecode,
            )),
            PresetFrame::TransportError(message) => {
                self.finished = true;
                Err(Error::new(message, ErrorKind::Transport))
            }
        }
    }
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };

        if this.finished {
            return Poll::Ready(Ok(None));
        }

        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;
            return Poll::Ready(this.next_event());
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_event(cx)
    }
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each request. Every request, streamed or not,
/// consumes the next preset response in order. If the script runs out, the
/// request fails with a transport error.
///
/// Clones share the script and the counters, so a test can keep a clone to
/// inspect what the code under test sent.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    shared: Arc<Shared>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_response(&mut self, preset: PresetResponse) {
        self.shared
            .script
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .push_back(preset);
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.shared
            .requests
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }

    /// Returns the number of requests received so far.
    #[inline]
    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    /// Returns the number of streamed frames handed out so far, across all
    /// responses.
    #[inline]
    pub fn frames_served(&self) -> usize {
        self.shared.frames_served.load(Ordering::SeqCst)
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let resp = self.shared.take_response(req).map(|preset| {
            TestModelResponse {
                shared: Arc::clone(&self.shared),
                preset,
                frame_idx: 0,
                finished: false,
                delay: self.delay.unwrap_or(Duration::from_millis(1)),
                sleep: None,
            }
        });
        ready(resp)
    }

    fn complete_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelCompletion, Self::Error>> + Send + 'static
    {
        let completion = self.shared.take_response(req).and_then(|preset| {
            let mut completion = ModelCompletion {
                finish_reason: preset.finish_reason,
                ..Default::default()
            };
            for frame in preset.frames {
                match frame {
                    PresetFrame::Chunk(chunk) => {
                        completion.text.push_str(&chunk.text);
                        completion.grounding_chunks.extend(chunk.grounding_chunks);
                    }
                    PresetFrame::Malformed(_) => {}
                    PresetFrame::TransportError(message) => {
                        return Err(Error::new(message, ErrorKind::Transport));
                    }
                }
            }
            Ok(completion)
        });
        ready(completion)
    }
}
