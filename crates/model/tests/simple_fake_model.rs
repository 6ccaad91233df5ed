use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::task::{self, Poll, ready};
use std::time::Duration;

use gemini_chat_model::{
    ErrorKind, ModelCompletion, ModelFinishReason, ModelMessage,
    ModelProvider, ModelProviderError, ModelRequest, ModelResponse,
    ModelResponseEvent, StreamChunk,
};
use tokio::time::{Sleep, sleep};

#[derive(Debug)]
struct FakeModelProviderError(ErrorKind);

impl Display for FakeModelProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeModelProviderError {}

impl ModelProviderError for FakeModelProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

fn echo_words(input: &str) -> VecDeque<String> {
    let words: Vec<_> = format!("You said {input}")
        .split(' ')
        .map(ToString::to_string)
        .collect();
    let count = words.len();
    words
        .into_iter()
        .enumerate()
        .map(|(idx, mut word)| {
            if idx + 1 < count {
                word.push(' ');
            }
            word
        })
        .collect()
}

#[derive(Debug)]
struct FakeModelResponse {
    fake_items: VecDeque<String>,
    completed: bool,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ModelResponse for FakeModelResponse {
    type Error = FakeModelProviderError;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };
        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            if let Some(item) = this.fake_items.pop_front() {
                return Poll::Ready(Ok(Some(ModelResponseEvent::Chunk(
                    StreamChunk::with_text(item),
                ))));
            }
            if !this.completed {
                this.completed = true;
                return Poll::Ready(Ok(Some(ModelResponseEvent::Completed(
                    ModelFinishReason::Stop,
                ))));
            }

            return Poll::Ready(Ok(None));
        }
        this.sleep = Some(Box::pin(sleep(Duration::from_millis(1))));
        Pin::new(this).poll_next_event(cx)
    }
}

struct FakeModelProvider;

fn last_user_input(req: &ModelRequest) -> Result<&str, FakeModelProviderError> {
    match req.messages.last() {
        Some(ModelMessage::User(text)) => Ok(text),
        _ => Err(FakeModelProviderError(ErrorKind::Validation)),
    }
}

impl ModelProvider for FakeModelProvider {
    type Error = FakeModelProviderError;
    type Response = FakeModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        ready(last_user_input(req).map(|input| FakeModelResponse {
            fake_items: echo_words(input),
            completed: false,
            sleep: None,
        }))
    }

    fn complete_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelCompletion, Self::Error>> + Send + 'static
    {
        ready(last_user_input(req).map(|input| ModelCompletion {
            text: echo_words(input).into_iter().collect(),
            grounding_chunks: vec![],
            finish_reason: Some(ModelFinishReason::Stop),
        }))
    }
}

mod tests {
    use std::future::poll_fn;

    use super::*;

    fn request(messages: Vec<ModelMessage>) -> ModelRequest {
        ModelRequest {
            model: "fake".to_owned(),
            messages,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_streamed_text_matches_completion() {
        let provider = FakeModelProvider;
        let req = request(vec![ModelMessage::User("Good morning".to_string())]);
        let mut resp = provider.send_request(&req).await.unwrap();

        let mut resp_message = String::new();
        let mut chunk_count = 0;
        let mut finish_reason = None;
        loop {
            let resp_fut =
                poll_fn(|cx| Pin::new(&mut resp).poll_next_event(cx));
            match resp_fut.await {
                Ok(Some(event)) => match event {
                    ModelResponseEvent::Chunk(chunk) => {
                        chunk_count += 1;
                        resp_message.push_str(&chunk.text);
                    }
                    ModelResponseEvent::Completed(reason) => {
                        finish_reason = Some(reason);
                    }
                },
                Ok(None) => break,
                Err(err) => unreachable!("unexpected error: {err:?}"),
            }
        }

        assert_eq!(resp_message, "You said Good morning");
        assert_eq!(chunk_count, 4);
        assert_eq!(finish_reason, Some(ModelFinishReason::Stop));

        let completion = provider.complete_request(&req).await.unwrap();
        assert_eq!(completion.text, resp_message);
    }

    #[tokio::test]
    async fn test_error() {
        let provider = FakeModelProvider;
        let req = request(vec![]);
        let err = provider.send_request(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!err.kind().is_recoverable());
    }
}
