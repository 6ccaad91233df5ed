use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use gemini_chat_model::{
    ModelCompletion, ModelProvider, ModelProviderError, ModelRequest,
    ModelResponse, ModelResponseEvent,
};
use tracing::Instrument;

pub(crate) type BoxedProviderError = Box<dyn ModelProviderError>;
pub(crate) type BoxedResponse = Pin<Box<dyn ErasedResponse>>;
pub(crate) type BoxedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type SendRequestResult = Result<BoxedResponse, BoxedProviderError>;
type CompleteRequestResult = Result<ModelCompletion, BoxedProviderError>;
#[rustfmt::skip]
type SendHandlerFn = Arc<
    dyn Fn(ModelRequest) -> BoxedFuture<SendRequestResult> + Send + Sync
>;
#[rustfmt::skip]
type CompleteHandlerFn = Arc<
    dyn Fn(ModelRequest) -> BoxedFuture<CompleteRequestResult> + Send + Sync
>;

/// A [`ModelResponse`] with its concrete type erased.
pub(crate) trait ErasedResponse: Send {
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, BoxedProviderError>>;
}

impl<R: ModelResponse> ErasedResponse for R {
    #[inline]
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, BoxedProviderError>> {
        <R as ModelResponse>::poll_next_event(self, cx)
            .map_err(|err| Box::new(err) as BoxedProviderError)
    }
}

/// A wrapper around a model provider that provides a type-erased
/// interface for the other modules.
///
/// Clones share the same provider.
#[derive(Clone)]
pub(crate) struct ModelClient {
    send_fn: SendHandlerFn,
    complete_fn: CompleteHandlerFn,
}

impl ModelClient {
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let provider = Arc::new(provider);

        let send_fn: SendHandlerFn = Arc::new({
            let provider = Arc::clone(&provider);
            move |req| {
                let fut = provider.send_request(&req);
                Box::pin(
                    async move {
                        trace!("sending a streamed request: {req:?}");
                        match fut.await {
                            Ok(resp) => Ok(Box::pin(resp) as BoxedResponse),
                            Err(err) => {
                                error!("got an error: {err:?}");
                                Err(Box::new(err) as BoxedProviderError)
                            }
                        }
                    }
                    .instrument(trace_span!("model client stream req")),
                )
            }
        });

        let complete_fn: CompleteHandlerFn = Arc::new(move |req| {
            let fut = provider.complete_request(&req);
            Box::pin(
                async move {
                    trace!("sending a request: {req:?}");
                    fut.await.map_err(|err| {
                        error!("got an error: {err:?}");
                        Box::new(err) as BoxedProviderError
                    })
                }
                .instrument(trace_span!("model client req")),
            )
        });

        Self {
            send_fn,
            complete_fn,
        }
    }

    /// Sends a request and returns a future resolving to the streamed
    /// response.
    #[inline]
    pub fn send_request(
        &self,
        req: ModelRequest,
    ) -> BoxedFuture<SendRequestResult> {
        (self.send_fn)(req)
    }

    /// Sends a request and waits for the complete reply.
    #[inline]
    pub async fn complete_request(
        &self,
        req: ModelRequest,
    ) -> CompleteRequestResult {
        (self.complete_fn)(req).await
    }
}
