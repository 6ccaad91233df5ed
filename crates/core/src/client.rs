use gemini_chat_model::{ModelProvider, ModelRequest, ModelMessage, ModelTool};

use crate::config::AgentConfig;
use crate::error::{Error, Operation};
use crate::model_client::ModelClient;
use crate::observer::{ClientEvent, Observer};
use crate::session::ChatSession;

/// The model used by [`ChatClient::analyze_text`] unless the builder
/// overrides it.
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-2.5-flash";

const ANALYSIS_PROMPT: &str = "\
Analyze the following data. Summarize what it contains, point out notable \
patterns or anomalies, and state only conclusions the data supports.

Data:
";

/// [`ChatClient`] builder.
pub struct ChatClientBuilder {
    model_client: ModelClient,
    observer: Observer,
    analysis_model: Option<String>,
}

impl ChatClientBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            observer: Observer::default(),
            analysis_model: None,
        }
    }

    /// Sets the observer notified of every [`ClientEvent`].
    #[inline]
    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    /// Attaches a callback to be invoked for every [`ClientEvent`].
    ///
    /// This is a shorthand for [`with_observer`](Self::with_observer).
    #[inline]
    pub fn on_event(
        self,
        on_event: impl Fn(&ClientEvent) + Send + Sync + 'static,
    ) -> Self {
        self.with_observer(Observer::new(on_event))
    }

    /// Sets the model used by [`ChatClient::analyze_text`].
    #[inline]
    pub fn with_analysis_model<S: Into<String>>(mut self, model: S) -> Self {
        self.analysis_model = Some(model.into());
        self
    }

    /// Builds the client.
    #[inline]
    pub fn build(self) -> ChatClient {
        ChatClient {
            model_client: self.model_client,
            observer: self.observer,
            analysis_model: self
                .analysis_model
                .unwrap_or_else(|| DEFAULT_ANALYSIS_MODEL.to_owned()),
        }
    }
}

/// The entry point for talking to the model.
///
/// A client is meant to be built once at startup and shared; clones are
/// cheap and use the same provider. It holds no per-conversation state:
/// every chat lives in its own [`ChatSession`].
#[derive(Clone)]
pub struct ChatClient {
    model_client: ModelClient,
    observer: Observer,
    analysis_model: String,
}

impl ChatClient {
    /// Creates a chat session configured by `config`.
    ///
    /// Web grounding is attached to the session when `config.use_search`
    /// is set. Fails with a validation error if the model is blank or the
    /// temperature is out of range. Nothing is sent to the service.
    pub fn create_chat_session(
        &self,
        config: &AgentConfig,
    ) -> Result<ChatSession, Error> {
        if let Err(reason) = config.validate() {
            let err = Error::validation(Operation::CreateSession, reason);
            return Err(self.observer.report_failure(err));
        }

        let tools = if config.use_search {
            vec![ModelTool::WebSearch]
        } else {
            vec![]
        };
        let system_instruction = Some(config.system_instruction.clone())
            .filter(|s| !s.trim().is_empty());
        let template = ModelRequest {
            model: config.model.clone(),
            system_instruction,
            messages: vec![],
            temperature: Some(config.temperature),
            tools,
        };

        debug!(
            "created a chat session, model = {}, search = {}",
            config.model, config.use_search
        );
        self.observer.emit(ClientEvent::SessionCreated {
            model: config.model.clone(),
            use_search: config.use_search,
        });
        Ok(ChatSession::new(
            self.model_client.clone(),
            self.observer.clone(),
            template,
        ))
    }

    /// Asks the model to analyze `data` and returns its complete answer.
    ///
    /// `data` is wrapped in a fixed instructional prompt and sent as a
    /// single request, unrelated to any chat session. Each call is an
    /// independent request.
    pub async fn analyze_text(&self, data: &str) -> Result<String, Error> {
        let req = ModelRequest {
            model: self.analysis_model.clone(),
            messages: vec![ModelMessage::User(analysis_prompt(data))],
            ..Default::default()
        };

        self.observer.emit(ClientEvent::RequestStarted {
            operation: Operation::AnalyzeText,
        });
        match self.model_client.complete_request(req).await {
            Ok(completion) => {
                debug!("analysis finished: {:?}", completion.finish_reason);
                self.observer.emit(ClientEvent::Completed {
                    operation: Operation::AnalyzeText,
                    chunks: 1,
                });
                Ok(completion.text)
            }
            Err(err) => {
                let err = Error::from_provider(Operation::AnalyzeText, err);
                Err(self.observer.report_failure(err))
            }
        }
    }
}

#[inline]
fn analysis_prompt(data: &str) -> String {
    format!("{ANALYSIS_PROMPT}{data}")
}

#[cfg(test)]
mod tests {
    use gemini_chat_model::ErrorKind;
    use gemini_chat_test_model::{PresetResponse, TestModelProvider};

    use super::*;
    use crate::observer::testing::recording_observer;

    fn config(use_search: bool) -> AgentConfig {
        AgentConfig {
            model: "gemini-test".to_owned(),
            system_instruction: "You are a data analyst.".to_owned(),
            temperature: 0.4,
            use_search,
        }
    }

    #[tokio::test]
    async fn test_session_tools_follow_config() {
        let mut provider = TestModelProvider::default();
        provider.add_response(PresetResponse::with_texts(["ok"]));
        provider.add_response(PresetResponse::with_texts(["ok"]));
        let client =
            ChatClientBuilder::with_model_provider(provider.clone()).build();

        for use_search in [true, false] {
            let mut session =
                client.create_chat_session(&config(use_search)).unwrap();
            let mut stream = session.stream_message("Hi").unwrap();
            while futures_util::StreamExt::next(&mut stream).await.is_some() {}
        }

        let requests = provider.requests();
        assert_eq!(requests[0].tools, [ModelTool::WebSearch]);
        assert!(requests[1].tools.is_empty());
        for req in &requests {
            assert_eq!(req.model, "gemini-test");
            assert_eq!(req.temperature, Some(0.4));
            assert_eq!(
                req.system_instruction.as_deref(),
                Some("You are a data analyst.")
            );
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let provider = TestModelProvider::default();
        let (observer, events) = recording_observer();
        let client = ChatClientBuilder::with_model_provider(provider)
            .with_observer(observer)
            .build();

        let err = client
            .create_chat_session(&AgentConfig {
                temperature: 3.0,
                ..config(false)
            })
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.operation(), Operation::CreateSession);
        assert!(matches!(
            events.lock().unwrap()[..],
            [ClientEvent::Failed { .. }]
        ));
    }

    #[test]
    fn test_session_created_event() {
        let (observer, events) = recording_observer();
        let client =
            ChatClientBuilder::with_model_provider(TestModelProvider::default())
                .with_observer(observer)
                .build();
        let session = client.create_chat_session(&config(true)).unwrap();
        assert_eq!(session.model(), "gemini-test");
        assert_eq!(
            events.lock().unwrap()[..],
            [ClientEvent::SessionCreated {
                model: "gemini-test".to_owned(),
                use_search: true,
            }]
        );
    }

    #[tokio::test]
    async fn test_analyze_text_is_stateless() {
        let mut provider = TestModelProvider::default();
        provider.add_response(PresetResponse::with_texts(["Sales ", "rose."]));
        provider.add_response(PresetResponse::with_texts(["Sales rose 4%."]));
        let client = ChatClientBuilder::with_model_provider(provider.clone())
            .with_analysis_model("gemini-analysis")
            .build();

        let first = client.analyze_text("q1=100, q2=104").await.unwrap();
        let second = client.analyze_text("q1=100, q2=104").await.unwrap();
        assert_eq!(first, "Sales rose.");
        assert_eq!(second, "Sales rose 4%.");

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], requests[1]);
        let req = &requests[0];
        assert_eq!(req.model, "gemini-analysis");
        assert!(req.tools.is_empty());
        assert!(req.system_instruction.is_none());
        let [ModelMessage::User(prompt)] = &req.messages[..] else {
            panic!("expected a single user message");
        };
        assert!(prompt.starts_with(ANALYSIS_PROMPT));
        assert!(prompt.ends_with("q1=100, q2=104"));
    }

    #[tokio::test]
    async fn test_analyze_text_propagates_errors() {
        let mut provider = TestModelProvider::default();
        provider.add_response(PresetResponse::rejected("quota exceeded"));
        let (observer, events) = recording_observer();
        let client = ChatClientBuilder::with_model_provider(provider.clone())
            .with_observer(observer)
            .build();

        let err = client.analyze_text("data").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.operation(), Operation::AnalyzeText);
        assert!(err.to_string().contains("quota exceeded"));
        // No retry.
        assert_eq!(provider.request_count(), 1);
        assert!(events.lock().unwrap().iter().any(|e| matches!(
            e,
            ClientEvent::Failed {
                operation: Operation::AnalyzeText,
                kind: ErrorKind::Transport,
                ..
            }
        )));
    }
}
