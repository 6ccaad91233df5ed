/// A request to be sent to the model provider.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModelRequest {
    /// Identifier of the model to sample from.
    pub model: String,
    /// The system instructions, if any.
    pub system_instruction: Option<String>,
    /// The conversation turns, oldest first. The last one is the new
    /// user input.
    pub messages: Vec<ModelMessage>,
    /// Sampling temperature. `None` leaves the service default.
    pub temperature: Option<f32>,
    /// Tools that are available to the model.
    pub tools: Vec<ModelTool>,
}

/// A complete conversation turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelMessage {
    /// A user input text.
    User(String),
    /// A reply produced by the model.
    Assistant(String),
}

impl ModelMessage {
    /// Returns the text of this turn.
    #[inline]
    pub fn text(&self) -> &str {
        match self {
            ModelMessage::User(text) | ModelMessage::Assistant(text) => text,
        }
    }
}

/// A built-in tool of the remote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelTool {
    /// Lets the model ground its answer with web search results.
    WebSearch,
}
