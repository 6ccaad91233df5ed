//! Conversation-related types.

use gemini_chat_model::ModelMessage;

/// The turns a chat session has committed so far.
///
/// The remote API keeps no state between requests, so every message is
/// sent together with the turns before it. A turn pair is only committed
/// once its reply has been received completely.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Conversation {
    pub(crate) messages: Vec<ModelMessage>,
}

impl Conversation {
    /// Returns the committed turns, oldest first.
    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Returns the number of committed turns.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if nothing has been committed yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn commit_exchange(&mut self, input: String, reply: String) {
        self.messages.push(ModelMessage::User(input));
        self.messages.push(ModelMessage::Assistant(reply));
    }
}
