use serde::{Deserialize, Serialize};

/// A source the model cited for a piece of its answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroundingSource {
    /// Location of the source.
    pub uri: Option<String>,
    /// Human readable title of the source.
    pub title: Option<String>,
}

/// A citation attached to a streamed frame.
///
/// Web grounding produces `web` sources, retrieval tools produce
/// `retrieved_context` sources. Either may be absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunk {
    /// A web page used to ground the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<GroundingSource>,
    /// A retrieved document used to ground the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_context: Option<GroundingSource>,
}

impl GroundingChunk {
    /// Returns whichever source is present, preferring `web`.
    #[inline]
    pub fn source(&self) -> Option<&GroundingSource> {
        self.web.as_ref().or(self.retrieved_context.as_ref())
    }
}

/// A piece of a streamed reply, one per network frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamChunk {
    /// Text carried by this frame. May be empty.
    pub text: String,
    /// Citations attached to this frame, in the order the service sent
    /// them.
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

impl StreamChunk {
    /// Creates a chunk with text and no citations.
    #[inline]
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            grounding_chunks: vec![],
        }
    }
}
