use gemini_chat_model::{ModelFinishReason, StreamChunk};
use serde::{Deserialize, Serialize};

/// The frames in a preset response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetFrame {
    /// A well-formed frame.
    #[serde(rename = "chunk")]
    Chunk(StreamChunk),
    /// A frame that cannot be decoded. The payload describes why.
    #[serde(rename = "malformed")]
    Malformed(String),
    /// The connection breaks at this point.
    #[serde(rename = "transport_error")]
    TransportError(String),
}

/// The preset response for one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Frames in this response.
    pub frames: Vec<PresetFrame>,
    /// The finish reason reported after the last frame.
    pub finish_reason: Option<ModelFinishReason>,
    /// If set, the request itself fails with this message and no frames
    /// are produced.
    pub rejection: Option<String>,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified frames, finishing
    /// with [`ModelFinishReason::Stop`].
    #[inline]
    pub fn with_frames(frames: impl Into<Vec<PresetFrame>>) -> Self {
        Self {
            frames: frames.into(),
            finish_reason: Some(ModelFinishReason::Stop),
            rejection: None,
        }
    }

    /// Creates a `PresetResponse` with one plain text frame per item.
    #[inline]
    pub fn with_texts<S: AsRef<str>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self::with_frames(
            texts
                .into_iter()
                .map(|text| {
                    PresetFrame::Chunk(StreamChunk::with_text(text.as_ref()))
                })
                .collect::<Vec<_>>(),
        )
    }

    /// Creates a `PresetResponse` whose request is rejected by the remote
    /// service.
    #[inline]
    pub fn rejected<S: Into<String>>(message: S) -> Self {
        Self {
            frames: vec![],
            finish_reason: None,
            rejection: Some(message.into()),
        }
    }

    /// Sets the finish reason reported after the last frame.
    #[inline]
    pub fn with_finish_reason(
        mut self,
        finish_reason: Option<ModelFinishReason>,
    ) -> Self {
        self.finish_reason = finish_reason;
        self
    }
}
