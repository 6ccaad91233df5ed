use gemini_chat_model::{
    GroundingChunk, ModelCompletion, ModelFinishReason, ModelMessage,
    ModelRequest, ModelTool, StreamChunk,
};
use serde::{Deserialize, Serialize};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ServiceError {
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ServiceError,
}

/// A decoded SSE event. The service reports failures that happen after
/// the stream has started as an `error` object in the event data.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StreamFrame {
    Error(ErrorEnvelope),
    Response(GenerateContentResponse),
}

impl GenerateContentResponse {
    #[inline]
    fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Concatenates the text parts of the first candidate, leaving out
    /// thought summaries.
    pub fn text(&self) -> String {
        self.first_candidate()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|part| part.thought != Some(true))
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn grounding_chunks(&self) -> Vec<GroundingChunk> {
        self.first_candidate()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| m.grounding_chunks.clone())
            .unwrap_or_default()
    }

    pub fn finish_reason(&self) -> Option<ModelFinishReason> {
        self.first_candidate()
            .and_then(|c| c.finish_reason.as_deref())
            .map(parse_finish_reason)
    }

    #[inline]
    pub fn to_chunk(&self) -> StreamChunk {
        StreamChunk {
            text: self.text(),
            grounding_chunks: self.grounding_chunks(),
        }
    }

    #[inline]
    pub fn to_completion(&self) -> ModelCompletion {
        ModelCompletion {
            text: self.text(),
            grounding_chunks: self.grounding_chunks(),
            finish_reason: self.finish_reason(),
        }
    }
}

fn parse_finish_reason(reason: &str) -> ModelFinishReason {
    match reason {
        "STOP" => ModelFinishReason::Stop,
        "MAX_TOKENS" => ModelFinishReason::MaxTokens,
        "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII" => {
            ModelFinishReason::Safety
        }
        "RECITATION" => ModelFinishReason::Recitation,
        _ => ModelFinishReason::Other,
    }
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct GoogleSearch {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    #[serde(skip_serializing_if = "Option::is_none")]
    google_search: Option<GoogleSearch>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(req: &ModelRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: req.messages.iter().map(create_content).collect(),
        system_instruction: req
            .system_instruction
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| Content {
                role: None,
                parts: vec![text_part(s)],
            }),
        generation_config: req.temperature.map(|temperature| {
            GenerationConfig {
                temperature: Some(temperature),
            }
        }),
        tools: req.tools.iter().map(create_tool).collect(),
    }
}

#[inline]
fn text_part(text: &str) -> Part {
    Part {
        text: Some(text.to_owned()),
        thought: None,
    }
}

#[inline]
fn create_content(msg: &ModelMessage) -> Content {
    let role = match msg {
        ModelMessage::User(_) => "user",
        ModelMessage::Assistant(_) => "model",
    };
    Content {
        role: Some(role.to_owned()),
        parts: vec![text_part(msg.text())],
    }
}

#[inline]
fn create_tool(tool: &ModelTool) -> Tool {
    match tool {
        ModelTool::WebSearch => Tool {
            google_search: Some(GoogleSearch {}),
        },
    }
}
