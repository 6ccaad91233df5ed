use serde::{Deserialize, Serialize};

/// Per-session settings supplied by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// Identifier of the model, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Instructions that steer every reply in the session. Blank means
    /// none.
    #[serde(default)]
    pub system_instruction: String,
    /// Sampling temperature, within `0.0..=2.0`.
    pub temperature: f32,
    /// Whether the model may ground its answers with web search.
    #[serde(default)]
    pub use_search: bool,
}

impl AgentConfig {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_owned());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            ));
        }
        Ok(())
    }
}
