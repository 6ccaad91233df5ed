use gemini_chat_model::ApiKey;

const DEFAULT_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta";

/// Builder for [`GeminiConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeminiConfigBuilder {
    api_key: ApiKey,
    base_url: Option<String>,
}

impl GeminiConfigBuilder {
    /// Creates a builder with the given API key.
    #[inline]
    pub fn with_api_key(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: None,
        }
    }

    /// Sets a custom base URL, e.g. a proxy or a regional endpoint.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> GeminiConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        GeminiConfig {
            api_key: self.api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

/// Configuration for the Gemini provider.
///
/// The API key is redacted from the `Debug` output.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GeminiConfig {
    pub(crate) api_key: ApiKey,
    pub(crate) base_url: String,
}

impl GeminiConfig {
    /// Returns the URL of a model method, e.g. `generateContent`.
    ///
    /// Both `gemini-2.5-flash` and `models/gemini-2.5-flash` are accepted
    /// as the model identifier.
    pub(crate) fn endpoint(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{model}:{method}", self.base_url)
    }
}
