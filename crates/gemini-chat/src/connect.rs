use std::env;

use gemini_chat_api::{GeminiConfigBuilder, GeminiProvider};
use gemini_chat_core::credentials::resolve_api_key_with;
use gemini_chat_core::{ChatClient, ChatClientBuilder, Error, Observer};

/// Environment variable overriding the Gemini API base URL.
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";

/// Builds a [`ChatClient`] for the Gemini API from the process
/// environment.
///
/// See [`connect_with`].
#[inline]
pub fn connect(observer: Observer) -> Result<ChatClient, Error> {
    connect_with(|name| env::var(name).ok(), observer)
}

/// Builds a [`ChatClient`] for the Gemini API, reading variables through
/// `lookup`.
///
/// The API key comes from the first non-blank of
/// [`API_KEY_VARS`](gemini_chat_core::credentials::API_KEY_VARS). If none
/// is set this fails with a configuration error and no HTTP client is
/// created. [`BASE_URL_VAR`] optionally points the client at another
/// endpoint.
pub fn connect_with(
    lookup: impl Fn(&str) -> Option<String>,
    observer: Observer,
) -> Result<ChatClient, Error> {
    let api_key = resolve_api_key_with(&lookup, &observer)?;

    let mut config = GeminiConfigBuilder::with_api_key(api_key);
    if let Some(base_url) =
        lookup(BASE_URL_VAR).filter(|url| !url.trim().is_empty())
    {
        debug!("using base URL {base_url}");
        config = config.with_base_url(base_url);
    }
    let provider = GeminiProvider::new(config.build());

    Ok(ChatClientBuilder::with_model_provider(provider)
        .with_observer(observer)
        .build())
}
