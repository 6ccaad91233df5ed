//! API key lookup.

use std::env;

use gemini_chat_model::ApiKey;

use crate::error::Error;
use crate::observer::{ClientEvent, Observer};

/// Environment variables holding the API key, in lookup order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Reads the API key from the process environment.
///
/// See [`resolve_api_key_with`].
#[inline]
pub fn resolve_api_key(observer: &Observer) -> Result<ApiKey, Error> {
    resolve_api_key_with(|name| env::var(name).ok(), observer)
}

/// Reads the API key through `lookup`, trying each of [`API_KEY_VARS`]
/// in order. Blank values are skipped.
///
/// Fails with a configuration error if no variable holds a key. There is
/// no fallback to an empty key.
pub fn resolve_api_key_with(
    lookup: impl Fn(&str) -> Option<String>,
    observer: &Observer,
) -> Result<ApiKey, Error> {
    for variable in API_KEY_VARS {
        if let Some(api_key) = lookup(variable).and_then(ApiKey::new) {
            debug!("using API key from {variable}");
            observer.emit(ClientEvent::CredentialResolved { variable });
            return Ok(api_key);
        }
    }

    let err = Error::configuration(format!(
        "no API key found, set {}",
        API_KEY_VARS.join(" or ")
    ));
    Err(observer.report_failure(err))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use gemini_chat_model::ErrorKind;

    use super::*;
    use crate::error::Operation;
    use crate::observer::testing::recording_observer;

    fn lookup_in(
        vars: &[(&str, &str)],
    ) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_missing_key_is_a_configuration_error() {
        let (observer, events) = recording_observer();
        let err = resolve_api_key_with(lookup_in(&[]), &observer).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.operation(), Operation::ResolveCredentials);
        assert!(err.message().contains("GEMINI_API_KEY"));
        assert!(matches!(
            events.lock().unwrap()[..],
            [ClientEvent::Failed {
                kind: ErrorKind::Configuration,
                ..
            }]
        ));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let lookup = lookup_in(&[("GEMINI_API_KEY", "  "), ("API_KEY", "")]);
        let err = resolve_api_key_with(lookup, &Observer::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_lookup_order() {
        let (observer, events) = recording_observer();
        let lookup = lookup_in(&[("GEMINI_API_KEY", "first"), ("API_KEY", "second")]);
        let api_key = resolve_api_key_with(lookup, &observer).unwrap();
        assert_eq!(api_key.expose(), "first");
        assert_eq!(
            events.lock().unwrap()[..],
            [ClientEvent::CredentialResolved {
                variable: "GEMINI_API_KEY"
            }]
        );

        let lookup = lookup_in(&[("API_KEY", "second")]);
        let api_key = resolve_api_key_with(lookup, &Observer::default()).unwrap();
        assert_eq!(api_key.expose(), "second");
    }
}
