//! Site settings store
//!
//! Closed store for the handful of values every request depends on. Its
//! setters are defensive: a malformed host or language code is dropped and
//! the previous value stays in place.

use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

use super::Store;

/// Keys of the settings store
pub const SETTINGS_KEYS: [&str; 5] = ["host", "lang", "locale", "direction", "title"];

/// Languages written right-to-left
const RTL_LANGUAGES: [&str; 12] = [
    "ar", "arc", "dv", "fa", "ha", "he", "khw", "ks", "ku", "ps", "ur", "yi",
];

fn host_pattern() -> &'static Regex {
    static HOST: OnceLock<Regex> = OnceLock::new();
    HOST.get_or_init(|| {
        Regex::new(r"^https?://[^\s/?#:]+(:\d+)?(/[^\s]*)?$").expect("host pattern is valid")
    })
}

fn lang_pattern() -> &'static Regex {
    static LANG: OnceLock<Regex> = OnceLock::new();
    LANG.get_or_init(|| {
        Regex::new(r"^([A-Za-z]{2,3})(?:[-_]([A-Za-z]{2}))?$").expect("lang pattern is valid")
    })
}

fn locale_pattern() -> &'static Regex {
    static LOCALE: OnceLock<Regex> = OnceLock::new();
    LOCALE.get_or_init(|| Regex::new(r"^[a-z]{2,3}(_[A-Z]{2})?$").expect("locale pattern is valid"))
}

/// Text direction for a primary language code
pub fn direction_for(lang: &str) -> &'static str {
    if RTL_LANGUAGES.contains(&lang) {
        "rtl"
    } else {
        "ltr"
    }
}

/// Split a language code into its normalised primary code and locale
pub fn normalize_language(code: &str) -> Option<(String, String)> {
    let caps = lang_pattern().captures(code.trim())?;
    let primary = caps.get(1)?.as_str().to_lowercase();
    let locale = match caps.get(2) {
        Some(region) => format!("{}_{}", primary, region.as_str().to_uppercase()),
        None => primary.clone(),
    };
    Some((primary, locale))
}

/// Build the settings store.
///
/// `is_valid_language` is the transport's language predicate; codes it does
/// not accept are rejected by the `lang` setter.
pub fn settings_store(is_valid_language: impl Fn(&str) -> bool + 'static) -> Store {
    Store::closed(
        "settings",
        [
            ("host", Value::Null),
            ("lang", Value::Null),
            ("locale", Value::Null),
            ("direction", json!("ltr")),
            ("title", Value::Null),
        ],
    )
    .with_setter("host", |value| {
        let host = value.as_str()?.trim().trim_end_matches('/');
        host_pattern()
            .is_match(host)
            .then(|| vec![("host".to_string(), json!(host))])
    })
    .with_setter("lang", move |value| {
        let (lang, locale) = normalize_language(value.as_str()?)?;
        if !is_valid_language(&lang) {
            return None;
        }
        let direction = direction_for(&lang);
        Some(vec![
            ("lang".to_string(), json!(lang)),
            ("locale".to_string(), json!(locale)),
            ("direction".to_string(), json!(direction)),
        ])
    })
    .with_setter("locale", |value| {
        let locale = value.as_str()?;
        locale_pattern()
            .is_match(locale)
            .then(|| vec![("locale".to_string(), json!(locale))])
    })
    .with_setter("direction", |value| match value.as_str()? {
        dir @ ("ltr" | "rtl") => Some(vec![("direction".to_string(), json!(dir))]),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        settings_store(|code| matches!(code, "en" | "de" | "ar"))
    }

    #[test]
    fn test_lang_derives_locale_and_direction() {
        let s = store();
        assert!(s.set("lang", json!("de-at")));
        assert_eq!(s.get_str("lang").as_deref(), Some("de"));
        assert_eq!(s.get_str("locale").as_deref(), Some("de_AT"));
        assert_eq!(s.get_str("direction").as_deref(), Some("ltr"));

        assert!(s.set("lang", json!("ar")));
        assert_eq!(s.get_str("locale").as_deref(), Some("ar"));
        assert_eq!(s.get_str("direction").as_deref(), Some("rtl"));
    }

    #[test]
    fn test_unknown_language_is_dropped() {
        let s = store();
        s.set("lang", json!("en"));
        assert!(!s.set("lang", json!("fr")));
        assert!(!s.set("lang", json!("not a code")));
        assert_eq!(s.get_str("lang").as_deref(), Some("en"));
    }

    #[test]
    fn test_host_must_be_url() {
        let s = store();
        assert!(s.set("host", json!("https://example.com/")));
        assert_eq!(s.get_str("host").as_deref(), Some("https://example.com"));
        assert!(!s.set("host", json!("example.com")));
        assert!(!s.set("host", json!(42)));
        assert_eq!(s.get_str("host").as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_locale_format() {
        let s = store();
        assert!(s.set("locale", json!("en_US")));
        assert!(!s.set("locale", json!("en-us")));
        assert_eq!(s.get_str("locale").as_deref(), Some("en_US"));
    }

    #[test]
    fn test_closed_key_set() {
        let s = store();
        assert!(!s.set("theme", json!("dark")));
        assert_eq!(s.keys().len(), SETTINGS_KEYS.len());
    }
}
