//! Supported languages and localized content records
//!
//! Catalog text is keyed by a closed set of language codes. Lookups never
//! fail while at least one translation exists: the requested language falls
//! back to [`Language::DEFAULT`], then to the first translation present in
//! [`Language::ALL`] order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Visitor-facing language
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// French (museum default)
    Fr,
    /// English
    En,
    /// Wolof
    Wo,
}

impl Language {
    /// Language used when a translation is missing
    pub const DEFAULT: Language = Language::Fr;

    /// Every supported language, in fallback order after the default
    pub const ALL: [Language; 3] = [Language::Fr, Language::En, Language::Wo];

    /// ISO code used on the wire
    pub fn code(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
            Language::Wo => "wo",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::DEFAULT
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Language::Fr),
            "en" => Ok(Language::En),
            "wo" => Ok(Language::Wo),
            _ => Err(crate::Error::UnsupportedLanguage(s.trim().to_string())),
        }
    }
}

/// Localized record: one `T` per language that supplied a translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Localized<T>(BTreeMap<Language, T>);

impl<T> Localized<T> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add or replace the translation for `language`
    pub fn with(mut self, language: Language, value: T) -> Self {
        self.0.insert(language, value);
        self
    }

    /// Translation for `language`, following the fallback chain
    pub fn get(&self, language: Language) -> Option<&T> {
        self.0
            .get(&language)
            .or_else(|| self.0.get(&Language::DEFAULT))
            .or_else(|| Language::ALL.iter().find_map(|l| self.0.get(l)))
    }

    /// Translation for exactly `language`, without fallback
    pub fn exact(&self, language: Language) -> Option<&T> {
        self.0.get(&language)
    }

    /// Supported languages this record has no translation for
    pub fn missing(&self) -> Vec<Language> {
        Language::ALL
            .iter()
            .copied()
            .filter(|l| !self.0.contains_key(l))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T> Default for Localized<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_codes() {
        assert_eq!("fr".parse::<Language>().unwrap(), Language::Fr);
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::En);
        assert_eq!("wo".parse::<Language>().unwrap(), Language::Wo);
        assert!(matches!(
            "de".parse::<Language>(),
            Err(crate::Error::UnsupportedLanguage(code)) if code == "de"
        ));
    }

    #[test]
    fn test_exact_translation_preferred() {
        let text = Localized::new()
            .with(Language::Fr, "Bonjour")
            .with(Language::En, "Hello");
        assert_eq!(text.get(Language::En), Some(&"Hello"));
    }

    #[test]
    fn test_missing_translation_falls_back_to_default() {
        let text = Localized::new()
            .with(Language::Fr, "Bonjour")
            .with(Language::En, "Hello");
        assert_eq!(text.get(Language::Wo), Some(&"Bonjour"));
        assert_eq!(text.missing(), vec![Language::Wo]);
    }

    #[test]
    fn test_fallback_without_default_uses_first_available() {
        let text = Localized::new().with(Language::Wo, "Salaam");
        assert_eq!(text.get(Language::En), Some(&"Salaam"));
        assert_eq!(text.exact(Language::En), None);
    }

    #[test]
    fn test_serde_uses_language_codes_as_keys() {
        let json = r#"{"fr": "Salle", "wo": "Néeg"}"#;
        let text: Localized<String> = serde_json::from_str(json).unwrap();
        assert_eq!(text.get(Language::Wo).map(String::as_str), Some("Néeg"));
        assert_eq!(text.missing(), vec![Language::En]);
    }
}
