use crate::error::{config_error, Error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, warn};

/// Summary returned when no supported language key is present at all
pub const UNKNOWN_EVENT: &str = "Unknown Event";

/// Languages the dataset provides summaries in, in fallback-scan order
pub const SUPPORTED_LANGUAGES: [Language; 4] =
    [Language::En, Language::Fr, Language::De, Language::Lb];

/// A summary language supported by the holiday dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    #[default]
    En,
    Fr,
    De,
    Lb,
}

impl Language {
    /// The uppercase key used by the dataset payload
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Fr => "FR",
            Language::De => "DE",
            Language::Lb => "LB",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EN" => Ok(Language::En),
            "FR" => Ok(Language::Fr),
            "DE" => Ok(Language::De),
            "LB" => Ok(Language::Lb),
            other => Err(config_error(&format!(
                "Unsupported language '{}', expected one of EN, FR, DE, LB",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Language {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(value: Language) -> Self {
        value.as_str().to_string()
    }
}

/// Pick the best summary string based on preferred language and fallback.
///
/// The order is significant: preferred language, then English, then the
/// first hit in [`SUPPORTED_LANGUAGES`], then [`UNKNOWN_EVENT`]. Lookups are
/// case-sensitive against the payload's uppercase keys.
pub fn resolve_summary(summaries: &HashMap<String, Value>, preferred: Language) -> String {
    // 1. Try the preferred language
    if let Some(summary) = summaries.get(preferred.as_str()).and_then(Value::as_str) {
        return summary.to_string();
    }

    // 2. Try the primary fallback (English 'EN')
    if let Some(summary) = summaries.get(Language::En.as_str()).and_then(Value::as_str) {
        debug!(
            "Summary missing for {}, falling back to {}",
            preferred,
            Language::En
        );
        return summary.to_string();
    }

    // 3. Try any available supported language as a last resort
    for lang in SUPPORTED_LANGUAGES {
        if let Some(summary) = summaries.get(lang.as_str()).and_then(Value::as_str) {
            warn!(
                "Summary missing for {} and EN, using available language {}",
                preferred, lang
            );
            return summary.to_string();
        }
    }

    // 4. Final fallback
    error!("No valid summary found in any supported language for event data");
    UNKNOWN_EVENT.to_string()
}
