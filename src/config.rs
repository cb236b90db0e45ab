use crate::components::holiday_calendar::Language;
use crate::error::{config_error, CalResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use url::Url;

/// Published school-holidays dataset on the Luxembourg open-data portal
pub const DEFAULT_URL: &str =
    "https://data.public.lu/en/datasets/r/4902766f-1cd3-404c-ab6a-327ec104d564";

/// Default display name for the calendar entity
pub const DEFAULT_CALENDAR_NAME: &str = "School Holidays LU";

/// Main configuration structure for the service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL of the remote holiday dataset (JSON array)
    pub event_url: String,
    /// Preferred language for event summaries
    pub language: Language,
    /// Display name for the calendar entity
    pub calendar_name: String,
    /// Hours between scheduled refreshes
    pub scan_interval_hours: u64,
    /// Per-attempt fetch timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> CalResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        Self::load_with(|var| env::var(var).ok())
    }

    /// Load configuration from the given variable lookup
    fn load_with(lookup: impl Fn(&str) -> Option<String>) -> CalResult<Self> {
        let event_url = lookup("EVENT_URL").unwrap_or_else(|| String::from(DEFAULT_URL));

        // Validate early so a bad URL fails at startup, not on the first tick
        Url::parse(&event_url)
            .map_err(|e| config_error(&format!("Invalid EVENT_URL '{}': {}", event_url, e)))?;

        // The dataset keys summaries by uppercase language code; parsing
        // normalizes whatever casing the environment supplies.
        let language = match lookup("LANGUAGE") {
            Some(value) => value.parse::<Language>()?,
            None => Language::default(),
        };

        let calendar_name =
            lookup("CALENDAR_NAME").unwrap_or_else(|| String::from(DEFAULT_CALENDAR_NAME));

        // The dataset changes a handful of times a year; daily polling matches it
        let scan_interval_hours = match lookup("SCAN_INTERVAL_HOURS") {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| config_error("Invalid SCAN_INTERVAL_HOURS format"))?,
            None => 24,
        };

        let fetch_timeout_secs = match lookup("FETCH_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .map_err(|_| config_error("Invalid FETCH_TIMEOUT_SECS format"))?,
            None => 20,
        };

        // Initialize default components
        let mut components = HashMap::new();
        components.insert("holiday_calendar".to_string(), true);

        // Load components configuration from file if it exists
        if let Ok(content) = fs::read_to_string("config/components.toml") {
            if let Ok(file_components) = toml::from_str::<HashMap<String, bool>>(&content) {
                // Merge with defaults
                for (key, value) in file_components {
                    components.insert(key, value);
                }
            }
        }

        Ok(Config {
            event_url,
            language,
            calendar_name,
            scan_interval_hours,
            fetch_timeout_secs,
            components,
        })
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_url: String::from(DEFAULT_URL),
            language: Language::default(),
            calendar_name: String::from(DEFAULT_CALENDAR_NAME),
            scan_interval_hours: 24,
            fetch_timeout_secs: 20,
            components: HashMap::from([(String::from("holiday_calendar"), true)]),
        }
    }
}
