use crate::error::{env_error, AppResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use toml;

/// Default number of days an event counts as "upcoming" (inclusive far end)
pub const DEFAULT_UPCOMING_WINDOW_DAYS: i64 = 7;

/// Default wall-clock time for the daily reminder pass
pub const DEFAULT_REMINDER_TIME: &str = "09:00";

/// Default countdown refresh cadence in seconds
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 1;

/// Main configuration structure for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Redis connection URL for the storage actor
    pub redis_url: String,
    /// Storage backend selector ("redis" or "memory")
    pub storage_backend: String,
    /// Timezone used to resolve "today" (IANA name, e.g. "America/New_York")
    pub timezone: String,
    /// Events this many days out (inclusive) still count as upcoming
    pub upcoming_window_days: i64,
    /// Countdown refresh cadence in seconds
    pub tick_interval_secs: u64,
    /// Time of day (HH:MM) for the daily reminder pass
    pub reminder_time: String,
    /// Transactional email API endpoint
    pub email_api_url: Option<String>,
    /// API key for the email endpoint
    pub email_api_key: Option<String>,
    /// Sender address for reminder emails
    pub email_from: Option<String>,
    /// Recipient address for reminder emails
    pub email_to: Option<String>,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| String::from("redis://127.0.0.1:6379"));

        let storage_backend =
            env::var("STORAGE_BACKEND").unwrap_or_else(|_| String::from("redis"));

        // Default timezone
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));

        // Parse numeric values
        let upcoming_window_days = match env::var("UPCOMING_WINDOW_DAYS") {
            Ok(value) => value
                .parse::<i64>()
                .map_err(|_| env_error("Invalid UPCOMING_WINDOW_DAYS format"))?,
            Err(_) => DEFAULT_UPCOMING_WINDOW_DAYS,
        };

        let tick_interval_secs = match env::var("TICK_INTERVAL_SECS") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| env_error("Invalid TICK_INTERVAL_SECS format"))?,
            Err(_) => DEFAULT_TICK_INTERVAL_SECS,
        };

        let reminder_time =
            env::var("REMINDER_TIME").unwrap_or_else(|_| String::from(DEFAULT_REMINDER_TIME));

        // Email settings are optional; reminders stay disabled without them
        let email_api_url = env::var("EMAIL_API_URL").ok();
        let email_api_key = env::var("EMAIL_API_KEY").ok();
        let email_from = env::var("EMAIL_FROM").ok();
        let email_to = env::var("EMAIL_TO").ok();

        // Initialize default components
        let mut components = HashMap::new();
        components.insert("events".to_string(), true);
        components.insert("reminders".to_string(), true);

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
            redis_url,
            storage_backend,
            timezone,
            upcoming_window_days,
            tick_interval_secs,
            reminder_time,
            email_api_url,
            email_api_key,
            email_from,
            email_to,
            components,
        })
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }

    /// Update component enabled status
    #[allow(dead_code)]
    pub fn set_component_enabled(&mut self, name: &str, enabled: bool) -> AppResult<()> {
        self.components.insert(name.to_string(), enabled);
        self.save_components()
    }

    /// Whether all settings needed for email dispatch are present
    pub fn email_configured(&self) -> bool {
        self.email_api_url.is_some()
            && self.email_api_key.is_some()
            && self.email_from.is_some()
            && self.email_to.is_some()
    }

    /// Save component configuration to file
    #[allow(dead_code)]
    fn save_components(&self) -> AppResult<()> {
        // Create config directory if it doesn't exist
        if !Path::new("config").exists() {
            fs::create_dir("config")?;
        }

        let toml_str = toml::to_string(&self.components)?;
        fs::write("config/components.toml", toml_str)?;

        Ok(())
    }
}

impl Default for Config {
    /// Baseline configuration used by tests and the memory backend
    fn default() -> Self {
        let mut components = HashMap::new();
        components.insert("events".to_string(), true);
        components.insert("reminders".to_string(), true);

        Config {
            redis_url: String::from("redis://127.0.0.1:6379"),
            storage_backend: String::from("memory"),
            timezone: String::from("UTC"),
            upcoming_window_days: DEFAULT_UPCOMING_WINDOW_DAYS,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            reminder_time: String::from(DEFAULT_REMINDER_TIME),
            email_api_url: None,
            email_api_key: None,
            email_from: None,
            email_to: None,
            components,
        }
    }
}
