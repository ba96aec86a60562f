pub mod catalog;
pub mod config;
pub mod doctor;
pub mod export;
pub mod list;
pub mod lookup;
pub mod summary;

use std::fs;
use std::path::Path;

use chrono::Utc;
use expoquote_core::config::{AppConfig, ConfigError, LoadOptions};
use expoquote_core::store::SystemClock;
use expoquote_core::{ApplicationError, Quote, QuoteStore};
use serde::Serialize;
use tracing::info;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_BAD_REQUEST: u8 = 3;
pub const EXIT_UNAVAILABLE: u8 = 4;
pub const EXIT_INTERNAL: u8 = 5;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Plain text written as-is.
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    /// Pretty JSON of a command's data payload.
    pub fn json<T: Serialize>(command: &str, payload: &T) -> Self {
        match serde_json::to_string_pretty(payload) {
            Ok(output) => Self { exit_code: 0, output },
            Err(error) => Self::failure(command, "serialization", error.to_string(), EXIT_INTERNAL),
        }
    }

    pub fn from_error(command: &str, error: ApplicationError) -> Self {
        let correlation_id = correlation_id();
        let interface = error.into_interface(correlation_id.clone());
        let exit_code = match interface.error_class() {
            "bad_request" => EXIT_BAD_REQUEST,
            "service_unavailable" => EXIT_UNAVAILABLE,
            _ => EXIT_INTERNAL,
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(interface.error_class().to_string()),
            message: format!("{} {}", interface.user_message(), interface.message()),
            correlation_id: Some(correlation_id),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn config_failure(command: &str, error: &ConfigError) -> Self {
        Self::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    }
}

pub fn load_config(options: &LoadOptions) -> Result<AppConfig, ConfigError> {
    AppConfig::load(options.clone())
}

/// Reads a JSON array of quotes and restores it into a store.
pub fn load_store(path: &Path) -> Result<QuoteStore, ApplicationError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        ApplicationError::Input(format!("could not read `{}`: {error}", path.display()))
    })?;
    let quotes = serde_json::from_str::<Vec<Quote>>(&raw).map_err(|error| {
        ApplicationError::Input(format!("could not parse `{}`: {error}", path.display()))
    })?;
    let store = QuoteStore::restore(quotes, SystemClock)?;

    info!(
        event_name = "cli.quotes.loaded",
        path = %path.display(),
        quotes = store.len(),
        "quotes restored from file"
    );
    Ok(store)
}

fn correlation_id() -> String {
    format!("cli-{}", Utc::now().format("%Y%m%dT%H%M%S%3f"))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
