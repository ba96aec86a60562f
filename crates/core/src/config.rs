use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpq::catalog::{Catalog, CatalogError};
use crate::documents::DocumentSettings;

pub const DEFAULT_POSTAL_BASE_URL: &str = "https://viacep.com.br/ws";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub postal: PostalConfig,
    pub documents: DocumentSettings,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Replacement catalog file; the built-in catalog is used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostalConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub catalog_path: Option<PathBuf>,
    pub postal_base_url: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            postal: PostalConfig {
                base_url: DEFAULT_POSTAL_BASE_URL.to_string(),
                timeout_secs: 5,
            },
            documents: DocumentSettings::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("expoquote.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// The configured catalog file, or the built-in catalog.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        Catalog::load_or_builtin(self.catalog.path.as_deref())
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(catalog) = patch.catalog {
            if let Some(path) = catalog.path {
                self.catalog.path = Some(path);
            }
        }

        if let Some(postal) = patch.postal {
            if let Some(base_url) = postal.base_url {
                self.postal.base_url = base_url;
            }
            if let Some(timeout_secs) = postal.timeout_secs {
                self.postal.timeout_secs = timeout_secs;
            }
        }

        if let Some(documents) = patch.documents {
            if let Some(company_name) = documents.company_name {
                self.documents.company_name = company_name;
            }
            if let Some(tagline) = documents.tagline {
                self.documents.tagline = tagline;
            }
            if let Some(validity_days) = documents.validity_days {
                self.documents.validity_days = validity_days;
            }
            if let Some(sales_whatsapp) = documents.sales_whatsapp {
                self.documents.sales_whatsapp = Some(sales_whatsapp);
            }
            if let Some(sales_email) = documents.sales_email {
                self.documents.sales_email = Some(sales_email);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("EXPOQUOTE_CATALOG_PATH") {
            self.catalog.path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("EXPOQUOTE_POSTAL_BASE_URL") {
            self.postal.base_url = value;
        }
        if let Some(value) = read_env("EXPOQUOTE_POSTAL_TIMEOUT_SECS") {
            self.postal.timeout_secs = parse_u64("EXPOQUOTE_POSTAL_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("EXPOQUOTE_DOCUMENTS_COMPANY_NAME") {
            self.documents.company_name = value;
        }
        if let Some(value) = read_env("EXPOQUOTE_DOCUMENTS_TAGLINE") {
            self.documents.tagline = value;
        }
        if let Some(value) = read_env("EXPOQUOTE_DOCUMENTS_VALIDITY_DAYS") {
            self.documents.validity_days =
                parse_u32("EXPOQUOTE_DOCUMENTS_VALIDITY_DAYS", &value)?;
        }
        if let Some(value) = read_env("EXPOQUOTE_DOCUMENTS_SALES_WHATSAPP") {
            self.documents.sales_whatsapp = Some(value);
        }
        if let Some(value) = read_env("EXPOQUOTE_DOCUMENTS_SALES_EMAIL") {
            self.documents.sales_email = Some(value);
        }

        let log_level =
            read_env("EXPOQUOTE_LOGGING_LEVEL").or_else(|| read_env("EXPOQUOTE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("EXPOQUOTE_LOGGING_FORMAT").or_else(|| read_env("EXPOQUOTE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog.path = Some(catalog_path);
        }
        if let Some(postal_base_url) = overrides.postal_base_url {
            self.postal.base_url = postal_base_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_postal(&self.postal)?;
        validate_documents(&self.documents)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("expoquote.toml"), PathBuf::from("config/expoquote.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_postal(postal: &PostalConfig) -> Result<(), ConfigError> {
    let base_url = postal.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "postal.base_url must start with http:// or https://".to_string(),
        ));
    }

    if postal.timeout_secs == 0 || postal.timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "postal.timeout_secs must be in range 1..=60".to_string(),
        ));
    }

    Ok(())
}

fn validate_documents(documents: &DocumentSettings) -> Result<(), ConfigError> {
    if documents.company_name.trim().is_empty() {
        return Err(ConfigError::Validation("documents.company_name is required".to_string()));
    }

    if documents.validity_days == 0 || documents.validity_days > 365 {
        return Err(ConfigError::Validation(
            "documents.validity_days must be in range 1..=365".to_string(),
        ));
    }

    if let Some(whatsapp) = &documents.sales_whatsapp {
        let digits = whatsapp.chars().filter(char::is_ascii_digit).count();
        if digits < 10 {
            return Err(ConfigError::Validation(
                "documents.sales_whatsapp must carry country and area code (at least 10 digits)"
                    .to_string(),
            ));
        }
    }

    if let Some(email) = &documents.sales_email {
        if !email.contains('@') {
            return Err(ConfigError::Validation(
                "documents.sales_email must be an e-mail address".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    catalog: Option<CatalogPatch>,
    postal: Option<PostalPatch>,
    documents: Option<DocumentsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct PostalPatch {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentsPatch {
    company_name: Option<String>,
    tagline: Option<String>,
    validity_days: Option<u32>,
    sales_whatsapp: Option<String>,
    sales_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid_without_a_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;

        let config = AppConfig::load(LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.postal.base_url == "https://viacep.com.br/ws", "viacep is the default")?;
        ensure(config.documents.validity_days == 30, "quotes are valid for 30 days by default")?;
        ensure(config.catalog.path.is_none(), "built-in catalog by default")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "compact logs by default")
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("expoquote.toml");

        let result = AppConfig::load(LoadOptions {
            config_path: Some(missing.clone()),
            require_file: true,
            ..LoadOptions::default()
        });
        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(ref path)) if path == &missing),
            "missing required file should be reported",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SALES_EMAIL", "vendas@example.com");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("expoquote.toml");
            fs::write(
                &path,
                r#"
[documents]
sales_email = "${TEST_SALES_EMAIL}"
sales_whatsapp = "5511991964667"
validity_days = 15
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.documents.sales_email.as_deref() == Some("vendas@example.com"),
                "sales e-mail should be interpolated from the environment",
            )?;
            ensure(config.documents.validity_days == 15, "validity should come from the file")?;
            Ok(())
        })();

        clear_vars(&["TEST_SALES_EMAIL"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("EXPOQUOTE_LOG_LEVEL", "warn");
        env::set_var("EXPOQUOTE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["EXPOQUOTE_LOG_LEVEL", "EXPOQUOTE_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("EXPOQUOTE_POSTAL_BASE_URL", "https://cep.from-env.test/ws");
        env::set_var("EXPOQUOTE_DOCUMENTS_COMPANY_NAME", "Env Cenografia");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("expoquote.toml");
            fs::write(
                &path,
                r#"
[catalog]
path = "catalog/from-file.toml"

[postal]
base_url = "https://cep.from-file.test/ws"
timeout_secs = 9

[documents]
company_name = "File Cenografia"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    catalog_path: Some(PathBuf::from("catalog/override.toml")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.catalog.path.as_deref() == Some(PathBuf::from("catalog/override.toml").as_path()),
                "override catalog path should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.postal.base_url == "https://cep.from-env.test/ws",
                "env postal url should win over file and defaults",
            )?;
            ensure(config.postal.timeout_secs == 9, "file timeout should win over defaults")?;
            ensure(
                config.documents.company_name == "Env Cenografia",
                "env company name should win over file",
            )?;
            Ok(())
        })();

        clear_vars(&["EXPOQUOTE_POSTAL_BASE_URL", "EXPOQUOTE_DOCUMENTS_COMPANY_NAME"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("EXPOQUOTE_POSTAL_TIMEOUT_SECS", "600");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("postal.timeout_secs")
            );
            ensure(has_message, "validation failure should mention postal.timeout_secs")
        })();

        clear_vars(&["EXPOQUOTE_POSTAL_TIMEOUT_SECS"]);
        result
    }

    #[test]
    fn malformed_numeric_env_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("EXPOQUOTE_DOCUMENTS_VALIDITY_DAYS", "thirty");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(&["EXPOQUOTE_DOCUMENTS_VALIDITY_DAYS"]);

        ensure(
            matches!(
                result,
                Err(ConfigError::InvalidEnvOverride { ref key, .. })
                    if key == "EXPOQUOTE_DOCUMENTS_VALIDITY_DAYS"
            ),
            "invalid numeric env var should name the key",
        )
    }

    #[test]
    fn short_sales_whatsapp_is_rejected() {
        let mut config = AppConfig::default();
        config.documents.sales_whatsapp = Some("99196".to_string());

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(ref message)) if message.contains("sales_whatsapp")
        ));
    }
}
