use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use expoquote_core::config::{AppConfig, LoadOptions};
use toml::Value;

struct ConfigField {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<ConfigField> {
    let optional = |value: Option<&String>| value.cloned().unwrap_or_else(|| "<unset>".to_string());

    vec![
        ConfigField {
            key: "catalog.path",
            env_keys: &["EXPOQUOTE_CATALOG_PATH"],
            value: config
                .catalog
                .path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "<builtin>".to_string()),
        },
        ConfigField {
            key: "postal.base_url",
            env_keys: &["EXPOQUOTE_POSTAL_BASE_URL"],
            value: config.postal.base_url.clone(),
        },
        ConfigField {
            key: "postal.timeout_secs",
            env_keys: &["EXPOQUOTE_POSTAL_TIMEOUT_SECS"],
            value: config.postal.timeout_secs.to_string(),
        },
        ConfigField {
            key: "documents.company_name",
            env_keys: &["EXPOQUOTE_DOCUMENTS_COMPANY_NAME"],
            value: config.documents.company_name.clone(),
        },
        ConfigField {
            key: "documents.tagline",
            env_keys: &["EXPOQUOTE_DOCUMENTS_TAGLINE"],
            value: config.documents.tagline.clone(),
        },
        ConfigField {
            key: "documents.validity_days",
            env_keys: &["EXPOQUOTE_DOCUMENTS_VALIDITY_DAYS"],
            value: config.documents.validity_days.to_string(),
        },
        ConfigField {
            key: "documents.sales_whatsapp",
            env_keys: &["EXPOQUOTE_DOCUMENTS_SALES_WHATSAPP"],
            value: optional(config.documents.sales_whatsapp.as_ref()),
        },
        ConfigField {
            key: "documents.sales_email",
            env_keys: &["EXPOQUOTE_DOCUMENTS_SALES_EMAIL"],
            value: optional(config.documents.sales_email.as_ref()),
        },
        ConfigField {
            key: "logging.level",
            env_keys: &["EXPOQUOTE_LOGGING_LEVEL", "EXPOQUOTE_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        ConfigField {
            key: "logging.format",
            env_keys: &["EXPOQUOTE_LOGGING_FORMAT", "EXPOQUOTE_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("expoquote.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/expoquote.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
