use std::env;
use std::fs;
use std::path::Path;

use loadbridge_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

/// One reported setting: dotted file key, rendered value, env keys that override it.
struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
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

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["LOADBRIDGE_SERVER_BIND_ADDRESS", "HOST"],
        },
        Field {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["LOADBRIDGE_SERVER_PORT", "PORT"],
        },
        Field {
            key: "auth.api_key",
            value: redact_secret(config.auth.api_key.as_ref()),
            env_keys: &["LOADBRIDGE_AUTH_API_KEY", "ACME_API_KEY"],
        },
        Field {
            key: "auth.requests_per_minute",
            value: config.auth.requests_per_minute.to_string(),
            env_keys: &["LOADBRIDGE_AUTH_REQUESTS_PER_MINUTE"],
        },
        Field {
            key: "fmcsa.api_key",
            value: redact_secret(config.fmcsa.api_key.as_ref()),
            env_keys: &["LOADBRIDGE_FMCSA_API_KEY", "FMCSA_API_KEY"],
        },
        Field {
            key: "fmcsa.base_url",
            value: config.fmcsa.base_url.clone(),
            env_keys: &["LOADBRIDGE_FMCSA_BASE_URL", "FMCSA_BASE_URL"],
        },
        Field {
            key: "catalog.path",
            value: config.catalog.path.display().to_string(),
            env_keys: &["LOADBRIDGE_CATALOG_PATH"],
        },
        Field {
            key: "database.url",
            value: config.database.url.clone(),
            env_keys: &["LOADBRIDGE_DATABASE_URL"],
        },
        Field {
            key: "search.max_results",
            value: config.search.max_results.to_string(),
            env_keys: &["LOADBRIDGE_SEARCH_MAX_RESULTS"],
        },
        Field {
            key: "dashboard.allowed_origins",
            value: config.dashboard.allowed_origins.join(","),
            env_keys: &["LOADBRIDGE_DASHBOARD_ALLOWED_ORIGINS"],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["LOADBRIDGE_LOGGING_LEVEL", "LOADBRIDGE_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["LOADBRIDGE_LOGGING_FORMAT", "LOADBRIDGE_LOG_FORMAT"],
        },
    ]
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

/// Shows only the last four characters of a key.
pub fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };
    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}
