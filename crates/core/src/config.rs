use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub fmcsa: FmcsaConfig,
    pub catalog: CatalogConfig,
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub dashboard: DashboardConfig,
    pub brokerage: BrokerageConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Bearer key shared with the voice platform. Requests are refused while unset.
    pub api_key: Option<SecretString>,
    pub requests_per_minute: u32,
    pub window_secs: u64,
}

#[derive(Clone, Debug)]
pub struct FmcsaConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub max_results: usize,
    pub include_booked_max_results: usize,
}

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub dir: PathBuf,
    /// Exact origins, or `https://*.example.com` to admit any subdomain.
    pub allowed_origins: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct BrokerageConfig {
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub branch: String,
}

#[derive(Clone, Debug)]
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
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub log_level: Option<String>,
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

pub const DEFAULT_CONFIG_FILE: &str = "loadbridge.toml";

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8000,
                graceful_shutdown_secs: 15,
            },
            auth: AuthConfig { api_key: None, requests_per_minute: 60, window_secs: 60 },
            fmcsa: FmcsaConfig {
                api_key: None,
                base_url: "https://mobile.fmcsa.dot.gov/qc/services".to_string(),
                timeout_secs: 30,
            },
            catalog: CatalogConfig { path: PathBuf::from("data/loads.json") },
            database: DatabaseConfig {
                url: "sqlite://loadbridge.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            search: SearchConfig { max_results: 10, include_booked_max_results: 100 },
            dashboard: DashboardConfig {
                dir: PathBuf::from("dashboard"),
                allowed_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:8000".to_string(),
                    "http://localhost:8001".to_string(),
                    "https://*.happyrobot.ai".to_string(),
                    "https://*.ngrok.io".to_string(),
                ],
            },
            brokerage: BrokerageConfig {
                contact_name: "Dispatch".to_string(),
                contact_email: "dispatch@acmelogistics.com".to_string(),
                contact_phone: "18005551234".to_string(),
                branch: "Main".to_string(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
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
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    pub fn has_api_key(&self) -> bool {
        is_set(self.auth.api_key.as_ref())
    }

    pub fn has_fmcsa_key(&self) -> bool {
        is_set(self.fmcsa.api_key.as_ref())
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(auth) = patch.auth {
            if let Some(api_key) = auth.api_key {
                self.auth.api_key = Some(secret_value(api_key));
            }
            if let Some(requests_per_minute) = auth.requests_per_minute {
                self.auth.requests_per_minute = requests_per_minute;
            }
            if let Some(window_secs) = auth.window_secs {
                self.auth.window_secs = window_secs;
            }
        }

        if let Some(fmcsa) = patch.fmcsa {
            if let Some(api_key) = fmcsa.api_key {
                self.fmcsa.api_key = Some(secret_value(api_key));
            }
            if let Some(base_url) = fmcsa.base_url {
                self.fmcsa.base_url = base_url;
            }
            if let Some(timeout_secs) = fmcsa.timeout_secs {
                self.fmcsa.timeout_secs = timeout_secs;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(path) = catalog.path {
                self.catalog.path = path;
            }
        }

        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(search) = patch.search {
            if let Some(max_results) = search.max_results {
                self.search.max_results = max_results;
            }
            if let Some(include_booked_max_results) = search.include_booked_max_results {
                self.search.include_booked_max_results = include_booked_max_results;
            }
        }

        if let Some(dashboard) = patch.dashboard {
            if let Some(dir) = dashboard.dir {
                self.dashboard.dir = dir;
            }
            if let Some(allowed_origins) = dashboard.allowed_origins {
                self.dashboard.allowed_origins = allowed_origins;
            }
        }

        if let Some(brokerage) = patch.brokerage {
            if let Some(contact_name) = brokerage.contact_name {
                self.brokerage.contact_name = contact_name;
            }
            if let Some(contact_email) = brokerage.contact_email {
                self.brokerage.contact_email = contact_email;
            }
            if let Some(contact_phone) = brokerage.contact_phone {
                self.brokerage.contact_phone = contact_phone;
            }
            if let Some(branch) = brokerage.branch {
                self.brokerage.branch = branch;
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
        if let Some(value) = read_env("LOADBRIDGE_SERVER_BIND_ADDRESS").or_else(|| read_env("HOST"))
        {
            self.server.bind_address = value;
        }
        if let Some((key, value)) = read_env_keyed(&["LOADBRIDGE_SERVER_PORT", "PORT"]) {
            self.server.port = parse_u16(key, &value)?;
        }
        if let Some(value) = read_env("LOADBRIDGE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("LOADBRIDGE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("LOADBRIDGE_AUTH_API_KEY").or_else(|| read_env("ACME_API_KEY"))
        {
            self.auth.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("LOADBRIDGE_AUTH_REQUESTS_PER_MINUTE") {
            self.auth.requests_per_minute =
                parse_u32("LOADBRIDGE_AUTH_REQUESTS_PER_MINUTE", &value)?;
        }
        if let Some(value) = read_env("LOADBRIDGE_AUTH_WINDOW_SECS") {
            self.auth.window_secs = parse_u64("LOADBRIDGE_AUTH_WINDOW_SECS", &value)?;
        }

        if let Some(value) =
            read_env("LOADBRIDGE_FMCSA_API_KEY").or_else(|| read_env("FMCSA_API_KEY"))
        {
            self.fmcsa.api_key = Some(secret_value(value));
        }
        if let Some(value) =
            read_env("LOADBRIDGE_FMCSA_BASE_URL").or_else(|| read_env("FMCSA_BASE_URL"))
        {
            self.fmcsa.base_url = value;
        }
        if let Some(value) = read_env("LOADBRIDGE_FMCSA_TIMEOUT_SECS") {
            self.fmcsa.timeout_secs = parse_u64("LOADBRIDGE_FMCSA_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("LOADBRIDGE_CATALOG_PATH") {
            self.catalog.path = PathBuf::from(value);
        }

        if let Some(value) = read_env("LOADBRIDGE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("LOADBRIDGE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("LOADBRIDGE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("LOADBRIDGE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("LOADBRIDGE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("LOADBRIDGE_SEARCH_MAX_RESULTS") {
            self.search.max_results = parse_usize("LOADBRIDGE_SEARCH_MAX_RESULTS", &value)?;
        }
        if let Some(value) = read_env("LOADBRIDGE_SEARCH_INCLUDE_BOOKED_MAX_RESULTS") {
            self.search.include_booked_max_results =
                parse_usize("LOADBRIDGE_SEARCH_INCLUDE_BOOKED_MAX_RESULTS", &value)?;
        }

        if let Some(value) = read_env("LOADBRIDGE_DASHBOARD_DIR") {
            self.dashboard.dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("LOADBRIDGE_DASHBOARD_ALLOWED_ORIGINS") {
            self.dashboard.allowed_origins = value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(value) = read_env("LOADBRIDGE_BROKERAGE_CONTACT_EMAIL") {
            self.brokerage.contact_email = value;
        }
        if let Some(value) = read_env("LOADBRIDGE_BROKERAGE_CONTACT_PHONE") {
            self.brokerage.contact_phone = value;
        }
        if let Some(value) = read_env("LOADBRIDGE_BROKERAGE_BRANCH") {
            self.brokerage.branch = value;
        }

        let log_level =
            read_env("LOADBRIDGE_LOGGING_LEVEL").or_else(|| read_env("LOADBRIDGE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LOADBRIDGE_LOGGING_FORMAT").or_else(|| read_env("LOADBRIDGE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(api_key) = overrides.api_key {
            self.auth.api_key = Some(secret_value(api_key));
        }
        if let Some(catalog_path) = overrides.catalog_path {
            self.catalog.path = catalog_path;
        }
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_auth(&self.auth)?;
        validate_fmcsa(&self.fmcsa)?;
        validate_database(&self.database)?;
        validate_search(&self.search)?;
        validate_dashboard(&self.dashboard)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Locate the config file: an explicit path if it exists, else the first
/// conventional location present in the working directory.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config/loadbridge.toml")]
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

fn is_set(secret: Option<&SecretString>) -> bool {
    secret.map(|value| !value.expose_secret().trim().is_empty()).unwrap_or(false)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_auth(auth: &AuthConfig) -> Result<(), ConfigError> {
    if auth.requests_per_minute == 0 {
        return Err(ConfigError::Validation(
            "auth.requests_per_minute must be greater than zero".to_string(),
        ));
    }

    if auth.window_secs == 0 || auth.window_secs > 3600 {
        return Err(ConfigError::Validation(
            "auth.window_secs must be in range 1..=3600".to_string(),
        ));
    }

    Ok(())
}

fn validate_fmcsa(fmcsa: &FmcsaConfig) -> Result<(), ConfigError> {
    let base_url = fmcsa.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "fmcsa.base_url must start with http:// or https://".to_string(),
        ));
    }

    if fmcsa.timeout_secs == 0 || fmcsa.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "fmcsa.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
    if search.max_results == 0 {
        return Err(ConfigError::Validation(
            "search.max_results must be greater than zero".to_string(),
        ));
    }

    if search.include_booked_max_results < search.max_results {
        return Err(ConfigError::Validation(
            "search.include_booked_max_results must be at least search.max_results".to_string(),
        ));
    }

    Ok(())
}

fn validate_dashboard(dashboard: &DashboardConfig) -> Result<(), ConfigError> {
    for origin in &dashboard.allowed_origins {
        if !origin.starts_with("http://") && !origin.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "dashboard.allowed_origins entry `{origin}` must start with http:// or https://"
            )));
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

/// First non-empty variable among `keys`, returned with the name it came from.
fn read_env_keyed<'a>(keys: &[&'a str]) -> Option<(&'a str, String)> {
    keys.iter().find_map(|key| read_env(key).map(|value| (*key, value)))
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
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

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    auth: Option<AuthPatch>,
    fmcsa: Option<FmcsaPatch>,
    catalog: Option<CatalogPatch>,
    database: Option<DatabasePatch>,
    search: Option<SearchPatch>,
    dashboard: Option<DashboardPatch>,
    brokerage: Option<BrokeragePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AuthPatch {
    api_key: Option<String>,
    requests_per_minute: Option<u32>,
    window_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct FmcsaPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatch {
    max_results: Option<usize>,
    include_booked_max_results: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct DashboardPatch {
    dir: Option<PathBuf>,
    allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct BrokeragePatch {
    contact_name: Option<String>,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    branch: Option<String>,
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

    use secrecy::ExposeSecret;
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

        let config = AppConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("does-not-exist.toml")),
            ..LoadOptions::default()
        })
        .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.search.max_results == 10, "default page size should be 10")?;
        ensure(
            config.search.include_booked_max_results == 100,
            "include-booked page size should be 100",
        )?;
        ensure(config.auth.requests_per_minute == 60, "default rate limit should be 60/min")?;
        ensure(config.brokerage.branch == "Main", "default branch should be Main")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_LOADBRIDGE_KEY", "key-from-env");
        env::set_var("TEST_FMCSA_WEB_KEY", "web-key-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("loadbridge.toml");
            fs::write(
                &path,
                r#"
[auth]
api_key = "${TEST_LOADBRIDGE_KEY}"

[fmcsa]
api_key = "${TEST_FMCSA_WEB_KEY}"

[catalog]
path = "fixtures/loads.json"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.auth.api_key.as_ref().map(|key| key.expose_secret() == "key-from-env")
                    == Some(true),
                "api key should be loaded from environment",
            )?;
            ensure(config.has_fmcsa_key(), "fmcsa key should be loaded from environment")?;
            ensure(
                config.catalog.path == PathBuf::from("fixtures/loads.json"),
                "catalog path should come from the file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_LOADBRIDGE_KEY", "TEST_FMCSA_WEB_KEY"]);
        result
    }

    #[test]
    fn legacy_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ACME_API_KEY", "legacy-key");
        env::set_var("FMCSA_BASE_URL", "http://registry.local/qc");
        env::set_var("PORT", "9100");
        env::set_var("LOADBRIDGE_LOG_LEVEL", "warn");
        env::set_var("LOADBRIDGE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.has_api_key(), "legacy api key alias should be honored")?;
            ensure(
                config.fmcsa.base_url == "http://registry.local/qc",
                "legacy registry url alias should be honored",
            )?;
            ensure(config.server.port == 9100, "legacy port alias should be honored")?;
            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&[
            "ACME_API_KEY",
            "FMCSA_BASE_URL",
            "PORT",
            "LOADBRIDGE_LOG_LEVEL",
            "LOADBRIDGE_LOG_FORMAT",
        ]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LOADBRIDGE_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("LOADBRIDGE_SEARCH_MAX_RESULTS", "25");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("loadbridge.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[search]
max_results = 5

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.search.max_results == 25, "env page size should win over the file")?;
            Ok(())
        })();

        clear_vars(&["LOADBRIDGE_DATABASE_URL", "LOADBRIDGE_SEARCH_MAX_RESULTS"]);
        result
    }

    #[test]
    fn invalid_numeric_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LOADBRIDGE_SERVER_PORT", "eighty");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected env override failure".to_string()),
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "LOADBRIDGE_SERVER_PORT", "error should name the variable")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
        };

        clear_vars(&["LOADBRIDGE_SERVER_PORT"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LOADBRIDGE_DATABASE_URL", "postgres://elsewhere/db");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("database.url")
            );
            ensure(has_message, "validation failure should mention database.url")
        })();

        clear_vars(&["LOADBRIDGE_DATABASE_URL"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LOADBRIDGE_AUTH_API_KEY", "bridge-secret-value");
        env::set_var("LOADBRIDGE_FMCSA_API_KEY", "registry-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("bridge-secret-value"), "debug output should not contain api key")?;
            ensure(
                !debug.contains("registry-secret-value"),
                "debug output should not contain registry key",
            )?;
            Ok(())
        })();

        clear_vars(&["LOADBRIDGE_AUTH_API_KEY", "LOADBRIDGE_FMCSA_API_KEY"]);
        result
    }
}
