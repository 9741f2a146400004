//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `FAAS_ACCOUNT_ID` is missing, falls back to loading from file
//! 3. Searches several paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `FAAS_ACCOUNT_ID`: Account id (required)
//! - `FAAS_CLIENT_ID` / `FAAS_CLIENT_SECRET`: AppJWT credentials (both or
//!   neither)
//! - `FAAS_API_VERSION`: API version sent as `v`
//! - `FAAS_TIMEOUT_MS`: Per-request timeout in milliseconds
//! - `FAAS_FAIL_ON_ERROR_STATUS_CODE`: Raise on non-success statuses
//!   (true/false)
//! - `FAAS_CSDS_TTL_SECONDS`: Discovery cache TTL
//! - `FAAS_JWT_REFRESH_AFTER_MINUTES`: AppJWT refresh buffer
//! - `FAAS_IS_IMPLEMENTED_CACHE_SECONDS`: Is-implemented cache duration
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./faas.json` or `./faas.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories
//!
//! Files hold the camelCase `ClientConfig` keys at the top level plus an
//! optional `credentials` table with `clientId` and `clientSecret`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use faas_domain::{AppJwtCredentials, ClientConfig, FaasError};
use serde::Deserialize;
use thiserror::Error;

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },

    #[error("Config file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("No config file found in any of the standard locations")]
    NoConfigFile,

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON format: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML format: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] FaasError),
}

pub type LoadResult<T> = Result<T, ConfigLoadError>;

/// Client configuration plus the optional AppJWT credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub client: ClientConfig,
    pub credentials: Option<AppJwtCredentials>,
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(flatten)]
    client: ClientConfig,
    #[serde(default)]
    credentials: Option<AppJwtCredentials>,
}

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns a [`ConfigLoadError`] if neither source yields a valid
/// configuration.
pub fn load() -> LoadResult<LoadedConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(ConfigLoadError::MissingVar(key)) => {
            tracing::debug!(key, "Environment incomplete, trying file");
            load_from_file(None)
        }
        Err(e) => Err(e),
    }
}

/// Load configuration from environment variables
///
/// Unset optional variables keep their defaults.
///
/// # Errors
/// Returns `MissingVar` without `FAAS_ACCOUNT_ID`, `InvalidValue` for
/// unparsable values or a lone credential half.
pub fn load_from_env() -> LoadResult<LoadedConfig> {
    let account_id =
        env_var("FAAS_ACCOUNT_ID").ok_or(ConfigLoadError::MissingVar("FAAS_ACCOUNT_ID"))?;
    let mut client = ClientConfig::new(account_id);

    if let Some(version) = env_var("FAAS_API_VERSION") {
        client.api_version = version;
    }
    if let Some(timeout) = env_parse("FAAS_TIMEOUT_MS")? {
        client.timeout_ms = timeout;
    }
    if let Some(fail) = env_bool("FAAS_FAIL_ON_ERROR_STATUS_CODE")? {
        client.fail_on_error_status_code = fail;
    }
    if let Some(ttl) = env_parse("FAAS_CSDS_TTL_SECONDS")? {
        client.csds_ttl_seconds = ttl;
    }
    if let Some(minutes) = env_parse("FAAS_JWT_REFRESH_AFTER_MINUTES")? {
        client.jwt_refresh_after_minutes = minutes;
    }
    if let Some(seconds) = env_parse("FAAS_IS_IMPLEMENTED_CACHE_SECONDS")? {
        client.is_implemented_cache_duration_in_seconds = seconds;
    }

    let credentials = match (env_var("FAAS_CLIENT_ID"), env_var("FAAS_CLIENT_SECRET")) {
        (Some(id), Some(secret)) => Some(AppJwtCredentials::new(id, secret)),
        (None, None) => None,
        _ => {
            return Err(ConfigLoadError::InvalidValue {
                key: "FAAS_CLIENT_ID",
                message: "FAAS_CLIENT_ID and FAAS_CLIENT_SECRET must be set together".to_string(),
            })
        }
    };

    client.validate()?;
    Ok(LoadedConfig { client, credentials })
}

/// Load configuration from a file
///
/// If `path` is `None`, searches several locations for config files.
/// Format is detected by file extension.
///
/// # Errors
/// Returns a [`ConfigLoadError`] if the file is missing, unreadable,
/// malformed or fails validation.
pub fn load_from_file(path: Option<PathBuf>) -> LoadResult<LoadedConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigLoadError::FileNotFound(p));
            }
            p
        }
        None => find_config_file().ok_or(ConfigLoadError::NoConfigFile)?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|source| ConfigLoadError::Read { path: config_path.clone(), source })?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> LoadResult<LoadedConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let file: ConfigFile = match extension {
        "toml" => toml::from_str(contents)?,
        "json" => serde_json::from_str(contents)?,
        other => return Err(ConfigLoadError::UnsupportedFormat(other.to_string())),
    };

    file.client.validate()?;
    Ok(LoadedConfig { client: file.client, credentials: file.credentials })
}

/// Search the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let names = ["faas.json", "faas.toml", "config.json", "config.toml"];

    [cwd.clone(), cwd.join(".."), cwd.join("../..")]
        .iter()
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &'static str) -> LoadResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigLoadError::InvalidValue { key, message: e.to_string() })
        })
        .transpose()
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &'static str) -> LoadResult<Option<bool>> {
    env_var(key)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigLoadError::InvalidValue {
                key,
                message: format!("expected a boolean, got {other:?}"),
            }),
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 9] = [
        "FAAS_ACCOUNT_ID",
        "FAAS_CLIENT_ID",
        "FAAS_CLIENT_SECRET",
        "FAAS_API_VERSION",
        "FAAS_TIMEOUT_MS",
        "FAAS_FAIL_ON_ERROR_STATUS_CODE",
        "FAAS_CSDS_TTL_SECONDS",
        "FAAS_JWT_REFRESH_AFTER_MINUTES",
        "FAAS_IS_IMPLEMENTED_CACHE_SECONDS",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn write_temp(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let cases = [("1", true), ("TRUE", true), ("on", true), ("no", false), ("0", false)];
        for (raw, expected) in cases {
            std::env::set_var("FAAS_TEST_BOOL", raw);
            assert_eq!(env_bool("FAAS_TEST_BOOL").unwrap(), Some(expected), "value {raw}");
        }

        std::env::set_var("FAAS_TEST_BOOL", "maybe");
        assert!(matches!(
            env_bool("FAAS_TEST_BOOL"),
            Err(ConfigLoadError::InvalidValue { key: "FAAS_TEST_BOOL", .. })
        ));

        std::env::remove_var("FAAS_TEST_BOOL");
        assert_eq!(env_bool("FAAS_TEST_BOOL").unwrap(), None);
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        std::env::set_var("FAAS_ACCOUNT_ID", "le123456");
        std::env::set_var("FAAS_CLIENT_ID", "client-a");
        std::env::set_var("FAAS_CLIENT_SECRET", "s3cr3t");
        std::env::set_var("FAAS_API_VERSION", "2");
        std::env::set_var("FAAS_TIMEOUT_MS", "5000");
        std::env::set_var("FAAS_FAIL_ON_ERROR_STATUS_CODE", "true");
        std::env::set_var("FAAS_CSDS_TTL_SECONDS", "120");
        std::env::set_var("FAAS_JWT_REFRESH_AFTER_MINUTES", "10");
        std::env::set_var("FAAS_IS_IMPLEMENTED_CACHE_SECONDS", "30");

        let result = load_from_env();
        clear_env();

        let loaded = result.expect("config from env");
        assert_eq!(loaded.client.account_id, "le123456");
        assert_eq!(loaded.client.api_version, "2");
        assert_eq!(loaded.client.timeout_ms, 5000);
        assert!(loaded.client.fail_on_error_status_code);
        assert_eq!(loaded.client.csds_ttl_seconds, 120);
        assert_eq!(loaded.client.jwt_refresh_after_minutes, 10);
        assert_eq!(loaded.client.is_implemented_cache_duration_in_seconds, 30);
        assert_eq!(loaded.credentials, Some(AppJwtCredentials::new("client-a", "s3cr3t")));
    }

    #[test]
    fn test_load_from_env_missing_account() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let result = load_from_env();

        assert!(matches!(result, Err(ConfigLoadError::MissingVar("FAAS_ACCOUNT_ID"))));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        std::env::set_var("FAAS_ACCOUNT_ID", "123456");
        std::env::set_var("FAAS_TIMEOUT_MS", "soon");

        let result = load_from_env();
        clear_env();

        assert!(matches!(
            result,
            Err(ConfigLoadError::InvalidValue { key: "FAAS_TIMEOUT_MS", .. })
        ));
    }

    #[test]
    fn test_load_from_env_rejects_half_credentials() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        std::env::set_var("FAAS_ACCOUNT_ID", "123456");
        std::env::set_var("FAAS_CLIENT_ID", "client-a");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(ConfigLoadError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_from_file_json() {
        let path = write_temp(
            r#"{
                "accountId": "123456",
                "failOnErrorStatusCode": true,
                "csdsHttpHeaders": {"X-Env": "ci"},
                "retry": {"maxAttempts": 5},
                "credentials": {"clientId": "client-a", "clientSecret": "s3cr3t"}
            }"#,
            "json",
        );

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let loaded = result.expect("config from JSON file");
        assert_eq!(loaded.client.account_id, "123456");
        assert!(loaded.client.fail_on_error_status_code);
        assert_eq!(loaded.client.csds_http_headers.get("X-Env").map(String::as_str), Some("ci"));
        assert_eq!(loaded.client.retry.max_attempts, 5);
        assert_eq!(loaded.client.retry.delay_step_ms, 350);
        assert_eq!(loaded.client.gw_csds_service_name, "faasGW");
        assert_eq!(loaded.credentials.map(|c| c.client_id), Some("client-a".to_string()));
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = write_temp(
            r#"
accountId = "fr_account"
apiVersion = "2"
timeout = 10000

[credentials]
clientId = "client-b"
clientSecret = "other"
"#,
            "toml",
        );

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let loaded = result.expect("config from TOML file");
        assert_eq!(loaded.client.account_id, "fr_account");
        assert_eq!(loaded.client.api_version, "2");
        assert_eq!(loaded.client.timeout_ms, 10_000);
        assert!(loaded.credentials.is_some());
    }

    #[test]
    fn test_load_from_file_validates() {
        let path = write_temp(r#"{"accountId": ""}"#, "json");

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        assert!(matches!(result, Err(ConfigLoadError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/faas.json")));

        assert!(matches!(result, Err(ConfigLoadError::FileNotFound(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = write_temp(r#"{ "this is": "not valid json" "#, "json");

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        assert!(matches!(result, Err(ConfigLoadError::Json(_))));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("accountId: x", &PathBuf::from("faas.yaml"));

        assert!(matches!(result, Err(ConfigLoadError::UnsupportedFormat(ext)) if ext == "yaml"));
    }
}
