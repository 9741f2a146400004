//! Client configuration and its defaults

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_VERSION, DEFAULT_AUTH_SERVICE_NAME, DEFAULT_CSDS_TTL_SECS,
    DEFAULT_GET_LAMBDAS_URI, DEFAULT_GW_SERVICE_NAME, DEFAULT_INVOKE_EVENT_URI,
    DEFAULT_INVOKE_UUID_URI, DEFAULT_IS_IMPLEMENTED_CACHE_SECS, DEFAULT_IS_IMPLEMENTED_URI,
    DEFAULT_JWT_REFRESH_AFTER_MINUTES, DEFAULT_LAMBDA_ERROR_CODE_PREFIX, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_RETRY_DELAY_STEP_MS, DEFAULT_TIMEOUT_MS,
    DEFAULT_UI_SERVICE_NAME,
};
use crate::errors::{FaasError, FaasErrorKind};
use crate::types::Protocol;

/// Placeholder for the account id in URI templates
pub const ACCOUNT_ID_PLACEHOLDER: &str = "{accountId}";
/// Placeholder for the event id in URI templates
pub const EVENT_ID_PLACEHOLDER: &str = "{eventId}";
/// Placeholder for the lambda UUID in URI templates
pub const LAMBDA_UUID_PLACEHOLDER: &str = "{lambdaUuid}";

/// Transport retry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetrySettings {
    /// Attempts per request, the first one included
    pub max_attempts: u32,
    /// Retry n waits `n * delay_step_ms`
    pub delay_step_ms: u64,
    /// Response statuses treated like a transient network failure. Empty by
    /// default: a retried status re-sends the request body.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_step_ms: DEFAULT_RETRY_DELAY_STEP_MS,
            retryable_statuses: Vec::new(),
        }
    }
}

impl RetrySettings {
    pub fn delay_step(&self) -> Duration {
        Duration::from_millis(self.delay_step_ms)
    }
}

/// Configuration of a FaaS client
///
/// Deserializes from camelCase keys; every field except `accountId` has a
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    pub account_id: String,
    pub gw_csds_service_name: String,
    pub ui_csds_service_name: String,
    pub auth_csds_service_name: String,
    pub api_version: String,
    /// Per-request network timeout in milliseconds
    #[serde(rename = "timeout", alias = "timeoutMs")]
    pub timeout_ms: u64,
    pub protocol: Protocol,
    pub get_lambdas_uri: String,
    pub invoke_uuid_uri: String,
    pub invoke_event_uri: String,
    pub is_implemented_uri: String,
    pub fail_on_error_status_code: bool,
    /// Extra headers sent with every discovery request
    pub csds_http_headers: BTreeMap<String, String>,
    pub csds_ttl_seconds: u64,
    pub jwt_refresh_after_minutes: u64,
    pub is_implemented_cache_duration_in_seconds: u64,
    pub retry: RetrySettings,
    pub lambda_error_code_prefix: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            gw_csds_service_name: DEFAULT_GW_SERVICE_NAME.to_string(),
            ui_csds_service_name: DEFAULT_UI_SERVICE_NAME.to_string(),
            auth_csds_service_name: DEFAULT_AUTH_SERVICE_NAME.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            protocol: Protocol::Https,
            get_lambdas_uri: DEFAULT_GET_LAMBDAS_URI.to_string(),
            invoke_uuid_uri: DEFAULT_INVOKE_UUID_URI.to_string(),
            invoke_event_uri: DEFAULT_INVOKE_EVENT_URI.to_string(),
            is_implemented_uri: DEFAULT_IS_IMPLEMENTED_URI.to_string(),
            fail_on_error_status_code: false,
            csds_http_headers: BTreeMap::new(),
            csds_ttl_seconds: DEFAULT_CSDS_TTL_SECS,
            jwt_refresh_after_minutes: DEFAULT_JWT_REFRESH_AFTER_MINUTES,
            is_implemented_cache_duration_in_seconds: DEFAULT_IS_IMPLEMENTED_CACHE_SECS,
            retry: RetrySettings::default(),
            lambda_error_code_prefix: DEFAULT_LAMBDA_ERROR_CODE_PREFIX.to_string(),
        }
    }
}

impl ClientConfig {
    /// Default configuration for an account
    pub fn new(account_id: impl Into<String>) -> Self {
        Self { account_id: account_id.into(), ..Self::default() }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn csds_ttl(&self) -> Duration {
        Duration::from_secs(self.csds_ttl_seconds)
    }

    pub fn jwt_refresh_buffer(&self) -> Duration {
        Duration::from_secs(self.jwt_refresh_after_minutes * 60)
    }

    pub fn is_implemented_cache_duration(&self) -> Duration {
        Duration::from_secs(self.is_implemented_cache_duration_in_seconds)
    }

    /// Reject configurations that cannot produce valid requests
    pub fn validate(&self) -> Result<(), FaasError> {
        if self.account_id.trim().is_empty() {
            return Err(config_error("accountId is required"));
        }
        if self.retry.max_attempts == 0 {
            return Err(config_error("retry.maxAttempts must be greater than 0"));
        }
        let templates = [
            ("invokeEventUri", &self.invoke_event_uri, Some(EVENT_ID_PLACEHOLDER)),
            ("invokeUuidUri", &self.invoke_uuid_uri, Some(LAMBDA_UUID_PLACEHOLDER)),
            ("isImplementedUri", &self.is_implemented_uri, Some(EVENT_ID_PLACEHOLDER)),
            ("getLambdasUri", &self.get_lambdas_uri, None),
        ];
        for (name, template, required) in templates {
            if let Some(placeholder) = required {
                if !template.contains(placeholder) {
                    return Err(config_error(format!("{name} must contain {placeholder}")));
                }
            }
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> FaasError {
    FaasError::new(FaasErrorKind::Config, message)
}

/// Substitute `{name}` placeholders in a URI template.
///
/// Values are percent-encoded as path segments.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |path, (name, value)| {
        path.replace(&format!("{{{name}}}"), &urlencoding::encode(value))
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// Validates `ClientConfig` deserialization for the partial document
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms supplied keys override defaults.
    /// - Confirms omitted keys keep their defaults.
    #[test]
    fn test_deserialize_fills_defaults() {
        let config: ClientConfig = serde_json::from_value(json!({
            "accountId": "123456",
            "failOnErrorStatusCode": true,
            "timeout": 5000,
            "retry": {"maxAttempts": 5}
        }))
        .expect("deserializes");

        assert_eq!(config.account_id, "123456");
        assert!(config.fail_on_error_status_code);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay_step_ms, 350);
        assert_eq!(config.gw_csds_service_name, "faasGW");
        assert_eq!(config.csds_ttl_seconds, 600);
        assert_eq!(config.protocol, Protocol::Https);
    }

    /// Validates `ClientConfig::validate` for the missing account scenario.
    ///
    /// Assertions:
    /// - Ensures an empty account id is rejected as a configuration error.
    #[test]
    fn test_validate_requires_account() {
        let err = ClientConfig::default().validate().expect_err("must fail");
        assert_eq!(err.kind(), FaasErrorKind::Config);
    }

    /// Validates `ClientConfig::validate` for the broken template scenario.
    ///
    /// Assertions:
    /// - Ensures a UUID template without its placeholder is rejected.
    #[test]
    fn test_validate_rejects_template_without_placeholder() {
        let config = ClientConfig {
            invoke_uuid_uri: "api/account/{accountId}/lambdas/invoke".to_string(),
            ..ClientConfig::new("123")
        };

        let err = config.validate().expect_err("must fail");
        assert!(err.to_string().contains("{lambdaUuid}"));
    }

    /// Validates `render_template` for the default invoke template scenario.
    ///
    /// Assertions:
    /// - Confirms both placeholders are substituted.
    /// - Confirms reserved characters in values are encoded.
    #[test]
    fn test_render_template() {
        let path = render_template(
            DEFAULT_INVOKE_EVENT_URI,
            &[("accountId", "123456"), ("eventId", "a b/c")],
        );

        assert_eq!(path, "api/account/123456/events/a%20b%2Fc/invoke");
    }

    /// Validates `render_template` for the non-ASCII value scenario.
    ///
    /// Assertions:
    /// - Confirms multi-byte values are encoded per UTF-8 byte.
    /// - Confirms unreserved characters pass through unchanged.
    #[test]
    fn test_render_template_encodes_utf8() {
        let path = render_template("events/{eventId}", &[("eventId", "caf\u{e9}-v1.0_~")]);

        assert_eq!(path, "events/caf%C3%A9-v1.0_~");
    }

    /// Validates `ClientConfig` deserialization for the timeout key scenario.
    ///
    /// Assertions:
    /// - Confirms both `timeout` and `timeoutMs` set the request timeout.
    #[test]
    fn test_timeout_accepts_both_keys() {
        for key in ["timeout", "timeoutMs"] {
            let config: ClientConfig =
                serde_json::from_value(json!({"accountId": "le1", key: 5000}))
                    .expect("deserializes");

            assert_eq!(config.timeout_ms, 5000, "key {key}");
        }
    }
}
