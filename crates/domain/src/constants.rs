//! Client constants
//!
//! Centralized location for identifiers and defaults shared across crates.

/// Name reported in the `User-Agent` header and debug context
pub const CLIENT_NAME: &str = "faas-client-rs";
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

// Service discovery
pub const DEFAULT_GW_SERVICE_NAME: &str = "faasGW";
pub const DEFAULT_UI_SERVICE_NAME: &str = "faasUI";
pub const DEFAULT_AUTH_SERVICE_NAME: &str = "sentinel";
pub const DEFAULT_CSDS_TTL_SECS: u64 = 600;

// Request construction
pub const DEFAULT_API_VERSION: &str = "1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_GET_LAMBDAS_URI: &str = "api/account/{accountId}/lambdas/";
pub const DEFAULT_INVOKE_UUID_URI: &str = "api/account/{accountId}/lambdas/{lambdaUuid}/invoke";
pub const DEFAULT_INVOKE_EVENT_URI: &str = "api/account/{accountId}/events/{eventId}/invoke";
pub const DEFAULT_IS_IMPLEMENTED_URI: &str =
    "api/account/{accountId}/events/{eventId}/isImplemented";

// Caching and credentials
pub const DEFAULT_JWT_REFRESH_AFTER_MINUTES: u64 = 30;
pub const DEFAULT_IS_IMPLEMENTED_CACHE_SECS: u64 = 60;

// Transport retry
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_STEP_MS: u64 = 350;

/// Error codes under this namespace come from the lambda handler itself
pub const DEFAULT_LAMBDA_ERROR_CODE_PREFIX: &str = "com.liveperson.faas.handler";

/// Metric domain reported before resolution succeeds
pub const UNRESOLVED_DOMAIN: &str = "unresolved";

/// Value of the `User-Agent` header
pub fn user_agent() -> String {
    format!("{CLIENT_NAME}@{CLIENT_VERSION}")
}
