//! Request and response types shared by every layer of the client.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP methods used against the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// URL scheme for platform requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    #[default]
    Https,
}

impl Protocol {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

/// Header forwarded to the lambda inside the invocation body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Body posted to an invoke endpoint
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InvocationBody {
    /// Unix timestamp in milliseconds; filled in at send time when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    #[serde(default)]
    pub payload: Value,
}

impl InvocationBody {
    pub fn new(payload: Value) -> Self {
        Self { timestamp: None, headers: Vec::new(), payload }
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(KeyValue::new(key, value));
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// What an invocation addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InvocationTarget {
    /// Every lambda subscribed to a platform event
    Event { event_id: String },
    /// One lambda by its stable identifier
    Uuid { lambda_uuid: String },
}

impl InvocationTarget {
    pub fn event_id(&self) -> Option<&str> {
        match self {
            Self::Event { event_id } => Some(event_id),
            Self::Uuid { .. } => None,
        }
    }

    pub fn lambda_uuid(&self) -> Option<&str> {
        match self {
            Self::Uuid { lambda_uuid } => Some(lambda_uuid),
            Self::Event { .. } => None,
        }
    }
}

/// A single lambda invocation request
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub target: InvocationTarget,
    pub external_system: String,
    pub body: InvocationBody,
    pub user_id: Option<String>,
    /// Scope (skill) narrowing the call, sent as `skillId`
    pub skill_id: Option<String>,
    /// Overrides the configured API version
    pub api_version: Option<String>,
    /// Overrides the configured fail-on-error-status setting
    pub fail_on_error_status_code: Option<bool>,
}

impl Invocation {
    /// Invoke the lambdas subscribed to `event_id`
    pub fn event(
        event_id: impl Into<String>,
        external_system: impl Into<String>,
        body: InvocationBody,
    ) -> Self {
        Self::new(InvocationTarget::Event { event_id: event_id.into() }, external_system, body)
    }

    /// Invoke the lambda with the given UUID
    pub fn uuid(
        lambda_uuid: impl Into<String>,
        external_system: impl Into<String>,
        body: InvocationBody,
    ) -> Self {
        Self::new(InvocationTarget::Uuid { lambda_uuid: lambda_uuid.into() }, external_system, body)
    }

    fn new(
        target: InvocationTarget,
        external_system: impl Into<String>,
        body: InvocationBody,
    ) -> Self {
        Self {
            target,
            external_system: external_system.into(),
            body,
            user_id: None,
            skill_id: None,
            api_version: None,
            fail_on_error_status_code: None,
        }
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn with_skill_id(mut self, skill_id: impl Into<String>) -> Self {
        self.skill_id = Some(skill_id.into());
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    #[must_use]
    pub fn fail_on_error_status_code(mut self, fail: bool) -> Self {
        self.fail_on_error_status_code = Some(fail);
        self
    }
}

/// Filters for listing the lambdas of an account
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LambdaFilter {
    pub event_id: Option<String>,
    /// Lambda states; each one is sent as a separate `state` parameter
    pub states: Vec<String>,
    pub user_id: Option<String>,
    pub external_system: Option<String>,
    pub api_version: Option<String>,
    pub fail_on_error_status_code: Option<bool>,
}

impl LambdaFilter {
    #[must_use]
    pub fn event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.states.push(state.into());
        self
    }

    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn external_system(mut self, external_system: impl Into<String>) -> Self {
        self.external_system = Some(external_system.into());
        self
    }
}

/// Request to check whether an event has an implementing lambda
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsImplementedRequest {
    pub event_id: String,
    pub external_system: String,
    pub skill_id: Option<String>,
    pub user_id: Option<String>,
    pub api_version: Option<String>,
    pub fail_on_error_status_code: Option<bool>,
}

impl IsImplementedRequest {
    pub fn new(event_id: impl Into<String>, external_system: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            external_system: external_system.into(),
            skill_id: None,
            user_id: None,
            api_version: None,
            fail_on_error_status_code: None,
        }
    }

    #[must_use]
    pub fn with_skill_id(mut self, skill_id: impl Into<String>) -> Self {
        self.skill_id = Some(skill_id.into());
        self
    }
}

/// HTTP response as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON body; a non-JSON body becomes a JSON string, an empty one `null`
    pub body: Value,
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
    /// Retries performed by the transport before this response was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
}

impl Response {
    /// Platform error code carried in the body, if any
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("errorCode").and_then(Value::as_str)
    }
}

/// One service-discovery entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDomain {
    pub service: String,
    #[serde(rename = "baseURI")]
    pub base_uri: String,
}

/// Client-credentials pair for AppJWT authentication
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppJwtCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl AppJwtCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }
}

impl fmt::Debug for AppJwtCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppJwtCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
