//! Error taxonomy for the FaaS client
//!
//! Every failure leaving the public operations is a [`FaasError`]. Errors are
//! chained explicitly: each layer wraps the error it caught as its `cause`,
//! so `source()` walks from the user-facing failure down to the socket error
//! or HTTP status that started it.

use std::error::Error as StdError;
use std::fmt;

use faas_common::error::{ErrorClassification, ErrorSeverity};

use crate::constants::{CLIENT_NAME, CLIENT_VERSION};
use crate::types::Response;

/// Boxed error used as the cause of a [`FaasError`]
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result type alias for FaaS client operations
pub type Result<T> = std::result::Result<T, FaasError>;

/// Broad failure classes callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Service discovery failed or had no matching entry
    Discovery,
    /// No usable bearer credential could be produced
    Authentication,
    /// The HTTP call failed below the protocol layer
    Transport,
    /// The HTTP call completed with a non-success status
    Protocol,
    /// A non-success status whose body carries a platform handler error code
    PlatformExecution,
    /// A response lacked a field it was expected to carry
    Parse,
    /// Operation-level wrapper around one of the classes above
    Invocation,
    /// The client was configured incorrectly
    Configuration,
}

/// Concrete error kinds, each with a stable name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaasErrorKind {
    Invoke,
    LambdaExecution,
    GetLambdas,
    IsImplemented,
    IsImplementedParse,
    Request,
    HttpRequest,
    Transport,
    DomainResolution,
    DiscoveryFailure,
    DomainNotFound,
    AppJwtAuthentication,
    AppJwtRetrieval,
    CreateUrl,
    Config,
}

impl FaasErrorKind {
    /// Stable error name, suitable for logs and metrics
    pub const fn name(self) -> &'static str {
        match self {
            Self::Invoke => "FaaSInvokeError",
            Self::LambdaExecution => "FaaSLambdaError",
            Self::GetLambdas => "FaaSGetLambdasError",
            Self::IsImplemented => "FaaSIsImplementedError",
            Self::IsImplementedParse => "FaaSIsImplementedParseError",
            Self::Request => "FaaSRequestError",
            Self::HttpRequest => "HttpRequestError",
            Self::Transport => "FaaSTransportError",
            Self::DomainResolution => "FaaSDomainResolutionError",
            Self::DiscoveryFailure => "CSDSFailure",
            Self::DomainNotFound => "CSDSDomainNotFound",
            Self::AppJwtAuthentication => "FaaSAppJWTAuthenticationError",
            Self::AppJwtRetrieval => "FaaSAppJWTRetrievalError",
            Self::CreateUrl => "FaaSCreateUrlError",
            Self::Config => "FaaSConfigError",
        }
    }

    /// Taxonomy class of this kind
    pub const fn class(self) -> ErrorClass {
        match self {
            Self::DomainResolution | Self::DiscoveryFailure | Self::DomainNotFound => {
                ErrorClass::Discovery
            }
            Self::AppJwtAuthentication | Self::AppJwtRetrieval => ErrorClass::Authentication,
            Self::Transport => ErrorClass::Transport,
            Self::HttpRequest => ErrorClass::Protocol,
            Self::LambdaExecution => ErrorClass::PlatformExecution,
            Self::IsImplementedParse => ErrorClass::Parse,
            Self::Invoke | Self::GetLambdas | Self::IsImplemented | Self::Request => {
                ErrorClass::Invocation
            }
            Self::CreateUrl | Self::Config => ErrorClass::Configuration,
        }
    }
}

impl fmt::Display for FaasErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Debug information attached to operation-level errors.
///
/// Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugContext {
    pub client: &'static str,
    pub version: &'static str,
    pub account_id: Option<String>,
}

impl DebugContext {
    pub fn for_account(account_id: impl Into<String>) -> Self {
        Self { client: CLIENT_NAME, version: CLIENT_VERSION, account_id: Some(account_id.into()) }
    }
}

impl Default for DebugContext {
    fn default() -> Self {
        Self { client: CLIENT_NAME, version: CLIENT_VERSION, account_id: None }
    }
}

/// Error raised by the FaaS client
pub struct FaasError {
    kind: FaasErrorKind,
    message: String,
    context: Option<DebugContext>,
    response: Option<Box<Response>>,
    cause: Option<BoxError>,
}

impl FaasError {
    pub fn new(kind: FaasErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), context: None, response: None, cause: None }
    }

    /// Wrap `cause` in a new error of the given kind
    pub fn wrap(
        kind: FaasErrorKind,
        message: impl Into<String>,
        cause: impl Into<BoxError>,
    ) -> Self {
        Self::new(kind, message).with_cause(cause)
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: DebugContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Attach the HTTP response that triggered a protocol failure
    #[must_use]
    pub fn with_response(mut self, response: Response) -> Self {
        self.response = Some(Box::new(response));
        self
    }

    pub fn kind(&self) -> FaasErrorKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class(&self) -> ErrorClass {
        self.kind.class()
    }

    /// This error's own message, without its causes
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> Option<&DebugContext> {
        self.context.as_ref()
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_deref()
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// This error followed by every `FaasError` found along its cause chain
    pub fn chain(&self) -> impl Iterator<Item = &FaasError> {
        std::iter::successors(Some(self), |err| {
            err.cause.as_deref().and_then(|c| c.downcast_ref::<FaasError>())
        })
    }

    /// First error of `kind` in the chain, this error included
    pub fn find_kind(&self, kind: FaasErrorKind) -> Option<&FaasError> {
        self.chain().find(|err| err.kind == kind)
    }

    /// First HTTP response attached anywhere along the chain
    pub fn find_response(&self) -> Option<&Response> {
        self.chain().find_map(FaasError::response)
    }

    /// HTTP status of the first response attached along the chain
    pub fn status_code(&self) -> Option<u16> {
        self.find_response().map(|r| r.status)
    }
}

impl fmt::Debug for FaasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("FaasError");
        debug.field("kind", &self.kind).field("message", &self.message);
        if let Some(context) = &self.context {
            debug.field("context", context);
        }
        if let Some(response) = &self.response {
            debug.field("status", &response.status);
        }
        if let Some(cause) = &self.cause {
            debug.field("cause", cause);
        }
        debug.finish()
    }
}

impl fmt::Display for FaasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl StdError for FaasError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn StdError + 'static))
    }
}

impl ErrorClassification for FaasError {
    fn is_retryable(&self) -> bool {
        self.chain().any(|err| match err.kind {
            FaasErrorKind::Transport => true,
            FaasErrorKind::HttpRequest => {
                err.response().is_some_and(|r| matches!(r.status, 502..=504))
            }
            _ => false,
        })
    }

    fn severity(&self) -> ErrorSeverity {
        match self.class() {
            ErrorClass::Configuration => ErrorSeverity::Critical,
            ErrorClass::PlatformExecution | ErrorClass::Transport => ErrorSeverity::Warning,
            ErrorClass::Invocation => {
                self.chain().skip(1).map(FaasError::severity).max().unwrap_or(ErrorSeverity::Error)
            }
            _ => ErrorSeverity::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::io;

    use serde_json::json;

    use super::*;

    fn response(status: u16) -> Response {
        Response {
            url: "https://faas.example/api".to_string(),
            headers: BTreeMap::new(),
            body: json!({"errorCode": "com.liveperson.faas.handler.crashed"}),
            ok: false,
            status,
            status_text: "Bad Gateway".to_string(),
            retry_count: Some(2),
        }
    }

    /// Validates `FaasError` display behavior for the nested cause scenario.
    ///
    /// Assertions:
    /// - Confirms the rendered message includes every link of the chain.
    /// - Confirms `source()` exposes the direct cause.
    #[test]
    fn test_display_renders_whole_chain() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "socket hang up");
        let transport = FaasError::wrap(FaasErrorKind::Transport, "transport failed", io_err);
        let request = FaasError::wrap(FaasErrorKind::Request, "Failed on request: x", transport);

        assert_eq!(request.to_string(), "Failed on request: x: transport failed: socket hang up");
        let source = request.source().expect("has source");
        assert_eq!(source.to_string(), "transport failed: socket hang up");
    }

    /// Validates `FaasError::status_code` behavior for the wrapped protocol
    /// failure scenario.
    ///
    /// Assertions:
    /// - Confirms the status is found two levels down.
    /// - Confirms `find_kind` locates the protocol error.
    #[test]
    fn test_status_code_walks_chain() {
        let http = FaasError::new(FaasErrorKind::HttpRequest, "status 502")
            .with_response(response(502));
        let request = FaasError::wrap(FaasErrorKind::Request, "Failed on request", http);
        let invoke = FaasError::wrap(FaasErrorKind::Invoke, "Failed to invoke", request)
            .with_context(DebugContext::for_account("123456"));

        assert_eq!(invoke.status_code(), Some(502));
        assert!(invoke.find_kind(FaasErrorKind::HttpRequest).is_some());
        assert_eq!(invoke.chain().count(), 3);
        assert_eq!(invoke.context().and_then(|c| c.account_id.as_deref()), Some("123456"));
    }

    /// Validates `FaasErrorKind::class` behavior for the taxonomy mapping
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms discovery, protocol and platform kinds map to their classes.
    #[test]
    fn test_kind_classes() {
        assert_eq!(FaasErrorKind::DomainNotFound.class(), ErrorClass::Discovery);
        assert_eq!(FaasErrorKind::HttpRequest.class(), ErrorClass::Protocol);
        assert_eq!(FaasErrorKind::LambdaExecution.class(), ErrorClass::PlatformExecution);
        assert_eq!(FaasErrorKind::Invoke.name(), "FaaSInvokeError");
    }

    /// Validates `ErrorClassification` behavior for the gateway status
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms a wrapped 502 is retryable and a 404 is not.
    /// - Confirms invocation wrappers inherit the severity of their cause.
    #[test]
    fn test_classification() {
        let gateway = FaasError::wrap(
            FaasErrorKind::Invoke,
            "invoke",
            FaasError::new(FaasErrorKind::HttpRequest, "502").with_response(response(502)),
        );
        let missing = FaasError::wrap(
            FaasErrorKind::Invoke,
            "invoke",
            FaasError::new(FaasErrorKind::HttpRequest, "404").with_response(response(404)),
        );
        let transport = FaasError::wrap(
            FaasErrorKind::Invoke,
            "invoke",
            FaasError::new(FaasErrorKind::Transport, "reset"),
        );

        assert!(gateway.is_retryable());
        assert!(!missing.is_retryable());
        assert_eq!(transport.severity(), ErrorSeverity::Warning);
        assert_eq!(missing.severity(), ErrorSeverity::Error);
    }
}
