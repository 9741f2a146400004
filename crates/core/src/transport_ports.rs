//! HTTP transport port
//!
//! The orchestrator hands fully built requests to a [`Transport`]. Retrying
//! transient failures is the transport's job; the orchestrator never retries.

use std::collections::BTreeMap;

use async_trait::async_trait;
use faas_domain::{HttpMethod, Response, Result};
use serde_json::Value;
use uuid::Uuid;

/// A request ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    /// JSON body, sent only when present
    pub body: Option<Value>,
}

/// Sends HTTP requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request
    ///
    /// Any received status yields `Ok`, with `ok` reflecting success. `Err` is
    /// reserved for failures where no usable response was received, and
    /// carries the `FaaSTransportError` kind.
    async fn fetch(&self, request: FetchRequest) -> Result<Response>;
}

/// Produces request ids for the `X-Request-ID` header
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_produces_distinct_ids() {
        let ids = UuidGenerator;
        let a = ids.generate();
        let b = ids.generate();

        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }
}
