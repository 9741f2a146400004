//! HTTP transport adapter

pub mod client;

pub use client::{parse_body, HttpTransport, HttpTransportBuilder, TransientErrorCode};
