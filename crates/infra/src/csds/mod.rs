//! Service discovery (CSDS) adapter

pub mod client;

pub use client::{bootstrap_host, CsdsClient};
