//! Invocation orchestration and the is-implemented result cache

pub mod result_cache;
pub mod service;

pub use result_cache::IsImplementedCache;
pub use service::InvocationService;
