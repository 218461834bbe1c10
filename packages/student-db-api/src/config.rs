//! API server configuration.

use crate::openapi::DocsInfo;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Timeout for reading a request body, in milliseconds
    pub request_timeout_ms: u64,
    /// Largest accepted request body, in bytes
    pub max_body_bytes: usize,
    /// Time allowed for in-flight connections to finish after shutdown is requested
    pub shutdown_timeout_ms: u64,
    /// Metadata published in the generated API documentation
    pub docs: DocsInfo,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5000,    // 5 seconds default
            max_body_bytes: 1024 * 1024, // 1 MiB default
            shutdown_timeout_ms: 10000,  // 10 seconds default
            docs: DocsInfo::default(),
        }
    }
}
