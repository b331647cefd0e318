//! Error types for the Reagent domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Reagent operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Bridge errors ---
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// The single fatal condition in the agent loop: the reasoning chain
    /// recursed past the configured depth bound.
    #[error("Depth limit reached after {limit} actions, aborting")]
    DepthLimit { limit: u32 },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

/// Failures of the request/response correlation bridge.
///
/// [`BridgeError::Timeout`] and [`BridgeError::Remote`] are deliberately
/// distinct: a timeout means the other end never answered, a remote error
/// means it answered with a failure. Callers that cannot use the
/// distinction collapse both into a fallback observation.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("Remote evaluation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Remote evaluation failed: {0}")]
    Remote(String),

    #[error("Message channel closed")]
    ChannelClosed,
}
