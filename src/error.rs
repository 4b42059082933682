//! Error types for the engine lifecycle.

use crate::runtime::ThreadRole;

/// Result type alias using the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by lifecycle and engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration parameter
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested security profile contradicts the fixed transport profile
    #[error("security configuration rejected: {0}")]
    SecurityConfig(String),

    /// A dedicated engine thread failed to come up
    #[error("failed to start {role} thread: {reason}")]
    ThreadStart { role: ThreadRole, reason: String },

    /// Work was dispatched to an engine thread that is no longer running
    #[error("{0} thread is not running")]
    ThreadUnavailable(ThreadRole),

    /// A blocking cross-thread call exceeded its wait bound
    #[error("call dispatched to {role} thread timed out after {waited_ms}ms")]
    DispatchTimeout { role: ThreadRole, waited_ms: u128 },

    /// Media engine assembly error (codec or interceptor registration)
    #[error("media engine error: {0}")]
    MediaEngine(String),

    /// Peer connection construction error
    #[error("peer connection error: {0}")]
    PeerConnection(String),
}
