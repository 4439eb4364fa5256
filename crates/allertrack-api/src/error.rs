use thiserror::Error;

/// Top-level error type for the `allertrack-api` crate.
///
/// Covers every failure mode across both API surfaces: one-shot HTTP
/// requests and the live WebSocket channel. `allertrack-core` maps these
/// into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing or derivation error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Server responses ────────────────────────────────────────────
    /// Non-success HTTP status. Carries the server's status text so the
    /// caller can render it unchanged.
    #[error("Server error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Live channel ────────────────────────────────────────────────
    /// WebSocket upgrade / connection failed.
    #[error("Live channel connection to {url} failed: {reason}")]
    SocketConnect { url: String, reason: String },

    /// Established WebSocket connection failed mid-stream.
    #[error("Live channel error at {url}: {reason}")]
    Socket { url: String, reason: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::SocketConnect { .. } | Self::Socket { .. } => true,
            _ => false,
        }
    }

    /// HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
