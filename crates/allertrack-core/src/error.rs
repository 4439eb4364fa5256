// ── Core error types ──
//
// User-facing errors from allertrack-core. Consumers never see reqwest
// or tungstenite errors directly; the `From<allertrack_api::Error>` impl
// translates transport-layer failures into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the tracker server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Server errors ────────────────────────────────────────────────
    #[error("Server error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// One-line message suitable for the inline error banner.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<allertrack_api::Error> for CoreError {
    fn from(err: allertrack_api::Error) -> Self {
        match err {
            allertrack_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            allertrack_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            allertrack_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            allertrack_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            allertrack_api::Error::SocketConnect { url, reason }
            | allertrack_api::Error::Socket { url, reason } => {
                CoreError::ConnectionFailed { url, reason }
            }
        }
    }
}
