// ── Runtime tracker configuration ──
//
// Describes *how* to reach the tracker server. The CLI constructs a
// `TrackerConfig` from its own TOML/env layers and hands it in; core
// never reads disk.

use std::time::Duration;

use allertrack_api::ReconnectPolicy;
use url::Url;

/// Configuration for one tracker instance.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Server root URL (e.g. `http://tracker.local:8000`). The live
    /// channel URL is derived from it unless `live_url` overrides it.
    pub server_url: Url,
    /// Explicit live channel URL, for deployments where the live
    /// endpoint is served from a different host or port. When unset the
    /// channel connects to `ws(s)://<server_url host>/ws/allergens`.
    pub live_url: Option<Url>,
    /// One-shot request timeout.
    pub timeout: Duration,
    /// Backoff tuning for the live channel.
    pub reconnect: ReconnectPolicy,
    /// Open the live channel on start. When disabled, state only moves
    /// on explicit fetch/refresh (on-demand polling).
    pub live_updates: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000"
                .parse()
                .expect("default server URL is valid"),
            live_url: None,
            timeout: Duration::from_secs(30),
            reconnect: ReconnectPolicy::default(),
            live_updates: true,
        }
    }
}
