// One-shot HTTP client for the allergen tracker backend.
//
// Wraps `reqwest::Client` with URL construction and uniform status
// checking. All methods are plain request/response; the live channel
// (src/live) is a separate surface sharing only the base URL.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{
    AnalyzeResponse, FeedLogResponse, HealthStatus, RecomputeReceipt, SnapshotResponse,
    SubmitRequest, SubmitResponse, SuggestionsResponse,
};

/// HTTP client for the tracker's REST surface.
///
/// Two core operations (`fetch_snapshot`, `trigger_recompute`) plus the
/// read-only feed log and the meal-logging collaborators. Non-success
/// statuses become [`Error::Api`] carrying the server's status text,
/// propagated unchanged to the coordinator.
pub struct AllergenClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AllergenClient {
    /// Create a client for the given server root (e.g. `http://tracker.local:8000`).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: Url, http: reqwest::Client) -> Self {
        Self { http, base_url }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Derive the live channel URL from the server root, matching its
    /// transport-security scheme: `http` -> `ws`, `https` -> `wss`.
    pub fn live_url(&self) -> Result<Url, Error> {
        let mut url = self.base_url.join("/ws/allergens")?;
        let scheme = if self.base_url.scheme() == "https" { "wss" } else { "ws" };
        if url.set_scheme(scheme).is_err() {
            return Err(Error::SocketConnect {
                url: self.base_url.to_string(),
                reason: "cannot derive a websocket scheme from this base URL".into(),
            });
        }
        Ok(url)
    }

    // ── Core operations ──────────────────────────────────────────────

    /// Fetch the current full-replacement allergen snapshot.
    pub async fn fetch_snapshot(&self) -> Result<SnapshotResponse, Error> {
        self.get("/api/allergens").await
    }

    /// Trigger a server-side recompute of the allergen state.
    ///
    /// Side-effecting; call at most once per user-initiated refresh. The
    /// receipt does not carry the new snapshot -- follow up with
    /// [`fetch_snapshot`](Self::fetch_snapshot).
    pub async fn trigger_recompute(&self) -> Result<RecomputeReceipt, Error> {
        let url = self.api_url("/api/refresh")?;
        debug!("POST {}", url);
        let resp = self.http.post(url).send().await.map_err(Error::Transport)?;
        Self::parse_response(resp).await
    }

    // ── Read-only history ────────────────────────────────────────────

    /// Fetch the historical feed log.
    pub async fn fetch_feed_log(&self) -> Result<FeedLogResponse, Error> {
        self.get("/api/feeds").await
    }

    /// Check server health.
    pub async fn health(&self) -> Result<HealthStatus, Error> {
        self.get("/api/health").await
    }

    // ── Meal logging collaborators ───────────────────────────────────

    /// Analyze a meal photo into draft components.
    ///
    /// Meal endpoints report failures as a JSON `{detail}` body; that
    /// detail is surfaced as the error message when present.
    pub async fn analyze_meal_photo(
        &self,
        image: Vec<u8>,
        file_name: String,
    ) -> Result<AnalyzeResponse, Error> {
        let url = self.api_url("/api/meals/analyze")?;
        debug!("POST {} ({} bytes)", url, image.len());

        let part = reqwest::multipart::Part::bytes(image).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("image", part);

        let resp = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::parse_response(resp).await
    }

    /// Submit reviewed meal components (one food-name list per component).
    pub async fn submit_meal(&self, components: Vec<Vec<String>>) -> Result<SubmitResponse, Error> {
        let url = self.api_url("/api/meals/submit")?;
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(&SubmitRequest { components })
            .send()
            .await
            .map_err(Error::Transport)?;
        Self::parse_response(resp).await
    }

    /// Fetch the food/allergen autocomplete table.
    pub async fn food_suggestions(&self) -> Result<SuggestionsResponse, Error> {
        self.get("/api/meals/suggestions").await
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path)?;
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::parse_response(resp).await
    }

    /// Check the status and deserialize the body.
    ///
    /// Non-success statuses produce [`Error::Api`] with the server's
    /// `detail` field when the error body is JSON, otherwise the HTTP
    /// status text.
    async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_detail(&body)
                    .unwrap_or_else(|| status_text(status)),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Extract the `detail` field from a JSON error body, if present.
fn error_detail(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Detail {
        detail: String,
    }
    serde_json::from_str::<Detail>(body).ok().map(|d| d.detail)
}

fn status_text(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_owned(), str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_url_matches_transport_scheme() {
        let plain = AllergenClient::from_reqwest(
            "http://tracker.local:8000".parse().expect("url"),
            reqwest::Client::new(),
        );
        assert_eq!(
            plain.live_url().expect("live url").as_str(),
            "ws://tracker.local:8000/ws/allergens"
        );

        let secure = AllergenClient::from_reqwest(
            "https://tracker.example.com".parse().expect("url"),
            reqwest::Client::new(),
        );
        assert_eq!(
            secure.live_url().expect("live url").as_str(),
            "wss://tracker.example.com/ws/allergens"
        );
    }

    #[test]
    fn error_detail_prefers_json_body() {
        assert_eq!(
            error_detail(r#"{"detail": "image too large"}"#).as_deref(),
            Some("image too large")
        );
        assert!(error_detail("Internal Server Error").is_none());
    }
}
