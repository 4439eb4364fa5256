// Tracker coordinator tests against a mock HTTP backend, plus one real
// WebSocket fixture for the live-update path. Reconnect/backoff timing
// is covered by the channel's own tests, and the fetch-vs-update race
// at the store level.

use std::time::Duration;

use futures_util::SinkExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use allertrack_core::{CoreError, ExposureAge, Tracker, TrackerConfig};

fn config_for(server: &MockServer) -> TrackerConfig {
    TrackerConfig {
        server_url: server.uri().parse().expect("mock server url"),
        timeout: Duration::from_secs(5),
        live_updates: false,
        ..TrackerConfig::default()
    }
}

fn snapshot_body(computed_at: &str) -> serde_json::Value {
    json!({
        "allergens": [
            {
                "name": "peanut",
                "days_since_exposure": 4,
                "last_exposure_date": "2026-08-20",
                "foods": ["peanut butter"]
            },
            {
                "name": "dairy",
                "days_since_exposure": null,
                "last_exposure_date": null,
                "foods": []
            }
        ],
        "last_updated": computed_at
    })
}

#[tokio::test]
async fn start_populates_the_snapshot_and_clears_loading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/allergens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("2026-08-24T10:00:00Z")))
        .mount(&server)
        .await;

    let tracker = Tracker::new(config_for(&server)).expect("tracker");
    tracker.start().await;

    let snapshot = tracker.store().current().expect("snapshot after start");
    assert_eq!(snapshot.allergens.len(), 2);
    let peanut = snapshot.get("peanut").expect("peanut row");
    assert_eq!(
        peanut.age,
        ExposureAge::Known {
            days: 4,
            last_exposure: "2026-08-20".parse().expect("date"),
        }
    );
    assert!(snapshot.get("dairy").expect("dairy row").age == ExposureAge::Unknown);

    let view = tracker.view().borrow().clone();
    assert!(!view.loading);
    assert_eq!(view.error, None);

    tracker.shutdown().await;
}

#[tokio::test]
async fn live_update_replaces_the_snapshot_and_clears_the_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/allergens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("2026-08-24T10:00:00Z")))
        .mount(&server)
        .await;

    // Minimal live endpoint: accept one connection, push one update
    // frame, then hold the socket open.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let live_url: url::Url = format!("ws://{}/ws/allergens", listener.local_addr().expect("addr"))
        .parse()
        .expect("live url");
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream).await.expect("handshake");
        let frame = json!({
            "type": "update",
            "allergens": [
                {
                    "name": "dairy",
                    "days_since_exposure": 0,
                    "last_exposure_date": "2026-08-24",
                    "foods": ["yogurt"]
                }
            ],
            "last_updated": "2026-08-24T10:05:00Z"
        })
        .to_string();
        ws.send(Message::Text(frame.into())).await.expect("send update");
        std::future::pending::<()>().await;
    });

    let config = TrackerConfig {
        live_updates: true,
        live_url: Some(live_url),
        ..config_for(&server)
    };
    let tracker = Tracker::new(config).expect("tracker");
    let mut rx = tracker.snapshot();

    tracker.start().await;

    // The initial fetch is computed at 10:00; wait until the 10:05
    // channel update lands (arrival order is not deterministic, the
    // store's monotonic guard is).
    let channel_stamp = "2026-08-24T10:05:00Z"
        .parse::<chrono::DateTime<chrono::Utc>>()
        .expect("timestamp");
    let updated = loop {
        let held = rx.borrow_and_update().clone();
        if let Some(held) = held {
            if held.computed_at == channel_stamp {
                break held;
            }
        }
        rx.changed().await.expect("watch change");
    };

    // Whole replacement: the fetched rows are gone, only the frame's
    // contents remain.
    assert_eq!(updated.allergens.len(), 1);
    let dairy = updated.get("dairy").expect("dairy row");
    assert_eq!(
        dairy.age,
        ExposureAge::Known {
            days: 0,
            last_exposure: "2026-08-24".parse().expect("date"),
        }
    );
    assert_eq!(dairy.foods, vec!["yogurt"]);
    assert!(updated.get("peanut").is_none());

    let view = tracker.view().borrow().clone();
    assert!(!view.loading);
    assert_eq!(view.error, None);

    tracker.shutdown().await;
}

#[tokio::test]
async fn failed_start_records_the_error_and_still_clears_loading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/allergens"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let tracker = Tracker::new(config_for(&server)).expect("tracker");
    tracker.start().await;

    assert!(tracker.store().current().is_none());
    let view = tracker.view().borrow().clone();
    assert!(!view.loading);
    assert!(view.error.is_some(), "expected an inline error");

    tracker.shutdown().await;
}

#[tokio::test]
async fn refresh_recomputes_then_fetches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "message": "recompute complete",
            "last_updated": "2026-08-24T10:05:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/allergens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("2026-08-24T10:05:00Z")))
        .expect(1)
        .mount(&server)
        .await;

    let tracker = Tracker::new(config_for(&server)).expect("tracker");
    let snapshot = tracker.refresh().await.expect("refresh");

    assert_eq!(
        snapshot.computed_at,
        "2026-08-24T10:05:00Z".parse::<chrono::DateTime<chrono::Utc>>().expect("timestamp")
    );
    let view = tracker.view().borrow().clone();
    assert!(!view.loading);
    assert_eq!(view.error, None);

    tracker.shutdown().await;
}

#[tokio::test]
async fn failed_recompute_skips_the_follow_up_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/allergens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("2026-08-24T10:05:00Z")))
        .expect(0)
        .mount(&server)
        .await;

    let tracker = Tracker::new(config_for(&server)).expect("tracker");
    let err = tracker.refresh().await.expect_err("refresh should fail");
    assert!(matches!(err, CoreError::Api { .. }));

    let view = tracker.view().borrow().clone();
    assert!(!view.loading);
    assert!(view.error.is_some());

    tracker.shutdown().await;
}

#[tokio::test]
async fn refresh_error_clears_on_the_next_successful_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/allergens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("2026-08-24T10:00:00Z")))
        .mount(&server)
        .await;

    let tracker = Tracker::new(config_for(&server)).expect("tracker");
    tracker.refresh().await.expect_err("refresh should fail");
    assert!(tracker.view().borrow().error.is_some());

    tracker.fetch_once().await.expect("fetch");
    let view = tracker.view().borrow().clone();
    assert_eq!(view.error, None);
    assert!(tracker.store().current().is_some());

    tracker.shutdown().await;
}

#[tokio::test]
async fn feed_log_and_suggestions_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/feeds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [
                {"timestamp": "2026-08-23T18:30:00Z", "foods": ["yogurt", "toast"]}
            ],
            "total_count": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/meals/suggestions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "suggestions": [
                {"name": "peanut butter", "allergens": ["peanut"]}
            ]
        })))
        .mount(&server)
        .await;

    let tracker = Tracker::new(config_for(&server)).expect("tracker");

    let entries = tracker.feed_log().await.expect("feed log");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].foods, vec!["yogurt", "toast"]);

    let suggestions = tracker.food_suggestions().await.expect("suggestions");
    assert_eq!(suggestions[0].name, "peanut butter");
    assert_eq!(suggestions[0].allergens, vec!["peanut"]);

    tracker.shutdown().await;
}

#[tokio::test]
async fn meal_workflow_converts_draft_and_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/meals/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "components": [
                {"foods": [
                    {"name": "egg", "allergens": ["egg"]},
                    {"name": "toast", "allergens": ["wheat"]}
                ]}
            ],
            "notes": "breakfast plate"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/meals/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "entries": [{"entry_id": "feed-17", "foods": ["egg", "toast"]}],
            "timestamp": "2026-08-24T08:15:00Z"
        })))
        .mount(&server)
        .await;

    let tracker = Tracker::new(config_for(&server)).expect("tracker");

    let draft = tracker
        .analyze_photo(vec![0xff, 0xd8], "meal.jpg".into())
        .await
        .expect("analyze");
    assert_eq!(draft.notes, "breakfast plate");
    assert_eq!(draft.components[0].foods[1].name, "toast");

    let receipt = tracker.submit_meal(draft).await.expect("submit");
    assert_eq!(receipt.entry_ids, vec!["feed-17"]);

    tracker.shutdown().await;
}

#[tokio::test]
async fn snapshot_subscribers_see_the_initial_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/allergens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_body("2026-08-24T10:00:00Z")))
        .mount(&server)
        .await;

    let tracker = Tracker::new(config_for(&server)).expect("tracker");
    let mut rx = tracker.snapshot();
    assert!(rx.borrow().is_none());

    tracker.start().await;

    rx.changed().await.expect("watch change");
    let snapshot = rx.borrow_and_update().clone().expect("snapshot");
    assert_eq!(snapshot.allergens.len(), 2);

    tracker.shutdown().await;
}
