//! End-to-end tests for timeline reconstruction over HTTP.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};

async fn post_closed_sessions(server: &TestServer, specs: &[(u32, u32, i64)]) {
    for &(hour, min, trades) in specs {
        let login = fixtures::ts(hour, min);
        let logout = fixtures::ts(hour, min + 9);
        let report =
            fixtures::closed_session_report("C1", &login, &logout, trades, trades as f64 * 10.0);
        server
            .post("/api/sync-session")
            .json(&report)
            .await
            .assert_status(StatusCode::CREATED);
    }
}

/// A cumulative counter that drops below the high-water mark marks a bot
/// restart: the baseline resets and deltas are measured from zero again.
#[tokio::test]
async fn test_counter_reset_detection() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    // cumulative trades [3, 5, 2, 6]: the 2 signals a restart
    post_closed_sessions(&server, &[(10, 0, 3), (10, 20, 5), (10, 40, 2), (11, 0, 6)]).await;

    let response = server
        .get(&format!("/api/session-details/C1/{}", fixtures::DAY))
        .await;
    response.assert_status_ok();
    let view: serde_json::Value = response.json();

    let deltas: Vec<i64> = view["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["delta_trades"].as_i64().unwrap())
        .collect();
    assert_eq!(deltas, vec![3, 2, 2, 4]);
    assert_eq!(view["summary"]["total_trades"], 11);
}

/// A closed row repeating the current high-water count is a duplicate
/// report and must not appear.
#[tokio::test]
async fn test_stale_duplicate_row_is_suppressed() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    post_closed_sessions(&server, &[(10, 0, 5), (10, 20, 5)]).await;

    let response = server
        .get(&format!("/api/session-details/C1/{}", fixtures::DAY))
        .await;
    let view: serde_json::Value = response.json();
    assert_eq!(view["events"].as_array().unwrap().len(), 1);
    assert_eq!(view["summary"]["sessions"], 1);
}

/// An open session that has not traded yet is still shown, with zero delta.
#[tokio::test]
async fn test_idle_active_session_is_visible() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    server
        .post("/api/sync-session")
        .json(&fixtures::login_report("C1", "D1", 10, 0))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .get(&format!("/api/session-details/C1/{}", fixtures::DAY))
        .await;
    let view: serde_json::Value = response.json();

    let events = view["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["delta_trades"], 0);
    assert!(events[0]["logout_time"].is_null());
    assert_eq!(view["summary"]["active_sessions"], 1);
}

/// The display date form normalizes to the same day as the ISO form.
#[tokio::test]
async fn test_display_date_form_is_accepted() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    post_closed_sessions(&server, &[(10, 0, 3)]).await;

    let iso: serde_json::Value = server
        .get(&format!("/api/session-details/C1/{}", fixtures::DAY))
        .await
        .json();
    let display: serde_json::Value = server
        .get(&format!("/api/session-details/C1/{}", fixtures::DAY_DISPLAY))
        .await
        .json();

    assert_eq!(iso["events"], display["events"]);
    assert_eq!(iso["date"], display["date"]);
}

/// An unparsable date is an empty day, not an error.
#[tokio::test]
async fn test_unparsable_date_yields_empty_view() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .get("/api/session-details/C1/not-a-date")
        .await;
    response.assert_status_ok();
    let view: serde_json::Value = response.json();

    assert!(view["date"].is_null());
    assert_eq!(view["events"].as_array().unwrap().len(), 0);
    assert_eq!(view["summary"]["sessions"], 0);
    assert_eq!(view["summary"]["mode"], "N/A");
}

/// A client with no rows for the day gets an empty view.
#[tokio::test]
async fn test_unknown_client_yields_empty_view() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .get(&format!("/api/session-details/NOBODY/{}", fixtures::DAY))
        .await;
    response.assert_status_ok();
    let view: serde_json::Value = response.json();
    assert_eq!(view["events"].as_array().unwrap().len(), 0);
    assert_eq!(view["summary"]["mode"], "N/A");
}
