//! Channel adapters against real sinks: a wiremock chat endpoint and a
//! temporary SQLite file.
#![allow(clippy::expect_used)]

use std::time::Duration;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cronguard::application::config::AppConfig;
use cronguard::domain::entities::alert::{AlertDetail, ChannelEvent};
use cronguard::domain::ports::channel::{AlertChannel, ChannelError};
use cronguard::domain::ports::connection::ConnectionProvider;
use cronguard::domain::value_objects::alert_level::AlertLevel;
use cronguard::infrastructure::channels::{create_alert_router, DataStoreChannel, WebhookChannel};
use cronguard::infrastructure::persistence::{initialize_alert_table, SqliteConnector};

// ---------------------------------------------------------------------------
// Webhook
// ---------------------------------------------------------------------------

/// The blocking client owns its own runtime, so it is built, used and
/// dropped off the async test runtime.
async fn deliver_to(endpoint: String, level: AlertLevel, detail: Option<String>) -> Result<u64, ChannelError> {
    tokio::task::spawn_blocking(move || {
        let channel = WebhookChannel::new(endpoint, "etl-bot", "production", Duration::from_secs(5))?;
        channel.deliver(&ChannelEvent {
            source: "NightlyExport",
            level,
            title: "NightlyExport processing: Failure during Job",
            detail: detail.as_deref(),
        })
    })
    .await
    .expect("blocking task")
}

#[tokio::test]
async fn test_webhook_posts_attachment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/hooks/cron"))
        .and(body_partial_json(serde_json::json!({
            "username": "etl-bot",
            "attachments": [{
                "color": "danger",
                "title": "FAILURE: NightlyExport processing: Failure during Job",
                "text": "```#0 boom```"
            }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let detail = AlertDetail::structured([
        ("errorKind", serde_json::json!("ExportError")),
        ("stackFrames", serde_json::json!(["#0 boom"])),
    ])
    .to_wire();

    let written = deliver_to(
        format!("{}/hooks/cron", mock_server.uri()),
        AlertLevel::Failure,
        Some(detail),
    )
    .await
    .expect("delivered");
    assert_eq!(written, 1);
}

#[tokio::test]
async fn test_webhook_non_success_status_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = deliver_to(mock_server.uri(), AlertLevel::Warning, None)
        .await
        .expect_err("500 must fail");
    assert!(
        matches!(err, ChannelError::Rejected { status: 500, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_webhook_unreachable_endpoint_is_http_error() {
    // Nothing listens on the discard port.
    let err = deliver_to("http://127.0.0.1:9/hook".to_string(), AlertLevel::Failure, None)
        .await
        .expect_err("connection refused");
    assert!(matches!(err, ChannelError::Http { .. }), "got {err:?}");
}

// ---------------------------------------------------------------------------
// Datastore
// ---------------------------------------------------------------------------

fn prepared_db(dir: &tempfile::TempDir) -> String {
    let path = dir.path().join("alerts.db").to_string_lossy().into_owned();
    let connector = SqliteConnector::new(&path).creating();
    let conn = connector.connect().expect("open");
    initialize_alert_table(&conn, "cron_alerts").expect("schema");
    path
}

fn statuses(path: &str) -> Vec<i64> {
    let conn = rusqlite::Connection::open(path).expect("open");
    let mut stmt = conn
        .prepare("SELECT status FROM cron_alerts ORDER BY id")
        .expect("prepare");
    stmt.query_map([], |row| row.get(0))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("rows")
}

#[test]
fn test_datastore_persists_level_codes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = prepared_db(&dir);
    let channel = DataStoreChannel::new(Box::new(SqliteConnector::new(&path)), "cron_alerts", "staging");

    for level in AlertLevel::ALL {
        let event = ChannelEvent {
            source: "loader",
            level,
            title: "t",
            detail: None,
        };
        assert_eq!(channel.deliver(&event).expect("insert"), 1);
    }
    assert_eq!(statuses(&path), vec![0, 1, 2]);
}

#[test]
fn test_router_from_config_writes_every_level_to_datastore() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = prepared_db(&dir);
    let toml_str = format!("[staging.datastore]\npath = {path:?}\n");
    let config = AppConfig::from_toml(&toml_str, "staging").expect("parse");
    let router = create_alert_router(&config).expect("router");

    for level in AlertLevel::ALL {
        assert_eq!(router.send("loader", level, "event", None).expect("dispatch"), 1);
    }
    assert_eq!(statuses(&path), vec![0, 1, 2]);

    let conn = rusqlite::Connection::open(&path).expect("open");
    let env: String = conn
        .query_row("SELECT env FROM cron_alerts LIMIT 1", [], |row| row.get(0))
        .expect("env");
    assert_eq!(env, "staging");
}
