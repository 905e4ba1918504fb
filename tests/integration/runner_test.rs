#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use thiserror::Error;

use cronguard::application::services::router::{AlertRouter, RouterOptions};
use cronguard::application::services::runner::{JobRunner, JobState};
use cronguard::domain::entities::alert::{AlertDetail, ChannelEvent};
use cronguard::domain::entities::diagnostic::HostInfo;
use cronguard::domain::ports::channel::{AlertChannel, ChannelError};
use cronguard::domain::ports::host::HostProbe;
use cronguard::domain::ports::job::{AlertSender, Job};
use cronguard::domain::value_objects::alert_level::{AlertLevel, LevelSet};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

struct FixedHost;

impl HostProbe for FixedHost {
    fn host_info(&self) -> HostInfo {
        HostInfo {
            host: "batch-01".to_string(),
            os: "Linux 6.1".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Recorded {
    source: String,
    level: AlertLevel,
    title: String,
    detail: Option<String>,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

struct RecordingChannel {
    defaults: LevelSet,
    log: Log,
}

impl AlertChannel for RecordingChannel {
    fn kind(&self) -> &'static str {
        "recording"
    }

    fn default_levels(&self) -> LevelSet {
        self.defaults
    }

    fn deliver(&self, event: &ChannelEvent<'_>) -> Result<u64, ChannelError> {
        self.log.lock().expect("lock").push(Recorded {
            source: event.source.to_string(),
            level: event.level,
            title: event.title.to_string(),
            detail: event.detail.map(str::to_string),
        });
        Ok(1)
    }
}

/// Two sinks like a production setup: a database that tracks everything and
/// a chat channel that only hears about problems.
fn production_router() -> (AlertRouter, Log, Log) {
    let db: Log = Arc::new(Mutex::new(Vec::new()));
    let chat: Log = Arc::new(Mutex::new(Vec::new()));
    let mut router = AlertRouter::new(RouterOptions::default());
    router.register(
        "db",
        Box::new(RecordingChannel {
            defaults: LevelSet::all(),
            log: Arc::clone(&db),
        }),
    );
    router.register(
        "chat",
        Box::new(RecordingChannel {
            defaults: LevelSet::from([AlertLevel::Warning, AlertLevel::Failure]),
            log: Arc::clone(&chat),
        }),
    );
    (router, db, chat)
}

#[derive(Error, Debug)]
#[error("cannot read staging table")]
struct StagingError {
    #[source]
    source: std::io::Error,
}

struct ExportJob {
    fail: bool,
    rows: u32,
}

impl Job for ExportJob {
    type Error = StagingError;

    fn name(&self) -> &str {
        "NightlyExport"
    }

    fn run(&mut self, alerts: &dyn AlertSender) -> Result<(), Self::Error> {
        if self.rows == 0 {
            let detail = AlertDetail::structured([("rows", serde_json::json!(0))]);
            alerts
                .send_alert(AlertLevel::Warning, "Empty export", Some(detail))
                .expect("warning delivered");
        }
        if self.fail {
            return Err(StagingError {
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "staging.csv missing"),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_successful_run_only_reaches_tracking_channel() {
    let (router, db, chat) = production_router();
    let mut runner = JobRunner::new(&router, &FixedHost);

    let outcome = runner.run(&mut ExportJob { fail: false, rows: 10 });

    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.state, JobState::Succeeded);
    assert!(outcome.state.is_terminal());

    let db = db.lock().expect("lock");
    let titles: Vec<&str> = db.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["NightlyExport processing: Job START", "NightlyExport processing: Job FINAL"]
    );
    assert!(db.iter().all(|r| r.source == "NightlyExport"));
    assert!(db.iter().all(|r| r.level == AlertLevel::Success));
    assert!(chat.lock().expect("lock").is_empty());
}

#[test]
fn test_failed_run_reports_diagnostics_everywhere() {
    let (router, db, chat) = production_router();
    let mut runner = JobRunner::new(&router, &FixedHost);

    let outcome = runner.run(&mut ExportJob { fail: true, rows: 10 });

    assert_eq!(outcome.exit_code, 1);
    assert_eq!(outcome.state, JobState::Failed);

    let db = db.lock().expect("lock");
    assert_eq!(db.len(), 2);
    assert_eq!(db[0].level, AlertLevel::Success);
    assert_eq!(db[1].level, AlertLevel::Failure);

    let chat = chat.lock().expect("lock");
    assert_eq!(chat.len(), 1);
    assert_eq!(chat[0].title, "NightlyExport processing: Failure during Job");
    assert_eq!(chat[0].detail, db[1].detail);

    let detail: serde_json::Value =
        serde_json::from_str(chat[0].detail.as_deref().expect("detail")).expect("json");
    assert_eq!(detail["errorKind"], "StagingError");
    assert_eq!(detail["errorMessage"], "cannot read staging table");
    assert_eq!(detail["host"], "batch-01");
    assert_eq!(detail["os"], "Linux 6.1");
    let frames = detail["stackFrames"].as_array().expect("frames");
    assert_eq!(frames.len(), 2);
    assert!(frames[1].as_str().expect("frame").contains("staging.csv missing"));
}

#[test]
fn test_mid_run_warning_goes_to_both_channels() {
    let (router, db, chat) = production_router();
    let mut runner = JobRunner::new(&router, &FixedHost);

    let outcome = runner.run(&mut ExportJob { fail: false, rows: 0 });
    assert_eq!(outcome.exit_code, 0);

    let chat = chat.lock().expect("lock");
    assert_eq!(chat.len(), 1);
    assert_eq!(chat[0].level, AlertLevel::Warning);
    assert_eq!(chat[0].title, "NightlyExport processing: Empty export");
    assert_eq!(chat[0].detail.as_deref(), Some(r#"{"rows":0}"#));
    assert_eq!(db.lock().expect("lock").len(), 3);
}

#[cfg(unix)]
#[test]
fn test_command_job_exit_codes_flow_through_runner() {
    use cronguard::infrastructure::jobs::CommandJob;

    let (router, db, _chat) = production_router();
    let mut runner = JobRunner::new(&router, &FixedHost);

    let mut ok = CommandJob::new("ok", "sh", vec!["-c".into(), "exit 0".into()]);
    assert_eq!(runner.run(&mut ok).exit_code, 0);

    let mut bad = CommandJob::new("bad", "sh", vec!["-c".into(), "exit 7".into()]);
    assert_eq!(runner.run(&mut bad).exit_code, 1);

    let db = db.lock().expect("lock");
    let last = db.last().expect("failure row");
    assert_eq!(last.level, AlertLevel::Failure);
    let detail: serde_json::Value =
        serde_json::from_str(last.detail.as_deref().expect("detail")).expect("json");
    assert_eq!(detail["errorKind"], "CommandError");
}
