use chrono::{DateTime, Duration, TimeZone, Utc};
use hubmine_collector::Progress;
use hubmine_core::{CollectionMode, ConfigError, FetchMode};
use hubmine_github::fake::{self, FakeGitHub};
use hubmine_github::{Contributor, GitHubApi};
use hubmine_miner::{MinerError, MiningOrchestrator, RunOptions};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
}

fn entities(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

fn alice_and_bob() -> FakeGitHub {
    FakeGitHub::new()
        .with_user(fake::user("alice", 10, 1, 1))
        .with_user(fake::user("bob", 3, 3, 0))
        .with_repos("alice", vec![fake::repo("alice", "tool")])
        .with_commits(
            "alice/tool",
            vec![fake::commit("a1", Some("alice"), now() - Duration::days(3), "feat: go")],
        )
}

fn contributor(login: &str, account_type: &str) -> Contributor {
    Contributor {
        login: login.to_string(),
        account_type: account_type.to_string(),
        contributions: 1,
    }
}

struct Harness {
    api: Arc<FakeGitHub>,
    miner: MiningOrchestrator,
    messages: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    fn new(api: FakeGitHub) -> Self {
        let api = Arc::new(api);
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let miner = MiningOrchestrator::new(Arc::clone(&api) as Arc<dyn GitHubApi>)
            .with_now(now())
            .with_progress(Progress::new(Arc::new(move |msg: &str| {
                sink.lock().expect("lock").push(msg.to_string());
            })));
        Self {
            api,
            miner,
            messages,
        }
    }

    fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("lock").clone()
    }

    fn saw(&self, prefix: &str) -> bool {
        self.messages().iter().any(|m| m.starts_with(prefix))
    }
}

#[tokio::test]
async fn test_alice_and_bob_saved_immediately() {
    let dir = TempDir::new().expect("temp dir");
    let harness = Harness::new(alice_and_bob());
    let options = RunOptions::default()
        .with_max_workers(2)
        .save_to(dir.path().join("t"));

    let records = harness
        .miner
        .run(&entities(&["alice", "bob"]), &options)
        .await
        .expect("run");

    let mut names: Vec<_> = records.iter().map(|r| r.username().to_string()).collect();
    names.sort();
    assert_eq!(names, ["alice", "bob"]);

    let json = std::fs::read_to_string(dir.path().join("t_raw.json")).expect("json file");
    let array: Vec<Value> = serde_json::from_str(&json).expect("valid array");
    assert_eq!(array.len(), 2);
    let csv = std::fs::read_to_string(dir.path().join("t_ml_features.csv")).expect("csv file");
    assert_eq!(csv.lines().count(), 3);

    assert!(harness.saw("Starting data collection (recent commits) for alice"));
    assert!(harness.saw("Data for alice collected and saved immediately"));
    assert!(harness.saw("Data for bob collected and saved immediately"));
    assert!(harness.saw("✓ Completed alice - Progress: "));
    assert!(harness.saw("✓ Completed bob - Progress: "));
    assert_eq!(
        harness.messages().last().map(String::as_str),
        Some("All data collection completed! 2/2 users successfully processed and saved")
    );

    let alice = records
        .iter()
        .find(|r| r.username() == "alice")
        .expect("alice record");
    assert_eq!(alice.commit_activity.total_recent_commits, 1);

    let bob = records
        .iter()
        .find(|r| r.username() == "bob")
        .expect("bob record");
    assert_eq!(bob.commit_activity.total_repositories, 0);
    assert_eq!(bob.commit_activity.repositories_analyzed, 0);
    assert_eq!(bob.commit_activity.total_recent_commits, 0);
    assert!(bob.commit_activity.active_days.is_empty());
    assert!(bob.commit_activity.most_active_repo.is_none());
    assert!(bob.commit_activity.total_commits.is_none());
    assert_eq!(bob.commit_activity.fetch_mode, FetchMode::Windowed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_worker_pool_bounds_entities_in_flight() {
    let logins: Vec<String> = (0..6).map(|i| format!("dev{i}")).collect();
    let api = logins
        .iter()
        .fold(FakeGitHub::new(), |api, login| {
            api.with_user(fake::user(login, 0, 0, 0))
        })
        .with_user_latency(StdDuration::from_millis(25));
    let harness = Harness::new(api);

    let records = harness
        .miner
        .run(&logins, &RunOptions::default().with_max_workers(2))
        .await
        .expect("run");

    assert_eq!(records.len(), 6);
    assert_eq!(harness.api.call_count("get_user"), 6);
    assert_eq!(harness.api.peak_users_in_flight(), 2);
    assert_eq!(
        harness.messages().last().map(String::as_str),
        Some("All data collection completed! 6/6 users successfully processed")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_worker_never_overlaps() {
    let api = alice_and_bob().with_user_latency(StdDuration::from_millis(10));
    let harness = Harness::new(api);

    let records = harness
        .miner
        .run(
            &entities(&["alice", "bob", "alice"]),
            &RunOptions::default().with_max_workers(1),
        )
        .await
        .expect("run");

    assert_eq!(records.len(), 3);
    assert_eq!(harness.api.peak_users_in_flight(), 1);
}

#[tokio::test]
async fn test_failed_entities_are_counted_not_raised() {
    let harness = Harness::new(alice_and_bob());

    let records = harness
        .miner
        .run(
            &entities(&["alice", "ghost", "not a login!"]),
            &RunOptions::default().with_max_workers(1),
        )
        .await
        .expect("run");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].username(), "alice");
    assert!(harness.saw("✓ Completed alice - Progress: 1/3 (1 successful, 0 failed)"));
    assert!(harness.saw("✗ Failed ghost - Progress: 2/3 (1 successful, 1 failed)"));
    assert!(harness.saw("✗ Failed not a login! - Progress: 3/3 (1 successful, 2 failed)"));
    assert_eq!(
        harness.messages().last().map(String::as_str),
        Some("All data collection completed! 1/3 users successfully processed")
    );
}

#[tokio::test]
async fn test_single_worker_runs_in_order() {
    let harness = Harness::new(alice_and_bob());

    let records = harness
        .miner
        .run(
            &entities(&["bob", "alice"]),
            &RunOptions::default()
                .with_max_workers(1)
                .with_mode(CollectionMode::all_commits()),
        )
        .await
        .expect("run");

    let names: Vec<_> = records.iter().map(|r| r.username()).collect();
    assert_eq!(names, ["bob", "alice"]);
    assert_eq!(records[1].commit_activity.total_commits, Some(1));
    assert!(harness.saw("Starting data collection (all commits) for bob"));
}

#[tokio::test]
async fn test_cancelled_before_run_does_nothing() {
    let dir = TempDir::new().expect("temp dir");
    let token = CancellationToken::new();
    token.cancel();
    let harness = Harness::new(alice_and_bob());
    let miner = harness.miner.with_cancellation(token);

    let records = miner
        .run(
            &entities(&["alice", "bob"]),
            &RunOptions::default().save_to(dir.path().join("t")),
        )
        .await
        .expect("run");

    assert!(records.is_empty());
    assert!(harness.api.calls().is_empty());
    assert!(!dir.path().join("t_raw.json").exists());
    assert!(!dir.path().join("t_ml_features.csv").exists());
}

#[tokio::test]
async fn test_cancelled_mid_run_stops_dispatching() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    let api = alice_and_bob().on_call(move |endpoint| {
        if endpoint == "list_following" {
            trigger.cancel();
        }
    });
    let harness = Harness::new(api);
    let miner = harness.miner.with_cancellation(token);

    let records = miner
        .run(
            &entities(&["alice", "bob"]),
            &RunOptions::default().with_max_workers(1),
        )
        .await
        .expect("run");

    assert!(records.is_empty());
    assert_eq!(harness.api.call_count("get_user"), 1);
}

#[tokio::test]
async fn test_missing_basename_rejected_before_dispatch() {
    let harness = Harness::new(alice_and_bob());
    let options = RunOptions {
        save_immediately: true,
        ..RunOptions::default()
    };

    let err = harness
        .miner
        .run(&entities(&["alice"]), &options)
        .await
        .expect_err("missing basename");

    assert!(matches!(
        err,
        MinerError::Config(ConfigError::MissingSinkBasename)
    ));
    assert!(harness.api.calls().is_empty());
    assert!(harness.messages().is_empty());
}

#[tokio::test]
async fn test_mine_repository_contributors() {
    let api = alice_and_bob().with_contributors(
        "acme/widget",
        vec![
            contributor("alice", "User"),
            contributor("dependabot[bot]", "Bot"),
            contributor("bob", "User"),
        ],
    );
    let harness = Harness::new(api);

    let records = harness
        .miner
        .mine_repository_contributors("https://github.com/acme/widget.git", &RunOptions::default())
        .await
        .expect("mine contributors");

    assert_eq!(records.len(), 2);
    assert!(harness.saw("Getting contributors for acme/widget"));
    assert!(harness.saw("Found 2 contributors: alice, bob"));
    assert!(harness.saw("Starting to mine data (recent commits) for 2 contributors..."));
    assert_eq!(
        harness.messages().last().map(String::as_str),
        Some("Repository mining completed! 2/2 contributors processed")
    );
}

#[tokio::test]
async fn test_contributor_preview_is_truncated() {
    let logins: Vec<String> = (0..12).map(|i| format!("dev{i:02}")).collect();
    let api = logins.iter().fold(
        FakeGitHub::new().with_contributors(
            "acme/big",
            logins.iter().map(|l| contributor(l, "User")).collect(),
        ),
        |api, login| api.with_user(fake::user(login, 0, 0, 0)),
    );
    let harness = Harness::new(api);

    let records = harness
        .miner
        .mine_repository_contributors(
            "https://github.com/acme/big",
            &RunOptions::default().with_max_workers(4),
        )
        .await
        .expect("mine contributors");

    assert_eq!(records.len(), 12);
    assert!(harness.saw(
        "Found 12 contributors: dev00, dev01, dev02, dev03, dev04, dev05, dev06, dev07, dev08, dev09"
    ));
    assert!(harness.saw("... and 2 more"));
}

#[tokio::test]
async fn test_repository_without_contributors() {
    let harness = Harness::new(FakeGitHub::new());

    let records = harness
        .miner
        .mine_repository_contributors("https://github.com/acme/empty", &RunOptions::default())
        .await
        .expect("mine contributors");

    assert!(records.is_empty());
    assert!(harness.saw("No contributors found for this repository"));
    assert_eq!(harness.api.call_count("get_user"), 0);
}

#[tokio::test]
async fn test_contributor_listing_failure_is_returned() {
    let harness = Harness::new(alice_and_bob().failing("list_contributors"));

    let err = harness
        .miner
        .mine_repository_contributors("https://github.com/acme/widget", &RunOptions::default())
        .await
        .expect_err("listing fails");

    assert!(matches!(err, MinerError::Upstream(_)));
}

#[tokio::test]
async fn test_invalid_repository_url() {
    let harness = Harness::new(FakeGitHub::new());

    for url in ["", "https://gitlab.com/acme/widget"] {
        let err = harness
            .miner
            .mine_repository_contributors(url, &RunOptions::default())
            .await
            .expect_err("invalid url");
        assert!(matches!(err, MinerError::Config(ConfigError::InvalidValue { .. })));
    }
    assert!(harness.api.calls().is_empty());
}
