//! End-to-end poll cycles: scripted marketplace, real client and ledger,
//! recording collaborators.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::watch;

use jobsniper::adapter::outbound::http::{RetryPolicy, RetryingTransport};
use jobsniper::adapter::outbound::ledger::JsonFileLedger;
use jobsniper::adapter::outbound::upwork::{CredentialStore, TokenConfig, TokenManager, UpworkClient};
use jobsniper::application::{Poller, PollerConfig};
use jobsniper::domain::SearchCriterion;
use jobsniper::error::{ApiError, Error};
use jobsniper::port::{RequestBody, SeenLedger};
use jobsniper::testkit::collaborators::{MemoryCredentials, RecordingNotifier, ScriptedAnalyzer};
use jobsniper::testkit::domain::{credentials, graphql_error_body, posting_node, search_body};
use jobsniper::testkit::transport::ScriptedTransport;

const GRAPHQL: &str = "api.test/graphql";
const TOKEN: &str = "auth.test/oauth2/token";

struct Setup {
    transport: Arc<ScriptedTransport>,
    ledger: Arc<JsonFileLedger>,
    notifier: RecordingNotifier,
    _dir: tempfile::TempDir,
}

impl Setup {
    fn new(transport: ScriptedTransport) -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self {
            transport: Arc::new(transport),
            ledger: Arc::new(JsonFileLedger::open(dir.path().join("seen_jobs.json"))),
            notifier: RecordingNotifier::new(),
            _dir: dir,
        }
    }

    fn with_notifier(mut self, notifier: RecordingNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    fn client(&self) -> Arc<UpworkClient> {
        let store = Arc::new(CredentialStore::new(
            credentials(),
            Arc::new(MemoryCredentials::new()),
        ));
        let tokens = Arc::new(TokenManager::new(
            TokenConfig {
                token_url: format!("https://{TOKEN}"),
                refresh_interval: Duration::from_secs(3000),
                refresh_on_start: false,
            },
            store,
            self.transport.clone(),
        ));
        let retrying = RetryingTransport::new(
            self.transport.clone(),
            RetryPolicy {
                max_retries: 1,
                backoff_factor: 0.0,
            },
        );
        Arc::new(UpworkClient::new(
            format!("https://{GRAPHQL}"),
            Arc::new(retrying),
            tokens,
        ))
    }

    fn poller(&self, criteria: Vec<SearchCriterion>) -> Poller {
        Poller::new(
            self.client(),
            self.ledger.clone(),
            Arc::new(self.notifier.clone()),
            criteria,
            PollerConfig {
                interval: Duration::from_secs(3600),
                posting_delay: Duration::ZERO,
                min_score: 7,
            },
        )
        .unwrap()
    }

    fn searched_queries(&self) -> Vec<String> {
        self.transport
            .requests_to(GRAPHQL)
            .iter()
            .filter_map(|request| match &request.body {
                RequestBody::Json(body) => body["variables"]["marketPlaceJobFilter"]
                    ["titleExpression_eq"]
                    .as_str()
                    .map(ToOwned::to_owned),
                RequestBody::Form(_) => None,
            })
            .collect()
    }
}

fn wordpress() -> SearchCriterion {
    SearchCriterion::new("wordpress", 30, 500, 10)
}

#[tokio::test]
async fn new_posting_is_notified_once_across_cycles() {
    let setup = Setup::new(ScriptedTransport::new().respond_always(
        GRAPHQL,
        200,
        search_body(vec![posting_node("abc", "2024-03-01T10:00:00Z")]),
    ));
    let mut poller = setup.poller(vec![wordpress()]);
    let (_tx, mut rx) = watch::channel(false);

    let first = poller.run_cycle(&mut rx).await.unwrap();
    assert_eq!(setup.notifier.ids(), ["abc"]);
    assert!(!setup.ledger.is_new("abc"));
    assert_eq!((first.found, first.new, first.notified), (1, 1, 1));

    let second = poller.run_cycle(&mut rx).await.unwrap();
    assert_eq!(setup.notifier.len(), 1);
    assert_eq!((second.found, second.new, second.notified), (1, 0, 0));
}

#[tokio::test]
async fn seen_ids_survive_a_new_poller() {
    let setup = Setup::new(ScriptedTransport::new().respond_always(
        GRAPHQL,
        200,
        search_body(vec![posting_node("abc", "2024-03-01T10:00:00Z")]),
    ));
    let (_tx, mut rx) = watch::channel(false);
    setup.poller(vec![wordpress()]).run_cycle(&mut rx).await.unwrap();

    let reopened = Arc::new(JsonFileLedger::open(setup.ledger.path()));
    let notifier = RecordingNotifier::new();
    let mut restarted = Poller::new(
        setup.client(),
        reopened,
        Arc::new(notifier.clone()),
        vec![wordpress()],
        PollerConfig::default(),
    )
    .unwrap();
    restarted.run_cycle(&mut rx).await.unwrap();

    assert!(notifier.is_empty());
}

#[tokio::test]
async fn postings_are_notified_newest_first() {
    let setup = Setup::new(ScriptedTransport::new().respond(
        GRAPHQL,
        200,
        search_body(vec![
            posting_node("t0", "2024-03-01T10:00:00Z"),
            posting_node("t2", "2024-03-01T12:00:00Z"),
            posting_node("t1", "2024-03-01T11:00:00Z"),
        ]),
    ));
    let mut poller = setup.poller(vec![wordpress()]);
    let (_tx, mut rx) = watch::channel(false);

    poller.run_cycle(&mut rx).await.unwrap();

    assert_eq!(setup.notifier.ids(), ["t2", "t1", "t0"]);
}

#[tokio::test]
async fn low_scores_are_recorded_but_not_notified() {
    let setup = Setup::new(ScriptedTransport::new().respond(
        GRAPHQL,
        200,
        search_body(vec![
            posting_node("good", "2024-03-01T12:00:00Z"),
            posting_node("weak", "2024-03-01T11:00:00Z"),
        ]),
    ));
    let analyzer = ScriptedAnalyzer::new(vec![Some(9), Some(3)]);
    let mut poller = setup
        .poller(vec![wordpress()])
        .with_analyzer(Arc::new(analyzer.clone()));
    let (_tx, mut rx) = watch::channel(false);

    let report = poller.run_cycle(&mut rx).await.unwrap();

    assert_eq!(setup.notifier.ids(), ["good"]);
    assert_eq!(setup.notifier.scores(), [Some(9)]);
    assert_eq!(report.below_threshold, 1);
    assert_eq!(analyzer.calls(), 2);
    assert!(!setup.ledger.is_new("weak"));
}

#[tokio::test]
async fn failed_analysis_still_notifies_without_score() {
    let setup = Setup::new(ScriptedTransport::new().respond(
        GRAPHQL,
        200,
        search_body(vec![posting_node("abc", "2024-03-01T10:00:00Z")]),
    ));
    let mut poller = setup
        .poller(vec![wordpress()])
        .with_analyzer(Arc::new(ScriptedAnalyzer::new(vec![None])));
    let (_tx, mut rx) = watch::channel(false);

    poller.run_cycle(&mut rx).await.unwrap();

    assert_eq!(setup.notifier.scores(), [None]);
    assert!(!setup.ledger.is_new("abc"));
}

#[tokio::test]
async fn failed_notification_is_not_retried() {
    let setup = Setup::new(ScriptedTransport::new().respond_always(
        GRAPHQL,
        200,
        search_body(vec![posting_node("abc", "2024-03-01T10:00:00Z")]),
    ))
    .with_notifier(RecordingNotifier::failing());
    let mut poller = setup.poller(vec![wordpress()]);
    let (_tx, mut rx) = watch::channel(false);

    let report = poller.run_cycle(&mut rx).await.unwrap();
    assert_eq!(report.failed_notifications, 1);
    assert_eq!(report.notified, 0);
    assert!(!setup.ledger.is_new("abc"));

    poller.run_cycle(&mut rx).await.unwrap();
    assert_eq!(setup.notifier.len(), 1);
}

#[tokio::test]
async fn posting_without_description_is_completed_from_details() {
    let mut bare = posting_node("abc", "2024-03-01T10:00:00Z");
    bare["description"] = json!(null);
    let mut full = posting_node("abc", "2024-03-01T10:00:00Z");
    full["title"] = json!("Full title");
    let setup = Setup::new(
        ScriptedTransport::new()
            .respond(GRAPHQL, 200, search_body(vec![bare]))
            .respond(GRAPHQL, 200, json!({ "data": { "job": full } }).to_string()),
    );
    let analyzer = ScriptedAnalyzer::new(vec![Some(8)]);
    let mut poller = setup
        .poller(vec![wordpress()])
        .with_analyzer(Arc::new(analyzer));
    let (_tx, mut rx) = watch::channel(false);

    poller.run_cycle(&mut rx).await.unwrap();

    assert_eq!(setup.transport.count_for(GRAPHQL), 2);
    assert_eq!(setup.notifier.ids(), ["abc"]);
}

#[tokio::test]
async fn failed_details_fall_back_to_summary() {
    let mut bare = posting_node("abc", "2024-03-01T10:00:00Z");
    bare["description"] = json!(null);
    let setup = Setup::new(
        ScriptedTransport::new()
            .respond(GRAPHQL, 200, search_body(vec![bare]))
            .respond(GRAPHQL, 200, json!({ "data": { "job": null } }).to_string()),
    );
    let mut poller = setup.poller(vec![wordpress()]);
    let (_tx, mut rx) = watch::channel(false);

    poller.run_cycle(&mut rx).await.unwrap();

    assert_eq!(setup.notifier.ids(), ["abc"]);
    assert!(!setup.ledger.is_new("abc"));
}

#[tokio::test]
async fn criteria_are_used_round_robin() {
    let setup = Setup::new(ScriptedTransport::new().respond_always(GRAPHQL, 200, search_body(vec![])));
    let mut poller = setup.poller(vec![
        SearchCriterion::new("wordpress", 30, 500, 10),
        SearchCriterion::new("shopify", 40, 800, 5),
    ]);
    let (_tx, mut rx) = watch::channel(false);

    for _ in 0..3 {
        poller.run_cycle(&mut rx).await.unwrap();
    }

    assert_eq!(setup.searched_queries(), ["wordpress", "shopify", "wordpress"]);
}

#[tokio::test]
async fn search_errors_are_recoverable_per_cycle() {
    let setup = Setup::new(
        ScriptedTransport::new()
            .respond(GRAPHQL, 200, graphql_error_body(&["Bad filter"]))
            .respond(GRAPHQL, 200, search_body(vec![posting_node("abc", "2024-03-01T10:00:00Z")])),
    );
    let mut poller = setup.poller(vec![wordpress()]);
    let (_tx, mut rx) = watch::channel(false);

    let err = poller.run_cycle(&mut rx).await.unwrap_err();
    assert!(!err.is_fatal());

    poller.run_cycle(&mut rx).await.unwrap();
    assert_eq!(setup.notifier.ids(), ["abc"]);
}

#[tokio::test]
async fn authentication_failure_stops_the_loop() {
    let setup = Setup::new(
        ScriptedTransport::new()
            .respond_always(GRAPHQL, 401, "unauthorized")
            .respond_always(TOKEN, 400, r#"{"error":"invalid_grant"}"#),
    );
    let mut poller = setup.poller(vec![wordpress()]);
    let (_tx, rx) = watch::channel(false);

    let result = tokio::time::timeout(Duration::from_secs(5), poller.run(rx))
        .await
        .expect("poller should stop on its own");

    assert!(matches!(result, Err(Error::Api(ApiError::Authentication(_)))));
    assert!(setup.notifier.is_empty());
}

#[tokio::test]
async fn shutdown_before_start_skips_polling() {
    let setup = Setup::new(ScriptedTransport::new());
    let mut poller = setup.poller(vec![wordpress()]);
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    poller.run(rx).await.unwrap();

    assert_eq!(setup.transport.request_count(), 0);
}

#[tokio::test]
async fn shutdown_interrupts_the_sleep() {
    let setup = Setup::new(ScriptedTransport::new().respond_always(GRAPHQL, 200, search_body(vec![])));
    let mut poller = setup.poller(vec![wordpress()]);
    let (tx, rx) = watch::channel(false);

    let handle = tokio::spawn(async move { poller.run(rx).await });
    while setup.transport.count_for(GRAPHQL) == 0 {
        tokio::task::yield_now().await;
    }
    tx.send(true).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("poller should stop promptly")
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(setup.transport.count_for(GRAPHQL), 1);
}

#[test]
fn empty_criteria_are_rejected() {
    let setup = Setup::new(ScriptedTransport::new());
    let result = Poller::new(
        setup.client(),
        setup.ledger.clone(),
        Arc::new(RecordingNotifier::new()),
        Vec::new(),
        PollerConfig::default(),
    );

    assert!(matches!(result, Err(ref e) if e.is_fatal()));
}
