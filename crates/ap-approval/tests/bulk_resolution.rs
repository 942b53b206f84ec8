// bulk_resolution.rs — Partial failure in bulk approval.
//
// A reviewer approves several subjects at once while some appends fail.
// VERIFY:
//   - the outcome counts N-K successes and K failures
//   - the K failed subjects are exactly what is still pending
//   - successes are not rolled back, failures are not retried
//   - dropping the caller does not cancel dispatched resolves

mod common;

use std::time::Duration;

use ap_approval::{ApprovalQueue, Decision, Onboarding};
use ap_store::{ApprovalStatus, ErrorKind, PersistenceGateway};

use common::{content, seed_subjects, subject_ids, FlakyGateway};

const REVIEWER: &str = "m-1";

async fn submitted(subjects: &[&str]) -> (std::sync::Arc<FlakyGateway>, ApprovalQueue) {
    let gw = FlakyGateway::new();
    seed_subjects(&gw, REVIEWER, subjects).await;
    let onboarding = Onboarding::new(gw.clone(), gw.clone());
    for subject in subjects {
        onboarding.submit(subject, content(subject)).await.unwrap();
    }
    (gw.clone(), ApprovalQueue::new(gw))
}

#[tokio::test]
async fn one_failure_in_three() {
    let (gw, queue) = submitted(&["a", "b", "c"]).await;
    gw.fail_appends_for("b");

    let outcome = queue
        .resolve_bulk(["a", "b", "c"], Decision::Approved, REVIEWER)
        .await;

    assert_eq!((outcome.approved_count, outcome.failed_count), (2, 1));
    assert_eq!(outcome.failed_subjects(), vec!["b"]);
    assert_eq!(
        outcome.failures[0].error.kind(),
        ErrorKind::GatewayUnavailable
    );
    assert_eq!(
        subject_ids(&queue.pending(REVIEWER).await.unwrap()),
        vec!["b".to_string()]
    );

    // Successes stay resolved.
    for subject in ["a", "c"] {
        let latest = gw.latest_approval(subject).await.unwrap().unwrap();
        assert_eq!(latest.status, ApprovalStatus::Approved);
    }
}

#[tokio::test]
async fn k_forced_failures_out_of_n() {
    let subjects = ["s1", "s2", "s3", "s4", "s5"];
    let failing = ["s2", "s5"];
    let (gw, queue) = submitted(&subjects).await;
    for subject in failing {
        gw.fail_appends_for(subject);
    }

    let outcome = queue
        .resolve_bulk(subjects, Decision::Rejected, REVIEWER)
        .await;
    assert_eq!(outcome.approved_count, subjects.len() - failing.len());
    assert_eq!(outcome.failed_count, failing.len());
    assert_eq!(outcome.to_string(), "3 succeeded, 2 failed");

    let still_pending = subject_ids(&queue.pending(REVIEWER).await.unwrap());
    assert_eq!(still_pending, vec!["s2".to_string(), "s5".to_string()]);
}

#[tokio::test]
async fn caller_retries_only_the_failures() {
    let (gw, queue) = submitted(&["a", "b", "c"]).await;
    gw.fail_appends_for("b");
    let first = queue
        .resolve_bulk(["a", "b", "c"], Decision::Approved, REVIEWER)
        .await;

    gw.heal();
    let retry = queue
        .resolve_bulk(first.failed_subjects(), Decision::Approved, REVIEWER)
        .await;
    assert_eq!((retry.approved_count, retry.failed_count), (1, 0));
    assert!(queue.pending(REVIEWER).await.unwrap().is_empty());
    // a and c were not resolved twice.
    assert_eq!(gw.inner.approval_row_count().await, 6);
}

#[tokio::test]
async fn already_resolved_and_transport_failures_are_distinguishable() {
    let (gw, queue) = submitted(&["a", "b", "c"]).await;
    queue.resolve("a", Decision::Rejected, REVIEWER).await.unwrap();
    gw.fail_appends_for("c");

    let outcome = queue
        .resolve_bulk(["a", "b", "c"], Decision::Approved, REVIEWER)
        .await;
    let kinds: Vec<ErrorKind> = outcome.failures.iter().map(|f| f.error.kind()).collect();
    assert_eq!(kinds, vec![ErrorKind::NotPending, ErrorKind::GatewayUnavailable]);
}

#[tokio::test]
async fn abandoned_bulk_still_resolves_everything() {
    let (_gw, queue) = submitted(&["a", "b", "c"]).await;

    // Poll the bulk future once, then drop it.
    let abandoned = tokio::time::timeout(
        Duration::ZERO,
        queue.resolve_bulk(["a", "b", "c"], Decision::Approved, REVIEWER),
    )
    .await;
    assert!(abandoned.is_err());

    for _ in 0..100 {
        if queue.pending(REVIEWER).await.unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(queue.pending(REVIEWER).await.unwrap().is_empty());
}
