// concurrent_review.rs — Two decisions racing for one subject.
//
// `resolve` reads the latest row, then appends. Nothing serializes two
// resolutions of the same subject, so:
// VERIFY:
//   - a reviewer the request is not assigned to is refused outright
//   - two resolutions that both read Pending both append; the later row wins
//   - once either has landed, a further resolve sees NotPending

mod common;

use ap_approval::{ApprovalError, ApprovalQueue, Decision, Onboarding};
use ap_store::{ApprovalStatus, ErrorKind, PersistenceGateway};

use common::{content, seed_subjects, FlakyGateway};

const SUBJECT: &str = "093344";
const REVIEWER: &str = "m-1";

async fn awaiting_review() -> (std::sync::Arc<FlakyGateway>, ApprovalQueue) {
    let gw = FlakyGateway::new();
    seed_subjects(&gw, REVIEWER, &[SUBJECT]).await;
    Onboarding::new(gw.clone(), gw.clone())
        .submit(SUBJECT, content("Grow EMEA pipeline"))
        .await
        .unwrap();
    (gw.clone(), ApprovalQueue::new(gw))
}

#[tokio::test]
async fn other_reviewer_is_refused() {
    let (gw, queue) = awaiting_review().await;

    let err = queue
        .resolve(SUBJECT, Decision::Approved, "m-2")
        .await
        .unwrap_err();
    assert!(matches!(err, ApprovalError::WrongReviewer { .. }));
    assert_eq!(err.kind(), ErrorKind::NotPending);

    let latest = gw.latest_approval(SUBJECT).await.unwrap().unwrap();
    assert_eq!(latest.status, ApprovalStatus::Pending);
}

#[tokio::test]
async fn both_reads_see_pending_and_the_later_row_wins() {
    let (gw, queue) = awaiting_review().await;

    // Two review panels open on the same subject, both read before either
    // writes.
    gw.line_up_reads(2);
    let (approve, reject) = tokio::join!(
        queue.resolve(SUBJECT, Decision::Approved, REVIEWER),
        queue.resolve(SUBJECT, Decision::Rejected, REVIEWER),
    );
    gw.release_reads();

    let approve = approve.unwrap();
    let reject = reject.unwrap();
    assert_eq!(gw.inner.approval_row_count().await, 3);

    let latest = gw.latest_approval(SUBJECT).await.unwrap().unwrap();
    assert!(latest.request_id == approve.request_id || latest.request_id == reject.request_id);
    assert!(queue.pending(REVIEWER).await.unwrap().is_empty());

    let err = queue
        .resolve(SUBJECT, Decision::Approved, REVIEWER)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotPending);
}

#[tokio::test]
async fn sequential_second_decision_is_not_pending() {
    let (gw, queue) = awaiting_review().await;

    queue
        .resolve(SUBJECT, Decision::Rejected, REVIEWER)
        .await
        .unwrap();
    let err = queue
        .resolve(SUBJECT, Decision::Approved, REVIEWER)
        .await
        .unwrap_err();
    match err {
        ApprovalError::NotPending { latest, .. } => {
            assert_eq!(latest, Some(ApprovalStatus::Rejected));
        }
        other => panic!("expected NotPending, got {:?}", other),
    }
    assert_eq!(gw.inner.approval_row_count().await, 2);
}
