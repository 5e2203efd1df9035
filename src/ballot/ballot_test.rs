use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use tracing_test::traced_test;

use super::*;
use crate::test_utils::fetched_lifecycle;
use crate::test_utils::rejection;
use crate::test_utils::FakeBackend;
use crate::ErrorCode;
use crate::MockPemiraApi;

const DELAY: Duration = Duration::from_millis(3000);

fn open_backend() -> Arc<FakeBackend> {
    Arc::new(FakeBackend::new(ElectionStatus::Open).with_candidates(&["Andi", "Budi"]))
}

fn session(
    backend: &Arc<FakeBackend>,
    voter_id: &str,
) -> BallotSession {
    let lifecycle = Arc::new(ElectionLifecycle::new(backend.clone()));
    BallotSession::new(backend.clone(), lifecycle, Some(voter_id.to_string()), DELAY).unwrap()
}

fn ballot(view: SessionView) -> BallotView {
    match view {
        SessionView::Ballot(ballot) => ballot,
        other => panic!("expected ballot, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_voter_id_redirects_to_identity() {
    let backend = open_backend();
    let lifecycle = Arc::new(ElectionLifecycle::new(backend.clone()));

    for voter_id in [None, Some(String::new()), Some("  ".to_string())] {
        let err = BallotSession::new(backend.clone(), lifecycle.clone(), voter_id, DELAY)
            .err()
            .unwrap();
        assert_eq!(err, PreconditionError::MissingVoterId);
        assert_eq!(err.entry_point(), Some(Route::Identity));
    }
    assert_eq!(backend.calls("fetch_status"), 0);
}

#[tokio::test]
async fn test_not_open_stops_before_eligibility() {
    for status in [ElectionStatus::Closed, ElectionStatus::Completed] {
        let mut api = MockPemiraApi::new();
        api.expect_fetch_status().times(1).returning(move || Ok(status));
        api.expect_has_voted().never();
        api.expect_list_candidates().never();
        api.expect_cast_vote().never();
        let api = Arc::new(api);
        let lifecycle = Arc::new(ElectionLifecycle::new(api.clone()));
        let mut session = BallotSession::new(api, lifecycle, Some("123".into()), DELAY).unwrap();

        let view = session.start().await;

        assert_eq!(
            view,
            SessionView::Unavailable {
                notice: StatusNotice::for_status(status).unwrap(),
                error: None
            }
        );
        assert!(view.is_terminal());
        assert!(session.select(1).is_err());
        assert_eq!(session.submit().await, view);
    }
}

#[tokio::test]
async fn test_status_fetch_failure_fails_closed_with_server_message() {
    let backend = open_backend();
    backend.fail(
        "fetch_status",
        rejection(StatusCode::SERVICE_UNAVAILABLE, "Server sedang maintenance"),
    );
    let mut session = session(&backend, "123");

    let view = session.start().await;

    assert_eq!(
        view,
        SessionView::Unavailable {
            notice: StatusNotice::for_status(ElectionStatus::Closed).unwrap(),
            error: Some("Server sedang maintenance".into()),
        }
    );
    assert_eq!(backend.calls("has_voted"), 0);
}

#[tokio::test]
async fn test_already_voted_is_terminal_and_never_submits() {
    let backend = open_backend();
    backend.record_ballot("123", 1);
    let mut session = session(&backend, "123");

    let view = session.start().await;

    assert_eq!(
        view,
        SessionView::AlreadyVoted {
            message: MSG_ALREADY_VOTED.into(),
            redirect: Redirect::after(Route::Identity, DELAY),
        }
    );
    assert_eq!(session.select(2), Err(SelectionError::NotSelecting));
    assert!(!session.can_submit());
    session.submit().await;
    assert_eq!(session.start().await, view);
    assert_eq!(backend.calls("cast_vote"), 0);
    assert_eq!(backend.calls("list_candidates"), 0);
}

#[tokio::test]
async fn test_eligibility_failure_retries_from_lifecycle_check() {
    let backend = open_backend();
    backend.fail("has_voted", ErrorCode::ConnectionTimeout.into());
    let mut session = session(&backend, "123");

    assert_eq!(
        session.start().await,
        SessionView::Failed {
            message: MSG_VOTE_FAILED.into(),
            retryable: true,
        }
    );

    backend.recover("has_voted");
    let view = ballot(session.start().await);
    assert_eq!(view.candidates.len(), 2);
    assert_eq!(backend.calls("fetch_status"), 2);
}

#[tokio::test]
async fn test_rejected_eligibility_check_is_terminal() {
    let backend = open_backend();
    backend.fail("has_voted", rejection(StatusCode::NOT_FOUND, "NIM tidak terdaftar"));
    let mut session = session(&backend, "123");

    let view = session.start().await;
    assert_eq!(
        view,
        SessionView::Failed {
            message: "NIM tidak terdaftar".into(),
            retryable: false,
        }
    );
    assert!(view.is_terminal());

    backend.recover("has_voted");
    assert_eq!(session.start().await, view);
    assert_eq!(backend.calls("has_voted"), 1);
    assert_eq!(backend.calls("list_candidates"), 0);
}

#[tokio::test]
async fn test_candidate_load_failure_is_retryable() {
    let backend = open_backend();
    backend.fail("list_candidates", ErrorCode::ServerError.into());
    let mut session = session(&backend, "123");

    let view = session.start().await;
    assert_eq!(
        view,
        SessionView::Failed {
            message: MSG_CANDIDATES_FAILED.into(),
            retryable: true,
        }
    );
    assert!(!view.is_terminal());

    backend.recover("list_candidates");
    let view = ballot(session.reload_candidates().await);

    assert_eq!(view.candidates.len(), 2);
    assert_eq!(view.selected, None);
    assert!(!view.submit_enabled);
    assert_eq!(backend.calls("has_voted"), 1);
}

#[tokio::test]
async fn test_reselection_submits_last_choice_only() {
    let backend = open_backend();
    let mut session = session(&backend, "123");
    session.start().await;

    session.select(1).unwrap();
    session.select(2).unwrap();
    assert!(session.can_submit());

    let view = session.submit().await;

    assert_eq!(
        view,
        SessionView::Confirmed {
            candidate_id: 2,
            message: MSG_VOTE_SUCCESS.into(),
            redirect: Redirect::after(Route::Identity, DELAY),
        }
    );
    assert_eq!(backend.ballots(), vec![("123".to_string(), 2)]);
}

#[tokio::test]
async fn test_selection_is_immutable_after_success() {
    let backend = open_backend();
    let mut session = session(&backend, "123");
    session.start().await;
    session.select(1).unwrap();
    let confirmed = session.submit().await;

    assert_eq!(session.select(2), Err(SelectionError::NotSelecting));
    assert_eq!(session.selection(), Some(1));
    assert_eq!(session.submit().await, confirmed);
    assert_eq!(backend.calls("cast_vote"), 1);
}

#[tokio::test]
async fn test_select_rejects_unknown_candidate() {
    let backend = open_backend();
    let mut session = session(&backend, "123");
    session.start().await;

    assert_eq!(session.select(42), Err(SelectionError::UnknownCandidate(42)));
    assert_eq!(session.selection(), None);
}

#[tokio::test]
async fn test_submit_without_selection_sends_nothing() {
    let backend = open_backend();
    let mut session = session(&backend, "123");
    session.start().await;

    let view = ballot(session.submit().await);

    assert!(!view.submit_enabled);
    assert_eq!(backend.calls("cast_vote"), 0);
}

#[tokio::test]
#[traced_test]
async fn test_transient_failure_keeps_selection_and_does_not_retry() {
    let backend = open_backend();
    let mut session = session(&backend, "123");
    session.start().await;
    session.select(2).unwrap();

    backend.fail("cast_vote", ErrorCode::ConnectionFailed.into());
    let view = ballot(session.submit().await);

    assert_eq!(view.error.as_deref(), Some(MSG_VOTE_FAILED));
    assert_eq!(view.selected, Some(2));
    assert!(view.submit_enabled);
    assert_eq!(backend.calls("cast_vote"), 1);

    backend.fail(
        "cast_vote",
        rejection(StatusCode::UNPROCESSABLE_ENTITY, "Kandidat tidak valid"),
    );
    let view = ballot(session.submit().await);
    assert_eq!(view.error.as_deref(), Some("Kandidat tidak valid"));

    backend.recover("cast_vote");
    assert!(matches!(
        session.submit().await,
        SessionView::Confirmed { candidate_id: 2, .. }
    ));
    assert_eq!(backend.calls("cast_vote"), 3);
}

#[tokio::test]
async fn test_losing_race_ends_as_already_voted() {
    let backend = open_backend();
    let mut first = session(&backend, "123");
    let mut second = session(&backend, "123");

    // both pass the eligibility check before either submits
    ballot(first.start().await);
    ballot(second.start().await);
    first.select(1).unwrap();
    second.select(2).unwrap();

    assert!(matches!(first.submit().await, SessionView::Confirmed { .. }));
    let view = second.submit().await;

    assert_eq!(
        view,
        SessionView::AlreadyVoted {
            message: MSG_ALREADY_VOTED.into(),
            redirect: Redirect::after(Route::Identity, DELAY),
        }
    );
    assert_eq!(second.select(1), Err(SelectionError::NotSelecting));
    second.submit().await;
    assert_eq!(backend.calls("cast_vote"), 2);
    assert_eq!(backend.ballots(), vec![("123".to_string(), 1)]);
}

#[tokio::test]
async fn test_existing_ballot_never_reaches_success() {
    for candidate_id in [1, 2] {
        let backend = open_backend();
        let mut session = session(&backend, "123");
        session.start().await;
        // recorded elsewhere after the eligibility check
        backend.record_ballot("123", 1);

        session.select(candidate_id).unwrap();
        let view = session.submit().await;

        assert!(matches!(view, SessionView::AlreadyVoted { .. }));
    }
}

#[tokio::test]
async fn test_submit_disabled_once_lifecycle_leaves_open() {
    let backend = open_backend();
    let lifecycle = fetched_lifecycle(backend.clone()).await;
    let mut session =
        BallotSession::new(backend.clone(), lifecycle.clone(), Some("123".into()), DELAY).unwrap();
    session.start().await;
    session.select(1).unwrap();

    backend.set_status(ElectionStatus::Completed);
    lifecycle.fetch_status().await.unwrap();

    assert!(!session.can_submit());
    session.submit().await;
    assert_eq!(backend.calls("cast_vote"), 0);
}

#[tokio::test]
async fn test_voter_can_vote_again_after_reset() {
    let backend = open_backend();
    backend.record_ballot("123", 1);
    backend.set_status(ElectionStatus::Completed);
    let lifecycle = fetched_lifecycle(backend.clone()).await;
    lifecycle.transition(crate::LifecycleCommand::Reset).await.unwrap();
    lifecycle.transition(crate::LifecycleCommand::Start).await.unwrap();

    let mut session = BallotSession::new(backend.clone(), lifecycle, Some("123".into()), DELAY).unwrap();
    ballot(session.start().await);
    session.select(2).unwrap();

    assert!(matches!(session.submit().await, SessionView::Confirmed { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_answer_after_unmount_is_discarded() {
    let slow = Arc::new(
        FakeBackend::new(ElectionStatus::Open)
            .with_candidates(&["Andi"])
            .with_latency(Duration::from_secs(2)),
    );
    let mut session = BallotSession::new(
        slow.clone(),
        fetched_lifecycle(slow.clone()).await,
        Some("456".into()),
        DELAY,
    )
    .unwrap();
    ballot(session.start().await);
    session.select(1).unwrap();
    let mount = session.mount_handle();

    let pending = tokio::spawn(async move { session.submit().await });
    tokio::time::sleep(Duration::from_millis(500)).await;
    mount.unmount();

    assert_eq!(pending.await.unwrap(), SessionView::Discarded);
    // the server still decided; the screen just ignores it
    assert_eq!(slow.ballots().len(), 1);
}

#[tokio::test]
async fn test_unmounted_session_renders_nothing() {
    let backend = open_backend();
    let mut session = session(&backend, "123");
    session.mount_handle().unmount();

    assert_eq!(session.start().await, SessionView::Discarded);
    assert_eq!(backend.calls("has_voted"), 0);
}
