//! Vote casting for a single voter
//!
//! A [`BallotSession`] walks one voter through the ballot screen:
//!
//! 1. the student id arrives from the identity screen; without it the voter
//!    is sent back there ([`BallotSession::new`])
//! 2. the lifecycle must be `open`, otherwise a closed/completed notice ends
//!    the session
//! 3. a voter that already has a ballot is told so and redirected
//! 4. candidates are loaded; a failure can be retried
//! 5. the voter selects one candidate, reselection overwrites
//! 6. the selection is submitted once per request, never retried
//!    automatically
//!
//! Steps 2 to 4 run in [`BallotSession::start`].
//!
//! Uniqueness of ballots is enforced by the server. The session only
//! interprets the rejection: a concurrent session that won the race makes
//! this one end exactly like step 3.

mod mount;
mod view;

pub use mount::*;
pub use view::*;

#[cfg(test)]
mod ballot_test;

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::constants::*;
use crate::Candidate;
use crate::CandidateId;
use crate::ElectionLifecycle;
use crate::ElectionStatus;
use crate::PemiraApi;
use crate::PreconditionError;
use crate::Redirect;
use crate::Route;
use crate::StatusNotice;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    /// Created, `start` not run yet
    Pending,
    /// Lifecycle not open
    Unavailable {
        status: ElectionStatus,
        error: Option<String>,
    },
    /// Eligibility check said the voter already has a ballot, or the
    /// server rejected the submission for that reason
    AlreadyVoted { message: String },
    /// Eligibility could not be checked
    EligibilityFailed { message: String, retryable: bool },
    /// Candidates could not be loaded
    CandidatesFailed { message: String, retryable: bool },
    Selecting { error: Option<String> },
    Submitting,
    Completed { candidate_id: CandidateId },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Candidate {0} is not on the ballot")]
    UnknownCandidate(CandidateId),

    #[error("The ballot is not accepting selections")]
    NotSelecting,
}

pub struct BallotSession {
    api: Arc<dyn PemiraApi>,
    lifecycle: Arc<ElectionLifecycle>,
    redirect_delay: Duration,
    voter_id: String,
    phase: Phase,
    candidates: Vec<Candidate>,
    selection: Option<CandidateId>,
    mount: MountHandle,
}

impl BallotSession {
    /// Fails when no student id was carried over from identity capture.
    pub fn new(
        api: Arc<dyn PemiraApi>,
        lifecycle: Arc<ElectionLifecycle>,
        voter_id: Option<String>,
        redirect_delay: Duration,
    ) -> std::result::Result<Self, PreconditionError> {
        let voter_id = voter_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(PreconditionError::MissingVoterId)?;

        Ok(Self {
            api,
            lifecycle,
            redirect_delay,
            voter_id,
            phase: Phase::Pending,
            candidates: Vec::new(),
            selection: None,
            mount: MountHandle::new(),
        })
    }

    pub fn voter_id(&self) -> &str {
        &self.voter_id
    }

    /// Handle the screen keeps to report navigation away from the session
    pub fn mount_handle(&self) -> MountHandle {
        self.mount.clone()
    }

    pub fn selection(&self) -> Option<CandidateId> {
        self.selection
    }

    /// Checks lifecycle and eligibility, then loads the candidates.
    ///
    /// Runs again from the lifecycle check when called after a retryable
    /// eligibility failure.
    pub async fn start(&mut self) -> SessionView {
        match self.phase {
            Phase::Pending | Phase::EligibilityFailed { retryable: true, .. } => {}
            Phase::CandidatesFailed { retryable: true, .. } => {
                return self.reload_candidates().await
            }
            _ => return self.view(),
        }

        let fetched = self.lifecycle.fetch_status().await;
        if !self.mount.is_mounted() {
            return SessionView::Discarded;
        }
        if let Err(status) = self.lifecycle.require_open() {
            let error = fetched.err().map(|e| e.user_message(MSG_STATUS_FETCH_FAILED));
            debug!(
                "[:BallotSession:start] voter {} stopped, election is {}",
                self.voter_id, status
            );
            self.phase = Phase::Unavailable { status, error };
            return self.view();
        }

        let voted = self.api.has_voted(&self.voter_id).await;
        if !self.mount.is_mounted() {
            return SessionView::Discarded;
        }
        match voted {
            Ok(true) => {
                info!("[:BallotSession:start] voter {} already voted", self.voter_id);
                self.phase = Phase::AlreadyVoted {
                    message: MSG_ALREADY_VOTED.to_string(),
                };
                return self.view();
            }
            Ok(false) => {}
            Err(e) => {
                warn!("[:BallotSession:start] eligibility check failed: {}", e);
                self.phase = Phase::EligibilityFailed {
                    message: e.user_message(MSG_VOTE_FAILED),
                    retryable: e.is_retryable(),
                };
                return self.view();
            }
        }

        self.load_candidates().await
    }

    /// Retries loading candidates after a retryable failure.
    pub async fn reload_candidates(&mut self) -> SessionView {
        if !matches!(self.phase, Phase::CandidatesFailed { retryable: true, .. }) {
            return self.view();
        }
        self.load_candidates().await
    }

    async fn load_candidates(&mut self) -> SessionView {
        let loaded = self.api.list_candidates().await;
        if !self.mount.is_mounted() {
            return SessionView::Discarded;
        }
        match loaded {
            Ok(candidates) => {
                debug!("[:BallotSession:load_candidates] {} candidates", candidates.len());
                self.candidates = candidates;
                self.phase = Phase::Selecting { error: None };
            }
            Err(e) => {
                warn!("[:BallotSession:load_candidates] {}", e);
                self.phase = Phase::CandidatesFailed {
                    message: e.user_message(MSG_CANDIDATES_FAILED),
                    retryable: e.is_retryable(),
                };
            }
        }
        self.view()
    }

    /// Selects `candidate_id`, replacing any earlier selection.
    pub fn select(
        &mut self,
        candidate_id: CandidateId,
    ) -> std::result::Result<(), SelectionError> {
        if !matches!(self.phase, Phase::Selecting { .. }) {
            return Err(SelectionError::NotSelecting);
        }
        if !self.candidates.iter().any(|c| c.id == candidate_id) {
            return Err(SelectionError::UnknownCandidate(candidate_id));
        }
        self.selection = Some(candidate_id);
        Ok(())
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, Phase::Selecting { .. })
            && self.selection.is_some()
            && self.lifecycle.ballot_allowed()
    }

    /// Sends the selected candidate.
    ///
    /// Does nothing unless [`can_submit`](Self::can_submit) holds, which
    /// also keeps a second submission out while one is in flight.
    pub async fn submit(&mut self) -> SessionView {
        if !self.can_submit() {
            return self.view();
        }
        let Some(candidate_id) = self.selection else {
            return self.view();
        };

        self.phase = Phase::Submitting;
        let result = self.api.cast_vote(&self.voter_id, candidate_id).await;
        if !self.mount.is_mounted() {
            debug!(
                "[:BallotSession:submit] voter {} left, discarding answer",
                self.voter_id
            );
            return SessionView::Discarded;
        }

        self.phase = match result {
            Ok(_) => {
                info!(
                    "[:BallotSession:submit] voter {} cast ballot for candidate {}",
                    self.voter_id, candidate_id
                );
                Phase::Completed { candidate_id }
            }
            Err(e) if e.is_already_voted() => {
                info!(
                    "[:BallotSession:submit] voter {} rejected, ballot already recorded",
                    self.voter_id
                );
                Phase::AlreadyVoted {
                    message: e.user_message(MSG_ALREADY_VOTED),
                }
            }
            Err(e) => {
                warn!("[:BallotSession:submit] voter {}: {}", self.voter_id, e);
                Phase::Selecting {
                    error: Some(e.user_message(MSG_VOTE_FAILED)),
                }
            }
        };
        self.view()
    }

    /// What the ballot screen shows right now
    pub fn view(&self) -> SessionView {
        if !self.mount.is_mounted() {
            return SessionView::Discarded;
        }

        let redirect = || Redirect::after(Route::Identity, self.redirect_delay);
        match &self.phase {
            Phase::Pending => SessionView::Loading,
            Phase::Unavailable { status, error } => SessionView::Unavailable {
                notice: StatusNotice::for_status(*status).unwrap_or(StatusNotice::CLOSED),
                error: error.clone(),
            },
            Phase::AlreadyVoted { message } => SessionView::AlreadyVoted {
                message: message.clone(),
                redirect: redirect(),
            },
            Phase::EligibilityFailed { message, retryable }
            | Phase::CandidatesFailed { message, retryable } => SessionView::Failed {
                message: message.clone(),
                retryable: *retryable,
            },
            Phase::Selecting { error } => SessionView::Ballot(self.ballot_view(false, error.clone())),
            Phase::Submitting => SessionView::Ballot(self.ballot_view(true, None)),
            Phase::Completed { candidate_id } => SessionView::Confirmed {
                candidate_id: *candidate_id,
                message: MSG_VOTE_SUCCESS.to_string(),
                redirect: redirect(),
            },
        }
    }

    fn ballot_view(
        &self,
        submitting: bool,
        error: Option<String>,
    ) -> BallotView {
        BallotView {
            candidates: self.candidates.clone(),
            selected: self.selection,
            submit_enabled: !submitting && self.can_submit(),
            submitting,
            error,
        }
    }
}
