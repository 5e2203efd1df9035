use crate::Candidate;
use crate::CandidateId;
use crate::Redirect;
use crate::StatusNotice;

/// Render state of a [`BallotSession`](super::BallotSession)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionView {
    Loading,
    /// Terminal: election closed or completed
    Unavailable {
        notice: StatusNotice,
        /// Set when the status could not be fetched at all
        error: Option<String>,
    },
    /// Terminal: the voter has a ballot already. Informational, not an error.
    AlreadyVoted { message: String, redirect: Redirect },
    /// Failure before the ballot could be shown; terminal unless `retryable`
    Failed { message: String, retryable: bool },
    Ballot(BallotView),
    /// Terminal: this session's ballot was recorded
    Confirmed {
        candidate_id: CandidateId,
        message: String,
        redirect: Redirect,
    },
    /// The screen was left; nothing is rendered
    Discarded,
}

impl SessionView {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionView::Unavailable { .. }
                | SessionView::AlreadyVoted { .. }
                | SessionView::Confirmed { .. }
                | SessionView::Discarded
                | SessionView::Failed {
                    retryable: false,
                    ..
                }
        )
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            SessionView::AlreadyVoted { redirect, .. } | SessionView::Confirmed { redirect, .. } => {
                Some(redirect)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallotView {
    pub candidates: Vec<Candidate>,
    pub selected: Option<CandidateId>,
    pub submit_enabled: bool,
    pub submitting: bool,
    /// Inline retryable error of the last submission
    pub error: Option<String>,
}
