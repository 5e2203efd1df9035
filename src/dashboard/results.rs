use std::collections::HashMap;

use tracing::debug;
use tracing::warn;

use crate::CachedStatus;
use crate::Candidate;
use crate::CandidateId;
use crate::CastBallot;
use crate::ClientApiResult;
use crate::ErrorCode;
use crate::PemiraApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTally {
    pub candidate_id: CandidateId,
    pub name: String,
    pub votes: usize,
}

/// Votes per candidate, in candidate order.
///
/// Candidates without ballots count zero; ballots for candidates not in
/// `candidates` are ignored.
pub fn tally(
    candidates: &[Candidate],
    ballots: &[CastBallot],
) -> Vec<CandidateTally> {
    let mut counts: HashMap<CandidateId, usize> = HashMap::new();
    for ballot in ballots {
        *counts.entry(ballot.candidate_id).or_default() += 1;
    }
    candidates
        .iter()
        .map(|c| CandidateTally {
            candidate_id: c.id,
            name: c.name.clone(),
            votes: counts.get(&c.id).copied().unwrap_or(0),
        })
        .collect()
}

/// Front page of the dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub total_voters: usize,
    pub total_candidates: usize,
    pub status: CachedStatus,
    pub tally: Vec<CandidateTally>,
}

impl DashboardSummary {
    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }

    /// Ballots counted towards listed candidates
    pub fn counted_votes(&self) -> usize {
        self.tally.iter().map(|t| t.votes).sum()
    }
}

/// Fetches voters, candidates, ballots and status concurrently.
///
/// Any failed request fails the summary, except a status the client
/// cannot parse, which is shown as unknown.
pub async fn load_summary(api: &dyn PemiraApi) -> ClientApiResult<DashboardSummary> {
    let status = async {
        match api.fetch_status().await {
            Ok(status) => Ok(CachedStatus::Known(status)),
            Err(e) if e.code() == ErrorCode::InvalidResponse => {
                warn!("[:load_summary] unrecognised status: {}", e);
                Ok(CachedStatus::Unknown)
            }
            Err(e) => Err(e),
        }
    };

    let (voters, candidates, ballots, status) = tokio::try_join!(
        api.list_voters(),
        api.list_candidates(),
        api.list_ballots(),
        status
    )?;
    debug!(
        "[:load_summary] {} voters, {} candidates, {} ballots",
        voters.len(),
        candidates.len(),
        ballots.len()
    );

    Ok(DashboardSummary {
        total_voters: voters.len(),
        total_candidates: candidates.len(),
        status,
        tally: tally(&candidates, &ballots),
    })
}
