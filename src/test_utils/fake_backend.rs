use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use crate::Candidate;
use crate::CandidateId;
use crate::CastBallot;
use crate::ClientApiError;
use crate::ClientApiResult;
use crate::Credentials;
use crate::ElectionStatus;
use crate::ErrorCode;
use crate::LoginResponse;
use crate::LoginUser;
use crate::NewCandidate;
use crate::PasswordChange;
use crate::PemiraApi;
use crate::ServerMessage;
use crate::VoteReceipt;
use crate::Voter;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "rahasia";
pub const ADMIN_ID: &str = "1";
pub const ADMIN_TOKEN: &str = "fake-token";

/// In-memory backend honouring the server-side invariants:
/// one ballot per voter, ballots purged on reset.
pub struct FakeBackend {
    state: Mutex<State>,
}

struct State {
    status: ElectionStatus,
    confirmed_override: Option<ElectionStatus>,
    candidates: Vec<Candidate>,
    next_candidate_id: CandidateId,
    voters: Vec<Voter>,
    ballots: Vec<(String, CandidateId)>,
    password: String,
    token: Option<String>,
    failures: HashMap<&'static str, ClientApiError>,
    calls: HashMap<&'static str, usize>,
    latency: Option<Duration>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new(ElectionStatus::Closed)
    }
}

impl FakeBackend {
    pub fn new(status: ElectionStatus) -> Self {
        Self {
            state: Mutex::new(State {
                status,
                confirmed_override: None,
                candidates: Vec::new(),
                next_candidate_id: 1,
                voters: Vec::new(),
                ballots: Vec::new(),
                password: ADMIN_PASSWORD.to_string(),
                token: None,
                failures: HashMap::new(),
                calls: HashMap::new(),
                latency: None,
            }),
        }
    }

    pub fn with_candidates(
        self,
        names: &[&str],
    ) -> Self {
        {
            let mut state = self.state.lock();
            for name in names {
                let id = state.next_candidate_id;
                state.next_candidate_id += 1;
                state.candidates.push(candidate(id, name));
            }
        }
        self
    }

    /// Every call sleeps this long before answering
    pub fn with_latency(
        self,
        latency: Duration,
    ) -> Self {
        self.state.lock().latency = Some(latency);
        self
    }

    /// `endpoint` answers with `error` until [`recover`](Self::recover)
    pub fn fail(
        &self,
        endpoint: &'static str,
        error: ClientApiError,
    ) {
        self.state.lock().failures.insert(endpoint, error);
    }

    pub fn recover(
        &self,
        endpoint: &'static str,
    ) {
        self.state.lock().failures.remove(endpoint);
    }

    /// Status updates are confirmed as `status` regardless of the request
    pub fn confirm_status_as(
        &self,
        status: Option<ElectionStatus>,
    ) {
        self.state.lock().confirmed_override = status;
    }

    pub fn set_status(
        &self,
        status: ElectionStatus,
    ) {
        self.state.lock().status = status;
    }

    pub fn status(&self) -> ElectionStatus {
        self.state.lock().status
    }

    pub fn record_ballot(
        &self,
        voter_id: &str,
        candidate_id: CandidateId,
    ) {
        self.state.lock().ballots.push((voter_id.to_string(), candidate_id));
    }

    pub fn ballots(&self) -> Vec<(String, CandidateId)> {
        self.state.lock().ballots.clone()
    }

    pub fn voters(&self) -> Vec<Voter> {
        self.state.lock().voters.clone()
    }

    pub fn candidates(&self) -> Vec<Candidate> {
        self.state.lock().candidates.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.lock().token.clone()
    }

    pub fn password(&self) -> String {
        self.state.lock().password.clone()
    }

    pub fn calls(
        &self,
        endpoint: &'static str,
    ) -> usize {
        self.state.lock().calls.get(endpoint).copied().unwrap_or(0)
    }

    async fn enter(
        &self,
        endpoint: &'static str,
    ) -> ClientApiResult<()> {
        let latency = {
            let mut state = self.state.lock();
            *state.calls.entry(endpoint).or_default() += 1;
            state.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match self.state.lock().failures.get(endpoint) {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

pub fn candidate(
    id: CandidateId,
    name: &str,
) -> Candidate {
    Candidate {
        id,
        name: name.to_string(),
        image_path: None,
        visions: vec![format!("Visi {name}")],
        missions: vec![format!("Misi {name}")],
    }
}

pub fn voter(
    name: &str,
    student_id: &str,
) -> Voter {
    Voter {
        name: name.to_string(),
        student_id: student_id.to_string(),
        department: "Informatika".to_string(),
        cohort: "2022".to_string(),
    }
}

pub fn rejection(
    status: StatusCode,
    message: &str,
) -> ClientApiError {
    ClientApiError::from_http_status(status, Some(message.to_string()))
}

#[async_trait]
impl PemiraApi for FakeBackend {
    fn set_auth_token(
        &self,
        token: Option<String>,
    ) {
        self.state.lock().token = token;
    }

    async fn fetch_status(&self) -> ClientApiResult<ElectionStatus> {
        self.enter("fetch_status").await?;
        Ok(self.state.lock().status)
    }

    async fn update_status(
        &self,
        status: ElectionStatus,
    ) -> ClientApiResult<ElectionStatus> {
        self.enter("update_status").await?;
        let mut state = self.state.lock();
        state.status = state.confirmed_override.unwrap_or(status);
        Ok(state.status)
    }

    async fn reset_pemira(&self) -> ClientApiResult<()> {
        self.enter("reset_pemira").await?;
        self.state.lock().ballots.clear();
        Ok(())
    }

    async fn list_candidates(&self) -> ClientApiResult<Vec<Candidate>> {
        self.enter("list_candidates").await?;
        Ok(self.state.lock().candidates.clone())
    }

    async fn add_candidate(
        &self,
        new: NewCandidate,
    ) -> ClientApiResult<Candidate> {
        self.enter("add_candidate").await?;
        let mut state = self.state.lock();
        let id = state.next_candidate_id;
        state.next_candidate_id += 1;
        let created = Candidate {
            id,
            name: new.name,
            image_path: new.image.map(|i| format!("/uploads/{}", i.file_name)),
            visions: Vec::new(),
            missions: Vec::new(),
        };
        state.candidates.push(created.clone());
        Ok(created)
    }

    async fn add_vision(
        &self,
        candidate_id: CandidateId,
        vision: String,
    ) -> ClientApiResult<()> {
        self.enter("add_vision").await?;
        let mut state = self.state.lock();
        let found = state.candidates.iter_mut().find(|c| c.id == candidate_id);
        let candidate = found.ok_or_else(|| ClientApiError::from(ErrorCode::NotFound))?;
        candidate.visions.push(vision);
        Ok(())
    }

    async fn add_mission(
        &self,
        candidate_id: CandidateId,
        mission: String,
    ) -> ClientApiResult<()> {
        self.enter("add_mission").await?;
        let mut state = self.state.lock();
        let found = state.candidates.iter_mut().find(|c| c.id == candidate_id);
        let candidate = found.ok_or_else(|| ClientApiError::from(ErrorCode::NotFound))?;
        candidate.missions.push(mission);
        Ok(())
    }

    async fn delete_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> ClientApiResult<()> {
        self.enter("delete_candidate").await?;
        let mut state = self.state.lock();
        let before = state.candidates.len();
        state.candidates.retain(|c| c.id != candidate_id);
        if state.candidates.len() == before {
            return Err(ErrorCode::NotFound.into());
        }
        Ok(())
    }

    async fn list_voters(&self) -> ClientApiResult<Vec<Voter>> {
        self.enter("list_voters").await?;
        Ok(self.state.lock().voters.clone())
    }

    async fn add_voter(
        &self,
        voter: Voter,
    ) -> ClientApiResult<()> {
        self.enter("add_voter").await?;
        let mut state = self.state.lock();
        if !state.voters.iter().any(|v| v.student_id == voter.student_id) {
            state.voters.push(voter);
        }
        Ok(())
    }

    async fn has_voted(
        &self,
        voter_id: &str,
    ) -> ClientApiResult<bool> {
        self.enter("has_voted").await?;
        Ok(self.state.lock().ballots.iter().any(|(v, _)| v == voter_id))
    }

    async fn cast_vote(
        &self,
        voter_id: &str,
        candidate_id: CandidateId,
    ) -> ClientApiResult<VoteReceipt> {
        self.enter("cast_vote").await?;
        let mut state = self.state.lock();
        if state.status != ElectionStatus::Open {
            return Err(rejection(StatusCode::BAD_REQUEST, "Voting sedang tidak berlangsung"));
        }
        if !state.candidates.iter().any(|c| c.id == candidate_id) {
            return Err(rejection(StatusCode::NOT_FOUND, "Kandidat tidak ditemukan"));
        }
        if state.ballots.iter().any(|(v, _)| v == voter_id) {
            return Err(rejection(StatusCode::CONFLICT, "Anda sudah melakukan voting sebelumnya."));
        }
        state.ballots.push((voter_id.to_string(), candidate_id));
        Ok(VoteReceipt {
            message: Some("Vote berhasil".to_string()),
        })
    }

    async fn list_ballots(&self) -> ClientApiResult<Vec<CastBallot>> {
        self.enter("list_ballots").await?;
        Ok(self
            .state
            .lock()
            .ballots
            .iter()
            .enumerate()
            .map(|(i, (_, candidate_id))| CastBallot {
                id: Some(i as u64 + 1),
                candidate_id: *candidate_id,
            })
            .collect())
    }

    async fn login(
        &self,
        credentials: Credentials,
    ) -> ClientApiResult<LoginResponse> {
        self.enter("login").await?;
        let state = self.state.lock();
        if credentials.username != ADMIN_USERNAME {
            return Err(rejection(StatusCode::NOT_FOUND, "User not found"));
        }
        if credentials.password != state.password {
            return Err(rejection(StatusCode::UNAUTHORIZED, "Invalid password"));
        }
        Ok(LoginResponse {
            token: ADMIN_TOKEN.to_string(),
            user: LoginUser {
                id: ADMIN_ID.to_string(),
            },
        })
    }

    async fn change_password(
        &self,
        change: PasswordChange,
    ) -> ClientApiResult<ServerMessage> {
        self.enter("change_password").await?;
        let mut state = self.state.lock();
        if change.user_id != ADMIN_ID {
            return Err(rejection(StatusCode::NOT_FOUND, "User tidak ditemukan"));
        }
        if change.old_password != state.password {
            return Err(rejection(StatusCode::BAD_REQUEST, "Password lama salah"));
        }
        state.password = change.new_password;
        Ok(ServerMessage {
            message: Some("Password berhasil diubah".to_string()),
        })
    }
}
