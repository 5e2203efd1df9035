use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::multipart::Part;
use reqwest::Method;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::BallotList;
use super::Candidate;
use super::CandidateId;
use super::CandidateList;
use super::CastBallot;
use super::ClientApiError;
use super::ClientApiResult;
use super::ClientConfig;
use super::CreatedCandidate;
use super::Credentials;
use super::ErrorCode;
use super::LoginResponse;
use super::MissionRequest;
use super::NewCandidate;
use super::PasswordChange;
use super::PemiraApi;
use super::ServerMessage;
use super::StatusBody;
use super::VisionRequest;
use super::VoteCheck;
use super::VoteReceipt;
use super::VoteRequest;
use super::Voter;
use crate::constants::*;
use crate::ElectionStatus;

/// `reqwest`-backed implementation of [`PemiraApi`]
///
/// Cheap to share behind an `Arc`; the auth token can be swapped while
/// requests are in flight.
pub struct HttpClient {
    http: reqwest::Client,
    config: ClientConfig,
    token: ArcSwapOption<String>,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> ClientApiResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            token: ArcSwapOption::empty(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(
        &self,
        path: &str,
    ) -> ClientApiResult<Url> {
        join(&self.config.base_url, path)
    }

    /// Ballot endpoints live under their own base URL
    fn votes_url(
        &self,
        path: &str,
    ) -> ClientApiResult<Url> {
        join(&self.config.votes_base_url, path)
    }

    fn request(
        &self,
        method: Method,
        url: Url,
    ) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match self.token.load_full() {
            Some(token) => builder.bearer_auth(token.as_str()),
            None => builder,
        }
    }

    /// Sends the request and turns every non-2xx answer into a
    /// [`ClientApiError`] carrying the server's `message`, if any.
    async fn send(
        &self,
        name: &'static str,
        request: RequestBuilder,
    ) -> ClientApiResult<Response> {
        let start = Instant::now();
        let result = request.send().await;
        trace!(target: "timing", "[TIMING] {} took {} ms", name, start.elapsed().as_millis());

        let response = result.map_err(|e| {
            warn!("[:HttpClient:{}] transport failure: {}", name, e);
            ClientApiError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!("[:HttpClient:{}] {}", name, status);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let server_message = serde_json::from_str::<ServerMessage>(&body)
            .ok()
            .and_then(|m| m.message);
        warn!(
            "[:HttpClient:{}] rejected with {}: {:?}",
            name, status, server_message
        );
        Err(ClientApiError::from_http_status(status, server_message))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        name: &'static str,
        request: RequestBuilder,
    ) -> ClientApiResult<T> {
        let response = self.send(name, request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("[:HttpClient:{}] undecodable body: {}", name, e);
            ClientApiError::from(e)
        })
    }

    /// Like [`send_json`](Self::send_json) for acknowledgements: once the
    /// server answered 2xx the request succeeded, so an empty or unexpected
    /// body decodes to the default value instead of failing.
    async fn send_ack<T: DeserializeOwned + Default>(
        &self,
        name: &'static str,
        request: RequestBuilder,
    ) -> ClientApiResult<T> {
        let response = self.send(name, request).await?;
        let bytes = response.bytes().await.unwrap_or_default();
        Ok(serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            debug!("[:HttpClient:{}] ignoring acknowledgement body: {}", name, e);
            T::default()
        }))
    }

    fn parse_status(
        &self,
        body: StatusBody,
    ) -> ClientApiResult<ElectionStatus> {
        ElectionStatus::parse_wire(&body.status).ok_or_else(|| ClientApiError::Protocol {
            code: ErrorCode::InvalidResponse,
            message: format!("Unknown election status `{}`", body.status),
        })
    }
}

fn join(
    base_url: &str,
    path: &str,
) -> ClientApiResult<Url> {
    Url::parse(&format!("{base_url}{path}")).map_err(|e| {
        ClientApiError::general_client_error(format!("Invalid endpoint url {base_url}{path}: {e}"))
    })
}

/// `url` followed by one percent-encoded segment
fn with_segment(
    mut url: Url,
    segment: &str,
) -> ClientApiResult<Url> {
    if url.cannot_be_a_base() {
        return Err(ClientApiError::general_client_error(format!(
            "Url {url} cannot carry path segments"
        )));
    }
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.push(segment);
    }
    Ok(url)
}

#[async_trait]
impl PemiraApi for HttpClient {
    fn set_auth_token(
        &self,
        token: Option<String>,
    ) {
        self.token.store(token.map(std::sync::Arc::new));
    }

    async fn fetch_status(&self) -> ClientApiResult<ElectionStatus> {
        let body: StatusBody = self
            .send_json("fetch_status", self.request(Method::GET, self.url(VOTING_PATH)?))
            .await?;
        self.parse_status(body)
    }

    async fn update_status(
        &self,
        status: ElectionStatus,
    ) -> ClientApiResult<ElectionStatus> {
        let request = self
            .request(Method::PUT, self.url(VOTING_PATH)?)
            .json(&StatusBody {
                status: status.as_wire(self.config.status_dialect).to_string(),
            });
        let body: StatusBody = self.send_json("update_status", request).await?;
        self.parse_status(body)
    }

    async fn reset_pemira(&self) -> ClientApiResult<()> {
        self.send(
            "reset_pemira",
            self.request(Method::POST, self.url(RESET_PEMIRA_PATH)?),
        )
        .await
        .map(|_| ())
    }

    async fn list_candidates(&self) -> ClientApiResult<Vec<Candidate>> {
        let list: CandidateList = self
            .send_json(
                "list_candidates",
                self.request(Method::GET, self.url(CANDIDATE_PATH)?),
            )
            .await?;
        Ok(list.candidates)
    }

    async fn add_candidate(
        &self,
        candidate: NewCandidate,
    ) -> ClientApiResult<Candidate> {
        let mut form = Form::new().text("name", candidate.name);
        if let Some(image) = candidate.image {
            let part = Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.mime_type)?;
            form = form.part("image", part);
        }

        let created: CreatedCandidate = self
            .send_json(
                "add_candidate",
                self.request(Method::POST, self.url(ADD_CANDIDATE_PATH)?)
                    .multipart(form),
            )
            .await?;
        Ok(created.candidate)
    }

    async fn add_vision(
        &self,
        candidate_id: CandidateId,
        vision: String,
    ) -> ClientApiResult<()> {
        let request = self
            .request(Method::POST, self.url(VISIONS_PATH)?)
            .json(&VisionRequest {
                candidate_id,
                vision: &vision,
            });
        self.send("add_vision", request).await.map(|_| ())
    }

    async fn add_mission(
        &self,
        candidate_id: CandidateId,
        mission: String,
    ) -> ClientApiResult<()> {
        let request = self
            .request(Method::POST, self.url(MISSIONS_PATH)?)
            .json(&MissionRequest {
                candidate_id,
                mission: &mission,
            });
        self.send("add_mission", request).await.map(|_| ())
    }

    async fn delete_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> ClientApiResult<()> {
        let url = with_segment(self.url(CANDIDATE_PATH)?, &candidate_id.to_string())?;
        self.send("delete_candidate", self.request(Method::DELETE, url))
            .await
            .map(|_| ())
    }

    async fn list_voters(&self) -> ClientApiResult<Vec<Voter>> {
        self.send_json(
            "list_voters",
            self.request(Method::GET, self.url(ALL_VOTERS_PATH)?),
        )
        .await
    }

    async fn add_voter(
        &self,
        voter: Voter,
    ) -> ClientApiResult<()> {
        let request = self
            .request(Method::POST, self.url(ADD_VOTER_PATH)?)
            .json(&voter);
        self.send("add_voter", request).await.map(|_| ())
    }

    async fn has_voted(
        &self,
        voter_id: &str,
    ) -> ClientApiResult<bool> {
        let url = with_segment(self.votes_url(VOTES_PATH)?, voter_id)?;
        let check: VoteCheck = self
            .send_json("has_voted", self.request(Method::GET, url))
            .await?;
        Ok(check.voted)
    }

    async fn cast_vote(
        &self,
        voter_id: &str,
        candidate_id: CandidateId,
    ) -> ClientApiResult<VoteReceipt> {
        let url = with_segment(self.votes_url(VOTES_PATH)?, voter_id)?;
        let request = self
            .request(Method::POST, url)
            .json(&VoteRequest { candidate_id });
        self.send_ack("cast_vote", request).await
    }

    async fn list_ballots(&self) -> ClientApiResult<Vec<CastBallot>> {
        let list: BallotList = self
            .send_json(
                "list_ballots",
                self.request(Method::GET, self.votes_url(ALL_VOTES_PATH)?),
            )
            .await?;
        Ok(list.votes)
    }

    async fn login(
        &self,
        credentials: Credentials,
    ) -> ClientApiResult<LoginResponse> {
        let request = self
            .request(Method::POST, self.url(LOGIN_PATH)?)
            .json(&credentials);
        self.send_json("login", request).await
    }

    async fn change_password(
        &self,
        change: PasswordChange,
    ) -> ClientApiResult<ServerMessage> {
        let request = self
            .request(Method::POST, self.url(CHANGE_PASSWORD_PATH)?)
            .json(&change);
        self.send_ack("change_password", request).await
    }
}
