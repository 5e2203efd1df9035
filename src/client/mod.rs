//! Client module for the Pemira REST backend
//!
//! Provides the components every screen talks to the server through:
//! - [`PemiraApi`] - One async operation per REST endpoint
//! - [`HttpClient`] - `reqwest` implementation of [`PemiraApi`]
//! - [`ClientBuilder`] - Configurable client construction
//! - [`ClientApiError`] - Error taxonomy of remote calls
//!
//! # Basic Usage
//! ```no_run
//! use pemira::ClientBuilder;
//! use pemira::PemiraApi;
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let client = ClientBuilder::new("http://localhost:4000/api")
//!         .request_timeout(Duration::from_secs(3))
//!         .build()
//!         .unwrap();
//!
//!     let status = client.fetch_status().await.unwrap();
//!     println!("Election is {status}");
//! }
//! ```

mod builder;
mod config;
mod error;
mod http;
mod models;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use http::*;
pub use models::*;


use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::ElectionStatus;

/// Operations exposed by the Pemira REST backend.
///
/// Every method performs exactly one request (suspension point) and returns
/// the server's answer or a [`ClientApiError`]; none of them retries.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PemiraApi: Send + Sync {
    /// Installs or clears the bearer token sent with every request
    fn set_auth_token(
        &self,
        token: Option<String>,
    );

    /// `GET /voting`
    async fn fetch_status(&self) -> ClientApiResult<ElectionStatus>;

    /// `PUT /voting`, returns the status the server confirmed
    async fn update_status(
        &self,
        status: ElectionStatus,
    ) -> ClientApiResult<ElectionStatus>;

    /// `POST /reset-pemira`, purges every ballot
    async fn reset_pemira(&self) -> ClientApiResult<()>;

    /// `GET /candidate`
    async fn list_candidates(&self) -> ClientApiResult<Vec<Candidate>>;

    /// `POST /add-candidates` (multipart)
    async fn add_candidate(
        &self,
        candidate: NewCandidate,
    ) -> ClientApiResult<Candidate>;

    /// `POST /visions`
    async fn add_vision(
        &self,
        candidate_id: CandidateId,
        vision: String,
    ) -> ClientApiResult<()>;

    /// `POST /missions`
    async fn add_mission(
        &self,
        candidate_id: CandidateId,
        mission: String,
    ) -> ClientApiResult<()>;

    /// `DELETE /candidate/{id}`
    async fn delete_candidate(
        &self,
        candidate_id: CandidateId,
    ) -> ClientApiResult<()>;

    /// `GET /all-voters`
    async fn list_voters(&self) -> ClientApiResult<Vec<Voter>>;

    /// `POST /add-voter`
    async fn add_voter(
        &self,
        voter: Voter,
    ) -> ClientApiResult<()>;

    /// `GET /votes/{voterId}`
    async fn has_voted(
        &self,
        voter_id: &str,
    ) -> ClientApiResult<bool>;

    /// `POST /votes/{voterId}`; a uniqueness rejection surfaces as
    /// [`ErrorCode::AlreadyVoted`]
    async fn cast_vote(
        &self,
        voter_id: &str,
        candidate_id: CandidateId,
    ) -> ClientApiResult<VoteReceipt>;

    /// `GET /votes/get-all`
    async fn list_ballots(&self) -> ClientApiResult<Vec<CastBallot>>;

    /// `POST /login`
    async fn login(
        &self,
        credentials: Credentials,
    ) -> ClientApiResult<LoginResponse>;

    /// `POST /change-password`
    async fn change_password(
        &self,
        change: PasswordChange,
    ) -> ClientApiResult<ServerMessage>;
}
