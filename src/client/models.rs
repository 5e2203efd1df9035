//! Wire types of the Pemira REST API

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

pub type CandidateId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub visions: Vec<String>,
    #[serde(default)]
    pub missions: Vec<String>,
}

impl Candidate {
    /// First vision statement, the one shown on ballot cards and list rows
    pub fn headline_vision(&self) -> Option<&str> {
        self.visions.first().map(String::as_str)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CandidateList {
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedCandidate {
    pub candidate: Candidate,
}

/// Candidate creation payload, sent as multipart form data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCandidate {
    pub name: String,
    pub image: Option<CandidateImage>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct CandidateImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for CandidateImage {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("CandidateImage")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct VisionRequest<'a> {
    #[serde(rename = "candidateId")]
    pub candidate_id: CandidateId,
    pub vision: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct MissionRequest<'a> {
    #[serde(rename = "candidateId")]
    pub candidate_id: CandidateId,
    pub mission: &'a str,
}

/// A registered voter. Field names on the wire are the backend's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "nama")]
    pub name: String,
    /// Student id (NIM), the voter's unique key
    #[serde(rename = "nim", deserialize_with = "string_or_number")]
    pub student_id: String,
    #[serde(rename = "jurusan")]
    pub department: String,
    #[serde(rename = "angkatan", deserialize_with = "string_or_number")]
    pub cohort: String,
}

impl Voter {
    /// Fields in display/export order
    pub fn fields(&self) -> [&str; 4] {
        [
            self.name.as_str(),
            self.student_id.as_str(),
            self.department.as_str(),
            self.cohort.as_str(),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoteCheck {
    pub voted: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct VoteRequest {
    pub candidate_id: CandidateId,
}

/// Server acknowledgement of a cast ballot
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct VoteReceipt {
    #[serde(default)]
    pub message: Option<String>,
}

/// A recorded ballot as listed by `GET /votes/get-all`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastBallot {
    #[serde(default)]
    pub id: Option<u64>,
    pub candidate_id: CandidateId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BallotList {
    pub votes: Vec<CastBallot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StatusBody {
    pub status: String,
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

impl fmt::Debug for LoginResponse {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginUser {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

#[derive(Clone, Serialize)]
pub struct PasswordChange {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("PasswordChange")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Generic `{ message }` body of acknowledgements and rejections
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerMessage {
    #[serde(default)]
    pub message: Option<String>,
}

/// The backend is not consistent about numeric vs string ids and years.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Int(n) => n.to_string(),
        StringOrNumber::Float(n) => n.to_string(),
    })
}
