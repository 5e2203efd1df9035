use std::path::Path;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::matches_search;
use crate::constants::*;
use crate::Candidate;
use crate::CandidateId;
use crate::CandidateImage;
use crate::Error;
use crate::NewCandidate;
use crate::PemiraApi;
use crate::Result;
use crate::SessionContext;

/// Input of the add-candidate form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDraft {
    pub name: String,
    pub image: Option<CandidateImage>,
    pub vision: String,
    /// One entry per mission field; blank entries are skipped on save
    pub missions: Vec<String>,
}

impl Default for CandidateDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            image: None,
            vision: String::new(),
            missions: vec![String::new()],
        }
    }
}

impl CandidateDraft {
    /// The save button needs a name and a vision
    pub fn can_save(&self) -> bool {
        !self.name.trim().is_empty() && !self.vision.trim().is_empty()
    }

    pub fn add_mission_field(&mut self) {
        self.missions.push(String::new());
    }

    pub fn remove_mission_field(
        &mut self,
        index: usize,
    ) {
        if index < self.missions.len() {
            self.missions.remove(index);
        }
    }

    fn filled_missions(&self) -> Vec<String> {
        self.missions
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Reads a candidate photo from disk
pub async fn load_candidate_image(path: &Path) -> Result<CandidateImage> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    let mime_type = match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    Ok(CandidateImage {
        file_name,
        mime_type: mime_type.to_string(),
        bytes,
    })
}

/// Candidate list with search, add, detail and delete
pub struct CandidateManager {
    api: Arc<dyn PemiraApi>,
    session: Arc<SessionContext>,
    candidates: Vec<Candidate>,
    search: String,
    error: Option<String>,
}

impl CandidateManager {
    pub fn new(
        api: Arc<dyn PemiraApi>,
        session: Arc<SessionContext>,
    ) -> Self {
        Self {
            api,
            session,
            candidates: Vec::new(),
            search: String::new(),
            error: None,
        }
    }

    pub async fn refresh(&mut self) -> Result<()> {
        match self.api.list_candidates().await {
            Ok(candidates) => {
                debug!("[:CandidateManager:refresh] {} candidates", candidates.len());
                self.candidates = candidates;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!("[:CandidateManager:refresh] {}", e);
                self.error = Some(e.user_message(MSG_CANDIDATES_FAILED));
                Err(e.into())
            }
        }
    }

    pub fn set_search(
        &mut self,
        term: impl Into<String>,
    ) {
        self.search = term.into();
    }

    /// Candidates whose fields contain the search term
    pub fn filtered(&self) -> Vec<&Candidate> {
        self.candidates
            .iter()
            .filter(|c| matches_search(&searchable_text(c), &self.search))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.filtered().len()
    }

    pub fn detail(
        &self,
        candidate_id: CandidateId,
    ) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == candidate_id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Creates the candidate, then its vision, then all missions at once.
    ///
    /// The list is refreshed afterwards. A failure after the candidate was
    /// created leaves it on the server without the remaining statements.
    pub async fn add(
        &mut self,
        draft: CandidateDraft,
    ) -> Result<Candidate> {
        if !draft.can_save() {
            return Err(Error::Validation("Nama dan visi kandidat wajib diisi".into()));
        }
        self.session.require_token()?;
        self.session.touch();

        let missions = draft.filled_missions();
        let vision = draft.vision.trim().to_string();
        let created = self
            .api
            .add_candidate(NewCandidate {
                name: draft.name.trim().to_string(),
                image: draft.image,
            })
            .await?;
        info!("[:CandidateManager:add] created candidate {}", created.id);

        self.api.add_vision(created.id, vision).await?;
        try_join_all(
            missions
                .into_iter()
                .map(|mission| self.api.add_mission(created.id, mission)),
        )
        .await?;

        if let Err(e) = self.refresh().await {
            warn!("[:CandidateManager:add] list refresh failed: {}", e);
        }
        Ok(self.detail(created.id).cloned().unwrap_or(created))
    }

    /// Opens the confirmation gate in front of a delete.
    pub fn request_delete(
        &mut self,
        candidate_id: CandidateId,
    ) -> DeleteConfirmation<'_> {
        DeleteConfirmation {
            manager: self,
            candidate_id,
        }
    }

    async fn delete(
        &mut self,
        candidate_id: CandidateId,
    ) -> Result<()> {
        self.session.require_token()?;
        self.session.touch();
        self.api.delete_candidate(candidate_id).await.map_err(|e| {
            warn!("[:CandidateManager:delete] candidate {}: {}", candidate_id, e);
            e
        })?;
        info!("[:CandidateManager:delete] deleted candidate {}", candidate_id);
        self.refresh().await
    }
}

fn searchable_text(candidate: &Candidate) -> String {
    let mut text = format!("{} {}", candidate.id, candidate.name);
    if let Some(path) = &candidate.image_path {
        text.push(' ');
        text.push_str(path);
    }
    for statement in candidate.visions.iter().chain(&candidate.missions) {
        text.push(' ');
        text.push_str(statement);
    }
    text
}

/// Pending delete awaiting an explicit answer
#[must_use = "a candidate is deleted only once confirmed"]
pub struct DeleteConfirmation<'a> {
    manager: &'a mut CandidateManager,
    candidate_id: CandidateId,
}

impl DeleteConfirmation<'_> {
    pub fn prompt(&self) -> &'static str {
        MSG_DELETE_CANDIDATE_CONFIRM
    }

    pub async fn confirm(self) -> Result<()> {
        self.manager.delete(self.candidate_id).await
    }

    pub fn cancel(self) {
        debug!("[:CandidateManager:delete] cancelled for {}", self.candidate_id);
    }
}
