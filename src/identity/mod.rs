//! Voter identity capture
//!
//! The first voter screen: collects name, student id, department and cohort,
//! registers the voter and hands the student id over to the ballot screen.
//! Like the ballot, it is only reachable while the election is open.

#[cfg(test)]
mod identity_test;

use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::constants::COHORT_YEAR_SPAN;
use crate::constants::MSG_IDENTITY_FAILED;
use crate::constants::MSG_STATUS_FETCH_FAILED;
use crate::ElectionLifecycle;
use crate::PemiraApi;
use crate::Redirect;
use crate::Route;
use crate::StatusNotice;
use crate::Voter;

/// Cohort years offered by the form, from `current_year - 8` to `current_year + 8`
pub fn cohort_options(current_year: i32) -> Vec<String> {
    (current_year - COHORT_YEAR_SPAN..=current_year + COHORT_YEAR_SPAN)
        .map(|year| year.to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    StudentId,
    Department,
    Cohort,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Nama",
            Field::StudentId => "NIM",
            Field::Department => "Jurusan",
            Field::Cohort => "Angkatan",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{} wajib diisi", .0.label())]
    Missing(Field),

    #[error("Angkatan {0} tidak tersedia")]
    UnknownCohort(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityForm {
    pub name: String,
    pub student_id: String,
    pub department: String,
    pub cohort: String,
}

impl IdentityForm {
    /// Every field is required and the cohort must be one of `cohorts`.
    pub fn validate(
        &self,
        cohorts: &[String],
    ) -> std::result::Result<Voter, Vec<FieldError>> {
        let mut errors = Vec::new();
        for (field, value) in [
            (Field::Name, &self.name),
            (Field::StudentId, &self.student_id),
            (Field::Department, &self.department),
            (Field::Cohort, &self.cohort),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError::Missing(field));
            }
        }

        let cohort = self.cohort.trim();
        if !cohort.is_empty() && !cohorts.iter().any(|c| c == cohort) {
            errors.push(FieldError::UnknownCohort(cohort.to_string()));
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Voter {
            name: self.name.trim().to_string(),
            student_id: self.student_id.trim().to_string(),
            department: self.department.trim().to_string(),
            cohort: cohort.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityView {
    /// Election closed or completed
    Unavailable {
        notice: StatusNotice,
        error: Option<String>,
    },
    Form {
        form: IdentityForm,
        cohort_options: Vec<String>,
        field_errors: Vec<FieldError>,
        /// Inline error of the last submission
        error: Option<String>,
    },
}

pub struct IdentityCapture {
    api: Arc<dyn PemiraApi>,
    lifecycle: Arc<ElectionLifecycle>,
    cohort_options: Vec<String>,
    form: IdentityForm,
    field_errors: Vec<FieldError>,
    error: Option<String>,
    status_error: Option<String>,
}

impl IdentityCapture {
    pub fn new(
        api: Arc<dyn PemiraApi>,
        lifecycle: Arc<ElectionLifecycle>,
        current_year: i32,
    ) -> Self {
        Self {
            api,
            lifecycle,
            cohort_options: cohort_options(current_year),
            form: IdentityForm::default(),
            field_errors: Vec::new(),
            error: None,
            status_error: None,
        }
    }

    /// Fetches the lifecycle status and renders the screen for it.
    pub async fn open(&mut self) -> IdentityView {
        self.status_error = self
            .lifecycle
            .fetch_status()
            .await
            .err()
            .map(|e| e.user_message(MSG_STATUS_FETCH_FAILED));
        self.view()
    }

    pub fn form_mut(&mut self) -> &mut IdentityForm {
        &mut self.form
    }

    /// Registers the voter and moves on to the ballot.
    ///
    /// On any failure the form keeps what the voter typed.
    pub async fn submit(&mut self) -> std::result::Result<Redirect, IdentityView> {
        if !self.lifecycle.identity_allowed() {
            debug!("[:IdentityCapture:submit] election not open");
            return Err(self.view());
        }

        let voter = match self.form.validate(&self.cohort_options) {
            Ok(voter) => voter,
            Err(errors) => {
                self.field_errors = errors;
                return Err(self.view());
            }
        };
        self.field_errors.clear();

        let student_id = voter.student_id.clone();
        match self.api.add_voter(voter).await {
            Ok(()) => {
                info!("[:IdentityCapture:submit] voter {} registered", student_id);
                self.error = None;
                Ok(Redirect::now(Route::Vote { student_id }))
            }
            Err(e) => {
                warn!("[:IdentityCapture:submit] {}: {}", student_id, e);
                self.error = Some(e.user_message(MSG_IDENTITY_FAILED));
                Err(self.view())
            }
        }
    }

    pub fn view(&self) -> IdentityView {
        match self.lifecycle.require_open() {
            Err(status) => IdentityView::Unavailable {
                notice: StatusNotice::for_status(status).unwrap_or(StatusNotice::CLOSED),
                error: self.status_error.clone(),
            },
            Ok(()) => IdentityView::Form {
                form: self.form.clone(),
                cohort_options: self.cohort_options.clone(),
                field_errors: self.field_errors.clone(),
                error: self.error.clone(),
            },
        }
    }
}
