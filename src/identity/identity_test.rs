use std::sync::Arc;

use reqwest::StatusCode;

use super::*;
use crate::test_utils::rejection;
use crate::test_utils::FakeBackend;
use crate::ElectionStatus;
use crate::ErrorCode;

fn filled_form() -> IdentityForm {
    IdentityForm {
        name: "Maria Simanjuntak".into(),
        student_id: "12345678".into(),
        department: "Teknik Informatika".into(),
        cohort: "2022".into(),
    }
}

fn capture(backend: &Arc<FakeBackend>) -> IdentityCapture {
    IdentityCapture::new(
        backend.clone(),
        Arc::new(ElectionLifecycle::new(backend.clone())),
        2024,
    )
}

#[test]
fn test_cohort_options_span_eight_years_each_way() {
    let options = cohort_options(2024);
    assert_eq!(options.len(), 17);
    assert_eq!(options.first().map(String::as_str), Some("2016"));
    assert_eq!(options.last().map(String::as_str), Some("2032"));
    assert!(options.contains(&"2024".to_string()));
}

#[test]
fn test_validate_reports_every_missing_field() {
    let errors = IdentityForm::default().validate(&cohort_options(2024)).unwrap_err();
    assert_eq!(
        errors,
        vec![
            FieldError::Missing(Field::Name),
            FieldError::Missing(Field::StudentId),
            FieldError::Missing(Field::Department),
            FieldError::Missing(Field::Cohort),
        ]
    );
    assert_eq!(errors[1].to_string(), "NIM wajib diisi");
}

#[test]
fn test_validate_rejects_cohort_outside_options() {
    let form = IdentityForm {
        cohort: "1999".into(),
        ..filled_form()
    };
    assert_eq!(
        form.validate(&cohort_options(2024)),
        Err(vec![FieldError::UnknownCohort("1999".into())])
    );
}

#[test]
fn test_validate_trims_fields() {
    let form = IdentityForm {
        student_id: " 12345678 ".into(),
        ..filled_form()
    };
    let voter = form.validate(&cohort_options(2024)).unwrap();
    assert_eq!(voter.student_id, "12345678");
    assert_eq!(voter.cohort, "2022");
}

#[tokio::test]
async fn test_closed_election_shows_notice() {
    let backend = Arc::new(FakeBackend::new(ElectionStatus::Completed));
    let mut capture = capture(&backend);

    assert_eq!(
        capture.open().await,
        IdentityView::Unavailable {
            notice: StatusNotice::COMPLETED,
            error: None
        }
    );

    *capture.form_mut() = filled_form();
    assert!(capture.submit().await.is_err());
    assert_eq!(backend.calls("add_voter"), 0);
}

#[tokio::test]
async fn test_status_failure_fails_closed() {
    let backend = Arc::new(FakeBackend::new(ElectionStatus::Open));
    backend.fail("fetch_status", ErrorCode::ConnectionFailed.into());
    let mut capture = capture(&backend);

    assert_eq!(
        capture.open().await,
        IdentityView::Unavailable {
            notice: StatusNotice::CLOSED,
            error: Some(crate::constants::MSG_STATUS_FETCH_FAILED.into())
        }
    );
}

#[tokio::test]
async fn test_submit_registers_voter_and_navigates_to_ballot() {
    let backend = Arc::new(FakeBackend::new(ElectionStatus::Open));
    let mut capture = capture(&backend);
    assert!(matches!(capture.open().await, IdentityView::Form { .. }));

    *capture.form_mut() = filled_form();
    let redirect = capture.submit().await.unwrap();

    assert_eq!(
        redirect,
        Redirect::now(Route::Vote {
            student_id: "12345678".into()
        })
    );
    assert_eq!(backend.voters().len(), 1);
    assert_eq!(backend.voters()[0].name, "Maria Simanjuntak");
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let backend = Arc::new(FakeBackend::new(ElectionStatus::Open));
    let mut capture = capture(&backend);
    capture.open().await;
    capture.form_mut().name = "Maria".into();

    let Err(IdentityView::Form {
        form, field_errors, ..
    }) = capture.submit().await
    else {
        panic!("expected form with errors");
    };

    assert_eq!(form.name, "Maria");
    assert_eq!(field_errors.len(), 3);
    assert_eq!(backend.calls("add_voter"), 0);
}

#[tokio::test]
async fn test_failed_registration_keeps_form() {
    let backend = Arc::new(FakeBackend::new(ElectionStatus::Open));
    let mut capture = capture(&backend);
    capture.open().await;
    *capture.form_mut() = filled_form();

    backend.fail("add_voter", ErrorCode::ServerError.into());
    let Err(IdentityView::Form { form, error, .. }) = capture.submit().await else {
        panic!("expected form");
    };
    assert_eq!(form, filled_form());
    assert_eq!(error.as_deref(), Some(MSG_IDENTITY_FAILED));

    backend.fail("add_voter", rejection(StatusCode::BAD_REQUEST, "NIM sudah terdaftar"));
    let Err(IdentityView::Form { error, .. }) = capture.submit().await else {
        panic!("expected form");
    };
    assert_eq!(error.as_deref(), Some("NIM sudah terdaftar"));

    backend.recover("add_voter");
    assert!(capture.submit().await.is_ok());
}
