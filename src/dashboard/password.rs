use std::fmt;

use tracing::info;
use tracing::warn;

use crate::constants::*;
use crate::PasswordChange;
use crate::PemiraApi;
use crate::SessionContext;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct PasswordForm {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl fmt::Debug for PasswordForm {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("PasswordForm").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordFeedback {
    Success(String),
    Error(String),
}

/// Submits the change-password form.
///
/// A mismatching confirmation, an expired session or a session without
/// user id is rejected before any request. The form is cleared only on success.
pub async fn change_password(
    api: &dyn PemiraApi,
    session: &SessionContext,
    form: &mut PasswordForm,
) -> PasswordFeedback {
    if form.new_password != form.confirm_password {
        return PasswordFeedback::Error(MSG_PASSWORD_MISMATCH.to_string());
    }
    if let Err(e) = session.require_token() {
        warn!("[:change_password] no live session: {}", e);
        return PasswordFeedback::Error(MSG_PASSWORD_NO_USER.to_string());
    }
    let Some(user_id) = session.user_id() else {
        return PasswordFeedback::Error(MSG_PASSWORD_NO_USER.to_string());
    };
    session.touch();

    let change = PasswordChange {
        user_id: user_id.clone(),
        old_password: form.old_password.clone(),
        new_password: form.new_password.clone(),
        confirm_password: form.confirm_password.clone(),
    };
    match api.change_password(change).await {
        Ok(_) => {
            info!("[:change_password] password changed for user {}", user_id);
            *form = PasswordForm::default();
            PasswordFeedback::Success(MSG_PASSWORD_CHANGED.to_string())
        }
        Err(e) => {
            warn!("[:change_password] user {}: {}", user_id, e);
            PasswordFeedback::Error(e.user_message(MSG_PASSWORD_SERVER))
        }
    }
}
