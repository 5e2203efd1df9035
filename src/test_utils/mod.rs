//! Fixtures shared by the unit tests of every module
mod fake_backend;

pub use fake_backend::*;

use std::sync::Arc;

use crate::ElectionLifecycle;
use crate::PemiraApi;
use crate::SessionConfig;
use crate::SessionContext;
use crate::UiConfig;

/// Lifecycle over `api` with the cache already filled by one fetch
pub async fn fetched_lifecycle(api: Arc<dyn PemiraApi>) -> Arc<ElectionLifecycle> {
    let lifecycle = Arc::new(ElectionLifecycle::new(api));
    let _ = lifecycle.fetch_status().await;
    lifecycle
}

/// Session holding the fake admin token
pub fn admin_session(api: Arc<dyn PemiraApi>) -> Arc<SessionContext> {
    let session = SessionContext::new(api, SessionConfig::default(), &UiConfig::default());
    session.restore(ADMIN_TOKEN, Some(ADMIN_ID.to_string()));
    Arc::new(session)
}
