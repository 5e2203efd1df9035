use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use tracing::info;

use super::SessionContext;
use super::SessionState;
use crate::Redirect;
use crate::Route;

/// Periodically checks `session` for expiry.
///
/// Resolves with the redirect to logout when the session expires, or with
/// `None` once the session ends some other way or `shutdown` fires.
pub fn spawn_inactivity_watchdog(
    session: Arc<SessionContext>,
    mut shutdown: watch::Receiver<()>,
) -> JoinHandle<Option<Redirect>> {
    tokio::spawn(async move {
        let mut ticker = interval(session.config().activity_check_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(reason) = session.check_expiry() {
                        info!("[:watchdog] forcing re-authentication: {:?}", reason);
                        return Some(Redirect::now(Route::Logout));
                    }
                    if session.state() != SessionState::Authenticated {
                        debug!("[:watchdog] session ended, stopping");
                        return None;
                    }
                }
                _ = shutdown.changed() => {
                    debug!("[:watchdog] shutdown");
                    return None;
                }
            }
        }
    })
}
