//! Navigation targets and status texts shared by every screen

use std::fmt;
use std::time::Duration;

use crate::ElectionStatus;

/// Screens a flow can navigate to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Admin login, the landing page
    Login,
    /// Voter identity capture
    Identity,
    /// Ballot screen for one voter
    Vote { student_id: String },
    Dashboard,
    /// Clears credentials, then returns to [`Route::Login`]
    Logout,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Identity => "/Identitas".to_string(),
            Route::Vote { student_id } => format!("/Vote?nim={student_id}"),
            Route::Dashboard => "/Dashboard".to_string(),
            Route::Logout => "/Logout".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Navigation scheduled by a flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    pub after: Duration,
}

impl Redirect {
    pub fn now(to: Route) -> Self {
        Self {
            to,
            after: Duration::ZERO,
        }
    }

    pub fn after(
        to: Route,
        after: Duration,
    ) -> Self {
        Self { to, after }
    }

    /// Waits out the delay and yields the target
    pub async fn follow(self) -> Route {
        if !self.after.is_zero() {
            tokio::time::sleep(self.after).await;
        }
        self.to
    }
}

/// Terminal notice shown to voters instead of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusNotice {
    pub title: &'static str,
    pub description: &'static str,
}

impl StatusNotice {
    pub const CLOSED: StatusNotice = StatusNotice {
        title: "Pemilihan Sedang Ditutup",
        description: "Saat ini, proses Pemilihan Raya (Pemira) sedang tidak aktif. \
                      Silakan hubungi panitia untuk informasi lebih lanjut.",
    };

    pub const COMPLETED: StatusNotice = StatusNotice {
        title: "Pemilihan Telah Selesai",
        description: "Proses Pemilihan Raya (Pemira) telah usai. \
                      Terima kasih atas partisipasi Anda dalam demokrasi kampus.",
    };

    /// `None` when voting is open and the regular screen applies.
    pub fn for_status(status: ElectionStatus) -> Option<Self> {
        match status {
            ElectionStatus::Open => None,
            ElectionStatus::Closed => Some(Self::CLOSED),
            ElectionStatus::Completed => Some(Self::COMPLETED),
        }
    }
}

impl fmt::Display for StatusNotice {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}\n{}", self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Login.path(), "/");
        assert_eq!(Route::Identity.path(), "/Identitas");
        assert_eq!(
            Route::Vote {
                student_id: "123".into()
            }
            .path(),
            "/Vote?nim=123"
        );
        assert_eq!(Route::Logout.to_string(), "/Logout");
    }

    #[test]
    fn test_notice_only_for_non_open_status() {
        assert!(StatusNotice::for_status(ElectionStatus::Open).is_none());

        let closed = StatusNotice::for_status(ElectionStatus::Closed).unwrap();
        assert_eq!(closed.title, "Pemilihan Sedang Ditutup");
        assert_eq!(
            closed.description,
            "Saat ini, proses Pemilihan Raya (Pemira) sedang tidak aktif. Silakan hubungi panitia untuk informasi lebih lanjut."
        );

        let completed = StatusNotice::for_status(ElectionStatus::Completed).unwrap();
        assert_eq!(completed.title, "Pemilihan Telah Selesai");
        assert_eq!(
            completed.description,
            "Proses Pemilihan Raya (Pemira) telah usai. \
             Terima kasih atas partisipasi Anda dalam demokrasi kampus."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_redirect_follow_waits_for_delay() {
        let start = tokio::time::Instant::now();
        let to = Redirect::after(Route::Identity, Duration::from_secs(3))
            .follow()
            .await;
        assert_eq!(to, Route::Identity);
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
