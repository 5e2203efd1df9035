//! Admin dashboard screens
//!
//! Every screen here is entered only after
//! [`SessionContext::guard_dashboard`](crate::SessionContext::guard_dashboard)
//! succeeded. Operations that change server data re-check the session and
//! count as user activity.

mod candidates;
mod password;
mod results;
mod voters;

pub use candidates::*;
pub use password::*;
pub use results::*;
pub use voters::*;

#[cfg(test)]
mod voters_test;

/// Case-insensitive substring match of `term` against `haystack`.
/// An empty term matches everything.
pub(crate) fn matches_search(
    haystack: &str,
    term: &str,
) -> bool {
    let term = term.trim();
    term.is_empty() || haystack.to_lowercase().contains(&term.to_lowercase())
}
