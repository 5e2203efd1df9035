//! Client core of the Pemira student-council election.
//!
//! The crate drives three flows against the Pemira REST backend:
//! - voter identity capture and ballot casting ([`IdentityCapture`], [`BallotSession`])
//! - election lifecycle control ([`ElectionLifecycle`], [`AdminControls`])
//! - the admin dashboard ([`SessionContext`], [`CandidateManager`], [`VoterRoll`])
//!
//! Every remote call goes through [`PemiraApi`]; [`HttpClient`] is the
//! `reqwest` implementation.

mod ballot;
mod client;
mod config;
pub mod constants;
mod dashboard;
mod errors;
mod identity;
mod lifecycle;
mod session;
pub mod utils;
mod view;

pub use ballot::*;
pub use client::*;
pub use config::*;
pub use dashboard::*;
pub use errors::*;
pub use identity::*;
pub use lifecycle::*;
pub use session::*;
pub use view::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
