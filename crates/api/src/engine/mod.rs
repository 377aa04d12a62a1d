//! Project workflow orchestration.
//!
//! Handlers stay thin: they parse input and pick a target status, while the
//! functions here re-read the project, run the transition table, write the
//! result, move ledger lines and publish notices.

pub mod ledger;
pub mod transitions;
