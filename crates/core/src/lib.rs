//! Domain logic for the roofing project service.
//!
//! This crate has no I/O. It owns the role model, the project workflow
//! transition table, and the arithmetic behind the material ledger
//! (sufficiency checks, replenishment sizing, low-stock classification).

pub mod error;
pub mod materials;
pub mod roles;
pub mod types;
pub mod validation;
pub mod workflow;
