//! Domain logic for supplier item identity resolution and the correction
//! workflow.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db` crate
//! loads rows and hands them to these functions; the `api` crate wires the
//! results back into transactions.

pub mod correction;
pub mod error;
pub mod gtin;
pub mod matching;
pub mod paging;
pub mod roles;
pub mod status;
pub mod triage;
pub mod types;
