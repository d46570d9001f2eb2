//! Workflow services.
//!
//! Each service owns the transaction for one operation: it locks the rows
//! it depends on, asks `medsupply_core` for a plan, writes the plan through
//! the repositories, and commits. Handlers stay thin wrappers around these.

pub mod catalog;
pub mod corrections;
pub mod triage;
