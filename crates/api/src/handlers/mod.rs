//! HTTP handlers, grouped by resource.

pub mod catalog;
pub mod corrections;
pub mod gtin;
pub mod queue;
pub mod review;
