//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for inserts where the API accepts them
//! - Joined read models for listings

pub mod correction;
pub mod product;
pub mod product_merge;
pub mod review_queue;
pub mod supplier;
pub mod supplier_item;
pub mod supplier_mapping;
