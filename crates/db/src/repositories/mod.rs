//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods that must run inside a
//! caller-owned transaction take `&mut DbTransaction` instead and are named
//! or documented accordingly.

pub mod correction_repo;
pub mod product_merge_repo;
pub mod product_repo;
pub mod review_queue_repo;
pub mod supplier_item_repo;
pub mod supplier_mapping_repo;
pub mod supplier_repo;

pub use correction_repo::CorrectionRepo;
pub use product_merge_repo::ProductMergeRepo;
pub use product_repo::ProductRepo;
pub use review_queue_repo::ReviewQueueRepo;
pub use supplier_item_repo::SupplierItemRepo;
pub use supplier_mapping_repo::SupplierMappingRepo;
pub use supplier_repo::SupplierRepo;
