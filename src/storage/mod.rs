// storage/mod.rs
// Persistent URL store

mod metadata;
pub mod migrations;
pub mod pool;
mod rows;
mod store;

// Re-export commonly used items
pub use metadata::{DomainSummary, StoreMetadata};
pub use migrations::run_migrations;
pub use pool::{init_db_pool_with_path, init_memory_pool};
pub use store::{DomainListing, DomainSort, DomainStore, StorageUsage};
