//! # Persistent Storage
//!
//! Disk-backed implementations of [`crate::store::LeadStore`].

mod redb_store;

pub use redb_store::RedbStore;
