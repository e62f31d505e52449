//! Entity-and-index consistency layer over the key-value primitive.
//!
//! # Responsibility
//! - Persist project and todo records plus their list indexes.
//! - Order multi-key writes so interruptions leave the mildest inconsistency.
//!
//! # Invariants
//! - Every index mutation is a whole-value read-modify-write.
//! - Index resolution skips IDs whose records are missing.
//! - Malformed stored values surface as errors, never as defaults.

mod codec;
mod entity_store;
mod error;
mod index_lock;
pub mod keys;

pub use entity_store::{ConsistencyReport, DanglingTodo, EntityStore, MisfiledTodo};
pub use error::{RepoError, RepoResult};
