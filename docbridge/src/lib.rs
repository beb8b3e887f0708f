//! Main docbridge crate: typed entity repositories over document stores.
//!
//! This crate is the primary entry point for users of the docbridge
//! framework. It re-exports the core types from the sub-crates and provides
//! convenient access to the storage backends.
//!
//! # Features
//!
//! - **Typed repositories** - Uniform CRUD operations for any entity type,
//!   with no per-entity query code
//! - **Declarative filtering** - Runtime-built criteria lists compiled into
//!   a single predicate, validated against the entity's fields before any
//!   store I/O
//! - **Multiple backends** - In-memory and MongoDB stores behind one client
//!   trait
//! - **Derive support** - `#[derive(Entity)]` generates the field table the
//!   predicate compiler validates against
//!
//! # Quick Start
//!
//! ```ignore
//! use docbridge::{prelude::*, memory::MemoryStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Entity)]
//! pub struct User {
//!     pub name: String,
//!     pub age: i64,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = EntityStore::new(MemoryStore::new());
//!     let users = store.repository::<User>();
//!
//!     // Insert an entity; the store assigns its identity
//!     let id = users
//!         .insert(&User { name: "Alice".to_string(), age: 34 })
//!         .await
//!         .unwrap();
//!
//!     // Point lookup by identity: absence is `None`, never an error
//!     let alice = users.find_by_identity(id).await.unwrap();
//!     println!("found: {:?}", alice);
//!
//!     // Declarative filtering with one combinator across all criteria
//!     let adults = users
//!         .list_where(
//!             &[
//!                 FilterCriterion::gte("age", 18i64),
//!                 FilterCriterion::contains("name", "A"),
//!             ],
//!             Combinator::And,
//!         )
//!         .await
//!         .unwrap();
//!     println!("matched: {}", adults.len());
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires the `mongodb`
//!   feature)

pub mod prelude;

pub use docbridge_core::{client, entity, error, filter, normalize, predicate, repository};

/// Derives the [`entity::Entity`] trait for a struct with named fields.
pub use docbridge_macros::Entity;

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docbridge_memory::MemoryStore;
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docbridge_mongodb::{MongoStore, MongoStoreBuilder};
}
