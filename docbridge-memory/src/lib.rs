//! In-memory store backend for docbridge.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `StoreClient` trait. It uses async-aware read-write locks for concurrent
//! access and is ideal for development and testing.
//!
//! # Quick Start
//!
//! ```ignore
//! use docbridge::{Entity, EntityStore, memory::MemoryStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Entity)]
//! pub struct User {
//!     pub name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = EntityStore::new(MemoryStore::new());
//!     let users = store.repository::<User>();
//!
//!     let id = users.insert(&User { name: "Alice".to_string() }).await?;
//!     let found = users.find_by_identity(id).await?;
//!     assert!(found.is_some());
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docbridge_memory;

pub mod matcher;
pub mod store;

pub use store::MemoryStore;
