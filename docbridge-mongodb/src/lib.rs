//! MongoDB store backend for docbridge.
//!
//! This crate implements the `StoreClient` trait on top of the official
//! MongoDB driver, so compiled predicates execute on the server's query
//! engine.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! docbridge = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Connection
//!
//! The backend is constructed from a connection string and a database name.
//! Both are validated non-empty when the builder runs, before any connection
//! attempt; missing parameters surface as a configuration error.
//!
//! # Example
//!
//! ```ignore
//! use docbridge::mongodb::MongoStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoStore::builder("mongodb://localhost:27017", "appdb")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docbridge_mongodb;

pub mod predicate;
pub mod store;

pub use store::{MongoStore, MongoStoreBuilder};
