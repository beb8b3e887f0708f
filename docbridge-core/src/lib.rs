//! A typed entity repository layer over schema-less document stores.
//!
//! This crate is the core of the docbridge project and provides:
//!
//! - **Entity traits** ([`entity`]) - Core traits for defining entities and their field tables
//! - **Filter criteria** ([`filter`]) - Declarative, runtime-constructed comparison criteria
//! - **Predicate compilation** ([`predicate`]) - Criteria-to-predicate compilation with build-time validation
//! - **Document normalization** ([`normalize`]) - Entity/document conversion and identity handling
//! - **Store-client contract** ([`client`]) - The trait store backends implement
//! - **Generic repository** ([`repository`]) - Uniform CRUD operations for any entity type
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use docbridge_core::{
//!     entity::{Entity, FieldKind, FieldSpec},
//!     filter::{Combinator, FilterCriterion},
//!     repository::EntityStore,
//! };
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub name: String,
//!     pub age: i64,
//! }
//!
//! impl Entity for User {
//!     fn collection_name() -> &'static str {
//!         "User"
//!     }
//!
//!     fn fields() -> &'static [FieldSpec] {
//!         &[
//!             FieldSpec { name: "name", kind: FieldKind::Text },
//!             FieldSpec { name: "age", kind: FieldKind::Number },
//!         ]
//!     }
//! }
//!
//! # async fn example(store: &EntityStore<impl docbridge_core::client::StoreClient>) -> docbridge_core::error::RepositoryResult<()> {
//! let users = store.repository::<User>();
//! let adults = users
//!     .list_where(&[FilterCriterion::gte("age", 18i64)], Combinator::And)
//!     .await?;
//! # Ok(()) }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docbridge_core;

pub mod client;
pub mod entity;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod predicate;
pub mod repository;
