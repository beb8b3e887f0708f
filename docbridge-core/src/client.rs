//! The store-client contract backends implement.
//!
//! The core never talks to a document store directly; every operation goes
//! through this trait. Implementations execute compiled predicates against
//! their native query engine and are required to be thread-safe: each call
//! opens an independent request, and no call may hold a scoped resource
//! (such as a cursor) beyond its own completion.

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use std::fmt::Debug;

use crate::{
    error::RepositoryResult,
    predicate::{Predicate, Sort},
};

/// Abstract interface to a document store.
///
/// All methods are async and safe to invoke concurrently with any other
/// method on the same instance; the store is expected to provide per-request
/// isolation. Connection pooling, retries, caching, and backpressure are
/// implementation concerns and are not modeled here.
#[async_trait]
pub trait StoreClient: Send + Sync + Debug {
    /// Returns every document in the collection matching the predicate, in
    /// store-native order (unspecified, not guaranteed stable).
    async fn find(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> RepositoryResult<Vec<Document>>;

    /// Returns the first document matching the predicate, or `None`.
    async fn find_one(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> RepositoryResult<Option<Document>>;

    /// Returns matching documents ordered by the sort specification,
    /// truncated to `limit` when given.
    ///
    /// Ties on the sort field are broken by store-native order.
    async fn find_sorted(
        &self,
        collection: &str,
        predicate: &Predicate,
        sort: &Sort,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<Document>>;

    /// Inserts one document and returns the identity value the store
    /// acknowledged for it.
    ///
    /// If the document carries no identity field, the store assigns one; the
    /// returned value is always the identity under which the document was
    /// actually stored.
    async fn insert_one(&self, collection: &str, document: Document) -> RepositoryResult<Bson>;

    /// Replaces the full document whose identity field equals `id`.
    ///
    /// A zero-match replace is not an error; the store does not report
    /// whether a document was actually replaced.
    async fn replace_one(
        &self,
        collection: &str,
        id: ObjectId,
        document: Document,
    ) -> RepositoryResult<()>;

    /// Deletes the first document matching the predicate; returns the
    /// number of documents removed (zero or one).
    async fn delete_one(&self, collection: &str, predicate: &Predicate) -> RepositoryResult<u64>;

    /// Deletes every document matching the predicate; returns the number of
    /// documents removed.
    async fn delete_many(&self, collection: &str, predicate: &Predicate) -> RepositoryResult<u64>;

    /// Lists collection names, optionally restricted to an exact name.
    ///
    /// Passing `Some(name)` lets backends filter server-side; the result is
    /// then either empty or the single matching name.
    async fn list_collection_names(&self, filter: Option<&str>) -> RepositoryResult<Vec<String>>;
}
