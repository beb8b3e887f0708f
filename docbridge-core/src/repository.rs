//! The generic repository surface and the store wrapper producing it.
//!
//! A [`Repository`] is bound for its lifetime to one collection name and one
//! entity type. It composes the predicate compiler and the document
//! normalizer over a [`StoreClient`], so callers get uniform retrieval and
//! mutation operations for any entity type without writing per-entity query
//! code. Repositories are stateless beyond their binding: every operation
//! takes `&self` and opens an independent store request, making an instance
//! safe to share across concurrent callers.

use std::marker::PhantomData;

use bson::{Bson, Document, oid::ObjectId};
use futures::executor::block_on;
use tracing::warn;

use crate::{
    client::StoreClient,
    entity::Entity,
    error::{RepositoryError, RepositoryResult},
    filter::{Combinator, CompareOp, FilterCriterion},
    normalize::{DocumentNormalizer, ID_FIELD},
    predicate::{Predicate, PredicateCompiler, Sort},
};

/// Outcome of a bulk delete: whether the store acknowledged the operation,
/// and how many documents were removed.
///
/// A failed delete reports `acknowledged: false` with a zero count rather
/// than an error; see [`Repository::delete_by_field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    /// Whether the store acknowledged the delete.
    pub acknowledged: bool,
    /// The number of documents removed.
    pub deleted_count: u64,
}

/// Owns a store client and hands out repositories bound to it.
///
/// # Example
///
/// ```ignore
/// let store = EntityStore::new(client);
/// let users = store.repository::<User>();
/// let id = users.insert(&user).await?;
/// ```
#[derive(Debug)]
pub struct EntityStore<S: StoreClient> {
    client: S,
}

impl<S: StoreClient> EntityStore<S> {
    /// Creates a store wrapper around the given client.
    pub fn new(client: S) -> Self {
        Self { client }
    }

    /// Returns a repository for the entity type, bound to the collection the
    /// type declares.
    pub fn repository<'a, E: Entity>(&'a self) -> Repository<'a, S, E> {
        Repository::new(E::collection_name().to_string(), &self.client)
    }

    /// Returns a repository bound to an explicit collection name.
    ///
    /// Rebinding an existing repository is not supported; targeting a
    /// different collection means constructing a new repository.
    pub fn repository_named<'a, E: Entity>(&'a self, name: &str) -> Repository<'a, S, E> {
        Repository::new(name.to_string(), &self.client)
    }

    /// Returns a reference to the underlying client.
    pub fn client(&self) -> &S {
        &self.client
    }
}

/// The uniform CRUD surface for one entity type over one collection.
#[derive(Debug)]
pub struct Repository<'a, S: StoreClient, E: Entity> {
    collection: String,
    client: &'a S,
    _marker: PhantomData<E>,
}

impl<'a, S: StoreClient, E: Entity> Repository<'a, S, E> {
    pub(crate) fn new(collection: String, client: &'a S) -> Self {
        Self { collection, client, _marker: PhantomData }
    }

    /// Returns the name of the collection this repository is bound to.
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Inserts an entity and returns the store-assigned identity value.
    ///
    /// # Errors
    ///
    /// Normalization and store-write failures propagate.
    pub async fn insert(&self, entity: &E) -> RepositoryResult<ObjectId> {
        self.insert_document(DocumentNormalizer::normalize(entity)?)
            .await
    }

    /// Inserts a pre-normalized document and returns the store-assigned
    /// identity value.
    ///
    /// # Errors
    ///
    /// Store-write failures propagate. A store acknowledging the insert
    /// without an identity value violates the client contract and surfaces
    /// as [`RepositoryError::MissingIdentity`].
    pub async fn insert_document(&self, document: Document) -> RepositoryResult<ObjectId> {
        match self
            .client
            .insert_one(&self.collection, document)
            .await?
        {
            Bson::ObjectId(id) => Ok(id),
            other => Err(RepositoryError::MissingIdentity(format!(
                "store acknowledged insert into {} with {}, not an identity value",
                self.collection,
                crate::predicate::bson_type_name(&other),
            ))),
        }
    }

    /// Replaces the document identified by `id` with the entity's document
    /// form and echoes the identity back.
    ///
    /// The store does not report whether a document was actually replaced;
    /// callers must not assume existence was checked.
    pub async fn replace(&self, entity: &E, id: ObjectId) -> RepositoryResult<ObjectId> {
        self.replace_document(DocumentNormalizer::normalize(entity)?, id)
            .await
    }

    /// Replaces the document identified by `id` with a pre-normalized
    /// document and echoes the identity back.
    pub async fn replace_document(
        &self,
        document: Document,
        id: ObjectId,
    ) -> RepositoryResult<ObjectId> {
        self.client
            .replace_one(&self.collection, id, document)
            .await?;

        Ok(id)
    }

    /// Returns every entity in the collection, in store-native order.
    pub async fn list(&self) -> RepositoryResult<Vec<E>> {
        self.find_all(&Predicate::All).await
    }

    /// Returns every entity matching the criteria under the combinator.
    ///
    /// # Errors
    ///
    /// Predicate build failures propagate before any store I/O.
    pub async fn list_where(
        &self,
        criteria: &[FilterCriterion],
        combinator: Combinator,
    ) -> RepositoryResult<Vec<E>> {
        let predicate = PredicateCompiler::compile::<E>(criteria, combinator)?;
        self.find_all(&predicate).await
    }

    /// Returns every entity whose named field equals the identity value.
    ///
    /// The field may be the primary identity field or any other
    /// identity-typed field, such as a reference to another collection's
    /// documents.
    pub async fn list_by_identity(&self, id: ObjectId, field: &str) -> RepositoryResult<Vec<E>> {
        let criteria = [FilterCriterion::eq(field, id)];
        self.list_where(&criteria, Combinator::And).await
    }

    /// Returns the first entity matching the criteria, or `None`.
    ///
    /// Absence is never an error.
    pub async fn find_where(
        &self,
        criteria: &[FilterCriterion],
        combinator: Combinator,
    ) -> RepositoryResult<Option<E>> {
        let predicate = PredicateCompiler::compile::<E>(criteria, combinator)?;

        match self
            .client
            .find_one(&self.collection, &predicate)
            .await?
        {
            Some(document) => Ok(Some(DocumentNormalizer::denormalize(document)?)),
            None => Ok(None),
        }
    }

    /// Returns the entity with the given primary identity, or `None`.
    pub async fn find_by_identity(&self, id: ObjectId) -> RepositoryResult<Option<E>> {
        let criteria = [FilterCriterion::eq(ID_FIELD, id)];
        self.find_where(&criteria, Combinator::And).await
    }

    /// Returns the first entity whose field equals the value, or `None`.
    pub async fn find_by_field(
        &self,
        field: &str,
        value: impl Into<Bson> + Send,
    ) -> RepositoryResult<Option<E>> {
        let criteria = [FilterCriterion::new(field, CompareOp::Eq, value)];
        self.find_where(&criteria, Combinator::And).await
    }

    /// Returns the entity with the maximum value of `sort_field` across the
    /// whole collection, or `None` if the collection is empty.
    pub async fn last(&self, sort_field: &str) -> RepositoryResult<Option<E>> {
        self.find_last(&Predicate::All, sort_field).await
    }

    /// Returns the matching entity with the maximum value of `sort_field`,
    /// or `None` if nothing matches.
    pub async fn last_where(
        &self,
        criteria: &[FilterCriterion],
        combinator: Combinator,
        sort_field: &str,
    ) -> RepositoryResult<Option<E>> {
        let predicate = PredicateCompiler::compile::<E>(criteria, combinator)?;
        self.find_last(&predicate, sort_field).await
    }

    /// Deletes the document with the given primary identity.
    ///
    /// Any local failure is caught and reported as `false`; callers treat
    /// failure as "not deleted" rather than as an exceptional condition.
    /// Deleting an absent document still reports `true`.
    pub async fn delete(&self, id: ObjectId) -> bool {
        match self.try_delete(id).await {
            Ok(_) => true,
            Err(err) => {
                warn!(collection = %self.collection, error = %err, "delete failed");
                false
            }
        }
    }

    /// Deletes every document whose field equals the value.
    ///
    /// Same failure policy as [`delete`](Self::delete): a failed operation
    /// reports `acknowledged: false` with a zero count instead of an error.
    pub async fn delete_by_field(&self, field: &str, value: impl Into<Bson> + Send) -> DeleteOutcome {
        match self.try_delete_by_field(field, value.into()).await {
            Ok(deleted_count) => DeleteOutcome { acknowledged: true, deleted_count },
            Err(err) => {
                warn!(collection = %self.collection, field, error = %err, "bulk delete failed");
                DeleteOutcome::default()
            }
        }
    }

    /// Returns whether the bound collection exists in the store.
    pub async fn collection_exists(&self) -> RepositoryResult<bool> {
        let names = self
            .client
            .list_collection_names(Some(&self.collection))
            .await?;

        Ok(!names.is_empty())
    }

    /// Blocking variant of [`collection_exists`](Self::collection_exists).
    ///
    /// Drives the async check to completion on the calling thread. Must not
    /// be called from within an async runtime.
    pub fn collection_exists_blocking(&self) -> RepositoryResult<bool> {
        block_on(self.collection_exists())
    }

    async fn find_all(&self, predicate: &Predicate) -> RepositoryResult<Vec<E>> {
        self.client
            .find(&self.collection, predicate)
            .await?
            .into_iter()
            .map(DocumentNormalizer::denormalize)
            .collect()
    }

    async fn find_last(
        &self,
        predicate: &Predicate,
        sort_field: &str,
    ) -> RepositoryResult<Option<E>> {
        let documents = self
            .client
            .find_sorted(&self.collection, predicate, &Sort::descending(sort_field), Some(1))
            .await?;

        match documents.into_iter().next() {
            Some(document) => Ok(Some(DocumentNormalizer::denormalize(document)?)),
            None => Ok(None),
        }
    }

    async fn try_delete(&self, id: ObjectId) -> RepositoryResult<u64> {
        let criteria = [FilterCriterion::eq(ID_FIELD, id)];
        let predicate = PredicateCompiler::compile::<E>(&criteria, Combinator::And)?;

        self.client
            .delete_one(&self.collection, &predicate)
            .await
    }

    async fn try_delete_by_field(&self, field: &str, value: Bson) -> RepositoryResult<u64> {
        let criteria = [FilterCriterion::new(field, CompareOp::Eq, value)];
        let predicate = PredicateCompiler::compile::<E>(&criteria, Combinator::And)?;

        self.client
            .delete_many(&self.collection, &predicate)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{FieldKind, FieldSpec};
    use bson::doc;
    use serde::{Deserialize, Serialize};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        body: String,
        pinned: bool,
    }

    impl Entity for Note {
        fn collection_name() -> &'static str {
            "Note"
        }

        fn fields() -> &'static [FieldSpec] {
            &[
                FieldSpec { name: "body", kind: FieldKind::Text },
                FieldSpec { name: "pinned", kind: FieldKind::Bool },
            ]
        }
    }

    /// Store stub that records every call and can be configured to fail.
    #[derive(Debug, Default)]
    struct StubClient {
        calls: Mutex<Vec<String>>,
        documents: Vec<Document>,
        insert_ack: Option<Bson>,
        fail_deletes: bool,
        delete_count: u64,
        collections: Vec<String>,
    }

    impl StubClient {
        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl StoreClient for StubClient {
        async fn find(
            &self,
            _collection: &str,
            _predicate: &Predicate,
        ) -> RepositoryResult<Vec<Document>> {
            self.record("find");
            Ok(self.documents.clone())
        }

        async fn find_one(
            &self,
            _collection: &str,
            _predicate: &Predicate,
        ) -> RepositoryResult<Option<Document>> {
            self.record("find_one");
            Ok(self.documents.first().cloned())
        }

        async fn find_sorted(
            &self,
            _collection: &str,
            _predicate: &Predicate,
            _sort: &Sort,
            limit: Option<usize>,
        ) -> RepositoryResult<Vec<Document>> {
            self.record("find_sorted");
            let mut documents = self.documents.clone();
            documents.truncate(limit.unwrap_or(usize::MAX));
            Ok(documents)
        }

        async fn insert_one(
            &self,
            _collection: &str,
            _document: Document,
        ) -> RepositoryResult<Bson> {
            self.record("insert_one");
            Ok(self
                .insert_ack
                .clone()
                .unwrap_or_else(|| Bson::ObjectId(ObjectId::new())))
        }

        async fn replace_one(
            &self,
            _collection: &str,
            _id: ObjectId,
            _document: Document,
        ) -> RepositoryResult<()> {
            self.record("replace_one");
            Ok(())
        }

        async fn delete_one(
            &self,
            _collection: &str,
            _predicate: &Predicate,
        ) -> RepositoryResult<u64> {
            self.record("delete_one");
            if self.fail_deletes {
                return Err(RepositoryError::Store("delete rejected".into()));
            }
            Ok(self.delete_count.min(1))
        }

        async fn delete_many(
            &self,
            _collection: &str,
            _predicate: &Predicate,
        ) -> RepositoryResult<u64> {
            self.record("delete_many");
            if self.fail_deletes {
                return Err(RepositoryError::Store("delete rejected".into()));
            }
            Ok(self.delete_count)
        }

        async fn list_collection_names(
            &self,
            filter: Option<&str>,
        ) -> RepositoryResult<Vec<String>> {
            self.record("list_collection_names");
            Ok(self
                .collections
                .iter()
                .filter(|name| filter.is_none_or(|f| f == name.as_str()))
                .cloned()
                .collect())
        }
    }

    #[tokio::test]
    async fn insert_returns_the_store_assigned_identity() {
        let id = ObjectId::new();
        let client = StubClient { insert_ack: Some(Bson::ObjectId(id)), ..Default::default() };
        let store = EntityStore::new(client);
        let notes = store.repository::<Note>();

        let note = Note { body: "remember".into(), pinned: false };
        assert_eq!(notes.insert(&note).await.unwrap(), id);
        assert_eq!(store.client().calls(), ["insert_one"]);
    }

    #[tokio::test]
    async fn insert_surfaces_a_store_that_acknowledges_without_identity() {
        let client = StubClient { insert_ack: Some(Bson::Null), ..Default::default() };
        let store = EntityStore::new(client);
        let notes = store.repository::<Note>();

        let err = notes
            .insert_document(doc! { "body": "x", "pinned": true })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::MissingIdentity(_)));
    }

    #[tokio::test]
    async fn replace_echoes_the_target_identity() {
        let store = EntityStore::new(StubClient::default());
        let notes = store.repository::<Note>();

        let id = ObjectId::new();
        let note = Note { body: "updated".into(), pinned: true };
        assert_eq!(notes.replace(&note, id).await.unwrap(), id);
        assert_eq!(store.client().calls(), ["replace_one"]);
    }

    #[tokio::test]
    async fn predicate_build_failure_skips_store_io() {
        let store = EntityStore::new(StubClient::default());
        let notes = store.repository::<Note>();

        let criteria = [FilterCriterion::eq("nonexistent", 1i64)];
        let err = notes
            .list_where(&criteria, Combinator::And)
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::UnknownField { .. }));
        assert!(store.client().calls().is_empty());
    }

    #[tokio::test]
    async fn find_where_reports_absence_as_none() {
        let store = EntityStore::new(StubClient::default());
        let notes = store.repository::<Note>();

        let criteria = [FilterCriterion::eq("pinned", true)];
        let found = notes
            .find_where(&criteria, Combinator::And)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn delete_reports_false_instead_of_propagating_store_failures() {
        let client = StubClient { fail_deletes: true, ..Default::default() };
        let store = EntityStore::new(client);
        let notes = store.repository::<Note>();

        assert!(!notes.delete(ObjectId::new()).await);
    }

    #[tokio::test]
    async fn delete_reports_true_even_when_nothing_matched() {
        let store = EntityStore::new(StubClient::default());
        let notes = store.repository::<Note>();

        assert!(notes.delete(ObjectId::new()).await);
    }

    #[tokio::test]
    async fn delete_by_field_reports_acknowledgment_and_count() {
        let client = StubClient { delete_count: 3, ..Default::default() };
        let store = EntityStore::new(client);
        let notes = store.repository::<Note>();

        let outcome = notes.delete_by_field("pinned", false).await;
        assert_eq!(outcome, DeleteOutcome { acknowledged: true, deleted_count: 3 });
    }

    #[tokio::test]
    async fn delete_by_field_swallows_failures_into_a_zero_outcome() {
        let client = StubClient { fail_deletes: true, ..Default::default() };
        let store = EntityStore::new(client);
        let notes = store.repository::<Note>();

        let outcome = notes.delete_by_field("pinned", false).await;
        assert_eq!(outcome, DeleteOutcome::default());
    }

    #[tokio::test]
    async fn delete_by_field_swallows_its_own_build_failures() {
        let store = EntityStore::new(StubClient::default());
        let notes = store.repository::<Note>();

        let outcome = notes.delete_by_field("nonexistent", 1i64).await;
        assert_eq!(outcome, DeleteOutcome::default());
        assert!(store.client().calls().is_empty());
    }

    #[tokio::test]
    async fn collection_exists_filters_by_the_bound_name() {
        let client = StubClient {
            collections: vec!["Note".into(), "Other".into()],
            ..Default::default()
        };
        let store = EntityStore::new(client);

        assert!(store.repository::<Note>().collection_exists().await.unwrap());
        assert!(
            !store
                .repository_named::<Note>("Absent")
                .collection_exists()
                .await
                .unwrap()
        );
    }

    #[test]
    fn collection_exists_has_a_blocking_variant() {
        let client = StubClient { collections: vec!["Note".into()], ..Default::default() };
        let store = EntityStore::new(client);
        let notes = store.repository::<Note>();

        assert!(notes.collection_exists_blocking().unwrap());
    }

    #[tokio::test]
    async fn repositories_bind_to_the_entity_collection_by_default() {
        let store = EntityStore::new(StubClient::default());
        assert_eq!(store.repository::<Note>().collection_name(), "Note");
        assert_eq!(
            store
                .repository_named::<Note>("archive")
                .collection_name(),
            "archive"
        );
    }
}
