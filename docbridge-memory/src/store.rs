//! In-memory store-client implementation.
//!
//! This module provides a simple but complete in-memory backend that keeps
//! documents in HashMaps behind async-aware read-write locks. It is intended
//! for development and testing; queries scan the collection, which is
//! acceptable for small to medium datasets.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::{Bson, Document, oid::ObjectId};
use mea::rwlock::RwLock;

use docbridge_core::{
    client::StoreClient,
    error::RepositoryResult,
    normalize::ID_FIELD,
    predicate::{Predicate, Sort, SortDirection},
};

use crate::matcher::DocumentMatcher;

type CollectionVec = Vec<Document>;
type StoreMap = HashMap<String, CollectionVec>;

/// Thread-safe in-memory document store.
///
/// Cloneable: clones share the same underlying data through an `Arc`.
/// Documents are held per collection in insertion order, which is the
/// store-native order surfaced by unsorted retrieval. Inserted documents
/// without an identity field get a freshly generated one, matching the
/// assigned-identity contract of persistent stores.
#[derive(Default, Clone, Debug)]
pub struct MemoryStore {
    store: Arc<RwLock<StoreMap>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self { store: Arc::new(RwLock::new(StoreMap::new())) }
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> RepositoryResult<Vec<Document>> {
        let store = self.store.read().await;

        match store.get(collection) {
            Some(documents) => DocumentMatcher::filter(documents, predicate),
            None => Ok(vec![]),
        }
    }

    async fn find_one(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> RepositoryResult<Option<Document>> {
        Ok(self
            .find(collection, predicate)
            .await?
            .into_iter()
            .next())
    }

    async fn find_sorted(
        &self,
        collection: &str,
        predicate: &Predicate,
        sort: &Sort,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<Document>> {
        let mut documents = self.find(collection, predicate).await?;

        // Stable sort: ties keep insertion order, the store-native order
        documents.sort_by(|a, b| {
            let ordering = DocumentMatcher::compare_by_field(a, b, &sort.field);
            match sort.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        documents.truncate(limit.unwrap_or(usize::MAX));

        Ok(documents)
    }

    async fn insert_one(&self, collection: &str, document: Document) -> RepositoryResult<Bson> {
        let mut store = self.store.write().await;
        let documents = store
            .entry(collection.to_string())
            .or_default();

        let mut document = document;
        let id = match document.get(ID_FIELD) {
            Some(Bson::ObjectId(id)) => *id,
            _ => {
                let id = ObjectId::new();
                document.insert(ID_FIELD, id);
                id
            }
        };

        documents.push(document);

        Ok(Bson::ObjectId(id))
    }

    async fn replace_one(
        &self,
        collection: &str,
        id: ObjectId,
        document: Document,
    ) -> RepositoryResult<()> {
        let mut store = self.store.write().await;
        let Some(documents) = store.get_mut(collection) else {
            // Zero-match replace is not an error
            return Ok(());
        };

        if let Some(existing) = documents
            .iter_mut()
            .find(|doc| doc.get(ID_FIELD) == Some(&Bson::ObjectId(id)))
        {
            let mut replacement = document;
            replacement.insert(ID_FIELD, id);
            *existing = replacement;
        }

        Ok(())
    }

    async fn delete_one(&self, collection: &str, predicate: &Predicate) -> RepositoryResult<u64> {
        let mut store = self.store.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Ok(0);
        };

        for (index, document) in documents.iter().enumerate() {
            if DocumentMatcher::new(document).matches(predicate)? {
                documents.remove(index);
                return Ok(1);
            }
        }

        Ok(0)
    }

    async fn delete_many(&self, collection: &str, predicate: &Predicate) -> RepositoryResult<u64> {
        let mut store = self.store.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Ok(0);
        };

        let before = documents.len();
        documents.retain(|document| {
            !DocumentMatcher::new(document)
                .matches(predicate)
                .unwrap_or(false)
        });

        Ok((before - documents.len()) as u64)
    }

    async fn list_collection_names(&self, filter: Option<&str>) -> RepositoryResult<Vec<String>> {
        Ok(self
            .store
            .read()
            .await
            .keys()
            .filter(|name| filter.is_none_or(|f| f == name.as_str()))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use docbridge_core::{
        entity::{Entity, FieldKind, FieldSpec},
        filter::{Combinator, FilterCriterion},
        predicate::PredicateCompiler,
    };
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Metric {
        name: String,
        value: i64,
    }

    impl Entity for Metric {
        fn collection_name() -> &'static str {
            "Metric"
        }

        fn fields() -> &'static [FieldSpec] {
            &[
                FieldSpec { name: "name", kind: FieldKind::Text },
                FieldSpec { name: "value", kind: FieldKind::Number },
            ]
        }
    }

    fn eq(field: &str, value: impl Into<Bson>) -> Predicate {
        PredicateCompiler::compile::<Metric>(
            &[FilterCriterion::eq(field, value)],
            Combinator::And,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_an_identity_when_the_document_has_none() {
        let store = MemoryStore::new();
        let ack = store
            .insert_one("metrics", doc! { "name": "cpu", "value": 10 })
            .await
            .unwrap();

        let Bson::ObjectId(id) = ack else {
            panic!("expected an assigned identity");
        };

        let found = store.find_one("metrics", &eq(ID_FIELD, id)).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn insert_keeps_an_identity_the_document_already_carries() {
        let store = MemoryStore::new();
        let id = ObjectId::new();
        let ack = store
            .insert_one("metrics", doc! { ID_FIELD: id, "name": "cpu", "value": 1 })
            .await
            .unwrap();

        assert_eq!(ack, Bson::ObjectId(id));
    }

    #[tokio::test]
    async fn find_returns_documents_in_insertion_order() {
        let store = MemoryStore::new();
        for value in [3i64, 1, 2] {
            store
                .insert_one("metrics", doc! { "name": "cpu", "value": value })
                .await
                .unwrap();
        }

        let values = store
            .find("metrics", &Predicate::All)
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc.get("value").cloned().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(values, [Bson::Int64(3), Bson::Int64(1), Bson::Int64(2)]);
    }

    #[tokio::test]
    async fn find_sorted_descending_with_limit_returns_the_maximum() {
        let store = MemoryStore::new();
        for value in [1i64, 5, 3] {
            store
                .insert_one("metrics", doc! { "name": "cpu", "value": value })
                .await
                .unwrap();
        }

        let top = store
            .find_sorted("metrics", &Predicate::All, &Sort::descending("value"), Some(1))
            .await
            .unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].get("value"), Some(&Bson::Int64(5)));
    }

    #[tokio::test]
    async fn replace_one_swaps_the_document_and_keeps_its_identity() {
        let store = MemoryStore::new();
        let ack = store
            .insert_one("metrics", doc! { "name": "cpu", "value": 1 })
            .await
            .unwrap();
        let Bson::ObjectId(id) = ack else { unreachable!() };

        store
            .replace_one("metrics", id, doc! { "name": "cpu", "value": 99i64 })
            .await
            .unwrap();

        let replaced = store
            .find_one("metrics", &eq(ID_FIELD, id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.get("value"), Some(&Bson::Int64(99)));
    }

    #[tokio::test]
    async fn replace_one_of_an_absent_document_is_a_quiet_no_op() {
        let store = MemoryStore::new();
        store
            .replace_one("metrics", ObjectId::new(), doc! { "name": "cpu", "value": 1 })
            .await
            .unwrap();

        assert!(store.find("metrics", &Predicate::All).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_many_removes_every_match_and_reports_the_count() {
        let store = MemoryStore::new();
        for name in ["a", "a", "a", "b"] {
            store
                .insert_one("metrics", doc! { "name": name, "value": 0 })
                .await
                .unwrap();
        }

        let removed = store
            .delete_many("metrics", &eq("name", "a"))
            .await
            .unwrap();
        assert_eq!(removed, 3);
        assert_eq!(store.find("metrics", &Predicate::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_one_removes_at_most_one_document() {
        let store = MemoryStore::new();
        for _ in 0..2 {
            store
                .insert_one("metrics", doc! { "name": "dup", "value": 0 })
                .await
                .unwrap();
        }

        assert_eq!(store.delete_one("metrics", &eq("name", "dup")).await.unwrap(), 1);
        assert_eq!(store.find("metrics", &Predicate::All).await.unwrap().len(), 1);
        assert_eq!(store.delete_one("metrics", &eq("name", "gone")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_collection_names_supports_an_exact_filter() {
        let store = MemoryStore::new();
        store.insert_one("metrics", doc! { "name": "x", "value": 0 }).await.unwrap();
        store.insert_one("events", doc! { "name": "y", "value": 0 }).await.unwrap();

        let all = store.list_collection_names(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let filtered = store.list_collection_names(Some("metrics")).await.unwrap();
        assert_eq!(filtered, ["metrics"]);

        let absent = store.list_collection_names(Some("sessions")).await.unwrap();
        assert!(absent.is_empty());
    }
}
