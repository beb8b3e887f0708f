use async_trait::async_trait;
use bson::{Bson, Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions},
};
use tracing::debug;

use docbridge_core::{
    client::StoreClient,
    error::{RepositoryError, RepositoryResult},
    normalize::ID_FIELD,
    predicate::{Predicate, PredicateVisitor, Sort, SortDirection},
};

use crate::predicate::BsonTranslator;

#[derive(Debug)]
pub struct MongoStore {
    client: Client,
    database: String,
}

impl MongoStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(connection_string: &str, database: &str) -> MongoStoreBuilder {
        MongoStoreBuilder::new(connection_string, database)
    }

    fn collection(&self, name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(name)
    }

    fn filter_for(predicate: &Predicate) -> RepositoryResult<Document> {
        BsonTranslator.visit_predicate(predicate)
    }

    pub async fn shutdown(self) -> RepositoryResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

#[async_trait]
impl StoreClient for MongoStore {
    async fn find(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> RepositoryResult<Vec<Document>> {
        self.collection(collection)
            .find(Self::filter_for(predicate)?)
            .await
            .map_err(|e| RepositoryError::Store(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| RepositoryError::Store(e.to_string()))
    }

    async fn find_one(
        &self,
        collection: &str,
        predicate: &Predicate,
    ) -> RepositoryResult<Option<Document>> {
        self.collection(collection)
            .find_one(Self::filter_for(predicate)?)
            .await
            .map_err(|e| RepositoryError::Store(e.to_string()))
    }

    async fn find_sorted(
        &self,
        collection: &str,
        predicate: &Predicate,
        sort: &Sort,
        limit: Option<usize>,
    ) -> RepositoryResult<Vec<Document>> {
        let mut options = FindOptions::default();

        options.sort = Some(doc! {
            sort.field.clone(): match sort.direction {
                SortDirection::Asc => 1,
                SortDirection::Desc => -1,
            }
        });
        if let Some(limit) = limit {
            options.limit = Some(limit as i64);
        }

        self.collection(collection)
            .find(Self::filter_for(predicate)?)
            .with_options(options)
            .await
            .map_err(|e| RepositoryError::Store(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| RepositoryError::Store(e.to_string()))
    }

    async fn insert_one(&self, collection: &str, document: Document) -> RepositoryResult<Bson> {
        let result = self
            .collection(collection)
            .insert_one(document)
            .await
            .map_err(|e| RepositoryError::Store(e.to_string()))?;

        Ok(result.inserted_id)
    }

    async fn replace_one(
        &self,
        collection: &str,
        id: ObjectId,
        document: Document,
    ) -> RepositoryResult<()> {
        self.collection(collection)
            .replace_one(doc! { ID_FIELD: id }, document)
            .await
            .map_err(|e| RepositoryError::Store(e.to_string()))?;

        Ok(())
    }

    async fn delete_one(&self, collection: &str, predicate: &Predicate) -> RepositoryResult<u64> {
        let result = self
            .collection(collection)
            .delete_one(Self::filter_for(predicate)?)
            .await
            .map_err(|e| RepositoryError::Store(e.to_string()))?;

        Ok(result.deleted_count)
    }

    async fn delete_many(&self, collection: &str, predicate: &Predicate) -> RepositoryResult<u64> {
        let result = self
            .collection(collection)
            .delete_many(Self::filter_for(predicate)?)
            .await
            .map_err(|e| RepositoryError::Store(e.to_string()))?;

        Ok(result.deleted_count)
    }

    async fn list_collection_names(&self, filter: Option<&str>) -> RepositoryResult<Vec<String>> {
        let database = self.client.database(&self.database);
        let action = match filter {
            // Filter server-side on the exact collection name
            Some(name) => database
                .list_collection_names()
                .filter(doc! { "name": name }),
            None => database.list_collection_names(),
        };

        action
            .await
            .map_err(|e| RepositoryError::Store(e.to_string()))
    }
}

pub struct MongoStoreBuilder {
    connection_string: String,
    database: String,
}

impl MongoStoreBuilder {
    pub fn new(connection_string: &str, database: &str) -> Self {
        Self {
            connection_string: connection_string.to_string(),
            database: database.to_string(),
        }
    }

    /// Checks the connection parameters without touching the network.
    pub fn validate(&self) -> RepositoryResult<()> {
        if self.connection_string.is_empty() {
            return Err(RepositoryError::Configuration(
                "invalid or undefined connection string".to_string(),
            ));
        }
        if self.database.is_empty() {
            return Err(RepositoryError::Configuration(
                "database name is not set".to_string(),
            ));
        }

        Ok(())
    }

    pub async fn build(self) -> RepositoryResult<MongoStore> {
        self.validate()?;

        let options = ClientOptions::parse(&self.connection_string)
            .await
            .map_err(|e| RepositoryError::Configuration(e.to_string()))?;
        let client = Client::with_options(options)
            .map_err(|e| RepositoryError::Configuration(e.to_string()))?;

        debug!(database = %self.database, "mongodb store ready");

        Ok(MongoStore::new(client, self.database))
    }
}
