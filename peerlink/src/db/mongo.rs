//! MongoDB client and collection wrapper

use bson::{doc, oid::ObjectId, DateTime, Document};
use futures_util::TryStreamExt;
use mongodb::{
    options::IndexOptions,
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;

use crate::db::schemas::Metadata;
use crate::types::PeerlinkError;

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect and ping, failing fast when the server is unreachable
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, PeerlinkError> {
        info!("Connecting to MongoDB at {}", redact_uri(uri));

        // Bound server selection so an unreachable host fails in seconds
        let timeout_uri = if uri.contains('?') {
            format!("{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        } else {
            format!("{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000", uri)
        };

        // Parse the URI and build the driver client
        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(|e| PeerlinkError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        // Verify the connection before serving traffic
        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| PeerlinkError::Database(format!("MongoDB ping failed: {}", e)))?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection, creating its indexes
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, PeerlinkError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + IntoIndexes + MutMetadata,
{
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, PeerlinkError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        // Apply indexes
        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    async fn apply_indexes(&self) -> Result<(), PeerlinkError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        // createIndexes is idempotent for unchanged definitions
        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(|e| PeerlinkError::Database(format!("Failed to create indexes: {}", e)))?;

        Ok(())
    }

    /// Insert a document, stamping its metadata
    pub async fn insert_one(&self, mut item: T) -> Result<T, PeerlinkError> {
        // Set timestamps
        let now = DateTime::now();
        let metadata = item.mut_metadata();
        metadata.created_at = Some(now);
        metadata.updated_at = Some(now);

        self.inner
            .insert_one(&item)
            .await
            .map_err(|e| PeerlinkError::Database(format!("Insert failed: {}", e)))?;

        Ok(item)
    }

    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, PeerlinkError> {
        self.inner
            .find_one(filter)
            .await
            .map_err(|e| PeerlinkError::Database(format!("Find failed: {}", e)))
    }

    /// Find many documents, optionally sorted
    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
    ) -> Result<Vec<T>, PeerlinkError> {
        // Build the query
        let mut find = self.inner.find(filter);
        if let Some(sort) = sort {
            find = find.sort(sort);
        }

        let cursor = find
            .await
            .map_err(|e| PeerlinkError::Database(format!("Find failed: {}", e)))?;

        // Drain the cursor
        cursor
            .try_collect()
            .await
            .map_err(|e| PeerlinkError::Database(format!("Error reading documents: {}", e)))
    }

    /// Replace the document with `_id`, stamping `updated_at`
    pub async fn replace_by_id(&self, id: ObjectId, mut item: T) -> Result<T, PeerlinkError> {
        item.mut_metadata().updated_at = Some(DateTime::now());

        let result = self
            .inner
            .replace_one(doc! { "_id": id }, &item)
            .await
            .map_err(|e| PeerlinkError::Database(format!("Replace failed: {}", e)))?;

        // Nothing replaced means the document is gone
        if result.matched_count == 0 {
            return Err(PeerlinkError::NotFound(format!("Document {} not found", id)));
        }

        Ok(item)
    }

    pub async fn delete_one(&self, filter: Document) -> Result<bool, PeerlinkError> {
        self.inner
            .delete_one(filter)
            .await
            .map(|r| r.deleted_count > 0)
            .map_err(|e| PeerlinkError::Database(format!("Delete failed: {}", e)))
    }

    pub async fn delete_many(&self, filter: Document) -> Result<u64, PeerlinkError> {
        self.inner
            .delete_many(filter)
            .await
            .map(|r| r.deleted_count)
            .map_err(|e| PeerlinkError::Database(format!("Delete failed: {}", e)))
    }
}

/// Hide credentials embedded in a connection string before logging it
pub fn redact_uri(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &uri[..scheme_end], &uri[at + 1..])
        }
        _ => uri.to_string(),
    }
}
