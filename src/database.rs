//! Document store built on the embedded redb database
//!
//! Each collection (authors, books, genres, book instances) lives in its own
//! table. Keys are document ids and values are JSON-serialized documents, so
//! the store behaves like a small document database: find by id, scan with a
//! filter, insert, update by id and delete by id.
//!
//! redb transactions are blocking, so every operation runs on tokio's
//! blocking pool. Handlers can therefore await several reads at once with
//! `tokio::try_join!`.

use rand::{distr::Alphanumeric, Rng};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::model::{Author, Book, BookInstance, Genre};

/// Length of generated document ids
const ID_LEN: usize = 16;

/// A type stored as a JSON document in its own collection
pub trait Document: Serialize + DeserializeOwned + Send + 'static {
    /// Name of the redb table holding this collection
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

/// Table definition for a collection
///
/// Key: document id
/// Value: JSON-serialized document
fn table<T: Document>() -> TableDefinition<'static, &'static str, &'static str> {
    TableDefinition::new(T::COLLECTION)
}

/// Failures raised by the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] redb::Error),

    #[error("malformed document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

macro_rules! impl_from_redb {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for StoreError {
                fn from(err: $err) -> Self {
                    StoreError::Database(err.into())
                }
            }
        )*
    };
}

impl_from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

/// Handle to the catalog's document store
///
/// Cloning is cheap; all clones share the same database.
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

/// Initializes the embedded database and creates every collection table
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "catalog.db")
///
/// # Example
///
/// ```no_run
/// # use catalog::database::init_db;
/// let db = init_db("catalog.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, StoreError> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(table::<Author>())?;
        write_txn.open_table(table::<Book>())?;
        write_txn.open_table(table::<Genre>())?;
        write_txn.open_table(table::<BookInstance>())?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// Generates a fresh random document id
pub fn new_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

impl Store {
    /// Opens (or creates) the database at `db_path`
    pub fn open(db_path: &str) -> Result<Self, StoreError> {
        let db = init_db(db_path)?;
        tracing::info!(path = db_path, "document store opened");
        Ok(Self { db: Arc::new(db) })
    }

    /// Releases this handle
    ///
    /// The file is closed once the last clone (including those held by the
    /// router) has been dropped.
    pub fn close(self) {
        let handles = Arc::strong_count(&self.db);
        drop(self);
        tracing::info!(remaining_handles = handles - 1, "document store closed");
    }

    async fn blocking<R, F>(&self, op: F) -> Result<R, StoreError>
    where
        F: FnOnce(&Database) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db)).await?
    }

    /// Fetches a single document by id
    pub async fn get<T: Document>(&self, id: &str) -> Result<Option<T>, StoreError> {
        let id = id.to_string();
        self.blocking(move |db| {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(table::<T>())?;
            let doc = match table.get(id.as_str())? {
                Some(value) => Some(serde_json::from_str(value.value())?),
                None => None,
            };
            Ok(doc)
        })
        .await
    }

    /// Returns every document of the collection matching `filter`
    ///
    /// Documents come back in key (id) order; callers sort as they need.
    pub async fn find<T, F>(&self, filter: F) -> Result<Vec<T>, StoreError>
    where
        T: Document,
        F: Fn(&T) -> bool + Send + 'static,
    {
        self.blocking(move |db| {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(table::<T>())?;
            let mut docs = Vec::new();
            for entry in table.iter()? {
                let (_, value) = entry?;
                let doc: T = serde_json::from_str(value.value())?;
                if filter(&doc) {
                    docs.push(doc);
                }
            }
            Ok(docs)
        })
        .await
    }

    /// Returns the whole collection
    pub async fn all<T: Document>(&self) -> Result<Vec<T>, StoreError> {
        self.find(|_: &T| true).await
    }

    /// Returns the first document matching `filter`, if any
    pub async fn find_one<T, F>(&self, filter: F) -> Result<Option<T>, StoreError>
    where
        T: Document,
        F: Fn(&T) -> bool + Send + 'static,
    {
        Ok(self.find(filter).await?.into_iter().next())
    }

    /// Counts the documents matching `filter`
    pub async fn count<T, F>(&self, filter: F) -> Result<usize, StoreError>
    where
        T: Document,
        F: Fn(&T) -> bool + Send + 'static,
    {
        Ok(self.find(filter).await?.len())
    }

    /// Stores a new document under its own id
    pub async fn insert<T: Document>(&self, doc: T) -> Result<T, StoreError> {
        self.blocking(move |db| {
            let json = serde_json::to_string(&doc)?;
            let write_txn = db.begin_write()?;
            {
                let mut table = write_txn.open_table(table::<T>())?;
                table.insert(doc.id(), json.as_str())?;
            }
            write_txn.commit()?;
            Ok(doc)
        })
        .await
    }

    /// Replaces the document with the same id
    ///
    /// Returns `None` without writing anything when no such document exists.
    pub async fn update<T: Document>(&self, doc: T) -> Result<Option<T>, StoreError> {
        self.blocking(move |db| {
            let json = serde_json::to_string(&doc)?;
            let write_txn = db.begin_write()?;
            let existed = {
                let mut table = write_txn.open_table(table::<T>())?;
                let existed = table.get(doc.id())?.is_some();
                if existed {
                    table.insert(doc.id(), json.as_str())?;
                }
                existed
            };
            write_txn.commit()?;
            Ok(existed.then_some(doc))
        })
        .await
    }

    /// Removes a document by id, reporting whether it was present
    pub async fn delete<T: Document>(&self, id: &str) -> Result<bool, StoreError> {
        let id = id.to_string();
        self.blocking(move |db| {
            let write_txn = db.begin_write()?;
            let removed = {
                let mut table = write_txn.open_table(table::<T>())?;
                // Bind before the block ends so the guard drops ahead of the table.
                let removed = table.remove(id.as_str())?.is_some();
                removed
            };
            write_txn.commit()?;
            Ok(removed)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Genre;
    use tempfile::NamedTempFile;

    fn genre(id: &str, name: &str) -> Genre {
        Genre {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn open_store() -> (Store, NamedTempFile) {
        let temp_db = NamedTempFile::new().unwrap();
        let store = Store::open(temp_db.path().to_str().unwrap()).unwrap();
        (store, temp_db)
    }

    #[tokio::test]
    async fn test_insert_get_delete() {
        let (store, _temp_db) = open_store();

        store.insert(genre("g1", "Poetry")).await.unwrap();
        let found: Option<Genre> = store.get("g1").await.unwrap();
        assert_eq!(found, Some(genre("g1", "Poetry")));

        assert!(store.delete::<Genre>("g1").await.unwrap());
        assert!(!store.delete::<Genre>("g1").await.unwrap());
        assert_eq!(store.get::<Genre>("g1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_missing_document_is_not_created() {
        let (store, _temp_db) = open_store();

        let updated = store.update(genre("ghost", "Horror")).await.unwrap();
        assert_eq!(updated, None);
        assert_eq!(store.count(|_: &Genre| true).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_with_filter() {
        let (store, _temp_db) = open_store();
        store.insert(genre("g1", "Poetry")).await.unwrap();
        store.insert(genre("g2", "Fantasy")).await.unwrap();

        let fantasy = store
            .find_one(|g: &Genre| g.name == "Fantasy")
            .await
            .unwrap();
        assert_eq!(fantasy.map(|g| g.id), Some("g2".to_string()));
        assert_eq!(store.all::<Genre>().await.unwrap().len(), 2);
    }

    #[test]
    fn test_new_id_shape() {
        let id = new_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
