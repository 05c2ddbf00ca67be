//! Reference integrity checks for delete flows
//!
//! Authors, genres and books are only removed when nothing points at them.
//! The target and its dependents are fetched together, then the delete goes
//! ahead only if the dependent list is empty. The check and the delete are two
//! separate transactions, so a dependent created in between is not caught.

use crate::database::{Document, Store, StoreError};

/// What a guarded delete did
#[derive(Debug)]
pub enum DeleteOutcome<T, D> {
    /// The target did not exist; treated as already deleted
    Missing,
    /// The target still has dependents and was left in place
    Blocked { entity: T, dependents: Vec<D> },
    /// The target was removed
    Deleted,
}

/// Loads a target together with every document referencing it
///
/// Returns `None` when the target does not exist.
pub async fn with_dependents<T, D, F>(
    store: &Store,
    id: &str,
    references: F,
) -> Result<Option<(T, Vec<D>)>, StoreError>
where
    T: Document,
    D: Document,
    F: Fn(&D) -> bool + Send + 'static,
{
    let (entity, dependents) = tokio::try_join!(store.get::<T>(id), store.find::<D, F>(references))?;
    Ok(entity.map(|entity| (entity, dependents)))
}

/// Deletes `id` unless some `D` document still references it
pub async fn guarded_delete<T, D, F>(
    store: &Store,
    id: &str,
    references: F,
) -> Result<DeleteOutcome<T, D>, StoreError>
where
    T: Document,
    D: Document,
    F: Fn(&D) -> bool + Send + 'static,
{
    let Some((entity, dependents)) = with_dependents::<T, D, F>(store, id, references).await? else {
        return Ok(DeleteOutcome::Missing);
    };

    if !dependents.is_empty() {
        tracing::warn!(
            collection = T::COLLECTION,
            id,
            dependents = dependents.len(),
            "delete blocked by references"
        );
        return Ok(DeleteOutcome::Blocked { entity, dependents });
    }

    store.delete::<T>(id).await?;
    tracing::info!(collection = T::COLLECTION, id, "document deleted");
    Ok(DeleteOutcome::Deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Author, Book};
    use tempfile::NamedTempFile;

    fn author(id: &str) -> Author {
        Author {
            id: id.to_string(),
            first_name: "Ursula".to_string(),
            family_name: "LeGuin".to_string(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    fn book(id: &str, author: &str) -> Book {
        Book {
            id: id.to_string(),
            title: "The Dispossessed".to_string(),
            author: author.to_string(),
            summary: "An ambiguous utopia".to_string(),
            isbn: "9780060512750".to_string(),
            genre: vec![],
        }
    }

    fn books_by(id: &str) -> impl Fn(&Book) -> bool + Send + 'static {
        let id = id.to_string();
        move |b: &Book| b.author == id
    }

    #[tokio::test]
    async fn test_guarded_delete_outcomes() {
        let temp_db = NamedTempFile::new().unwrap();
        let store = Store::open(temp_db.path().to_str().unwrap()).unwrap();
        store.insert(author("a1")).await.unwrap();
        store.insert(author("a2")).await.unwrap();
        store.insert(book("b1", "a1")).await.unwrap();

        let blocked = guarded_delete::<Author, Book, _>(&store, "a1", books_by("a1"))
            .await
            .unwrap();
        match blocked {
            DeleteOutcome::Blocked { entity, dependents } => {
                assert_eq!(entity.id, "a1");
                assert_eq!(dependents.len(), 1);
            }
            other => panic!("expected Blocked, got {:?}", other),
        }
        assert!(store.get::<Author>("a1").await.unwrap().is_some());

        let deleted = guarded_delete::<Author, Book, _>(&store, "a2", books_by("a2"))
            .await
            .unwrap();
        assert!(matches!(deleted, DeleteOutcome::Deleted));

        let missing = guarded_delete::<Author, Book, _>(&store, "a2", books_by("a2"))
            .await
            .unwrap();
        assert!(matches!(missing, DeleteOutcome::Missing));
    }
}
