//! Book instance (copy) controller
//!
//! Nothing references a copy, so deletes skip the reference guard.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use chrono::Local;

use super::{form_data, redirect, FormPairs};
use crate::database::{new_id, AppState, Store, StoreError};
use crate::error::AppError;
use crate::model::{Book, BookInstance, BookInstanceDraft, BookInstanceRecord, Choice};
use crate::validation::{FieldError, FieldRules, Pipeline, Validated};
use crate::view;

const LIST_URL: &str = "/catalog/bookinstances";

const STATUSES: &[&str] = &["Available", "Maintenance", "Loaned", "Reserved"];

fn rules() -> Pipeline {
    Pipeline::new(vec![
        FieldRules::field("book")
            .trim()
            .min_length(1, "Book must be specified")
            .escape(),
        FieldRules::field("imprint")
            .trim()
            .min_length(1, "Imprint must be specified")
            .escape(),
        FieldRules::field("status")
            .optional()
            .escape()
            .one_of(STATUSES, "Invalid status"),
        FieldRules::field("due_back")
            .optional()
            .iso_date("Invalid date")
            .parse_date(),
    ])
}

/// Builds the draft; an unknown or empty status falls back to the default
fn draft(validated: &Validated) -> BookInstanceDraft {
    BookInstanceDraft {
        book: validated.text("book"),
        imprint: validated.text("imprint"),
        status: validated.text("status").parse().unwrap_or_default(),
        due_back: validated.date("due_back"),
    }
}

/// Stored copy for a valid draft; a missing due date means due today
fn to_instance(draft: BookInstanceDraft, id: String) -> BookInstance {
    let mut instance = draft.into_book_instance(id);
    if instance.due_back.is_none() {
        instance.due_back = Some(Local::now().date_naive());
    }
    instance
}

fn book_choices(mut books: Vec<Book>, selected: &str) -> Vec<Choice> {
    books.sort_by(|a, b| a.title.cmp(&b.title));
    books
        .into_iter()
        .map(|b| Choice {
            selected: b.id == selected,
            id: b.id,
            label: b.title,
        })
        .collect()
}

async fn resolve(store: &Store, instance: BookInstance) -> Result<BookInstanceRecord, StoreError> {
    let book = store.get::<Book>(&instance.book).await?;
    Ok(BookInstanceRecord { instance, book })
}

/// Lists every copy with its book title
pub async fn bookinstance_list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let (instances, books) = tokio::try_join!(
        state.store.all::<BookInstance>(),
        state.store.all::<Book>()
    )?;

    let books: HashMap<String, Book> = books.into_iter().map(|b| (b.id.clone(), b)).collect();
    let records: Vec<BookInstanceRecord> = instances
        .into_iter()
        .map(|instance| BookInstanceRecord {
            book: books.get(&instance.book).cloned(),
            instance,
        })
        .collect();

    tracing::debug!(count = records.len(), "listing book instances");
    Ok(Html(view::book_instance::list(&records)))
}

/// Shows a copy and the book it belongs to
pub async fn bookinstance_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let instance = state
        .store
        .get::<BookInstance>(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Book copy not found"))?;
    let record = resolve(&state.store, instance).await?;

    Ok(Html(view::book_instance::detail(&record)))
}

/// Empty copy form with every book on offer
pub async fn bookinstance_create_get(
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let books = state.store.all::<Book>().await?;
    Ok(Html(view::book_instance::form_page(
        "Create Book Instance",
        &BookInstanceDraft::default(),
        &book_choices(books, ""),
        &[],
    )))
}

/// Creates a copy, due today unless a date was given
pub async fn bookinstance_create_post(
    State(state): State<AppState>,
    form: FormPairs,
) -> Result<Response, AppError> {
    let validated = rules().run(&form_data(form));
    let draft = draft(&validated);

    if !validated.is_valid() {
        tracing::debug!(errors = validated.errors().len(), "book instance form rejected");
        let books = state.store.all::<Book>().await?;
        let page = view::book_instance::form_page(
            "Create Book Instance",
            &draft,
            &book_choices(books, &draft.book),
            validated.errors(),
        );
        return Ok(Html(page).into_response());
    }

    let instance = state.store.insert(to_instance(draft, new_id())).await?;
    tracing::info!(id = %instance.id, book = %instance.book, "book instance created");
    Ok(redirect(&instance.url()))
}

/// Delete confirmation; a missing copy redirects to the list
pub async fn bookinstance_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Some(instance) = state.store.get::<BookInstance>(&id).await? else {
        return Ok(redirect(LIST_URL));
    };
    let record = resolve(&state.store, instance).await?;
    Ok(Html(view::book_instance::delete(&record)).into_response())
}

/// Deletes a copy; deleting one that is already gone is a no-op
pub async fn bookinstance_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    if state.store.delete::<BookInstance>(&id).await? {
        tracing::info!(id = %id, "book instance deleted");
    }
    Ok(redirect(LIST_URL))
}

async fn load_for_update(
    state: &AppState,
    id: &str,
) -> Result<(BookInstance, Vec<Book>), AppError> {
    let (instance, books) = tokio::try_join!(
        state.store.get::<BookInstance>(id),
        state.store.all::<Book>()
    )?;
    let instance = instance.ok_or_else(|| AppError::not_found("Book copy not found"))?;
    Ok((instance, books))
}

fn update_page(instance: &BookInstance, books: Vec<Book>, errors: &[FieldError]) -> Html<String> {
    Html(view::book_instance::form_page(
        "Update Book Instance",
        &BookInstanceDraft::from(instance),
        &book_choices(books, &instance.book),
        errors,
    ))
}

/// Copy form filled with the stored values
pub async fn bookinstance_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let (instance, books) = load_for_update(&state, &id).await?;
    Ok(update_page(&instance, books, &[]))
}

/// Replaces a copy's fields
///
/// A rejected submission shows the stored copy again.
pub async fn bookinstance_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormPairs,
) -> Result<Response, AppError> {
    let validated = rules().run(&form_data(form));

    if !validated.is_valid() {
        let (instance, books) = load_for_update(&state, &id).await?;
        return Ok(update_page(&instance, books, validated.errors()).into_response());
    }

    let updated = state
        .store
        .update(to_instance(draft(&validated), id))
        .await?
        .ok_or_else(|| AppError::not_found("Book copy not found"))?;
    tracing::info!(id = %updated.id, status = %updated.status, "book instance updated");
    Ok(redirect(&updated.url()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookInstanceStatus;
    use crate::validation::FormData;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_status_rules_match_model() {
        let names: Vec<&str> = BookInstanceStatus::ALL.iter().map(|s| s.as_str()).collect();
        for name in STATUSES {
            assert!(names.contains(name));
        }
        assert_eq!(names.len(), STATUSES.len());
    }

    #[test]
    fn test_draft_defaults_status_and_due_date() {
        let validated = rules().run(&form(&[("book", "b1"), ("imprint", "Tor, 1990")]));
        assert!(validated.is_valid());

        let draft = draft(&validated);
        assert_eq!(draft.status, BookInstanceStatus::Maintenance);

        let instance = to_instance(draft, "i1".to_string());
        assert_eq!(instance.due_back, Some(Local::now().date_naive()));
    }

    #[test]
    fn test_rejects_unknown_status() {
        let validated = rules().run(&form(&[
            ("book", "b1"),
            ("imprint", "Tor, 1990"),
            ("status", "Lost"),
        ]));
        let fields: Vec<_> = validated.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["status"]);
    }
}
