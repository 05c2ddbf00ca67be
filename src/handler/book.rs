//! Book controller
//!
//! Books reference one author and any number of genres. List and detail pages
//! resolve those references; the forms offer them as a select box and a
//! checkbox group.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};

use super::{form_data, redirect, FormPairs};
use crate::database::{new_id, AppState, Store, StoreError};
use crate::error::AppError;
use crate::guard::{self, DeleteOutcome};
use crate::model::{Author, Book, BookDraft, BookInstance, BookRecord, Choice, Genre};
use crate::validation::{FieldError, FieldRules, Pipeline, Validated};
use crate::view;

const LIST_URL: &str = "/catalog/books";

fn rules() -> Pipeline {
    Pipeline::new(vec![
        FieldRules::field("title")
            .trim()
            .min_length(1, "Title must not be empty.")
            .escape(),
        FieldRules::field("author")
            .trim()
            .min_length(1, "Author must not be empty.")
            .escape(),
        FieldRules::field("summary")
            .trim()
            .min_length(1, "Summary must not be empty.")
            .escape(),
        FieldRules::field("isbn")
            .trim()
            .min_length(1, "ISBN must not be empty")
            .escape(),
        FieldRules::each("genre").escape(),
    ])
}

fn draft(validated: &Validated) -> BookDraft {
    BookDraft {
        title: validated.text("title"),
        author: validated.text("author"),
        summary: validated.text("summary"),
        isbn: validated.text("isbn"),
        genre: validated.list("genre"),
    }
}

fn author_choices(mut authors: Vec<Author>, selected: &str) -> Vec<Choice> {
    authors.sort_by(|a, b| a.family_name.cmp(&b.family_name));
    authors
        .into_iter()
        .map(|a| Choice {
            label: a.name(),
            selected: a.id == selected,
            id: a.id,
        })
        .collect()
}

/// Genre checkboxes, ticked for every id in `checked`
fn genre_choices(mut genres: Vec<Genre>, checked: &[String]) -> Vec<Choice> {
    genres.sort_by(|a, b| a.name.cmp(&b.name));
    genres
        .into_iter()
        .map(|g| Choice {
            selected: checked.contains(&g.id),
            id: g.id,
            label: g.name,
        })
        .collect()
}

/// Fetches everything the book form offers as options
async fn form_options(store: &Store) -> Result<(Vec<Author>, Vec<Genre>), StoreError> {
    tokio::try_join!(store.all::<Author>(), store.all::<Genre>())
}

/// Resolves the author and genres of a single book
async fn resolve(store: &Store, book: Book) -> Result<BookRecord, StoreError> {
    let genre_ids = book.genre.clone();
    let (author, genres) = tokio::try_join!(
        store.get::<Author>(&book.author),
        store.find(move |g: &Genre| genre_ids.contains(&g.id)),
    )?;
    Ok(BookRecord {
        book,
        author,
        genres,
    })
}

/// Lists all books by title with their authors resolved
pub async fn book_list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let (mut books, authors) =
        tokio::try_join!(state.store.all::<Book>(), state.store.all::<Author>())?;
    books.sort_by(|a, b| a.title.cmp(&b.title));

    let authors: HashMap<String, Author> =
        authors.into_iter().map(|a| (a.id.clone(), a)).collect();
    let records: Vec<BookRecord> = books
        .into_iter()
        .map(|book| BookRecord {
            author: authors.get(&book.author).cloned(),
            genres: Vec::new(),
            book,
        })
        .collect();

    tracing::debug!(count = records.len(), "listing books");
    Ok(Html(view::book::list(&records)))
}

/// Shows a book with its author, genres and copies
pub async fn book_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let (book, instances) = tokio::try_join!(
        state.store.get::<Book>(&id),
        state.store.find::<BookInstance, _>(BookInstance::copy_of(&id)),
    )?;
    let book = book.ok_or_else(|| AppError::not_found("Book not found"))?;
    let record = resolve(&state.store, book).await?;

    Ok(Html(view::book::detail(&record, &instances)))
}

/// Empty book form with every author and genre on offer
pub async fn book_create_get(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let (authors, genres) = form_options(&state.store).await?;
    Ok(Html(view::book::form_page(
        "Create Book",
        &BookDraft::default(),
        &author_choices(authors, ""),
        &genre_choices(genres, &[]),
        &[],
    )))
}

/// Creates a book
///
/// On rejection the form is re-rendered with the submitted values, the chosen
/// author selected and the chosen genres ticked.
pub async fn book_create_post(
    State(state): State<AppState>,
    form: FormPairs,
) -> Result<Response, AppError> {
    let validated = rules().run(&form_data(form));
    let draft = draft(&validated);

    if !validated.is_valid() {
        tracing::debug!(errors = validated.errors().len(), "book form rejected");
        let (authors, genres) = form_options(&state.store).await?;
        let page = view::book::form_page(
            "Create Book",
            &draft,
            &author_choices(authors, &draft.author),
            &genre_choices(genres, &draft.genre),
            validated.errors(),
        );
        return Ok(Html(page).into_response());
    }

    let book = state.store.insert(draft.into_book(new_id())).await?;
    tracing::info!(id = %book.id, title = %book.title, "book created");
    Ok(redirect(&book.url()))
}

async fn delete_page(
    store: &Store,
    book: Book,
    instances: &[BookInstance],
) -> Result<Response, AppError> {
    let record = resolve(store, book).await?;
    Ok(Html(view::book::delete(&record, instances)).into_response())
}

/// Delete confirmation; a missing book redirects to the list
pub async fn book_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let loaded = guard::with_dependents::<Book, BookInstance, _>(
        &state.store,
        &id,
        BookInstance::copy_of(&id),
    )
    .await?;
    match loaded {
        Some((book, instances)) => delete_page(&state.store, book, &instances).await,
        None => Ok(redirect(LIST_URL)),
    }
}

/// Deletes a book that has no copies
pub async fn book_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let outcome = guard::guarded_delete::<Book, BookInstance, _>(
        &state.store,
        &id,
        BookInstance::copy_of(&id),
    )
    .await?;
    match outcome {
        DeleteOutcome::Blocked { entity, dependents } => {
            delete_page(&state.store, entity, &dependents).await
        }
        DeleteOutcome::Missing | DeleteOutcome::Deleted => Ok(redirect(LIST_URL)),
    }
}

/// Loads a book plus the form options, failing when the book is gone
async fn load_for_update(
    state: &AppState,
    id: &str,
) -> Result<(Book, Vec<Author>, Vec<Genre>), AppError> {
    let (book, (authors, genres)) = tokio::try_join!(
        state.store.get::<Book>(id),
        form_options(&state.store),
    )?;
    let book = book.ok_or_else(|| AppError::not_found("Book not found"))?;
    Ok((book, authors, genres))
}

fn update_page(
    book: &Book,
    authors: Vec<Author>,
    genres: Vec<Genre>,
    errors: &[FieldError],
) -> Html<String> {
    Html(view::book::form_page(
        "Update Book",
        &BookDraft::from(book),
        &author_choices(authors, &book.author),
        &genre_choices(genres, &book.genre),
        errors,
    ))
}

/// Book form with the current author selected and genres ticked
pub async fn book_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let (book, authors, genres) = load_for_update(&state, &id).await?;
    Ok(update_page(&book, authors, genres, &[]))
}

/// Replaces a book's fields
///
/// A rejected submission shows the stored book again, not the submitted one.
pub async fn book_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormPairs,
) -> Result<Response, AppError> {
    let validated = rules().run(&form_data(form));

    if !validated.is_valid() {
        let (book, authors, genres) = load_for_update(&state, &id).await?;
        return Ok(update_page(&book, authors, genres, validated.errors()).into_response());
    }

    let updated = state
        .store
        .update(draft(&validated).into_book(id))
        .await?
        .ok_or_else(|| AppError::not_found("Book not found"))?;
    tracing::info!(id = %updated.id, "book updated");
    Ok(redirect(&updated.url()))
}
