//! Genre controller

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};

use super::{form_data, redirect, FormPairs};
use crate::database::{new_id, AppState};
use crate::error::AppError;
use crate::guard::{self, DeleteOutcome};
use crate::model::{Book, Genre, GenreDraft};
use crate::validation::{FieldRules, Pipeline, Validated};
use crate::view;

const LIST_URL: &str = "/catalog/genres";

fn rules() -> Pipeline {
    Pipeline::new(vec![FieldRules::field("name")
        .trim()
        .min_length(3, "Genre name required - at least 3 characters")
        .escape()])
}

fn draft(validated: &Validated) -> GenreDraft {
    GenreDraft {
        name: validated.text("name"),
    }
}

/// Lists all genres by name
pub async fn genre_list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let mut genres: Vec<Genre> = state.store.all().await?;
    genres.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!(count = genres.len(), "listing genres");
    Ok(Html(view::genre::list(&genres)))
}

/// Shows a genre with the books filed under it
pub async fn genre_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let (genre, books) = tokio::try_join!(
        state.store.get::<Genre>(&id),
        state.store.find::<Book, _>(Book::in_genre(&id)),
    )?;
    let genre = genre.ok_or_else(|| AppError::not_found("Genre not found"))?;

    Ok(Html(view::genre::detail(&genre, &books)))
}

/// Empty genre form
pub async fn genre_create_get() -> Html<String> {
    Html(view::genre::form_page(
        "Create Genre",
        &GenreDraft::default(),
        None,
        &[],
    ))
}

/// Creates a genre unless the name is already taken, ignoring case
pub async fn genre_create_post(
    State(state): State<AppState>,
    form: FormPairs,
) -> Result<Response, AppError> {
    let validated = rules().run(&form_data(form));
    let draft = draft(&validated);

    if !validated.is_valid() {
        tracing::debug!(errors = validated.errors().len(), "genre form rejected");
        let page = view::genre::form_page("Create Genre", &draft, None, validated.errors());
        return Ok(Html(page).into_response());
    }

    let name = draft.name.to_lowercase();
    let existing = state
        .store
        .find_one(move |g: &Genre| g.name.to_lowercase() == name)
        .await?;
    if let Some(existing) = existing {
        tracing::info!(id = %existing.id, "genre already exists");
        return Ok(redirect(&existing.url()));
    }

    let genre = state.store.insert(draft.into_genre(new_id())).await?;
    tracing::info!(id = %genre.id, name = %genre.name, "genre created");
    Ok(redirect(&genre.url()))
}

/// Delete confirmation; a missing genre redirects to the list
pub async fn genre_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let loaded =
        guard::with_dependents::<Genre, Book, _>(&state.store, &id, Book::in_genre(&id)).await?;
    match loaded {
        Some((genre, books)) => Ok(Html(view::genre::delete(&genre, &books)).into_response()),
        None => Ok(redirect(LIST_URL)),
    }
}

/// Deletes a genre that no book is filed under
pub async fn genre_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let outcome =
        guard::guarded_delete::<Genre, Book, _>(&state.store, &id, Book::in_genre(&id)).await?;
    match outcome {
        DeleteOutcome::Blocked { entity, dependents } => {
            Ok(Html(view::genre::delete(&entity, &dependents)).into_response())
        }
        DeleteOutcome::Missing | DeleteOutcome::Deleted => Ok(redirect(LIST_URL)),
    }
}

/// Loads a genre and its books for the update form
async fn load_for_update(state: &AppState, id: &str) -> Result<(Genre, Vec<Book>), AppError> {
    let (genre, books) = tokio::try_join!(
        state.store.get::<Genre>(id),
        state.store.find::<Book, _>(Book::in_genre(id)),
    )?;
    let genre = genre.ok_or_else(|| AppError::not_found("Genre not found"))?;
    Ok((genre, books))
}

/// Genre form filled with the stored name and its books
pub async fn genre_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let (genre, books) = load_for_update(&state, &id).await?;
    Ok(Html(view::genre::form_page(
        "Update Genre",
        &GenreDraft::from(&genre),
        Some(books.as_slice()),
        &[],
    )))
}

/// Renames a genre
///
/// No duplicate-name check happens here, unlike on create.
pub async fn genre_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormPairs,
) -> Result<Response, AppError> {
    let validated = rules().run(&form_data(form));

    if !validated.is_valid() {
        let (genre, books) = load_for_update(&state, &id).await?;
        let page = view::genre::form_page(
            "Update Genre",
            &GenreDraft::from(&genre),
            Some(books.as_slice()),
            validated.errors(),
        );
        return Ok(Html(page).into_response());
    }

    let updated = state
        .store
        .update(draft(&validated).into_genre(id))
        .await?
        .ok_or_else(|| AppError::not_found("Genre not found"))?;
    tracing::info!(id = %updated.id, "genre updated");
    Ok(redirect(&updated.url()))
}
