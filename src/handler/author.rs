//! Author controller

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};

use super::{form_data, redirect, FormPairs};
use crate::database::{new_id, AppState};
use crate::error::AppError;
use crate::guard::{self, DeleteOutcome};
use crate::model::{Author, AuthorDraft, Book};
use crate::validation::{FieldRules, Pipeline, Validated};
use crate::view;

const LIST_URL: &str = "/catalog/authors";

fn date_rules() -> [FieldRules; 2] {
    [
        FieldRules::field("date_of_birth")
            .optional()
            .iso_date("Invalid date of birth")
            .parse_date(),
        FieldRules::field("date_of_death")
            .optional()
            .iso_date("Invalid date of death")
            .parse_date(),
    ]
}

/// Names must be present and alphanumeric on create
fn create_rules() -> Pipeline {
    let mut rules = vec![
        FieldRules::field("first_name")
            .trim()
            .min_length(1, "First name must be specified.")
            .escape()
            .alphanumeric("First name has non-alphanumeric characters."),
        FieldRules::field("family_name")
            .trim()
            .min_length(1, "Family name must be specified.")
            .escape()
            .alphanumeric("Family name has non-alphanumeric characters."),
    ];
    rules.extend(date_rules());
    Pipeline::new(rules)
}

/// Update only requires the names to be non-empty
fn update_rules() -> Pipeline {
    let mut rules = vec![
        FieldRules::field("first_name")
            .trim()
            .min_length(1, "First name must not be empty.")
            .escape(),
        FieldRules::field("family_name")
            .trim()
            .min_length(1, "Family name must not be empty.")
            .escape(),
    ];
    rules.extend(date_rules());
    Pipeline::new(rules)
}

fn draft(validated: &Validated) -> AuthorDraft {
    AuthorDraft {
        first_name: validated.text("first_name"),
        family_name: validated.text("family_name"),
        date_of_birth: validated.date("date_of_birth"),
        date_of_death: validated.date("date_of_death"),
    }
}

/// Lists all authors ordered by family name
pub async fn author_list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let mut authors: Vec<Author> = state.store.all().await?;
    authors.sort_by(|a, b| a.family_name.cmp(&b.family_name));

    tracing::debug!(count = authors.len(), "listing authors");
    Ok(Html(view::author::list(&authors)))
}

/// Shows an author together with the books they wrote
pub async fn author_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let (author, books) = tokio::try_join!(
        state.store.get::<Author>(&id),
        state.store.find::<Book, _>(Book::by_author(&id)),
    )?;
    let author = author.ok_or_else(|| AppError::not_found("Author not found"))?;

    Ok(Html(view::author::detail(&author, &books)))
}

/// Empty author form
pub async fn author_create_get() -> Html<String> {
    Html(view::author::form_page(
        "Create Author",
        &AuthorDraft::default(),
        &[],
    ))
}

/// Creates an author unless one with the same name already exists
///
/// Names are compared case-insensitively. A match redirects to the existing
/// author instead of inserting a second document.
pub async fn author_create_post(
    State(state): State<AppState>,
    form: FormPairs,
) -> Result<Response, AppError> {
    let validated = create_rules().run(&form_data(form));
    let draft = draft(&validated);

    if !validated.is_valid() {
        tracing::debug!(errors = validated.errors().len(), "author form rejected");
        let page = view::author::form_page("Create Author", &draft, validated.errors());
        return Ok(Html(page).into_response());
    }

    let first_name = draft.first_name.to_lowercase();
    let family_name = draft.family_name.to_lowercase();
    let existing = state
        .store
        .find_one(move |a: &Author| {
            a.first_name.to_lowercase() == first_name && a.family_name.to_lowercase() == family_name
        })
        .await?;
    if let Some(existing) = existing {
        tracing::info!(id = %existing.id, "author already exists");
        return Ok(redirect(&existing.url()));
    }

    let author = state.store.insert(draft.into_author(new_id())).await?;
    tracing::info!(id = %author.id, "author created");
    Ok(redirect(&author.url()))
}

/// Delete confirmation; a missing author redirects to the list
pub async fn author_delete_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let loaded = guard::with_dependents::<Author, Book, _>(&state.store, &id, Book::by_author(&id))
        .await?;
    match loaded {
        Some((author, books)) => Ok(Html(view::author::delete(&author, &books)).into_response()),
        None => Ok(redirect(LIST_URL)),
    }
}

/// Deletes an author that no book references
pub async fn author_delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let outcome =
        guard::guarded_delete::<Author, Book, _>(&state.store, &id, Book::by_author(&id)).await?;
    match outcome {
        DeleteOutcome::Blocked { entity, dependents } => {
            Ok(Html(view::author::delete(&entity, &dependents)).into_response())
        }
        DeleteOutcome::Missing | DeleteOutcome::Deleted => Ok(redirect(LIST_URL)),
    }
}

/// Author form filled with the stored values
pub async fn author_update_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let author = state
        .store
        .get::<Author>(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Author not found"))?;

    Ok(Html(view::author::form_page(
        "Update Author",
        &AuthorDraft::from(&author),
        &[],
    )))
}

/// Replaces an author's fields
///
/// No duplicate-name check happens here, unlike on create.
pub async fn author_update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: FormPairs,
) -> Result<Response, AppError> {
    let validated = update_rules().run(&form_data(form));

    if !validated.is_valid() {
        let author = state
            .store
            .get::<Author>(&id)
            .await?
            .ok_or_else(|| AppError::not_found("Author not found"))?;
        let page = view::author::form_page(
            "Update Author",
            &AuthorDraft::from(&author),
            validated.errors(),
        );
        return Ok(Html(page).into_response());
    }

    let updated = state
        .store
        .update(draft(&validated).into_author(id))
        .await?
        .ok_or_else(|| AppError::not_found("Author not found"))?;
    tracing::info!(id = %updated.id, "author updated");
    Ok(redirect(&updated.url()))
}
