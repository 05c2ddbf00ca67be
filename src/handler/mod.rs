//! HTTP request handlers for the catalog
//!
//! One submodule per entity, each implementing the same set of operations:
//! list, detail, create (form + submit), update (form + submit) and delete
//! (confirmation + submit). The shared shape of every controller is:
//!
//! - read paths turn a missing document into a 404 page;
//! - submits run the entity's validation pipeline and re-render the form with
//!   the messages (status 200) when anything was rejected;
//! - successful writes redirect to the document's canonical URL;
//! - delete paths treat a missing document as already deleted.

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};

use crate::database::AppState;
use crate::error::AppError;
use crate::model::{Author, Book, BookInstance, BookInstanceStatus, CatalogCounts, Genre};
use crate::validation::FormData;
use crate::view;

/// Raw form body with repeated keys preserved
pub type FormPairs = Form<Vec<(String, String)>>;

fn form_data(Form(pairs): FormPairs) -> FormData {
    FormData::from_pairs(pairs)
}

fn redirect(url: &str) -> Response {
    Redirect::to(url).into_response()
}

/// Catalog home page with record counts
///
/// All five counts are read concurrently.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let store = &state.store;
    let (books, book_instances, book_instances_available, authors, genres) = tokio::try_join!(
        store.count(|_: &Book| true),
        store.count(|_: &BookInstance| true),
        store.count(|i: &BookInstance| i.status == BookInstanceStatus::Available),
        store.count(|_: &Author| true),
        store.count(|_: &Genre| true),
    )?;

    let counts = CatalogCounts {
        books,
        book_instances,
        book_instances_available,
        authors,
        genres,
    };
    Ok(Html(view::index(&counts)))
}

/// Fallback for unknown paths
pub async fn not_found() -> AppError {
    AppError::not_found("Page not found")
}
