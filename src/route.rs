//! Route definitions for the catalog
//!
//! Every page lives under `/catalog`. Forms post back to the same path they
//! were served from.

use axum::response::Redirect;
use axum::routing::get;
use axum::Router;

use crate::database::AppState;
use crate::handler::{self, author, book, book_instance, genre};

/// Creates the application router with all catalog routes
///
/// # Route Definitions
///
/// - `GET /` - Redirects to the catalog home page
/// - `GET /catalog` - Home page with record counts
/// - `GET /catalog/{authors,books,genres,bookinstances}` - Collection lists
/// - `GET|POST /catalog/{entity}/create` - Create form and submit
/// - `GET /catalog/{entity}/{id}` - Detail page
/// - `GET|POST /catalog/{entity}/{id}/delete` - Delete confirmation and submit
/// - `GET|POST /catalog/{entity}/{id}/update` - Update form and submit
///
/// Anything else renders the 404 page.
///
/// ```no_run
/// # use catalog::database::{AppState, Store};
/// # use catalog::route::create_app;
/// let store = Store::open("library.db").unwrap();
/// let app = create_app(AppState { store });
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let catalog = Router::new()
        .route("/", get(handler::index))
        // Authors
        .route("/authors", get(author::author_list))
        .route(
            "/author/create",
            get(author::author_create_get).post(author::author_create_post),
        )
        .route("/author/{id}", get(author::author_detail))
        .route(
            "/author/{id}/delete",
            get(author::author_delete_get).post(author::author_delete_post),
        )
        .route(
            "/author/{id}/update",
            get(author::author_update_get).post(author::author_update_post),
        )
        // Books
        .route("/books", get(book::book_list))
        .route(
            "/book/create",
            get(book::book_create_get).post(book::book_create_post),
        )
        .route("/book/{id}", get(book::book_detail))
        .route(
            "/book/{id}/delete",
            get(book::book_delete_get).post(book::book_delete_post),
        )
        .route(
            "/book/{id}/update",
            get(book::book_update_get).post(book::book_update_post),
        )
        // Genres
        .route("/genres", get(genre::genre_list))
        .route(
            "/genre/create",
            get(genre::genre_create_get).post(genre::genre_create_post),
        )
        .route("/genre/{id}", get(genre::genre_detail))
        .route(
            "/genre/{id}/delete",
            get(genre::genre_delete_get).post(genre::genre_delete_post),
        )
        .route(
            "/genre/{id}/update",
            get(genre::genre_update_get).post(genre::genre_update_post),
        )
        // Book instances
        .route("/bookinstances", get(book_instance::bookinstance_list))
        .route(
            "/bookinstance/create",
            get(book_instance::bookinstance_create_get)
                .post(book_instance::bookinstance_create_post),
        )
        .route("/bookinstance/{id}", get(book_instance::bookinstance_detail))
        .route(
            "/bookinstance/{id}/delete",
            get(book_instance::bookinstance_delete_get)
                .post(book_instance::bookinstance_delete_post),
        )
        .route(
            "/bookinstance/{id}/update",
            get(book_instance::bookinstance_update_get)
                .post(book_instance::bookinstance_update_post),
        );

    Router::new()
        .route("/", get(|| async { Redirect::to("/catalog") }))
        .nest("/catalog", catalog)
        .fallback(handler::not_found)
        .with_state(state)
}
