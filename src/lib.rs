//! Library catalog web application
//!
//! Server-rendered CRUD pages for authors, books, genres and book copies,
//! backed by an embedded redb store. Exposed as a library so the router can
//! be driven directly from integration tests.

pub mod config;
pub mod database;
pub mod error;
pub mod guard;
pub mod handler;
pub mod model;
pub mod route;
pub mod validation;
pub mod view;
