//! Data models for the library catalog
//!
//! This module defines the persisted documents (authors, books, genres and
//! book copies), the drafts produced by form validation, and the composite
//! records handlers assemble when resolving references.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::database::Document;

/// A person who wrote one or more books
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Author {
    /// Unique identifier assigned on insert
    pub id: String,

    pub first_name: String,

    pub family_name: String,

    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,

    #[serde(default)]
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Display name in "family, first" order
    ///
    /// Returns an empty string when either part is missing, so a half-filled
    /// record never renders as a dangling comma.
    pub fn name(&self) -> String {
        if self.first_name.is_empty() || self.family_name.is_empty() {
            return String::new();
        }
        format!("{}, {}", self.family_name, self.first_name)
    }

    /// Lifespan such as "1920-01-02 - 1992-04-06"
    ///
    /// Unknown dates are left blank on their side of the separator.
    pub fn lifespan(&self) -> String {
        format!(
            "{} - {}",
            format_date(self.date_of_birth),
            format_date(self.date_of_death)
        )
    }

    pub fn url(&self) -> String {
        format!("/catalog/author/{}", self.id)
    }
}

impl Document for Author {
    const COLLECTION: &'static str = "authors_v1";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A title held by the library
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Book {
    pub id: String,

    pub title: String,

    /// Id of the [`Author`] who wrote the book
    pub author: String,

    pub summary: String,

    pub isbn: String,

    /// Ids of the [`Genre`]s the book belongs to (may be empty)
    #[serde(default)]
    pub genre: Vec<String>,
}

impl Book {
    pub fn url(&self) -> String {
        format!("/catalog/book/{}", self.id)
    }

    /// Filter matching the books written by `author_id`
    pub fn by_author(author_id: &str) -> impl Fn(&Book) -> bool + Send + 'static {
        let author_id = author_id.to_string();
        move |book: &Book| book.author == author_id
    }

    /// Filter matching the books filed under `genre_id`
    pub fn in_genre(genre_id: &str) -> impl Fn(&Book) -> bool + Send + 'static {
        let genre_id = genre_id.to_string();
        move |book: &Book| book.genre.contains(&genre_id)
    }
}

impl Document for Book {
    const COLLECTION: &'static str = "books_v1";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A category books can be filed under
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Genre {
    pub id: String,

    pub name: String,
}

impl Genre {
    pub fn url(&self) -> String {
        format!("/catalog/genre/{}", self.id)
    }
}

impl Document for Genre {
    const COLLECTION: &'static str = "genres_v1";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Circulation state of a physical copy
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookInstanceStatus {
    Available,
    #[default]
    Maintenance,
    Loaned,
    Reserved,
}

impl BookInstanceStatus {
    /// Every status, in the order the form offers them
    pub const ALL: [BookInstanceStatus; 4] = [
        BookInstanceStatus::Maintenance,
        BookInstanceStatus::Available,
        BookInstanceStatus::Loaned,
        BookInstanceStatus::Reserved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookInstanceStatus::Available => "Available",
            BookInstanceStatus::Maintenance => "Maintenance",
            BookInstanceStatus::Loaned => "Loaned",
            BookInstanceStatus::Reserved => "Reserved",
        }
    }
}

impl fmt::Display for BookInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookInstanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookInstanceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown book instance status '{}'", s))
    }
}

/// A physical copy of a [`Book`] that can be borrowed
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BookInstance {
    pub id: String,

    /// Id of the [`Book`] this is a copy of
    pub book: String,

    /// Publisher and edition details
    pub imprint: String,

    #[serde(default)]
    pub status: BookInstanceStatus,

    #[serde(default)]
    pub due_back: Option<NaiveDate>,
}

impl BookInstance {
    pub fn url(&self) -> String {
        format!("/catalog/bookinstance/{}", self.id)
    }

    /// Filter matching the copies of `book_id`
    pub fn copy_of(book_id: &str) -> impl Fn(&BookInstance) -> bool + Send + 'static {
        let book_id = book_id.to_string();
        move |instance: &BookInstance| instance.book == book_id
    }

    /// Due date in "Oct 18, 2026" form, empty when unset
    pub fn due_back_formatted(&self) -> String {
        self.due_back
            .map(|date| date.format("%b %-d, %Y").to_string())
            .unwrap_or_default()
    }
}

impl Document for BookInstance {
    const COLLECTION: &'static str = "book_instances_v1";

    fn id(&self) -> &str {
        &self.id
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// Drafts are what the validation pipeline produces. They carry no id and may
// hold invalid values, so they are kept apart from the persisted types above.

/// Author fields submitted through the author form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorDraft {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorDraft {
    pub fn into_author(self, id: String) -> Author {
        Author {
            id,
            first_name: self.first_name,
            family_name: self.family_name,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
        }
    }
}

impl From<&Author> for AuthorDraft {
    fn from(author: &Author) -> Self {
        Self {
            first_name: author.first_name.clone(),
            family_name: author.family_name.clone(),
            date_of_birth: author.date_of_birth,
            date_of_death: author.date_of_death,
        }
    }
}

/// Book fields submitted through the book form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<String>,
}

impl BookDraft {
    pub fn into_book(self, id: String) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            summary: self.summary,
            isbn: self.isbn,
            genre: self.genre,
        }
    }
}

impl From<&Book> for BookDraft {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: book.genre.clone(),
        }
    }
}

/// Genre fields submitted through the genre form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenreDraft {
    pub name: String,
}

impl GenreDraft {
    pub fn into_genre(self, id: String) -> Genre {
        Genre { id, name: self.name }
    }
}

impl From<&Genre> for GenreDraft {
    fn from(genre: &Genre) -> Self {
        Self {
            name: genre.name.clone(),
        }
    }
}

/// Book copy fields submitted through the book instance form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookInstanceDraft {
    pub book: String,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: Option<NaiveDate>,
}

impl BookInstanceDraft {
    pub fn into_book_instance(self, id: String) -> BookInstance {
        BookInstance {
            id,
            book: self.book,
            imprint: self.imprint,
            status: self.status,
            due_back: self.due_back,
        }
    }
}

impl From<&BookInstance> for BookInstanceDraft {
    fn from(instance: &BookInstance) -> Self {
        Self {
            book: instance.book.clone(),
            imprint: instance.imprint.clone(),
            status: instance.status,
            due_back: instance.due_back,
        }
    }
}

/// A book with its author and genres resolved
///
/// References that point at deleted documents resolve to `None` or are
/// dropped from `genres`, the same way an unmatched populate comes back empty.
#[derive(Debug, Clone)]
pub struct BookRecord {
    pub book: Book,
    pub author: Option<Author>,
    pub genres: Vec<Genre>,
}

/// A book copy with its book resolved
#[derive(Debug, Clone)]
pub struct BookInstanceRecord {
    pub instance: BookInstance,
    pub book: Option<Book>,
}

/// A selectable option for a reference field on a form
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub id: String,
    pub label: String,
    pub selected: bool,
}

/// Document counts shown on the catalog home page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogCounts {
    pub books: usize,
    pub book_instances: usize,
    pub book_instances_available: usize,
    pub authors: usize,
    pub genres: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(first: &str, family: &str) -> Author {
        Author {
            id: "a1".to_string(),
            first_name: first.to_string(),
            family_name: family.to_string(),
            date_of_birth: None,
            date_of_death: None,
        }
    }

    #[test]
    fn test_author_name_family_first() {
        assert_eq!(author("Isaac", "Asimov").name(), "Asimov, Isaac");
        assert_eq!(author("", "Asimov").name(), "");
    }

    #[test]
    fn test_author_lifespan_with_missing_dates() {
        let mut a = author("Isaac", "Asimov");
        a.date_of_birth = NaiveDate::from_ymd_opt(1920, 1, 2);
        assert_eq!(a.lifespan(), "1920-01-02 - ");

        a.date_of_death = NaiveDate::from_ymd_opt(1992, 4, 6);
        assert_eq!(a.lifespan(), "1920-01-02 - 1992-04-06");
    }

    #[test]
    fn test_canonical_urls() {
        assert_eq!(author("a", "b").url(), "/catalog/author/a1");
        let genre = Genre {
            id: "g7".to_string(),
            name: "Poetry".to_string(),
        };
        assert_eq!(genre.url(), "/catalog/genre/g7");
    }

    #[test]
    fn test_status_parse_and_default() {
        assert_eq!(
            "Loaned".parse::<BookInstanceStatus>(),
            Ok(BookInstanceStatus::Loaned)
        );
        assert!("loaned".parse::<BookInstanceStatus>().is_err());
        assert_eq!(BookInstanceStatus::default(), BookInstanceStatus::Maintenance);
    }

    #[test]
    fn test_reverse_reference_filters() {
        let book = Book {
            id: "b1".to_string(),
            title: "Dune".to_string(),
            author: "a1".to_string(),
            summary: String::new(),
            isbn: String::new(),
            genre: vec!["g1".to_string(), "g2".to_string()],
        };
        assert!(Book::by_author("a1")(&book));
        assert!(!Book::by_author("a2")(&book));
        assert!(Book::in_genre("g2")(&book));
        assert!(!Book::in_genre("g3")(&book));
    }

    #[test]
    fn test_due_back_formatted() {
        let instance = BookInstance {
            id: "i1".to_string(),
            book: "b1".to_string(),
            imprint: "Gollancz, 2011".to_string(),
            status: BookInstanceStatus::Loaned,
            due_back: NaiveDate::from_ymd_opt(2026, 10, 8),
        };
        assert_eq!(instance.due_back_formatted(), "Oct 8, 2026");
    }

    #[test]
    fn test_book_instance_missing_fields_deserialize_to_defaults() {
        let instance: BookInstance =
            serde_json::from_str(r#"{"id":"i1","book":"b1","imprint":"x"}"#).unwrap();
        assert_eq!(instance.status, BookInstanceStatus::Maintenance);
        assert_eq!(instance.due_back, None);
    }
}
