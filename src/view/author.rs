use super::{date_input, date_value, esc, form, layout, text_input};
use crate::model::{Author, AuthorDraft, Book};
use crate::validation::FieldError;

/// Author list page, one line per author with their lifespan
pub fn list(authors: &[Author]) -> String {
    let content = if authors.is_empty() {
        "<p>There are no authors.</p>".to_string()
    } else {
        let items: String = authors
            .iter()
            .map(|a| {
                format!(
                    "<li><a href=\"{}\">{}</a> ({})</li>\n",
                    esc(&a.url()),
                    esc(&a.name()),
                    esc(&a.lifespan())
                )
            })
            .collect();
        format!("<ul>\n{}</ul>", items)
    };
    layout("Author List", &content)
}

fn books_section(books: &[Book]) -> String {
    if books.is_empty() {
        return "<p>This author has no books.</p>".to_string();
    }
    let items: String = books
        .iter()
        .map(|b| {
            format!(
                "<dt><a href=\"{}\">{}</a></dt><dd>{}</dd>\n",
                esc(&b.url()),
                esc(&b.title),
                esc(&b.summary)
            )
        })
        .collect();
    format!("<dl>\n{}</dl>", items)
}

/// Author detail page with the books they wrote
pub fn detail(author: &Author, books: &[Book]) -> String {
    let content = format!(
        "<h2>Author: {name}</h2>\n<p>{lifespan}</p>\n\
         <h3>Books</h3>\n{books}\n\
         <hr>\n<p><a href=\"{url}/delete\">Delete author</a></p>\n\
         <p><a href=\"{url}/update\">Update author</a></p>",
        name = esc(&author.name()),
        lifespan = esc(&author.lifespan()),
        books = books_section(books),
        url = esc(&author.url()),
    );
    layout("Author Detail", &content)
}

/// Author create/update form, with any validation messages below it
pub fn form_page(title: &str, draft: &AuthorDraft, errors: &[FieldError]) -> String {
    let fields = [
        text_input("first_name", "First Name", &draft.first_name, true),
        text_input("family_name", "Family Name", &draft.family_name, true),
        date_input("date_of_birth", "Date of birth", &date_value(draft.date_of_birth)),
        date_input("date_of_death", "Date of death", &date_value(draft.date_of_death)),
    ]
    .concat();
    layout(title, &form("Submit", &fields, errors))
}

/// Delete confirmation, or the list of books that block the delete
pub fn delete(author: &Author, books: &[Book]) -> String {
    let action = if books.is_empty() {
        "<p>Do you really want to delete this Author?</p>\n\
         <form method=\"POST\"><button type=\"submit\">Delete</button></form>"
            .to_string()
    } else {
        format!(
            "<p><strong>Delete the following books before attempting to delete this author.</strong></p>\n\
             <div class=\"blocking\">{}</div>",
            books_section(books)
        )
    };
    let content = format!(
        "<h2>{}</h2>\n<p>{}</p>\n{}",
        esc(&author.name()),
        esc(&author.lifespan()),
        action
    );
    layout("Delete Author", &content)
}
