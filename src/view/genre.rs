use super::{esc, form, layout, text_input};
use crate::model::{Book, Genre, GenreDraft};
use crate::validation::FieldError;

/// Genre list page
pub fn list(genres: &[Genre]) -> String {
    let content = if genres.is_empty() {
        "<p>There are no genres.</p>".to_string()
    } else {
        let items: String = genres
            .iter()
            .map(|g| format!("<li><a href=\"{}\">{}</a></li>\n", esc(&g.url()), esc(&g.name)))
            .collect();
        format!("<ul>\n{}</ul>", items)
    };
    layout("Genre List", &content)
}

fn books_section(books: &[Book]) -> String {
    if books.is_empty() {
        return "<p>This genre has no books.</p>".to_string();
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

/// Genre detail page with the books filed under it
pub fn detail(genre: &Genre, books: &[Book]) -> String {
    let content = format!(
        "<h2>Genre: {name}</h2>\n<h3>Books</h3>\n{books}\n\
         <hr>\n<p><a href=\"{url}/delete\">Delete genre</a></p>\n\
         <p><a href=\"{url}/update\">Update genre</a></p>",
        name = esc(&genre.name),
        books = books_section(books),
        url = esc(&genre.url()),
    );
    layout("Genre Detail", &content)
}

/// Genre form; the update variant also lists the books filed under it
pub fn form_page(
    title: &str,
    draft: &GenreDraft,
    books: Option<&[Book]>,
    errors: &[FieldError],
) -> String {
    let fields = text_input("name", "Genre", &draft.name, true);
    let mut content = form("Submit", &fields, errors);
    if let Some(books) = books {
        content.push_str("<h3>Books</h3>\n");
        content.push_str(&books_section(books));
    }
    layout(title, &content)
}

/// Delete confirmation, or the books that block the delete
pub fn delete(genre: &Genre, books: &[Book]) -> String {
    let action = if books.is_empty() {
        "<p>Do you really want to delete this Genre?</p>\n\
         <form method=\"POST\"><button type=\"submit\">Delete</button></form>"
            .to_string()
    } else {
        format!(
            "<p><strong>Delete the following books before attempting to delete this genre.</strong></p>\n\
             <div class=\"blocking\">{}</div>",
            books_section(books)
        )
    };
    let content = format!("<h2>{}</h2>\n{}", esc(&genre.name), action);
    layout("Delete Genre", &content)
}
