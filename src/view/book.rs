use super::{esc, form, layout, select, text_input};
use crate::model::{BookDraft, BookInstance, BookInstanceStatus, BookRecord, Choice};
use crate::validation::FieldError;

fn author_link(record: &BookRecord) -> String {
    match &record.author {
        Some(author) => format!(
            "<a href=\"{}\">{}</a>",
            esc(&author.url()),
            esc(&author.name())
        ),
        None => String::new(),
    }
}

/// Book list page with each title's author
pub fn list(records: &[BookRecord]) -> String {
    let content = if records.is_empty() {
        "<p>There are no books.</p>".to_string()
    } else {
        let items: String = records
            .iter()
            .map(|r| {
                format!(
                    "<li><a href=\"{}\">{}</a> ({})</li>\n",
                    esc(&r.book.url()),
                    esc(&r.book.title),
                    author_link(r)
                )
            })
            .collect();
        format!("<ul>\n{}</ul>", items)
    };
    layout("Book List", &content)
}

fn instances_section(instances: &[BookInstance]) -> String {
    if instances.is_empty() {
        return "<p>There are no copies of this book in the library.</p>".to_string();
    }
    instances
        .iter()
        .map(|i| {
            let due = if i.status == BookInstanceStatus::Available {
                String::new()
            } else {
                format!("<p><strong>Due back:</strong> {}</p>", esc(&i.due_back_formatted()))
            };
            format!(
                "<div class=\"copy\"><p class=\"status-{status_class}\">{status}</p>\
                 <p><strong>Imprint:</strong> {imprint}</p>{due}\
                 <p><strong>Id:</strong> <a href=\"{url}\">{id}</a></p></div>\n",
                status_class = i.status.as_str().to_lowercase(),
                status = i.status,
                imprint = esc(&i.imprint),
                due = due,
                url = esc(&i.url()),
                id = esc(&i.id),
            )
        })
        .collect()
}

/// Book detail page with author, genres and every copy
pub fn detail(record: &BookRecord, instances: &[BookInstance]) -> String {
    let genres = record
        .genres
        .iter()
        .map(|g| format!("<a href=\"{}\">{}</a>", esc(&g.url()), esc(&g.name)))
        .collect::<Vec<_>>()
        .join(", ");
    let content = format!(
        "<h2>Title: {title}</h2>\n\
         <p><strong>Author:</strong> {author}</p>\n\
         <p><strong>Summary:</strong> {summary}</p>\n\
         <p><strong>ISBN:</strong> {isbn}</p>\n\
         <p><strong>Genre:</strong> {genres}</p>\n\
         <h3>Copies</h3>\n{copies}\n\
         <hr>\n<p><a href=\"{url}/delete\">Delete book</a></p>\n\
         <p><a href=\"{url}/update\">Update book</a></p>",
        title = esc(&record.book.title),
        author = author_link(record),
        summary = esc(&record.book.summary),
        isbn = esc(&record.book.isbn),
        genres = genres,
        copies = instances_section(instances),
        url = esc(&record.book.url()),
    );
    layout("Book Detail", &content)
}

fn genre_checkboxes(genres: &[Choice]) -> String {
    let boxes: String = genres
        .iter()
        .map(|g| {
            format!(
                "<span class=\"genre-option\"><input type=\"checkbox\" name=\"genre\" id=\"genre-{id}\" value=\"{id}\"{checked}>\
                 <label for=\"genre-{id}\">{label}</label></span>",
                id = esc(&g.id),
                checked = if g.selected { " checked" } else { "" },
                label = esc(&g.label),
            )
        })
        .collect();
    format!("<div class=\"form-group\"><label>Genre:</label><div>{}</div></div>\n", boxes)
}

/// Book form with an author select box and genre checkboxes
pub fn form_page(
    title: &str,
    draft: &BookDraft,
    authors: &[Choice],
    genres: &[Choice],
    errors: &[FieldError],
) -> String {
    let fields = [
        text_input("title", "Title", &draft.title, true),
        select("author", "Author", "Please select an author", authors),
        text_input("summary", "Summary", &draft.summary, true),
        text_input("isbn", "ISBN", &draft.isbn, true),
        genre_checkboxes(genres),
    ]
    .concat();
    layout(title, &form("Submit", &fields, errors))
}

/// Delete confirmation, or the copies that block the delete
pub fn delete(record: &BookRecord, instances: &[BookInstance]) -> String {
    let action = if instances.is_empty() {
        "<p>Do you really want to delete this Book?</p>\n\
         <form method=\"POST\"><button type=\"submit\">Delete</button></form>"
            .to_string()
    } else {
        format!(
            "<p><strong>Delete the following copies before attempting to delete this Book.</strong></p>\n\
             <div class=\"blocking\">{}</div>",
            instances_section(instances)
        )
    };
    let content = format!(
        "<h2>{}</h2>\n<p><strong>Author:</strong> {}</p>\n{}",
        esc(&record.book.title),
        author_link(record),
        action
    );
    layout("Delete Book", &content)
}
