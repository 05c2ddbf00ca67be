use super::{date_input, date_value, esc, form, layout, select, text_input};
use crate::model::{BookInstanceDraft, BookInstanceRecord, BookInstanceStatus, Choice};
use crate::validation::FieldError;

fn book_link(record: &BookInstanceRecord) -> String {
    match &record.book {
        Some(book) => format!("<a href=\"{}\">{}</a>", esc(&book.url()), esc(&book.title)),
        None => String::new(),
    }
}

/// Copy list page; due dates are shown for copies that are out
pub fn list(records: &[BookInstanceRecord]) -> String {
    let content = if records.is_empty() {
        "<p>There are no book copies in this library.</p>".to_string()
    } else {
        let items: String = records
            .iter()
            .map(|r| {
                let due = if r.instance.status == BookInstanceStatus::Available {
                    String::new()
                } else {
                    format!(" (Due: {})", esc(&r.instance.due_back_formatted()))
                };
                format!(
                    "<li><a href=\"{}\">{} : {}</a> - <span class=\"status\">{}</span>{}</li>\n",
                    esc(&r.instance.url()),
                    r.book.as_ref().map(|b| esc(&b.title)).unwrap_or_default(),
                    esc(&r.instance.imprint),
                    r.instance.status,
                    due
                )
            })
            .collect();
        format!("<ul>\n{}</ul>", items)
    };
    layout("Book Instance List", &content)
}

fn summary(record: &BookInstanceRecord) -> String {
    let due = if record.instance.status == BookInstanceStatus::Available {
        String::new()
    } else {
        format!(
            "<p><strong>Due back:</strong> {}</p>\n",
            esc(&record.instance.due_back_formatted())
        )
    };
    format!(
        "<h2>ID: {id}</h2>\n\
         <p><strong>Title:</strong> {book}</p>\n\
         <p><strong>Imprint:</strong> {imprint}</p>\n\
         <p><strong>Status:</strong> {status}</p>\n{due}",
        id = esc(&record.instance.id),
        book = book_link(record),
        imprint = esc(&record.instance.imprint),
        status = record.instance.status,
        due = due,
    )
}

/// Copy detail page
pub fn detail(record: &BookInstanceRecord) -> String {
    let content = format!(
        "{summary}<hr>\n<p><a href=\"{url}/delete\">Delete BookInstance</a></p>\n\
         <p><a href=\"{url}/update\">Update BookInstance</a></p>",
        summary = summary(record),
        url = esc(&record.instance.url()),
    );
    layout("Book Instance Detail", &content)
}

fn status_select(current: BookInstanceStatus) -> String {
    let options: String = BookInstanceStatus::ALL
        .iter()
        .map(|s| {
            format!(
                "<option value=\"{s}\"{selected}>{s}</option>",
                s = s,
                selected = if *s == current { " selected" } else { "" },
            )
        })
        .collect();
    format!(
        "<div class=\"form-group\"><label for=\"status\">Status:</label>\
         <select id=\"status\" name=\"status\" required>{}</select></div>\n",
        options
    )
}

/// Copy form with a book select box and a status select box
pub fn form_page(
    title: &str,
    draft: &BookInstanceDraft,
    books: &[Choice],
    errors: &[FieldError],
) -> String {
    let fields = [
        select("book", "Book", "Please select a book", books),
        text_input("imprint", "Imprint", &draft.imprint, true),
        date_input("due_back", "Date when book available", &date_value(draft.due_back)),
        status_select(draft.status),
    ]
    .concat();
    layout(title, &form("Submit", &fields, errors))
}

/// Delete confirmation for a copy
pub fn delete(record: &BookInstanceRecord) -> String {
    let content = format!(
        "{}<p>Do you really want to delete this BookInstance?</p>\n\
         <form method=\"POST\"><button type=\"submit\">Delete</button></form>",
        summary(record)
    );
    layout("Delete Book Instance", &content)
}
