//! HTML rendering
//!
//! Every page is a plain function from already-loaded data to an HTML string,
//! wrapped in the shared [`layout`]. All dynamic text goes through [`esc`].

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

use axum::http::StatusCode;

use crate::model::{CatalogCounts, Choice};
use crate::validation::FieldError;

const NAV_LINKS: &[(&str, &str)] = &[
    ("/catalog", "Home"),
    ("/catalog/books", "All books"),
    ("/catalog/authors", "All authors"),
    ("/catalog/genres", "All genres"),
    ("/catalog/bookinstances", "All book-instances"),
];

const CREATE_LINKS: &[(&str, &str)] = &[
    ("/catalog/author/create", "Create new author"),
    ("/catalog/genre/create", "Create new genre"),
    ("/catalog/book/create", "Create new book"),
    ("/catalog/bookinstance/create", "Create new book instance (copy)"),
];

/// Escapes text for use in element content and quoted attributes
///
/// Output-side only. Submitted values are escaped separately by
/// [`crate::validation::escape`] before they are stored.
pub fn esc(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Wraps page content in the document shell and sidebar
pub fn layout(title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n\
         <nav><ul class=\"sidebar-nav\">{nav}</ul><hr><ul class=\"sidebar-nav\">{create}</ul></nav>\n\
         <main>\n<h1>{title}</h1>\n{content}\n</main>\n\
         </body>\n\
         </html>\n",
        title = esc(title),
        nav = link_list(NAV_LINKS),
        create = link_list(CREATE_LINKS),
        content = content,
    )
}

fn link_list(links: &[(&str, &str)]) -> String {
    links
        .iter()
        .map(|(href, label)| format!("<li><a href=\"{}\">{}</a></li>", href, label))
        .collect()
}

/// Generic error page carrying the response status
pub fn error_page(status: StatusCode, message: &str) -> String {
    let content = format!(
        "<p class=\"error-message\">{}</p>\n<p class=\"error-status\">{}</p>",
        esc(message),
        status.as_u16()
    );
    layout("Error", &content)
}

/// Catalog home page with document counts
pub fn index(counts: &CatalogCounts) -> String {
    let content = format!(
        "<p>Welcome to <em>LocalLibrary</em>, a very basic library catalog.</p>\n\
         <h2>Dynamic content</h2>\n\
         <p>The library has the following record counts:</p>\n\
         <ul>\n\
         <li><strong>Books:</strong> {}</li>\n\
         <li><strong>Copies:</strong> {}</li>\n\
         <li><strong>Copies available:</strong> {}</li>\n\
         <li><strong>Authors:</strong> {}</li>\n\
         <li><strong>Genres:</strong> {}</li>\n\
         </ul>",
        counts.books,
        counts.book_instances,
        counts.book_instances_available,
        counts.authors,
        counts.genres,
    );
    layout("Local Library Home", &content)
}

/// Validation messages above a re-rendered form
fn error_list(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| {
            format!(
                "<li data-field=\"{}\">{}</li>",
                esc(&e.field),
                esc(&e.message)
            )
        })
        .collect();
    format!("<ul class=\"errors\">{}</ul>\n", items)
}

fn text_input(name: &str, label: &str, value: &str, required: bool) -> String {
    format!(
        "<div class=\"form-group\"><label for=\"{name}\">{label}:</label>\
         <input id=\"{name}\" type=\"text\" name=\"{name}\" value=\"{value}\"{required}></div>\n",
        name = name,
        label = label,
        value = esc(value),
        required = if required { " required" } else { "" },
    )
}

fn date_input(name: &str, label: &str, value: &str) -> String {
    format!(
        "<div class=\"form-group\"><label for=\"{name}\">{label}:</label>\
         <input id=\"{name}\" type=\"date\" name=\"{name}\" value=\"{value}\"></div>\n",
        name = name,
        label = label,
        value = esc(value),
    )
}

fn select(name: &str, label: &str, placeholder: &str, choices: &[Choice]) -> String {
    let options: String = choices
        .iter()
        .map(|c| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                esc(&c.id),
                if c.selected { " selected" } else { "" },
                esc(&c.label)
            )
        })
        .collect();
    format!(
        "<div class=\"form-group\"><label for=\"{name}\">{label}:</label>\
         <select id=\"{name}\" name=\"{name}\" required>\
         <option value=\"\">--{placeholder}--</option>{options}</select></div>\n",
        name = name,
        label = label,
        placeholder = placeholder,
        options = options,
    )
}

fn form(action_label: &str, fields: &str, errors: &[FieldError]) -> String {
    format!(
        "<form method=\"POST\">\n{fields}<button type=\"submit\">{label}</button>\n</form>\n{errors}",
        fields = fields,
        label = action_label,
        errors = error_list(errors),
    )
}

fn date_value(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esc() {
        assert_eq!(
            esc(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_error_page_shows_status_and_escaped_message() {
        let page = error_page(StatusCode::NOT_FOUND, "Book <x> not found");
        assert!(page.contains("404"));
        assert!(page.contains("Book &lt;x&gt; not found"));
    }

    #[test]
    fn test_error_list_tags_fields() {
        let errors = vec![FieldError {
            field: "first_name".to_string(),
            message: "First name must be specified.".to_string(),
        }];
        let html = error_list(&errors);
        assert!(html.contains("data-field=\"first_name\""));
        assert!(html.contains("First name must be specified."));
        assert!(error_list(&[]).is_empty());
    }
}
