//! Form validation and sanitization
//!
//! A [`Pipeline`] is a declarative table of [`FieldRules`], one per form
//! field, each holding an ordered chain of [`Step`]s. Steps either transform
//! the value (trim, escape, parse a date) or check it. A failing check appends
//! its message to the error list and the chain keeps going, so one field can
//! collect several messages.
//!
//! ```
//! # use catalog::validation::{FieldRules, FormData, Pipeline};
//! let pipeline = Pipeline::new(vec![
//!     FieldRules::field("name").trim().min_length(3, "Name too short").escape(),
//! ]);
//! let form = FormData::from_pairs(vec![("name".into(), "  ab ".into())]);
//! let validated = pipeline.run(&form);
//! assert_eq!(validated.text("name"), "ab");
//! assert_eq!(validated.errors()[0].message, "Name too short");
//! ```

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Raw `application/x-www-form-urlencoded` fields in submission order
///
/// Repeated keys (checkbox groups) are kept, which a plain struct extractor
/// would collapse.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// First submitted value for `name`
    pub fn value(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every submitted value for `name`
    ///
    /// An absent field yields an empty set and a single selection a
    /// one-element set, so multi-select inputs always arrive as a list.
    pub fn values(&self, name: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
            .collect()
    }
}

/// One step of a field's rule chain
#[derive(Debug, Clone)]
pub enum Step {
    /// Strip leading and trailing whitespace
    Trim,
    /// Replace markup-sensitive characters with HTML entities
    Escape,
    /// Parse an ISO-8601 string into a date; unparseable input becomes empty
    ToDate,
    /// At least this many characters
    MinLength(usize, &'static str),
    /// ASCII letters and digits only, and not empty
    Alphanumeric(&'static str),
    /// A valid ISO-8601 date or date-time
    IsoDate(&'static str),
    /// One of a fixed set of values
    OneOf(&'static [&'static str], &'static str),
}

/// Ordered rule chain for a single form field
#[derive(Debug, Clone)]
pub struct FieldRules {
    field: &'static str,
    optional: bool,
    each: bool,
    steps: Vec<Step>,
}

impl FieldRules {
    /// Rules for a single-valued field
    pub fn field(field: &'static str) -> Self {
        Self {
            field,
            optional: false,
            each: false,
            steps: Vec::new(),
        }
    }

    /// Rules applied to every element of a multi-valued field
    pub fn each(field: &'static str) -> Self {
        Self {
            each: true,
            ..Self::field(field)
        }
    }

    /// Skip every check when the submitted value is empty
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn trim(self) -> Self {
        self.step(Step::Trim)
    }

    pub fn escape(self) -> Self {
        self.step(Step::Escape)
    }

    pub fn parse_date(self) -> Self {
        self.step(Step::ToDate)
    }

    pub fn min_length(self, min: usize, message: &'static str) -> Self {
        self.step(Step::MinLength(min, message))
    }

    pub fn alphanumeric(self, message: &'static str) -> Self {
        self.step(Step::Alphanumeric(message))
    }

    pub fn iso_date(self, message: &'static str) -> Self {
        self.step(Step::IsoDate(message))
    }

    pub fn one_of(self, allowed: &'static [&'static str], message: &'static str) -> Self {
        self.step(Step::OneOf(allowed, message))
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}

/// A field value as it moves through its chain
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Missing,
    Text(String),
    Date(NaiveDate),
    List(Vec<String>),
}

/// A rejected field and the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Result of running a [`Pipeline`]: normalized values plus any errors
#[derive(Debug, Clone, Default)]
pub struct Validated {
    values: HashMap<&'static str, FieldValue>,
    errors: Vec<FieldError>,
}

impl Validated {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Normalized text for `field`, empty when missing or not text
    pub fn text(&self, field: &str) -> String {
        match self.values.get(field) {
            Some(FieldValue::Text(text)) => text.clone(),
            Some(FieldValue::Date(date)) => date.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }

    /// Parsed date for `field`, if the chain produced one
    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        match self.values.get(field) {
            Some(FieldValue::Date(date)) => Some(*date),
            _ => None,
        }
    }

    /// Normalized elements of a multi-valued `field`
    pub fn list(&self, field: &str) -> Vec<String> {
        match self.values.get(field) {
            Some(FieldValue::List(items)) => items.clone(),
            Some(FieldValue::Text(text)) => vec![text.clone()],
            _ => Vec::new(),
        }
    }
}

/// A declarative set of per-field rule chains
#[derive(Debug, Clone)]
pub struct Pipeline {
    rules: Vec<FieldRules>,
}

impl Pipeline {
    pub fn new(rules: Vec<FieldRules>) -> Self {
        Self { rules }
    }

    /// Runs every field's chain against the submitted form
    ///
    /// Fields are processed in declaration order, which is also the order of
    /// the returned errors.
    pub fn run(&self, form: &FormData) -> Validated {
        let mut validated = Validated::default();

        for rules in &self.rules {
            let value = if rules.each {
                let items = form
                    .values(rules.field)
                    .into_iter()
                    .map(|item| run_chain(rules, FieldValue::Text(item), &mut validated.errors))
                    .map(|item| match item {
                        FieldValue::Text(text) => text,
                        other => plain_text(&other),
                    })
                    .collect();
                FieldValue::List(items)
            } else {
                let raw = match form.value(rules.field) {
                    Some(text) => FieldValue::Text(text.to_string()),
                    None => FieldValue::Missing,
                };
                run_chain(rules, raw, &mut validated.errors)
            };
            validated.values.insert(rules.field, value);
        }

        validated
    }
}

fn run_chain(rules: &FieldRules, raw: FieldValue, errors: &mut Vec<FieldError>) -> FieldValue {
    let skip_checks = rules.optional && is_empty(&raw);
    let mut value = raw;

    for step in &rules.steps {
        match step {
            Step::Trim => value = map_text(value, |s| s.trim().to_string()),
            Step::Escape => value = map_text(value, |s| escape(&s)),
            Step::ToDate => {
                value = match value {
                    FieldValue::Text(text) => parse_iso_date(&text)
                        .map(FieldValue::Date)
                        .unwrap_or(FieldValue::Missing),
                    other => other,
                }
            }
            check => {
                if skip_checks {
                    continue;
                }
                if let Some(message) = failed_check(check, &value) {
                    errors.push(FieldError {
                        field: rules.field.to_string(),
                        message: message.to_string(),
                    });
                }
            }
        }
    }

    value
}

/// Returns the message of `check` when `value` does not satisfy it
fn failed_check(check: &Step, value: &FieldValue) -> Option<&'static str> {
    let text = plain_text(value);
    let (passed, message) = match check {
        Step::MinLength(min, message) => (text.chars().count() >= *min, *message),
        Step::Alphanumeric(message) => (
            !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric()),
            *message,
        ),
        Step::IsoDate(message) => (
            matches!(value, FieldValue::Date(_)) || parse_iso_date(&text).is_some(),
            *message,
        ),
        Step::OneOf(allowed, message) => (allowed.contains(&text.as_str()), *message),
        Step::Trim | Step::Escape | Step::ToDate => return None,
    };
    (!passed).then_some(message)
}

fn map_text(value: FieldValue, f: impl FnOnce(String) -> String) -> FieldValue {
    match value {
        FieldValue::Text(text) => FieldValue::Text(f(text)),
        other => other,
    }
}

fn plain_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        FieldValue::List(items) => items.join(","),
        FieldValue::Missing => String::new(),
    }
}

fn is_empty(value: &FieldValue) -> bool {
    match value {
        FieldValue::Missing => true,
        FieldValue::Text(text) => text.is_empty(),
        FieldValue::List(items) => items.is_empty(),
        FieldValue::Date(_) => false,
    }
}

/// Replaces `& < > " ' / \` and backticks with HTML entities
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            other => out.push(other),
        }
    }
    out
}

/// Parses `YYYY-MM-DD` or an ISO-8601 date-time, keeping only the date
///
/// Reduced precision forms `YYYY` and `YYYY-MM` resolve to the first day of
/// the year or month.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_reduced_date(raw))
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
                .ok()
                .map(|dt| dt.date())
        })
}

/// `YYYY` or `YYYY-MM`, four-digit year and two-digit month only
fn parse_reduced_date(raw: &str) -> Option<NaiveDate> {
    let digits = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
    let mut parts = raw.split('-');
    let year = parts.next().filter(|y| digits(*y, 4))?.parse().ok()?;
    let month = match parts.next() {
        None => 1,
        Some(m) if digits(m, 2) => m.parse().ok()?,
        Some(_) => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_multi_value_normalization() {
        let data = form(&[("genre", "a"), ("title", "x"), ("genre", "b")]);
        assert_eq!(data.values("genre"), vec!["a", "b"]);
        assert_eq!(data.values("title"), vec!["x"]);
        assert!(data.values("missing").is_empty());
    }

    #[test]
    fn test_failing_checks_accumulate_per_field() {
        let pipeline = Pipeline::new(vec![FieldRules::field("first_name")
            .trim()
            .min_length(1, "must be specified")
            .escape()
            .alphanumeric("non-alphanumeric")]);

        let validated = pipeline.run(&form(&[("first_name", "   ")]));
        let messages: Vec<_> = validated.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["must be specified", "non-alphanumeric"]);
        assert!(validated.errors().iter().all(|e| e.field == "first_name"));
    }

    #[test]
    fn test_transforms_run_in_declared_order() {
        let pipeline = Pipeline::new(vec![FieldRules::field("title").trim().escape()]);
        let validated = pipeline.run(&form(&[("title", "  <b>Tom & Jerry</b> ")]));
        assert!(validated.is_valid());
        assert_eq!(
            validated.text("title"),
            "&lt;b&gt;Tom &amp; Jerry&lt;&#x2F;b&gt;"
        );
    }

    #[test]
    fn test_optional_date_skips_checks_when_empty() {
        let pipeline = Pipeline::new(vec![FieldRules::field("due_back")
            .optional()
            .iso_date("Invalid date")
            .parse_date()]);

        let empty = pipeline.run(&form(&[("due_back", "")]));
        assert!(empty.is_valid());
        assert_eq!(empty.date("due_back"), None);

        let absent = pipeline.run(&form(&[]));
        assert!(absent.is_valid());

        let bad = pipeline.run(&form(&[("due_back", "next tuesday")]));
        assert_eq!(bad.errors().len(), 1);
        assert_eq!(bad.errors()[0].message, "Invalid date");
        assert_eq!(bad.date("due_back"), None);

        let good = pipeline.run(&form(&[("due_back", "2024-02-29")]));
        assert_eq!(good.date("due_back"), NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_each_applies_steps_per_element() {
        let pipeline = Pipeline::new(vec![FieldRules::each("genre").escape()]);
        let validated = pipeline.run(&form(&[("genre", "a<b"), ("genre", "c")]));
        assert_eq!(validated.list("genre"), vec!["a&lt;b", "c"]);

        let none = pipeline.run(&form(&[]));
        assert!(none.list("genre").is_empty());
    }

    #[test]
    fn test_one_of() {
        let pipeline = Pipeline::new(vec![FieldRules::field("status")
            .optional()
            .one_of(&["Available", "Loaned"], "Invalid status")]);
        assert!(pipeline.run(&form(&[("status", "Loaned")])).is_valid());
        assert!(pipeline.run(&form(&[("status", "")])).is_valid());
        assert!(!pipeline.run(&form(&[("status", "Lost")])).is_valid());
    }

    #[test]
    fn test_parse_iso_date_variants() {
        let expected = NaiveDate::from_ymd_opt(1990, 5, 17);
        assert_eq!(parse_iso_date("1990-05-17"), expected);
        assert_eq!(parse_iso_date("1990-05-17T10:30:00Z"), expected);
        assert_eq!(parse_iso_date("1990-05-17T10:30"), expected);
        assert_eq!(parse_iso_date("17/05/1990"), None);
        assert_eq!(parse_iso_date("1990-02-30"), None);
    }

    #[test]
    fn test_parse_iso_date_reduced_precision() {
        assert_eq!(parse_iso_date("1990"), NaiveDate::from_ymd_opt(1990, 1, 1));
        assert_eq!(parse_iso_date("1990-05"), NaiveDate::from_ymd_opt(1990, 5, 1));
        assert_eq!(parse_iso_date("1990-13"), None);
        assert_eq!(parse_iso_date("1990-5"), None);
        assert_eq!(parse_iso_date("90"), None);
        assert_eq!(parse_iso_date("1990-05-"), None);

        let pipeline = Pipeline::new(vec![FieldRules::field("date_of_birth")
            .optional()
            .iso_date("Invalid date of birth")
            .parse_date()]);
        let validated = pipeline.run(&form(&[("date_of_birth", "1775-12")]));
        assert!(validated.is_valid());
        assert_eq!(validated.date("date_of_birth"), NaiveDate::from_ymd_opt(1775, 12, 1));
    }
}
