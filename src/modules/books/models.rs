use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A book on the shelf, as stored and as returned by `GET /books/{bookId}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Random identifier assigned at creation, never changes
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    /// Total pages
    pub page_count: u32,
    /// Pages read so far, never above `page_count`
    pub read_page: u32,
    /// `read_page == page_count` as of the last write
    pub finished: bool,
    pub reading: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub inserted_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Request body for creating or replacing a book.
///
/// `name` stays optional here so a missing name can be reported with the
/// shelf's own message instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub read_page: u32,
    #[serde(default)]
    pub reading: bool,
}

/// Projection returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: Option<String>,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}

/// Query parameters of `GET /books`, every value kept per key.
///
/// Keys may repeat in a query string, so values are collected instead of
/// deserialized into single fields; unknown keys are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookQuery {
    pub name: Vec<String>,
    pub reading: Vec<String>,
    pub finished: Vec<String>,
}

impl FromIterator<(String, String)> for BookQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut query = BookQuery::default();
        for (key, value) in pairs {
            match key.as_str() {
                "name" => query.name.push(value),
                "reading" => query.reading.push(value),
                "finished" => query.finished.push(value),
                _ => {}
            }
        }
        query
    }
}

/// The single filter applied to a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    /// Case-insensitive substring of the name
    Name(String),
    /// `None` when the query value is not a 0/1 flag; matches nothing
    Reading(Option<bool>),
    Finished(Option<bool>),
    /// First [`super::store::DEFAULT_LIST_LIMIT`] books
    Unfiltered,
}

impl From<BookQuery> for BookFilter {
    /// `name` beats `reading` beats `finished`; the others are ignored.
    ///
    /// A repeated `name` uses its first value. A repeated flag is not a
    /// number at all and matches nothing.
    fn from(query: BookQuery) -> Self {
        if let Some(name) = query.name.into_iter().next() {
            BookFilter::Name(name)
        } else if !query.reading.is_empty() {
            BookFilter::Reading(single_flag(&query.reading))
        } else if !query.finished.is_empty() {
            BookFilter::Finished(single_flag(&query.finished))
        } else {
            BookFilter::Unfiltered
        }
    }
}

fn single_flag(values: &[String]) -> Option<bool> {
    match values {
        [value] => parse_flag(value),
        _ => None,
    }
}

/// Read a query flag as a number that must equal 0 or 1.
///
/// Blank input counts as 0 and surrounding whitespace is ignored, so `""`,
/// `"0"` and `" 0.0 "` are all `false`. Unsigned `0x`, `0o` and `0b`
/// literals are read in their radix, so `"0x1"` is `true`. Anything else
/// (`"true"`, `"2"`, `"-0x1"`) yields `None`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(false);
    }

    let number = match radix_literal(trimmed) {
        Some(radix_value) => radix_value?,
        None => trimmed.parse::<f64>().ok()?,
    };

    if number == 0.0 {
        Some(false)
    } else if number == 1.0 {
        Some(true)
    } else {
        None
    }
}

/// `Some` when `raw` carries a radix prefix; the inner `None` marks bad digits.
fn radix_literal(raw: &str) -> Option<Option<f64>> {
    let radix = match raw.get(..2)?.to_ascii_lowercase().as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };

    let digits = &raw[2..];
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Some(None);
    }

    // Overflowing literals are far from 0 or 1.
    Some(Some(u64::from_str_radix(digits, radix).map_or(f64::MAX, |n| n as f64)))
}

/// `data` of the create response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCreated {
    pub book_id: String,
}

/// `data` of the list response.
#[derive(Debug, Serialize)]
pub struct BookList {
    pub books: Vec<BookSummary>,
}

/// `data` of the fetch response.
#[derive(Debug, Serialize)]
pub struct BookDetail {
    pub book: Book,
}
