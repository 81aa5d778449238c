//! In-memory book collection.

use rand::{distr::Alphanumeric, Rng};
use thiserror::Error;
use time::OffsetDateTime;

use super::models::{Book, BookFilter, BookPayload, BookSummary};

/// Number of books returned by an unfiltered listing.
pub const DEFAULT_LIST_LIMIT: usize = 3;

/// Length of generated book ids.
pub const ID_LENGTH: usize = 16;

/// Write operations that validate a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    Create,
    Update,
}

impl Write {
    fn failure_prefix(self) -> &'static str {
        match self {
            Write::Create => "Gagal menambahkan buku",
            Write::Update => "Gagal memperbarui buku",
        }
    }
}

/// Operations that look a book up by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Fetch,
    Update,
    Delete,
}

impl Lookup {
    fn not_found_message(self) -> &'static str {
        match self {
            Lookup::Fetch => "Buku tidak ditemukan",
            Lookup::Update => "Gagal memperbarui buku. Id tidak ditemukan",
            Lookup::Delete => "Buku gagal dihapus. Id tidak ditemukan",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookError {
    #[error("{}. Mohon isi nama buku", .0.failure_prefix())]
    MissingName(Write),

    #[error("{}. readPage tidak boleh lebih besar dari pageCount", .0.failure_prefix())]
    InvalidPageRange(Write),

    #[error("{}", .0.not_found_message())]
    NotFound(Lookup),

    /// The record could not be found right after being appended.
    #[error("book {0} is missing from the store after insertion")]
    NotPersisted(String),
}

/// Payload that passed validation.
struct ValidBook {
    name: String,
    payload: BookPayload,
}

impl ValidBook {
    fn finished(&self) -> bool {
        self.payload.page_count == self.payload.read_page
    }
}

/// Name first, then the page range; the first failure wins.
fn validate(mut payload: BookPayload, write: Write) -> Result<ValidBook, BookError> {
    let name = payload.name.take().ok_or(BookError::MissingName(write))?;

    if payload.page_count < payload.read_page {
        return Err(BookError::InvalidPageRange(write));
    }

    Ok(ValidBook { name, payload })
}

/// Ordered collection of books, oldest first.
#[derive(Debug, Default)]
pub struct BookStore {
    books: Vec<Book>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }

    fn generate_id(&self) -> String {
        loop {
            let id: String = rand::rng()
                .sample_iter(&Alphanumeric)
                .take(ID_LENGTH)
                .map(char::from)
                .collect();

            if self.position(&id).is_none() {
                return id;
            }
            tracing::warn!(book_id = %id, "generated book id collided, retrying");
        }
    }

    /// Validate and append a new book, returning its id.
    pub fn create(&mut self, payload: BookPayload) -> Result<String, BookError> {
        let valid = validate(payload, Write::Create)?;

        let id = self.generate_id();
        let now = OffsetDateTime::now_utc();
        let finished = valid.finished();
        let ValidBook { name, payload } = valid;

        self.books.push(Book {
            id: id.clone(),
            name,
            year: payload.year,
            author: payload.author,
            summary: payload.summary,
            publisher: payload.publisher,
            page_count: payload.page_count,
            read_page: payload.read_page,
            finished,
            reading: payload.reading,
            inserted_at: now,
            updated_at: now,
        });

        if self.position(&id).is_none() {
            return Err(BookError::NotPersisted(id));
        }

        Ok(id)
    }

    /// Project the books selected by `filter`, in insertion order.
    pub fn list(&self, filter: &BookFilter) -> Vec<BookSummary> {
        match filter {
            BookFilter::Name(name) => {
                let needle = name.to_lowercase();
                self.books
                    .iter()
                    .filter(|book| book.name.to_lowercase().contains(&needle))
                    .map(BookSummary::from)
                    .collect()
            }
            BookFilter::Reading(flag) => self.matching_flag(*flag, |book| book.reading),
            BookFilter::Finished(flag) => self.matching_flag(*flag, |book| book.finished),
            BookFilter::Unfiltered => self
                .books
                .iter()
                .take(DEFAULT_LIST_LIMIT)
                .map(BookSummary::from)
                .collect(),
        }
    }

    fn matching_flag(&self, flag: Option<bool>, field: impl Fn(&Book) -> bool) -> Vec<BookSummary> {
        let Some(flag) = flag else {
            return Vec::new();
        };

        self.books
            .iter()
            .filter(|book| field(book) == flag)
            .map(BookSummary::from)
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<&Book, BookError> {
        self.books
            .iter()
            .find(|book| book.id == id)
            .ok_or(BookError::NotFound(Lookup::Fetch))
    }

    /// Replace everything but `id` and `inserted_at`.
    ///
    /// The payload is validated before the id is looked up.
    pub fn update(&mut self, id: &str, payload: BookPayload) -> Result<&Book, BookError> {
        let valid = validate(payload, Write::Update)?;

        let index = self
            .position(id)
            .ok_or(BookError::NotFound(Lookup::Update))?;

        let finished = valid.finished();
        let ValidBook { name, payload } = valid;
        let book = &mut self.books[index];

        book.name = name;
        book.year = payload.year;
        book.author = payload.author;
        book.summary = payload.summary;
        book.publisher = payload.publisher;
        book.page_count = payload.page_count;
        book.read_page = payload.read_page;
        book.reading = payload.reading;
        book.finished = finished;
        book.updated_at = OffsetDateTime::now_utc();

        Ok(&self.books[index])
    }

    /// Remove a book, keeping the order of the rest.
    pub fn delete(&mut self, id: &str) -> Result<Book, BookError> {
        let index = self
            .position(id)
            .ok_or(BookError::NotFound(Lookup::Delete))?;

        Ok(self.books.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, page_count: u32, read_page: u32) -> BookPayload {
        BookPayload {
            name: Some(name.to_string()),
            year: Some(2010),
            author: Some("John Doe".to_string()),
            summary: Some("Lorem ipsum dolor sit amet".to_string()),
            publisher: Some(format!("{name} Press")),
            page_count,
            read_page,
            reading: false,
        }
    }

    fn reading(mut payload: BookPayload) -> BookPayload {
        payload.reading = true;
        payload
    }

    fn names(summaries: &[BookSummary]) -> Vec<&str> {
        summaries.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn create_stores_submitted_fields() {
        let mut store = BookStore::new();
        let id = store.create(reading(payload("Buku A", 100, 25))).unwrap();

        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));

        let book = store.get(&id).unwrap();
        assert_eq!(book.name, "Buku A");
        assert_eq!(book.year, Some(2010));
        assert_eq!(book.author.as_deref(), Some("John Doe"));
        assert_eq!(book.summary.as_deref(), Some("Lorem ipsum dolor sit amet"));
        assert_eq!(book.publisher.as_deref(), Some("Buku A Press"));
        assert_eq!(book.page_count, 100);
        assert_eq!(book.read_page, 25);
        assert!(book.reading);
        assert!(!book.finished);
        assert_eq!(book.inserted_at, book.updated_at);
    }

    #[test]
    fn create_computes_finished() {
        let mut store = BookStore::new();
        let done = store.create(payload("A", 100, 100)).unwrap();
        let open = store.create(payload("B", 100, 50)).unwrap();

        assert!(store.get(&done).unwrap().finished);
        assert!(!store.get(&open).unwrap().finished);
    }

    #[test]
    fn create_rejects_missing_name_without_mutation() {
        let mut store = BookStore::new();
        let mut nameless = payload("ignored", 10, 20);
        nameless.name = None;

        let err = store.create(nameless).unwrap_err();
        assert_eq!(err, BookError::MissingName(Write::Create));
        assert_eq!(err.to_string(), "Gagal menambahkan buku. Mohon isi nama buku");
        assert!(store.is_empty());
    }

    #[test]
    fn create_rejects_read_page_over_page_count() {
        let mut store = BookStore::new();
        let err = store.create(payload("A", 10, 11)).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount"
        );
        assert!(store.is_empty());
    }

    #[test]
    fn ids_are_unique() {
        let mut store = BookStore::new();
        let mut ids: Vec<String> = (0..200)
            .map(|i| store.create(payload(&format!("Book {i}"), 1, 0)).unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn unfiltered_list_returns_first_three_in_order() {
        let mut store = BookStore::new();
        for name in ["One", "Two", "Three", "Four", "Five"] {
            store.create(payload(name, 10, 0)).unwrap();
        }

        let listed = store.list(&BookFilter::Unfiltered);
        assert_eq!(names(&listed), vec!["One", "Two", "Three"]);
        assert_eq!(listed[0].publisher.as_deref(), Some("One Press"));
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let mut store = BookStore::new();
        store.create(payload("Kelas Dicoding", 10, 0)).unwrap();
        store.create(payload("Rust in Action", 10, 0)).unwrap();
        store.create(payload("DICODING Academy", 10, 0)).unwrap();
        store.create(payload("dicoding", 10, 0)).unwrap();

        let listed = store.list(&BookFilter::Name("dIcOdInG".into()));
        assert_eq!(
            names(&listed),
            vec!["Kelas Dicoding", "DICODING Academy", "dicoding"]
        );

        assert!(store.list(&BookFilter::Name("missing".into())).is_empty());
        assert_eq!(store.list(&BookFilter::Name(String::new())).len(), 4);
    }

    #[test]
    fn flag_filters_match_both_values() {
        let mut store = BookStore::new();
        store.create(reading(payload("Reading", 10, 5))).unwrap();
        store.create(payload("Done", 10, 10)).unwrap();
        store.create(payload("Shelved", 10, 0)).unwrap();

        assert_eq!(names(&store.list(&BookFilter::Reading(Some(true)))), vec!["Reading"]);
        assert_eq!(
            names(&store.list(&BookFilter::Reading(Some(false)))),
            vec!["Done", "Shelved"]
        );
        assert_eq!(names(&store.list(&BookFilter::Finished(Some(true)))), vec!["Done"]);
        assert_eq!(
            names(&store.list(&BookFilter::Finished(Some(false)))),
            vec!["Reading", "Shelved"]
        );
        assert!(store.list(&BookFilter::Finished(None)).is_empty());
    }

    #[test]
    fn get_requires_exact_id() {
        let mut store = BookStore::new();
        let id = store.create(payload("A", 1, 1)).unwrap();
        assert_eq!(store.get(&id).unwrap().name, "A");

        let swapped: String = id
            .chars()
            .map(|c| {
                if c.is_ascii_uppercase() {
                    c.to_ascii_lowercase()
                } else {
                    c.to_ascii_uppercase()
                }
            })
            .collect();
        if swapped != id {
            assert_eq!(
                store.get(&swapped).unwrap_err(),
                BookError::NotFound(Lookup::Fetch)
            );
        }
        assert_eq!(
            store.get("nope").unwrap_err().to_string(),
            "Buku tidak ditemukan"
        );
    }

    #[test]
    fn update_replaces_fields_and_recomputes_finished() {
        let mut store = BookStore::new();
        let id = store.create(payload("Draft", 100, 10)).unwrap();
        let inserted_at = store.get(&id).unwrap().inserted_at;

        let mut edit = reading(payload("Final", 200, 200));
        edit.publisher = None;
        let book = store.update(&id, edit).unwrap();

        assert_eq!(book.id, id);
        assert_eq!(book.name, "Final");
        assert_eq!(book.page_count, 200);
        assert_eq!(book.read_page, 200);
        assert!(book.reading);
        assert!(book.finished);
        assert!(book.publisher.is_none());
        assert_eq!(book.inserted_at, inserted_at);
        assert!(book.updated_at >= inserted_at);
    }

    #[test]
    fn update_validates_before_lookup() {
        let mut store = BookStore::new();

        let mut nameless = payload("x", 1, 0);
        nameless.name = None;
        assert_eq!(
            store.update("unknown", nameless).unwrap_err().to_string(),
            "Gagal memperbarui buku. Mohon isi nama buku"
        );
        assert_eq!(
            store.update("unknown", payload("x", 1, 2)).unwrap_err().to_string(),
            "Gagal memperbarui buku. readPage tidak boleh lebih besar dari pageCount"
        );
        assert_eq!(
            store.update("unknown", payload("x", 2, 1)).unwrap_err().to_string(),
            "Gagal memperbarui buku. Id tidak ditemukan"
        );
    }

    #[test]
    fn rejected_update_leaves_book_untouched() {
        let mut store = BookStore::new();
        let id = store.create(payload("Keep", 50, 20)).unwrap();
        let before = store.get(&id).unwrap().clone();

        assert!(store.update(&id, payload("Broken", 10, 20)).is_err());
        assert_eq!(store.get(&id).unwrap(), &before);
    }

    #[test]
    fn nameless_update_leaves_book_untouched() {
        let mut store = BookStore::new();
        let id = store.create(payload("Keep", 50, 20)).unwrap();
        let before = store.get(&id).unwrap().clone();

        let mut nameless = payload("Other", 80, 10);
        nameless.name = None;
        let err = store.update(&id, nameless).unwrap_err();
        assert_eq!(err.to_string(), "Gagal memperbarui buku. Mohon isi nama buku");
        assert_eq!(store.get(&id).unwrap(), &before);
    }

    #[test]
    fn delete_preserves_order_of_remaining() {
        let mut store = BookStore::new();
        let ids: Vec<String> = ["A", "B", "C"]
            .iter()
            .map(|name| store.create(payload(name, 1, 0)).unwrap())
            .collect();

        let removed = store.delete(&ids[1]).unwrap();
        assert_eq!(removed.name, "B");
        assert_eq!(names(&store.list(&BookFilter::Unfiltered)), vec!["A", "C"]);
    }

    #[test]
    fn delete_unknown_id_leaves_store_unchanged() {
        let mut store = BookStore::new();
        store.create(payload("A", 1, 0)).unwrap();

        let err = store.delete("missing").unwrap_err();
        assert_eq!(err.to_string(), "Buku gagal dihapus. Id tidak ditemukan");
        assert_eq!(store.len(), 1);
    }
}
