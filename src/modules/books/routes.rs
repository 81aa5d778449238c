//! HTTP handlers for `/books`.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    routing::{get, post},
    Router,
};

use bookshelf_http::{
    error::{AppError, AppResult},
    response::{ApiJson, ApiQuery, Envelope},
};

use super::{
    models::{BookCreated, BookDetail, BookFilter, BookList, BookPayload, BookQuery},
    store::BookError,
    SharedBookStore,
};

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::MissingName(_) | BookError::InvalidPageRange(_) => {
                AppError::bad_request(err.to_string())
            }
            BookError::NotFound(_) => AppError::not_found(err.to_string()),
            BookError::NotPersisted(_) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

/// `{book_id}` path segment.
///
/// A segment that does not percent-decode to UTF-8 is kept in its raw form.
/// Ids are alphanumeric, so the raw form never matches a stored book and the
/// operation answers with its own not-found message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BookId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(book_id)) => Ok(BookId(book_id)),
            Err(rejection) => {
                tracing::debug!(%rejection, "book id is not decodable");
                let raw = parts.uri.path().rsplit('/').next().unwrap_or_default();
                Ok(BookId(raw.to_string()))
            }
        }
    }
}

/// Routes of the books module, relative to its mount point.
pub fn router(store: SharedBookStore) -> Router {
    Router::new()
        .route("/", post(add_book).get(list_books))
        .route(
            "/{book_id}",
            get(get_book).put(edit_book).delete(delete_book),
        )
        .with_state(store)
}

async fn add_book(
    State(store): State<SharedBookStore>,
    ApiJson(payload): ApiJson<BookPayload>,
) -> AppResult<(StatusCode, Envelope<BookCreated>)> {
    let book_id = store.write().await.create(payload)?;
    tracing::info!(%book_id, "book added");

    Ok((
        StatusCode::CREATED,
        Envelope::success("Buku berhasil ditambahkan").with_data(BookCreated { book_id }),
    ))
}

async fn list_books(
    State(store): State<SharedBookStore>,
    ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
) -> Envelope<BookList> {
    let filter = BookFilter::from(pairs.into_iter().collect::<BookQuery>());
    let books = store.read().await.list(&filter);
    tracing::debug!(?filter, count = books.len(), "books listed");

    Envelope::data(BookList { books })
}

async fn get_book(
    State(store): State<SharedBookStore>,
    BookId(book_id): BookId,
) -> AppResult<Envelope<BookDetail>> {
    let book = store.read().await.get(&book_id)?.clone();
    Ok(Envelope::data(BookDetail { book }))
}

async fn edit_book(
    State(store): State<SharedBookStore>,
    BookId(book_id): BookId,
    ApiJson(payload): ApiJson<BookPayload>,
) -> AppResult<Envelope<()>> {
    store.write().await.update(&book_id, payload)?;
    tracing::info!(%book_id, "book updated");

    Ok(Envelope::success("Buku berhasil diperbarui"))
}

async fn delete_book(
    State(store): State<SharedBookStore>,
    BookId(book_id): BookId,
) -> AppResult<Envelope<()>> {
    store.write().await.delete(&book_id)?;
    tracing::info!(%book_id, "book deleted");

    Ok(Envelope::success("Buku berhasil dihapus"))
}
