pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use tokio::sync::RwLock;

use store::BookStore;

/// Handle to the store shared by every request handler.
pub type SharedBookStore = Arc<RwLock<BookStore>>;

/// Books module: owns the shelf and serves it under `/books`
pub struct BooksModule {
    store: SharedBookStore,
}

impl BooksModule {
    pub fn new() -> Self {
        Self::with_store(Arc::new(RwLock::new(BookStore::new())))
    }

    /// Build the module around an existing store handle
    pub fn with_store(store: SharedBookStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> SharedBookStore {
        self.store.clone()
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let remaining = self.store.read().await.len();
        tracing::info!(
            module = self.name(),
            books = remaining,
            "books module stopped, in-memory shelf discarded"
        );
        Ok(())
    }
}

fn message_response(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/MessageResponse" }
            }
        }
    })
}

fn book_id_param() -> serde_json::Value {
    serde_json::json!({
        "name": "bookId",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let flag_param = |name: &str, description: &str| {
        serde_json::json!({
            "name": name,
            "in": "query",
            "required": false,
            "description": description,
            "schema": { "type": "string", "enum": ["0", "1"] }
        })
    };

    serde_json::json!({
        "paths": {
            "/": {
                "post": {
                    "summary": "Add a book",
                    "tags": ["Books"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/BookPayload" }
                            }
                        }
                    },
                    "responses": {
                        "201": {
                            "description": "Book added",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookCreatedResponse" }
                                }
                            }
                        },
                        "400": message_response("Missing name or readPage above pageCount")
                    }
                },
                "get": {
                    "summary": "List books",
                    "description": concat!(
                        "Only the first present filter applies ",
                        "(name, then reading, then finished). ",
                        "Without filters the first 3 books are returned."
                    ),
                    "tags": ["Books"],
                    "parameters": [
                        {
                            "name": "name",
                            "in": "query",
                            "required": false,
                            "description": "Case-insensitive substring of the book name",
                            "schema": { "type": "string" }
                        },
                        flag_param("reading", "1 for books being read, 0 otherwise"),
                        flag_param("finished", "1 for finished books, 0 otherwise")
                    ],
                    "responses": {
                        "200": {
                            "description": "Matching books",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookListResponse" }
                                }
                            }
                        }
                    }
                }
            },
            "/{bookId}": {
                "get": {
                    "summary": "Get a book",
                    "tags": ["Books"],
                    "parameters": [book_id_param()],
                    "responses": {
                        "200": {
                            "description": "The book",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookDetailResponse" }
                                }
                            }
                        },
                        "404": message_response("Unknown book id")
                    }
                },
                "put": {
                    "summary": "Update a book",
                    "tags": ["Books"],
                    "parameters": [book_id_param()],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/BookPayload" }
                            }
                        }
                    },
                    "responses": {
                        "200": message_response("Book updated"),
                        "400": message_response("Missing name or readPage above pageCount"),
                        "404": message_response("Unknown book id")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": [book_id_param()],
                    "responses": {
                        "200": message_response("Book deleted"),
                        "404": message_response("Unknown book id")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "BookPayload": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "year": { "type": "integer" },
                        "author": { "type": "string" },
                        "summary": { "type": "string" },
                        "publisher": { "type": "string" },
                        "pageCount": { "type": "integer", "minimum": 0 },
                        "readPage": { "type": "integer", "minimum": 0 },
                        "reading": { "type": "boolean" }
                    },
                    "required": ["name"]
                },
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "year": { "type": ["integer", "null"] },
                        "author": { "type": ["string", "null"] },
                        "summary": { "type": ["string", "null"] },
                        "publisher": { "type": ["string", "null"] },
                        "pageCount": { "type": "integer" },
                        "readPage": { "type": "integer" },
                        "finished": { "type": "boolean" },
                        "reading": { "type": "boolean" },
                        "insertedAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": [
                        "id", "name", "pageCount", "readPage",
                        "finished", "reading", "insertedAt", "updatedAt"
                    ]
                },
                "BookSummary": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "publisher": { "type": ["string", "null"] }
                    },
                    "required": ["id", "name"]
                },
                "BookCreatedResponse": {
                    "type": "object",
                    "properties": {
                        "status": { "type": "string" },
                        "message": { "type": "string" },
                        "data": {
                            "type": "object",
                            "properties": { "bookId": { "type": "string" } }
                        }
                    }
                },
                "BookListResponse": {
                    "type": "object",
                    "properties": {
                        "status": { "type": "string" },
                        "data": {
                            "type": "object",
                            "properties": {
                                "books": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/BookSummary" }
                                }
                            }
                        }
                    }
                },
                "BookDetailResponse": {
                    "type": "object",
                    "properties": {
                        "status": { "type": "string" },
                        "data": {
                            "type": "object",
                            "properties": {
                                "book": { "$ref": "#/components/schemas/Book" }
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}
