pub use in_memory_catalog_repository::InMemoryCatalogRepository;

use crate::api::{
    Book, BookFilter, BookId, BookPatch, Bookshelf, NewBook, NewBookshelf, NewReview, Review,
    ReviewId, ShelfId, ShelfStats,
};

mod in_memory_catalog_repository;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Book with id {0} not found")]
    BookNotFound(BookId),

    #[error("Bookshelf with id {0} not found")]
    ShelfNotFound(ShelfId),

    #[error("Review with id {review_id} not found for book {book_id}")]
    ReviewNotFound { book_id: BookId, review_id: ReviewId },

    #[error("Book with this ISBN already exists")]
    DuplicateIsbn,

    #[error("Book already in this bookshelf")]
    AlreadyOnShelf,

    #[error("Book not in this bookshelf")]
    NotOnShelf,

    #[error("{0}")]
    Invalid(String),

    #[error("Failed to deserialize book: {0}")]
    DeserializationError(#[from] serde_json::Error),
}

#[async_trait::async_trait]
pub trait CatalogRepository {
    /// Adds book to the catalogue, rejects an ISBN that is already taken
    async fn add_book(&self, book: NewBook) -> Result<Book, CatalogError>;
    /// Applies the fields present in the patch, returns the updated book
    async fn update_book(&self, book_id: BookId, patch: BookPatch) -> Result<Book, CatalogError>;
    /// Retrieves the book together with its reviews
    async fn get_book(&self, book_id: BookId) -> Result<Book, CatalogError>;
    /// Lists books matching the filter, `limit` defaults to 10
    async fn list_books(&self, filter: BookFilter) -> Result<Vec<Book>, CatalogError>;
    /// Removes the book, its reviews and its place on every shelf
    async fn delete_book(&self, book_id: BookId) -> Result<(), CatalogError>;

    async fn add_review(&self, book_id: BookId, review: NewReview) -> Result<Review, CatalogError>;
    async fn list_reviews(&self, book_id: BookId) -> Result<Vec<Review>, CatalogError>;
    async fn delete_review(&self, book_id: BookId, review_id: ReviewId)
        -> Result<(), CatalogError>;

    async fn add_shelf(&self, shelf: NewBookshelf) -> Result<Bookshelf, CatalogError>;
    async fn get_shelf(&self, shelf_id: ShelfId) -> Result<Bookshelf, CatalogError>;
    async fn list_shelves(&self) -> Result<Vec<Bookshelf>, CatalogError>;
    async fn add_book_to_shelf(&self, shelf_id: ShelfId, book_id: BookId)
        -> Result<(), CatalogError>;
    async fn remove_book_from_shelf(
        &self,
        shelf_id: ShelfId,
        book_id: BookId,
    ) -> Result<(), CatalogError>;
    async fn shelf_stats(&self, shelf_id: ShelfId) -> Result<ShelfStats, CatalogError>;
}
