use crate::api::{
    Book, BookDeleted, BookFilter, BookId, BookPatch, NewBook, NewReview, Review, ReviewDeleted,
    ReviewId,
};
use crate::client::transport::{RequestError, RequestOptions, Transport};

/// Path of the listing endpoint, the query string is only added when a filter is set
pub fn list_path(filter: &BookFilter) -> String {
    let query = filter.to_query_string();
    if query.is_empty() {
        "/books".to_string()
    } else {
        format!("/books?{query}")
    }
}

/// Operations on `/books`
pub struct BooksClient<'a> {
    transport: &'a Transport,
}

impl<'a> BooksClient<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// Calls GET /books with the filters that are set
    pub async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>, RequestError> {
        self.transport
            .request(&list_path(filter), RequestOptions::default())
            .await
    }

    /// Calls GET /books/{book_id}
    pub async fn get(&self, book_id: BookId) -> Result<Book, RequestError> {
        self.transport
            .request(&format!("/books/{book_id}"), RequestOptions::default())
            .await
    }

    /// Calls POST /books, returns the book with the id assigned by the service
    pub async fn create(&self, book: &NewBook) -> Result<Book, RequestError> {
        self.transport
            .request("/books", RequestOptions::post().json(book)?)
            .await
    }

    /// Calls PUT /books/{book_id}
    pub async fn update(&self, book_id: BookId, patch: &BookPatch) -> Result<Book, RequestError> {
        self.transport
            .request(&format!("/books/{book_id}"), RequestOptions::put().json(patch)?)
            .await
    }

    /// Calls DELETE /books/{book_id}
    pub async fn delete(&self, book_id: BookId) -> Result<BookDeleted, RequestError> {
        self.transport
            .request(&format!("/books/{book_id}"), RequestOptions::delete())
            .await
    }

    /// Calls GET /books/{book_id}/reviews
    pub async fn list_reviews(&self, book_id: BookId) -> Result<Vec<Review>, RequestError> {
        self.transport
            .request(
                &format!("/books/{book_id}/reviews"),
                RequestOptions::default(),
            )
            .await
    }

    /// Calls POST /books/{book_id}/reviews
    pub async fn create_review(
        &self,
        book_id: BookId,
        review: &NewReview,
    ) -> Result<Review, RequestError> {
        self.transport
            .request(
                &format!("/books/{book_id}/reviews"),
                RequestOptions::post().json(review)?,
            )
            .await
    }

    /// Calls DELETE /books/{book_id}/reviews/{review_id}
    pub async fn delete_review(
        &self,
        book_id: BookId,
        review_id: ReviewId,
    ) -> Result<ReviewDeleted, RequestError> {
        self.transport
            .request(
                &format!("/books/{book_id}/reviews/{review_id}"),
                RequestOptions::delete(),
            )
            .await
    }
}
