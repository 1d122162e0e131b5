use crate::api::{
    BookId, Bookshelf, NewBookshelf, ShelfCreated, ShelfId, ShelfStats, StatusMessage,
};
use crate::client::transport::{RequestError, RequestOptions, Transport};

/// Operations on `/bookshelves`
pub struct ShelvesClient<'a> {
    transport: &'a Transport,
}

impl<'a> ShelvesClient<'a> {
    pub(crate) fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    /// Calls GET /bookshelves
    pub async fn list(&self) -> Result<Vec<Bookshelf>, RequestError> {
        self.transport
            .request("/bookshelves", RequestOptions::default())
            .await
    }

    /// Calls GET /bookshelves/{shelf_id}
    pub async fn get(&self, shelf_id: ShelfId) -> Result<Bookshelf, RequestError> {
        self.transport
            .request(&format!("/bookshelves/{shelf_id}"), RequestOptions::default())
            .await
    }

    /// Calls POST /bookshelves with `{name, owner}`
    pub async fn create(&self, name: &str, owner: &str) -> Result<ShelfCreated, RequestError> {
        let shelf = NewBookshelf {
            name: name.to_string(),
            owner: owner.to_string(),
        };
        self.transport
            .request("/bookshelves", RequestOptions::post().json(&shelf)?)
            .await
    }

    /// Calls POST /bookshelves/{shelf_id}/books/{book_id}
    pub async fn add_book(
        &self,
        shelf_id: ShelfId,
        book_id: BookId,
    ) -> Result<StatusMessage, RequestError> {
        self.transport
            .request(
                &format!("/bookshelves/{shelf_id}/books/{book_id}"),
                RequestOptions::post(),
            )
            .await
    }

    /// Calls DELETE /bookshelves/{shelf_id}/books/{book_id}
    pub async fn remove_book(
        &self,
        shelf_id: ShelfId,
        book_id: BookId,
    ) -> Result<StatusMessage, RequestError> {
        self.transport
            .request(
                &format!("/bookshelves/{shelf_id}/books/{book_id}"),
                RequestOptions::delete(),
            )
            .await
    }

    /// Calls GET /bookshelves/{shelf_id}/stats
    pub async fn stats(&self, shelf_id: ShelfId) -> Result<ShelfStats, RequestError> {
        self.transport
            .request(
                &format!("/bookshelves/{shelf_id}/stats"),
                RequestOptions::default(),
            )
            .await
    }
}
