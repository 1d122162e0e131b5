pub use books::{list_path, BooksClient};
pub use settings::{ClientSettings, DEFAULT_BASE_URL};
pub use shelves::ShelvesClient;
pub use transport::{RequestError, RequestOptions, Transport};

use crate::api::Health;

mod books;
mod settings;
mod shelves;
mod transport;

/// Entry point of the catalogue API, hands out the `books` and `shelves` namespaces
pub struct BookshelfClient {
    transport: Transport,
}

impl BookshelfClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            transport: Transport::new(url)?,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        Self::new(&settings.base_url)
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn books(&self) -> BooksClient<'_> {
        BooksClient::new(&self.transport)
    }

    pub fn shelves(&self) -> ShelvesClient<'_> {
        ShelvesClient::new(&self.transport)
    }

    /// Calls GET /health
    pub async fn health(&self) -> Result<Health, RequestError> {
        self.transport
            .request("/health", RequestOptions::default())
            .await
    }
}
