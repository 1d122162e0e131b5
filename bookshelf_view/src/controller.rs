use std::rc::Rc;

use bookshelf_api::api::{BookFilter, BookId, NewBook, ShelfId};
use bookshelf_api::client::{BookshelfClient, RequestError};

use crate::dom::{Alert, Confirmer, Listener, Modal, Notifier, Tab, ViewAction, ViewElements};
use crate::templates;

/// Books offered when adding to a shelf
const SHELF_PICKER_LIMIT: u32 = 100;

/// Turns user actions into requests and responses into rendered content.
/// Failures end here: they are logged and shown, never propagated
pub struct ViewController {
    client: BookshelfClient,
    elements: ViewElements,
    notifier: Rc<dyn Notifier>,
    confirmer: Rc<dyn Confirmer>,
}

impl ViewController {
    pub fn new(
        client: BookshelfClient,
        elements: ViewElements,
        notifier: Rc<dyn Notifier>,
        confirmer: Rc<dyn Confirmer>,
    ) -> Self {
        Self {
            client,
            elements,
            notifier,
            confirmer,
        }
    }

    pub fn elements(&self) -> &ViewElements {
        &self.elements
    }

    /// Listeners the page binds once to its static controls
    pub fn page_listeners(&self) -> Vec<Listener> {
        templates::page_listeners()
    }

    /// Initial page load
    pub async fn start(&self) {
        self.load_books().await;
    }

    pub async fn handle(&self, action: ViewAction) {
        tracing::debug!("Handling {:?}", action);
        match action {
            ViewAction::SwitchTab(tab) => self.switch_tab(tab).await,
            ViewAction::SubmitBook => self.add_book().await,
            ViewAction::FilterBooks => self.filter_books().await,
            ViewAction::ClearFilter => self.clear_filter().await,
            ViewAction::CreateShelf => self.create_shelf().await,
            ViewAction::ShowBookDetails(book_id) => self.show_book_details(book_id).await,
            ViewAction::DeleteBook(book_id) => self.delete_book(book_id).await,
            ViewAction::ShowShelfDetails(shelf_id) => self.show_shelf_details(shelf_id).await,
            ViewAction::ShowAddBookToShelf(shelf_id) => self.show_add_book_to_shelf(shelf_id).await,
            ViewAction::AddBookToShelf { shelf_id, book_id } => {
                self.add_book_to_shelf(shelf_id, book_id).await
            }
            ViewAction::RemoveBookFromShelf { shelf_id, book_id } => {
                self.remove_book_from_shelf(shelf_id, book_id).await
            }
            ViewAction::CloseModal(modal) => self.close_modal(modal),
        }
    }

    fn success(&self, message: &str) {
        self.notifier.notify(Alert::success(message));
    }

    fn failure(&self, context: &str, error: &RequestError) {
        tracing::warn!("{}: {}", context, error);
        self.notifier
            .notify(Alert::error(format!("{context}: {}", error.message())));
    }

    pub async fn switch_tab(&self, tab: Tab) {
        self.elements.tabs.activate(tab);
        match tab {
            Tab::Books => self.load_books().await,
            Tab::Bookshelves => self.load_bookshelves().await,
            Tab::AddBook => {}
        }
    }

    pub fn close_modal(&self, modal: Modal) {
        match modal {
            Modal::Book => self.elements.book_modal.set_visible(false),
            Modal::Shelf => self.elements.shelf_modal.set_visible(false),
        }
    }

    pub async fn load_books(&self) {
        self.render_books(
            &BookFilter::default(),
            "Loading books...",
            "No books found. Add one to get started!",
            "Error loading books",
        )
        .await;
    }

    pub async fn filter_books(&self) {
        let filter = BookFilter {
            author: Some(self.elements.author_filter.value().trim().to_string()),
            genre: Some(self.elements.genre_filter.value().trim().to_string()),
            ..BookFilter::default()
        };
        self.render_books(
            &filter,
            "Filtering books...",
            "No books match your filters.",
            "Error filtering books",
        )
        .await;
    }

    pub async fn clear_filter(&self) {
        self.elements.author_filter.set_value("");
        self.elements.genre_filter.set_value("");
        self.load_books().await;
    }

    async fn render_books(&self, filter: &BookFilter, loading: &str, empty: &str, failed: &str) {
        let books_list = &self.elements.books_list;
        books_list.set_content(templates::loading(loading));
        match self.client.books().list(filter).await {
            Ok(books) if books.is_empty() => books_list.set_content(templates::notice(empty)),
            Ok(books) => books_list.set_content(templates::book_cards(&books)),
            Err(err) => {
                tracing::warn!("{}: {}", failed, err);
                books_list.set_content(templates::inline_error(failed, &err))
            }
        }
    }

    pub async fn load_bookshelves(&self) {
        let shelves_list = &self.elements.shelves_list;
        shelves_list.set_content(templates::loading("Loading bookshelves..."));
        match self.client.shelves().list().await {
            Ok(shelves) if shelves.is_empty() => {
                shelves_list.set_content(templates::notice("No bookshelves yet. Create one!"))
            }
            Ok(shelves) => shelves_list.set_content(templates::shelf_cards(&shelves)),
            Err(err) => {
                tracing::warn!("Error loading bookshelves: {}", err);
                shelves_list.set_content(templates::inline_error(
                    "Error loading bookshelves",
                    &err,
                ))
            }
        }
    }

    /// Reads the add-book form, the error is the message shown to the user
    fn read_book_form(&self) -> Result<NewBook, String> {
        let form = &self.elements.book_form;
        let title = form.title.value();
        let author = form.author.value();
        let isbn = form.isbn.value();
        let genre = form.genre.value();
        let year = form.publication_year.value();
        let pages = form.pages.value();
        if [&title, &author, &isbn, &genre, &year, &pages]
            .iter()
            .any(|value| value.trim().is_empty())
        {
            return Err("Please fill in all required book fields".to_string());
        }
        let publication_year = year
            .trim()
            .parse()
            .map_err(|_| "Publication year must be a whole number".to_string())?;
        let pages = pages
            .trim()
            .parse()
            .map_err(|_| "Pages must be a whole number".to_string())?;
        let description = form.description.value();
        Ok(NewBook {
            title,
            author,
            isbn,
            publication_year,
            pages,
            genre,
            description: (!description.is_empty()).then_some(description),
        })
    }

    pub async fn add_book(&self) {
        let book = match self.read_book_form() {
            Ok(book) => book,
            Err(message) => {
                self.notifier.notify(Alert::error(message));
                return;
            }
        };
        match self.client.books().create(&book).await {
            Ok(_) => {
                self.success("Book added successfully!");
                self.elements.book_form.reset();
                self.load_books().await;
            }
            Err(err) => self.failure("Error adding book", &err),
        }
    }

    pub async fn delete_book(&self, book_id: BookId) {
        if !self
            .confirmer
            .confirm("Are you sure you want to delete this book?")
        {
            return;
        }
        match self.client.books().delete(book_id).await {
            Ok(_) => {
                self.success("Book deleted successfully!");
                self.load_books().await;
            }
            Err(err) => self.failure("Error deleting book", &err),
        }
    }

    pub async fn show_book_details(&self, book_id: BookId) {
        let body = &self.elements.book_modal_body;
        body.set_content(templates::loading("Loading book details..."));
        match self.client.books().get(book_id).await {
            Ok(book) => {
                body.set_content(templates::book_details(&book));
                self.elements.book_modal.set_visible(true);
            }
            Err(err) => {
                body.set_content(templates::inline_error("Error loading book details", &err));
                self.failure("Error loading book details", &err)
            }
        }
    }

    pub async fn create_shelf(&self) {
        let name = self.elements.shelf_name.value().trim().to_string();
        let owner = self.elements.shelf_owner.value().trim().to_string();
        if name.is_empty() || owner.is_empty() {
            self.notifier
                .notify(Alert::error("Please enter both shelf name and owner"));
            return;
        }
        match self.client.shelves().create(&name, &owner).await {
            Ok(_) => {
                self.success("Bookshelf created successfully!");
                self.elements.shelf_name.set_value("");
                self.elements.shelf_owner.set_value("");
                self.load_bookshelves().await;
            }
            Err(err) => self.failure("Error creating shelf", &err),
        }
    }

    pub async fn show_shelf_details(&self, shelf_id: ShelfId) {
        let body = &self.elements.shelf_modal_body;
        body.set_content(templates::loading("Loading shelf details..."));
        let shelves = self.client.shelves();
        let details = match shelves.get(shelf_id).await {
            Ok(shelf) => shelves.stats(shelf_id).await.map(|stats| (shelf, stats)),
            Err(err) => Err(err),
        };
        match details {
            Ok((shelf, stats)) => {
                body.set_content(templates::shelf_details(&shelf, &stats));
                self.elements.shelf_modal.set_visible(true);
            }
            Err(err) => {
                body.set_content(templates::inline_error("Error loading shelf details", &err));
                self.failure("Error loading shelf details", &err)
            }
        }
    }

    pub async fn show_add_book_to_shelf(&self, shelf_id: ShelfId) {
        let body = &self.elements.shelf_modal_body;
        body.set_content(templates::loading("Loading books..."));
        let picked = match self
            .client
            .books()
            .list(&BookFilter::default().with_limit(SHELF_PICKER_LIMIT))
            .await
        {
            Ok(books) => self
                .client
                .shelves()
                .get(shelf_id)
                .await
                .map(|shelf| (books, shelf)),
            Err(err) => Err(err),
        };
        let (books, shelf) = match picked {
            Ok(picked) => picked,
            Err(err) => {
                body.set_content(templates::inline_error("Error loading books", &err));
                return self.failure("Error loading books", &err);
            }
        };

        let available: Vec<_> = books.iter().filter(|book| !shelf.contains(book.id)).collect();
        if available.is_empty() {
            body.set_content(templates::notice("All books are already in this shelf!"));
            self.notifier
                .notify(Alert::error("All books are already in this shelf!"));
            return;
        }
        body.set_content(templates::shelf_picker(&shelf, &available));
        self.elements.shelf_modal.set_visible(true);
    }

    pub async fn add_book_to_shelf(&self, shelf_id: ShelfId, book_id: BookId) {
        match self.client.shelves().add_book(shelf_id, book_id).await {
            Ok(_) => {
                self.success("Book added to shelf!");
                self.elements.shelf_modal.set_visible(false);
                self.load_bookshelves().await;
            }
            Err(err) => self.failure("Error adding book to shelf", &err),
        }
    }

    pub async fn remove_book_from_shelf(&self, shelf_id: ShelfId, book_id: BookId) {
        if !self.confirmer.confirm("Remove this book from the shelf?") {
            return;
        }
        match self.client.shelves().remove_book(shelf_id, book_id).await {
            Ok(_) => {
                self.success("Book removed from shelf!");
                self.load_bookshelves().await;
                self.elements.shelf_modal.set_visible(false);
            }
            Err(err) => self.failure("Error removing book", &err),
        }
    }
}
