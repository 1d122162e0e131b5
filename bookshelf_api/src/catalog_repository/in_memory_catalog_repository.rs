use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::SecondsFormat;
use serde_json::json;

use crate::api::{
    Book, BookFilter, BookId, BookPatch, Bookshelf, NewBook, NewBookshelf, NewReview, Review,
    ReviewId, ShelfId, ShelfStats,
};
use crate::catalog_repository::{CatalogError, CatalogRepository, DEFAULT_LIMIT, MAX_LIMIT};

struct StoredShelf {
    id: ShelfId,
    name: String,
    owner: String,
    created_at: String,
    /// In the order the books were added
    book_ids: Vec<BookId>,
}

struct StoredReview {
    book_id: BookId,
    review: Review,
}

#[derive(Default)]
struct CatalogState {
    books: BTreeMap<BookId, Book>,
    reviews: BTreeMap<ReviewId, StoredReview>,
    shelves: BTreeMap<ShelfId, StoredShelf>,
}

impl CatalogState {
    fn book(&self, book_id: BookId) -> Result<Book, CatalogError> {
        let mut book = self
            .books
            .get(&book_id)
            .cloned()
            .ok_or(CatalogError::BookNotFound(book_id))?;
        book.reviews = self.reviews_of(book_id);
        Ok(book)
    }

    fn reviews_of(&self, book_id: BookId) -> Vec<Review> {
        self.reviews
            .values()
            .filter(|stored| stored.book_id == book_id)
            .map(|stored| stored.review.clone())
            .collect()
    }

    fn shelf(&self, shelf_id: ShelfId) -> Result<Bookshelf, CatalogError> {
        let stored = self
            .shelves
            .get(&shelf_id)
            .ok_or(CatalogError::ShelfNotFound(shelf_id))?;
        Ok(Bookshelf {
            id: stored.id,
            name: stored.name.clone(),
            owner: stored.owner.clone(),
            books: stored
                .book_ids
                .iter()
                .filter_map(|book_id| self.book(*book_id).ok())
                .collect(),
            created_at: stored.created_at.clone(),
        })
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn matches(field: &str, filter: &Option<String>) -> bool {
    filter
        .as_deref()
        .filter(|wanted| !wanted.is_empty())
        .map(|wanted| field.to_lowercase().contains(&wanted.to_lowercase()))
        .unwrap_or(true)
}

fn validate_book(book: &NewBook) -> Result<(), CatalogError> {
    validate_fields(&book.title, &book.author, &book.genre, &book.isbn, book.pages)
}

fn validate_fields(
    title: &str,
    author: &str,
    genre: &str,
    isbn: &str,
    pages: i32,
) -> Result<(), CatalogError> {
    let required = [("title", title), ("author", author), ("genre", genre)];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(CatalogError::Invalid(format!("{field} must not be empty")));
    }
    if !(10..=13).contains(&isbn.len()) {
        return Err(CatalogError::Invalid(
            "isbn must be between 10 and 13 characters".to_string(),
        ));
    }
    if pages <= 0 {
        return Err(CatalogError::Invalid(
            "pages must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Catalogue kept in process memory, used for tests and local runs of the service
pub struct InMemoryCatalogRepository {
    book_sequence_generator: AtomicI64,
    review_sequence_generator: AtomicI64,
    shelf_sequence_generator: AtomicI64,
    state: parking_lot::RwLock<CatalogState>,
}

impl Default for InMemoryCatalogRepository {
    fn default() -> Self {
        Self {
            book_sequence_generator: Default::default(),
            review_sequence_generator: Default::default(),
            shelf_sequence_generator: Default::default(),
            state: Default::default(),
        }
    }
}

impl InMemoryCatalogRepository {
    /// Two classics and a shelf holding both of them
    pub async fn with_sample_data() -> Result<Self, CatalogError> {
        let repository = Self::default();
        let gatsby = repository
            .add_book(NewBook {
                title: "The Great Gatsby".to_string(),
                author: "F. Scott Fitzgerald".to_string(),
                isbn: "9780743273565".to_string(),
                publication_year: 1925,
                pages: 180,
                genre: "Fiction".to_string(),
                description: Some("A classic American novel set in the Jazz Age.".to_string()),
            })
            .await?;
        let mockingbird = repository
            .add_book(NewBook {
                title: "To Kill a Mockingbird".to_string(),
                author: "Harper Lee".to_string(),
                isbn: "9780061120084".to_string(),
                publication_year: 1960,
                pages: 281,
                genre: "Fiction".to_string(),
                description: Some(
                    "A gripping tale of racial injustice in the American South.".to_string(),
                ),
            })
            .await?;
        let shelf = repository
            .add_shelf(NewBookshelf {
                name: "My Reading Collection".to_string(),
                owner: "John Doe".to_string(),
            })
            .await?;
        repository.add_book_to_shelf(shelf.id, gatsby.id).await?;
        repository
            .add_book_to_shelf(shelf.id, mockingbird.id)
            .await?;
        Ok(repository)
    }

    fn next_id(generator: &AtomicI64) -> i64 {
        generator.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[async_trait::async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn add_book(&self, book: NewBook) -> Result<Book, CatalogError> {
        validate_book(&book)?;
        let mut state = self.state.write();
        if state.books.values().any(|existing| existing.isbn == book.isbn) {
            return Err(CatalogError::DuplicateIsbn);
        }
        let created_at = now();
        let stored = Book {
            id: Self::next_id(&self.book_sequence_generator),
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            publication_year: book.publication_year,
            pages: book.pages,
            genre: book.genre,
            description: book.description,
            created_at: created_at.clone(),
            updated_at: Some(created_at),
            reviews: vec![],
        };
        state.books.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_book(&self, book_id: BookId, patch: BookPatch) -> Result<Book, CatalogError> {
        let mut state = self.state.write();
        let book = state
            .books
            .get(&book_id)
            .ok_or(CatalogError::BookNotFound(book_id))?;
        let mut result_book = json!(book);
        json_patch::merge(&mut result_book, &json!(patch));
        let mut result_book: Book = serde_json::from_value(result_book)?;
        validate_fields(
            &result_book.title,
            &result_book.author,
            &result_book.genre,
            &result_book.isbn,
            result_book.pages,
        )?;
        if state
            .books
            .values()
            .any(|other| other.id != book_id && other.isbn == result_book.isbn)
        {
            return Err(CatalogError::DuplicateIsbn);
        }
        result_book.updated_at = Some(now());
        state.books.insert(book_id, result_book);
        state.book(book_id)
    }

    async fn get_book(&self, book_id: BookId) -> Result<Book, CatalogError> {
        self.state.read().book(book_id)
    }

    async fn list_books(&self, filter: BookFilter) -> Result<Vec<Book>, CatalogError> {
        let limit = filter.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(CatalogError::Invalid(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        let state = self.state.read();
        Ok(state
            .books
            .values()
            .filter(|book| matches(&book.genre, &filter.genre))
            .filter(|book| matches(&book.author, &filter.author))
            .skip(filter.skip.unwrap_or_default() as usize)
            .take(limit as usize)
            .map(|book| Book {
                reviews: state.reviews_of(book.id),
                ..book.clone()
            })
            .collect())
    }

    async fn delete_book(&self, book_id: BookId) -> Result<(), CatalogError> {
        let mut state = self.state.write();
        state
            .books
            .remove(&book_id)
            .ok_or(CatalogError::BookNotFound(book_id))?;
        state.reviews.retain(|_, stored| stored.book_id != book_id);
        for shelf in state.shelves.values_mut() {
            shelf.book_ids.retain(|id| *id != book_id);
        }
        Ok(())
    }

    async fn add_review(&self, book_id: BookId, review: NewReview) -> Result<Review, CatalogError> {
        if !(0.0..=5.0).contains(&review.rating) {
            return Err(CatalogError::Invalid(
                "Rating must be between 0 and 5".to_string(),
            ));
        }
        let mut state = self.state.write();
        if !state.books.contains_key(&book_id) {
            return Err(CatalogError::BookNotFound(book_id));
        }
        let stored = Review {
            id: Self::next_id(&self.review_sequence_generator),
            reviewer: review.reviewer,
            rating: review.rating,
            comment: review.comment,
            created_at: now(),
        };
        state.reviews.insert(
            stored.id,
            StoredReview {
                book_id,
                review: stored.clone(),
            },
        );
        Ok(stored)
    }

    async fn list_reviews(&self, book_id: BookId) -> Result<Vec<Review>, CatalogError> {
        let state = self.state.read();
        if !state.books.contains_key(&book_id) {
            return Err(CatalogError::BookNotFound(book_id));
        }
        Ok(state.reviews_of(book_id))
    }

    async fn delete_review(
        &self,
        book_id: BookId,
        review_id: ReviewId,
    ) -> Result<(), CatalogError> {
        let mut state = self.state.write();
        match state.reviews.get(&review_id) {
            Some(stored) if stored.book_id == book_id => {
                state.reviews.remove(&review_id);
                Ok(())
            }
            _ => Err(CatalogError::ReviewNotFound { book_id, review_id }),
        }
    }

    async fn add_shelf(&self, shelf: NewBookshelf) -> Result<Bookshelf, CatalogError> {
        let mut state = self.state.write();
        let id = Self::next_id(&self.shelf_sequence_generator);
        state.shelves.insert(
            id,
            StoredShelf {
                id,
                name: shelf.name,
                owner: shelf.owner,
                created_at: now(),
                book_ids: vec![],
            },
        );
        state.shelf(id)
    }

    async fn get_shelf(&self, shelf_id: ShelfId) -> Result<Bookshelf, CatalogError> {
        self.state.read().shelf(shelf_id)
    }

    async fn list_shelves(&self) -> Result<Vec<Bookshelf>, CatalogError> {
        let state = self.state.read();
        state
            .shelves
            .keys()
            .map(|shelf_id| state.shelf(*shelf_id))
            .collect()
    }

    async fn add_book_to_shelf(
        &self,
        shelf_id: ShelfId,
        book_id: BookId,
    ) -> Result<(), CatalogError> {
        let mut state = self.state.write();
        let book_exists = state.books.contains_key(&book_id);
        let shelf = state
            .shelves
            .get_mut(&shelf_id)
            .ok_or(CatalogError::ShelfNotFound(shelf_id))?;
        if !book_exists {
            return Err(CatalogError::BookNotFound(book_id));
        }
        if shelf.book_ids.contains(&book_id) {
            return Err(CatalogError::AlreadyOnShelf);
        }
        shelf.book_ids.push(book_id);
        Ok(())
    }

    async fn remove_book_from_shelf(
        &self,
        shelf_id: ShelfId,
        book_id: BookId,
    ) -> Result<(), CatalogError> {
        let mut state = self.state.write();
        let shelf = state
            .shelves
            .get_mut(&shelf_id)
            .ok_or(CatalogError::ShelfNotFound(shelf_id))?;
        let position = shelf
            .book_ids
            .iter()
            .position(|id| *id == book_id)
            .ok_or(CatalogError::NotOnShelf)?;
        shelf.book_ids.remove(position);
        Ok(())
    }

    async fn shelf_stats(&self, shelf_id: ShelfId) -> Result<ShelfStats, CatalogError> {
        let shelf = self.state.read().shelf(shelf_id)?;
        if shelf.books.is_empty() {
            return Ok(ShelfStats {
                bookshelf_id: shelf_id,
                bookshelf_name: None,
                total_books: 0,
                total_pages: 0,
                avg_pages: 0.0,
                genres: Default::default(),
            });
        }

        let mut genres: BTreeMap<String, u64> = Default::default();
        for book in shelf.books.iter() {
            *genres.entry(book.genre.clone()).or_default() += 1;
        }
        let total_books = shelf.books.len() as u64;
        let total_pages: u64 = shelf.books.iter().map(|book| book.pages.max(0) as u64).sum();
        let avg_pages = (total_pages as f64 / total_books as f64 * 100.0).round() / 100.0;

        Ok(ShelfStats {
            bookshelf_id: shelf_id,
            bookshelf_name: Some(shelf.name),
            total_books,
            total_pages,
            avg_pages,
            genres,
        })
    }
}
