use std::sync::Arc;

use actix_web::web::{self, Data};
use actix_web::HttpResponse;
use serde::Deserialize;

use crate::api::{
    BookDeleted, BookFilter, BookId, BookPatch, ErrorDetail, Health, NewBook, NewBookshelf,
    NewReview, ReviewDeleted, ReviewId, ShelfCreated, ShelfId, StatusMessage,
};
use crate::catalog_repository::{CatalogError, CatalogRepository};

type Catalog = Data<Arc<dyn CatalogRepository + Send + Sync>>;

fn detail(message: String) -> ErrorDetail {
    ErrorDetail { detail: message }
}

/// Every failure is answered with a `{"detail": ...}` body
fn error_response(operation: &str, err: CatalogError) -> HttpResponse {
    match err {
        CatalogError::BookNotFound(_)
        | CatalogError::ShelfNotFound(_)
        | CatalogError::ReviewNotFound { .. }
        | CatalogError::NotOnShelf => HttpResponse::NotFound().json(detail(err.to_string())),
        CatalogError::DuplicateIsbn | CatalogError::AlreadyOnShelf => {
            HttpResponse::BadRequest().json(detail(err.to_string()))
        }
        CatalogError::Invalid(_) => HttpResponse::UnprocessableEntity().json(detail(err.to_string())),
        CatalogError::DeserializationError(_) => {
            tracing::error!("{} failed {}", operation, err);
            HttpResponse::InternalServerError().json(detail("Internal server error".to_string()))
        }
    }
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(Health {
        status: "healthy".to_string(),
        service: "Bookshelf API".to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct BookQuery {
    pub author: Option<String>,
    pub genre: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_books(catalog: Catalog, query: web::Query<BookQuery>) -> HttpResponse {
    let query = query.into_inner();
    let filter = BookFilter {
        author: query.author,
        genre: query.genre,
        skip: query.skip,
        limit: query.limit,
    };
    match catalog.list_books(filter).await {
        Ok(books) => HttpResponse::Ok().json(books),
        Err(err) => error_response("List books", err),
    }
}

pub async fn add_book(catalog: Catalog, book: web::Json<NewBook>) -> HttpResponse {
    match catalog.add_book(book.into_inner()).await {
        Ok(book) => HttpResponse::Created().json(book),
        Err(err) => error_response("Add book", err),
    }
}

pub async fn get_book(catalog: Catalog, book_id: web::Path<BookId>) -> HttpResponse {
    match catalog.get_book(book_id.into_inner()).await {
        Ok(book) => HttpResponse::Ok().json(book),
        Err(err) => error_response("Get book", err),
    }
}

pub async fn update_book(
    catalog: Catalog,
    book_id: web::Path<BookId>,
    patch: web::Json<BookPatch>,
) -> HttpResponse {
    match catalog
        .update_book(book_id.into_inner(), patch.into_inner())
        .await
    {
        Ok(book) => HttpResponse::Ok().json(book),
        Err(err) => error_response("Update book", err),
    }
}

pub async fn delete_book(catalog: Catalog, book_id: web::Path<BookId>) -> HttpResponse {
    let book_id = book_id.into_inner();
    match catalog.delete_book(book_id).await {
        Ok(()) => HttpResponse::Ok().json(BookDeleted {
            message: "Book deleted successfully".to_string(),
            book_id,
        }),
        Err(err) => error_response("Delete book", err),
    }
}

pub async fn list_reviews(catalog: Catalog, book_id: web::Path<BookId>) -> HttpResponse {
    match catalog.list_reviews(book_id.into_inner()).await {
        Ok(reviews) => HttpResponse::Ok().json(reviews),
        Err(err) => error_response("List reviews", err),
    }
}

pub async fn add_review(
    catalog: Catalog,
    book_id: web::Path<BookId>,
    review: web::Json<NewReview>,
) -> HttpResponse {
    match catalog
        .add_review(book_id.into_inner(), review.into_inner())
        .await
    {
        Ok(review) => HttpResponse::Created().json(review),
        Err(err) => error_response("Add review", err),
    }
}

pub async fn delete_review(
    catalog: Catalog,
    path: web::Path<(BookId, ReviewId)>,
) -> HttpResponse {
    let (book_id, review_id) = path.into_inner();
    match catalog.delete_review(book_id, review_id).await {
        Ok(()) => HttpResponse::Ok().json(ReviewDeleted {
            message: "Review deleted successfully".to_string(),
            review_id,
        }),
        Err(err) => error_response("Delete review", err),
    }
}

pub async fn list_shelves(catalog: Catalog) -> HttpResponse {
    match catalog.list_shelves().await {
        Ok(shelves) => HttpResponse::Ok().json(shelves),
        Err(err) => error_response("List bookshelves", err),
    }
}

pub async fn add_shelf(catalog: Catalog, shelf: web::Json<NewBookshelf>) -> HttpResponse {
    match catalog.add_shelf(shelf.into_inner()).await {
        Ok(bookshelf) => HttpResponse::Created().json(ShelfCreated {
            message: "Bookshelf created".to_string(),
            bookshelf,
        }),
        Err(err) => error_response("Add bookshelf", err),
    }
}

pub async fn get_shelf(catalog: Catalog, shelf_id: web::Path<ShelfId>) -> HttpResponse {
    match catalog.get_shelf(shelf_id.into_inner()).await {
        Ok(shelf) => HttpResponse::Ok().json(shelf),
        Err(err) => error_response("Get bookshelf", err),
    }
}

pub async fn add_book_to_shelf(
    catalog: Catalog,
    path: web::Path<(ShelfId, BookId)>,
) -> HttpResponse {
    let (shelf_id, book_id) = path.into_inner();
    match catalog.add_book_to_shelf(shelf_id, book_id).await {
        Ok(()) => HttpResponse::Ok().json(StatusMessage {
            message: "Book added to bookshelf".to_string(),
        }),
        Err(err) => error_response("Add book to bookshelf", err),
    }
}

pub async fn remove_book_from_shelf(
    catalog: Catalog,
    path: web::Path<(ShelfId, BookId)>,
) -> HttpResponse {
    let (shelf_id, book_id) = path.into_inner();
    match catalog.remove_book_from_shelf(shelf_id, book_id).await {
        Ok(()) => HttpResponse::Ok().json(StatusMessage {
            message: "Book removed from bookshelf".to_string(),
        }),
        Err(err) => error_response("Remove book from bookshelf", err),
    }
}

pub async fn shelf_stats(catalog: Catalog, shelf_id: web::Path<ShelfId>) -> HttpResponse {
    match catalog.shelf_stats(shelf_id.into_inner()).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(err) => error_response("Get bookshelf stats", err),
    }
}

#[cfg(test)]
mod handler_tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};

    use crate::app_config::config_app;
    use crate::catalog_repository::{CatalogRepository, InMemoryCatalogRepository};

    fn catalog() -> web::Data<Arc<dyn CatalogRepository + Send + Sync>> {
        let repository: Arc<dyn CatalogRepository + Send + Sync> =
            Arc::new(InMemoryCatalogRepository::default());
        web::Data::new(repository)
    }

    #[actix_web::test]
    async fn test_missing_book_has_detail() {
        let app = test::init_service(App::new().app_data(catalog()).configure(config_app)).await;
        let request = test::TestRequest::get().uri("/books/5").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["detail"], "Book with id 5 not found");
    }

    #[actix_web::test]
    async fn test_stats_of_empty_shelf_report_empty_genres() {
        let app = test::init_service(App::new().app_data(catalog()).configure(config_app)).await;
        let request = test::TestRequest::post()
            .uri("/bookshelves")
            .set_json(serde_json::json!({ "name": "Empty", "owner": "Lee" }))
            .to_request();
        let created: serde_json::Value = test::call_and_read_body_json(&app, request).await;
        let shelf_id = created["bookshelf"]["id"].as_i64().unwrap();

        let request = test::TestRequest::get()
            .uri(&format!("/bookshelves/{shelf_id}/stats"))
            .to_request();
        let stats: serde_json::Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(stats["total_books"], 0);
        assert_eq!(stats["genres"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn test_invalid_limit_is_unprocessable() {
        let app = test::init_service(App::new().app_data(catalog()).configure(config_app)).await;
        let request = test::TestRequest::get().uri("/books?limit=0").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    /// Filters and ids that do not parse are answered with 422 and a detail
    async fn test_malformed_query_and_path_are_unprocessable() {
        let app = test::init_service(App::new().app_data(catalog()).configure(config_app)).await;
        for uri in ["/books?limit=abc", "/books?skip=-1", "/books/abc", "/bookshelves/1/books/x"] {
            let request = if uri.starts_with("/bookshelves") {
                test::TestRequest::post().uri(uri).to_request()
            } else {
                test::TestRequest::get().uri(uri).to_request()
            };
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
            let body: serde_json::Value = test::read_body_json(response).await;
            assert!(
                body["detail"].as_str().is_some_and(|detail| !detail.is_empty()),
                "{uri}"
            );
        }
    }

    #[actix_web::test]
    /// An update may not take another book's ISBN nor drop pages below 1
    async fn test_invalid_update_is_rejected() {
        let app = test::init_service(App::new().app_data(catalog()).configure(config_app)).await;
        for isbn in ["9780000000001", "9780000000002"] {
            let request = test::TestRequest::post()
                .uri("/books")
                .set_json(serde_json::json!({
                    "title": "Title",
                    "author": "Author",
                    "isbn": isbn,
                    "publication_year": 2000,
                    "pages": 10,
                    "genre": "Fiction",
                    "description": null
                }))
                .to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let request = test::TestRequest::put()
            .uri("/books/2")
            .set_json(serde_json::json!({ "isbn": "9780000000001" }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["detail"], "Book with this ISBN already exists");

        let request = test::TestRequest::put()
            .uri("/books/2")
            .set_json(serde_json::json!({ "pages": -5 }))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(body["detail"], "pages must be greater than 0");

        let request = test::TestRequest::get().uri("/books/2").to_request();
        let stored: serde_json::Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(stored["isbn"], "9780000000002");
        assert_eq!(stored["pages"], 10);
    }
}
