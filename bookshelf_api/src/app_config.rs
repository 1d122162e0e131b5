use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::error::InternalError;
use actix_web::{web, App, HttpResponse, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::api::ErrorDetail;
use crate::catalog_repository::CatalogRepository;
use crate::handlers;

/// Answers an extractor failure with 422 and a `detail` like every other failure
fn unprocessable<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let response = HttpResponse::UnprocessableEntity().json(ErrorDetail {
        detail: err.to_string(),
    });
    InternalError::from_response(err, response).into()
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| unprocessable(err))
}

/// Covers malformed filters such as `?limit=abc`
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| unprocessable(err))
}

/// Covers ids that are not numbers such as `/books/abc`
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| unprocessable(err))
}

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/books")
                .service(
                    web::resource("")
                        .route(web::get().to(handlers::list_books))
                        .route(web::post().to(handlers::add_book)),
                )
                .service(
                    web::scope("/{book_id}")
                        .service(
                            web::resource("")
                                .route(web::get().to(handlers::get_book))
                                .route(web::put().to(handlers::update_book))
                                .route(web::delete().to(handlers::delete_book)),
                        )
                        .service(
                            web::resource("/reviews")
                                .route(web::get().to(handlers::list_reviews))
                                .route(web::post().to(handlers::add_review)),
                        )
                        .service(
                            web::resource("/reviews/{review_id}")
                                .route(web::delete().to(handlers::delete_review)),
                        ),
                ),
        )
        .service(
            web::scope("/bookshelves")
                .service(
                    web::resource("")
                        .route(web::get().to(handlers::list_shelves))
                        .route(web::post().to(handlers::add_shelf)),
                )
                .service(
                    web::scope("/{shelf_id}")
                        .service(web::resource("").route(web::get().to(handlers::get_shelf)))
                        .service(
                            web::resource("/books/{book_id}")
                                .route(web::post().to(handlers::add_book_to_shelf))
                                .route(web::delete().to(handlers::remove_book_from_shelf)),
                        )
                        .service(
                            web::resource("/stats").route(web::get().to(handlers::shelf_stats)),
                        ),
                ),
        );
}

/// Serves the catalogue on an already bound listener, the returned server has to be awaited or spawned
pub fn run(
    listener: TcpListener,
    catalog: Arc<dyn CatalogRepository + Send + Sync>,
) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(catalog.clone()))
            .wrap(TracingLogger::default())
            .configure(config_app)
    })
    .listen(listener)?
    .run();
    Ok(server)
}
