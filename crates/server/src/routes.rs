use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

pub mod auth;
pub mod authors;
pub mod authorships;
pub mod book_styles;
pub mod books;
pub mod csv;
pub mod publishing_companies;
pub mod styles;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router. Everything under `/api` except the auth
/// endpoints sits behind the bearer-token middleware.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = Router::new()
        // authors
        .route("/api/authors", post(authors::create_author).get(authors::list_authors))
        .route("/api/authors/search", get(authors::search_authors))
        .route("/api/authors/bulk-delete", delete(authors::bulk_delete_authors))
        .route(
            "/api/authors/:id",
            get(authors::get_author).put(authors::update_author).delete(authors::delete_author),
        )
        // books
        .route("/api/books", post(books::create_book).get(books::list_books))
        .route("/api/books/bulk-delete", delete(books::bulk_delete_books))
        .route(
            "/api/books/:isbn",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        // publishing companies
        .route(
            "/api/publishing-companies",
            post(publishing_companies::create_company).get(publishing_companies::list_companies),
        )
        .route("/api/publishing-companies/search", get(publishing_companies::search_companies))
        .route(
            "/api/publishing-companies/bulk-delete",
            delete(publishing_companies::bulk_delete_companies),
        )
        .route(
            "/api/publishing-companies/:name",
            get(publishing_companies::get_company)
                .put(publishing_companies::update_company)
                .delete(publishing_companies::delete_company),
        )
        // styles
        .route("/api/styles", post(styles::create_style).get(styles::list_styles))
        .route("/api/styles/search", get(styles::search_styles))
        .route(
            "/api/styles/:id",
            get(styles::get_style).put(styles::update_style).delete(styles::delete_style),
        )
        // authorships
        .route(
            "/api/authorships",
            post(authorships::create_authorship).get(authorships::list_authorships),
        )
        .route(
            "/api/authorships/:isbn/:author_id",
            get(authorships::get_authorship)
                .put(authorships::update_authorship)
                .delete(authorships::delete_authorship),
        )
        // book styles
        .route(
            "/api/book-styles",
            post(book_styles::create_book_style).get(book_styles::list_book_styles),
        )
        .route(
            "/api/book-styles/:isbn/:style_id",
            get(book_styles::get_book_style)
                .put(book_styles::update_book_style)
                .delete(book_styles::delete_book_style),
        )
        // csv
        .route("/api/csv/export", post(csv::export_csv))
        .route("/api/csv/import", post(csv::import_csv))
        // auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi()),
        )
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, auth::require_bearer_token))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
