use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::books::create_book,
        crate::routes::books::get_book,
        crate::routes::books::list_books,
        crate::routes::books::update_book,
        crate::routes::books::delete_book,
        crate::routes::books::bulk_delete_books,
        crate::routes::csv::export_csv,
        crate::routes::csv::import_csv,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            crate::routes::books::BookDto,
            crate::routes::authors::AuthorDto,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "books"),
        (name = "csv"),
    )
)]
pub struct ApiDoc;
