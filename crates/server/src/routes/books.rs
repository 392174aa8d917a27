use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;
use crate::routes::authors::AuthorDto;
use service::book_service::{self, AuthorRef, BookInput, BookWithRelations};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookDto {
    pub isbn: String,
    pub name: String,
    pub publication_year: Option<NaiveDate>,
    #[serde(default)]
    pub age_limit: f32,
    pub publishing_company: String,
    #[serde(default)]
    pub page_count: i32,
    pub language: Option<String>,
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub count_of_books: i32,
    #[serde(default)]
    pub authors: Vec<AuthorDto>,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub sort_column: Option<String>,
    pub sort_order: Option<String>,
}

fn to_dto(entry: &BookWithRelations) -> BookDto {
    BookDto {
        isbn: entry.book.isbn.clone(),
        name: entry.book.name.clone(),
        publication_year: entry.book.publication_year,
        age_limit: entry.book.age_limit,
        publishing_company: entry.book.publishing_company.clone(),
        page_count: entry.book.page_count,
        language: entry.book.language.clone(),
        cost: entry.book.cost,
        count_of_books: entry.book.count_of_books,
        authors: entry.authors.iter().map(crate::routes::authors::to_dto).collect(),
        genres: entry.genres.iter().map(|s| s.name.clone()).collect(),
    }
}

fn to_input(dto: BookDto) -> BookInput {
    BookInput {
        isbn: dto.isbn,
        name: dto.name,
        publication_year: dto.publication_year,
        age_limit: dto.age_limit,
        publishing_company: dto.publishing_company,
        page_count: dto.page_count,
        language: dto.language,
        cost: dto.cost,
        count_of_books: dto.count_of_books,
        authors: dto
            .authors
            .into_iter()
            .map(|a| AuthorRef {
                id: a.id,
                fio: Some(a.fio),
                birth_date: a.birth_date,
                country: a.country,
                nickname: a.nickname,
            })
            .collect(),
        genres: dto.genres,
    }
}

#[utoipa::path(post, path = "/api/books", tag = "books", request_body = BookDto, responses((status = 201, body = BookDto), (status = 400, description = "Bad Request"), (status = 404, description = "Referenced author missing"), (status = 409, description = "ISBN already exists")))]
pub async fn create_book(
    State(state): State<ServerState>,
    Json(dto): Json<BookDto>,
) -> Result<(StatusCode, Json<BookDto>), ApiError> {
    let created = book_service::create_book(&state.db, to_input(dto)).await?;
    Ok((StatusCode::CREATED, Json(to_dto(&created))))
}

#[utoipa::path(get, path = "/api/books/{isbn}", tag = "books", params(("isbn" = String, Path, description = "Book ISBN")), responses((status = 200, body = BookDto), (status = 404, description = "Not Found")))]
pub async fn get_book(
    State(state): State<ServerState>,
    Path(isbn): Path<String>,
) -> Result<Json<BookDto>, StatusCode> {
    match book_service::get_book(&state.db, &isbn).await {
        Ok(Some(found)) => Ok(Json(to_dto(&found))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

#[utoipa::path(get, path = "/api/books", tag = "books", params(("search" = Option<String>, Query, description = "Name substring, case-insensitive"), ("sort_column" = Option<String>, Query, description = "name, publication_year, publishing_company, count_of_books, isbn or author"), ("sort_order" = Option<String>, Query, description = "asc or desc")), responses((status = 200, body = [BookDto])))]
pub async fn list_books(
    State(state): State<ServerState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<BookDto>>, ApiError> {
    let books = book_service::get_all_books(
        &state.db,
        params.search.as_deref(),
        params.sort_column.as_deref(),
        params.sort_order.as_deref(),
    )
    .await?;
    Ok(Json(books.iter().map(to_dto).collect()))
}

#[utoipa::path(put, path = "/api/books/{isbn}", tag = "books", params(("isbn" = String, Path, description = "Book ISBN")), request_body = BookDto, responses((status = 200, body = BookDto), (status = 404, description = "Not Found")))]
pub async fn update_book(
    State(state): State<ServerState>,
    Path(isbn): Path<String>,
    Json(dto): Json<BookDto>,
) -> Result<Json<BookDto>, ApiError> {
    let updated = book_service::update_book(&state.db, &isbn, to_input(dto)).await?;
    Ok(Json(to_dto(&updated)))
}

#[utoipa::path(delete, path = "/api/books/{isbn}", tag = "books", params(("isbn" = String, Path, description = "Book ISBN")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete_book(
    State(state): State<ServerState>,
    Path(isbn): Path<String>,
) -> Result<StatusCode, ApiError> {
    book_service::delete_book(&state.db, &isbn).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(delete, path = "/api/books/bulk-delete", tag = "books", request_body = Vec<String>, responses((status = 204, description = "Deleted"), (status = 404, description = "Some ISBN missing")))]
pub async fn bulk_delete_books(
    State(state): State<ServerState>,
    Json(isbns): Json<Vec<String>>,
) -> Result<StatusCode, ApiError> {
    book_service::delete_books(&state.db, isbns).await?;
    Ok(StatusCode::NO_CONTENT)
}
