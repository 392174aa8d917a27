use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::publishing_company_service;
use crate::styles_service;
use models::{author, authorship, book, book_style, style};

/// Author reference inside a book payload: either an existing id or the
/// fields of an author to create on the fly (fio required then).
#[derive(Debug, Clone, Default)]
pub struct AuthorRef {
    pub id: Option<i32>,
    pub fio: Option<String>,
    pub birth_date: Option<String>,
    pub country: Option<String>,
    pub nickname: Option<String>,
}

/// Full book payload for create and update.
#[derive(Debug, Clone, Default)]
pub struct BookInput {
    pub isbn: String,
    pub name: String,
    pub publication_year: Option<NaiveDate>,
    pub age_limit: f32,
    pub publishing_company: String,
    pub page_count: i32,
    pub language: Option<String>,
    pub cost: Option<Decimal>,
    pub count_of_books: i32,
    pub authors: Vec<AuthorRef>,
    pub genres: Vec<String>,
}

/// A book assembled with its linked authors (ordered by author id) and
/// genres (ordered by style id).
#[derive(Debug, Clone)]
pub struct BookWithRelations {
    pub book: book::Model,
    pub authors: Vec<author::Model>,
    pub genres: Vec<style::Model>,
}

/// Sort target for the book listing. `author` is not a stored column and is
/// applied in memory after the fetch.
#[derive(Debug, Clone, Copy)]
pub enum BookSort {
    Column(book::Column),
    ByAuthor,
}

/// Map an external sort column name onto the books table; unknown names fall
/// back to the book name.
pub fn map_sort_column(sort_column: &str) -> BookSort {
    match sort_column {
        "author" => BookSort::ByAuthor,
        "publication_year" => BookSort::Column(book::Column::PublicationYear),
        "publishing_company" => BookSort::Column(book::Column::PublishingCompany),
        "count_of_books" => BookSort::Column(book::Column::CountOfBooks),
        "isbn" => BookSort::Column(book::Column::Isbn),
        _ => BookSort::Column(book::Column::Name),
    }
}

/// Create a book, resolving its publisher, authors and genres in one unit of
/// work. Nothing is persisted when any referenced author is missing.
#[instrument(skip(db, input), fields(isbn = %input.isbn))]
pub async fn create_book(
    db: &DatabaseConnection,
    input: BookInput,
) -> Result<BookWithRelations, ServiceError> {
    book::validate_isbn(&input.isbn)?;
    book::validate_name(&input.name)?;
    let isbn = input.isbn.trim().to_string();

    let txn = db.begin().await.map_err(ServiceError::db)?;

    let existing = book::Entity::find_by_id(isbn.as_str())
        .one(&txn)
        .await
        .map_err(ServiceError::db)?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(format!("book {} already exists", isbn)));
    }

    let company =
        publishing_company_service::get_or_create_publishing_company(&txn, &input.publishing_company)
            .await?;

    let am = book::ActiveModel {
        isbn: Set(isbn),
        name: Set(input.name.clone()),
        publication_year: Set(input.publication_year),
        age_limit: Set(input.age_limit),
        publishing_company: Set(company.name.clone()),
        page_count: Set(input.page_count),
        language: Set(input.language.clone()),
        cost: Set(input.cost),
        count_of_books: Set(input.count_of_books),
    };
    let stored = am.insert(&txn).await.map_err(ServiceError::db)?;

    let authors = link_authors(&txn, &stored.isbn, &input.authors).await?;
    let genres = link_genres(&txn, &stored.isbn, &input.genres).await?;

    txn.commit().await.map_err(ServiceError::db)?;
    info!(isbn = %stored.isbn, authors = authors.len(), genres = genres.len(), "book_created");
    Ok(BookWithRelations { book: stored, authors, genres })
}

pub async fn get_book(
    db: &DatabaseConnection,
    isbn: &str,
) -> Result<Option<BookWithRelations>, ServiceError> {
    let Some(found) = book::Entity::find_by_id(isbn).one(db).await.map_err(ServiceError::db)?
    else {
        return Ok(None);
    };
    let isbns = vec![found.isbn.clone()];
    let (mut authors_by_isbn, mut genres_by_isbn) = load_relations(db, &isbns).await?;
    Ok(Some(BookWithRelations {
        authors: authors_by_isbn.remove(&found.isbn).unwrap_or_default(),
        genres: genres_by_isbn.remove(&found.isbn).unwrap_or_default(),
        book: found,
    }))
}

/// List books with optional case-insensitive name search and sorting.
/// Storage sorts by real columns; the pseudo column `author` sorts the
/// assembled list by each book's first author's fio.
pub async fn get_all_books(
    db: &DatabaseConnection,
    search: Option<&str>,
    sort_column: Option<&str>,
    sort_order: Option<&str>,
) -> Result<Vec<BookWithRelations>, ServiceError> {
    let descending = sort_order.is_some_and(|o| o.eq_ignore_ascii_case("desc"));
    let order = if descending { Order::Desc } else { Order::Asc };

    let mut query = book::Entity::find();
    if let Some(needle) = search.filter(|s| !s.is_empty()) {
        query = query.filter(Expr::col(book::Column::Name).ilike(format!("%{}%", needle)));
    }

    let mut by_author = false;
    if let Some(column) = sort_column.filter(|c| !c.is_empty()) {
        match map_sort_column(column) {
            BookSort::Column(col) => query = query.order_by(col, order),
            BookSort::ByAuthor => by_author = true,
        }
    }

    let books = query.all(db).await.map_err(ServiceError::db)?;
    let isbns: Vec<String> = books.iter().map(|b| b.isbn.clone()).collect();
    let (mut authors_by_isbn, mut genres_by_isbn) = load_relations(db, &isbns).await?;

    let mut assembled: Vec<BookWithRelations> = books
        .into_iter()
        .map(|b| BookWithRelations {
            authors: authors_by_isbn.remove(&b.isbn).unwrap_or_default(),
            genres: genres_by_isbn.remove(&b.isbn).unwrap_or_default(),
            book: b,
        })
        .collect();

    if by_author {
        assembled.sort_by_key(first_author_key);
        if descending {
            assembled.reverse();
        }
    }
    Ok(assembled)
}

/// Replace every mutable field and rebuild the author/genre links from the
/// payload. The ISBN itself is immutable.
#[instrument(skip(db, input), fields(isbn = %isbn))]
pub async fn update_book(
    db: &DatabaseConnection,
    isbn: &str,
    input: BookInput,
) -> Result<BookWithRelations, ServiceError> {
    book::validate_name(&input.name)?;

    let txn = db.begin().await.map_err(ServiceError::db)?;
    let existing = book::Entity::find_by_id(isbn)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("book"))?;

    let company =
        publishing_company_service::get_or_create_publishing_company(&txn, &input.publishing_company)
            .await?;

    let mut am: book::ActiveModel = existing.into();
    am.name = Set(input.name.clone());
    am.publication_year = Set(input.publication_year);
    am.age_limit = Set(input.age_limit);
    am.publishing_company = Set(company.name.clone());
    am.page_count = Set(input.page_count);
    am.language = Set(input.language.clone());
    am.cost = Set(input.cost);
    am.count_of_books = Set(input.count_of_books);
    let stored = am.update(&txn).await.map_err(ServiceError::db)?;

    // Replace semantics: clear both link sets, then rebuild from the input
    authorship::Entity::delete_many()
        .filter(authorship::Column::BookIsbn.eq(isbn))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    book_style::Entity::delete_many()
        .filter(book_style::Column::BookIsbn.eq(isbn))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;

    let authors = link_authors(&txn, &stored.isbn, &input.authors).await?;
    let genres = link_genres(&txn, &stored.isbn, &input.genres).await?;

    txn.commit().await.map_err(ServiceError::db)?;
    info!(isbn = %stored.isbn, "book_updated");
    Ok(BookWithRelations { book: stored, authors, genres })
}

/// Delete a book with its authorship and style links.
#[instrument(skip(db))]
pub async fn delete_book(db: &DatabaseConnection, isbn: &str) -> Result<(), ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    book::Entity::find_by_id(isbn)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("book"))?;
    let keys = [isbn.to_string()];
    delete_links(&txn, &keys).await?;
    book::Entity::delete_by_id(isbn).exec(&txn).await.map_err(ServiceError::db)?;
    txn.commit().await.map_err(ServiceError::db)?;
    info!(isbn = %isbn, "book_deleted");
    Ok(())
}

/// Bulk delete. Every ISBN must resolve before anything is removed.
#[instrument(skip(db, isbns), fields(count = isbns.len()))]
pub async fn delete_books(db: &DatabaseConnection, isbns: Vec<String>) -> Result<(), ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let mut unique = isbns;
    unique.sort();
    unique.dedup();
    let found = book::Entity::find()
        .filter(book::Column::Isbn.is_in(unique.clone()))
        .all(&txn)
        .await
        .map_err(ServiceError::db)?;
    if found.len() != unique.len() {
        return Err(ServiceError::NotFound("some books not found for deletion".into()));
    }
    delete_links(&txn, &unique).await?;
    book::Entity::delete_many()
        .filter(book::Column::Isbn.is_in(unique.clone()))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    txn.commit().await.map_err(ServiceError::db)?;
    info!(count = unique.len(), "books_bulk_deleted");
    Ok(())
}

fn first_author_key(entry: &BookWithRelations) -> String {
    entry.authors.first().map(|a| a.fio.to_lowercase()).unwrap_or_default()
}

/// Resolve author references and insert the authorship rows. Duplicated
/// references collapse onto a single link.
async fn link_authors<C: ConnectionTrait>(
    db: &C,
    isbn: &str,
    refs: &[AuthorRef],
) -> Result<Vec<author::Model>, ServiceError> {
    let mut resolved: Vec<author::Model> = Vec::with_capacity(refs.len());
    let mut seen: HashSet<i32> = HashSet::new();
    for r in refs {
        let found = match r.id {
            Some(id) => author::Entity::find_by_id(id)
                .one(db)
                .await
                .map_err(ServiceError::db)?
                .ok_or_else(|| ServiceError::NotFound(format!("author {} not found", id)))?,
            None => {
                let fio = r.fio.as_deref().unwrap_or_default();
                author::create(db, fio, r.birth_date.clone(), r.country.clone(), r.nickname.clone())
                    .await?
            }
        };
        if seen.insert(found.id) {
            authorship::create(db, isbn, found.id).await?;
            resolved.push(found);
        }
    }
    resolved.sort_by_key(|a| a.id);
    Ok(resolved)
}

/// Resolve genre names via the style get-or-create policy and insert the
/// book-style rows.
async fn link_genres<C: ConnectionTrait>(
    db: &C,
    isbn: &str,
    genres: &[String],
) -> Result<Vec<style::Model>, ServiceError> {
    let mut resolved: Vec<style::Model> = Vec::with_capacity(genres.len());
    let mut seen: HashSet<i64> = HashSet::new();
    for name in genres {
        let found = styles_service::get_or_create_style(db, name).await?;
        if seen.insert(found.id) {
            book_style::create(db, isbn, found.id).await?;
            resolved.push(found);
        }
    }
    resolved.sort_by_key(|s| s.id);
    Ok(resolved)
}

async fn delete_links<C: ConnectionTrait>(db: &C, isbns: &[String]) -> Result<(), ServiceError> {
    authorship::Entity::delete_many()
        .filter(authorship::Column::BookIsbn.is_in(isbns.to_vec()))
        .exec(db)
        .await
        .map_err(ServiceError::db)?;
    book_style::Entity::delete_many()
        .filter(book_style::Column::BookIsbn.is_in(isbns.to_vec()))
        .exec(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(())
}

/// Batch-load the author and genre lists for a set of books, avoiding
/// per-book queries on the listing and sort-by-author paths.
async fn load_relations<C: ConnectionTrait>(
    db: &C,
    isbns: &[String],
) -> Result<(HashMap<String, Vec<author::Model>>, HashMap<String, Vec<style::Model>>), ServiceError>
{
    let mut authors_by_isbn: HashMap<String, Vec<author::Model>> = HashMap::new();
    let mut genres_by_isbn: HashMap<String, Vec<style::Model>> = HashMap::new();
    if isbns.is_empty() {
        return Ok((authors_by_isbn, genres_by_isbn));
    }

    let authorship_rows = authorship::Entity::find()
        .filter(authorship::Column::BookIsbn.is_in(isbns.to_vec()))
        .order_by_asc(authorship::Column::AuthorId)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    let author_ids: Vec<i32> = authorship_rows.iter().map(|r| r.author_id).collect();
    let authors: HashMap<i32, author::Model> = author::Entity::find()
        .filter(author::Column::Id.is_in(author_ids))
        .all(db)
        .await
        .map_err(ServiceError::db)?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
    for row in authorship_rows {
        if let Some(a) = authors.get(&row.author_id) {
            authors_by_isbn.entry(row.book_isbn).or_default().push(a.clone());
        }
    }

    let style_rows = book_style::Entity::find()
        .filter(book_style::Column::BookIsbn.is_in(isbns.to_vec()))
        .order_by_asc(book_style::Column::StyleId)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    let style_ids: Vec<i64> = style_rows.iter().map(|r| r.style_id).collect();
    let styles: HashMap<i64, style::Model> = style::Entity::find()
        .filter(style::Column::Id.is_in(style_ids))
        .all(db)
        .await
        .map_err(ServiceError::db)?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    for row in style_rows {
        if let Some(s) = styles.get(&row.style_id) {
            genres_by_isbn.entry(row.book_isbn).or_default().push(s.clone());
        }
    }

    Ok((authors_by_isbn, genres_by_isbn))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author_service;
    use crate::publishing_company_service;
    use crate::test_support::get_db;
    use serial_test::serial;
    use uuid::Uuid;

    #[test]
    fn unknown_sort_column_falls_back_to_name() {
        assert!(matches!(map_sort_column("definitely-bogus"), BookSort::Column(book::Column::Name)));
        assert!(matches!(map_sort_column("isbn"), BookSort::Column(book::Column::Isbn)));
        assert!(matches!(
            map_sort_column("count_of_books"),
            BookSort::Column(book::Column::CountOfBooks)
        ));
        assert!(matches!(map_sort_column("author"), BookSort::ByAuthor));
    }

    #[tokio::test]
    #[serial]
    async fn create_with_inline_author_and_genre_round_trips() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let isbn = format!("isbn-{}", Uuid::new_v4());
        let company = format!("Acme-{}", Uuid::new_v4());
        let genre = format!("Drama-{}", Uuid::new_v4());
        let created = create_book(
            &db,
            BookInput {
                isbn: isbn.clone(),
                name: "Round Trip".into(),
                publishing_company: company.clone(),
                authors: vec![AuthorRef { fio: Some("A. Test".into()), ..Default::default() }],
                genres: vec![genre.clone()],
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(created.book.isbn, isbn);
        assert_eq!(created.authors.len(), 1);
        assert_eq!(created.authors[0].fio, "A. Test");
        assert_eq!(created.genres.len(), 1);
        assert_eq!(created.genres[0].name, genre);

        // Every materialized side record is independently resolvable
        let reread = get_book(&db, &isbn).await?.expect("book exists");
        assert_eq!(reread.authors[0].id, created.authors[0].id);
        assert!(author_service::get_author(&db, created.authors[0].id).await?.is_some());
        assert!(publishing_company_service::get_publishing_company(&db, &company)
            .await?
            .is_some());

        // Duplicate natural key is rejected
        let dup = create_book(
            &db,
            BookInput {
                isbn: isbn.clone(),
                name: "Round Trip Again".into(),
                publishing_company: company.clone(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        publishing_company_service::delete_publishing_company(&db, &company).await?;
        author_service::delete_author(&db, created.authors[0].id).await?;
        crate::styles_service::delete_style(&db, created.genres[0].id).await?;
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn update_replaces_author_and_genre_links() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let isbn = format!("isbn-{}", Uuid::new_v4());
        let company = format!("Acme-{}", Uuid::new_v4());
        let created = create_book(
            &db,
            BookInput {
                isbn: isbn.clone(),
                name: "First Edition".into(),
                publishing_company: company.clone(),
                authors: vec![AuthorRef { fio: Some("Old Author".into()), ..Default::default() }],
                ..Default::default()
            },
        )
        .await?;
        let old_author = created.authors[0].id;

        let updated = update_book(
            &db,
            &isbn,
            BookInput {
                isbn: isbn.clone(),
                name: "Second Edition".into(),
                publishing_company: company.clone(),
                authors: vec![AuthorRef { fio: Some("New Author".into()), ..Default::default() }],
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.book.name, "Second Edition");
        assert_eq!(updated.authors.len(), 1);
        assert_ne!(updated.authors[0].id, old_author);

        // The old author still exists; only the link was replaced
        assert!(author_service::get_author(&db, old_author).await?.is_some());

        publishing_company_service::delete_publishing_company(&db, &company).await?;
        author_service::delete_author(&db, old_author).await?;
        author_service::delete_author(&db, updated.authors[0].id).await?;
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn search_matches_name_substring_case_insensitively() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let marker = Uuid::new_v4().simple().to_string();
        let company = format!("Acme-{}", Uuid::new_v4());
        let isbn_a = format!("isbn-{}", Uuid::new_v4());
        let isbn_b = format!("isbn-{}", Uuid::new_v4());
        create_book(
            &db,
            BookInput {
                isbn: isbn_a.clone(),
                name: format!("NIGHT {} WATCH", marker.to_uppercase()),
                publishing_company: company.clone(),
                ..Default::default()
            },
        )
        .await?;
        create_book(
            &db,
            BookInput {
                isbn: isbn_b.clone(),
                name: "Unrelated".into(),
                publishing_company: company.clone(),
                ..Default::default()
            },
        )
        .await?;

        let hits = get_all_books(&db, Some(&marker.to_lowercase()), None, None).await?;
        let isbns: Vec<&str> = hits.iter().map(|b| b.book.isbn.as_str()).collect();
        assert_eq!(isbns, vec![isbn_a.as_str()]);

        publishing_company_service::delete_publishing_company(&db, &company).await?;
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn author_sort_descending_reverses_ascending() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let marker = Uuid::new_v4().simple().to_string();
        let company = format!("Acme-{}", Uuid::new_v4());
        let mut isbns = Vec::new();
        for (i, fio) in ["beta writer", "Alpha Writer", "Gamma Writer"].iter().enumerate() {
            let isbn = format!("isbn-{}-{}", marker, i);
            create_book(
                &db,
                BookInput {
                    isbn: isbn.clone(),
                    name: format!("Sortable {} {}", marker, i),
                    publishing_company: company.clone(),
                    authors: vec![AuthorRef { fio: Some(fio.to_string()), ..Default::default() }],
                    ..Default::default()
                },
            )
            .await?;
            isbns.push(isbn);
        }

        let asc = get_all_books(&db, Some(&marker), Some("author"), Some("asc")).await?;
        let asc_isbns: Vec<String> = asc.iter().map(|b| b.book.isbn.clone()).collect();
        assert_eq!(asc_isbns, vec![isbns[1].clone(), isbns[0].clone(), isbns[2].clone()]);

        let desc = get_all_books(&db, Some(&marker), Some("author"), Some("desc")).await?;
        let desc_isbns: Vec<String> = desc.iter().map(|b| b.book.isbn.clone()).collect();
        let mut reversed = asc_isbns.clone();
        reversed.reverse();
        assert_eq!(desc_isbns, reversed);

        let author_ids: Vec<i32> = asc.iter().filter_map(|b| b.authors.first().map(|a| a.id)).collect();
        publishing_company_service::delete_publishing_company(&db, &company).await?;
        author_service::delete_authors(&db, author_ids, true).await?;
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn bulk_delete_with_missing_isbn_leaves_everything_in_place() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let company = format!("Acme-{}", Uuid::new_v4());
        let isbn = format!("isbn-{}", Uuid::new_v4());
        create_book(
            &db,
            BookInput {
                isbn: isbn.clone(),
                name: "Survivor".into(),
                publishing_company: company.clone(),
                ..Default::default()
            },
        )
        .await?;

        let missing = format!("isbn-{}", Uuid::new_v4());
        let result = delete_books(&db, vec![isbn.clone(), missing]).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert!(get_book(&db, &isbn).await?.is_some());

        delete_books(&db, vec![isbn.clone()]).await?;
        assert!(get_book(&db, &isbn).await?.is_none());
        publishing_company_service::delete_publishing_company(&db, &company).await?;
        Ok(())
    }
}
