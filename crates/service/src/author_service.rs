use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use models::{author, authorship, book, book_style};

/// Mutable author fields carried by create and update calls.
#[derive(Debug, Clone, Default)]
pub struct AuthorInput {
    pub fio: String,
    pub birth_date: Option<String>,
    pub country: Option<String>,
    pub nickname: Option<String>,
}

pub async fn create_author(
    db: &DatabaseConnection,
    input: AuthorInput,
) -> Result<author::Model, ServiceError> {
    let created =
        author::create(db, &input.fio, input.birth_date, input.country, input.nickname).await?;
    info!(author_id = created.id, "author_created");
    Ok(created)
}

pub async fn get_author(
    db: &DatabaseConnection,
    id: i32,
) -> Result<Option<author::Model>, ServiceError> {
    let found = author::Entity::find_by_id(id).one(db).await.map_err(ServiceError::db)?;
    Ok(found)
}

/// List authors, optionally sorted in memory by a named column.
pub async fn get_all_authors(
    db: &DatabaseConnection,
    sort_column: Option<&str>,
    sort_order: Option<&str>,
) -> Result<Vec<author::Model>, ServiceError> {
    let mut authors = author::Entity::find().all(db).await.map_err(ServiceError::db)?;
    if let Some(column) = sort_column {
        sort_authors(&mut authors, column, sort_order.unwrap_or(""));
    }
    Ok(authors)
}

pub async fn update_author(
    db: &DatabaseConnection,
    id: i32,
    input: AuthorInput,
) -> Result<author::Model, ServiceError> {
    author::validate_fio(&input.fio)?;
    let mut am: author::ActiveModel = author::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("author"))?
        .into();
    am.fio = Set(input.fio);
    am.birth_date = Set(input.birth_date);
    am.country = Set(input.country);
    am.nickname = Set(input.nickname);
    let updated = am.update(db).await.map_err(ServiceError::db)?;
    info!(author_id = id, "author_updated");
    Ok(updated)
}

/// Delete one author and their authorship rows. Books are left in place even
/// when this was their last author; only the bulk path removes orphaned books.
#[instrument(skip(db))]
pub async fn delete_author(db: &DatabaseConnection, id: i32) -> Result<(), ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    author::Entity::find_by_id(id)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("author"))?;
    authorship::Entity::delete_many()
        .filter(authorship::Column::AuthorId.eq(id))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    author::Entity::delete_by_id(id).exec(&txn).await.map_err(ServiceError::db)?;
    txn.commit().await.map_err(ServiceError::db)?;
    info!(author_id = id, "author_deleted");
    Ok(())
}

/// Bulk delete authors, removing any book whose complete author set is inside
/// the deletion set. `remove_everything == false` means intent was not
/// confirmed and the call is a no-op.
#[instrument(skip(db, author_ids), fields(count = author_ids.len(), remove_everything))]
pub async fn delete_authors(
    db: &DatabaseConnection,
    author_ids: Vec<i32>,
    remove_everything: bool,
) -> Result<(), ServiceError> {
    if !remove_everything {
        info!("bulk author delete skipped, removeEverything not set");
        return Ok(());
    }

    let ids: HashSet<i32> = author_ids.into_iter().collect();
    let id_vec: Vec<i32> = ids.iter().copied().collect();

    let txn = db.begin().await.map_err(ServiceError::db)?;

    // All-or-nothing existence precondition before any mutation
    let found = author::Entity::find()
        .filter(author::Column::Id.is_in(id_vec.clone()))
        .all(&txn)
        .await
        .map_err(ServiceError::db)?;
    if found.len() != ids.len() {
        return Err(ServiceError::NotFound("some authors not found for deletion".into()));
    }

    // Books reachable from the doomed authors, with their full author sets
    // as they stand before any deletion happens.
    let touched: Vec<String> = authorship::Entity::find()
        .filter(authorship::Column::AuthorId.is_in(id_vec.clone()))
        .all(&txn)
        .await
        .map_err(ServiceError::db)?
        .into_iter()
        .map(|a| a.book_isbn)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let mut authors_per_book: HashMap<String, Vec<i32>> = HashMap::new();
    if !touched.is_empty() {
        let rows = authorship::Entity::find()
            .filter(authorship::Column::BookIsbn.is_in(touched.clone()))
            .all(&txn)
            .await
            .map_err(ServiceError::db)?;
        for row in rows {
            authors_per_book.entry(row.book_isbn).or_default().push(row.author_id);
        }
    }

    let doomed_books: Vec<String> = authors_per_book
        .iter()
        .filter(|(_, authors)| authors.iter().all(|a| ids.contains(a)))
        .map(|(isbn, _)| isbn.clone())
        .collect();

    if !doomed_books.is_empty() {
        authorship::Entity::delete_many()
            .filter(authorship::Column::BookIsbn.is_in(doomed_books.clone()))
            .exec(&txn)
            .await
            .map_err(ServiceError::db)?;
        book_style::Entity::delete_many()
            .filter(book_style::Column::BookIsbn.is_in(doomed_books.clone()))
            .exec(&txn)
            .await
            .map_err(ServiceError::db)?;
        book::Entity::delete_many()
            .filter(book::Column::Isbn.is_in(doomed_books.clone()))
            .exec(&txn)
            .await
            .map_err(ServiceError::db)?;
    }

    // Surviving books keep their other authors; only links to the deleted
    // authors go away, together with the authors themselves.
    authorship::Entity::delete_many()
        .filter(authorship::Column::AuthorId.is_in(id_vec.clone()))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    author::Entity::delete_many()
        .filter(author::Column::Id.is_in(id_vec))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;

    txn.commit().await.map_err(ServiceError::db)?;
    info!(authors = ids.len(), books = doomed_books.len(), "authors_bulk_deleted");
    Ok(())
}

/// Substring search over fio and nickname, case-insensitive.
pub async fn search_authors(
    db: &DatabaseConnection,
    query: &str,
) -> Result<Vec<author::Model>, ServiceError> {
    let pattern = format!("%{}%", query);
    let authors = author::Entity::find()
        .filter(
            Condition::any()
                .add(Expr::col(author::Column::Fio).ilike(pattern.clone()))
                .add(Expr::col(author::Column::Nickname).ilike(pattern)),
        )
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(authors)
}

/// In-memory sort used by the author listing endpoints. Unknown columns fall
/// back to fio; absent values sort last; "desc" reverses the whole ordering.
pub fn sort_authors(authors: &mut [author::Model], sort_column: &str, sort_order: &str) {
    let key = |a: &author::Model| -> Option<String> {
        match sort_column.to_lowercase().as_str() {
            "birthdate" => a.birth_date.as_ref().map(|v| v.to_lowercase()),
            "country" => a.country.as_ref().map(|v| v.to_lowercase()),
            "nickname" => a.nickname.as_ref().map(|v| v.to_lowercase()),
            _ => Some(a.fio.to_lowercase()),
        }
    };
    authors.sort_by(|a, b| match (key(a), key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    if sort_order.eq_ignore_ascii_case("desc") {
        authors.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use serial_test::serial;
    use uuid::Uuid;

    fn author(id: i32, fio: &str, nickname: Option<&str>) -> author::Model {
        author::Model {
            id,
            fio: fio.to_string(),
            birth_date: None,
            country: None,
            nickname: nickname.map(|n| n.to_string()),
        }
    }

    #[test]
    fn sort_is_case_insensitive_and_falls_back_to_fio() {
        let mut authors =
            vec![author(1, "b Writer", None), author(2, "A Writer", None), author(3, "C Writer", None)];
        sort_authors(&mut authors, "definitely-unknown", "asc");
        let order: Vec<i32> = authors.iter().map(|a| a.id).collect();
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn desc_reverses_and_missing_values_sort_last() {
        let mut authors = vec![
            author(1, "X", Some("zeta")),
            author(2, "Y", None),
            author(3, "Z", Some("alpha")),
        ];
        sort_authors(&mut authors, "nickname", "asc");
        assert_eq!(authors.iter().map(|a| a.id).collect::<Vec<_>>(), vec![3, 1, 2]);
        sort_authors(&mut authors, "nickname", "desc");
        assert_eq!(authors.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 1, 3]);
    }

    #[tokio::test]
    #[serial]
    async fn bulk_delete_removes_fully_orphaned_books_only() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let x = create_author(&db, AuthorInput { fio: "Author X".into(), ..Default::default() }).await?;
        let y = create_author(&db, AuthorInput { fio: "Author Y".into(), ..Default::default() }).await?;
        let z = create_author(&db, AuthorInput { fio: "Author Z".into(), ..Default::default() }).await?;

        let company = format!("Press-{}", Uuid::new_v4());
        let isbn_a = format!("isbn-{}", Uuid::new_v4());
        let isbn_b = format!("isbn-{}", Uuid::new_v4());
        let by_ids = |ids: Vec<i32>| {
            ids.into_iter()
                .map(|id| crate::book_service::AuthorRef { id: Some(id), ..Default::default() })
                .collect::<Vec<_>>()
        };
        crate::book_service::create_book(
            &db,
            crate::book_service::BookInput {
                isbn: isbn_a.clone(),
                name: "Doomed Book".into(),
                publishing_company: company.clone(),
                authors: by_ids(vec![x.id, y.id]),
                ..Default::default()
            },
        )
        .await?;
        crate::book_service::create_book(
            &db,
            crate::book_service::BookInput {
                isbn: isbn_b.clone(),
                name: "Surviving Book".into(),
                publishing_company: company.clone(),
                authors: by_ids(vec![x.id, z.id]),
                ..Default::default()
            },
        )
        .await?;

        delete_authors(&db, vec![x.id, y.id], true).await?;

        // Book A lost every author and is gone; book B keeps Z and survives
        assert!(crate::book_service::get_book(&db, &isbn_a).await?.is_none());
        let survivor = crate::book_service::get_book(&db, &isbn_b).await?.expect("survives");
        let remaining: Vec<i32> = survivor.authors.iter().map(|a| a.id).collect();
        assert_eq!(remaining, vec![z.id]);

        assert!(get_author(&db, x.id).await?.is_none());
        assert!(get_author(&db, y.id).await?.is_none());
        assert!(get_author(&db, z.id).await?.is_some());

        crate::book_service::delete_book(&db, &isbn_b).await?;
        delete_author(&db, z.id).await?;
        crate::publishing_company_service::delete_publishing_company(&db, &company).await?;
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn bulk_delete_without_confirmation_is_a_noop() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let a = create_author(&db, AuthorInput { fio: "Keep Me".into(), ..Default::default() }).await?;
        delete_authors(&db, vec![a.id], false).await?;
        assert!(get_author(&db, a.id).await?.is_some());

        delete_author(&db, a.id).await?;
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn bulk_delete_with_unknown_id_changes_nothing() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let a = create_author(&db, AuthorInput { fio: "Still Here".into(), ..Default::default() }).await?;
        let result = delete_authors(&db, vec![a.id, i32::MAX], true).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert!(get_author(&db, a.id).await?.is_some());

        delete_author(&db, a.id).await?;
        Ok(())
    }
}
