use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use models::{author, authorship, book};

/// Link an existing book to an existing author.
#[instrument(skip(db))]
pub async fn create_authorship(
    db: &DatabaseConnection,
    book_isbn: &str,
    author_id: i32,
) -> Result<authorship::Model, ServiceError> {
    book::Entity::find_by_id(book_isbn)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("book"))?;
    author::Entity::find_by_id(author_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("author"))?;
    let existing = authorship::Entity::find_by_id((book_isbn.to_string(), author_id))
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if existing.is_some() {
        return Err(ServiceError::Conflict("authorship already exists".into()));
    }
    let created = authorship::create(db, book_isbn, author_id).await?;
    info!(isbn = %book_isbn, author_id, "authorship_created");
    Ok(created)
}

pub async fn get_authorship(
    db: &DatabaseConnection,
    book_isbn: &str,
    author_id: i32,
) -> Result<Option<authorship::Model>, ServiceError> {
    let found = authorship::Entity::find_by_id((book_isbn.to_string(), author_id))
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(found)
}

pub async fn get_all_authorships(
    db: &DatabaseConnection,
) -> Result<Vec<authorship::Model>, ServiceError> {
    let rows = authorship::Entity::find().all(db).await.map_err(ServiceError::db)?;
    Ok(rows)
}

/// Re-point a link onto a different book/author pair. The composite key is
/// the row identity, so this is a delete plus insert in one transaction.
#[instrument(skip(db))]
pub async fn update_authorship(
    db: &DatabaseConnection,
    book_isbn: &str,
    author_id: i32,
    new_book_isbn: &str,
    new_author_id: i32,
) -> Result<authorship::Model, ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    authorship::Entity::find_by_id((book_isbn.to_string(), author_id))
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("authorship"))?;
    book::Entity::find_by_id(new_book_isbn)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("book"))?;
    author::Entity::find_by_id(new_author_id)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("author"))?;

    let unchanged = book_isbn == new_book_isbn && author_id == new_author_id;
    if !unchanged {
        let taken = authorship::Entity::find_by_id((new_book_isbn.to_string(), new_author_id))
            .one(&txn)
            .await
            .map_err(ServiceError::db)?;
        if taken.is_some() {
            return Err(ServiceError::Conflict("authorship already exists".into()));
        }
        authorship::Entity::delete_by_id((book_isbn.to_string(), author_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db)?;
    }
    let row = if unchanged {
        authorship::Model { book_isbn: book_isbn.to_string(), author_id }
    } else {
        authorship::create(&txn, new_book_isbn, new_author_id).await?
    };
    txn.commit().await.map_err(ServiceError::db)?;
    info!(isbn = %new_book_isbn, author_id = new_author_id, "authorship_updated");
    Ok(row)
}

#[instrument(skip(db))]
pub async fn delete_authorship(
    db: &DatabaseConnection,
    book_isbn: &str,
    author_id: i32,
) -> Result<(), ServiceError> {
    authorship::Entity::find_by_id((book_isbn.to_string(), author_id))
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("authorship"))?;
    authorship::Entity::delete_by_id((book_isbn.to_string(), author_id))
        .exec(db)
        .await
        .map_err(ServiceError::db)?;
    info!(isbn = %book_isbn, author_id, "authorship_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author_service::{self, AuthorInput};
    use crate::book_service::{self, BookInput};
    use crate::publishing_company_service;
    use crate::test_support::get_db;
    use serial_test::serial;
    use uuid::Uuid;

    #[tokio::test]
    #[serial]
    async fn authorship_crud_against_real_rows() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let company = format!("Press-{}", Uuid::new_v4());
        let isbn = format!("isbn-{}", Uuid::new_v4());
        book_service::create_book(
            &db,
            BookInput {
                isbn: isbn.clone(),
                name: "Linkable".into(),
                publishing_company: company.clone(),
                ..Default::default()
            },
        )
        .await?;
        let writer =
            author_service::create_author(&db, AuthorInput { fio: "Linked Writer".into(), ..Default::default() })
                .await?;

        // Linking an unknown author is refused
        assert!(matches!(
            create_authorship(&db, &isbn, i32::MAX).await,
            Err(ServiceError::NotFound(_))
        ));

        let link = create_authorship(&db, &isbn, writer.id).await?;
        assert_eq!(link.book_isbn, isbn);
        assert!(get_authorship(&db, &isbn, writer.id).await?.is_some());

        // Double insert is a conflict
        assert!(matches!(
            create_authorship(&db, &isbn, writer.id).await,
            Err(ServiceError::Conflict(_))
        ));

        let other =
            author_service::create_author(&db, AuthorInput { fio: "Other Writer".into(), ..Default::default() })
                .await?;
        let moved = update_authorship(&db, &isbn, writer.id, &isbn, other.id).await?;
        assert_eq!(moved.author_id, other.id);
        assert!(get_authorship(&db, &isbn, writer.id).await?.is_none());

        delete_authorship(&db, &isbn, other.id).await?;
        assert!(get_authorship(&db, &isbn, other.id).await?.is_none());

        publishing_company_service::delete_publishing_company(&db, &company).await?;
        author_service::delete_authors(&db, vec![writer.id, other.id], true).await?;
        Ok(())
    }
}
