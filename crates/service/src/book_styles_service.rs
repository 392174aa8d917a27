use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use models::{book, book_style, style};

/// Link an existing book to an existing style.
#[instrument(skip(db))]
pub async fn create_book_style(
    db: &DatabaseConnection,
    book_isbn: &str,
    style_id: i64,
) -> Result<book_style::Model, ServiceError> {
    book::Entity::find_by_id(book_isbn)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("book"))?;
    style::Entity::find_by_id(style_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("style"))?;
    let existing = book_style::Entity::find_by_id((book_isbn.to_string(), style_id))
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if existing.is_some() {
        return Err(ServiceError::Conflict("book style link already exists".into()));
    }
    let created = book_style::create(db, book_isbn, style_id).await?;
    info!(isbn = %book_isbn, style_id, "book_style_created");
    Ok(created)
}

pub async fn get_book_style(
    db: &DatabaseConnection,
    book_isbn: &str,
    style_id: i64,
) -> Result<Option<book_style::Model>, ServiceError> {
    let found = book_style::Entity::find_by_id((book_isbn.to_string(), style_id))
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(found)
}

pub async fn get_all_book_styles(
    db: &DatabaseConnection,
) -> Result<Vec<book_style::Model>, ServiceError> {
    let rows = book_style::Entity::find().all(db).await.map_err(ServiceError::db)?;
    Ok(rows)
}

/// Re-point a link onto a different book/style pair.
#[instrument(skip(db))]
pub async fn update_book_style(
    db: &DatabaseConnection,
    book_isbn: &str,
    style_id: i64,
    new_book_isbn: &str,
    new_style_id: i64,
) -> Result<book_style::Model, ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    book_style::Entity::find_by_id((book_isbn.to_string(), style_id))
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("book style link"))?;
    book::Entity::find_by_id(new_book_isbn)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("book"))?;
    style::Entity::find_by_id(new_style_id)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("style"))?;

    let unchanged = book_isbn == new_book_isbn && style_id == new_style_id;
    if !unchanged {
        let taken = book_style::Entity::find_by_id((new_book_isbn.to_string(), new_style_id))
            .one(&txn)
            .await
            .map_err(ServiceError::db)?;
        if taken.is_some() {
            return Err(ServiceError::Conflict("book style link already exists".into()));
        }
        book_style::Entity::delete_by_id((book_isbn.to_string(), style_id))
            .exec(&txn)
            .await
            .map_err(ServiceError::db)?;
    }
    let row = if unchanged {
        book_style::Model { book_isbn: book_isbn.to_string(), style_id }
    } else {
        book_style::create(&txn, new_book_isbn, new_style_id).await?
    };
    txn.commit().await.map_err(ServiceError::db)?;
    info!(isbn = %new_book_isbn, style_id = new_style_id, "book_style_updated");
    Ok(row)
}

#[instrument(skip(db))]
pub async fn delete_book_style(
    db: &DatabaseConnection,
    book_isbn: &str,
    style_id: i64,
) -> Result<(), ServiceError> {
    book_style::Entity::find_by_id((book_isbn.to_string(), style_id))
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("book style link"))?;
    book_style::Entity::delete_by_id((book_isbn.to_string(), style_id))
        .exec(db)
        .await
        .map_err(ServiceError::db)?;
    info!(isbn = %book_isbn, style_id, "book_style_deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book_service::{self, BookInput};
    use crate::publishing_company_service;
    use crate::styles_service;
    use crate::test_support::get_db;
    use serial_test::serial;
    use uuid::Uuid;

    #[tokio::test]
    #[serial]
    async fn book_style_link_crud() -> Result<(), anyhow::Error> {
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
                name: "Styled".into(),
                publishing_company: company.clone(),
                ..Default::default()
            },
        )
        .await?;
        let genre = styles_service::create_style(&db, &format!("Genre-{}", Uuid::new_v4())).await?;

        let link = create_book_style(&db, &isbn, genre.id).await?;
        assert_eq!(link.style_id, genre.id);
        assert!(get_book_style(&db, &isbn, genre.id).await?.is_some());
        assert!(matches!(
            create_book_style(&db, &isbn, genre.id).await,
            Err(ServiceError::Conflict(_))
        ));

        delete_book_style(&db, &isbn, genre.id).await?;
        assert!(get_book_style(&db, &isbn, genre.id).await?.is_none());

        styles_service::delete_style(&db, genre.id).await?;
        publishing_company_service::delete_publishing_company(&db, &company).await?;
        Ok(())
    }
}
