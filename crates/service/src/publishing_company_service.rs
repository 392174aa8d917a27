use chrono::NaiveDate;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, info, instrument};

use crate::errors::ServiceError;
use models::{authorship, book, book_style, publishing_company};

/// Mutable publishing company fields carried by create and update calls.
#[derive(Debug, Clone, Default)]
pub struct PublishingCompanyInput {
    pub name: String,
    pub establishment_year: Option<NaiveDate>,
    pub contact_info: Option<String>,
    pub city: Option<String>,
}

/// Create a company; the name is the natural key and must be free.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_publishing_company(
    db: &DatabaseConnection,
    input: PublishingCompanyInput,
) -> Result<publishing_company::Model, ServiceError> {
    publishing_company::validate_name(&input.name)?;
    let name = input.name.trim();
    let existing = publishing_company::Entity::find_by_id(name)
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if existing.is_some() {
        return Err(ServiceError::Conflict(format!("publishing company {} already exists", name)));
    }
    let created = publishing_company::create(
        db,
        name,
        input.establishment_year,
        input.contact_info,
        input.city,
    )
    .await?;
    info!(name = %created.name, "publishing_company_created");
    Ok(created)
}

pub async fn get_publishing_company(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<publishing_company::Model>, ServiceError> {
    let found = publishing_company::Entity::find_by_id(name)
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(found)
}

pub async fn get_all_publishing_companies(
    db: &DatabaseConnection,
) -> Result<Vec<publishing_company::Model>, ServiceError> {
    let companies =
        publishing_company::Entity::find().all(db).await.map_err(ServiceError::db)?;
    Ok(companies)
}

/// Update a company. A changed name is a rename: books follow to a new
/// record under the new name and the old record is removed, atomically.
#[instrument(skip(db, input), fields(original = %original_name, new = %input.name))]
pub async fn update_publishing_company(
    db: &DatabaseConnection,
    original_name: &str,
    input: PublishingCompanyInput,
) -> Result<publishing_company::Model, ServiceError> {
    publishing_company::validate_name(&input.name)?;
    let new_name = input.name.trim().to_string();

    let txn = db.begin().await.map_err(ServiceError::db)?;
    let old = publishing_company::Entity::find_by_id(original_name)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("publishing company"))?;

    if new_name == original_name {
        let mut am: publishing_company::ActiveModel = old.into();
        am.establishment_year = Set(input.establishment_year);
        am.contact_info = Set(input.contact_info);
        am.city = Set(input.city);
        let updated = am.update(&txn).await.map_err(ServiceError::db)?;
        txn.commit().await.map_err(ServiceError::db)?;
        info!(name = %original_name, "publishing_company_updated");
        return Ok(updated);
    }

    let taken = publishing_company::Entity::find_by_id(new_name.as_str())
        .one(&txn)
        .await
        .map_err(ServiceError::db)?;
    if taken.is_some() {
        return Err(ServiceError::Conflict(format!(
            "publishing company {} already exists",
            new_name
        )));
    }

    // New record first so the books have a valid target, then re-point,
    // then drop the old record.
    let renamed = publishing_company::create(
        &txn,
        &new_name,
        input.establishment_year,
        input.contact_info,
        input.city,
    )
    .await?;
    let repointed = book::Entity::update_many()
        .col_expr(book::Column::PublishingCompany, Expr::value(new_name.clone()))
        .filter(book::Column::PublishingCompany.eq(original_name))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    debug!(books = repointed.rows_affected, "books_repointed_to_renamed_company");
    publishing_company::Entity::delete_by_id(original_name)
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    txn.commit().await.map_err(ServiceError::db)?;
    info!(old = %original_name, new = %renamed.name, "publishing_company_renamed");
    Ok(renamed)
}

/// Delete a company and every book it published.
#[instrument(skip(db))]
pub async fn delete_publishing_company(
    db: &DatabaseConnection,
    name: &str,
) -> Result<(), ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    publishing_company::Entity::find_by_id(name)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("publishing company"))?;
    delete_company_books(&txn, name).await?;
    publishing_company::Entity::delete_by_id(name).exec(&txn).await.map_err(ServiceError::db)?;
    txn.commit().await.map_err(ServiceError::db)?;
    info!(name = %name, "publishing_company_deleted");
    Ok(())
}

/// Bulk delete. Every name must resolve before anything is removed.
#[instrument(skip(db, names), fields(count = names.len()))]
pub async fn delete_publishing_companies(
    db: &DatabaseConnection,
    names: Vec<String>,
) -> Result<(), ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    let found = publishing_company::Entity::find()
        .filter(publishing_company::Column::Name.is_in(unique.clone()))
        .all(&txn)
        .await
        .map_err(ServiceError::db)?;
    if found.len() != unique.len() {
        return Err(ServiceError::NotFound(
            "some publishing companies not found for deletion".into(),
        ));
    }
    for company in &found {
        delete_company_books(&txn, &company.name).await?;
    }
    publishing_company::Entity::delete_many()
        .filter(publishing_company::Column::Name.is_in(unique))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    txn.commit().await.map_err(ServiceError::db)?;
    info!(count = found.len(), "publishing_companies_deleted");
    Ok(())
}

pub async fn search_publishing_companies(
    db: &DatabaseConnection,
    query: &str,
) -> Result<Vec<publishing_company::Model>, ServiceError> {
    let companies = publishing_company::Entity::find()
        .filter(Expr::col(publishing_company::Column::Name).ilike(format!("%{}%", query)))
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(companies)
}

/// Resolve a company by exact name, creating a bare record when absent.
/// Book creation uses this so unknown publishers enter the catalog on the fly.
pub async fn get_or_create_publishing_company<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<publishing_company::Model, ServiceError> {
    publishing_company::validate_name(name)?;
    let name = name.trim();
    if let Some(existing) = publishing_company::Entity::find_by_id(name)
        .one(db)
        .await
        .map_err(ServiceError::db)?
    {
        return Ok(existing);
    }
    let created = publishing_company::create(db, name, None, None, None).await?;
    info!(name = %created.name, "publishing_company_created_on_the_fly");
    Ok(created)
}

/// Remove all books of a company along with their join rows.
async fn delete_company_books(
    txn: &DatabaseTransaction,
    company_name: &str,
) -> Result<(), ServiceError> {
    let isbns: Vec<String> = book::Entity::find()
        .filter(book::Column::PublishingCompany.eq(company_name))
        .all(txn)
        .await
        .map_err(ServiceError::db)?
        .into_iter()
        .map(|b| b.isbn)
        .collect();
    if isbns.is_empty() {
        return Ok(());
    }
    authorship::Entity::delete_many()
        .filter(authorship::Column::BookIsbn.is_in(isbns.clone()))
        .exec(txn)
        .await
        .map_err(ServiceError::db)?;
    book_style::Entity::delete_many()
        .filter(book_style::Column::BookIsbn.is_in(isbns.clone()))
        .exec(txn)
        .await
        .map_err(ServiceError::db)?;
    book::Entity::delete_many()
        .filter(book::Column::Isbn.is_in(isbns))
        .exec(txn)
        .await
        .map_err(ServiceError::db)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use serial_test::serial;
    use uuid::Uuid;

    #[tokio::test]
    #[serial]
    async fn rename_repoints_books_and_drops_old_name() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let old_name = format!("Press-{}", Uuid::new_v4());
        let company = create_publishing_company(
            &db,
            PublishingCompanyInput { name: old_name.clone(), ..Default::default() },
        )
        .await?;

        let isbn = format!("isbn-{}", Uuid::new_v4());
        let input = crate::book_service::BookInput {
            isbn: isbn.clone(),
            name: "Renamed Press Book".into(),
            publishing_company: company.name.clone(),
            ..Default::default()
        };
        crate::book_service::create_book(&db, input).await?;

        let new_name = format!("Press-{}", Uuid::new_v4());
        let renamed = update_publishing_company(
            &db,
            &old_name,
            PublishingCompanyInput { name: new_name.clone(), city: Some("Riga".into()), ..Default::default() },
        )
        .await?;
        assert_eq!(renamed.name, new_name);
        assert_eq!(renamed.city.as_deref(), Some("Riga"));

        // Old name no longer resolves, the book follows the rename
        assert!(get_publishing_company(&db, &old_name).await?.is_none());
        let moved = crate::book_service::get_book(&db, &isbn).await?.expect("book exists");
        assert_eq!(moved.book.publishing_company, new_name);

        delete_publishing_company(&db, &new_name).await?;
        assert!(crate::book_service::get_book(&db, &isbn).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn rename_to_taken_name_is_conflict_and_changes_nothing() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let a = format!("Press-{}", Uuid::new_v4());
        let b = format!("Press-{}", Uuid::new_v4());
        create_publishing_company(&db, PublishingCompanyInput { name: a.clone(), ..Default::default() })
            .await?;
        create_publishing_company(&db, PublishingCompanyInput { name: b.clone(), ..Default::default() })
            .await?;

        let result = update_publishing_company(
            &db,
            &a,
            PublishingCompanyInput { name: b.clone(), ..Default::default() },
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));

        // Nothing was renamed or lost
        assert!(get_publishing_company(&db, &a).await?.is_some());
        assert!(get_publishing_company(&db, &b).await?.is_some());

        delete_publishing_companies(&db, vec![a, b]).await?;
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn bulk_delete_requires_all_names_to_exist() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let name = format!("Press-{}", Uuid::new_v4());
        create_publishing_company(&db, PublishingCompanyInput { name: name.clone(), ..Default::default() })
            .await?;

        let missing = format!("Press-{}", Uuid::new_v4());
        let result = delete_publishing_companies(&db, vec![name.clone(), missing]).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
        assert!(get_publishing_company(&db, &name).await?.is_some());

        delete_publishing_company(&db, &name).await?;
        Ok(())
    }
}
