use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use models::{book_style, style};

/// Create a style, rejecting names already taken under case-insensitive match.
#[instrument(skip(db))]
pub async fn create_style(db: &DatabaseConnection, name: &str) -> Result<style::Model, ServiceError> {
    style::validate_name(name)?;
    let taken = find_by_name_ci(db, name.trim()).await?;
    if taken.is_some() {
        return Err(ServiceError::Conflict(format!("style {} already exists", name.trim())));
    }
    let created = style::create(db, name.trim()).await?;
    info!(style_id = created.id, name = %created.name, "style_created");
    Ok(created)
}

pub async fn get_style(db: &DatabaseConnection, id: i64) -> Result<Option<style::Model>, ServiceError> {
    let found = style::Entity::find_by_id(id).one(db).await.map_err(ServiceError::db)?;
    Ok(found)
}

pub async fn get_all_styles(db: &DatabaseConnection) -> Result<Vec<style::Model>, ServiceError> {
    let styles = style::Entity::find().all(db).await.map_err(ServiceError::db)?;
    Ok(styles)
}

pub async fn update_style(
    db: &DatabaseConnection,
    id: i64,
    name: &str,
) -> Result<style::Model, ServiceError> {
    style::validate_name(name)?;
    let mut am: style::ActiveModel = style::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("style"))?
        .into();
    am.name = Set(name.trim().to_string());
    let updated = am.update(db).await.map_err(ServiceError::db)?;
    Ok(updated)
}

/// Delete a style together with its book links.
#[instrument(skip(db))]
pub async fn delete_style(db: &DatabaseConnection, id: i64) -> Result<(), ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    style::Entity::find_by_id(id)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("style"))?;
    book_style::Entity::delete_many()
        .filter(book_style::Column::StyleId.eq(id))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    style::Entity::delete_by_id(id).exec(&txn).await.map_err(ServiceError::db)?;
    txn.commit().await.map_err(ServiceError::db)?;
    info!(style_id = id, "style_deleted");
    Ok(())
}

pub async fn search_styles(db: &DatabaseConnection, query: &str) -> Result<Vec<style::Model>, ServiceError> {
    let styles = style::Entity::find()
        .filter(Expr::col(style::Column::Name).ilike(format!("%{}%", query)))
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(styles)
}

/// Resolve a genre name: case-insensitive exact match first, then
/// case-insensitive substring match (first hit by id), else create it.
pub async fn get_or_create_style<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<style::Model, ServiceError> {
    style::validate_name(name)?;
    let name = name.trim();
    if let Some(exact) = find_by_name_ci(db, name).await? {
        return Ok(exact);
    }
    let partial = style::Entity::find()
        .filter(Expr::col(style::Column::Name).ilike(format!("%{}%", name)))
        .order_by_asc(style::Column::Id)
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if let Some(hit) = partial {
        return Ok(hit);
    }
    let created = style::create(db, name).await?;
    info!(style_id = created.id, name = %created.name, "style_created_on_the_fly");
    Ok(created)
}

async fn find_by_name_ci<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<style::Model>, ServiceError> {
    let found = style::Entity::find()
        .filter(Expr::col(style::Column::Name).ilike(name))
        .order_by_asc(style::Column::Id)
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(found)
}
