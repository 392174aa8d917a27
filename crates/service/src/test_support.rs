#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connection for DB-backed tests. Tests call this and skip themselves when
/// no database is reachable, so the suite passes on machines without Postgres.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        anyhow::bail!("SKIP_DB_TESTS is set");
    }

    // Run migrations exactly once, with a throwaway connection
    MIGRATED
        .get_or_init(|| async {
            if let Ok(db) = models::db::connect().await {
                if let Err(e) = migration::Migrator::up(&db, None).await {
                    eprintln!("migrate up failed: {}", e);
                }
            }
        })
        .await;

    // Return a fresh connection for the current test's runtime
    let db = models::db::connect().await?;
    Ok(db)
}
