//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_publishing_companies;
mod m20250301_000002_create_authors;
mod m20250301_000003_create_styles;
mod m20250301_000004_create_books;
mod m20250301_000005_create_authorships;
mod m20250301_000006_create_book_styles;
mod m20250301_000007_create_administrators;
mod m20250301_000008_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_publishing_companies::Migration),
            Box::new(m20250301_000002_create_authors::Migration),
            Box::new(m20250301_000003_create_styles::Migration),
            Box::new(m20250301_000004_create_books::Migration),
            Box::new(m20250301_000005_create_authorships::Migration),
            Box::new(m20250301_000006_create_book_styles::Migration),
            Box::new(m20250301_000007_create_administrators::Migration),
            // Indexes should always be applied last
            Box::new(m20250301_000008_add_indexes::Migration),
        ]
    }
}
