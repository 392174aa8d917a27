//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates business logic from data access.
//! - Holds the cross-entity consistency rules (cascading deletes, publisher
//!   rename with re-parenting, genre get-or-create).
//! - Multi-write operations run inside a single database transaction.

pub mod errors;
pub mod auth;
pub mod author_service;
pub mod authorship_service;
pub mod book_service;
pub mod book_styles_service;
pub mod csv_service;
pub mod publishing_company_service;
pub mod styles_service;
#[cfg(test)]
pub mod test_support;
