//! File-based CSV export/import for the whole catalog.
//!
//! Export writes UTF-8 with a byte-order mark, comma separated, no quoting.
//! Import clears the catalog tables, then loads files in dependency order,
//! upserting by key. Unlike everything else in this crate, import tolerates
//! bad rows: a malformed or referentially broken row is logged and skipped
//! while the batch continues.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use chrono::NaiveDate;
use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::ServiceError;
use models::{author, authorship, book, book_style, publishing_company, style};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Default, Serialize)]
pub struct CsvSummary {
    pub publishing_companies: usize,
    pub authors: usize,
    pub styles: usize,
    pub books: usize,
    pub authorships: usize,
    pub book_styles: usize,
}

/// Export every entity to one CSV file per table under `dir`.
pub async fn export_data(db: &DatabaseConnection, dir: &Path) -> Result<CsvSummary, ServiceError> {
    fs::create_dir_all(dir).map_err(|e| ServiceError::Io(e.to_string()))?;
    let summary = CsvSummary {
        authors: export_authors(db, dir).await?,
        publishing_companies: export_publishing_companies(db, dir).await?,
        styles: export_styles(db, dir).await?,
        books: export_books(db, dir).await?,
        authorships: export_authorships(db, dir).await?,
        book_styles: export_book_styles(db, dir).await?,
    };
    info!(?summary, "csv_export_finished");
    Ok(summary)
}

/// Clear the catalog and re-load it from the CSV files under `dir`, in
/// dependency order. Missing files skip their entity. One transaction overall;
/// row-level problems are logged and skipped.
pub async fn import_data(db: &DatabaseConnection, dir: &Path) -> Result<CsvSummary, ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    clear_catalog(&txn).await?;

    let summary = CsvSummary {
        publishing_companies: import_publishing_companies(&txn, dir).await?,
        authors: import_authors(&txn, dir).await?,
        styles: import_styles(&txn, dir).await?,
        books: import_books(&txn, dir).await?,
        authorships: import_authorships(&txn, dir).await?,
        book_styles: import_book_styles(&txn, dir).await?,
    };

    // Imported rows keep their exported ids; the sequences must catch up so
    // later creates do not collide.
    sync_sequence(&txn, "authors", "id").await?;
    sync_sequence(&txn, "styles", "id").await?;

    txn.commit().await.map_err(ServiceError::db)?;
    info!(?summary, "csv_import_finished");
    Ok(summary)
}

/// Truncate the six catalog tables. Administrator accounts are kept so an
/// import cannot lock the operator out.
async fn clear_catalog(txn: &DatabaseTransaction) -> Result<(), ServiceError> {
    txn.execute_unprepared(
        "TRUNCATE TABLE authorships, book_styles, books, styles, authors, publishing_companies \
         RESTART IDENTITY CASCADE",
    )
    .await
    .map_err(ServiceError::db)?;
    info!("catalog_cleared_before_import");
    Ok(())
}

async fn sync_sequence(
    txn: &DatabaseTransaction,
    table: &str,
    column: &str,
) -> Result<(), ServiceError> {
    let sql = format!(
        "SELECT setval(pg_get_serial_sequence('{table}', '{column}'), \
         (SELECT COALESCE(MAX({column}), 0) + 1 FROM {table}), false)"
    );
    txn.execute_unprepared(&sql).await.map_err(ServiceError::db)?;
    Ok(())
}

// =====================================================================
// Export
// =====================================================================

fn bom_writer(path: &Path) -> Result<csv::Writer<fs::File>, ServiceError> {
    let mut file = fs::File::create(path).map_err(|e| ServiceError::Io(e.to_string()))?;
    file.write_all(UTF8_BOM).map_err(|e| ServiceError::Io(e.to_string()))?;
    Ok(WriterBuilder::new().quote_style(QuoteStyle::Never).from_writer(file))
}

async fn export_authors(db: &DatabaseConnection, dir: &Path) -> Result<usize, ServiceError> {
    let rows = author::Entity::find().all(db).await.map_err(ServiceError::db)?;
    let mut writer = bom_writer(&dir.join("authors.csv"))?;
    writer
        .write_record(["id", "fio", "birth_date", "country", "nickname"])
        .map_err(|e| ServiceError::Io(e.to_string()))?;
    for a in &rows {
        writer
            .write_record([
                a.id.to_string(),
                a.fio.clone(),
                a.birth_date.clone().unwrap_or_default(),
                a.country.clone().unwrap_or_default(),
                a.nickname.clone().unwrap_or_default(),
            ])
            .map_err(|e| ServiceError::Io(e.to_string()))?;
    }
    writer.flush().map_err(|e| ServiceError::Io(e.to_string()))?;
    info!(count = rows.len(), "exported_authors");
    Ok(rows.len())
}

async fn export_publishing_companies(
    db: &DatabaseConnection,
    dir: &Path,
) -> Result<usize, ServiceError> {
    let rows = publishing_company::Entity::find().all(db).await.map_err(ServiceError::db)?;
    let mut writer = bom_writer(&dir.join("publishing_companies.csv"))?;
    writer
        .write_record(["name", "establishment_year", "contact_info", "city"])
        .map_err(|e| ServiceError::Io(e.to_string()))?;
    for c in &rows {
        writer
            .write_record([
                c.name.clone(),
                c.establishment_year.map(|d| d.to_string()).unwrap_or_default(),
                c.contact_info.clone().unwrap_or_default(),
                c.city.clone().unwrap_or_default(),
            ])
            .map_err(|e| ServiceError::Io(e.to_string()))?;
    }
    writer.flush().map_err(|e| ServiceError::Io(e.to_string()))?;
    info!(count = rows.len(), "exported_publishing_companies");
    Ok(rows.len())
}

async fn export_styles(db: &DatabaseConnection, dir: &Path) -> Result<usize, ServiceError> {
    let rows = style::Entity::find().all(db).await.map_err(ServiceError::db)?;
    let mut writer = bom_writer(&dir.join("styles.csv"))?;
    writer.write_record(["id", "name"]).map_err(|e| ServiceError::Io(e.to_string()))?;
    for s in &rows {
        writer
            .write_record([s.id.to_string(), s.name.clone()])
            .map_err(|e| ServiceError::Io(e.to_string()))?;
    }
    writer.flush().map_err(|e| ServiceError::Io(e.to_string()))?;
    info!(count = rows.len(), "exported_styles");
    Ok(rows.len())
}

async fn export_books(db: &DatabaseConnection, dir: &Path) -> Result<usize, ServiceError> {
    let rows = book::Entity::find().all(db).await.map_err(ServiceError::db)?;
    let mut writer = bom_writer(&dir.join("books.csv"))?;
    writer
        .write_record([
            "isbn",
            "name",
            "publication_year",
            "age_limit",
            "publishing_company",
            "page_count",
            "language",
            "cost",
            "count_of_books",
        ])
        .map_err(|e| ServiceError::Io(e.to_string()))?;
    for b in &rows {
        writer
            .write_record([
                b.isbn.clone(),
                b.name.clone(),
                b.publication_year.map(|d| d.to_string()).unwrap_or_default(),
                b.age_limit.to_string(),
                b.publishing_company.clone(),
                b.page_count.to_string(),
                b.language.clone().unwrap_or_default(),
                b.cost.map(|c| c.to_string()).unwrap_or_default(),
                b.count_of_books.to_string(),
            ])
            .map_err(|e| ServiceError::Io(e.to_string()))?;
    }
    writer.flush().map_err(|e| ServiceError::Io(e.to_string()))?;
    info!(count = rows.len(), "exported_books");
    Ok(rows.len())
}

async fn export_authorships(db: &DatabaseConnection, dir: &Path) -> Result<usize, ServiceError> {
    let rows = authorship::Entity::find().all(db).await.map_err(ServiceError::db)?;
    let mut writer = bom_writer(&dir.join("authorships.csv"))?;
    writer
        .write_record(["book_isbn", "author_id"])
        .map_err(|e| ServiceError::Io(e.to_string()))?;
    for r in &rows {
        writer
            .write_record([r.book_isbn.clone(), r.author_id.to_string()])
            .map_err(|e| ServiceError::Io(e.to_string()))?;
    }
    writer.flush().map_err(|e| ServiceError::Io(e.to_string()))?;
    info!(count = rows.len(), "exported_authorships");
    Ok(rows.len())
}

async fn export_book_styles(db: &DatabaseConnection, dir: &Path) -> Result<usize, ServiceError> {
    let rows = book_style::Entity::find().all(db).await.map_err(ServiceError::db)?;
    let mut writer = bom_writer(&dir.join("book_styles.csv"))?;
    writer
        .write_record(["book_isbn", "style_id"])
        .map_err(|e| ServiceError::Io(e.to_string()))?;
    for r in &rows {
        writer
            .write_record([r.book_isbn.clone(), r.style_id.to_string()])
            .map_err(|e| ServiceError::Io(e.to_string()))?;
    }
    writer.flush().map_err(|e| ServiceError::Io(e.to_string()))?;
    info!(count = rows.len(), "exported_book_styles");
    Ok(rows.len())
}

// =====================================================================
// Import
// =====================================================================

type BufferedCsvReader = csv::Reader<Cursor<Vec<u8>>>;

/// Open a CSV file for import, stripping a UTF-8 byte-order mark when
/// present. `Ok(None)` means the file does not exist.
fn open_reader(path: &Path) -> Result<Option<BufferedCsvReader>, ServiceError> {
    if !path.exists() {
        return Ok(None);
    }
    let mut bytes = fs::read(path).map_err(|e| ServiceError::Io(e.to_string()))?;
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(Cursor::new(bytes));
    Ok(Some(reader))
}

fn field(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or_default().to_string()
}

fn opt_field(record: &StringRecord, idx: usize) -> Option<String> {
    let value = field(record, idx);
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parse an exported date cell; empty means absent.
fn parse_date(value: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map(Some)
}

/// Like `parse_date`, but a bare 4-digit year is normalized to January 1st.
fn parse_year(value: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let value = value.trim();
    if value.len() == 4 && value.chars().all(|c| c.is_ascii_digit()) {
        return parse_date(&format!("{}-01-01", value));
    }
    parse_date(value)
}

async fn import_publishing_companies(
    txn: &DatabaseTransaction,
    dir: &Path,
) -> Result<usize, ServiceError> {
    let path = dir.join("publishing_companies.csv");
    let Some(mut reader) = open_reader(&path)? else {
        warn!("publishing_companies.csv not found, skipping");
        return Ok(0);
    };
    let mut imported = 0usize;
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "bad row in publishing_companies.csv");
                continue;
            }
        };
        if record.len() < 4 {
            warn!(?record, "short row in publishing_companies.csv");
            continue;
        }
        let name = field(&record, 0);
        if name.trim().is_empty() {
            warn!(?record, "publishing company row without a name");
            continue;
        }
        let establishment_year = match parse_year(&field(&record, 1)) {
            Ok(d) => d,
            Err(e) => {
                warn!(?record, error = %e, "bad establishment year");
                continue;
            }
        };
        let contact_info = opt_field(&record, 2);
        let city = opt_field(&record, 3);

        let existing = publishing_company::Entity::find_by_id(name.as_str())
            .one(txn)
            .await
            .map_err(ServiceError::db)?;
        match existing {
            Some(model) => {
                let mut am: publishing_company::ActiveModel = model.into();
                am.establishment_year = Set(establishment_year);
                am.contact_info = Set(contact_info);
                am.city = Set(city);
                am.update(txn).await.map_err(ServiceError::db)?;
            }
            None => {
                publishing_company::create(txn, &name, establishment_year, contact_info, city)
                    .await?;
            }
        }
        imported += 1;
    }
    info!(count = imported, "imported_publishing_companies");
    Ok(imported)
}

async fn import_authors(txn: &DatabaseTransaction, dir: &Path) -> Result<usize, ServiceError> {
    let path = dir.join("authors.csv");
    let Some(mut reader) = open_reader(&path)? else {
        warn!("authors.csv not found, skipping");
        return Ok(0);
    };
    let mut imported = 0usize;
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "bad row in authors.csv");
                continue;
            }
        };
        if record.len() < 5 {
            warn!(?record, "short row in authors.csv");
            continue;
        }
        let id = match opt_field(&record, 0).map(|v| v.trim().parse::<i32>()).transpose() {
            Ok(id) => id,
            Err(e) => {
                warn!(?record, error = %e, "bad author id");
                continue;
            }
        };
        let fio = field(&record, 1);
        if fio.trim().is_empty() {
            warn!(?record, "author row without fio");
            continue;
        }
        let birth_date = opt_field(&record, 2);
        let country = opt_field(&record, 3);
        let nickname = opt_field(&record, 4);

        // An id that still resolves updates in place; a fresh id is inserted
        // as-is so authorship rows keep pointing at the right author.
        let existing = match id {
            Some(id) => {
                author::Entity::find_by_id(id).one(txn).await.map_err(ServiceError::db)?
            }
            None => None,
        };
        match (existing, id) {
            (Some(model), _) => {
                let mut am: author::ActiveModel = model.into();
                am.fio = Set(fio);
                am.birth_date = Set(birth_date);
                am.country = Set(country);
                am.nickname = Set(nickname);
                am.update(txn).await.map_err(ServiceError::db)?;
            }
            (None, Some(id)) => {
                let am = author::ActiveModel {
                    id: Set(id),
                    fio: Set(fio),
                    birth_date: Set(birth_date),
                    country: Set(country),
                    nickname: Set(nickname),
                };
                am.insert(txn).await.map_err(ServiceError::db)?;
            }
            (None, None) => {
                author::create(txn, &fio, birth_date, country, nickname).await?;
            }
        }
        imported += 1;
    }
    info!(count = imported, "imported_authors");
    Ok(imported)
}

async fn import_styles(txn: &DatabaseTransaction, dir: &Path) -> Result<usize, ServiceError> {
    let path = dir.join("styles.csv");
    let Some(mut reader) = open_reader(&path)? else {
        warn!("styles.csv not found, skipping");
        return Ok(0);
    };
    let mut imported = 0usize;
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "bad row in styles.csv");
                continue;
            }
        };
        if record.len() < 2 {
            warn!(?record, "short row in styles.csv");
            continue;
        }
        let id = match opt_field(&record, 0).map(|v| v.trim().parse::<i64>()).transpose() {
            Ok(id) => id,
            Err(e) => {
                warn!(?record, error = %e, "bad style id");
                continue;
            }
        };
        let name = field(&record, 1);
        if name.trim().is_empty() {
            warn!(?record, "style row without a name");
            continue;
        }

        let existing = match id {
            Some(id) => style::Entity::find_by_id(id).one(txn).await.map_err(ServiceError::db)?,
            None => None,
        };
        match (existing, id) {
            (Some(model), _) => {
                let mut am: style::ActiveModel = model.into();
                am.name = Set(name);
                am.update(txn).await.map_err(ServiceError::db)?;
            }
            (None, Some(id)) => {
                let am = style::ActiveModel { id: Set(id), name: Set(name) };
                am.insert(txn).await.map_err(ServiceError::db)?;
            }
            (None, None) => {
                style::create(txn, &name).await?;
            }
        }
        imported += 1;
    }
    info!(count = imported, "imported_styles");
    Ok(imported)
}

async fn import_books(txn: &DatabaseTransaction, dir: &Path) -> Result<usize, ServiceError> {
    let path = dir.join("books.csv");
    let Some(mut reader) = open_reader(&path)? else {
        warn!("books.csv not found, skipping");
        return Ok(0);
    };
    let mut imported = 0usize;
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "bad row in books.csv");
                continue;
            }
        };
        if record.len() < 9 {
            warn!(?record, "short row in books.csv");
            continue;
        }
        let isbn = field(&record, 0);
        let name = field(&record, 1);
        if isbn.trim().is_empty() || name.trim().is_empty() {
            warn!(?record, "book row without isbn or name");
            continue;
        }
        let publication_year = match parse_date(&field(&record, 2)) {
            Ok(d) => d,
            Err(e) => {
                warn!(?record, error = %e, "bad publication year");
                continue;
            }
        };
        let age_limit = match field(&record, 3).trim().parse::<f32>() {
            Ok(v) => v,
            Err(e) => {
                warn!(?record, error = %e, "bad age limit");
                continue;
            }
        };
        let company_name = field(&record, 4);
        let page_count = match field(&record, 5).trim().parse::<i32>() {
            Ok(v) => v,
            Err(e) => {
                warn!(?record, error = %e, "bad page count");
                continue;
            }
        };
        let language = opt_field(&record, 6);
        let cost = match opt_field(&record, 7).map(|v| v.trim().parse::<Decimal>()).transpose() {
            Ok(v) => v,
            Err(e) => {
                warn!(?record, error = %e, "bad cost");
                continue;
            }
        };
        let count_of_books = match field(&record, 8).trim().parse::<i32>() {
            Ok(v) => v,
            Err(e) => {
                warn!(?record, error = %e, "bad book count");
                continue;
            }
        };

        // The publisher is a referential precondition for this row only
        let company = publishing_company::Entity::find_by_id(company_name.as_str())
            .one(txn)
            .await
            .map_err(ServiceError::db)?;
        let Some(company) = company else {
            warn!(?record, company = %company_name, "publishing company not found for book row");
            continue;
        };

        let existing =
            book::Entity::find_by_id(isbn.as_str()).one(txn).await.map_err(ServiceError::db)?;
        match existing {
            Some(model) => {
                let mut am: book::ActiveModel = model.into();
                am.name = Set(name);
                am.publication_year = Set(publication_year);
                am.age_limit = Set(age_limit);
                am.publishing_company = Set(company.name);
                am.page_count = Set(page_count);
                am.language = Set(language);
                am.cost = Set(cost);
                am.count_of_books = Set(count_of_books);
                am.update(txn).await.map_err(ServiceError::db)?;
            }
            None => {
                let am = book::ActiveModel {
                    isbn: Set(isbn),
                    name: Set(name),
                    publication_year: Set(publication_year),
                    age_limit: Set(age_limit),
                    publishing_company: Set(company.name),
                    page_count: Set(page_count),
                    language: Set(language),
                    cost: Set(cost),
                    count_of_books: Set(count_of_books),
                };
                am.insert(txn).await.map_err(ServiceError::db)?;
            }
        }
        imported += 1;
    }
    info!(count = imported, "imported_books");
    Ok(imported)
}

async fn import_authorships(txn: &DatabaseTransaction, dir: &Path) -> Result<usize, ServiceError> {
    let path = dir.join("authorships.csv");
    let Some(mut reader) = open_reader(&path)? else {
        warn!("authorships.csv not found, skipping");
        return Ok(0);
    };
    let mut imported = 0usize;
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "bad row in authorships.csv");
                continue;
            }
        };
        if record.len() < 2 {
            warn!(?record, "short row in authorships.csv");
            continue;
        }
        let isbn = field(&record, 0);
        let author_id = match field(&record, 1).trim().parse::<i32>() {
            Ok(v) => v,
            Err(e) => {
                warn!(?record, error = %e, "bad author id in authorships.csv");
                continue;
            }
        };
        if isbn.trim().is_empty() {
            warn!(?record, "authorship row without isbn");
            continue;
        }

        let book_exists =
            book::Entity::find_by_id(isbn.as_str()).one(txn).await.map_err(ServiceError::db)?;
        let author_exists =
            author::Entity::find_by_id(author_id).one(txn).await.map_err(ServiceError::db)?;
        if book_exists.is_none() || author_exists.is_none() {
            warn!(isbn = %isbn, author_id, "book or author not found for authorship row");
            continue;
        }
        let existing = authorship::Entity::find_by_id((isbn.clone(), author_id))
            .one(txn)
            .await
            .map_err(ServiceError::db)?;
        if existing.is_none() {
            authorship::create(txn, &isbn, author_id).await?;
            imported += 1;
        }
    }
    info!(count = imported, "imported_authorships");
    Ok(imported)
}

async fn import_book_styles(txn: &DatabaseTransaction, dir: &Path) -> Result<usize, ServiceError> {
    let path = dir.join("book_styles.csv");
    let Some(mut reader) = open_reader(&path)? else {
        warn!("book_styles.csv not found, skipping");
        return Ok(0);
    };
    let mut imported = 0usize;
    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "bad row in book_styles.csv");
                continue;
            }
        };
        if record.len() < 2 {
            warn!(?record, "short row in book_styles.csv");
            continue;
        }
        let isbn = field(&record, 0);
        let style_id = match field(&record, 1).trim().parse::<i64>() {
            Ok(v) => v,
            Err(e) => {
                warn!(?record, error = %e, "bad style id in book_styles.csv");
                continue;
            }
        };
        if isbn.trim().is_empty() {
            warn!(?record, "book style row without isbn");
            continue;
        }

        let book_exists =
            book::Entity::find_by_id(isbn.as_str()).one(txn).await.map_err(ServiceError::db)?;
        let style_exists =
            style::Entity::find_by_id(style_id).one(txn).await.map_err(ServiceError::db)?;
        if book_exists.is_none() || style_exists.is_none() {
            warn!(isbn = %isbn, style_id, "book or style not found for book style row");
            continue;
        }
        let existing = book_style::Entity::find_by_id((isbn.clone(), style_id))
            .one(txn)
            .await
            .map_err(ServiceError::db)?;
        if existing.is_none() {
            book_style::create(txn, &isbn, style_id).await?;
            imported += 1;
        }
    }
    info!(count = imported, "imported_book_styles");
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book_service::{self, AuthorRef, BookInput};
    use crate::publishing_company_service;
    use crate::test_support::get_db;
    use serial_test::serial;
    use uuid::Uuid;

    #[test]
    fn bare_year_normalizes_to_january_first() {
        let parsed = parse_year("1999").expect("parse");
        assert_eq!(parsed, NaiveDate::from_ymd_opt(1999, 1, 1));
        assert_eq!(parse_year("").expect("empty"), None);
        assert!(parse_year("not-a-year").is_err());
    }

    #[test]
    fn full_dates_pass_through() {
        let parsed = parse_date("2020-06-15").expect("parse");
        assert_eq!(parsed, NaiveDate::from_ymd_opt(2020, 6, 15));
        assert_eq!(parse_date("  ").expect("blank"), None);
    }

    #[test]
    fn reader_strips_byte_order_mark() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("authors.csv");
        let mut payload = Vec::new();
        payload.extend_from_slice(UTF8_BOM);
        payload.extend_from_slice(b"id,fio,birth_date,country,nickname\n1,A. Test,,,\n");
        fs::write(&path, payload).expect("write");

        let mut reader = open_reader(&path).expect("open").expect("exists");
        let headers = reader.headers().expect("headers").clone();
        assert_eq!(&headers[0], "id");
        let records: Vec<StringRecord> =
            reader.records().collect::<Result<_, _>>().expect("records");
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][1], "A. Test");
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = open_reader(&dir.path().join("nope.csv")).expect("open");
        assert!(missing.is_none());
    }

    #[test]
    fn export_format_is_unquoted_with_bom() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("styles.csv");
        let mut writer = bom_writer(&path).expect("writer");
        writer.write_record(["id", "name"]).expect("header");
        writer.write_record(["1", "Drama"]).expect("row");
        writer.flush().expect("flush");
        drop(writer);

        let bytes = fs::read(&path).expect("read");
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).expect("utf8");
        assert!(text.starts_with("id,name\n"));
        assert!(!text.contains('"'));
    }

    #[tokio::test]
    #[serial]
    async fn export_then_import_round_trips_the_catalog() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let dir = tempfile::tempdir()?;
        let company = format!("Press-{}", Uuid::new_v4());
        let isbn = format!("isbn-{}", Uuid::new_v4());
        let genre = format!("Genre-{}", Uuid::new_v4());
        let created = book_service::create_book(
            &db,
            BookInput {
                isbn: isbn.clone(),
                name: "Round Tripper".into(),
                publishing_company: company.clone(),
                authors: vec![AuthorRef { fio: Some("Csv Writer".into()), ..Default::default() }],
                genres: vec![genre.clone()],
                ..Default::default()
            },
        )
        .await?;
        let author_id = created.authors[0].id;
        let style_id = created.genres[0].id;

        let exported = export_data(&db, dir.path()).await?;
        assert!(exported.books >= 1);
        assert!(exported.authorships >= 1);

        let imported = import_data(&db, dir.path()).await?;
        assert_eq!(imported.books, exported.books);
        assert_eq!(imported.authorships, exported.authorships);

        // The book comes back with the same author and genre ids
        let reread = book_service::get_book(&db, &isbn).await?.expect("book survives import");
        assert_eq!(reread.book.name, "Round Tripper");
        assert_eq!(reread.authors.iter().map(|a| a.id).collect::<Vec<_>>(), vec![author_id]);
        assert_eq!(reread.genres.iter().map(|s| s.id).collect::<Vec<_>>(), vec![style_id]);

        // The sequence kept up: a fresh author gets an unused id
        let fresh = crate::author_service::create_author(
            &db,
            crate::author_service::AuthorInput { fio: "After Import".into(), ..Default::default() },
        )
        .await?;
        assert!(fresh.id > 0);
        crate::author_service::delete_author(&db, fresh.id).await?;

        publishing_company_service::delete_publishing_company(&db, &company).await?;
        Ok(())
    }

    #[tokio::test]
    #[serial]
    async fn broken_rows_are_skipped_and_the_batch_continues() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let dir = tempfile::tempdir()?;
        let company = format!("Press-{}", Uuid::new_v4());
        fs::write(
            dir.path().join("publishing_companies.csv"),
            format!("name,establishment_year,contact_info,city\n{},bogus-year,,\n{},1999,,Riga\n", company, company),
        )?;
        fs::write(
            dir.path().join("books.csv"),
            "isbn,name,publication_year,age_limit,publishing_company,page_count,language,cost,count_of_books\nx-1,Ghost Book,,0,No Such Press,10,,,1\n",
        )?;

        let imported = import_data(&db, dir.path()).await?;
        // First company row has a bad year and is skipped, the second lands;
        // the book references an unknown publisher and is skipped entirely.
        assert_eq!(imported.publishing_companies, 1);
        assert_eq!(imported.books, 0);
        let stored = publishing_company_service::get_publishing_company(&db, &company)
            .await?
            .expect("second row imported");
        assert_eq!(stored.city.as_deref(), Some("Riga"));
        assert!(book_service::get_book(&db, "x-1").await?.is_none());

        publishing_company_service::delete_publishing_company(&db, &company).await?;
        Ok(())
    }
}
