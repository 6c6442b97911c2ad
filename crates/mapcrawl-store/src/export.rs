//! Spreadsheet-friendly CSV export.
//!
//! The file starts with a UTF-8 byte-order mark so spreadsheet applications
//! pick the right encoding for non-ASCII names, and every field is quoted.

use std::io::Write;
use std::path::{Path, PathBuf};

use mapcrawl_core::Record;

use crate::error::StoreError;

const BOM: &[u8] = "\u{feff}".as_bytes();

pub const CSV_HEADER: [&str; 8] = [
    "Name",
    "Phone1",
    "Phone2",
    "Address",
    "City",
    "District",
    "Category",
    "SourceLink",
];

/// `businesses_<count>_records.csv`
#[must_use]
pub fn export_file_name(count: usize) -> String {
    format!("businesses_{count}_records.csv")
}

/// Split the stored phone string into the two export columns.
fn phone_columns(phone: &str) -> (String, String) {
    let mut parts = phone.split(',').map(str::trim);
    let first = parts.next().unwrap_or_default().to_owned();
    let second = parts.next().unwrap_or_default().to_owned();
    (first, second)
}

/// Write `records` as CSV (BOM, header, one row per record) to `writer`.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] if writing fails.
pub fn write_csv<W: Write>(mut writer: W, records: &[Record]) -> Result<(), StoreError> {
    // Bare header; data rows are always quoted.
    let header = format!("{}\n", CSV_HEADER.join(","));
    writer
        .write_all(BOM)
        .and_then(|()| writer.write_all(header.as_bytes()))
        .map_err(|e| StoreError::Csv(e.into()))?;

    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for r in records {
        let (phone1, phone2) = phone_columns(&r.phone);
        csv_writer.write_record([
            r.name.as_str(),
            phone1.as_str(),
            phone2.as_str(),
            r.address.as_str(),
            r.city.as_str(),
            r.district.as_str(),
            r.category.as_str(),
            r.source_url.as_str(),
        ])?;
    }
    csv_writer.flush().map_err(|e| StoreError::Csv(e.into()))?;
    Ok(())
}

/// Write the export file into `dir` and return its path.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the directory or file cannot be created, or
/// [`StoreError::Csv`] if writing fails.
pub fn export_csv(dir: &Path, records: &[Record]) -> Result<PathBuf, StoreError> {
    std::fs::create_dir_all(dir).map_err(|e| StoreError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    let path = dir.join(export_file_name(records.len()));
    let file = std::fs::File::create(&path).map_err(|e| StoreError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    write_csv(std::io::BufWriter::new(file), records)?;
    tracing::info!(path = %path.display(), count = records.len(), "exported records");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_embeds_count() {
        assert_eq!(export_file_name(42), "businesses_42_records.csv");
    }

    #[test]
    fn phone_columns_split_on_comma() {
        assert_eq!(
            phone_columns("0212 555 12 34, 0532 111 22 33"),
            ("0212 555 12 34".to_owned(), "0532 111 22 33".to_owned())
        );
    }

    #[test]
    fn phone_columns_single_number_leaves_second_empty() {
        assert_eq!(
            phone_columns("0212 555 12 34"),
            ("0212 555 12 34".to_owned(), String::new())
        );
    }

    #[test]
    fn phone_columns_ignore_third_number() {
        let (a, b) = phone_columns("1, 2, 3");
        assert_eq!((a.as_str(), b.as_str()), ("1", "2"));
    }

    #[test]
    fn empty_collection_writes_bom_and_bare_header_only() {
        let mut out = Vec::new();
        write_csv(&mut out, &[]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "\u{feff}Name,Phone1,Phone2,Address,City,District,Category,SourceLink\n"
        );
    }
}
