//! I/O helpers for sheet exports and JSON artifacts.
//!
//! All file I/O in form-compiler flows through this module:
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Encoding**: sheet exports are decoded via `encoding_rs`, defaulting to
//!   UTF-8 (Excel on Czech Windows commonly exports windows-1250).
//! - **Readers**: sheet exports are read without a header row and with ragged
//!   rows allowed; header discovery happens later in [`crate::rows`].
//! - **JSON**: pretty-printed, UTF-8, with the `-` path routing to stdio.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use serde::{Serialize, de::DeserializeOwned};

use crate::rows::Row;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_sheet_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_sheet_reader_from_path(
    path: &Path,
    delimiter: u8,
) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_sheet_reader(reader, delimiter))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

/// Decodes a record into a row, mapping empty cells to `None`.
pub fn decode_row(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Row> {
    record
        .iter()
        .map(|field| {
            if field.is_empty() {
                Ok(None)
            } else {
                decode_bytes(field, encoding).map(Some)
            }
        })
        .collect()
}

/// Reads every row of a sheet export.
pub fn read_sheet(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Vec<Row>> {
    let mut reader = open_sheet_reader_from_path(path, delimiter)?;
    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record =
            record.with_context(|| format!("Reading row {} in {:?}", row_idx + 1, path))?;
        let row = decode_row(&record, encoding)
            .with_context(|| format!("Decoding row {} in {:?}", row_idx + 1, path))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_json<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening JSON file {path:?}"))?,
        ))
    };
    serde_json::from_reader(reader).with_context(|| format!("Parsing JSON from {path:?}"))
}

/// Writes pretty JSON to `path`, or stdout when the path is omitted or `-`.
pub fn write_json<T>(path: Option<&Path>, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let mut writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, value).context("Writing JSON output")?;
    writeln!(writer).context("Writing JSON output")?;
    writer.flush().context("Flushing JSON output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1250;
    use tempfile::tempdir;

    #[test]
    fn tsv_extension_selects_tab() {
        assert_eq!(resolve_input_delimiter(Path::new("slovnik.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(Path::new("slovnik.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(Path::new("slovnik.tsv"), Some(b';')), b';');
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        assert!(resolve_encoding(Some("klingon")).is_err());
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
    }

    #[test]
    fn read_sheet_keeps_ragged_rows_and_nulls() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sheet.csv");
        let (encoded, _, _) = WINDOWS_1250.encode("a,,Název\nx\n");
        std::fs::write(&path, &encoded).unwrap();

        let rows = read_sheet(&path, b',', WINDOWS_1250).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            vec![Some("a".to_string()), None, Some("Název".to_string())]
        );
        assert_eq!(rows[1], vec![Some("x".to_string())]);
    }

    #[test]
    fn json_written_to_file_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("map.json");
        let value = serde_json::json!({"10057": "8501010001"});
        write_json(Some(&path), &value).unwrap();
        let back: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(back, value);
    }
}
