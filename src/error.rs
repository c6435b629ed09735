use thiserror::Error;

/// Fatal problems with the shape of the dictionary sheet.
///
/// Per-row problems are never raised through this type; they are skipped and
/// counted in the build summary instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("Required column '{name}' not found in header row {row}")]
    MissingColumn { name: String, row: usize },
    #[error("Header row {row} is out of range: sheet contains {available} row(s)")]
    HeaderRowOutOfRange { row: usize, available: usize },
    #[error("Header row must be 1-based, got 0")]
    ZeroHeaderRow,
}
