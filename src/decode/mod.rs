//! Collaborators that turn raw document bytes into something the engine can work with.
//!
//! A stock sheet is decoded into a `RawGrid` by a `SpreadsheetDecoder`, and a sales report is
//! reduced to plain text by a `TextExtractor`. Which one is used depends on the `DocumentKind`.

mod sheet;
mod text;

pub use sheet::{CsvDecoder, WorkbookDecoder};
pub use text::{PdfExtractor, PlainTextExtractor};

use crate::model::RawGrid;
use crate::Res;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors reported by a `SpreadsheetDecoder`.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The bytes could not be read as a spreadsheet at all.
    #[error("{0}")]
    Unreadable(String),

    /// The spreadsheet has no sheets.
    #[error("The workbook contains no sheets")]
    NoSheets,

    /// The spreadsheet was readable but its rows are not laid out as a table. The built-in
    /// decoders accept ragged rows and never report this.
    #[error("{0}")]
    Malformed(String),
}

/// Errors reported by a `TextExtractor`. These abort a reconciliation run before any item is
/// touched.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The bytes could not be read as a document of the expected kind.
    #[error("The document could not be read: {0}")]
    Unreadable(String),

    /// The document was read but holds no text, e.g. a scanned report.
    #[error("The document contains no extractable text")]
    NoText,
}

/// Decodes the bytes of a stock sheet into rows of cells.
pub trait SpreadsheetDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RawGrid, DecodeError>;
}

/// Extracts the full plain text of a sales report. Multi-page documents are returned as one
/// string with the pages separated by whitespace.
pub trait TextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// The kinds of documents that can be read.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Excel, OpenDocument and other workbooks.
    Workbook,
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// PDF reports.
    Pdf,
    /// Plain UTF-8 text.
    Text,
}

serde_plain::derive_display_from_serialize!(DocumentKind);
serde_plain::derive_fromstr_from_deserialize!(DocumentKind);

impl DocumentKind {
    /// Guesses the kind of document from the extension of `path`.
    pub fn from_path(path: &Path) -> Res<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Ok(match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => DocumentKind::Workbook,
            "csv" => DocumentKind::Csv,
            "tsv" | "tab" => DocumentKind::Tsv,
            "pdf" => DocumentKind::Pdf,
            "txt" | "text" => DocumentKind::Text,
            _ => bail!(
                "Unable to tell what kind of document '{}' is, please pass --format",
                path.display()
            ),
        })
    }

    /// The decoder for a stock sheet of this kind.
    pub fn spreadsheet_decoder(&self) -> Res<Box<dyn SpreadsheetDecoder>> {
        Ok(match self {
            DocumentKind::Workbook => Box::new(WorkbookDecoder),
            DocumentKind::Csv => Box::new(CsvDecoder::new(b',')),
            DocumentKind::Tsv => Box::new(CsvDecoder::new(b'\t')),
            DocumentKind::Pdf | DocumentKind::Text => {
                bail!("A {self} document cannot be read as a stock sheet")
            }
        })
    }

    /// The extractor for a sales report of this kind.
    pub fn text_extractor(&self) -> Res<Box<dyn TextExtractor>> {
        Ok(match self {
            DocumentKind::Pdf => Box::new(PdfExtractor),
            DocumentKind::Text | DocumentKind::Csv | DocumentKind::Tsv => {
                Box::new(PlainTextExtractor)
            }
            DocumentKind::Workbook => {
                bail!("A {self} document cannot be read as a sales report")
            }
        })
    }
}
