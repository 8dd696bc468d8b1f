//! Turns a decoded stock sheet into canonical inventory items.
//!
//! The sheet may start with title or metadata rows; the caller says how many to skip. The first
//! row after those is the header row, and every row below it is a candidate item. Each canonical
//! field is read from the first of its alias columns that holds a non-empty cell.

use crate::decode::DecodeError;
use crate::model::{
    Amount, Cell, ColumnAliases, Field, InventoryItem, ItemDefaults, Mapping, RawGrid,
    UNKNOWN_NAME,
};
use rust_decimal::Decimal;
use tracing::{debug, trace};

/// The reasons an ingestion run fails. A failed run never touches the existing inventory.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// There is no header row, or no data row beneath it, after the skipped rows.
    #[error("The document has no data rows after skipping {header_offset} row(s)")]
    EmptyDocument { header_offset: usize },

    /// The decoder found rows that are not laid out as a table.
    #[error("The document is malformed: {0}")]
    MalformedStructure(String),

    /// The spreadsheet decoder could not read the document.
    #[error("The document could not be decoded: {0}")]
    DecodeFailure(String),
}

impl From<DecodeError> for IngestError {
    fn from(value: DecodeError) -> Self {
        match value {
            DecodeError::Malformed(msg) => IngestError::MalformedStructure(msg),
            other => IngestError::DecodeFailure(other.to_string()),
        }
    }
}

/// Converts `grid` into items, one per data row that has a recognizable name, in row order.
///
/// - `header_offset` rows are skipped before the header row.
/// - Cells beyond the width of the header row have no label and are ignored.
/// - Numeric fields go through `Cell::to_decimal`, so malformed numbers become zero rather than
///   failing the run.
/// - A missing category gets `defaults.default_category()`. A missing name makes the row
///   `UNKNOWN_NAME`, and such rows are dropped.
pub fn ingest(
    grid: &RawGrid,
    header_offset: usize,
    columns: &ColumnAliases,
    defaults: &ItemDefaults,
) -> Result<Vec<InventoryItem>, IngestError> {
    let mut rows = grid.rows().iter().skip(header_offset);
    let mapping = match rows.next() {
        Some(header_row) => Mapping::new(header_row),
        None => return Err(IngestError::EmptyDocument { header_offset }),
    };
    trace!("Header row: {:?}", mapping.headers());

    let data_rows: Vec<&Vec<Cell>> = rows.collect();
    if data_rows.is_empty() {
        return Err(IngestError::EmptyDocument { header_offset });
    }

    let mut items = Vec::with_capacity(data_rows.len());
    let mut dropped = 0usize;
    for row in data_rows {
        let name = text_field(&mapping, row, columns, Field::Name)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        if name == UNKNOWN_NAME {
            dropped += 1;
            continue;
        }

        let category = text_field(&mapping, row, columns, Field::Category)
            .unwrap_or_else(|| defaults.default_category().to_string());
        let quantity_on_hand = number_field(&mapping, row, columns, Field::QuantityOnHand);
        let unit_price = Amount::new(number_field(&mapping, row, columns, Field::UnitPrice));
        let unit_cost = Amount::new(number_field(&mapping, row, columns, Field::UnitCost));

        items.push(InventoryItem::new(
            name,
            category,
            quantity_on_hand,
            unit_price,
            unit_cost,
        ));
    }

    debug!(
        "Ingested {} item(s), dropped {dropped} row(s) without a name",
        items.len()
    );
    Ok(items)
}

/// Finds the first alias of `field` that the header row carries and whose cell in `row` is
/// non-empty.
fn resolve<'a>(
    mapping: &Mapping,
    row: &'a [Cell],
    columns: &ColumnAliases,
    field: Field,
) -> Option<&'a Cell> {
    columns
        .aliases(field)
        .iter()
        .filter_map(|alias| mapping.header_index(alias))
        .filter_map(|ix| row.get(ix))
        .find(|cell| !cell.is_empty())
}

fn text_field(
    mapping: &Mapping,
    row: &[Cell],
    columns: &ColumnAliases,
    field: Field,
) -> Option<String> {
    resolve(mapping, row, columns, field).map(Cell::to_text)
}

fn number_field(mapping: &Mapping, row: &[Cell], columns: &ColumnAliases, field: Field) -> Decimal {
    resolve(mapping, row, columns, field)
        .map(Cell::to_decimal)
        .unwrap_or_default()
}
