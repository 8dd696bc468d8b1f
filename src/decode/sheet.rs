use crate::decode::{DecodeError, SpreadsheetDecoder};
use crate::model::{Cell, RawGrid};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use tracing::{debug, warn};

/// Reads the first sheet of an xlsx, xlsm, xlsb, xls or ods workbook.
///
/// Rows are numbered from the top of the sheet, not from the first non-empty cell, so a header
/// offset means the same thing it does when looking at the sheet in a spreadsheet program. Other
/// sheets are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkbookDecoder;

impl SpreadsheetDecoder for WorkbookDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RawGrid, DecodeError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| DecodeError::Unreadable(format!("Failed to open workbook: {e}")))?;

        let sheet_names = workbook.sheet_names().to_vec();
        let Some(sheet_name) = sheet_names.first() else {
            return Err(DecodeError::NoSheets);
        };
        if sheet_names.len() > 1 {
            warn!(
                "The workbook has {} sheets, only '{sheet_name}' will be read",
                sheet_names.len()
            );
        }

        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| DecodeError::Unreadable(format!("Failed to read sheet '{sheet_name}': {e}")))?;

        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row as usize];
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; start_col as usize];
            cells.extend(row.iter().map(to_cell));
            rows.push(cells);
        }
        debug!("Decoded {} row(s) from sheet '{sheet_name}'", rows.len());
        Ok(RawGrid::new(rows))
    }
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // Spreadsheet errors such as #N/A carry no usable value
        Data::Error(_) => Cell::Empty,
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Reads delimited text. Rows may have different lengths, which is common when a few title lines
/// sit above the table.
#[derive(Debug, Clone, Copy)]
pub struct CsvDecoder {
    delimiter: u8,
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl CsvDecoder {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl SpreadsheetDecoder for CsvDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RawGrid, DecodeError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut rows = Vec::new();
        for (ix, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                DecodeError::Unreadable(format!("Failed to read line {}: {e}", ix + 1))
            })?;
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.trim().is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(field.to_string())
                        }
                    })
                    .collect(),
            );
        }
        debug!("Decoded {} row(s) of delimited text", rows.len());
        Ok(RawGrid::new(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_ragged_rows() {
        let data = "Stock as of Monday\nName,Qty,Price\nBolt,7,\"$1,200.50\"\n";
        let grid = CsvDecoder::default().decode(data.as_bytes()).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.rows()[0].len(), 1);
        assert_eq!(grid.rows()[2][2], Cell::from("$1,200.50"));
    }

    #[test]
    fn test_csv_blank_fields_are_empty() {
        let grid = CsvDecoder::default().decode(b"a, ,c\n").unwrap();
        assert_eq!(grid.rows()[0][1], Cell::Empty);
    }

    #[test]
    fn test_csv_strips_bom() {
        let grid = CsvDecoder::default()
            .decode(b"\xEF\xBB\xBFName,Qty\n")
            .unwrap();
        assert_eq!(grid.rows()[0][0], Cell::from("Name"));
    }

    #[test]
    fn test_tsv() {
        let grid = CsvDecoder::new(b'\t').decode(b"Name\tQty\nNut\t3\n").unwrap();
        assert_eq!(grid.rows()[1][1], Cell::from("3"));
    }

    #[test]
    fn test_csv_invalid_utf8() {
        let err = CsvDecoder::default().decode(b"Name\n\xFF\xFE\n").unwrap_err();
        assert!(matches!(err, DecodeError::Unreadable(_)));
    }

    #[test]
    fn test_workbook_garbage() {
        let err = WorkbookDecoder.decode(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, DecodeError::Unreadable(_)));
    }

    #[test]
    fn test_to_cell() {
        assert_eq!(to_cell(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(to_cell(&Data::Float(2.5)), Cell::Number(2.5));
        assert_eq!(to_cell(&Data::String("x".into())), Cell::from("x"));
        assert_eq!(to_cell(&Data::Empty), Cell::Empty);
        assert_eq!(to_cell(&Data::Bool(true)), Cell::from("TRUE"));
    }
}
