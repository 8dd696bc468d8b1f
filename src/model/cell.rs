//! Raw spreadsheet cells and the permissive numeric coercion applied to them.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// A single raw cell value as delivered by a spreadsheet decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// A cell is empty when it holds nothing or only whitespace.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    /// The trimmed text form of the cell. Whole numbers are written without a fractional part.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            Cell::Text(s) => s.trim().to_string(),
        }
    }

    /// Coerces the cell to a number.
    ///
    /// Numbers are taken as-is. For text, every character other than an ascii digit, `.` or `-`
    /// is removed and the remainder is parsed, so `"$1,200.50"` becomes `1200.50`. Anything that
    /// does not survive this, including an empty cell, is zero. Numbers too large for a `Decimal`
    /// saturate at `Decimal::MAX` or `Decimal::MIN`.
    pub fn to_decimal(&self) -> Decimal {
        match self {
            Cell::Empty => Decimal::ZERO,
            Cell::Number(n) => number_to_decimal(*n),
            Cell::Text(s) => coerce_text(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

fn number_to_decimal(n: f64) -> Decimal {
    if let Some(value) = Decimal::from_f64(n) {
        return value;
    }
    if n.is_nan() {
        return Decimal::ZERO;
    }
    debug!("{n} is out of range, saturating");
    if n.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

fn coerce_text(s: &str) -> Decimal {
    let numeric: String = s
        .chars()
        .filter(|&c| c.is_ascii_digit() || c == '.' || c == '-')
        .collect();
    match Decimal::from_str(&numeric) {
        Ok(value) => value,
        // well-formed but too many integer digits for a Decimal
        Err(_) => match numeric.parse::<f64>() {
            Ok(n) => number_to_decimal(n),
            Err(_) => Decimal::ZERO,
        },
    }
}

/// The rows of a decoded spreadsheet, top to bottom, each a list of cells left to right.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Builds a grid from rows of anything that converts into a `Cell`, which is handy for text
    /// sources such as CSV.
    pub fn from_rows<C, R, I>(rows: I) -> Self
    where
        C: Into<Cell>,
        R: IntoIterator<Item = C>,
        I: IntoIterator<Item = R>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
