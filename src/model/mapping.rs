use crate::model::Cell;
use std::collections::HashMap;
use std::convert::Infallible;
use std::str::FromStr;
use tracing::debug;

/// The header row of a stock sheet: which column each header label sits in.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Mapping {
    headers: Vec<Header>,
    header_map: HashMap<Header, usize>,
}

impl Mapping {
    /// Create a new `Mapping` from the cells of a header row.
    ///
    /// Labels are trimmed. Blank labels are kept as positional placeholders but cannot be looked
    /// up. When a label appears more than once, the leftmost column wins.
    pub fn new<'a, I>(header_row: I) -> Self
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let headers: Vec<Header> = header_row
            .into_iter()
            .map(|cell| Header::from(cell.to_text()))
            .collect();

        let mut header_map: HashMap<Header, usize> = HashMap::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            if header.is_blank() {
                continue;
            }
            if header_map.contains_key(header) {
                debug!(
                    "Header '{}' appears again in column {idx}, keeping the first one",
                    header.as_ref()
                );
                continue;
            }
            header_map.insert(header.clone(), idx);
        }

        Self {
            headers,
            header_map,
        }
    }

    /// The width of the header row, including blank labels.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// The column index of `header`, if the header row carries it.
    pub fn header_index(&self, header: impl AsRef<str>) -> Option<usize> {
        self.header_map.get(header.as_ref().trim()).cloned()
    }
}

/// Represents a header label in a stock sheet, for example, `Qty Available`
#[derive(Default, Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Header(String);

impl Header {
    fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Header {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::borrow::Borrow<str> for Header {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for Header {
    fn from(value: String) -> Self {
        Self(value.trim().to_string())
    }
}

impl From<&str> for Header {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl FromStr for Header {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}
