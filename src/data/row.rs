use std::fmt;
use std::sync::Arc;

/// Column holding a row's key/identity
pub const KEY_COLUMN: usize = 0;

/// Column holding the searchable text
pub const TEXT_COLUMN: usize = 1;

/// One immutable record: an ordered tuple of cell values.
///
/// Cells are shared, so cloning a row into a view or a selection is cheap.
/// Replacing a row's content means installing a new `Row` at that index.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Row {
    cells: Arc<[String]>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells: cells.into(),
        }
    }

    /// Build the common two-column `(key, text)` row
    pub fn pair(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(vec![key.into(), text.into()])
    }

    /// Cell 0, or an empty string for an empty row
    pub fn key(&self) -> &str {
        self.cell(KEY_COLUMN).unwrap_or("")
    }

    /// Cell 1, the text every filter runs against
    pub fn text(&self) -> &str {
        self.cell(TEXT_COLUMN).unwrap_or("")
    }

    pub fn cell(&self, column: usize) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.cells.iter()).finish()
    }
}

impl From<Vec<String>> for Row {
    fn from(cells: Vec<String>) -> Self {
        Self::new(cells)
    }
}

impl<const N: usize> From<[&str; N]> for Row {
    fn from(cells: [&str; N]) -> Self {
        Self::new(cells.iter().map(|c| c.to_string()).collect())
    }
}
