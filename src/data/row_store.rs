//! The authoritative, unfiltered row collection.
//!
//! Every structural edit lands here and nowhere else. Filtered views are
//! derived from this store by index, so rows a filter excluded are never lost.

use thiserror::Error;
use tracing::trace;

use crate::data::row::Row;

/// Structural edit addressed rows outside the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("cannot insert at index {index}: store holds {len} rows")]
    InsertOutOfRange { index: usize, len: usize },

    #[error("cannot remove {count} rows starting at {start}: store holds {len} rows")]
    RemoveOutOfRange {
        start: usize,
        count: usize,
        len: usize,
    },

    #[error("cannot overwrite {count} rows starting at {start}: store holds {len} rows")]
    SetOutOfRange {
        start: usize,
        count: usize,
        len: usize,
    },
}

/// Ordered rows, insertion order significant
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Replace the whole content
    pub fn replace_all(&mut self, rows: Vec<Row>) {
        trace!(target: "RowStore", "Replacing {} rows with {}", self.rows.len(), rows.len());
        self.rows = rows;
    }

    /// Insert `rows` before index `at`; `at == len` appends
    pub fn insert(&mut self, rows: Vec<Row>, at: usize) -> Result<(), RangeError> {
        if at > self.rows.len() {
            return Err(RangeError::InsertOutOfRange {
                index: at,
                len: self.rows.len(),
            });
        }

        trace!(target: "RowStore", "Inserting {} rows at {}", rows.len(), at);
        self.rows.splice(at..at, rows);
        Ok(())
    }

    /// Remove `count` rows starting at `start`
    pub fn remove(&mut self, start: usize, count: usize) -> Result<Vec<Row>, RangeError> {
        let end = start.checked_add(count).filter(|&end| end <= self.rows.len());
        let Some(end) = end else {
            return Err(RangeError::RemoveOutOfRange {
                start,
                count,
                len: self.rows.len(),
            });
        };

        trace!(target: "RowStore", "Removing rows {}..{}", start, end);
        Ok(self.rows.drain(start..end).collect())
    }

    /// Overwrite rows in place starting at `start`
    pub fn overwrite(&mut self, rows: Vec<Row>, start: usize) -> Result<(), RangeError> {
        let count = rows.len();
        let fits = start
            .checked_add(count)
            .is_some_and(|end| end <= self.rows.len());
        if !fits {
            return Err(RangeError::SetOutOfRange {
                start,
                count,
                len: self.rows.len(),
            });
        }

        trace!(target: "RowStore", "Overwriting {} rows from {}", count, start);
        for (offset, row) in rows.into_iter().enumerate() {
            self.rows[start + offset] = row;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(store: &RowStore) -> Vec<&str> {
        store.rows().iter().map(Row::key).collect()
    }

    fn store() -> RowStore {
        RowStore::from_rows(vec![
            Row::pair("a", "alpha"),
            Row::pair("b", "beta"),
            Row::pair("c", "gamma"),
        ])
    }

    #[test]
    fn test_insert_middle_and_end() {
        let mut store = store();
        store.insert(vec![Row::pair("x", "x-ray")], 1).unwrap();
        assert_eq!(keys(&store), vec!["a", "x", "b", "c"]);

        store.insert(vec![Row::pair("z", "zulu")], 4).unwrap();
        assert_eq!(keys(&store), vec!["a", "x", "b", "c", "z"]);
    }

    #[test]
    fn test_insert_out_of_range_leaves_store_untouched() {
        let mut store = store();
        let err = store.insert(vec![Row::pair("x", "x-ray")], 4).unwrap_err();
        assert_eq!(err, RangeError::InsertOutOfRange { index: 4, len: 3 });
        assert_eq!(keys(&store), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_remove() {
        let mut store = store();
        let removed = store.remove(0, 2).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(keys(&store), vec!["c"]);
    }

    #[test]
    fn test_remove_out_of_range_is_atomic() {
        let mut store = store();
        assert!(store.remove(2, 2).is_err());
        assert!(store.remove(usize::MAX, 2).is_err());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_overwrite() {
        let mut store = store();
        store
            .overwrite(vec![Row::pair("B", "BETA"), Row::pair("C", "GAMMA")], 1)
            .unwrap();
        assert_eq!(keys(&store), vec!["a", "B", "C"]);

        let err = store.overwrite(vec![Row::pair("q", "q")], 3).unwrap_err();
        assert!(matches!(err, RangeError::SetOutOfRange { start: 3, .. }));
    }
}
