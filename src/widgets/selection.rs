/// Which row of the current view, if any, is focused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    NoSelection,
    Selected(usize),
}

/// Selection and keyboard navigation over a view of `row_count` rows.
///
/// Out-of-range requests are ignored rather than reported. Navigation does
/// not wrap around.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selection: Selection,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected(&self) -> Option<usize> {
        match self.selection {
            Selection::Selected(index) => Some(index),
            Selection::NoSelection => None,
        }
    }

    /// Select `index` if it lies in `[0, row_count)`
    pub fn select(&mut self, index: usize, row_count: usize) -> bool {
        if index >= row_count {
            return false;
        }
        self.selection = Selection::Selected(index);
        true
    }

    pub fn clear(&mut self) {
        self.selection = Selection::NoSelection;
    }

    pub fn next(&mut self, row_count: usize) -> bool {
        match self.selection {
            Selection::NoSelection => self.select(0, row_count),
            Selection::Selected(index) => self.select(index + 1, row_count),
        }
    }

    pub fn previous(&mut self, row_count: usize) -> bool {
        match self.selection {
            Selection::NoSelection => self.select(0, row_count),
            Selection::Selected(0) => false,
            Selection::Selected(index) => self.select(index - 1, row_count),
        }
    }

    /// The view was replaced: drop the selection, then focus the first row
    /// when the user has typed something and there is a row to focus.
    pub fn on_data_changed(&mut self, has_input: bool, row_count: usize) {
        self.clear();
        if has_input && row_count > 0 {
            self.selection = Selection::Selected(0);
        }
    }
}
