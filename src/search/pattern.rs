/// The active search string plus its match-mode flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPattern {
    /// `None` or an empty string means "no filtering"
    pub text: Option<String>,
    /// Only match at the start of the searchable text
    pub anchored: bool,
    /// Interpret `text` as a case-insensitive regular expression
    pub use_regex: bool,
}

impl SearchPattern {
    pub fn new(text: Option<String>) -> Self {
        Self {
            text,
            ..Default::default()
        }
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(Some(text.into()))
    }

    pub fn regex(text: impl Into<String>) -> Self {
        Self {
            use_regex: true,
            ..Self::literal(text)
        }
    }

    pub fn anchored(mut self, anchored: bool) -> Self {
        self.anchored = anchored;
        self
    }

    /// The pattern text when it actually filters anything
    pub fn active_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.active_text().is_none()
    }

    /// Length in characters, zero when inactive
    pub fn char_len(&self) -> usize {
        self.active_text().map_or(0, |t| t.chars().count())
    }
}
