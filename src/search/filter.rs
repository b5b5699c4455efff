//! Filter engine: maps (rows, pattern) to the ordered subsequence that matches.
//!
//! Matching always runs against the searchable text column. Literal patterns
//! are case-sensitive substring tests; regex patterns are compiled once per
//! pass and matched case-insensitively. Anchored patterns only accept a match
//! that starts at index 0.

use regex::Regex;
use thiserror::Error;

use crate::data::row::Row;
use crate::search::pattern::SearchPattern;

/// Pattern could not be turned into a matcher
#[derive(Debug, Clone, Error)]
pub enum PatternError {
    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled, ready-to-run row predicate
#[derive(Debug, Clone)]
pub enum Matcher {
    Literal { needle: String, anchored: bool },
    Regex { regex: Regex, anchored: bool },
}

impl Matcher {
    /// Compile `pattern`; `Ok(None)` when the pattern does not filter at all
    pub fn compile(pattern: &SearchPattern) -> Result<Option<Self>, PatternError> {
        let Some(text) = pattern.active_text() else {
            return Ok(None);
        };

        if !pattern.use_regex {
            return Ok(Some(Matcher::Literal {
                needle: text.to_string(),
                anchored: pattern.anchored,
            }));
        }

        let regex = Regex::new(&format!("(?i){}", text)).map_err(|source| {
            PatternError::InvalidRegex {
                pattern: text.to_string(),
                source,
            }
        })?;

        Ok(Some(Matcher::Regex {
            regex,
            anchored: pattern.anchored,
        }))
    }

    /// Position of the first match in `text`
    fn first_match(&self, text: &str) -> Option<usize> {
        match self {
            Matcher::Literal { needle, .. } => text.find(needle.as_str()),
            Matcher::Regex { regex, .. } => regex.find(text).map(|m| m.start()),
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        let anchored = match self {
            Matcher::Literal { anchored, .. } | Matcher::Regex { anchored, .. } => *anchored,
        };

        match self.first_match(text) {
            Some(idx) if anchored => idx == 0,
            Some(_) => true,
            None => false,
        }
    }

    pub fn matches_row(&self, row: &Row) -> bool {
        self.is_match(row.text())
    }
}

/// Indices of the rows accepted by `matcher`, in store order.
///
/// A missing matcher accepts everything.
pub fn filter_indices(rows: &[Row], matcher: Option<&Matcher>) -> Vec<usize> {
    match matcher {
        None => (0..rows.len()).collect(),
        Some(matcher) => rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matcher.matches_row(row))
            .map(|(idx, _)| idx)
            .collect(),
    }
}

/// Compile `pattern` and filter `rows` in one go
pub fn filter(rows: &[Row], pattern: &SearchPattern) -> Result<Vec<Row>, PatternError> {
    let matcher = Matcher::compile(pattern)?;
    Ok(filter_indices(rows, matcher.as_ref())
        .into_iter()
        .map(|idx| rows[idx].clone())
        .collect())
}
