//! Path alias handling for image directories and paths.
//!
//! Resolves aliases (e.g., "@" → "src") before names are derived, so
//! `@/assets/img` and `src/assets/img` describe the same directory.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A single `{ find, replacement }` alias entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub find: String,
    pub replacement: String,
}

impl Alias {
    pub fn new(find: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replacement: replacement.into(),
        }
    }

    /// Apply this alias to `path` when `find` is a whole leading segment.
    fn apply(&self, path: &str) -> Option<String> {
        if self.find.is_empty() {
            return None;
        }
        let rest = path.strip_prefix(self.find.as_str())?;

        // "@" must not match "@scope/..." partially
        let rest = if rest.is_empty() || self.find.ends_with('/') {
            rest
        } else {
            rest.strip_prefix('/')?
        };
        let rest = rest.trim_start_matches('/');

        let target = self.replacement.trim_end_matches('/');
        Some(if rest.is_empty() {
            target.to_string()
        } else if target.is_empty() {
            rest.to_string()
        } else {
            format!("{target}/{rest}")
        })
    }
}

/// Ordered alias table; the first matching entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: Vec<Alias>,
}

impl AliasTable {
    pub fn new(entries: Vec<Alias>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, alias: Alias) {
        self.entries.push(alias);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `path` through the table, returning it unchanged when no alias matches.
    pub fn resolve<'a>(&self, path: &'a str) -> Cow<'a, str> {
        self.entries
            .iter()
            .find_map(|alias| alias.apply(path))
            .map_or(Cow::Borrowed(path), Cow::Owned)
    }
}

impl From<Vec<Alias>> for AliasTable {
    fn from(entries: Vec<Alias>) -> Self {
        Self::new(entries)
    }
}
