use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// Canonical names referenced by each transformed file.
///
/// Keyed by the file's root-relative identity (`/src/App.vue`). Entries are
/// replaced on every transform of a file, never merged.
#[derive(Debug, Clone, Default)]
pub struct UsageMap {
    entries: IndexMap<String, FxHashSet<String>>,
}

impl UsageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the names recorded for `file`.
    pub fn replace<I>(&mut self, file: impl Into<String>, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.entries.insert(file.into(), names.into_iter().collect());
    }

    pub fn get(&self, file: &str) -> Option<&FxHashSet<String>> {
        self.entries.get(file)
    }

    pub fn remove(&mut self, file: &str) -> Option<FxHashSet<String>> {
        self.entries.shift_remove(file)
    }

    /// Files whose recorded names include `name`, in first-transform order.
    pub fn files_using(&self, name: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, names)| names.contains(name))
            .map(|(file, _)| file.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
