use serde::Serialize;
use std::path::PathBuf;

/// One image known to the index, or returned by a fallback resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    /// Canonical (PascalCase) name
    pub name: String,

    /// Import path handed to the bundler, e.g. `/src/assets/img/logo.png`
    pub path: String,

    /// File backing the record; `None` for resolver results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
}

impl AssetRecord {
    /// Render the import statement binding this record's path to `binding`.
    ///
    /// ```
    /// use fob_images::AssetRecord;
    ///
    /// let record = AssetRecord {
    ///     name: "Logo".into(),
    ///     path: "/src/assets/img/logo.png".into(),
    ///     source_path: None,
    /// };
    /// assert_eq!(
    ///     record.import_statement("__fob_images_0"),
    ///     "import __fob_images_0 from '/src/assets/img/logo.png'"
    /// );
    /// ```
    pub fn import_statement(&self, binding: &str) -> String {
        format!("import {binding} from '{}'", self.path)
    }

    /// Whether `candidate` names this record's path, ignoring leading separators.
    pub(crate) fn matches_path(&self, candidate: &str) -> bool {
        self.path.trim_start_matches('/') == candidate.trim_start_matches('/')
    }
}
