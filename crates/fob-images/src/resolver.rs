//! Fallback resolvers consulted when no scanned image matches a name.
//!
//! A resolver receives the canonical (PascalCase) name and may answer with a
//! bare path or a structured result. Both shapes are normalised into an
//! [`AssetRecord`] right away so the rest of the crate sees one type.

use crate::record::AssetRecord;
use std::fmt;

/// Answer produced by an [`ImageResolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A bare import path
    Path(String),
    /// A structured result carrying the import path
    Image { path: String },
}

impl Resolution {
    pub fn path(&self) -> &str {
        match self {
            Resolution::Path(path) | Resolution::Image { path } => path,
        }
    }

    /// Normalise into a record for `name`. Empty paths count as no answer.
    pub(crate) fn into_record(self, name: &str) -> Option<AssetRecord> {
        let path = match self {
            Resolution::Path(path) | Resolution::Image { path } => path,
        };
        if path.is_empty() {
            return None;
        }
        Some(AssetRecord {
            name: name.to_string(),
            path,
            source_path: None,
        })
    }
}

impl From<String> for Resolution {
    fn from(path: String) -> Self {
        Resolution::Path(path)
    }
}

impl From<&str> for Resolution {
    fn from(path: &str) -> Self {
        Resolution::Path(path.to_string())
    }
}

/// Resolve a canonical image name to an import path.
///
/// Implemented for any `Fn(&str) -> Option<R>` where `R: Into<Resolution>`:
///
/// ```
/// use fob_images::{ImageResolver, Resolution};
///
/// let resolver = |name: &str| (name == "TestCustom").then_some("/src/assets/test_custom.png");
/// assert_eq!(
///     resolver.resolve("TestCustom"),
///     Some(Resolution::Path("/src/assets/test_custom.png".into()))
/// );
/// assert_eq!(resolver.resolve("Other"), None);
/// ```
pub trait ImageResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Resolution>;
}

impl<F, R> ImageResolver for F
where
    F: Fn(&str) -> Option<R> + Send + Sync,
    R: Into<Resolution>,
{
    fn resolve(&self, name: &str) -> Option<Resolution> {
        self(name).map(Into::into)
    }
}

impl fmt::Debug for dyn ImageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ImageResolver")
    }
}
