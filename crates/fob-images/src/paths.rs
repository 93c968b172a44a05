//! Path normalisation shared by the index and the transform.
//!
//! Index paths are root-relative, `/`-separated and carry no leading slash
//! (`src/assets/img/logo.png`). Import paths and file identities add a
//! leading slash (`/src/assets/img/logo.png`).

use std::collections::BTreeMap;
use std::path::Path;

/// A module id split into its path and query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedId<'a> {
    pub path: &'a str,
    pub query: BTreeMap<String, String>,
}

/// Split `id` at the first `?`.
///
/// ```
/// let parsed = fob_images::parse_id("/src/App.vue?vue&type=template");
/// assert_eq!(parsed.path, "/src/App.vue");
/// assert!(parsed.query.contains_key("type"));
/// ```
pub fn parse_id(id: &str) -> ParsedId<'_> {
    let Some((path, raw_query)) = id.split_once('?') else {
        return ParsedId {
            path: id,
            query: BTreeMap::new(),
        };
    };

    let query = raw_query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect();

    ParsedId { path, query }
}

/// Convert backslashes and collapse `.`/empty segments.
pub fn normalize_slashes(path: &str) -> String {
    let converted = path.replace('\\', "/");
    let leading = converted.starts_with('/');
    let joined = converted
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");
    if leading {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Express `path` relative to `root` without a leading slash.
///
/// Paths outside `root` are only normalised.
pub fn root_relative(root: &Path, path: &str) -> String {
    let normalized = normalize_slashes(path);
    let root = normalize_slashes(&root.to_string_lossy());

    if !root.is_empty() && root != "/" {
        if normalized == root {
            return String::new();
        }
        if let Some(rest) = normalized
            .strip_prefix(root.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
        {
            return rest.to_string();
        }
    }

    normalized.trim_start_matches('/').to_string()
}
