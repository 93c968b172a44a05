//! Canonical image names.
//!
//! An image at `<dir>/icons/arrow-left.svg` is referenced as `IconsArrowLeft`;
//! an `index` file takes the name of its folder.

use regex::{Captures, Regex};
use std::path::Path;
use std::sync::OnceLock;

fn delimiter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[-_]([A-Za-z0-9_])").expect("invalid delimiter regex"))
}

/// Remove `-`/`_` delimiters, uppercasing the character that follows each one.
///
/// ```
/// assert_eq!(fob_images::camel_case("arrow-left_icon"), "arrowLeftIcon");
/// ```
pub fn camel_case(value: &str) -> String {
    delimiter_pattern()
        .replace_all(value, |caps: &Captures<'_>| caps[1].to_uppercase())
        .into_owned()
}

/// [`camel_case`] with the leading character uppercased.
///
/// ```
/// assert_eq!(fob_images::pascal_case("icons-arrow"), "IconsArrow");
/// ```
pub fn pascal_case(value: &str) -> String {
    let camel = camel_case(value);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derive the canonical name of an image.
///
/// `path` and `dirs` are root-relative and `/`-separated. The first directory
/// containing the image's parent folder is stripped; the remaining folders and
/// the file stem are joined with `-` and converted with [`pascal_case`].
pub fn derive_canonical_name(path: &str, dirs: &[String]) -> String {
    let (parent, file_name) = match path.rsplit_once('/') {
        Some((parent, file_name)) => (parent, file_name),
        None => ("", path),
    };

    let stripped = dirs
        .iter()
        .find_map(|dir| strip_dir(parent, dir))
        .unwrap_or("");

    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);
    let stem = if stem.eq_ignore_ascii_case("index") {
        ""
    } else {
        stem
    };

    let joined = stripped
        .split('/')
        .chain(std::iter::once(stem))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    pascal_case(&joined)
}

/// Return what is left of `parent` below `dir`, if `dir` contains it.
fn strip_dir<'a>(parent: &'a str, dir: &str) -> Option<&'a str> {
    if dir.is_empty() {
        return Some(parent);
    }
    if parent == dir {
        return Some("");
    }
    parent
        .strip_prefix(dir)
        .and_then(|rest| rest.strip_prefix('/'))
}
