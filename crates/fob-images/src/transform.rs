//! Component transform: replace name lookups with imports of resolved images.
//!
//! Runs over compiled component output, not source. For the default pattern
//!
//! ```text
//! { src: _ctx.Logo }
//! ```
//!
//! becomes
//!
//! ```text
//! import __fob_images_0 from '/src/assets/img/logo.png'
//! ...
//! { src: __fob_images_0 }
//! ```
//!
//! Matching is textual: one left-to-right pass, non-overlapping matches, at
//! most one import per match.

use crate::error::{ImagesError, Result};
use crate::index::AssetIndex;
use crate::naming::pascal_case;
use crate::options::{ImagesOptions, has_extension};
use crate::paths::parse_id;
use indexmap::IndexSet;
use regex::Regex;
use tracing::debug;

/// Prefix of generated binding identifiers.
pub const BINDING_PREFIX: &str = "__fob_images_";

/// Result of transforming one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    /// Imports followed by the rewritten source
    pub code: String,
    /// Number of substitutions (and generated imports)
    pub bindings: usize,
    /// Canonical names referenced, resolved or not, in match order
    pub referenced: Vec<String>,
}

impl TransformOutput {
    pub fn is_changed(&self) -> bool {
        self.bindings > 0
    }
}

/// Compiled search pattern plus the component filter.
#[derive(Debug, Clone)]
pub struct Transformer {
    pattern: Regex,
    component_extensions: Vec<String>,
}

impl Transformer {
    /// Build a transformer from options.
    ///
    /// A custom pattern must compile and contain exactly one capture group.
    pub fn new(options: &ImagesOptions) -> Result<Self> {
        let source = match &options.custom_search_regex {
            Some(custom) => custom.clone(),
            None => Self::default_pattern(&options.props),
        };

        let pattern = Regex::new(&source)
            .map_err(|e| ImagesError::invalid_pattern(source.as_str(), e.to_string()))?;

        let groups = pattern.captures_len() - 1;
        if groups != 1 {
            return Err(ImagesError::invalid_pattern(
                source,
                format!("expected exactly one capture group, found {groups}"),
            ));
        }

        Ok(Self {
            pattern,
            component_extensions: options.component_extensions.clone(),
        })
    }

    /// Default pattern: `{ <prop>: _ctx.<name> }` for any configured prop.
    pub fn default_pattern(props: &[String]) -> String {
        let props = props
            .iter()
            .map(|prop| regex::escape(prop))
            .collect::<Vec<_>>()
            .join("|");
        format!(r"\{{ (?:{props}): _ctx\.([\w$]+) \}}")
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Whether `id` (query ignored) is a view component.
    pub fn is_component(&self, id: &str) -> bool {
        has_extension(parse_id(id).path, &self.component_extensions)
    }

    /// Transform one compiled component.
    ///
    /// Returns `Ok(None)` without touching the index when `id` is not a
    /// component. Otherwise the index is scanned (once), every match is
    /// looked up, and the referenced names replace the file's usage entry.
    pub fn transform(
        &self,
        index: &mut AssetIndex,
        code: &str,
        id: &str,
    ) -> Result<Option<TransformOutput>> {
        if !self.is_component(id) {
            return Ok(None);
        }

        index.scan()?;

        // Usage key and self-exclusion
        let self_path = index.file_identity(id);
        debug!("[fob-images] transform {}", self_path);

        let mut head = Vec::new();
        let mut referenced = IndexSet::new();
        let mut body = String::with_capacity(code.len());
        let mut last = 0;

        for caps in self.pattern.captures_iter(code) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let raw = name.as_str();
            if raw.is_empty() || raw.starts_with('_') {
                continue;
            }

            let canonical = pascal_case(raw);
            debug!("[fob-images] | {} → {}", raw, canonical);
            referenced.insert(canonical.clone());

            let Some(image) = index.find_image(&canonical, &[self_path.as_str()]) else {
                continue;
            };

            let binding = format!("{BINDING_PREFIX}{}", head.len());
            head.push(image.import_statement(&binding));

            let start = lookup_start(code, whole.start(), name.start());
            body.push_str(&code[last..start]);
            body.push_str(&binding);
            last = name.end();
        }
        body.push_str(&code[last..]);

        debug!("[fob-images] ^ ({})", head.len());

        let referenced: Vec<String> = referenced.into_iter().collect();
        index.update_usage(&self_path, referenced.iter().cloned());

        let bindings = head.len();
        let code = if head.is_empty() {
            body
        } else {
            format!("{}\n{body}", head.join("\n"))
        };

        Ok(Some(TransformOutput {
            code,
            bindings,
            referenced,
        }))
    }
}

/// Start of the member-access chain ending at the captured name.
///
/// For `_ctx.Logo` the chain `_ctx.` is replaced together with the name.
/// The walk never leaves the match.
fn lookup_start(code: &str, match_start: usize, name_start: usize) -> usize {
    let bytes = code.as_bytes();
    let mut start = name_start;
    while start > match_start {
        let byte = bytes[start - 1];
        if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'$' | b'.') {
            start -= 1;
        } else {
            break;
        }
    }
    start
}
