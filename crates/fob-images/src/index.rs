//! The image index: known image paths, the name table derived from them,
//! fallback resolvers and per-file usage.
//!
//! ## Architecture
//!
//! ```text
//! scan() / add_assets() / remove_asset()
//!         ↓ (only when the path set changed)
//! rebuild_name_table()  → name → AssetRecord, first path wins
//!         ↓
//! find_image(name, exclude) → name table, then resolvers in order
//! ```
//!
//! The name table is always rebuilt from scratch. Patching it in place would
//! let a removed image leave a stale conflict behind.

use crate::error::Result;
use crate::naming;
use crate::options::ImagesOptions;
use crate::paths::{parse_id, root_relative};
use crate::record::AssetRecord;
use crate::resolver::ImageResolver;
use crate::scan::search_images;
use crate::usage::UsageMap;
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Two image paths derived the same canonical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConflict {
    pub name: String,
    /// Path that stays in the table
    pub kept: String,
    /// Path left out of the table (not removed from disk)
    pub discarded: String,
}

/// Index of images available for substitution.
#[derive(Debug)]
pub struct AssetIndex {
    root: PathBuf,
    options: ImagesOptions,
    globs: Vec<String>,
    known_paths: IndexSet<String>,
    name_table: FxHashMap<String, AssetRecord>,
    usage: UsageMap,
    has_scanned: bool,
}

impl AssetIndex {
    /// Create an index for the project at `root`.
    ///
    /// Fails when the options have no extensions, no directories or nothing
    /// to substitute. Directories are resolved through the alias table and
    /// made root-relative.
    pub fn new(options: ImagesOptions, root: impl Into<PathBuf>) -> Result<Self> {
        options.validate()?;
        let root = root.into();

        let mut options = options;
        options.dirs = options
            .dirs
            .iter()
            .map(|dir| root_relative(&root, &options.alias.resolve(dir)))
            .collect();
        let globs = options.globs();

        Ok(Self {
            root,
            options,
            globs,
            known_paths: IndexSet::new(),
            name_table: FxHashMap::default(),
            usage: UsageMap::new(),
            has_scanned: false,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Options with directories normalised.
    pub fn options(&self) -> &ImagesOptions {
        &self.options
    }

    pub fn globs(&self) -> &[String] {
        &self.globs
    }

    pub fn has_scanned(&self) -> bool {
        self.has_scanned
    }

    /// Search the configured directories, once per index.
    ///
    /// Returns `true` when this call performed the search. Later calls are
    /// no-ops. Filesystem errors propagate and leave the index unscanned.
    pub fn scan(&mut self) -> Result<bool> {
        if self.has_scanned {
            return Ok(false);
        }

        let files = search_images(&self.root, &self.options.dirs, &self.globs)?;
        if files.is_empty() && self.options.custom_resolvers.is_empty() {
            warn!("[fob-images] no images found");
        }

        self.add_assets(files);
        self.has_scanned = true;
        debug!("[fob-images] {} names indexed", self.name_table.len());
        Ok(true)
    }

    /// Normalise a path into the index's root-relative form.
    pub fn normalize_path(&self, path: &str) -> String {
        root_relative(&self.root, &self.options.alias.resolve(path))
    }

    /// Root-relative identity of a module id (`/src/App.vue`), query dropped.
    ///
    /// Used as usage key and as self-exclusion when transforming the module.
    pub fn file_identity(&self, id: &str) -> String {
        format!("/{}", self.normalize_path(parse_id(id).path))
    }

    /// Insert image paths, rebuilding the name table if the set changed.
    pub fn add_assets<I, S>(&mut self, paths: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.known_paths.len();
        for path in paths {
            let path = self.normalize_path(path.as_ref());
            debug!("[fob-images] add {}", path);
            self.known_paths.insert(path);
        }

        if self.known_paths.len() == before {
            return false;
        }
        self.rebuild_name_table();
        true
    }

    /// Remove one image path, rebuilding the name table if it was present.
    pub fn remove_asset(&mut self, path: &str) -> bool {
        let path = self.normalize_path(path);
        let removed = self.known_paths.shift_remove(&path);
        debug!("[fob-images] remove({}) {}", removed, path);

        if removed {
            self.rebuild_name_table();
        }
        removed
    }

    /// Whether `path` lies in a configured directory and has an image extension.
    pub fn accepts(&self, path: &str) -> bool {
        let path = self.normalize_path(path);
        self.options.has_image_extension(&path)
            && self.options.dirs.iter().any(|dir| {
                dir.is_empty()
                    || path
                        .strip_prefix(dir.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            })
    }

    /// Canonical name for an image path.
    pub fn derive_canonical_name(&self, path: &str) -> String {
        naming::derive_canonical_name(&self.normalize_path(path), &self.options.dirs)
    }

    /// Rebuild the name table from the known paths.
    ///
    /// Paths are processed in insertion order; on a collision the earlier
    /// path keeps the name and a conflict is reported for the later one.
    pub fn rebuild_name_table(&mut self) -> Vec<NamingConflict> {
        let mut table: FxHashMap<String, AssetRecord> = FxHashMap::default();
        let mut conflicts = Vec::new();

        for path in &self.known_paths {
            let name = naming::derive_canonical_name(path, &self.options.dirs);
            if name.is_empty() {
                debug!("[fob-images] {} has no usable name, skipped", path);
                continue;
            }

            if let Some(existing) = table.get(&name) {
                warn!(
                    "[fob-images] Ignored \"{}\" ({}), it conflicts with another image ({})",
                    name,
                    path,
                    existing.path
                );
                conflicts.push(NamingConflict {
                    name,
                    kept: existing.path.clone(),
                    discarded: format!("/{path}"),
                });
                continue;
            }

            table.insert(
                name.clone(),
                AssetRecord {
                    name,
                    path: format!("/{path}"),
                    source_path: Some(self.root.join(path)),
                },
            );
        }

        self.name_table = table;
        conflicts
    }

    /// Look up `name`, skipping table entries whose path is in `exclude`.
    ///
    /// Exclusions match with or without a leading `/`. When the table has no
    /// usable entry the fallback resolvers are tried in order.
    pub fn find_image<S>(&self, name: &str, exclude: &[S]) -> Option<AssetRecord>
    where
        S: AsRef<str>,
    {
        if let Some(record) = self.name_table.get(name) {
            if !exclude.iter().any(|path| record.matches_path(path.as_ref())) {
                return Some(record.clone());
            }
        }

        self.options
            .custom_resolvers
            .iter()
            .find_map(|resolver| resolver.resolve(name).and_then(|r| r.into_record(name)))
    }

    /// Append a fallback resolver after the configured ones.
    pub fn add_resolver(&mut self, resolver: Arc<dyn ImageResolver>) {
        self.options.custom_resolvers.push(resolver);
    }

    pub fn get(&self, name: &str) -> Option<&AssetRecord> {
        self.name_table.get(name)
    }

    pub fn records(&self) -> impl Iterator<Item = &AssetRecord> {
        self.name_table.values()
    }

    pub fn known_paths(&self) -> impl Iterator<Item = &str> {
        self.known_paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.name_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_table.is_empty()
    }

    /// Record the names referenced by `file`, replacing earlier usage.
    pub fn update_usage<I>(&mut self, file: &str, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.usage.replace(file, names);
    }

    /// Drop the usage recorded for `file`; `true` if there was any.
    pub fn forget_usage(&mut self, file: &str) -> bool {
        self.usage.remove(file).is_some()
    }

    pub fn usage(&self) -> &UsageMap {
        &self.usage
    }

    /// Files that referenced `name` when they were last transformed.
    pub fn files_using(&self, name: &str) -> Vec<String> {
        self.usage.files_using(name)
    }
}
