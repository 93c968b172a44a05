//! Directory scan for image files.

use crate::error::{ImagesError, Result};
use crate::paths::root_relative;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Directories never descended into.
const IGNORED_DIRS: [&str; 1] = ["node_modules"];

/// Walk `dirs` under `root` and return the root-relative paths matching any of `globs`.
///
/// Matching ignores ASCII case, like the extension checks on watcher events.
/// Symlinks are followed. Missing directories and entries that vanish during
/// the walk are skipped; other walk errors (loops, permissions) are returned.
pub(crate) fn search_images(root: &Path, dirs: &[String], globs: &[String]) -> Result<Vec<String>> {
    tracing::debug!("[fob-images] search started with: [{}]", globs.join(", "));
    let globs: Vec<String> = globs.iter().map(|glob| glob.to_ascii_lowercase()).collect();

    let mut files = Vec::new();
    for dir in dirs {
        let base = root.join(dir);
        if !base.is_dir() {
            tracing::debug!("[fob-images] skipping missing directory {}", base.display());
            continue;
        }

        let walker = WalkDir::new(&base)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_ignored(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if is_vanished(&e) => {
                    tracing::warn!("[fob-images] skipping unreadable entry: {}", e);
                    continue;
                }
                Err(e) => return Err(ImagesError::scan(base.clone(), e)),
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = root_relative(root, &entry.path().to_string_lossy());
            let candidate = relative.to_ascii_lowercase();
            if globs
                .iter()
                .any(|glob| fast_glob::glob_match(glob.as_str(), candidate.as_str()))
            {
                files.push(relative);
            }
        }
    }

    tracing::debug!("[fob-images] {} images found", files.len());
    Ok(files)
}

/// Broken symlinks and files deleted mid-walk.
fn is_vanished(error: &walkdir::Error) -> bool {
    error
        .io_error()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

fn is_ignored(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && IGNORED_DIRS.contains(&name.as_ref()))
}
