//! Filesystem watcher keeping the image index current during development.
//!
//! Watches each configured image directory and feeds create, remove and
//! rename events into the shared [`ImagesContext`]. Invalidation events are
//! delivered through the context's sink.

use anyhow::{Context, Result};
use fob_images::{ImagesContext, InvalidationEvent};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Directories never reported, wherever they appear
const IGNORED_DIRS: [&str; 1] = ["node_modules"];

/// Image change derived from a notify event
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AssetChange {
    Added(PathBuf),
    Removed(PathBuf),
}

/// Watches the image directories of one [`ImagesContext`].
///
/// Dropping the watcher stops watching.
pub struct AssetWatcher {
    /// Underlying notify watcher
    _watcher: RecommendedWatcher,
    /// Absolute directories being watched
    dirs: Vec<PathBuf>,
}

impl AssetWatcher {
    /// Watch every configured directory that exists under the context's root.
    ///
    /// # Errors
    ///
    /// Returns error if the watcher cannot be created or a directory cannot be watched
    pub fn new(context: Arc<Mutex<ImagesContext>>) -> Result<Self> {
        let (root, dirs) = {
            let context = context.lock();
            let root = context.root().to_path_buf();
            let dirs: Vec<PathBuf> = context
                .index()
                .options()
                .dirs
                .iter()
                .map(|dir| root.join(dir))
                .collect();
            (root, dirs)
        };

        let handler_context = Arc::clone(&context);
        let handler_root = root.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                apply_event(&handler_context, &handler_root, &event);
            }
            Err(e) => warn!("[fob-images] watch error: {}", e),
        })
        .context("Failed to create image watcher")?;

        let mut watched = Vec::new();
        for dir in dirs {
            if !dir.is_dir() {
                debug!("[fob-images] not watching missing directory {}", dir.display());
                continue;
            }
            watcher
                .watch(&dir, RecursiveMode::Recursive)
                .with_context(|| format!("Failed to watch {}", dir.display()))?;
            debug!("[fob-images] watching {}", dir.display());
            watched.push(dir);
        }

        Ok(Self {
            _watcher: watcher,
            dirs: watched,
        })
    }

    /// Directories actually being watched.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

/// Run `update` under the context lock, then deliver its event to the sink.
///
/// The sink is called with the lock released.
pub(crate) fn update_and_deliver<F>(
    context: &Mutex<ImagesContext>,
    update: F,
) -> Option<InvalidationEvent>
where
    F: FnOnce(&mut ImagesContext) -> Option<InvalidationEvent>,
{
    let (event, sink) = {
        let mut context = context.lock();
        let event = update(&mut context);
        (event, context.invalidation_sink())
    };

    if let (Some(event), Some(sink)) = (&event, sink) {
        sink.send(event.clone());
    }
    event
}

/// Apply one notify event to the context.
///
/// Each change is one index mutation under the lock followed by one
/// notification pass outside it. Returns the invalidation events produced.
pub(crate) fn apply_event(
    context: &Mutex<ImagesContext>,
    root: &Path,
    event: &Event,
) -> Vec<InvalidationEvent> {
    let mut produced = Vec::new();

    for change in changes(root, event) {
        let outcome = update_and_deliver(context, |context| match &change {
            AssetChange::Added(path) => {
                let path = path.to_string_lossy();
                if !context.accepts(&path) {
                    return None;
                }
                debug!("[fob-images] image added {}", path);
                context.asset_added(&path)
            }
            AssetChange::Removed(path) => {
                let path = path.to_string_lossy();
                if context.component_removed(&path) {
                    debug!("[fob-images] component removed {}", path);
                }
                if !context.accepts(&path) {
                    return None;
                }
                debug!("[fob-images] image removed {}", path);
                context.asset_removed(&path)
            }
        });
        produced.extend(outcome);
    }

    produced
}

/// Changes described by `event`, with ignored paths filtered out.
pub(crate) fn changes(root: &Path, event: &Event) -> Vec<AssetChange> {
    let paths = event.paths.iter().filter(|path| !should_ignore(path, root));

    match event.kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            paths.cloned().map(AssetChange::Added).collect()
        }
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            paths.cloned().map(AssetChange::Removed).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            // paths: [from, to]
            let mut changes = Vec::new();
            if let Some(from) = event.paths.first().filter(|p| !should_ignore(p, root)) {
                changes.push(AssetChange::Removed(from.clone()));
            }
            if let Some(to) = event.paths.get(1).filter(|p| !should_ignore(p, root)) {
                changes.push(AssetChange::Added(to.clone()));
            }
            changes
        }
        // FSEvents and kqueue do not say which side of a rename a path is
        EventKind::Modify(ModifyKind::Name(_)) => paths
            .map(|path| {
                if path.exists() {
                    AssetChange::Added(path.clone())
                } else {
                    AssetChange::Removed(path.clone())
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Hidden entries, `node_modules` and anything outside the root are ignored.
fn should_ignore(path: &Path, root: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return true;
    };

    relative.components().any(|component| {
        component.as_os_str().to_str().is_some_and(|name| {
            (name.starts_with('.') && name != "." && name != "..")
                || IGNORED_DIRS.contains(&name)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fob_images::ImagesOptions;
    use notify::event::{CreateKind, RemoveKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn context() -> Mutex<ImagesContext> {
        let options = ImagesOptions::new().with_dirs(["img"]);
        let mut context = ImagesContext::initialize(options, "/project").unwrap();
        context.index_mut().scan().unwrap();
        Mutex::new(context)
    }

    #[test]
    fn test_should_ignore() {
        let root = Path::new("/project");
        assert!(should_ignore(Path::new("/project/img/.cache/a.png"), root));
        assert!(should_ignore(Path::new("/project/img/node_modules/a.png"), root));
        assert!(should_ignore(Path::new("/elsewhere/img/a.png"), root));
        assert!(!should_ignore(Path::new("/project/img/a.png"), root));
    }

    #[test]
    fn test_changes_from_rename() {
        let root = Path::new("/project");
        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/project/img/old.png"))
            .add_path(PathBuf::from("/project/img/new.png"));

        assert_eq!(
            changes(root, &event),
            [
                AssetChange::Removed(PathBuf::from("/project/img/old.png")),
                AssetChange::Added(PathBuf::from("/project/img/new.png")),
            ]
        );
    }

    #[test]
    fn test_create_and_remove_update_index() {
        let context = context();
        let root = Path::new("/project");

        let created = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/project/img/logo.png"));
        apply_event(&context, root, &created);
        assert!(context.lock().index().get("Logo").is_some());

        let removed = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/project/img/logo.png"));
        apply_event(&context, root, &removed);
        assert!(context.lock().index().get("Logo").is_none());
    }

    #[test]
    fn test_non_images_are_skipped() {
        let context = context();
        let root = Path::new("/project");

        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/project/img/notes.txt"))
            .add_path(PathBuf::from("/project/src/logo.png"));
        apply_event(&context, root, &event);
        assert_eq!(context.lock().index().known_paths().count(), 0);
    }

    #[test]
    fn test_removal_reports_dependent_components() {
        let context = context();
        let root = Path::new("/project");
        {
            let mut context = context.lock();
            context.asset_added("img/logo.png");
            context
                .handle("{ src: _ctx.Logo }", "/project/src/App.vue")
                .unwrap();
        }

        let event = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/project/img/logo.png"));
        let produced = apply_event(&context, root, &event);

        assert_eq!(produced.len(), 1);
        assert_eq!(produced[0].files(), ["/src/App.vue".to_string()]);
    }

    #[test]
    fn test_ambiguous_rename_checks_existence() {
        let dir = tempfile::TempDir::new().unwrap();
        let img = dir.path().join("img");
        std::fs::create_dir_all(&img).unwrap();
        std::fs::write(img.join("new.png"), b"img").unwrap();

        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Any)))
            .add_path(img.join("old.png"))
            .add_path(img.join("new.png"));

        assert_eq!(
            changes(dir.path(), &event),
            [
                AssetChange::Removed(img.join("old.png")),
                AssetChange::Added(img.join("new.png")),
            ]
        );
    }

    #[test]
    fn test_ambiguous_rename_moves_image_in_index() {
        let dir = tempfile::TempDir::new().unwrap();
        let img = dir.path().join("img");
        std::fs::create_dir_all(&img).unwrap();
        std::fs::write(img.join("banner.png"), b"img").unwrap();

        let options = ImagesOptions::new().with_dirs(["img"]);
        let mut context = ImagesContext::initialize(options, dir.path()).unwrap();
        context.index_mut().scan().unwrap();
        context.index_mut().add_assets([img.join("logo.png").to_string_lossy()]);
        let context = Mutex::new(context);

        // logo.png was renamed to banner.png
        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Any)))
            .add_path(img.join("logo.png"));
        apply_event(&context, dir.path(), &event);

        let context = context.lock();
        assert!(context.index().get("Logo").is_none());
        assert!(context.index().get("Banner").is_some());
    }

    #[test]
    fn test_sink_may_transform_again() {
        let context = Arc::new(context());
        let retransformed = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&context);
        let counter = Arc::clone(&retransformed);
        context
            .lock()
            .attach_invalidation_sink(Arc::new(move |event: InvalidationEvent| {
                let Some(context) = weak.upgrade() else { return };
                for file in event.files() {
                    let id = format!("/project{file}");
                    context.lock().handle("{ src: _ctx.Logo }", &id).unwrap();
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            }));

        context
            .lock()
            .handle("{ src: _ctx.Logo }", "/project/src/App.vue")
            .unwrap();

        let event = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/project/img/logo.png"));
        let produced = apply_event(&context, Path::new("/project"), &event);

        assert_eq!(produced.len(), 1);
        assert_eq!(retransformed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_removed_component_forgets_usage() {
        let options = ImagesOptions::new()
            .with_dirs(["src"])
            .with_extensions(["svg", "vue"]);
        let mut context = ImagesContext::initialize(options, "/project").unwrap();
        context.index_mut().scan().unwrap();
        context.index_mut().add_assets(["src/Badge.vue"]);
        context
            .handle("{ src: _ctx.Logo }", "/project/src/Badge.vue")
            .unwrap();
        let context = Mutex::new(context);

        let event = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/project/src/Badge.vue"));
        apply_event(&context, Path::new("/project"), &event);

        let context = context.lock();
        assert!(context.index().usage().is_empty());
        assert!(context.index().get("Badge").is_none());
    }
}
