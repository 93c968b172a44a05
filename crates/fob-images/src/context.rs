//! Session state shared by a host's lifecycle hooks.

use crate::error::Result;
use crate::index::AssetIndex;
use crate::invalidation::{InvalidationEvent, InvalidationSink, ReloadPolicy};
use crate::options::ImagesOptions;
use crate::transform::{TransformOutput, Transformer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// One index, one transformer and an optional invalidation sink.
///
/// Hosts create it once per build or dev session and drive it from their
/// hooks: [`handle`](Self::handle) per compiled component,
/// [`asset_added`](Self::asset_added) / [`asset_removed`](Self::asset_removed)
/// per filesystem event.
///
/// The context never calls the sink itself. A sink may react to an event by
/// transforming files again, so hosts sharing the context behind a lock
/// deliver events only after releasing it.
#[derive(Debug)]
pub struct ImagesContext {
    index: AssetIndex,
    transformer: Transformer,
    sink: Option<Arc<dyn InvalidationSink>>,
}

impl ImagesContext {
    pub fn initialize(options: ImagesOptions, root: impl Into<PathBuf>) -> Result<Self> {
        let transformer = Transformer::new(&options)?;
        let index = AssetIndex::new(options, root)?;
        Ok(Self {
            index,
            transformer,
            sink: None,
        })
    }

    /// Receiver for invalidation events, replacing any previous one.
    pub fn attach_invalidation_sink(&mut self, sink: Arc<dyn InvalidationSink>) {
        self.sink = Some(sink);
    }

    pub fn invalidation_sink(&self) -> Option<Arc<dyn InvalidationSink>> {
        self.sink.clone()
    }

    pub fn root(&self) -> &Path {
        self.index.root()
    }

    pub fn index(&self) -> &AssetIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut AssetIndex {
        &mut self.index
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    /// Transform `code`, returning the rewritten text when anything changed.
    pub fn handle(&mut self, code: &str, id: &str) -> Result<Option<String>> {
        Ok(self
            .transform(code, id)?
            .filter(TransformOutput::is_changed)
            .map(|output| output.code))
    }

    /// Transform `code` and return the full result, changed or not.
    pub fn transform(&mut self, code: &str, id: &str) -> Result<Option<TransformOutput>> {
        self.transformer.transform(&mut self.index, code, id)
    }

    pub fn accepts(&self, path: &str) -> bool {
        self.index.accepts(path)
    }

    /// Forget the usage recorded for a deleted component.
    pub fn component_removed(&mut self, id: &str) -> bool {
        if !self.transformer.is_component(id) {
            return false;
        }
        let file = self.index.file_identity(id);
        self.index.forget_usage(&file)
    }

    /// Register a new image and report the files that referenced its name.
    pub fn asset_added(&mut self, path: &str) -> Option<InvalidationEvent> {
        if !self.index.add_assets([path]) {
            return None;
        }
        self.invalidation(path)
    }

    /// Drop an image and report the files that referenced its name.
    pub fn asset_removed(&mut self, path: &str) -> Option<InvalidationEvent> {
        if !self.index.remove_asset(path) {
            return None;
        }
        self.invalidation(path)
    }

    fn invalidation(&self, path: &str) -> Option<InvalidationEvent> {
        let name = self.index.derive_canonical_name(path);
        let files = self.index.files_using(&name);
        if files.is_empty() {
            debug!("[fob-images] {} is not referenced, nothing to reload", name);
            return None;
        }

        let event = match self.index.options().reload {
            ReloadPolicy::Targeted => InvalidationEvent::update(files),
            ReloadPolicy::Full => InvalidationEvent::FullReload,
        };
        debug!("[fob-images] hmr {} → {:?}", name, event);
        Some(event)
    }
}
