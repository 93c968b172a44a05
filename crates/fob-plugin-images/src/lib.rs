//! Rolldown plugin that resolves image names in compiled Vue components
//!
//! Compiled templates look up bound images on the component instance
//! (`{ src: _ctx.Logo }`). This plugin rewrites those lookups into static
//! imports of the matching file under the configured image directories, so
//! Rolldown bundles and fingerprints the image like any other asset.
//!
//! ## Architecture
//!
//! ```text
//! compiled .vue → transform() → ImagesContext::handle → imports + rewritten code
//!                                      ↑
//! image dirs → AssetWatcher (notify) → asset_added / asset_removed → InvalidationSink
//! ```
//!
//! Both paths lock the same `Arc<Mutex<ImagesContext>>`, so a filesystem
//! event never interleaves with a transform. Invalidation events reach the
//! sink after the lock is released, so a sink may transform files again.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fob_plugin_images::FobImagesPlugin;
//! use std::sync::Arc;
//!
//! # fn example() -> anyhow::Result<()> {
//! // Options from fob-images.json / fob-images.toml / FOB_IMAGES_* in the project root
//! let plugin = Arc::new(FobImagesPlugin::from_project(".")?);
//!
//! // Keep the watcher alive for the duration of the dev session
//! let _watcher = plugin.watch()?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use fob_images::{ImagesContext, ImagesOptions, InvalidationEvent, InvalidationSink};
use parking_lot::Mutex;
use rolldown_plugin::{
    HookTransformArgs, HookTransformOutput, HookTransformReturn, HookUsage, Plugin,
    SharedTransformPluginContext,
};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[cfg(feature = "logging")]
pub mod logging;
mod watcher;

pub use fob_images;
pub use watcher::AssetWatcher;

/// Rolldown plugin replacing image lookups with static imports
///
/// Cloning is cheap and every clone shares the same index, usage map and
/// invalidation sink.
#[derive(Clone, Debug)]
pub struct FobImagesPlugin {
    /// Shared session state, also mutated by [`AssetWatcher`]
    context: Arc<Mutex<ImagesContext>>,
}

impl FobImagesPlugin {
    /// Create a plugin for the project at `project_root`.
    pub fn new(options: ImagesOptions, project_root: impl Into<PathBuf>) -> Result<Self> {
        let project_root = project_root.into();
        let context = ImagesContext::initialize(options, &project_root).with_context(|| {
            format!(
                "Failed to initialize fob-images for {}",
                project_root.display()
            )
        })?;
        Ok(Self::from_context(Arc::new(Mutex::new(context))))
    }

    /// Create a plugin with options loaded from the project's config layers.
    pub fn from_project(project_root: impl AsRef<Path>) -> Result<Self> {
        let project_root = project_root.as_ref();
        let options = ImagesOptions::load(project_root, None).with_context(|| {
            format!(
                "Failed to load fob-images options in {}",
                project_root.display()
            )
        })?;
        Self::new(options, project_root)
    }

    pub fn from_context(context: Arc<Mutex<ImagesContext>>) -> Self {
        Self { context }
    }

    /// Shared context, for hosts that drive the index directly.
    pub fn context(&self) -> Arc<Mutex<ImagesContext>> {
        Arc::clone(&self.context)
    }

    /// Route invalidation events (image added or removed) to `sink`.
    pub fn attach_invalidation_sink(&self, sink: Arc<dyn InvalidationSink>) {
        self.context.lock().attach_invalidation_sink(sink);
    }

    /// Register an image added outside the watcher.
    ///
    /// The event, if any, is sent to the sink after the context is unlocked.
    pub fn asset_added(&self, path: &str) -> Option<InvalidationEvent> {
        watcher::update_and_deliver(&self.context, |context| context.asset_added(path))
    }

    /// Drop an image removed outside the watcher.
    pub fn asset_removed(&self, path: &str) -> Option<InvalidationEvent> {
        watcher::update_and_deliver(&self.context, |context| context.asset_removed(path))
    }

    /// Forget the images a deleted component referenced.
    ///
    /// The watcher only sees image dirs; hosts call this for components
    /// deleted elsewhere.
    pub fn component_removed(&self, id: &str) -> bool {
        self.context.lock().component_removed(id)
    }

    /// Start watching the configured image directories.
    pub fn watch(&self) -> Result<AssetWatcher> {
        AssetWatcher::new(self.context())
    }

    /// Transform one module, returning the new code when anything changed.
    ///
    /// This is the synchronous body of the `transform` hook.
    pub fn transform_code(&self, code: &str, id: &str) -> Result<Option<String>> {
        let mut context = self.context.lock();
        if !context.transformer().is_component(id) {
            return Ok(None);
        }

        let output = context
            .handle(code, id)
            .with_context(|| format!("Failed to resolve images in: {}", id))?;

        if output.is_some() {
            debug!("[fob-images] Rewrote image references in {}", id);
        }
        Ok(output)
    }
}

impl Plugin for FobImagesPlugin {
    fn name(&self) -> Cow<'static, str> {
        "fob-images".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        // Only compiled component output is rewritten
        HookUsage::Transform
    }

    /// Transform hook - rewrites image lookups in compiled components
    ///
    /// # Returns
    ///
    /// - `Ok(Some(output))` - Imports prepended and lookups replaced
    /// - `Ok(None)` - Not a component, or nothing resolved
    /// - `Err(e)` - Image directories could not be scanned
    fn transform(
        &self,
        _ctx: SharedTransformPluginContext,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        let id = args.id.to_string();
        let code = args.code.to_string();
        let plugin = self.clone();

        async move {
            let Some(code) = plugin.transform_code(&code, &id)? else {
                return Ok(None);
            };

            Ok(Some(HookTransformOutput {
                code: Some(code),
                map: None,
                side_effects: None,
                module_type: None,
            }))
        }
    }
}
