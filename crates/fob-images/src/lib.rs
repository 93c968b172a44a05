//! Image name index and component transform for fob.
//!
//! Images under the configured directories get a canonical PascalCase name
//! derived from their path (`src/assets/img/icons/arrow-left.svg` →
//! `IconsArrowLeft`). Compiled components that bind one of those names to an
//! image property get the lookup replaced with a static import, so the
//! bundler sees and fingerprints the asset.
//!
//! ## Architecture
//!
//! ```text
//! ImagesOptions ─→ ImagesContext ─┬─ AssetIndex   (paths → names → records, usage)
//!                                 ├─ Transformer  (regex pass over compiled output)
//!                                 └─ InvalidationSink (host dev server)
//! ```
//!
//! The crate is host-agnostic and synchronous. `fob-plugin-images` adapts it
//! to Rolldown's transform hook and to filesystem watching.
//!
//! ## Example
//!
//! ```rust
//! use fob_images::{ImagesContext, ImagesOptions};
//!
//! # fn main() -> fob_images::Result<()> {
//! let options = ImagesOptions::new().with_dirs(["src/assets/img"]);
//! let mut context = ImagesContext::initialize(options, "/project")?;
//! context.index_mut().add_assets(["src/assets/img/logo.png"]);
//!
//! let code = context
//!     .handle("h('img', { src: _ctx.logo })", "/project/src/App.vue")?
//!     .unwrap_or_default();
//! assert!(code.starts_with("import __fob_images_0 from '/src/assets/img/logo.png'"));
//! # Ok(())
//! # }
//! ```

mod alias;
mod context;
mod error;
mod index;
mod invalidation;
mod naming;
mod options;
mod paths;
mod record;
mod resolver;
mod scan;
mod transform;
mod usage;

pub use alias::{Alias, AliasTable};
pub use context::ImagesContext;
pub use error::{ImagesError, Result};
pub use index::{AssetIndex, NamingConflict};
pub use invalidation::{InvalidationEvent, InvalidationSink, ReloadPolicy};
pub use naming::{camel_case, derive_canonical_name, pascal_case};
pub use options::{CONFIG_FILES, ImagesOptions, discover_config_file};
pub use paths::{ParsedId, normalize_slashes, parse_id, root_relative};
pub use record::AssetRecord;
pub use resolver::{ImageResolver, Resolution};
pub use transform::{BINDING_PREFIX, TransformOutput, Transformer};
pub use usage::UsageMap;
