//! Plugin options.
//!
//! Options come from three layers, in increasing priority: built-in
//! defaults, an optional `fob-images.json` / `fob-images.toml` file, and
//! `FOB_IMAGES_*` environment variables. Fallback resolvers are code and can
//! only be attached through [`ImagesOptions::with_resolver`].

use crate::alias::{Alias, AliasTable};
use crate::error::{ImagesError, Result};
use crate::invalidation::ReloadPolicy;
use crate::naming::camel_case;
use crate::resolver::ImageResolver;
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
    value::{Uncased, UncasedStr},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Config file names looked up in the project root, in order.
pub const CONFIG_FILES: [&str; 2] = ["fob-images.json", "fob-images.toml"];

const ENV_PREFIX: &str = "FOB_IMAGES_";

/// Options for the image index and the component transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImagesOptions {
    /// Directories searched for images, relative to the project root
    pub dirs: Vec<String>,

    /// Image file extensions, without the leading dot
    pub extensions: Vec<String>,

    /// Bound properties eligible for substitution
    pub props: Vec<String>,

    /// Replaces the default search pattern; must have exactly one capture group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_search_regex: Option<String>,

    /// File extensions treated as view components
    pub component_extensions: Vec<String>,

    /// Aliases applied to directories and image paths
    pub alias: AliasTable,

    /// How dependent files are reported when images change
    pub reload: ReloadPolicy,

    /// Consulted in order when no scanned image matches
    #[serde(skip)]
    pub custom_resolvers: Vec<Arc<dyn ImageResolver>>,
}

impl Default for ImagesOptions {
    fn default() -> Self {
        Self {
            dirs: vec!["src/assets/img".to_string()],
            extensions: ["jpg", "jpeg", "png", "svg", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
            props: vec!["src".to_string()],
            custom_search_regex: None,
            component_extensions: vec!["vue".to_string()],
            alias: AliasTable::default(),
            reload: ReloadPolicy::default(),
            custom_resolvers: Vec::new(),
        }
    }
}

impl ImagesOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options for the project at `root`.
    ///
    /// `config_path` overrides the discovery of [`CONFIG_FILES`].
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = config_path
            .map(Path::to_path_buf)
            .or_else(|| discover_config_file(root));

        if let Some(path) = config_file {
            tracing::debug!("[fob-images] loading options from {}", path.display());
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => {
                    return Err(ImagesError::configuration(format!(
                        "unsupported options file: {}",
                        path.display()
                    )));
                }
            };
        }

        // FOB_IMAGES_CUSTOM_SEARCH_REGEX → customSearchRegex
        figment = figment.merge(Env::prefixed(ENV_PREFIX).map(env_key).lowercase(false));

        Ok(figment.extract()?)
    }

    /// Check that the options can produce a working index.
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(ImagesError::configuration(
                "extensions are required to search for images",
            ));
        }
        if self.dirs.is_empty() {
            return Err(ImagesError::configuration(
                "at least one directory is required to search for images",
            ));
        }
        if self.props.is_empty() && self.custom_search_regex.is_none() {
            return Err(ImagesError::configuration("props required to replace images"));
        }
        Ok(())
    }

    pub fn with_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_props<I, S>(mut self, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.props = props.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_component_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.component_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the default search pattern.
    pub fn with_search_regex(mut self, pattern: impl Into<String>) -> Self {
        self.custom_search_regex = Some(pattern.into());
        self
    }

    /// Append a fallback resolver; resolvers run in the order they were added.
    pub fn with_resolver<R>(mut self, resolver: R) -> Self
    where
        R: ImageResolver + 'static,
    {
        self.custom_resolvers.push(Arc::new(resolver));
        self
    }

    pub fn with_alias(mut self, find: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.alias.push(Alias::new(find, replacement));
        self
    }

    pub fn with_reload(mut self, reload: ReloadPolicy) -> Self {
        self.reload = reload;
        self
    }

    /// One glob per directory, e.g. `src/assets/img/**/*.{png,svg}`.
    pub fn globs(&self) -> Vec<String> {
        let extensions = match self.extensions.as_slice() {
            [single] => single.clone(),
            many => format!("{{{}}}", many.join(",")),
        };
        self.dirs
            .iter()
            .map(|dir| format!("{}/**/*.{extensions}", dir.trim_end_matches('/')))
            .collect()
    }

    /// Whether `path` ends with one of the configured image extensions.
    pub fn has_image_extension(&self, path: &str) -> bool {
        has_extension(path, &self.extensions)
    }
}

pub(crate) fn has_extension(path: &str, extensions: &[String]) -> bool {
    let Some((_, ext)) = path.rsplit_once('.') else {
        return false;
    };
    extensions
        .iter()
        .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Map an unprefixed variable name to its camelCase field name.
fn env_key(key: &UncasedStr) -> Uncased<'_> {
    camel_case(&key.as_str().to_ascii_lowercase()).into()
}

/// Location of the options file that [`ImagesOptions::load`] would read.
pub fn discover_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|candidate| candidate.exists())
}
