//! Error types for the image index and transform.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImagesError>;

/// Errors raised while configuring the index or scanning for images.
///
/// Naming conflicts and unresolved references are not errors: they are
/// logged (or silently skipped) and the build keeps going.
#[derive(Error, Debug, Diagnostic)]
pub enum ImagesError {
    /// Options cannot produce a working index
    #[error("invalid fob-images configuration: {message}")]
    #[diagnostic(
        code(fob::images::configuration),
        help("Configure at least one directory, one extension and one prop")
    )]
    Configuration { message: String },

    /// The search pattern failed to compile or has the wrong shape
    #[error("invalid search pattern `{pattern}`: {reason}")]
    #[diagnostic(
        code(fob::images::invalid_pattern),
        help("The pattern must contain exactly one capture group holding the referenced name")
    )]
    InvalidPattern { pattern: String, reason: String },

    /// Walking an image directory failed
    #[error("failed to scan {}: {source}", .path.display())]
    #[diagnostic(code(fob::images::scan))]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Options could not be extracted from the layered sources
    #[error("failed to load fob-images options: {0}")]
    #[diagnostic(
        code(fob::images::load),
        help("Check fob-images.json / fob-images.toml syntax and FOB_IMAGES_* variables")
    )]
    Load(#[from] Box<figment::Error>),
}

impl ImagesError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    pub fn scan(path: PathBuf, source: walkdir::Error) -> Self {
        Self::Scan { path, source }
    }
}

impl From<figment::Error> for ImagesError {
    fn from(error: figment::Error) -> Self {
        Self::Load(Box::new(error))
    }
}
