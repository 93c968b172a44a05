//! Stale-file notifications sent to the host when the image set changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// How files depending on a changed image are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReloadPolicy {
    /// Report only the files whose usage includes the changed name
    #[default]
    Targeted,
    /// Ask the host for a full reload whenever a tracked name changes
    Full,
}

/// Notification delivered to an [`InvalidationSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationEvent {
    /// Previously transformed files that must be re-transformed
    Update { files: Vec<String>, timestamp: u64 },
    /// Reload everything
    FullReload,
}

impl InvalidationEvent {
    pub(crate) fn update(files: Vec<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();
        Self::Update { files, timestamp }
    }

    /// Files named by a targeted update; empty for a full reload.
    pub fn files(&self) -> &[String] {
        match self {
            InvalidationEvent::Update { files, .. } => files,
            InvalidationEvent::FullReload => &[],
        }
    }
}

/// Receiver for invalidation events, typically the host's dev server.
pub trait InvalidationSink: Send + Sync {
    fn send(&self, event: InvalidationEvent);
}

impl<F> InvalidationSink for F
where
    F: Fn(InvalidationEvent) + Send + Sync,
{
    fn send(&self, event: InvalidationEvent) {
        self(event)
    }
}

impl fmt::Debug for dyn InvalidationSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InvalidationSink")
    }
}
