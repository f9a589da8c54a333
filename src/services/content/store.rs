//! The session's single authoritative content snapshot.
//!
//! Load order is Defaults, then the device cache, then the shared remote
//! document, each overlaid with [`deep_merge`]. Nothing here ever fails the
//! page: read errors fall back to whatever has been merged so far, and the
//! write-through to the device cache is best-effort.

use super::backend::{serialize_document, ContentBackend};
use super::cache::DeviceCache;
use super::defaults::default_content;
use super::merge::{deep_merge, set_path};
use crate::types::ContentDocument;
use crate::utils::{CmsError, CmsResult, Logger};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// What happened to one load source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum SourceOutcome {
    Applied,
    /// Source had nothing to contribute.
    Absent,
    /// Source failed or held unusable data and was skipped.
    Ignored(String),
}

/// Per-source result of [`ContentStore::load`]. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub cache: SourceOutcome,
    pub remote: SourceOutcome,
}

pub struct ContentStore<C: DeviceCache> {
    data: Arc<ContentDocument>,
    defaults: Arc<ContentDocument>,
    cache: C,
    loaded: bool,
    logger: Logger,
}

impl<C: DeviceCache> ContentStore<C> {
    /// Store seeded with the compiled defaults.
    pub fn new(cache: C) -> Self {
        Self::with_defaults(default_content(), cache)
    }

    pub fn with_defaults(defaults: ContentDocument, cache: C) -> Self {
        let defaults = Arc::new(defaults);
        Self {
            data: Arc::clone(&defaults),
            defaults,
            cache,
            loaded: false,
            logger: crate::utils::logger().clone(),
        }
    }

    /// Log swallowed failures through `logger` instead of the global logger.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Overlay the device cache, then the remote document, then open the
    /// write-through gate. Never fails.
    pub async fn load<B>(&mut self, remote: &B) -> LoadReport
    where
        B: ContentBackend + ?Sized,
    {
        let cache = self.overlay_cache();

        // The remote result is merged only after the cache overlay above, so
        // the shared document always wins over device-local edits.
        let remote = match remote.read().await {
            Ok(document) => self.overlay_remote(document),
            Err(err) => {
                self.logger.swallowed("Remote content fetch failed", &err);
                SourceOutcome::Ignored(err.message)
            }
        };

        self.loaded = true;
        self.persist();

        let report = LoadReport { cache, remote };
        self.logger.debug_with_meta(
            "Content store loaded",
            Some(&serde_json::to_value(&report).unwrap_or_default()),
        );
        report
    }

    fn overlay_cache(&mut self) -> SourceOutcome {
        let raw = match self.cache.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return SourceOutcome::Absent,
            Err(err) => {
                self.logger.swallowed("Device cache read failed", &err);
                return SourceOutcome::Ignored(err.message);
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(cached @ Value::Object(_)) => {
                self.data = Arc::new(deep_merge(&self.data, &cached));
                SourceOutcome::Applied
            }
            Ok(_) => SourceOutcome::Ignored("device cache is not an object".to_string()),
            Err(err) => {
                self.logger.swallowed("Device cache is not valid JSON", &err);
                SourceOutcome::Ignored(err.to_string())
            }
        }
    }

    fn overlay_remote(&mut self, document: ContentDocument) -> SourceOutcome {
        match &document {
            Value::Object(map) if !map.is_empty() => {
                self.data = Arc::new(deep_merge(&self.data, &document));
                SourceOutcome::Applied
            }
            Value::Object(_) => SourceOutcome::Absent,
            _ => SourceOutcome::Ignored("remote document is not an object".to_string()),
        }
    }

    /// Cheap snapshot for readers. Later mutations never show through it.
    pub fn data(&self) -> Arc<ContentDocument> {
        Arc::clone(&self.data)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replace the document wholesale. No shape validation.
    pub fn set_data(&mut self, next: ContentDocument) {
        self.data = Arc::new(next);
        self.persist_if_loaded();
    }

    /// Updater form of [`set_data`](Self::set_data).
    pub fn update<F>(&mut self, updater: F)
    where
        F: FnOnce(&ContentDocument) -> ContentDocument,
    {
        let next = updater(&self.data);
        self.set_data(next);
    }

    /// Replace the subtree at a dotted path. Outstanding snapshots keep the
    /// old document; the current one is copied only if someone still holds it.
    pub fn update_path(&mut self, path: &str, value: Value) -> CmsResult<()> {
        let mut next = Arc::clone(&self.data);
        set_path(Arc::make_mut(&mut next), path, value)?;
        self.data = next;
        self.persist_if_loaded();
        Ok(())
    }

    /// Pretty-printed JSON of the current document.
    pub fn export(&self) -> String {
        serialize_document(&self.data)
    }

    /// Replace the document with parsed `text` and persist it right away.
    pub fn import(&mut self, text: &str) -> CmsResult<()> {
        let next: Value = serde_json::from_str(text)
            .map_err(|e| CmsError::malformed_input(format!("invalid JSON: {}", e)))?;
        if !next.is_object() {
            return Err(CmsError::malformed_input(
                "invalid content: document must be a JSON object",
            ));
        }

        self.data = Arc::new(next);
        self.persist();
        Ok(())
    }

    /// Back to a fresh copy of the defaults, with the device cache cleared.
    pub fn reset(&mut self) {
        self.data = Arc::new((*self.defaults).clone());
        if let Err(err) = self.cache.clear() {
            self.logger.swallowed("Device cache clear failed", &err);
        }
    }

    fn persist_if_loaded(&self) {
        if self.loaded {
            self.persist();
        }
    }

    fn persist(&self) {
        let serialized = self.data.to_string();
        if let Err(err) = self.cache.write(&serialized) {
            self.logger.swallowed("Device cache write failed", &err);
        }
    }
}
