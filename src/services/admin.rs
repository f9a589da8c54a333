//! Passphrase-gated editing on top of [`ContentStore`].

use crate::middleware::auth::secrets_match;
use crate::services::content::backend::ContentBackend;
use crate::services::content::cache::DeviceCache;
use crate::services::content::merge::get_path;
use crate::services::content::store::ContentStore;
use crate::types::{ContentDocument, SaveAck};
use crate::utils::{CmsError, CmsResult};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_ADMIN_PASSPHRASE: &str = "admin123";

pub struct AdminGate {
    passphrase: SecretString,
}

impl Default for AdminGate {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AdminGate {
    pub fn new(passphrase: Option<SecretString>) -> Self {
        Self {
            passphrase: passphrase
                .unwrap_or_else(|| SecretString::new(DEFAULT_ADMIN_PASSPHRASE.to_string())),
        }
    }

    pub fn login<'a, C, B>(
        &self,
        attempt: &str,
        store: &'a mut ContentStore<C>,
        backend: &'a B,
    ) -> CmsResult<AdminSession<'a, C, B>>
    where
        C: DeviceCache,
        B: ContentBackend + ?Sized,
    {
        if !secrets_match(self.passphrase.expose_secret(), attempt) {
            store.logger().warn("Admin login rejected");
            return Err(CmsError::unauthorized("Incorrect password"));
        }
        Ok(AdminSession { store, backend })
    }
}

/// An unlocked editor. Edits go to the store (and its device cache); only
/// [`save`](Self::save) reaches shared storage.
pub struct AdminSession<'a, C: DeviceCache, B: ContentBackend + ?Sized> {
    store: &'a mut ContentStore<C>,
    backend: &'a B,
}

impl<'a, C, B> AdminSession<'a, C, B>
where
    C: DeviceCache,
    B: ContentBackend + ?Sized,
{
    pub fn data(&self) -> Arc<ContentDocument> {
        self.store.data()
    }

    pub fn update(&mut self, path: &str, value: Value) -> CmsResult<()> {
        self.store.update_path(path, value)
    }

    /// Append to the list at `path`, creating it when absent.
    pub fn push_item(&mut self, path: &str, item: Value) -> CmsResult<()> {
        let mut items = self.list_at(path)?;
        items.push(item);
        self.store.update_path(path, Value::Array(items))
    }

    /// Remove and return the element at `index` of the list at `path`.
    pub fn remove_item(&mut self, path: &str, index: usize) -> CmsResult<Value> {
        let mut items = self.list_at(path)?;
        if index >= items.len() {
            return Err(CmsError::validation_error(format!(
                "index {} out of range for '{}' ({} items)",
                index,
                path,
                items.len()
            )));
        }
        let removed = items.remove(index);
        self.store.update_path(path, Value::Array(items))?;
        Ok(removed)
    }

    fn list_at(&self, path: &str) -> CmsResult<Vec<Value>> {
        let data = self.store.data();
        match get_path(&data, path) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(_) => Err(CmsError::validation_error(format!(
                "'{}' is not a list",
                path
            ))),
        }
    }

    pub fn export(&self) -> String {
        self.store.export()
    }

    pub fn import(&mut self, text: &str) -> CmsResult<()> {
        self.store.import(text)
    }

    pub fn reset(&mut self) {
        self.store.reset()
    }

    /// Push the whole current document to shared storage.
    pub async fn save(&self) -> CmsResult<SaveAck> {
        let snapshot = self.store.data();
        match self.backend.write(&snapshot).await {
            Ok(ack) => {
                self.store.logger().info_with_meta(
                    "Content saved",
                    Some(&serde_json::json!({"digest": ack.digest, "bytes": ack.bytes})),
                );
                Ok(ack)
            }
            Err(err) => {
                self.store.logger().error_with_meta(
                    "Content save failed",
                    Some(&serde_json::json!({"error": err.message, "status": err.status_code()})),
                );
                Err(err)
            }
        }
    }
}
