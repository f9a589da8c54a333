//! Device-local persistence of the last-known content document.

use crate::utils::CmsResult;
use std::cell::RefCell;
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use crate::{types::DEVICE_CACHE_KEY, utils::CmsError};

/// Synchronous key-value slot holding one serialized document, like the
/// browser's `localStorage`.
pub trait DeviceCache {
    fn read(&self) -> CmsResult<Option<String>>;
    fn write(&self, text: &str) -> CmsResult<()>;
    fn clear(&self) -> CmsResult<()>;
}

/// In-process cache. Clones share the same slot, so a caller can keep a
/// handle to inspect what the store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryDeviceCache {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryDeviceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(text: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(text.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl DeviceCache for MemoryDeviceCache {
    fn read(&self) -> CmsResult<Option<String>> {
        Ok(self.slot.borrow().clone())
    }

    fn write(&self, text: &str) -> CmsResult<()> {
        *self.slot.borrow_mut() = Some(text.to_string());
        Ok(())
    }

    fn clear(&self) -> CmsResult<()> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}

/// Browser `localStorage` under a fixed key.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageCache {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorageCache {
    fn default() -> Self {
        Self::new(DEVICE_CACHE_KEY)
    }
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageCache {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage(&self) -> CmsResult<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| CmsError::storage_error("no window: localStorage unavailable"))?;
        window
            .local_storage()
            .map_err(|e| CmsError::storage_error(format!("localStorage denied: {:?}", e)))?
            .ok_or_else(|| CmsError::storage_error("localStorage unavailable"))
    }
}

#[cfg(target_arch = "wasm32")]
impl DeviceCache for LocalStorageCache {
    fn read(&self) -> CmsResult<Option<String>> {
        self.storage()?
            .get_item(&self.key)
            .map_err(|e| CmsError::storage_error(format!("localStorage read failed: {:?}", e)))
    }

    fn write(&self, text: &str) -> CmsResult<()> {
        self.storage()?
            .set_item(&self.key, text)
            .map_err(|e| CmsError::storage_error(format!("localStorage write failed: {:?}", e)))
    }

    fn clear(&self) -> CmsResult<()> {
        self.storage()?
            .remove_item(&self.key)
            .map_err(|e| CmsError::storage_error(format!("localStorage clear failed: {:?}", e)))
    }
}
