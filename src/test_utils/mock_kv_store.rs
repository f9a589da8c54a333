use crate::services::kv::{KvOperationError, KvOperations, KvResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// Mock KV Store for testing
#[derive(Clone, Default)]
pub struct MockKvStore {
    pub data: Arc<Mutex<HashMap<String, String>>>,
    pub error_simulation: Option<String>,
    pub operation_count: Arc<Mutex<u32>>,
}

impl MockKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn simulate_error(&mut self, error_type: &str) {
        self.error_simulation = Some(error_type.to_string());
    }

    pub fn reset_error_simulation(&mut self) {
        self.error_simulation = None;
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.data.lock().unwrap().get(key).cloned()
    }

    pub fn operations(&self) -> u32 {
        *self.operation_count.lock().unwrap()
    }
}

#[async_trait(?Send)]
impl KvOperations for MockKvStore {
    async fn get_text(&self, key: &str) -> KvResult<Option<String>> {
        *self.operation_count.lock().unwrap() += 1;
        if self.error_simulation.as_deref() == Some("kv_get_failed") {
            return Err(KvOperationError::Storage(
                "KV get operation failed".to_string(),
            ));
        }
        Ok(self.raw(key))
    }

    async fn put_text(&self, key: &str, value: &str) -> KvResult<()> {
        *self.operation_count.lock().unwrap() += 1;
        if self.error_simulation.as_deref() == Some("kv_put_failed") {
            return Err(KvOperationError::Storage(
                "KV put operation failed".to_string(),
            ));
        }
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
