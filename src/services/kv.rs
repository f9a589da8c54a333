use crate::utils::CmsError;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KvOperationError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("KV binding unavailable: {0}")]
    Binding(String),
}

pub type KvResult<T> = Result<T, KvOperationError>;

impl From<KvOperationError> for CmsError {
    fn from(err: KvOperationError) -> Self {
        CmsError::storage_error(format!("Server error: {}", err))
    }
}

/// Raw text storage. Documents are kept exactly as the client sent them.
///
/// Worker KV futures are not `Send`, so neither is this trait.
#[async_trait(?Send)]
pub trait KvOperations {
    async fn get_text(&self, key: &str) -> KvResult<Option<String>>;
    async fn put_text(&self, key: &str, value: &str) -> KvResult<()>;
}

#[async_trait(?Send)]
impl KvOperations for worker::kv::KvStore {
    async fn get_text(&self, key: &str) -> KvResult<Option<String>> {
        self.get(key)
            .text()
            .await
            .map_err(|e| KvOperationError::Storage(e.to_string()))
    }

    async fn put_text(&self, key: &str, value: &str) -> KvResult<()> {
        self.put(key, value)
            .map_err(|e| KvOperationError::Storage(e.to_string()))?
            .execute()
            .await
            .map_err(|e| KvOperationError::Storage(e.to_string()))?;
        Ok(())
    }
}

/// Open the KV namespace bound under `binding`.
pub fn open_store(env: &worker::Env, binding: &str) -> KvResult<worker::kv::KvStore> {
    env.kv(binding)
        .map_err(|e| KvOperationError::Binding(format!("{}: {}", binding, e)))
}
