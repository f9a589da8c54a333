// src/test_utils/mod.rs

#[cfg(not(target_arch = "wasm32"))]
pub mod http_server;
pub mod mock_kv_store;

#[cfg(not(target_arch = "wasm32"))]
pub use http_server::{CannedHttpServer, RecordedRequest};
pub use mock_kv_store::MockKvStore;

use crate::services::content::backend::{serialize_document, ContentBackend};
use crate::services::content::cache::DeviceCache;
use crate::services::publish::github::{
    ContentsApi, PutFileBody, PutFileResult, RepoFile, RepoFileRef,
};
use crate::types::{ContentDocument, PublishTarget, SaveAck};
use crate::utils::{CmsError, CmsResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Backend returning a fixed document (or a fixed failure) and recording
/// every write.
#[derive(Clone, Default)]
pub struct MockBackend {
    document: ContentDocument,
    fail_status: Option<u16>,
    pub writes: Arc<Mutex<Vec<ContentDocument>>>,
}

impl MockBackend {
    pub fn returning(document: ContentDocument) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::default()
        }
    }

    pub fn written(&self) -> Vec<ContentDocument> {
        self.writes.lock().unwrap().clone()
    }

    fn failure(&self) -> Option<CmsError> {
        self.fail_status.map(|status| {
            CmsError::upstream_error(status, format!("mock backend status {}", status))
        })
    }
}

#[async_trait(?Send)]
impl ContentBackend for MockBackend {
    async fn read(&self) -> CmsResult<ContentDocument> {
        match self.failure() {
            Some(err) => Err(err),
            None => Ok(self.document.clone()),
        }
    }

    async fn write(&self, document: &ContentDocument) -> CmsResult<SaveAck> {
        if let Some(err) = self.failure() {
            return Err(err);
        }
        self.writes.lock().unwrap().push(document.clone());
        Ok(SaveAck::for_bytes(serialize_document(document).as_bytes()))
    }
}

/// Device cache whose every operation fails, like storage disabled by the
/// browser.
pub struct FailingDeviceCache;

impl DeviceCache for FailingDeviceCache {
    fn read(&self) -> CmsResult<Option<String>> {
        Err(CmsError::storage_error("device storage unavailable"))
    }

    fn write(&self, _text: &str) -> CmsResult<()> {
        Err(CmsError::storage_error("device storage unavailable"))
    }

    fn clear(&self) -> CmsResult<()> {
        Err(CmsError::storage_error("device storage unavailable"))
    }
}

type FileKey = (String, String, String, String);

fn file_key(target: &PublishTarget) -> FileKey {
    (
        target.owner.clone(),
        target.repo.clone(),
        target.branch.clone(),
        target.path.clone(),
    )
}

#[derive(Default)]
struct ContentsState {
    files: HashMap<FileKey, RepoFile>,
    puts: Vec<PutFileBody>,
    commits: u32,
}

/// In-memory repository behind the contents API. Clones share state.
#[derive(Clone, Default)]
pub struct MockContentsApi {
    state: Arc<Mutex<ContentsState>>,
    fail_lookups: bool,
    put_rejection: Option<(u16, String)>,
}

impl MockContentsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    pub fn rejecting_puts(mut self, status: u16, text: &str) -> Self {
        self.put_rejection = Some((status, text.to_string()));
        self
    }

    pub fn puts(&self) -> Vec<PutFileBody> {
        self.state.lock().unwrap().puts.clone()
    }

    pub fn file_text(&self, target: &PublishTarget) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(&file_key(target))
            .map(|file| file.decoded_text().unwrap())
    }
}

#[async_trait(?Send)]
impl ContentsApi for MockContentsApi {
    async fn get_file(&self, target: &PublishTarget) -> CmsResult<Option<RepoFile>> {
        if self.fail_lookups {
            return Err(CmsError::upstream_error(500, "GitHub GET failed: boom"));
        }
        Ok(self.state.lock().unwrap().files.get(&file_key(target)).cloned())
    }

    async fn put_file(
        &self,
        target: &PublishTarget,
        body: &PutFileBody,
    ) -> CmsResult<PutFileResult> {
        let mut state = self.state.lock().unwrap();
        state.puts.push(body.clone());

        if let Some((status, text)) = &self.put_rejection {
            return Err(CmsError::upstream_error(
                *status,
                format!("GitHub PUT failed: {}", text),
            ));
        }

        let key = file_key(target);
        let current = state.files.get(&key).map(|file| file.sha.clone());
        if current != body.sha {
            return Err(CmsError::upstream_error(
                409,
                "GitHub PUT failed: sha does not match",
            ));
        }

        state.commits += 1;
        let sha = format!("blob{:04}", state.commits);
        state.files.insert(
            key,
            RepoFile {
                sha: sha.clone(),
                content: Some(body.content.clone()),
                encoding: Some("base64".to_string()),
            },
        );
        Ok(PutFileResult {
            content: Some(RepoFileRef { sha }),
        })
    }
}
