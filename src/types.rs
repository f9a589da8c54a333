// src/types.rs

use crate::utils::{CmsError, CmsResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The full nested structure of editable site content. Always a JSON object
/// at the root; callers keep the shape consistent.
pub type ContentDocument = serde_json::Value;

/// Device-local storage key holding the last-known document.
pub const DEVICE_CACHE_KEY: &str = "crmData/v1";

/// KV key of the shared document.
pub const CONTENT_KEY: &str = "content.json";

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_PUBLISH_PATH: &str = "public/content.json";
pub const PUBLISH_COMMIT_MESSAGE: &str = "chore(content): publish shared content.json";

/// Rejection text for a `/publish` body without its required fields.
pub const REQUIRED_FIELDS_MESSAGE: &str = "owner, repo, contentText are required";

/// Header carrying the shared admin secret on `POST /content`.
pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";

/// Body of `POST /publish`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default)]
    pub content_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl PublishRequest {
    pub fn new(target: &PublishTarget, content_text: impl Into<String>) -> Self {
        Self {
            owner: Some(target.owner.clone()),
            repo: Some(target.repo.clone()),
            branch: Some(target.branch.clone()),
            content_text: Some(content_text.into()),
            path: Some(target.path.clone()),
        }
    }

    /// Split into a validated target and the text to commit. `owner`, `repo`
    /// and `contentText` must be present and non-empty.
    pub fn into_parts(self) -> CmsResult<(PublishTarget, String)> {
        fn required(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        let (Some(owner), Some(repo), Some(content_text)) = (
            required(self.owner),
            required(self.repo),
            required(self.content_text),
        ) else {
            return Err(CmsError::validation_error(REQUIRED_FIELDS_MESSAGE));
        };

        let target = PublishTarget {
            owner,
            repo,
            branch: required(self.branch).unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            path: required(self.path).unwrap_or_else(|| DEFAULT_PUBLISH_PATH.to_string()),
        };
        Ok((target, content_text))
    }
}

/// Where a published document lands in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishTarget {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
}

impl PublishTarget {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: DEFAULT_BRANCH.to_string(),
            path: DEFAULT_PUBLISH_PATH.to_string(),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

/// Acknowledgement of a successful write to shared storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAck {
    /// sha256 of the exact bytes written, hex encoded.
    pub digest: String,
    pub bytes: usize,
    /// Blob sha reported by the repository API, when the write went there.
    pub commit_sha: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl SaveAck {
    pub fn for_bytes(bytes: &[u8]) -> Self {
        use sha2::{Digest, Sha256};

        Self {
            digest: hex::encode(Sha256::digest(bytes)),
            bytes: bytes.len(),
            commit_sha: None,
            saved_at: Utc::now(),
        }
    }

    pub fn with_commit_sha(mut self, sha: Option<String>) -> Self {
        self.commit_sha = sha;
        self
    }
}
