use super::github::{ContentsApi, GitHubContentsClient, PutFileBody};
use crate::services::content::backend::{serialize_document, ContentBackend};
use crate::types::{
    ContentDocument, PublishRequest, PublishTarget, SaveAck, REQUIRED_FIELDS_MESSAGE,
};
use crate::utils::{CmsError, CmsResult, Logger};
use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::{Map, Value};

/// Commits a document into a repository: look up the current blob sha, then
/// write. No retries; upstream failures come back with their own status.
#[derive(Debug, Clone)]
pub struct Publisher<A: ContentsApi> {
    api: A,
    logger: Logger,
}

impl<A: ContentsApi> Publisher<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            logger: crate::utils::logger().clone(),
        }
    }

    /// Log through `logger` (usually the per-request one) instead of the
    /// global logger.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn publish(&self, target: &PublishTarget, content_text: &str) -> CmsResult<SaveAck> {
        // A missing or unreadable file just means "create" instead of "update".
        let sha = match self.api.get_file(target).await {
            Ok(existing) => existing.map(|file| file.sha),
            Err(err) => {
                self.logger.swallowed("Existing file lookup failed", &err);
                None
            }
        };

        let body = PutFileBody::new(content_text, &target.branch, sha);
        let result = self.api.put_file(target, &body).await?;

        let ack = SaveAck::for_bytes(content_text.as_bytes()).with_commit_sha(result.sha());
        self.logger.info_with_meta(
            "Published content",
            Some(&serde_json::json!({
                "owner": target.owner,
                "repo": target.repo,
                "branch": target.branch,
                "path": target.path,
                "updated": body.sha.is_some(),
                "digest": ack.digest,
            })),
        );
        Ok(ack)
    }
}

/// Handle a raw `/publish` body. An unparsable body is reported the same way
/// as missing fields. Validation runs before `make_api`, so a bad request is
/// rejected even when no token is configured.
pub async fn publish_body<A, F>(
    body: &str,
    make_api: F,
    logger: &Logger,
) -> CmsResult<SaveAck>
where
    A: ContentsApi,
    F: FnOnce() -> CmsResult<A>,
{
    let text = if body.trim().is_empty() { "{}" } else { body };
    let request: PublishRequest = serde_json::from_str(text)
        .map_err(|_| CmsError::validation_error(REQUIRED_FIELDS_MESSAGE))?;
    let (target, content_text) = request.into_parts()?;

    let publisher = Publisher::new(make_api()?).with_logger(logger.clone());
    publisher.publish(&target, &content_text).await
}

/// Direct mode: the admin surface talks to the repository itself with an
/// operator-supplied token. Reads come from the same file it writes.
#[derive(Debug, Clone)]
pub struct GitPublishBackend<A: ContentsApi> {
    publisher: Publisher<A>,
    target: PublishTarget,
}

impl GitPublishBackend<GitHubContentsClient> {
    pub fn direct(token: SecretString, target: PublishTarget) -> CmsResult<Self> {
        Ok(Self::new(GitHubContentsClient::new(token)?, target))
    }
}

impl<A: ContentsApi> GitPublishBackend<A> {
    pub fn new(api: A, target: PublishTarget) -> Self {
        Self {
            publisher: Publisher::new(api),
            target,
        }
    }

    pub fn target(&self) -> &PublishTarget {
        &self.target
    }
}

#[async_trait(?Send)]
impl<A: ContentsApi> ContentBackend for GitPublishBackend<A> {
    async fn read(&self) -> CmsResult<ContentDocument> {
        match self.publisher.api().get_file(&self.target).await? {
            Some(file) => {
                let text = file.decoded_text()?;
                serde_json::from_str(&text).map_err(|e| {
                    CmsError::malformed_input(format!("published content is not JSON: {}", e))
                })
            }
            None => Ok(Value::Object(Map::new())),
        }
    }

    async fn write(&self, document: &ContentDocument) -> CmsResult<SaveAck> {
        let text = serialize_document(document);
        self.publisher.publish(&self.target, &text).await
    }
}
