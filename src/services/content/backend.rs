//! One save contract, several places to save to.
//!
//! The admin surface only sees [`ContentBackend`]. The blob-store path and the
//! brokered publish path live here; the direct git path is
//! `services::publish::GitPublishBackend`.

use crate::services::http::{ensure_success, fetch_document, http_client};
use crate::types::{ContentDocument, PublishRequest, PublishTarget, SaveAck, ADMIN_KEY_HEADER};
use crate::utils::{CmsError, CmsResult};
use async_trait::async_trait;
use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// Shared storage for the content document.
///
/// Reads are allowed to fail; the store treats any error as "nothing to
/// overlay". Writes must report success or failure to the caller.
#[async_trait(?Send)]
pub trait ContentBackend {
    async fn read(&self) -> CmsResult<ContentDocument>;
    async fn write(&self, document: &ContentDocument) -> CmsResult<SaveAck>;
}

/// The serialized form every backend writes: pretty-printed JSON.
pub fn serialize_document(document: &ContentDocument) -> String {
    format!("{:#}", document)
}

/// Backend with nothing behind it. Reads come back empty, writes are refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackend;

#[async_trait(?Send)]
impl ContentBackend for NoBackend {
    async fn read(&self) -> CmsResult<ContentDocument> {
        Ok(ContentDocument::Object(Default::default()))
    }

    async fn write(&self, _document: &ContentDocument) -> CmsResult<SaveAck> {
        Err(CmsError::config_error("no shared storage configured"))
    }
}

/// Client for the `/content` endpoint (KV blob, last write wins).
#[derive(Debug, Clone)]
pub struct BlobContentBackend {
    client: Client,
    endpoint: Url,
    admin_key: Option<SecretString>,
}

impl BlobContentBackend {
    pub fn new(endpoint: &str) -> CmsResult<Self> {
        Ok(Self {
            client: http_client()?,
            endpoint: Url::parse(endpoint)?,
            admin_key: None,
        })
    }

    pub fn with_admin_key(mut self, admin_key: SecretString) -> Self {
        self.admin_key = Some(admin_key);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl ContentBackend for BlobContentBackend {
    async fn read(&self) -> CmsResult<ContentDocument> {
        fetch_document(&self.client, &self.endpoint).await
    }

    async fn write(&self, document: &ContentDocument) -> CmsResult<SaveAck> {
        let admin_key = self
            .admin_key
            .as_ref()
            .ok_or_else(|| CmsError::unauthorized("admin key required to save"))?;

        let body = serialize_document(document);
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .header(ADMIN_KEY_HEADER, admin_key.expose_secret().as_str())
            .body(body.clone())
            .send()
            .await?;
        ensure_success(response, "Save failed").await?;

        Ok(SaveAck::for_bytes(body.as_bytes()))
    }
}

/// Server-brokered git publishing: the repository token stays on the server
/// behind `/publish`, and readers pick the result up from the site's static
/// `content.json`.
#[derive(Debug, Clone)]
pub struct BrokeredPublishBackend {
    client: Client,
    publish_endpoint: Url,
    content_url: Url,
    target: PublishTarget,
}

impl BrokeredPublishBackend {
    pub fn new(
        publish_endpoint: &str,
        content_url: &str,
        target: PublishTarget,
    ) -> CmsResult<Self> {
        Ok(Self {
            client: http_client()?,
            publish_endpoint: Url::parse(publish_endpoint)?,
            content_url: Url::parse(content_url)?,
            target,
        })
    }

    pub fn target(&self) -> &PublishTarget {
        &self.target
    }
}

#[async_trait(?Send)]
impl ContentBackend for BrokeredPublishBackend {
    async fn read(&self) -> CmsResult<ContentDocument> {
        fetch_document(&self.client, &self.content_url).await
    }

    async fn write(&self, document: &ContentDocument) -> CmsResult<SaveAck> {
        let body = serialize_document(document);
        let request = PublishRequest::new(&self.target, body.clone());

        let response = self
            .client
            .post(self.publish_endpoint.clone())
            .json(&request)
            .send()
            .await?;
        ensure_success(response, "Publish failed").await?;

        Ok(SaveAck::for_bytes(body.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_document_is_pretty() {
        let text = serialize_document(&json!({"site": {"name": "X"}}));
        assert_eq!(text, "{\n  \"site\": {\n    \"name\": \"X\"\n  }\n}");
    }

    #[test]
    fn test_blob_backend_rejects_bad_endpoint() {
        assert!(BlobContentBackend::new("not a url").is_err());
        let backend = BlobContentBackend::new("https://example.com/content").unwrap();
        assert_eq!(backend.endpoint().path(), "/content");
    }

    #[tokio::test]
    async fn test_blob_backend_write_requires_admin_key() {
        let backend = BlobContentBackend::new("https://example.com/content").unwrap();
        let err = backend.write(&json!({})).await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_no_backend() {
        assert_eq!(NoBackend.read().await.unwrap(), json!({}));
        assert!(NoBackend.write(&json!({})).await.is_err());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn test_blob_backend_write_sends_admin_key() {
        use crate::test_utils::CannedHttpServer;

        let server = CannedHttpServer::start(&[(200, r#"{"ok":true}"#), (401, "Unauthorized")]);
        let backend = BlobContentBackend::new(&server.url("content"))
            .unwrap()
            .with_admin_key(SecretString::new("letmein".to_string()));
        let doc = json!({"site": {"name": "Meadow"}});

        let ack = backend.write(&doc).await.unwrap();
        assert_eq!(ack.bytes, serialize_document(&doc).len());

        let err = backend.write(&doc).await.unwrap_err();
        assert!(err.is_unauthorized());

        let requests = server.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].header("X-Admin-Key"), Some("letmein"));
        assert_eq!(requests[0].body, serialize_document(&doc));
    }
}
