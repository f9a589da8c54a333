//! GitHub contents API: read a file's blob sha, write a file.

use crate::services::http::{http_client, USER_AGENT};
use crate::types::{PublishTarget, PUBLISH_COMMIT_MESSAGE};
use crate::utils::{CmsError, CmsResult};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

pub const GITHUB_API_BASE: &str = "https://api.github.com/";
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// A file as returned by `GET /repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFile {
    pub sha: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl RepoFile {
    /// File body as text. GitHub wraps base64 at 60 columns, so whitespace
    /// is stripped before decoding.
    pub fn decoded_text(&self) -> CmsResult<String> {
        let raw = self.content.as_deref().unwrap_or_default();
        match self.encoding.as_deref() {
            Some("base64") | None => {
                let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
                let bytes = STANDARD.decode(compact).map_err(|e| {
                    CmsError::malformed_input(format!("invalid base64 file content: {}", e))
                })?;
                String::from_utf8(bytes).map_err(|e| {
                    CmsError::malformed_input(format!("file content is not UTF-8: {}", e))
                })
            }
            Some(other) => Err(CmsError::malformed_input(format!(
                "unsupported file encoding '{}'",
                other
            ))),
        }
    }
}

/// Body of the contents API `PUT`. `sha` is present only when updating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutFileBody {
    pub message: String,
    pub content: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl PutFileBody {
    pub fn new(content_text: &str, branch: &str, sha: Option<String>) -> Self {
        Self {
            message: PUBLISH_COMMIT_MESSAGE.to_string(),
            content: STANDARD.encode(content_text.as_bytes()),
            branch: branch.to_string(),
            sha,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutFileResult {
    #[serde(default)]
    pub content: Option<RepoFileRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoFileRef {
    pub sha: String,
}

impl PutFileResult {
    pub fn sha(&self) -> Option<String> {
        self.content.as_ref().map(|c| c.sha.clone())
    }
}

/// The two contents API calls publishing needs.
#[async_trait(?Send)]
pub trait ContentsApi {
    /// `Ok(None)` when the file does not exist on the branch yet.
    async fn get_file(&self, target: &PublishTarget) -> CmsResult<Option<RepoFile>>;
    async fn put_file(
        &self,
        target: &PublishTarget,
        body: &PutFileBody,
    ) -> CmsResult<PutFileResult>;
}

/// Token-authenticated GitHub client. Used server-side by `/publish` and
/// client-side in direct mode; both run the same requests.
#[derive(Debug, Clone)]
pub struct GitHubContentsClient {
    client: Client,
    token: SecretString,
    api_base: Url,
}

impl GitHubContentsClient {
    pub fn new(token: SecretString) -> CmsResult<Self> {
        Self::with_api_base(token, GITHUB_API_BASE)
    }

    /// Point at a different API root (GitHub Enterprise, a local fake).
    pub fn with_api_base(token: SecretString, api_base: &str) -> CmsResult<Self> {
        if token.expose_secret().trim().is_empty() {
            return Err(CmsError::config_error("repository token is empty"));
        }
        Ok(Self {
            client: http_client()?,
            token,
            api_base: Url::parse(api_base)?,
        })
    }

    /// `{api_base}/repos/{owner}/{repo}/contents/{path}`, each segment
    /// percent-encoded on its own so slashes in `path` stay separators.
    pub fn contents_url(&self, target: &PublishTarget) -> CmsResult<Url> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| CmsError::config_error("API base cannot be a base URL"))?;
            segments
                .pop_if_empty()
                .push("repos")
                .push(&target.owner)
                .push(&target.repo)
                .push("contents");
            segments.extend(target.path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(
                header::AUTHORIZATION,
                format!("token {}", self.token.expose_secret()),
            )
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .header(header::USER_AGENT, USER_AGENT)
    }
}

#[async_trait(?Send)]
impl ContentsApi for GitHubContentsClient {
    async fn get_file(&self, target: &PublishTarget) -> CmsResult<Option<RepoFile>> {
        let mut url = self.contents_url(target)?;
        url.query_pairs_mut().append_pair("ref", &target.branch);

        let response = self.authorized(self.client.get(url)).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CmsError::upstream_error(
                status.as_u16(),
                format!("GitHub GET failed: {}", text),
            ));
        }
        Ok(Some(response.json::<RepoFile>().await?))
    }

    async fn put_file(
        &self,
        target: &PublishTarget,
        body: &PutFileBody,
    ) -> CmsResult<PutFileResult> {
        let url = self.contents_url(target)?;
        let response = self
            .authorized(self.client.put(url))
            .header(header::CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CmsError::upstream_error(
                status.as_u16(),
                format!("GitHub PUT failed: {}", text),
            ));
        }

        // The commit already happened; an unreadable body only costs us the new sha.
        let text = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GitHubContentsClient {
        GitHubContentsClient::new(SecretString::new("ghp_test".to_string())).unwrap()
    }

    #[test]
    fn test_contents_url_keeps_path_separators() {
        let target = PublishTarget::new("meadow", "site").with_path("public/content.json");
        let url = client().contents_url(&target).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/meadow/site/contents/public/content.json"
        );
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        let target = PublishTarget::new("meadow", "site").with_path("data/my content.json");
        let url = client().contents_url(&target).unwrap();
        assert!(url.as_str().ends_with("/contents/data/my%20content.json"));
    }

    #[test]
    fn test_empty_token_is_rejected() {
        assert!(GitHubContentsClient::new(SecretString::new(" ".to_string())).is_err());
    }

    #[test]
    fn test_put_body_omits_missing_sha() {
        let body = PutFileBody::new("{\"a\":1}", "main", None);
        let wire = serde_json::to_value(&body).unwrap();
        assert!(wire.get("sha").is_none());
        assert_eq!(wire["message"], PUBLISH_COMMIT_MESSAGE);
        assert_eq!(wire["content"], "eyJhIjoxfQ==");
        assert_eq!(wire["branch"], "main");

        let update = PutFileBody::new("{}", "main", Some("abc123".to_string()));
        assert_eq!(serde_json::to_value(&update).unwrap()["sha"], "abc123");
    }

    #[test]
    fn test_decoded_text_handles_wrapped_base64() {
        let file = RepoFile {
            sha: "abc".to_string(),
            content: Some("eyJzaXRl\nIjp7fX0=\n".to_string()),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(file.decoded_text().unwrap(), "{\"site\":{}}");

        let odd = RepoFile {
            encoding: Some("utf-16".to_string()),
            ..file
        };
        assert!(odd.decoded_text().is_err());
    }

    #[cfg(not(target_arch = "wasm32"))]
    mod over_http {
        use super::*;
        use crate::services::publish::Publisher;
        use crate::test_utils::CannedHttpServer;

        fn client_for(server: &CannedHttpServer) -> GitHubContentsClient {
            GitHubContentsClient::with_api_base(
                SecretString::new("ghp_test".to_string()),
                server.base_url(),
            )
            .unwrap()
        }

        fn target() -> PublishTarget {
            PublishTarget::new("meadow", "site")
                .with_branch("staging")
                .with_path("public/content.json")
        }

        #[tokio::test]
        async fn test_get_missing_file_is_none() {
            let server = CannedHttpServer::start(&[(404, r#"{"message":"Not Found"}"#)]);

            let file = client_for(&server).get_file(&target()).await.unwrap();
            assert_eq!(file, None);

            let requests = server.requests();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].method, "GET");
            assert_eq!(
                requests[0].target,
                "/repos/meadow/site/contents/public/content.json?ref=staging"
            );
            assert_eq!(requests[0].header("Authorization"), Some("token ghp_test"));
            assert_eq!(
                requests[0].header("Accept"),
                Some("application/vnd.github+json")
            );
            assert_eq!(
                requests[0].header("X-GitHub-Api-Version"),
                Some(GITHUB_API_VERSION)
            );
        }

        #[tokio::test]
        async fn test_get_existing_file() {
            let server = CannedHttpServer::start(&[(
                200,
                r#"{"sha":"abc123","content":"e30=\n","encoding":"base64"}"#,
            )]);

            let file = client_for(&server)
                .get_file(&target())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(file.sha, "abc123");
            assert_eq!(file.decoded_text().unwrap(), "{}");
        }

        #[tokio::test]
        async fn test_get_failure_keeps_status() {
            let server = CannedHttpServer::start(&[(500, "boom")]);

            let err = client_for(&server).get_file(&target()).await.unwrap_err();
            assert_eq!(err.status_code(), 500);
            assert_eq!(err.message, "GitHub GET failed: boom");
        }

        #[tokio::test]
        async fn test_put_rejection_keeps_status_and_text() {
            let server = CannedHttpServer::start(&[(422, "Invalid request")]);
            let body = PutFileBody::new("{}", "staging", Some("abc123".to_string()));

            let err = client_for(&server)
                .put_file(&target(), &body)
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), 422);
            assert_eq!(err.message, "GitHub PUT failed: Invalid request");

            let requests = server.requests();
            assert_eq!(requests[0].method, "PUT");
            assert_eq!(
                requests[0].target,
                "/repos/meadow/site/contents/public/content.json"
            );
            assert_eq!(requests[0].json_body(), serde_json::to_value(&body).unwrap());
        }

        #[tokio::test]
        async fn test_unauthorized_put_is_not_remapped() {
            let server = CannedHttpServer::start(&[(401, "Bad credentials")]);
            let body = PutFileBody::new("{}", "staging", None);

            let err = client_for(&server)
                .put_file(&target(), &body)
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), 401);
            assert_eq!(err.message, "GitHub PUT failed: Bad credentials");
        }

        #[tokio::test]
        async fn test_publish_updates_existing_file_over_the_wire() {
            let server = CannedHttpServer::start(&[
                (200, r#"{"sha":"old1","content":"e30=","encoding":"base64"}"#),
                (200, r#"{"content":{"sha":"new1"}}"#),
            ]);
            let publisher = Publisher::new(client_for(&server));

            let ack = publisher.publish(&target(), "{\"a\":1}").await.unwrap();
            assert_eq!(ack.commit_sha.as_deref(), Some("new1"));

            let requests = server.requests();
            assert_eq!(requests.len(), 2);
            let sent = requests[1].json_body();
            assert_eq!(sent["sha"], "old1");
            assert_eq!(sent["branch"], "staging");
            assert_eq!(sent["content"], "eyJhIjoxfQ==");
        }

        #[tokio::test]
        async fn test_publish_creates_when_lookup_fails() {
            let server = CannedHttpServer::start(&[
                (503, "unavailable"),
                (201, r#"{"content":{"sha":"new1"}}"#),
            ]);
            let publisher = Publisher::new(client_for(&server));

            publisher.publish(&target(), "{}").await.unwrap();

            let sent = server.requests()[1].json_body();
            assert!(sent.get("sha").is_none());
        }
    }
}
