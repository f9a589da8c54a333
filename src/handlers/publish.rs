use super::EndpointReply;
use crate::config::CmsConfig;
use crate::middleware::cors::PUBLISH_CORS;
use crate::responses::OK;
use crate::services::publish::{publish_body, ContentsApi, GitHubContentsClient};
use crate::utils::{CmsError, CmsResult, Logger};
use worker::{Method, Request, Response, Result};

pub const MISSING_TOKEN_MESSAGE: &str = "Missing GITHUB_TOKEN env var";

/// Server-side GitHub client from the configured token.
pub fn configured_client(config: &CmsConfig) -> CmsResult<GitHubContentsClient> {
    match &config.github_token {
        Some(token) => GitHubContentsClient::new(token.clone()),
        None => Err(CmsError::config_error(MISSING_TOKEN_MESSAGE)),
    }
}

/// `POST /publish` body to reply. `make_api` only runs once the body has
/// passed validation.
pub async fn publish_reply<A, F>(body: &str, make_api: F, logger: &Logger) -> EndpointReply
where
    A: ContentsApi,
    F: FnOnce() -> CmsResult<A>,
{
    match publish_body(body, make_api, logger).await {
        Ok(ack) => {
            logger.info_with_meta(
                "Publish succeeded",
                Some(&serde_json::json!({"digest": ack.digest, "commit_sha": ack.commit_sha})),
            );
            EndpointReply::json(&OK)
        }
        Err(err) => {
            logger.warn_with_meta(
                "Publish failed",
                Some(&serde_json::json!({"error": err.message, "status": err.status_code()})),
            );
            EndpointReply::from_error(&err)
        }
    }
}

pub async fn handle_publish(
    mut req: Request,
    config: &CmsConfig,
    logger: &Logger,
) -> Result<Response> {
    let reply = match req.method() {
        Method::Options => EndpointReply::empty(),
        Method::Post => {
            let body = req.text().await?;
            publish_reply(&body, || configured_client(config), logger).await
        }
        _ => EndpointReply::method_not_allowed(),
    };
    reply.into_response(&PUBLISH_CORS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ReplyBody;
    use crate::test_utils::MockContentsApi;
    use crate::types::{PublishTarget, REQUIRED_FIELDS_MESSAGE};
    use crate::utils::LogLevel;
    use serde_json::json;

    fn quiet() -> Logger {
        Logger::new(LogLevel::Error)
    }

    fn body() -> String {
        json!({"owner": "meadow", "repo": "site", "contentText": "{\"a\":1}"}).to_string()
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let api = MockContentsApi::new();
        let bodies = [
            "",
            "nope",
            r#"{"owner":"meadow","repo":"site"}"#,
            r#"{"owner":"","repo":"site","contentText":"{}"}"#,
        ];
        for bad in bodies {
            let reply = publish_reply(bad, || Ok(api.clone()), &quiet()).await;
            assert_eq!(reply, EndpointReply::text(400, REQUIRED_FIELDS_MESSAGE));
        }
        assert!(api.puts().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token() {
        let config = CmsConfig::default();
        let reply = publish_reply(&body(), || configured_client(&config), &quiet()).await;
        assert_eq!(reply, EndpointReply::text(500, MISSING_TOKEN_MESSAGE));
    }

    #[tokio::test]
    async fn test_success_replies_ok() {
        let api = MockContentsApi::new();
        let reply = publish_reply(&body(), || Ok(api.clone()), &quiet()).await;

        assert_eq!(reply.body, ReplyBody::Json(r#"{"ok":true}"#.to_string()));
        let target = PublishTarget::new("meadow", "site");
        assert_eq!(api.file_text(&target).as_deref(), Some("{\"a\":1}"));
    }

    #[tokio::test]
    async fn test_upstream_status_passes_through() {
        let api = MockContentsApi::new().rejecting_puts(422, "Invalid request");
        let reply = publish_reply(&body(), || Ok(api.clone()), &quiet()).await;
        assert_eq!(
            reply,
            EndpointReply::text(422, "GitHub PUT failed: Invalid request")
        );
    }
}
