use super::EndpointReply;
use crate::config::CmsConfig;
use crate::middleware::auth::{extract_admin_key, verify_admin_key};
use crate::middleware::cors::CONTENT_CORS;
use crate::responses::OK;
use crate::services::kv::{open_store, KvOperations};
use crate::types::ContentDocument;
use crate::utils::{CmsError, CmsResult, Logger};
use secrecy::SecretString;
use serde_json::{Map, Value};
use worker::{Env, Method, Request, Response, Result};

/// `/content`: one JSON document in KV, read by anyone, overwritten by
/// whoever holds the admin key.
pub struct ContentEndpoint<'a, K: KvOperations + ?Sized> {
    kv: &'a K,
    content_key: &'a str,
    admin_key: Option<&'a SecretString>,
}

impl<'a, K: KvOperations + ?Sized> ContentEndpoint<'a, K> {
    pub fn new(kv: &'a K, content_key: &'a str, admin_key: Option<&'a SecretString>) -> Self {
        Self {
            kv,
            content_key,
            admin_key,
        }
    }

    /// The stored document, or `{}` when nothing has been saved yet.
    pub async fn read(&self) -> CmsResult<ContentDocument> {
        match self.kv.get_text(self.content_key).await? {
            Some(text) => serde_json::from_str(&text)
                .map_err(|e| CmsError::storage_error(format!("Server error: {}", e))),
            None => Ok(Value::Object(Map::new())),
        }
    }

    /// Store `body` verbatim. The key is checked before the body is looked
    /// at; nothing is written unless both pass.
    pub async fn write(&self, presented_key: Option<&str>, body: &str) -> CmsResult<()> {
        verify_admin_key(self.admin_key, presented_key)?;

        let text = if body.trim().is_empty() { "{}" } else { body };
        serde_json::from_str::<Value>(text)?;

        self.kv.put_text(self.content_key, text).await?;
        Ok(())
    }

    pub async fn get(&self, logger: &Logger) -> EndpointReply {
        match self.read().await {
            Ok(document) => EndpointReply::json(&document),
            Err(err) => {
                logger.error_with_meta(
                    "Content read failed",
                    Some(&serde_json::json!({"error": err.message})),
                );
                EndpointReply::from_error(&err)
            }
        }
    }

    pub async fn post(
        &self,
        presented_key: Option<&str>,
        body: &str,
        logger: &Logger,
    ) -> EndpointReply {
        match self.write(presented_key, body).await {
            Ok(()) => {
                logger.info_with_meta(
                    "Content saved",
                    Some(&serde_json::json!({"key": self.content_key, "bytes": body.len()})),
                );
                EndpointReply::json(&OK)
            }
            Err(err) => {
                logger.warn_with_meta(
                    "Content save rejected",
                    Some(&serde_json::json!({"error": err.message, "status": err.status_code()})),
                );
                EndpointReply::from_error(&err)
            }
        }
    }
}

pub async fn handle_content(
    mut req: Request,
    env: &Env,
    config: &CmsConfig,
    logger: &Logger,
) -> Result<Response> {
    let method = req.method();
    let reply = match method {
        Method::Options => EndpointReply::empty(),
        Method::Get | Method::Post => match open_store(env, &config.kv_binding) {
            Ok(kv) => {
                let endpoint =
                    ContentEndpoint::new(&kv, &config.content_key, config.admin_save_key.as_ref());
                if method == Method::Get {
                    endpoint.get(logger).await
                } else {
                    let presented = extract_admin_key(&req);
                    let body = req.text().await?;
                    endpoint.post(presented.as_deref(), &body, logger).await
                }
            }
            Err(err) => {
                let err = CmsError::from(err);
                logger.error(&err.message);
                EndpointReply::from_error(&err)
            }
        },
        _ => EndpointReply::method_not_allowed(),
    };
    reply.into_response(&CONTENT_CORS)
}
