use crate::types::ContentDocument;
use crate::utils::{CmsError, CmsResult};
use reqwest::{header, Client, Response};
use url::Url;

/// Upper bound for reads of the shared document and for publish writes.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

pub const USER_AGENT: &str = concat!("pawlodge-cms/", env!("CARGO_PKG_VERSION"));

/// HTTP client with the request timeout applied. On wasm32 the platform
/// `fetch` owns timeouts, so the builder has nothing to set.
pub fn http_client() -> CmsResult<Client> {
    #[cfg(not(target_arch = "wasm32"))]
    let builder = Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT);

    #[cfg(target_arch = "wasm32")]
    let builder = Client::builder();

    builder
        .build()
        .map_err(|e| CmsError::internal_error(format!("failed to build HTTP client: {}", e)))
}

/// Append a `v=<millis>` query parameter so intermediate caches never serve
/// a stale copy.
pub fn cache_busted(url: &Url) -> Url {
    let mut busted = url.clone();
    busted
        .query_pairs_mut()
        .append_pair("v", &chrono::Utc::now().timestamp_millis().to_string());
    busted
}

/// GET a JSON document with cache bypass. Non-success statuses and
/// unparsable bodies are errors; callers decide whether to swallow them.
pub async fn fetch_document(client: &Client, url: &Url) -> CmsResult<ContentDocument> {
    let response = client
        .get(cache_busted(url))
        .header(header::CACHE_CONTROL, "no-store")
        .header(header::ACCEPT, "application/json")
        .send()
        .await?;

    let response = ensure_success(response, "content fetch failed").await?;
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Turn a non-success response into an error that keeps the upstream status
/// and body text. 401 stays an authorization failure.
pub async fn ensure_success(response: Response, context: &str) -> CmsResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(CmsError::unauthorized(if text.is_empty() {
            "Unauthorized".to_string()
        } else {
            text
        }));
    }
    Err(CmsError::upstream_error(
        status.as_u16(),
        format!("{}: {}", context, text),
    ))
}
