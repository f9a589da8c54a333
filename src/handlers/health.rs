use crate::config::CmsConfig;
use crate::middleware::cors::DEFAULT_CORS;
use crate::responses::ApiResponse;
use crate::services::kv::open_store;
use serde::Serialize;
use worker::{Env, Response, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub kv_bound: bool,
    pub publish_configured: bool,
}

impl HealthReport {
    pub fn new(config: &CmsConfig, kv_bound: bool) -> Self {
        Self {
            status: if kv_bound { "healthy" } else { "degraded" },
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            kv_bound,
            publish_configured: config.publish_configured(),
        }
    }
}

/// Basic health check endpoint
pub async fn handle_health_check(env: &Env, config: &CmsConfig) -> Result<Response> {
    let kv_bound = open_store(env, &config.kv_binding).is_ok();
    let response = ApiResponse::success(HealthReport::new(config, kv_bound));
    DEFAULT_CORS.wrap(Response::from_json(&response)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_report() {
        let config = CmsConfig::from_lookup(|name| {
            (name == "GITHUB_TOKEN").then(|| "ghp_x".to_string())
        });
        let report = HealthReport::new(&config, true);
        assert_eq!(report.status, "healthy");
        assert!(report.publish_configured);

        let report = HealthReport::new(&CmsConfig::default(), false);
        assert_eq!(report.status, "degraded");
        assert!(!report.publish_configured);
    }
}
