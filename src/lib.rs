use worker::*;

// Module declarations
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod services;
pub mod types;
pub mod utils;

pub mod test_utils;

use config::CmsConfig;
use handlers::{handle_content, handle_health_check, handle_publish, EndpointReply};
use middleware::cors::{cors_for_path, DEFAULT_CORS};

pub use services::content::{deep_merge, ContentStore};
pub use types::{ContentDocument, PublishRequest, PublishTarget, SaveAck};
pub use utils::{CmsError, CmsResult};

#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    utils::logger::set_panic_hook();

    let config = CmsConfig::from_env(&env);
    utils::logger::init_logger(config.log_level);

    let url = req.url()?;
    let path = url.path().to_string();
    let method = req.method();

    let logger = utils::logger().for_request(&method.to_string(), &path);
    logger.debug("Request received");

    let result = match (method, path.as_str()) {
        (_, "/content") => handle_content(req, &env, &config, &logger).await,
        (_, "/publish") => handle_publish(req, &config, &logger).await,
        (Method::Get, "/health") => handle_health_check(&env, &config).await,
        (Method::Options, _) => DEFAULT_CORS.preflight(),
        _ => EndpointReply::not_found().into_response(&DEFAULT_CORS),
    };

    result.or_else(|err| {
        logger.error_with_meta(
            "Unhandled worker error",
            Some(&serde_json::json!({"error": err.to_string()})),
        );
        EndpointReply::text(500, format!("Server error: {}", err))
            .into_response(&cors_for_path(&path))
    })
}
