pub mod content;
pub mod health;
pub mod publish;

pub use content::*;
pub use health::*;
pub use publish::*;

use crate::middleware::cors::CorsPolicy;
use crate::utils::CmsError;
use serde::Serialize;
use worker::{Response, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyBody {
    Json(String),
    Text(String),
    Empty,
}

/// Outcome of an endpoint, independent of the Workers runtime so it can be
/// asserted on natively. Converted to a [`Response`] only at the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReply {
    pub status: u16,
    pub body: ReplyBody,
}

impl EndpointReply {
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(text) => Self {
                status: 200,
                body: ReplyBody::Json(text),
            },
            Err(err) => Self::from_error(&CmsError::internal_error(format!(
                "Server error: {}",
                err
            ))),
        }
    }

    pub fn text(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            body: ReplyBody::Text(text.into()),
        }
    }

    pub fn empty() -> Self {
        Self {
            status: 200,
            body: ReplyBody::Empty,
        }
    }

    pub fn from_error(err: &CmsError) -> Self {
        Self::text(err.status_code(), err.message.clone())
    }

    pub fn method_not_allowed() -> Self {
        Self::text(405, "Method Not Allowed")
    }

    pub fn not_found() -> Self {
        Self::text(404, "Not Found")
    }

    pub fn into_response(self, cors: &CorsPolicy) -> Result<Response> {
        let response = match self.body {
            ReplyBody::Json(text) => {
                let mut response = Response::ok(text)?.with_status(self.status);
                response
                    .headers_mut()
                    .set("Content-Type", "application/json")?;
                response
            }
            ReplyBody::Text(text) => Response::error(text, self.status)?,
            ReplyBody::Empty => Response::empty()?.with_status(self.status),
        };
        cors.wrap(response)
    }
}
