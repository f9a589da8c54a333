use crate::types::ContentDocument;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Compiled-in default content. Defines the full shape of editable content.
const DEFAULT_CONTENT_JSON: &str = include_str!("default_content.json");

/// Top-level sections every rendered page may dereference.
pub const TOP_LEVEL_KEYS: [&str; 11] = [
    "site", "seo", "theme", "home", "services", "training", "about", "contact", "jobs",
    "policies", "credits",
];

static DEFAULTS: OnceLock<Value> = OnceLock::new();

/// A fresh copy of the default document.
pub fn default_content() -> ContentDocument {
    DEFAULTS
        .get_or_init(|| {
            serde_json::from_str(DEFAULT_CONTENT_JSON).unwrap_or_else(|err| {
                crate::log_error!(
                    "Compiled default content failed to parse",
                    serde_json::json!({ "error": err.to_string() })
                );
                Value::Object(Map::new())
            })
        })
        .clone()
}
