// src/config.rs

use crate::types::CONTENT_KEY;
use crate::utils::LogLevel;
use secrecy::{ExposeSecret, SecretString};

pub const DEFAULT_KV_BINDING: &str = "CMS";

/// Worker configuration, read from vars and secrets on every request.
#[derive(Debug, Clone)]
pub struct CmsConfig {
    /// Shared secret required on `POST /content`. Writes are refused when unset.
    pub admin_save_key: Option<SecretString>,
    /// Repository token used by the brokered `/publish` endpoint.
    pub github_token: Option<SecretString>,
    pub kv_binding: String,
    pub content_key: String,
    pub log_level: LogLevel,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            admin_save_key: None,
            github_token: None,
            kv_binding: DEFAULT_KV_BINDING.to_string(),
            content_key: CONTENT_KEY.to_string(),
            log_level: LogLevel::Info,
        }
    }
}

impl CmsConfig {
    /// Build from any name -> value lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            admin_save_key: get("ADMIN_SAVE_KEY").map(SecretString::new),
            github_token: get("GITHUB_TOKEN").map(SecretString::new),
            kv_binding: get("CMS_KV_BINDING").unwrap_or(defaults.kv_binding),
            content_key: get("CMS_CONTENT_KEY").unwrap_or(defaults.content_key),
            log_level: get("LOG_LEVEL")
                .map(|level| LogLevel::from_string(&level))
                .unwrap_or(defaults.log_level),
        }
    }

    /// Read from the worker environment. Secrets are looked up first, then
    /// plain vars, so local `wrangler dev` vars keep working.
    pub fn from_env(env: &worker::Env) -> Self {
        Self::from_lookup(|name| {
            env.secret(name)
                .or_else(|_| env.var(name))
                .map(|value| value.to_string())
                .ok()
        })
    }

    pub fn publish_configured(&self) -> bool {
        self.github_token
            .as_ref()
            .is_some_and(|token| !token.expose_secret().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_configured() {
        let config = CmsConfig::from_lookup(lookup(&[]));
        assert!(config.admin_save_key.is_none());
        assert!(!config.publish_configured());
        assert_eq!(config.kv_binding, "CMS");
        assert_eq!(config.content_key, "content.json");
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_reads_secrets_and_overrides() {
        let config = CmsConfig::from_lookup(lookup(&[
            ("ADMIN_SAVE_KEY", "hunter2"),
            ("GITHUB_TOKEN", "ghp_x"),
            ("CMS_KV_BINDING", "SITE_CMS"),
            ("LOG_LEVEL", "debug"),
        ]));
        assert_eq!(
            config.admin_save_key.as_ref().map(|k| k.expose_secret().as_str()),
            Some("hunter2")
        );
        assert!(config.publish_configured());
        assert_eq!(config.kv_binding, "SITE_CMS");
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = CmsConfig::from_lookup(lookup(&[("ADMIN_SAVE_KEY", "  ")]));
        assert!(config.admin_save_key.is_none());
    }
}
