use crate::types::ADMIN_KEY_HEADER;
use crate::utils::{CmsError, CmsResult};
use secrecy::{ExposeSecret, SecretString};
use worker::Request;

/// Extract the shared admin key from request headers
pub fn extract_admin_key(req: &Request) -> Option<String> {
    req.headers().get(ADMIN_KEY_HEADER).ok().flatten()
}

/// Check a presented admin key against the configured one. A missing secret
/// refuses every write.
pub fn verify_admin_key(
    expected: Option<&SecretString>,
    presented: Option<&str>,
) -> CmsResult<()> {
    match (expected, presented) {
        (Some(expected), Some(presented)) if secrets_match(expected.expose_secret(), presented) => {
            Ok(())
        }
        _ => Err(CmsError::unauthorized("Unauthorized")),
    }
}

/// Length-then-bytes comparison that does not short-circuit on the first
/// differing byte.
pub fn secrets_match(expected: &str, presented: &str) -> bool {
    let (a, b) = (expected.as_bytes(), presented.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::new(value.to_string())
    }

    #[test]
    fn test_verify_admin_key() {
        let key = secret("k-123");
        assert!(verify_admin_key(Some(&key), Some("k-123")).is_ok());

        let err = verify_admin_key(Some(&key), Some("k-124")).unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.message, "Unauthorized");
        assert_eq!(err.status_code(), 401);

        assert!(verify_admin_key(Some(&key), None).is_err());
        assert!(verify_admin_key(None, Some("k-123")).is_err());
        assert!(verify_admin_key(None, None).is_err());
    }

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("abc", "abc"));
        assert!(!secrets_match("abc", "abd"));
        assert!(!secrets_match("abc", "abcd"));
        assert!(secrets_match("", ""));
    }
}
