//! Lock key construction and input validation.

use crate::lock::types::LockError;

/// Canonical form of a domain: trimmed, lowercase, without scheme or
/// trailing slashes. `HTTPS://Example.com/` and `example.com` are the same.
pub fn normalize_domain(domain: &str) -> String {
    let lowered = domain.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    without_scheme.trim_end_matches('/').to_string()
}

/// Build `{prefix}:{user_id}:{normalized_domain}`, rejecting inputs that
/// would make the key ambiguous.
pub fn lock_key(prefix: &str, user_id: &str, domain: &str) -> Result<String, LockError> {
    if user_id.is_empty() {
        return Err(LockError::InvalidInput { field: "user_id", reason: "must not be empty" });
    }
    if user_id.contains(':') || user_id.chars().any(char::is_whitespace) {
        return Err(LockError::InvalidInput {
            field: "user_id",
            reason: "must not contain ':' or whitespace",
        });
    }

    let domain = normalize_domain(domain);
    if domain.is_empty() {
        return Err(LockError::InvalidInput { field: "domain", reason: "must not be empty" });
    }
    if domain.chars().any(char::is_whitespace) {
        return Err(LockError::InvalidInput { field: "domain", reason: "must not contain whitespace" });
    }

    Ok(format!("{}:{}:{}", prefix, user_id, domain))
}

pub fn validate_job_id(job_id: &str) -> Result<(), LockError> {
    if job_id.trim().is_empty() {
        return Err(LockError::InvalidInput { field: "job_id", reason: "must not be empty" });
    }
    Ok(())
}
