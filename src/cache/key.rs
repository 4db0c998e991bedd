//! Deterministic short cache keys.

use sha2::{Digest, Sha256};

const RESOURCE_HASH_LEN: usize = 20;
const PARAMS_HASH_LEN: usize = 10;

fn short_hash(input: &str, len: usize) -> String {
    let mut digest = hex::encode(Sha256::digest(input.as_bytes()));
    digest.truncate(len);
    digest
}

/// Build `prefix:hash(resource)[..20]`, suffixed with `:hash(params)[..10]`
/// when params are given. Raw URLs never end up in the key.
pub fn generate_cache_key(prefix: &str, resource: &str, params: Option<&serde_json::Value>) -> String {
    let mut key = format!("{}:{}", prefix, short_hash(resource, RESOURCE_HASH_LEN));
    if let Some(params) = params {
        // serde_json orders object keys, so equal params hash equally
        key.push(':');
        key.push_str(&short_hash(&params.to_string(), PARAMS_HASH_LEN));
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_shape() {
        let key = generate_cache_key("scan", "https://example.com/pricing?utm=1", None);
        let (prefix, hash) = key.split_once(':').unwrap();
        assert_eq!(prefix, "scan");
        assert_eq!(hash.len(), 20);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!key.contains("example.com"));
    }

    #[test]
    fn test_deterministic_and_param_sensitive() {
        let a = generate_cache_key("schema", "https://example.com", Some(&json!({"depth": 2, "mobile": true})));
        let b = generate_cache_key("schema", "https://example.com", Some(&json!({"mobile": true, "depth": 2})));
        let c = generate_cache_key("schema", "https://example.com", Some(&json!({"depth": 3})));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.split(':').nth(2).unwrap().len(), 10);
    }
}
