use nanoid::nanoid;
use sha2::{Digest, Sha256};

pub fn new_subscription_id() -> String {
    format!("sub_{}", nanoid!(12))
}

pub fn new_audit_id() -> String {
    format!("aud_{}", nanoid!(12))
}

/// Confirmation tokens are single-use bearer credentials sent by email.
/// 32 chars over nanoid's 64-symbol alphabet gives 192 bits of entropy.
pub fn generate_confirmation_token() -> String {
    nanoid!(32)
}

/// Session tokens are stored hashed; lookup hashes the presented token and
/// matches on the digest.
pub fn hash_session_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_id_shape() {
        let id = new_subscription_id();
        assert!(id.starts_with("sub_"));
        assert_eq!(id.len(), 4 + 12);
    }

    #[test]
    fn test_audit_id_shape() {
        let id = new_audit_id();
        assert!(id.starts_with("aud_"));
        assert_eq!(id.len(), 4 + 12);
    }

    #[test]
    fn test_token_length_and_charset() {
        let token = generate_confirmation_token();
        assert_eq!(token.len(), 32);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
            "token must be URL-safe: {token}"
        );
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_confirmation_token();
        let b = generate_confirmation_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_session_token_deterministic() {
        let h1 = hash_session_token("sess_abc123");
        let h2 = hash_session_token("sess_abc123");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64, "SHA256 hash should be 64 hex chars");
    }

    #[test]
    fn test_hash_session_token_distinct_inputs() {
        assert_ne!(hash_session_token("sess_a"), hash_session_token("sess_b"));
    }
}
