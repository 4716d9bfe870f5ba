use serde::Serialize;
use validator::ValidateEmail;

/// A syntactically valid email address. Validation happens once, at the
/// request boundary; everything downstream can rely on the inner string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(s: String) -> Result<Self, EmailParseError> {
        if s.validate_email() {
            Ok(Self(s))
        } else {
            Err(EmailParseError(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0} is not a valid email address")]
pub struct EmailParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        for valid in [
            "a@x.com",
            "listener@cadenceavn.com",
            "first.last+tag@sub.example.org",
        ] {
            assert!(
                EmailAddress::parse(valid.to_string()).is_ok(),
                "{valid} should parse"
            );
        }
    }

    #[test]
    fn test_invalid_addresses() {
        for invalid in ["", "not-an-email", "@x.com", "a@", "a b@x.com", "a@x .com"] {
            assert!(
                EmailAddress::parse(invalid.to_string()).is_err(),
                "{invalid:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_preserves_case() {
        let email = EmailAddress::parse("Mixed.Case@Example.com".to_string()).unwrap();
        assert_eq!(email.as_str(), "Mixed.Case@Example.com");
    }
}
