use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_KEY_LENGTH: usize = 512;
/// Browsers cap local storage at roughly 5 MiB per origin.
pub const MAX_VALUE_SIZE: usize = 5 * 1024 * 1024;

/// A validated key for the shell's key-value store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn parse(key: &str) -> Result<Self, KvError> {
        Self::validate_key(key)?;
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate_key(key: &str) -> Result<(), KvError> {
        if key.trim().is_empty() {
            return Err(KvError::InvalidKey {
                key: key.to_string(),
                reason: "key cannot be empty".to_string(),
            });
        }

        if key.len() > MAX_KEY_LENGTH {
            return Err(KvError::InvalidKey {
                key: key.chars().take(50).collect::<String>() + "...",
                reason: format!("key exceeds maximum length of {MAX_KEY_LENGTH} bytes"),
            });
        }

        if key.chars().any(char::is_control) {
            return Err(KvError::InvalidKey {
                key: key.escape_default().to_string(),
                reason: "key contains control characters".to_string(),
            });
        }

        Ok(())
    }
}

/// Checks a serialized value against the store's size limit before it is
/// handed to the shell.
pub fn check_value_size(value: &[u8]) -> Result<(), KvError> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(KvError::ValueTooLarge {
            size: value.len(),
            max: MAX_VALUE_SIZE,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_validation_empty() {
        let result = StorageKey::parse("");
        assert!(matches!(result, Err(KvError::InvalidKey { .. })));
    }

    #[test]
    fn test_key_validation_whitespace() {
        assert!(StorageKey::parse("   ").is_err());
    }

    #[test]
    fn test_key_validation_control_chars() {
        assert!(StorageKey::parse("cit\0ies").is_err());
        assert!(StorageKey::parse("cities\n").is_err());
    }

    #[test]
    fn test_key_validation_too_long() {
        let long_key = "a".repeat(MAX_KEY_LENGTH + 1);
        assert!(StorageKey::parse(&long_key).is_err());
        let max_key = "a".repeat(MAX_KEY_LENGTH);
        assert!(StorageKey::parse(&max_key).is_ok());
    }

    #[test]
    fn test_key_validation_accepts_dotted_names() {
        let key = StorageKey::parse("worldwise.cities").unwrap();
        assert_eq!(key.as_str(), "worldwise.cities");
    }

    #[test]
    fn test_value_size_limit() {
        assert!(check_value_size(b"[]").is_ok());
        let big = vec![b' '; MAX_VALUE_SIZE + 1];
        assert!(matches!(
            check_value_size(&big),
            Err(KvError::ValueTooLarge { .. })
        ));
    }
}
