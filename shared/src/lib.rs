// shared/src/lib.rs

use std::fmt;
use std::time::Duration;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("store unavailable")]
    StoreUnavailable,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("connection already initialized")]
    AlreadyInitialized,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Expiry of a stored key, in whole seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TtlSecs(pub u64);

impl TtlSecs {
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

/// Value accepted by the key-value store.
///
/// Numbers are persisted in their decimal text form, so reading one back
/// yields a string (`42` comes back as `"42"`).
#[derive(Clone, Debug, PartialEq)]
pub enum StoredValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for StoredValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredValue::Text(s) => f.write_str(s),
            StoredValue::Integer(n) => write!(f, "{n}"),
            StoredValue::Float(n) => write!(f, "{n}"),
        }
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::Text(value)
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::Text(value.to_string())
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Integer(value)
    }
}

impl From<i32> for StoredValue {
    fn from(value: i32) -> Self {
        StoredValue::Integer(value.into())
    }
}

impl From<u32> for StoredValue {
    fn from(value: u32) -> Self {
        StoredValue::Integer(value.into())
    }
}

impl From<f64> for StoredValue {
    fn from(value: f64) -> Self {
        StoredValue::Float(value)
    }
}

pub mod config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_value_text_form() {
        assert_eq!(StoredValue::from("abc").to_string(), "abc");
        assert_eq!(StoredValue::from(42).to_string(), "42");
        assert_eq!(StoredValue::from(-7i64).to_string(), "-7");
        assert_eq!(StoredValue::from(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_ttl_as_duration() {
        assert_eq!(TtlSecs(10).as_duration(), Duration::from_secs(10));
    }
}
