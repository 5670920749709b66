//! Wrapped operand values
//!
//! A [`Value`] is an immutable integer in `0..=10` carrying a SHA-256 digest
//! of its decimal form and a derived [`Category`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::CalcError;
use crate::pacing::Pacing;
use crate::progress::ProgressManager;

/// Smallest supported value
pub const MIN_VALUE: i64 = 0;

/// Largest supported value
pub const MAX_VALUE: i64 = 10;

/// Classification derived from the raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Zero,
    SingleDigit,
    Ten,
}

impl Category {
    /// Classify a raw value; anything outside `0..=10` is rejected
    pub fn classify(raw: i64) -> Result<Self, CalcError> {
        match raw {
            0 => Ok(Category::Zero),
            1..=9 => Ok(Category::SingleDigit),
            10 => Ok(Category::Ten),
            _ => Err(CalcError::OutOfRange { value: raw }),
        }
    }

    /// Numeric code used in serialized records
    pub fn code(&self) -> u8 {
        match self {
            Category::Zero => 0,
            Category::SingleDigit => 1,
            Category::Ten => 10,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Category::Zero),
            1 => Some(Category::SingleDigit),
            10 => Some(Category::Ten),
            _ => None,
        }
    }
}

/// Lowercase hex SHA-256 of the decimal string form
pub fn digest_of(raw: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.to_string().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Immutable wrapped integer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    raw: i64,
    digest: String,
    created_at: DateTime<Utc>,
    category: Category,
}

/// Serialized form of a [`Value`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueRecord {
    pub raw_value: i64,
    pub hash: String,
    pub timestamp: f64,
    pub category: u8,
}

impl Value {
    pub fn new(raw: i64) -> Result<Self, CalcError> {
        let category = Category::classify(raw)?;
        Ok(Self {
            raw,
            digest: digest_of(raw),
            created_at: Utc::now(),
            category,
        })
    }

    pub fn raw(&self) -> i64 {
        self.raw
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn to_record(&self) -> ValueRecord {
        ValueRecord {
            raw_value: self.raw,
            hash: self.digest.clone(),
            timestamp: self.created_at.timestamp_millis() as f64 / 1000.0,
            category: self.category.code(),
        }
    }

    pub fn to_json(&self) -> Result<String, CalcError> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    /// Rebuild from JSON, rejecting records whose digest does not match
    pub fn from_json(json: &str) -> Result<Self, CalcError> {
        let record: ValueRecord = serde_json::from_str(json)?;
        let value = Self::new(record.raw_value)?;
        if value.digest != record.hash {
            return Err(CalcError::Integrity {
                reason: format!("digest mismatch for value {}", record.raw_value),
            });
        }
        Ok(value)
    }

    #[cfg(test)]
    pub(crate) fn with_digest(mut self, digest: &str) -> Self {
        self.digest = digest.to_string();
        self
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Builds and (de)serializes values while reporting progress
///
/// Every stage goes through the factory so value construction shows up on
/// the monitor the same way wherever it happens.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueFactory {
    pacing: Pacing,
}

impl ValueFactory {
    pub fn new(pacing: Pacing) -> Self {
        Self { pacing }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Wrap `raw`; fails with a domain error outside `0..=10`
    pub fn build(&self, raw: i64, progress: &mut ProgressManager) -> Result<Value, CalcError> {
        progress.step(1.0, "Creating value wrapper");
        progress.step(1.0, "Classifying value");
        self.pacing.pause(2);
        let value = Value::new(raw)?;
        debug!(raw, category = ?value.category(), "ValueFactory::build: value created");
        self.pacing.pause(3);
        Ok(value)
    }

    pub fn serialize(&self, value: &Value, progress: &mut ProgressManager) -> Result<String, CalcError> {
        progress.step(1.0, "Serializing value to JSON");
        self.pacing.pause(1);
        value.to_json()
    }

    pub fn deserialize(&self, json: &str, progress: &mut ProgressManager) -> Result<Value, CalcError> {
        progress.step(1.0, "Deserializing JSON to value");
        self.pacing.pause(1);
        let record: ValueRecord = serde_json::from_str(json)?;
        let value = self.build(record.raw_value, progress)?;
        if value.digest() != record.hash {
            return Err(CalcError::Integrity {
                reason: format!("digest mismatch for value {}", record.raw_value),
            });
        }
        Ok(value)
    }
}
