//! Request field validation.
//!
//! Checks are plain functions over already-deserialized values and collect
//! every failure instead of stopping at the first one, so clients can fix a
//! whole form in a single round trip.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// `?id=` query used by detail routes. Missing and malformed ids are not
/// rejected here; the lookup treats them as unknown.
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Accumulates field errors. At most one error is kept per field.
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    fn failed(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn push(&mut self, field: &str, message: &str) {
        if !self.failed(field) {
            self.errors.push(FieldError::new(field, message));
        }
    }

    pub fn required(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, message);
        }
        self
    }

    pub fn alphanumeric(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if !value.trim().chars().all(|c| c.is_ascii_alphanumeric()) {
            self.push(field, message);
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str, message: &str) -> &mut Self {
        if !is_valid_email(value.trim()) {
            self.push(field, message);
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize, message: &str) -> &mut Self {
        if value.trim().chars().count() < min {
            self.push(field, message);
        }
        self
    }

    /// Parses a strictly positive integer, recording `message` on failure.
    pub fn positive_int(&mut self, field: &str, value: &str, message: &str) -> Option<i32> {
        match value.trim().parse::<i32>() {
            Ok(n) if n > 0 => Some(n),
            _ => {
                self.push(field, message);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[cfg(test)]
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// Largest magnitude an `f64` holds without losing integer precision.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Deserializes a string, integer or null into a `String`.
///
/// Form clients send numeric fields either way; validation decides later
/// whether the text is acceptable. Floats are only taken when they hold an
/// exact integer, so `2.0` reads as `"2"` and `1e300` is rejected.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_FLOAT => (n as i64).to_string(),
        Raw::Float(n) => return Err(D::Error::custom(format!("expected a string or an integer, got {n}"))),
        Raw::Null => String::new(),
    })
}
