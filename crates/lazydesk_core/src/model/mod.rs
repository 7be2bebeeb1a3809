//! Domain model for the six persisted entity kinds.
//!
//! # Responsibility
//! - Define canonical records read back from storage.
//! - Define `New*` insert payloads with range validation.
//!
//! # Invariants
//! - Stored enum values round-trip through `as_str`/`parse`.
//! - Ratings are within `1..=5`; progress is within `0..=100`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod email;
pub mod notification;
pub mod project;
pub mod study;

/// Row identifier assigned by SQLite.
pub type RecordId = i64;

/// Field-level validation failure for insert payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(&'static str),
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "`{field}` must not be blank"),
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "`{field}` = {value} is outside {min}..={max}"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

pub(crate) fn require_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
