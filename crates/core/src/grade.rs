//! Grade values and records.

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A grade on the 1..=5 scale. Only constructible through validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GradeValue(u8);

impl GradeValue {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 5;

    /// Parses a trimmed line as an integer grade.
    ///
    /// Anything that is not an `i64` yields `GradeNotANumber`; integers
    /// outside the scale yield `GradeOutOfRange`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let value: i64 = input
            .trim()
            .parse()
            .map_err(|_| ValidationError::GradeNotANumber(input.to_string()))?;
        Self::try_from(value)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for GradeValue {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::GradeOutOfRange(value))
        }
    }
}

impl fmt::Display for GradeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The record written when a grading flow commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGrade {
    pub student_name: String,
    pub group_name: String,
    pub value: GradeValue,
    pub assigned_on: NaiveDate,
}

/// A grade as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub id: i64,
    pub student_name: String,
    pub group_name: String,
    pub value: GradeValue,
    pub assigned_on: NaiveDate,
}
