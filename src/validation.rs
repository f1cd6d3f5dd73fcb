// ✅ Validation - credit and grade field checks
// Empty fields are not errors here; aggregation decides what counts

use crate::conversion::{convert_grade_to_points, parse_number};
use crate::courses::CourseEntry;
use crate::grading::GradeSystemEntry;
use serde::{Deserialize, Serialize};

// ============================================================================
// ERROR KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ErrorKind {
    /// Credits field is not a finite number
    #[error("Credits must be a number")]
    InvalidNumber,

    /// Credits field is zero or negative
    #[error("Credits must be greater than 0")]
    NonPositive,

    /// No grading table is active
    #[error("Select a country first")]
    NoTableSelected,

    /// Grade does not match any entry of the active table
    #[error("Grade not recognized for this grading system")]
    Unrecognized,
}

/// Validation outcome of one course row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseErrors {
    pub credits: Option<ErrorKind>,
    pub grade: Option<ErrorKind>,
}

impl CourseErrors {
    pub fn is_ok(&self) -> bool {
        self.credits.is_none() && self.grade.is_none()
    }
}

// ============================================================================
// CHECKS
// ============================================================================

pub fn validate_credits(raw: &str) -> Option<ErrorKind> {
    if raw.is_empty() {
        return None;
    }

    match parse_number(raw) {
        None => Some(ErrorKind::InvalidNumber),
        Some(credits) if credits <= 0.0 => Some(ErrorKind::NonPositive),
        Some(_) => None,
    }
}

pub fn validate_grade(raw: &str, table: &[GradeSystemEntry]) -> Option<ErrorKind> {
    if raw.is_empty() {
        return None;
    }

    if table.is_empty() {
        return Some(ErrorKind::NoTableSelected);
    }

    match convert_grade_to_points(raw, table) {
        Some(_) => None,
        None => Some(ErrorKind::Unrecognized),
    }
}

pub fn validate_course(course: &CourseEntry, table: &[GradeSystemEntry]) -> CourseErrors {
    CourseErrors {
        credits: validate_credits(&course.credits),
        grade: validate_grade(&course.grade, table),
    }
}

// ============================================================================
// TESTS
// ============================================================================
