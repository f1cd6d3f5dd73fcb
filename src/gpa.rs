// 🎓 GPA Aggregation - credit-weighted mean of resolved points
// All-or-nothing: one bad row means no GPA at all

use crate::conversion::{convert_grade_to_points, parse_number};
use crate::courses::CourseEntry;
use crate::grading::GradeSystemEntry;
use crate::validation::validate_course;
use serde::Serialize;

// ============================================================================
// BREAKDOWN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseContribution {
    pub id: String,
    pub course: String,
    pub credits: f64,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpaBreakdown {
    pub contributions: Vec<CourseContribution>,
    pub total_points: f64,
    pub total_credits: f64,
    pub gpa: f64,
}

/// Non-empty grade and credits, with credits parsing above zero.
/// Whitespace is content here, not emptiness.
pub fn is_countable(course: &CourseEntry) -> bool {
    !course.grade.is_empty()
        && !course.credits.is_empty()
        && parse_number(&course.credits).is_some_and(|c| c > 0.0)
}

/// Full aggregation with per-course contributions
///
/// Returns `None` when there is no table, when any row fails validation,
/// when no row is countable, when a countable grade does not resolve, or
/// when the credit total is zero.
pub fn gpa_breakdown(courses: &[CourseEntry], table: &[GradeSystemEntry]) -> Option<GpaBreakdown> {
    if table.is_empty() {
        return None;
    }

    if courses.iter().any(|c| !validate_course(c, table).is_ok()) {
        return None;
    }

    let countable: Vec<&CourseEntry> = courses.iter().filter(|c| is_countable(c)).collect();
    if countable.is_empty() {
        return None;
    }

    let mut contributions = Vec::with_capacity(countable.len());
    let mut total_points = 0.0;
    let mut total_credits = 0.0;

    for course in countable {
        let credits = parse_number(&course.credits)?;
        let points = convert_grade_to_points(&course.grade, table)?;

        total_points += credits * points;
        total_credits += credits;
        contributions.push(CourseContribution {
            id: course.id.clone(),
            course: course.course.clone(),
            credits,
            points,
        });
    }

    if total_credits == 0.0 {
        return None;
    }

    Some(GpaBreakdown {
        contributions,
        total_points,
        total_credits,
        gpa: total_points / total_credits,
    })
}

pub fn compute_gpa(courses: &[CourseEntry], table: &[GradeSystemEntry]) -> Option<f64> {
    gpa_breakdown(courses, table).map(|b| b.gpa)
}

/// Two-decimal display form; no GPA shows as 0.00
pub fn format_gpa(gpa: Option<f64>) -> String {
    format!("{:.2}", gpa.unwrap_or(0.0))
}

// ============================================================================
// TESTS
// ============================================================================
