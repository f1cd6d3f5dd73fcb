// 🧪 Table Data Quality - checks on loaded grading tables
// Reports problems in source data; never rewrites it (first match still wins)

use crate::grading::{GradeSystemEntry, GradingCatalog, GradingTable};
use serde::{Deserialize, Serialize};

// ============================================================================
// ISSUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Row can never be matched as intended
    Warning,  // Lookup result depends on row order
    Info,     // Redundant row, harmless
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub country: String,
    pub mode: String,
    /// Row position inside the country's table
    pub row: usize,
    pub issue: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub rows_checked: usize,
    pub issues: Vec<QualityIssue>,
}

impl QualityReport {
    pub fn summary(&self) -> String {
        format!(
            "{} rows checked, {} issues ({} critical, {} warnings)",
            self.rows_checked,
            self.issues.len(),
            self.count(Severity::Critical),
            self.count(Severity::Warning),
        )
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_critical_issues(&self) -> bool {
        self.count(Severity::Critical) > 0
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn merge(&mut self, other: QualityReport) {
        self.rows_checked += other.rows_checked;
        self.issues.extend(other.issues);
    }
}

// ============================================================================
// CHECKS
// ============================================================================

pub fn check_catalog(catalog: &GradingCatalog) -> QualityReport {
    let mut report = QualityReport::default();
    for (country, table) in catalog.tables() {
        report.merge(check_table(country, table));
    }
    report
}

pub fn check_table(country: &str, table: &GradingTable) -> QualityReport {
    let entries = table.entries();
    let mut issues = Vec::new();

    // Modes with at least one numeric row; letter-only modes need no ranges
    let ranged_modes: Vec<&str> = entries
        .iter()
        .filter(|e| has_bounds(e))
        .map(|e| e.mode.as_str())
        .collect();

    for (row, entry) in entries.iter().enumerate() {
        let make_issue = |severity, issue: String, recommendation: &str| QualityIssue {
            severity,
            country: country.to_string(),
            mode: entry.mode.clone(),
            row,
            issue,
            recommendation: recommendation.to_string(),
        };

        if !entry.points.is_finite() {
            issues.push(make_issue(
                Severity::Critical,
                format!("grade_points missing or not a number for '{}'", entry.letter),
                "Fill grade_points with a number",
            ));
        }

        if has_bounds(entry) && entry.range_min > entry.range_max {
            issues.push(make_issue(
                Severity::Critical,
                format!("inverted range {}-{}", entry.range_min, entry.range_max),
                "Swap grade_range_min and grade_range_max",
            ));
        }

        if !has_bounds(entry) && ranged_modes.contains(&entry.mode.as_str()) {
            issues.push(make_issue(
                Severity::Warning,
                format!("range missing for '{}', row only matches letter input", entry.letter),
                "Fill both range columns",
            ));
        }

        for (earlier_row, earlier) in entries[..row].iter().enumerate() {
            if earlier.mode != entry.mode {
                continue;
            }

            if is_range(earlier) && is_range(entry) && ranges_overlap(earlier, entry) {
                issues.push(make_issue(
                    Severity::Warning,
                    format!(
                        "range {}-{} overlaps row {} ({}-{}); row {} wins",
                        entry.range_min, entry.range_max, earlier_row, earlier.range_min,
                        earlier.range_max, earlier_row
                    ),
                    "Make ranges within one grading mode disjoint",
                ));
            }

            if !entry.letter.is_empty() && earlier.letter.to_uppercase() == entry.letter.to_uppercase() {
                issues.push(make_issue(
                    Severity::Info,
                    format!("letter '{}' repeats row {}", entry.letter, earlier_row),
                    "Remove the duplicate letter row",
                ));
            }
        }
    }

    QualityReport {
        rows_checked: entries.len(),
        issues,
    }
}

fn has_bounds(entry: &GradeSystemEntry) -> bool {
    entry.range_min.is_finite() && entry.range_max.is_finite()
}

/// Rows with a proper numeric span; single-point rows act as letter grades
fn is_range(entry: &GradeSystemEntry) -> bool {
    entry.range_min.is_finite() && entry.range_max.is_finite() && entry.range_min < entry.range_max
}

fn ranges_overlap(a: &GradeSystemEntry, b: &GradeSystemEntry) -> bool {
    a.range_min <= b.range_max && b.range_min <= a.range_max
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(mode: &str, letter: &str, min: f64, max: f64, points: f64) -> GradeSystemEntry {
        GradeSystemEntry::new("Testland", mode, letter, min, max, points)
    }

    #[test]
    fn test_clean_table() {
        let table = GradingTable::new(vec![
            entry("Percent", "A", 90.0, 100.0, 4.0),
            entry("Percent", "B", 80.0, 89.99, 3.0),
            entry("Letter", "A", 4.0, 4.0, 4.0),
        ]);

        let report = check_table("Testland", &table);
        assert!(report.is_clean(), "{}", report.summary());
        assert_eq!(report.rows_checked, 3);
    }

    #[test]
    fn test_overlap_within_mode_is_warning() {
        let table = GradingTable::new(vec![
            entry("Percent", "A", 85.0, 100.0, 4.0),
            entry("Percent", "B", 80.0, 89.99, 3.0),
        ]);

        let report = check_table("Testland", &table);
        assert_eq!(report.count(Severity::Warning), 1);
        assert_eq!(report.issues[0].row, 1);
        assert!(!report.has_critical_issues());
    }

    #[test]
    fn test_overlap_across_modes_is_fine() {
        let table = GradingTable::new(vec![
            entry("Percent", "A", 80.0, 100.0, 4.0),
            entry("Twenty", "A+", 16.0, 20.0, 4.0),
            entry("Twenty", "B", 80.0, 90.0, 3.0),
        ]);

        assert_eq!(check_table("Testland", &table).count(Severity::Warning), 0);
    }

    #[test]
    fn test_inverted_range_and_missing_points_are_critical() {
        let table = GradingTable::new(vec![
            entry("Percent", "A", 100.0, 90.0, 4.0),
            entry("Percent", "B", 80.0, 89.0, f64::NAN),
        ]);

        let report = check_table("Testland", &table);
        assert_eq!(report.count(Severity::Critical), 2);
    }

    #[test]
    fn test_letter_only_mode_without_ranges_is_clean() {
        let table = GradingTable::new(vec![
            entry("Letter", "A", f64::NAN, f64::NAN, 4.0),
            entry("Letter", "B", f64::NAN, f64::NAN, 3.0),
            entry("Percent", "A", 90.0, 100.0, 4.0),
        ]);

        let report = check_table("Testland", &table);
        assert!(report.is_clean(), "{}", report.summary());
    }

    #[test]
    fn test_missing_range_in_ranged_mode_is_warning() {
        let table = GradingTable::new(vec![
            entry("Percent", "A", 90.0, 100.0, 4.0),
            entry("Percent", "B", f64::NAN, f64::NAN, 3.0),
        ]);

        let report = check_table("Testland", &table);
        assert_eq!(report.count(Severity::Warning), 1);
        assert_eq!(report.issues[0].row, 1);
    }

    #[test]
    fn test_duplicate_letter_is_info() {
        let table = GradingTable::new(vec![
            entry("Letter", "A", 4.0, 4.0, 4.0),
            entry("Letter", "a", 4.0, 4.0, 3.7),
        ]);

        let report = check_table("Testland", &table);
        assert_eq!(report.count(Severity::Info), 1);
        assert_eq!(report.count(Severity::Warning), 0);
    }

    #[test]
    fn test_catalog_report_merges_countries() {
        let catalog = GradingCatalog::from_rows(vec![
            GradeSystemEntry::new("A-land", "M", "A", 90.0, 100.0, 4.0),
            GradeSystemEntry::new("B-land", "M", "A", 90.0, 80.0, 4.0),
        ]);

        let report = check_catalog(&catalog);
        assert_eq!(report.rows_checked, 2);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].country, "B-land");
    }
}
