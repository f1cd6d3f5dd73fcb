// 🌍 Grade Table Model - Country grading scales
// Rows come straight from the table source; order is significant (first match wins)

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// GRADE SYSTEM ENTRY
// ============================================================================

/// One row of a country's grading scale
///
/// Either a numeric range mapped to points, or a letter mapped to points.
/// Field names follow the source columns so CSV and Airtable rows
/// deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeSystemEntry {
    #[serde(rename = "country_name", default)]
    pub country: String,

    #[serde(rename = "grading_mode", default)]
    pub mode: String,

    #[serde(rename = "us_grade_letter", default)]
    pub letter: String,

    /// Missing or blank bounds load as NaN and never match a numeric grade
    #[serde(rename = "grade_range_min", default = "nan", deserialize_with = "number_or_nan")]
    pub range_min: f64,

    #[serde(rename = "grade_range_max", default = "nan", deserialize_with = "number_or_nan")]
    pub range_max: f64,

    #[serde(rename = "grade_points", default = "nan", deserialize_with = "number_or_nan")]
    pub points: f64,
}

impl GradeSystemEntry {
    pub fn new(
        country: &str,
        mode: &str,
        letter: &str,
        range_min: f64,
        range_max: f64,
        points: f64,
    ) -> Self {
        GradeSystemEntry {
            country: country.to_string(),
            mode: mode.to_string(),
            letter: letter.to_string(),
            range_min,
            range_max,
            points,
        }
    }

    /// Inclusive range check; NaN bounds never contain anything
    pub fn contains(&self, grade: f64) -> bool {
        grade >= self.range_min && grade <= self.range_max
    }

    /// Case-insensitive letter match against an already normalized input
    pub fn matches_letter(&self, normalized: &str) -> bool {
        !self.letter.is_empty() && self.letter.to_uppercase() == normalized
    }

    /// Single-point scales are shown as letter grades
    pub fn is_single_point(&self) -> bool {
        self.range_min == self.range_max
    }
}

fn nan() -> f64 {
    f64::NAN
}

/// Accepts JSON numbers, numeric strings (CSV cells), blanks and nulls
fn number_or_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumberVisitor;

    impl<'de> Visitor<'de> for NumberVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number, a numeric string or nothing")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                return Ok(f64::NAN);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| E::custom(format!("not a number: {:?}", v)))
        }

        fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
            Ok(f64::NAN)
        }

        fn visit_none<E: de::Error>(self) -> Result<f64, E> {
            Ok(f64::NAN)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<f64, D2::Error> {
            d.deserialize_any(NumberVisitor)
        }
    }

    deserializer.deserialize_any(NumberVisitor)
}

// ============================================================================
// SCALE ROW (display)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleRow {
    pub letter: String,
    pub range_min: f64,
    pub range_max: f64,
    pub points: f64,
    pub label: String,
}

impl ScaleRow {
    fn from_entry(entry: &GradeSystemEntry) -> Self {
        let has_range = entry.range_min.is_finite() && entry.range_max.is_finite();
        let label = if entry.is_single_point() || !has_range {
            format!("{} = {:.1}", entry.letter, entry.points)
        } else {
            format!(
                "{}-{} = {} ({:.1})",
                entry.range_min, entry.range_max, entry.letter, entry.points
            )
        };

        ScaleRow {
            letter: entry.letter.clone(),
            range_min: entry.range_min,
            range_max: entry.range_max,
            points: entry.points,
            label,
        }
    }
}

// ============================================================================
// GRADING TABLE
// ============================================================================

/// Ordered grade entries of one country (possibly several modes)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradingTable {
    entries: Vec<GradeSystemEntry>,
}

impl GradingTable {
    pub fn new(entries: Vec<GradeSystemEntry>) -> Self {
        GradingTable { entries }
    }

    pub fn entries(&self) -> &[GradeSystemEntry] {
        &self.entries
    }

    pub fn push(&mut self, entry: GradeSystemEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct grading modes in first-seen order
    pub fn modes(&self) -> Vec<String> {
        let mut modes: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !modes.contains(&entry.mode) {
                modes.push(entry.mode.clone());
            }
        }
        modes
    }

    /// Entries of one mode, table order kept. Empty selector = whole table.
    pub fn for_mode(&self, mode: &str) -> GradingTable {
        if mode.is_empty() {
            return self.clone();
        }

        GradingTable {
            entries: self
                .entries
                .iter()
                .filter(|e| e.mode == mode)
                .cloned()
                .collect(),
        }
    }

    /// Display rows, highest points first
    pub fn scale(&self) -> Vec<ScaleRow> {
        let mut rows: Vec<ScaleRow> = self.entries.iter().map(ScaleRow::from_entry).collect();
        rows.sort_by(|a, b| b.points.total_cmp(&a.points));
        rows
    }

    /// Lowest range_min and highest range_max (ignoring NaN bounds)
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let mins = self.entries.iter().map(|e| e.range_min).filter(|v| !v.is_nan());
        let maxs = self.entries.iter().map(|e| e.range_max).filter(|v| !v.is_nan());

        let min = mins.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))?;
        let max = maxs.fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))?;
        Some((min, max))
    }

    /// Hint shown in an empty grade field
    pub fn grade_hint(&self) -> String {
        if self.entries.is_empty() {
            return "Select grading mode".to_string();
        }
        match self.bounds() {
            Some((min, max)) => format!("Enter grade ({:.2}-{:.2})", min, max),
            None => "Enter grade".to_string(),
        }
    }
}

impl AsRef<[GradeSystemEntry]> for GradingTable {
    fn as_ref(&self) -> &[GradeSystemEntry] {
        &self.entries
    }
}

impl From<Vec<GradeSystemEntry>> for GradingTable {
    fn from(entries: Vec<GradeSystemEntry>) -> Self {
        GradingTable::new(entries)
    }
}

// ============================================================================
// GRADING CATALOG
// ============================================================================

/// All loaded tables, keyed by country name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradingCatalog {
    tables: BTreeMap<String, GradingTable>,
}

impl GradingCatalog {
    /// Group source rows by country, keeping row order inside each group
    pub fn from_rows(rows: Vec<GradeSystemEntry>) -> Self {
        let mut tables: BTreeMap<String, GradingTable> = BTreeMap::new();

        for row in rows {
            if row.country.trim().is_empty() {
                continue;
            }
            tables.entry(row.country.clone()).or_default().push(row);
        }

        GradingCatalog { tables }
    }

    pub fn table(&self, country: &str) -> Option<&GradingTable> {
        self.tables.get(country)
    }

    /// Distinct country names, sorted
    pub fn countries(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn tables(&self) -> impl Iterator<Item = (&String, &GradingTable)> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rows() -> Vec<GradeSystemEntry> {
        vec![
            GradeSystemEntry::new("Germany", "Numeric", "A", 1.0, 1.5, 4.0),
            GradeSystemEntry::new("France", "Percentage", "A", 16.0, 20.0, 4.0),
            GradeSystemEntry::new("Germany", "Numeric", "B", 1.6, 2.5, 3.0),
            GradeSystemEntry::new("France", "Letter", "TB", 0.0, 0.0, 4.0),
            GradeSystemEntry::new("", "Numeric", "X", 0.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn test_catalog_groups_by_country_preserving_order() {
        let catalog = GradingCatalog::from_rows(sample_rows());

        assert_eq!(catalog.len(), 2);
        let germany = catalog.table("Germany").unwrap();
        assert_eq!(germany.len(), 2);
        assert_eq!(germany.entries()[0].letter, "A");
        assert_eq!(germany.entries()[1].letter, "B");
    }

    #[test]
    fn test_catalog_countries_sorted_and_blank_dropped() {
        let catalog = GradingCatalog::from_rows(sample_rows());
        assert_eq!(catalog.countries(), vec!["France", "Germany"]);
    }

    #[test]
    fn test_modes_first_seen_order() {
        let catalog = GradingCatalog::from_rows(sample_rows());
        let france = catalog.table("France").unwrap();
        assert_eq!(france.modes(), vec!["Percentage", "Letter"]);
    }

    #[test]
    fn test_for_mode_filters_and_empty_mode_keeps_all() {
        let catalog = GradingCatalog::from_rows(sample_rows());
        let france = catalog.table("France").unwrap();

        let letter = france.for_mode("Letter");
        assert_eq!(letter.len(), 1);
        assert_eq!(letter.entries()[0].letter, "TB");

        assert_eq!(france.for_mode("").len(), 2);
        assert!(france.for_mode("Unknown").is_empty());
    }

    #[test]
    fn test_scale_sorted_by_points_with_labels() {
        let table = GradingTable::new(vec![
            GradeSystemEntry::new("US", "Percent", "B", 80.0, 89.99, 3.0),
            GradeSystemEntry::new("US", "Percent", "A", 90.0, 100.0, 4.0),
            GradeSystemEntry::new("US", "Letter", "P", 1.0, 1.0, 2.0),
        ]);

        let scale = table.scale();
        assert_eq!(scale[0].label, "90-100 = A (4.0)");
        assert_eq!(scale[1].label, "80-89.99 = B (3.0)");
        assert_eq!(scale[2].label, "P = 2.0");
    }

    #[test]
    fn test_grade_hint() {
        let table = GradingTable::new(vec![
            GradeSystemEntry::new("US", "Percent", "A", 90.0, 100.0, 4.0),
            GradeSystemEntry::new("US", "Percent", "F", 0.0, 59.99, 0.0),
        ]);
        assert_eq!(table.grade_hint(), "Enter grade (0.00-100.00)");
        assert_eq!(GradingTable::default().grade_hint(), "Select grading mode");
    }

    #[test]
    fn test_entry_deserializes_from_json_with_missing_fields() {
        let json = serde_json::json!({
            "country_name": "Italy",
            "grading_mode": "30-point",
            "grade_range_min": 28,
            "grade_range_max": "30",
            "grade_points": 4.0
        });

        let entry: GradeSystemEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.country, "Italy");
        assert_eq!(entry.letter, "");
        assert_eq!(entry.range_min, 28.0);
        assert_eq!(entry.range_max, 30.0);
        assert!(entry.contains(29.0));
        assert!(!entry.matches_letter(""));
    }

    #[test]
    fn test_missing_bounds_never_contain() {
        let json = serde_json::json!({
            "country_name": "Italy",
            "us_grade_letter": "A",
            "grade_range_min": null,
            "grade_points": 4.0
        });

        let entry: GradeSystemEntry = serde_json::from_value(json).unwrap();
        assert!(entry.range_min.is_nan());
        assert!(entry.range_max.is_nan());
        assert!(!entry.contains(0.0));
        assert!(entry.matches_letter("A"));
    }
}
