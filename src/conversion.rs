// 🔁 Grade Conversion - raw grade string → normalized points
// First match in table order wins

use crate::grading::GradeSystemEntry;

/// Parse the leading number of a user-entered value ("95%" reads as 95).
/// Only finite values count as numeric, so inputs like "inf" or "NaN"
/// fall through to letter matching.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let prefix = &trimmed[..numeric_prefix_len(trimmed)];
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Byte length of the longest `[+-]digits[.digits][e[+-]digits]` prefix,
/// 0 when no digit is present
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_end = digits_from(end);
    let mut seen_digit = int_end > end;
    end = int_end;

    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        seen_digit |= frac_end > end + 1;
        end = frac_end;
    }

    if !seen_digit {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    end
}

/// Uppercased, trimmed form used for letter lookups
pub fn normalize_letter(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Resolve one grade to points against the active table
///
/// Numeric input is matched against the inclusive `[range_min, range_max]`
/// of each entry; anything else is matched case-insensitively against the
/// entry letters. Returns `None` when nothing matches.
pub fn convert_grade_to_points(raw: &str, table: &[GradeSystemEntry]) -> Option<f64> {
    match parse_number(raw) {
        Some(grade) => table.iter().find(|e| e.contains(grade)).map(|e| e.points),
        None => {
            let normalized = normalize_letter(raw);
            table
                .iter()
                .find(|e| e.matches_letter(&normalized))
                .map(|e| e.points)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn us_table() -> Vec<GradeSystemEntry> {
        vec![
            GradeSystemEntry::new("US", "Percent", "A", 90.0, 100.0, 4.0),
            GradeSystemEntry::new("US", "Percent", "B", 80.0, 89.99, 3.0),
            GradeSystemEntry::new("US", "Percent", "C", 70.0, 79.99, 2.0),
        ]
    }

    #[test]
    fn test_numeric_grade_hits_containing_range() {
        let table = us_table();
        assert_eq!(convert_grade_to_points("95", &table), Some(4.0));
        assert_eq!(convert_grade_to_points("80", &table), Some(3.0));
        assert_eq!(convert_grade_to_points(" 79.99 ", &table), Some(2.0));
    }

    #[test]
    fn test_numeric_bounds_are_inclusive() {
        let table = us_table();
        assert_eq!(convert_grade_to_points("90", &table), Some(4.0));
        assert_eq!(convert_grade_to_points("100", &table), Some(4.0));
    }

    #[test]
    fn test_numeric_outside_every_range() {
        let table = us_table();
        assert_eq!(convert_grade_to_points("50", &table), None);
        assert_eq!(convert_grade_to_points("89.995", &table), None);
        assert_eq!(convert_grade_to_points("101", &table), None);
    }

    #[test]
    fn test_letter_grade_case_insensitive_and_trimmed() {
        let table = us_table();
        assert_eq!(convert_grade_to_points("b", &table), Some(3.0));
        assert_eq!(convert_grade_to_points("  a ", &table), Some(4.0));
        assert_eq!(convert_grade_to_points("Z", &table), None);
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let table = vec![
            GradeSystemEntry::new("X", "M", "A", 80.0, 100.0, 4.0),
            GradeSystemEntry::new("X", "M", "B", 70.0, 85.0, 3.0),
        ];
        assert_eq!(convert_grade_to_points("82", &table), Some(4.0));
    }

    #[test]
    fn test_empty_table_yields_none() {
        assert_eq!(convert_grade_to_points("95", &[]), None);
        assert_eq!(convert_grade_to_points("A", &[]), None);
    }

    #[test]
    fn test_non_finite_input_goes_to_letter_path() {
        let table = vec![GradeSystemEntry::new("X", "M", "INF", 0.0, 100.0, 1.0)];
        assert_eq!(parse_number("inf"), None);
        assert_eq!(convert_grade_to_points("inf", &table), Some(1.0));
    }

    #[test]
    fn test_leading_number_with_trailing_text() {
        let table = us_table();
        assert_eq!(parse_number("95%"), Some(95.0));
        assert_eq!(parse_number(" 3 credits"), Some(3.0));
        assert_eq!(parse_number("-1.5e2x"), Some(-150.0));
        assert_eq!(parse_number("2e"), Some(2.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("7."), Some(7.0));
        assert_eq!(convert_grade_to_points("95%", &table), Some(4.0));
        assert_eq!(convert_grade_to_points("82.5 pts", &table), Some(3.0));
    }

    #[test]
    fn test_no_leading_digit_is_not_numeric() {
        assert_eq!(parse_number("A+"), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("e5"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("1e999"), None);
    }

    #[test]
    fn test_malformed_entry_never_matches() {
        let table = vec![
            GradeSystemEntry::new("X", "M", "", f64::NAN, f64::NAN, 9.0),
            GradeSystemEntry::new("X", "M", "A", 0.0, 10.0, 4.0),
        ];
        assert_eq!(convert_grade_to_points("5", &table), Some(4.0));
        assert_eq!(convert_grade_to_points("", &table), None);
    }
}
