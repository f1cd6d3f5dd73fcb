// 📤 Export Payload - input contract of the document and email collaborators
// Rendering and delivery live elsewhere; this only shapes the data

use crate::courses::CourseEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who asked for the export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub full_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub student_name: String,
    pub school_name: String,
    pub courses: Vec<CourseEntry>,
    pub gpa: Option<f64>,
    pub country: String,
    pub user: UserInfo,
    pub generated_at: DateTime<Utc>,
}

/// Variables handed to the transactional email template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailTemplateParams {
    pub to_email: String,
    pub user_name: String,
    pub student_name: String,
    pub school_name: String,
    pub country: String,
    pub gpa: String,
    pub courses: String,
}

impl ExportPayload {
    /// GPA as shown in exports: two decimals, or N/A
    pub fn gpa_text(&self) -> String {
        match self.gpa {
            Some(gpa) => format!("{:.2}", gpa),
            None => "N/A".to_string(),
        }
    }

    /// Lines of the results document, top to bottom
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            "GPA Calculation Results".to_string(),
            format!("Generated for: {}", self.user.full_name),
            format!("Email: {}", self.user.email),
            format!("Student Name: {}", self.student_name),
            format!("School: {}", self.school_name),
            format!("Country System: {}", self.country),
            format!("Cumulative GPA: {}", self.gpa_text()),
            "Courses:".to_string(),
        ];

        for (index, course) in self.courses.iter().enumerate() {
            lines.push(format!(
                "{}. {} - Credits: {}, Grade: {}",
                index + 1,
                course.course,
                course.credits,
                course.grade
            ));
        }

        lines.push(format!(
            "Generated on: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        lines
    }

    /// `GPA_Results_<name with whitespace runs as _>.pdf`
    pub fn file_name(&self) -> String {
        let mut name = String::with_capacity(self.user.full_name.len());
        let mut in_space = false;
        for ch in self.user.full_name.chars() {
            if ch.is_whitespace() {
                if !in_space {
                    name.push('_');
                }
                in_space = true;
            } else {
                name.push(ch);
                in_space = false;
            }
        }
        format!("GPA_Results_{}.pdf", name)
    }

    pub fn template_params(&self) -> EmailTemplateParams {
        let courses = self
            .courses
            .iter()
            .map(|c| format!("{} (Credits: {}, Grade: {})", c.course, c.credits, c.grade))
            .collect::<Vec<_>>()
            .join("\n");

        EmailTemplateParams {
            to_email: self.user.email.clone(),
            user_name: self.user.full_name.clone(),
            student_name: self.student_name.clone(),
            school_name: self.school_name.clone(),
            country: self.country.clone(),
            gpa: self.gpa_text(),
            courses,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn payload(gpa: Option<f64>) -> ExportPayload {
        ExportPayload {
            student_name: "Ana Souza".to_string(),
            school_name: "Colégio Central".to_string(),
            courses: vec![
                CourseEntry::with_values("Math", "3", "95"),
                CourseEntry::with_values("History", "4", "B"),
            ],
            gpa,
            country: "Brazil".to_string(),
            user: UserInfo {
                full_name: "Maria  da Silva".to_string(),
                email: "maria@example.com".to_string(),
            },
            generated_at: Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_summary_lines() {
        let lines = payload(Some(24.0 / 7.0)).summary_lines();
        assert_eq!(lines[0], "GPA Calculation Results");
        assert_eq!(lines[6], "Cumulative GPA: 3.43");
        assert_eq!(lines[8], "1. Math - Credits: 3, Grade: 95");
        assert_eq!(lines[9], "2. History - Credits: 4, Grade: B");
        assert_eq!(lines[10], "Generated on: 2026-01-15 09:30:00 UTC");
    }

    #[test]
    fn test_missing_gpa_is_na() {
        let p = payload(None);
        assert_eq!(p.gpa_text(), "N/A");
        assert_eq!(p.template_params().gpa, "N/A");
    }

    #[test]
    fn test_file_name_collapses_whitespace() {
        assert_eq!(payload(None).file_name(), "GPA_Results_Maria_da_Silva.pdf");
    }

    #[test]
    fn test_template_params() {
        let params = payload(Some(3.0)).template_params();
        assert_eq!(params.to_email, "maria@example.com");
        assert_eq!(params.user_name, "Maria  da Silva");
        assert_eq!(params.gpa, "3.00");
        assert_eq!(
            params.courses,
            "Math (Credits: 3, Grade: 95)\nHistory (Credits: 4, Grade: B)"
        );
    }
}
