// 🧮 Calculator Session - one user's calculator state
// Owns the course rows and the country/mode selection; discarded on reset

use crate::courses::{CollectionError, CourseCollection, CourseField};
use crate::export::{ExportPayload, UserInfo};
use crate::gpa::compute_gpa;
use crate::grading::{GradingCatalog, GradingTable};
use crate::validation::{validate_course, CourseErrors};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorSession {
    pub student_name: String,
    pub school_name: String,
    country: String,
    mode: String,
    courses: CourseCollection,
}

impl CalculatorSession {
    /// Empty selection and one blank course row
    pub fn new() -> Self {
        CalculatorSession {
            student_name: String::new(),
            school_name: String::new(),
            country: String::new(),
            mode: String::new(),
            courses: CourseCollection::with_blank_row(),
        }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn mode(&self) -> &str {
        &self.mode
    }

    pub fn courses(&self) -> &CourseCollection {
        &self.courses
    }

    /// Switching country always clears the grading mode
    pub fn select_country(&mut self, country: &str) {
        self.country = country.to_string();
        self.mode.clear();
    }

    pub fn select_mode(&mut self, mode: &str) {
        self.mode = mode.to_string();
    }

    pub fn add_course(&mut self) -> usize {
        self.courses.add()
    }

    pub fn update_course(&mut self, index: usize, field: CourseField, value: &str) -> Result<(), CollectionError> {
        self.courses.update(index, field, value)
    }

    pub fn remove_course(&mut self, index: usize) -> Result<(), CollectionError> {
        self.courses.remove(index).map(|_| ())
    }

    /// Back to the start state; the new blank row gets a fresh id
    pub fn clear_all(&mut self) {
        *self = CalculatorSession::new();
    }

    /// Whole table of the selected country, all modes
    pub fn country_table<'a>(&self, catalog: &'a GradingCatalog) -> Option<&'a GradingTable> {
        if self.country.is_empty() {
            return None;
        }
        catalog.table(&self.country)
    }

    pub fn grading_modes(&self, catalog: &GradingCatalog) -> Vec<String> {
        self.country_table(catalog).map(|t| t.modes()).unwrap_or_default()
    }

    /// Selected country's table narrowed to the selected mode
    pub fn active_table(&self, catalog: &GradingCatalog) -> GradingTable {
        self.country_table(catalog)
            .map(|t| t.for_mode(&self.mode))
            .unwrap_or_default()
    }

    /// Hint for the grade input of each row
    pub fn grade_hint(&self, catalog: &GradingCatalog) -> String {
        match self.country_table(catalog) {
            Some(table) if !table.is_empty() => table.for_mode(&self.mode).grade_hint(),
            _ => "Select country first".to_string(),
        }
    }

    pub fn course_errors(&self, catalog: &GradingCatalog) -> Vec<CourseErrors> {
        let table = self.active_table(catalog);
        self.courses
            .as_slice()
            .iter()
            .map(|c| validate_course(c, table.entries()))
            .collect()
    }

    pub fn has_validation_errors(&self, catalog: &GradingCatalog) -> bool {
        self.course_errors(catalog).iter().any(|e| !e.is_ok())
    }

    pub fn gpa(&self, catalog: &GradingCatalog) -> Option<f64> {
        let table = self.active_table(catalog);
        compute_gpa(self.courses.as_slice(), table.entries())
    }

    pub fn export_payload(&self, catalog: &GradingCatalog, user: UserInfo) -> ExportPayload {
        ExportPayload {
            student_name: self.student_name.clone(),
            school_name: self.school_name.clone(),
            courses: self.courses.as_slice().to_vec(),
            gpa: self.gpa(catalog),
            country: self.country.clone(),
            user,
            generated_at: Utc::now(),
        }
    }
}

impl Default for CalculatorSession {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
