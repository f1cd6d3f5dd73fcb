// 📚 Course Collection - ordered rows of a calculator session
// Each row keeps a stable UUID; order only matters for display

use serde::{Deserialize, Serialize};

// ============================================================================
// COURSE ENTRY
// ============================================================================

/// One course row as typed by the user. Credits and grade stay raw
/// strings and are parsed lazily by validation and aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEntry {
    #[serde(default = "new_id")]
    pub id: String,

    #[serde(default)]
    pub course: String,

    #[serde(default)]
    pub credits: String,

    #[serde(default)]
    pub grade: String,
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl CourseEntry {
    /// Blank row with a fresh identity
    pub fn blank() -> Self {
        CourseEntry {
            id: new_id(),
            course: String::new(),
            credits: String::new(),
            grade: String::new(),
        }
    }

    /// Row with values filled in (fresh identity)
    pub fn with_values(course: &str, credits: &str, grade: &str) -> Self {
        CourseEntry {
            id: new_id(),
            course: course.to_string(),
            credits: credits.to_string(),
            grade: grade.to_string(),
        }
    }

    pub fn field(&self, field: CourseField) -> &str {
        match field {
            CourseField::Course => &self.course,
            CourseField::Credits => &self.credits,
            CourseField::Grade => &self.grade,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseField {
    Course,
    Credits,
    Grade,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error("no course at index {index} (collection has {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

// ============================================================================
// COURSE COLLECTION
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseCollection {
    courses: Vec<CourseEntry>,
}

impl CourseCollection {
    /// Empty collection
    pub fn new() -> Self {
        CourseCollection { courses: Vec::new() }
    }

    /// Collection holding a single blank row (calculator start state)
    pub fn with_blank_row() -> Self {
        CourseCollection {
            courses: vec![CourseEntry::blank()],
        }
    }

    pub fn from_entries(courses: Vec<CourseEntry>) -> Self {
        CourseCollection { courses }
    }

    /// Append a blank row, returning its index
    pub fn add(&mut self) -> usize {
        self.courses.push(CourseEntry::blank());
        self.courses.len() - 1
    }

    /// Replace one field of one row. The row keeps its id.
    pub fn update(
        &mut self,
        index: usize,
        field: CourseField,
        value: &str,
    ) -> Result<(), CollectionError> {
        let len = self.courses.len();
        let current = self
            .courses
            .get(index)
            .ok_or(CollectionError::IndexOutOfRange { index, len })?;

        let mut next = current.clone();
        match field {
            CourseField::Course => next.course = value.to_string(),
            CourseField::Credits => next.credits = value.to_string(),
            CourseField::Grade => next.grade = value.to_string(),
        }
        self.courses[index] = next;

        Ok(())
    }

    /// Delete one row; later rows shift down by one
    pub fn remove(&mut self, index: usize) -> Result<CourseEntry, CollectionError> {
        if index >= self.courses.len() {
            return Err(CollectionError::IndexOutOfRange {
                index,
                len: self.courses.len(),
            });
        }
        Ok(self.courses.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&CourseEntry> {
        self.courses.get(index)
    }

    pub fn as_slice(&self) -> &[CourseEntry] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_appends_blank_rows_with_unique_ids() {
        let mut courses = CourseCollection::new();
        assert_eq!(courses.add(), 0);
        assert_eq!(courses.add(), 1);

        let first = courses.get(0).unwrap();
        let second = courses.get(1).unwrap();
        assert_ne!(first.id, second.id);
        assert!(first.course.is_empty());
        assert!(first.credits.is_empty());
        assert!(first.grade.is_empty());
    }

    #[test]
    fn test_update_touches_one_field_and_keeps_id() {
        let mut courses = CourseCollection::new();
        courses.add();
        courses.add();
        let id_before = courses.get(1).unwrap().id.clone();
        let other_before = courses.get(0).unwrap().clone();

        courses.update(1, CourseField::Grade, "A").unwrap();
        courses.update(1, CourseField::Credits, "3").unwrap();

        let row = courses.get(1).unwrap();
        assert_eq!(row.id, id_before);
        assert_eq!(row.grade, "A");
        assert_eq!(row.credits, "3");
        assert_eq!(row.field(CourseField::Course), "");
        assert_eq!(courses.get(0).unwrap(), &other_before);
    }

    #[test]
    fn test_remove_shifts_indices() {
        let mut courses = CourseCollection::from_entries(vec![
            CourseEntry::with_values("Math", "3", "A"),
            CourseEntry::with_values("Art", "2", "B"),
            CourseEntry::with_values("Bio", "4", "C"),
        ]);

        let removed = courses.remove(0).unwrap();
        assert_eq!(removed.course, "Math");
        assert_eq!(courses.len(), 2);
        assert_eq!(courses.get(0).unwrap().course, "Art");
        assert_eq!(courses.get(1).unwrap().course, "Bio");
    }

    #[test]
    fn test_invalid_index_is_rejected_without_change() {
        let mut courses = CourseCollection::with_blank_row();
        let before = courses.clone();

        assert_eq!(
            courses.update(3, CourseField::Grade, "A"),
            Err(CollectionError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert!(courses.remove(1).is_err());
        assert_eq!(courses, before);
    }

    #[test]
    fn test_course_entry_deserializes_without_id() {
        let entry: CourseEntry =
            serde_json::from_str(r#"{"credits": "3", "grade": "A"}"#).unwrap();
        assert!(!entry.id.is_empty());
        assert_eq!(entry.course, "");
    }
}
