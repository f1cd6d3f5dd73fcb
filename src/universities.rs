// 🏛️ University Finder - static listing with search and filters

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UniversityKind {
    Private,
    Public,
}

impl UniversityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UniversityKind::Private => "Private",
            UniversityKind::Public => "Public",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct University {
    pub name: String,
    pub location: String,
    pub kind: UniversityKind,
    pub ranking: u32,
    pub acceptance: String,
    /// Display string, e.g. "$54,768"
    pub tuition: String,
    pub image: String,
}

impl University {
    fn new(
        name: &str,
        location: &str,
        kind: UniversityKind,
        ranking: u32,
        acceptance: &str,
        tuition: &str,
        image: &str,
    ) -> Self {
        University {
            name: name.to_string(),
            location: location.to_string(),
            kind,
            ranking,
            acceptance: acceptance.to_string(),
            tuition: tuition.to_string(),
            image: image.to_string(),
        }
    }

    /// Tuition with every non-digit stripped
    pub fn tuition_amount(&self) -> Option<u64> {
        let digits: String = self.tuition.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    }
}

/// The built-in listing
pub fn universities() -> Vec<University> {
    vec![
        University::new(
            "Harvard University",
            "Cambridge, MA",
            UniversityKind::Private,
            1,
            "5%",
            "$54,768",
            "https://images.unsplash.com/photo-1583657763691-3f4a917cc9f0?auto=format&fit=crop&q=80&w=800",
        ),
        University::new(
            "Stanford University",
            "Stanford, CA",
            UniversityKind::Private,
            2,
            "4%",
            "$56,169",
            "https://images.unsplash.com/photo-1584721478725-982f8a7aff1c?auto=format&fit=crop&q=80&w=800",
        ),
        University::new(
            "MIT",
            "Cambridge, MA",
            UniversityKind::Private,
            3,
            "7%",
            "$55,878",
            "https://images.unsplash.com/photo-1564981797816-1043664bf78d?auto=format&fit=crop&q=80&w=800",
        ),
    ]
}

// ============================================================================
// FILTER
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Private,
    Public,
}

impl KindFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "" | "all" => Some(KindFilter::All),
            "private" => Some(KindFilter::Private),
            "public" => Some(KindFilter::Public),
            _ => None,
        }
    }

    fn matches(&self, kind: UniversityKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Private => kind == UniversityKind::Private,
            KindFilter::Public => kind == UniversityKind::Public,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityFilter {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub kind: KindFilter,
    #[serde(default)]
    pub max_tuition: Option<u64>,
}

impl UniversityFilter {
    pub fn matches(&self, university: &University) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = university.name.to_lowercase().contains(&needle)
            || university.location.to_lowercase().contains(&needle);

        let matches_tuition = match self.max_tuition {
            None => true,
            Some(max) => university.tuition_amount().is_some_and(|t| t <= max),
        };

        matches_search && self.kind.matches(university.kind) && matches_tuition
    }

    pub fn apply<'a>(&self, list: &'a [University]) -> Vec<&'a University> {
        list.iter().filter(|u| self.matches(u)).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
