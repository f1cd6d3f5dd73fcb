// World GPA - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod grading;        // Grade tables grouped by country
pub mod conversion;     // Raw grade → points
pub mod validation;     // Credit / grade field checks
pub mod courses;        // Course rows of a session
pub mod gpa;            // Credit-weighted aggregation
pub mod cache;          // Time-expiring table cache
pub mod rate_limit;     // Fixed-interval gate for the table source
pub mod quality;        // Data quality warnings for loaded tables
pub mod source;         // CSV / Airtable / static table sources
pub mod service;        // Cached + rate-limited table access
pub mod session;        // Calculator session state
pub mod export;         // Export / email payloads
pub mod universities;   // University finder
pub mod config;         // Environment configuration

#[cfg(feature = "server")]
pub mod api;            // REST API (axum)

// Re-export commonly used types
pub use grading::{GradeSystemEntry, GradingCatalog, GradingTable, ScaleRow};
pub use conversion::{convert_grade_to_points, normalize_letter, parse_number};
pub use validation::{validate_course, validate_credits, validate_grade, CourseErrors, ErrorKind};
pub use courses::{CollectionError, CourseCollection, CourseEntry, CourseField};
pub use gpa::{compute_gpa, format_gpa, gpa_breakdown, is_countable, CourseContribution, GpaBreakdown};
pub use cache::{CachedTable, Clock, ManualClock, SystemClock, TableCache, CACHE_DURATION_SECS};
pub use rate_limit::{delay_for, RateGate, DEFAULT_RATE_PER_SEC};
pub use quality::{check_catalog, check_table, QualityIssue, QualityReport, Severity};
pub use source::{
    parse_csv, AirtableSource, ConfiguredSource, CsvSource, GradeTableSource, StaticSource,
    MAX_RECORDS,
};
pub use service::{FetchError, GradingService};
pub use session::CalculatorSession;
pub use export::{EmailTemplateParams, ExportPayload, UserInfo};
pub use universities::{universities, KindFilter, University, UniversityFilter, UniversityKind};
pub use config::{Config, ConfigError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the fmt subscriber used by both binaries (RUST_LOG, default info)
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
        .ok();
}
