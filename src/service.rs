// 🛰️ Grading Service - cached, rate-limited access to grading tables
// Cache keys: "gradingSystems" (whole catalog) and "countries" (sorted names)

use crate::cache::{Clock, SystemClock, TableCache, CACHE_DURATION_SECS};
use crate::grading::{GradingCatalog, GradingTable};
use crate::quality::{check_catalog, Severity};
use crate::rate_limit::RateGate;
use crate::source::{GradeTableSource, MAX_RECORDS};
use chrono::Duration;
use std::collections::BTreeSet;
use std::sync::Arc;

pub const GRADING_SYSTEMS_KEY: &str = "gradingSystems";
pub const COUNTRIES_KEY: &str = "countries";

// ============================================================================
// ERRORS
// ============================================================================

/// A table fetch failed; reported once per attempt, never retried here
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("failed to load {what}")]
    FetchFailure { what: &'static str, detail: String },
}

impl FetchError {
    fn failure(what: &'static str, err: anyhow::Error) -> Self {
        FetchError::FetchFailure {
            what,
            detail: format!("{:#}", err),
        }
    }

    /// Underlying cause, for logs
    pub fn detail(&self) -> &str {
        match self {
            FetchError::FetchFailure { detail, .. } => detail,
        }
    }
}

// ============================================================================
// SERVICE
// ============================================================================

#[derive(Debug, Clone)]
enum Cached {
    Catalog(Arc<GradingCatalog>),
    Countries(Arc<Vec<String>>),
}

pub struct GradingService<S, C = SystemClock> {
    source: S,
    cache: TableCache<Cached, C>,
    gate: RateGate,
    max_records: usize,
}

impl<S: GradeTableSource> GradingService<S, SystemClock> {
    pub fn new(source: S) -> Self {
        GradingService::with_parts(
            source,
            SystemClock,
            Duration::seconds(CACHE_DURATION_SECS),
            RateGate::default(),
        )
    }
}

impl<S: GradeTableSource, C: Clock> GradingService<S, C> {
    pub fn with_parts(source: S, clock: C, ttl: Duration, gate: RateGate) -> Self {
        GradingService {
            source,
            cache: TableCache::with_clock(clock, ttl),
            gate,
            max_records: MAX_RECORDS,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// All grading tables grouped by country
    pub async fn grading_systems(&self) -> Result<Arc<GradingCatalog>, FetchError> {
        if let Some(Cached::Catalog(catalog)) = self.cache.get(GRADING_SYSTEMS_KEY) {
            return Ok(catalog);
        }

        tracing::info!(source = self.source.name(), "loading grading systems");
        let rows = self
            .gate
            .run(self.source.fetch_rows(self.max_records))
            .await
            .map_err(|e| {
                let err = FetchError::failure("grading systems", e);
                tracing::error!(detail = err.detail(), "{}", err);
                err
            })?;

        let row_count = rows.len();
        let catalog = GradingCatalog::from_rows(rows);
        log_quality(&catalog);

        tracing::info!(rows = row_count, countries = catalog.len(), "grading systems loaded");
        let catalog = Arc::new(catalog);
        self.cache.set(GRADING_SYSTEMS_KEY, Cached::Catalog(catalog.clone()));
        Ok(catalog)
    }

    /// Distinct country names, sorted
    pub async fn countries(&self) -> Result<Arc<Vec<String>>, FetchError> {
        if let Some(Cached::Countries(countries)) = self.cache.get(COUNTRIES_KEY) {
            return Ok(countries);
        }

        tracing::info!(source = self.source.name(), "loading countries");
        let names = self
            .gate
            .run(self.source.fetch_countries(self.max_records))
            .await
            .map_err(|e| {
                let err = FetchError::failure("countries", e);
                tracing::error!(detail = err.detail(), "{}", err);
                err
            })?;

        let distinct: BTreeSet<String> = names.into_iter().filter(|c| !c.trim().is_empty()).collect();
        let countries = Arc::new(distinct.into_iter().collect::<Vec<_>>());
        self.cache.set(COUNTRIES_KEY, Cached::Countries(countries.clone()));
        Ok(countries)
    }

    /// One country's table, `None` when the country is unknown
    pub async fn table(&self, country: &str) -> Result<Option<GradingTable>, FetchError> {
        Ok(self.grading_systems().await?.table(country).cloned())
    }

    /// Drop cached data so the next read refetches
    pub fn invalidate(&self) {
        self.cache.invalidate(GRADING_SYSTEMS_KEY);
        self.cache.invalidate(COUNTRIES_KEY);
    }
}

fn log_quality(catalog: &GradingCatalog) {
    let report = check_catalog(catalog);
    if report.is_clean() {
        return;
    }

    for issue in &report.issues {
        match issue.severity {
            Severity::Critical | Severity::Warning => tracing::warn!(
                country = %issue.country,
                mode = %issue.mode,
                row = issue.row,
                "{}",
                issue.issue
            ),
            Severity::Info => tracing::debug!(
                country = %issue.country,
                mode = %issue.mode,
                row = issue.row,
                "{}",
                issue.issue
            ),
        }
    }
    tracing::warn!("grading table quality: {}", report.summary());
}

// ============================================================================
// TESTS
// ============================================================================
