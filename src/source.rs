// 📥 Table Sources - where grading rows come from
// Every source returns rows in source order; grouping happens later

use crate::grading::GradeSystemEntry;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound on rows requested from a source
pub const MAX_RECORDS: usize = 1000;

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// GradeTableSource - the one thing the grading service needs from storage
///
/// Implementations must keep source row order; the first matching row wins
/// during grade conversion.
pub trait GradeTableSource: Send + Sync {
    /// Fetch up to `max_records` rows
    fn fetch_rows(&self, max_records: usize) -> impl Future<Output = Result<Vec<GradeSystemEntry>>> + Send;

    /// Country column only, in source order (blanks and repeats included)
    fn fetch_countries(&self, max_records: usize) -> impl Future<Output = Result<Vec<String>>> + Send {
        async move {
            let rows = self.fetch_rows(max_records).await?;
            Ok(rows.into_iter().map(|r| r.country).collect())
        }
    }

    /// Short label for logs
    fn name(&self) -> &str;
}

// ============================================================================
// STATIC SOURCE
// ============================================================================

/// In-memory rows (tests, demos)
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    rows: Vec<GradeSystemEntry>,
}

impl StaticSource {
    pub fn new(rows: Vec<GradeSystemEntry>) -> Self {
        StaticSource { rows }
    }
}

impl GradeTableSource for StaticSource {
    async fn fetch_rows(&self, max_records: usize) -> Result<Vec<GradeSystemEntry>> {
        Ok(self.rows.iter().take(max_records).cloned().collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}

// ============================================================================
// CSV SOURCE
// ============================================================================

/// CSV export of the grading table, same column names as the remote store
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        CsvSource {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse CSV text into rows, stopping after `max_records`
pub fn parse_csv(data: &[u8], max_records: usize) -> Result<Vec<GradeSystemEntry>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(data);

    let mut rows = Vec::new();
    for (line, result) in rdr.deserialize().take(max_records).enumerate() {
        let row: GradeSystemEntry =
            result.with_context(|| format!("Failed to deserialize grade row {}", line + 1))?;
        rows.push(row);
    }

    Ok(rows)
}

impl GradeTableSource for CsvSource {
    async fn fetch_rows(&self, max_records: usize) -> Result<Vec<GradeSystemEntry>> {
        let data = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read grade table CSV: {:?}", self.path))?;
        parse_csv(&data, max_records)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

// ============================================================================
// AIRTABLE SOURCE
// ============================================================================

#[derive(Debug, Clone)]
pub struct AirtableSource {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    base_id: String,
    table: String,
    view: String,
}

#[derive(Debug, Deserialize)]
struct AirtablePage {
    #[serde(default)]
    records: Vec<AirtableRecord>,
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirtableRecord {
    fields: GradeSystemEntry,
}

impl AirtableSource {
    pub fn new(api_base: &str, api_key: &str, base_id: &str, table: &str, view: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(AirtableSource {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            base_id: base_id.to_string(),
            table: table.to_string(),
            view: view.to_string(),
        })
    }

    fn table_url(&self) -> String {
        format!(
            "{}/v0/{}/{}",
            self.api_base,
            urlencoding::encode(&self.base_id),
            urlencoding::encode(&self.table)
        )
    }

    async fn fetch_page(&self, max_records: usize, fields: &[&str], offset: Option<&str>) -> Result<AirtablePage> {
        let mut query = vec![
            ("maxRecords", max_records.to_string()),
            ("view", self.view.clone()),
        ];
        for field in fields {
            query.push(("fields[]", field.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let page = self
            .client
            .get(self.table_url())
            .bearer_auth(&self.api_key)
            .query(&query)
            .send()
            .await
            .context("Failed to call Airtable")?
            .error_for_status()
            .context("Airtable returned error status")?
            .json::<AirtablePage>()
            .await
            .context("Failed to deserialize Airtable page")?;

        Ok(page)
    }

    /// Follow `offset` pagination; an empty `fields` list means all columns
    async fn fetch_all(&self, max_records: usize, fields: &[&str]) -> Result<Vec<GradeSystemEntry>> {
        let mut rows = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page = self.fetch_page(max_records, fields, offset.as_deref()).await?;
            tracing::debug!(records = page.records.len(), "airtable page received");
            rows.extend(page.records.into_iter().map(|r| r.fields));

            match page.offset {
                Some(next) if rows.len() < max_records => offset = Some(next),
                _ => break,
            }
        }

        rows.truncate(max_records);
        Ok(rows)
    }
}

impl GradeTableSource for AirtableSource {
    async fn fetch_rows(&self, max_records: usize) -> Result<Vec<GradeSystemEntry>> {
        self.fetch_all(max_records, &[]).await
    }

    /// Asks the store for the `country_name` column only
    async fn fetch_countries(&self, max_records: usize) -> Result<Vec<String>> {
        let rows = self.fetch_all(max_records, &["country_name"]).await?;
        Ok(rows.into_iter().map(|r| r.country).collect())
    }

    fn name(&self) -> &str {
        "airtable"
    }
}

// ============================================================================
// CONFIGURED SOURCE
// ============================================================================

/// Source picked at runtime from configuration
#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    Csv(CsvSource),
    Airtable(AirtableSource),
    Static(StaticSource),
}

impl GradeTableSource for ConfiguredSource {
    async fn fetch_rows(&self, max_records: usize) -> Result<Vec<GradeSystemEntry>> {
        match self {
            ConfiguredSource::Csv(source) => source.fetch_rows(max_records).await,
            ConfiguredSource::Airtable(source) => source.fetch_rows(max_records).await,
            ConfiguredSource::Static(source) => source.fetch_rows(max_records).await,
        }
    }

    async fn fetch_countries(&self, max_records: usize) -> Result<Vec<String>> {
        match self {
            ConfiguredSource::Csv(source) => source.fetch_countries(max_records).await,
            ConfiguredSource::Airtable(source) => source.fetch_countries(max_records).await,
            ConfiguredSource::Static(source) => source.fetch_countries(max_records).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            ConfiguredSource::Csv(source) => source.name(),
            ConfiguredSource::Airtable(source) => source.name(),
            ConfiguredSource::Static(source) => source.name(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
