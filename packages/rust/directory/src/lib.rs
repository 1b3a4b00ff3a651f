//! People-directory search: the trait seam plus file-backed and in-memory
//! implementations.
//!
//! Directory access is the first external seam in a discovery run. Everything
//! behind [`DirectorySearch`] is replaceable; the implementations here cover
//! the supported ingestion path (a JSONL export) and tests.

mod records;

use std::path::PathBuf;

use async_trait::async_trait;
use buyerscope_shared::{BuyerScopeError, Candidate, CompanyIntel, Result};
use tracing::{debug, info, instrument};

pub use records::{RawEmployeeRecord, fingerprint, map_record, parse_jsonl};

// ---------------------------------------------------------------------------
// Search interface
// ---------------------------------------------------------------------------

/// Filters applied to a directory search.
#[derive(Debug, Clone)]
pub struct SearchFilters {
    /// Case-insensitive substring required in the title, when set.
    pub title_query: Option<String>,
    /// Drop candidates whose stated location is outside the US. Candidates
    /// with no location are kept; unknown is not foreign.
    pub usa_only: bool,
    /// Maximum number of candidates to return.
    pub limit: usize,
}

impl SearchFilters {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            title_query: None,
            usa_only: false,
            limit,
        }
    }
}

/// What a directory search produced.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Candidates after filtering, capped at the requested limit.
    pub candidates: Vec<Candidate>,
    /// How many candidates matched the filters before the cap.
    pub total_available: usize,
    /// Whether the cap truncated the result.
    pub hit_limit: bool,
}

/// A searchable people directory.
#[async_trait]
pub trait DirectorySearch: Send + Sync {
    /// Search the directory for employees of `company`.
    async fn search(&self, company: &CompanyIntel, filters: &SearchFilters)
    -> Result<SearchOutcome>;
}

fn is_usa_location(location: &str) -> bool {
    let lower = location.to_lowercase();
    lower.contains("united states") || lower.contains("usa") || lower.ends_with(", us")
}

/// Apply filters and the result cap to an already-loaded candidate set.
fn apply_filters(candidates: Vec<Candidate>, filters: &SearchFilters) -> SearchOutcome {
    let matched: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| {
            if let Some(query) = &filters.title_query {
                if !c.title.to_lowercase().contains(&query.to_lowercase()) {
                    return false;
                }
            }
            if filters.usa_only {
                if let Some(location) = &c.location {
                    if !is_usa_location(location) {
                        return false;
                    }
                }
            }
            true
        })
        .collect();

    let total_available = matched.len();
    let hit_limit = total_available > filters.limit;
    let mut candidates = matched;
    candidates.truncate(filters.limit);

    SearchOutcome {
        candidates,
        total_available,
        hit_limit,
    }
}

// ---------------------------------------------------------------------------
// FileDirectory
// ---------------------------------------------------------------------------

/// Directory backed by a JSONL export file, one employee record per line.
pub struct FileDirectory {
    path: PathBuf,
}

impl FileDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DirectorySearch for FileDirectory {
    #[instrument(skip_all, fields(path = %self.path.display(), company = %company.name))]
    async fn search(
        &self,
        company: &CompanyIntel,
        filters: &SearchFilters,
    ) -> Result<SearchOutcome> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| BuyerScopeError::io(&self.path, e))?;

        let candidates = parse_jsonl(&text);
        debug!(parsed = candidates.len(), "loaded directory export");

        let outcome = apply_filters(candidates, filters);
        info!(
            matched = outcome.total_available,
            returned = outcome.candidates.len(),
            hit_limit = outcome.hit_limit,
            "directory search complete"
        );
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// InMemoryDirectory
// ---------------------------------------------------------------------------

/// Directory over a fixed candidate list. Used by tests and by callers that
/// already hold records in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    candidates: Vec<Candidate>,
}

impl InMemoryDirectory {
    pub fn with_candidates(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DirectorySearch for InMemoryDirectory {
    async fn search(
        &self,
        _company: &CompanyIntel,
        filters: &SearchFilters,
    ) -> Result<SearchOutcome> {
        Ok(apply_filters(self.candidates.clone(), filters))
    }
}
