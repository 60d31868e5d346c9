//! Candidate sources - the lookup boundary behind each trigger kind
//!
//! A [`CandidateSource`] answers a free-text query with an ordered list of
//! `{id, label}` candidates. The runtime calls sources from worker threads,
//! so implementations must be `Send + Sync`; a slow source only delays the
//! popup, it never blocks input handling.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32String};
use serde::{Deserialize, Serialize};

use crate::token::{Candidate, TokenKind};

/// Errors a source may report for a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// No source is registered for the kind
    Unavailable(TokenKind),
    /// The lookup itself failed
    Failed(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(kind) => write!(f, "no candidate source for kind '{}'", kind),
            Self::Failed(msg) => write!(f, "candidate lookup failed: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

/// Resolves search queries for one token kind
pub trait CandidateSource: Send + Sync {
    fn search(&self, query: &str) -> Result<Vec<Candidate>, SourceError>;
}

impl<F> CandidateSource for F
where
    F: Fn(&str) -> Result<Vec<Candidate>, SourceError> + Send + Sync,
{
    fn search(&self, query: &str) -> Result<Vec<Candidate>, SourceError> {
        self(query)
    }
}

/// In-memory list of candidates filtered with fuzzy matching
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    items: Vec<Candidate>,
}

impl CatalogSource {
    pub fn new(items: Vec<Candidate>) -> Self {
        Self { items }
    }
}

impl CandidateSource for CatalogSource {
    /// Empty queries list the whole catalog in order; otherwise results are
    /// ranked by fuzzy score, ties keeping catalog order.
    fn search(&self, query: &str) -> Result<Vec<Candidate>, SourceError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(self.items.clone());
        }

        let mut matcher = Matcher::new(nucleo_matcher::Config::DEFAULT);
        let pattern = Pattern::new(
            query,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );

        let mut scored: Vec<(u32, &Candidate)> = self
            .items
            .iter()
            .filter_map(|item| {
                let haystack = Utf32String::from(item.label.as_str());
                pattern
                    .score(haystack.slice(..), &mut matcher)
                    .map(|score| (score, item))
            })
            .collect();

        // Stable sort keeps catalog order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored.into_iter().map(|(_, item)| item.clone()).collect())
    }
}

/// Candidate lists for both kinds, loadable from YAML
///
/// ```yaml
/// positions:
///   - { id: P_0001, label: Energy consumption }
/// impacts:
///   - { id: I_0001, label: GHG Scope 1 }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub positions: Vec<Candidate>,
    #[serde(default)]
    pub impacts: Vec<Candidate>,
}

impl Catalog {
    /// Built-in sample data
    pub fn demo() -> Self {
        Self {
            positions: vec![
                Candidate::new("P_0001", "Energy consumption"),
                Candidate::new("P_0002", "Labour cost"),
                Candidate::new("P_0003", "Water usage"),
            ],
            impacts: vec![
                Candidate::new("I_0001", "GHG Scope 1"),
                Candidate::new("I_0002", "GHG Scope 2"),
            ],
        }
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse catalog")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let catalog = Self::from_yaml(&content)?;
        tracing::info!(
            "Loaded catalog from {} ({} positions, {} impacts)",
            path.display(),
            catalog.positions.len(),
            catalog.impacts.len()
        );
        Ok(catalog)
    }

    /// One catalog source per kind
    pub fn into_registry(self) -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        registry.register(TokenKind::Position, CatalogSource::new(self.positions));
        registry.register(TokenKind::Impact, CatalogSource::new(self.impacts));
        registry
    }
}

/// Maps each token kind to the source that resolves it
#[derive(Clone, Default)]
pub struct SourceRegistry {
    sources: HashMap<TokenKind, Arc<dyn CandidateSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the source for `kind`
    pub fn register(&mut self, kind: TokenKind, source: impl CandidateSource + 'static) {
        self.sources.insert(kind, Arc::new(source));
    }

    pub fn get(&self, kind: TokenKind) -> Option<Arc<dyn CandidateSource>> {
        self.sources.get(&kind).cloned()
    }

    /// Run a query against the source for `kind`
    pub fn search(&self, kind: TokenKind, query: &str) -> Result<Vec<Candidate>, SourceError> {
        match self.sources.get(&kind) {
            Some(source) => source.search(query),
            None => Err(SourceError::Unavailable(kind)),
        }
    }
}

impl fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.sources.keys().collect();
        kinds.sort();
        f.debug_struct("SourceRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
