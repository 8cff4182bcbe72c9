//! Crawl configuration.

use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{IngestionError, Result};

/// Where to look for candidates and how.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrawlerConfig {
    /// Directories, metadata files or `.csv` manifests, visited in order.
    pub roots: Vec<PathBuf>,
    /// Walk whole subtrees instead of listing a single directory level.
    pub recursive: bool,
    /// File-name glob for non-recursive directory listings.
    pub filter: Option<String>,
    /// Glob used when `filter` is absent or blank. Families supply their own
    /// when this is unset too.
    pub default_filter: Option<String>,
}

impl CrawlerConfig {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = Some(filter.into());
        self
    }

    /// The glob in effect: `filter` unless blank, then `default_filter`,
    /// then the family fallback.
    pub fn effective_filter<'a>(&'a self, family_default: &'a str) -> &'a str {
        [self.filter.as_deref(), self.default_filter.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|f| !f.is_empty())
            .unwrap_or(family_default)
    }

    /// Fail fast on configurations that cannot produce a crawl.
    pub fn validate(&self) -> Result<()> {
        if self.roots.is_empty() {
            return Err(IngestionError::InvalidConfig(
                "at least one root path is required".into(),
            ));
        }
        if let Some(empty) = self.roots.iter().find(|r| r.as_os_str().is_empty()) {
            return Err(IngestionError::InvalidConfig(format!(
                "empty root path: {:?}",
                empty
            )));
        }
        for glob in [self.filter.as_deref(), self.default_filter.as_deref()]
            .into_iter()
            .flatten()
            .filter(|g| !g.trim().is_empty())
        {
            compile_filter(glob)?;
        }
        Ok(())
    }
}

/// Compile a file-name glob, case-insensitively.
pub fn compile_filter(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern.trim())
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| IngestionError::InvalidConfig(format!("invalid filter {:?}: {}", pattern, e)))
}
