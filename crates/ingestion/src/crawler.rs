//! Pull-based crawler turning crawl roots into candidate tasks.
//!
//! The crawler flattens `path → tags` into `(path, tag)` tasks, path-major
//! and tag-minor. Each path's tags are enumerated once, when the path is
//! reached. Unreadable or malformed paths are logged and skipped; they never
//! end the crawl.

use imagery_common::ProductTag;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::{compile_filter, CrawlerConfig};
use crate::error::Result;
use crate::family::SensorFamily;
use crate::paths::PathQueue;
use crate::task::CandidateTask;

/// Counters for one crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Paths taken from the roots, before tag expansion.
    pub paths_seen: usize,
    /// Paths that produced no task (unreadable, malformed or no tags).
    pub paths_skipped: usize,
    pub tasks_emitted: usize,
}

/// One traversal over a crawl configuration.
///
/// Holds mutable cursor state, so it belongs to a single consumer. Dropping
/// it stops all further I/O.
pub struct Crawler<'f> {
    family: &'f dyn SensorFamily,
    paths: PathQueue,
    current: Option<PathBuf>,
    product_type: Option<String>,
    tags: Vec<ProductTag>,
    tag_cursor: usize,
    stats: CrawlStats,
}

impl<'f> Crawler<'f> {
    /// Validate `config` and prepare a crawl. No file is touched yet.
    pub fn new(family: &'f dyn SensorFamily, config: &CrawlerConfig) -> Result<Self> {
        config.validate()?;
        let matcher = compile_filter(config.effective_filter(family.default_filter()))?;
        Ok(Self {
            family,
            paths: PathQueue::new(
                config.roots.iter().cloned(),
                config.recursive,
                family.metadata_suffix(),
                matcher,
            ),
            current: None,
            product_type: None,
            tags: Vec::new(),
            tag_cursor: 0,
            stats: CrawlStats::default(),
        })
    }

    /// Next task, or `None` once every root is exhausted.
    pub fn next_task(&mut self) -> Option<CandidateTask> {
        loop {
            if let Some(path) = &self.current {
                if let Some(&tag) = self.tags.get(self.tag_cursor) {
                    self.tag_cursor += 1;
                    self.stats.tasks_emitted += 1;
                    return Some(
                        CandidateTask::new(path.clone(), tag)
                            .with_product_type(self.product_type.clone()),
                    );
                }
                self.current = None;
            }

            match self.paths.next_path()? {
                Ok(path) => self.enter(path),
                Err(err) => {
                    self.stats.paths_skipped += 1;
                    warn!(
                        family = %self.family.id(),
                        category = %err.category(),
                        error = %err,
                        "Skipping unreadable crawl entry"
                    );
                }
            }
        }
    }

    fn enter(&mut self, path: PathBuf) {
        self.stats.paths_seen += 1;
        match self.family.enumerate_tags(&path) {
            Ok(enumeration) if enumeration.tags.is_empty() => {
                self.stats.paths_skipped += 1;
                debug!(
                    family = %self.family.id(),
                    path = %path.display(),
                    "No supported product tags"
                );
            }
            Ok(enumeration) => {
                self.tags = enumeration.tags.into_iter().collect();
                self.tag_cursor = 0;
                self.product_type = enumeration.product_type;
                self.current = Some(path);
            }
            Err(err) => {
                self.stats.paths_skipped += 1;
                warn!(
                    family = %self.family.id(),
                    path = %path.display(),
                    category = %err.category(),
                    error = %err,
                    "Failed to enumerate tags"
                );
            }
        }
    }

    pub fn stats(&self) -> CrawlStats {
        self.stats
    }

    pub fn family(&self) -> &'f dyn SensorFamily {
        self.family
    }
}

impl Iterator for Crawler<'_> {
    type Item = CandidateTask;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_task()
    }
}
