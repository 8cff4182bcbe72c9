//! Crawl-and-build pipeline for one sensor family.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::CrawlerConfig;
use crate::crawler::{CrawlStats, Crawler};
use crate::error::Result;
use crate::family::SensorFamily;
use crate::item::BuiltItem;
use crate::task::CandidateTask;

/// Options for ingestion runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Re-run the family's membership test before each build.
    pub verify_membership: bool,
}

/// Result of an eager ingestion run.
#[derive(Debug, Clone, Default)]
pub struct IngestionReport {
    pub items: Vec<BuiltItem>,
    /// Tasks produced by the crawler
    pub tasks_seen: usize,
    /// Tasks that built nothing
    pub tasks_skipped: usize,
    pub crawl: CrawlStats,
}

/// Drives one family through detect → crawl → build.
///
/// Builds share no mutable state, so [`Ingester::build_parallel`] may fan
/// tasks out across threads.
#[derive(Clone, Copy)]
pub struct Ingester<'r> {
    family: &'r dyn SensorFamily,
    options: IngestOptions,
}

impl<'r> Ingester<'r> {
    pub fn new(family: &'r dyn SensorFamily, options: IngestOptions) -> Self {
        Self { family, options }
    }

    pub fn family(&self) -> &'r dyn SensorFamily {
        self.family
    }

    /// Start a crawl. Fails fast on an invalid configuration.
    pub fn crawl(&self, config: &CrawlerConfig) -> Result<Crawler<'r>> {
        Crawler::new(self.family, config)
    }

    /// Build one task, optionally re-checking family membership first.
    pub fn build_task(&self, task: &CandidateTask) -> Vec<BuiltItem> {
        build_one(self.family, self.options, task)
    }

    /// Lazily crawl and build. Stopping iteration stops all I/O.
    pub fn items(&self, config: &CrawlerConfig) -> Result<impl Iterator<Item = BuiltItem> + 'r> {
        let crawler = self.crawl(config)?;
        let family = self.family;
        let options = self.options;
        Ok(crawler.flat_map(move |task| build_one(family, options, &task)))
    }

    /// Crawl and build everything, single-threaded.
    pub fn collect(&self, config: &CrawlerConfig) -> Result<IngestionReport> {
        let mut crawler = self.crawl(config)?;
        let mut report = IngestionReport::default();

        while let Some(task) = crawler.next_task() {
            report.tasks_seen += 1;
            let built = self.build_task(&task);
            if built.is_empty() {
                report.tasks_skipped += 1;
            }
            report.items.extend(built);
        }
        report.crawl = crawler.stats();

        info!(
            family = %self.family.id(),
            paths = report.crawl.paths_seen,
            tasks = report.tasks_seen,
            items = report.items.len(),
            skipped = report.tasks_skipped,
            "Ingestion complete"
        );
        Ok(report)
    }

    /// Build already-crawled tasks on the rayon pool. Output follows task
    /// order.
    pub fn build_parallel(&self, tasks: &[CandidateTask]) -> Vec<BuiltItem> {
        let family = self.family;
        let options = self.options;
        tasks
            .par_iter()
            .flat_map_iter(|task| build_one(family, options, task))
            .collect()
    }
}

fn build_one(
    family: &dyn SensorFamily,
    options: IngestOptions,
    task: &CandidateTask,
) -> Vec<BuiltItem> {
    if options.verify_membership && !family.can_build(&task.source_path) {
        debug!(
            family = %family.id(),
            path = %task.source_path.display(),
            "Candidate failed membership check"
        );
        return Vec::new();
    }
    family.build(task)
}
