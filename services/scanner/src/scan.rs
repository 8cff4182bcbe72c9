//! Runs a scan job and writes built items as JSON lines.

use anyhow::{Context, Result};
use ingestion::{BuiltItem, FamilyRegistry, IngestOptions, Ingester, SensorFamily};
use serde::Serialize;
use std::io::Write;
use tracing::{debug, info};

use crate::config::ScanJob;

/// Totals across every family a job ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub families: usize,
    pub paths: usize,
    pub tasks: usize,
    pub items: usize,
    /// Items dropped by the `within` filter.
    pub filtered: usize,
}

pub fn run<W: Write>(job: &ScanJob, registry: &FamilyRegistry, out: &mut W) -> Result<ScanSummary> {
    let options = IngestOptions {
        verify_membership: job.verify_membership(),
    };
    let mut summary = ScanSummary::default();

    for family in job.families(registry)? {
        let ingester = Ingester::new(family, options);
        let mut crawler = ingester
            .crawl(&job.crawler)
            .context("Invalid crawl configuration")?;

        let mut emitted = 0;
        if job.parallel {
            let tasks: Vec<_> = crawler.by_ref().collect();
            summary.tasks += tasks.len();
            for item in ingester.build_parallel(&tasks) {
                emitted += emit(job, &item, out, &mut summary)?;
            }
        } else {
            while let Some(task) = crawler.next_task() {
                summary.tasks += 1;
                for item in ingester.build_task(&task) {
                    emitted += emit(job, &item, out, &mut summary)?;
                }
            }
        }

        let stats = crawler.stats();
        summary.families += 1;
        summary.paths += stats.paths_seen;
        info!(
            family = %family.id(),
            paths = stats.paths_seen,
            skipped_paths = stats.paths_skipped,
            tasks = stats.tasks_emitted,
            items = emitted,
            "Family scan complete"
        );
    }

    Ok(summary)
}

fn emit<W: Write>(
    job: &ScanJob,
    item: &BuiltItem,
    out: &mut W,
    summary: &mut ScanSummary,
) -> Result<usize> {
    if !job.accepts(item.footprint.extent()) {
        debug!(
            path = %item.item_uri.source_path.display(),
            "Footprint outside requested extent"
        );
        summary.filtered += 1;
        return Ok(0);
    }
    serde_json::to_writer(&mut *out, item).context("Failed to serialize item")?;
    writeln!(out).context("Failed to write item")?;
    summary.items += 1;
    Ok(1)
}

/// Write the capability descriptor of each selected family as pretty JSON.
pub fn describe<W: Write>(job: &ScanJob, registry: &FamilyRegistry, out: &mut W) -> Result<()> {
    let families = job.families(registry)?;
    let descriptors: Vec<_> = families.iter().map(|f| f.descriptor()).collect();

    match descriptors.as_slice() {
        [single] => serde_json::to_writer_pretty(&mut *out, single),
        all => serde_json::to_writer_pretty(&mut *out, all),
    }
    .context("Failed to serialize descriptor")?;
    writeln!(out)?;
    Ok(())
}

/// Name of every family a job would run, for logging.
pub fn family_names(families: &[&dyn SensorFamily]) -> Vec<&'static str> {
    families.iter().map(|f| f.id().as_str()).collect()
}
