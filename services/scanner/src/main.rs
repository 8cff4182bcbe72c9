//! Satellite imagery scanner.
//!
//! Crawls product folders, files or CSV manifests for one sensor family (or
//! all of them), builds catalog items and writes them to stdout as JSON
//! lines. Logs go to stderr.

mod config;
mod scan;

use anyhow::Result;
use clap::Parser;
use imagery_common::BoundingBox;
use ingestion::FamilyRegistry;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::{load_scan_job, ScanJob};

#[derive(Parser, Debug)]
#[command(name = "scanner")]
#[command(about = "Crawl satellite imagery products and emit catalog items as JSON lines")]
struct Args {
    /// Scan job file (YAML); flags override its values
    #[arg(short, long, env = "SCANNER_CONFIG")]
    config: Option<PathBuf>,

    /// Sensor family: deimos-1, deimos-2, dzz-hr, nigeriasat-2, landsat-8,
    /// planetlabs (default: every family)
    #[arg(short, long)]
    family: Option<String>,

    /// Directories, metadata files or CSV manifests
    roots: Vec<PathBuf>,

    /// Walk directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// File-name glob for non-recursive listings
    #[arg(long)]
    filter: Option<String>,

    /// Re-check family membership before building
    #[arg(long)]
    verify: bool,

    /// Build on all cores after crawling
    #[arg(long)]
    parallel: bool,

    /// Keep items whose footprint intersects minx,miny,maxx,maxy
    #[arg(long, allow_hyphen_values = true)]
    within: Option<BoundingBox>,

    /// Print the capability descriptor and exit
    #[arg(long)]
    describe: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn apply_to(&self, job: &mut ScanJob) {
        if self.family.is_some() {
            job.family = self.family.clone();
        }
        if !self.roots.is_empty() {
            job.crawler.roots = self.roots.clone();
        }
        if self.filter.is_some() {
            job.crawler.filter = self.filter.clone();
        }
        if self.within.is_some() {
            job.within = self.within;
        }
        job.crawler.recursive |= self.recursive;
        job.verify |= self.verify;
        job.parallel |= self.parallel;
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&args.log_level))
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut job = match &args.config {
        Some(path) => load_scan_job(path)?,
        None => ScanJob::default(),
    };
    args.apply_to(&mut job);

    let registry = FamilyRegistry::standard();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.describe {
        scan::describe(&job, &registry, &mut out)?;
        out.flush()?;
        return Ok(());
    }

    job.validate(&registry)?;
    info!(
        families = ?scan::family_names(&job.families(&registry)?),
        roots = ?job.crawler.roots,
        recursive = job.crawler.recursive,
        parallel = job.parallel,
        "Starting scan"
    );

    let summary = scan::run(&job, &registry, &mut out)?;
    out.flush()?;

    info!(
        paths = summary.paths,
        tasks = summary.tasks,
        items = summary.items,
        filtered = summary.filtered,
        "Scan complete"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("verbose"), Level::INFO);
    }

    #[test]
    fn test_args_override_job() {
        let args = Args::try_parse_from([
            "scanner",
            "--family",
            "landsat-8",
            "--recursive",
            "--within",
            "0,0,10,10",
            "/data/a",
            "/data/b",
        ])
        .unwrap();

        let mut job: ScanJob =
            serde_yaml::from_str("family: deimos-2\nroots: [/old]\nfilter: \"*.dim\"\nparallel: true\n")
                .unwrap();
        args.apply_to(&mut job);

        assert_eq!(job.family.as_deref(), Some("landsat-8"));
        assert_eq!(
            job.crawler.roots,
            vec![PathBuf::from("/data/a"), PathBuf::from("/data/b")]
        );
        assert!(job.crawler.recursive);
        assert!(job.parallel);
        assert_eq!(job.crawler.filter.as_deref(), Some("*.dim"));
        assert_eq!(job.within, Some(BoundingBox::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_negative_within_flag() {
        let args = Args::try_parse_from(["scanner", "--within", "-10,35,5,45", "/data"]).unwrap();
        assert_eq!(args.within, Some(BoundingBox::new(-10.0, 35.0, 5.0, 45.0)));
        assert_eq!(args.roots, vec![PathBuf::from("/data")]);
    }

    #[test]
    fn test_bad_within_flag() {
        assert!(Args::try_parse_from(["scanner", "--within", "1,2", "/data"]).is_err());
    }
}
