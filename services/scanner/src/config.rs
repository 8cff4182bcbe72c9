//! Scan job configuration.
//!
//! A job names the sensor family, the crawl roots and a few run options. It
//! can be loaded from YAML (with `${VAR}` / `${VAR:-default}` environment
//! substitution) and then overridden from the command line.

use anyhow::{bail, Context, Result};
use imagery_common::BoundingBox;
use ingestion::{CrawlerConfig, FamilyRegistry, SensorFamily};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanJob {
    /// Family id, alias or descriptor name. Every family when absent.
    #[serde(default)]
    pub family: Option<String>,

    #[serde(flatten)]
    pub crawler: CrawlerConfig,

    /// Re-check family membership before every build.
    #[serde(default)]
    pub verify: bool,

    /// Crawl first, then build on the rayon pool.
    #[serde(default)]
    pub parallel: bool,

    /// Keep only items whose footprint extent intersects this box, given in
    /// the item's own coordinates.
    #[serde(default, deserialize_with = "bbox_from_str")]
    pub within: Option<BoundingBox>,
}

impl ScanJob {
    /// Families this job runs, in registry order.
    pub fn families<'r>(&self, registry: &'r FamilyRegistry) -> Result<Vec<&'r dyn SensorFamily>> {
        match self.family.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            Some(name) => {
                let family = registry
                    .get_by_name(name)
                    .with_context(|| format!("Unknown sensor family {:?}", name))?;
                Ok(vec![family])
            }
            None => Ok(registry.iter().collect()),
        }
    }

    /// Membership checks are forced on when every family scans the same
    /// roots, so each document is only built by its own family.
    pub fn verify_membership(&self) -> bool {
        self.verify || self.family.as_deref().map_or(true, |f| f.trim().is_empty())
    }

    pub fn validate(&self, registry: &FamilyRegistry) -> Result<()> {
        self.families(registry)?;
        self.crawler
            .validate()
            .context("Invalid crawl configuration")?;
        Ok(())
    }

    /// Whether an item with this footprint extent passes the `within` filter.
    pub fn accepts(&self, extent: Option<BoundingBox>) -> bool {
        match (self.within, extent) {
            (None, _) => true,
            (Some(within), Some(extent)) => within.intersects(&extent),
            (Some(_), None) => false,
        }
    }
}

fn bbox_from_str<'de, D>(deserializer: D) -> std::result::Result<Option<BoundingBox>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| s.parse().map_err(serde::de::Error::custom))
        .transpose()
}

// ============================================================================
// Loading
// ============================================================================

/// Load a scan job from YAML with environment variable substitution.
pub fn load_scan_job<P: AsRef<Path>>(path: P) -> Result<ScanJob> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read scan job from {:?}", path.as_ref()))?;

    let expanded = expand_env_vars(&content)?;

    let job: ScanJob = serde_yaml::from_str(&expanded)
        .with_context(|| format!("Failed to parse scan job from {:?}", path.as_ref()))?;

    Ok(job)
}

/// Expand `${VAR}` and `${VAR:-default}` references. An empty variable
/// takes the default when one is given.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some((before, tail)) = rest.split_once("${") {
        let (expr, after) = tail
            .split_once('}')
            .with_context(|| format!("Unclosed variable substitution: ${{{}", tail))?;
        let (name, fallback) = match expr.split_once(":-") {
            Some((name, fallback)) => (name.trim(), Some(fallback)),
            None => (expr.trim(), None),
        };
        let value = std::env::var(name)
            .ok()
            .filter(|v| !v.is_empty() || fallback.is_none());

        result.push_str(before);
        match (value, fallback) {
            (Some(value), _) => result.push_str(&value),
            (None, Some(fallback)) => result.push_str(fallback),
            (None, None) => bail!("Environment variable {} not set", name),
        }
        rest = after;
    }
    result.push_str(rest);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingestion::FamilyId;
    use std::path::PathBuf;

    fn parse(yaml: &str) -> ScanJob {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_parse_full_job() {
        let job = parse(
            r#"
family: deimos-2
roots:
  - /data/deimos
  - /data/manifest.csv
recursive: true
filter: "DE2_*.dim"
defaultFilter: "*.dim"
verify: true
parallel: true
within: "-10,35,5,45"
"#,
        );
        assert_eq!(job.family.as_deref(), Some("deimos-2"));
        assert_eq!(
            job.crawler.roots,
            vec![PathBuf::from("/data/deimos"), PathBuf::from("/data/manifest.csv")]
        );
        assert!(job.crawler.recursive);
        assert_eq!(job.crawler.filter.as_deref(), Some("DE2_*.dim"));
        assert_eq!(job.crawler.default_filter.as_deref(), Some("*.dim"));
        assert!(job.verify);
        assert!(job.parallel);
        assert_eq!(job.within, Some(BoundingBox::new(-10.0, 35.0, 5.0, 45.0)));
    }

    #[test]
    fn test_parse_minimal_job() {
        let job = parse("roots: [/data]\n");
        assert!(job.family.is_none());
        assert!(!job.crawler.recursive);
        assert!(job.within.is_none());
        assert!(job.verify_membership());
    }

    #[test]
    fn test_bad_within_rejected() {
        let result: std::result::Result<ScanJob, _> = serde_yaml::from_str("within: \"1,2,3\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_families_by_alias() {
        let registry = FamilyRegistry::standard();
        let job = ScanJob {
            family: Some("Kazakhstan".into()),
            ..Default::default()
        };
        let families = job.families(&registry).unwrap();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].id(), FamilyId::DzzHr);
        assert!(!job.verify_membership());

        let all = ScanJob::default().families(&registry).unwrap();
        assert_eq!(all.len(), registry.len());
    }

    #[test]
    fn test_validate() {
        let registry = FamilyRegistry::standard();
        assert!(ScanJob::default().validate(&registry).is_err());

        let unknown = ScanJob {
            family: Some("sentinel-2".into()),
            crawler: CrawlerConfig::new(["/data"]),
            ..Default::default()
        };
        assert!(unknown.validate(&registry).is_err());

        let ok = ScanJob {
            crawler: CrawlerConfig::new(["/data"]),
            ..Default::default()
        };
        assert!(ok.validate(&registry).is_ok());
    }

    #[test]
    fn test_within_filter() {
        let job = ScanJob {
            within: Some(BoundingBox::new(0.0, 0.0, 10.0, 10.0)),
            ..Default::default()
        };
        assert!(job.accepts(Some(BoundingBox::new(5.0, 5.0, 15.0, 15.0))));
        assert!(!job.accepts(Some(BoundingBox::new(20.0, 20.0, 30.0, 30.0))));
        assert!(!job.accepts(None));
        assert!(ScanJob::default().accepts(None));
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("SCANNER_TEST_ROOT", "/mnt/archive");
        std::env::remove_var("SCANNER_TEST_UNSET");

        let expanded =
            expand_env_vars("roots: [${SCANNER_TEST_ROOT}/deimos, ${SCANNER_TEST_UNSET:-/tmp}]").unwrap();
        assert_eq!(expanded, "roots: [/mnt/archive/deimos, /tmp]");

        assert!(expand_env_vars("${SCANNER_TEST_UNSET}").is_err());
        assert!(expand_env_vars("${UNCLOSED").is_err());
    }

    #[test]
    fn test_expand_empty_var_uses_default() {
        std::env::set_var("SCANNER_TEST_EMPTY", "");

        assert_eq!(expand_env_vars("a${SCANNER_TEST_EMPTY:-/srv}b").unwrap(), "a/srvb");
        assert_eq!(expand_env_vars("a${SCANNER_TEST_EMPTY}b").unwrap(), "ab");
        assert_eq!(expand_env_vars("no references").unwrap(), "no references");
    }

    #[test]
    fn test_load_scan_job_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.yaml");
        std::env::set_var("SCANNER_TEST_DATA", "/srv/imagery");
        fs::write(&path, "family: landsat-8\nroots: [\"${SCANNER_TEST_DATA}\"]\nrecursive: true\n").unwrap();

        let job = load_scan_job(&path).unwrap();
        assert_eq!(job.family.as_deref(), Some("landsat-8"));
        assert_eq!(job.crawler.roots, vec![PathBuf::from("/srv/imagery")]);

        assert!(load_scan_job(dir.path().join("missing.yaml")).is_err());
    }
}
