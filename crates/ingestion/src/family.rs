//! The per-family capability set.
//!
//! Every sensor family plugs into the same detect → crawl → build pipeline
//! by implementing [`SensorFamily`]. Implementations hold no mutable state,
//! so one instance can serve any number of concurrent builds.

use imagery_common::TagSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::descriptor::CapabilityDescriptor;
use crate::detect::DetectionResult;
use crate::error::Result;
use crate::item::BuiltItem;
use crate::registry::FamilyId;
use crate::task::CandidateTask;

/// Tags a metadata file supports, plus the product type it declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagEnumeration {
    pub tags: TagSet,
    pub product_type: Option<String>,
}

impl TagEnumeration {
    pub fn new(tags: TagSet, product_type: Option<String>) -> Self {
        Self { tags, product_type }
    }
}

pub trait SensorFamily: Send + Sync {
    fn id(&self) -> FamilyId;

    fn descriptor(&self) -> &'static CapabilityDescriptor;

    /// Lower-case file-name suffix picked up by recursive crawls.
    fn metadata_suffix(&self) -> &'static str;

    /// Glob used for non-recursive listings when the crawl config has none.
    fn default_filter(&self) -> &'static str {
        self.descriptor().data_source_filter
    }

    /// Family membership test. `Ok` with `matches: false` is a clean
    /// non-match; `Err` means the file could not be read or parsed.
    fn probe(&self, path: &Path) -> Result<DetectionResult>;

    /// Infallible membership test. Failures count as non-matches but are
    /// logged with their category so they stay distinguishable.
    fn detect(&self, path: &Path) -> DetectionResult {
        match self.probe(path) {
            Ok(result) => {
                if !result.matches {
                    debug!(
                        family = %self.id(),
                        path = %path.display(),
                        "Not a member of this family"
                    );
                }
                result
            }
            Err(err) => {
                warn!(
                    family = %self.id(),
                    path = %path.display(),
                    category = %err.category(),
                    error = %err,
                    "Detection failed"
                );
                DetectionResult::no_match()
            }
        }
    }

    /// Tags the crawler should expand `path` into. Documents that fail the
    /// family's signature test enumerate no tags.
    fn enumerate_tags(&self, path: &Path) -> Result<TagEnumeration>;

    fn can_build(&self, path: &Path) -> bool {
        self.detect(path).matches
    }

    /// Build the item for one task. `Ok(None)` means the task's tag does not
    /// apply to this document.
    fn try_build(&self, task: &CandidateTask) -> Result<Option<BuiltItem>>;

    /// Build the item for one task, turning any failure into an empty result.
    fn build(&self, task: &CandidateTask) -> Vec<BuiltItem> {
        match self.try_build(task) {
            Ok(Some(item)) => vec![item],
            Ok(None) => {
                debug!(
                    family = %self.id(),
                    path = %task.source_path.display(),
                    tag = %task.product_tag,
                    "Tag not supported by document"
                );
                Vec::new()
            }
            Err(err) => {
                warn!(
                    family = %self.id(),
                    path = %task.source_path.display(),
                    tag = %task.product_tag,
                    category = %err.category(),
                    error = %err,
                    "Build failed, skipping candidate"
                );
                Vec::new()
            }
        }
    }
}

/// Case-insensitive suffix test on the file name.
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().ends_with(suffix))
        .unwrap_or(false)
}
