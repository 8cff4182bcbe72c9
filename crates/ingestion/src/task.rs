//! Candidate tasks produced by the crawler.

use imagery_common::ProductTag;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One metadata file paired with one spectral product to build from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTask {
    pub source_path: PathBuf,
    pub product_tag: ProductTag,
    pub display_name: String,
    /// Name of the directory holding the metadata file.
    pub group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type_hint: Option<String>,
}

impl CandidateTask {
    pub fn new(source_path: impl Into<PathBuf>, product_tag: ProductTag) -> Self {
        let source_path = source_path.into();
        let display_name = file_name_of(&source_path);
        let group_name = source_path
            .parent()
            .map(file_name_of)
            .unwrap_or_default();
        Self {
            source_path,
            product_tag,
            display_name,
            group_name,
            product_type_hint: None,
        }
    }

    pub fn with_product_type(mut self, product_type: Option<String>) -> Self {
        self.product_type_hint = product_type;
        self
    }

    /// Directory rasters are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.source_path.parent().unwrap_or_else(|| Path::new("."))
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
