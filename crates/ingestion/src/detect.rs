//! Content-based format detection helpers.

use imagery_common::TagSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{IngestionError, Result};

/// Bounded read size for formats whose signature sits near the top.
pub const SIGNATURE_PREFIX_LEN: usize = 64 * 1024;

/// Outcome of a family membership test.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetectionResult {
    pub matches: bool,
    /// Tags derived from a declared band count, when the format has one.
    pub band_tags: TagSet,
}

impl DetectionResult {
    pub fn no_match() -> Self {
        Self::default()
    }

    pub fn matched(band_tags: TagSet) -> Self {
        Self {
            matches: true,
            band_tags,
        }
    }
}

/// Read at most `limit` bytes from the start of `path`, lossily decoded.
pub fn read_prefix(path: &Path, limit: usize) -> Result<String> {
    let file = File::open(path).map_err(|e| IngestionError::file_read(path, e))?;
    let mut buf = Vec::with_capacity(limit.min(8192));
    file.take(limit as u64)
        .read_to_end(&mut buf)
        .map_err(|e| IngestionError::file_read(path, e))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
