//! Expansion of crawl roots into candidate metadata paths.

use globset::GlobMatcher;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{IngestionError, Result};
use crate::family::has_suffix;

/// One row of a `.csv` manifest. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct ManifestRow {
    raster: String,
}

enum Cursor {
    Idle,
    Walk(walkdir::IntoIter),
    Listing(std::vec::IntoIter<PathBuf>),
    Manifest {
        path: PathBuf,
        base: PathBuf,
        rows: csv::DeserializeRecordsIntoIter<File, ManifestRow>,
    },
}

/// Lazily yields candidate paths root by root.
///
/// Nothing is read from disk until the next path is requested.
pub(crate) struct PathQueue {
    roots: VecDeque<PathBuf>,
    cursor: Cursor,
    recursive: bool,
    suffix: &'static str,
    matcher: GlobMatcher,
}

impl PathQueue {
    pub(crate) fn new(
        roots: impl IntoIterator<Item = PathBuf>,
        recursive: bool,
        suffix: &'static str,
        matcher: GlobMatcher,
    ) -> Self {
        Self {
            roots: roots.into_iter().collect(),
            cursor: Cursor::Idle,
            recursive,
            suffix,
            matcher,
        }
    }

    /// Next path, a per-path error, or `None` once every root is exhausted.
    pub(crate) fn next_path(&mut self) -> Option<Result<PathBuf>> {
        loop {
            match &mut self.cursor {
                Cursor::Idle => {
                    let root = self.roots.pop_front()?;
                    match self.open(root) {
                        Ok(Some(path)) => return Some(Ok(path)),
                        Ok(None) => continue,
                        Err(err) => return Some(Err(err)),
                    }
                }
                Cursor::Walk(walk) => match walk.next() {
                    Some(Ok(entry)) => {
                        if entry.file_type().is_file() && has_suffix(entry.path(), self.suffix) {
                            return Some(Ok(entry.into_path()));
                        }
                    }
                    Some(Err(err)) => {
                        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                        return Some(Err(IngestionError::file_read(path, err.into())));
                    }
                    None => self.cursor = Cursor::Idle,
                },
                Cursor::Listing(files) => match files.next() {
                    Some(path) => return Some(Ok(path)),
                    None => self.cursor = Cursor::Idle,
                },
                Cursor::Manifest { path, base, rows } => match rows.next() {
                    Some(Ok(row)) => {
                        let raster = row.raster.trim();
                        if raster.is_empty() {
                            continue;
                        }
                        return Some(Ok(base.join(raster)));
                    }
                    Some(Err(source)) => {
                        return Some(Err(IngestionError::Manifest {
                            path: path.clone(),
                            source,
                        }))
                    }
                    None => self.cursor = Cursor::Idle,
                },
            }
        }
    }

    /// Start on a root. Plain files are returned directly; directories and
    /// manifests become the new cursor.
    fn open(&mut self, root: PathBuf) -> Result<Option<PathBuf>> {
        if root.is_dir() {
            self.cursor = if self.recursive {
                Cursor::Walk(WalkDir::new(&root).sort_by_file_name().into_iter())
            } else {
                Cursor::Listing(self.list(&root)?.into_iter())
            };
            return Ok(None);
        }

        if !root.exists() {
            return Err(IngestionError::file_read(
                &root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "root does not exist"),
            ));
        }

        if is_manifest(&root) {
            let reader = csv::Reader::from_path(&root).map_err(|source| IngestionError::Manifest {
                path: root.clone(),
                source,
            })?;
            let base = root.parent().map(Path::to_path_buf).unwrap_or_default();
            self.cursor = Cursor::Manifest {
                path: root,
                base,
                rows: reader.into_deserialize(),
            };
            return Ok(None);
        }

        Ok(Some(root))
    }

    /// Files directly inside `dir` whose name matches the filter, sorted.
    fn list(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir).map_err(|e| IngestionError::file_read(dir, e))?;
        Ok(self.matching_files(dir, entries.map(|entry| entry.map(|e| e.path()))))
    }

    /// Unreadable entries are logged and left out; the rest of the listing
    /// still counts.
    fn matching_files<I>(&self, dir: &Path, entries: I) -> Vec<PathBuf>
    where
        I: IntoIterator<Item = std::io::Result<PathBuf>>,
    {
        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => {
                    let matches = path
                        .file_name()
                        .map_or(false, |name| self.matcher.is_match(name));
                    if matches && path.is_file() {
                        files.push(path);
                    }
                }
                Err(err) => warn!(
                    dir = %dir.display(),
                    error = %err,
                    "Skipping unreadable directory entry"
                ),
            }
        }
        files.sort();
        files
    }
}

fn is_manifest(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}
