//! Landsat `KEY = value` metadata text.

use std::collections::HashMap;
use std::path::Path;

use super::{read_text, DocumentError};
use crate::error::{IngestionError, Result};

/// Flat key/value table read from an MTL file.
///
/// Group structure is discarded: keys are unique across groups in practice,
/// and when they are not the last occurrence wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MtlDocument {
    entries: HashMap<String, String>,
}

impl MtlDocument {
    pub fn parse(text: &str) -> std::result::Result<Self, DocumentError> {
        let mut entries = HashMap::new();
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() || key == "GROUP" || key == "END_GROUP" {
                continue;
            }
            let value = value.trim().trim_matches('"').trim();
            entries.insert(key.to_string(), value.to_string());
        }

        if entries.is_empty() {
            return Err(DocumentError::Structure(
                "no KEY = value entries found".into(),
            ));
        }
        Ok(Self { entries })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = read_text(path)?;
        Self::parse(&text).map_err(|e| IngestionError::document(path, e))
    }

    /// Value for `key`; blank values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Value for `key`, or a missing-metadata error naming it.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| IngestionError::missing(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"GROUP = L1_METADATA_FILE
  GROUP = PRODUCT_METADATA
    SPACECRAFT_ID = "LANDSAT_8"
    DATE_ACQUIRED = 2014-05-05
    FILE_NAME_BAND_1 = "LC8_B1.TIF"
    CORNER_UL_PROJECTION_X_PRODUCT = 399960.000
    EMPTY_VALUE = ""
  END_GROUP = PRODUCT_METADATA
  GROUP = IMAGE_ATTRIBUTES
    SUN_AZIMUTH = 128.5
    SUN_AZIMUTH = 129.0
  END_GROUP = IMAGE_ATTRIBUTES
END_GROUP = L1_METADATA_FILE
END
"#;

    #[test]
    fn test_parse_strips_quotes() {
        let doc = MtlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.get("SPACECRAFT_ID"), Some("LANDSAT_8"));
        assert_eq!(doc.get("FILE_NAME_BAND_1"), Some("LC8_B1.TIF"));
        assert_eq!(doc.get("DATE_ACQUIRED"), Some("2014-05-05"));
    }

    #[test]
    fn test_groups_ignored() {
        let doc = MtlDocument::parse(SAMPLE).unwrap();
        assert!(!doc.contains("GROUP"));
        assert!(!doc.contains("END_GROUP"));
        assert!(!doc.contains("END"));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let doc = MtlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.get("SUN_AZIMUTH"), Some("129.0"));
    }

    #[test]
    fn test_blank_is_absent() {
        let doc = MtlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.get("EMPTY_VALUE"), None);
        assert!(doc.require("EMPTY_VALUE").is_err());
    }

    #[test]
    fn test_no_entries_is_malformed() {
        assert!(MtlDocument::parse("just some text\nEND\n").is_err());
    }
}
