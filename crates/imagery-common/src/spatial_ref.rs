//! Spatial reference types.
//!
//! Metadata documents declare their coordinate system in several shapes:
//! an EPSG code string, a raw OGC WKT blob, or nothing at all (in which case
//! the raster file itself carries the reference). [`SpatialReference`] keeps
//! whichever form was found; transforming between references is left to the
//! consumer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A numeric EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpsgCode(pub u32);

impl EpsgCode {
    /// WGS84 Geographic (lon/lat in degrees)
    pub const WGS84: EpsgCode = EpsgCode(4326);

    /// Parse an EPSG code string.
    ///
    /// Accepts formats like:
    /// - "EPSG:32633"
    /// - "epsg:4326"
    /// - "urn:ogc:def:crs:EPSG::4326"
    /// - "CRS:84" (equivalent to EPSG:4326)
    /// - "32633"
    pub fn from_code_string(s: &str) -> Result<Self, SpatialRefParseError> {
        let trimmed = s.trim();
        let normalized = trimmed.to_uppercase();

        if normalized == "CRS:84" {
            return Ok(Self::WGS84);
        }

        let digits = normalized
            .strip_prefix("URN:OGC:DEF:CRS:EPSG::")
            .or_else(|| normalized.strip_prefix("EPSG:"))
            .unwrap_or(&normalized);

        match digits.trim().parse::<u32>() {
            Ok(0) | Err(_) => Err(SpatialRefParseError::InvalidEpsg(trimmed.to_string())),
            Ok(code) => Ok(EpsgCode(code)),
        }
    }

    /// UTM zone on the WGS84 datum: 326zz for the northern hemisphere,
    /// 327zz for the southern one.
    pub fn utm_wgs84(zone: u8, north: bool) -> Result<Self, SpatialRefParseError> {
        if !(1..=60).contains(&zone) {
            return Err(SpatialRefParseError::InvalidUtmZone(zone));
        }
        let base = if north { 32600 } else { 32700 };
        Ok(EpsgCode(base + u32::from(zone)))
    }

    /// The numeric code.
    pub fn code(&self) -> u32 {
        self.0
    }

    /// Check if this is a geographic (lat/lon) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self.0, 4326 | 4269 | 4258 | 4230 | 4267)
    }
}

impl fmt::Display for EpsgCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

impl FromStr for EpsgCode {
    type Err = SpatialRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code_string(s)
    }
}

/// The coordinate system an item's footprint is expressed in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum SpatialReference {
    Epsg(EpsgCode),
    Wkt(String),
    /// Use the reference embedded in this raster file.
    RasterDerived(PathBuf),
    /// Nothing usable was declared.
    #[default]
    Unresolved,
}

impl SpatialReference {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, SpatialReference::Unresolved)
    }

    pub fn epsg(&self) -> Option<EpsgCode> {
        match self {
            SpatialReference::Epsg(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<EpsgCode> for SpatialReference {
    fn from(code: EpsgCode) -> Self {
        SpatialReference::Epsg(code)
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialReference::Epsg(code) => write!(f, "{}", code),
            SpatialReference::Wkt(_) => write!(f, "WKT"),
            SpatialReference::RasterDerived(path) => write!(f, "raster:{}", path.display()),
            SpatialReference::Unresolved => write!(f, "unresolved"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SpatialRefParseError {
    #[error("Invalid EPSG code: {0}")]
    InvalidEpsg(String),

    #[error("UTM zone out of range: {0}")]
    InvalidUtmZone(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_epsg() {
        assert_eq!(EpsgCode::from_code_string("EPSG:32633").unwrap(), EpsgCode(32633));
        assert_eq!(EpsgCode::from_code_string("epsg:4326").unwrap(), EpsgCode::WGS84);
        assert_eq!(
            EpsgCode::from_code_string("urn:ogc:def:crs:EPSG::4326").unwrap(),
            EpsgCode::WGS84
        );
        assert_eq!(EpsgCode::from_code_string("CRS:84").unwrap(), EpsgCode::WGS84);
        assert_eq!(EpsgCode::from_code_string(" 32630 ").unwrap(), EpsgCode(32630));
        assert!(EpsgCode::from_code_string("EPSG:abc").is_err());
        assert!(EpsgCode::from_code_string("EPSG:0").is_err());
        assert!(EpsgCode::from_code_string("").is_err());
    }

    #[test]
    fn test_utm_codes() {
        assert_eq!(EpsgCode::utm_wgs84(33, true).unwrap(), EpsgCode(32633));
        assert_eq!(EpsgCode::utm_wgs84(5, false).unwrap(), EpsgCode(32705));
        assert!(EpsgCode::utm_wgs84(0, true).is_err());
        assert!(EpsgCode::utm_wgs84(61, true).is_err());
    }

    #[test]
    fn test_geographic() {
        assert!(EpsgCode::WGS84.is_geographic());
        assert!(!EpsgCode(32633).is_geographic());
    }

    #[test]
    fn test_default_is_unresolved() {
        let srs = SpatialReference::default();
        assert!(!srs.is_resolved());
        assert_eq!(srs.to_string(), "unresolved");
        assert!(SpatialReference::from(EpsgCode(32633)).is_resolved());
    }
}
