//! Canonical output records.

use imagery_common::{Footprint, ProductTag, SpatialReference};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{IngestionError, Result};
use crate::task::CandidateTask;

/// One buildable raster product with normalized metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltItem {
    pub spatial_reference: SpatialReference,
    /// Logical slot (`Raster1`, `Raster2`, ...) to absolute path.
    pub raster_files: BTreeMap<String, PathBuf>,
    pub footprint: Footprint,
    pub key_properties: KeyProperties,
    pub source_tag: ProductTag,
    pub item_uri: CandidateTask,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<RenderVariables>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geodata_transform: Option<GeodataTransform>,
}

/// Scene-level metadata. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun_elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun_azimuth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_nadir: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incidence_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewing_angle_along_track: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewing_angle_across_track: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theoretical_resolution: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_azimuth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_elevation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub band_properties: Vec<BandProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraProperties>,
}

/// Radiometric coefficients for one band.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radiance_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radiance_bias: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflectance_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflectance_bias: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl BandProperty {
    pub fn is_empty(&self) -> bool {
        *self == BandProperty::default()
    }
}

/// Camera settings carried by PlanetLabs records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_depth: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tdi_pulses: Option<u64>,
}

impl CameraProperties {
    pub fn is_empty(&self) -> bool {
        *self == CameraProperties::default()
    }
}

/// Display defaults handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderVariables {
    pub default_maximum_input: u32,
    pub default_gamma: f64,
}

/// Sensor model carried alongside the raster, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeodataTransform {
    pub kind: String,
    pub coefficients: Vec<f64>,
}

impl GeodataTransform {
    pub fn rpc(coefficients: Vec<f64>) -> Self {
        Self {
            kind: "RPC".to_string(),
            coefficients,
        }
    }
}

/// Resolve a raster reference against the metadata directory and check
/// that it exists.
pub fn resolve_raster(base_dir: &Path, name: &str) -> Result<PathBuf> {
    let joined = base_dir.join(name.trim());
    let path = if joined.is_absolute() {
        joined
    } else {
        std::env::current_dir()
            .map_err(|e| IngestionError::file_read(&joined, e))?
            .join(joined)
    };
    if path.is_file() {
        Ok(path)
    } else {
        Err(IngestionError::MissingRaster(path))
    }
}

/// Join a date and an optional time of day with a literal `T`.
pub fn join_date_time(date: Option<&str>, time: Option<&str>) -> Option<String> {
    let date = date.map(str::trim).filter(|d| !d.is_empty())?;
    match time.map(str::trim).filter(|t| !t.is_empty()) {
        Some(time) => Some(format!("{}T{}", date, time)),
        None => Some(date.to_string()),
    }
}
