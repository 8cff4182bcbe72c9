//! PlanetLabs scene records (GeoJSON feature per scene).

use chrono::{DateTime, Utc};
use imagery_common::ProductTag::Ms;
use imagery_common::{EpsgCode, Footprint, SpatialReference, TagSet, Vertex};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::descriptor::{band, template, AuxiliaryField, CapabilityDescriptor, DataSources, ProductFilter};
use crate::detect::DetectionResult;
use crate::document::{parse_field, read_text, JsonDocument};
use crate::error::{IngestionError, Result};
use crate::family::{SensorFamily, TagEnumeration};
use crate::item::{
    join_date_time, resolve_raster, BuiltItem, CameraProperties, GeodataTransform, KeyProperties,
};
use crate::registry::FamilyId;
use crate::task::CandidateTask;

pub const ANALYTIC: &str = "analytic";
pub const VISUAL: &str = "visual";
pub const UNRECTIFIED: &str = "unrectified";

pub static DESCRIPTOR: CapabilityDescriptor = CapabilityDescriptor {
    name: "PlanetLabs",
    description: "PlanetLabs scenes described by JSON feature metadata",
    builder_name: "PlanetLabsBuilder",
    crawler_name: "PlanetLabsCrawler",
    data_source_filter: "*.json",
    data_sources: DataSources {
        file: true,
        folder: true,
    },
    supports_orthorectification: true,
    enable_clip_to_footprint: true,
    is_raster_product: true,
    product_definition: "PlanetLabs_3BANDS",
    supported_products: &[ProductFilter {
        name: "Product",
        allowed_products: &[ANALYTIC, VISUAL, UNRECTIFIED],
    }],
    processing_templates: &[template("Multispectral", true, Some(Ms), Some(Ms), "stretch_ms.rft.xml")],
    bands: &[
        band("Blue", 3, 420.0, 530.0, Ms),
        band("Green", 2, 500.0, 590.0, Ms),
        band("Red", 1, 610.0, 700.0, Ms),
    ],
    fields: &[AuxiliaryField::string("ProductType", "Product Type", 50)],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanetLabsFamily;

impl PlanetLabsFamily {
    pub fn new() -> Self {
        Self
    }

    /// Scene records carry both an acquisition time and a camera block.
    fn is_scene(doc: &JsonDocument) -> bool {
        doc.value_at("/properties/acquired").is_some()
            && doc.value_at("/properties/camera").is_some()
    }

    fn scene_id(doc: &JsonDocument) -> Result<&str> {
        doc.str_at("/id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| IngestionError::missing("id"))
    }

    /// Product variant delivered next to the record, judged from the
    /// `{id}_*.tif` siblings.
    pub fn product_type(dir: &Path, scene_id: &str) -> Result<&'static str> {
        let prefix = format!("{}_", scene_id).to_lowercase();
        let entries = std::fs::read_dir(dir).map_err(|e| IngestionError::file_read(dir, e))?;

        let mut siblings = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| IngestionError::file_read(dir, e))?;
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if name.starts_with(&prefix) && name.ends_with(".tif") {
                siblings.push(name);
            }
        }

        let has = |marker: &str| siblings.iter().any(|n| n.contains(marker));
        Ok(if has("_unrectified") {
            UNRECTIFIED
        } else if has("_visual") {
            VISUAL
        } else {
            ANALYTIC
        })
    }

    fn footprint(doc: &JsonDocument) -> Result<Footprint> {
        let Some(coordinates) = doc.value_at("/geometry/coordinates") else {
            return Ok(Footprint::empty());
        };
        let outer = match doc.str_at("/geometry/type") {
            Some("MultiPolygon") => coordinates.pointer("/0/0"),
            _ => coordinates.pointer("/0"),
        };
        let Some(ring) = outer.and_then(Value::as_array) else {
            return Ok(Footprint::empty());
        };

        let mut vertices = Vec::with_capacity(ring.len());
        for position in ring {
            let x = position.get(0).and_then(Value::as_f64);
            let y = position.get(1).and_then(Value::as_f64);
            match (x, y) {
                (Some(x), Some(y)) => vertices.push(Vertex::new(x, y)),
                _ => {
                    return Err(IngestionError::InvalidValue {
                        field: "geometry.coordinates".into(),
                        value: position.to_string(),
                    })
                }
            }
        }
        Ok(Footprint::from_vertices(vertices))
    }

    /// `acquired` as `YYYY-MM-DD` and `HH:MM:SS[.fff]` in UTC.
    fn acquisition(doc: &JsonDocument) -> Result<Option<String>> {
        let Some(raw) = doc.str_at("/properties/acquired") else {
            return Ok(None);
        };
        let acquired = DateTime::parse_from_rfc3339(raw.trim())
            .map_err(|_| IngestionError::InvalidValue {
                field: "properties.acquired".into(),
                value: raw.to_string(),
            })?
            .with_timezone(&Utc);
        let date = acquired.format("%Y-%m-%d").to_string();
        let time = acquired.format("%H:%M:%S%.f").to_string();
        Ok(join_date_time(Some(&date), Some(&time)))
    }

    fn camera(doc: &JsonDocument) -> Option<CameraProperties> {
        let camera = CameraProperties {
            bit_depth: doc.u64_at("/properties/camera/bit_depth"),
            color_mode: doc.str_at("/properties/camera/color_mode").map(str::to_string),
            exposure_time: doc.f64_at("/properties/camera/exposure_time"),
            gain: doc.f64_at("/properties/camera/gain"),
            tdi_pulses: doc.u64_at("/properties/camera/tdi_pulses"),
        };
        (!camera.is_empty()).then_some(camera)
    }

    /// Coefficients from an optional `{id}_rpc.txt` sidecar of
    /// `NAME: value` lines, in file order.
    fn rpc(dir: &Path, scene_id: &str) -> Result<Option<GeodataTransform>> {
        let path = dir.join(format!("{}_rpc.txt", scene_id));
        if !path.is_file() {
            return Ok(None);
        }
        let text = read_text(&path)?;
        let mut coefficients = Vec::new();
        for line in text.lines() {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            // Values may carry a trailing unit ("3505.00 pixels")
            let number = value.split_whitespace().next();
            if let Some(v) = parse_field::<f64>(name.trim(), number)? {
                coefficients.push(v);
            }
        }
        debug!(path = %path.display(), count = coefficients.len(), "Read RPC coefficients");
        Ok((!coefficients.is_empty()).then(|| GeodataTransform::rpc(coefficients)))
    }
}

impl SensorFamily for PlanetLabsFamily {
    fn id(&self) -> FamilyId {
        FamilyId::PlanetLabs
    }

    fn descriptor(&self) -> &'static CapabilityDescriptor {
        &DESCRIPTOR
    }

    fn metadata_suffix(&self) -> &'static str {
        ".json"
    }

    fn probe(&self, path: &Path) -> Result<DetectionResult> {
        let doc = JsonDocument::from_path(path)?;
        Ok(if Self::is_scene(&doc) {
            DetectionResult::matched(TagSet::single(Ms))
        } else {
            DetectionResult::no_match()
        })
    }

    fn enumerate_tags(&self, path: &Path) -> Result<TagEnumeration> {
        let doc = JsonDocument::from_path(path)?;
        if !Self::is_scene(&doc) {
            return Ok(TagEnumeration::default());
        }
        let scene_id = Self::scene_id(&doc)?;
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let product_type = Self::product_type(dir, scene_id)?;
        Ok(TagEnumeration::new(
            TagSet::single(Ms),
            Some(product_type.to_string()),
        ))
    }

    fn try_build(&self, task: &CandidateTask) -> Result<Option<BuiltItem>> {
        if task.product_tag != Ms {
            return Ok(None);
        }
        let doc = JsonDocument::from_path(&task.source_path)?;
        let scene_id = Self::scene_id(&doc)?;
        let base_dir = task.base_dir();

        let product_type = match &task.product_type_hint {
            Some(hint) => hint.clone(),
            None => Self::product_type(base_dir, scene_id)?.to_string(),
        };
        let raster = resolve_raster(base_dir, &format!("{}_{}.tif", scene_id, product_type))?;

        let key_properties = KeyProperties {
            sensor_name: Some("PlanetLabs".to_string()),
            product_type: Some(product_type),
            acquisition_date: Self::acquisition(&doc)?,
            sun_elevation: doc.f64_at("/properties/sun/altitude"),
            sun_azimuth: doc.f64_at("/properties/sun/azimuth"),
            cloud_cover: doc.f64_at("/properties/cloud_cover"),
            instrument: doc.str_at("/properties/satellite_id").map(str::to_string),
            camera: Self::camera(&doc),
            ..Default::default()
        };

        Ok(Some(BuiltItem {
            spatial_reference: SpatialReference::Epsg(EpsgCode::WGS84),
            raster_files: BTreeMap::from([("Raster1".to_string(), raster)]),
            footprint: Self::footprint(&doc)?,
            key_properties,
            source_tag: task.product_tag,
            item_uri: task.clone(),
            variables: None,
            geodata_transform: Self::rpc(base_dir, scene_id)?,
        }))
    }
}
