//! Landsat-8 OLI/TIRS Level-1 (`*_MTL.txt`).
//!
//! One MTL file yields up to two products: the multispectral stack (bands
//! 1-7 and 9) and the panchromatic band 8. Corner coordinates are
//! mandatory since there is no other source for the footprint.

use imagery_common::ProductTag::{self, Ms, Pan, Pansharpened};
use imagery_common::{EpsgCode, Footprint, SpatialReference, TagSet, Vertex};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::descriptor::{
    band, template, AuxiliaryField, CapabilityDescriptor, DataSources, FieldType, ProductFilter,
};
use crate::detect::{read_prefix, DetectionResult, SIGNATURE_PREFIX_LEN};
use crate::document::{parse_field, read_text, MtlDocument};
use crate::error::{IngestionError, Result};
use crate::family::{SensorFamily, TagEnumeration};
use crate::item::{
    join_date_time, resolve_raster, BandProperty, BuiltItem, KeyProperties, RenderVariables,
};
use crate::registry::FamilyId;
use crate::task::CandidateTask;

const SIGNATURE: &str = "LANDSAT_8";

/// Landsat band numbers making up each product, in raster slot order.
const MS_BANDS: [u32; 8] = [1, 2, 3, 4, 5, 6, 7, 9];
const PAN_BANDS: [u32; 1] = [8];

/// Footprint corners in ring order.
const CORNERS: [&str; 4] = ["UL", "UR", "LR", "LL"];

const VARIABLES: RenderVariables = RenderVariables {
    default_maximum_input: 65535,
    default_gamma: 1.0,
};

pub static DESCRIPTOR: CapabilityDescriptor = CapabilityDescriptor {
    name: "Landsat-8",
    description: "Landsat-8 OLI Level-1 scenes described by MTL text metadata",
    builder_name: "Landsat8Builder",
    crawler_name: "Landsat8Crawler",
    data_source_filter: "*_MTL.txt",
    data_sources: DataSources {
        file: true,
        folder: true,
    },
    supports_orthorectification: false,
    enable_clip_to_footprint: true,
    is_raster_product: true,
    product_definition: "Landsat8",
    supported_products: &[ProductFilter {
        name: "Level1",
        allowed_products: &["L1T", "L1GT", "L1TP"],
    }],
    processing_templates: &[
        template("Multispectral", true, Some(Ms), Some(Ms), "stretch_ms.rft.xml"),
        template("Panchromatic", false, Some(Pan), Some(Pan), "stretch_pan.rft.xml"),
        template("Pansharpen", false, Some(Pansharpened), Some(Ms), "stretch_psh.rft.xml"),
    ],
    bands: &[
        band("CoastalAerosol", 0, 430.0, 450.0, Ms),
        band("Blue", 1, 450.0, 510.0, Ms),
        band("Green", 2, 530.0, 590.0, Ms),
        band("Red", 3, 640.0, 670.0, Ms),
        band("NearInfrared", 4, 850.0, 880.0, Ms),
        band("ShortWaveInfrared_1", 5, 1570.0, 1650.0, Ms),
        band("ShortWaveInfrared_2", 6, 2110.0, 2290.0, Ms),
        band("Cirrus", 7, 1360.0, 1380.0, Ms),
        band("Panchromatic", 0, 500.0, 680.0, Pan),
    ],
    fields: &[
        AuxiliaryField {
            name: "testField1",
            alias: "testField1",
            field_type: FieldType::Double,
            length: None,
            precision: Some(2),
        },
        AuxiliaryField {
            name: "testField2",
            alias: "testField2",
            field_type: FieldType::String,
            length: Some(4),
            precision: None,
        },
    ],
};

#[derive(Debug, Clone, Copy, Default)]
pub struct Landsat8Family;

impl Landsat8Family {
    pub fn new() -> Self {
        Self
    }

    fn tags(doc: &MtlDocument) -> TagSet {
        let mut tags = TagSet::new();
        if doc.contains("FILE_NAME_BAND_1") {
            tags.insert(Ms);
        }
        if doc.contains("FILE_NAME_BAND_8") {
            tags.insert(Pan);
        }
        tags
    }

    fn product_type(doc: &MtlDocument) -> Option<String> {
        doc.get("DATA_TYPE")
            .or_else(|| doc.get("PROCESSING_LEVEL"))
            .map(str::to_string)
    }

    fn footprint(doc: &MtlDocument) -> Result<Footprint> {
        let mut vertices = Vec::with_capacity(CORNERS.len());
        for corner in CORNERS {
            let x_key = format!("CORNER_{}_PROJECTION_X_PRODUCT", corner);
            let y_key = format!("CORNER_{}_PROJECTION_Y_PRODUCT", corner);
            let x = parse_field::<f64>(&x_key, Some(doc.require(&x_key)?))?;
            let y = parse_field::<f64>(&y_key, Some(doc.require(&y_key)?))?;
            match (x, y) {
                (Some(x), Some(y)) => vertices.push(Vertex::new(x, y)),
                _ => return Err(IngestionError::missing(format!("CORNER_{}_PROJECTION", corner))),
            }
        }
        Ok(Footprint::from_vertices(vertices))
    }

    fn bands_for(tag: ProductTag) -> &'static [u32] {
        match tag {
            Pan => &PAN_BANDS,
            _ => &MS_BANDS,
        }
    }

    fn raster_files(
        doc: &MtlDocument,
        base_dir: &Path,
        bands: &[u32],
    ) -> Result<BTreeMap<String, PathBuf>> {
        let mut rasters = BTreeMap::new();
        for (slot, band_no) in bands.iter().enumerate() {
            let key = format!("FILE_NAME_BAND_{}", band_no);
            let path = resolve_raster(base_dir, doc.require(&key)?)?;
            rasters.insert(format!("Raster{}", slot + 1), path);
        }
        Ok(rasters)
    }

    /// UTM/WGS84 scenes map to an EPSG code; anything else defers to the
    /// reference embedded in the first raster.
    fn spatial_reference(doc: &MtlDocument, first_raster: Option<&PathBuf>) -> Result<SpatialReference> {
        let is_utm = doc.get("MAP_PROJECTION") == Some("UTM");
        let is_wgs84 = doc.get("DATUM") == Some("WGS84");
        if is_utm && is_wgs84 {
            if let Some(zone) = parse_field::<u8>("UTM_ZONE", doc.get("UTM_ZONE"))? {
                // Level-1 products use northern zones even south of the
                // equator, with negative northings.
                let code = EpsgCode::utm_wgs84(zone, true).map_err(|_| IngestionError::InvalidValue {
                    field: "UTM_ZONE".into(),
                    value: zone.to_string(),
                })?;
                return Ok(SpatialReference::Epsg(code));
            }
        }
        Ok(first_raster
            .map(|p| SpatialReference::RasterDerived(p.clone()))
            .unwrap_or_default())
    }

    fn band_properties(
        &self,
        doc: &MtlDocument,
        tag: ProductTag,
        bands: &[u32],
    ) -> Result<Vec<BandProperty>> {
        let mut properties = Vec::with_capacity(bands.len());
        for (index, band_no) in bands.iter().enumerate() {
            let field = |prefix: &str| {
                let key = format!("{}_BAND_{}", prefix, band_no);
                parse_field::<f64>(&key, doc.get(&key))
            };
            let index = index as u32;
            properties.push(BandProperty {
                band_name: DESCRIPTOR.band_at(tag, index).map(|b| b.name.to_string()),
                band_index: Some(index),
                radiance_gain: field("RADIANCE_MULT")?,
                radiance_bias: field("RADIANCE_ADD")?,
                reflectance_gain: field("REFLECTANCE_MULT")?,
                reflectance_bias: field("REFLECTANCE_ADD")?,
                unit: None,
            });
        }
        Ok(properties)
    }

    fn key_properties(&self, doc: &MtlDocument, task: &CandidateTask, bands: &[u32]) -> Result<KeyProperties> {
        let f = |key: &str| parse_field::<f64>(key, doc.get(key));
        Ok(KeyProperties {
            sensor_name: Some("Landsat 8".to_string()),
            product_type: task
                .product_type_hint
                .clone()
                .or_else(|| Self::product_type(doc)),
            acquisition_date: join_date_time(doc.get("DATE_ACQUIRED"), doc.get("SCENE_CENTER_TIME")),
            sun_elevation: f("SUN_ELEVATION")?,
            sun_azimuth: f("SUN_AZIMUTH")?,
            sun_distance: f("EARTH_SUN_DISTANCE")?,
            cloud_cover: f("CLOUD_COVER")?,
            instrument: doc.get("SENSOR_ID").map(str::to_string),
            band_properties: self.band_properties(doc, task.product_tag, bands)?,
            ..Default::default()
        })
    }
}

/// Signature test over the same leading window `probe` reads.
fn has_signature(text: &str) -> bool {
    let head = &text.as_bytes()[..text.len().min(SIGNATURE_PREFIX_LEN)];
    head.windows(SIGNATURE.len())
        .any(|window| window == SIGNATURE.as_bytes())
}

impl SensorFamily for Landsat8Family {
    fn id(&self) -> FamilyId {
        FamilyId::Landsat8
    }

    fn descriptor(&self) -> &'static CapabilityDescriptor {
        &DESCRIPTOR
    }

    fn metadata_suffix(&self) -> &'static str {
        "_mtl.txt"
    }

    fn probe(&self, path: &Path) -> Result<DetectionResult> {
        let prefix = read_prefix(path, SIGNATURE_PREFIX_LEN)?;
        if !prefix.contains(SIGNATURE) {
            return Ok(DetectionResult::no_match());
        }
        let doc = MtlDocument::from_path(path)?;
        Ok(DetectionResult::matched(Self::tags(&doc)))
    }

    fn enumerate_tags(&self, path: &Path) -> Result<TagEnumeration> {
        let text = read_text(path)?;
        if !has_signature(&text) {
            return Ok(TagEnumeration::default());
        }
        let doc = MtlDocument::parse(&text).map_err(|e| IngestionError::document(path, e))?;
        Ok(TagEnumeration::new(Self::tags(&doc), Self::product_type(&doc)))
    }

    fn try_build(&self, task: &CandidateTask) -> Result<Option<BuiltItem>> {
        let doc = MtlDocument::from_path(&task.source_path)?;
        if !Self::tags(&doc).contains(task.product_tag) {
            return Ok(None);
        }

        let footprint = Self::footprint(&doc)?;
        let bands = Self::bands_for(task.product_tag);
        let raster_files = Self::raster_files(&doc, task.base_dir(), bands)?;
        let spatial_reference = Self::spatial_reference(&doc, raster_files.get("Raster1"))?;

        Ok(Some(BuiltItem {
            spatial_reference,
            raster_files,
            footprint,
            key_properties: self.key_properties(&doc, task, bands)?,
            source_tag: task.product_tag,
            item_uri: task.clone(),
            variables: Some(VARIABLES),
            geodata_transform: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> MtlDocument {
        MtlDocument::parse(text).unwrap()
    }

    #[test]
    fn test_tags_from_file_names() {
        let both = doc("FILE_NAME_BAND_1 = \"b1.TIF\"\nFILE_NAME_BAND_8 = \"b8.TIF\"\n");
        let tags: Vec<_> = Landsat8Family::tags(&both).iter().collect();
        assert_eq!(tags, vec![Ms, Pan]);

        let pan_only = doc("FILE_NAME_BAND_8 = \"b8.TIF\"\n");
        assert_eq!(Landsat8Family::tags(&pan_only), TagSet::single(Pan));
    }

    #[test]
    fn test_utm_spatial_reference() {
        let mtl = doc("MAP_PROJECTION = \"UTM\"\nDATUM = \"WGS84\"\nUTM_ZONE = 33\n");
        let srs = Landsat8Family::spatial_reference(&mtl, None).unwrap();
        assert_eq!(srs, SpatialReference::Epsg(EpsgCode(32633)));
    }

    #[test]
    fn test_polar_falls_back_to_raster() {
        let mtl = doc("MAP_PROJECTION = \"PS\"\nDATUM = \"WGS84\"\n");
        let raster = PathBuf::from("/scene/b1.TIF");
        let srs = Landsat8Family::spatial_reference(&mtl, Some(&raster)).unwrap();
        assert_eq!(srs, SpatialReference::RasterDerived(raster));
        assert_eq!(
            Landsat8Family::spatial_reference(&mtl, None).unwrap(),
            SpatialReference::Unresolved
        );
    }

    #[test]
    fn test_missing_corner_is_mandatory() {
        let mtl = doc(
            "CORNER_UL_PROJECTION_X_PRODUCT = 1\nCORNER_UL_PROJECTION_Y_PRODUCT = 2\n\
             CORNER_UR_PROJECTION_X_PRODUCT = 3\nCORNER_UR_PROJECTION_Y_PRODUCT = 4\n\
             CORNER_LR_PROJECTION_X_PRODUCT = 5\n",
        );
        let err = Landsat8Family::footprint(&mtl).unwrap_err();
        assert!(matches!(err, IngestionError::MissingMetadata(ref key) if key == "CORNER_LR_PROJECTION_Y_PRODUCT"));
    }
}
