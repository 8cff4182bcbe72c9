//! Generic DIMAP (`.dim`) family.
//!
//! DEIMOS-1, DEIMOS-2, DZZ-HR and NigeriaSat-2 all ship DIMAP style XML
//! with small differences in where the spatial reference, data file and
//! frame live. Those differences are captured in a static [`DimapProfile`];
//! the parsing itself is shared.

use imagery_common::{EpsgCode, Footprint, ProductTag, SpatialReference, TagSet, Vertex};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::descriptor::CapabilityDescriptor;
use crate::detect::DetectionResult;
use crate::document::{parse_field, read_text, XmlDocument, XmlElement};
use crate::error::{IngestionError, Result};
use crate::family::{SensorFamily, TagEnumeration};
use crate::item::{join_date_time, resolve_raster, BandProperty, BuiltItem, KeyProperties, RenderVariables};
use crate::registry::FamilyId;
use crate::task::CandidateTask;

pub const HORIZONTAL_CS_CODE: &str = "Coordinate_Reference_System/Horizontal_CS/HORIZONTAL_CS_CODE";
pub const PROJECTION_WKT: &str = "Coordinate_Reference_System/PROJECTION";
pub const SOURCE_OGC_WKT: &str =
    "Dataset_Sources/Source_Information/Coordinate_Reference_System/Projection_OGCWKT";
pub const DATA_FILE_HREF: &str = "Data_Access/Data_File/DATA_FILE_PATH";
pub const DATA_FILE_LIST: &str = "Data_Access/Data_File_List/DATA_FILE_PATH";

const NBANDS: &str = "Raster_Dimensions/NBANDS";
const PRODUCT_TYPE: &str = "Production/PRODUCT_TYPE";
const BANDS: &str = "Image_Interpretation/*";
const SCENE_SOURCE: &str = "Dataset_Sources/Source_Information/Scene_Source";
const QUALITY: &str = "Dataset_Sources/Source_Information/Quality_Assessment/*";

/// A place a spatial reference may be declared.
#[derive(Debug, Clone, Copy)]
pub enum SrsSource {
    /// Element text holding an EPSG code string.
    Epsg(&'static str),
    /// Element text holding OGC WKT.
    Wkt(&'static str),
}

/// A place the primary data file may be referenced.
#[derive(Debug, Clone, Copy)]
pub enum DataFileSource {
    /// `href` attribute of the element.
    Href(&'static str),
    /// Text of the element.
    Text(&'static str),
}

/// Per-mission differences between DIMAP dialects.
pub struct DimapProfile {
    pub family: FamilyId,
    pub sensor_name: &'static str,
    /// Mission marker test over the raw document text.
    pub signature: fn(&str) -> bool,
    /// Tried in order; the first usable entry wins.
    pub srs_chain: &'static [SrsSource],
    pub data_file: &'static [DataFileSource],
    /// Path to the elements carrying `FRAME_X` / `FRAME_Y`.
    pub frame_vertices: &'static str,
    /// Tag assumed when the document declares no band count.
    pub undeclared_bands: Option<ProductTag>,
    pub variables: Option<RenderVariables>,
    pub descriptor: &'static CapabilityDescriptor,
}

impl fmt::Debug for DimapProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DimapProfile")
            .field("family", &self.family)
            .field("sensor_name", &self.sensor_name)
            .field("frame_vertices", &self.frame_vertices)
            .finish_non_exhaustive()
    }
}

/// A DIMAP family driven by its profile.
#[derive(Debug, Clone, Copy)]
pub struct DimapFamily {
    profile: &'static DimapProfile,
}

impl DimapFamily {
    pub const fn new(profile: &'static DimapProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &'static DimapProfile {
        self.profile
    }

    /// Parse `path` if it carries this mission's markers, `None` otherwise.
    /// Markers can sit anywhere in the document, so the whole file is read.
    fn member_document(&self, path: &Path) -> Result<Option<XmlDocument>> {
        let text = read_text(path)?;
        if !(self.profile.signature)(&text) {
            return Ok(None);
        }
        XmlDocument::parse(&text)
            .map(Some)
            .map_err(|e| IngestionError::document(path, e))
    }

    /// Tags implied by every declared `NBANDS`, or `None` when the document
    /// declares no band count at all.
    fn declared_tags(&self, doc: &XmlDocument) -> Result<Option<TagSet>> {
        let mut declared = false;
        let mut tags = TagSet::new();
        for element in doc.find_all(NBANDS) {
            if let Some(count) = parse_field::<u32>("NBANDS", element.text())? {
                declared = true;
                tags.extend(TagSet::from_band_count(count));
            }
        }
        Ok(declared.then_some(tags))
    }

    fn supported_tags(&self, doc: &XmlDocument) -> Result<TagSet> {
        Ok(match self.declared_tags(doc)? {
            Some(tags) => tags,
            None => self
                .profile
                .undeclared_bands
                .map(TagSet::single)
                .unwrap_or_default(),
        })
    }

    fn resolve_srs(&self, doc: &XmlDocument, path: &Path) -> SpatialReference {
        for source in self.profile.srs_chain {
            match *source {
                SrsSource::Epsg(location) => {
                    let Some(raw) = doc.child_text(location) else {
                        continue;
                    };
                    match EpsgCode::from_code_string(raw) {
                        Ok(code) => return SpatialReference::Epsg(code),
                        Err(err) => warn!(
                            family = %self.profile.family,
                            path = %path.display(),
                            location,
                            error = %err,
                            "Ignoring unusable EPSG code"
                        ),
                    }
                }
                SrsSource::Wkt(location) => {
                    if let Some(wkt) = doc.child_text(location) {
                        return SpatialReference::Wkt(wkt.to_string());
                    }
                }
            }
        }
        debug!(path = %path.display(), "No spatial reference declared");
        SpatialReference::Unresolved
    }

    fn data_file<'d>(&self, doc: &'d XmlDocument) -> Option<&'d str> {
        self.profile.data_file.iter().find_map(|source| match *source {
            DataFileSource::Href(location) => doc
                .find(location)
                .and_then(|e| e.attr("href"))
                .map(str::trim)
                .filter(|s| !s.is_empty()),
            DataFileSource::Text(location) => doc.child_text(location),
        })
    }

    fn footprint(&self, doc: &XmlDocument) -> Result<Footprint> {
        let mut vertices = Vec::new();
        for vertex in doc.find_all(self.profile.frame_vertices) {
            let x = parse_field::<f64>("FRAME_X", vertex.child_text("FRAME_X"))?;
            let y = parse_field::<f64>("FRAME_Y", vertex.child_text("FRAME_Y"))?;
            if let (Some(x), Some(y)) = (x, y) {
                vertices.push(Vertex::new(x, y));
            }
        }
        Ok(Footprint::from_vertices(vertices))
    }

    fn key_properties(&self, doc: &XmlDocument, task: &CandidateTask) -> Result<KeyProperties> {
        let mut props = KeyProperties {
            sensor_name: Some(self.profile.sensor_name.to_string()),
            product_type: task
                .product_type_hint
                .clone()
                .or_else(|| doc.child_text(PRODUCT_TYPE).map(str::to_string)),
            ..Default::default()
        };

        if let Some(scene) = doc.find(SCENE_SOURCE) {
            apply_scene(&mut props, scene)?;
        }

        for parameter in doc.find_all(QUALITY) {
            let Some(code) = parameter.child_text("QUALITY_PARAMETER_CODE") else {
                continue;
            };
            let value = parameter.child_text("QUALITY_PARAMETER_VALUE");
            if code.contains("SENSOR_AZIMUTH") {
                props.sensor_azimuth = parse_field(code, value)?;
            } else if code.contains("SENSOR_ELEVATION") {
                props.sensor_elevation = parse_field(code, value)?;
            }
        }

        for element in doc.find_all(BANDS) {
            let band = band_property(element)?;
            if !band.is_empty() {
                props.band_properties.push(band);
            }
        }

        Ok(props)
    }
}

fn apply_scene(props: &mut KeyProperties, scene: &XmlElement) -> Result<()> {
    let f = |name: &str| parse_field::<f64>(name, scene.child_text(name));

    props.sun_elevation = f("SUN_ELEVATION")?;
    props.sun_azimuth = f("SUN_AZIMUTH")?;
    props.sun_distance = f("EARTH_SUN_DISTANCE")?;
    props.off_nadir = match f("SENSOR_VIEWING")? {
        Some(angle) => Some(angle),
        None => f("VIEWING_ANGLE")?,
    };
    props.incidence_angle = f("INCIDENCE_ANGLE")?;
    props.viewing_angle_along_track = f("VIEWING_ANGLE_ALONG_TRACK")?;
    props.viewing_angle_across_track = f("VIEWING_ANGLE_ACROSS_TRACK")?;
    props.theoretical_resolution = f("THEORETICAL_RESOLUTION")?;
    props.acquisition_date = join_date_time(
        scene.child_text("IMAGING_DATE"),
        scene.child_text("IMAGING_TIME"),
    );
    props.instrument = scene.child_text("INSTRUMENT").map(str::to_string);
    Ok(())
}

fn band_property(element: &XmlElement) -> Result<BandProperty> {
    Ok(BandProperty {
        band_name: element.child_text("BAND_DESCRIPTION").map(canonical_band_name),
        band_index: parse_field("BAND_INDEX", element.child_text("BAND_INDEX"))?,
        radiance_gain: parse_field("PHYSICAL_GAIN", element.child_text("PHYSICAL_GAIN"))?,
        radiance_bias: parse_field("PHYSICAL_BIAS", element.child_text("PHYSICAL_BIAS"))?,
        unit: element.child_text("PHYSICAL_UNIT").map(str::to_string),
        ..Default::default()
    })
}

/// Map DIMAP band descriptions onto descriptor band names.
pub fn canonical_band_name(description: &str) -> String {
    match description.trim().to_ascii_uppercase().as_str() {
        "NIR" => "NearInfrared".to_string(),
        "PAN" => "Panchromatic".to_string(),
        "RED" => "Red".to_string(),
        "GREEN" => "Green".to_string(),
        "BLUE" => "Blue".to_string(),
        _ => description.trim().to_string(),
    }
}

impl SensorFamily for DimapFamily {
    fn id(&self) -> FamilyId {
        self.profile.family
    }

    fn descriptor(&self) -> &'static CapabilityDescriptor {
        self.profile.descriptor
    }

    fn metadata_suffix(&self) -> &'static str {
        ".dim"
    }

    fn probe(&self, path: &Path) -> Result<DetectionResult> {
        let Some(doc) = self.member_document(path)? else {
            return Ok(DetectionResult::no_match());
        };
        Ok(DetectionResult::matched(self.declared_tags(&doc)?.unwrap_or_default()))
    }

    fn enumerate_tags(&self, path: &Path) -> Result<TagEnumeration> {
        let Some(doc) = self.member_document(path)? else {
            return Ok(TagEnumeration::default());
        };
        Ok(TagEnumeration::new(
            self.supported_tags(&doc)?,
            doc.child_text(PRODUCT_TYPE).map(str::to_string),
        ))
    }

    fn try_build(&self, task: &CandidateTask) -> Result<Option<BuiltItem>> {
        let path = task.source_path.as_path();
        let doc = XmlDocument::from_path(path)?;

        if let Some(declared) = self.declared_tags(&doc)? {
            if !declared.contains(task.product_tag) {
                return Ok(None);
            }
        }

        let spatial_reference = self.resolve_srs(&doc, path);

        let data_file = self
            .data_file(&doc)
            .ok_or_else(|| IngestionError::missing("DATA_FILE_PATH"))?;
        let raster = resolve_raster(task.base_dir(), data_file)?;
        let raster_files = BTreeMap::from([("Raster1".to_string(), raster)]);

        let footprint = self.footprint(&doc)?;
        if footprint.is_empty() {
            debug!(path = %path.display(), "Frame incomplete, footprint left empty");
        }

        Ok(Some(BuiltItem {
            spatial_reference,
            raster_files,
            footprint,
            key_properties: self.key_properties(&doc, task)?,
            source_tag: task.product_tag,
            item_uri: task.clone(),
            variables: self.profile.variables,
            geodata_transform: None,
        }))
    }
}
