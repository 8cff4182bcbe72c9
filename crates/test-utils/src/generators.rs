//! Builders that write synthetic product directories.
//!
//! Each builder starts from a complete, well-formed document for its format
//! and lets a test knock fields out or override them before writing the
//! metadata (and optionally empty raster files) into a temp directory.

use serde_json::{json, Value};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::fixtures::{frame, scene, srs, FOUR_BANDS};

/// Create an empty file, including parent directories.
pub fn touch(path: &Path) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, b"").expect("write empty file");
    path.to_path_buf()
}

/// Create (if needed) and return `root/name`.
pub fn scene_dir(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("create scene directory");
    dir
}

// ============================================================================
// DIMAP XML
// ============================================================================

/// Where the DIMAP document points at its image.
#[derive(Debug, Clone)]
pub enum DataFileRef {
    /// `Data_Access/Data_File/DATA_FILE_PATH@href`
    Href(String),
    /// `Data_Access/Data_File_List/DATA_FILE_PATH` text
    ListText(String),
}

impl DataFileRef {
    pub fn name(&self) -> &str {
        match self {
            DataFileRef::Href(name) | DataFileRef::ListText(name) => name,
        }
    }
}

/// One `Spectral_Band_Info` entry. `None` fields are left out.
#[derive(Debug, Clone, Default)]
pub struct DimBand {
    pub index: Option<u32>,
    pub description: Option<String>,
    pub gain: Option<f64>,
    pub bias: Option<f64>,
    pub unit: Option<String>,
}

/// Builder for DIMAP `.dim` documents.
#[derive(Debug, Clone)]
pub struct DimBuilder {
    mission: String,
    mission_index: Option<String>,
    nbands: Vec<u32>,
    product_type: Option<String>,
    horizontal_cs_code: Option<String>,
    projection: Option<String>,
    source_wkt: Option<String>,
    data_file: Option<DataFileRef>,
    vertices: Vec<(Option<f64>, Option<f64>)>,
    nested_vertices: bool,
    bands: Vec<DimBand>,
    scene: Vec<(String, String)>,
    quality: Vec<(String, String)>,
}

impl DimBuilder {
    /// Bare document with only the mission markers set.
    pub fn new(mission: &str, mission_index: Option<&str>) -> Self {
        Self {
            mission: mission.to_string(),
            mission_index: mission_index.map(str::to_string),
            nbands: Vec::new(),
            product_type: None,
            horizontal_cs_code: None,
            projection: None,
            source_wkt: None,
            data_file: None,
            vertices: Vec::new(),
            nested_vertices: false,
            bands: Vec::new(),
            scene: Vec::new(),
            quality: Vec::new(),
        }
    }

    /// A complete 4-band DEIMOS-2 multispectral scene.
    pub fn deimos2() -> Self {
        Self::new("Deimos 2", Some("2"))
            .four_band_defaults()
            .projection_wkt(srs::UTM_30N_WKT)
    }

    /// A complete 3-band DEIMOS-1 scene.
    pub fn deimos1() -> Self {
        let mut builder = Self::new("DEIMOS", Some("1"))
            .four_band_defaults()
            .nbands(3)
            .epsg(srs::UTM_30N_CODE)
            .quality("SENSOR_AZIMUTH", "101.5")
            .quality("SENSOR_ELEVATION", "78.25");
        builder.bands.truncate(3);
        builder
    }

    /// A complete DZZ-HR scene using the list/nested-vertex layout.
    pub fn dzz_hr() -> Self {
        Self::new("DZZ-HR", None)
            .four_band_defaults()
            .data_file(DataFileRef::ListText("IMAGERY.TIF".into()))
            .nested_vertices(true)
            .epsg(srs::UTM_30N_CODE)
            .scene_field("VIEWING_ANGLE_ALONG_TRACK", "3.1")
            .scene_field("VIEWING_ANGLE_ACROSS_TRACK", "-7.4")
            .scene_field("THEORETICAL_RESOLUTION", "6.5")
    }

    /// A complete NigeriaSat-2 scene.
    pub fn nigeriasat2() -> Self {
        Self::new("NIGERIASAT", Some("2"))
            .four_band_defaults()
            .projection_wkt(srs::UTM_30N_WKT)
            .scene_field("INCIDENCE_ANGLE", "14.8")
    }

    fn four_band_defaults(mut self) -> Self {
        self.nbands = vec![4];
        self.product_type = Some("L1C".into());
        self.data_file = Some(DataFileRef::Href("IMAGE.TIF".into()));
        self = self.frame(&frame::MADRID);
        self.bands = FOUR_BANDS
            .iter()
            .enumerate()
            .map(|(i, (desc, gain, bias))| DimBand {
                index: Some(i as u32),
                description: Some(desc.to_string()),
                gain: Some(*gain),
                bias: Some(*bias),
                unit: Some("W/m2/sr/um".into()),
            })
            .collect();
        self.scene = vec![
            ("SUN_ELEVATION".into(), scene::SUN_ELEVATION.to_string()),
            ("SUN_AZIMUTH".into(), scene::SUN_AZIMUTH.to_string()),
            ("IMAGING_DATE".into(), scene::IMAGING_DATE.into()),
            ("IMAGING_TIME".into(), scene::IMAGING_TIME.into()),
            ("VIEWING_ANGLE".into(), scene::VIEWING_ANGLE.to_string()),
            ("INSTRUMENT".into(), scene::INSTRUMENT.into()),
        ];
        self
    }

    /// Declare a single `NBANDS`.
    pub fn nbands(mut self, count: u32) -> Self {
        self.nbands = vec![count];
        self
    }

    /// Declare one `Raster_Dimensions` block per count.
    pub fn nbands_list(mut self, counts: &[u32]) -> Self {
        self.nbands = counts.to_vec();
        self
    }

    pub fn product_type(mut self, product_type: &str) -> Self {
        self.product_type = Some(product_type.into());
        self
    }

    pub fn epsg(mut self, code: &str) -> Self {
        self.horizontal_cs_code = Some(code.into());
        self
    }

    pub fn projection_wkt(mut self, wkt: &str) -> Self {
        self.projection = Some(wkt.into());
        self
    }

    pub fn source_wkt(mut self, wkt: &str) -> Self {
        self.source_wkt = Some(wkt.into());
        self
    }

    pub fn no_spatial_reference(mut self) -> Self {
        self.horizontal_cs_code = None;
        self.projection = None;
        self.source_wkt = None;
        self
    }

    pub fn data_file(mut self, data_file: DataFileRef) -> Self {
        self.data_file = Some(data_file);
        self
    }

    pub fn no_data_file(mut self) -> Self {
        self.data_file = None;
        self
    }

    pub fn frame(mut self, vertices: &[(f64, f64)]) -> Self {
        self.vertices = vertices.iter().map(|&(x, y)| (Some(x), Some(y))).collect();
        self
    }

    /// Append a vertex that may lack a coordinate.
    pub fn raw_vertex(mut self, x: Option<f64>, y: Option<f64>) -> Self {
        self.vertices.push((x, y));
        self
    }

    pub fn nested_vertices(mut self, nested: bool) -> Self {
        self.nested_vertices = nested;
        self
    }

    pub fn bands(mut self, bands: Vec<DimBand>) -> Self {
        self.bands = bands;
        self
    }

    pub fn scene_field(mut self, name: &str, value: &str) -> Self {
        self.scene.retain(|(n, _)| n != name);
        self.scene.push((name.into(), value.into()));
        self
    }

    pub fn without_scene_field(mut self, name: &str) -> Self {
        self.scene.retain(|(n, _)| n != name);
        self
    }

    pub fn quality(mut self, code: &str, value: &str) -> Self {
        self.quality.push((code.into(), value.into()));
        self
    }

    /// Name of the referenced image, if any.
    pub fn data_file_name(&self) -> Option<&str> {
        self.data_file.as_ref().map(DataFileRef::name)
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Dimap_Document>\n");

        xml.push_str("  <Dataset_Id><DATASET_NAME>synthetic</DATASET_NAME></Dataset_Id>\n");

        if self.horizontal_cs_code.is_some() || self.projection.is_some() {
            xml.push_str("  <Coordinate_Reference_System>\n");
            if let Some(code) = &self.horizontal_cs_code {
                let _ = writeln!(
                    xml,
                    "    <Horizontal_CS><HORIZONTAL_CS_CODE>{}</HORIZONTAL_CS_CODE></Horizontal_CS>",
                    code
                );
            }
            if let Some(wkt) = &self.projection {
                let _ = writeln!(xml, "    <PROJECTION>{}</PROJECTION>", escape(wkt));
            }
            xml.push_str("  </Coordinate_Reference_System>\n");
        }

        if let Some(product_type) = &self.product_type {
            let _ = writeln!(
                xml,
                "  <Production><PRODUCT_TYPE>{}</PRODUCT_TYPE></Production>",
                product_type
            );
        }

        match &self.data_file {
            Some(DataFileRef::Href(name)) => {
                let _ = writeln!(
                    xml,
                    "  <Data_Access><Data_File><DATA_FILE_PATH href=\"{}\"/></Data_File></Data_Access>",
                    name
                );
            }
            Some(DataFileRef::ListText(name)) => {
                let _ = writeln!(
                    xml,
                    "  <Data_Access><Data_File_List><DATA_FILE_PATH>{}</DATA_FILE_PATH></Data_File_List></Data_Access>",
                    name
                );
            }
            None => xml.push_str("  <Data_Access/>\n"),
        }

        for count in &self.nbands {
            let _ = writeln!(
                xml,
                "  <Raster_Dimensions><NCOLS>1000</NCOLS><NROWS>1000</NROWS><NBANDS>{}</NBANDS></Raster_Dimensions>",
                count
            );
        }

        xml.push_str("  <Dataset_Frame>\n");
        if self.nested_vertices {
            xml.push_str("    <VERTEX>\n");
        }
        for (x, y) in &self.vertices {
            xml.push_str(if self.nested_vertices { "      <Point>" } else { "    <Vertex>" });
            if let Some(x) = x {
                let _ = write!(xml, "<FRAME_X>{}</FRAME_X>", x);
            }
            if let Some(y) = y {
                let _ = write!(xml, "<FRAME_Y>{}</FRAME_Y>", y);
            }
            xml.push_str(if self.nested_vertices { "</Point>\n" } else { "</Vertex>\n" });
        }
        if self.nested_vertices {
            xml.push_str("    </VERTEX>\n");
        }
        xml.push_str("  </Dataset_Frame>\n");

        xml.push_str("  <Dataset_Sources><Source_Information>\n");
        let _ = writeln!(
            xml,
            "    <Scene_Source><MISSION>{}</MISSION>{}",
            self.mission,
            self.mission_index
                .as_ref()
                .map(|i| format!("<MISSION_INDEX>{}</MISSION_INDEX>", i))
                .unwrap_or_default()
        );
        for (name, value) in &self.scene {
            let _ = writeln!(xml, "      <{name}>{value}</{name}>");
        }
        xml.push_str("    </Scene_Source>\n");
        if let Some(wkt) = &self.source_wkt {
            let _ = writeln!(
                xml,
                "    <Coordinate_Reference_System><Projection_OGCWKT>{}</Projection_OGCWKT></Coordinate_Reference_System>",
                escape(wkt)
            );
        }
        if !self.quality.is_empty() {
            xml.push_str("    <Quality_Assessment>\n");
            for (code, value) in &self.quality {
                let _ = writeln!(
                    xml,
                    "      <Quality_Parameter><QUALITY_PARAMETER_CODE>DEIMOS:{}</QUALITY_PARAMETER_CODE><QUALITY_PARAMETER_VALUE>{}</QUALITY_PARAMETER_VALUE></Quality_Parameter>",
                    code, value
                );
            }
            xml.push_str("    </Quality_Assessment>\n");
        }
        xml.push_str("  </Source_Information></Dataset_Sources>\n");

        xml.push_str("  <Image_Interpretation>\n");
        for band in &self.bands {
            xml.push_str("    <Spectral_Band_Info>");
            if let Some(index) = band.index {
                let _ = write!(xml, "<BAND_INDEX>{}</BAND_INDEX>", index);
            }
            if let Some(desc) = &band.description {
                let _ = write!(xml, "<BAND_DESCRIPTION>{}</BAND_DESCRIPTION>", desc);
            }
            if let Some(gain) = band.gain {
                let _ = write!(xml, "<PHYSICAL_GAIN>{}</PHYSICAL_GAIN>", gain);
            }
            if let Some(bias) = band.bias {
                let _ = write!(xml, "<PHYSICAL_BIAS>{}</PHYSICAL_BIAS>", bias);
            }
            if let Some(unit) = &band.unit {
                let _ = write!(xml, "<PHYSICAL_UNIT>{}</PHYSICAL_UNIT>", unit);
            }
            xml.push_str("</Spectral_Band_Info>\n");
        }
        xml.push_str("  </Image_Interpretation>\n");

        xml.push_str("</Dimap_Document>\n");
        xml
    }

    /// Write the document to `dir/file_name`.
    pub fn write(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        fs::create_dir_all(dir).expect("create scene directory");
        fs::write(&path, self.to_xml()).expect("write DIM file");
        path
    }

    /// Write the document and an empty image file next to it.
    pub fn write_with_raster(&self, dir: &Path, file_name: &str) -> PathBuf {
        if let Some(name) = self.data_file_name() {
            touch(&dir.join(name));
        }
        self.write(dir, file_name)
    }

    /// Write the document declared and encoded as ISO-8859-1, with an empty
    /// image file next to it.
    pub fn write_latin1_with_raster(&self, dir: &Path, file_name: &str) -> PathBuf {
        if let Some(name) = self.data_file_name() {
            touch(&dir.join(name));
        }
        let xml = self
            .to_xml()
            .replacen("encoding=\"UTF-8\"", "encoding=\"ISO-8859-1\"", 1);
        let bytes: Vec<u8> = xml
            .chars()
            .map(|c| u8::try_from(u32::from(c)).expect("Latin-1 character"))
            .collect();
        let path = dir.join(file_name);
        fs::create_dir_all(dir).expect("create scene directory");
        fs::write(&path, bytes).expect("write DIM file");
        path
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ============================================================================
// Landsat MTL
// ============================================================================

/// Builder for Landsat-8 `_MTL.txt` documents.
#[derive(Debug, Clone)]
pub struct MtlBuilder {
    scene_id: String,
    entries: Vec<(String, String)>,
}

impl MtlBuilder {
    pub fn new(scene_id: &str) -> Self {
        Self {
            scene_id: scene_id.to_string(),
            entries: Vec::new(),
        }
    }

    /// A complete UTM zone 33 scene with all eleven band files listed.
    pub fn landsat8() -> Self {
        let id = scene::LANDSAT_SCENE_ID;
        let mut builder = Self::new(id)
            .quoted("SPACECRAFT_ID", "LANDSAT_8")
            .quoted("SENSOR_ID", "OLI_TIRS")
            .quoted("DATA_TYPE", "L1T")
            .set("DATE_ACQUIRED", "2015-06-21")
            .quoted("SCENE_CENTER_TIME", "09:52:41.1234560Z");

        for (corner, (x, y)) in ["UL", "UR", "LR", "LL"].iter().zip(frame::LANDSAT_UTM33) {
            builder = builder
                .set(&format!("CORNER_{}_PROJECTION_X_PRODUCT", corner), &format!("{:.3}", x))
                .set(&format!("CORNER_{}_PROJECTION_Y_PRODUCT", corner), &format!("{:.3}", y));
        }
        for band in 1..=11 {
            builder = builder.quoted(
                &format!("FILE_NAME_BAND_{}", band),
                &format!("{}_B{}.TIF", id, band),
            );
        }
        builder = builder
            .set("CLOUD_COVER", "12.34")
            .set("SUN_AZIMUTH", "129.51")
            .set("SUN_ELEVATION", "63.88")
            .set("EARTH_SUN_DISTANCE", "1.0162")
            .quoted("MAP_PROJECTION", "UTM")
            .quoted("DATUM", "WGS84")
            .set("UTM_ZONE", "33");
        for band in 1..=9 {
            builder = builder
                .set(&format!("RADIANCE_MULT_BAND_{}", band), &format!("{:.5E}", 0.01 * band as f64))
                .set(&format!("RADIANCE_ADD_BAND_{}", band), &format!("{:.5}", -50.0 - band as f64))
                .set(&format!("REFLECTANCE_MULT_BAND_{}", band), "2.0000E-05")
                .set(&format!("REFLECTANCE_ADD_BAND_{}", band), "-0.100000");
        }
        builder
    }

    /// Set an unquoted value, replacing an earlier one.
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.entries.retain(|(k, _)| k != key);
        self.entries.push((key.to_string(), value.to_string()));
        self
    }

    pub fn quoted(self, key: &str, value: &str) -> Self {
        self.set(key, &format!("\"{}\"", value))
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.entries.retain(|(k, _)| k != key);
        self
    }

    pub fn scene_id(&self) -> &str {
        &self.scene_id
    }

    /// File names listed under `FILE_NAME_BAND_*`.
    pub fn raster_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(k, _)| k.starts_with("FILE_NAME_BAND_"))
            .map(|(_, v)| v.trim_matches('"').to_string())
            .collect()
    }

    pub fn to_text(&self) -> String {
        let mut text = String::from("GROUP = L1_METADATA_FILE\n  GROUP = METADATA_FILE_INFO\n");
        let _ = writeln!(text, "    LANDSAT_SCENE_ID = \"{}\"", self.scene_id);
        text.push_str("  END_GROUP = METADATA_FILE_INFO\n  GROUP = PRODUCT_METADATA\n");
        for (key, value) in &self.entries {
            let _ = writeln!(text, "    {} = {}", key, value);
        }
        text.push_str("  END_GROUP = PRODUCT_METADATA\nEND_GROUP = L1_METADATA_FILE\nEND\n");
        text
    }

    /// Write `{scene_id}_MTL.txt` into `dir`.
    pub fn write(&self, dir: &Path) -> PathBuf {
        let path = dir.join(format!("{}_MTL.txt", self.scene_id));
        fs::create_dir_all(dir).expect("create scene directory");
        fs::write(&path, self.to_text()).expect("write MTL file");
        path
    }

    /// Write the MTL file and an empty file for every listed band.
    pub fn write_with_rasters(&self, dir: &Path) -> PathBuf {
        for name in self.raster_names() {
            touch(&dir.join(name));
        }
        self.write(dir)
    }
}

// ============================================================================
// PlanetLabs JSON
// ============================================================================

/// Builder for PlanetLabs scene feature records.
#[derive(Debug, Clone)]
pub struct PlanetBuilder {
    id: String,
    value: Value,
}

impl PlanetBuilder {
    /// A complete scene record.
    pub fn new(id: &str) -> Self {
        let ring: Vec<Value> = frame::PLANET_RING
            .iter()
            .chain(frame::PLANET_RING.first())
            .map(|(x, y)| json!([x, y]))
            .collect();
        let value = json!({
            "type": "Feature",
            "id": id,
            "geometry": {"type": "Polygon", "coordinates": [ring]},
            "properties": {
                "acquired": "2016-07-07T19:51:47.123456+00:00",
                "cloud_cover": 0.05,
                "satellite_id": "RapidEye-1",
                "sun": {"altitude": 61.2, "azimuth": 140.5},
                "camera": {
                    "bit_depth": 12,
                    "color_mode": "RGB",
                    "exposure_time": 1.2,
                    "gain": 1.0,
                    "tdi_pulses": 4
                }
            }
        });
        Self {
            id: id.to_string(),
            value,
        }
    }

    pub fn default_scene() -> Self {
        Self::new(scene::PLANET_SCENE_ID)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Remove `properties.<name>`.
    pub fn without_property(mut self, name: &str) -> Self {
        if let Some(props) = self.value["properties"].as_object_mut() {
            props.remove(name);
        }
        self
    }

    pub fn property(mut self, name: &str, value: Value) -> Self {
        self.value["properties"][name] = value;
        self
    }

    pub fn without_id(mut self) -> Self {
        if let Some(obj) = self.value.as_object_mut() {
            obj.remove("id");
        }
        self
    }

    pub fn geometry(mut self, geometry: Value) -> Self {
        self.value["geometry"] = geometry;
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.value).expect("serialize feature")
    }

    /// Write `{id}.json` into `dir`.
    pub fn write(&self, dir: &Path) -> PathBuf {
        let path = dir.join(format!("{}.json", self.id));
        fs::create_dir_all(dir).expect("create scene directory");
        fs::write(&path, self.to_json()).expect("write JSON record");
        path
    }

    /// Write the record and an empty `{id}_{product}.tif`.
    pub fn write_with_raster(&self, dir: &Path, product: &str) -> PathBuf {
        touch(&dir.join(format!("{}_{}.tif", self.id, product)));
        self.write(dir)
    }

    /// Write `{id}_rpc.txt` with the given coefficient lines.
    pub fn write_rpc(&self, dir: &Path, lines: &[(&str, &str)]) -> PathBuf {
        let path = dir.join(format!("{}_rpc.txt", self.id));
        let mut text = String::new();
        for (name, value) in lines {
            let _ = writeln!(text, "{}: {}", name, value);
        }
        fs::write(&path, text).expect("write RPC file");
        path
    }
}
