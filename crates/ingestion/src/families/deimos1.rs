//! DEIMOS-1 (3-band MS only).

use imagery_common::ProductTag::Ms;

use super::dimap::{
    DataFileSource, DimapProfile, SrsSource, DATA_FILE_HREF, HORIZONTAL_CS_CODE, PROJECTION_WKT,
};
use crate::descriptor::{band, template, AuxiliaryField, CapabilityDescriptor, DataSources, ProductFilter};
use crate::registry::FamilyId;

pub fn signature(text: &str) -> bool {
    text.contains("<MISSION>DEIMOS") && text.contains("<MISSION_INDEX>1")
}

pub static PROFILE: DimapProfile = DimapProfile {
    family: FamilyId::Deimos1,
    sensor_name: "DEIMOS-1",
    signature,
    srs_chain: &[
        SrsSource::Epsg(HORIZONTAL_CS_CODE),
        SrsSource::Wkt(PROJECTION_WKT),
    ],
    data_file: &[DataFileSource::Href(DATA_FILE_HREF)],
    frame_vertices: "Dataset_Frame/Vertex",
    // DEIMOS-1 only ever delivers multispectral products
    undeclared_bands: Some(Ms),
    variables: None,
    descriptor: &DESCRIPTOR,
};

pub static DESCRIPTOR: CapabilityDescriptor = CapabilityDescriptor {
    name: "DEIMOS-1",
    description: "DEIMOS-1 L1R/L1T multispectral scenes",
    builder_name: "Deimos1Builder",
    crawler_name: "Deimos1Crawler",
    data_source_filter: "*.dim",
    data_sources: DataSources {
        file: true,
        folder: true,
    },
    supports_orthorectification: true,
    enable_clip_to_footprint: true,
    is_raster_product: true,
    product_definition: "DEIMOS1_3BANDS",
    supported_products: &[ProductFilter {
        name: "Level1",
        allowed_products: &["L1R", "L1T"],
    }],
    processing_templates: &[
        template("PseudoColor", true, Some(Ms), Some(Ms), "PseudoColor.rft.xml"),
        template("Multispectral", false, Some(Ms), Some(Ms), "stretch_ms.rft.xml"),
    ],
    bands: &[
        band("Green", 0, 520.0, 600.0, Ms),
        band("Red", 1, 630.0, 690.0, Ms),
        band("NearInfrared", 2, 770.0, 900.0, Ms),
    ],
    fields: &[AuxiliaryField::string("Instrument", "Instrument", 50)],
};
