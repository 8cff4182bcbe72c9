//! NigeriaSat-2.

use imagery_common::ProductTag::{Ms, Pan};

use super::dimap::{
    DataFileSource, DimapProfile, SrsSource, DATA_FILE_HREF, HORIZONTAL_CS_CODE, PROJECTION_WKT,
    SOURCE_OGC_WKT,
};
use crate::descriptor::{
    band, template, AuxiliaryField, BandDescriptor, CapabilityDescriptor, DataSources,
    ProductFilter,
};
use crate::registry::FamilyId;

/// Blue/green/red/NIR plus Pan, shared with DZZ-HR.
pub const FOUR_BAND_TABLE: &[BandDescriptor] = &[
    band("Blue", 3, 448.0, 517.0, Ms),
    band("Green", 2, 527.0, 606.0, Ms),
    band("Red", 1, 630.0, 691.0, Ms),
    band("NearInfrared", 0, 776.0, 898.0, Ms),
    band("Panchromatic", 0, 520.0, 898.0, Pan),
];

pub fn signature(text: &str) -> bool {
    text.contains("<MISSION>NIGERIASAT")
}

pub static PROFILE: DimapProfile = DimapProfile {
    family: FamilyId::NigeriaSat2,
    sensor_name: "NigeriaSat-2",
    signature,
    srs_chain: &[
        SrsSource::Wkt(PROJECTION_WKT),
        SrsSource::Epsg(HORIZONTAL_CS_CODE),
        SrsSource::Wkt(SOURCE_OGC_WKT),
    ],
    data_file: &[DataFileSource::Href(DATA_FILE_HREF)],
    frame_vertices: "Dataset_Frame/Vertex",
    undeclared_bands: None,
    variables: None,
    descriptor: &DESCRIPTOR,
};

pub static DESCRIPTOR: CapabilityDescriptor = CapabilityDescriptor {
    name: "NigeriaSat-2",
    description: "NigeriaSat-2 multispectral and panchromatic scenes",
    builder_name: "NigeriaSat2Builder",
    crawler_name: "NigeriaSat2Crawler",
    data_source_filter: "*.dim",
    data_sources: DataSources {
        file: true,
        folder: true,
    },
    supports_orthorectification: true,
    enable_clip_to_footprint: true,
    is_raster_product: true,
    product_definition: "NigeriaSat2_4BANDS",
    supported_products: &[ProductFilter {
        name: "Level1",
        allowed_products: &["L1C", "L1B"],
    }],
    processing_templates: &[
        template("Multispectral", true, Some(Ms), Some(Ms), "stretch_ms.rft.xml"),
        template("Panchromatic", true, Some(Pan), Some(Pan), "stretch_pan.rft.xml"),
    ],
    bands: FOUR_BAND_TABLE,
    fields: &[AuxiliaryField::string("ProductType", "Product Type", 50)],
};
