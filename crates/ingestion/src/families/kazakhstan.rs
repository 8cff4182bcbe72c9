//! Kazakhstan DZZ-HR.

use imagery_common::ProductTag::{Ms, Pan};

use super::dimap::{
    DataFileSource, DimapProfile, SrsSource, DATA_FILE_HREF, DATA_FILE_LIST, HORIZONTAL_CS_CODE,
    PROJECTION_WKT,
};
use super::nigeriasat2::FOUR_BAND_TABLE;
use crate::descriptor::{template, AuxiliaryField, CapabilityDescriptor, DataSources, ProductFilter};
use crate::registry::FamilyId;

pub fn signature(text: &str) -> bool {
    text.contains("<MISSION>DZZ-HR")
}

pub static PROFILE: DimapProfile = DimapProfile {
    family: FamilyId::DzzHr,
    sensor_name: "DZZ-HR",
    signature,
    srs_chain: &[
        SrsSource::Epsg(HORIZONTAL_CS_CODE),
        SrsSource::Wkt(PROJECTION_WKT),
    ],
    data_file: &[
        DataFileSource::Text(DATA_FILE_LIST),
        DataFileSource::Href(DATA_FILE_HREF),
    ],
    frame_vertices: "Dataset_Frame/VERTEX/*",
    undeclared_bands: None,
    variables: None,
    descriptor: &DESCRIPTOR,
};

pub static DESCRIPTOR: CapabilityDescriptor = CapabilityDescriptor {
    name: "Kazakhstan",
    description: "Kazakhstan DZZ-HR multispectral and panchromatic scenes",
    builder_name: "KazakhstanBuilder",
    crawler_name: "KazakhstanCrawler",
    data_source_filter: "*.dim",
    data_sources: DataSources {
        file: true,
        folder: true,
    },
    supports_orthorectification: true,
    enable_clip_to_footprint: true,
    is_raster_product: true,
    product_definition: "Kazakhstan_4BANDS",
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
