//! DEIMOS-2 (Deimos Imaging, 4-band MS plus Pan).

use imagery_common::ProductTag::{Ms, Pan, Pansharpened};

use super::dimap::{
    DataFileSource, DimapProfile, SrsSource, DATA_FILE_HREF, HORIZONTAL_CS_CODE, PROJECTION_WKT,
    SOURCE_OGC_WKT,
};
use crate::descriptor::{
    band, template, AuxiliaryField, CapabilityDescriptor, DataSources, ProcessingTemplate,
    ProductFilter,
};
use crate::item::RenderVariables;
use crate::registry::FamilyId;

pub fn signature(text: &str) -> bool {
    text.contains("<MISSION>Deimos 2")
        || (text.contains("<MISSION>DEIMOS") && text.contains("<MISSION_INDEX>2"))
}

pub static PROFILE: DimapProfile = DimapProfile {
    family: FamilyId::Deimos2,
    sensor_name: "DEIMOS-2",
    signature,
    srs_chain: &[
        SrsSource::Epsg(HORIZONTAL_CS_CODE),
        SrsSource::Wkt(PROJECTION_WKT),
        SrsSource::Wkt(SOURCE_OGC_WKT),
    ],
    data_file: &[DataFileSource::Href(DATA_FILE_HREF)],
    frame_vertices: "Dataset_Frame/Vertex",
    undeclared_bands: None,
    variables: Some(RenderVariables {
        default_maximum_input: 1023,
        default_gamma: 1.0,
    }),
    descriptor: &DESCRIPTOR,
};

pub static DESCRIPTOR: CapabilityDescriptor = CapabilityDescriptor {
    name: "DEIMOS-2",
    description: "DEIMOS-2 L1B/L1C multispectral and panchromatic scenes",
    builder_name: "DeimosBuilder",
    crawler_name: "Deimos2Crawler",
    data_source_filter: "*.dim",
    data_sources: DataSources {
        file: true,
        folder: true,
    },
    supports_orthorectification: true,
    enable_clip_to_footprint: true,
    is_raster_product: true,
    product_definition: "DEIMOS2_4BANDS",
    supported_products: &[ProductFilter {
        name: "Level1",
        allowed_products: &["L1C", "L1B"],
    }],
    processing_templates: &[
        template("Multispectral", true, Some(Ms), Some(Ms), "D2_stretch_ms.rft.xml"),
        template("Panchromatic", false, Some(Pan), Some(Pan), "D2_stretch_pan.rft.xml"),
        template(
            "Pansharpen",
            false,
            Some(Pansharpened),
            Some(Ms),
            "D2_stretch_psh.rft.xml",
        ),
        ProcessingTemplate {
            name: "All Bands",
            enabled: false,
            output_tag: None,
            primary_input_tag: None,
            is_product_template: false,
            function_template: "D2_stretch_allbands.rft.xml",
        },
    ],
    bands: &[
        band("Blue", 3, 466.0, 525.0, Ms),
        band("Green", 2, 532.0, 599.0, Ms),
        band("Red", 1, 640.0, 697.0, Ms),
        band("NearInfrared", 0, 770.0, 892.0, Ms),
        band("Panchromatic", 0, 560.0, 900.0, Pan),
    ],
    fields: &[AuxiliaryField::string("Instrument", "Instrument", 50)],
};
