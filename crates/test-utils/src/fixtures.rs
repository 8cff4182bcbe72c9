//! Common test fixtures for imagery ingestion tests.
//!
//! Pre-defined metadata values representing typical scenes. The document
//! builders in [`crate::generators`] use these as defaults.

/// Scene frames (ordered vertex lists, not closed).
pub mod frame {
    /// A DEIMOS-2 scene over Madrid in lon/lat.
    pub const MADRID: [(f64, f64); 4] = [
        (-3.7412, 40.4521),
        (-3.6012, 40.4488),
        (-3.6051, 40.3390),
        (-3.7448, 40.3423),
    ];

    /// A Landsat-8 scene in UTM zone 33N metres (UL, UR, LR, LL).
    pub const LANDSAT_UTM33: [(f64, f64); 4] = [
        (399_960.0, 4_700_040.0),
        (628_800.0, 4_700_040.0),
        (628_800.0, 4_465_500.0),
        (399_960.0, 4_465_500.0),
    ];

    /// A PlanetLabs footprint in lon/lat.
    pub const PLANET_RING: [(f64, f64); 4] = [
        (-122.4571, 37.7321),
        (-122.3910, 37.7321),
        (-122.3910, 37.7802),
        (-122.4571, 37.7802),
    ];
}

/// Spatial reference strings.
pub mod srs {
    pub const UTM_30N_CODE: &str = "EPSG:32630";

    pub const UTM_30N_WKT: &str = "PROJCS[\"WGS 84 / UTM zone 30N\",GEOGCS[\"WGS 84\",\
DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,298.257223563]],PRIMEM[\"Greenwich\",0],\
UNIT[\"degree\",0.0174532925199433]],PROJECTION[\"Transverse_Mercator\"],\
PARAMETER[\"central_meridian\",-3],PARAMETER[\"scale_factor\",0.9996],\
PARAMETER[\"false_easting\",500000],UNIT[\"metre\",1]]";
}

/// Scene-level values.
pub mod scene {
    pub const IMAGING_DATE: &str = "2015-06-21";
    pub const IMAGING_TIME: &str = "10:47:32.250";
    pub const SUN_ELEVATION: f64 = 68.41;
    pub const SUN_AZIMUTH: f64 = 152.37;
    pub const VIEWING_ANGLE: f64 = 11.2;
    pub const INSTRUMENT: &str = "HiRAIS";

    pub const LANDSAT_SCENE_ID: &str = "LC81910312015172LGN00";
    pub const PLANET_SCENE_ID: &str = "20160707_195147_1057916_RapidEye-1";
}

/// Per-band radiometry for a 4-band DIMAP product: (description, gain, bias).
pub const FOUR_BANDS: [(&str, f64, f64); 4] = [
    ("NIR", 0.01180, 0.0),
    ("RED", 0.01265, 0.0),
    ("GREEN", 0.01421, 0.0),
    ("BLUE", 0.01634, 0.0),
];
