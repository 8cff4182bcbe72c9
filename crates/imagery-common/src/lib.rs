//! Common types shared across the imagery catalog crates.
//!
//! Everything here is plain data: no I/O, no logging. The ingestion crate
//! builds these values out of sensor metadata documents.

pub mod bbox;
pub mod footprint;
pub mod spatial_ref;
pub mod tag;

pub use bbox::{BboxParseError, BoundingBox};
pub use footprint::{Footprint, Vertex};
pub use spatial_ref::{EpsgCode, SpatialRefParseError, SpatialReference};
pub use tag::{ProductTag, TagParseError, TagSet};
