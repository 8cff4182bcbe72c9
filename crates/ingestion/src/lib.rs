//! Satellite imagery metadata ingestion library.
//!
//! Turns sensor product directories into canonical [`BuiltItem`] records:
//! raster locations, spatial reference, footprint and normalized scene
//! metadata.
//!
//! # Architecture
//!
//! Each sensor family implements [`SensorFamily`], which bundles:
//!
//! - a detector deciding whether a file belongs to the family
//! - tag enumeration used by the [`Crawler`] to split one document into
//!   per-product tasks (`MS`, `Pan`)
//! - a builder parsing the family's metadata dialect (DIMAP XML, Landsat
//!   MTL text, PlanetLabs JSON)
//! - a static [`CapabilityDescriptor`] for host registration
//!
//! The [`FamilyRegistry`] maps [`FamilyId`]s to implementations and the
//! [`Ingester`] drives a family over a [`CrawlerConfig`].

pub mod config;
pub mod crawler;
pub mod descriptor;
pub mod detect;
pub mod document;
pub mod error;
pub mod families;
pub mod family;
mod ingester;
pub mod item;
mod paths;
pub mod registry;
pub mod task;

// Re-exports
pub use config::CrawlerConfig;
pub use crawler::{CrawlStats, Crawler};
pub use descriptor::{
    AuxiliaryField, BandDescriptor, CapabilityDescriptor, FieldType, ProcessingTemplate,
};
pub use detect::DetectionResult;
pub use document::{DocumentError, JsonDocument, MtlDocument, XmlDocument, XmlElement};
pub use error::{ErrorCategory, IngestionError, Result};
pub use family::{SensorFamily, TagEnumeration};
pub use ingester::{IngestOptions, Ingester, IngestionReport};
pub use item::{
    BandProperty, BuiltItem, CameraProperties, GeodataTransform, KeyProperties, RenderVariables,
};
pub use registry::{FamilyId, FamilyRegistry};
pub use task::CandidateTask;

pub use imagery_common::{ProductTag, SpatialReference, TagSet};
