//! Sensor family implementations.

pub mod deimos1;
pub mod deimos2;
pub mod dimap;
pub mod kazakhstan;
pub mod landsat8;
pub mod nigeriasat2;
pub mod planetlabs;

pub use dimap::{DimapFamily, DimapProfile};
pub use landsat8::Landsat8Family;
pub use planetlabs::PlanetLabsFamily;
