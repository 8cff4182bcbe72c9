//! Static capability descriptors.
//!
//! A descriptor tells a hosting catalog what a sensor family can ingest:
//! which files to pick up, how its bands are laid out, which processing
//! templates it offers and which extra attribute fields it populates. They
//! are compile-time data and never change at runtime.

use imagery_common::ProductTag;
use serde::Serialize;

/// Everything a host needs to register one sensor family.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub builder_name: &'static str,
    pub crawler_name: &'static str,
    pub data_source_filter: &'static str,
    pub data_sources: DataSources,
    pub supports_orthorectification: bool,
    pub enable_clip_to_footprint: bool,
    pub is_raster_product: bool,
    pub product_definition: &'static str,
    pub supported_products: &'static [ProductFilter],
    pub processing_templates: &'static [ProcessingTemplate],
    pub bands: &'static [BandDescriptor],
    pub fields: &'static [AuxiliaryField],
}

impl CapabilityDescriptor {
    /// Bands belonging to one product, ordered by index.
    pub fn bands_for(&self, tag: ProductTag) -> Vec<&'static BandDescriptor> {
        let mut bands: Vec<_> = self.bands.iter().filter(|b| b.tag == tag).collect();
        bands.sort_by_key(|b| b.index);
        bands
    }

    /// Band of `tag` at `index`.
    pub fn band_at(&self, tag: ProductTag, index: u32) -> Option<&'static BandDescriptor> {
        self.bands.iter().find(|b| b.tag == tag && b.index == index)
    }

    pub fn template(&self, name: &str) -> Option<&'static ProcessingTemplate> {
        self.processing_templates.iter().find(|t| t.name == name)
    }

    /// Templates switched on by default.
    pub fn enabled_templates(&self) -> impl Iterator<Item = &'static ProcessingTemplate> {
        self.processing_templates.iter().filter(|t| t.enabled)
    }
}

/// What kinds of input the host may hand to the crawler.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DataSources {
    pub file: bool,
    pub folder: bool,
}

/// A product-level filter exposed in the host's URI filter list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub name: &'static str,
    pub allowed_products: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingTemplate {
    pub name: &'static str,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tag: Option<ProductTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_input_tag: Option<ProductTag>,
    pub is_product_template: bool,
    pub function_template: &'static str,
}

/// One spectral band. Wavelengths are in nanometres.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BandDescriptor {
    pub name: &'static str,
    pub index: u32,
    pub wavelength_min: f64,
    pub wavelength_max: f64,
    pub tag: ProductTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    SmallInteger,
    Integer,
    Single,
    Double,
    String,
    Date,
}

/// An extra attribute column the family populates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuxiliaryField {
    pub name: &'static str,
    pub alias: &'static str,
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
}

impl AuxiliaryField {
    pub const fn string(name: &'static str, alias: &'static str, length: u32) -> Self {
        Self {
            name,
            alias,
            field_type: FieldType::String,
            length: Some(length),
            precision: None,
        }
    }
}

/// Shorthand for band tables.
pub const fn band(
    name: &'static str,
    index: u32,
    wavelength_min: f64,
    wavelength_max: f64,
    tag: ProductTag,
) -> BandDescriptor {
    BandDescriptor {
        name,
        index,
        wavelength_min,
        wavelength_max,
        tag,
    }
}

/// Shorthand for template lists.
pub const fn template(
    name: &'static str,
    enabled: bool,
    output_tag: Option<ProductTag>,
    primary_input_tag: Option<ProductTag>,
    function_template: &'static str,
) -> ProcessingTemplate {
    ProcessingTemplate {
        name,
        enabled,
        output_tag,
        primary_input_tag,
        is_product_template: true,
        function_template,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FamilyRegistry;
    use std::collections::HashSet;

    #[test]
    fn test_band_indices_unique_per_tag() {
        let registry = FamilyRegistry::standard();
        for family in registry.iter() {
            let descriptor = family.descriptor();
            let mut seen = HashSet::new();
            for band in descriptor.bands {
                assert!(
                    seen.insert((band.tag, band.index)),
                    "{}: duplicate band index {} for {}",
                    descriptor.name,
                    band.index,
                    band.tag
                );
                assert!(band.wavelength_min < band.wavelength_max);
            }
        }
    }

    #[test]
    fn test_every_family_has_enabled_template() {
        let registry = FamilyRegistry::standard();
        for family in registry.iter() {
            let descriptor = family.descriptor();
            assert!(
                descriptor.enabled_templates().next().is_some(),
                "{} has no enabled template",
                descriptor.name
            );
            assert!(!descriptor.data_source_filter.is_empty());
        }
    }

    #[test]
    fn test_bands_for_sorted() {
        let registry = FamilyRegistry::standard();
        let deimos2 = registry.get_by_name("deimos-2").unwrap().descriptor();
        let names: Vec<_> = deimos2
            .bands_for(ProductTag::Ms)
            .iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, vec!["NearInfrared", "Red", "Green", "Blue"]);
        assert_eq!(deimos2.bands_for(ProductTag::Pan).len(), 1);
    }

    #[test]
    fn test_serializes_camel_case() {
        let registry = FamilyRegistry::standard();
        let landsat = registry.get_by_name("landsat-8").unwrap().descriptor();
        let json = serde_json::to_value(landsat).unwrap();
        assert_eq!(json["productDefinition"], "Landsat8");
        assert_eq!(json["bands"][0]["wavelengthMin"], 430.0);
        assert_eq!(json["fields"][0]["fieldType"], "double");
        assert!(json["processingTemplates"][0].get("outputTag").is_some());
    }
}
