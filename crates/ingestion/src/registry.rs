//! Family identifiers and the registry mapping them to implementations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::IngestionError;
use crate::families::{deimos1, deimos2, kazakhstan, nigeriasat2};
use crate::families::{DimapFamily, Landsat8Family, PlanetLabsFamily};
use crate::family::{has_suffix, SensorFamily};

/// Supported sensor families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FamilyId {
    #[serde(rename = "deimos-1")]
    Deimos1,
    #[serde(rename = "deimos-2")]
    Deimos2,
    DzzHr,
    #[serde(rename = "nigeriasat-2")]
    NigeriaSat2,
    #[serde(rename = "landsat-8")]
    Landsat8,
    #[serde(rename = "planetlabs")]
    PlanetLabs,
}

impl FamilyId {
    pub const ALL: [FamilyId; 6] = [
        FamilyId::Deimos1,
        FamilyId::Deimos2,
        FamilyId::DzzHr,
        FamilyId::NigeriaSat2,
        FamilyId::Landsat8,
        FamilyId::PlanetLabs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyId::Deimos1 => "deimos-1",
            FamilyId::Deimos2 => "deimos-2",
            FamilyId::DzzHr => "dzz-hr",
            FamilyId::NigeriaSat2 => "nigeriasat-2",
            FamilyId::Landsat8 => "landsat-8",
            FamilyId::PlanetLabs => "planetlabs",
        }
    }

    /// Other accepted spellings, including the descriptor names.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            FamilyId::Deimos1 => &["deimos1"],
            FamilyId::Deimos2 => &["deimos2"],
            FamilyId::DzzHr => &["kazakhstan", "dzzhr"],
            FamilyId::NigeriaSat2 => &["nigeriasat2"],
            FamilyId::Landsat8 => &["landsat8"],
            FamilyId::PlanetLabs => &["planet"],
        }
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FamilyId {
    type Err = IngestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FamilyId::ALL
            .into_iter()
            .find(|id| {
                wanted.eq_ignore_ascii_case(id.as_str())
                    || id.aliases().iter().any(|a| wanted.eq_ignore_ascii_case(a))
            })
            .ok_or_else(|| IngestionError::UnknownFamily(s.to_string()))
    }
}

/// All known families, in [`FamilyId::ALL`] order.
pub struct FamilyRegistry {
    families: Vec<Box<dyn SensorFamily>>,
}

impl FamilyRegistry {
    pub fn empty() -> Self {
        Self {
            families: Vec::new(),
        }
    }

    /// Registry with every built-in family.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(DimapFamily::new(&deimos1::PROFILE)));
        registry.register(Box::new(DimapFamily::new(&deimos2::PROFILE)));
        registry.register(Box::new(DimapFamily::new(&kazakhstan::PROFILE)));
        registry.register(Box::new(DimapFamily::new(&nigeriasat2::PROFILE)));
        registry.register(Box::new(Landsat8Family::new()));
        registry.register(Box::new(PlanetLabsFamily::new()));
        registry
    }

    /// Add a family, replacing any existing one with the same id.
    pub fn register(&mut self, family: Box<dyn SensorFamily>) {
        self.families.retain(|f| f.id() != family.id());
        self.families.push(family);
    }

    pub fn get(&self, id: FamilyId) -> Option<&dyn SensorFamily> {
        self.families
            .iter()
            .find(|f| f.id() == id)
            .map(|f| f.as_ref())
    }

    pub fn get_by_name(&self, name: &str) -> Result<&dyn SensorFamily, IngestionError> {
        let id: FamilyId = name.parse()?;
        self.get(id)
            .ok_or_else(|| IngestionError::UnknownFamily(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SensorFamily> {
        self.families.iter().map(|f| f.as_ref())
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// First family whose suffix fits `path` and whose detector accepts it.
    pub fn detect_family(&self, path: &Path) -> Option<&dyn SensorFamily> {
        self.iter()
            .filter(|f| has_suffix(path, f.metadata_suffix()))
            .find(|f| f.detect(path).matches)
    }
}

impl Default for FamilyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_id_roundtrip() {
        for id in FamilyId::ALL {
            assert_eq!(id.as_str().parse::<FamilyId>().unwrap(), id);
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }

    #[test]
    fn test_family_id_aliases() {
        assert_eq!("Kazakhstan".parse::<FamilyId>().unwrap(), FamilyId::DzzHr);
        assert_eq!("DEIMOS-2".parse::<FamilyId>().unwrap(), FamilyId::Deimos2);
        assert_eq!("Landsat-8".parse::<FamilyId>().unwrap(), FamilyId::Landsat8);
        assert!("sentinel-2".parse::<FamilyId>().is_err());
    }

    #[test]
    fn test_standard_registry() {
        let registry = FamilyRegistry::standard();
        assert_eq!(registry.len(), 6);
        for id in FamilyId::ALL {
            assert_eq!(registry.get(id).unwrap().id(), id);
        }
        assert!(matches!(
            registry.get_by_name("nope"),
            Err(IngestionError::UnknownFamily(_))
        ));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = FamilyRegistry::standard();
        registry.register(Box::new(Landsat8Family::new()));
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_descriptor_names_parse() {
        let registry = FamilyRegistry::standard();
        for family in registry.iter() {
            let by_name = registry.get_by_name(family.descriptor().name).unwrap();
            assert_eq!(by_name.id(), family.id());
        }
    }
}
