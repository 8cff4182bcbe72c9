//! Spectral product tags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Which spectral product of a scene a task or item refers to.
///
/// Ordering follows declaration order, which is also the order tasks are
/// emitted in when one document supports several products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductTag {
    #[serde(rename = "MS")]
    Ms,
    Pan,
    Pansharpened,
    Other,
}

impl ProductTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductTag::Ms => "MS",
            ProductTag::Pan => "Pan",
            ProductTag::Pansharpened => "Pansharpened",
            ProductTag::Other => "Other",
        }
    }
}

impl fmt::Display for ProductTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductTag {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ms" | "multispectral" => Ok(ProductTag::Ms),
            "pan" | "panchromatic" => Ok(ProductTag::Pan),
            "pansharpened" | "psh" => Ok(ProductTag::Pansharpened),
            "other" => Ok(ProductTag::Other),
            _ => Err(TagParseError(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown product tag: {0}")]
pub struct TagParseError(pub String);

/// Ordered set of product tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<ProductTag>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags implied by a declared band count: one band is panchromatic,
    /// three or more is multispectral, anything else is unsupported.
    pub fn from_band_count(bands: u32) -> Self {
        match bands {
            1 => Self::single(ProductTag::Pan),
            n if n >= 3 => Self::single(ProductTag::Ms),
            _ => Self::new(),
        }
    }

    pub fn single(tag: ProductTag) -> Self {
        Self(BTreeSet::from([tag]))
    }

    pub fn insert(&mut self, tag: ProductTag) -> bool {
        self.0.insert(tag)
    }

    pub fn extend(&mut self, other: TagSet) {
        self.0.extend(other.0);
    }

    pub fn contains(&self, tag: ProductTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ProductTag> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<ProductTag> for TagSet {
    fn from_iter<I: IntoIterator<Item = ProductTag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for TagSet {
    type Item = ProductTag;
    type IntoIter = std::collections::btree_set::IntoIter<ProductTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
