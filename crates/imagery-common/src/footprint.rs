//! Ground footprint polygons.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;

/// One polygon vertex in the item's declared spatial reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Vertex {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A closed polygon ring, or nothing.
///
/// A footprint is either empty or holds at least three distinct vertices
/// followed by a copy of the first one. Partial frames in metadata never
/// produce an open or two-point ring; they produce the empty footprint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Footprint {
    ring: Vec<Vertex>,
}

impl Footprint {
    /// The empty footprint.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a ring from an ordered vertex list.
    ///
    /// Consecutive duplicates are collapsed and a trailing copy of the first
    /// vertex (if the input was already closed) is ignored before closing
    /// the ring again. Inputs that revisit fewer than three distinct points
    /// (`A, B, A, B`) give the empty footprint.
    pub fn from_vertices<I>(vertices: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Vertex>,
    {
        let mut ring: Vec<Vertex> = Vec::new();
        for v in vertices.into_iter().map(Into::into) {
            if ring.last() != Some(&v) {
                ring.push(v);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if distinct_count(&ring) < 3 {
            return Self::empty();
        }
        ring.push(ring[0]);
        Self { ring }
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// The closed ring, first vertex repeated at the end.
    pub fn ring(&self) -> &[Vertex] {
        &self.ring
    }

    /// Number of distinct vertices (the closing vertex is not counted).
    pub fn vertex_count(&self) -> usize {
        self.ring.len().saturating_sub(1)
    }

    pub fn extent(&self) -> Option<BoundingBox> {
        BoundingBox::from_vertices(&self.ring)
    }
}

/// Number of distinct vertices, compared by value.
fn distinct_count(vertices: &[Vertex]) -> usize {
    let mut seen: Vec<&Vertex> = Vec::with_capacity(vertices.len());
    for v in vertices {
        if !seen.contains(&v) {
            seen.push(v);
        }
    }
    seen.len()
}
