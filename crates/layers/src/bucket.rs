use foundation::math::{RelativeOrigin, Vec3};
use tessellation::Tessellation;

use crate::symbology::{Style, StyleKey};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub u64);

/// Where one geometry's data sits inside a bucket's buffers. Starts and
/// counts are in vertices and in index entries respectively.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Region {
    pub vertex_start: u32,
    pub vertex_count: u32,
    pub line_start: u32,
    pub line_count: u32,
    pub triangle_start: u32,
    pub triangle_count: u32,
}

/// Shared vertex and index buffers for every geometry of one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    style: Style,
    key: StyleKey,
    origin: Vec3,
    positions: Vec<f32>,
    line_indices: Vec<u32>,
    triangle_indices: Vec<u32>,
    regions: Vec<(GeometryId, Region)>,
    dirty: bool,
}

impl Bucket {
    pub fn new(style: Style, origin: Vec3) -> Self {
        Self {
            key: style.key(),
            style,
            origin,
            positions: Vec::new(),
            line_indices: Vec::new(),
            triangle_indices: Vec::new(),
            regions: Vec::new(),
            dirty: false,
        }
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn key(&self) -> StyleKey {
        self.key
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn is_compatible(&self, style: &Style) -> bool {
        self.key == style.key()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn line_indices(&self) -> &[u32] {
        &self.line_indices
    }

    pub fn triangle_indices(&self) -> &[u32] {
        &self.triangle_indices
    }

    /// Regions in insertion order.
    pub fn regions(&self) -> &[(GeometryId, Region)] {
        &self.regions
    }

    pub fn region(&self, id: GeometryId) -> Option<Region> {
        self.regions.iter().find(|(g, _)| *g == id).map(|(_, r)| *r)
    }

    pub fn contains(&self, id: GeometryId) -> bool {
        self.region(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Append a tessellation, re-expressed against this bucket's origin.
    /// An id already present is replaced.
    pub fn add(&mut self, id: GeometryId, tess: &Tessellation) -> Region {
        self.remove(id);

        let rebase = RelativeOrigin::new(self.origin);
        let vertex_start = (self.positions.len() / 3) as u32;
        for p in tess.positions.chunks_exact(3) {
            self.positions
                .extend_from_slice(&rebase.rebase(tess.origin, [p[0], p[1], p[2]]));
        }

        let line_start = self.line_indices.len() as u32;
        self.line_indices
            .extend(tess.line_indices.iter().map(|i| i + vertex_start));
        let triangle_start = self.triangle_indices.len() as u32;
        self.triangle_indices
            .extend(tess.triangle_indices.iter().map(|i| i + vertex_start));

        let region = Region {
            vertex_start,
            vertex_count: tess.vertex_count() as u32,
            line_start,
            line_count: tess.line_indices.len() as u32,
            triangle_start,
            triangle_count: tess.triangle_indices.len() as u32,
        };
        self.regions.push((id, region));
        self.dirty = true;
        region
    }

    /// Splice a geometry out of all buffers, shifting everything after it.
    pub fn remove(&mut self, id: GeometryId) -> Option<Region> {
        let at = self.regions.iter().position(|(g, _)| *g == id)?;
        let (_, region) = self.regions.remove(at);

        let vs = region.vertex_start as usize * 3;
        self.positions
            .drain(vs..vs + region.vertex_count as usize * 3);

        let shift = |indices: &mut Vec<u32>, start: u32, count: u32| {
            let (start, count) = (start as usize, count as usize);
            indices.drain(start..start + count);
            for i in &mut indices[start..] {
                *i -= region.vertex_count;
            }
        };
        shift(&mut self.line_indices, region.line_start, region.line_count);
        shift(
            &mut self.triangle_indices,
            region.triangle_start,
            region.triangle_count,
        );

        for (_, r) in &mut self.regions[at..] {
            r.vertex_start -= region.vertex_count;
            r.line_start -= region.line_count;
            r.triangle_start -= region.triangle_count;
        }
        self.dirty = true;
        Some(region)
    }
}
