//! Per-frame selection of the visible sector set.
//!
//! Two interchangeable strategies implement [`SectorVisibility`] over the
//! same map data: recursive portal flooding, and a walk of an externally
//! supplied BSP tree. Cycle safety comes from an explicit per-call
//! [`VisitSet`] rather than a counter stamped into the sectors, so
//! repeated or multi-viewpoint traversals never share mutable state.

pub mod bsp;
pub mod portals;

use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::MapData;
use crate::level::SectorId;
use crate::level::map_defs::BBox;

pub use bsp::BspTraversal;
pub use portals::PortalTraversal;

/// View-frustum planes extracted from a view-projection matrix, pointing
/// inward.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Gribb/Hartmann extraction: each plane is a sum or difference of
    /// matrix rows.
    pub fn from_matrix(mvp: &Mat4) -> Self {
        let r0 = mvp.row(0);
        let r1 = mvp.row(1);
        let r2 = mvp.row(2);
        let r3 = mvp.row(3);

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r3 + r2, // near
            r3 - r2, // far
        ];
        for plane in &mut planes {
            let len = plane.xyz().length();
            if len > f32::EPSILON {
                *plane /= len;
            }
        }
        Self { planes }
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.xyz().dot(p) + plane.w >= 0.0)
    }

    /// Conservative test: invisible only when every corner is outside one
    /// plane.
    pub fn intersects_points(&self, points: &[Vec3]) -> bool {
        for plane in &self.planes {
            if points
                .iter()
                .all(|p| plane.xyz().dot(*p) + plane.w < 0.0)
            {
                return false;
            }
        }
        true
    }

    /// The vertical quad spanning `v1`..`v2` between two heights, which
    /// is the shape of a wall or portal.
    pub fn intersects_quad(&self, v1: Vec2, v2: Vec2, bottom: f32, top: f32) -> bool {
        self.intersects_points(&[
            Vec3::new(v1.x, v1.y, bottom),
            Vec3::new(v2.x, v2.y, bottom),
            Vec3::new(v2.x, v2.y, top),
            Vec3::new(v1.x, v1.y, top),
        ])
    }

    /// A 2D bounding box extruded over a height range.
    pub fn intersects_bbox(&self, bbox: &BBox, z_min: f32, z_max: f32) -> bool {
        self.intersects_points(&[
            Vec3::new(bbox.left, bbox.bottom, z_min),
            Vec3::new(bbox.right, bbox.bottom, z_min),
            Vec3::new(bbox.right, bbox.top, z_min),
            Vec3::new(bbox.left, bbox.top, z_min),
            Vec3::new(bbox.left, bbox.bottom, z_max),
            Vec3::new(bbox.right, bbox.bottom, z_max),
            Vec3::new(bbox.right, bbox.top, z_max),
            Vec3::new(bbox.left, bbox.top, z_max),
        ])
    }
}

/// Everything a traversal needs to know about the camera for one frame.
#[derive(Debug, Clone, Copy)]
pub struct ViewDef {
    pub position: Vec3,
    pub frustum: Frustum,
}

impl ViewDef {
    pub fn new(position: Vec3, view_projection: &Mat4) -> Self {
        Self {
            position,
            frustum: Frustum::from_matrix(view_projection),
        }
    }
}

/// Bit-packed set of sector indices, cleared and reused call to call.
#[derive(Debug, Default, Clone)]
pub struct VisitSet {
    words: Vec<u32>,
}

impl VisitSet {
    pub fn with_capacity(sectors: usize) -> Self {
        Self {
            words: vec![0; sectors.div_ceil(32)],
        }
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    fn ensure(&mut self, index: usize) {
        let words = index / 32 + 1;
        if self.words.len() < words {
            self.words.resize(words, 0);
        }
    }

    /// Mark a sector; returns `true` if it was not already marked.
    pub fn insert(&mut self, sector: SectorId) -> bool {
        let index = sector.index();
        self.ensure(index);
        let mask = 1u32 << (index % 32);
        let word = &mut self.words[index / 32];
        let fresh = *word & mask == 0;
        *word |= mask;
        fresh
    }

    pub fn contains(&self, sector: SectorId) -> bool {
        let index = sector.index();
        self.words
            .get(index / 32)
            .is_some_and(|w| w & (1 << (index % 32)) != 0)
    }
}

/// A strategy producing the set of sectors to draw for one frame. The
/// visit set is owned by the caller so allocations can be reused; it is
/// cleared on entry. Must finish before draw submission; both
/// implementations are structurally terminating.
pub trait SectorVisibility {
    fn visible_sectors(
        &self,
        map: &MapData,
        view: &ViewDef,
        visited: &mut VisitSet,
    ) -> Vec<SectorId>;
}

/// A straight-down orthographic view over the whole map, for tests and
/// headless statistics runs where everything should pass the frustum.
pub fn overhead_view(map: &MapData, center: Vec2, half_extent: f32) -> ViewDef {
    let (min_floor, max_ceiling) = map.height_extents();
    let eye = Vec3::new(center.x, center.y, max_ceiling + 64.0);
    let proj = Mat4::orthographic_rh(
        -half_extent,
        half_extent,
        -half_extent,
        half_extent,
        0.1,
        max_ceiling - min_floor + 256.0,
    );
    let view = Mat4::look_at_rh(eye, Vec3::new(center.x, center.y, min_floor), Vec3::Y);
    ViewDef::new(eye, &(proj * view))
}
