//! Topology editing: the operations that grow a map while keeping the
//! entity arrays consistent, and the session state for interactive
//! sector drawing.
//!
//! Every operation takes the map (and where needed the session) by
//! reference; there is no process-wide "current map" or selection. After
//! any mutating operation the caller runs [`crate::mesh::rebuild`] to
//! refresh bounding boxes and renderable surfaces.

use glam::{IVec2, Vec2};
use log::{info, warn};

use crate::MapData;
use crate::level::map_defs::{LineDef, LineDefFlags, Sector, SideDef};
use crate::level::{LineDefId, SectorId, SideDefId, VertexId};
use crate::query;

/// Distance inside which a clicked point reuses an existing vertex.
pub const SNAP_RADIUS: i32 = 8;

/// In-progress interactive drawing state. One per editing viewport; owned
/// by the call site, passed by reference to every operation that needs it.
#[derive(Debug)]
pub struct EditSession {
    pub grid_size: i32,
    drawing: bool,
    draw_points: Vec<IVec2>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self {
            grid_size: 32,
            drawing: false,
            draw_points: Vec::new(),
        }
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn draw_points(&self) -> &[IVec2] {
        &self.draw_points
    }

    /// Abandon the current chain without touching the map.
    pub fn reset(&mut self) {
        self.drawing = false;
        self.draw_points.clear();
    }

    /// Record a clicked point. Returns `true` when the click lands back on
    /// the starting point and the loop is ready for [`finish_sector`]; the
    /// closing point itself is not stored.
    pub fn add_point(&mut self, p: IVec2) -> bool {
        if !self.drawing {
            self.drawing = true;
            self.draw_points.clear();
        }

        if self.draw_points.len() > 2 {
            let first = self.draw_points[0];
            let close = self.grid_size / 2;
            if (p.x - first.x).abs() < close && (p.y - first.y).abs() < close {
                return true;
            }
        }

        self.draw_points.push(p);
        false
    }
}

/// The existing vertex within [`SNAP_RADIUS`] of `p`, if any.
pub fn find_vertex_near(map: &MapData, p: IVec2) -> Option<VertexId> {
    let threshold = SNAP_RADIUS * SNAP_RADIUS;
    for (i, v) in map.vertexes().iter().enumerate() {
        let d = *v - p;
        if d.x * d.x + d.y * d.y < threshold {
            return Some(VertexId::new(i as u16));
        }
    }
    None
}

pub fn point_exists(map: &MapData, p: IVec2) -> bool {
    find_vertex_near(map, p).is_some()
}

/// Add a vertex, reusing any existing one within the snap radius.
pub fn add_vertex(map: &mut MapData, p: IVec2) -> Option<VertexId> {
    if let Some(existing) = find_vertex_near(map, p) {
        return Some(existing);
    }
    map.append_vertex(p)
}

/// Add a sector with the editing defaults: floor 0, ceiling 128,
/// light 160.
pub fn add_sector(map: &mut MapData) -> Option<SectorId> {
    map.append_sector(Sector::with_defaults())
}

/// Add a sidedef facing `sector` with the editing defaults: zero offsets,
/// placeholder mid texture, no top or bottom.
pub fn add_sidedef(map: &mut MapData, sector: SectorId) -> Option<SideDefId> {
    map.append_sidedef(SideDef::with_defaults(sector))
}

/// Add a linedef between two vertices. Flags derive from side presence:
/// single-sided lines are impassable.
pub fn add_linedef(
    map: &mut MapData,
    start: VertexId,
    end: VertexId,
    front: Option<SideDefId>,
    back: Option<SideDefId>,
) -> Option<LineDefId> {
    map.append_linedef(LineDef::with_derived_flags(start, end, front, back))
}

/// The linedef joining `v1` and `v2`, in either direction: `(a, b)` and
/// `(b, a)` are the same line for existence checks.
pub fn find_linedef_between(map: &MapData, v1: VertexId, v2: VertexId) -> Option<LineDefId> {
    map.linedefs()
        .iter()
        .position(|l| l.joins(v1, v2))
        .map(|i| LineDefId::new(i as u16))
}

/// Split a linedef at `p`, which the caller has snapped onto the line.
///
/// A vertex is inserted at `p` and a new trailing linedef covers the
/// second half. Texture continuity is preserved by duplicating the
/// original's sidedef state (textures and offsets copied, never
/// recomputed), and the original's flags carry over unchanged. Returns
/// the inserted vertex.
pub fn split_linedef(map: &mut MapData, line_id: LineDefId, p: IVec2) -> Option<VertexId> {
    let line = map.linedef(line_id).clone();
    let mid = add_vertex(map, p)?;
    if mid == line.start || mid == line.end {
        // Snapped onto an endpoint, nothing to split.
        return Some(mid);
    }

    let front = match line.front {
        Some(s) => {
            let copy = map.sidedef(s).clone();
            Some(map.append_sidedef(copy)?)
        }
        None => None,
    };
    let back = match line.back {
        Some(s) => {
            let copy = map.sidedef(s).clone();
            Some(map.append_sidedef(copy)?)
        }
        None => None,
    };

    let trailing = LineDef {
        start: mid,
        end: line.end,
        flags: line.flags,
        front,
        back,
    };
    let trailing_id = map.append_linedef(trailing)?;
    map.linedef_mut(line_id).end = mid;

    info!("Split linedef {line_id} at {p}, new linedef {trailing_id}");
    Some(mid)
}

/// Follow the chain of drawn linedefs from `line`'s end vertex. When the
/// chain arrives back at `line`'s start the ordered vertex loop is
/// returned, ready for [`finish_sector`].
pub fn check_closed_loop(map: &MapData, line_id: LineDefId) -> Option<Vec<VertexId>> {
    let line = map.linedef(line_id);
    let start = line.start;
    let mut loop_verts = vec![start, line.end];
    let mut used = vec![false; map.linedefs().len()];
    used[line_id.index()] = true;

    let mut current = line.end;
    while current != start {
        let mut advanced = false;
        for (i, ld) in map.linedefs().iter().enumerate() {
            if used[i] {
                continue;
            }
            let next = if ld.start == current {
                ld.end
            } else if ld.end == current {
                ld.start
            } else {
                continue;
            };
            used[i] = true;
            current = next;
            if current != start {
                loop_verts.push(current);
            }
            advanced = true;
            break;
        }
        if !advanced {
            return None;
        }
    }

    (loop_verts.len() >= 3).then_some(loop_verts)
}

/// Close the current draw chain into a new sector.
///
/// The loop is normalised to counter-clockwise winding. Each edge either
/// reuses an existing linedef, promoting it to two-sided with its mid
/// textures cleared, or creates a fresh linedef and sidedef. The new
/// sector inherits floor, ceiling, textures and light from the sector
/// enclosing the polygon centroid, and any of that parent's sides caught
/// inside the new boundary are re-associated to the new sector, so
/// drawing a room inside a room splits the space the way the user
/// expects.
///
/// Fewer than three points only resets the drawing state; the map is
/// untouched.
pub fn finish_sector(map: &mut MapData, session: &mut EditSession) -> Option<SectorId> {
    if session.draw_points.len() < 3 {
        warn!("Need at least 3 points to create a sector");
        session.reset();
        return None;
    }

    let mut points = std::mem::take(&mut session.draw_points);
    session.reset();

    // Counter-clockwise is what determines the front side everywhere else.
    let ring: Vec<Vec2> = points.iter().map(|p| p.as_vec2()).collect();
    if math::polygon_area(&ring) < 0.0 {
        points.reverse();
    }

    // The enclosing sector is found before any mutation, while the store
    // still describes the pre-edit world.
    let centroid = polygon_centroid(&points);
    let parent = query::find_player_sector(map, centroid);

    let mut verts = Vec::with_capacity(points.len());
    for p in &points {
        verts.push(add_vertex(map, *p)?);
    }
    // Snapping may have collapsed neighbouring clicks onto one vertex.
    verts.dedup();
    while verts.len() > 1 && verts.first() == verts.last() {
        verts.pop();
    }
    if verts.len() < 3 {
        warn!("Sector outline collapsed below 3 vertices, nothing created");
        return None;
    }

    let sector = add_sector(map)?;
    if let Some(parent) = parent {
        let src = map.sector(parent).clone();
        let dst = map.sector_mut(sector);
        dst.floor_height = src.floor_height;
        dst.ceiling_height = src.ceiling_height;
        dst.floor_tex = src.floor_tex;
        dst.ceiling_tex = src.ceiling_tex;
        dst.light_level = src.light_level;
    }

    let mut boundary = vec![false; map.linedefs().len() + verts.len()];

    for i in 0..verts.len() {
        let vi = verts[i];
        let vn = verts[(i + 1) % verts.len()];

        if let Some(line_id) = find_linedef_between(map, vi, vn) {
            promote_shared_edge(map, line_id, vi, vn, sector, parent);
            if line_id.index() < boundary.len() {
                boundary[line_id.index()] = true;
            }
        } else {
            // Store the edge reversed so the front side faces the interior
            // of the counter-clockwise loop.
            let side = add_sidedef(map, sector)?;
            let line_id = add_linedef(map, vn, vi, Some(side), None)?;
            if line_id.index() >= boundary.len() {
                boundary.resize(line_id.index() + 1, false);
            }
            boundary[line_id.index()] = true;
        }
    }

    if let Some(parent) = parent {
        reassign_enclosed_sides(map, &points, parent, sector, &boundary);
    }

    info!("Created sector {sector} with {} vertices", verts.len());
    Some(sector)
}

/// An existing linedef reused as an edge of a new sector becomes a portal:
/// the side facing the new interior is attached or re-associated, the mid
/// textures go away, and the flags flip from blocking to two-sided.
fn promote_shared_edge(
    map: &mut MapData,
    line_id: LineDefId,
    vi: VertexId,
    vn: VertexId,
    sector: SectorId,
    parent: Option<SectorId>,
) {
    let line = map.linedef(line_id).clone();

    if line.front.is_some() && line.back.is_some() {
        // A third side does not exist in this world.
        warn!("Linedef {line_id} already has two sides");
        return;
    }

    // The interior of the CCW loop lies left of vi -> vn. A line stored in
    // the same direction therefore faces the new sector with its back
    // side; stored reversed, with its front.
    let facing_is_front = line.start == vn && line.end == vi;
    let facing = if facing_is_front { line.front } else { line.back };

    match facing {
        Some(side) if parent == Some(map.sidedef(side).sector) => {
            // The parent owned this wall; the new sector takes it over.
            map.sidedef_mut(side).sector = sector;
        }
        Some(_) => {
            // The facing slot belongs to someone else; fill the open one.
            let Some(side) = add_sidedef(map, sector) else {
                return;
            };
            let line = map.linedef_mut(line_id);
            if facing_is_front {
                line.back = Some(side);
            } else {
                line.front = Some(side);
            }
        }
        None => {
            let Some(side) = add_sidedef(map, sector) else {
                return;
            };
            let line = map.linedef_mut(line_id);
            if facing_is_front {
                line.front = Some(side);
            } else {
                line.back = Some(side);
            }
        }
    }

    let line = map.linedef(line_id).clone();
    for side in line.sides().into_iter().flatten() {
        map.sidedef_mut(side).mid = None;
    }
    let line = map.linedef_mut(line_id);
    line.flags &= !(LineDefFlags::Blocking as u32);
    line.flags |= LineDefFlags::TwoSided as u32;
}

/// Splitting a sector: every parent-owned side on a linedef enclosed by
/// the new polygon now faces the new sector instead.
fn reassign_enclosed_sides(
    map: &mut MapData,
    polygon: &[IVec2],
    parent: SectorId,
    sector: SectorId,
    boundary: &[bool],
) {
    let ring: Vec<Vec2> = polygon.iter().map(|p| p.as_vec2()).collect();

    let mut reassign = Vec::new();
    for (i, line) in map.linedefs().iter().enumerate() {
        if boundary.get(i).copied().unwrap_or(false) {
            continue;
        }
        let (v1, v2) = map.line_vertices(line);
        let mid = (v1 + v2) / 2.0;
        if !math::point_in_polygon(mid, &ring) {
            continue;
        }
        for side in line.sides().into_iter().flatten() {
            if map.sidedef(side).sector == parent {
                reassign.push(side);
            }
        }
    }

    for side in reassign {
        map.sidedef_mut(side).sector = sector;
    }
}

fn polygon_centroid(points: &[IVec2]) -> Vec2 {
    let sum = points
        .iter()
        .fold(Vec2::ZERO, |acc, p| acc + p.as_vec2());
    sum / points.len() as f32
}
