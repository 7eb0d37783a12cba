//! Builds the renderable geometry the graphics collaborator consumes:
//! a flat vertex buffer plus per-surface descriptors into it.
//!
//! Rebuilds are whole-map and synchronous. Edits are human paced, so
//! regenerating everything right after a topology mutation is cheaper
//! than tracking incremental damage.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::{Vec2, Vec3};
use log::{debug, info, warn};

use crate::MapData;
use crate::level::SectorId;
use crate::level::map_defs::{SideDef, TexName};
use crate::query;
use crate::triangulate::triangulate;

/// Flat textures tile at this size when the provider has no dimensions
/// for them.
const FLAT_SIZE: f32 = 64.0;

/// Texture name to pixel dimensions, supplied by the external texture
/// provider.
pub trait TextureLookup {
    fn texture_size(&self, name: TexName) -> Option<(u16, u16)>;
}

/// A lookup with no textures: everything falls back to 64x64. Handy for
/// tests and headless runs.
pub struct NoTextures;

impl TextureLookup for NoTextures {
    fn texture_size(&self, _name: TexName) -> Option<(u16, u16)> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub pos: Vec3,
    pub uv: Vec2,
}

/// One drawable span of the vertex buffer. Wall sections are quads in
/// fan order; flats are triangle lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct Surface {
    pub vertex_start: u32,
    pub vertex_count: u32,
    pub texture: Option<TexName>,
}

/// The up-to-three wall surfaces of one sidedef.
#[derive(Debug, Default, Clone, Copy)]
pub struct WallSections {
    pub upper: Surface,
    pub lower: Surface,
    pub middle: Surface,
}

/// Floor and ceiling of one sector.
#[derive(Debug, Default, Clone, Copy)]
pub struct SectorSurfaces {
    pub floor: Surface,
    pub ceiling: Surface,
}

#[derive(Debug, Default)]
pub struct MapMesh {
    pub vertices: Vec<MeshVertex>,
    /// Indexed like the sidedef array.
    pub walls: Vec<WallSections>,
    /// Indexed like the sector array.
    pub flats: Vec<SectorSurfaces>,
}

/// Regenerate every sector bbox and every renderable surface. Called
/// after each topology mutation and once after loading.
pub fn rebuild(map: &mut MapData, textures: &impl TextureLookup) -> MapMesh {
    #[cfg(feature = "hprof")]
    profile!("mesh_rebuild");

    query::update_sector_bboxes(map);

    let mut mesh = MapMesh {
        vertices: Vec::new(),
        walls: vec![WallSections::default(); map.sidedefs().len()],
        flats: vec![SectorSurfaces::default(); map.sectors().len()],
    };

    build_walls(map, textures, &mut mesh);
    build_flats(map, textures, &mut mesh);

    info!(
        "Rebuilt mesh: {} vertices, {} wall sections, {} sectors",
        mesh.vertices.len(),
        mesh.walls.len(),
        mesh.flats.len()
    );
    mesh
}

fn build_walls(map: &MapData, textures: &impl TextureLookup, mesh: &mut MapMesh) {
    for line in map.linedefs() {
        let (v1, v2) = map.line_vertices(line);

        let front_sector = line.front.map(|s| map.sidedef(s).sector);
        let back_sector = line.back.map(|s| map.sidedef(s).sector);

        // Front side, then the back side mirrored.
        for (side_id, my_sector, other_sector, a, b) in [
            (line.front, front_sector, back_sector, v1, v2),
            (line.back, back_sector, front_sector, v2, v1),
        ] {
            let Some(side_id) = side_id else { continue };
            let Some(my_sector) = my_sector else { continue };
            let side = map.sidedef(side_id);
            let me = map.sector(my_sector);

            let mut sections = WallSections::default();

            if let Some(other) = other_sector {
                let other = map.sector(other);

                // Upper: our ceiling pokes above the neighbour's.
                if me.ceiling_height > other.ceiling_height {
                    sections.upper = push_quad(
                        mesh,
                        textures,
                        a,
                        b,
                        other.ceiling_height,
                        me.ceiling_height,
                        side,
                        side.top,
                    );
                }
                // Lower: our floor sits below the neighbour's.
                if me.floor_height < other.floor_height {
                    sections.lower = push_quad(
                        mesh,
                        textures,
                        a,
                        b,
                        me.floor_height,
                        other.floor_height,
                        side,
                        side.bottom,
                    );
                }
                // Middle spans only the shared opening.
                if side.mid.is_some() {
                    let bottom = me.floor_height.max(other.floor_height);
                    let top = me.ceiling_height.min(other.ceiling_height);
                    if top > bottom {
                        sections.middle =
                            push_quad(mesh, textures, a, b, bottom, top, side, side.mid);
                    }
                }
            } else if side.mid.is_some() {
                sections.middle = push_quad(
                    mesh,
                    textures,
                    a,
                    b,
                    me.floor_height,
                    me.ceiling_height,
                    side,
                    side.mid,
                );
            }

            mesh.walls[side_id.index()] = sections;
        }
    }
}

/// Quad in fan order: bottom-left, bottom-right, top-right, top-left.
/// U runs along the wall scaled by its length over the texture width, V
/// down the span scaled by its height, both shifted by the sidedef
/// offsets.
fn push_quad(
    mesh: &mut MapMesh,
    textures: &impl TextureLookup,
    v1: Vec2,
    v2: Vec2,
    bottom: f32,
    top: f32,
    side: &SideDef,
    texture: Option<TexName>,
) -> Surface {
    let (tw, th) = texture
        .and_then(|t| textures.texture_size(t))
        .map(|(w, h)| (w as f32, h as f32))
        .unwrap_or((FLAT_SIZE, FLAT_SIZE));

    let len = v1.distance(v2);
    let height = top - bottom;
    let uv = |u: f32, v: f32| {
        Vec2::new(
            (u * len + side.x_offset) / tw,
            (v * height + side.y_offset) / th,
        )
    };

    let vertex_start = mesh.vertices.len() as u32;
    mesh.vertices.extend([
        MeshVertex {
            pos: Vec3::new(v1.x, v1.y, bottom),
            uv: uv(0.0, 1.0),
        },
        MeshVertex {
            pos: Vec3::new(v2.x, v2.y, bottom),
            uv: uv(1.0, 1.0),
        },
        MeshVertex {
            pos: Vec3::new(v2.x, v2.y, top),
            uv: uv(1.0, 0.0),
        },
        MeshVertex {
            pos: Vec3::new(v1.x, v1.y, top),
            uv: uv(0.0, 0.0),
        },
    ]);

    Surface {
        vertex_start,
        vertex_count: 4,
        texture,
    }
}

fn build_flats(map: &MapData, textures: &impl TextureLookup, mesh: &mut MapMesh) {
    for i in 0..map.sectors().len() {
        let id = SectorId::new(i as u16);
        let Some(ring) = sector_boundary(map, id) else {
            // Zero triangles is a normal "nothing to draw" state, not an
            // error for the frame.
            continue;
        };

        let triangles = triangulate(&ring);
        if triangles.is_empty() {
            debug!("Sector {id} produced no floor triangles");
            continue;
        }

        let sector = map.sector(id);
        let floor = push_flat(
            mesh,
            textures,
            &triangles,
            sector.floor_height,
            sector.floor_tex,
        );
        mesh.flats[i].floor = floor;
        // Sky ceilings are drawn by the sky dome, not as a flat.
        if !sector.ceiling_tex.is_sky() {
            let ceiling = push_flat(
                mesh,
                textures,
                &triangles,
                sector.ceiling_height,
                sector.ceiling_tex,
            );
            mesh.flats[i].ceiling = ceiling;
        }
    }
}

fn push_flat(
    mesh: &mut MapMesh,
    textures: &impl TextureLookup,
    triangles: &[Vec2],
    z: f32,
    texture: TexName,
) -> Surface {
    let (tw, th) = textures
        .texture_size(texture)
        .map(|(w, h)| (w as f32, h as f32))
        .unwrap_or((FLAT_SIZE, FLAT_SIZE));

    let vertex_start = mesh.vertices.len() as u32;
    mesh.vertices.extend(triangles.iter().map(|p| MeshVertex {
        pos: Vec3::new(p.x, p.y, z),
        uv: Vec2::new(p.x / tw, p.y / th),
    }));

    Surface {
        vertex_start,
        vertex_count: triangles.len() as u32,
        texture: Some(texture),
    }
}

/// Chain the sector's edges into one ordered boundary ring. Walks from
/// the first edge bound to the sector, each step picking the unused edge
/// that continues at the current vertex, until the walk returns to its
/// starting vertex.
pub fn sector_boundary(map: &MapData, sector: SectorId) -> Option<Vec<Vec2>> {
    let linedefs = map.linedefs();
    let first = linedefs
        .iter()
        .position(|l| map.line_bounds_sector(l, sector))?;

    let mut used = vec![false; linedefs.len()];
    used[first] = true;

    let start = linedefs[first].start;
    let mut current = linedefs[first].end;
    let mut ring = vec![map.vertex(start).as_vec2(), map.vertex(current).as_vec2()];

    while current != start {
        let mut found = false;
        for (j, line) in linedefs.iter().enumerate().skip(first + 1) {
            if used[j] || !map.line_bounds_sector(line, sector) {
                continue;
            }
            let next = if line.start == current {
                line.end
            } else if line.end == current {
                line.start
            } else {
                continue;
            };
            used[j] = true;
            current = next;
            if current != start {
                ring.push(map.vertex(current).as_vec2());
            }
            found = true;
            break;
        }
        if !found {
            warn!("Sector {sector} boundary does not close, no flats built");
            return None;
        }
    }

    (ring.len() >= 3).then_some(ring)
}
