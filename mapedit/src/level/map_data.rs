use glam::{IVec2, Vec2};
use log::{error, info, warn};

use crate::level::map_defs::{BBox, LineDef, LineDefFlags, Sector, SideDef, Thing};
use crate::level::node::{BspTree, Node, SubSector};
use crate::level::raw::{self, RawLevel};
use crate::level::{LineDefId, MAX_ENTITIES, SectorId, SideDefId, VertexId};

/// Everything that makes up a map at runtime: the four entity arrays,
/// things, and the optional BSP acceleration structure.
///
/// The arrays are append-only. Entities are never removed one by one; a
/// map is only ever discarded whole. `append_*` returns `None` once the
/// 16-bit index space is exhausted, and callers treat that as a no-op
/// signal.
#[derive(Default)]
pub struct MapData {
    vertexes: Vec<IVec2>,
    linedefs: Vec<LineDef>,
    sidedefs: Vec<SideDef>,
    sectors: Vec<Sector>,
    things: Vec<Thing>,
    bsp: Option<BspTree>,
}

impl MapData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge the loader's raw arrays into runtime form. Out-of-range side
    /// or sector references are dropped with a warning rather than kept as
    /// dangling indices.
    pub fn from_raw(raw: &RawLevel) -> Self {
        let mut map = MapData::new();

        map.vertexes = raw
            .vertexes
            .iter()
            .map(|v| IVec2::new(v.x as i32, v.y as i32))
            .collect();
        info!("Loaded {} vertexes", map.vertexes.len());

        map.sectors = raw
            .sectors
            .iter()
            .map(|s| Sector {
                floor_height: s.floor_height as f32,
                ceiling_height: s.ceiling_height as f32,
                floor_tex: crate::TexName::from_bytes(s.floor_tex),
                ceiling_tex: crate::TexName::from_bytes(s.ceiling_tex),
                light_level: s.light_level.clamp(0, 255) as u8,
                bbox: BBox::default(),
            })
            .collect();
        info!("Loaded {} sectors", map.sectors.len());

        map.sidedefs = raw
            .sidedefs
            .iter()
            .map(|s| SideDef {
                x_offset: s.x_offset as f32,
                y_offset: s.y_offset as f32,
                top: raw::tex_name_opt(s.top),
                bottom: raw::tex_name_opt(s.bottom),
                mid: raw::tex_name_opt(s.mid),
                sector: SectorId::new(s.sector),
            })
            .collect();
        info!("Loaded {} sidedefs", map.sidedefs.len());

        let num_sides = map.sidedefs.len();
        let side = move |index: u16| {
            if index == raw::NO_SIDE {
                None
            } else if (index as usize) < num_sides {
                Some(SideDefId::new(index))
            } else {
                warn!("Linedef references missing sidedef {index}, dropped");
                None
            }
        };
        map.linedefs = raw
            .linedefs
            .iter()
            .map(|l| LineDef {
                start: VertexId::new(l.start),
                end: VertexId::new(l.end),
                flags: l.flags as u32,
                front: side(l.sides[0]),
                back: side(l.sides[1]),
            })
            .collect();
        info!("Loaded {} linedefs", map.linedefs.len());

        map.things = raw
            .things
            .iter()
            .map(|t| Thing {
                pos: IVec2::new(t.x as i32, t.y as i32),
                angle: t.angle,
                kind: t.kind,
            })
            .collect();
        info!("Loaded {} things", map.things.len());

        if !raw.nodes.is_empty() && !raw.subsectors.is_empty() {
            let nodes = raw
                .nodes
                .iter()
                .map(|n| Node {
                    xy: Vec2::new(n.x as f32, n.y as f32),
                    delta: Vec2::new(n.dx as f32, n.dy as f32),
                    bboxes: [bbox_from_raw(&n.bboxes[0]), bbox_from_raw(&n.bboxes[1])],
                    children: n.children,
                })
                .collect();
            let subsectors = raw
                .subsectors
                .iter()
                .map(|s| SubSector {
                    sector: SectorId::new(s.sector),
                })
                .collect();
            map.bsp = Some(BspTree { nodes, subsectors });
            info!(
                "Loaded {} bsp nodes, {} subsectors",
                raw.nodes.len(),
                raw.subsectors.len()
            );
        }

        crate::query::update_sector_bboxes(&mut map);
        map
    }

    pub fn vertexes(&self) -> &[IVec2] {
        &self.vertexes
    }

    pub fn linedefs(&self) -> &[LineDef] {
        &self.linedefs
    }

    pub fn sidedefs(&self) -> &[SideDef] {
        &self.sidedefs
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn things(&self) -> &[Thing] {
        &self.things
    }

    pub fn bsp(&self) -> Option<&BspTree> {
        self.bsp.as_ref()
    }

    pub fn set_bsp(&mut self, tree: BspTree) {
        self.bsp = Some(tree);
    }

    pub fn vertex(&self, id: VertexId) -> IVec2 {
        self.vertexes[id.index()]
    }

    pub fn linedef(&self, id: LineDefId) -> &LineDef {
        &self.linedefs[id.index()]
    }

    pub fn linedef_mut(&mut self, id: LineDefId) -> &mut LineDef {
        &mut self.linedefs[id.index()]
    }

    pub fn sidedef(&self, id: SideDefId) -> &SideDef {
        &self.sidedefs[id.index()]
    }

    pub fn sidedef_mut(&mut self, id: SideDefId) -> &mut SideDef {
        &mut self.sidedefs[id.index()]
    }

    pub fn sector(&self, id: SectorId) -> &Sector {
        &self.sectors[id.index()]
    }

    pub fn sector_mut(&mut self, id: SectorId) -> &mut Sector {
        &mut self.sectors[id.index()]
    }

    pub(crate) fn sectors_mut(&mut self) -> &mut [Sector] {
        &mut self.sectors
    }

    pub fn line_vertices(&self, line: &LineDef) -> (Vec2, Vec2) {
        (
            self.vertex(line.start).as_vec2(),
            self.vertex(line.end).as_vec2(),
        )
    }

    /// True if either side of `line` faces `sector`.
    pub fn line_bounds_sector(&self, line: &LineDef, sector: SectorId) -> bool {
        line.sides()
            .iter()
            .flatten()
            .any(|side| self.sidedef(*side).sector == sector)
    }

    /// The sector on the other side of a two-sided line, looking from
    /// `sector`.
    pub fn sector_across_line(&self, line: &LineDef, sector: SectorId) -> Option<SectorId> {
        let front = line.front.map(|s| self.sidedef(s).sector);
        let back = line.back.map(|s| self.sidedef(s).sector);
        match (front, back) {
            (Some(f), Some(b)) if f == sector => Some(b),
            (Some(f), Some(b)) if b == sector => Some(f),
            _ => None,
        }
    }

    pub fn append_vertex(&mut self, point: IVec2) -> Option<VertexId> {
        if self.vertexes.len() >= MAX_ENTITIES {
            error!("Maximum number of vertexes reached");
            return None;
        }
        let id = VertexId::new(self.vertexes.len() as u16);
        self.vertexes.push(point);
        Some(id)
    }

    pub fn append_linedef(&mut self, line: LineDef) -> Option<LineDefId> {
        if self.linedefs.len() >= MAX_ENTITIES {
            error!("Maximum number of linedefs reached");
            return None;
        }
        let id = LineDefId::new(self.linedefs.len() as u16);
        self.linedefs.push(line);
        Some(id)
    }

    pub fn append_sidedef(&mut self, side: SideDef) -> Option<SideDefId> {
        if self.sidedefs.len() >= MAX_ENTITIES {
            error!("Maximum number of sidedefs reached");
            return None;
        }
        let id = SideDefId::new(self.sidedefs.len() as u16);
        self.sidedefs.push(side);
        Some(id)
    }

    pub fn append_sector(&mut self, sector: Sector) -> Option<SectorId> {
        if self.sectors.len() >= MAX_ENTITIES {
            error!("Maximum number of sectors reached");
            return None;
        }
        let id = SectorId::new(self.sectors.len() as u16);
        self.sectors.push(sector);
        Some(id)
    }

    pub fn append_thing(&mut self, thing: Thing) -> Option<usize> {
        if self.things.len() >= MAX_ENTITIES {
            error!("Maximum number of things reached");
            return None;
        }
        self.things.push(thing);
        Some(self.things.len() - 1)
    }

    /// The player start thing, if the map has one.
    pub fn player_start(&self) -> Option<Thing> {
        self.things
            .iter()
            .find(|t| t.kind == crate::level::map_defs::PLAYER_START)
            .copied()
    }

    /// Lowest floor and highest ceiling over the whole map. Used as the
    /// vertical extent for node bounding boxes, which the on-disk format
    /// stores in 2D only.
    pub fn height_extents(&self) -> (f32, f32) {
        let mut min_floor = f32::MAX;
        let mut max_ceiling = f32::MIN;
        for sector in &self.sectors {
            if sector.floor_height < min_floor {
                min_floor = sector.floor_height;
            }
            if sector.ceiling_height > max_ceiling {
                max_ceiling = sector.ceiling_height;
            }
        }
        if self.sectors.is_empty() {
            (0.0, 0.0)
        } else {
            (min_floor, max_ceiling)
        }
    }
}

/// Raw node boxes are `[top, bottom, left, right]`.
fn bbox_from_raw(b: &[i16; 4]) -> BBox {
    BBox {
        top: b[0] as f32,
        bottom: b[1] as f32,
        left: b[2] as f32,
        right: b[3] as f32,
    }
}

/// Convenience constructors mirroring the editor's defaults. Kept on the
/// types rather than in the editor so loading and editing agree on them.
impl Sector {
    pub fn with_defaults() -> Self {
        Self {
            floor_height: 0.0,
            ceiling_height: 128.0,
            floor_tex: crate::TexName::new("FLOOR"),
            ceiling_tex: crate::TexName::new("CEIL"),
            light_level: 160,
            bbox: BBox::default(),
        }
    }
}

impl SideDef {
    /// A fresh side: no top or bottom, placeholder mid texture.
    pub fn with_defaults(sector: SectorId) -> Self {
        Self {
            x_offset: 0.0,
            y_offset: 0.0,
            top: None,
            bottom: None,
            mid: Some(crate::TexName::new("BRONZE1")),
            sector,
        }
    }
}

impl LineDef {
    /// Flags derive from side presence: a line without a back side is
    /// impassable, one with both sides is a two-sided portal.
    pub fn with_derived_flags(
        start: VertexId,
        end: VertexId,
        front: Option<SideDefId>,
        back: Option<SideDefId>,
    ) -> Self {
        let flags = if back.is_some() {
            LineDefFlags::TwoSided as u32
        } else {
            LineDefFlags::Blocking as u32
        };
        Self {
            start,
            end,
            flags,
            front,
            back,
        }
    }
}
