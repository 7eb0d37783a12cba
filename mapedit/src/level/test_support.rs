//! Small map fixtures shared by the unit and integration tests.

use glam::IVec2;

use crate::level::map_defs::{LineDef, Sector, SideDef};
use crate::level::map_data::MapData;
use crate::level::{SectorId, SideDefId, VertexId};

/// One square sector with corner at `(x, y)` and the given edge length,
/// bound by four one-sided walls. Bboxes are up to date.
pub fn square_map(x: i32, y: i32, size: i32) -> MapData {
    let mut map = MapData::new();
    let sector = map.append_sector(Sector::with_defaults()).unwrap();
    append_square(&mut map, sector, x, y, size);
    crate::query::update_sector_bboxes(&mut map);
    map
}

/// Append a square footprint bound to `sector`. Returns the corner
/// vertex ids in CCW order.
pub fn append_square(map: &mut MapData, sector: SectorId, x: i32, y: i32, size: i32) -> [VertexId; 4] {
    let corners = [
        IVec2::new(x, y),
        IVec2::new(x + size, y),
        IVec2::new(x + size, y + size),
        IVec2::new(x, y + size),
    ];
    let ids = corners.map(|c| map.append_vertex(c).unwrap());
    for i in 0..4 {
        let side = map.append_sidedef(SideDef::with_defaults(sector)).unwrap();
        map.append_linedef(LineDef::with_derived_flags(
            ids[i],
            ids[(i + 1) % 4],
            Some(side),
            None,
        ))
        .unwrap();
    }
    ids
}

/// The unit square map but with the linedef array rotated, for checking
/// that results do not depend on which edge starts the boundary list.
pub fn square_map_with_edge_rotation(rotation: usize) -> MapData {
    let mut map = MapData::new();
    let sector = map.append_sector(Sector::with_defaults()).unwrap();

    let corners = [
        IVec2::new(0, 0),
        IVec2::new(100, 0),
        IVec2::new(100, 100),
        IVec2::new(0, 100),
    ];
    let ids = corners.map(|c| map.append_vertex(c).unwrap());

    let mut sides: Vec<SideDefId> = Vec::new();
    for _ in 0..4 {
        sides.push(map.append_sidedef(SideDef::with_defaults(sector)).unwrap());
    }
    for n in 0..4 {
        let i = (n + rotation) % 4;
        map.append_linedef(LineDef::with_derived_flags(
            ids[i],
            ids[(i + 1) % 4],
            Some(sides[i]),
            None,
        ))
        .unwrap();
    }
    crate::query::update_sector_bboxes(&mut map);
    map
}
