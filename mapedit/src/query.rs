//! Point containment and sector lookup. Both the editor (hit-testing,
//! parent-sector discovery) and the per-tick gameplay path go through
//! here, so the bounding-box rejection in [`point_in_sector`] is a hard
//! requirement, not an optimisation.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::Vec2;

use crate::MapData;
use crate::level::SectorId;
use crate::level::map_defs::BBox;

/// Even-odd containment test of a point against one sector's boundary.
///
/// An out-of-range sector index is "not found", never a panic. The fast
/// path rejects against the sector bbox; only then are the sector's own
/// edges walked for the ray cast. The parity count toggles once per
/// referencing side, so which linedef starts the boundary list has no
/// effect on the result.
pub fn point_in_sector(map: &MapData, p: Vec2, sector: SectorId) -> bool {
    #[cfg(feature = "hprof")]
    profile!("point_in_sector");

    let Some(sec) = map.sectors().get(sector.index()) else {
        return false;
    };
    if !sec.bbox.contains(p) {
        return false;
    }

    let mut inside = false;
    for line in map.linedefs() {
        for side in line.sides().iter().flatten() {
            if map.sidedef(*side).sector != sector {
                continue;
            }
            let (v1, v2) = map.line_vertices(line);
            if (v1.y > p.y) != (v2.y > p.y)
                && p.x < (v2.x - v1.x) * (p.y - v1.y) / (v2.y - v1.y) + v1.x
            {
                inside = !inside;
            }
        }
    }
    inside
}

/// The sector a standing agent at `p` occupies. Stacked or overlapping
/// sectors resolve deterministically to the one with the highest floor.
pub fn find_player_sector(map: &MapData, p: Vec2) -> Option<SectorId> {
    #[cfg(feature = "hprof")]
    profile!("find_player_sector");

    let mut found: Option<SectorId> = None;
    for i in 0..map.sectors().len() {
        let id = SectorId::new(i as u16);
        if !point_in_sector(map, p, id) {
            continue;
        }
        match found {
            Some(best) if map.sector(best).floor_height >= map.sector(id).floor_height => {}
            _ => found = Some(id),
        }
    }
    found
}

/// Extent of the geometry bound to `sector`. A sector with no bound
/// edges gets a zeroed box so the containment fast path rejects
/// everything.
pub fn compute_sector_bbox(map: &MapData, sector: SectorId) -> BBox {
    let mut bbox = BBox::empty();
    let mut found = false;

    for line in map.linedefs() {
        if !map.line_bounds_sector(line, sector) {
            continue;
        }
        let (v1, v2) = map.line_vertices(line);
        bbox.grow(v1);
        bbox.grow(v2);
        found = true;
    }

    if found { bbox } else { BBox::default() }
}

/// Refresh every sector's bbox. Runs as part of the rebuild step after
/// topology mutation; editing code never writes bboxes directly.
pub fn update_sector_bboxes(map: &mut MapData) {
    for i in 0..map.sectors().len() {
        let id = SectorId::new(i as u16);
        let bbox = compute_sector_bbox(map, id);
        map.sectors_mut()[i].bbox = bbox;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::test_support::square_map;
    use glam::Vec2;

    #[test]
    fn bbox_rejection_and_containment() {
        let map = square_map(0, 0, 100);

        let sector = SectorId::new(0);
        assert!(!point_in_sector(&map, Vec2::new(-50.0, 50.0), sector));
        assert!(!point_in_sector(&map, Vec2::new(150.0, 50.0), sector));
        assert!(!point_in_sector(&map, Vec2::new(50.0, -50.0), sector));
        assert!(!point_in_sector(&map, Vec2::new(50.0, 150.0), sector));
        assert!(point_in_sector(&map, Vec2::new(50.0, 50.0), sector));
    }

    #[test]
    fn out_of_range_sector_is_not_found() {
        let map = square_map(0, 0, 100);
        assert!(!point_in_sector(&map, Vec2::new(50.0, 50.0), SectorId::new(9)));
    }

    #[test]
    fn stacked_sectors_resolve_to_highest_floor() {
        // Two coincident squares, the second with a raised floor.
        let mut map = square_map(0, 0, 100);
        let second = crate::editor::add_sector(&mut map).unwrap();
        map.sector_mut(second).floor_height = 32.0;
        // Rebind the same footprint to the second sector.
        for i in 0..4 {
            let side = crate::SideDef::with_defaults(second);
            let side = map.append_sidedef(side).unwrap();
            let line = map.linedefs()[i].clone();
            map.append_linedef(crate::LineDef::with_derived_flags(
                line.start,
                line.end,
                Some(side),
                None,
            ));
        }
        update_sector_bboxes(&mut map);

        let found = find_player_sector(&map, Vec2::new(50.0, 50.0)).unwrap();
        assert_eq!(found, second);
    }

    #[test]
    fn containment_invariant_to_edge_order() {
        // The same square with its linedef list rotated: results agree.
        for rotation in 0..4 {
            let map = square_map_rotated(rotation);
            assert!(point_in_sector(&map, Vec2::new(50.0, 50.0), SectorId::new(0)));
            assert!(!point_in_sector(
                &map,
                Vec2::new(50.0, 101.0),
                SectorId::new(0)
            ));
        }
    }

    fn square_map_rotated(rotation: usize) -> crate::MapData {
        use crate::level::test_support::square_map_with_edge_rotation;
        square_map_with_edge_rotation(rotation)
    }
}
