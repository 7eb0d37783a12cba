//! Portal-flood visibility: start where the camera stands and spread
//! across two-sided linedefs whose opening intersects the frustum.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::Vec2;
use log::debug;

use crate::MapData;
use crate::level::SectorId;
use crate::query;
use crate::visibility::{SectorVisibility, ViewDef, VisitSet};

pub struct PortalTraversal;

impl SectorVisibility for PortalTraversal {
    fn visible_sectors(
        &self,
        map: &MapData,
        view: &ViewDef,
        visited: &mut VisitSet,
    ) -> Vec<SectorId> {
        #[cfg(feature = "hprof")]
        profile!("portal_traversal");

        visited.clear();
        if map.sectors().is_empty() {
            return Vec::new();
        }

        let eye = Vec2::new(view.position.x, view.position.y);
        let start = match query::find_player_sector(map, eye) {
            Some(sector) => sector,
            None => {
                // Outside every sector, e.g. noclip or a fresh map view.
                debug!("Viewpoint in no sector, starting traversal at sector 0");
                SectorId::new(0)
            }
        };

        let mut out = Vec::new();
        visit_sector(map, start, view, visited, &mut out);
        out
    }
}

fn visit_sector(
    map: &MapData,
    sector: SectorId,
    view: &ViewDef,
    visited: &mut VisitSet,
    out: &mut Vec<SectorId>,
) {
    // The visit set cuts adjacency cycles: recursion depth is bounded by
    // the number of live sectors, not by the portal graph's loops.
    if !visited.insert(sector) {
        return;
    }
    out.push(sector);

    for line in map.linedefs() {
        if !line.is_two_sided() {
            continue;
        }
        if !map.line_bounds_sector(line, sector) {
            continue;
        }
        let Some(neighbour) = map.sector_across_line(line, sector) else {
            continue;
        };
        if visited.contains(neighbour) {
            continue;
        }

        // The opening is bounded by the neighbour's heights, not ours:
        // stairs and risers change the gap from the far side.
        let other = map.sector(neighbour);
        let (v1, v2) = map.line_vertices(line);
        if view
            .frustum
            .intersects_quad(v1, v2, other.floor_height, other.ceiling_height)
        {
            visit_sector(map, neighbour, view, visited, out);
        }
    }
}
