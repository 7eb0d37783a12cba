//! Visibility by walking a prebuilt BSP tree front to back, rejecting
//! whole subtrees against the frustum by their bounding boxes.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::Vec2;
use log::debug;

use crate::MapData;
use crate::level::SectorId;
use crate::level::node::{BspTree, IS_SUBSECTOR_MASK};
use crate::visibility::{PortalTraversal, SectorVisibility, ViewDef, VisitSet};

pub struct BspTraversal;

impl SectorVisibility for BspTraversal {
    fn visible_sectors(
        &self,
        map: &MapData,
        view: &ViewDef,
        visited: &mut VisitSet,
    ) -> Vec<SectorId> {
        #[cfg(feature = "hprof")]
        profile!("bsp_traversal");

        let Some(tree) = map.bsp().filter(|t| !t.is_empty()) else {
            // Hand-drawn maps have no node data yet; the portal flood
            // covers them.
            debug!("No BSP data, falling back to portal traversal");
            return PortalTraversal.visible_sectors(map, view, visited);
        };

        visited.clear();
        let (z_min, z_max) = map.height_extents();
        let mut out = Vec::new();
        walk_node(map, tree, tree.root(), view, visited, &mut out, z_min, z_max);
        out
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_node(
    map: &MapData,
    tree: &BspTree,
    node_id: u32,
    view: &ViewDef,
    visited: &mut VisitSet,
    out: &mut Vec<SectorId>,
    z_min: f32,
    z_max: f32,
) {
    if node_id & IS_SUBSECTOR_MASK != 0 {
        let index = (node_id & !IS_SUBSECTOR_MASK) as usize;
        let Some(subsector) = tree.subsectors.get(index) else {
            return;
        };
        if subsector.sector.index() >= map.sectors().len() {
            return;
        }
        if visited.insert(subsector.sector) {
            out.push(subsector.sector);
        }
        return;
    }

    let Some(node) = tree.nodes.get(node_id as usize) else {
        return;
    };

    // Near subtree first keeps the output front to back.
    let eye = Vec2::new(view.position.x, view.position.y);
    let near = node.point_on_side(eye);
    for side in [near, near ^ 1] {
        if view.frustum.intersects_bbox(&node.bboxes[side], z_min, z_max) {
            walk_node(
                map,
                tree,
                node.children[side],
                view,
                visited,
                out,
                z_min,
                z_max,
            );
        }
    }
}
