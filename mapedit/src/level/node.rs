//! The binary-space-partition acceleration structure. Node building is an
//! external concern; the tree arrives prebuilt alongside the raw entity
//! arrays and is only walked here.

use glam::Vec2;

use crate::level::SectorId;
use crate::level::map_defs::BBox;

/// Marks a node child reference as a leaf subsector index.
pub const IS_SUBSECTOR_MASK: u32 = 0x8000_0000;

/// One splitting node of the BSP tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Where the partition line starts.
    pub xy: Vec2,
    /// Direction and length of the partition line.
    pub delta: Vec2,
    /// Bounding boxes of the child subtrees: `[0]` right/front, `[1]`
    /// left/back.
    pub bboxes: [BBox; 2],
    /// Child node indices; a child with [`IS_SUBSECTOR_MASK`] set is a
    /// leaf and the remaining bits index the subsector array.
    pub children: [u32; 2],
}

impl Node {
    /// Which side of the partition line the point is on: 0 front, 1 back.
    pub fn point_on_side(&self, v: Vec2) -> usize {
        let dx = v.x - self.xy.x;
        let dy = v.y - self.xy.y;

        if (self.delta.y * dx) > (dy * self.delta.x) {
            return 0;
        }
        1
    }
}

/// A convex leaf region of the partition, belonging to one sector.
#[derive(Debug, Clone, Copy)]
pub struct SubSector {
    pub sector: SectorId,
}

/// A complete tree as supplied by the node builder.
#[derive(Debug, Default, Clone)]
pub struct BspTree {
    pub nodes: Vec<Node>,
    pub subsectors: Vec<SubSector>,
}

impl BspTree {
    /// Traversal starts at the last node pushed by the builder.
    pub fn root(&self) -> u32 {
        (self.nodes.len().max(1) - 1) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() || self.subsectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_of_vertical_split() {
        let node = Node {
            xy: Vec2::new(0.0, -10.0),
            delta: Vec2::new(0.0, 20.0),
            bboxes: [BBox::default(), BBox::default()],
            children: [0, 1],
        };
        // Partition runs south to north: front (0) is the east side.
        assert_eq!(node.point_on_side(Vec2::new(5.0, 0.0)), 0);
        assert_eq!(node.point_on_side(Vec2::new(-5.0, 0.0)), 1);
    }
}
