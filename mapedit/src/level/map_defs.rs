use std::fmt;

use glam::{IVec2, Vec2};

use crate::level::{SectorId, SideDefId, VertexId};

/// Fixed 8-byte texture or flat name, space padded, uppercase. The level
/// format stores names this way and the texture provider looks them up
/// this way.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TexName([u8; 8]);

impl TexName {
    pub fn new(name: &str) -> Self {
        let mut bytes = [b' '; 8];
        for (i, b) in name.bytes().take(8).enumerate() {
            bytes[i] = b.to_ascii_uppercase();
        }
        Self(bytes)
    }

    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0)
            .unwrap_or_default()
            .trim_end_matches([' ', '\0'])
    }

    /// Sky flats are never given a ceiling surface.
    pub fn is_sky(&self) -> bool {
        self.0.starts_with(b"F_SKY")
    }
}

impl fmt::Display for TexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Debug for TexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TexName({:?})", self.as_str())
    }
}

#[repr(u32)]
pub enum LineDefFlags {
    /// Agents cannot cross this line. Set on every single-sided line: with
    /// no sector on the other side there is nowhere to go anyway.
    Blocking = 1,
    /// The line joins two sectors and acts as a portal between them.
    TwoSided = 1 << 2,
}

/// An edge between two vertices, holding up to two sides. A line with only
/// a front side is a solid outer wall; one with both sides is the shared
/// boundary of exactly two sectors.
#[derive(Debug, Clone)]
pub struct LineDef {
    pub start: VertexId,
    pub end: VertexId,
    pub flags: u32,
    pub front: Option<SideDefId>,
    pub back: Option<SideDefId>,
}

impl LineDef {
    pub fn is_two_sided(&self) -> bool {
        self.flags & LineDefFlags::TwoSided as u32 != 0
    }

    pub fn is_blocking(&self) -> bool {
        self.flags & LineDefFlags::Blocking as u32 != 0
    }

    /// True if this line joins `v1` and `v2` in either direction.
    pub fn joins(&self, v1: VertexId, v2: VertexId) -> bool {
        (self.start == v1 && self.end == v2) || (self.start == v2 && self.end == v1)
    }

    pub fn sides(&self) -> [Option<SideDefId>; 2] {
        [self.front, self.back]
    }
}

/// Per-line-per-side texture state, facing exactly one sector.
#[derive(Debug, Clone)]
pub struct SideDef {
    /// Added to the computed texture column.
    pub x_offset: f32,
    /// Added to the computed texture top.
    pub y_offset: f32,
    pub top: Option<TexName>,
    pub bottom: Option<TexName>,
    pub mid: Option<TexName>,
    /// The sector this side faces.
    pub sector: SectorId,
}

/// A region of constant floor and ceiling height, bounded by the linedefs
/// whose sides reference it. The boundary may be non-convex and
/// multiply-connected.
#[derive(Debug, Clone)]
pub struct Sector {
    pub floor_height: f32,
    pub ceiling_height: f32,
    pub floor_tex: TexName,
    pub ceiling_tex: TexName,
    pub light_level: u8,
    /// Extent of the bound geometry. Recomputed by the rebuild step only,
    /// never by editing code.
    pub bbox: BBox,
}

/// A map decoration or spawn point. Stored verbatim from the loader; only
/// the player start (kind 1) is interpreted here.
#[derive(Debug, Clone, Copy)]
pub struct Thing {
    pub pos: IVec2,
    pub angle: i16,
    pub kind: i16,
}

pub const PLAYER_START: i16 = 1;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BBox {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl BBox {
    pub fn new(v1: Vec2, v2: Vec2) -> Self {
        let mut bbox = BBox::default();

        if v1.x < v2.x {
            bbox.left = v1.x;
            bbox.right = v2.x;
        } else {
            bbox.left = v2.x;
            bbox.right = v1.x;
        }

        if v1.y < v2.y {
            bbox.bottom = v1.y;
            bbox.top = v2.y;
        } else {
            bbox.bottom = v2.y;
            bbox.top = v1.y;
        }

        bbox
    }

    /// The reversed-infinity box, ready to be grown vertex by vertex.
    pub fn empty() -> Self {
        Self {
            top: f32::MIN,
            bottom: f32::MAX,
            left: f32::MAX,
            right: f32::MIN,
        }
    }

    pub fn grow(&mut self, v: Vec2) {
        if v.y > self.top {
            self.top = v.y;
        }
        if v.y < self.bottom {
            self.bottom = v.y;
        }
        if v.x < self.left {
            self.left = v.x;
        }
        if v.x > self.right {
            self.right = v.x;
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.bottom && p.y <= self.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn texname_padding_and_case() {
        let t = TexName::new("bronze1");
        assert_eq!(t.as_str(), "BRONZE1");
        assert_eq!(t, TexName::new("BRONZE1"));
        assert_eq!(TexName::new("verylongname").as_str(), "VERYLONG");
    }

    #[test]
    fn texname_sky() {
        assert!(TexName::new("F_SKY1").is_sky());
        assert!(!TexName::new("FLOOR4_8").is_sky());
    }

    #[test]
    fn bbox_orients_corners() {
        let b = BBox::new(Vec2::new(100.0, -20.0), Vec2::new(-50.0, 80.0));
        assert_eq!(b.left, -50.0);
        assert_eq!(b.right, 100.0);
        assert_eq!(b.bottom, -20.0);
        assert_eq!(b.top, 80.0);
        assert!(b.contains(Vec2::new(0.0, 0.0)));
        assert!(!b.contains(Vec2::new(0.0, 81.0)));
    }

    #[test]
    fn bbox_grow_from_empty() {
        let mut b = BBox::empty();
        b.grow(Vec2::new(10.0, 10.0));
        b.grow(Vec2::new(-10.0, 30.0));
        assert_eq!(b.left, -10.0);
        assert_eq!(b.right, 10.0);
        assert_eq!(b.bottom, 10.0);
        assert_eq!(b.top, 30.0);
    }
}
