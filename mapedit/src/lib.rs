//! Core of a sector-based 2.5D level editor and renderer: the map data
//! model, the topology-editing operations that keep it consistent, polygon
//! triangulation into renderable meshes, per-frame visibility traversal and
//! wall-sliding collision.
//!
//! The binary level-format loader, GPU upload, windowing and input handling
//! are external collaborators: raw entity arrays come in through
//! [`level::raw`], renderable surfaces go out as [`mesh::Surface`]
//! descriptors.

pub mod collision;
pub mod editor;
pub mod level;
pub mod mesh;
pub mod query;
pub mod triangulate;
pub mod visibility;

pub use glam;
pub use level::map_data::MapData;
pub use level::map_defs::{BBox, LineDef, LineDefFlags, Sector, SideDef, TexName, Thing};
pub use level::node::{BspTree, Node, SubSector};
pub use level::{LineDefId, SectorId, SideDefId, VertexId};
pub use log;
