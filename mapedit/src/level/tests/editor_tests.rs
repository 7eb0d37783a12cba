use glam::{IVec2, Vec2};

use crate::editor::{
    EditSession, add_linedef, add_sidedef, add_vertex, check_closed_loop, find_linedef_between,
    finish_sector, point_exists, split_linedef,
};
use crate::level::{LineDefId, MAX_ENTITIES, SectorId, VertexId};
use crate::mesh::sector_boundary;
use crate::{MapData, query};

fn draw(session: &mut EditSession, points: &[(i32, i32)]) {
    for &(x, y) in points {
        session.add_point(IVec2::new(x, y));
    }
}

#[test]
fn vertex_snap_radius_reuses_nearby() {
    let mut map = MapData::new();
    let a = add_vertex(&mut map, IVec2::new(0, 0)).unwrap();
    // Within the 8-unit radius: same vertex comes back.
    let b = add_vertex(&mut map, IVec2::new(5, 5)).unwrap();
    assert_eq!(a, b);
    assert_eq!(map.vertexes().len(), 1);
    // On the radius boundary: a fresh vertex.
    let c = add_vertex(&mut map, IVec2::new(8, 0)).unwrap();
    assert_ne!(a, c);
    assert_eq!(map.vertexes().len(), 2);

    assert!(point_exists(&map, IVec2::new(2, -2)));
    assert!(!point_exists(&map, IVec2::new(50, 50)));
}

#[test]
fn finish_sector_builds_a_square_room() {
    let mut map = MapData::new();
    let mut session = EditSession::new();
    draw(&mut session, &[(0, 0), (128, 0), (128, 128), (0, 128)]);

    let sector = finish_sector(&mut map, &mut session).unwrap();

    assert_eq!(map.sectors().len(), 1);
    assert_eq!(map.vertexes().len(), 4);
    assert_eq!(map.linedefs().len(), 4);
    assert_eq!(map.sidedefs().len(), 4);
    assert!(!session.is_drawing());

    // Editing defaults.
    let sec = map.sector(sector);
    assert_eq!(sec.floor_height, 0.0);
    assert_eq!(sec.ceiling_height, 128.0);
    assert_eq!(sec.light_level, 160);

    // Fresh walls are one-sided and impassable, with a placeholder mid.
    for line in map.linedefs() {
        assert!(line.is_blocking());
        assert!(!line.is_two_sided());
        assert!(line.back.is_none());
        let side = map.sidedef(line.front.unwrap());
        assert_eq!(side.sector, sector);
        assert!(side.mid.is_some());
    }

    query::update_sector_bboxes(&mut map);
    assert!(query::point_in_sector(&map, Vec2::new(64.0, 64.0), sector));
}

#[test]
fn finish_sector_normalises_clockwise_input() {
    let mut map = MapData::new();
    let mut session = EditSession::new();
    // Clockwise order.
    draw(&mut session, &[(0, 0), (0, 128), (128, 128), (128, 0)]);
    let sector = finish_sector(&mut map, &mut session).unwrap();

    query::update_sector_bboxes(&mut map);
    assert!(query::point_in_sector(&map, Vec2::new(64.0, 64.0), sector));
    let ring = sector_boundary(&map, sector).unwrap();
    assert_eq!(ring.len(), 4);
    assert_eq!(math::polygon_area(&ring).abs(), 128.0 * 128.0);
}

#[test]
fn finish_sector_rejects_short_loops() {
    let mut map = MapData::new();
    let mut session = EditSession::new();
    draw(&mut session, &[(0, 0), (128, 0)]);

    assert!(finish_sector(&mut map, &mut session).is_none());
    assert_eq!(map.vertexes().len(), 0);
    assert_eq!(map.linedefs().len(), 0);
    assert_eq!(map.sidedefs().len(), 0);
    assert_eq!(map.sectors().len(), 0);
    assert!(!session.is_drawing());
    assert!(session.draw_points().is_empty());

    // The session is immediately usable again.
    draw(&mut session, &[(0, 0), (128, 0), (64, 128)]);
    assert!(finish_sector(&mut map, &mut session).is_some());
    assert_eq!(map.sectors().len(), 1);
}

#[test]
fn session_close_click_signals_loop() {
    let mut session = EditSession::new();
    assert!(!session.add_point(IVec2::new(0, 0)));
    assert!(!session.add_point(IVec2::new(128, 0)));
    assert!(!session.add_point(IVec2::new(128, 128)));
    assert!(!session.add_point(IVec2::new(0, 128)));
    // A click near the first point closes the loop without storing it.
    assert!(session.add_point(IVec2::new(4, -4)));
    assert_eq!(session.draw_points().len(), 4);
}

#[test]
fn shared_edge_becomes_a_portal() {
    let mut map = MapData::new();
    let mut session = EditSession::new();
    draw(&mut session, &[(0, 0), (128, 0), (128, 128), (0, 128)]);
    let left = finish_sector(&mut map, &mut session).unwrap();

    draw(&mut session, &[(128, 0), (256, 0), (256, 128), (128, 128)]);
    let right = finish_sector(&mut map, &mut session).unwrap();

    // Two corners were reused, two added.
    assert_eq!(map.vertexes().len(), 6);
    // The shared edge was reused: three new lines, not four.
    assert_eq!(map.linedefs().len(), 7);

    let v1 = crate::editor::find_vertex_near(&map, IVec2::new(128, 0)).unwrap();
    let v2 = crate::editor::find_vertex_near(&map, IVec2::new(128, 128)).unwrap();
    let shared = find_linedef_between(&map, v1, v2).unwrap();
    let line = map.linedef(shared);

    assert!(line.is_two_sided());
    assert!(!line.is_blocking());
    let sectors = [
        map.sidedef(line.front.unwrap()).sector,
        map.sidedef(line.back.unwrap()).sector,
    ];
    assert!(sectors.contains(&left));
    assert!(sectors.contains(&right));
    // A portal has no mid texture on either side.
    assert!(map.sidedef(line.front.unwrap()).mid.is_none());
    assert!(map.sidedef(line.back.unwrap()).mid.is_none());
}

#[test]
fn third_side_is_a_logged_no_op() {
    let mut map = MapData::new();
    let mut session = EditSession::new();
    draw(&mut session, &[(0, 0), (128, 0), (128, 128), (0, 128)]);
    finish_sector(&mut map, &mut session).unwrap();
    draw(&mut session, &[(128, 0), (256, 0), (256, 128), (128, 128)]);
    finish_sector(&mut map, &mut session).unwrap();

    let sides_before = map.sidedefs().len();
    let v1 = crate::editor::find_vertex_near(&map, IVec2::new(128, 0)).unwrap();
    let v2 = crate::editor::find_vertex_near(&map, IVec2::new(128, 128)).unwrap();
    let shared = find_linedef_between(&map, v1, v2).unwrap();
    let (front, back) = {
        let line = map.linedef(shared);
        (line.front, line.back)
    };

    // A third sector tries to take the same wall.
    draw(&mut session, &[(128, 0), (128, 128), (64, 64)]);
    finish_sector(&mut map, &mut session).unwrap();

    let line = map.linedef(shared);
    assert_eq!(line.front, front);
    assert_eq!(line.back, back);
    // Only the triangle's own two new edges got sidedefs.
    assert_eq!(map.sidedefs().len(), sides_before + 2);
}

#[test]
fn nested_sector_inherits_parent_context() {
    let mut map = MapData::new();
    let mut session = EditSession::new();
    draw(&mut session, &[(0, 0), (256, 0), (256, 256), (0, 256)]);
    let outer = finish_sector(&mut map, &mut session).unwrap();
    {
        let sec = map.sector_mut(outer);
        sec.floor_height = 16.0;
        sec.ceiling_height = 200.0;
        sec.light_level = 96;
        sec.floor_tex = crate::TexName::new("MFLR8_1");
    }
    query::update_sector_bboxes(&mut map);

    draw(&mut session, &[(64, 64), (192, 64), (192, 192), (64, 192)]);
    let inner = finish_sector(&mut map, &mut session).unwrap();

    let sec = map.sector(inner);
    assert_eq!(sec.floor_height, 16.0);
    assert_eq!(sec.ceiling_height, 200.0);
    assert_eq!(sec.light_level, 96);
    assert_eq!(sec.floor_tex, crate::TexName::new("MFLR8_1"));

    // Raised above its parent, the nested room wins the stacked-sector
    // lookup.
    map.sector_mut(inner).floor_height = 40.0;
    query::update_sector_bboxes(&mut map);
    assert_eq!(
        query::find_player_sector(&map, Vec2::new(128.0, 128.0)),
        Some(inner)
    );
    assert_eq!(
        query::find_player_sector(&map, Vec2::new(32.0, 32.0)),
        Some(outer)
    );
}

#[test]
fn enclosed_parent_sides_are_reassigned() {
    let mut map = MapData::new();
    let mut session = EditSession::new();
    draw(&mut session, &[(0, 0), (256, 0), (256, 256), (0, 256)]);
    let outer = finish_sector(&mut map, &mut session).unwrap();
    query::update_sector_bboxes(&mut map);

    // A free-standing interior wall owned by the outer sector.
    let a = map.append_vertex(IVec2::new(100, 100)).unwrap();
    let b = map.append_vertex(IVec2::new(150, 100)).unwrap();
    let side = add_sidedef(&mut map, outer).unwrap();
    add_linedef(&mut map, a, b, Some(side), None).unwrap();

    // Drawing a room around the wall splits it off the parent.
    draw(&mut session, &[(64, 64), (192, 64), (192, 192), (64, 192)]);
    let inner = finish_sector(&mut map, &mut session).unwrap();

    assert_eq!(map.sidedef(side).sector, inner);
}

#[test]
fn split_preserves_texture_state_and_areas() {
    let mut map = MapData::new();
    let mut session = EditSession::new();
    draw(&mut session, &[(0, 0), (64, 0), (64, 64), (0, 64)]);
    let left = finish_sector(&mut map, &mut session).unwrap();
    draw(&mut session, &[(64, 0), (128, 0), (128, 64), (64, 64)]);
    let right = finish_sector(&mut map, &mut session).unwrap();
    query::update_sector_bboxes(&mut map);

    let v1 = crate::editor::find_vertex_near(&map, IVec2::new(64, 0)).unwrap();
    let v2 = crate::editor::find_vertex_near(&map, IVec2::new(64, 64)).unwrap();
    let shared = find_linedef_between(&map, v1, v2).unwrap();
    map.sidedef_mut(map.linedef(shared).front.unwrap()).x_offset = 24.0;

    let vertexes_before = map.vertexes().len();
    let linedefs_before = map.linedefs().len();

    let mid = split_linedef(&mut map, shared, IVec2::new(64, 32)).unwrap();

    // One vertex in, two linedefs where one was.
    assert_eq!(map.vertexes().len(), vertexes_before + 1);
    assert_eq!(map.linedefs().len(), linedefs_before + 1);
    assert_eq!(map.vertex(mid), IVec2::new(64, 32));

    let original = map.linedef(shared).clone();
    let trailing = map.linedefs().last().unwrap().clone();
    assert_eq!(original.end, mid);
    assert_eq!(trailing.start, mid);
    assert_eq!(trailing.flags, original.flags);

    // Texture continuity: offsets copied, not recomputed.
    assert_eq!(
        map.sidedef(trailing.front.unwrap()).x_offset,
        map.sidedef(original.front.unwrap()).x_offset
    );

    // Both squares still enclose their full area.
    for sector in [left, right] {
        let ring = sector_boundary(&map, sector).unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(math::polygon_area(&ring).abs(), 64.0 * 64.0);
    }
}

#[test]
fn split_a_plain_wall_keeps_sector_area() {
    let mut map = MapData::new();
    let mut session = EditSession::new();
    draw(&mut session, &[(0, 0), (128, 0), (128, 128), (0, 128)]);
    let sector = finish_sector(&mut map, &mut session).unwrap();

    split_linedef(&mut map, LineDefId::new(0), IVec2::new(64, 0)).unwrap();
    query::update_sector_bboxes(&mut map);

    let ring = sector_boundary(&map, sector).unwrap();
    assert_eq!(math::polygon_area(&ring).abs(), 128.0 * 128.0);
    assert!(query::point_in_sector(&map, Vec2::new(64.0, 64.0), sector));
}

#[test]
fn closed_loop_detection_walks_the_chain() {
    let mut map = MapData::new();
    let a = add_vertex(&mut map, IVec2::new(0, 0)).unwrap();
    let b = add_vertex(&mut map, IVec2::new(128, 0)).unwrap();
    let c = add_vertex(&mut map, IVec2::new(64, 128)).unwrap();

    let first = add_linedef(&mut map, a, b, None, None).unwrap();
    assert!(check_closed_loop(&map, first).is_none());

    add_linedef(&mut map, b, c, None, None).unwrap();
    assert!(check_closed_loop(&map, first).is_none());

    add_linedef(&mut map, c, a, None, None).unwrap();
    let verts = check_closed_loop(&map, first).unwrap();
    assert_eq!(verts, vec![a, b, c]);
}

#[test]
fn append_stops_at_the_index_ceiling() {
    let mut map = MapData::new();
    for i in 0..MAX_ENTITIES {
        assert!(map.append_vertex(IVec2::new(i as i32, i as i32 * 3)).is_some());
    }
    assert_eq!(map.vertexes().len(), MAX_ENTITIES);
    // The ceiling is a no-op signal, not a crash, and nothing changed.
    assert!(map.append_vertex(IVec2::new(-1, -1)).is_none());
    assert_eq!(map.vertexes().len(), MAX_ENTITIES);

    let last = VertexId::new((MAX_ENTITIES - 1) as u16);
    assert_eq!(
        map.vertex(last),
        IVec2::new((MAX_ENTITIES - 1) as i32, (MAX_ENTITIES - 1) as i32 * 3)
    );
}

#[test]
fn sidedef_defaults_match_the_editor() {
    let mut map = MapData::new();
    let sector = crate::editor::add_sector(&mut map).unwrap();
    let side = add_sidedef(&mut map, sector).unwrap();
    let side = map.sidedef(side);
    assert_eq!(side.x_offset, 0.0);
    assert_eq!(side.y_offset, 0.0);
    assert!(side.top.is_none());
    assert!(side.bottom.is_none());
    assert_eq!(side.mid, Some(crate::TexName::new("BRONZE1")));
    assert_eq!(side.sector, SectorId::new(0));
}
