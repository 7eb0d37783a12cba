//! Agent movement against the map: nearest point-to-segment wall tests,
//! slide response along the wall tangent, and sector transition rules
//! (step height, ceiling clearance). Runs once per simulation tick,
//! independent of rendering.

use glam::Vec2;
use math::closest_point_on_segment;

use crate::MapData;
use crate::level::map_defs::LineDef;
use crate::level::{SectorId, VertexId};
use crate::query;

/// Highest floor rise an agent steps over without being blocked.
pub const MAX_STEP: f32 = 24.0;
/// Eye height above the floor; also the clearance a sector must offer.
pub const EYE_HEIGHT: f32 = 48.0;
/// Default agent radius.
pub const AGENT_RADIUS: f32 = 12.0;
/// Kept between the agent shell and any wall.
pub const WALL_DIST: f32 = 2.0;

const EPSILON: f32 = 0.1;
const MAX_SLIDE_DEPTH: u32 = 3;
/// Walls meeting at shallower angles than this (as a dot product of their
/// directions) do not count as a corner.
const CORNER_DOT: f32 = 0.7;

/// A moving body: the player, or anything walking the map.
#[derive(Debug, Clone, Copy)]
pub struct Agent {
    pub pos: Vec2,
    /// Eye position, floor height plus [`EYE_HEIGHT`] when grounded.
    pub z: f32,
    pub radius: f32,
    /// Sector the agent currently stands in, if known.
    pub sector: Option<SectorId>,
}

impl Agent {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            z: EYE_HEIGHT,
            radius: AGENT_RADIUS,
            sector: None,
        }
    }

    /// Spawn standing on the floor of the sector under `pos`.
    pub fn spawned(map: &MapData, pos: Vec2) -> Self {
        let mut agent = Self::new(pos);
        if let Some(sector) = query::find_player_sector(map, pos) {
            agent.z = map.sector(sector).floor_height + EYE_HEIGHT;
            agent.sector = Some(sector);
        }
        agent
    }

    pub fn feet(&self) -> f32 {
        self.z - EYE_HEIGHT
    }
}

#[derive(Debug, Clone, Copy)]
struct Contact {
    /// Wall normal, oriented away from the agent.
    normal: Vec2,
    /// Closest point on the obstacle.
    point: Vec2,
    corner: bool,
}

/// Move the agent, sliding along walls it runs into. The desired motion
/// is tried directly, then projected onto the blocking wall's tangent,
/// then at half magnitude; corners deflect the motion around the post.
pub fn update_position(map: &MapData, agent: &mut Agent, delta: Vec2) {
    slide_move(map, agent, delta, 0);
}

fn slide_move(map: &MapData, agent: &mut Agent, delta: Vec2, depth: u32) {
    if depth > MAX_SLIDE_DEPTH || delta.length_squared() < EPSILON * EPSILON {
        return;
    }

    let target = agent.pos + delta;
    let Some(contact) = check_collision(map, target, agent.feet(), agent.radius) else {
        // Clear of walls; sector rules may still reject the move.
        try_enter(map, agent, target);
        return;
    };

    if contact.corner {
        steer_around_corner(map, agent, &contact, delta, depth);
        return;
    }

    let slide = calc_slide(delta, contact.normal);
    if slide.length_squared() < EPSILON * EPSILON {
        return;
    }

    let slid = agent.pos + slide;
    if check_collision(map, slid, agent.feet(), agent.radius).is_none() {
        try_enter(map, agent, slid);
        return;
    }
    slide_move(map, agent, slide * 0.5, depth + 1);
}

/// Commit a move if the destination sector will have the agent: there
/// must be one, the step up must be within range, and the gap must be
/// tall enough. The agent's z snaps to the destination floor.
fn try_enter(map: &MapData, agent: &mut Agent, target: Vec2) -> bool {
    let Some(sector) = query::find_player_sector(map, target) else {
        return false;
    };
    let dest = map.sector(sector);
    if dest.floor_height - agent.feet() > MAX_STEP {
        return false;
    }
    if dest.ceiling_height - dest.floor_height < EYE_HEIGHT {
        return false;
    }

    agent.pos = target;
    agent.z = dest.floor_height + EYE_HEIGHT;
    agent.sector = Some(sector);
    true
}

/// Nearest obstacle within reach of `pos`, checking corner posts first
/// and then wall segments. Returns `None` when the position is clear.
fn check_collision(map: &MapData, pos: Vec2, feet: f32, radius: f32) -> Option<Contact> {
    let reach = radius + WALL_DIST;
    let mut max_dist_sq = reach * reach;
    let mut contact = None;

    // Corner posts.
    for (i, v) in map.vertexes().iter().enumerate() {
        let v = v.as_vec2();
        let d = pos - v;
        let d_sq = d.length_squared();
        if d_sq < max_dist_sq && d_sq > EPSILON * EPSILON {
            if !is_corner(map, VertexId::new(i as u16)) {
                continue;
            }
            let dist = d_sq.sqrt();
            contact = Some(Contact {
                normal: d / dist,
                point: v,
                corner: true,
            });
            max_dist_sq = d_sq;
        }
    }

    // Wall segments.
    for line in map.linedefs() {
        if can_pass_wall(map, line, feet) {
            continue;
        }
        let (v1, v2) = map.line_vertices(line);
        if (v2 - v1).length_squared() < EPSILON {
            continue;
        }

        let (closest, t) = closest_point_on_segment(pos, v1, v2);
        let d_sq = pos.distance_squared(closest);
        // Endpoints are the corner tests' business.
        if d_sq >= max_dist_sq || !(0.01..=0.99).contains(&t) {
            continue;
        }

        let along = (v2 - v1).normalize();
        let mut normal = Vec2::new(-along.y, along.x);
        if (pos - closest).dot(normal) < 0.0 {
            normal = -normal;
        }

        contact = Some(Contact {
            normal,
            point: closest,
            corner: false,
        });
        max_dist_sq = d_sq;
    }

    contact
}

/// A wall lets an agent through when it has two sides and both floors
/// are within stepping range of the agent's feet. Identical heights on
/// both sides always pass.
fn can_pass_wall(map: &MapData, line: &LineDef, feet: f32) -> bool {
    let (Some(front), Some(back)) = (line.front, line.back) else {
        return false;
    };
    let s1 = map.sector(map.sidedef(front).sector);
    let s2 = map.sector(map.sidedef(back).sector);

    if s1.floor_height == s2.floor_height && s1.ceiling_height == s2.ceiling_height {
        return true;
    }

    s1.floor_height - feet <= MAX_STEP && s2.floor_height - feet <= MAX_STEP
}

/// A vertex is a corner when two of its walls meet at a sharp enough
/// angle to poke past both wall segments' collision slabs.
fn is_corner(map: &MapData, vertex: VertexId) -> bool {
    let mut directions: Vec<Vec2> = Vec::new();
    let origin = map.vertex(vertex).as_vec2();

    for line in map.linedefs() {
        let direction = if line.start == vertex {
            map.vertex(line.end).as_vec2() - origin
        } else if line.end == vertex {
            origin - map.vertex(line.start).as_vec2()
        } else {
            continue;
        };
        let len = direction.length();
        if len > EPSILON {
            directions.push(direction / len);
        }
    }

    if directions.len() <= 1 {
        return false;
    }
    for i in 0..directions.len() {
        for j in (i + 1)..directions.len() {
            if directions[i].dot(directions[j]) < CORNER_DOT {
                return true;
            }
        }
    }
    false
}

/// Project the motion onto the wall tangent, keeping the original speed.
fn calc_slide(delta: Vec2, normal: Vec2) -> Vec2 {
    let dot = delta.dot(normal);
    if dot > -f32::EPSILON {
        // Not moving into the wall.
        return delta;
    }

    let mut slide = delta - normal * dot;
    let len = slide.length();
    if len > f32::EPSILON {
        slide = slide * (delta.length() / len);
    }
    slide
}

/// Deflect the motion to one side of a corner post and retry.
fn steer_around_corner(
    map: &MapData,
    agent: &mut Agent,
    contact: &Contact,
    delta: Vec2,
    depth: u32,
) {
    let away = agent.pos - contact.point;
    let dist = away.length();
    if dist <= EPSILON {
        return;
    }

    let move_angle = delta.y.atan2(delta.x);
    let away_angle = away.y.atan2(away.x);
    let bend = if move_angle - away_angle > 0.0 { 0.5 } else { -0.5 };
    let new_angle = away_angle + bend;

    let deflected = Vec2::new(new_angle.cos(), new_angle.sin()) * delta.length();
    slide_move(map, agent, deflected, depth + 1);
}
