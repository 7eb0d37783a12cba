//! Headless driver for the map engine: replays editor operations to build
//! a map, rebuilds the renderable mesh, then runs the visibility
//! strategies and a few collision ticks and reports what they did. The
//! windowed editor shell plugs in the same calls with a UI around them.

mod cli;
mod config;

use std::error::Error;

use cli::CLIOptions;
use mapedit::collision::{self, Agent, EYE_HEIGHT};
use mapedit::editor::{self, EditSession};
use mapedit::glam::{IVec2, Mat4, Vec2, Vec3};
use mapedit::log::{self, info, warn};
use mapedit::mesh::{self, TextureLookup};
use mapedit::visibility::{
    BspTraversal, PortalTraversal, SectorVisibility, ViewDef, VisitSet,
};
use mapedit::{LineDefId, MapData, SectorId, TexName, Thing};
use simplelog::TermLogger;

use crate::config::{Strategy, UserConfig};

const BASE_DIR: &str = "roomedit/";
const ROOM_SIZE: i32 = 256;

/// Stand-in for the texture provider: a few known names with real
/// dimensions, 64x64 for everything else.
struct DemoTextures;

impl TextureLookup for DemoTextures {
    fn texture_size(&self, name: TexName) -> Option<(u16, u16)> {
        match name.as_str() {
            "BRONZE1" => Some((64, 128)),
            "FLOOR" | "CEIL" => Some((64, 64)),
            _ => None,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();

    TermLogger::init(
        options.verbose.unwrap_or(log::LevelFilter::Info),
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut user_config = UserConfig::load();
    user_config.sync_cli(&mut options);
    user_config.write();

    let mut map = MapData::new();
    let start = build_demo_map(&mut map, user_config.grid_size, user_config.rooms);

    let mesh = mesh::rebuild(&mut map, &DemoTextures);
    info!(
        "Demo map: {} sectors, {} linedefs, {} mesh vertices",
        map.sectors().len(),
        map.linedefs().len(),
        mesh.vertices.len()
    );

    run_visibility(&map, start, user_config.strategy);
    run_collision_ticks(&map, start);

    Ok(())
}

/// Replay an editing session: a hub room, a chain of rooms to the east
/// joined by shared-edge portals, a nested room with a raised floor, and
/// one split wall.
fn build_demo_map(map: &mut MapData, grid_size: i32, rooms: u32) -> Vec2 {
    let mut session = EditSession::new();
    session.grid_size = grid_size;

    for i in 0..rooms.max(1) as i32 {
        draw_room(
            map,
            &mut session,
            IVec2::new(i * ROOM_SIZE, 0),
            IVec2::new((i + 1) * ROOM_SIZE, ROOM_SIZE),
        );
        mesh::rebuild(map, &DemoTextures);
    }

    // A room inside the hub inherits its context; raising its floor makes
    // a platform with risers.
    let quarter = ROOM_SIZE / 4;
    draw_room(
        map,
        &mut session,
        IVec2::new(quarter, quarter),
        IVec2::new(quarter * 2, quarter * 2),
    );
    if let Some(platform) = map.sectors().len().checked_sub(1) {
        map.sector_mut(SectorId::new(platform as u16)).floor_height = 16.0;
    }
    mesh::rebuild(map, &DemoTextures);

    // Split the hub's west wall, as an editor click on the line would.
    if !map.linedefs().is_empty() {
        let west = find_west_wall(map);
        editor::split_linedef(map, west, IVec2::new(0, ROOM_SIZE / 2));
        mesh::rebuild(map, &DemoTextures);
    }

    let start = IVec2::new(ROOM_SIZE * 3 / 4, ROOM_SIZE / 2);
    map.append_thing(Thing {
        pos: start,
        angle: 0,
        kind: mapedit::level::map_defs::PLAYER_START,
    });

    start.as_vec2()
}

fn draw_room(map: &mut MapData, session: &mut EditSession, min: IVec2, max: IVec2) {
    for p in [
        IVec2::new(min.x, min.y),
        IVec2::new(max.x, min.y),
        IVec2::new(max.x, max.y),
        IVec2::new(min.x, max.y),
    ] {
        session.add_point(p);
    }
    if editor::finish_sector(map, session).is_none() {
        warn!("Demo room at {min}..{max} was not created");
    }
}

fn find_west_wall(map: &MapData) -> LineDefId {
    for (i, line) in map.linedefs().iter().enumerate() {
        let (v1, v2) = map.line_vertices(line);
        if v1.x == 0.0 && v2.x == 0.0 {
            return LineDefId::new(i as u16);
        }
    }
    LineDefId::new(0)
}

fn run_visibility(map: &MapData, eye_2d: Vec2, strategy: Strategy) {
    let start_sector = mapedit::query::find_player_sector(map, eye_2d);
    let floor = start_sector.map_or(0.0, |s| map.sector(s).floor_height);
    let eye = Vec3::new(eye_2d.x, eye_2d.y, floor + EYE_HEIGHT);

    // Look east along the room chain.
    let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 4.0 / 3.0, 1.0, 4096.0);
    let look = Mat4::look_at_rh(eye, eye + Vec3::X, Vec3::Z);
    let view = ViewDef::new(eye, &(proj * look));

    let mut visited = VisitSet::with_capacity(map.sectors().len());

    let portal_set = matches!(strategy, Strategy::Portal | Strategy::Both).then(|| {
        let set = PortalTraversal.visible_sectors(map, &view, &mut visited);
        info!("Portal traversal: {} of {} sectors visible", set.len(), map.sectors().len());
        set
    });
    let bsp_set = matches!(strategy, Strategy::Bsp | Strategy::Both).then(|| {
        let set = BspTraversal.visible_sectors(map, &view, &mut visited);
        info!("BSP traversal: {} of {} sectors visible", set.len(), map.sectors().len());
        set
    });

    // The strategies are interchangeable and expected to agree; a mismatch
    // on a hand-drawn map is a bug worth hearing about.
    if let (Some(mut portal), Some(mut bsp)) = (portal_set, bsp_set) {
        portal.sort();
        bsp.sort();
        if portal == bsp {
            info!("Visibility strategies agree");
        } else {
            warn!(
                "Visibility strategies disagree: portal {:?} vs bsp {:?}",
                portal, bsp
            );
        }
    }
}

fn run_collision_ticks(map: &MapData, start: Vec2) {
    let mut agent = Agent::spawned(map, start);
    info!(
        "Agent spawned at {} in sector {:?}",
        agent.pos, agent.sector
    );

    // Walk east into the room chain, angling into the north wall so the
    // slide response gets some work.
    for _ in 0..30 {
        collision::update_position(map, &mut agent, Vec2::new(16.0, 6.0));
    }
    info!(
        "Agent after 30 ticks: {} (feet {}) in sector {:?}",
        agent.pos,
        agent.feet(),
        agent.sector
    );
}
