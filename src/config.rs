// config.rs
// Fixed simulation parameters. There is no config file or environment variable
// layer: per the render/input contract these are load-bearing constants shared
// by the world graph, the terrain automata, and the renderer.

/// Width/height of a freshly created square [`crate::world::Board`].
pub const BOARD_SIZE: i32 = 100;
/// Radius (in cells) of the player's sight fan and the laser's sample range.
pub const SIGHT_RADIUS: i32 = 50;
/// Width/height of the player-centered memory map; always odd so the player
/// glyph sits on a single center cell.
pub const MEMORY_MAP_SIZE: i32 = 101;
/// Upper bound of a cell's `plant` counter.
pub const PLANT_MAX: i32 = 10;
/// Water depth at/under which a cell is still `Walkable` (not `Empty`).
pub const SHALLOW_WATER_DEPTH: i32 = 3;
/// Steam pressure produced per unit of water boiled off by fire.
pub const STEAM_PER_WATER: i32 = 100;
/// Average number of ticks before a plant spawns into a free neighboring cell.
pub const AVG_PLANT_SPAWN_TIME: i32 = 20;
/// Average number of ticks before fire spreads to a flammable neighbor.
pub const AVG_FIRE_SPREAD_TIME: i32 = 2;
/// Average number of ticks before standing water flows downhill by one unit.
pub const AVG_WATER_FLOW_TIME: i32 = 1;

/// Laser waveform parameters (see [`crate::player::shoot_laser`]).
pub const LASER_WAVELENGTH: f64 = 5.0;
pub const LASER_PERIOD: f64 = 5.0;
pub const LASER_GROWTH_SCALE: f64 = 0.01;
pub const LASER_GROWTH_MAX: f64 = 2.0;
pub const LASER_DISTANCE_SCALE: f64 = 0.2;
pub const LASER_NUM_STREAMS: i32 = 5;
/// Sample spacing along the laser's x-axis, in cells.
pub const LASER_SAMPLE_STEP: i32 = 3;

/// Turret defaults for `buildTurret`; a player-built turret's per-instance
/// fields aren't given explicit numbers by the source, so these are picked as
/// reasonable defaults -- see DESIGN.md.
pub const TURRET_MAX_COOLDOWN: i32 = 10;
pub const TURRET_DETECTION_RANGE: i32 = SIGHT_RADIUS;

/// Denominator `N` such that the per-tick probability is `1/N`, derived from
/// `2*(avg_time-1)`. `N <= 1` means the event happens every tick.
fn spread_denominator(avg_ticks: i32) -> u32 {
	(2 * (avg_ticks - 1)).max(1) as u32
}
/// Denominator for the fire-spread roll: the source burns out over 2 turns on average.
pub fn fire_spread_denominator() -> u32 {
	spread_denominator(AVG_FIRE_SPREAD_TIME)
}
/// Denominator for the water-flow roll.
pub fn water_flow_denominator() -> u32 {
	spread_denominator(AVG_WATER_FLOW_TIME)
}
/// Denominator for the plant-spawn roll.
pub fn plant_spawn_denominator() -> u32 {
	spread_denominator(AVG_PLANT_SPAWN_TIME)
}

// EOF
