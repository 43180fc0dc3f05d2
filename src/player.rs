// player.rs
// The player singleton and its action loop: attemptMove, shootArrow,
// buildTurret, shootLaser. Grounded on worldmap.rs's player position fields
// and on engine/mod.rs's turn dispatcher shape (one command in, one `tick()`
// out); the laser waveform itself has no direct analogue elsewhere in the
// corpus (zgrow-spacegame has no projectile math), using `f64` trig the way
// the rest of the corpus
// reaches for std math rather than pulling in a vector-math crate for five
// sine samples.

use bevy::prelude::Resource;
use log::debug;

use crate::config;
use crate::entity::{spawn_entity, Entity, EntityId, EntityRegistry};
use crate::geometry::{Direction, Transform, Vec2i};
use crate::linecast::{curve_cast, line_cast};
use crate::sight::MemoryMap;
use crate::world::{inverse_transform, is_flyable, is_walkable, BoardId, WorldGraph};

/// Global singleton player state. `player_transform` tracks the net
/// rotation/reflection of the player's local frame relative to the world;
/// it is used only to orient the view and remap input keys, never to alter
/// world-frame geometry directly.
#[derive(Resource, Clone, Debug)]
pub struct Player {
	pub board: BoardId,
	pub pos: Vec2i,
	pub faced_direction: Direction,
	pub player_transform: Transform,
	/// Consecutive laser-fire turns, reset to 0 by any non-laser command;
	/// `shootLaser`'s growth term depends on this.
	pub consecutive_laser_rounds: i32,
}
impl Player {
	pub fn new(board: BoardId, pos: Vec2i) -> Player {
		Player { board, pos, faced_direction: Direction::Right, player_transform: Transform::IDENTITY, consecutive_laser_rounds: 0 }
	}

	/// Environmental push: flowing water also pushes the player one step in
	/// the flow direction, i.e. `attempt_move` with `voluntary = false`. Takes
	/// the live registry and memory map so the shift actually lands on the
	/// rendered memory, not a throwaway copy.
	pub fn push(&mut self, world: &WorldGraph, registry: &mut EntityRegistry, memory: &mut MemoryMap, step: Vec2i) {
		attempt_move(world, registry, self, memory, step, false);
	}
}

/// `attemptMove(step, voluntary)`. `step` is already in world/board frame
/// (the host applies `player_transform` to a `Move(local_dir)` command before
/// calling this). Returns whether the move succeeded.
pub fn attempt_move(world: &WorldGraph, registry: &mut EntityRegistry, player: &mut Player, memory: &mut MemoryMap, step: Vec2i, voluntary: bool) -> bool {
	if voluntary {
		if let Some(dir) = Direction::from_vec(step) {
			player.faced_direction = dir;
		}
	}
	let line = line_cast(world, registry, player.board, player.pos, step, false);
	let Some(mapping) = line.last() else {
		debug!("attempt_move: off-board, no-op");
		return false;
	};
	let dst_cell = world.board(mapping.board).cell(mapping.cell);
	if !is_walkable(dst_cell) {
		debug!("attempt_move: blocked at {:?}/{:?}", mapping.board, mapping.cell);
		return false;
	}
	let inverse = inverse_transform(player.player_transform);
	memory.shift(-(step * inverse));
	player.player_transform = player.player_transform * mapping.transform;
	player.faced_direction = player.faced_direction.apply(mapping.transform);
	player.board = mapping.board;
	player.pos = mapping.cell;
	true
}

/// `shootArrow`: spawns a moving, die-on-touch entity one step ahead of the
/// player if that cell is flyable.
pub fn shoot_arrow(world: &mut WorldGraph, registry: &mut EntityRegistry, player: &Player) -> Option<EntityId> {
	let step = player.faced_direction.to_vec();
	let line = line_cast(world, registry, player.board, player.pos, step, false);
	let mapping = *line.last()?;
	if !is_flyable(world.board(mapping.board).cell(mapping.cell)) {
		return None;
	}
	let facing = player.faced_direction.apply(mapping.transform);
	Some(spawn_entity(world, registry, Entity::arrow(mapping.board, mapping.cell, facing)))
}

/// `buildTurret`: spawns a stationary, can-shoot entity one step ahead of the
/// player if that cell is walkable.
pub fn build_turret(world: &mut WorldGraph, registry: &mut EntityRegistry, player: &Player) -> Option<EntityId> {
	let step = player.faced_direction.to_vec();
	let line = line_cast(world, registry, player.board, player.pos, step, false);
	let mapping = *line.last()?;
	if !is_walkable(world.board(mapping.board).cell(mapping.cell)) {
		return None;
	}
	let facing = player.faced_direction.apply(mapping.transform);
	Some(spawn_entity(
		world,
		registry,
		Entity::turret(mapping.board, mapping.cell, facing, config::TURRET_MAX_COOLDOWN, config::TURRET_DETECTION_RANGE),
	))
}

/// Builds one laser stream's stitched plot: samples
/// `y(x) = sin(x/W - t/P + 2*pi*p/(N+25)) * x*D * min(e^(t*G)-1, Gmax)` at
/// `x = 0, step, 2*step, ..., 2*SIGHT_RADIUS`, then stitches a Bresenham chain
/// between each consecutive sample so the result is a valid `plotted` argument
/// for `curve_cast` (every consecutive pair differs by one orthogonal unit).
fn laser_stream_plot(phase: i32, consecutive_rounds: i32) -> Vec<Vec2i> {
	let t = consecutive_rounds as f64;
	let w = config::LASER_WAVELENGTH;
	let p = config::LASER_PERIOD;
	let n = config::LASER_NUM_STREAMS as f64;
	let phase_offset = 2.0 * std::f64::consts::PI * (phase as f64) / (n + 25.0);
	let growth = (t * config::LASER_GROWTH_SCALE).exp() - 1.0;
	let growth = growth.min(config::LASER_GROWTH_MAX);

	let mut samples = Vec::new();
	let mut x = 0;
	while x <= 2 * config::SIGHT_RADIUS {
		let xf = x as f64;
		let y = (xf / w - t / p + phase_offset).sin() * xf * config::LASER_DISTANCE_SCALE * growth;
		samples.push(Vec2i::new(x, y.round() as i32));
		x += config::LASER_SAMPLE_STEP;
	}

	let mut chain = vec![Vec2i::ZERO];
	let mut cursor = Vec2i::ZERO;
	for sample in samples.into_iter().skip(1) {
		let segment = crate::geometry::plot(sample - cursor);
		for point in segment.into_iter().skip(1) {
			chain.push(cursor + point);
		}
		cursor = sample;
	}
	chain
}

/// Rotates a plot authored in the "facing Right" baseline frame onto
/// `facing`, by composing `CCW` with itself `facing.ccw_rotations_from_right()` times.
fn rotation_to_facing(facing: Direction) -> Transform {
	let mut t = Transform::IDENTITY;
	for _ in 0..facing.ccw_rotations_from_right() {
		t = t * Transform::CCW;
	}
	t
}

/// `shootLaser`: fires `LASER_NUM_STREAMS` curved beams ahead of
/// the player. Along each beam, up to the first wall: ignites the cell,
/// removes any entity there, and consumes one plant hit-point (stopping the
/// beam at the first plant hit, since plants block lasers).
pub fn shoot_laser(world: &mut WorldGraph, registry: &mut EntityRegistry, player: &mut Player) {
	let rotation = rotation_to_facing(player.faced_direction);
	for phase in 0..config::LASER_NUM_STREAMS {
		let baseline = laser_stream_plot(phase, player.consecutive_laser_rounds);
		let rotated: Vec<Vec2i> = baseline.iter().map(|p| *p * rotation).collect();
		let line = curve_cast(world, registry, player.board, player.pos, &rotated, false);
		for mapping in line.mappings.iter() {
			let cell = world.board_mut(mapping.board).cell_mut(mapping.cell);
			if cell.wall {
				break;
			}
			cell.fire = true;
			if let Some(occupant) = cell.occupant.take() {
				crate::entity::remove_entity(world, registry, occupant);
			}
			let cell = world.board_mut(mapping.board).cell_mut(mapping.cell);
			if cell.plant > 0 {
				cell.plant -= 1;
				break;
			}
		}
	}
	player.consecutive_laser_rounds += 1;
}

/// Resets the laser streak; called by every non-laser command.
pub fn reset_laser_streak(player: &mut Player) {
	player.consecutive_laser_rounds = 0;
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::world::{Board, Cell};

	fn fresh() -> (WorldGraph, BoardId, EntityRegistry) {
		let mut world = WorldGraph::new();
		let board = world.add_board(Board::square(20));
		(world, board, EntityRegistry::new())
	}

	#[test]
	fn move_into_empty_cell_updates_position_and_keeps_identity_transform() {
		let (world, board, mut registry) = fresh();
		let mut player = Player::new(board, Vec2i::new(5, 5));
		let mut memory = MemoryMap::new();
		let moved = attempt_move(&world, &mut registry, &mut player, &mut memory, Vec2i::new(1, 0), true);
		assert!(moved);
		assert_eq!(player.pos, Vec2i::new(6, 5));
		assert_eq!(player.faced_direction, Direction::Right);
		assert_eq!(player.player_transform, Transform::IDENTITY);
	}

	#[test]
	fn move_into_wall_is_a_no_op() {
		let (mut world, board, mut registry) = fresh();
		world.board_mut(board).cell_mut(Vec2i::new(6, 5)).wall = true;
		let mut player = Player::new(board, Vec2i::new(5, 5));
		let mut memory = MemoryMap::new();
		let moved = attempt_move(&world, &mut registry, &mut player, &mut memory, Vec2i::new(1, 0), true);
		assert!(!moved);
		assert_eq!(player.pos, Vec2i::new(5, 5));
	}

	#[test]
	fn shoot_arrow_spawns_entity_ahead_when_flyable() {
		let (mut world, board, mut registry) = fresh();
		let player = Player::new(board, Vec2i::new(5, 5));
		let id = shoot_arrow(&mut world, &mut registry, &player).expect("flyable cell ahead");
		let entity = registry.get(id).unwrap();
		assert_eq!(entity.pos, Vec2i::new(6, 5));
		assert!(entity.moving);
		assert!(entity.die_on_touch);
	}

	#[test]
	fn shoot_arrow_blocked_by_wall_spawns_nothing() {
		let (mut world, board, mut registry) = fresh();
		world.board_mut(board).cell_mut(Vec2i::new(6, 5)).wall = true;
		let player = Player::new(board, Vec2i::new(5, 5));
		assert!(shoot_arrow(&mut world, &mut registry, &player).is_none());
	}

	#[test]
	fn laser_ignites_and_stops_at_wall() {
		let (mut world, board, mut registry) = fresh();
		*world.board_mut(board).cell_mut(Vec2i::new(9, 5)) = Cell::wall();
		let mut player = Player::new(board, Vec2i::new(5, 5));
		shoot_laser(&mut world, &mut registry, &mut player);
		assert!(world.board(board).cell(Vec2i::new(6, 5)).fire);
		assert!(!world.board(board).cell(Vec2i::new(9, 5)).fire);
	}

	#[test]
	fn push_shifts_the_caller_supplied_memory_map() {
		let (world, board, mut registry) = fresh();
		let mut player = Player::new(board, Vec2i::new(5, 5));
		let mut memory = MemoryMap::new();
		memory.set(Vec2i::new(1, 0), 'X');
		player.push(&world, &mut registry, &mut memory, Vec2i::new(1, 0));
		assert_eq!(player.pos, Vec2i::new(6, 5));
		// The glyph one step ahead of the old position is now at the player's
		// center, since the memory map shifted along with the push.
		assert_eq!(memory.get(Vec2i::ZERO), 'X');
	}
}

// EOF
