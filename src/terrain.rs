// terrain.rs
// The four terrain automata: fire, water, steam, and plants. Each runs a
// shared two-phase scan/apply pattern: phase 1 scans every cell on every
// board once and computes intended updates into a side buffer without
// reading from it; phase 2 shuffles the buffer with the shared PRNG (to strip
// out scan-order bias) and applies updates sequentially, each re-checked
// against the current board state. Grounded on worldmap.rs's `GameMap`/`Tile`
// cell-state fields and on sys.rs's `map_indexing_system`'s scan-then-
// rebuild shape, generalized from a single pass per tile into this
// crate's explicit two-phase buffering.

use bevy::prelude::ResMut;
use bevy_turborand::GlobalRng;
use log::debug;

use crate::config;
use crate::entity::EntityRegistry;
use crate::geometry::Vec2i;
use crate::player::Player;
use crate::rng::{roll, shuffle};
use crate::sight::MemoryMap;
use crate::world::{is_walkable, BoardId, WorldGraph};

/// Fire phase: burning cells consume their own plant fuel and, while still
/// burning, probabilistically ignite flammable neighbors. A neighbor only
/// catches fire if it actually carries fuel (`plant > 0`), which keeps fire
/// monotonicity (a cell with plant == 0 never has fire == true after a tick)
/// intact even though the underlying neighbor condition doesn't restate the
/// fuel requirement explicitly.
pub fn fire_phase(world: &mut WorldGraph, rng: &mut GlobalRng) {
	let mut ignitions: Vec<(BoardId, Vec2i)> = Vec::new();
	for board_idx in 0..world.board_count() {
		let board = BoardId(board_idx as u32);
		let positions: Vec<Vec2i> = burning_positions(world, board);
		for pos in positions {
			let still_burning = {
				let cell = world.board_mut(board).cell_mut(pos);
				cell.plant = (cell.plant - 1).max(0);
				if cell.plant == 0 {
					cell.fire = false;
					false
				} else {
					true
				}
			};
			if !still_burning {
				continue;
			}
			for (nb_board, nb_pos) in world.neighbors(board, pos) {
				let nb = world.board(nb_board).cell(nb_pos);
				if nb.wall || nb.fire {
					continue;
				}
				if roll(rng, config::fire_spread_denominator()) {
					ignitions.push((nb_board, nb_pos));
				}
			}
		}
	}
	shuffle(rng, &mut ignitions);
	for (board, pos) in ignitions {
		let cell = world.board_mut(board).cell_mut(pos);
		if !cell.wall && !cell.fire && cell.plant > 0 {
			cell.fire = true;
			debug!("fire_phase: ignited {:?}/{:?}", board, pos);
		}
	}
}

fn burning_positions(world: &WorldGraph, board: BoardId) -> Vec<Vec2i> {
	let b = world.board(board);
	(0..b.height)
		.flat_map(|y| (0..b.width).map(move |x| Vec2i::new(x, y)))
		.filter(|&p| b.cell(p).fire)
		.collect()
}

fn all_positions(world: &WorldGraph, board: BoardId) -> Vec<Vec2i> {
	let b = world.board(board);
	(0..b.height).flat_map(|y| (0..b.width).map(move |x| Vec2i::new(x, y))).collect()
}

/// Water phase: fire boils standing water into steam, then water flows
/// downhill between adjacent cells, occasionally carrying the player along
/// with it. A push that carries the player also shifts the real memory map,
/// the same as any other valid move.
pub fn water_phase(world: &mut WorldGraph, rng: &mut GlobalRng, player: &mut Player, registry: &mut EntityRegistry, memory: &mut MemoryMap) {
	for board_idx in 0..world.board_count() {
		let board = BoardId(board_idx as u32);
		for pos in all_positions(world, board) {
			let cell = world.board_mut(board).cell_mut(pos);
			if cell.water > 0 && cell.fire {
				cell.water -= 1;
				cell.steam += config::STEAM_PER_WATER;
			}
		}
	}

	let mut flows: Vec<(BoardId, Vec2i, BoardId, Vec2i)> = Vec::new();
	for board_idx in 0..world.board_count() {
		let board = BoardId(board_idx as u32);
		for pos in all_positions(world, board) {
			let water = world.board(board).cell(pos).water;
			if water <= 1 {
				continue;
			}
			for (nb_board, nb_pos) in world.neighbors(board, pos) {
				let nb = world.board(nb_board).cell(nb_pos);
				if nb.wall || nb.plant > 0 {
					continue;
				}
				if nb.water <= water - 2 && roll(rng, config::water_flow_denominator()) {
					flows.push((board, pos, nb_board, nb_pos));
				}
			}
		}
	}
	shuffle(rng, &mut flows);
	for (src_board, src_pos, dst_board, dst_pos) in flows {
		let src_water = world.board(src_board).cell(src_pos).water;
		let dst_water = world.board(dst_board).cell(dst_pos).water;
		if src_water - dst_water >= 2 {
			world.board_mut(src_board).cell_mut(src_pos).water -= 1;
			world.board_mut(dst_board).cell_mut(dst_pos).water += 1;
			if player.board == src_board && player.pos == src_pos {
				let flow_dir = dst_pos - src_pos;
				player.push(world, registry, memory, flow_dir);
			}
		}
	}
}

/// Steam phase: steam extinguishes fire and dissipates at 1 unit, then
/// redistributes itself downhill among portal-aware neighbors.
pub fn steam_phase(world: &mut WorldGraph, rng: &mut GlobalRng) {
	for board_idx in 0..world.board_count() {
		let board = BoardId(board_idx as u32);
		for pos in all_positions(world, board) {
			let cell = world.board_mut(board).cell_mut(pos);
			if cell.steam > 0 && cell.fire {
				cell.fire = false;
			}
			if cell.steam == 1 {
				cell.steam = 0;
			}
		}
	}

	let mut flows: Vec<(BoardId, Vec2i, BoardId, Vec2i, i32)> = Vec::new();
	for board_idx in 0..world.board_count() {
		let board = BoardId(board_idx as u32);
		for pos in all_positions(world, board) {
			let steam = world.board(board).cell(pos).steam;
			if steam <= 1 {
				continue;
			}
			let mut downhill: Vec<(BoardId, Vec2i, i32)> = world
				.neighbors(board, pos)
				.into_iter()
				.filter_map(|(nb_board, nb_pos)| {
					let nb = world.board(nb_board).cell(nb_pos);
					if nb.wall {
						return None;
					}
					if nb.steam <= steam - 2 {
						Some((nb_board, nb_pos, nb.steam))
					} else {
						None
					}
				})
				.collect();
			if downhill.is_empty() {
				continue;
			}
			let total: i32 = steam + downhill.iter().map(|(_, _, s)| *s).sum::<i32>();
			let n = downhill.len() as i32;
			let avg = total / (1 + n);
			let mut extra = total - avg * (1 + n) - 1;
			shuffle(rng, &mut downhill);
			for (nb_board, nb_pos, nb_steam) in downhill {
				// Mirrors the source's documented-as-is quirk: `extra` is
				// decremented before being inspected, so it can go negative
				// and permanently stop contributing an extra unit partway
				// through the list.
				extra -= 1;
				let mut amount = avg - nb_steam;
				if extra >= 0 {
					amount += 1;
				}
				if amount > 0 {
					flows.push((board, pos, nb_board, nb_pos, amount));
				}
			}
		}
	}
	shuffle(rng, &mut flows);
	for (src_board, src_pos, dst_board, dst_pos, magnitude) in flows {
		let src_steam = world.board(src_board).cell(src_pos).steam;
		let dst_steam = world.board(dst_board).cell(dst_pos).steam;
		if src_steam - dst_steam < 2 {
			continue;
		}
		let moved = if dst_steam + magnitude <= src_steam - magnitude {
			magnitude
		} else {
			// Clamp to the midpoint differential, rounding toward zero.
			(src_steam - dst_steam) / 2
		};
		if moved <= 0 {
			continue;
		}
		world.board_mut(src_board).cell_mut(src_pos).steam -= moved;
		world.board_mut(dst_board).cell_mut(dst_pos).steam += moved;
	}
}

/// Plants phase: unburnt plants probabilistically spread into walkable
/// portal-aware neighbors. Uses the walkable predicate uniformly: the source
/// mixes `onBoard+walls` and `posIsWalkable` checks across call sites, but
/// the underlying rule is "portal-aware neighbor that is walkable", so this
/// crate picks `is_walkable` everywhere.
pub fn plant_phase(world: &mut WorldGraph, rng: &mut GlobalRng) {
	let mut sprouts: Vec<(BoardId, Vec2i)> = Vec::new();
	for board_idx in 0..world.board_count() {
		let board = BoardId(board_idx as u32);
		for pos in all_positions(world, board) {
			let cell = world.board(board).cell(pos);
			if cell.plant == 0 || cell.fire {
				continue;
			}
			for (nb_board, nb_pos) in world.neighbors(board, pos) {
				if is_walkable(world.board(nb_board).cell(nb_pos)) && roll(rng, config::plant_spawn_denominator()) {
					sprouts.push((nb_board, nb_pos));
				}
			}
		}
	}
	shuffle(rng, &mut sprouts);
	for (board, pos) in sprouts {
		let cell = world.board_mut(board).cell_mut(pos);
		if is_walkable(cell) {
			cell.plant = 1;
		}
	}
}

/// Bevy system wiring for the fixed tick order: registered in `Update` with
/// `.chain()` alongside the sight and entity systems so the schedule, not
/// incidental tuple order, guarantees fire -> plants -> water -> steam.
pub fn fire_system(mut world: ResMut<WorldGraph>, mut rng: ResMut<GlobalRng>) {
	fire_phase(&mut world, &mut rng);
}
pub fn plant_system(mut world: ResMut<WorldGraph>, mut rng: ResMut<GlobalRng>) {
	plant_phase(&mut world, &mut rng);
}
pub fn water_system(mut world: ResMut<WorldGraph>, mut rng: ResMut<GlobalRng>, mut player: ResMut<Player>, mut registry: ResMut<EntityRegistry>, mut memory: ResMut<MemoryMap>) {
	water_phase(&mut world, &mut rng, &mut player, &mut registry, &mut memory);
}
pub fn steam_system(mut world: ResMut<WorldGraph>, mut rng: ResMut<GlobalRng>) {
	steam_phase(&mut world, &mut rng);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::world::Board;

	fn graph_with_board() -> (WorldGraph, BoardId) {
		let mut world = WorldGraph::new();
		let board = world.add_board(Board::square(10));
		(world, board)
	}

	#[test]
	fn fire_monotonicity_plant_zero_never_catches() {
		let (mut world, board) = graph_with_board();
		let mut rng = GlobalRng::new();
		world.board_mut(board).cell_mut(Vec2i::new(5, 5)).fire = true;
		world.board_mut(board).cell_mut(Vec2i::new(5, 5)).plant = 5;
		// Neighbor has no plant fuel.
		for _ in 0..50 {
			fire_phase(&mut world, &mut rng);
			for y in 0..10 {
				for x in 0..10 {
					let cell = world.board(board).cell(Vec2i::new(x, y));
					if cell.plant == 0 {
						assert!(!cell.fire, "cell with no fuel caught fire at ({x},{y})");
					}
				}
			}
		}
	}

	#[test]
	fn fire_consumes_own_fuel_and_extinguishes_at_zero() {
		let (mut world, board) = graph_with_board();
		let mut rng = GlobalRng::new();
		let pos = Vec2i::new(2, 2);
		world.board_mut(board).cell_mut(pos).fire = true;
		world.board_mut(board).cell_mut(pos).plant = 1;
		fire_phase(&mut world, &mut rng);
		let cell = world.board(board).cell(pos);
		assert_eq!(cell.plant, 0);
		assert!(!cell.fire);
	}

	#[test]
	fn water_fire_interaction_matches_scenario() {
		// water=5, fire=true -> after one tick water=4, steam=100, fire stays
		// true through the water phase and is cleared in the steam phase that follows.
		let (mut world, board) = graph_with_board();
		let mut rng = GlobalRng::new();
		let mut player = Player::new(board, Vec2i::new(0, 0));
		let mut registry = EntityRegistry::new();
		let mut memory = MemoryMap::new();
		let pos = Vec2i::new(4, 4);
		world.board_mut(board).cell_mut(pos).water = 5;
		world.board_mut(board).cell_mut(pos).fire = true;
		water_phase(&mut world, &mut rng, &mut player, &mut registry, &mut memory);
		let cell = world.board(board).cell(pos);
		assert_eq!(cell.water, 4);
		assert_eq!(cell.steam, 100);
		assert!(cell.fire);
		steam_phase(&mut world, &mut rng);
		assert!(!world.board(board).cell(pos).fire);
	}

	#[test]
	fn steam_conservation_is_non_increasing() {
		let (mut world, board) = graph_with_board();
		let mut rng = GlobalRng::new();
		world.board_mut(board).cell_mut(Vec2i::new(5, 5)).steam = 40;
		world.board_mut(board).cell_mut(Vec2i::new(6, 5)).steam = 10;
		let before: i32 = all_positions(&world, board).iter().map(|p| world.board(board).cell(*p).steam).sum();
		steam_phase(&mut world, &mut rng);
		let after: i32 = all_positions(&world, board).iter().map(|p| world.board(board).cell(*p).steam).sum();
		assert!(after <= before);
	}
}

// EOF
