// sight.rs
// The player's sight fan and the persistent memory map. Grounded on
// camera.rs's viewport-centered rendering loop for the coordinate
// conventions, generalized from a simple visibility radius into the fan of
// portal-aware rays the world graph requires. `update_sight_lines` only
// builds pure `Line` values; painting those into the memory map is a
// post-render side effect performed by `crate::render`, and shifting the map
// on player motion is a separate concern owned by `crate::player::attempt_move`.

use bevy::prelude::Resource;

use crate::config::{MEMORY_MAP_SIZE, SIGHT_RADIUS};
use crate::entity::EntityRegistry;
use crate::geometry::Vec2i;
use crate::linecast::{line_cast, Line};
use crate::player::Player;
use crate::world::WorldGraph;

/// A fixed-size, player-centered grid of last-seen glyphs. Blank (`' '`) is
/// the fill glyph for cells never seen or pushed off the edge by a shift.
#[derive(Resource, Clone, Debug)]
pub struct MemoryMap {
	size: i32,
	cells: Vec<char>,
}
impl MemoryMap {
	pub const BLANK: char = ' ';

	pub fn new() -> MemoryMap {
		let size = MEMORY_MAP_SIZE;
		MemoryMap { size, cells: vec![Self::BLANK; (size * size) as usize] }
	}

	fn half(&self) -> i32 {
		self.size / 2
	}
	fn in_bounds(&self, rel: Vec2i) -> bool {
		rel.x.abs() <= self.half() && rel.y.abs() <= self.half()
	}
	fn index(&self, rel: Vec2i) -> usize {
		let half = self.half();
		((rel.y + half) * self.size + (rel.x + half)) as usize
	}

	/// Glyph at `rel`, a coordinate relative to the player at the map's center.
	/// Out-of-range coordinates read as blank rather than panicking, since the
	/// renderer queries this across the whole sight radius.
	pub fn get(&self, rel: Vec2i) -> char {
		if self.in_bounds(rel) {
			self.cells[self.index(rel)]
		} else {
			Self::BLANK
		}
	}
	/// Writes `glyph` at `rel`; a no-op if `rel` falls outside the map.
	pub fn set(&mut self, rel: Vec2i, glyph: char) {
		if self.in_bounds(rel) {
			let idx = self.index(rel);
			self.cells[idx] = glyph;
		}
	}

	/// Shifts the map's content by `delta`, refilling newly exposed edges with
	/// blank. Called with `-(step * player_transform^-1)` on every successful
	/// player move.
	pub fn shift(&mut self, delta: Vec2i) {
		let half = self.half();
		let mut shifted = vec![Self::BLANK; self.cells.len()];
		for y in -half..=half {
			for x in -half..=half {
				let src = Vec2i::new(x - delta.x, y - delta.y);
				let glyph = if self.in_bounds(src) { self.cells[self.index(src)] } else { Self::BLANK };
				let dst = ((y + half) * self.size + (x + half)) as usize;
				shifted[dst] = glyph;
			}
		}
		self.cells = shifted;
	}
}
impl Default for MemoryMap {
	fn default() -> Self {
		MemoryMap::new()
	}
}

/// The ordered fan of sight-ray targets: axis-aligned directions first, then
/// octant-by-octant outward from each axis, with the four diagonal corners
/// last. This governs paint order on cells shared by more than one ray, not
/// which cells are reached.
pub fn sight_targets(radius: i32) -> Vec<Vec2i> {
	let mut targets = Vec::new();
	targets.push(Vec2i::new(radius, 0));
	targets.push(Vec2i::new(0, radius));
	targets.push(Vec2i::new(-radius, 0));
	targets.push(Vec2i::new(0, -radius));
	for k in 1..radius {
		targets.push(Vec2i::new(radius, k));
		targets.push(Vec2i::new(k, radius));
		targets.push(Vec2i::new(-k, radius));
		targets.push(Vec2i::new(-radius, k));
		targets.push(Vec2i::new(-radius, -k));
		targets.push(Vec2i::new(-k, -radius));
		targets.push(Vec2i::new(k, -radius));
		targets.push(Vec2i::new(radius, -k));
	}
	targets.push(Vec2i::new(radius, radius));
	targets.push(Vec2i::new(-radius, radius));
	targets.push(Vec2i::new(-radius, -radius));
	targets.push(Vec2i::new(radius, -radius));
	targets
}

/// Casts the full sight fan from the player's current position, each ray
/// stopping at the first opaque cell. Also updates any entity found along a
/// ray's `rel_player_pos` (a `curve_cast` side effect of `is_sight = true`).
pub fn update_sight_lines(world: &WorldGraph, registry: &mut EntityRegistry, player: &Player) -> Vec<Line> {
	sight_targets(SIGHT_RADIUS)
		.into_iter()
		.map(|target| line_cast(world, registry, player.board, player.pos, target, true))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn memory_map_starts_blank() {
		let map = MemoryMap::new();
		assert_eq!(map.get(Vec2i::ZERO), MemoryMap::BLANK);
		assert_eq!(map.get(Vec2i::new(50, 50)), MemoryMap::BLANK);
	}

	#[test]
	fn set_then_get_round_trips() {
		let mut map = MemoryMap::new();
		map.set(Vec2i::new(3, -2), '#');
		assert_eq!(map.get(Vec2i::new(3, -2)), '#');
	}

	#[test]
	fn shift_moves_content_and_refills_edges_with_blank() {
		let mut map = MemoryMap::new();
		map.set(Vec2i::new(0, 0), '@');
		map.shift(Vec2i::new(1, 0));
		assert_eq!(map.get(Vec2i::new(1, 0)), '@');
		assert_eq!(map.get(Vec2i::new(0, 0)), MemoryMap::BLANK);
	}

	#[test]
	fn out_of_bounds_access_is_blank_not_a_panic() {
		let map = MemoryMap::new();
		assert_eq!(map.get(Vec2i::new(10_000, 10_000)), MemoryMap::BLANK);
	}

	#[test]
	fn sight_targets_axis_aligned_come_first_and_diagonals_last() {
		let targets = sight_targets(5);
		assert_eq!(&targets[0..4], &[Vec2i::new(5, 0), Vec2i::new(0, 5), Vec2i::new(-5, 0), Vec2i::new(0, -5)]);
		let last_four = &targets[targets.len() - 4..];
		assert_eq!(last_four, &[Vec2i::new(5, 5), Vec2i::new(-5, 5), Vec2i::new(-5, -5), Vec2i::new(5, -5)]);
	}
}

// EOF
