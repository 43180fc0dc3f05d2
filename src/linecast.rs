// linecast.rs
// The line-cast engine: walks a plotted chain of cells through the world
// graph, composing portal transforms as it goes. This is the one primitive
// shared by movement validation, projectile travel, laser curves, turret
// targeting, and sight; keeping portal composition as a running product of
// transforms is the one idea that makes everything else work.
//
// Grounded on original_source/line.h's `SquareMap`/`Line` pair, translated
// from the C++ `vect2Di board_pos; vect2Di line_pos; mat2Di transform; int
// color;` record into an idiomatic Rust struct of the same shape.

use log::trace;

use crate::entity::EntityRegistry;
use crate::geometry::{Direction, Transform, Vec2i};
use crate::world::{BoardId, Step, Tint, WorldGraph};

/// One visited cell of a cast line: its absolute location, its position
/// relative to where the line started, and the transform/tint accumulated to
/// reach it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquareMap {
	pub board: BoardId,
	pub cell: Vec2i,
	pub line_pos: Vec2i,
	pub transform: Transform,
	pub tint: Tint,
}

/// An ordered list of [`SquareMap`]s from a line-cast or curve-cast.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
	pub mappings: Vec<SquareMap>,
}
impl Line {
	pub fn last(&self) -> Option<&SquareMap> {
		self.mappings.last()
	}
}

/// Walks a plotted chain of *relative* displacements (as produced by
/// [`crate::geometry::plot`], whose first element is always `Vec2i::ZERO`)
/// through the world graph, starting at `(start_board, start_cell)` and
/// threading through portal edges while accumulating a running transform.
///
/// `plotted`'s own first element only supplies the origin for `line_pos` and
/// for the sight-frame vector written when an entity is found mid-ray; the
/// actual board position the walk begins at is `start_cell`, kept as a
/// separate parameter so a cast can start anywhere on a board rather than
/// always at that board's (0,0).
///
/// If `is_sight` is set, any entity found on a visited cell has its
/// `rel_player_pos` updated to the ray-frame vector back to the ray's origin,
/// and the cast stops at the first opaque cell (wall, plant, or steam).
pub fn curve_cast(world: &WorldGraph, registry: &mut EntityRegistry, start_board: BoardId, start_cell: Vec2i, plotted: &[Vec2i], is_sight: bool) -> Line {
	let mut line = Line::default();
	if plotted.is_empty() {
		return line;
	}
	let plot_origin = plotted[0];
	let mut current_board = start_board;
	let mut current_cell = start_cell;
	let mut transform = Transform::IDENTITY;
	let mut tint = Tint::None;

	for pair in plotted.windows(2) {
		let naive_step = pair[1] - pair[0];
		let local_step = naive_step * transform;
		let Some(dir) = Direction::from_vec(local_step) else {
			trace!("curve_cast: non-unit local step {:?}, terminating", local_step);
			break;
		};
		let (next_board, next_cell, t_edge, edge_tint) = match world.step(current_board, current_cell, dir) {
			Step::Moved { board, cell, transform, tint } => (board, cell, transform, tint),
			Step::OffBoard => break,
		};
		transform = transform * t_edge;
		if edge_tint != Tint::None {
			tint = edge_tint;
		}
		current_board = next_board;
		current_cell = next_cell;
		line.mappings.push(SquareMap { board: current_board, cell: current_cell, line_pos: pair[1] - plot_origin, transform, tint });

		if is_sight {
			let occupant = world.board(current_board).cell(current_cell).occupant;
			if let Some(enty_id) = occupant {
				if let Some(enty) = registry.get_mut(enty_id) {
					enty.rel_player_pos = plot_origin - pair[1];
				}
			}
			if crate::world::is_opaque(world.board(current_board).cell(current_cell)) {
				break;
			}
		}
	}
	line
}

/// `line_cast(board, cell, displacement, is_sight)` = `curve_cast(board, cell, plot(displacement), is_sight)`.
pub fn line_cast(world: &WorldGraph, registry: &mut EntityRegistry, board: BoardId, cell: Vec2i, displacement: Vec2i, is_sight: bool) -> Line {
	let plotted = crate::geometry::plot(displacement);
	curve_cast(world, registry, board, cell, &plotted, is_sight)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::entity::{spawn_entity, Entity};
	use crate::world::{Board, Tint};

	fn world_with_board(size: i32) -> (WorldGraph, BoardId) {
		let mut world = WorldGraph::new();
		let board = world.add_board(Board::square(size));
		(world, board)
	}

	#[test]
	fn pure_line_cast_without_prng_is_deterministic() {
		let (world, board) = world_with_board(20);
		let mut registry = EntityRegistry::new();
		let a = line_cast(&world, &mut registry, board, Vec2i::new(2, 2), Vec2i::new(5, 5), false);
		let b = line_cast(&world, &mut registry, board, Vec2i::new(2, 2), Vec2i::new(5, 5), false);
		assert_eq!(a, b);
	}

	#[test]
	fn cast_begins_at_the_given_start_cell_not_the_board_origin() {
		let (world, board) = world_with_board(20);
		let mut registry = EntityRegistry::new();
		let line = line_cast(&world, &mut registry, board, Vec2i::new(5, 5), Vec2i::new(3, 0), false);
		assert_eq!(line.last().unwrap().cell, Vec2i::new(8, 5));
	}

	#[test]
	fn ray_terminates_off_board_even_if_longer_than_the_world() {
		let (world, board) = world_with_board(10);
		let mut registry = EntityRegistry::new();
		let line = line_cast(&world, &mut registry, board, Vec2i::new(0, 0), Vec2i::new(0, 500), false);
		assert!(line.mappings.len() < 500);
		assert_eq!(line.last().unwrap().cell.y, 9);
	}

	#[test]
	fn identity_portal_behaves_like_an_ordinary_boundary() {
		let (mut world, board) = world_with_board(20);
		world.link_portals(board, Vec2i::new(4, 4), crate::geometry::Direction::Right, board, Vec2i::new(5, 4), crate::geometry::Direction::Left, Transform::IDENTITY, Tint::None);
		let mut registry = EntityRegistry::new();
		// From (3,4) heading right 4 cells lands on (7,4), whether or not the
		// identity portal at (4,4)->(5,4) happens to be traversed along the way.
		let via_portal = line_cast(&world, &mut registry, board, Vec2i::new(3, 4), Vec2i::new(4, 0), false);
		let (plain_world, plain_board) = world_with_board(20);
		let mut plain_registry = EntityRegistry::new();
		let plain = line_cast(&plain_world, &mut plain_registry, plain_board, Vec2i::new(3, 4), Vec2i::new(4, 0), false);
		assert_eq!(via_portal.mappings.len(), plain.mappings.len());
		assert_eq!(via_portal.last().unwrap().cell, plain.last().unwrap().cell);
		assert_eq!(via_portal.last().unwrap().transform, Transform::IDENTITY);
	}

	#[test]
	fn sight_ray_records_entity_in_ray_frame() {
		let (mut world, board) = world_with_board(20);
		let mut registry = EntityRegistry::new();
		let id = spawn_entity(&mut world, &mut registry, Entity::mote(board, Vec2i::new(10, 10), crate::geometry::Direction::Up));
		let origin = Vec2i::new(0, 10);
		let line = line_cast(&world, &mut registry, board, origin, Vec2i::new(10, 0), true);
		assert_eq!(line.last().unwrap().cell, Vec2i::new(10, 10));
		let enty = registry.get(id).unwrap();
		assert_eq!(enty.rel_player_pos, Vec2i::ZERO - Vec2i::new(10, 0));
	}

	#[test]
	fn double_mirror_cycles_with_period_two() {
		// Two self-looping mirrors facing each other on the same cell pair:
		// traversing back and forth composes FLIP_Y with itself.
		let mut t = Transform::IDENTITY;
		for _ in 0..4 {
			t = t * Transform::FLIP_Y;
		}
		assert_eq!(t, Transform::IDENTITY);
		let mut t2 = Transform::FLIP_Y;
		t2 = t2 * Transform::FLIP_Y;
		assert_eq!(t2, Transform::IDENTITY);
	}
}

// EOF
