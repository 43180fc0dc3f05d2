// world.rs
// The world graph: an arena of boards, each a dense grid of cells, linked by
// directed portal edges. Grounded on worldmap.rs's `Model`/`GameMap`/`Tile`/
// `Portal`: that source keys boards by an implicit z-level (`Position.z as
// usize` into `Model.levels: Vec<GameMap>`); this crate generalizes that into
// an explicit small-integer arena id so portals can wire together boards that
// are not simply floors stacked on one axis (see crate::geometry for the
// reasoning on why that generalization is necessary for non-Euclidean linkage).

use bevy::prelude::{Reflect, Resource};
use log::{debug, trace};

use crate::config::BOARD_SIZE;
use crate::entity::EntityId;
use crate::geometry::{Direction, Transform, Vec2i};

/// Index of a [`Board`] within the [`WorldGraph`] arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoardId(pub u32);

/// A color tint carried by a portal edge. `None` is the neutral sentinel: "white
/// is unchanged" in the original source's terms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum Tint {
	#[default]
	None,
	Value(u8),
}

/// A directed re-wiring of one cell's neighbor in a single direction. Portal
/// edges are owned by their origin cell; reciprocal edges are two separate
/// records set up together by [`WorldGraph::link_portals`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub struct PortalEdge {
	pub target_board: BoardId,
	pub target_cell: Vec2i,
	pub transform: Transform,
	pub tint: Tint,
}

/// One unit of a board's grid.
#[derive(Clone, Debug, Default, PartialEq, Reflect)]
pub struct Cell {
	pub wall: bool,
	pub fire: bool,
	pub water: i32,
	pub plant: i32,
	pub steam: i32,
	pub grass_glyph: char,
	pub grass_color: u8,
	pub portals: [Option<PortalEdge>; 4],
	pub occupant: Option<EntityId>,
}
impl Cell {
	pub fn floor() -> Cell {
		Cell { grass_glyph: '.', grass_color: 8, ..Default::default() }
	}
	pub fn wall() -> Cell {
		Cell { wall: true, grass_glyph: '#', grass_color: 7, ..Default::default() }
	}
	fn portal_slot(dir: Direction) -> usize {
		match dir {
			Direction::Right => 0,
			Direction::Up => 1,
			Direction::Left => 2,
			Direction::Down => 3,
		}
	}
	pub fn portal_at(&self, dir: Direction) -> Option<&PortalEdge> {
		self.portals[Self::portal_slot(dir)].as_ref()
	}
	pub fn set_portal(&mut self, dir: Direction, edge: PortalEdge) {
		self.portals[Self::portal_slot(dir)] = Some(edge);
	}
}

/// A fixed-size dense grid of cells plus an ordered list of live entities on
/// that board (order of insertion matters: entity ticking processes them in
/// that order).
#[derive(Clone, Debug, Reflect)]
pub struct Board {
	pub width: i32,
	pub height: i32,
	pub cells: Vec<Cell>,
	pub entities: Vec<EntityId>,
}
impl Board {
	pub fn new(width: i32, height: i32) -> Board {
		Board {
			width,
			height,
			cells: vec![Cell::floor(); (width * height) as usize],
			entities: Vec::new(),
		}
	}
	pub fn square(size: i32) -> Board {
		Board::new(size, size)
	}
	pub fn in_bounds(&self, pos: Vec2i) -> bool {
		pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
	}
	fn index(&self, pos: Vec2i) -> usize {
		(pos.y * self.width + pos.x) as usize
	}
	pub fn cell(&self, pos: Vec2i) -> &Cell {
		&self.cells[self.index(pos)]
	}
	pub fn cell_mut(&mut self, pos: Vec2i) -> &mut Cell {
		let idx = self.index(pos);
		&mut self.cells[idx]
	}
	pub fn try_cell(&self, pos: Vec2i) -> Option<&Cell> {
		if self.in_bounds(pos) { Some(self.cell(pos)) } else { None }
	}
}

/// The result of stepping out of a cell in a direction: either the step
/// resolves to another (board, cell) with an accumulated transform and tint,
/// or the step falls off the edge of the world with no portal to catch it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
	Moved { board: BoardId, cell: Vec2i, transform: Transform, tint: Tint },
	OffBoard,
}

/// The set of boards that make up the game world, linked by portal edges.
/// This is the single primitive (`step`) from which all movement, sight, and
/// projectile logic is derived.
#[derive(Resource, Default)]
pub struct WorldGraph {
	boards: Vec<Board>,
}
impl WorldGraph {
	pub fn new() -> WorldGraph {
		WorldGraph { boards: Vec::new() }
	}
	pub fn add_board(&mut self, board: Board) -> BoardId {
		let id = BoardId(self.boards.len() as u32);
		self.boards.push(board);
		id
	}
	pub fn default_board() -> Board {
		Board::square(BOARD_SIZE)
	}
	pub fn board(&self, id: BoardId) -> &Board {
		&self.boards[id.0 as usize]
	}
	pub fn board_mut(&mut self, id: BoardId) -> &mut Board {
		&mut self.boards[id.0 as usize]
	}
	pub fn board_count(&self) -> usize {
		self.boards.len()
	}
	/// Links two (board, cell, direction) triples as a portal pair. Asserts
	/// both endpoints are on-board (invalid construction is a no-op).
	/// `transform` is the local-frame transform applied when stepping
	/// `from -> to`; the reciprocal edge uses its inverse (portal transforms
	/// are dihedral, so the inverse equals the transpose/self for the
	/// reflections and the opposite rotation for CCW/CW).
	pub fn link_portals(
		&mut self,
		from_board: BoardId,
		from_cell: Vec2i,
		from_dir: Direction,
		to_board: BoardId,
		to_cell: Vec2i,
		to_dir: Direction,
		transform: Transform,
		tint: Tint,
	) {
		if (from_board.0 as usize) >= self.boards.len() || (to_board.0 as usize) >= self.boards.len() {
			debug!("link_portals: no-op, board id out of range");
			return;
		}
		if !self.board(from_board).in_bounds(from_cell) || !self.board(to_board).in_bounds(to_cell) {
			debug!("link_portals: no-op, cell out of bounds");
			return;
		}
		let inverse = inverse_transform(transform);
		self.board_mut(from_board).cell_mut(from_cell).set_portal(
			from_dir,
			PortalEdge { target_board: to_board, target_cell: to_cell, transform, tint },
		);
		self.board_mut(to_board).cell_mut(to_cell).set_portal(
			to_dir,
			PortalEdge { target_board: from_board, target_cell: from_cell, transform: inverse, tint },
		);
	}

	/// Portal-aware stepping: maps `(board, cell, dir)` to the next `(board,
	/// cell)` plus the transform and tint accrued by that single step.
	pub fn step(&self, board: BoardId, cell: Vec2i, dir: Direction) -> Step {
		let b = self.board(board);
		if let Some(edge) = b.cell(cell).portal_at(dir) {
			trace!("step: portal at {:?}/{:?} -> board {:?} cell {:?}", board, cell, edge.target_board, edge.target_cell);
			return Step::Moved { board: edge.target_board, cell: edge.target_cell, transform: edge.transform, tint: edge.tint };
		}
		let next = cell + dir.to_vec();
		if b.in_bounds(next) {
			Step::Moved { board, cell: next, transform: Transform::IDENTITY, tint: Tint::None }
		} else {
			Step::OffBoard
		}
	}

	/// The four portal-aware neighbors of a cell that exist on-board (used by
	/// the terrain automata, which never cross into off-board territory).
	pub fn neighbors(&self, board: BoardId, cell: Vec2i) -> Vec<(BoardId, Vec2i)> {
		Direction::ALL
			.iter()
			.filter_map(|&dir| match self.step(board, cell, dir) {
				Step::Moved { board, cell, .. } => Some((board, cell)),
				Step::OffBoard => None,
			})
			.collect()
	}
}

/// The inverse of a dihedral transform: rotations invert to their opposite
/// rotation, reflections (determinant -1) are self-inverse.
pub fn inverse_transform(t: Transform) -> Transform {
	if t.determinant() < 0 {
		t
	} else if t == Transform::CCW {
		Transform::CW
	} else if t == Transform::CW {
		Transform::CCW
	} else {
		t
	}
}

/// Empty: on-board, no wall, no fire, no water (even 1), no plant, no entity,
/// not the player's cell. The player-exclusion is applied by the caller,
/// since `Board`/`Cell` have no notion of "the player".
pub fn is_empty(cell: &Cell) -> bool {
	!cell.wall && !cell.fire && cell.water == 0 && cell.plant == 0 && cell.occupant.is_none()
}

/// Walkable: on-board, no wall, no plant, no fire, no entity, not
/// the player's cell, water depth at or under [`crate::config::SHALLOW_WATER_DEPTH`].
pub fn is_walkable(cell: &Cell) -> bool {
	!cell.wall && cell.plant == 0 && !cell.fire && cell.occupant.is_none() && cell.water <= crate::config::SHALLOW_WATER_DEPTH
}

/// Flyable: on-board, no wall, no plant, no entity, not the
/// player's cell. Water and fire are permitted.
pub fn is_flyable(cell: &Cell) -> bool {
	!cell.wall && cell.plant == 0 && cell.occupant.is_none()
}

/// The opacity set that terminates a sight ray: wall, plant>0, steam>0.
pub fn is_opaque(cell: &Cell) -> bool {
	cell.wall || cell.plant > 0 || cell.steam > 0
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fresh_graph() -> (WorldGraph, BoardId) {
		let mut g = WorldGraph::new();
		let b = g.add_board(Board::square(20));
		(g, b)
	}

	#[test]
	fn step_without_portal_is_geometric_neighbor() {
		let (g, b) = fresh_graph();
		match g.step(b, Vec2i::new(5, 5), Direction::Right) {
			Step::Moved { board, cell, transform, .. } => {
				assert_eq!(board, b);
				assert_eq!(cell, Vec2i::new(6, 5));
				assert_eq!(transform, Transform::IDENTITY);
			}
			Step::OffBoard => panic!("expected a move"),
		}
	}

	#[test]
	fn step_off_edge_with_no_portal_is_off_board() {
		let (g, b) = fresh_graph();
		assert_eq!(g.step(b, Vec2i::new(0, 0), Direction::Left), Step::OffBoard);
	}

	#[test]
	fn linked_portal_pair_round_trips_to_origin() {
		let (mut g, b) = fresh_graph();
		g.link_portals(b, Vec2i::new(3, 3), Direction::Right, b, Vec2i::new(10, 10), Direction::Left, Transform::CCW, Tint::None);
		let forward = g.step(b, Vec2i::new(3, 3), Direction::Right);
		let (fwd_board, fwd_cell, fwd_t) = match forward {
			Step::Moved { board, cell, transform, .. } => (board, cell, transform),
			Step::OffBoard => panic!(),
		};
		assert_eq!(fwd_cell, Vec2i::new(10, 10));
		let backward = g.step(fwd_board, fwd_cell, Direction::Left);
		let (back_board, back_cell, back_t) = match backward {
			Step::Moved { board, cell, transform, .. } => (board, cell, transform),
			Step::OffBoard => panic!(),
		};
		assert_eq!(back_board, b);
		assert_eq!(back_cell, Vec2i::new(3, 3));
		assert_eq!(fwd_t * back_t, Transform::IDENTITY);
	}

	#[test]
	fn step_returns_off_board_iff_no_geometric_neighbor_and_no_edge() {
		let (mut g, b) = fresh_graph();
		// Install one portal so we can verify both branches on the same board.
		g.link_portals(b, Vec2i::new(0, 0), Direction::Left, b, Vec2i::new(5, 5), Direction::Right, Transform::IDENTITY, Tint::None);
		assert!(matches!(g.step(b, Vec2i::new(0, 0), Direction::Left), Step::Moved { .. }));
		assert_eq!(g.step(b, Vec2i::new(0, 0), Direction::Down), Step::OffBoard);
	}
}

// EOF
