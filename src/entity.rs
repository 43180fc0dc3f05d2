// entity.rs
// Uniform entity record for motes, arrows, and turrets, plus the registry that
// owns them. Grounded on worldmap.rs's occupant-slot pattern
// (`Tile::contents: Vec<(i32, Entity)>`, `Tile::get_visible_entity`): this
// crate narrows that to "at most one occupant per cell", and replaces bevy's
// own `Entity` handle with a small arena index so the
// simulation core has no dependency on a live `bevy::World` to address an
// entity (the index is still exposed as a bevy `Resource`-held registry, kept
// in that shape for parity with the rest of the corpus's ECS-resource style).

use bevy::prelude::Resource;
use log::debug;

use crate::geometry::{Direction, Vec2i};
use crate::world::BoardId;

/// Index of an [`Entity`] within the [`EntityRegistry`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// Uniform record for motes, arrows, and turrets; behavior is determined
/// entirely by which flags are set.
#[derive(Clone, Debug)]
pub struct Entity {
	pub board: BoardId,
	pub pos: Vec2i,
	pub faced_direction: Direction,
	pub moving: bool,
	pub homing: bool,
	pub can_shoot: bool,
	pub die_on_touch: bool,
	/// Last observed vector from this entity to the player, in the entity's
	/// local frame at the moment of observation, or zero if never observed /
	/// lost. See crate::sight for how sight rays write this and crate::entity
	/// for how movement keeps it current.
	pub rel_player_pos: Vec2i,
	pub max_cooldown: i32,
	pub cooldown: i32,
	pub detection_range: i32,
}
impl Entity {
	fn base(board: BoardId, pos: Vec2i, facing: Direction) -> Entity {
		Entity {
			board,
			pos,
			faced_direction: facing,
			moving: false,
			homing: false,
			can_shoot: false,
			die_on_touch: false,
			rel_player_pos: Vec2i::ZERO,
			max_cooldown: 0,
			cooldown: 0,
			detection_range: 0,
		}
	}
	/// Moving, die-on-touch projectile.
	pub fn arrow(board: BoardId, pos: Vec2i, facing: Direction) -> Entity {
		let mut e = Entity::base(board, pos, facing);
		e.moving = true;
		e.die_on_touch = true;
		e
	}
	/// Moving, homing creature.
	pub fn mote(board: BoardId, pos: Vec2i, facing: Direction) -> Entity {
		let mut e = Entity::base(board, pos, facing);
		e.moving = true;
		e.homing = true;
		e
	}
	/// Stationary, can-shoot emplacement.
	pub fn turret(board: BoardId, pos: Vec2i, facing: Direction, max_cooldown: i32, detection_range: i32) -> Entity {
		let mut e = Entity::base(board, pos, facing);
		e.can_shoot = true;
		e.max_cooldown = max_cooldown;
		e.detection_range = detection_range;
		e
	}
}

/// Owns every live [`Entity`] in the world, addressed by [`EntityId`].
/// Removal is a cheap index write (slot -> `None`); cleanup additionally drops
/// the id from exactly one board's entity list and that cell's occupant slot
/// (see `crate::entity::remove_entity`).
#[derive(Resource, Default)]
pub struct EntityRegistry {
	slots: Vec<Option<Entity>>,
}
impl EntityRegistry {
	pub fn new() -> EntityRegistry {
		EntityRegistry::default()
	}
	pub fn get(&self, id: EntityId) -> Option<&Entity> {
		self.slots.get(id.0 as usize).and_then(|s| s.as_ref())
	}
	pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
		self.slots.get_mut(id.0 as usize).and_then(|s| s.as_mut())
	}
	pub fn insert(&mut self, entity: Entity) -> EntityId {
		let id = EntityId(self.slots.len() as u32);
		self.slots.push(Some(entity));
		id
	}
	/// Marks the slot free. Does not touch board lists or cell occupants;
	/// callers use [`remove_entity`] for the full, invariant-preserving removal.
	fn take(&mut self, id: EntityId) -> Option<Entity> {
		self.slots.get_mut(id.0 as usize).and_then(|s| s.take())
	}
	pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
		self.slots.iter().enumerate().filter_map(|(i, s)| s.as_ref().map(|_| EntityId(i as u32)))
	}
}

/// Spawns `entity` onto its board: registers it, appends it to the board's
/// entity list (insertion order governs tick order), and occupies its cell.
/// The destination cell must not already be occupied; callers are expected
/// to have checked a walkability predicate first.
pub fn spawn_entity(world: &mut crate::world::WorldGraph, registry: &mut EntityRegistry, entity: Entity) -> EntityId {
	let board_id = entity.board;
	let pos = entity.pos;
	let id = registry.insert(entity);
	world.board_mut(board_id).entities.push(id);
	world.board_mut(board_id).cell_mut(pos).occupant = Some(id);
	id
}

/// Removes an entity from the world: clears the occupant slot it holds (if
/// any entity with this id is still the listed occupant), drops it from its
/// board's entity list, and frees the registry slot. A no-op if the id is
/// already gone, tolerating duplicate deletions.
pub fn remove_entity(world: &mut crate::world::WorldGraph, registry: &mut EntityRegistry, id: EntityId) {
	let Some(entity) = registry.take(id) else {
		debug!("remove_entity: no-op, already removed {:?}", id);
		return;
	};
	let board = world.board_mut(entity.board);
	if board.in_bounds(entity.pos) {
		let cell = board.cell_mut(entity.pos);
		if cell.occupant == Some(id) {
			cell.occupant = None;
		}
	}
	board.entities.retain(|&e| e != id);
}

/// Moves an entity's occupant record from one (board, cell) to another,
/// keeping the at-most-one-occupant-per-cell invariant intact. Does not touch
/// the board's entity list (the
/// list doesn't change when an entity merely moves within/between boards that
/// both already list it -- the caller is responsible for appending to the new
/// board's list and removing from the old one when the board changes).
pub fn relocate_entity(world: &mut crate::world::WorldGraph, registry: &mut EntityRegistry, id: EntityId, new_board: BoardId, new_pos: Vec2i) {
	let Some(entity) = registry.get(id) else { return };
	let (old_board, old_pos) = (entity.board, entity.pos);
	if world.board(old_board).in_bounds(old_pos) {
		let cell = world.board_mut(old_board).cell_mut(old_pos);
		if cell.occupant == Some(id) {
			cell.occupant = None;
		}
	}
	if old_board != new_board {
		world.board_mut(old_board).entities.retain(|&e| e != id);
		world.board_mut(new_board).entities.push(id);
	}
	world.board_mut(new_board).cell_mut(new_pos).occupant = Some(id);
	if let Some(entity) = registry.get_mut(id) {
		entity.board = new_board;
		entity.pos = new_pos;
	}
}

/// Entity tick: for each board, for each entity in insertion order, runs
/// face-player (homing), movement (moving), then shooting (can_shoot).
/// Deletions are collected and applied at the end of the whole pass to avoid
/// invalidating the board's entity list mid-iteration.
pub fn tick_entities(world: &mut crate::world::WorldGraph, registry: &mut EntityRegistry, rng: &mut bevy_turborand::GlobalRng, player: &crate::player::Player) {
	let mut to_remove: Vec<EntityId> = Vec::new();
	let board_count = world.board_count();
	for board_idx in 0..board_count {
		let board = BoardId(board_idx as u32);
		let ids = world.board(board).entities.clone();
		for id in ids {
			if to_remove.contains(&id) {
				continue;
			}
			face_player_if_homing(registry, rng, id);
			let dead = tick_movement(world, registry, id);
			let self_died = dead.contains(&id);
			to_remove.extend(dead);
			if self_died {
				continue;
			}
			tick_shooting(world, registry, player, id);
		}
	}
	for id in to_remove {
		remove_entity(world, registry, id);
	}
}

fn face_player_if_homing(registry: &mut EntityRegistry, rng: &mut bevy_turborand::GlobalRng, id: EntityId) {
	let Some(entity) = registry.get_mut(id) else { return };
	if !entity.homing {
		return;
	}
	let rel = entity.rel_player_pos;
	if rel == Vec2i::ZERO {
		return;
	}
	let ax = rel.x.abs();
	let ay = rel.y.abs();
	let horizontal = if ax == ay { crate::rng::coin_flip(rng) } else { ax > ay };
	entity.faced_direction = if horizontal {
		if rel.x > 0 { Direction::Right } else { Direction::Left }
	} else {
		if rel.y > 0 { Direction::Up } else { Direction::Down }
	};
}

/// Returns the ids that died this tick and must be removed: the entity
/// itself if it fell off-board or hit something while `die_on_touch`, and/or
/// whatever entity it hit (an arrow striking an entity removes the target).
/// Both are returned rather than removed immediately so the caller can defer
/// every deletion to the end of the full entity pass.
fn tick_movement(world: &mut crate::world::WorldGraph, registry: &mut EntityRegistry, id: EntityId) -> Vec<EntityId> {
	let Some((board, pos, facing, moving, die_on_touch)) = registry.get(id).map(|e| (e.board, e.pos, e.faced_direction, e.moving, e.die_on_touch)) else {
		return Vec::new();
	};
	if !moving {
		return Vec::new();
	}
	let step = match world.step(board, pos, facing) {
		crate::world::Step::Moved { board: nb, cell: nc, transform, .. } => Some((nb, nc, transform)),
		crate::world::Step::OffBoard => None,
	};
	let Some((next_board, next_cell, t_edge)) = step else {
		return if die_on_touch { vec![id] } else { Vec::new() };
	};
	let dest = world.board(next_board).cell(next_cell);
	if crate::world::is_flyable(dest) {
		relocate_entity(world, registry, id, next_board, next_cell);
		if let Some(e) = registry.get_mut(id) {
			e.faced_direction = e.faced_direction.apply(t_edge);
			e.rel_player_pos = (e.rel_player_pos - facing.to_vec()) * t_edge;
		}
		Vec::new()
	} else if die_on_touch {
		let blocker = world.board_mut(next_board).cell_mut(next_cell);
		if blocker.plant > 0 {
			blocker.plant -= 1;
			vec![id]
		} else if let Some(target) = blocker.occupant {
			vec![id, target]
		} else {
			vec![id]
		}
	} else {
		Vec::new()
	}
}

fn tick_shooting(world: &mut crate::world::WorldGraph, registry: &mut EntityRegistry, player: &crate::player::Player, id: EntityId) {
	let (board, pos, facing, max_cooldown, detection_range) = {
		let Some(e) = registry.get_mut(id) else { return };
		if !e.can_shoot {
			return;
		}
		if e.cooldown > 0 {
			e.cooldown -= 1;
			return;
		}
		(e.board, e.pos, e.faced_direction, e.max_cooldown, e.detection_range)
	};
	let line = crate::linecast::line_cast(world, registry, board, pos, facing.to_vec().scale(detection_range), false);
	let mut target_found = false;
	for mapping in line.mappings.iter() {
		let cell = world.board(mapping.board).cell(mapping.cell);
		if cell.wall {
			break;
		}
		let has_target = cell.occupant.is_some() || (mapping.board == player.board && mapping.cell == player.pos);
		if has_target {
			target_found = true;
			break;
		}
	}
	if !target_found {
		return;
	}
	let Some(first) = line.mappings.first() else { return };
	if !crate::world::is_flyable(world.board(first.board).cell(first.cell)) {
		return;
	}
	let arrow_facing = facing.apply(first.transform);
	spawn_entity(world, registry, Entity::arrow(first.board, first.cell, arrow_facing));
	if let Some(e) = registry.get_mut(id) {
		e.cooldown = max_cooldown;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::world::{Board, WorldGraph};

	#[test]
	fn spawn_then_remove_clears_occupant_and_list() {
		let mut world = WorldGraph::new();
		let board = world.add_board(Board::square(10));
		let mut registry = EntityRegistry::new();
		let id = spawn_entity(&mut world, &mut registry, Entity::arrow(board, Vec2i::new(2, 2), Direction::Right));
		assert_eq!(world.board(board).cell(Vec2i::new(2, 2)).occupant, Some(id));
		assert_eq!(world.board(board).entities, vec![id]);
		remove_entity(&mut world, &mut registry, id);
		assert_eq!(world.board(board).cell(Vec2i::new(2, 2)).occupant, None);
		assert!(world.board(board).entities.is_empty());
		assert!(registry.get(id).is_none());
	}

	#[test]
	fn remove_is_idempotent() {
		let mut world = WorldGraph::new();
		let board = world.add_board(Board::square(10));
		let mut registry = EntityRegistry::new();
		let id = spawn_entity(&mut world, &mut registry, Entity::mote(board, Vec2i::new(1, 1), Direction::Up));
		remove_entity(&mut world, &mut registry, id);
		remove_entity(&mut world, &mut registry, id); // must not panic
	}

	#[test]
	fn relocate_moves_occupant_between_cells() {
		let mut world = WorldGraph::new();
		let board = world.add_board(Board::square(10));
		let mut registry = EntityRegistry::new();
		let id = spawn_entity(&mut world, &mut registry, Entity::mote(board, Vec2i::new(1, 1), Direction::Up));
		relocate_entity(&mut world, &mut registry, id, board, Vec2i::new(1, 2));
		assert_eq!(world.board(board).cell(Vec2i::new(1, 1)).occupant, None);
		assert_eq!(world.board(board).cell(Vec2i::new(1, 2)).occupant, Some(id));
		assert_eq!(registry.get(id).unwrap().pos, Vec2i::new(1, 2));
	}
}

// EOF
