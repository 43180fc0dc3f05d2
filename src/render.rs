// render.rs
// The render contract: a `ScreenCell` buffer centered on the player, built
// from the sight fan's `Line`s plus world state, with the memory map painted
// underneath. Grounded on camera.rs's `ScreenCell` / `impl From<ScreenCell>
// for ratatui::buffer::Cell`, trimmed of camera.rs's string-glyph/color-dict
// machinery (REXPaint glyph tables are a non-goal here) down to a single
// `char` glyph and indexed ANSI colors.
//
// This module is a pure function of `Line`s and world state; writing the
// painted glyphs back into the memory map is an explicit, separate step
// (`remember`), not mixed into the paint loop the way camera.rs does it.

use ratatui::buffer::Cell as RatatuiCell;
use ratatui::style::{Color, Modifier};

use crate::config::SIGHT_RADIUS;
use crate::entity::EntityRegistry;
use crate::geometry::{Direction, Transform, Vec2i};
use crate::linecast::{Line, SquareMap};
use crate::player::Player;
use crate::sight::MemoryMap;
use crate::world::{inverse_transform, Cell, Tint, WorldGraph};

/// One rendered cell: a glyph plus indexed foreground/background color and a
/// ratatui text modifier bitset. Mirrors `camera.rs::ScreenCell`, narrowed
/// from a `String` glyph (which supported multi-codepoint REXPaint tiles) to
/// a single `char`, since this crate has no tile-loading non-goal to serve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenCell {
	pub glyph: char,
	pub fg: u8,
	pub bg: u8,
	pub modifier: u16,
}
impl ScreenCell {
	pub fn new(glyph: char, fg: u8, bg: u8) -> ScreenCell {
		ScreenCell { glyph, fg, bg, modifier: 0 }
	}
	pub fn blank() -> ScreenCell {
		ScreenCell { glyph: MemoryMap::BLANK, fg: 8, bg: 0, modifier: 0 }
	}
}
impl From<ScreenCell> for RatatuiCell {
	fn from(input: ScreenCell) -> Self {
		RatatuiCell {
			symbol: input.glyph.to_string(),
			fg: Color::Indexed(input.fg),
			bg: Color::Indexed(input.bg),
			underline_color: Color::Reset,
			modifier: Modifier::from_bits(input.modifier).unwrap_or(Modifier::empty()),
		}
	}
}

const FIRE_BG: u8 = 1; // red
const PLAYER_GLYPH: char = '@';
const PLAYER_COLOR: u8 = 15;
const AIM_GLYPH: char = '+';
const WALL_GLYPH: char = '#';
const WALL_COLOR: u8 = 7;
const STEAM_GLYPH: char = '~';
const STEAM_COLOR: u8 = 8;
const SHALLOW_WATER_GLYPH: char = '~';
const DEEP_WATER_GLYPH: char = '≈';
const WATER_COLOR: u8 = 4; // blue
const PLANT_GLYPH: char = '"';
const PLANT_COLOR: u8 = 2; // green
const ENTITY_GLYPHS: [char; 4] = ['>', '^', '<', 'v'];
const ENTITY_COLOR: u8 = 3; // yellow

/// The number of 90-degree CCW turns `Direction::Right` undergoes under `t`,
/// used as a general-purpose "how much has this rotated" measure for both
/// portal transforms and `player_transform` in the entity-glyph rotation formula.
fn rotation_count(t: Transform) -> u8 {
	Direction::Right.apply(t).ccw_rotations_from_right()
}

fn terrain_glyph(cell: &Cell) -> (char, u8) {
	if cell.wall {
		(WALL_GLYPH, WALL_COLOR)
	} else if cell.steam > 0 {
		(STEAM_GLYPH, STEAM_COLOR)
	} else if cell.water > 0 {
		if cell.water <= crate::config::SHALLOW_WATER_DEPTH {
			(SHALLOW_WATER_GLYPH, WATER_COLOR)
		} else {
			(DEEP_WATER_GLYPH, WATER_COLOR)
		}
	} else if cell.plant > 0 {
		(PLANT_GLYPH, PLANT_COLOR)
	} else {
		(cell.grass_glyph, cell.grass_color)
	}
}

/// Glyph/color selection for a single visited cell: player > wall > steam >
/// entity > water > plant > grass; `fire` overrides the background to red; a
/// non-neutral `mapping.tint` overrides both non-black colors.
fn paint_mapping(world: &WorldGraph, registry: &EntityRegistry, player: &Player, mapping: &SquareMap) -> ScreenCell {
	let cell = world.board(mapping.board).cell(mapping.cell);
	let (mut glyph, mut fg) = terrain_glyph(cell);
	let mut bg: u8 = 0;

	if let Some(occupant) = cell.occupant {
		if let Some(entity) = registry.get(occupant) {
			let local_facing_rotation = entity.faced_direction.apply(inverse_transform(mapping.transform)).ccw_rotations_from_right();
			let view_rotation = rotation_count(inverse_transform(player.player_transform));
			let idx = ((local_facing_rotation as u32 + view_rotation as u32) % 4) as usize;
			glyph = ENTITY_GLYPHS[idx];
			fg = ENTITY_COLOR;
		}
	}
	if cell.fire {
		bg = FIRE_BG;
	}
	if let Tint::Value(color) = mapping.tint {
		if fg != 0 {
			fg = color;
		}
		if bg != 0 {
			bg = color;
		}
	}
	ScreenCell { glyph, fg, bg, modifier: 0 }
}

/// Converts a `Line`'s visited-cell coordinate into the player-centered,
/// player-frame screen coordinate: the sight-map coordinate offset by
/// `player_transform^-1`.
fn screen_rel(player: &Player, mapping: &SquareMap) -> Vec2i {
	mapping.line_pos * inverse_transform(player.player_transform)
}

/// Renders the player-centered view: a `(2*SIGHT_RADIUS+1)^2` square buffer
/// with the memory map painted underneath and the current sight fan painted
/// over it, plus the player glyph at center and a one-cell aiming indicator.
/// Row-major, indexed by `(row, col)` with `(SIGHT_RADIUS, SIGHT_RADIUS)` at
/// the player.
pub fn render_view(world: &WorldGraph, registry: &EntityRegistry, player: &Player, memory: &MemoryMap, lines: &[Line]) -> Vec<ScreenCell> {
	let diameter = (2 * SIGHT_RADIUS + 1) as usize;
	let mut buffer = vec![ScreenCell::blank(); diameter * diameter];
	let index = |rel: Vec2i| -> usize { ((rel.y + SIGHT_RADIUS) as usize) * diameter + (rel.x + SIGHT_RADIUS) as usize };

	for y in -SIGHT_RADIUS..=SIGHT_RADIUS {
		for x in -SIGHT_RADIUS..=SIGHT_RADIUS {
			let rel = Vec2i::new(x, y);
			let glyph = memory.get(rel);
			if glyph != MemoryMap::BLANK {
				buffer[index(rel)] = ScreenCell::new(glyph, 8, 0);
			}
		}
	}

	for line in lines {
		for mapping in line.mappings.iter() {
			let rel = screen_rel(player, mapping);
			if rel.x.abs() > SIGHT_RADIUS || rel.y.abs() > SIGHT_RADIUS {
				continue;
			}
			buffer[index(rel)] = paint_mapping(world, registry, player, mapping);
		}
	}

	buffer[index(Vec2i::ZERO)] = ScreenCell::new(PLAYER_GLYPH, PLAYER_COLOR, 0);
	let aim_rel = player.faced_direction.to_vec() * inverse_transform(player.player_transform);
	if aim_rel != Vec2i::ZERO && aim_rel.x.abs() <= SIGHT_RADIUS && aim_rel.y.abs() <= SIGHT_RADIUS {
		let existing = buffer[index(aim_rel)];
		buffer[index(aim_rel)] = ScreenCell::new(AIM_GLYPH, existing.fg, existing.bg);
	}
	buffer
}

/// Post-render side effect: copies every sight-painted cell's glyph into the
/// memory map at the same player-frame coordinate the renderer used.
pub fn remember(memory: &mut MemoryMap, world: &WorldGraph, registry: &EntityRegistry, player: &Player, lines: &[Line]) {
	for line in lines {
		for mapping in line.mappings.iter() {
			let rel = screen_rel(player, mapping);
			let painted = paint_mapping(world, registry, player, mapping);
			memory.set(rel, painted.glyph);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::world::Board;

	fn fresh() -> (WorldGraph, crate::world::BoardId, EntityRegistry, Player) {
		let mut world = WorldGraph::new();
		let board = world.add_board(Board::square(20));
		(world, board, EntityRegistry::new(), Player::new(board, Vec2i::new(10, 10)))
	}

	#[test]
	fn wall_glyph_takes_precedence_over_grass() {
		let (mut world, board, registry, player) = fresh();
		world.board_mut(board).cell_mut(Vec2i::new(11, 10)).wall = true;
		let line = crate::linecast::line_cast(&world, &mut EntityRegistry::new(), board, player.pos, Vec2i::new(1, 0), false);
		let mapping = line.last().unwrap();
		let cell = paint_mapping(&world, &registry, &player, mapping);
		assert_eq!(cell.glyph, WALL_GLYPH);
	}

	#[test]
	fn fire_overrides_background_to_red() {
		let (mut world, board, registry, player) = fresh();
		world.board_mut(board).cell_mut(Vec2i::new(11, 10)).fire = true;
		world.board_mut(board).cell_mut(Vec2i::new(11, 10)).plant = 3;
		let line = crate::linecast::line_cast(&world, &mut EntityRegistry::new(), board, player.pos, Vec2i::new(1, 0), false);
		let mapping = line.last().unwrap();
		let cell = paint_mapping(&world, &registry, &player, mapping);
		assert_eq!(cell.bg, FIRE_BG);
	}

	#[test]
	fn render_view_places_player_glyph_at_center() {
		let (world, _board, registry, player) = fresh();
		let memory = MemoryMap::new();
		let buffer = render_view(&world, &registry, &player, &memory, &[]);
		let diameter = (2 * SIGHT_RADIUS + 1) as usize;
		let center = (SIGHT_RADIUS as usize) * diameter + SIGHT_RADIUS as usize;
		assert_eq!(buffer[center].glyph, PLAYER_GLYPH);
	}
}

// EOF
