// engine.rs
// The turn-driven game engine: one bevy `App` built from `MinimalPlugins`,
// wrapping the simulation resources and the fixed tick order. Grounded on
// engine/mod.rs's `GameEngine` struct and
// `App::new().add_plugins(MinimalPlugins)`, trimmed of the menu/PLANQ/save
// fields this crate doesn't need, and on its commented-out
// `RngPlugin::new().with_rng_seed(...)` line, used here as the real seeding
// path rather than left as a comment.

use std::error;

use bevy::app::{App, MinimalPlugins, Update};
use bevy::prelude::{Events, EventReader, Res, ResMut, Resource};
use bevy_turborand::prelude::{GlobalRng, RngPlugin};
use log::info;

/// Catch-all error type for the terminal/IO operations the binary performs
/// outside the simulation core (terminal setup, the event channel).
pub type AppResult<T> = std::result::Result<T, Box<dyn error::Error>>;

use crate::config::BOARD_SIZE;
use crate::entity::{tick_entities, EntityRegistry};
use crate::geometry::Vec2i;
use crate::input::Command;
use crate::linecast::Line;
use crate::player::{attempt_move, build_turret, reset_laser_streak, shoot_arrow, shoot_laser, Player};
use crate::render::{render_view, remember, ScreenCell};
use crate::sight::{update_sight_lines, MemoryMap};
use crate::world::{Board, WorldGraph};

#[derive(Resource, Default, Clone, Debug)]
struct SightLines(Vec<Line>);

#[derive(Resource, Default, Clone, Copy, Debug)]
struct PendingLaser(bool);

/// Owns the bevy `App` and exposes the two operations an outer host needs:
/// queue one command, then advance exactly one turn.
pub struct GameEngine {
	pub running: bool,
	bevy: App,
}
impl GameEngine {
	pub fn new(seed: u64) -> GameEngine {
		let mut app = App::new();
		app.add_plugins(MinimalPlugins);
		app.add_plugins(RngPlugin::new().with_rng_seed(seed));
		app.add_event::<Command>();

		let mut world = WorldGraph::new();
		let board = world.add_board(Board::square(BOARD_SIZE));
		let center = Vec2i::new(BOARD_SIZE / 2, BOARD_SIZE / 2);
		app.insert_resource(world);
		app.insert_resource(EntityRegistry::new());
		app.insert_resource(Player::new(board, center));
		app.insert_resource(MemoryMap::new());
		app.insert_resource(SightLines::default());
		app.insert_resource(PendingLaser::default());

		app.add_systems(
			Update,
			(
				dispatch_command_system,
				crate::terrain::fire_system,
				laser_system,
				crate::terrain::plant_system,
				crate::terrain::water_system,
				crate::terrain::steam_system,
				sight_system,
				entities_system,
			)
				.chain(),
		);

		GameEngine { running: true, bevy: app }
	}

	/// Queues the next turn's command. `Quit` is handled immediately and
	/// never reaches the bevy schedule.
	pub fn queue_command(&mut self, command: Command) {
		if command == Command::Quit {
			info!("engine: quit requested");
			self.running = false;
			return;
		}
		self.bevy.world.resource_mut::<Events<Command>>().send(command);
	}

	/// Advances exactly one turn: dispatch the queued command, then run the
	/// fixed fire -> laser -> plants -> water -> steam -> sight -> entities
	/// chain.
	pub fn tick(&mut self) {
		self.bevy.update();
	}

	/// Renders the current view and, as a post-render side effect, paints the
	/// freshly rendered sight cells into the memory map.
	pub fn render(&mut self) -> Vec<ScreenCell> {
		self.bevy.world.resource_scope(|world, mut memory: bevy::prelude::Mut<MemoryMap>| {
			let graph = world.resource::<WorldGraph>();
			let registry = world.resource::<EntityRegistry>();
			let player = world.resource::<Player>();
			let lines = &world.resource::<SightLines>().0;
			let buffer = render_view(graph, registry, player, &memory, lines);
			remember(&mut memory, graph, registry, player, lines);
			buffer
		})
	}
}

fn dispatch_command_system(
	mut commands: EventReader<Command>,
	mut world: ResMut<WorldGraph>,
	mut registry: ResMut<EntityRegistry>,
	mut player: ResMut<Player>,
	mut memory: ResMut<MemoryMap>,
	mut pending_laser: ResMut<PendingLaser>,
) {
	let Some(command) = commands.iter().last() else { return };
	pending_laser.0 = false;
	match *command {
		Command::Move(dir) => {
			let step = dir.to_vec() * player.player_transform;
			attempt_move(&world, &mut registry, &mut player, &mut memory, step, true);
			reset_laser_streak(&mut player);
		}
		Command::ShootArrow => {
			shoot_arrow(&mut world, &mut registry, &player);
			reset_laser_streak(&mut player);
		}
		Command::BuildTurret => {
			build_turret(&mut world, &mut registry, &player);
			reset_laser_streak(&mut player);
		}
		Command::LaserFire => {
			pending_laser.0 = true;
		}
		Command::Quit => {}
	}
}

fn laser_system(mut pending_laser: ResMut<PendingLaser>, mut world: ResMut<WorldGraph>, mut registry: ResMut<EntityRegistry>, mut player: ResMut<Player>) {
	if pending_laser.0 {
		shoot_laser(&mut world, &mut registry, &mut player);
		pending_laser.0 = false;
	}
}

fn sight_system(world: Res<WorldGraph>, mut registry: ResMut<EntityRegistry>, player: Res<Player>, mut lines: ResMut<SightLines>) {
	lines.0 = update_sight_lines(&world, &mut registry, &player);
}

fn entities_system(mut world: ResMut<WorldGraph>, mut registry: ResMut<EntityRegistry>, mut rng: ResMut<GlobalRng>, player: Res<Player>) {
	tick_entities(&mut world, &mut registry, &mut rng, &player);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fresh_engine_ticks_without_panicking() {
		let mut engine = GameEngine::new(42);
		engine.queue_command(Command::Move(crate::geometry::Direction::Right));
		engine.tick();
		let _ = engine.render();
		assert!(engine.running);
	}

	#[test]
	fn quit_command_stops_the_engine_without_ticking_bevy() {
		let mut engine = GameEngine::new(42);
		engine.queue_command(Command::Quit);
		assert!(!engine.running);
	}
}

// EOF
