// input.rs
// Translates terminal key events into the turn command set. Grounded on
// engine/handler.rs's `key_parser`, which maps both arrow keys and vi-style
// hjkl to `PlayerAction(MoveTo(Direction))`; this crate keeps that same dual
// binding, trimmed of the PLANQ CLI sub-mode and the menu navigation the
// source's `key_parser` falls through to first (neither applies here: no
// menus, no PLANQ accessory).

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::geometry::Direction;

/// The command set a turn consumes. `Move` carries a direction in the
/// player's own local frame; the host performs no rotation of its own, since
/// the core multiplies by `player_transform` on entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
	Quit,
	LaserFire,
	ShootArrow,
	BuildTurret,
	Move(Direction),
}

/// Parses one key event into a [`Command`], or `None` for keys this crate
/// does not bind. Every unbound key is silently ignored: bad input is an
/// absorbing no-op, never an error.
pub fn key_parser(key_event: KeyEvent) -> Option<Command> {
	if key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
		return Some(Command::Quit);
	}
	match key_event.code {
		KeyCode::Esc | KeyCode::Char('Q') => Some(Command::Quit),
		KeyCode::Left | KeyCode::Char('h') => Some(Command::Move(Direction::Left)),
		KeyCode::Down | KeyCode::Char('j') => Some(Command::Move(Direction::Down)),
		KeyCode::Up | KeyCode::Char('k') => Some(Command::Move(Direction::Up)),
		KeyCode::Right | KeyCode::Char('l') => Some(Command::Move(Direction::Right)),
		KeyCode::Char('f') => Some(Command::ShootArrow),
		KeyCode::Char('t') => Some(Command::BuildTurret),
		KeyCode::Char(' ') => Some(Command::LaserFire),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn key(code: KeyCode) -> KeyEvent {
		KeyEvent::new(code, KeyModifiers::NONE)
	}

	#[test]
	fn arrow_and_vi_keys_agree() {
		assert_eq!(key_parser(key(KeyCode::Left)), key_parser(key(KeyCode::Char('h'))));
		assert_eq!(key_parser(key(KeyCode::Down)), key_parser(key(KeyCode::Char('j'))));
		assert_eq!(key_parser(key(KeyCode::Up)), key_parser(key(KeyCode::Char('k'))));
		assert_eq!(key_parser(key(KeyCode::Right)), key_parser(key(KeyCode::Char('l'))));
	}

	#[test]
	fn ctrl_c_always_quits() {
		let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
		assert_eq!(key_parser(event), Some(Command::Quit));
	}

	#[test]
	fn unbound_key_is_none() {
		assert_eq!(key_parser(key(KeyCode::Char('z'))), None);
	}
}

// EOF
