// main.rs
// created: 2026-07-26

use std::fs::File;
use std::io;
use std::time::{SystemTime, UNIX_EPOCH};

use log::LevelFilter;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use simplelog::{CombinedLogger, Config, WriteLogger};

use portalworld::engine::{AppResult, GameEngine};
use portalworld::input::key_parser;
use portalworld::tui::{Tui, TuiEvent, TuiEventHandler};

// *** MAIN METHOD
fn main() -> AppResult<()> {
	std::env::set_var("RUST_BACKTRACE", "1");
	CombinedLogger::init(vec![WriteLogger::new(LevelFilter::Debug, Config::default(), File::create("portalworld.log")?)])?;

	let backend = CrosstermBackend::new(io::stdout());
	let terminal = Terminal::new(backend)?;

	let events = TuiEventHandler::new(250);
	let mut tui = Tui::new(terminal, events);
	tui.init()?;

	let seed = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos() as u64;
	let mut eng = GameEngine::new(seed);

	while eng.running {
		tui.draw(&mut eng)?;
		match tui.events.next()? {
			TuiEvent::Tick => eng.tick(),
			TuiEvent::Key(key_event) => {
				if let Some(command) = key_parser(key_event) {
					eng.queue_command(command);
					eng.tick();
				}
			}
			TuiEvent::Mouse(_) => {}
			TuiEvent::Resize(_, _) => {}
		}
	}

	tui.exit()?;
	Ok(())
}

// EOF
