// tui.rs
// Terminal setup/teardown and the event-polling thread. Transcribed from
// engine/tui.rs, trimmed of nothing structural -- this crate's main loop
// still needs exactly the same Tick/Key/Mouse/Resize event set, just with a
// different tick payload (no menu-driven `Event::Mouse` handling to add).

use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyEvent, MouseEvent};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::Backend;
use ratatui::buffer::Cell as RatatuiCell;
use ratatui::Terminal;

use crate::engine::{AppResult, GameEngine};

/// Owns the terminal handle and the background event-polling thread.
pub struct Tui<B: Backend> {
	terminal: Terminal<B>,
	pub events: TuiEventHandler,
}
impl<B: Backend> Tui<B> {
	pub fn new(terminal: Terminal<B>, events: TuiEventHandler) -> Self {
		Self { terminal, events }
	}
	/// Enables raw mode and switches to the alternate screen.
	pub fn init(&mut self) -> AppResult<()> {
		terminal::enable_raw_mode()?;
		crossterm::execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;
		self.terminal.hide_cursor()?;
		self.terminal.clear()?;
		Ok(())
	}
	/// Renders one frame from the engine's current `ScreenCell` buffer.
	pub fn draw(&mut self, app: &mut GameEngine) -> AppResult<()> {
		let buffer = app.render();
		self.terminal.draw(|frame| {
			let area = frame.size();
			let diameter = (2 * crate::config::SIGHT_RADIUS + 1) as u16;
			for y in 0..diameter.min(area.height) {
				for x in 0..diameter.min(area.width) {
					let idx = (y as usize) * (diameter as usize) + (x as usize);
					let cell: RatatuiCell = buffer[idx].into();
					let target = frame.buffer_mut().get_mut(area.x + x, area.y + y);
					*target = cell;
				}
			}
		})?;
		Ok(())
	}
	/// Restores the terminal to its pre-`init` state.
	pub fn exit(&mut self) -> AppResult<()> {
		terminal::disable_raw_mode()?;
		crossterm::execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture)?;
		self.terminal.show_cursor()?;
		Ok(())
	}
}

/// Polls crossterm on a background thread, interleaving a fixed-rate `Tick`
/// event with whatever terminal events arrive.
#[allow(dead_code)]
pub struct TuiEventHandler {
	sender: mpsc::Sender<TuiEvent>,
	receiver: mpsc::Receiver<TuiEvent>,
	handler: thread::JoinHandle<()>,
}
impl TuiEventHandler {
	pub fn new(tick_rate: u64) -> Self {
		let tick_rate = Duration::from_millis(tick_rate);
		let (sender, receiver) = mpsc::channel();
		let handler = {
			let sender = sender.clone();
			thread::spawn(move || {
				let mut last_tick = Instant::now();
				loop {
					let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or(tick_rate);
					if event::poll(timeout).expect("no events available") {
						match event::read().expect("unable to read event") {
							CrosstermEvent::Key(e) => sender.send(TuiEvent::Key(e)),
							CrosstermEvent::Mouse(e) => sender.send(TuiEvent::Mouse(e)),
							CrosstermEvent::Resize(w, h) => sender.send(TuiEvent::Resize(w, h)),
							_ => Ok(()),
						}
						.expect("failed to send terminal event");
					}
					if last_tick.elapsed() >= tick_rate {
						sender.send(TuiEvent::Tick).expect("failed to send tick event");
						last_tick = Instant::now();
					}
				}
			})
		};
		Self { sender, receiver, handler }
	}
	pub fn next(&self) -> AppResult<TuiEvent> {
		Ok(self.receiver.recv()?)
	}
}

#[derive(Clone, Copy, Debug)]
pub enum TuiEvent {
	Tick,
	Key(KeyEvent),
	Mouse(MouseEvent),
	Resize(u16, u16),
}

// EOF
