//! Keyboard-style input read line by line from stdin.
//!
//! Input is the only writer of the background colour. The frame loop reads it
//! once per tick, so a change always lands between two ticks.

use chrono::{DateTime, Utc};
use chroma_core::Color;
use parking_lot::RwLock;
use rand::Rng;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Replace the background with a random colour
    NewBackground,
    Quit,
}

/// `space` or an empty line changes the background; `q` or `quit` stops
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "space" | " " => Some(Command::NewBackground),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Current background colour and when it last changed
#[derive(Debug, Clone)]
pub struct Background {
    pub color: Color,
    pub changed_at: DateTime<Utc>,
    pub changes: u64,
}

impl Background {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            changed_at: Utc::now(),
            changes: 0,
        }
    }

    pub fn set(&mut self, color: Color) {
        self.color = color;
        self.changed_at = Utc::now();
        self.changes += 1;
    }
}

pub type SharedBackground = Arc<RwLock<Background>>;

pub fn shared_background(color: Color) -> SharedBackground {
    Arc::new(RwLock::new(Background::new(color)))
}

fn random_background<R: Rng>(rng: &mut R) -> Color {
    Color::new(rng.gen(), rng.gen(), rng.gen())
}

/// Apply one command; returns false once the loop should stop
pub fn apply_command<R: Rng>(
    command: Command,
    background: &SharedBackground,
    rng: &mut R,
) -> bool {
    match command {
        Command::NewBackground => {
            let color = random_background(rng);
            let mut bg = background.write();
            bg.set(color);
            info!(
                event = "background_changed",
                color = %color,
                changes = bg.changes,
                "Background colour changed"
            );
            true
        }
        Command::Quit => false,
    }
}

/// Read commands until EOF or a quit command, which is signalled on
/// `shutdown`. Blocks, so the runner gives it a thread of its own.
pub fn read_commands<B: BufRead>(
    reader: B,
    background: SharedBackground,
    shutdown: watch::Sender<bool>,
) {
    let mut rng = rand::thread_rng();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                return;
            }
        };

        match parse_command(&line) {
            Some(command) => {
                if !apply_command(command, &background, &mut rng) {
                    info!("Quit requested");
                    let _ = shutdown.send(true);
                    return;
                }
            }
            None => debug!(input = %line.trim(), "Ignoring unknown command"),
        }
    }

    debug!("Input closed, background is now fixed");
}
