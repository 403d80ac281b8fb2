use crate::config::{self, FAST_TICK_PERIOD};
use crate::core::audio::CueEngine;
use crate::core::present::{LogSurface, Presenter};
use crate::core::scheduler::{Collaborators, GameLoop};
use crate::core::space::Playfield;
use crate::game::script::StageScript;
use crate::game::timer::TickDriver;
use crate::sim::{target_board, SimFeed, SimField};
use crate::state::SharedState;

use log::{info, warn};
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

/// Command-line switches.
#[derive(Debug, Default, Clone)]
pub struct Options {
    /// Run the countdown ten times faster.
    pub fast: bool,
    pub config_path: Option<PathBuf>,
}

impl Options {
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        let mut opts = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--fast" => opts.fast = true,
                "--config" => opts.config_path = args.next().map(PathBuf::from),
                other => warn!("Ignoring unknown argument '{}'.", other),
            }
        }
        opts
    }
}

/// Wires the headless game together and blocks until the final scene ends.
pub fn run(options: &Options) -> Result<(), Box<dyn Error>> {
    match &options.config_path {
        Some(path) => config::load_from(path),
        None => config::load(),
    }
    let mut config = config::get();
    if options.fast {
        config.tick_period = FAST_TICK_PERIOD;
    }
    let script = StageScript::load_or_default(config.script_path.as_deref());

    let shared = SharedState::new();
    let board = target_board();
    let playfield = Playfield::new(config.playfield_width, config.playfield_height);
    let seed: u64 = rand::random();

    let parts = Collaborators {
        things: Box::new(SimField::new(config.max_shapes, config.intra_frames, board.clone(), seed)),
        audio: Box::new(CueEngine::spawn()),
        feed: Box::new(SimFeed::new(shared.clone(), script.clone(), playfield.player_frame(), board, seed ^ 0x5eed)),
    };

    let (presenter, present_handle) = Presenter::spawn(Box::new(LogSurface::sized(config.playfield_width, config.playfield_height)))?;
    let mut ticker = TickDriver::spawn(shared.timer.clone(), config.tick_period);
    let started = Instant::now();

    let game = GameLoop::new(shared.clone(), &config, script, parts, presenter);
    let game_handle = game.spawn()?;

    let joined = game_handle.join();
    ticker.stop();
    if present_handle.join().is_err() {
        warn!("Presentation thread panicked.");
    }
    joined.map_err(|_| "game loop thread panicked")?;

    if shared.shutdown_requested() {
        info!("Show finished in {:.1}s.", started.elapsed().as_secs_f64());
    } else {
        warn!("Game loop ended before the final scene ({:?}).", shared.scene());
    }
    Ok(())
}
