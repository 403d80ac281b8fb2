use crate::config::{Config, RATE_CHECK_INTERVAL, RATE_SHORTFALL};
use crate::core::audio::AudioCues;
use crate::core::present::{DisplayList, Presenter, PresenterGone};
use crate::core::skeleton::{self, SkeletonFeed};
use crate::core::space::Playfield;
use crate::game::frame::{FrameHandler, FrameInput};
use crate::game::script::StageScript;
use crate::game::stage::{StageContext, StageMachine, Step};
use crate::game::things::FallingThings;
use crate::state::SharedState;
use log::{info, warn};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// -----------------------------------------------------------------------------
// Frame pacing
// -----------------------------------------------------------------------------

/// Adaptive frame pacer. Time comes in as `Instant`s so the arithmetic is
/// testable without sleeping.
///
/// The target rate only ever ratchets down: every hundred frames, if the
/// smoothed achieved rate is under 92% of target, the target moves halfway
/// toward the achieved rate (never below `min_rate`).
#[derive(Debug, Clone)]
pub struct FramePacer {
    target_rate: f64,
    min_rate: f64,
    resolution_ms: f64,
    actual_frame_time: f64,
    frame_count: u64,
    last_frame: Option<Instant>,
    pred_next: Option<Instant>,
}

impl FramePacer {
    pub fn new(max_rate: f64, min_rate: f64, resolution_ms: f64) -> Self {
        let target_rate = max_rate.max(min_rate);
        Self {
            target_rate,
            min_rate,
            resolution_ms,
            actual_frame_time: 1000.0 / target_rate,
            frame_count: 0,
            last_frame: None,
            pred_next: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_framerate, config.min_framerate, config.timer_resolution_ms)
    }

    /// Records a frame at `now` and returns how long to sleep before dispatching it.
    pub fn on_frame(&mut self, now: Instant) -> Option<Duration> {
        let last = *self.last_frame.get_or_insert(now);
        let ms = now.duration_since(last).as_secs_f64() * 1000.0;
        self.actual_frame_time = self.actual_frame_time * 0.95 + 0.05 * ms;
        self.last_frame = Some(now);

        self.frame_count += 1;
        if self.frame_count % RATE_CHECK_INTERVAL == 0 {
            let achieved = self.actual_rate();
            if achieved < self.target_rate * RATE_SHORTFALL {
                let lowered = ((self.target_rate + achieved) / 2.0).max(self.min_rate);
                if lowered < self.target_rate {
                    info!("Falling behind ({:.1} fps achieved), target {:.1} -> {:.1} fps.", achieved, self.target_rate, lowered);
                    self.target_rate = lowered;
                }
            }
        }

        let mut sleep = None;
        let pred = match self.pred_next {
            Some(pred) if pred >= now => {
                let ahead_ms = pred.duration_since(now).as_secs_f64() * 1000.0;
                // Exactly one resolution step ahead still sleeps.
                if ahead_ms >= self.resolution_ms {
                    sleep = Some(Duration::from_millis((ahead_ms + 0.5) as u64));
                }
                pred
            }
            // Behind schedule: drop the lag instead of bursting to catch up.
            _ => now,
        };
        self.pred_next = Some(pred + Duration::from_secs_f64(1.0 / self.target_rate));
        sleep
    }

    #[inline(always)] pub fn target_rate(&self) -> f64 { self.target_rate }
    #[inline(always)] pub fn frame_count(&self) -> u64 { self.frame_count }

    pub fn actual_rate(&self) -> f64 {
        if self.actual_frame_time > 0.0 { 1000.0 / self.actual_frame_time } else { self.target_rate }
    }
}

// -----------------------------------------------------------------------------
// Game loop
// -----------------------------------------------------------------------------

/// The external pieces the loop drives.
pub struct Collaborators {
    pub things: Box<dyn FallingThings>,
    pub audio: Box<dyn AudioCues>,
    pub feed: Box<dyn SkeletonFeed>,
}

pub struct GameLoop {
    shared: Arc<SharedState>,
    pacer: FramePacer,
    machine: StageMachine,
    handler: FrameHandler,
    parts: Collaborators,
    presenter: Presenter,
    list: DisplayList,
}

impl GameLoop {
    pub fn new(
        shared: Arc<SharedState>,
        config: &Config,
        script: StageScript,
        mut parts: Collaborators,
        presenter: Presenter,
    ) -> Self {
        let handler = FrameHandler::new(Playfield::new(config.playfield_width, config.playfield_height), config.intra_frames);
        handler.configure(parts.things.as_mut(), config);
        Self {
            machine: StageMachine::new(shared.clone(), script),
            shared,
            pacer: FramePacer::from_config(config),
            handler,
            parts,
            presenter,
            list: DisplayList::default(),
        }
    }

    /// Marks the loop running and moves it onto its own thread.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        self.shared.set_running(true);
        let shared = self.shared.clone();
        thread::Builder::new().name("game-loop".into()).spawn(move || self.run()).inspect_err(|_| {
            shared.set_running(false);
        })
    }

    pub fn run(mut self) {
        info!("Game loop starting, target {:.0} fps.", self.pacer.target_rate());
        self.machine.start(&mut StageContext { things: self.parts.things.as_mut(), audio: self.parts.audio.as_ref() });

        while self.shared.is_running() {
            if let Err(e) = self.iterate() {
                warn!("Stopping game loop: {}", e);
                self.shared.set_running(false);
            }
        }

        info!(
            "Game loop stopped after {} frames in {:?} (target {:.1} fps).",
            self.pacer.frame_count(),
            self.machine.scene(),
            self.pacer.target_rate()
        );
    }

    fn iterate(&mut self) -> Result<(), PresenterGone> {
        let step = self
            .machine
            .check(&mut StageContext { things: self.parts.things.as_mut(), audio: self.parts.audio.as_ref() });
        if step == Step::Finished {
            return Ok(());
        }

        if let Some(nap) = self.pacer.on_frame(Instant::now()) {
            thread::sleep(nap);
        }

        let skeletons = skeleton::snapshot(self.parts.feed.as_mut());
        let frame = self.handler.player_frame();
        self.machine.zones_mut().evaluate_all(&skeletons, &frame);

        let input = FrameInput {
            frame_count: self.pacer.frame_count(),
            actual_fps: self.pacer.actual_rate(),
            skeletons: &skeletons,
            backdrop: self.machine.backdrop(),
        };
        self.handler
            .advance(&input, self.parts.things.as_mut(), self.parts.audio.as_ref(), &mut self.list);

        let list = std::mem::take(&mut self.list);
        let shown = self.presenter.present(self.pacer.frame_count(), self.machine.scene(), list)?;
        self.list = shown.list;
        if let Some((width, height)) = shown.size {
            self.handler.resize(width, height, self.parts.things.as_mut());
        }
        Ok(())
    }
}
