use crate::config::{Config, RATE_CHECK_INTERVAL};
use crate::core::audio::{AudioCues, SoundCue};
use crate::core::skeleton::Skeleton;
use crate::core::space::{PlayerFrame, Playfield};
use crate::game::players::Roster;
use crate::game::scene::Backdrop;
use crate::game::things::{FallingThings, GameMode, HitFlags, PolyKinds, Surface};
use log::debug;

/// Per-dispatch data the game loop hands to the frame handler.
pub struct FrameInput<'a> {
    pub frame_count: u64,
    pub actual_fps: f64,
    pub skeletons: &'a [Skeleton],
    /// `None` keeps whatever was shown last.
    pub backdrop: Option<Backdrop>,
}

/// Advances the falling-object field and rebuilds the frame's draw list.
pub struct FrameHandler {
    roster: Roster,
    playfield: Playfield,
    intra_frames: u32,
    backdrop: Backdrop,
}

impl FrameHandler {
    pub fn new(playfield: Playfield, intra_frames: u32) -> Self {
        Self { roster: Roster::new(), playfield, intra_frames: intra_frames.max(1), backdrop: Backdrop::Blank }
    }

    /// Pushes the tuning knobs and the current geometry into a fresh field.
    pub fn configure(&self, things: &mut dyn FallingThings, config: &Config) {
        things.set_gravity(config.drop_gravity);
        things.set_drop_rate(config.drop_rate);
        things.set_size(config.drop_size);
        things.set_polies(PolyKinds::All);
        things.set_game_mode(GameMode::Off);
        things.set_framerate(config.max_framerate);
        things.set_boundaries(self.playfield.falling_bounds);
    }

    /// Follows the presentation target's size; returns whether anything changed.
    pub fn resize(&mut self, width: f64, height: f64, things: &mut dyn FallingThings) -> bool {
        let screen = self.playfield.screen;
        if screen.width == width && screen.height == height {
            return false;
        }
        self.playfield.resize(width, height);
        things.set_boundaries(self.playfield.falling_bounds);
        debug!("Playfield resized to {}x{}.", width, height);
        true
    }

    pub fn player_frame(&self) -> PlayerFrame {
        self.playfield.player_frame()
    }

    pub fn advance(
        &mut self,
        input: &FrameInput,
        things: &mut dyn FallingThings,
        audio: &dyn AudioCues,
        surface: &mut dyn Surface,
    ) -> usize {
        if input.frame_count % RATE_CHECK_INTERVAL == 0 {
            things.set_framerate(input.actual_fps);
        }

        self.roster.update(input.skeletons, &self.playfield.player_frame());

        for _ in 0..self.intra_frames {
            for player in self.roster.players().filter(|p| p.is_alive()) {
                let hit = things.look_for_hits(player.segments(), player.id());
                if let Some(cue) = hit_cue(hit) {
                    audio.play(cue);
                }
            }
            things.advance_frame();
        }

        if let Some(b) = input.backdrop {
            self.backdrop = b;
        }
        surface.clear();
        things.draw_frame(surface);
        for player in self.roster.players().filter(|p| p.is_alive()) {
            for seg in player.segments() {
                surface.draw_segment(seg);
            }
        }
        surface.draw_backdrop(self.backdrop);

        self.roster.check_players(things)
    }
}

/// Squeezes outrank pops, pops outrank plain hand contact.
fn hit_cue(hit: HitFlags) -> Option<SoundCue> {
    if hit.contains(HitFlags::SQUEEZED) {
        Some(SoundCue::Squeeze)
    } else if hit.contains(HitFlags::POPPED) {
        Some(SoundCue::Pop)
    } else if hit.contains(HitFlags::HAND) {
        Some(SoundCue::Hit)
    } else {
        None
    }
}
