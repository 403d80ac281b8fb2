use crate::core::audio::AudioCues;
use crate::game::collision::CalibrationZoneSet;
use crate::game::scene::{collage_frame, Backdrop, CueChange, Gate, Scene};
use crate::game::script::StageScript;
use crate::game::things::FallingThings;
use crate::state::SharedState;
use log::{debug, info};
use std::sync::Arc;

/// Collaborators a scene change may touch.
pub struct StageContext<'a> {
    pub things: &'a mut dyn FallingThings,
    pub audio: &'a dyn AudioCues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Hold,
    Advanced(Scene),
    Finished,
}

/// Forward-only walk over [`Scene`], driven by the rules in the scene table.
pub struct StageMachine {
    scene: Scene,
    shared: Arc<SharedState>,
    zones: CalibrationZoneSet,
    script: StageScript,
    collage_on: bool,
    finished: bool,
}

impl StageMachine {
    pub fn new(shared: Arc<SharedState>, script: StageScript) -> Self {
        Self {
            scene: Scene::Title,
            shared,
            zones: CalibrationZoneSet::new(),
            script,
            collage_on: false,
            finished: false,
        }
    }

    /// Applies the first scene's entry effects (arms the title countdown).
    pub fn start(&mut self, ctx: &mut StageContext) {
        self.finished = false;
        self.enter(Scene::Title, ctx);
    }

    /// Once-per-loop gate check; advances at most one scene.
    pub fn check(&mut self, ctx: &mut StageContext) -> Step {
        if self.finished {
            return Step::Finished;
        }

        let open = match self.scene.rule().gate {
            Gate::Timer => self.shared.timer.take_trigger(),
            Gate::Collision => self.zones.satisfied(),
            Gate::Immediate => true,
            Gate::Completion => ctx.things.things_num() == 0,
        };
        if !open {
            return Step::Hold;
        }

        match self.scene.next() {
            Some(next) => {
                self.enter(next, ctx);
                Step::Advanced(next)
            }
            None => {
                info!("Final scene expired, requesting shutdown.");
                self.finished = true;
                self.shared.request_shutdown();
                Step::Finished
            }
        }
    }

    fn enter(&mut self, next: Scene, ctx: &mut StageContext) {
        let prev = self.scene;
        self.scene = next;
        self.shared.publish_scene(next);
        let entry = next.rule().enter;

        if entry.reset_zones {
            self.zones.reset();
        }
        let content = next.stage().and_then(|i| self.script.stage(i));
        if entry.load_zones {
            if let Some(c) = content {
                self.zones.extend(&c.zones);
            }
        }
        if entry.spawn {
            if let Some(c) = content {
                for p in &c.spawns {
                    ctx.things.add_new_thing(p.x, p.y);
                }
                debug!("Spawned {} objects for {:?}.", c.spawns.len(), next);
            }
        }
        match entry.cue {
            CueChange::Keep => {}
            CueChange::Play(cue) => ctx.audio.play(cue),
            CueChange::Switch(cue) => {
                ctx.audio.stop_all();
                ctx.audio.play(cue);
            }
        }
        if let Some(on) = entry.collage {
            self.collage_on = on;
        }
        if let Some(max) = entry.arm_timer {
            self.shared.timer.arm(max);
        }

        if prev == next {
            info!("Entered scene {:?}.", next);
        } else {
            info!("Scene {:?} -> {:?}.", prev, next);
        }
    }

    /// What the presentation side should show this frame; `None` leaves it unchanged.
    pub fn backdrop(&self) -> Option<Backdrop> {
        if self.scene == Scene::ResultMovie && self.collage_on {
            return collage_frame(self.shared.timer.snapshot().tick()).map(Backdrop::Snapshot);
        }
        self.scene.backdrop()
    }

    #[inline(always)] pub fn scene(&self) -> Scene { self.scene }
    pub fn zones(&self) -> &CalibrationZoneSet { &self.zones }
    pub fn zones_mut(&mut self) -> &mut CalibrationZoneSet { &mut self.zones }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audio::SoundCue;
    use crate::core::skeleton::{Joint, JointType, Skeleton};
    use crate::core::space::{PlayerFrame, Rect};
    use crate::game::scene::Snapshot;
    use crate::game::things::{GameMode, HitFlags, PolyKinds, Segment, Surface};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Field {
        count: usize,
        spawned: Vec<(f64, f64)>,
    }

    impl FallingThings for Field {
        fn add_new_thing(&mut self, x: f64, y: f64) {
            self.count += 1;
            self.spawned.push((x, y));
        }
        fn things_num(&self) -> usize { self.count }
        fn advance_frame(&mut self) {}
        fn look_for_hits(&mut self, _: &[Segment], _: usize) -> HitFlags { HitFlags::NONE }
        fn draw_frame(&self, _: &mut dyn Surface) {}
        fn set_gravity(&mut self, _: f64) {}
        fn set_drop_rate(&mut self, _: f64) {}
        fn set_size(&mut self, _: f64) {}
        fn set_polies(&mut self, _: PolyKinds) {}
        fn set_game_mode(&mut self, _: GameMode) {}
        fn set_framerate(&mut self, _: f64) {}
        fn set_boundaries(&mut self, _: Rect) {}
    }

    #[derive(Default)]
    struct Cues(Mutex<Vec<String>>);

    impl AudioCues for Cues {
        fn play(&self, cue: SoundCue) {
            self.0.lock().unwrap().push(format!("play {}", cue.asset_name()));
        }
        fn stop(&self, _: SoundCue) {}
        fn stop_all(&self) {
            self.0.lock().unwrap().push("stop_all".into());
        }
    }

    fn machine() -> (StageMachine, Arc<SharedState>) {
        let shared = SharedState::new();
        (StageMachine::new(shared.clone(), StageScript::default()), shared)
    }

    fn expire(shared: &SharedState) {
        let max = shared.timer.snapshot().max();
        for _ in 0..=max {
            shared.timer.advance();
        }
    }

    #[test]
    fn start_arms_title_and_plays_opening() {
        let (mut m, shared) = machine();
        let mut field = Field::default();
        let cues = Cues::default();
        m.start(&mut StageContext { things: &mut field, audio: &cues });
        assert_eq!(m.scene(), Scene::Title);
        assert_eq!(shared.timer.snapshot().max(), 40);
        assert!(shared.timer.snapshot().enabled());
        assert_eq!(*cues.0.lock().unwrap(), vec!["play opening".to_string()]);
    }

    #[test]
    fn timer_gate_holds_until_trigger() {
        let (mut m, shared) = machine();
        let mut field = Field::default();
        let cues = Cues::default();
        let mut ctx = StageContext { things: &mut field, audio: &cues };
        m.start(&mut ctx);
        assert_eq!(m.check(&mut ctx), Step::Hold);
        expire(&shared);
        assert_eq!(m.check(&mut ctx), Step::Advanced(Scene::Rules));
        assert_eq!(shared.timer.snapshot().max(), 30);
        assert_eq!(m.check(&mut ctx), Step::Hold);
    }

    #[test]
    fn calibration_then_spawn_then_completion() {
        let (mut m, shared) = machine();
        let mut field = Field::default();
        let cues = Cues::default();
        let mut ctx = StageContext { things: &mut field, audio: &cues };
        m.start(&mut ctx);
        expire(&shared);
        m.check(&mut ctx);
        expire(&shared);
        m.check(&mut ctx);
        assert_eq!(m.scene(), Scene::Stage1Left);
        expire(&shared);
        assert_eq!(m.check(&mut ctx), Step::Advanced(Scene::Stage1Calibrate));
        assert_eq!(m.zones().len(), 2);

        // Calibrate ignores its own timer.
        expire(&shared);
        assert_eq!(m.check(&mut ctx), Step::Hold);

        let frame = PlayerFrame::new(Rect::new(0.0, 0.0, 600.0, 600.0));
        let s = Skeleton::tracked([
            Joint::tracked(JointType::HandLeft, -50.0 / 300.0, 0.0),
            Joint::tracked(JointType::HandRight, 0.5, 25.0 / 300.0),
        ]);
        assert!(m.zones_mut().evaluate(&s, &frame));
        assert_eq!(m.check(&mut ctx), Step::Advanced(Scene::Stage1MapLoad));
        assert!(m.zones().is_empty());
        assert!(!m.zones().satisfied());

        assert_eq!(m.check(&mut ctx), Step::Advanced(Scene::Stage1Play));
        assert_eq!(ctx.things.things_num(), 2);

        assert_eq!(m.check(&mut ctx), Step::Hold);
        drop(ctx);
        assert_eq!(field.spawned, vec![(150.0, 200.0), (450.0, 200.0)]);
        field.count = 0;
        let mut ctx = StageContext { things: &mut field, audio: &cues };
        assert_eq!(m.check(&mut ctx), Step::Advanced(Scene::Stage1Result));
        assert_eq!(shared.timer.snapshot().max(), 15);
        assert!(cues.0.lock().unwrap().ends_with(&["stop_all".to_string(), "play success".to_string()]));
    }

    #[test]
    fn collage_follows_timer_tick() {
        let (mut m, shared) = machine();
        let mut field = Field::default();
        let cues = Cues::default();
        let mut ctx = StageContext { things: &mut field, audio: &cues };
        m.scene = Scene::ResultTitle;
        shared.timer.arm(0);
        shared.timer.advance();
        assert_eq!(m.check(&mut ctx), Step::Advanced(Scene::ResultMovie));
        for _ in 0..27 {
            shared.timer.advance();
        }
        assert_eq!(m.backdrop(), Some(Backdrop::Snapshot(Snapshot::Right1)));
    }

    #[test]
    fn end_scene_requests_shutdown() {
        let (mut m, shared) = machine();
        let mut field = Field::default();
        let cues = Cues::default();
        let mut ctx = StageContext { things: &mut field, audio: &cues };
        m.scene = Scene::End;
        shared.timer.arm(2);
        assert_eq!(m.check(&mut ctx), Step::Hold);
        expire(&shared);
        assert_eq!(m.check(&mut ctx), Step::Finished);
        assert!(shared.shutdown_requested());
        assert_eq!(m.check(&mut ctx), Step::Finished);
    }
}
