use shapestage::config::Config;
use shapestage::core::audio::{AudioCues, SoundCue};
use shapestage::core::present::{LogSurface, Presenter};
use shapestage::core::scheduler::{Collaborators, GameLoop};
use shapestage::core::skeleton::{Joint, JointType, Skeleton, SkeletonError, SkeletonFeed};
use shapestage::core::space::{PlayerFrame, Playfield, Rect};
use shapestage::game::scene::Scene;
use shapestage::game::script::StageScript;
use shapestage::game::things::{FallingThings, GameMode, HitFlags, PolyKinds, Segment, Surface};
use shapestage::game::timer::TickDriver;
use shapestage::sim::{target_board, SimFeed, SimField};
use shapestage::state::SharedState;
use std::sync::mpsc::channel;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct Cues(Arc<Mutex<Vec<SoundCue>>>);

impl AudioCues for Cues {
    fn play(&self, cue: SoundCue) {
        self.0.lock().unwrap().push(cue);
    }
    fn stop(&self, _: SoundCue) {}
}

struct Nobody;

impl SkeletonFeed for Nobody {
    fn latest(&mut self) -> Result<Vec<Skeleton>, SkeletonError> {
        Err(SkeletonError::Unavailable("no sensor".into()))
    }
}

fn wait_for(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn loop_starts_and_stops_on_flag() {
    let shared = SharedState::new();
    let config = Config::default();
    let (presenter, present_handle) = Presenter::spawn(Box::new(LogSurface::default())).unwrap();
    let parts = Collaborators {
        things: Box::new(SimField::new(config.max_shapes, config.intra_frames, target_board(), 1)),
        audio: Box::new(Cues::default()),
        feed: Box::new(Nobody),
    };

    let handle = GameLoop::new(shared.clone(), &config, StageScript::default(), parts, presenter).spawn().unwrap();
    assert!(shared.is_running());
    thread::sleep(Duration::from_millis(100));
    assert_eq!(shared.scene(), Scene::Title);

    shared.set_running(false);
    handle.join().unwrap();
    present_handle.join().unwrap();
    assert!(!shared.shutdown_requested());
}

#[test]
fn loop_stops_when_presentation_side_closes() {
    let shared = SharedState::new();
    let config = Config::default();
    let (tx, rx) = channel();
    drop(rx);
    let parts = Collaborators {
        things: Box::new(SimField::new(config.max_shapes, config.intra_frames, target_board(), 2)),
        audio: Box::new(Cues::default()),
        feed: Box::new(Nobody),
    };

    let handle = GameLoop::new(shared.clone(), &config, StageScript::default(), parts, Presenter::from_sender(tx))
        .spawn()
        .unwrap();
    handle.join().unwrap();
    assert!(!shared.is_running());
}

#[test]
fn simulated_player_finishes_the_show() {
    let shared = SharedState::new();
    let config = Config { tick_period: Duration::from_millis(1), ..Config::default() };
    let script = StageScript::default();
    let playfield = Playfield::new(config.playfield_width, config.playfield_height);
    let board = target_board();
    let cues = Cues::default();

    let parts = Collaborators {
        things: Box::new(SimField::new(config.max_shapes, config.intra_frames, board.clone(), 11)),
        audio: Box::new(cues.clone()),
        feed: Box::new(SimFeed::new(shared.clone(), script.clone(), playfield.player_frame(), board, 12)),
    };
    let (presenter, present_handle) = Presenter::spawn(Box::new(LogSurface::default())).unwrap();
    let mut ticker = TickDriver::spawn(shared.timer.clone(), config.tick_period);
    let handle = GameLoop::new(shared.clone(), &config, script, parts, presenter).spawn().unwrap();

    let finished = wait_for(Duration::from_secs(60), || shared.shutdown_requested());
    if !finished {
        shared.set_running(false);
    }
    handle.join().unwrap();
    ticker.stop();
    present_handle.join().unwrap();

    assert!(finished, "stuck in {:?}", shared.scene());
    assert_eq!(shared.scene(), Scene::End);
    let played = cues.0.lock().unwrap();
    assert_eq!(played.first(), Some(&SoundCue::Opening));
    assert!(played.contains(&SoundCue::Stage4));
    assert!(played.iter().any(|c| matches!(c, SoundCue::Pop | SoundCue::Squeeze | SoundCue::Hit)));
}

/// Replays the same snapshot every frame.
struct Posed(Vec<Skeleton>);

impl SkeletonFeed for Posed {
    fn latest(&mut self) -> Result<Vec<Skeleton>, SkeletonError> {
        Ok(self.0.clone())
    }
}

fn hand(frame: &PlayerFrame, kind: JointType, x: f64, y: f64) -> Joint {
    let c = frame.center();
    Joint::tracked(kind, (x - c.x) / frame.scale(), (c.y - y) / frame.scale())
}

/// Runs the loop on `skeletons` until calibration either passes or has had `grace` to do so.
fn calibrate_with(skeletons: Vec<Skeleton>, grace: Duration) -> Scene {
    let shared = SharedState::new();
    let config = Config { tick_period: Duration::from_millis(1), ..Config::default() };
    let parts = Collaborators {
        things: Box::new(SimField::new(config.max_shapes, config.intra_frames, target_board(), 5)),
        audio: Box::new(Cues::default()),
        feed: Box::new(Posed(skeletons)),
    };
    let (presenter, present_handle) = Presenter::spawn(Box::new(LogSurface::default())).unwrap();
    let mut ticker = TickDriver::spawn(shared.timer.clone(), config.tick_period);
    let handle = GameLoop::new(shared.clone(), &config, StageScript::default(), parts, presenter).spawn().unwrap();

    assert!(wait_for(Duration::from_secs(20), || shared.scene() >= Scene::Stage1Calibrate));
    wait_for(grace, || shared.scene() > Scene::Stage1Calibrate);
    let reached = shared.scene();

    shared.set_running(false);
    handle.join().unwrap();
    ticker.stop();
    present_handle.join().unwrap();
    reached
}

#[test]
fn last_tracked_player_gates_calibration() {
    let frame = Playfield::new(800.0, 600.0).player_frame();
    let both = Skeleton::tracked([
        hand(&frame, JointType::HandLeft, 250.0, 300.0),
        hand(&frame, JointType::HandRight, 450.0, 275.0),
    ]);
    let one = Skeleton::tracked([hand(&frame, JointType::HandLeft, 250.0, 300.0)]);

    assert_eq!(calibrate_with(vec![both.clone(), one.clone()], Duration::from_millis(500)), Scene::Stage1Calibrate);
    assert!(calibrate_with(vec![one, both], Duration::from_secs(10)) > Scene::Stage1Calibrate);
}

#[derive(Clone, Default)]
struct BoundsSpy(Arc<Mutex<Vec<Rect>>>);

impl FallingThings for BoundsSpy {
    fn add_new_thing(&mut self, _: f64, _: f64) {}
    fn things_num(&self) -> usize { 0 }
    fn advance_frame(&mut self) {}
    fn look_for_hits(&mut self, _: &[Segment], _: usize) -> HitFlags { HitFlags::NONE }
    fn draw_frame(&self, _: &mut dyn Surface) {}
    fn set_gravity(&mut self, _: f64) {}
    fn set_drop_rate(&mut self, _: f64) {}
    fn set_size(&mut self, _: f64) {}
    fn set_polies(&mut self, _: PolyKinds) {}
    fn set_game_mode(&mut self, _: GameMode) {}
    fn set_framerate(&mut self, _: f64) {}
    fn set_boundaries(&mut self, bounds: Rect) {
        self.0.lock().unwrap().push(bounds);
    }
}

#[test]
fn presentation_size_reaches_the_field() {
    let shared = SharedState::new();
    let config = Config::default();
    let spy = BoundsSpy::default();
    let parts = Collaborators { things: Box::new(spy.clone()), audio: Box::new(Cues::default()), feed: Box::new(Nobody) };
    let (presenter, present_handle) = Presenter::spawn(Box::new(LogSurface::sized(1600.0, 1200.0))).unwrap();
    let handle = GameLoop::new(shared.clone(), &config, StageScript::default(), parts, presenter).spawn().unwrap();

    let resized = wait_for(Duration::from_secs(5), || spy.0.lock().unwrap().len() >= 2);
    shared.set_running(false);
    handle.join().unwrap();
    present_handle.join().unwrap();

    assert!(resized);
    let bounds = spy.0.lock().unwrap();
    assert_eq!(*bounds, vec![Rect::new(0.0, 0.0, 800.0, 600.0), Rect::new(0.0, 0.0, 1600.0, 1200.0)]);
}
