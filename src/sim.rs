// Headless stand-ins for the sensor and the falling-object field.
use crate::core::skeleton::{Joint, JointType, Skeleton, SkeletonError, SkeletonFeed};
use crate::core::space::{PlayerFrame, Point, Rect};
use crate::game::scene::StagePhase;
use crate::game::script::StageScript;
use crate::game::things::{FallingThings, GameMode, HitFlags, PolyKinds, Segment, Surface};
use crate::state::SharedState;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// Where the simulated field's shapes currently are, for the simulated player to chase.
pub type TargetBoard = Arc<Mutex<Vec<Point>>>;

pub fn target_board() -> TargetBoard {
    Arc::new(Mutex::new(Vec::new()))
}

/* ------------------------------ player ------------------------------ */

// Normalized sensor-space body, hands excluded.
const BODY: [(JointType, f64, f64); 14] = [
    (JointType::Head, 0.0, 0.7),
    (JointType::ShoulderCenter, 0.0, 0.5),
    (JointType::ShoulderLeft, -0.2, 0.45),
    (JointType::ShoulderRight, 0.2, 0.45),
    (JointType::Spine, 0.0, 0.2),
    (JointType::HipCenter, 0.0, 0.0),
    (JointType::HipLeft, -0.12, 0.0),
    (JointType::HipRight, 0.12, 0.0),
    (JointType::KneeLeft, -0.14, -0.4),
    (JointType::KneeRight, 0.14, -0.4),
    (JointType::AnkleLeft, -0.15, -0.75),
    (JointType::AnkleRight, 0.15, -0.75),
    (JointType::FootLeft, -0.2, -0.8),
    (JointType::FootRight, 0.2, -0.8),
];

const REST: [(f64, f64); 2] = [(-0.35, 0.1), (0.35, 0.1)];
const REACH_RATIO: f64 = 0.12;
const JITTER_PX: f64 = 1.5;

/// A scripted player: idles between stages, reaches into calibration zones and
/// chases falling shapes during play.
pub struct SimFeed {
    shared: Arc<SharedState>,
    script: StageScript,
    frame: PlayerFrame,
    board: TargetBoard,
    rng: StdRng,
    hands: [Point; 2],
}

impl SimFeed {
    pub fn new(shared: Arc<SharedState>, script: StageScript, frame: PlayerFrame, board: TargetBoard, seed: u64) -> Self {
        let hands = REST.map(|(x, y)| frame.map(x, y));
        Self { shared, script, frame, board, rng: StdRng::seed_from_u64(seed), hands }
    }

    fn goals(&self) -> [Point; 2] {
        let rest = REST.map(|(x, y)| self.frame.map(x, y));
        let scene = self.shared.scene();
        let content = scene.stage().and_then(|i| self.script.stage(i));

        match (scene.phase(), content) {
            (Some(StagePhase::Calibrate), Some(c)) => {
                let mut goals = rest;
                for (goal, z) in goals.iter_mut().zip(&c.zones) {
                    *goal = Point { x: (z.x_min + z.x_max) / 2.0, y: (z.y_min + z.y_max) / 2.0 };
                }
                goals
            }
            (Some(StagePhase::Play), _) => {
                let targets = self.board.lock().unwrap_or_else(|p| p.into_inner());
                let left = targets.iter().min_by(|a, b| a.x.total_cmp(&b.x));
                let right = targets.iter().max_by(|a, b| a.x.total_cmp(&b.x));
                [left.copied().unwrap_or(rest[0]), right.copied().unwrap_or(rest[1])]
            }
            _ => rest,
        }
    }

    fn unmap(&self, p: Point) -> (f64, f64) {
        let c = self.frame.center();
        ((p.x - c.x) / self.frame.scale(), (c.y - p.y) / self.frame.scale())
    }
}

fn step_toward(from: Point, to: Point, max_step: f64) -> Point {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let dist = (dx * dx + dy * dy).sqrt();
    if dist <= max_step {
        to
    } else {
        Point { x: from.x + dx / dist * max_step, y: from.y + dy / dist * max_step }
    }
}

impl SkeletonFeed for SimFeed {
    fn latest(&mut self) -> Result<Vec<Skeleton>, SkeletonError> {
        let goals = self.goals();
        let reach = self.frame.scale() * REACH_RATIO;
        for (hand, goal) in self.hands.iter_mut().zip(goals) {
            *hand = step_toward(*hand, goal, reach);
        }

        let mut s = Skeleton::tracked(BODY.iter().map(|&(k, x, y)| Joint::tracked(k, x, y)));
        let arms = [
            (JointType::ShoulderLeft, JointType::ElbowLeft, JointType::WristLeft, JointType::HandLeft),
            (JointType::ShoulderRight, JointType::ElbowRight, JointType::WristRight, JointType::HandRight),
        ];
        for (i, (shoulder, elbow, wrist, hand)) in arms.into_iter().enumerate() {
            let jitter = Point {
                x: self.hands[i].x + self.rng.random_range(-JITTER_PX..JITTER_PX),
                y: self.hands[i].y + self.rng.random_range(-JITTER_PX..JITTER_PX),
            };
            let (hx, hy) = self.unmap(jitter);
            let (sx, sy) = BODY.iter().find(|b| b.0 == shoulder).map_or((0.0, 0.0), |b| (b.1, b.2));
            s.set_joint(Joint::tracked(elbow, sx + (hx - sx) * 0.5, sy + (hy - sy) * 0.5));
            s.set_joint(Joint::tracked(wrist, sx + (hx - sx) * 0.9, sy + (hy - sy) * 0.9));
            s.set_joint(Joint::tracked(hand, hx, hy));
        }
        Ok(vec![s])
    }
}

/* ------------------------------ field ------------------------------ */

#[derive(Debug, Clone, Copy)]
struct Shape {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
}

/// Minimal falling-object field: shapes drift down under gravity, pop on hand
/// contact, bounce off limbs and disappear below the bottom edge.
pub struct SimField {
    shapes: Vec<Shape>,
    max_shapes: usize,
    intra_frames: u32,
    gravity: f64,
    drop_rate: f64,
    size: f64,
    polies: PolyKinds,
    mode: GameMode,
    framerate: f64,
    bounds: Rect,
    board: TargetBoard,
    rng: StdRng,
}

impl SimField {
    pub fn new(max_shapes: u32, intra_frames: u32, board: TargetBoard, seed: u64) -> Self {
        Self {
            shapes: Vec::new(),
            max_shapes: max_shapes as usize,
            intra_frames: intra_frames.max(1),
            gravity: 0.0,
            drop_rate: 0.0,
            size: 1.0,
            polies: PolyKinds::All,
            mode: GameMode::Off,
            framerate: 1.0,
            bounds: Rect::default(),
            board,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn publish(&self) {
        let mut board = self.board.lock().unwrap_or_else(|p| p.into_inner());
        board.clear();
        board.extend(self.shapes.iter().map(|s| Point { x: s.x, y: s.y }));
    }
}

impl FallingThings for SimField {
    fn add_new_thing(&mut self, x: f64, y: f64) {
        if self.shapes.len() >= self.max_shapes {
            debug!("Shape cap {} reached, dropping spawn at ({}, {}).", self.max_shapes, x, y);
            return;
        }
        let vx = self.rng.random_range(-0.5..0.5);
        self.shapes.push(Shape { x, y, vx, vy: 0.0 });
        self.publish();
    }

    fn things_num(&self) -> usize {
        self.shapes.len()
    }

    fn advance_frame(&mut self) {
        let steps = f64::from(self.intra_frames);
        let dv = self.gravity / (self.framerate.max(1.0) * steps);
        let r = self.size / 2.0;
        let (left, right, bottom) = (self.bounds.left(), self.bounds.right(), self.bounds.bottom());
        for s in &mut self.shapes {
            s.vy += dv;
            s.x += s.vx / steps;
            s.y += s.vy / steps;
            if s.x - r < left || s.x + r > right {
                s.vx = -s.vx;
            }
        }
        self.shapes.retain(|s| s.y - r <= bottom);
        self.publish();
    }

    fn look_for_hits(&mut self, segments: &[Segment], player_id: usize) -> HitFlags {
        let r = self.size / 2.0;
        let mut flags = HitFlags::NONE;
        let before = self.shapes.len();
        self.shapes.retain_mut(|s| {
            let touching = |seg: &&Segment| seg.distance_sq(s.x, s.y) <= (seg.radius + r) * (seg.radius + r);
            let hands = segments.iter().filter(|seg| seg.is_circle()).filter(touching).count();
            if hands >= 2 {
                flags = flags | HitFlags::SQUEEZED | HitFlags::POPPED;
                return false;
            }
            if hands == 1 {
                flags = flags | HitFlags::HAND | HitFlags::POPPED;
                return false;
            }
            if segments.iter().filter(|seg| !seg.is_circle()).any(|seg| touching(&seg)) {
                flags = flags | HitFlags::ARM;
                s.vy = -s.vy.abs();
            }
            true
        });
        if self.shapes.len() != before {
            debug!("Player {} popped {} shapes.", player_id, before - self.shapes.len());
            self.publish();
        }
        flags
    }

    fn draw_frame(&self, surface: &mut dyn Surface) {
        for s in &self.shapes {
            surface.draw_circle(s.x, s.y, self.size / 2.0);
        }
    }

    fn set_gravity(&mut self, gravity: f64) {
        self.gravity = gravity;
    }

    fn set_drop_rate(&mut self, rate: f64) {
        self.drop_rate = rate;
    }

    fn set_size(&mut self, size: f64) {
        self.size = size;
    }

    fn set_polies(&mut self, polies: PolyKinds) {
        self.polies = polies;
    }

    fn set_game_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        debug!(
            "Field mode {:?} (drop rate {}, size {}, {:?} shapes).",
            self.mode, self.drop_rate, self.size, self.polies
        );
    }

    fn set_framerate(&mut self, fps: f64) {
        self.framerate = fps;
    }

    fn set_boundaries(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }
}
