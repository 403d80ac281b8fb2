use crate::core::skeleton::{JointType, Skeleton};
use crate::core::space::PlayerFrame;
use crate::game::things::{FallingThings, GameMode, Segment};
use log::info;
use std::collections::BTreeMap;

/* ----------------------------- body layout ----------------------------- */

// Joints tested as circles, in hit-test order.
const HIT_JOINTS: [JointType; 5] =
    [JointType::Head, JointType::HandLeft, JointType::HandRight, JointType::FootLeft, JointType::FootRight];

const BONES: [(JointType, JointType); 19] = [
    // arms
    (JointType::HandRight, JointType::WristRight),
    (JointType::WristRight, JointType::ElbowRight),
    (JointType::ElbowRight, JointType::ShoulderRight),
    (JointType::HandLeft, JointType::WristLeft),
    (JointType::WristLeft, JointType::ElbowLeft),
    (JointType::ElbowLeft, JointType::ShoulderLeft),
    // head and shoulders
    (JointType::ShoulderCenter, JointType::Head),
    (JointType::ShoulderLeft, JointType::ShoulderCenter),
    (JointType::ShoulderCenter, JointType::ShoulderRight),
    // legs
    (JointType::HipLeft, JointType::KneeLeft),
    (JointType::KneeLeft, JointType::AnkleLeft),
    (JointType::AnkleLeft, JointType::FootLeft),
    (JointType::HipRight, JointType::KneeRight),
    (JointType::KneeRight, JointType::AnkleRight),
    (JointType::AnkleRight, JointType::FootRight),
    (JointType::HipLeft, JointType::HipCenter),
    (JointType::HipCenter, JointType::HipRight),
    // spine
    (JointType::HipCenter, JointType::ShoulderCenter),
    (JointType::Spine, JointType::HipCenter),
];

const JOINT_RADIUS_RATIO: f64 = 0.07;
const BONE_RADIUS_RATIO: f64 = 0.025;

/* ------------------------------- player ------------------------------- */

#[derive(Debug, Clone)]
pub struct Player {
    id: usize,
    alive: bool,
    segments: Vec<Segment>,
}

impl Player {
    fn new(id: usize) -> Self {
        Self { id, alive: false, segments: Vec::with_capacity(HIT_JOINTS.len() + BONES.len()) }
    }

    #[inline(always)] pub fn id(&self) -> usize { self.id }
    #[inline(always)] pub fn is_alive(&self) -> bool { self.alive }
    pub fn segments(&self) -> &[Segment] { &self.segments }

    fn rebuild(&mut self, skeleton: &Skeleton, frame: &PlayerFrame) {
        self.segments.clear();
        let joint_r = frame.scale() * JOINT_RADIUS_RATIO;
        let bone_r = frame.scale() * BONE_RADIUS_RATIO;

        for kind in HIT_JOINTS {
            if let Some(j) = skeleton.joint(kind).filter(|j| j.is_tracked()) {
                let p = frame.map_joint(j);
                self.segments.push(Segment::circle(p.x, p.y, joint_r));
            }
        }
        for (a, b) in BONES {
            let (Some(ja), Some(jb)) = (skeleton.joint(a), skeleton.joint(b)) else { continue };
            if !ja.is_tracked() || !jb.is_tracked() {
                continue;
            }
            let (pa, pb) = (frame.map_joint(ja), frame.map_joint(jb));
            self.segments.push(Segment { x1: pa.x, y1: pa.y, x2: pb.x, y2: pb.y, radius: bone_r });
        }
    }
}

/* ------------------------------- roster ------------------------------- */

/// Players keyed by the sensor slot their skeleton arrived in.
#[derive(Debug, Default)]
pub struct Roster {
    players: BTreeMap<usize, Player>,
    alive_count: usize,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks everyone absent, then revives and re-poses each tracked slot.
    pub fn update(&mut self, skeletons: &[Skeleton], frame: &PlayerFrame) {
        for p in self.players.values_mut() {
            p.alive = false;
        }
        for (slot, skeleton) in skeletons.iter().enumerate() {
            if !skeleton.is_tracked() || skeleton.validate().is_err() {
                continue;
            }
            let player = self.players.entry(slot).or_insert_with(|| Player::new(slot));
            if !skeleton.joints().is_empty() {
                player.alive = true;
                player.rebuild(skeleton, frame);
            }
        }
    }

    /// Drops players that left and re-tunes the game mode when the headcount changes.
    pub fn check_players(&mut self, things: &mut dyn FallingThings) -> usize {
        self.players.retain(|_, p| p.alive);
        let alive = self.players.len();
        if alive != self.alive_count {
            let mode = GameMode::for_players(alive);
            info!("Players in view: {} -> {} ({:?}).", self.alive_count, alive, mode);
            things.set_game_mode(mode);
            self.alive_count = alive;
        }
        alive
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }
}
