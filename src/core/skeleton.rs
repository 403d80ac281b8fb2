use std::error::Error;
use std::fmt;

// -----------------------------------------------------------------------------
// Joints
// -----------------------------------------------------------------------------

/// The twenty landmarks a skeletal sensor reports per tracked body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum JointType {
    HipCenter = 0,
    Spine,
    ShoulderCenter,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
}

impl JointType {
    pub const COUNT: usize = 20;

    pub const ALL: [JointType; Self::COUNT] = [
        JointType::HipCenter, JointType::Spine, JointType::ShoulderCenter, JointType::Head,
        JointType::ShoulderLeft, JointType::ElbowLeft, JointType::WristLeft, JointType::HandLeft,
        JointType::ShoulderRight, JointType::ElbowRight, JointType::WristRight, JointType::HandRight,
        JointType::HipLeft, JointType::KneeLeft, JointType::AnkleLeft, JointType::FootLeft,
        JointType::HipRight, JointType::KneeRight, JointType::AnkleRight, JointType::FootRight,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JointTracking {
    #[default]
    NotTracked,
    Inferred,
    Tracked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SkeletonTracking {
    #[default]
    NotTracked,
    PositionOnly,
    Tracked,
}

/// A single landmark in normalized sensor space (+y is up).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Joint {
    pub kind: JointType,
    pub x: f64,
    pub y: f64,
    pub tracking: JointTracking,
}

impl Joint {
    pub fn tracked(kind: JointType, x: f64, y: f64) -> Self {
        Self { kind, x, y, tracking: JointTracking::Tracked }
    }

    #[inline(always)]
    pub fn is_tracked(&self) -> bool {
        self.tracking == JointTracking::Tracked
    }
}

// -----------------------------------------------------------------------------
// Skeletons
// -----------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Skeleton {
    pub tracking: SkeletonTracking,
    joints: Vec<Joint>,
}

impl Skeleton {
    pub fn new(tracking: SkeletonTracking) -> Self {
        Self { tracking, joints: Vec::with_capacity(JointType::COUNT) }
    }

    /// Builds a fully tracked skeleton from the given joints.
    pub fn tracked(joints: impl IntoIterator<Item = Joint>) -> Self {
        let mut s = Self::new(SkeletonTracking::Tracked);
        for j in joints {
            s.set_joint(j);
        }
        s
    }

    #[inline(always)]
    pub fn is_tracked(&self) -> bool {
        self.tracking == SkeletonTracking::Tracked
    }

    /// Inserts or replaces the joint of the same kind.
    pub fn set_joint(&mut self, joint: Joint) {
        match self.joints.iter_mut().find(|j| j.kind == joint.kind) {
            Some(slot) => *slot = joint,
            None => self.joints.push(joint),
        }
    }

    pub fn joint(&self, kind: JointType) -> Option<&Joint> {
        self.joints.iter().find(|j| j.kind == kind)
    }

    pub fn joint_mut(&mut self, kind: JointType) -> Option<&mut Joint> {
        self.joints.iter_mut().find(|j| j.kind == kind)
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Rejects frames the sensor handed over half-written.
    pub fn validate(&self) -> Result<(), SkeletonError> {
        if !self.is_tracked() {
            return Ok(());
        }
        for j in &self.joints {
            if !j.x.is_finite() || !j.y.is_finite() {
                return Err(SkeletonError::NonFinite(j.kind));
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Errors
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SkeletonError {
    NonFinite(JointType),
    Unavailable(String),
}

impl fmt::Display for SkeletonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkeletonError::NonFinite(kind) => write!(f, "joint {:?} has a non-finite position", kind),
            SkeletonError::Unavailable(why) => write!(f, "skeleton stream unavailable: {}", why),
        }
    }
}

impl Error for SkeletonError {}

// -----------------------------------------------------------------------------
// Sensor feed
// -----------------------------------------------------------------------------

/// Latest-snapshot view onto whatever produces skeleton frames.
///
/// Implementations refresh asynchronously at their own rate; the game loop only
/// ever asks for the most recent frame.
pub trait SkeletonFeed: Send {
    fn latest(&mut self) -> Result<Vec<Skeleton>, SkeletonError>;
}

/// Reads the feed, degrading a failed stream to "nobody in view".
pub fn snapshot(feed: &mut dyn SkeletonFeed) -> Vec<Skeleton> {
    match feed.latest() {
        Ok(frame) => frame,
        Err(e) => {
            log::debug!("No skeleton data this frame: {}", e);
            Vec::new()
        }
    }
}
