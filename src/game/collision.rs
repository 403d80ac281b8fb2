use crate::core::skeleton::{Joint, Skeleton};
use crate::core::space::PlayerFrame;
use serde::{Deserialize, Serialize};

/* ----------------------------- zones ----------------------------- */

/// Axis-aligned screen-space rectangle a player has to reach into.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationZone {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl CalibrationZone {
    pub const fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self { x_min, y_min, x_max, y_max }
    }

    /// Strict interior test; a point on an edge is outside.
    #[inline(always)]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x > self.x_min && x < self.x_max && y > self.y_min && y < self.y_max
    }
}

/* --------------------------- AABB tests -------------------------- */

/// True iff the joint is tracked and maps strictly inside the zone.
#[inline(always)]
pub fn test_zone(zone: &CalibrationZone, joint: &Joint, frame: &PlayerFrame) -> bool {
    if !joint.is_tracked() {
        return false;
    }
    let p = frame.map_joint(joint);
    zone.contains(p.x, p.y)
}

/// True iff the skeleton is tracked and any of its joints hits the zone.
pub fn test_skeleton(zone: &CalibrationZone, skeleton: &Skeleton, frame: &PlayerFrame) -> bool {
    skeleton.is_tracked() && skeleton.joints().iter().any(|j| test_zone(zone, j, frame))
}

/* ---------------------------- zone set --------------------------- */

/// Zones that must all be hit in the same evaluation to open a calibration gate.
#[derive(Debug, Default, Clone)]
pub struct CalibrationZoneSet {
    zones: Vec<CalibrationZone>,
    satisfied: bool,
}

impl CalibrationZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_zone(&mut self, x_min: f64, y_min: f64, x_max: f64, y_max: f64) {
        self.zones.push(CalibrationZone::new(x_min, y_min, x_max, y_max));
    }

    pub fn extend(&mut self, zones: &[CalibrationZone]) {
        self.zones.extend_from_slice(zones);
    }

    /// Clears every zone as well as the hit flag.
    pub fn reset(&mut self) {
        self.satisfied = false;
        self.zones.clear();
    }

    /// Fresh all-zones check against one skeleton. An empty set is vacuously satisfied.
    pub fn evaluate(&mut self, skeleton: &Skeleton, frame: &PlayerFrame) -> bool {
        self.satisfied = self.zones.iter().all(|z| test_skeleton(z, skeleton, frame));
        self.satisfied
    }

    /// Best-effort pass over one sensor snapshot. Every tracked skeleton is
    /// tested in slot order and the last one decides the flag. Unreadable
    /// skeletons count as a miss, and so does a snapshot with nobody tracked.
    pub fn evaluate_all(&mut self, skeletons: &[Skeleton], frame: &PlayerFrame) -> bool {
        self.mark_miss();
        for s in skeletons.iter().filter(|s| s.is_tracked()) {
            match s.validate() {
                Ok(()) => {
                    self.evaluate(s, frame);
                }
                Err(e) => {
                    log::debug!("Skeleton skipped in zone test: {}", e);
                    self.mark_miss();
                }
            }
        }
        self.satisfied
    }

    /// Records a miss without running the test (used when the skeleton could not be read).
    pub fn mark_miss(&mut self) {
        self.satisfied = false;
    }

    #[inline(always)]
    pub fn satisfied(&self) -> bool {
        self.satisfied
    }

    pub fn zones(&self) -> &[CalibrationZone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::skeleton::{JointTracking, JointType, SkeletonTracking};
    use crate::core::space::Rect;

    // scale 200, center (200, 200): screen = (200 + 200*jx, 200 - 200*jy)
    fn frame() -> PlayerFrame {
        PlayerFrame::new(Rect::new(0.0, 0.0, 400.0, 400.0))
    }

    fn at(kind: JointType, sx: f64, sy: f64) -> Joint {
        Joint::tracked(kind, (sx - 200.0) / 200.0, (200.0 - sy) / 200.0)
    }

    fn scenario_set() -> CalibrationZoneSet {
        let mut set = CalibrationZoneSet::new();
        set.add_zone(200.0, 250.0, 300.0, 350.0);
        set.add_zone(400.0, 250.0, 500.0, 300.0);
        set
    }

    // Wider frame so x=450 fits: scale 300, center (300, 300).
    fn wide_frame() -> PlayerFrame {
        PlayerFrame::new(Rect::new(0.0, 0.0, 600.0, 600.0))
    }

    fn wide_at(kind: JointType, sx: f64, sy: f64) -> Joint {
        Joint::tracked(kind, (sx - 300.0) / 300.0, (300.0 - sy) / 300.0)
    }

    #[test]
    fn inside_is_a_hit() {
        let z = CalibrationZone::new(100.0, 100.0, 300.0, 300.0);
        assert!(test_zone(&z, &at(JointType::HandLeft, 200.0, 150.0), &frame()));
    }

    #[test]
    fn boundary_is_not_a_hit() {
        let z = CalibrationZone::new(100.0, 100.0, 300.0, 300.0);
        let f = frame();
        assert!(!test_zone(&z, &at(JointType::HandLeft, 100.0, 150.0), &f));
        assert!(!test_zone(&z, &at(JointType::HandLeft, 300.0, 150.0), &f));
        assert!(!test_zone(&z, &at(JointType::HandLeft, 200.0, 100.0), &f));
        assert!(!test_zone(&z, &at(JointType::HandLeft, 200.0, 300.0), &f));
    }

    #[test]
    fn untracked_joint_never_hits() {
        let z = CalibrationZone::new(100.0, 100.0, 300.0, 300.0);
        let mut j = at(JointType::HandLeft, 200.0, 150.0);
        j.tracking = JointTracking::Inferred;
        assert!(!test_zone(&z, &j, &frame()));
    }

    #[test]
    fn untracked_skeleton_never_hits() {
        let z = CalibrationZone::new(100.0, 100.0, 300.0, 300.0);
        let mut s = Skeleton::tracked([at(JointType::HandLeft, 200.0, 150.0)]);
        assert!(test_skeleton(&z, &s, &frame()));
        s.tracking = SkeletonTracking::PositionOnly;
        assert!(!test_skeleton(&z, &s, &frame()));
    }

    #[test]
    fn two_hands_in_two_zones() {
        let f = wide_frame();
        let mut set = scenario_set();
        let mut s = Skeleton::tracked([
            wide_at(JointType::HandLeft, 250.0, 300.0),
            wide_at(JointType::HandRight, 450.0, 275.0),
        ]);
        assert!(set.evaluate(&s, &f));
        assert!(set.satisfied());

        if let Some(j) = s.joint_mut(JointType::HandRight) {
            j.tracking = JointTracking::NotTracked;
        }
        assert!(!set.evaluate(&s, &f));
        assert!(!set.satisfied());

        let mut s = Skeleton::tracked([
            wide_at(JointType::HandLeft, 250.0, 300.0),
            wide_at(JointType::HandRight, 450.0, 275.0),
        ]);
        if let Some(j) = s.joint_mut(JointType::HandLeft) {
            j.tracking = JointTracking::NotTracked;
        }
        assert!(!set.evaluate(&s, &f));
    }

    #[test]
    fn evaluation_is_not_sticky() {
        let f = wide_frame();
        let mut set = scenario_set();
        let only_left = Skeleton::tracked([wide_at(JointType::HandLeft, 250.0, 300.0)]);
        let only_right = Skeleton::tracked([wide_at(JointType::HandRight, 450.0, 275.0)]);
        assert!(!set.evaluate(&only_left, &f));
        assert!(!set.evaluate(&only_right, &f));
    }

    #[test]
    fn empty_set_is_vacuously_true() {
        let mut set = CalibrationZoneSet::new();
        assert!(set.evaluate(&Skeleton::tracked([]), &frame()));
    }

    #[test]
    fn reset_clears_everything() {
        let f = wide_frame();
        let mut set = scenario_set();
        let s = Skeleton::tracked([
            wide_at(JointType::HandLeft, 250.0, 300.0),
            wide_at(JointType::HandRight, 450.0, 275.0),
        ]);
        set.evaluate(&s, &f);
        set.reset();
        assert!(!set.satisfied());
        assert!(set.is_empty());
    }

    #[test]
    fn add_zone_keeps_existing() {
        let mut set = scenario_set();
        set.add_zone(0.0, 0.0, 10.0, 10.0);
        assert_eq!(set.len(), 3);
        assert_eq!(set.zones()[0], CalibrationZone::new(200.0, 250.0, 300.0, 350.0));
    }

    #[test]
    fn snapshot_pass_skips_broken_and_untracked() {
        let f = wide_frame();
        let mut set = scenario_set();
        let good = Skeleton::tracked([
            wide_at(JointType::HandLeft, 250.0, 300.0),
            wide_at(JointType::HandRight, 450.0, 275.0),
        ]);
        let broken = Skeleton::tracked([Joint::tracked(JointType::Head, f64::NAN, 0.0)]);
        let idle = Skeleton::new(SkeletonTracking::NotTracked);

        assert!(set.evaluate_all(&[idle.clone(), broken.clone(), good], &f));
        assert!(set.satisfied());
        assert!(!set.evaluate_all(&[idle, broken], &f));
        assert!(!set.satisfied());
        assert!(!set.evaluate_all(&[], &f));
    }

    #[test]
    fn last_tracked_skeleton_decides() {
        let f = wide_frame();
        let mut set = scenario_set();
        let full = Skeleton::tracked([
            wide_at(JointType::HandLeft, 250.0, 300.0),
            wide_at(JointType::HandRight, 450.0, 275.0),
        ]);
        let partial = Skeleton::tracked([wide_at(JointType::HandLeft, 250.0, 300.0)]);
        let broken = Skeleton::tracked([Joint::tracked(JointType::Head, f64::NAN, 0.0)]);

        assert!(!set.evaluate_all(&[full.clone(), partial.clone()], &f));
        assert!(!set.satisfied());
        assert!(set.evaluate_all(&[partial, full.clone()], &f));
        assert!(!set.evaluate_all(&[full, broken], &f));
    }

    #[test]
    fn empty_set_passes_any_tracked_skeleton() {
        let mut set = CalibrationZoneSet::new();
        assert!(set.evaluate_all(&[Skeleton::tracked([])], &frame()));
        assert!(!set.evaluate_all(&[Skeleton::new(SkeletonTracking::NotTracked)], &frame()));
    }
}
