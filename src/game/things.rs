use crate::core::space::Rect;

/// How many bodies the falling-object field is reacting to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    #[default]
    Off,
    Solo,
    TwoPlayer,
}

impl GameMode {
    pub fn for_players(alive: usize) -> Self {
        match alive {
            0 => GameMode::Off,
            1 => GameMode::Solo,
            _ => GameMode::TwoPlayer,
        }
    }
}

/// Which shape families may spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolyKinds {
    #[default]
    All,
    Circles,
    Polygons,
    Stars,
}

/// Bit flags returned by a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HitFlags(u8);

impl HitFlags {
    pub const NONE: HitFlags = HitFlags(0);
    pub const HAND: HitFlags = HitFlags(1 << 0);
    pub const ARM: HitFlags = HitFlags(1 << 1);
    pub const SQUEEZED: HitFlags = HitFlags(1 << 2);
    pub const POPPED: HitFlags = HitFlags(1 << 3);

    #[inline(always)]
    pub const fn contains(self, other: HitFlags) -> bool {
        self.0 & other.0 != 0
    }

    #[inline(always)]
    pub const fn union(self, other: HitFlags) -> HitFlags {
        HitFlags(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for HitFlags {
    type Output = HitFlags;
    fn bitor(self, rhs: HitFlags) -> HitFlags {
        self.union(rhs)
    }
}

/// A screen-space capsule used for hit testing; equal endpoints make it a circle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub radius: f64,
}

impl Segment {
    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Self { x1: x, y1: y, x2: x, y2: y, radius }
    }

    pub fn is_circle(&self) -> bool {
        self.x1 == self.x2 && self.y1 == self.y2
    }

    /// Squared distance from a point to the segment's axis.
    pub fn distance_sq(&self, px: f64, py: f64) -> f64 {
        let (dx, dy) = (self.x2 - self.x1, self.y2 - self.y1);
        let len_sq = dx * dx + dy * dy;
        let t = if len_sq <= f64::EPSILON {
            0.0
        } else {
            (((px - self.x1) * dx + (py - self.y1) * dy) / len_sq).clamp(0.0, 1.0)
        };
        let (cx, cy) = (self.x1 + t * dx, self.y1 + t * dy);
        (px - cx) * (px - cx) + (py - cy) * (py - cy)
    }
}

/// Drawing target owned by the presentation side.
pub trait Surface {
    fn clear(&mut self);
    fn draw_circle(&mut self, x: f64, y: f64, radius: f64);
    fn draw_segment(&mut self, segment: &Segment);
    fn draw_backdrop(&mut self, backdrop: crate::game::scene::Backdrop);

    /// Current drawable size, for targets that can be resized.
    fn size(&self) -> Option<(f64, f64)> {
        None
    }
}

/// The falling-shape simulation the game feeds and polls.
pub trait FallingThings: Send {
    fn add_new_thing(&mut self, x: f64, y: f64);
    fn things_num(&self) -> usize;
    fn advance_frame(&mut self);
    fn look_for_hits(&mut self, segments: &[Segment], player_id: usize) -> HitFlags;
    fn draw_frame(&self, surface: &mut dyn Surface);

    fn set_gravity(&mut self, gravity: f64);
    fn set_drop_rate(&mut self, rate: f64);
    fn set_size(&mut self, size: f64);
    fn set_polies(&mut self, polies: PolyKinds);
    fn set_game_mode(&mut self, mode: GameMode);
    fn set_framerate(&mut self, fps: f64);
    fn set_boundaries(&mut self, bounds: Rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_follows_player_count() {
        assert_eq!(GameMode::for_players(0), GameMode::Off);
        assert_eq!(GameMode::for_players(1), GameMode::Solo);
        assert_eq!(GameMode::for_players(2), GameMode::TwoPlayer);
        assert_eq!(GameMode::for_players(5), GameMode::TwoPlayer);
    }

    #[test]
    fn flags_combine() {
        let f = HitFlags::HAND | HitFlags::POPPED;
        assert!(f.contains(HitFlags::POPPED));
        assert!(!f.contains(HitFlags::SQUEEZED));
        assert!(HitFlags::NONE.is_empty());
    }

    #[test]
    fn segment_distance() {
        let s = Segment { x1: 0.0, y1: 0.0, x2: 10.0, y2: 0.0, radius: 1.0 };
        assert_eq!(s.distance_sq(5.0, 3.0), 9.0);
        assert_eq!(s.distance_sq(-4.0, 3.0), 25.0);
        assert!(Segment::circle(1.0, 1.0, 2.0).is_circle());
        assert_eq!(Segment::circle(0.0, 0.0, 1.0).distance_sq(3.0, 4.0), 25.0);
    }
}
