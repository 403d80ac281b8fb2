use crate::core::skeleton::Joint;

// -----------------------------------------------------------------------------
// Screen-space rectangles (pixels, origin top-left, +y down)
// -----------------------------------------------------------------------------
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline(always)]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[inline(always)] pub fn left(&self)   -> f64 { self.x }
    #[inline(always)] pub fn top(&self)    -> f64 { self.y }
    #[inline(always)] pub fn right(&self)  -> f64 { self.x + self.width }
    #[inline(always)] pub fn bottom(&self) -> f64 { self.y + self.height }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

// -----------------------------------------------------------------------------
// PlayerFrame: where a tracked body lands on screen
// -----------------------------------------------------------------------------
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerFrame {
    bounds: Rect,
    center: Point,
    scale: f64,
}

impl PlayerFrame {
    pub fn new(bounds: Rect) -> Self {
        let center = Point {
            x: (bounds.left() + bounds.right()) / 2.0,
            y: (bounds.top() + bounds.bottom()) / 2.0,
        };
        // A body is about twice as tall as its arm span is wide.
        let scale = bounds.width.min(bounds.height / 2.0);
        Self { bounds, center, scale }
    }

    #[inline(always)] pub fn bounds(&self) -> Rect  { self.bounds }
    #[inline(always)] pub fn center(&self) -> Point { self.center }
    #[inline(always)] pub fn scale(&self)  -> f64   { self.scale }

    /// Normalized sensor coordinates to screen pixels. Sensor +y is up, screen +y is down.
    #[inline(always)]
    pub fn map(&self, jx: f64, jy: f64) -> Point {
        Point {
            x: jx * self.scale + self.center.x,
            y: self.center.y - jy * self.scale,
        }
    }

    #[inline(always)]
    pub fn map_joint(&self, joint: &Joint) -> Point {
        self.map(joint.x, joint.y)
    }
}

// -----------------------------------------------------------------------------
// Playfield: derives the player frame and the falling-object bounds from the
// drawable area. Players sit low on screen, objects use the full height.
// -----------------------------------------------------------------------------
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playfield {
    pub screen: Rect,
    pub player_bounds: Rect,
    pub falling_bounds: Rect,
}

const PLAYER_TOP_RATIO: f64 = 0.2;
const PLAYER_HEIGHT_RATIO: f64 = 0.75;

impl Playfield {
    pub fn new(width: f64, height: f64) -> Self {
        let mut p = Self { screen: Rect::default(), player_bounds: Rect::default(), falling_bounds: Rect::default() };
        p.resize(width, height);
        p
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        let width = width.max(0.0);
        let height = height.max(0.0);
        self.screen = Rect::new(0.0, 0.0, width, height);
        self.player_bounds = Rect::new(0.0, height * PLAYER_TOP_RATIO, width, height * PLAYER_HEIGHT_RATIO);
        self.falling_bounds = Rect::new(self.player_bounds.x, 0.0, self.player_bounds.width, height);
    }

    #[inline(always)]
    pub fn player_frame(&self) -> PlayerFrame {
        PlayerFrame::new(self.player_bounds)
    }
}
