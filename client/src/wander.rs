//! Scripted movement standing in for keyboard input

pub const VIEWPORT_WIDTH: f64 = 800.0;
pub const VIEWPORT_HEIGHT: f64 = 600.0;
/// Distance kept from the viewport edge, matching the avatar radius.
pub const EDGE_MARGIN: f64 = 10.0;

/// Walks the local avatar around a circle, one step per tick.
#[derive(Debug, Clone)]
pub struct Wanderer {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    heading: f64,
    turn_rate: f64,
    width: f64,
    height: f64,
}

impl Wanderer {
    pub fn new(x: f64, y: f64, speed: f64, turn_rate: f64) -> Self {
        Self {
            x,
            y,
            speed,
            heading: 0.0,
            turn_rate,
            width: VIEWPORT_WIDTH,
            height: VIEWPORT_HEIGHT,
        }
    }

    /// Sets the area to stay inside. Dimensions smaller than twice the edge
    /// margin are widened so the clamp range is never empty.
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.width = width.max(2.0 * EDGE_MARGIN);
        self.height = height.max(2.0 * EDGE_MARGIN);
        self
    }

    /// Advances one step and returns the new position if it changed.
    pub fn step(&mut self) -> Option<(f64, f64)> {
        let (old_x, old_y) = (self.x, self.y);

        self.x += self.heading.cos() * self.speed;
        self.y += self.heading.sin() * self.speed;
        self.heading += self.turn_rate;

        self.x = self.x.clamp(EDGE_MARGIN, self.width - EDGE_MARGIN);
        self.y = self.y.clamp(EDGE_MARGIN, self.height - EDGE_MARGIN);

        if self.x != old_x || self.y != old_y {
            Some((self.x, self.y))
        } else {
            None
        }
    }
}
