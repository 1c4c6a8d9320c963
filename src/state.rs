use crate::geometry::{CanvasBounds, Point, Pose};
use std::fmt;

/// Heading a fresh turtle starts with: pointing north.
pub const DEFAULT_HEADING: i32 = 90;
pub const DEFAULT_PEN_WIDTH: u32 = 1;
pub const DEFAULT_PEN_COLOR: Rgb = Rgb::RED;

/// An opaque RGB pen colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Everything the turtle knows about itself.
///
/// A session owns exactly one of these, and only the command dispatcher mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct TurtleState {
    pub position: Point,
    /// Degrees in `[0, 360)`, counter-clockwise from east.
    pub heading: i32,
    pub pen_down: bool,
    pub pen_color: Rgb,
    /// Always positive.
    pub pen_width: u32,
    /// The drawing has changes that were not saved.
    pub dirty: bool,
}

impl TurtleState {
    /// Fresh turtle in the middle of a canvas of the given size.
    pub fn new(bounds: CanvasBounds) -> Self {
        Self {
            position: bounds.center(),
            heading: DEFAULT_HEADING,
            pen_down: false,
            pen_color: DEFAULT_PEN_COLOR,
            pen_width: DEFAULT_PEN_WIDTH,
            dirty: false,
        }
    }

    /// Restore every field to its default.
    pub fn reset(&mut self, bounds: CanvasBounds) {
        *self = Self::new(bounds);
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            heading: self.heading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_has_documented_defaults() {
        let state = TurtleState::new(CanvasBounds::new(800, 601));
        assert_eq!(state.position, Point::new(400.0, 300.0));
        assert_eq!(state.heading, 90);
        assert!(!state.pen_down);
        assert_eq!(state.pen_color, Rgb::new(255, 0, 0));
        assert_eq!(state.pen_width, 1);
        assert!(!state.dirty);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let bounds = CanvasBounds::new(200, 100);
        let mut state = TurtleState {
            position: Point::new(3.5, 7.25),
            heading: 271,
            pen_down: true,
            pen_color: Rgb::YELLOW,
            pen_width: 9,
            dirty: true,
        };
        state.reset(bounds);
        let once = state.clone();
        state.reset(bounds);
        assert_eq!(state, once);
        assert_eq!(state, TurtleState::new(bounds));
    }

    #[test]
    fn test_rgb_display() {
        assert_eq!(Rgb::YELLOW.to_string(), "#ffff00");
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "#010203");
    }
}
