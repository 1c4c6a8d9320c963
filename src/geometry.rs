//! Pure geometry: where the turtle ends up, and which steps make up a shape.
//!
//! Headings are whole degrees in `[0, 360)`, 0 pointing east and growing
//! counter-clockwise. The y axis points down as on screen, so moving north
//! decreases y.

/// A position on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Position plus heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point,
    pub heading: i32,
}

/// Size of the drawing surface. Valid positions are `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasBounds {
    pub width: u32,
    pub height: u32,
}

impl CanvasBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, point: Point) -> bool {
        (0.0..=f64::from(self.width)).contains(&point.x)
            && (0.0..=f64::from(self.height)).contains(&point.y)
    }

    pub fn center(&self) -> Point {
        Point::new(f64::from(self.width / 2), f64::from(self.height / 2))
    }
}

/// One element of a drawing plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// Move along the current heading. Never negative.
    Forward(f64),
    Turn { degrees: i32, clockwise: bool },
}

impl Step {
    pub fn right(degrees: i32) -> Self {
        Step::Turn {
            degrees,
            clockwise: true,
        }
    }

    pub fn left(degrees: i32) -> Self {
        Step::Turn {
            degrees,
            clockwise: false,
        }
    }
}

/// Position reached after moving `distance` along `heading`.
pub fn advance(position: Point, heading: i32, distance: f64) -> Point {
    let (sin, cos) = f64::from(heading).to_radians().sin_cos();
    Point::new(position.x + distance * cos, position.y - distance * sin)
}

/// Heading after turning by `delta` degrees. Clockwise adds, counter-clockwise subtracts.
pub fn turn(heading: i32, delta: i32, clockwise: bool) -> i32 {
    let delta = delta.rem_euclid(360);
    let delta = if clockwise { delta } else { -delta };
    (heading.rem_euclid(360) + delta).rem_euclid(360)
}

/// Strict triangle inequality for all three permutations.
pub fn is_triangle(a: f64, b: f64, c: f64) -> bool {
    a + b > c && a + c > b && b + c > a
}

/// Angle opposite `c`, in degrees, of the triangle with sides `a`, `b`, `c`.
///
/// Returns `None` when no such triangle exists.
pub fn law_of_cosines_angle(a: f64, b: f64, c: f64) -> Option<f64> {
    if !is_triangle(a, b, c) {
        return None;
    }
    let cos = (a * a + b * b - c * c) / (2.0 * a * b);
    Some(cos.clamp(-1.0, 1.0).acos().to_degrees())
}

/// Length of leg `turn_index` (0-based) of a square spiral.
pub fn spiral_length(initial: i64, turn_index: i64) -> i64 {
    initial.saturating_mul(turn_index + 1)
}

pub fn square(length: f64) -> Vec<Step> {
    (0..4)
        .flat_map(|_| [Step::Forward(length), Step::right(90)])
        .collect()
}

pub fn equilateral_triangle(size: f64) -> Vec<Step> {
    (0..3)
        .flat_map(|_| [Step::Forward(size), Step::right(120)])
        .collect()
}

/// Triangle drawn from its three side lengths, `a` first.
///
/// The turtle walks `a`, turns right by the exterior angle at the far end of
/// `a`, walks `b`, turns again, and walks `c`. Turns are rounded to whole degrees.
pub fn custom_triangle(a: f64, b: f64, c: f64) -> Option<Vec<Step>> {
    let opposite_c = law_of_cosines_angle(a, b, c)?;
    let opposite_a = law_of_cosines_angle(b, c, a)?;
    Some(vec![
        Step::Forward(a),
        Step::right(exterior(opposite_c)),
        Step::Forward(b),
        Step::right(exterior(opposite_a)),
        Step::Forward(c),
    ])
}

fn exterior(interior: f64) -> i32 {
    (180.0 - interior).round() as i32
}

/// `turns` legs, each `initial` longer than the previous one, each followed by a right turn.
pub fn square_spiral(turns: i64, initial: i64) -> Vec<Step> {
    (0..turns)
        .flat_map(|i| {
            [
                Step::Forward(spiral_length(initial, i) as f64),
                Step::right(90),
            ]
        })
        .collect()
}

/// Simulate `steps` from `start`.
///
/// Returns the pose after each step, or the first position that falls outside `bounds`.
pub fn trace(start: Pose, steps: &[Step], bounds: CanvasBounds) -> Result<Vec<Pose>, Point> {
    let mut pose = start;
    let mut poses = Vec::with_capacity(steps.len());
    for step in steps {
        match *step {
            Step::Forward(distance) => {
                let position = advance(pose.position, pose.heading, distance);
                if !bounds.contains(position) {
                    return Err(position);
                }
                pose.position = position;
            }
            Step::Turn { degrees, clockwise } => {
                pose.heading = turn(pose.heading, degrees, clockwise);
            }
        }
        poses.push(pose);
    }
    Ok(poses)
}
