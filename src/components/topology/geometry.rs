//! Angle and rotation helpers shared by the link path calculator and the
//! spatial queries.
//!
//! All angles are in degrees and follow the screen convention: y grows
//! downward, so a positive rotation turns counter-clockwise on screen.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// A point in either device or graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Offset by `(dx, dy)`.
	pub const fn offset(self, dx: f64, dy: f64) -> Self {
		Self {
			x: self.x + dx,
			y: self.y + dy,
		}
	}
}

impl From<(f64, f64)> for Point {
	fn from((x, y): (f64, f64)) -> Self {
		Self { x, y }
	}
}

/// Angle of the vector `a -> b` in degrees, in (-180, 180].
pub fn rotation_angle(a: Point, b: Point) -> f64 {
	(b.y - a.y).atan2(b.x - a.x) * 180.0 / PI
}

/// Rotate `point` about `pivot` by `angle` degrees.
///
/// With y pointing down the rotation is counter-clockwise on screen for
/// positive angles. `rotate_point(c, c + (0, r), 90 - rotation_angle(c, t))` lands on
/// the segment `c -> t` at distance `r`, which is how link endpoints are
/// pulled onto node boundaries.
pub fn rotate_point(pivot: Point, point: Point, angle: f64) -> Point {
	let radians = angle * PI / 180.0;
	let (sin, cos) = radians.sin_cos();
	let (dx, dy) = (point.x - pivot.x, point.y - pivot.y);
	Point {
		x: cos * dx + sin * dy + pivot.x,
		y: cos * dy - sin * dx + pivot.y,
	}
}

/// Euclidean distance.
pub fn distance(a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	(dx * dx + dy * dy).sqrt()
}
