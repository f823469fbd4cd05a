//! Pan and zoom transform between device (pointer) space and graph space.
//!
//! A device point `d` and a graph point `g` are related by
//! `d = g * k + (x, y)`, where `(x, y)` is the pan offset and `k` the zoom
//! factor.

use serde::{Deserialize, Serialize};

use super::geometry::Point;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
	/// Horizontal pan offset in device pixels.
	pub x: f64,
	/// Vertical pan offset in device pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ViewportState {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewportState {
	pub const fn new(x: f64, y: f64, k: f64) -> Self {
		Self { x, y, k }
	}

	pub fn to_graph_space(&self, device: Point) -> Point {
		Point::new((device.x - self.x) / self.k, (device.y - self.y) / self.k)
	}

	pub fn to_device_space(&self, graph: Point) -> Point {
		Point::new(graph.x * self.k + self.x, graph.y * self.k + self.y)
	}

	/// Map a drag rectangle into graph space.
	///
	/// The start corner goes through the inverse transform; the end corner is
	/// the start plus the device delta divided by the zoom factor. Corner order
	/// is preserved, callers normalize if they need min/max.
	pub fn to_box_in_graph_space(&self, start: Point, end: Point) -> (Point, Point) {
		let graph_start = self.to_graph_space(start);
		let graph_end = graph_start.offset((end.x - start.x) / self.k, (end.y - start.y) / self.k);
		(graph_start, graph_end)
	}

	/// SVG/CSS transform attribute for the graph layer.
	pub fn to_css(&self) -> String {
		format!("translate({}, {}) scale({})", self.x, self.y, self.k)
	}

	/// The transform that centers `target` in a `width` x `height` container
	/// at zoom 1.
	pub fn centered_on(target: Point, width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0 - target.x,
			y: height / 2.0 - target.y,
			k: 1.0,
		}
	}
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PanState {
	pub start: Point,
	pub transform_start: Point,
}

impl PanState {
	pub fn begin(at: Point, current: &ViewportState) -> Self {
		Self {
			start: at,
			transform_start: Point::new(current.x, current.y),
		}
	}

	/// The transform after the pointer moved to `at`. Panning follows the
	/// pointer 1:1 in device space.
	pub fn follow(&self, at: Point, current: &ViewportState) -> ViewportState {
		ViewportState {
			x: self.transform_start.x + (at.x - self.start.x),
			y: self.transform_start.y + (at.y - self.start.y),
			k: current.k,
		}
	}
}

/// Smallest zoom bound accepted. Keeps the inverse transform finite.
pub const MIN_SCALE: f64 = 0.01;

/// Owns the current transform and its zoom bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	state: ViewportState,
	min_k: f64,
	max_k: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(0.4, 3.0)
	}
}

impl Viewport {
	pub fn new(min_k: f64, max_k: f64) -> Self {
		let (min_k, max_k) = scale_bounds(min_k, max_k);
		Self {
			state: ViewportState::default(),
			min_k,
			max_k,
		}
	}

	pub fn state(&self) -> ViewportState {
		self.state
	}

	pub fn scale_extent(&self) -> (f64, f64) {
		(self.min_k, self.max_k)
	}

	/// Change the zoom bounds, re-clamping the current scale.
	pub fn set_scale_extent(&mut self, min_k: f64, max_k: f64) {
		let (min_k, max_k) = scale_bounds(min_k, max_k);
		self.min_k = min_k;
		self.max_k = max_k;
		self.state.k = self.state.k.clamp(min_k, max_k);
	}

	/// Apply a transform event from a pan/zoom gesture.
	///
	/// Returns the stored transform, or `None` without touching state when the
	/// current interaction mode has pan/zoom disabled.
	pub fn on_gesture(&mut self, event: ViewportState, enabled: bool) -> Option<ViewportState> {
		if !enabled {
			return None;
		}
		Some(self.set(event))
	}

	/// Store a transform unconditionally, clamping the scale.
	pub fn set(&mut self, state: ViewportState) -> ViewportState {
		self.state = ViewportState {
			k: state.k.clamp(self.min_k, self.max_k),
			..state
		};
		self.state
	}

	/// The transform that zooms by `factor` while keeping the device point
	/// `at` over the same graph point.
	pub fn zoom_at(&self, at: Point, factor: f64) -> ViewportState {
		let current = self.state;
		let new_k = (current.k * factor).clamp(self.min_k, self.max_k);
		let ratio = new_k / current.k;
		ViewportState {
			x: at.x - (at.x - current.x) * ratio,
			y: at.y - (at.y - current.y) * ratio,
			k: new_k,
		}
	}

	/// Zoom step for a wheel event: out for positive `delta_y`, in otherwise.
	pub fn wheel_factor(delta_y: f64) -> f64 {
		if delta_y > 0.0 { 0.9 } else { 1.1 }
	}

	pub fn to_graph_space(&self, device: Point) -> Point {
		self.state.to_graph_space(device)
	}

	pub fn to_device_space(&self, graph: Point) -> Point {
		self.state.to_device_space(graph)
	}

	pub fn to_box_in_graph_space(&self, start: Point, end: Point) -> (Point, Point) {
		self.state.to_box_in_graph_space(start, end)
	}
}

/// Floor both bounds at [`MIN_SCALE`] and keep them ordered.
fn scale_bounds(min_k: f64, max_k: f64) -> (f64, f64) {
	let min_k = min_k.max(MIN_SCALE);
	(min_k, max_k.max(min_k))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn close(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
	}

	#[test]
	fn graph_and_device_space_round_trip() {
		let state = ViewportState::new(120.0, -45.0, 1.7);
		for p in [Point::new(0.0, 0.0), Point::new(-33.3, 12.5), Point::new(900.0, 4.0)] {
			assert!(close(state.to_graph_space(state.to_device_space(p)), p));
		}
	}

	#[test]
	fn device_delta_maps_to_delta_over_scale() {
		let state = ViewportState::new(10.0, 20.0, 2.0);
		let a = state.to_graph_space(Point::new(50.0, 50.0));
		let b = state.to_graph_space(Point::new(70.0, 30.0));
		assert!(close(Point::new(b.x - a.x, b.y - a.y), Point::new(10.0, -10.0)));
	}

	#[test]
	fn box_mapping_tracks_start_and_delta() {
		let state = ViewportState::new(100.0, 100.0, 2.0);
		let (start, end) = state.to_box_in_graph_space(Point::new(100.0, 100.0), Point::new(300.0, 0.0));
		assert!(close(start, Point::new(0.0, 0.0)));
		assert!(close(end, Point::new(100.0, -50.0)));
	}

	#[test]
	fn gestures_are_ignored_while_disabled() {
		let mut viewport = Viewport::default();
		let moved = ViewportState::new(5.0, 5.0, 1.0);
		assert_eq!(viewport.on_gesture(moved, false), None);
		assert_eq!(viewport.state(), ViewportState::default());
		assert_eq!(viewport.on_gesture(moved, true), Some(moved));
	}

	#[test]
	fn scale_is_clamped_to_extent() {
		let mut viewport = Viewport::default();
		assert_eq!(viewport.set(ViewportState::new(0.0, 0.0, 10.0)).k, 3.0);
		assert_eq!(viewport.set(ViewportState::new(0.0, 0.0, 0.01)).k, 0.4);
	}

	#[test]
	fn degenerate_extent_keeps_graph_space_finite() {
		let mut viewport = Viewport::new(0.0, 3.0);
		assert_eq!(viewport.scale_extent(), (MIN_SCALE, 3.0));
		viewport.set(ViewportState::new(0.0, 0.0, 0.0));
		let graph = viewport.to_graph_space(Point::new(10.0, 10.0));
		assert!(graph.x.is_finite() && graph.y.is_finite());

		viewport.set_scale_extent(-1.0, f64::NAN);
		assert_eq!(viewport.scale_extent(), (MIN_SCALE, MIN_SCALE));
	}

	#[test]
	fn zoom_keeps_the_cursor_point_fixed() {
		let mut viewport = Viewport::default();
		viewport.set(ViewportState::new(30.0, 40.0, 1.0));
		let cursor = Point::new(200.0, 150.0);
		let before = viewport.to_graph_space(cursor);
		let zoomed = viewport.zoom_at(cursor, Viewport::wheel_factor(-1.0));
		viewport.set(zoomed);
		assert!((viewport.state().k - 1.1).abs() < 1e-12);
		assert!(close(viewport.to_graph_space(cursor), before));
	}

	#[test]
	fn pan_follows_pointer() {
		let current = ViewportState::new(10.0, 10.0, 2.0);
		let pan = PanState::begin(Point::new(100.0, 100.0), &current);
		let next = pan.follow(Point::new(130.0, 90.0), &current);
		assert_eq!(next, ViewportState::new(40.0, 0.0, 2.0));
	}

	#[test]
	fn centering_transform() {
		let t = ViewportState::centered_on(Point::new(50.0, 20.0), 800.0, 600.0);
		assert_eq!(t, ViewportState::new(350.0, 280.0, 1.0));
		assert_eq!(t.to_css(), "translate(350, 280) scale(1)");
	}
}
