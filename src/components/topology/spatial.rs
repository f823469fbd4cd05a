//! Hit-testing and box membership over the node set.
//!
//! `find_*` queries take device coordinates and go through the viewport
//! transform. [`nearest_within`] and [`nodes_in_bounds`] work directly in graph
//! space.

use std::collections::HashSet;

use super::geometry::Point;
use super::types::{Link, Node, NodeHandle};
use super::viewport::ViewportState;

/// Axis-aligned rectangle with normalized corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min: Point,
	pub max: Point,
}

impl Bounds {
	/// Build from two corners given in any order.
	pub fn from_corners(a: Point, b: Point) -> Self {
		Self {
			min: Point::new(a.x.min(b.x), a.y.min(b.y)),
			max: Point::new(a.x.max(b.x), a.y.max(b.y)),
		}
	}

	/// Whether the square of half-size `radius` around `center` touches this
	/// rectangle. Edges count as touching, so a zero-area box still selects.
	pub fn meets_square(&self, center: Point, radius: f64) -> bool {
		center.x + radius >= self.min.x
			&& center.x - radius <= self.max.x
			&& center.y + radius >= self.min.y
			&& center.y - radius <= self.max.y
	}
}

/// Nearest node strictly within `radius` of the graph-space point.
///
/// Ties go to the node that comes first in `nodes`.
pub fn nearest_within(nodes: &[Node], at: Point, radius: f64) -> Option<NodeHandle> {
	nearest_accepted(nodes, at, radius, |_| true)
}

/// Like [`nearest_within`], but only nodes passing `accept` compete, so a
/// rejected node never shadows an accepted one behind it.
pub fn nearest_accepted(
	nodes: &[Node],
	at: Point,
	radius: f64,
	accept: impl Fn(NodeHandle) -> bool,
) -> Option<NodeHandle> {
	let mut best = radius * radius;
	let mut found = None;
	for (i, node) in nodes.iter().enumerate() {
		let (dx, dy) = (at.x - node.x, at.y - node.y);
		let d2 = dx * dx + dy * dy;
		if d2 < best && accept(NodeHandle(i)) {
			best = d2;
			found = Some(NodeHandle(i));
		}
	}
	found
}

/// Nearest node within `radius` of a device point.
pub fn find_node_at_point(
	nodes: &[Node],
	viewport: &ViewportState,
	device: Point,
	radius: f64,
) -> Option<NodeHandle> {
	nearest_within(nodes, viewport.to_graph_space(device), radius)
}

/// Nodes whose radius-expanded box meets the graph-space rectangle.
pub fn nodes_in_bounds(nodes: &[Node], bounds: Bounds, radius: f64) -> Vec<NodeHandle> {
	nodes
		.iter()
		.enumerate()
		.filter(|(_, node)| bounds.meets_square(node.position(), radius))
		.map(|(i, _)| NodeHandle(i))
		.collect()
}

/// Nodes touched by a device-space drag rectangle, in node list order.
pub fn find_nodes_in_box(
	nodes: &[Node],
	viewport: &ViewportState,
	start: Point,
	end: Point,
	radius: f64,
) -> Vec<NodeHandle> {
	let (graph_start, graph_end) = viewport.to_box_in_graph_space(start, end);
	nodes_in_bounds(nodes, Bounds::from_corners(graph_start, graph_end), radius)
}

/// Links whose both endpoints are among `members`, in link list order.
pub fn links_within<'a>(links: &'a [Link], members: &HashSet<NodeHandle>) -> Vec<&'a Link> {
	links
		.iter()
		.filter(|link| members.contains(&link.source) && members.contains(&link.target))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: &str, x: f64, y: f64) -> Node {
		Node {
			id: id.into(),
			name: id.into(),
			img: None,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
		}
	}

	#[test]
	fn nearest_node_wins_and_ties_keep_list_order() {
		let nodes = vec![node("a", 10.0, 0.0), node("b", -10.0, 0.0), node("c", 4.0, 0.0)];
		assert_eq!(nearest_within(&nodes, Point::new(0.0, 0.0), 30.0), Some(NodeHandle(2)));

		let tied = vec![node("a", 10.0, 0.0), node("b", -10.0, 0.0)];
		assert_eq!(nearest_within(&tied, Point::new(0.0, 0.0), 30.0), Some(NodeHandle(0)));
	}

	#[test]
	fn rejected_nodes_do_not_shadow_accepted_ones() {
		let nodes = vec![node("a", 0.0, 0.0), node("b", 50.0, 0.0)];
		let at = Point::new(26.0, 0.0);
		assert_eq!(nearest_within(&nodes, at, 30.0), Some(NodeHandle(1)));
		assert_eq!(nearest_accepted(&nodes, at, 30.0, |h| h == NodeHandle(0)), Some(NodeHandle(0)));
		assert_eq!(nearest_accepted(&nodes, at, 30.0, |_| false), None);
	}

	#[test]
	fn radius_is_exclusive() {
		let nodes = vec![node("a", 30.0, 0.0)];
		assert_eq!(nearest_within(&nodes, Point::new(0.0, 0.0), 30.0), None);
		assert_eq!(nearest_within(&nodes, Point::new(0.5, 0.0), 30.0), Some(NodeHandle(0)));
	}

	#[test]
	fn point_query_goes_through_viewport() {
		let nodes = vec![node("a", 100.0, 100.0)];
		let viewport = ViewportState::new(50.0, 50.0, 2.0);
		// graph (100, 100) sits at device (250, 250)
		assert_eq!(
			find_node_at_point(&nodes, &viewport, Point::new(250.0, 250.0), 5.0),
			Some(NodeHandle(0))
		);
		assert_eq!(find_node_at_point(&nodes, &viewport, Point::new(100.0, 100.0), 5.0), None);
	}

	#[test]
	fn box_query_ignores_corner_order() {
		let nodes = vec![node("a", 0.0, 0.0), node("b", 60.0, 40.0), node("c", 300.0, 300.0)];
		let viewport = ViewportState::default();
		let forward = find_nodes_in_box(&nodes, &viewport, Point::new(-5.0, -5.0), Point::new(50.0, 50.0), 20.0);
		let swapped = find_nodes_in_box(&nodes, &viewport, Point::new(50.0, 50.0), Point::new(-5.0, -5.0), 20.0);
		let crossed = find_nodes_in_box(&nodes, &viewport, Point::new(-5.0, 50.0), Point::new(50.0, -5.0), 20.0);
		assert_eq!(forward, vec![NodeHandle(0), NodeHandle(1)]);
		assert_eq!(forward, swapped);
		assert_eq!(forward, crossed);
	}

	#[test]
	fn zero_area_box_selects_touching_nodes() {
		let nodes = vec![node("a", 10.0, 10.0), node("b", 100.0, 100.0)];
		let at = Point::new(25.0, 25.0);
		let found = find_nodes_in_box(&nodes, &ViewportState::default(), at, at, 15.0);
		assert_eq!(found, vec![NodeHandle(0)]);
	}
}
