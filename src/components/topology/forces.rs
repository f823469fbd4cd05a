//! The four forces composed each simulation tick.
//!
//! Each force reads node positions and nudges velocities (the centering force
//! moves positions directly). They follow the d3-force formulations so that
//! layouts behave the way users of web topology editors expect:
//!
//! - [`collide`]: pushes apart nodes whose collision circles overlap, using
//!   positions projected one tick ahead. Not scaled by alpha.
//! - [`many_body`]: pairwise charge, clamped to a distance window.
//! - [`center`]: translates the layout so its mean sits on the center point.
//! - [`springs`]: pulls link endpoints toward a rest distance, biased so the
//!   lower-degree endpoint moves more.

use super::geometry::Point;
use super::types::Node;

/// Deterministic tiny offsets for separating coincident nodes.
#[derive(Clone, Debug, Default)]
pub(crate) struct Jiggle {
	seed: f64,
}

impl Jiggle {
	/// Simple pseudo-random function (deterministic)
	fn pseudo_random(seed: f64) -> f64 {
		let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
		x - x.floor()
	}

	pub(crate) fn next(&mut self) -> f64 {
		self.seed += 1.0;
		(Self::pseudo_random(self.seed) - 0.5) * 1e-6
	}
}

/// A link spring between two node indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Spring {
	pub source: usize,
	pub target: usize,
	/// Share of the correction applied to the target end.
	pub bias: f64,
}

impl Spring {
	/// Build springs for `(source, target)` pairs over `node_count` nodes.
	/// Self-loops carry no force and are skipped.
	pub(crate) fn build(pairs: impl Iterator<Item = (usize, usize)> + Clone, node_count: usize) -> Vec<Spring> {
		let mut degree = vec![0usize; node_count];
		for (s, t) in pairs.clone() {
			degree[s] += 1;
			degree[t] += 1;
		}
		pairs
			.filter(|(s, t)| s != t)
			.map(|(source, target)| Spring {
				source,
				target,
				bias: degree[source] as f64 / (degree[source] + degree[target]) as f64,
			})
			.collect()
	}
}

pub(crate) fn collide(nodes: &mut [Node], radius: f64, strength: f64, jiggle: &mut Jiggle) {
	let r = radius * 2.0;
	let r2 = r * r;
	for i in 0..nodes.len() {
		for j in (i + 1)..nodes.len() {
			let (a, b) = (&nodes[i], &nodes[j]);
			let mut x = a.x + a.vx - b.x - b.vx;
			let mut y = a.y + a.vy - b.y - b.vy;
			let mut l = x * x + y * y;
			if l >= r2 {
				continue;
			}
			if x == 0.0 {
				x = jiggle.next();
				l += x * x;
			}
			if y == 0.0 {
				y = jiggle.next();
				l += y * y;
			}
			let d = l.sqrt();
			let k = (r - d) / d * strength;
			let (x, y) = (x * k, y * k);
			// Equal radii: the push is shared evenly between the two nodes.
			nodes[i].vx += x * 0.5;
			nodes[i].vy += y * 0.5;
			nodes[j].vx -= x * 0.5;
			nodes[j].vy -= y * 0.5;
		}
	}
}

pub(crate) fn many_body(
	nodes: &mut [Node],
	strength: f64,
	distance_min: f64,
	distance_max: f64,
	alpha: f64,
	jiggle: &mut Jiggle,
) {
	let (min2, max2) = (distance_min * distance_min, distance_max * distance_max);
	for i in 0..nodes.len() {
		let (mut dvx, mut dvy) = (0.0, 0.0);
		for j in 0..nodes.len() {
			if i == j {
				continue;
			}
			let mut x = nodes[j].x - nodes[i].x;
			let mut y = nodes[j].y - nodes[i].y;
			let mut l = x * x + y * y;
			if l >= max2 {
				continue;
			}
			if x == 0.0 {
				x = jiggle.next();
				l += x * x;
			}
			if y == 0.0 {
				y = jiggle.next();
				l += y * y;
			}
			if l < min2 {
				l = (min2 * l).sqrt();
			}
			let w = strength * alpha / l;
			dvx += x * w;
			dvy += y * w;
		}
		nodes[i].vx += dvx;
		nodes[i].vy += dvy;
	}
}

pub(crate) fn center(nodes: &mut [Node], at: Point, strength: f64) {
	if nodes.is_empty() {
		return;
	}
	let n = nodes.len() as f64;
	let (sx, sy) = nodes.iter().fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
	let (dx, dy) = ((sx / n - at.x) * strength, (sy / n - at.y) * strength);
	for node in nodes.iter_mut() {
		node.x -= dx;
		node.y -= dy;
	}
}

pub(crate) fn springs(
	nodes: &mut [Node],
	springs: &[Spring],
	distance: f64,
	strength: f64,
	alpha: f64,
	jiggle: &mut Jiggle,
) {
	for spring in springs {
		let (s, t) = (&nodes[spring.source], &nodes[spring.target]);
		let mut x = t.x + t.vx - s.x - s.vx;
		let mut y = t.y + t.vy - s.y - s.vy;
		if x == 0.0 {
			x = jiggle.next();
		}
		if y == 0.0 {
			y = jiggle.next();
		}
		let l = (x * x + y * y).sqrt();
		let k = (l - distance) / l * alpha * strength;
		let (x, y) = (x * k, y * k);
		let b = spring.bias;
		nodes[spring.target].vx -= x * b;
		nodes[spring.target].vy -= y * b;
		nodes[spring.source].vx += x * (1.0 - b);
		nodes[spring.source].vy += y * (1.0 - b);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(x: f64, y: f64) -> Node {
		Node {
			id: String::new(),
			name: String::new(),
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
	fn jiggle_is_tiny_and_deterministic() {
		let (mut a, mut b) = (Jiggle::default(), Jiggle::default());
		for _ in 0..16 {
			let v = a.next();
			assert!(v.abs() <= 0.5e-6);
			assert_eq!(v, b.next());
		}
	}

	#[test]
	fn spring_bias_favours_moving_the_leaf() {
		// hub 0 linked to 1 and 2
		let springs = Spring::build([(0, 1), (0, 2), (1, 1)].into_iter(), 3);
		assert_eq!(springs.len(), 2);
		// degree(0) = 2, degree(1) = 3 (self-loop counts twice)
		assert!((springs[0].bias - 2.0 / 5.0).abs() < 1e-12);
		assert!((springs[1].bias - 2.0 / 3.0).abs() < 1e-12);
	}

	#[test]
	fn collide_separates_overlapping_nodes() {
		let mut nodes = vec![node(0.0, 0.0), node(10.0, 0.0)];
		collide(&mut nodes, 30.0, 0.7, &mut Jiggle::default());
		assert!(nodes[0].vx < 0.0);
		assert!(nodes[1].vx > 0.0);
		assert!((nodes[0].vx + nodes[1].vx).abs() < 1e-12);
	}

	#[test]
	fn negative_charge_repels_within_window() {
		let mut nodes = vec![node(0.0, 0.0), node(50.0, 0.0), node(500.0, 0.0)];
		many_body(&mut nodes, -30.0, 10.0, 100.0, 1.0, &mut Jiggle::default());
		assert!(nodes[0].vx < 0.0);
		assert!(nodes[1].vx > 0.0);
		assert_eq!(nodes[2].vx, 0.0);
	}

	#[test]
	fn center_moves_mean_onto_point() {
		let mut nodes = vec![node(0.0, 0.0), node(10.0, 20.0)];
		center(&mut nodes, Point::new(100.0, 100.0), 1.0);
		let mean = ((nodes[0].x + nodes[1].x) / 2.0, (nodes[0].y + nodes[1].y) / 2.0);
		assert_eq!(mean, (100.0, 100.0));
		assert_eq!(nodes[1].x - nodes[0].x, 10.0);
	}

	#[test]
	fn stretched_spring_pulls_endpoints_together() {
		let mut nodes = vec![node(0.0, 0.0), node(300.0, 0.0)];
		let built = Spring::build([(0, 1)].into_iter(), 2);
		springs(&mut nodes, &built, 100.0, 0.7, 1.0, &mut Jiggle::default());
		assert!(nodes[0].vx > 0.0);
		assert!(nodes[1].vx < 0.0);
	}
}
