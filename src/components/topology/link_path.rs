//! Link outline and label geometry.
//!
//! A link is drawn as four closed polygons that leave a gap in the middle for
//! its label:
//!
//! ```text
//!  source node )>====      label      ====<( target node
//!               ^  ^                     ^  ^
//!           arrow  body               body  arrow
//! ```
//!
//! Each end gets an arrowhead when its arity is `N`, or a degenerate stub when
//! it is `1`. Bodies run from just past the arrow toward the midpoint and stop
//! short of the label by `text_gap`.
//!
//! Every point is laid out on an unrotated frame where "along the link" is
//! `+y`, then rotated into place with [`rotate_point`].

use std::fmt::Write as _;

use super::config::Config;
use super::error::Result;
use super::geometry::{Point, distance, rotate_point, rotation_angle};
use super::types::{Arity, LinkType};

/// Gap between a node's circle and the link end.
const BOUNDARY_GAP: f64 = 2.0;

/// Measured size of a link's label.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LabelBox {
	pub width: f64,
	pub height: f64,
}

impl LabelBox {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}
}

/// Where and at what angle the label is painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelPlacement {
	pub at: Point,
	/// Rotation in degrees, chosen so the text never reads upside down.
	pub angle: f64,
}

impl LabelPlacement {
	/// `transform` attribute for the label element.
	pub fn to_transform(&self) -> String {
		format!("translate({}, {}) rotate({})", self.at.x, self.at.y, self.angle)
	}
}

/// Outline of one link.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkPath {
	/// Link direction in degrees, source to target.
	pub angle: f64,
	/// Source end on the source node's boundary.
	pub source: Point,
	/// Target end on the target node's boundary.
	pub target: Point,
	/// Length of each body segment.
	pub line_length: f64,
	pub source_arrow: [Point; 3],
	pub source_body: [Point; 4],
	pub target_body: [Point; 4],
	pub target_arrow: [Point; 3],
	pub label: LabelPlacement,
}

/// Compute the outline for a link between two node centers.
///
/// Fails with [`TopologyError::InvalidLinkType`](super::error::TopologyError)
/// when `link_type` is not one of `1-1`, `1-N`, `N-1`, `N-N`.
pub fn link_path(
	source_center: Point,
	target_center: Point,
	link_type: &str,
	label: LabelBox,
	config: &Config,
) -> Result<LinkPath> {
	let link_type: LinkType = link_type.parse()?;
	let center_angle = rotation_angle(source_center, target_center);
	let reach = config.node_radius + BOUNDARY_GAP;

	let source = rotate_point(
		source_center,
		source_center.offset(0.0, reach),
		90.0 - center_angle,
	);
	let target = rotate_point(
		target_center,
		target_center.offset(0.0, reach),
		-90.0 - center_angle,
	);

	let side = config.arrow_size;
	let half_width = config.link_width / 2.0;
	let line_length =
		(distance(source, target) / 2.0 - label.width / 2.0 - side - config.text_gap).max(0.0);
	let angle = rotation_angle(source, target);

	let end = |tip: Point, arity: Arity, turn: f64| {
		let place = |dx: f64, dy: f64| rotate_point(tip, tip.offset(dx, dy), turn);
		let arrow = match arity {
			Arity::Many => [tip, place(-side, side), place(side, side)],
			Arity::One => [tip, place(0.0, side), place(0.0, side)],
		};
		let body = [
			place(-half_width, side),
			place(half_width, side),
			place(half_width, side + line_length),
			place(-half_width, side + line_length),
		];
		(arrow, body)
	};
	let (source_arrow, source_body) = end(source, link_type.source_arity(), 90.0 - angle);
	let (target_arrow, target_body) = end(target, link_type.target_arity(), -90.0 - angle);

	Ok(LinkPath {
		angle,
		source,
		target,
		line_length,
		source_arrow,
		source_body,
		target_body,
		target_arrow,
		label: place_label(source, target, center_angle, label, config),
	})
}

/// Center the label in the gap between the two bodies.
///
/// Links pointing left are laid out from the target end and turned half a
/// revolution so the text stays upright.
fn place_label(
	source: Point,
	target: Point,
	angle: f64,
	label: LabelBox,
	config: &Config,
) -> LabelPlacement {
	let lift = label.height / 4.0;
	let side = config.arrow_size;
	let gap = config.text_gap;
	let half = distance(source, target) / 2.0 - side - gap;

	let (pivot, turn, text_angle) = if angle > -90.0 && angle < 90.0 {
		(source, 90.0 - angle, angle)
	} else {
		(target, -90.0 - angle, angle + 180.0)
	};
	LabelPlacement {
		at: rotate_point(pivot, pivot.offset(-lift, side + half + gap), turn),
		angle: text_angle,
	}
}

impl LinkPath {
	/// SVG path data: four closed sub-paths, source arrow first.
	pub fn to_svg_path(&self) -> String {
		let mut d = String::new();
		let mut polygon = |points: &[Point]| {
			for (i, p) in points.iter().enumerate() {
				let cmd = if i == 0 { 'M' } else { 'L' };
				let _ = write!(d, "{cmd} {} {} ", p.x, p.y);
			}
			d.push_str("Z ");
		};
		polygon(&self.source_arrow);
		polygon(&self.source_body);
		polygon(&self.target_body);
		polygon(&self.target_arrow);
		d.truncate(d.trim_end().len());
		d
	}
}
