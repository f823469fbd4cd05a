//! Hover tooltip layout for links carrying `tipInfo`.

use std::collections::BTreeMap;

use super::geometry::Point;

/// Offset from the pointer to the tooltip's top-left corner.
const POINTER_OFFSET: f64 = 16.0;
const MIN_WIDTH: f64 = 150.0;
const HEIGHT: f64 = 90.0;
/// Horizontal padding added around the widest line.
const PADDING: f64 = 16.0;
const TEXT_INSET: f64 = 10.0;
const LINE_HEIGHT: f64 = 20.0;

/// One `key：value` line and its baseline origin.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipLine {
	pub text: String,
	pub at: Point,
}

/// A laid out tooltip, in device coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	/// Top-left corner before [`Tooltip::shift`] is applied.
	pub origin: Point,
	pub width: f64,
	pub height: f64,
	pub lines: Vec<TooltipLine>,
	/// Translation that keeps the box inside the viewport. Zero or negative.
	pub shift: Point,
}

impl Tooltip {
	/// Lay out a tooltip for a pointer at `pointer`.
	///
	/// Returns `None` when `info` is empty. `measure` reports the rendered
	/// width of a line; the box widens to fit the widest one and flips left or
	/// up when it would cross the `viewport` edge.
	pub fn layout(
		pointer: Point,
		info: &BTreeMap<String, String>,
		viewport: (f64, f64),
		measure: impl Fn(&str) -> f64,
	) -> Option<Self> {
		if info.is_empty() {
			return None;
		}
		let origin = pointer.offset(POINTER_OFFSET, POINTER_OFFSET);
		let lines: Vec<TooltipLine> = info
			.iter()
			.enumerate()
			.map(|(i, (key, value))| TooltipLine {
				text: format!("{key}：{value}"),
				at: origin.offset(TEXT_INSET, LINE_HEIGHT * (i + 1) as f64),
			})
			.collect();
		let content = lines
			.iter()
			.map(|line| measure(&line.text))
			.fold(MIN_WIDTH, f64::max);

		let (view_width, view_height) = viewport;
		let shift = Point::new(
			if origin.x + content + PADDING >= view_width {
				-(content + PADDING)
			} else {
				0.0
			},
			if origin.y + HEIGHT + PADDING >= view_height {
				-(HEIGHT + PADDING)
			} else {
				0.0
			},
		);

		Some(Self {
			origin,
			width: content + PADDING,
			height: HEIGHT,
			lines,
			shift,
		})
	}

	/// Top-left corner after the overflow shift.
	pub fn placed_origin(&self) -> Point {
		self.origin.offset(self.shift.x, self.shift.y)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn info() -> BTreeMap<String, String> {
		[("bandwidth", "1G"), ("port", "eth0")]
			.into_iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn no_info_no_tooltip() {
		assert!(Tooltip::layout(Point::new(0.0, 0.0), &BTreeMap::new(), (800.0, 600.0), |_| 0.0).is_none());
	}

	#[test]
	fn lines_stack_below_the_pointer() {
		let tip = Tooltip::layout(Point::new(100.0, 100.0), &info(), (800.0, 600.0), |_| 50.0).unwrap();
		assert_eq!(tip.origin, Point::new(116.0, 116.0));
		assert_eq!(tip.width, 166.0);
		assert_eq!(tip.lines[0].text, "bandwidth：1G");
		assert_eq!(tip.lines[0].at, Point::new(126.0, 136.0));
		assert_eq!(tip.lines[1].at, Point::new(126.0, 156.0));
		assert_eq!(tip.shift, Point::new(0.0, 0.0));
	}

	#[test]
	fn widest_line_sets_the_width() {
		let tip = Tooltip::layout(Point::new(0.0, 0.0), &info(), (800.0, 600.0), |s| s.len() as f64 * 20.0).unwrap();
		let widest = "bandwidth：1G".len() as f64 * 20.0;
		assert_eq!(tip.width, widest + 16.0);
	}

	#[test]
	fn flips_at_the_viewport_edge() {
		let tip = Tooltip::layout(Point::new(700.0, 550.0), &info(), (800.0, 600.0), |_| 10.0).unwrap();
		assert_eq!(tip.shift, Point::new(-166.0, -106.0));
		assert_eq!(tip.placed_origin(), Point::new(550.0, 460.0));
	}
}
