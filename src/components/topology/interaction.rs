//! Interaction modes and pointer gestures.
//!
//! [`InteractionMode`] is the editor's exclusive mode: idle, drawing a new
//! link, or rubber-band selecting. Independently, a pointer press starts at
//! most one [`Gesture`] that lives until release. [`Interaction`] owns both
//! together with the selection and the editor toggles, and answers the two
//! questions the facade keeps asking: may the viewport pan and zoom, and does
//! this node take pointer input.

use std::collections::HashSet;

use super::geometry::Point;
use super::spatial::Bounds;
use super::types::NodeHandle;
use super::viewport::PanState;

/// Multi-node drags move the selection faster than the pointer.
pub const MULTI_DRAG_SPEED: f64 = 2.2;

/// Whether the layout is live or paused for editing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
	#[default]
	Running,
	/// Entered by `stop()`. Editing modes are refused; node drags still work.
	Stopped,
}

/// The dragged segment shown while drawing a link. Graph space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkPreview {
	pub source: NodeHandle,
	pub start: Point,
	pub end: Point,
}

impl LinkPreview {
	pub fn to_svg_path(&self) -> String {
		format!("M {} {} L {} {}", self.start.x, self.start.y, self.end.x, self.end.y)
	}
}

/// A rubber band being dragged. Device space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxDrag {
	pub start: Point,
	pub end: Point,
}

impl BoxDrag {
	pub fn bounds(&self) -> Bounds {
		Bounds::from_corners(self.start, self.end)
	}

	/// Outline drawn from the press point, whichever way the pointer went.
	pub fn to_svg_path(&self) -> String {
		let (w, h) = (self.end.x - self.start.x, self.end.y - self.start.y);
		format!("M {} {} h {w} v {h} h {} Z", self.start.x, self.start.y, 0.0 - w)
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionMode {
	#[default]
	Idle,
	ConnectingLink {
		preview: Option<LinkPreview>,
	},
	BoxSelecting {
		rubber_band: Option<BoxDrag>,
	},
}

impl InteractionMode {
	pub fn is_idle(&self) -> bool {
		matches!(self, InteractionMode::Idle)
	}

	pub fn is_connecting(&self) -> bool {
		matches!(self, InteractionMode::ConnectingLink { .. })
	}

	pub fn is_box_selecting(&self) -> bool {
		matches!(self, InteractionMode::BoxSelecting { .. })
	}
}

/// Node drag in progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragGesture {
	/// One node pinned under the pointer.
	Single { node: NodeHandle },
	/// The whole selection, moved by amplified per-frame deltas.
	Multi { node: NodeHandle, last: Point },
}

/// What the held pointer is doing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
	#[default]
	None,
	Pan(PanState),
	Drag(DragGesture),
	/// Drawing a link from a node; the preview lives in the mode.
	Connect,
	/// Dragging a rubber band; the box lives in the mode.
	Select,
}

/// Result of a finished box selection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
	pub nodes: Vec<NodeHandle>,
	/// Indices into the link list.
	pub links: Vec<usize>,
}

impl SelectionState {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn contains(&self, node: NodeHandle) -> bool {
		self.nodes.contains(&node)
	}

	pub fn node_set(&self) -> HashSet<NodeHandle> {
		self.nodes.iter().copied().collect()
	}

	pub fn clear(&mut self) {
		self.nodes.clear();
		self.links.clear();
	}
}

/// Editor toggles and pointer state for one diagram.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Interaction {
	pub mode: InteractionMode,
	pub gesture: Gesture,
	pub selection: SelectionState,
	pub lifecycle: Lifecycle,
	/// Hover highlight enabled.
	pub highlight: bool,
	/// Keep nodes pinned after a drag.
	pub fixed_nodes: bool,
	/// Current hover target, tracked so only transitions restyle.
	pub hovered: Option<NodeHandle>,
}

impl Interaction {
	pub fn is_stopped(&self) -> bool {
		self.lifecycle == Lifecycle::Stopped
	}

	/// Pan and zoom are off while selecting, and stay off while a selection
	/// is held so dragging moves the selection instead of the canvas.
	pub fn pan_zoom_enabled(&self) -> bool {
		!self.mode.is_box_selecting() && self.selection.is_empty()
	}

	/// Whether a press on `node` reaches it. While a rubber band is active no
	/// node does; while a selection is held only its members do.
	pub fn accepts_node(&self, node: NodeHandle) -> bool {
		if self.mode.is_box_selecting() {
			return false;
		}
		self.selection.is_empty() || self.selection.contains(node)
	}

	/// Start the drag that a press on `node` at graph point `at` begins.
	pub fn begin_drag(&self, node: NodeHandle, at: Point) -> DragGesture {
		if !self.selection.is_empty() && self.selection.contains(node) {
			DragGesture::Multi { node, last: at }
		} else {
			DragGesture::Single { node }
		}
	}

	/// Drop any mode and gesture state. Selection and toggles are kept.
	pub fn reset_mode(&mut self) {
		self.mode = InteractionMode::Idle;
		self.gesture = Gesture::None;
	}

	/// Resolve a toggle argument: `None` flips the current value.
	pub fn toggle(current: bool, requested: Option<bool>) -> bool {
		requested.unwrap_or(!current)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn selection_gates_pointer_acceptance() {
		let mut interaction = Interaction::default();
		assert!(interaction.accepts_node(NodeHandle(3)));
		assert!(interaction.pan_zoom_enabled());

		interaction.mode = InteractionMode::BoxSelecting { rubber_band: None };
		assert!(!interaction.accepts_node(NodeHandle(3)));
		assert!(!interaction.pan_zoom_enabled());

		interaction.mode = InteractionMode::Idle;
		interaction.selection.nodes = vec![NodeHandle(1)];
		assert!(interaction.accepts_node(NodeHandle(1)));
		assert!(!interaction.accepts_node(NodeHandle(3)));
		assert!(!interaction.pan_zoom_enabled());
	}

	#[test]
	fn drag_kind_follows_selection_membership() {
		let mut interaction = Interaction::default();
		let at = Point::new(1.0, 2.0);
		assert_eq!(interaction.begin_drag(NodeHandle(0), at), DragGesture::Single { node: NodeHandle(0) });

		interaction.selection.nodes = vec![NodeHandle(0), NodeHandle(2)];
		assert_eq!(
			interaction.begin_drag(NodeHandle(2), at),
			DragGesture::Multi {
				node: NodeHandle(2),
				last: at
			}
		);
		assert_eq!(interaction.begin_drag(NodeHandle(1), at), DragGesture::Single { node: NodeHandle(1) });
	}

	#[test]
	fn toggles_flip_without_argument() {
		assert!(Interaction::toggle(false, None));
		assert!(!Interaction::toggle(true, None));
		assert!(Interaction::toggle(true, Some(true)));
	}

	#[test]
	fn box_outline_follows_drag_direction() {
		let up_left = BoxDrag {
			start: Point::new(50.0, 50.0),
			end: Point::new(20.0, 10.0),
		};
		assert_eq!(up_left.to_svg_path(), "M 50 50 h -30 v -40 h 30 Z");
		assert_eq!(up_left.bounds().min, Point::new(20.0, 10.0));
	}
}
