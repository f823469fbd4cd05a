//! The boundary between the engine and whatever draws it.
//!
//! The engine never paints. After every state change it calls into a
//! [`Renderer`] with plain data: node positions per tick, the viewport
//! transform, display states for highlighting, and the transient shapes of
//! the editing gestures. Apart from [`Renderer::mount`] every hook has a
//! no-op default, so a renderer only implements what it draws.

use super::config::Config;
use super::error::Result;
use super::highlight::DisplayStates;
use super::interaction::{BoxDrag, LinkPreview};
use super::link_path::{LabelBox, LinkPath, link_path};
use super::theme::StyleVars;
use super::tooltip::Tooltip;
use super::types::{Link, Node};
use super::viewport::ViewportState;

/// Duration of the pan animation started by node location.
pub const LOCATE_DURATION_MS: u32 = 500;

/// Rough glyph advance as a fraction of the font size.
const GLYPH_WIDTH: f64 = 0.6;

/// Size of the drawing surface, in device pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
	pub width: f64,
	pub height: f64,
}

impl Default for Surface {
	fn default() -> Self {
		Self {
			width: 800.0,
			height: 600.0,
		}
	}
}

/// One tick's worth of drawable state.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
	pub nodes: &'a [Node],
	pub links: &'a [Link],
	pub config: &'a Config,
	pub viewport: ViewportState,
}

impl Frame<'_> {
	/// Outline of the link at `index`, for a label of the given size.
	///
	/// Returns `None` for an index past the end of the link list.
	pub fn link_path(&self, index: usize, label: LabelBox) -> Option<Result<LinkPath>> {
		let link = self.links.get(index)?;
		Some(link_path(
			self.nodes[link.source.index()].position(),
			self.nodes[link.target.index()].position(),
			&link.link_type,
			label,
			self.config,
		))
	}
}

/// Width estimate for text in a proportional font.
pub fn estimate_text_width(text: &str, font_size: f64) -> f64 {
	text.chars().count() as f64 * font_size * GLYPH_WIDTH
}

pub trait Renderer {
	/// Acquire the drawing surface inside `target`.
	fn mount(&mut self, target: &str) -> Result<Surface>;

	/// Release the surface.
	fn unmount(&mut self) {}

	/// Redraw nodes and links at their current positions.
	fn frame(&mut self, _frame: &Frame<'_>) {}

	/// The viewport transform changed.
	fn transform(&mut self, _viewport: ViewportState) {}

	/// Move to `viewport` over `duration_ms`.
	fn animate_to(&mut self, viewport: ViewportState, _duration_ms: u32) {
		self.transform(viewport);
	}

	/// Highlight or selection classification changed.
	fn restyle(&mut self, _states: &DisplayStates) {}

	/// One-shot emphasis of a single node, drawn at `radius`.
	fn emphasize(&mut self, _node: &Node, _radius: f64) {}

	/// Show, move or remove the connect-link preview (graph space).
	fn link_preview(&mut self, _preview: Option<&LinkPreview>) {}

	/// Show, move or remove the rubber band (device space).
	fn selection_box(&mut self, _rubber_band: Option<&BoxDrag>) {}

	/// Style variables changed. `paused` selects the editing background.
	fn apply_style(&mut self, _vars: &StyleVars, _paused: bool) {}

	/// Show or hide a link tooltip.
	fn tooltip(&mut self, _tooltip: Option<&Tooltip>) {}

	/// Rendered width of `text`. Renderers with a text engine should measure.
	fn measure_text(&self, text: &str, font_size: f64) -> f64 {
		estimate_text_width(text, font_size)
	}
}

/// Renderer for running the engine without a display.
#[derive(Clone, Debug, Default)]
pub struct Headless {
	pub surface: Surface,
}

impl Renderer for Headless {
	fn mount(&mut self, _target: &str) -> Result<Surface> {
		Ok(self.surface)
	}
}
