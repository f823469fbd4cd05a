//! The diagram facade.
//!
//! [`Topology`] owns one diagram: its configuration, the layout engine once
//! mounted, the viewport, the interaction state and the callback registry.
//! Hosts drive it from two directions. Editor commands (`stop`, `add_links`,
//! `load_config`, ...) change modes and graph contents; pointer entry points
//! (`pointer_down`, `pointer_move`, `pointer_up`, `wheel`, ...) take device
//! coordinates and do their own hit-testing. Every visible consequence is
//! reported to the [`Renderer`].
//!
//! Before [`Topology::init`] there is no engine: graph edits fail with
//! [`TopologyError::NotInitialized`], queries come back empty, and pointer
//! input is ignored.

use std::collections::HashSet;

use log::{debug, error, info, warn};

use super::config::{Config, ConfigPatch};
use super::error::{Result, TopologyError};
use super::events::{Callback, Dispatch, EventName, EventPayload, EventRegistry, Registration};
use super::geometry::Point;
use super::highlight::{self, DisplayStates, Focus};
use super::interaction::{
	BoxDrag, DragGesture, Gesture, Interaction, InteractionMode, Lifecycle, LinkPreview,
	MULTI_DRAG_SPEED,
};
use super::render::{Frame, LOCATE_DURATION_MS, Renderer, Surface};
use super::simulation::{GraphReport, Removal, Simulation, SimulationParams};
use super::spatial;
use super::theme::{EMPHASIS_SCALE, StyleVars};
use super::tooltip::Tooltip;
use super::types::{GraphData, GraphNode, Link, LinkRaw, Node, NodeHandle};
use super::viewport::{PanState, Viewport, ViewportState};

/// Alpha a graph or config change wakes the layout with.
const REHEAT_ALPHA: f64 = 0.3;

const TIP_FONT_SIZE: f64 = 12.0;

/// One interactive diagram.
pub struct Topology {
	target: String,
	renderer: Box<dyn Renderer>,
	config: Config,
	style: StyleVars,
	/// Graph handed to the engine on `init`.
	pending: GraphData,
	simulation: Option<Simulation>,
	viewport: Viewport,
	surface: Surface,
	events: EventRegistry,
	interaction: Interaction,
}

fn selected_links(links: &[Link], members: &HashSet<NodeHandle>) -> Vec<usize> {
	links
		.iter()
		.enumerate()
		.filter(|(_, l)| members.contains(&l.source) && members.contains(&l.target))
		.map(|(i, _)| i)
		.collect()
}

impl Topology {
	/// Create a diagram for the mount target `target`. Nothing is mounted
	/// until [`Topology::init`].
	pub fn new(
		target: impl Into<String>,
		renderer: Box<dyn Renderer>,
		data: GraphData,
		config: Config,
	) -> Self {
		Self {
			target: target.into(),
			renderer,
			style: StyleVars::from_config(&config),
			viewport: Viewport::new(config.min_zoom, config.max_zoom),
			config,
			pending: data,
			simulation: None,
			surface: Surface::default(),
			events: EventRegistry::new(),
			interaction: Interaction::default(),
		}
	}

	/// Mount the renderer and start the layout. Calling it again on a mounted
	/// diagram does nothing.
	pub fn init(&mut self) -> Result<()> {
		if self.simulation.is_some() {
			return Ok(());
		}
		if self.target.is_empty() {
			let e = TopologyError::MissingMountTarget;
			error!("topo-graph: {e}");
			return Err(e);
		}
		let surface = self
			.renderer
			.mount(&self.target)
			.inspect_err(|e| error!("topo-graph: {e}"))?;
		self.surface = surface;

		let center = Point::new(surface.width / 2.0, surface.height / 2.0);
		let mut simulation = Simulation::new(SimulationParams::from(&self.config), center);
		let data = std::mem::take(&mut self.pending);
		let report = simulation.set_graph(data.nodes, data.links);
		self.simulation = Some(simulation);
		info!(
			"topo-graph: mounted on `{}` ({}x{}) with {} nodes, {} links",
			self.target, surface.width, surface.height, report.nodes, report.links
		);

		self.renderer.apply_style(&self.style, self.interaction.is_stopped());
		self.renderer.transform(self.viewport.state());
		self.redraw();
		Ok(())
	}

	/// Tear down the engine and return to the pre-`init` state. Target and
	/// configuration are kept so the diagram can be mounted again.
	pub fn unmount(&mut self) {
		if let Some(mut simulation) = self.simulation.take() {
			simulation.stop();
			self.renderer.unmount();
			info!("topo-graph: unmounted from `{}`", self.target);
		}
		self.pending = GraphData::default();
		self.events.clear(None);
		self.interaction = Interaction::default();
		self.viewport = Viewport::new(self.config.min_zoom, self.config.max_zoom);
	}

	pub fn is_initialized(&self) -> bool {
		self.simulation.is_some()
	}

	/// The drawing surface changed size. The centering force follows.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.surface = Surface { width, height };
		if let Some(simulation) = self.simulation.as_mut() {
			simulation.set_center(Point::new(width / 2.0, height / 2.0));
		}
	}

	/// Advance the layout one frame and redraw. Returns `false` when nothing
	/// moved, either because the engine is stopped or not mounted.
	pub fn tick(&mut self) -> bool {
		let Some(simulation) = self.simulation.as_mut() else {
			return false;
		};
		if !simulation.tick() {
			return false;
		}
		self.redraw();
		true
	}

	fn redraw(&mut self) {
		if let Some(simulation) = &self.simulation {
			self.renderer.frame(&Frame {
				nodes: simulation.nodes(),
				links: simulation.links(),
				config: &self.config,
				viewport: self.viewport.state(),
			});
		}
	}

	fn restyle_neutral(&mut self) {
		if let Some(simulation) = &self.simulation {
			self.renderer.restyle(&DisplayStates::neutral(
				simulation.nodes().len(),
				simulation.links().len(),
			));
		}
	}

	fn selection_ids(&self) -> Vec<String> {
		let Some(simulation) = &self.simulation else {
			return Vec::new();
		};
		self.interaction
			.selection
			.nodes
			.iter()
			.map(|&h| simulation.node_at(h).id.clone())
			.collect()
	}

	/// Replace the graph. Without `links` the current links are resolved
	/// against the new nodes, dropping those whose endpoints are gone.
	pub fn update_nodes_and_links(
		&mut self,
		nodes: Vec<GraphNode>,
		links: Option<Vec<LinkRaw>>,
	) -> Result<GraphReport> {
		let selected = self.selection_ids();
		let simulation = self.simulation.as_mut().ok_or(TopologyError::NotInitialized)?;
		simulation.stop();
		let links = links.unwrap_or_else(|| simulation.raw_links());
		let report = simulation.set_graph(nodes, links);
		simulation.reheat(REHEAT_ALPHA);
		self.after_graph_change(selected);
		Ok(report)
	}

	/// Remove nodes by id together with every link touching them.
	pub fn delete_nodes_and_links_by_id<I, S>(&mut self, ids: I) -> Result<Removal>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let selected = self.selection_ids();
		let simulation = self.simulation.as_mut().ok_or(TopologyError::NotInitialized)?;
		simulation.stop();
		let removal = simulation.remove_by_ids(ids);
		simulation.restart();
		self.after_graph_change(selected);
		Ok(removal)
	}

	/// Node handles changed: drop gesture state that holds them and carry
	/// the selection over by id.
	fn after_graph_change(&mut self, selected: Vec<String>) {
		if matches!(self.interaction.gesture, Gesture::Drag(_)) {
			if let Some(simulation) = self.simulation.as_mut() {
				simulation.set_alpha_target(0.0);
			}
		}
		self.interaction.gesture = Gesture::None;
		self.interaction.hovered = None;
		if let InteractionMode::ConnectingLink { preview } = &mut self.interaction.mode {
			if preview.take().is_some() {
				self.renderer.link_preview(None);
			}
		}
		if let InteractionMode::BoxSelecting { rubber_band } = &mut self.interaction.mode {
			if rubber_band.take().is_some() {
				self.renderer.selection_box(None);
			}
		}

		let Some(simulation) = &self.simulation else {
			return;
		};
		let selection = &mut self.interaction.selection;
		selection.nodes = selected.iter().filter_map(|id| simulation.handle(id)).collect();
		let members = selection.node_set();
		selection.links = selected_links(simulation.links(), &members);
		let states = if selection.is_empty() {
			DisplayStates::neutral(simulation.nodes().len(), simulation.links().len())
		} else {
			highlight::selection(&members, simulation.nodes().len(), simulation.links())
		};
		self.redraw();
		self.renderer.restyle(&states);
	}

	/// Pause the layout for editing. Any editing mode is cancelled.
	pub fn stop(&mut self) {
		if let Some(simulation) = self.simulation.as_mut() {
			simulation.stop();
		}
		if self.interaction.is_stopped() {
			return;
		}
		self.cancel_modes();
		self.interaction.lifecycle = Lifecycle::Stopped;
		self.renderer.apply_style(&self.style, true);
		debug!("topo-graph: stopped");
	}

	/// Resume the layout. Returns to idle with pan and zoom enabled.
	pub fn start(&mut self) {
		if let Some(simulation) = self.simulation.as_mut() {
			simulation.restart();
		}
		self.cancel_modes();
		self.interaction.lifecycle = Lifecycle::Running;
		self.renderer.apply_style(&self.style, false);
		debug!("topo-graph: started");
	}

	fn cancel_modes(&mut self) {
		if let Gesture::Drag(drag) = self.interaction.gesture {
			self.release_drag(drag);
		}
		if self.interaction.mode.is_connecting() {
			self.add_links_cancel();
		}
		if self.interaction.mode.is_box_selecting() || !self.interaction.selection.is_empty() {
			self.box_select_cancel();
		}
		self.interaction.reset_mode();
	}

	/// Toggle hover highlighting. `None` flips it. Returns the new state.
	pub fn set_highlight(&mut self, enabled: Option<bool>) -> bool {
		let on = Interaction::toggle(self.interaction.highlight, enabled);
		self.interaction.highlight = on;
		if !on && self.interaction.hovered.take().is_some() {
			self.restyle_neutral();
		}
		on
	}

	/// Toggle fixed mode: pin every node where it is, or release every pin.
	pub fn fixed_node(&mut self, enabled: Option<bool>) -> Result<bool> {
		let simulation = self.simulation.as_mut().ok_or(TopologyError::NotInitialized)?;
		let on = Interaction::toggle(self.interaction.fixed_nodes, enabled);
		self.interaction.fixed_nodes = on;
		simulation.set_all_pinned(on);
		Ok(on)
	}

	/// Enter connect-link mode. A drag from one node released on another
	/// calls `on_complete` with the pair. Refused while stopped.
	pub fn add_links(&mut self, on_complete: Callback) -> bool {
		if self.interaction.is_stopped() {
			debug!("topo-graph: add_links ignored while stopped");
			return false;
		}
		if self.interaction.mode.is_box_selecting() || !self.interaction.selection.is_empty() {
			self.box_select_cancel();
		}
		if let Gesture::Drag(drag) = self.interaction.gesture {
			self.release_drag(drag);
		}
		self.interaction.mode = InteractionMode::ConnectingLink { preview: None };
		self.interaction.gesture = Gesture::None;
		if self.events.register(EventName::AddLink, on_complete) == Registration::Replaced {
			debug!("topo-graph: add-link callback replaced");
		}
		true
	}

	/// Leave connect-link mode, discarding any preview.
	pub fn add_links_cancel(&mut self) {
		if let InteractionMode::ConnectingLink { preview } = &self.interaction.mode {
			if preview.is_some() {
				self.renderer.link_preview(None);
			}
			self.interaction.reset_mode();
		}
		self.events.clear(Some(&EventName::AddLink));
	}

	/// Enter box-select mode. Each release of a rubber band fills the
	/// selection and calls `on_complete`. Refused while stopped.
	pub fn box_select(&mut self, on_complete: Callback) -> bool {
		if self.interaction.is_stopped() {
			debug!("topo-graph: box_select ignored while stopped");
			return false;
		}
		if self.interaction.mode.is_connecting() {
			self.add_links_cancel();
		}
		if let Gesture::Drag(drag) = self.interaction.gesture {
			self.release_drag(drag);
		}
		self.interaction.selection.clear();
		self.interaction.hovered = None;
		self.interaction.mode = InteractionMode::BoxSelecting { rubber_band: None };
		self.interaction.gesture = Gesture::None;
		if self.events.register(EventName::BoxSelect, on_complete) == Registration::Replaced {
			debug!("topo-graph: box-select callback replaced");
		}
		true
	}

	/// Leave box-select mode and clear the selection.
	pub fn box_select_cancel(&mut self) {
		if let InteractionMode::BoxSelecting { rubber_band } = &self.interaction.mode {
			if rubber_band.is_some() {
				self.renderer.selection_box(None);
			}
			self.interaction.reset_mode();
		}
		self.interaction.selection.clear();
		self.events.clear(Some(&EventName::BoxSelect));
		self.restyle_neutral();
	}

	/// Center the view on a node at zoom 1 and animate there.
	pub fn locate_to_node_by_id(&mut self, id: &str) -> Result<ViewportState> {
		let simulation = self.simulation.as_ref().ok_or(TopologyError::NotInitialized)?;
		let node = simulation
			.node(id)
			.ok_or_else(|| TopologyError::UnknownId(id.to_string()))?;
		let target =
			ViewportState::centered_on(node.position(), self.surface.width, self.surface.height);
		let state = self.viewport.set(target);
		self.renderer.animate_to(state, LOCATE_DURATION_MS);
		Ok(state)
	}

	/// Emphasize one node, independent of hover state. An empty id is ignored.
	pub fn set_node_highlight_by_id(&mut self, id: &str) -> Result<()> {
		if id.is_empty() {
			return Ok(());
		}
		let simulation = self.simulation.as_ref().ok_or(TopologyError::NotInitialized)?;
		let node = simulation
			.node(id)
			.ok_or_else(|| TopologyError::UnknownId(id.to_string()))?;
		self.renderer
			.emphasize(node, self.config.node_radius * EMPHASIS_SCALE);
		Ok(())
	}

	/// Nearest node within the node radius of a device point.
	pub fn find_node_by_point(&self, device: Point) -> Option<&Node> {
		let simulation = self.simulation.as_ref()?;
		spatial::find_node_at_point(
			simulation.nodes(),
			&self.viewport.state(),
			device,
			self.config.node_radius,
		)
		.map(|h| simulation.node_at(h))
	}

	/// Nodes touched by a device-space rectangle.
	pub fn find_nodes_by_box(&self, start: Point, end: Point) -> Vec<&Node> {
		let Some(simulation) = &self.simulation else {
			return Vec::new();
		};
		spatial::find_nodes_in_box(
			simulation.nodes(),
			&self.viewport.state(),
			start,
			end,
			self.config.node_radius,
		)
		.into_iter()
		.map(|h| simulation.node_at(h))
		.collect()
	}

	/// Links with both endpoints among the given node ids.
	pub fn find_links_by_nodes<I, S>(&self, ids: I) -> Vec<LinkRaw>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let Some(simulation) = &self.simulation else {
			return Vec::new();
		};
		let members: HashSet<NodeHandle> = ids
			.into_iter()
			.filter_map(|id| simulation.handle(id.as_ref()))
			.collect();
		spatial::links_within(simulation.links(), &members)
			.into_iter()
			.map(|l| l.to_raw(simulation.nodes()))
			.collect()
	}

	/// Merge a partial configuration and push the consequences out.
	pub fn load_config(&mut self, patch: ConfigPatch) {
		self.config.merge(patch);
		self.viewport
			.set_scale_extent(self.config.min_zoom, self.config.max_zoom);
		self.style = StyleVars::from_config(&self.config);
		if let Some(simulation) = self.simulation.as_mut() {
			simulation.set_params(SimulationParams::from(&self.config));
			simulation.reheat(REHEAT_ALPHA);
		}
		self.renderer.apply_style(&self.style, self.interaction.is_stopped());
		debug!("topo-graph: config reloaded");
	}

	/// [`Topology::load_config`] from a JSON document.
	pub fn load_config_json(&mut self, json: &str) -> Result<()> {
		let patch = ConfigPatch::from_json(json)
			.inspect_err(|e| warn!("topo-graph: config rejected: {e}"))?;
		self.load_config(patch);
		Ok(())
	}

	pub fn register(&mut self, name: EventName, callback: Callback) -> Registration {
		self.events.register(name, callback)
	}

	pub fn clear(&mut self, name: Option<&EventName>) -> usize {
		self.events.clear(name)
	}

	pub fn dispatch(&mut self, name: &EventName, payload: &EventPayload) -> Dispatch {
		self.events.dispatch(name, payload)
	}

	/// Pointer pressed at a device point.
	pub fn pointer_down(&mut self, at: Point) {
		self.events
			.dispatch(&EventName::CloseMenu, &EventPayload::CloseMenu);
		let Some(simulation) = self.simulation.as_mut() else {
			return;
		};

		if self.interaction.mode.is_box_selecting() {
			let band = BoxDrag { start: at, end: at };
			self.interaction.mode = InteractionMode::BoxSelecting {
				rubber_band: Some(band),
			};
			self.interaction.gesture = Gesture::Select;
			self.interaction.selection.clear();
			self.renderer.selection_box(Some(&band));
			return;
		}

		let graph = self.viewport.to_graph_space(at);
		let interaction = &self.interaction;
		let hit = spatial::nearest_accepted(simulation.nodes(), graph, self.config.node_radius, |h| {
			interaction.accepts_node(h)
		});

		match hit {
			Some(node) if self.interaction.mode.is_connecting() => {
				let start = simulation.node_at(node).position();
				let preview = LinkPreview {
					source: node,
					start,
					end: start,
				};
				self.interaction.mode = InteractionMode::ConnectingLink {
					preview: Some(preview),
				};
				self.interaction.gesture = Gesture::Connect;
				self.renderer.link_preview(Some(&preview));
			}
			Some(node) => {
				let drag = self.interaction.begin_drag(node, graph);
				match drag {
					DragGesture::Single { node } => simulation.node_at_mut(node).pin(),
					DragGesture::Multi { .. } => {
						for &h in &self.interaction.selection.nodes {
							simulation.node_at_mut(h).pin();
						}
					}
				}
				simulation.set_alpha_target(self.config.force.drag_alpha_target);
				simulation.restart();
				self.interaction.gesture = Gesture::Drag(drag);
			}
			None => {
				if self.interaction.pan_zoom_enabled() {
					self.interaction.gesture =
						Gesture::Pan(PanState::begin(at, &self.viewport.state()));
				}
			}
		}
	}

	/// Pointer moved to a device point.
	pub fn pointer_move(&mut self, at: Point) {
		match self.interaction.gesture {
			Gesture::None => self.hover(at),
			Gesture::Pan(pan) => {
				let next = pan.follow(at, &self.viewport.state());
				if let Some(state) = self
					.viewport
					.on_gesture(next, self.interaction.pan_zoom_enabled())
				{
					self.renderer.transform(state);
				}
			}
			Gesture::Drag(drag) => self.drag_to(drag, at),
			Gesture::Connect => {
				let graph = self.viewport.to_graph_space(at);
				if let InteractionMode::ConnectingLink { preview: Some(p) } = &mut self.interaction.mode
				{
					p.end = graph;
					self.renderer.link_preview(Some(&*p));
				}
			}
			Gesture::Select => {
				if let InteractionMode::BoxSelecting {
					rubber_band: Some(band),
				} = &mut self.interaction.mode
				{
					band.end = at;
					let band = *band;
					self.renderer.selection_box(Some(&band));
					self.select_box(band);
				}
			}
		}
	}

	/// Pointer released at a device point.
	pub fn pointer_up(&mut self, at: Point) {
		match std::mem::take(&mut self.interaction.gesture) {
			Gesture::None | Gesture::Pan(_) => {}
			Gesture::Drag(drag) => self.release_drag(drag),
			Gesture::Connect => self.finish_link(Some(at)),
			Gesture::Select => self.finish_box(at),
		}
	}

	/// Pointer left the surface. Drags are released where last seen; a link
	/// preview or rubber band is discarded and its mode stays armed.
	pub fn pointer_leave(&mut self) {
		match std::mem::take(&mut self.interaction.gesture) {
			Gesture::None | Gesture::Pan(_) => {}
			Gesture::Drag(drag) => self.release_drag(drag),
			Gesture::Connect => self.finish_link(None),
			Gesture::Select => self.discard_box(),
		}
		self.set_hovered(None);
	}

	/// Wheel zoom around a device point. Returns the new transform, or `None`
	/// when zooming is disabled.
	pub fn wheel(&mut self, at: Point, delta_y: f64) -> Option<ViewportState> {
		if !self.interaction.pan_zoom_enabled() {
			return None;
		}
		let next = self.viewport.zoom_at(at, Viewport::wheel_factor(delta_y));
		let state = self.viewport.on_gesture(next, true)?;
		self.renderer.transform(state);
		Some(state)
	}

	/// Apply a transform computed by a host-side zoom behavior.
	pub fn on_gesture(&mut self, event: ViewportState) -> Option<ViewportState> {
		let state = self
			.viewport
			.on_gesture(event, self.interaction.pan_zoom_enabled())?;
		self.renderer.transform(state);
		Some(state)
	}

	/// Update hover highlighting for a pointer at a device point.
	pub fn hover(&mut self, at: Point) {
		let hit = self.simulation.as_ref().and_then(|simulation| {
			spatial::find_node_at_point(
				simulation.nodes(),
				&self.viewport.state(),
				at,
				self.config.node_radius,
			)
		});
		self.set_hovered(hit);
	}

	/// Highlight a link and its endpoints, or clear with `None`.
	pub fn hover_link(&mut self, link_id: Option<&str>) {
		if !self.hover_enabled() {
			return;
		}
		let Some(simulation) = &self.simulation else {
			return;
		};
		let focus = link_id
			.and_then(|id| simulation.links().iter().position(|l| l.id == id))
			.map(Focus::Link);
		self.interaction.hovered = None;
		self.renderer.restyle(&highlight::propagate(
			focus,
			true,
			simulation.nodes().len(),
			simulation.links(),
		));
	}

	/// Selection feedback owns the display states while a selection exists.
	fn hover_enabled(&self) -> bool {
		self.interaction.highlight
			&& !self.interaction.mode.is_box_selecting()
			&& self.interaction.selection.is_empty()
	}

	fn set_hovered(&mut self, hit: Option<NodeHandle>) {
		if !self.hover_enabled() || self.interaction.hovered == hit {
			return;
		}
		self.interaction.hovered = hit;
		if let Some(simulation) = &self.simulation {
			self.renderer.restyle(&highlight::propagate(
				hit.map(Focus::Node),
				true,
				simulation.nodes().len(),
				simulation.links(),
			));
		}
	}

	fn drag_to(&mut self, drag: DragGesture, at: Point) {
		let Some(simulation) = self.simulation.as_mut() else {
			return;
		};
		let graph = self.viewport.to_graph_space(at);
		match drag {
			DragGesture::Single { node } => simulation.node_at_mut(node).pin_at(graph.x, graph.y),
			DragGesture::Multi { node, last } => {
				let dx = (graph.x - last.x) * MULTI_DRAG_SPEED;
				let dy = (graph.y - last.y) * MULTI_DRAG_SPEED;
				for &h in &self.interaction.selection.nodes {
					let n = simulation.node_at_mut(h);
					let (x, y) = (n.fx.unwrap_or(n.x), n.fy.unwrap_or(n.y));
					n.pin_at(x + dx, y + dy);
				}
				self.interaction.gesture = Gesture::Drag(DragGesture::Multi { node, last: graph });
			}
		}
	}

	fn release_drag(&mut self, drag: DragGesture) {
		let Some(simulation) = self.simulation.as_mut() else {
			return;
		};
		simulation.set_alpha_target(0.0);
		if self.interaction.fixed_nodes {
			return;
		}
		match drag {
			DragGesture::Single { node } => simulation.node_at_mut(node).unpin(),
			DragGesture::Multi { .. } => {
				for &h in &self.interaction.selection.nodes {
					simulation.node_at_mut(h).unpin();
				}
			}
		}
	}

	/// The rubber band moved: recompute the selection and its feedback.
	fn select_box(&mut self, band: BoxDrag) {
		let Some(simulation) = &self.simulation else {
			return;
		};
		let nodes = spatial::find_nodes_in_box(
			simulation.nodes(),
			&self.viewport.state(),
			band.start,
			band.end,
			self.config.node_radius,
		);
		let members: HashSet<NodeHandle> = nodes.iter().copied().collect();
		self.interaction.selection.links = selected_links(simulation.links(), &members);
		self.interaction.selection.nodes = nodes;
		self.renderer.restyle(&highlight::selection(
			&members,
			simulation.nodes().len(),
			simulation.links(),
		));
	}

	/// Release of a connect-link drag. With a node under `at` the candidate
	/// link is reported and the mode ends; otherwise the preview is dropped
	/// and the mode stays.
	fn finish_link(&mut self, at: Option<Point>) {
		let InteractionMode::ConnectingLink { preview } = &mut self.interaction.mode else {
			return;
		};
		let Some(preview) = preview.take() else {
			return;
		};
		self.renderer.link_preview(None);

		let Some(simulation) = &self.simulation else {
			return;
		};
		let target = at.and_then(|at| {
			spatial::nearest_within(
				simulation.nodes(),
				self.viewport.to_graph_space(at),
				self.config.node_radius,
			)
		});
		let Some(target) = target else {
			debug!("topo-graph: link released over empty canvas");
			return;
		};
		let payload = EventPayload::AddLink {
			source: simulation.node_at(preview.source).to_graph_node(),
			target: simulation.node_at(target).to_graph_node(),
		};
		self.events.dispatch(&EventName::AddLink, &payload);
		self.add_links_cancel();
	}

	/// Drop a half-drawn rubber band along with the selection it produced.
	fn discard_box(&mut self) {
		let InteractionMode::BoxSelecting { rubber_band } = &mut self.interaction.mode else {
			return;
		};
		if rubber_band.take().is_none() {
			return;
		}
		self.interaction.selection.clear();
		self.renderer.selection_box(None);
		self.restyle_neutral();
		debug!("topo-graph: rubber band discarded");
	}

	/// Release of a rubber band: keep the selection and report it.
	fn finish_box(&mut self, at: Point) {
		let InteractionMode::BoxSelecting { rubber_band } = &mut self.interaction.mode else {
			return;
		};
		let Some(mut band) = rubber_band.take() else {
			return;
		};
		band.end = at;
		self.interaction.mode = InteractionMode::Idle;
		self.renderer.selection_box(None);
		self.select_box(band);

		let Some(simulation) = &self.simulation else {
			return;
		};
		let selection = &self.interaction.selection;
		let payload = EventPayload::BoxSelect {
			nodes: selection
				.nodes
				.iter()
				.map(|&h| simulation.node_at(h).to_graph_node())
				.collect(),
			links: selection
				.links
				.iter()
				.map(|&i| simulation.links()[i].to_raw(simulation.nodes()))
				.collect(),
		};
		debug!(
			"topo-graph: box selected {} nodes, {} links",
			selection.nodes.len(),
			selection.links.len()
		);
		self.events.dispatch(&EventName::BoxSelect, &payload);
	}

	/// Lay out and show the tooltip of a link for a pointer at `at`.
	pub fn link_tooltip(&mut self, link_id: &str, at: Point) -> Option<Tooltip> {
		let simulation = self.simulation.as_ref()?;
		let link = simulation.link(link_id)?;
		let renderer = &self.renderer;
		let tip = Tooltip::layout(
			at,
			&link.tip_info,
			(self.surface.width, self.surface.height),
			|text| renderer.measure_text(text, TIP_FONT_SIZE),
		)?;
		self.renderer.tooltip(Some(&tip));
		Some(tip)
	}

	pub fn hide_tooltip(&mut self) {
		self.renderer.tooltip(None);
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn style(&self) -> &StyleVars {
		&self.style
	}

	pub fn viewport(&self) -> ViewportState {
		self.viewport.state()
	}

	pub fn surface(&self) -> Surface {
		self.surface
	}

	pub fn mode(&self) -> &InteractionMode {
		&self.interaction.mode
	}

	pub fn interaction(&self) -> &Interaction {
		&self.interaction
	}

	pub fn simulation(&self) -> Option<&Simulation> {
		self.simulation.as_ref()
	}

	/// Current nodes; empty before `init`.
	pub fn nodes(&self) -> &[Node] {
		self.simulation
			.as_ref()
			.map(Simulation::nodes)
			.unwrap_or_default()
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.simulation.as_ref()?.node(id)
	}

	pub fn links(&self) -> Vec<LinkRaw> {
		self.simulation
			.as_ref()
			.map(Simulation::raw_links)
			.unwrap_or_default()
	}

	pub fn selected_nodes(&self) -> Vec<&Node> {
		let Some(simulation) = &self.simulation else {
			return Vec::new();
		};
		self.interaction
			.selection
			.nodes
			.iter()
			.map(|&h| simulation.node_at(h))
			.collect()
	}

	pub fn selected_links(&self) -> Vec<LinkRaw> {
		let Some(simulation) = &self.simulation else {
			return Vec::new();
		};
		self.interaction
			.selection
			.links
			.iter()
			.map(|&i| simulation.links()[i].to_raw(simulation.nodes()))
			.collect()
	}

	/// Snapshot of the graph with current positions.
	pub fn graph_data(&self) -> GraphData {
		match &self.simulation {
			Some(simulation) => simulation.graph_data(),
			None => self.pending.clone(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology::render::Headless;

	fn topology() -> Topology {
		let data = GraphData {
			nodes: vec![
				GraphNode::new("a", "a").at(50.0, 50.0),
				GraphNode::new("b", "b").at(120.0, 50.0),
				GraphNode::new("c", "c").at(500.0, 500.0),
			],
			links: vec![LinkRaw::new("ab", "a", "b", "1-1")],
		};
		let mut topology = Topology::new("#t", Box::new(Headless::default()), data, Config::default());
		topology.init().unwrap();
		topology
	}

	fn select_a_and_b(topology: &mut Topology) {
		topology.box_select(Box::new(|_: &EventPayload| {}));
		topology.pointer_down(Point::new(0.0, 0.0));
		topology.pointer_up(Point::new(100.0, 100.0));
	}

	#[test]
	fn selection_survives_graph_updates_by_id() {
		let mut t = topology();
		select_a_and_b(&mut t);
		t.update_nodes_and_links(
			vec![GraphNode::new("c", "c"), GraphNode::new("b", "b"), GraphNode::new("d", "d")],
			None,
		)
		.unwrap();
		let selected: Vec<&str> = t.selected_nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(selected, ["b"]);
		assert!(t.selected_links().is_empty());
	}

	#[test]
	fn deleting_mid_drag_drops_the_gesture() {
		let mut t = topology();
		t.pointer_down(Point::new(500.0, 500.0));
		assert!(matches!(t.interaction().gesture, Gesture::Drag(_)));
		t.delete_nodes_and_links_by_id(["c"]).unwrap();
		assert_eq!(t.interaction().gesture, Gesture::None);
		assert_eq!(t.simulation().unwrap().alpha_target(), 0.0);
		// Release after removal must not touch a stale handle.
		t.pointer_up(Point::new(500.0, 500.0));
		assert_eq!(t.nodes().len(), 2);
	}

	#[test]
	fn resize_moves_the_layout_center() {
		let mut t = topology();
		t.resize(1000.0, 400.0);
		assert_eq!(t.surface(), Surface { width: 1000.0, height: 400.0 });
		assert_eq!(t.simulation().unwrap().center(), Point::new(500.0, 200.0));
	}

	#[test]
	fn box_selecting_refuses_node_presses() {
		let mut t = topology();
		t.box_select(Box::new(|_: &EventPayload| {}));
		t.pointer_down(Point::new(50.0, 50.0));
		assert_eq!(t.interaction().gesture, Gesture::Select);
		assert!(!t.node("a").unwrap().is_pinned());
	}

	#[test]
	fn switching_modes_clears_the_other() {
		let mut t = topology();
		select_a_and_b(&mut t);
		assert!(t.add_links(Box::new(|_: &EventPayload| {})));
		assert!(t.selected_nodes().is_empty());
		assert!(t.mode().is_connecting());

		assert!(t.box_select(Box::new(|_: &EventPayload| {})));
		assert!(t.mode().is_box_selecting());
		assert_eq!(t.dispatch(&EventName::AddLink, &EventPayload::CloseMenu), Dispatch::NoHandler);
	}

	#[test]
	fn queries_before_init_are_empty() {
		let t = Topology::new("#t", Box::new(Headless::default()), GraphData::default(), Config::default());
		assert!(t.nodes().is_empty());
		assert!(t.find_node_by_point(Point::new(0.0, 0.0)).is_none());
		assert!(t.find_links_by_nodes(["a"]).is_empty());
		assert_eq!(t.graph_data(), GraphData::default());
	}

	#[test]
	fn highlight_toggle_flips() {
		let mut t = topology();
		assert!(t.set_highlight(None));
		assert!(!t.set_highlight(None));
	}
}
