//! JavaScript bindings for the WASM build.
//!
//! [`TopologyHandle`] wraps a [`Topology`] behind a JSON-in, JSON-out
//! surface. Drawing is delegated to a plain JavaScript object of optional
//! hook functions (`mount`, `frame`, `transform`, `animateTo`, `restyle`,
//! `emphasize`, `linkPreview`, `selectionBox`, `applyStyle`, `tooltip`,
//! `measureText`, `unmount`). Only `mount` is required.

use js_sys::{Array, Function, JSON, Object, Reflect};
use log::warn;
use serde_json::{Value, json};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::components::topology::events::{Callback, EventName, EventPayload};
use crate::components::topology::highlight::{DisplayStates, LinkDisplay, NodeDisplay};
use crate::components::topology::interaction::{BoxDrag, LinkPreview};
use crate::components::topology::link_path::LabelBox;
use crate::components::topology::render::{Frame, Renderer, Surface, estimate_text_width};
use crate::components::topology::theme::StyleVars;
use crate::components::topology::tooltip::Tooltip;
use crate::components::topology::{
	Config, ConfigPatch, GraphData, GraphNode, IdList, LinkRaw, Node, Point, Topology,
	TopologyError, ViewportState,
};

fn to_js(value: &Value) -> JsValue {
	JSON::parse(&value.to_string()).unwrap_or(JsValue::NULL)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
	serde_json::to_string(value).map_err(|e| JsError::new(&e.to_string()))
}

fn payload_to_json(payload: &EventPayload) -> Value {
	match payload {
		EventPayload::AddLink { source, target } => json!({ "source": source, "target": target }),
		EventPayload::BoxSelect { nodes, links } => json!({ "nodes": nodes, "links": links }),
		EventPayload::CloseMenu => Value::Null,
		EventPayload::Custom(value) => value.clone(),
	}
}

fn js_callback(f: Function) -> Callback {
	Box::new(move |payload: &EventPayload| {
		if let Err(e) = f.call1(&JsValue::NULL, &to_js(&payload_to_json(payload))) {
			warn!("topo-graph: callback threw: {e:?}");
		}
	})
}

/// Renderer backed by a JavaScript hook object.
struct JsRenderer {
	hooks: Object,
	/// Ids of the last frame, so positional display states can be keyed.
	node_ids: Vec<String>,
	link_ids: Vec<String>,
}

impl JsRenderer {
	fn new(hooks: Object) -> Self {
		Self {
			hooks,
			node_ids: Vec::new(),
			link_ids: Vec::new(),
		}
	}

	fn hook(&self, name: &str) -> Option<Function> {
		Reflect::get(&self.hooks, &JsValue::from_str(name))
			.ok()?
			.dyn_into::<Function>()
			.ok()
	}

	fn call(&self, name: &str, args: &[JsValue]) -> Option<JsValue> {
		let f = self.hook(name)?;
		let argv: Array = args.iter().collect();
		f.apply(&self.hooks, &argv)
			.inspect_err(|e| warn!("topo-graph: renderer hook `{name}` threw: {e:?}"))
			.ok()
	}
}

fn node_class(display: NodeDisplay) -> &'static str {
	match display {
		NodeDisplay::ActiveFocal => "active focal",
		NodeDisplay::Active => "active",
		NodeDisplay::Dimmed => "dimmed",
		NodeDisplay::Neutral => "",
	}
}

fn link_class(display: LinkDisplay) -> &'static str {
	match display {
		LinkDisplay::Active => "active",
		LinkDisplay::Dimmed => "dimmed",
		LinkDisplay::Neutral => "",
	}
}

fn viewport_json(viewport: ViewportState) -> Value {
	json!({ "x": viewport.x, "y": viewport.y, "k": viewport.k, "css": viewport.to_css() })
}

impl Renderer for JsRenderer {
	fn mount(&mut self, target: &str) -> crate::components::topology::Result<Surface> {
		let failed = |reason: &str| TopologyError::MountFailed {
			target: target.to_string(),
			reason: reason.to_string(),
		};
		let size = self
			.call("mount", &[JsValue::from_str(target)])
			.ok_or_else(|| failed("mount hook missing or threw"))?;
		let dimension = |key: &str| {
			Reflect::get(&size, &JsValue::from_str(key))
				.ok()
				.and_then(|v| v.as_f64())
		};
		match (dimension("width"), dimension("height")) {
			(Some(width), Some(height)) => Ok(Surface { width, height }),
			_ => Err(failed("mount hook must return { width, height }")),
		}
	}

	fn unmount(&mut self) {
		self.call("unmount", &[]);
	}

	fn frame(&mut self, frame: &Frame<'_>) {
		self.node_ids = frame.nodes.iter().map(|n| n.id.clone()).collect();
		self.link_ids = frame.links.iter().map(|l| l.id.clone()).collect();
		let links: Vec<Value> = frame
			.links
			.iter()
			.enumerate()
			.map(|(i, link)| {
				let label = LabelBox::new(
					estimate_text_width(&link.name, frame.config.font_size),
					frame.config.font_size,
				);
				match frame.link_path(i, label) {
					Some(Ok(path)) => json!({
						"id": link.id,
						"name": link.name,
						"d": path.to_svg_path(),
						"label": path.label.to_transform(),
					}),
					_ => json!({ "id": link.id, "name": link.name }),
				}
			})
			.collect();
		let value = json!({ "nodes": frame.nodes, "links": links, "viewport": viewport_json(frame.viewport) });
		self.call("frame", &[to_js(&value)]);
	}

	fn transform(&mut self, viewport: ViewportState) {
		self.call("transform", &[to_js(&viewport_json(viewport))]);
	}

	fn animate_to(&mut self, viewport: ViewportState, duration_ms: u32) {
		if self.hook("animateTo").is_none() {
			self.transform(viewport);
			return;
		}
		self.call(
			"animateTo",
			&[to_js(&viewport_json(viewport)), JsValue::from(duration_ms)],
		);
	}

	fn restyle(&mut self, states: &DisplayStates) {
		let nodes: serde_json::Map<String, Value> = self
			.node_ids
			.iter()
			.zip(&states.nodes)
			.map(|(id, d)| (id.clone(), Value::from(node_class(*d))))
			.collect();
		let links: serde_json::Map<String, Value> = self
			.link_ids
			.iter()
			.zip(&states.links)
			.map(|(id, d)| (id.clone(), Value::from(link_class(*d))))
			.collect();
		self.call("restyle", &[to_js(&json!({ "nodes": nodes, "links": links }))]);
	}

	fn emphasize(&mut self, node: &Node, radius: f64) {
		self.call("emphasize", &[JsValue::from_str(&node.id), JsValue::from(radius)]);
	}

	fn link_preview(&mut self, preview: Option<&LinkPreview>) {
		let d = preview.map_or(JsValue::NULL, |p| JsValue::from_str(&p.to_svg_path()));
		self.call("linkPreview", &[d]);
	}

	fn selection_box(&mut self, rubber_band: Option<&BoxDrag>) {
		let d = rubber_band.map_or(JsValue::NULL, |b| JsValue::from_str(&b.to_svg_path()));
		self.call("selectionBox", &[d]);
	}

	fn apply_style(&mut self, vars: &StyleVars, paused: bool) {
		self.call(
			"applyStyle",
			&[JsValue::from_str(&vars.to_inline_style()), JsValue::from(paused)],
		);
	}

	fn tooltip(&mut self, tooltip: Option<&Tooltip>) {
		let value = tooltip.map_or(Value::Null, |tip| {
			let origin = tip.placed_origin();
			json!({
				"x": origin.x,
				"y": origin.y,
				"width": tip.width,
				"height": tip.height,
				"lines": tip.lines.iter().map(|l| json!({
					"text": l.text,
					"x": l.at.x + tip.shift.x,
					"y": l.at.y + tip.shift.y,
				})).collect::<Vec<_>>(),
			})
		});
		self.call("tooltip", &[to_js(&value)]);
	}

	fn measure_text(&self, text: &str, font_size: f64) -> f64 {
		self.call("measureText", &[JsValue::from_str(text), JsValue::from(font_size)])
			.and_then(|v| v.as_f64())
			.unwrap_or_else(|| estimate_text_width(text, font_size))
	}
}

/// A topology diagram driven from JavaScript.
#[wasm_bindgen]
pub struct TopologyHandle {
	inner: Topology,
}

#[wasm_bindgen]
impl TopologyHandle {
	/// `data` is a `{ nodes, links }` document; `config` an optional partial
	/// configuration document.
	#[wasm_bindgen(constructor)]
	pub fn new(
		target: &str,
		hooks: Object,
		data: &str,
		config: Option<String>,
	) -> Result<TopologyHandle, JsError> {
		let data = GraphData::from_json(data)?;
		let config = match config {
			Some(json) => Config::default().merged(ConfigPatch::from_json(&json)?),
			None => Config::default(),
		};
		Ok(Self {
			inner: Topology::new(target, Box::new(JsRenderer::new(hooks)), data, config),
		})
	}

	pub fn init(&mut self) -> Result<(), JsError> {
		Ok(self.inner.init()?)
	}

	pub fn unmount(&mut self) {
		self.inner.unmount();
	}

	/// Advance one animation frame. `false` once the layout has settled.
	pub fn tick(&mut self) -> bool {
		self.inner.tick()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.inner.resize(width, height);
	}

	#[wasm_bindgen(js_name = updateNodesAndLinks)]
	pub fn update_nodes_and_links(&mut self, nodes: &str, links: Option<String>) -> Result<(), JsError> {
		let nodes: Vec<GraphNode> = serde_json::from_str(nodes).map_err(TopologyError::from)?;
		let links: Option<Vec<LinkRaw>> = links
			.map(|json| serde_json::from_str(&json))
			.transpose()
			.map_err(TopologyError::from)?;
		let report = self.inner.update_nodes_and_links(nodes, links)?;
		if !report.dropped_links.is_empty() {
			warn!("topo-graph: {} links dropped on update", report.dropped_links.len());
		}
		Ok(())
	}

	/// Takes one id or an array of ids. Returns the removed `{ nodes, links }`
	/// as JSON.
	#[wasm_bindgen(js_name = deleteNodesAndLinksById)]
	pub fn delete_nodes_and_links_by_id(&mut self, ids: JsValue) -> Result<String, JsError> {
		let json = JSON::stringify(&ids)
			.ok()
			.and_then(|s| s.as_string())
			.ok_or_else(|| JsError::new("ids must be a string or an array of strings"))?;
		let ids = IdList::from_json(&json)?.into_vec();
		let removal = self.inner.delete_nodes_and_links_by_id(&ids)?;
		to_json(&json!({ "nodes": removal.nodes, "links": removal.links }))
	}

	pub fn stop(&mut self) {
		self.inner.stop();
	}

	pub fn start(&mut self) {
		self.inner.start();
	}

	#[wasm_bindgen(js_name = setHighlight)]
	pub fn set_highlight(&mut self, enabled: Option<bool>) -> bool {
		self.inner.set_highlight(enabled)
	}

	#[wasm_bindgen(js_name = fixedNode)]
	pub fn fixed_node(&mut self, enabled: Option<bool>) -> Result<bool, JsError> {
		Ok(self.inner.fixed_node(enabled)?)
	}

	#[wasm_bindgen(js_name = addLinks)]
	pub fn add_links(&mut self, callback: Function) -> bool {
		self.inner.add_links(js_callback(callback))
	}

	#[wasm_bindgen(js_name = addLinksCancel)]
	pub fn add_links_cancel(&mut self) {
		self.inner.add_links_cancel();
	}

	#[wasm_bindgen(js_name = boxSelect)]
	pub fn box_select(&mut self, callback: Function) -> bool {
		self.inner.box_select(js_callback(callback))
	}

	#[wasm_bindgen(js_name = boxSelectCancel)]
	pub fn box_select_cancel(&mut self) {
		self.inner.box_select_cancel();
	}

	#[wasm_bindgen(js_name = locateToNodeById)]
	pub fn locate_to_node_by_id(&mut self, id: &str) -> Result<(), JsError> {
		self.inner.locate_to_node_by_id(id)?;
		Ok(())
	}

	#[wasm_bindgen(js_name = setNodeHighlightById)]
	pub fn set_node_highlight_by_id(&mut self, id: &str) -> Result<(), JsError> {
		Ok(self.inner.set_node_highlight_by_id(id)?)
	}

	/// Node under a device point as JSON, or `undefined`.
	#[wasm_bindgen(js_name = findNodeByPoint)]
	pub fn find_node_by_point(&self, x: f64, y: f64) -> Result<Option<String>, JsError> {
		self.inner
			.find_node_by_point(Point::new(x, y))
			.map(to_json)
			.transpose()
	}

	#[wasm_bindgen(js_name = findNodesByBox)]
	pub fn find_nodes_by_box(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> Result<String, JsError> {
		to_json(&self.inner.find_nodes_by_box(Point::new(x0, y0), Point::new(x1, y1)))
	}

	#[wasm_bindgen(js_name = findLinksByNodes)]
	pub fn find_links_by_nodes(&self, ids: Vec<String>) -> Result<String, JsError> {
		to_json(&self.inner.find_links_by_nodes(&ids))
	}

	#[wasm_bindgen(js_name = loadConfig)]
	pub fn load_config(&mut self, config: &str) -> Result<(), JsError> {
		Ok(self.inner.load_config_json(config)?)
	}

	/// Register `callback` for a named event. Replaces any earlier one.
	pub fn on(&mut self, name: &str, callback: Function) {
		self.inner.register(EventName::from(name), js_callback(callback));
	}

	/// Clear one named callback, or all of them.
	pub fn clear(&mut self, name: Option<String>) {
		let name = name.as_deref().map(EventName::from);
		self.inner.clear(name.as_ref());
	}

	/// Deliver a host-defined event. `payload` is any JSON document.
	pub fn dispatch(&mut self, name: &str, payload: &str) -> Result<bool, JsError> {
		let value: Value = serde_json::from_str(payload).map_err(TopologyError::from)?;
		let outcome = self
			.inner
			.dispatch(&EventName::from(name), &EventPayload::Custom(value));
		Ok(outcome == crate::components::topology::Dispatch::Delivered)
	}

	#[wasm_bindgen(js_name = pointerDown)]
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		self.inner.pointer_down(Point::new(x, y));
	}

	#[wasm_bindgen(js_name = pointerMove)]
	pub fn pointer_move(&mut self, x: f64, y: f64) {
		self.inner.pointer_move(Point::new(x, y));
	}

	#[wasm_bindgen(js_name = pointerUp)]
	pub fn pointer_up(&mut self, x: f64, y: f64) {
		self.inner.pointer_up(Point::new(x, y));
	}

	#[wasm_bindgen(js_name = pointerLeave)]
	pub fn pointer_leave(&mut self) {
		self.inner.pointer_leave();
	}

	pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
		self.inner.wheel(Point::new(x, y), delta_y);
	}

	#[wasm_bindgen(js_name = hoverLink)]
	pub fn hover_link(&mut self, id: Option<String>) {
		self.inner.hover_link(id.as_deref());
	}

	#[wasm_bindgen(js_name = showLinkTip)]
	pub fn show_link_tip(&mut self, id: &str, x: f64, y: f64) -> bool {
		self.inner.link_tooltip(id, Point::new(x, y)).is_some()
	}

	#[wasm_bindgen(js_name = hideLinkTip)]
	pub fn hide_link_tip(&mut self) {
		self.inner.hide_tooltip();
	}

	#[wasm_bindgen(js_name = graphData)]
	pub fn graph_data(&self) -> Result<String, JsError> {
		to_json(&self.inner.graph_data())
	}
}
