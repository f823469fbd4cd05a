//! topo-graph: force-directed topology diagram engine.
//!
//! This crate lays out network and device topologies with a physics
//! simulation and implements the editor around them: pan and zoom, node
//! dragging, hover highlighting, rubber-band selection and interactive link
//! drawing. Drawing itself goes through the [`Renderer`] trait; on the WASM
//! target a JavaScript object can play that role.

pub mod components;

#[cfg(target_arch = "wasm32")]
mod bindings;

pub use components::topology::{
	Config, ConfigPatch, GraphData, GraphNode, Headless, InteractionMode, LinkRaw, Node, Point,
	Renderer, Topology, TopologyError, ViewportState,
};

#[cfg(target_arch = "wasm32")]
pub use bindings::TopologyHandle;

/// Initialize logging and panic hooks for the WASM target.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
	let _ = console_log::init_with_level(log::Level::Debug);
	console_error_panic_hook::set_once();
	log::info!("topo-graph: logging initialized");
}
