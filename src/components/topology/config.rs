//! Diagram configuration.
//!
//! [`Config`] holds every numeric and visual parameter the engine and the
//! link path calculator read. Hosts override it in two ways: by passing a full
//! `Config` at construction, or by merging a [`ConfigPatch`] through
//! `Topology::load_config`. A patch is a document of optional fields; only the
//! fields it names change.
//!
//! # Derived parameters
//!
//! Some simulation parameters are derived from visual ones. The collision
//! radius is `node_radius * node_gap`, so merging a new `nodeRadius` also
//! widens the spacing the layout keeps between nodes.

use serde::Deserialize;

use super::error::Result;
use super::viewport::MIN_SCALE;

/// Force simulation parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceConfig {
	/// Rest length of link springs.
	pub link_distance: f64,
	/// Spring stiffness, applied to every link.
	pub link_strength: f64,
	/// How hard overlapping nodes are pushed apart, 0..=1.
	pub collide_strength: f64,
	/// Many-body strength. Negative values repel, positive values attract.
	pub charge_strength: f64,
	/// Pairs closer than this are treated as this far apart.
	pub charge_distance_min: f64,
	/// Pairs farther apart than this do not interact.
	pub charge_distance_max: f64,
	/// Fraction of velocity lost each tick.
	pub velocity_decay: f64,
	/// The simulation stops once alpha falls below this.
	pub alpha_min: f64,
	/// Alpha target held while a node is dragged.
	pub drag_alpha_target: f64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			link_distance: 100.0,
			link_strength: 0.7,
			collide_strength: 0.7,
			charge_strength: -30.0,
			charge_distance_min: 10.0,
			charge_distance_max: 100.0,
			velocity_decay: 0.4,
			alpha_min: 0.001,
			drag_alpha_target: 0.3,
		}
	}
}

/// Complete configuration for one diagram.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
	/// Canvas background while the layout is running.
	pub container_bg: String,
	/// Canvas background while editing is paused.
	pub container_bg_edit: String,
	/// Node radius in graph units. Also the hit radius for point queries.
	pub node_radius: f64,
	/// Collision radius as a multiple of `node_radius`.
	pub node_gap: f64,
	pub node_ring_color: String,
	/// Round nodes (circles) vs. square ones.
	pub is_round: bool,
	pub link_color: String,
	/// Thickness of a link body.
	pub link_width: f64,
	pub font_size: f64,
	/// Space kept between a link label and the link segments.
	pub text_gap: f64,
	/// Arrowhead half-width and length.
	pub arrow_size: f64,
	/// Outline-style links instead of filled ones.
	pub is_out_line: bool,
	pub highlight_color: String,
	/// Zoom bounds for the viewport scale.
	pub min_zoom: f64,
	pub max_zoom: f64,
	pub force: ForceConfig,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			container_bg: "#f6e58d".into(),
			container_bg_edit: "#c7ecee".into(),
			node_radius: 30.0,
			node_gap: 3.0,
			node_ring_color: "#ff7979".into(),
			is_round: true,
			link_color: "#ff7979".into(),
			link_width: 2.0,
			font_size: 12.0,
			text_gap: 8.0,
			arrow_size: 4.0,
			is_out_line: false,
			highlight_color: "#22a6b3".into(),
			min_zoom: 0.4,
			max_zoom: 3.0,
			force: ForceConfig::default(),
		}
	}
}

impl Config {
	/// Radius used by the collision force.
	pub fn collide_radius(&self) -> f64 {
		self.node_radius * self.node_gap
	}

	/// Merge `patch` into this configuration.
	pub fn merge(&mut self, patch: ConfigPatch) {
		macro_rules! take {
			($($field:ident),* $(,)?) => {
				$(if let Some(v) = patch.$field { self.$field = v; })*
			};
		}
		take!(
			container_bg,
			container_bg_edit,
			node_radius,
			node_gap,
			node_ring_color,
			is_round,
			link_color,
			link_width,
			font_size,
			text_gap,
			arrow_size,
			is_out_line,
			highlight_color,
			min_zoom,
			max_zoom,
		);
		if let Some(force) = patch.force {
			self.force.merge(force);
		}
		for (name, bound) in [("minZoom", &mut self.min_zoom), ("maxZoom", &mut self.max_zoom)] {
			if !(*bound >= MIN_SCALE) {
				log::warn!("topo-graph: {name} {bound} is below {MIN_SCALE}, clamping");
				*bound = MIN_SCALE;
			}
		}
		if self.min_zoom > self.max_zoom {
			log::warn!(
				"topo-graph: minZoom {} exceeds maxZoom {}, swapping",
				self.min_zoom,
				self.max_zoom
			);
			std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
		}
	}

	/// Return a copy with `patch` merged in.
	pub fn merged(mut self, patch: ConfigPatch) -> Self {
		self.merge(patch);
		self
	}
}

impl ForceConfig {
	fn merge(&mut self, patch: ForceConfigPatch) {
		macro_rules! take {
			($($field:ident),* $(,)?) => {
				$(if let Some(v) = patch.$field { self.$field = v; })*
			};
		}
		take!(
			link_distance,
			link_strength,
			collide_strength,
			charge_strength,
			charge_distance_min,
			charge_distance_max,
			velocity_decay,
			alpha_min,
			drag_alpha_target,
		);
	}
}

/// Partial configuration, as a host sends it to `load_config`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigPatch {
	pub container_bg: Option<String>,
	pub container_bg_edit: Option<String>,
	pub node_radius: Option<f64>,
	pub node_gap: Option<f64>,
	pub node_ring_color: Option<String>,
	pub is_round: Option<bool>,
	pub link_color: Option<String>,
	pub link_width: Option<f64>,
	pub font_size: Option<f64>,
	pub text_gap: Option<f64>,
	pub arrow_size: Option<f64>,
	pub is_out_line: Option<bool>,
	pub highlight_color: Option<String>,
	pub min_zoom: Option<f64>,
	pub max_zoom: Option<f64>,
	pub force: Option<ForceConfigPatch>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ForceConfigPatch {
	pub link_distance: Option<f64>,
	pub link_strength: Option<f64>,
	pub collide_strength: Option<f64>,
	pub charge_strength: Option<f64>,
	pub charge_distance_min: Option<f64>,
	pub charge_distance_max: Option<f64>,
	pub velocity_decay: Option<f64>,
	pub alpha_min: Option<f64>,
	pub drag_alpha_target: Option<f64>,
}

impl ConfigPatch {
	/// Parse a patch from JSON, e.g. `{"nodeRadius": 20, "linkColor": "#000"}`.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology::error::TopologyError;

	#[test]
	fn defaults_match_the_editor() {
		let config = Config::default();
		assert_eq!(config.node_radius, 30.0);
		assert_eq!(config.collide_radius(), 90.0);
		assert_eq!((config.min_zoom, config.max_zoom), (0.4, 3.0));
	}

	#[test]
	fn merge_only_touches_named_fields() {
		let patch = ConfigPatch::from_json(
			r##"{ "nodeRadius": 20, "linkColor": "#000000", "force": { "linkDistance": 60 } }"##,
		)
		.unwrap();
		let config = Config::default().merged(patch);
		assert_eq!(config.node_radius, 20.0);
		assert_eq!(config.collide_radius(), 60.0);
		assert_eq!(config.link_color, "#000000");
		assert_eq!(config.force.link_distance, 60.0);
		assert_eq!(config.force.link_strength, 0.7);
		assert_eq!(config.text_gap, 8.0);
	}

	#[test]
	fn inverted_zoom_bounds_are_swapped() {
		let patch = ConfigPatch {
			min_zoom: Some(4.0),
			max_zoom: Some(2.0),
			..Default::default()
		};
		let config = Config::default().merged(patch);
		assert_eq!((config.min_zoom, config.max_zoom), (2.0, 4.0));
	}

	#[test]
	fn zoom_bounds_stay_positive() {
		let config = Config::default().merged(ConfigPatch {
			min_zoom: Some(0.0),
			..Default::default()
		});
		assert_eq!((config.min_zoom, config.max_zoom), (MIN_SCALE, 3.0));

		let config = Config::default().merged(ConfigPatch {
			min_zoom: Some(-2.0),
			max_zoom: Some(f64::NAN),
			..Default::default()
		});
		assert_eq!((config.min_zoom, config.max_zoom), (MIN_SCALE, MIN_SCALE));
	}

	#[test]
	fn unknown_fields_are_rejected() {
		let err = ConfigPatch::from_json(r#"{ "nodeRaduis": 3 }"#).unwrap_err();
		assert!(matches!(err, TopologyError::Config(_)));
	}
}
