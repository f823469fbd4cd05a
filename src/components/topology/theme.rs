//! Style variables handed to the renderer.
//!
//! The core never paints, but it owns the mapping from [`Config`] colors and
//! sizes to the named style variables a renderer applies (CSS custom
//! properties in a browser). The map is rebuilt on every config merge.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use log::warn;

use super::config::Config;

/// Opacity of dimmed nodes and links.
pub const DIMMED_OPACITY: f64 = 0.3;

/// Node radius multiplier for a one-shot emphasis.
pub const EMPHASIS_SCALE: f64 = 1.1;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Parse `#rgb`, `#rrggbb`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
	pub fn parse(s: &str) -> Option<Self> {
		let s = s.trim();
		if let Some(hex) = s.strip_prefix('#') {
			let channel = |i: usize, len: usize| {
				let digits = hex.get(i * len..(i + 1) * len)?;
				let v = u8::from_str_radix(digits, 16).ok()?;
				Some(if len == 1 { v * 17 } else { v })
			};
			let len = match hex.len() {
				3 => 1,
				6 => 2,
				_ => return None,
			};
			return Some(Self::rgb(channel(0, len)?, channel(1, len)?, channel(2, len)?));
		}
		let body = s
			.strip_prefix("rgba(")
			.or_else(|| s.strip_prefix("rgb("))?
			.strip_suffix(')')?;
		let parts: Vec<&str> = body.split(',').map(str::trim).collect();
		let channel = |i: usize| parts.get(i)?.parse::<u8>().ok();
		let a = match parts.len() {
			3 => 1.0,
			4 => parts[3].parse::<f64>().ok()?.clamp(0.0, 1.0),
			_ => return None,
		};
		Some(Self::rgba(channel(0)?, channel(1)?, channel(2)?, a))
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Named style variables, sorted by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleVars {
	vars: BTreeMap<&'static str, String>,
}

/// Values not driven by [`Config`].
const BASE_VARS: &[(&str, &str)] = &[
	("--color-primary", "#ff6b81"),
	("--color-primary-active", "#1e90ff"),
	("--border-width", "4px"),
	("--node-ring-width", "4px"),
	("--node-bg-color", "white"),
	("--link-width-active", "6px"),
	("--link-text-size", "12px"),
	("--link-text-color", "rgba(46, 204, 113, 1)"),
	("--text-color-primary", "rgba(44, 62, 80, 1)"),
	("--tip-bg-color", "#3a3a3a"),
	("--tip-text-color", "white"),
	("--tip-text-size", "12px"),
	("--shadow-md", "2px 2px 10px rgba(10, 10, 10, 0.2)"),
];

impl StyleVars {
	pub fn from_config(config: &Config) -> Self {
		let mut vars: BTreeMap<&'static str, String> =
			BASE_VARS.iter().map(|&(k, v)| (k, v.to_string())).collect();

		vars.insert("--bg-color", config.container_bg.clone());
		vars.insert("--bg-color-stop", config.container_bg_edit.clone());
		vars.insert("--node-ring-color", config.node_ring_color.clone());
		for key in [
			"--node-ring-color-active",
			"--node-bg-color-active",
			"--link-line-color-active",
			"--link-text-color-active",
		] {
			vars.insert(key, config.highlight_color.clone());
		}
		vars.insert("--link-line-color", config.link_color.clone());
		vars.insert("--link-width", format!("{}px", config.link_width));
		vars.insert("--text-size-md", format!("{}px", config.font_size));

		match Color::parse(&config.link_color) {
			Some(color) => {
				vars.insert(
					"--link-line-color-dimmed",
					color.with_alpha(DIMMED_OPACITY).to_css(),
				);
			}
			None => warn!(
				"topo-graph: cannot parse link color `{}`, no dimmed variant",
				config.link_color
			),
		}
		if let Some(color) = Color::parse(&config.highlight_color) {
			vars.insert("--node-bg-color-hover", color.lighten(0.6).to_css());
		}
		Self { vars }
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.vars.get(name).map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
		self.vars.iter().map(|(k, v)| (*k, v.as_str()))
	}

	pub fn len(&self) -> usize {
		self.vars.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vars.is_empty()
	}

	/// `--name: value; ...`, suitable for an inline `style` attribute.
	pub fn to_inline_style(&self) -> String {
		let mut out = String::new();
		for (k, v) in &self.vars {
			let _ = write!(out, "{k}: {v}; ");
		}
		out.truncate(out.trim_end().len());
		out
	}
}
