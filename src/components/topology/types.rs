//! Graph data structures: the host-facing input forms and the resolved forms
//! the simulation works on.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{Result, TopologyError};
use super::geometry::Point;

/// A node as supplied by the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Unique identifier. Links reference nodes by this id.
	pub id: String,
	/// Display name, painted under the node.
	pub name: String,
	/// Optional icon reference. Loading it is up to the renderer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub img: Option<String>,
	/// Initial position. Missing coordinates are seeded by the simulation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
}

impl GraphNode {
	pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			img: None,
			x: None,
			y: None,
		}
	}

	/// Seed the node at a known position.
	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.x = Some(x);
		self.y = Some(y);
		self
	}
}

fn default_link_type() -> String {
	LinkType::ManyToMany.to_string()
}

/// A link as supplied by the host: endpoints are node ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRaw {
	pub id: String,
	/// Label painted at the middle of the link.
	#[serde(default)]
	pub name: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Arity type, one of `1-1`, `1-N`, `N-1`, `N-N`. Kept as the host's string
	/// and validated when the link path is computed.
	#[serde(default = "default_link_type")]
	pub link_type: String,
	/// Key/value pairs shown in the link tooltip.
	#[serde(default)]
	pub tip_info: BTreeMap<String, String>,
}

impl LinkRaw {
	pub fn new(
		id: impl Into<String>,
		source: impl Into<String>,
		target: impl Into<String>,
		link_type: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			name: String::new(),
			source: source.into(),
			target: target.into(),
			link_type: link_type.into(),
			tip_info: BTreeMap::new(),
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	pub fn with_tip(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.tip_info.insert(key.into(), value.into());
		self
	}

	/// Attach this link to the node set described by `index`.
	///
	/// Fails with [`TopologyError::DanglingLink`] naming the first endpoint
	/// that is not in the index.
	pub fn resolve(&self, index: &HashMap<String, NodeHandle>) -> Result<Link> {
		let handle = |id: &String| {
			index.get(id).copied().ok_or_else(|| TopologyError::DanglingLink {
				link: self.id.clone(),
				node: id.clone(),
			})
		};
		Ok(Link {
			id: self.id.clone(),
			name: self.name.clone(),
			source: handle(&self.source)?,
			target: handle(&self.target)?,
			link_type: self.link_type.clone(),
			tip_info: self.tip_info.clone(),
		})
	}
}

/// Position of a node inside the simulation's node list.
///
/// Handles are only valid for the node list they were resolved against; the
/// simulation re-resolves every link whenever the node list changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(pub(crate) usize);

impl NodeHandle {
	pub fn index(self) -> usize {
		self.0
	}
}

/// A node tracked by the simulation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
	pub id: String,
	pub name: String,
	pub img: Option<String>,
	pub x: f64,
	pub y: f64,
	/// Velocity, owned by the simulation.
	pub vx: f64,
	pub vy: f64,
	/// Pin override. While set the node sits at `(fx, fy)` regardless of forces.
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

impl Node {
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}

	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}

	/// Freeze the node at its current position.
	pub fn pin(&mut self) {
		self.pin_at(self.x, self.y);
	}

	pub fn pin_at(&mut self, x: f64, y: f64) {
		self.fx = Some(x);
		self.fy = Some(y);
	}

	pub fn unpin(&mut self) {
		self.fx = None;
		self.fy = None;
	}

	/// The host form of this node, carrying its current position.
	pub fn to_graph_node(&self) -> GraphNode {
		GraphNode {
			id: self.id.clone(),
			name: self.name.clone(),
			img: self.img.clone(),
			x: Some(self.x),
			y: Some(self.y),
		}
	}
}

/// A link whose endpoints have been resolved to nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
	pub id: String,
	pub name: String,
	pub source: NodeHandle,
	pub target: NodeHandle,
	pub link_type: String,
	pub tip_info: BTreeMap<String, String>,
}

impl Link {
	/// Detach from the node list, turning handles back into ids.
	pub fn to_raw(&self, nodes: &[Node]) -> LinkRaw {
		LinkRaw {
			id: self.id.clone(),
			name: self.name.clone(),
			source: nodes[self.source.0].id.clone(),
			target: nodes[self.target.0].id.clone(),
			link_type: self.link_type.clone(),
			tip_info: self.tip_info.clone(),
		}
	}

	pub fn touches(&self, handle: NodeHandle) -> bool {
		self.source == handle || self.target == handle
	}

	/// The endpoint opposite `handle`, if the link touches it.
	pub fn other_end(&self, handle: NodeHandle) -> Option<NodeHandle> {
		if self.source == handle {
			Some(self.target)
		} else if self.target == handle {
			Some(self.source)
		} else {
			None
		}
	}
}

/// Which ends of a link carry an arrowhead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkType {
	OneToOne,
	OneToMany,
	ManyToOne,
	ManyToMany,
}

/// One end of a link: `One` is drawn as a plain stub, `Many` as an arrowhead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
	One,
	Many,
}

impl LinkType {
	pub fn source_arity(self) -> Arity {
		match self {
			LinkType::OneToOne | LinkType::OneToMany => Arity::One,
			LinkType::ManyToOne | LinkType::ManyToMany => Arity::Many,
		}
	}

	pub fn target_arity(self) -> Arity {
		match self {
			LinkType::OneToOne | LinkType::ManyToOne => Arity::One,
			LinkType::OneToMany | LinkType::ManyToMany => Arity::Many,
		}
	}
}

impl FromStr for LinkType {
	type Err = TopologyError;

	fn from_str(s: &str) -> Result<Self> {
		match s {
			"1-1" => Ok(LinkType::OneToOne),
			"1-N" => Ok(LinkType::OneToMany),
			"N-1" => Ok(LinkType::ManyToOne),
			"N-N" => Ok(LinkType::ManyToMany),
			other => Err(TopologyError::InvalidLinkType(other.to_string())),
		}
	}
}

impl fmt::Display for LinkType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			LinkType::OneToOne => "1-1",
			LinkType::OneToMany => "1-N",
			LinkType::ManyToOne => "N-1",
			LinkType::ManyToMany => "N-N",
		})
	}
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	#[serde(default)]
	pub links: Vec<LinkRaw>,
}

impl GraphData {
	/// Parse `{ "nodes": [...], "links": [...] }`.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

/// Ids accepted by deletion: one bare id or a list of them.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdList {
	One(String),
	Many(Vec<String>),
}

impl IdList {
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	pub fn into_vec(self) -> Vec<String> {
		match self {
			IdList::One(id) => vec![id],
			IdList::Many(ids) => ids,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn link_type_parses_the_four_arities() {
		for s in ["1-1", "1-N", "N-1", "N-N"] {
			let parsed: LinkType = s.parse().unwrap();
			assert_eq!(parsed.to_string(), s);
		}
		assert_eq!(
			"1-2".parse::<LinkType>(),
			Err(TopologyError::InvalidLinkType("1-2".into()))
		);
	}

	#[test]
	fn arity_of_each_end() {
		assert_eq!(LinkType::OneToMany.source_arity(), Arity::One);
		assert_eq!(LinkType::OneToMany.target_arity(), Arity::Many);
		assert_eq!(LinkType::ManyToOne.source_arity(), Arity::Many);
		assert_eq!(LinkType::ManyToOne.target_arity(), Arity::One);
	}

	#[test]
	fn resolve_reports_the_missing_endpoint() {
		let index: HashMap<String, NodeHandle> = [("a".to_string(), NodeHandle(0))].into();
		let ok = LinkRaw::new("l1", "a", "a", "1-1").resolve(&index).unwrap();
		assert_eq!(ok.source, NodeHandle(0));

		let err = LinkRaw::new("l2", "a", "zz", "1-1").resolve(&index).unwrap_err();
		assert_eq!(
			err,
			TopologyError::DanglingLink {
				link: "l2".into(),
				node: "zz".into()
			}
		);
	}

	#[test]
	fn graph_data_from_host_json() {
		let data = GraphData::from_json(
			r#"{
				"nodes": [{ "id": "a", "name": "A", "x": 1.5 }, { "id": "b", "name": "B" }],
				"links": [{ "id": "l", "source": "a", "target": "b", "tipInfo": { "port": "80" } }]
			}"#,
		)
		.unwrap();
		assert_eq!(data.nodes[0].x, Some(1.5));
		assert_eq!(data.nodes[1].x, None);
		assert_eq!(data.links[0].link_type, "N-N");
		assert_eq!(data.links[0].tip_info["port"], "80");
	}

	#[test]
	fn id_list_takes_a_bare_id_or_an_array() {
		assert_eq!(IdList::from_json(r#""a""#).unwrap().into_vec(), vec!["a"]);
		assert_eq!(IdList::from_json(r#"["a", "b"]"#).unwrap().into_vec(), vec!["a", "b"]);
		assert!(IdList::from_json(r#"["a", 3]"#).is_err());
		assert!(IdList::from_json("null").is_err());
	}
}
