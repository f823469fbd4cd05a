//! Hover highlight and selection feedback.
//!
//! Classification only: the propagator decides which nodes and links are
//! emphasized and which are dimmed, the renderer decides what that looks like.

use std::collections::HashSet;

use super::types::{Link, NodeHandle};

/// The entity the pointer is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
	Node(NodeHandle),
	/// A link, by its index in the link list.
	Link(usize),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NodeDisplay {
	/// The hovered node itself.
	ActiveFocal,
	Active,
	Dimmed,
	#[default]
	Neutral,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkDisplay {
	Active,
	Dimmed,
	#[default]
	Neutral,
}

/// Display state of every node and link, indexed like the simulation lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayStates {
	pub nodes: Vec<NodeDisplay>,
	pub links: Vec<LinkDisplay>,
}

impl DisplayStates {
	/// Everything neutral.
	pub fn neutral(node_count: usize, link_count: usize) -> Self {
		Self {
			nodes: vec![NodeDisplay::Neutral; node_count],
			links: vec![LinkDisplay::Neutral; link_count],
		}
	}

	pub fn node(&self, handle: NodeHandle) -> NodeDisplay {
		self.nodes.get(handle.0).copied().unwrap_or_default()
	}

	pub fn link(&self, index: usize) -> LinkDisplay {
		self.links.get(index).copied().unwrap_or_default()
	}

	pub fn is_neutral(&self) -> bool {
		self.nodes.iter().all(|d| *d == NodeDisplay::Neutral)
			&& self.links.iter().all(|d| *d == LinkDisplay::Neutral)
	}
}

/// Classify every node and link for a hover on `focus`.
///
/// The relevance set is the focal node plus every node one link away. With
/// `engage` false, or no focus, everything is neutral.
pub fn propagate(
	focus: Option<Focus>,
	engage: bool,
	node_count: usize,
	links: &[Link],
) -> DisplayStates {
	let Some(focus) = focus.filter(|_| engage) else {
		return DisplayStates::neutral(node_count, links.len());
	};
	let mut states = DisplayStates {
		nodes: vec![NodeDisplay::Dimmed; node_count],
		links: vec![LinkDisplay::Dimmed; links.len()],
	};

	match focus {
		Focus::Node(focal) => {
			for (i, link) in links.iter().enumerate() {
				if let Some(other) = link.other_end(focal) {
					states.links[i] = LinkDisplay::Active;
					mark(&mut states.nodes, other, NodeDisplay::Active);
				}
			}
			mark(&mut states.nodes, focal, NodeDisplay::ActiveFocal);
		}
		Focus::Link(index) => {
			if let Some(link) = links.get(index) {
				states.links[index] = LinkDisplay::Active;
				mark(&mut states.nodes, link.source, NodeDisplay::Active);
				mark(&mut states.nodes, link.target, NodeDisplay::Active);
			}
		}
	}
	states
}

/// Box-select feedback: selected nodes and links among them are active, the
/// rest dimmed.
pub fn selection(selected: &HashSet<NodeHandle>, node_count: usize, links: &[Link]) -> DisplayStates {
	DisplayStates {
		nodes: (0..node_count)
			.map(|i| {
				if selected.contains(&NodeHandle(i)) {
					NodeDisplay::Active
				} else {
					NodeDisplay::Dimmed
				}
			})
			.collect(),
		links: links
			.iter()
			.map(|l| {
				if selected.contains(&l.source) && selected.contains(&l.target) {
					LinkDisplay::Active
				} else {
					LinkDisplay::Dimmed
				}
			})
			.collect(),
	}
}

fn mark(nodes: &mut [NodeDisplay], handle: NodeHandle, display: NodeDisplay) {
	if let Some(slot) = nodes.get_mut(handle.0) {
		*slot = display;
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeMap;

	use super::*;

	fn link(id: &str, s: usize, t: usize) -> Link {
		Link {
			id: id.into(),
			name: String::new(),
			source: NodeHandle(s),
			target: NodeHandle(t),
			link_type: "N-N".into(),
			tip_info: BTreeMap::new(),
		}
	}

	// x=0 -- a=1 -- b=2, c=3 isolated, a -- b
	fn fixture() -> Vec<Link> {
		vec![link("xa", 0, 1), link("bx", 2, 0), link("ab", 1, 2)]
	}

	#[test]
	fn engaging_a_node_activates_exactly_its_links() {
		let links = fixture();
		let states = propagate(Some(Focus::Node(NodeHandle(0))), true, 4, &links);
		assert_eq!(states.links, vec![LinkDisplay::Active, LinkDisplay::Active, LinkDisplay::Dimmed]);
		assert_eq!(
			states.nodes,
			vec![NodeDisplay::ActiveFocal, NodeDisplay::Active, NodeDisplay::Active, NodeDisplay::Dimmed]
		);
	}

	#[test]
	fn disengaging_resets_everything() {
		let links = fixture();
		assert!(propagate(Some(Focus::Node(NodeHandle(0))), false, 4, &links).is_neutral());
		assert!(propagate(None, true, 4, &links).is_neutral());
	}

	#[test]
	fn link_focus_lights_the_link_and_its_ends() {
		let links = fixture();
		let states = propagate(Some(Focus::Link(2)), true, 4, &links);
		assert_eq!(states.links, vec![LinkDisplay::Dimmed, LinkDisplay::Dimmed, LinkDisplay::Active]);
		assert_eq!(states.node(NodeHandle(1)), NodeDisplay::Active);
		assert_eq!(states.node(NodeHandle(2)), NodeDisplay::Active);
		assert_eq!(states.node(NodeHandle(0)), NodeDisplay::Dimmed);
	}

	#[test]
	fn self_loop_keeps_the_focal_state() {
		let links = vec![link("loop", 0, 0)];
		let states = propagate(Some(Focus::Node(NodeHandle(0))), true, 1, &links);
		assert_eq!(states.nodes, vec![NodeDisplay::ActiveFocal]);
		assert_eq!(states.links, vec![LinkDisplay::Active]);
	}

	#[test]
	fn selection_needs_both_ends() {
		let links = fixture();
		let selected: HashSet<_> = [NodeHandle(0), NodeHandle(1)].into();
		let states = selection(&selected, 4, &links);
		assert_eq!(states.links, vec![LinkDisplay::Active, LinkDisplay::Dimmed, LinkDisplay::Dimmed]);
		assert_eq!(states.node(NodeHandle(3)), NodeDisplay::Dimmed);
	}
}
