//! Named callback slots for host notifications.
//!
//! Each [`EventName`] holds at most one callback. Registering over a filled
//! slot replaces it, and dispatching to an empty slot delivers nothing; both
//! outcomes are reported to the caller instead of passing silently.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use super::types::{GraphNode, LinkRaw};

/// Slot names. The three built-in slots are driven by the interaction modes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventName {
	/// A connect-link drag was released on a target node.
	AddLink,
	/// A box selection was released.
	BoxSelect,
	/// Any press on the canvas, nodes or links. Hosts close context menus on it.
	CloseMenu,
	/// Host-defined slot.
	Custom(String),
}

impl EventName {
	pub fn as_str(&self) -> &str {
		match self {
			EventName::AddLink => "add-link",
			EventName::BoxSelect => "box-select",
			EventName::CloseMenu => "close-menu",
			EventName::Custom(name) => name,
		}
	}
}

impl From<&str> for EventName {
	fn from(name: &str) -> Self {
		match name {
			"add-link" => EventName::AddLink,
			"box-select" => EventName::BoxSelect,
			"close-menu" => EventName::CloseMenu,
			other => EventName::Custom(other.to_string()),
		}
	}
}

impl fmt::Display for EventName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What a callback receives.
#[derive(Clone, Debug, PartialEq)]
pub enum EventPayload {
	/// Candidate link; the graph is not changed, the host decides.
	AddLink { source: GraphNode, target: GraphNode },
	BoxSelect {
		nodes: Vec<GraphNode>,
		links: Vec<LinkRaw>,
	},
	CloseMenu,
	Custom(serde_json::Value),
}

pub type Callback = Box<dyn FnMut(&EventPayload)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
	Inserted,
	/// The slot already held a callback, which was dropped.
	Replaced,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
	Delivered,
	NoHandler,
}

/// Single-slot callback registry.
#[derive(Default)]
pub struct EventRegistry {
	slots: HashMap<EventName, Callback>,
}

impl EventRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, name: EventName, callback: Callback) -> Registration {
		match self.slots.insert(name, callback) {
			Some(_) => Registration::Replaced,
			None => Registration::Inserted,
		}
	}

	/// Empty one slot, or every slot when `name` is `None`. Returns how many
	/// callbacks were dropped.
	pub fn clear(&mut self, name: Option<&EventName>) -> usize {
		match name {
			Some(name) => usize::from(self.slots.remove(name).is_some()),
			None => {
				let n = self.slots.len();
				self.slots.clear();
				n
			}
		}
	}

	pub fn contains(&self, name: &EventName) -> bool {
		self.slots.contains_key(name)
	}

	pub fn dispatch(&mut self, name: &EventName, payload: &EventPayload) -> Dispatch {
		match self.slots.get_mut(name) {
			Some(callback) => {
				callback(payload);
				Dispatch::Delivered
			}
			None => {
				debug!("topo-graph: no handler for `{name}`");
				Dispatch::NoHandler
			}
		}
	}
}

impl fmt::Debug for EventRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventRegistry")
			.field("slots", &self.slots.keys().collect::<Vec<_>>())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	#[test]
	fn register_reports_replacement() {
		let mut registry = EventRegistry::new();
		assert_eq!(registry.register(EventName::CloseMenu, Box::new(|_| {})), Registration::Inserted);
		assert_eq!(registry.register(EventName::CloseMenu, Box::new(|_| {})), Registration::Replaced);
	}

	#[test]
	fn only_the_latest_callback_runs() {
		let hits = Rc::new(RefCell::new(Vec::new()));
		let mut registry = EventRegistry::new();
		for tag in ["first", "second"] {
			let hits = Rc::clone(&hits);
			registry.register(EventName::CloseMenu, Box::new(move |_| hits.borrow_mut().push(tag)));
		}
		assert_eq!(registry.dispatch(&EventName::CloseMenu, &EventPayload::CloseMenu), Dispatch::Delivered);
		assert_eq!(*hits.borrow(), vec!["second"]);
	}

	#[test]
	fn empty_slots_report_no_handler() {
		let mut registry = EventRegistry::new();
		assert_eq!(registry.dispatch(&EventName::AddLink, &EventPayload::CloseMenu), Dispatch::NoHandler);
	}

	#[test]
	fn clear_one_or_all() {
		let mut registry = EventRegistry::new();
		registry.register(EventName::AddLink, Box::new(|_| {}));
		registry.register(EventName::BoxSelect, Box::new(|_| {}));
		registry.register("zoomed".into(), Box::new(|_| {}));
		assert_eq!(registry.clear(Some(&EventName::AddLink)), 1);
		assert_eq!(registry.clear(Some(&EventName::AddLink)), 0);
		assert!(registry.contains(&EventName::Custom("zoomed".into())));
		assert_eq!(registry.clear(None), 2);
		assert!(!registry.contains(&EventName::BoxSelect));
	}

	#[test]
	fn names_round_trip_through_strings() {
		for name in [EventName::AddLink, EventName::BoxSelect, EventName::CloseMenu, EventName::Custom("x".into())] {
			assert_eq!(EventName::from(name.as_str()), name);
		}
	}
}
