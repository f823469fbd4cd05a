//! Force-directed topology diagram engine.
//!
//! Lays out a graph of devices (nodes) and typed connections (links) with a
//! force simulation and runs the editor around it:
//! - Physics layout with collision, charge, centering and link springs
//! - Pan and zoom with device/graph coordinate conversion
//! - Directional link outlines with arity arrowheads and rotated labels
//! - Hover highlighting, rubber-band selection and interactive link drawing
//! - Named callback slots for host notifications
//!
//! Drawing is delegated to a [`Renderer`]; [`Headless`] runs the engine with
//! no display at all.
//!
//! # Example
//!
//! ```ignore
//! use topo_graph::{Config, GraphData, GraphNode, Headless, LinkRaw, Topology};
//!
//! let data = GraphData {
//!     nodes: vec![GraphNode::new("a", "Core"), GraphNode::new("b", "Edge")],
//!     links: vec![LinkRaw::new("l1", "a", "b", "1-N")],
//! };
//! let mut topology = Topology::new("#topology", Box::new(Headless::default()), data, Config::default());
//! topology.init()?;
//! while topology.tick() {}
//! ```

pub mod config;
pub mod error;
pub mod events;
mod forces;
pub mod geometry;
pub mod highlight;
pub mod interaction;
pub mod link_path;
pub mod render;
pub mod simulation;
pub mod spatial;
mod state;
pub mod theme;
pub mod tooltip;
pub mod types;
pub mod viewport;

pub use config::{Config, ConfigPatch, ForceConfig};
pub use error::{Result, TopologyError};
pub use events::{Callback, Dispatch, EventName, EventPayload, Registration};
pub use geometry::Point;
pub use interaction::InteractionMode;
pub use link_path::{LabelBox, LinkPath, link_path};
pub use render::{Frame, Headless, Renderer, Surface};
pub use simulation::{GraphReport, Removal, Simulation};
pub use state::Topology;
pub use tooltip::Tooltip;
pub use types::{GraphData, GraphNode, IdList, Link, LinkRaw, LinkType, Node, NodeHandle};
pub use viewport::ViewportState;
