//! Error taxonomy for the topology engine.

use thiserror::Error;

/// Errors reported by the topology engine.
///
/// None of these are fatal to a running diagram: the failing operation aborts
/// and the engine keeps its prior state. Only [`TopologyError::MissingMountTarget`]
/// and [`TopologyError::MountFailed`] stop `init` from creating an engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopologyError {
	/// The diagram was constructed without a mount target.
	#[error("no mount target configured")]
	MissingMountTarget,

	/// The renderer could not acquire its drawing surface.
	#[error("failed to mount render surface on `{target}`: {reason}")]
	MountFailed { target: String, reason: String },

	/// An operation that needs a live engine ran before `init`.
	#[error("topology is not initialized")]
	NotInitialized,

	/// A link arity type outside `1-1`, `1-N`, `N-1`, `N-N`.
	#[error("invalid link type `{0}` (expected one of 1-1, 1-N, N-1, N-N)")]
	InvalidLinkType(String),

	/// A link endpoint does not name a node in the graph.
	#[error("link `{link}` references missing node `{node}`")]
	DanglingLink { link: String, node: String },

	/// No node or link with the given id.
	#[error("unknown id `{0}`")]
	UnknownId(String),

	/// A configuration or graph document could not be parsed.
	#[error("invalid config: {0}")]
	Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TopologyError>;

impl From<serde_json::Error> for TopologyError {
	fn from(e: serde_json::Error) -> Self {
		TopologyError::Config(e.to_string())
	}
}
