/// Problems found in host-supplied data.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
	/// A link endpoint does not index a node.
	#[error("link {index} ({from} -> {to}) points outside the {node_count} nodes of the graph")]
	DanglingLink {
		/// Position of the link in the host's link list.
		index: usize,
		/// Source index as sent.
		from: usize,
		/// Target index as sent.
		to: usize,
		/// Number of nodes the host sent.
		node_count: usize,
	},
	/// A link endpoint is not a node index at all.
	#[error("link {index} has an endpoint that is not a node index")]
	UnresolvedLink {
		/// Position of the link in the host's link list.
		index: usize,
	},
	/// Two nodes share an id.
	#[error("node id {id:?} is used more than once")]
	DuplicateNodeId {
		/// The repeated id.
		id: String,
	},
	/// A host message could not be decoded.
	#[error("malformed host message: {0}")]
	Message(#[from] serde_json::Error),
	/// A configuration names an unusable zoom range.
	#[error("scale extent [{min}, {max}] must be positive, finite and ordered")]
	ScaleExtent {
		/// Requested lower bound.
		min: f64,
		/// Requested upper bound.
		max: f64,
	},
	/// A configuration override could not be decoded.
	#[error("malformed renderer configuration: {0}")]
	Config(serde_json::Error),
}

/// Result alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
