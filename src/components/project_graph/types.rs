//! Plain data exchanged with the host: nodes, links and the render request.

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::GraphError;

/// The two node kinds the project graph knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum NodeKind {
	/// A Qute template, drawn as a label-sized rounded rectangle.
	Container,
	/// A Java method, drawn as a fixed-size circle.
	Leaf,
}

impl TryFrom<u8> for NodeKind {
	type Error = String;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(NodeKind::Container),
			1 => Ok(NodeKind::Leaf),
			other => Err(format!("unknown node type {other}")),
		}
	}
}

impl From<NodeKind> for u8 {
	fn from(kind: NodeKind) -> u8 {
		match kind {
			NodeKind::Container => 0,
			NodeKind::Leaf => 1,
		}
	}
}

/// A graph node as sent by the host. Layout state is kept elsewhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Unique id within one graph. Numeric ids are accepted and stored as text.
	#[serde(deserialize_with = "id_from_string_or_number")]
	pub id: String,
	/// Display label.
	pub name: String,
	/// Node kind, `type` on the wire. Anything but a template is drawn as a method.
	#[serde(rename = "type", default = "leaf_kind", deserialize_with = "lenient_kind")]
	pub kind: NodeKind,
	/// Pinned x coordinate.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fx: Option<f64>,
	/// Pinned y coordinate.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub fy: Option<f64>,
}

impl Node {
	/// Creates an unpinned node.
	pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			kind,
			fx: None,
			fy: None,
		}
	}

	/// Pins the node on both axes.
	pub fn pinned(mut self, fx: f64, fy: f64) -> Self {
		self.fx = Some(fx);
		self.fy = Some(fy);
		self
	}

	/// A node is recursive when it carries the name of the rule being shown.
	pub fn is_recursive(&self, rule_name: Option<&str>) -> bool {
		rule_name.is_some_and(|rule| rule == self.name)
	}
}

fn leaf_kind() -> NodeKind {
	NodeKind::Leaf
}

fn lenient_kind<'de, D>(deserializer: D) -> Result<NodeKind, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = serde_json::Value::deserialize(deserializer)?;
	Ok(match raw.as_u64().map(u8::try_from) {
		Some(Ok(value)) => NodeKind::try_from(value).unwrap_or_else(|err| {
			warn!("{err}, drawing it as a method");
			NodeKind::Leaf
		}),
		_ => {
			warn!("unknown node type {raw}, drawing it as a method");
			NodeKind::Leaf
		}
	})
}

/// Reads a link endpoint; anything but a non-negative integer becomes [`Link::UNRESOLVED`].
fn lenient_endpoint<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = serde_json::Value::deserialize(deserializer)?;
	Ok(raw
		.as_u64()
		.and_then(|i| usize::try_from(i).ok())
		.unwrap_or(Link::UNRESOLVED))
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum RawId {
		Text(String),
		Int(i64),
		Float(f64),
	}

	Ok(match RawId::deserialize(deserializer)? {
		RawId::Text(s) => s,
		RawId::Int(i) => i.to_string(),
		RawId::Float(f) => f.to_string(),
	})
}

/// One piece of text shown along a link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkLabel {
	/// Text content.
	pub content: String,
	/// Optional extra style class.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub class: Option<String>,
}

/// A directed link between two nodes, addressed by index into the node list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
	/// Index of the source node.
	#[serde(deserialize_with = "lenient_endpoint")]
	pub source: usize,
	/// Index of the target node.
	#[serde(deserialize_with = "lenient_endpoint")]
	pub target: usize,
	/// Labels, in display order.
	#[serde(default)]
	pub labels: Vec<LinkLabel>,
}

impl Link {
	/// Endpoint value for a host index that is not a node index at all (negative, fractional,
	/// text). Validation drops such links.
	pub const UNRESOLVED: usize = usize::MAX;

	/// Creates an unlabeled link.
	pub fn new(source: usize, target: usize) -> Self {
		Self {
			source,
			target,
			labels: Vec::new(),
		}
	}

	/// True when both ends are the same node.
	pub fn is_self_loop(&self) -> bool {
		self.source == self.target
	}
}

/// Nodes and links for one render pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// All nodes.
	pub nodes: Vec<Node>,
	/// All links.
	#[serde(default)]
	pub links: Vec<Link>,
}

/// A graph whose ids are unique and whose links all resolve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidatedGraph {
	/// Nodes with unique ids.
	pub nodes: Vec<Node>,
	/// Links whose endpoints index into `nodes`.
	pub links: Vec<Link>,
}

impl GraphData {
	/// Drops duplicate nodes and dangling links, reporting each problem.
	///
	/// A later node reusing an id is dropped and links pointing at it are redirected to the
	/// first node with that id. Links with an endpoint outside the node list are dropped. A
	/// single bad entity never prevents the rest of the graph from being shown.
	pub fn validate(self) -> (ValidatedGraph, Vec<GraphError>) {
		let mut issues = Vec::new();
		let mut first_by_id: HashMap<String, usize> = HashMap::new();
		let mut remap = Vec::with_capacity(self.nodes.len());
		let mut nodes = Vec::with_capacity(self.nodes.len());

		for node in self.nodes {
			match first_by_id.get(&node.id) {
				Some(&kept) => {
					warn!("dropping node with duplicate id {:?}", node.id);
					issues.push(GraphError::DuplicateNodeId { id: node.id });
					remap.push(kept);
				}
				None => {
					first_by_id.insert(node.id.clone(), nodes.len());
					remap.push(nodes.len());
					nodes.push(node);
				}
			}
		}

		let node_count = remap.len();
		let mut links = Vec::with_capacity(self.links.len());
		for (index, mut link) in self.links.into_iter().enumerate() {
			if link.source == Link::UNRESOLVED || link.target == Link::UNRESOLVED {
				warn!("dropping link {index}: endpoint is not a node index");
				issues.push(GraphError::UnresolvedLink { index });
				continue;
			}
			match (remap.get(link.source), remap.get(link.target)) {
				(Some(&source), Some(&target)) => {
					link.source = source;
					link.target = target;
					links.push(link);
				}
				_ => {
					warn!(
						"dropping link {index} ({} -> {}): only {node_count} nodes",
						link.source, link.target
					);
					issues.push(GraphError::DanglingLink {
						index,
						from: link.source,
						to: link.target,
						node_count,
					});
				}
			}
		}

		(ValidatedGraph { nodes, links }, issues)
	}
}

/// Optional per-axis initial translation of the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Translation {
	/// Horizontal translation in screen units.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	/// Vertical translation in screen units.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
}

fn default_max_label_count() -> usize {
	3
}

/// Everything the host sends for one render call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
	/// Name of the rule being shown; nodes carrying it are flagged recursive.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rule_name: Option<String>,
	/// Upper bound of labels drawn per link.
	#[serde(default = "default_max_label_count")]
	pub max_label_count: usize,
	/// The graph; `None` shows the "no data" placeholder.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub graph_data: Option<GraphData>,
	/// Initial zoom factor.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub initial_scale: Option<f64>,
	/// Initial translation, per axis.
	#[serde(default)]
	pub initial_translation: Translation,
}

impl Default for RenderRequest {
	fn default() -> Self {
		Self {
			rule_name: None,
			max_label_count: default_max_label_count(),
			graph_data: None,
			initial_scale: None,
			initial_translation: Translation::default(),
		}
	}
}

impl RenderRequest {
	/// A request that draws `graph`.
	pub fn with_graph(graph: GraphData) -> Self {
		Self {
			graph_data: Some(graph),
			..Self::default()
		}
	}

	/// Sets the rule name.
	pub fn rule_name(mut self, rule_name: impl Into<String>) -> Self {
		self.rule_name = Some(rule_name.into());
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_host_payload() {
		let json = r#"{
			"uri": "file:///project/src/main/resources/templates/hello.html",
			"ruleName": "main",
			"maxLabelCount": 5,
			"graphData": {
				"nodes": [
					{ "name": "main", "id": "1", "type": 0 },
					{ "name": "@MyClass", "id": 2, "type": 1, "fx": 10.5 }
				],
				"links": [ { "source": 0, "target": 1, "labels": [ { "content": "calls", "class": "call" } ] } ]
			},
			"initialScale": 0.75,
			"initialTranslation": { "x": 12 }
		}"#;

		let request: RenderRequest = serde_json::from_str(json).unwrap();
		assert_eq!(request.rule_name.as_deref(), Some("main"));
		assert_eq!(request.max_label_count, 5);
		assert_eq!(request.initial_scale, Some(0.75));
		assert_eq!(request.initial_translation.x, Some(12.0));
		assert_eq!(request.initial_translation.y, None);

		let graph = request.graph_data.unwrap();
		assert_eq!(graph.nodes[0].kind, NodeKind::Container);
		assert_eq!(graph.nodes[1].id, "2");
		assert_eq!(graph.nodes[1].kind, NodeKind::Leaf);
		assert_eq!(graph.nodes[1].fx, Some(10.5));
		assert_eq!(graph.links[0].labels[0].class.as_deref(), Some("call"));
	}

	#[test]
	fn missing_fields_take_defaults() {
		let request: RenderRequest = serde_json::from_str("{}").unwrap();
		assert_eq!(request, RenderRequest::default());
		assert_eq!(request.max_label_count, 3);
	}

	#[test]
	fn unknown_node_type_is_drawn_as_method() {
		let json = r#"{ "nodes": [
			{ "name": "x", "id": "1", "type": 7 },
			{ "name": "y", "id": "2", "type": "rule" },
			{ "name": "z", "id": "3" },
			{ "name": "t", "id": "4", "type": 0 }
		] }"#;
		let graph: GraphData = serde_json::from_str(json).unwrap();
		let kinds: Vec<_> = graph.nodes.iter().map(|n| n.kind).collect();
		assert_eq!(
			kinds,
			[NodeKind::Leaf, NodeKind::Leaf, NodeKind::Leaf, NodeKind::Container]
		);
	}

	#[test]
	fn bad_link_endpoint_drops_only_that_link() {
		let json = r#"{
			"nodes": [ { "name": "a", "id": "a", "type": 0 }, { "name": "b", "id": "b", "type": 1 } ],
			"links": [
				{ "source": 0, "target": 1 },
				{ "source": -1, "target": 1 },
				{ "source": 1, "target": "a" },
				{ "source": 1.5, "target": 0 }
			]
		}"#;
		let graph: GraphData = serde_json::from_str(json).unwrap();
		assert_eq!(graph.links[1].source, Link::UNRESOLVED);

		let (valid, issues) = graph.validate();
		assert_eq!(valid.links, vec![Link::new(0, 1)]);
		let dropped: Vec<_> = issues
			.iter()
			.map(|issue| match issue {
				GraphError::UnresolvedLink { index } => *index,
				other => panic!("unexpected {other:?}"),
			})
			.collect();
		assert_eq!(dropped, [1, 2, 3]);
	}

	#[test]
	fn recursion_matches_rule_name() {
		let node = Node::new("1", "main", NodeKind::Container);
		assert!(node.is_recursive(Some("main")));
		assert!(!node.is_recursive(Some("other")));
		assert!(!node.is_recursive(None));
	}

	#[test]
	fn validation_drops_dangling_links() {
		let graph = GraphData {
			nodes: vec![
				Node::new("a", "A", NodeKind::Container),
				Node::new("b", "B", NodeKind::Leaf),
			],
			links: vec![Link::new(0, 1), Link::new(1, 5), Link::new(1, 1)],
		};

		let (valid, issues) = graph.validate();
		assert_eq!(valid.links, vec![Link::new(0, 1), Link::new(1, 1)]);
		assert_eq!(issues.len(), 1);
		assert!(matches!(
			issues[0],
			GraphError::DanglingLink {
				index: 1,
				to: 5,
				..
			}
		));
	}

	#[test]
	fn validation_merges_duplicate_ids() {
		let graph = GraphData {
			nodes: vec![
				Node::new("a", "A", NodeKind::Container),
				Node::new("b", "B", NodeKind::Leaf),
				Node::new("a", "A again", NodeKind::Leaf),
				Node::new("c", "C", NodeKind::Leaf),
			],
			links: vec![Link::new(2, 3), Link::new(3, 1)],
		};

		let (valid, issues) = graph.validate();
		let ids: Vec<_> = valid.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["a", "b", "c"]);
		assert_eq!(valid.links, vec![Link::new(0, 2), Link::new(2, 1)]);
		assert!(matches!(&issues[0], GraphError::DuplicateNodeId { id } if id == "a"));
	}
}
