//! Label-driven figure sizing, run once per render before the simulation starts.

use super::config::FigureMetrics;
use super::surface::Shape;
use super::types::{Node, NodeKind};

/// Final geometry of one node figure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeGeometry {
	/// Shape relative to the node position.
	pub shape: Shape,
	/// Width derived from the label; set for containers only.
	pub width: Option<f64>,
}

/// Shape construction for one node kind.
pub trait NodeFigure {
	/// Whether the label must be measured before [`NodeFigure::geometry`] is meaningful.
	fn needs_measurement(&self) -> bool;

	/// Shape used before the label has been measured.
	fn initial_shape(&self, recursive: bool, metrics: &FigureMetrics) -> Shape;

	/// Shape once the label width is known (`None` when measuring failed).
	fn geometry(
		&self,
		label_width: Option<f64>,
		recursive: bool,
		metrics: &FigureMetrics,
	) -> NodeGeometry;
}

/// Rounded rectangle sized to its label.
pub struct ContainerFigure;

/// Fixed-radius circle.
pub struct LeafFigure;

fn rounded_rect(width: f64, recursive: bool, metrics: &FigureMetrics) -> Shape {
	Shape::RoundedRect {
		x: -width / 2.0,
		y: -metrics.container_height / 2.0,
		width,
		height: metrics.container_height,
		rx: metrics.corner_radius,
		ry: if recursive {
			metrics.recursive_corner_radius
		} else {
			metrics.corner_radius
		},
	}
}

/// Width of a container whose label measured `label_width`.
///
/// The measurement is rounded up and floored at the minimum label width before the border is
/// added. A failed or nonsensical measurement counts as an empty label. There is no upper cap.
pub fn container_width(label_width: Option<f64>, metrics: &FigureMetrics) -> f64 {
	let text = label_width
		.filter(|w| w.is_finite() && *w >= 0.0)
		.map(f64::ceil)
		.unwrap_or(0.0);
	text.max(metrics.min_label_width) + metrics.border
}

impl NodeFigure for ContainerFigure {
	fn needs_measurement(&self) -> bool {
		true
	}

	fn initial_shape(&self, recursive: bool, metrics: &FigureMetrics) -> Shape {
		rounded_rect(metrics.container_height, recursive, metrics)
	}

	fn geometry(
		&self,
		label_width: Option<f64>,
		recursive: bool,
		metrics: &FigureMetrics,
	) -> NodeGeometry {
		let width = container_width(label_width, metrics);
		NodeGeometry {
			shape: rounded_rect(width, recursive, metrics),
			width: Some(width),
		}
	}
}

impl NodeFigure for LeafFigure {
	fn needs_measurement(&self) -> bool {
		false
	}

	fn initial_shape(&self, _recursive: bool, metrics: &FigureMetrics) -> Shape {
		Shape::Circle {
			r: metrics.leaf_radius,
		}
	}

	fn geometry(&self, _: Option<f64>, recursive: bool, metrics: &FigureMetrics) -> NodeGeometry {
		NodeGeometry {
			shape: self.initial_shape(recursive, metrics),
			width: None,
		}
	}
}

impl NodeKind {
	/// Figure implementation for this kind.
	pub fn figure(self) -> &'static dyn NodeFigure {
		match self {
			NodeKind::Container => &ContainerFigure,
			NodeKind::Leaf => &LeafFigure,
		}
	}
}

/// Computes the geometry of every node from its measured label width.
///
/// `label_widths` is indexed like `nodes`; missing entries count as failed measurements.
pub fn size_nodes(
	nodes: &[Node],
	label_widths: &[Option<f64>],
	rule_name: Option<&str>,
	metrics: &FigureMetrics,
) -> Vec<NodeGeometry> {
	nodes
		.iter()
		.enumerate()
		.map(|(i, node)| {
			let measured = label_widths.get(i).copied().flatten();
			node.kind
				.figure()
				.geometry(measured, node.is_recursive(rule_name), metrics)
		})
		.collect()
}
