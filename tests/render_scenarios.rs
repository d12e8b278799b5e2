//! End-to-end render calls against a retained scene.

use std::collections::HashMap;

use qute_project_graph::components::project_graph::scene::{FixedAdvance, TextMeasure};
use qute_project_graph::components::project_graph::sizing::NodeGeometry;
use qute_project_graph::components::project_graph::surface::{DrawingSurface, Layer, Shape, Transform};
use qute_project_graph::components::project_graph::{
	FrameStatus, GraphData, Link, LinkLabel, NO_DATA_MESSAGE, Node, NodeKind, ProjectGraphRenderer,
	RenderRequest, RendererConfig, Scene,
};

/// Widths looked up by label text; unknown labels cannot be measured.
struct KnownWidths(HashMap<&'static str, f64>);

impl TextMeasure for KnownWidths {
	fn text_width(&self, text: &str, _class: &str) -> Option<f64> {
		self.0.get(text).copied()
	}
}

fn renderer() -> ProjectGraphRenderer<Scene> {
	ProjectGraphRenderer::new(
		Scene::new(800.0, 600.0, FixedAdvance::default()),
		RendererConfig::default(),
	)
}

fn width(geometry: &NodeGeometry) -> f64 {
	match geometry.shape {
		Shape::RoundedRect { x, width, .. } => {
			assert_eq!(x, -width / 2.0);
			width
		}
		other => panic!("not a container: {other:?}"),
	}
}

#[test]
fn no_data_hides_surface() {
	let mut r = renderer();
	r.render(RenderRequest::default());

	let scene = r.surface();
	assert!(!scene.is_visible());
	assert_eq!(scene.element_count(), 0);
	assert!(scene.messages().iter().any(|m| m.text == NO_DATA_MESSAGE));
	assert!(NO_DATA_MESSAGE.starts_with("No ATN data found"));
}

#[test]
fn two_node_graph() {
	let graph = GraphData {
		nodes: vec![
			Node::new("a", "A", NodeKind::Container),
			Node::new("b", "B", NodeKind::Container),
		],
		links: vec![Link::new(0, 1)],
	};
	let mut r = renderer();
	let summary = r.render(RenderRequest::with_graph(graph).rule_name("A"));

	assert_eq!(summary.recursive, vec!["a".to_owned()]);
	let scene = r.surface();
	assert_eq!(scene.layer(Layer::Figures).count(), 2);
	assert_eq!(scene.layer(Layer::Labels).count(), 2);
	let recursive: Vec<_> = scene
		.layer(Layer::Figures)
		.map(|e| e.has_class("recursive"))
		.collect();
	assert_eq!(recursive, [true, false]);
	assert_eq!(r.iterations(), 100);
}

#[test]
fn second_render_replaces_first() {
	let first = GraphData {
		nodes: (0..6)
			.map(|i| Node::new(i.to_string(), format!("t{i}"), NodeKind::Container))
			.collect(),
		links: (1..6).map(|i| Link::new(0, i)).collect(),
	};
	let second = GraphData {
		nodes: vec![
			Node::new("x", "x", NodeKind::Leaf),
			Node::new("y", "y", NodeKind::Container),
		],
		links: vec![Link {
			source: 1,
			target: 0,
			labels: vec![LinkLabel {
				content: "calls".into(),
				class: None,
			}],
		}],
	};

	let mut r = renderer();
	r.render(RenderRequest::with_graph(first));
	r.step();
	r.render(RenderRequest::with_graph(second));

	// Three elements per node, one line plus one label for the link.
	assert_eq!(r.surface().element_count(), 2 * 3 + 2);
	assert_eq!(r.nodes().len(), 2);
	assert_eq!(r.iterations(), 100);
}

#[test]
fn container_widths_follow_measured_labels() {
	let measure = KnownWidths(HashMap::from([("wide label", 120.0), ("", 0.0)]));
	let mut r = ProjectGraphRenderer::new(
		Scene::new(800.0, 600.0, measure),
		RendererConfig::default(),
	);
	r.render(RenderRequest::with_graph(GraphData {
		nodes: vec![
			Node::new("1", "wide label", NodeKind::Container),
			Node::new("2", "", NodeKind::Container),
			Node::new("3", "unmeasurable", NodeKind::Container),
			Node::new("4", "method", NodeKind::Leaf),
		],
		links: vec![],
	}));

	let geometry = r.geometry();
	assert_eq!(width(&geometry[0]), 140.0);
	assert_eq!(width(&geometry[1]), 90.0);
	assert_eq!(width(&geometry[2]), 90.0);
	assert_eq!(geometry[3].shape, Shape::Circle { r: 30.0 });

	let handles = r.handles().unwrap();
	assert_eq!(
		r.surface().shape_of(handles.nodes[0].figure),
		Some(geometry[0].shape)
	);
}

#[test]
fn self_loops_render_and_settle() {
	let graph = GraphData {
		nodes: vec![
			Node::new("1", "main", NodeKind::Container),
			Node::new("2", "@Item#price", NodeKind::Leaf),
		],
		links: vec![Link::new(0, 0), Link::new(0, 1)],
	};
	let mut r = renderer();
	r.render(RenderRequest::with_graph(graph));
	let mut last = FrameStatus::Animating;
	while r.is_animating() {
		last = r.step();
	}
	assert_eq!(last, FrameStatus::Settled);
	for p in r.positions() {
		assert!(p.x.is_finite() && p.y.is_finite());
		assert_eq!(p.x % 20.0, 0.0);
	}
}

#[test]
fn pinned_nodes_render_at_their_pin() {
	let graph = GraphData {
		nodes: vec![
			Node::new("start", "start", NodeKind::Container).pinned(-1000.0, 0.0),
			Node::new("mid", "mid", NodeKind::Leaf),
			Node::new("stop", "stop", NodeKind::Container).pinned(1000.0, 0.0),
		],
		links: vec![Link::new(0, 1), Link::new(1, 2)],
	};
	let mut r = renderer();
	r.render(RenderRequest::with_graph(graph));
	r.run_to_settle();
	let positions = r.positions();
	assert_eq!((positions[0].x, positions[0].y), (-1000.0, 0.0));
	assert_eq!((positions[2].x, positions[2].y), (1000.0, 0.0));
}

#[test]
fn negative_pins_snap_half_up() {
	let graph = GraphData {
		nodes: vec![
			Node::new("a", "a", NodeKind::Container).pinned(-1010.0, -30.0),
			Node::new("b", "b", NodeKind::Leaf).pinned(10.0, 30.0),
		],
		links: vec![Link::new(0, 1)],
	};
	let mut r = renderer();
	r.render(RenderRequest::with_graph(graph));
	r.run_to_settle();

	let positions = r.positions();
	assert_eq!((positions[0].x, positions[0].y), (-1000.0, -20.0));
	assert_eq!((positions[1].x, positions[1].y), (20.0, 40.0));
	let handles = r.handles().unwrap();
	assert_eq!(
		r.surface().transform_of(handles.nodes[0].figure),
		Some(Transform::translate(-1000.0, -20.0))
	);
}
