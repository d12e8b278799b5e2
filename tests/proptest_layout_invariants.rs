//! Property-based invariants of the layout core.
//!
//! 1. Grid snap is idempotent and lands on multiples of the grid.
//! 2. Zoom never leaves the configured scale range.
//! 3. Nodes pinned on both axes stay exactly on their pin.
//! 4. Identical inputs produce identical warmed-up layouts.
//! 5. Positions stay finite for arbitrary graphs, self-loops included.
//! 6. Container width is at least the floored label width plus the border.

use proptest::prelude::*;
use qute_project_graph::components::project_graph::config::{FigureMetrics, ForceConfig, ScaleExtent};
use qute_project_graph::components::project_graph::layout::Simulation;
use qute_project_graph::components::project_graph::sizing::container_width;
use qute_project_graph::components::project_graph::surface::Point;
use qute_project_graph::components::project_graph::sync::snap_to_grid;
use qute_project_graph::components::project_graph::viewport::{
	Gesture, ViewportController, ViewportState,
};
use qute_project_graph::components::project_graph::{Link, Node, NodeKind};

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_kind() -> impl Strategy<Value = NodeKind> {
	prop_oneof![Just(NodeKind::Container), Just(NodeKind::Leaf)]
}

fn arb_graph(max_nodes: usize) -> impl Strategy<Value = (Vec<Node>, Vec<Link>)> {
	(1..=max_nodes).prop_flat_map(|n| {
		let nodes = prop::collection::vec(
			(arb_kind(), prop::option::of((-500.0..500.0f64, -500.0..500.0f64))),
			n,
		);
		let links = prop::collection::vec((0..n, 0..n), 0..(2 * n));
		(nodes, links).prop_map(|(nodes, links)| {
			let nodes = nodes
				.into_iter()
				.enumerate()
				.map(|(i, (kind, pin))| {
					let node = Node::new(i.to_string(), format!("n{i}"), kind);
					match pin {
						Some((x, y)) => node.pinned(x, y),
						None => node,
					}
				})
				.collect();
			let links = links.into_iter().map(|(s, t)| Link::new(s, t)).collect();
			(nodes, links)
		})
	})
}

fn arb_gesture() -> impl Strategy<Value = Gesture> {
	prop_oneof![
		(-1e4..1e4f64, -1e4..1e4f64).prop_map(|(dx, dy)| Gesture::Pan { dx, dy }),
		(0.01..100.0f64, -1e3..1e3f64, -1e3..1e3f64).prop_map(|(factor, x, y)| Gesture::Zoom {
			factor,
			anchor: Point::new(x, y),
		}),
		(-1e3..1e3f64, -1e3..1e3f64).prop_map(|(x, y)| Gesture::DoubleClick {
			at: Point::new(x, y),
		}),
	]
}

proptest! {
	#[test]
	fn snap_is_idempotent_and_on_grid(v in -1e9..1e9f64) {
		let once = snap_to_grid(v, 20.0);
		prop_assert_eq!(snap_to_grid(once, 20.0), once);
		prop_assert_eq!(once % 20.0, 0.0);
		prop_assert!((once - v).abs() <= 10.0);
	}

	#[test]
	fn zoom_stays_in_range(
		start in 0.0..10.0f64,
		gestures in prop::collection::vec(arb_gesture(), 0..40),
	) {
		let extent = ScaleExtent::default();
		let mut vp = ViewportController::new(
			ViewportState { scale: start, translation: Point::default() },
			extent,
		);
		for gesture in gestures {
			let state = vp.apply(gesture);
			prop_assert!(state.scale >= 0.15 && state.scale <= 3.0);
			prop_assert!(state.translation.x.is_finite() && state.translation.y.is_finite());
		}
		prop_assert_eq!(vp.reset(), vp.initial());
	}

	#[test]
	fn pins_hold_and_layout_is_finite((nodes, links) in arb_graph(12), ticks in 0usize..150) {
		let mut sim = Simulation::new(&nodes, &links, &ForceConfig::default());
		sim.warm_up(ticks);
		for (node, p) in nodes.iter().zip(sim.positions()) {
			prop_assert!(p.x.is_finite() && p.y.is_finite());
			if let (Some(fx), Some(fy)) = (node.fx, node.fy) {
				prop_assert_eq!(p, Point::new(fx, fy));
			}
		}
	}

	#[test]
	fn warm_up_is_deterministic((nodes, links) in arb_graph(10)) {
		let config = ForceConfig::default();
		let mut a = Simulation::new(&nodes, &links, &config);
		let mut b = Simulation::new(&nodes, &links, &config);
		a.warm_up(100);
		b.warm_up(100);
		prop_assert_eq!(a.positions(), b.positions());
	}

	#[test]
	fn container_width_has_floor_and_border(measured in prop::option::of(0.0..2000.0f64)) {
		let metrics = FigureMetrics::default();
		let w = container_width(measured, &metrics);
		prop_assert!(w >= measured.unwrap_or(0.0).max(70.0) + 20.0);
		prop_assert!(w >= 90.0);
	}
}
