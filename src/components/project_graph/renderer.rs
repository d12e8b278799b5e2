//! One graph view: builds elements for a render request, animates the layout and owns the
//! viewport.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::config::RendererConfig;
use super::error::GraphError;
use super::layout::{Simulation, TickOutcome};
use super::sizing::{NodeGeometry, size_nodes};
use super::surface::{DrawingSurface, Layer, Point, Shape};
use super::sync::{self, LinkHandles, NodeHandles, SceneHandles, link_label_anchor, snap_to_grid};
use super::types::{Node, RenderRequest, Translation};
use super::viewport::{Gesture, ViewportController, ViewportState};

/// Text shown when the host has no graph to display.
pub const NO_DATA_MESSAGE: &str =
	"No ATN data found (code generation must run at least once in internal or external mode)";

const NO_DATA_CLASS: &str = "noData";
const NO_SELECTION_CLASS: &str = "noSelection";

/// What a call to [`ProjectGraphRenderer::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
	/// Nothing is animating.
	Idle,
	/// Positions moved this frame.
	Animating,
	/// The layout settled this frame and was snapped to the grid.
	Settled,
}

/// Outcome of a render call.
#[derive(Debug, Default)]
pub struct RenderSummary {
	/// Nodes drawn.
	pub nodes: usize,
	/// Links kept after validation.
	pub links: usize,
	/// Ids of nodes flagged recursive.
	pub recursive: Vec<String>,
	/// Problems found in the request; the offending entities were dropped.
	pub issues: Vec<GraphError>,
}

/// Positions and viewport of a shown graph, for restoring it later.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedLayout {
	/// Zoom factor.
	pub scale: f64,
	/// Viewport translation.
	pub translation: Point,
	/// Node positions by node id.
	pub positions: BTreeMap<String, Point>,
}

impl SavedLayout {
	/// Makes `request` reproduce this layout: scale and translation become the initial viewport
	/// and every node without its own pin is pinned at its saved position.
	pub fn apply_to(&self, request: &mut RenderRequest) {
		request.initial_scale = Some(self.scale);
		request.initial_translation = Translation {
			x: Some(self.translation.x),
			y: Some(self.translation.y),
		};
		let Some(graph) = request.graph_data.as_mut() else {
			return;
		};
		for node in &mut graph.nodes {
			if let Some(p) = self.positions.get(&node.id) {
				node.fx = node.fx.or(Some(p.x));
				node.fy = node.fy.or(Some(p.y));
			}
		}
	}
}

struct ActiveGraph {
	nodes: Vec<Node>,
	simulation: Simulation,
	handles: SceneHandles,
	geometry: Vec<NodeGeometry>,
	viewport: ViewportController,
	settled: bool,
}

/// Renders project graphs onto a [`DrawingSurface`].
pub struct ProjectGraphRenderer<S> {
	surface: S,
	config: RendererConfig,
	active: Option<ActiveGraph>,
}

impl<S: DrawingSurface> ProjectGraphRenderer<S> {
	/// Creates a renderer drawing on `surface`.
	pub fn new(surface: S, config: RendererConfig) -> Self {
		Self {
			surface,
			config,
			active: None,
		}
	}

	/// The drawing surface.
	pub fn surface(&self) -> &S {
		&self.surface
	}

	/// The drawing surface, mutably (e.g. to resize it).
	pub fn surface_mut(&mut self) -> &mut S {
		&mut self.surface
	}

	/// Active configuration.
	pub fn config(&self) -> &RendererConfig {
		&self.config
	}

	/// Replaces the old drawing with `request`.
	///
	/// Any running simulation is stopped and every element of the previous graph removed first.
	/// Without graph data the surface is hidden and the "no data" message shown. Otherwise the
	/// layout is warmed up silently and the first frame drawn before returning.
	pub fn render(&mut self, request: RenderRequest) -> RenderSummary {
		if let Some(mut previous) = self.active.take() {
			previous.simulation.stop();
			debug!(
				"discarding previous graph of {} nodes",
				previous.nodes.len()
			);
		}

		let viewport = ViewportController::new(
			ViewportState::initial_for(
				&request,
				self.surface.size(),
				self.config.default_scale,
				&self.config.scale_extent,
			),
			self.config.scale_extent,
		);
		let RenderRequest {
			rule_name,
			max_label_count,
			graph_data,
			..
		} = request;

		let Some(graph) = graph_data else {
			self.surface.clear();
			self.surface.clear_messages();
			self.surface.show_message(NO_DATA_CLASS, NO_DATA_MESSAGE);
			self.surface.set_visible(false);
			info!("no graph data to render");
			return RenderSummary::default();
		};

		self.surface.clear_messages();
		self.surface.set_visible(true);
		self.surface.clear();

		let (graph, issues) = graph.validate();
		let rule_name = rule_name.as_deref();
		let metrics = &self.config.figures;
		self.surface.set_root_transform(viewport.state().transform());

		let figures: Vec<_> = graph
			.nodes
			.iter()
			.map(|node| {
				let recursive = node.is_recursive(rule_name);
				let class = if recursive { "state recursive" } else { "state" };
				let shape = node.kind.figure().initial_shape(recursive, metrics);
				self.surface
					.create_shape(Layer::Figures, shape, class, Some(&node.name))
			})
			.collect();

		let labels: Vec<_> = graph
			.nodes
			.iter()
			.map(|node| {
				self.surface
					.create_text(Layer::Labels, &node.name, "stateLabel", Point::default())
			})
			.collect();

		let widths: Vec<Option<f64>> = graph
			.nodes
			.iter()
			.zip(&labels)
			.map(|(node, &label)| {
				if !node.kind.figure().needs_measurement() {
					return None;
				}
				let width = self.surface.measure_text(label);
				if width.is_none() {
					warn!("could not measure label of node {:?}", node.id);
				}
				width
			})
			.collect();

		let geometry = size_nodes(&graph.nodes, &widths, rule_name, metrics);
		for (&figure, sized) in figures.iter().zip(&geometry) {
			self.surface.update_shape(figure, sized.shape);
		}

		let descriptions: Vec<_> = graph
			.nodes
			.iter()
			.map(|node| {
				self.surface.create_text(
					Layer::Descriptions,
					&node.name,
					"stateTypeLabel",
					Point::new(0.0, metrics.description_offset),
				)
			})
			.collect();

		let nodes = figures
			.into_iter()
			.zip(labels)
			.zip(descriptions)
			.map(|((figure, label), description)| NodeHandles {
				figure,
				label,
				description,
			})
			.collect();

		let links = if self.config.show_links {
			graph
				.links
				.iter()
				.map(|link| {
					let line = self.surface.create_shape(
						Layer::Links,
						Shape::Line {
							from: Point::default(),
							to: Point::default(),
						},
						"transition",
						None,
					);
					let labels = link
						.labels
						.iter()
						.take(max_label_count)
						.enumerate()
						.map(|(i, label)| {
							let class = match &label.class {
								Some(extra) => format!("linkLabel {extra}"),
								None => "linkLabel".to_owned(),
							};
							self.surface.create_text(
								Layer::LinkLabels,
								&label.content,
								&class,
								link_label_anchor(i),
							)
						})
						.collect();
					LinkHandles {
						source: link.source,
						target: link.target,
						line,
						labels,
					}
				})
				.collect()
		} else {
			Vec::new()
		};

		let handles = SceneHandles { nodes, links };

		let mut simulation = Simulation::new(&graph.nodes, &graph.links, &self.config.forces);
		simulation.warm_up(self.config.warmup_ticks);
		let settled = simulation.is_settled();
		if settled {
			sync::on_settle(
				&mut self.surface,
				&handles,
				&simulation.positions(),
				self.config.grid_size,
			);
		} else {
			sync::on_tick(&mut self.surface, &handles, &simulation.positions());
		}

		let recursive: Vec<String> = graph
			.nodes
			.iter()
			.filter(|n| n.is_recursive(rule_name))
			.map(|n| n.id.clone())
			.collect();
		info!(
			"rendered {} nodes, {} links ({} dropped entities)",
			graph.nodes.len(),
			graph.links.len(),
			issues.len()
		);

		let summary = RenderSummary {
			nodes: graph.nodes.len(),
			links: graph.links.len(),
			recursive,
			issues,
		};
		self.active = Some(ActiveGraph {
			nodes: graph.nodes,
			simulation,
			handles,
			geometry,
			viewport,
			settled,
		});
		summary
	}

	/// Hides the drawing behind a "nothing selected" message.
	pub fn show_no_selection(&mut self, text: &str) {
		if let Some(mut previous) = self.active.take() {
			previous.simulation.stop();
		}
		self.surface.clear();
		self.surface.clear_messages();
		self.surface.show_message(NO_SELECTION_CLASS, text);
		self.surface.set_visible(false);
	}

	/// Advances the animation by one simulation step.
	pub fn step(&mut self) -> FrameStatus {
		let Some(active) = self.active.as_mut() else {
			return FrameStatus::Idle;
		};
		if active.settled {
			return FrameStatus::Idle;
		}

		let outcome = active.simulation.tick();
		let positions = active.simulation.positions();
		match outcome {
			TickOutcome::Running => {
				sync::on_tick(&mut self.surface, &active.handles, &positions);
				FrameStatus::Animating
			}
			TickOutcome::Settled => {
				sync::on_settle(
					&mut self.surface,
					&active.handles,
					&positions,
					self.config.grid_size,
				);
				active.settled = true;
				debug!(
					"layout settled after {} ticks",
					active.simulation.iterations()
				);
				FrameStatus::Settled
			}
		}
	}

	/// Steps until the layout settles; returns the number of frames drawn.
	pub fn run_to_settle(&mut self) -> usize {
		let mut frames = 0;
		while self.step() != FrameStatus::Idle {
			frames += 1;
		}
		frames
	}

	/// Whether a layout is still moving.
	pub fn is_animating(&self) -> bool {
		self.active.as_ref().is_some_and(|a| !a.settled)
	}

	/// Simulation ticks performed for the current graph, warm-up included.
	pub fn iterations(&self) -> usize {
		self.active
			.as_ref()
			.map_or(0, |a| a.simulation.iterations())
	}

	/// Positions as currently drawn: raw while animating, snapped once settled.
	pub fn positions(&self) -> Vec<Point> {
		let Some(active) = self.active.as_ref() else {
			return Vec::new();
		};
		let grid = self.config.grid_size;
		active
			.simulation
			.positions()
			.into_iter()
			.map(|p| {
				if active.settled {
					Point::new(snap_to_grid(p.x, grid), snap_to_grid(p.y, grid))
				} else {
					p
				}
			})
			.collect()
	}

	/// Nodes of the current graph, after validation.
	pub fn nodes(&self) -> &[Node] {
		self.active.as_ref().map_or(&[][..], |a| a.nodes.as_slice())
	}

	/// Figure geometry of the current graph.
	pub fn geometry(&self) -> &[NodeGeometry] {
		self.active.as_ref().map_or(&[][..], |a| a.geometry.as_slice())
	}

	/// Element handles of the current graph.
	pub fn handles(&self) -> Option<&SceneHandles> {
		self.active.as_ref().map(|a| &a.handles)
	}

	/// Current viewport.
	pub fn viewport(&self) -> Option<ViewportState> {
		self.active.as_ref().map(|a| a.viewport.state())
	}

	/// Applies a user gesture to the viewport.
	pub fn handle_gesture(&mut self, gesture: Gesture) -> Option<ViewportState> {
		let active = self.active.as_mut()?;
		let state = active.viewport.apply(gesture);
		self.surface.set_root_transform(state.transform());
		Some(state)
	}

	/// Moves the drawing by a screen delta.
	pub fn pan(&mut self, dx: f64, dy: f64) -> Option<ViewportState> {
		self.handle_gesture(Gesture::Pan { dx, dy })
	}

	/// Zooms around a screen point.
	pub fn zoom_by(&mut self, factor: f64, anchor: Point) -> Option<ViewportState> {
		self.handle_gesture(Gesture::Zoom { factor, anchor })
	}

	/// Restores the viewport the graph was rendered with.
	pub fn reset_transformation(&mut self) -> Option<ViewportState> {
		let active = self.active.as_mut()?;
		let state = active.viewport.reset();
		self.surface.set_root_transform(state.transform());
		Some(state)
	}

	/// Captures the current layout so a later render can restore it.
	pub fn snapshot(&self) -> Option<SavedLayout> {
		let active = self.active.as_ref()?;
		let viewport = active.viewport.state();
		let positions = active
			.nodes
			.iter()
			.map(|n| n.id.clone())
			.zip(self.positions())
			.collect();
		Some(SavedLayout {
			scale: viewport.scale,
			translation: viewport.translation,
			positions,
		})
	}
}
