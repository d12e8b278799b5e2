//! Pushes simulation positions into drawn elements.

use super::surface::{DrawingSurface, ElementId, Point, Shape, Transform};

/// Vertical distance between stacked link labels.
const LINK_LABEL_SPACING: f64 = 12.0;
/// Gap between a link line and its first label.
const LINK_LABEL_GAP: f64 = 4.0;

/// Elements drawn for one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeHandles {
	/// Rectangle or circle.
	pub figure: ElementId,
	/// Name label.
	pub label: ElementId,
	/// Secondary description label.
	pub description: ElementId,
}

/// Elements drawn for one link.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkHandles {
	/// Source node index.
	pub source: usize,
	/// Target node index.
	pub target: usize,
	/// Line element.
	pub line: ElementId,
	/// Label elements, in display order.
	pub labels: Vec<ElementId>,
}

/// Every element of one rendered graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneHandles {
	/// Node elements, indexed like the nodes.
	pub nodes: Vec<NodeHandles>,
	/// Link elements.
	pub links: Vec<LinkHandles>,
}

/// Rounds `value` to the nearest multiple of `grid`. Ties go toward positive infinity on both
/// sides of zero, so `-10` snaps to `0` on a 20-unit grid.
pub fn snap_to_grid(value: f64, grid: f64) -> f64 {
	if grid <= 0.0 || !grid.is_finite() {
		return value;
	}
	(value / grid + 0.5).floor() * grid
}

/// Rotation in degrees that lays text along `from -> to` without turning it upside down.
pub fn upright_angle(from: Point, to: Point) -> f64 {
	let angle = (to.y - from.y).atan2(to.x - from.x).to_degrees();
	if angle > 90.0 {
		angle - 180.0
	} else if angle < -90.0 {
		angle + 180.0
	} else {
		angle
	}
}

/// Anchor of the `index`-th label of a link, in the label's rotated frame.
pub fn link_label_anchor(index: usize) -> Point {
	Point::new(0.0, -LINK_LABEL_GAP - LINK_LABEL_SPACING * index as f64)
}

/// Per-step update with raw simulation positions.
pub fn on_tick<S: DrawingSurface + ?Sized>(
	surface: &mut S,
	handles: &SceneHandles,
	positions: &[Point],
) {
	apply_positions(surface, handles, positions, |p| p);
}

/// Final update once the simulation settled, with every position snapped to `grid`.
pub fn on_settle<S: DrawingSurface + ?Sized>(
	surface: &mut S,
	handles: &SceneHandles,
	positions: &[Point],
	grid: f64,
) {
	apply_positions(surface, handles, positions, |p| {
		Point::new(snap_to_grid(p.x, grid), snap_to_grid(p.y, grid))
	});
}

fn apply_positions<S, F>(surface: &mut S, handles: &SceneHandles, positions: &[Point], place: F)
where
	S: DrawingSurface + ?Sized,
	F: Fn(Point) -> Point,
{
	for (node, &position) in handles.nodes.iter().zip(positions) {
		let p = place(position);
		let transform = Transform::translate(p.x, p.y);
		surface.set_transform(node.figure, transform);
		surface.set_transform(node.label, transform);
		surface.set_transform(node.description, transform);
	}

	for link in &handles.links {
		let (Some(&from), Some(&to)) = (positions.get(link.source), positions.get(link.target))
		else {
			continue;
		};
		let (from, to) = (place(from), place(to));
		surface.update_shape(link.line, Shape::Line { from, to });

		let mid = from.midpoint(to);
		let transform = Transform::translate(mid.x, mid.y).rotated(upright_angle(from, to));
		for &label in &link.labels {
			surface.set_transform(label, transform);
		}
	}
}
