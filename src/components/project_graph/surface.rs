//! The boundary between the graph core and whatever actually draws it.
//!
//! Layout and sizing never see this module's trait; only the sync loop and the renderer talk to
//! a [`DrawingSurface`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point or vector in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// Creates a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance to `other`.
	pub fn distance_to(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}

	/// Point halfway to `other`.
	pub fn midpoint(self, other: Point) -> Point {
		Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}
}

/// A 2D affine transform: translate, then rotate (degrees), then scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
	/// Translation.
	pub translate: Point,
	/// Rotation in degrees, clockwise on screen.
	pub rotate: f64,
	/// Uniform scale.
	pub scale: f64,
}

impl Default for Transform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl Transform {
	/// The identity transform.
	pub const IDENTITY: Transform = Transform {
		translate: Point::new(0.0, 0.0),
		rotate: 0.0,
		scale: 1.0,
	};

	/// Pure translation.
	pub const fn translate(x: f64, y: f64) -> Self {
		Transform {
			translate: Point::new(x, y),
			rotate: 0.0,
			scale: 1.0,
		}
	}

	/// Adds a rotation.
	pub fn rotated(mut self, degrees: f64) -> Self {
		self.rotate = degrees;
		self
	}

	/// Adds a uniform scale.
	pub fn scaled(mut self, scale: f64) -> Self {
		self.scale = scale;
		self
	}

	/// Maps a point from the transformed space into the parent space.
	pub fn apply(&self, p: Point) -> Point {
		let (sin, cos) = self.rotate.to_radians().sin_cos();
		let (x, y) = (p.x * self.scale, p.y * self.scale);
		Point::new(
			self.translate.x + x * cos - y * sin,
			self.translate.y + x * sin + y * cos,
		)
	}

	/// Maps a parent-space point back into the transformed space.
	pub fn invert(&self, p: Point) -> Point {
		let (sin, cos) = self.rotate.to_radians().sin_cos();
		let (x, y) = (p.x - self.translate.x, p.y - self.translate.y);
		Point::new(
			(x * cos + y * sin) / self.scale,
			(-x * sin + y * cos) / self.scale,
		)
	}
}

impl fmt::Display for Transform {
	/// SVG `transform` attribute syntax.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "translate({},{})", self.translate.x, self.translate.y)?;
		if self.rotate != 0.0 {
			write!(f, " rotate({})", self.rotate)?;
		}
		if self.scale != 1.0 {
			write!(f, " scale({})", self.scale)?;
		}
		Ok(())
	}
}

/// Geometry of a drawable element, in the element's own coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
	/// Rectangle with rounded corners.
	RoundedRect {
		/// Left edge.
		x: f64,
		/// Top edge.
		y: f64,
		/// Width.
		width: f64,
		/// Height.
		height: f64,
		/// Horizontal corner radius.
		rx: f64,
		/// Vertical corner radius.
		ry: f64,
	},
	/// Circle centred on the origin.
	Circle {
		/// Radius.
		r: f64,
	},
	/// Straight segment.
	Line {
		/// Start point.
		from: Point,
		/// End point.
		to: Point,
	},
}

/// Drawing groups, listed bottom to top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
	/// Link lines.
	Links,
	/// Node figures.
	Figures,
	/// Node labels.
	Labels,
	/// Secondary node descriptions.
	Descriptions,
	/// Text along links.
	LinkLabels,
}

impl Layer {
	/// All layers in paint order.
	pub const PAINT_ORDER: [Layer; 5] = [
		Layer::Links,
		Layer::Figures,
		Layer::Labels,
		Layer::Descriptions,
		Layer::LinkLabels,
	];

	/// Group class name.
	pub fn class(self) -> &'static str {
		match self {
			Layer::Links => "linksHost",
			Layer::Figures => "statesHost",
			Layer::Labels => "textHost",
			Layer::Descriptions => "descriptionHost",
			Layer::LinkLabels => "labelsHost",
		}
	}
}

/// Handle to an element owned by a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(pub usize);

/// What the renderer needs from the host's drawing surface.
pub trait DrawingSurface {
	/// Current width and height of the surface.
	fn size(&self) -> (f64, f64);

	/// Removes every element and resets the root transform.
	fn clear(&mut self);

	/// Shows or hides the drawing area.
	fn set_visible(&mut self, visible: bool);

	/// Shows a text message outside the drawing area.
	fn show_message(&mut self, class: &str, text: &str);

	/// Removes all messages.
	fn clear_messages(&mut self);

	/// Adds a shape to `layer`.
	fn create_shape(
		&mut self,
		layer: Layer,
		shape: Shape,
		class: &str,
		title: Option<&str>,
	) -> ElementId;

	/// Replaces the geometry of an existing shape.
	fn update_shape(&mut self, id: ElementId, shape: Shape);

	/// Adds a text element anchored at `anchor` in its own coordinates.
	fn create_text(&mut self, layer: Layer, text: &str, class: &str, anchor: Point) -> ElementId;

	/// Rendered width of a text element, `None` when it cannot be measured.
	fn measure_text(&self, id: ElementId) -> Option<f64>;

	/// Sets the transform of one element.
	fn set_transform(&mut self, id: ElementId, transform: Transform);

	/// Sets the transform shared by every element.
	fn set_root_transform(&mut self, transform: Transform);

	/// Number of live elements.
	fn element_count(&self) -> usize;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn apply_then_invert() {
		let t = Transform::translate(40.0, -10.0).rotated(30.0).scaled(0.5);
		let p = Point::new(12.0, 7.0);
		let back = t.invert(t.apply(p));
		assert!((back.x - p.x).abs() < 1e-9 && (back.y - p.y).abs() < 1e-9);
	}

	#[test]
	fn svg_syntax() {
		assert_eq!(Transform::translate(1.5, 2.0).to_string(), "translate(1.5,2)");
		assert_eq!(
			Transform::translate(0.0, 0.0).scaled(0.5).to_string(),
			"translate(0,0) scale(0.5)"
		);
		assert_eq!(
			Transform::translate(3.0, 4.0).rotated(-45.0).to_string(),
			"translate(3,4) rotate(-45)"
		);
	}
}
