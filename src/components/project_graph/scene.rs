//! Retained element list implementing [`DrawingSurface`].
//!
//! The canvas painter walks a [`Scene`] every frame; tests inspect it directly.

use std::fmt::Write as _;

use log::debug;

use super::surface::{DrawingSurface, ElementId, Layer, Point, Shape, Transform};

/// Measures rendered text.
pub trait TextMeasure {
	/// Width of `text` drawn with the style of `class`, `None` if it cannot be measured.
	fn text_width(&self, text: &str, class: &str) -> Option<f64>;
}

/// Every character advances by the same amount.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvance {
	/// Width of one character.
	pub advance: f64,
}

impl Default for FixedAdvance {
	fn default() -> Self {
		Self { advance: 7.0 }
	}
}

impl TextMeasure for FixedAdvance {
	fn text_width(&self, text: &str, _class: &str) -> Option<f64> {
		Some(text.chars().count() as f64 * self.advance)
	}
}

/// Content of an element.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
	/// A geometric shape.
	Shape(Shape),
	/// A text run.
	Text {
		/// The text.
		content: String,
		/// Baseline anchor in element coordinates.
		anchor: Point,
	},
}

/// One drawn element.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
	/// Group the element belongs to.
	pub layer: Layer,
	/// What is drawn.
	pub kind: ElementKind,
	/// Space-separated style classes.
	pub class: String,
	/// Tooltip.
	pub title: Option<String>,
	/// Placement inside the root group.
	pub transform: Transform,
}

impl Element {
	/// Whether `class` is one of the element's classes.
	pub fn has_class(&self, class: &str) -> bool {
		self.class.split_whitespace().any(|c| c == class)
	}

	/// Text content, for text elements.
	pub fn text(&self) -> Option<&str> {
		match &self.kind {
			ElementKind::Text { content, .. } => Some(content),
			ElementKind::Shape(_) => None,
		}
	}
}

/// A message shown instead of, or next to, the drawing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
	/// Style class (`noData`, `noSelection`, ...).
	pub class: String,
	/// Message text.
	pub text: String,
}

/// Retained drawing state of one canvas.
pub struct Scene {
	width: f64,
	height: f64,
	visible: bool,
	root: Transform,
	elements: Vec<Element>,
	messages: Vec<Message>,
	measure: Box<dyn TextMeasure>,
}

impl Scene {
	/// An empty, visible scene of the given size.
	pub fn new(width: f64, height: f64, measure: impl TextMeasure + 'static) -> Self {
		Self {
			width,
			height,
			visible: true,
			root: Transform::IDENTITY,
			elements: Vec::new(),
			messages: Vec::new(),
			measure: Box::new(measure),
		}
	}

	/// Changes the surface size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Whether the drawing area is shown.
	pub fn is_visible(&self) -> bool {
		self.visible
	}

	/// Transform of the root group.
	pub fn root_transform(&self) -> Transform {
		self.root
	}

	/// All elements, in creation order.
	pub fn elements(&self) -> &[Element] {
		&self.elements
	}

	/// Element behind a handle.
	pub fn element(&self, id: ElementId) -> Option<&Element> {
		self.elements.get(id.0)
	}

	/// Elements of one layer, in creation order.
	pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &Element> {
		self.elements.iter().filter(move |e| e.layer == layer)
	}

	/// Transform of an element.
	pub fn transform_of(&self, id: ElementId) -> Option<Transform> {
		self.element(id).map(|e| e.transform)
	}

	/// Shape of a shape element.
	pub fn shape_of(&self, id: ElementId) -> Option<Shape> {
		match self.element(id)?.kind {
			ElementKind::Shape(shape) => Some(shape),
			ElementKind::Text { .. } => None,
		}
	}

	/// Messages currently shown.
	pub fn messages(&self) -> &[Message] {
		&self.messages
	}

	/// Serializes the drawing as a standalone SVG document.
	pub fn to_svg(&self) -> String {
		let mut out = String::new();
		let _ = write!(
			out,
			r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{}" height="{}">"#,
			self.width, self.height
		);
		let _ = write!(out, r#"<g class="topGroup" transform="{}">"#, self.root);
		for layer in Layer::PAINT_ORDER {
			let _ = write!(out, r#"<g class="{}">"#, layer.class());
			for element in self.layer(layer) {
				write_svg_element(&mut out, element);
			}
			out.push_str("</g>");
		}
		out.push_str("</g></svg>");
		out
	}
}

fn escape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			c => out.push(c),
		}
	}
	out
}

fn write_svg_element(out: &mut String, element: &Element) {
	let class = escape(&element.class);
	let title = element
		.title
		.as_deref()
		.map(|t| format!("<title>{}</title>", escape(t)))
		.unwrap_or_default();
	let _ = match &element.kind {
		ElementKind::Shape(Shape::RoundedRect {
			x,
			y,
			width,
			height,
			rx,
			ry,
		}) => write!(
			out,
			r#"<rect class="{class}" transform="{}" x="{x}" y="{y}" width="{width}" height="{height}" rx="{rx}" ry="{ry}">{title}</rect>"#,
			element.transform
		),
		ElementKind::Shape(Shape::Circle { r }) => write!(
			out,
			r#"<circle class="{class}" transform="{}" r="{r}">{title}</circle>"#,
			element.transform
		),
		ElementKind::Shape(Shape::Line { from, to }) => write!(
			out,
			r#"<line class="{class}" x1="{}" y1="{}" x2="{}" y2="{}" />"#,
			from.x, from.y, to.x, to.y
		),
		ElementKind::Text { content, anchor } => write!(
			out,
			r#"<text class="{class}" transform="{}" x="{}" y="{}">{}</text>"#,
			element.transform,
			anchor.x,
			anchor.y,
			escape(content)
		),
	};
}

impl DrawingSurface for Scene {
	fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	fn clear(&mut self) {
		self.elements.clear();
		self.root = Transform::IDENTITY;
	}

	fn set_visible(&mut self, visible: bool) {
		self.visible = visible;
	}

	fn show_message(&mut self, class: &str, text: &str) {
		self.messages.push(Message {
			class: class.to_owned(),
			text: text.to_owned(),
		});
	}

	fn clear_messages(&mut self) {
		self.messages.clear();
	}

	fn create_shape(
		&mut self,
		layer: Layer,
		shape: Shape,
		class: &str,
		title: Option<&str>,
	) -> ElementId {
		self.elements.push(Element {
			layer,
			kind: ElementKind::Shape(shape),
			class: class.to_owned(),
			title: title.map(str::to_owned),
			transform: Transform::IDENTITY,
		});
		ElementId(self.elements.len() - 1)
	}

	fn update_shape(&mut self, id: ElementId, shape: Shape) {
		match self.elements.get_mut(id.0) {
			Some(Element {
				kind: ElementKind::Shape(current),
				..
			}) => *current = shape,
			_ => debug!("update_shape on non-shape element {id:?}"),
		}
	}

	fn create_text(&mut self, layer: Layer, text: &str, class: &str, anchor: Point) -> ElementId {
		self.elements.push(Element {
			layer,
			kind: ElementKind::Text {
				content: text.to_owned(),
				anchor,
			},
			class: class.to_owned(),
			title: None,
			transform: Transform::IDENTITY,
		});
		ElementId(self.elements.len() - 1)
	}

	fn measure_text(&self, id: ElementId) -> Option<f64> {
		let element = self.element(id)?;
		self.measure.text_width(element.text()?, &element.class)
	}

	fn set_transform(&mut self, id: ElementId, transform: Transform) {
		if let Some(element) = self.elements.get_mut(id.0) {
			element.transform = transform;
		}
	}

	fn set_root_transform(&mut self, transform: Transform) {
		self.root = transform;
	}

	fn element_count(&self) -> usize {
		self.elements.len()
	}
}
