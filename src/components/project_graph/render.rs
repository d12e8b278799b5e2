use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scene::{Element, ElementKind, Scene, TextMeasure};
use super::surface::{DrawingSurface, Layer, Shape, Transform};

const BACKGROUND: &str = "#1a1a2e";

/// Font used for a text element of the given classes.
pub fn font_for(class: &str) -> &'static str {
	if class.contains("stateTypeLabel") {
		"10px sans-serif"
	} else if class.contains("linkLabel") {
		"11px sans-serif"
	} else {
		"14px sans-serif"
	}
}

/// Measures text with the canvas' own font metrics.
pub struct CanvasTextMeasure {
	ctx: CanvasRenderingContext2d,
}

impl CanvasTextMeasure {
	/// Measures with `ctx`.
	pub fn new(ctx: CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}
}

impl TextMeasure for CanvasTextMeasure {
	fn text_width(&self, text: &str, class: &str) -> Option<f64> {
		self.ctx.set_font(font_for(class));
		self.ctx.measure_text(text).ok().map(|m| m.width())
	}
}

/// Paints the whole scene.
pub fn paint(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let (width, height) = scene.size();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);

	if !scene.is_visible() {
		draw_messages(scene, ctx);
		return;
	}

	ctx.save();
	apply_transform(ctx, &scene.root_transform());
	for layer in Layer::PAINT_ORDER {
		for element in scene.layer(layer) {
			draw_element(element, ctx);
		}
	}
	ctx.restore();
}

fn apply_transform(ctx: &CanvasRenderingContext2d, t: &Transform) {
	let _ = ctx.translate(t.translate.x, t.translate.y);
	if t.rotate != 0.0 {
		let _ = ctx.rotate(t.rotate.to_radians());
	}
	if t.scale != 1.0 {
		let _ = ctx.scale(t.scale, t.scale);
	}
}

fn draw_messages(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
	ctx.set_font("14px sans-serif");
	ctx.set_text_align("left");
	ctx.set_text_baseline("alphabetic");
	for (i, message) in scene.messages().iter().enumerate() {
		let _ = ctx.fill_text(&message.text, 16.0, 28.0 + 20.0 * i as f64);
	}
}

fn figure_colors(element: &Element) -> (&'static str, &'static str) {
	if element.has_class("recursive") {
		("#5b2d4e", "#ff7eb6")
	} else if matches!(element.kind, ElementKind::Shape(Shape::Circle { .. })) {
		("#7a4a12", "#ff7f0e")
	} else {
		("#1f3b57", "#64b4ff")
	}
}

fn draw_element(element: &Element, ctx: &CanvasRenderingContext2d) {
	ctx.save();
	apply_transform(ctx, &element.transform);
	match &element.kind {
		ElementKind::Shape(Shape::RoundedRect {
			x,
			y,
			width,
			height,
			rx,
			ry,
		}) => {
			rounded_rect_path(ctx, *x, *y, *width, *height, *rx, *ry);
			fill_and_stroke(element, ctx);
		}
		ElementKind::Shape(Shape::Circle { r }) => {
			ctx.begin_path();
			let _ = ctx.arc(0.0, 0.0, *r, 0.0, 2.0 * PI);
			fill_and_stroke(element, ctx);
		}
		ElementKind::Shape(Shape::Line { from, to }) => {
			ctx.set_stroke_style_str("rgba(100, 180, 255, 0.6)");
			ctx.set_line_width(1.5);
			ctx.begin_path();
			ctx.move_to(from.x, from.y);
			ctx.line_to(to.x, to.y);
			ctx.stroke();
		}
		ElementKind::Text { content, anchor } => {
			let alpha = if element.has_class("stateTypeLabel") {
				0.6
			} else {
				0.9
			};
			ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha));
			ctx.set_font(font_for(&element.class));
			ctx.set_text_align("center");
			ctx.set_text_baseline("middle");
			let _ = ctx.fill_text(content, anchor.x, anchor.y);
		}
	}
	ctx.restore();
}

fn fill_and_stroke(element: &Element, ctx: &CanvasRenderingContext2d) {
	let (fill, stroke) = figure_colors(element);
	ctx.set_fill_style_str(fill);
	ctx.fill();
	ctx.set_stroke_style_str(stroke);
	ctx.set_line_width(2.0);
	ctx.stroke();
}

fn rounded_rect_path(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	width: f64,
	height: f64,
	rx: f64,
	ry: f64,
) {
	let (rx, ry) = (rx.min(width / 2.0), ry.min(height / 2.0));
	ctx.begin_path();
	ctx.move_to(x + rx, y);
	ctx.line_to(x + width - rx, y);
	let _ = ctx.ellipse(x + width - rx, y + ry, rx, ry, 0.0, -PI / 2.0, 0.0);
	ctx.line_to(x + width, y + height - ry);
	let _ = ctx.ellipse(x + width - rx, y + height - ry, rx, ry, 0.0, 0.0, PI / 2.0);
	ctx.line_to(x + rx, y + height);
	let _ = ctx.ellipse(x + rx, y + height - ry, rx, ry, 0.0, PI / 2.0, PI);
	ctx.line_to(x, y + ry);
	let _ = ctx.ellipse(x + rx, y + ry, rx, ry, 0.0, PI, 1.5 * PI);
	ctx.close_path();
}
