//! Pan and zoom of the whole drawing.

use log::debug;
use serde::{Deserialize, Serialize};

use super::config::ScaleExtent;
use super::surface::{Point, Transform};
use super::types::RenderRequest;

/// Zoom factor and screen translation of the root group.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
	/// Zoom factor.
	pub scale: f64,
	/// Screen position of the graph origin.
	pub translation: Point,
}

impl Default for ViewportState {
	fn default() -> Self {
		Self {
			scale: 1.0,
			translation: Point::default(),
		}
	}
}

impl ViewportState {
	/// Viewport for the first frame of `request` on a surface of `surface_size`.
	///
	/// Each translation axis the host supplies is used as is; a missing axis centres the graph
	/// origin on that axis of the surface.
	pub fn initial_for(
		request: &RenderRequest,
		surface_size: (f64, f64),
		default_scale: f64,
		extent: &ScaleExtent,
	) -> Self {
		let (width, height) = surface_size;
		Self {
			scale: extent.clamp(request.initial_scale.unwrap_or(default_scale)),
			translation: Point::new(
				request.initial_translation.x.unwrap_or(width / 2.0),
				request.initial_translation.y.unwrap_or(height / 2.0),
			),
		}
	}

	/// The `translate ∘ scale` transform for the root group.
	pub fn transform(&self) -> Transform {
		Transform::translate(self.translation.x, self.translation.y).scaled(self.scale)
	}

	/// Graph coordinates under a screen point.
	pub fn screen_to_graph(&self, screen: Point) -> Point {
		Point::new(
			(screen.x - self.translation.x) / self.scale,
			(screen.y - self.translation.y) / self.scale,
		)
	}
}

/// A user gesture on the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
	/// Drag of the background by a screen delta.
	Pan {
		/// Horizontal delta.
		dx: f64,
		/// Vertical delta.
		dy: f64,
	},
	/// Wheel or pinch zoom around a screen point.
	Zoom {
		/// Multiplier applied to the current scale.
		factor: f64,
		/// Screen point that stays fixed.
		anchor: Point,
	},
	/// Double click. Deliberately does not zoom.
	DoubleClick {
		/// Screen point clicked.
		at: Point,
	},
}

/// Owns the viewport of one rendered graph.
#[derive(Clone, Debug)]
pub struct ViewportController {
	initial: ViewportState,
	current: ViewportState,
	extent: ScaleExtent,
}

impl ViewportController {
	/// Starts at `initial`, clamped into `extent`.
	pub fn new(initial: ViewportState, extent: ScaleExtent) -> Self {
		let initial = ViewportState {
			scale: extent.clamp(initial.scale),
			..initial
		};
		Self {
			initial,
			current: initial,
			extent,
		}
	}

	/// Current viewport.
	pub fn state(&self) -> ViewportState {
		self.current
	}

	/// Viewport the graph was first shown with.
	pub fn initial(&self) -> ViewportState {
		self.initial
	}

	/// Zoom bounds.
	pub fn extent(&self) -> ScaleExtent {
		self.extent
	}

	/// Moves the drawing by a screen delta.
	pub fn pan(&mut self, dx: f64, dy: f64) -> ViewportState {
		if dx.is_finite() && dy.is_finite() {
			self.current.translation.x += dx;
			self.current.translation.y += dy;
		}
		self.current
	}

	/// Multiplies the scale by `factor`, keeping `anchor` fixed on screen. The result is clamped.
	pub fn zoom_by(&mut self, factor: f64, anchor: Point) -> ViewportState {
		if !factor.is_finite() || factor <= 0.0 {
			return self.current;
		}
		let scale = self.extent.clamp(self.current.scale * factor);
		let ratio = scale / self.current.scale;
		let t = &mut self.current.translation;
		t.x = anchor.x - (anchor.x - t.x) * ratio;
		t.y = anchor.y - (anchor.y - t.y) * ratio;
		self.current.scale = scale;
		self.current
	}

	/// Sets the scale directly, keeping the translation.
	pub fn zoom_to(&mut self, scale: f64) -> ViewportState {
		self.current.scale = self.extent.clamp(scale);
		self.current
	}

	/// Replaces the viewport, clamping its scale.
	pub fn set(&mut self, state: ViewportState) -> ViewportState {
		self.current = ViewportState {
			scale: self.extent.clamp(state.scale),
			..state
		};
		self.current
	}

	/// Returns to the viewport of the render call.
	pub fn reset(&mut self) -> ViewportState {
		self.current = self.initial;
		self.current
	}

	/// Applies a gesture.
	pub fn apply(&mut self, gesture: Gesture) -> ViewportState {
		match gesture {
			Gesture::Pan { dx, dy } => self.pan(dx, dy),
			Gesture::Zoom { factor, anchor } => self.zoom_by(factor, anchor),
			Gesture::DoubleClick { at } => {
				debug!("double click at ({}, {}) ignored", at.x, at.y);
				self.current
			}
		}
	}
}
