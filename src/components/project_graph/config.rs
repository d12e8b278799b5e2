//! Tunables for the renderer. Defaults reproduce the reference look; a host may override any
//! subset through JSON.

use serde::{Deserialize, Serialize};

use super::error::{GraphError, Result};

/// Forces and cooling schedule of the layout simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceConfig {
	/// Pairwise many-body strength; negative values repel.
	pub charge_strength: f64,
	/// Minimum separation between node centers.
	pub collide_radius: f64,
	/// How strongly overlaps are resolved per pass, in `[0, 1]`.
	pub collide_strength: f64,
	/// Collision passes per tick.
	pub collide_iterations: usize,
	/// Rest length of a link.
	pub link_distance: f64,
	/// Link spring strength.
	pub link_strength: f64,
	/// Starting alpha.
	pub alpha: f64,
	/// The simulation settles once alpha falls below this.
	pub alpha_min: f64,
	/// Fraction of the remaining distance to `alpha_target` covered each tick.
	pub alpha_decay: f64,
	/// Alpha the simulation cools toward.
	pub alpha_target: f64,
	/// Fraction of velocity lost each tick.
	pub velocity_decay: f64,
	/// Upper bound on the distance a node may travel in one tick.
	pub max_velocity: f64,
	/// Hard stop regardless of alpha.
	pub max_iterations: usize,
	/// Seed of the generator used to separate coincident nodes.
	pub seed: u32,
}

impl Default for ForceConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			charge_strength: -400.0,
			collide_radius: 100.0,
			collide_strength: 0.5,
			collide_iterations: 3,
			link_distance: 200.0,
			link_strength: 2.0,
			alpha: 1.0,
			alpha_min,
			alpha_decay: 1.0 - f64::powf(alpha_min, 1.0 / 300.0),
			alpha_target: 0.0,
			velocity_decay: 0.4,
			max_velocity: 100.0,
			max_iterations: 300,
			seed: 1,
		}
	}
}

/// Sizes of the node figures and their labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FigureMetrics {
	/// Narrowest label box of a container.
	pub min_label_width: f64,
	/// Padding added to the label width.
	pub border: f64,
	/// Height of a container rectangle.
	pub container_height: f64,
	/// Corner radius of a container.
	pub corner_radius: f64,
	/// Vertical corner radius of a recursive container.
	pub recursive_corner_radius: f64,
	/// Radius of a leaf circle.
	pub leaf_radius: f64,
	/// Vertical offset of the secondary description label.
	pub description_offset: f64,
}

impl Default for FigureMetrics {
	fn default() -> Self {
		Self {
			min_label_width: 70.0,
			border: 20.0,
			container_height: 50.0,
			corner_radius: 5.0,
			recursive_corner_radius: 20.0,
			leaf_radius: 30.0,
			description_offset: 13.0,
		}
	}
}

/// Allowed zoom range. Requests outside it are clamped.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleExtent {
	/// Smallest scale.
	pub min: f64,
	/// Largest scale.
	pub max: f64,
}

impl Default for ScaleExtent {
	fn default() -> Self {
		Self { min: 0.15, max: 3.0 }
	}
}

impl ScaleExtent {
	/// Whether both bounds are positive, finite and ordered.
	pub fn is_valid(&self) -> bool {
		self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
	}

	/// Clamps `scale` into the range. Non-finite input maps to the nearest bound.
	///
	/// Swapped bounds are reordered and a NaN bound is ignored, so this never panics even for an
	/// extent that failed [`ScaleExtent::is_valid`].
	pub fn clamp(&self, scale: f64) -> f64 {
		let (lo, hi) = (self.min.min(self.max), self.min.max(self.max));
		if scale.is_nan() {
			return lo;
		}
		scale.max(lo).min(hi)
	}
}

/// Complete renderer configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RendererConfig {
	/// Layout forces.
	pub forces: ForceConfig,
	/// Figure sizes.
	pub figures: FigureMetrics,
	/// Zoom bounds.
	pub scale_extent: ScaleExtent,
	/// Scale used when the request carries none.
	pub default_scale: f64,
	/// Grid the settled layout snaps to.
	pub grid_size: f64,
	/// Silent simulation steps before the first frame.
	pub warmup_ticks: usize,
	/// Whether link lines and labels are drawn.
	pub show_links: bool,
}

impl Default for RendererConfig {
	fn default() -> Self {
		Self {
			forces: ForceConfig::default(),
			figures: FigureMetrics::default(),
			scale_extent: ScaleExtent::default(),
			default_scale: 0.5,
			grid_size: 20.0,
			warmup_ticks: 100,
			show_links: true,
		}
	}
}

impl RendererConfig {
	/// Reads a configuration, filling anything missing from the defaults.
	///
	/// A scale extent that is inverted, non-positive or non-finite is rejected.
	pub fn from_json(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json).map_err(GraphError::Config)?;
		if !config.scale_extent.is_valid() {
			return Err(GraphError::ScaleExtent {
				min: config.scale_extent.min,
				max: config.scale_extent.max,
			});
		}
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn alpha_decay_reaches_min_in_300_ticks() {
		let forces = ForceConfig::default();
		let alpha = (0..300).fold(forces.alpha, |a, _| a + (forces.alpha_target - a) * forces.alpha_decay);
		assert!((alpha - forces.alpha_min).abs() < 1e-9);
	}

	#[test]
	fn partial_override_keeps_defaults() {
		let config =
			RendererConfig::from_json(r#"{ "gridSize": 10, "forces": { "chargeStrength": -50 } }"#)
				.unwrap();
		assert_eq!(config.grid_size, 10.0);
		assert_eq!(config.forces.charge_strength, -50.0);
		assert_eq!(config.forces.link_distance, 200.0);
		assert_eq!(config.warmup_ticks, 100);
		assert_eq!(config.scale_extent, ScaleExtent::default());
	}

	#[test]
	fn bad_override_is_reported() {
		let err = RendererConfig::from_json(r#"{ "gridSize": "wide" }"#).unwrap_err();
		assert!(matches!(err, GraphError::Config(_)));
	}

	#[test]
	fn extent_clamps() {
		let extent = ScaleExtent::default();
		assert_eq!(extent.clamp(10.0), 3.0);
		assert_eq!(extent.clamp(0.0), 0.15);
		assert_eq!(extent.clamp(f64::NAN), 0.15);
		assert_eq!(extent.clamp(f64::INFINITY), 3.0);
		assert_eq!(extent.clamp(1.2), 1.2);
	}

	#[test]
	fn inverted_extent_is_rejected() {
		let err = RendererConfig::from_json(r#"{ "scaleExtent": { "min": 3, "max": 0.15 } }"#)
			.unwrap_err();
		assert!(matches!(err, GraphError::ScaleExtent { min, max } if min == 3.0 && max == 0.15));
		assert!(RendererConfig::from_json(r#"{ "scaleExtent": { "min": 0, "max": 2 } }"#).is_err());
		assert!(RendererConfig::from_json(r#"{ "scaleExtent": { "min": 0.5, "max": 0.5 } }"#).is_ok());
	}

	#[test]
	fn inverted_extent_still_clamps() {
		let extent = ScaleExtent { min: 3.0, max: 0.15 };
		assert!(!extent.is_valid());
		assert_eq!(extent.clamp(10.0), 3.0);
		assert_eq!(extent.clamp(0.0), 0.15);
		assert_eq!(extent.clamp(1.0), 1.0);
		assert_eq!(extent.clamp(f64::NAN), 0.15);

		let open = ScaleExtent { min: f64::NAN, max: 2.0 };
		assert_eq!(open.clamp(5.0), 2.0);
		assert_eq!(open.clamp(f64::NAN), 2.0);
	}
}
