//! Force-directed layout.
//!
//! The simulation never touches the host's [`Node`] values. Positions and velocities live in a
//! [`LayoutState`] arena indexed like the node slice, with an id lookup on the side. Forces
//! follow the usual many-body / collide / link model with an alpha cooling schedule, evaluated
//! pairwise (graphs shown here are small).

use std::collections::HashMap;
use std::f64::consts::PI;

use log::{debug, warn};

use super::config::ForceConfig;
use super::surface::Point;
use super::types::{Link, Node};

const INITIAL_RADIUS: f64 = 10.0;
const DISTANCE_MIN2: f64 = 1.0;

/// Simulation working state of one node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
	/// Current x.
	pub x: f64,
	/// Current y.
	pub y: f64,
	/// Current x velocity.
	pub vx: f64,
	/// Current y velocity.
	pub vy: f64,
	/// Pinned x, if any.
	pub fx: Option<f64>,
	/// Pinned y, if any.
	pub fy: Option<f64>,
}

impl Particle {
	/// Current position.
	pub fn position(&self) -> Point {
		Point::new(self.x, self.y)
	}
}

/// Particles of every node plus an id index.
#[derive(Clone, Debug, Default)]
pub struct LayoutState {
	particles: Vec<Particle>,
	by_id: HashMap<String, usize>,
}

impl LayoutState {
	/// Number of particles.
	pub fn len(&self) -> usize {
		self.particles.len()
	}

	/// True when there are no particles.
	pub fn is_empty(&self) -> bool {
		self.particles.is_empty()
	}

	/// All particles, in node order.
	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// Particle at `index`.
	pub fn get(&self, index: usize) -> Option<&Particle> {
		self.particles.get(index)
	}

	/// Particle of the node with `id`.
	pub fn by_id(&self, id: &str) -> Option<&Particle> {
		self.by_id.get(id).and_then(|&i| self.particles.get(i))
	}

	/// Index of the node with `id`.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.by_id.get(id).copied()
	}
}

/// Result of a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
	/// More ticks are needed.
	Running,
	/// Alpha dropped below its minimum, the tick limit was hit or the simulation was stopped.
	Settled,
}

/// Linear congruential generator, used only to separate coincident nodes.
#[derive(Clone, Debug)]
struct Lcg(u32);

impl Lcg {
	fn next(&mut self) -> f64 {
		self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		self.0 as f64 / 4_294_967_296.0
	}

	fn jiggle(&mut self) -> f64 {
		let j = (self.next() - 0.5) * 1e-6;
		if j == 0.0 { 1e-6 } else { j }
	}
}

/// An iterative force simulation over one graph.
#[derive(Clone, Debug)]
pub struct Simulation {
	state: LayoutState,
	links: Vec<(usize, usize)>,
	bias: Vec<f64>,
	forces: ForceConfig,
	alpha: f64,
	iterations: usize,
	random: Lcg,
	stopped: bool,
}

impl Simulation {
	/// Sets up a simulation. Unpinned nodes start on a phyllotaxis spiral around the origin,
	/// pinned axes start at their pin. Links with an endpoint outside `nodes` are ignored.
	pub fn new(nodes: &[Node], links: &[Link], forces: &ForceConfig) -> Self {
		let initial_angle = PI * (3.0 - 5f64.sqrt());
		let mut by_id = HashMap::with_capacity(nodes.len());
		let particles = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				by_id.entry(node.id.clone()).or_insert(i);
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * initial_angle;
				Particle {
					x: node.fx.unwrap_or(radius * angle.cos()),
					y: node.fy.unwrap_or(radius * angle.sin()),
					vx: 0.0,
					vy: 0.0,
					fx: node.fx,
					fy: node.fy,
				}
			})
			.collect::<Vec<_>>();

		let n = particles.len();
		let links: Vec<(usize, usize)> = links
			.iter()
			.filter_map(|link| {
				if link.source < n && link.target < n {
					Some((link.source, link.target))
				} else {
					warn!("layout ignores link {} -> {}", link.source, link.target);
					None
				}
			})
			.collect();

		let mut degree = vec![0usize; n];
		for &(s, t) in &links {
			degree[s] += 1;
			degree[t] += 1;
		}
		let bias = links
			.iter()
			.map(|&(s, t)| degree[s] as f64 / (degree[s] + degree[t]) as f64)
			.collect();

		Self {
			state: LayoutState { particles, by_id },
			links,
			bias,
			forces: forces.clone(),
			alpha: forces.alpha,
			iterations: 0,
			random: Lcg(forces.seed),
			stopped: false,
		}
	}

	/// Current alpha.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Ticks performed so far, warm-up included.
	pub fn iterations(&self) -> usize {
		self.iterations
	}

	/// Whether further ticks would do nothing.
	pub fn is_settled(&self) -> bool {
		self.stopped
			|| self.alpha < self.forces.alpha_min
			|| self.iterations >= self.forces.max_iterations
	}

	/// Stops the simulation; later ticks are no-ops.
	pub fn stop(&mut self) {
		self.stopped = true;
	}

	/// Raises alpha again so a settled layout resumes moving.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = alpha;
		self.iterations = 0;
		self.stopped = false;
	}

	/// Layout state.
	pub fn state(&self) -> &LayoutState {
		&self.state
	}

	/// Positions in node order.
	pub fn positions(&self) -> Vec<Point> {
		self.state.particles.iter().map(Particle::position).collect()
	}

	/// Position of the node at `index`.
	pub fn position(&self, index: usize) -> Option<Point> {
		self.state.get(index).map(Particle::position)
	}

	/// Pins (or, with `None`, releases) each axis of a node.
	pub fn pin(&mut self, index: usize, fx: Option<f64>, fy: Option<f64>) {
		if let Some(p) = self.state.particles.get_mut(index) {
			p.fx = fx;
			p.fy = fy;
			if let Some(fx) = fx {
				p.x = fx;
				p.vx = 0.0;
			}
			if let Some(fy) = fy {
				p.y = fy;
				p.vy = 0.0;
			}
		}
	}

	/// Runs `ticks` steps without checking whether the layout settled.
	pub fn warm_up(&mut self, ticks: usize) {
		for _ in 0..ticks {
			self.step();
		}
		debug!(
			"warm-up: {ticks} ticks over {} nodes, alpha {:.4}",
			self.state.len(),
			self.alpha
		);
	}

	/// Advances one step unless the simulation already settled.
	pub fn tick(&mut self) -> TickOutcome {
		if self.is_settled() {
			return TickOutcome::Settled;
		}
		self.step();
		if self.is_settled() {
			TickOutcome::Settled
		} else {
			TickOutcome::Running
		}
	}

	/// Ticks until settled and returns the number of ticks taken.
	pub fn run(&mut self) -> usize {
		let start = self.iterations;
		while self.tick() == TickOutcome::Running {}
		self.iterations - start
	}

	fn step(&mut self) {
		self.alpha += (self.forces.alpha_target - self.alpha) * self.forces.alpha_decay;
		self.apply_charge();
		self.apply_collide();
		self.apply_links();
		self.integrate();
		self.iterations += 1;
	}

	fn apply_charge(&mut self) {
		let strength = self.forces.charge_strength * self.alpha;
		if strength == 0.0 {
			return;
		}
		let n = self.state.particles.len();
		for i in 0..n {
			let Particle { x: xi, y: yi, .. } = self.state.particles[i];
			let (mut dvx, mut dvy) = (0.0, 0.0);
			for j in 0..n {
				if i == j {
					continue;
				}
				let pj = &self.state.particles[j];
				let mut dx = pj.x - xi;
				let mut dy = pj.y - yi;
				if dx == 0.0 {
					dx = self.random.jiggle();
				}
				if dy == 0.0 {
					dy = self.random.jiggle();
				}
				let mut l = dx * dx + dy * dy;
				if l < DISTANCE_MIN2 {
					l = (DISTANCE_MIN2 * l).sqrt();
				}
				dvx += dx * strength / l;
				dvy += dy * strength / l;
			}
			let p = &mut self.state.particles[i];
			p.vx += dvx;
			p.vy += dvy;
		}
	}

	fn apply_collide(&mut self) {
		let radius = self.forces.collide_radius;
		let strength = self.forces.collide_strength;
		if radius <= 0.0 || strength == 0.0 {
			return;
		}
		// Every node shares one radius, so each side takes half of the correction.
		let share = 0.5;
		let min_distance = radius + radius;
		let n = self.state.particles.len();
		for _ in 0..self.forces.collide_iterations {
			for i in 0..n {
				let pi = self.state.particles[i];
				let (xi, yi) = (pi.x + pi.vx, pi.y + pi.vy);
				for j in (i + 1)..n {
					let pj = self.state.particles[j];
					let mut x = xi - pj.x - pj.vx;
					let mut y = yi - pj.y - pj.vy;
					let mut l = x * x + y * y;
					if l >= min_distance * min_distance {
						continue;
					}
					if x == 0.0 {
						x = self.random.jiggle();
						l += x * x;
					}
					if y == 0.0 {
						y = self.random.jiggle();
						l += y * y;
					}
					let d = l.sqrt();
					let f = (min_distance - d) / d * strength;
					x *= f;
					y *= f;
					let particles = &mut self.state.particles;
					particles[i].vx += x * share;
					particles[i].vy += y * share;
					particles[j].vx -= x * (1.0 - share);
					particles[j].vy -= y * (1.0 - share);
				}
			}
		}
	}

	fn apply_links(&mut self) {
		let scale = self.alpha * self.forces.link_strength;
		for (k, &(s, t)) in self.links.iter().enumerate() {
			if s == t {
				continue;
			}
			let (ps, pt) = (self.state.particles[s], self.state.particles[t]);
			let mut x = pt.x + pt.vx - ps.x - ps.vx;
			let mut y = pt.y + pt.vy - ps.y - ps.vy;
			if x == 0.0 {
				x = self.random.jiggle();
			}
			if y == 0.0 {
				y = self.random.jiggle();
			}
			let l = (x * x + y * y).sqrt();
			let f = (l - self.forces.link_distance) / l * scale;
			x *= f;
			y *= f;
			let b = self.bias[k];
			let particles = &mut self.state.particles;
			particles[t].vx -= x * b;
			particles[t].vy -= y * b;
			particles[s].vx += x * (1.0 - b);
			particles[s].vy += y * (1.0 - b);
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.forces.velocity_decay;
		let max_velocity = self.forces.max_velocity;
		for p in &mut self.state.particles {
			p.vx *= keep;
			p.vy *= keep;
			if !p.vx.is_finite() || !p.vy.is_finite() {
				p.vx = 0.0;
				p.vy = 0.0;
			}
			let speed = p.vx.hypot(p.vy);
			if speed > max_velocity {
				let f = max_velocity / speed;
				p.vx *= f;
				p.vy *= f;
			}

			match p.fx {
				Some(fx) => {
					p.x = fx;
					p.vx = 0.0;
				}
				None => p.x += p.vx,
			}
			match p.fy {
				Some(fy) => {
					p.y = fy;
					p.vy = 0.0;
				}
				None => p.y += p.vy,
			}
		}
	}
}
