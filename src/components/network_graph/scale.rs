//! Coordinate transforms, zoom behavior and value scales.
//!
//! # Coordinate spaces
//!
//! - **World-space**: where the layout places nodes. The centering force pulls
//!   toward the viewport center expressed in world units, so the identity
//!   transform shows the settled graph centered on screen.
//! - **Screen-space**: canvas pixels. `screen = world * k + (x, y)`.
//!
//! Zoom buttons and the reset control animate between transforms with a
//! [`ZoomTween`]; wheel zoom and panning apply immediately. Every path goes
//! through the same scale clamp.

use log::warn;
use serde::Deserialize;

/// Maps a numeric domain linearly onto a range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
	domain: (f64, f64),
	range: (f64, f64),
}

impl LinearScale {
	/// Scale mapping `domain` onto `range`.
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
		Self { domain, range }
	}

	/// Maps `value` from the domain onto the range.
	pub fn apply(&self, value: f64) -> f64 {
		let (d0, d1) = self.domain;
		let (r0, r1) = self.range;
		if d1 == d0 {
			return r0;
		}
		r0 + (value - d0) / (d1 - d0) * (r1 - r0)
	}
}

/// A 2D point, in whichever space the caller is working in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// Point at (`x`, `y`).
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance.
	pub fn distance(self, other: Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

/// Pan and zoom transform applied to the whole graph view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ViewTransform {
	/// No pan, no zoom.
	pub const IDENTITY: ViewTransform = ViewTransform {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	/// World point to canvas pixels.
	pub fn to_screen(&self, world: Point) -> Point {
		Point::new(world.x * self.k + self.x, world.y * self.k + self.y)
	}

	/// Canvas pixels to world point.
	pub fn to_world(&self, screen: Point) -> Point {
		Point::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
	}

	/// Multiplies the scale by `factor` (clamped to `extent`) while keeping
	/// the screen point `anchor` over the same world point.
	pub fn scaled_about(&self, factor: f64, anchor: Point, extent: (f64, f64)) -> Self {
		let (lo, hi) = ordered(extent.0, extent.1);
		let k = (self.k * factor).clamp(lo, hi);
		let ratio = k / self.k;
		Self {
			x: anchor.x - (anchor.x - self.x) * ratio,
			y: anchor.y - (anchor.y - self.y) * ratio,
			k,
		}
	}

	fn lerp(&self, other: &ViewTransform, t: f64) -> Self {
		Self {
			x: self.x + (other.x - self.x) * t,
			y: self.y + (other.y - self.y) * t,
			k: self.k + (other.k - self.k) * t,
		}
	}
}

/// Zoom limits and animation timings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
	/// Smallest allowed zoom factor.
	pub min_scale: f64,
	/// Largest allowed zoom factor.
	pub max_scale: f64,
	/// Factor applied by one zoom-in press; zoom-out applies its inverse.
	pub button_factor: f64,
	/// Seconds for a button zoom transition.
	pub button_duration: f64,
	/// Seconds for the reset transition.
	pub reset_duration: f64,
	/// Factor applied per wheel notch.
	pub wheel_factor: f64,
}

impl Default for ZoomConfig {
	fn default() -> Self {
		Self {
			min_scale: 0.2,
			max_scale: 5.0,
			button_factor: 1.4,
			button_duration: 0.3,
			reset_duration: 0.5,
			wheel_factor: 1.1,
		}
	}
}

impl ZoomConfig {
	/// Scale bounds, smallest first.
	fn extent(&self) -> (f64, f64) {
		ordered(self.min_scale, self.max_scale)
	}

	/// Repairs limits a page override can get wrong: bounds given in the
	/// wrong order are swapped, and a non-positive or non-finite bound
	/// restores the default extent.
	pub fn normalized(mut self) -> Self {
		let valid = |v: f64| v.is_finite() && v > 0.0;
		if !valid(self.min_scale) || !valid(self.max_scale) {
			let fallback = ZoomConfig::default();
			warn!(
				"archive-network: zoom limits {}..{} are unusable, using {}..{}",
				self.min_scale, self.max_scale, fallback.min_scale, fallback.max_scale
			);
			self.min_scale = fallback.min_scale;
			self.max_scale = fallback.max_scale;
		} else if self.min_scale > self.max_scale {
			warn!(
				"archive-network: zoom limits {}..{} are inverted, swapping",
				self.min_scale, self.max_scale
			);
			std::mem::swap(&mut self.min_scale, &mut self.max_scale);
		}
		self
	}
}

/// `(a, b)` as `(min, max)`.
fn ordered(a: f64, b: f64) -> (f64, f64) {
	if a <= b { (a, b) } else { (b, a) }
}

fn ease_cubic_in_out(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

/// An in-flight animated transition between two transforms.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoomTween {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

impl ZoomTween {
	/// Tween from `from` to `to` over `duration` seconds.
	pub fn new(from: ViewTransform, to: ViewTransform, duration: f64) -> Self {
		Self {
			from,
			to,
			elapsed: 0.0,
			duration,
		}
	}

	/// Advances the tween and returns the transform for this frame.
	pub fn advance(&mut self, dt: f64) -> ViewTransform {
		self.elapsed += dt;
		if self.is_finished() {
			return self.to;
		}
		let t = ease_cubic_in_out(self.elapsed / self.duration);
		self.from.lerp(&self.to, t)
	}

	/// Whether the tween has reached its end.
	pub fn is_finished(&self) -> bool {
		self.duration <= 0.0 || self.elapsed >= self.duration
	}

	/// Transform the tween ends on.
	pub fn target(&self) -> ViewTransform {
		self.to
	}
}

/// Current view transform plus any transition toward a new one.
#[derive(Clone, Debug, Default)]
pub struct ZoomState {
	current: ViewTransform,
	tween: Option<ZoomTween>,
	config: ZoomConfig,
}

impl ZoomState {
	/// Identity view with no transition pending.
	pub fn new(config: ZoomConfig) -> Self {
		Self {
			current: ViewTransform::IDENTITY,
			tween: None,
			config,
		}
	}

	/// Transform to draw with this frame.
	pub fn transform(&self) -> ViewTransform {
		self.current
	}

	/// Where the view will end up once any transition completes.
	pub fn target(&self) -> ViewTransform {
		self.tween.as_ref().map_or(self.current, ZoomTween::target)
	}

	/// Whether a button or reset transition is in flight.
	pub fn is_animating(&self) -> bool {
		self.tween.is_some()
	}

	/// Animated zoom around `center` (the viewport center). Repeated presses
	/// compound from the pending target, not from the mid-flight transform.
	pub fn zoom_in(&mut self, center: Point) {
		self.zoom_step(self.config.button_factor, center);
	}

	/// Inverse of [`ZoomState::zoom_in`].
	pub fn zoom_out(&mut self, center: Point) {
		self.zoom_step(1.0 / self.config.button_factor, center);
	}

	fn zoom_step(&mut self, factor: f64, center: Point) {
		let to = self
			.target()
			.scaled_about(factor, center, self.config.extent());
		self.tween = Some(ZoomTween::new(
			self.current,
			to,
			self.config.button_duration,
		));
	}

	/// Animated return to the identity transform.
	pub fn reset(&mut self) {
		self.tween = Some(ZoomTween::new(
			self.current,
			ViewTransform::IDENTITY,
			self.config.reset_duration,
		));
	}

	/// Immediate zoom by one wheel notch around the pointer.
	pub fn wheel(&mut self, delta_y: f64, pointer: Point) {
		let factor = if delta_y > 0.0 {
			1.0 / self.config.wheel_factor
		} else {
			self.config.wheel_factor
		};
		self.tween = None;
		self.current = self
			.current
			.scaled_about(factor, pointer, self.config.extent());
	}

	/// Immediate translation of the view, cancelling any transition.
	pub fn set_translation(&mut self, x: f64, y: f64) {
		self.tween = None;
		self.current.x = x;
		self.current.y = y;
	}

	/// Advances any transition by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		let Some(tween) = self.tween.as_mut() else {
			return;
		};
		self.current = tween.advance(dt);
		if tween.is_finished() {
			self.tween = None;
		}
	}
}

/// How a visual size reacts to the zoom level.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleBehavior {
	/// Constant size in world units; grows on screen when zooming in.
	World,
	/// Constant size in screen pixels.
	Screen,
	/// World-space size kept within screen-pixel bounds.
	Clamped {
		/// Smallest on-screen size in pixels.
		min_screen: f64,
		/// Largest on-screen size in pixels.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// World-space size to draw with at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => {
				let (lo, hi) = ordered(*min_screen, *max_screen);
				base.clamp(lo / k, hi / k)
			}
		}
	}
}

/// Zoom-dependent stroke and text sizes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
	/// Label font size in screen pixels at k = 1.
	pub label_size: f64,
	/// Labels stop growing below this zoom level.
	pub label_min_k: f64,
	/// Base edge width, multiplied by `sqrt(strength)`.
	pub edge_width: f64,
	/// How edge strokes react to zoom.
	pub edge_behavior: ScaleBehavior,
	/// Search-match outline width in screen pixels.
	pub outline_width: f64,
	/// Selection ring width in screen pixels.
	pub ring_width: f64,
	/// Extra world-space slack around a node for pointer hits.
	pub hit_padding: f64,
	/// Screen-pixel travel below which a press counts as a click.
	pub click_tolerance: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			label_size: 11.0,
			label_min_k: 0.6,
			edge_width: 1.0,
			edge_behavior: ScaleBehavior::Clamped {
				min_screen: 0.5,
				max_screen: 6.0,
			},
			outline_width: 3.0,
			ring_width: 2.0,
			hit_padding: 2.0,
			click_tolerance: 3.0,
		}
	}
}

impl ScaleConfig {
	/// Swaps clamped edge bounds given in the wrong order.
	pub fn normalized(mut self) -> Self {
		if let ScaleBehavior::Clamped {
			min_screen,
			max_screen,
		} = &mut self.edge_behavior
		{
			if *min_screen > *max_screen {
				warn!(
					"archive-network: edge width bounds {}..{} are inverted, swapping",
					min_screen, max_screen
				);
				std::mem::swap(min_screen, max_screen);
			}
		}
		self
	}
}

/// Per-frame sizes derived from [`ScaleConfig`] at the current zoom.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// CSS font for node labels.
	pub label_font: String,
	/// Search outline width in world units.
	pub outline_width: f64,
	/// Selection ring width in world units.
	pub ring_width: f64,
	k: f64,
	edge_width: f64,
	edge_behavior: ScaleBehavior,
}

impl ScaledValues {
	/// Sizes for zoom level `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			label_font: format!("{}px sans-serif", config.label_size / k.max(config.label_min_k)),
			outline_width: config.outline_width / k,
			ring_width: config.ring_width / k,
			k,
			edge_width: config.edge_width,
			edge_behavior: config.edge_behavior.clone(),
		}
	}

	/// World-space stroke width for an edge of the given strength.
	pub fn edge_width(&self, strength: f64) -> f64 {
		self.edge_behavior
			.apply(self.edge_width * strength.max(0.0).sqrt(), self.k)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const CENTER: Point = Point::new(400.0, 300.0);

	fn settle(zoom: &mut ZoomState) {
		while zoom.is_animating() {
			zoom.tick(0.016);
		}
	}

	#[test]
	fn three_zoom_ins_compound() {
		let mut zoom = ZoomState::new(ZoomConfig::default());
		for _ in 0..3 {
			zoom.zoom_in(CENTER);
		}
		assert!((zoom.target().k - 2.744).abs() < 1e-9);
		settle(&mut zoom);
		assert!((zoom.transform().k - 2.744).abs() < 1e-9);
	}

	#[test]
	fn zoom_is_clamped_to_ceiling_and_floor() {
		let mut zoom = ZoomState::new(ZoomConfig::default());
		for _ in 0..4 {
			zoom.zoom_in(CENTER);
		}
		assert!((zoom.target().k - 1.4f64.powi(4)).abs() < 1e-9);
		zoom.zoom_in(CENTER);
		assert_eq!(zoom.target().k, 5.0);
		zoom.zoom_in(CENTER);
		assert_eq!(zoom.target().k, 5.0);

		for _ in 0..12 {
			zoom.zoom_out(CENTER);
		}
		assert_eq!(zoom.target().k, 0.2);
	}

	#[test]
	fn button_zoom_keeps_viewport_center_fixed() {
		let mut zoom = ZoomState::new(ZoomConfig::default());
		let before = zoom.transform().to_world(CENTER);
		zoom.zoom_in(CENTER);
		settle(&mut zoom);
		let after = zoom.transform().to_world(CENTER);
		assert!(before.distance(after) < 1e-9);
	}

	#[test]
	fn button_transition_takes_configured_time() {
		let mut zoom = ZoomState::new(ZoomConfig::default());
		zoom.zoom_in(CENTER);
		zoom.tick(0.15);
		assert!(zoom.is_animating());
		let mid = zoom.transform().k;
		assert!(mid > 1.0 && mid < 1.4);
		zoom.tick(0.16);
		assert!(!zoom.is_animating());
		assert!((zoom.transform().k - 1.4).abs() < 1e-12);
	}

	#[test]
	fn reset_returns_to_identity() {
		let mut zoom = ZoomState::new(ZoomConfig::default());
		zoom.wheel(-1.0, Point::new(10.0, 20.0));
		zoom.set_translation(55.0, -30.0);
		zoom.reset();
		zoom.tick(0.25);
		assert!(zoom.is_animating());
		zoom.tick(0.25);
		assert_eq!(zoom.transform(), ViewTransform::IDENTITY);
	}

	#[test]
	fn inverted_limits_clamp_instead_of_panicking() {
		let config: ZoomConfig = serde_json::from_str(r#"{ "min_scale": 8 }"#).unwrap();
		let mut zoom = ZoomState::new(config);
		zoom.wheel(-1.0, Point::new(0.0, 0.0));
		assert_eq!(zoom.transform().k, 5.0);
		zoom.zoom_in(Point::new(400.0, 300.0));
		assert!((zoom.target().k - 7.0).abs() < 1e-9);

		let edges = ScaleBehavior::Clamped {
			min_screen: 6.0,
			max_screen: 1.0,
		};
		assert_eq!(edges.apply(10.0, 1.0), 6.0);
		assert_eq!(edges.apply(0.1, 1.0), 1.0);
	}

	#[test]
	fn wheel_zoom_anchors_on_pointer() {
		let mut zoom = ZoomState::new(ZoomConfig::default());
		let pointer = Point::new(120.0, 80.0);
		let before = zoom.transform().to_world(pointer);
		zoom.wheel(-3.0, pointer);
		assert!((zoom.transform().k - 1.1).abs() < 1e-12);
		assert!(before.distance(zoom.transform().to_world(pointer)) < 1e-9);
	}

	#[test]
	fn screen_world_round_trip() {
		let t = ViewTransform {
			x: 30.0,
			y: -12.0,
			k: 2.5,
		};
		let p = Point::new(7.0, 9.0);
		assert!(t.to_world(t.to_screen(p)).distance(p) < 1e-12);
	}

	#[test]
	fn linear_scale_maps_endpoints() {
		let s = LinearScale::new((0.0, 10.0), (5.0, 24.0));
		assert_eq!(s.apply(0.0), 5.0);
		assert_eq!(s.apply(10.0), 24.0);
		assert_eq!(LinearScale::new((2.0, 2.0), (1.0, 3.0)).apply(2.0), 1.0);
	}

	#[test]
	fn edge_width_respects_screen_bounds() {
		let config = ScaleConfig::default();
		let zoomed_out = ScaledValues::new(&config, 0.2);
		// sqrt(4) = 2 world units -> 0.4 px at k = 0.2, clamped up to 0.5 px
		assert!((zoomed_out.edge_width(4.0) * 0.2 - 0.5).abs() < 1e-12);
		let normal = ScaledValues::new(&config, 1.0);
		assert!((normal.edge_width(4.0) - 2.0).abs() < 1e-12);
	}
}
