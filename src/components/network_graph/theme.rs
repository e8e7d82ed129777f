//! Visual theming for the network graph.
//!
//! Category and connection-type colors are constant lookup tables. Nothing in
//! here changes at runtime.

use super::types::{Category, ConnectionType};

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in 0..1.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Same color with alpha `a`.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		let up = |c: u8| (c as f64 + (255.0 - c as f64) * f) as u8;
		Self {
			r: up(self.r),
			g: up(self.g),
			b: up(self.b),
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		let down = |c: u8| (c as f64 * f) as u8;
		Self {
			r: down(self.r),
			g: down(self.g),
			b: down(self.b),
			a: self.a,
		}
	}

	/// CSS color string: `#rrggbb` when opaque, `rgba(..)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Fill color for a person category.
pub const fn category_color(category: Category) -> Color {
	match category {
		Category::KeyFigure => Color::rgb(220, 38, 38),
		Category::Associate => Color::rgb(249, 115, 22),
		Category::Victim => Color::rgb(168, 85, 247),
		Category::Witness => Color::rgb(59, 130, 246),
		Category::Legal => Color::rgb(34, 197, 94),
		Category::Political => Color::rgb(234, 179, 8),
	}
}

/// Stroke style for a connection type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectionStyle {
	/// Stroke color.
	pub color: Color,
	/// Drawn with [`Theme::dash_pattern`].
	pub dashed: bool,
}

/// Display style of a connection type.
pub const fn connection_style(kind: ConnectionType) -> ConnectionStyle {
	let (color, dashed) = match kind {
		ConnectionType::BusinessAssociate => (Color::rgb(96, 165, 250), false),
		ConnectionType::SocialConnection => (Color::rgb(148, 163, 184), false),
		ConnectionType::LegalCounsel => (Color::rgb(74, 222, 128), false),
		ConnectionType::Employee => (Color::rgb(45, 212, 191), false),
		ConnectionType::CoConspirator => (Color::rgb(248, 113, 113), false),
		ConnectionType::TravelCompanion => (Color::rgb(251, 191, 36), true),
		ConnectionType::PoliticalAlly => (Color::rgb(250, 204, 21), false),
		ConnectionType::VictimTestimony => (Color::rgb(192, 132, 252), true),
	};
	ConnectionStyle { color, dashed }
}

/// Background and overlay colors.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Canvas fill at the edges.
	pub background: Color,
	/// Canvas fill at the center.
	pub background_secondary: Color,
	/// Node label text.
	pub label: Color,
	/// Outline drawn around nodes whose name matches the search.
	pub search_outline: Color,
	/// Ring drawn around the selected node.
	pub selection_ring: Color,
	/// Dash pattern (dash, gap) in screen pixels for dashed connection types.
	pub dash_pattern: (f64, f64),
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(17, 24, 39),
			background_secondary: Color::rgb(31, 41, 55),
			label: Color::rgb(229, 231, 235),
			search_outline: Color::rgb(253, 224, 71),
			selection_ring: Color::rgb(255, 255, 255),
			dash_pattern: (6.0, 4.0),
		}
	}
}
