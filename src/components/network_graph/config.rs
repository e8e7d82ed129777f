//! Tunable settings for the network view.
//!
//! Every field has a default; a page can override any subset by embedding a
//! JSON object in `<script id="network-config">`.

use serde::Deserialize;

use super::highlight::HighlightStyle;
use super::layout::LayoutConfig;
use super::scale::{ScaleConfig, ZoomConfig};

/// All tunables of the network view.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
	/// Force layout tuning.
	pub layout: LayoutConfig,
	/// Zoom limits and timings.
	pub zoom: ZoomConfig,
	/// Emphasis and dimming opacities.
	pub highlight: HighlightStyle,
	/// Zoom-dependent sizes.
	pub scale: ScaleConfig,
}

impl NetworkConfig {
	/// Repairs bounds a page override can get wrong. See
	/// [`ZoomConfig::normalized`] and [`ScaleConfig::normalized`].
	pub fn normalized(self) -> Self {
		Self {
			zoom: self.zoom.normalized(),
			scale: self.scale.normalized(),
			..self
		}
	}
}
