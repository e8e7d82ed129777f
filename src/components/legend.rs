//! Color key for categories and connection types.

use leptos::prelude::*;

use super::network_graph::{Category, ConnectionType, category_color, connection_style};

/// Legend overlay listing every category and connection type with its color.
#[component]
pub fn Legend() -> impl IntoView {
	let categories = Category::ALL
		.iter()
		.map(|&category| {
			let swatch = format!(
				"display: inline-block; width: 10px; height: 10px; border-radius: 50%; background: {};",
				category_color(category).to_css()
			);
			view! {
				<li>
					<span class="legend-swatch" style=swatch></span>
					{category.label()}
				</li>
			}
		})
		.collect_view();

	let connection_types = ConnectionType::ALL
		.iter()
		.map(|&kind| {
			let style = connection_style(kind);
			let swatch = format!(
				"display: inline-block; width: 16px; height: 0; border-top: 2px {} {};",
				if style.dashed { "dashed" } else { "solid" },
				style.color.to_css()
			);
			view! {
				<li>
					<span class="legend-swatch" style=swatch></span>
					{kind.label()}
				</li>
			}
		})
		.collect_view();

	view! {
		<div class="network-legend">
			<h3>"Categories"</h3>
			<ul>{categories}</ul>
			<h3>"Connections"</h3>
			<ul>{connection_types}</ul>
		</div>
	}
}
