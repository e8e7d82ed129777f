//! archive-network: Interactive relationship graph for a public-records archive.
//!
//! This crate provides a WASM-based visualization of the persons in an archive
//! and the connections between them, with a physics-based layout, selection
//! highlighting, search, pan and zoom.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

use components::person_panel::PersonPanel;
pub use components::network_graph::{
	ArchiveData, Category, Connection, ConnectionType, NetworkConfig, NetworkGraph, Person,
	PersonId, matches_search,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("archive-network: logging initialized");
}

/// Text content of the `<script>` element with the given id.
fn embedded_json(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load the archive snapshot from a script element with id="archive-data".
/// Expected format: JSON with { persons: [...], connections: [...] }
fn load_archive_data() -> Option<ArchiveData> {
	let json_text = embedded_json("archive-data")?;

	match serde_json::from_str::<ArchiveData>(&json_text) {
		Ok(data) => {
			info!(
				"archive-network: loaded {} persons, {} connections",
				data.persons.len(),
				data.connections.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("archive-network: failed to parse archive data: {}", e);
			None
		}
	}
}

/// Load view settings from a script element with id="network-config".
/// Missing fields keep their defaults; a missing element means all defaults.
fn load_network_config() -> NetworkConfig {
	let Some(json_text) = embedded_json("network-config") else {
		return NetworkConfig::default();
	};
	serde_json::from_str(&json_text).unwrap_or_else(|e| {
		warn!("archive-network: failed to parse network config: {}", e);
		NetworkConfig::default()
	})
}

/// Main application component.
/// Loads the archive snapshot from the DOM and renders the network page.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let archive = load_archive_data().unwrap_or_default();
	let data = Signal::derive(move || archive.clone());
	let config = load_network_config();

	let selected = RwSignal::new(None::<PersonId>);
	let search = RwSignal::new(String::new());

	let match_count = move || {
		let query = search.get();
		if query.is_empty() {
			return None;
		}
		let count = data.with(|d| {
			d.persons
				.iter()
				.filter(|p| matches_search(&p.name, &query))
				.count()
		});
		Some(format!("{count} matching"))
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Archive Network" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="network-page">
			<div class="network-toolbar">
				<h1>"Network"</h1>
				<input
					type="search"
					placeholder="Search persons"
					prop:value=move || search.get()
					on:input=move |ev| search.set(event_target_value(&ev))
				/>
				<span class="network-match-count">{match_count}</span>
			</div>
			<div class="network-body">
				<div class="network-canvas-container">
					<NetworkGraph
						data=data
						selected=selected
						search=search
						on_select=move |id| selected.set(id)
						config=config
					/>
				</div>
				<PersonPanel data=data selected=selected on_select=move |id| selected.set(id) />
			</div>
			<p class="subtitle">
				"Click a person to highlight their connections. Drag nodes to reposition. Scroll to zoom. Drag background to pan."
			</p>
		</div>
	}
}
