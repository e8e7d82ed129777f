//! Details of the selected person and their connections.

use leptos::prelude::*;

use super::network_graph::{ArchiveData, Category, ConnectionType, PersonId, category_color};

/// One row of the connection list.
#[derive(Clone, Debug, PartialEq)]
struct ConnectionEntry {
	key: i64,
	other: PersonId,
	name: String,
	category: Category,
	kind: ConnectionType,
	description: Option<String>,
}

/// Rows for every connection of `id` whose other end is a known person.
fn connection_entries(data: &ArchiveData, id: PersonId) -> Vec<ConnectionEntry> {
	data.connections_of(id)
		.filter_map(|c| {
			let other = c.other_end(id).filter(|&other| other != id)?;
			let person = data.person(other)?;
			Some(ConnectionEntry {
				key: c.id,
				other,
				name: person.name.clone(),
				category: person.category,
				kind: c.connection_type,
				description: c.description.clone(),
			})
		})
		.collect()
}

/// Side panel for the selected person. Renders nothing while no known person
/// is selected.
#[component]
pub fn PersonPanel(
	#[prop(into)] data: Signal<ArchiveData>,
	#[prop(into)] selected: Signal<Option<PersonId>>,
	#[prop(into)] on_select: Callback<Option<PersonId>>,
) -> impl IntoView {
	move || {
		let id = selected.get()?;
		let (person, entries) = data.with(|d| {
			let person = d.person(id)?.clone();
			Some((person, connection_entries(d, id)))
		})?;
		let dot = format!(
			"display: inline-block; width: 10px; height: 10px; border-radius: 50%; background: {};",
			category_color(person.category).to_css()
		);
		let count = entries.len();

		Some(view! {
			<aside class="person-panel">
				<header>
					<h2>{person.name}</h2>
					<button class="person-panel-clear" on:click=move |_| on_select.run(None)>
						"Clear"
					</button>
				</header>
				<p class="person-panel-category">
					<span style=dot></span>
					{person.category.label()}
				</p>
				{person.description.map(|text| view! { <p class="person-panel-description">{text}</p> })}
				{(!person.aliases.is_empty())
					.then(|| {
						view! {
							<p class="person-panel-aliases">
								{format!("Also known as: {}", person.aliases.join(", "))}
							</p>
						}
					})}
				<h3>{format!("Connections ({count})")}</h3>
				<ul class="person-panel-connections">
					<For each=move || entries.clone() key=|entry| entry.key let:entry>
						<li>
							<button
								class="person-panel-link"
								style=format!("color: {};", category_color(entry.category).to_css())
								on:click=move |_| on_select.run(Some(entry.other))
							>
								{entry.name}
							</button>
							<span class="person-panel-kind">{entry.kind.label()}</span>
							{entry.description.map(|text| view! { <p>{text}</p> })}
						</li>
					</For>
				</ul>
			</aside>
		})
	}
}
