//! Relationship network of the archive's persons.
//!
//! Renders persons as nodes and their connections as edges on an HTML canvas:
//! - Force-directed layout via the `force_graph` simulation
//! - Node size from connection count, labels for the best-connected persons
//! - Click to select a person, dimming everything outside their one-hop
//!   neighborhood
//! - Search highlighting, pan, wheel and button zoom, node dragging
//!
//! # Example
//!
//! ```ignore
//! use archive_network::{ArchiveData, NetworkGraph};
//!
//! let data = RwSignal::new(ArchiveData::default());
//! let selected = RwSignal::new(None);
//! let search = RwSignal::new(String::new());
//!
//! view! {
//!     <NetworkGraph
//!         data=data
//!         selected=selected
//!         search=search
//!         on_select=move |id| selected.set(id)
//!     />
//! }
//! ```

mod build;
mod component;
pub mod config;
mod highlight;
mod layout;
mod render;
pub mod scale;
mod state;
pub mod theme;
mod types;

pub use component::NetworkGraph;
pub use config::NetworkConfig;
pub use highlight::matches_search;
pub use theme::{Theme, category_color, connection_style};
pub use types::{ArchiveData, Category, Connection, ConnectionType, Person, PersonId};
