//! Archive records consumed by the network graph.
//!
//! These mirror the shapes served by the archive API. They are read-only
//! snapshots: the graph never mutates them, it builds its own model from them.

use serde::Deserialize;

/// Stable identifier of a person in the archive.
pub type PersonId = i64;

/// Role a person plays in the archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	/// Central figure of the archive.
	#[serde(alias = "key-figure")]
	KeyFigure,
	/// Business or social associate.
	Associate,
	/// Victim.
	Victim,
	/// Witness.
	Witness,
	/// Lawyer or legal actor.
	Legal,
	/// Politician or official.
	Political,
}

impl Category {
	/// Every category, in legend order.
	pub const ALL: [Category; 6] = [
		Category::KeyFigure,
		Category::Associate,
		Category::Victim,
		Category::Witness,
		Category::Legal,
		Category::Political,
	];

	/// Label shown in the legend, tooltip and panel.
	pub fn label(self) -> &'static str {
		match self {
			Category::KeyFigure => "Key Figure",
			Category::Associate => "Associate",
			Category::Victim => "Victim",
			Category::Witness => "Witness",
			Category::Legal => "Legal",
			Category::Political => "Political",
		}
	}
}

/// Nature of the relationship recorded by a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
	/// Business associate.
	#[serde(alias = "business-associate")]
	BusinessAssociate,
	/// Social acquaintance.
	#[serde(alias = "social-connection")]
	SocialConnection,
	/// Legal counsel.
	#[serde(alias = "legal-counsel")]
	LegalCounsel,
	/// Employer and employee.
	Employee,
	/// Co-conspirator.
	#[serde(alias = "co-conspirator")]
	CoConspirator,
	/// Travel companion.
	#[serde(alias = "travel-companion")]
	TravelCompanion,
	/// Political ally.
	#[serde(alias = "political-ally")]
	PoliticalAlly,
	/// Connection established through victim testimony.
	#[serde(alias = "victim-testimony")]
	VictimTestimony,
}

impl ConnectionType {
	/// Every connection type, in legend order.
	pub const ALL: [ConnectionType; 8] = [
		ConnectionType::BusinessAssociate,
		ConnectionType::SocialConnection,
		ConnectionType::LegalCounsel,
		ConnectionType::Employee,
		ConnectionType::CoConspirator,
		ConnectionType::TravelCompanion,
		ConnectionType::PoliticalAlly,
		ConnectionType::VictimTestimony,
	];

	/// Label shown in the legend, tooltip and panel.
	pub fn label(self) -> &'static str {
		match self {
			ConnectionType::BusinessAssociate => "Business Associate",
			ConnectionType::SocialConnection => "Social Connection",
			ConnectionType::LegalCounsel => "Legal Counsel",
			ConnectionType::Employee => "Employee",
			ConnectionType::CoConspirator => "Co-Conspirator",
			ConnectionType::TravelCompanion => "Travel Companion",
			ConnectionType::PoliticalAlly => "Political Ally",
			ConnectionType::VictimTestimony => "Victim Testimony",
		}
	}
}

/// A person record.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Person {
	/// Person id.
	pub id: PersonId,
	/// Display name.
	pub name: String,
	/// Role in the archive.
	pub category: Category,
	/// Free-text summary.
	#[serde(default)]
	pub description: Option<String>,
	/// Other names the person appears under.
	#[serde(default)]
	pub aliases: Vec<String>,
}

/// A relationship between two persons.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
	/// Connection id.
	pub id: i64,
	/// One endpoint.
	pub person_id1: PersonId,
	/// The other endpoint.
	pub person_id2: PersonId,
	/// Kind of relationship.
	pub connection_type: ConnectionType,
	/// Free-text context.
	#[serde(default)]
	pub description: Option<String>,
	/// Relative weight of the relationship. Drives stroke width.
	#[serde(default = "default_strength")]
	pub strength: f64,
}

fn default_strength() -> f64 {
	1.0
}

impl Connection {
	/// The endpoint opposite `id`, if `id` is one of the endpoints.
	pub fn other_end(&self, id: PersonId) -> Option<PersonId> {
		if self.person_id1 == id {
			Some(self.person_id2)
		} else if self.person_id2 == id {
			Some(self.person_id1)
		} else {
			None
		}
	}
}

/// Snapshot of the archive's persons and connections.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ArchiveData {
	/// Every person record.
	#[serde(default)]
	pub persons: Vec<Person>,
	/// Every connection record.
	#[serde(default)]
	pub connections: Vec<Connection>,
}

impl ArchiveData {
	/// Person with the given id.
	pub fn person(&self, id: PersonId) -> Option<&Person> {
		self.persons.iter().find(|p| p.id == id)
	}

	/// Connections touching `id`, in input order.
	pub fn connections_of(&self, id: PersonId) -> impl Iterator<Item = &Connection> {
		self.connections
			.iter()
			.filter(move |c| c.person_id1 == id || c.person_id2 == id)
	}
}
