use serde::{Deserialize, Serialize};

/// The slice of a concept the linking engine works with.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConceptRef {
	pub id: i64,
	/// Display name as authored, including punctuation and casing.
	pub name: String,
}
impl ConceptRef {
	pub fn new(id: i64, name: impl Into<String>) -> Self {
		Self { id, name: name.into() }
	}
}
