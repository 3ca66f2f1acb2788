use serde_json::Value;
use sqlx::types::Json;
use time::OffsetDateTime;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ConceptRow {
	pub id: i64,
	pub name: String,
	pub category: Option<String>,
	pub description: Option<String>,
	pub notes: Option<String>,
	pub metadata: Option<Json<Value>>,
	pub created_at: Option<OffsetDateTime>,
	pub updated_at: Option<OffsetDateTime>,
}

/// Catalog fields written by an import. The name is the natural key.
#[derive(Clone, Debug, Default)]
pub struct ConceptFields {
	pub name: String,
	pub category: Option<String>,
	pub description: Option<String>,
	pub notes: Option<String>,
	pub metadata: Option<Value>,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct EpisodeRow {
	pub id: i64,
	pub mental_model_id: Option<i64>,
	pub title: Option<String>,
	pub description: Option<String>,
	pub rss_guid: Option<String>,
	pub rss_link: Option<String>,
	pub rss_pubdate: Option<String>,
	pub transcript: Option<String>,
	pub transcript_source: Option<String>,
	pub transcript_index: Option<i64>,
	pub created_at: Option<OffsetDateTime>,
	pub updated_at: Option<OffsetDateTime>,
}
impl EpisodeRow {
	/// Linked concept id. Older databases store `0` for "unlinked".
	pub fn concept_id(&self) -> Option<i64> {
		self.mental_model_id.filter(|id| *id != 0)
	}

	pub fn title_str(&self) -> &str {
		self.title.as_deref().unwrap_or_default()
	}

	pub fn transcript_str(&self) -> &str {
		self.transcript.as_deref().unwrap_or_default()
	}

	pub fn has_transcript(&self) -> bool {
		!self.transcript_str().trim().is_empty()
	}
}

/// Episode fields taken from a feed entry. `None` keeps whatever is stored.
#[derive(Clone, Debug, Default)]
pub struct FeedEpisodeFields {
	pub title: Option<String>,
	pub description: Option<String>,
	pub rss_guid: Option<String>,
	pub rss_link: Option<String>,
	pub rss_pubdate: Option<String>,
	pub mental_model_id: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct TranscriptFields {
	pub transcript: String,
	/// Source file, relative to the scanned root.
	pub source: String,
	/// 1-based block position within the source file.
	pub index: i64,
}
