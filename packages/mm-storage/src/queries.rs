use sqlx::types::Json;
use time::OffsetDateTime;

use crate::{
	Error, Result,
	db::Db,
	models::{ConceptFields, ConceptRow, EpisodeRow, FeedEpisodeFields, TranscriptFields},
};

const CONCEPT_COLUMNS: &str =
	"id, name, category, description, notes, metadata, created_at, updated_at";
const EPISODE_COLUMNS: &str = "\
id, mental_model_id, title, description, rss_guid, rss_link, rss_pubdate, transcript, \
transcript_source, transcript_index, created_at, updated_at";

pub async fn list_concepts(db: &Db) -> Result<Vec<ConceptRow>> {
	let sql = format!("SELECT {CONCEPT_COLUMNS} FROM mental_models ORDER BY id");
	let rows = sqlx::query_as::<_, ConceptRow>(&sql).fetch_all(&db.pool).await?;

	Ok(rows)
}

/// Case-insensitive lookup by display name.
pub async fn find_concept_by_name(db: &Db, name: &str) -> Result<Option<ConceptRow>> {
	let sql = format!(
		"\
SELECT {CONCEPT_COLUMNS}
FROM mental_models
WHERE lower(name) = lower(?1)
ORDER BY id
LIMIT 1"
	);
	let row = sqlx::query_as::<_, ConceptRow>(&sql)
		.bind(name.trim())
		.fetch_optional(&db.pool)
		.await?;

	Ok(row)
}

pub async fn insert_concept(db: &Db, fields: &ConceptFields, now: OffsetDateTime) -> Result<i64> {
	let name = fields.name.trim();

	if name.is_empty() {
		return Err(Error::InvalidArgument("Concept name must be non-empty.".to_string()));
	}

	let result = sqlx::query(
		"\
INSERT INTO mental_models (name, category, description, notes, metadata, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
	)
	.bind(name)
	.bind(fields.category.as_deref())
	.bind(fields.description.as_deref())
	.bind(fields.notes.as_deref())
	.bind(fields.metadata.as_ref().map(Json))
	.bind(now)
	.execute(&db.pool)
	.await?;

	Ok(result.last_insert_rowid())
}

/// Overwrites descriptive fields. Absent fields keep their stored value.
pub async fn update_concept(
	db: &Db,
	id: i64,
	fields: &ConceptFields,
	now: OffsetDateTime,
) -> Result<()> {
	sqlx::query(
		"\
UPDATE mental_models
SET
	category = COALESCE(?1, category),
	description = COALESCE(?2, description),
	notes = COALESCE(?3, notes),
	metadata = COALESCE(?4, metadata),
	updated_at = ?5
WHERE id = ?6",
	)
	.bind(fields.category.as_deref())
	.bind(fields.description.as_deref())
	.bind(fields.notes.as_deref())
	.bind(fields.metadata.as_ref().map(Json))
	.bind(now)
	.bind(id)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn list_episodes(db: &Db) -> Result<Vec<EpisodeRow>> {
	let sql = format!("SELECT {EPISODE_COLUMNS} FROM episodes ORDER BY id");
	let rows = sqlx::query_as::<_, EpisodeRow>(&sql).fetch_all(&db.pool).await?;

	Ok(rows)
}

/// Episodes with no concept link, transcript or not.
pub async fn list_unlinked_episodes(db: &Db) -> Result<Vec<EpisodeRow>> {
	let sql = format!(
		"\
SELECT {EPISODE_COLUMNS}
FROM episodes
WHERE mental_model_id IS NULL OR mental_model_id = 0
ORDER BY id"
	);
	let rows = sqlx::query_as::<_, EpisodeRow>(&sql).fetch_all(&db.pool).await?;

	Ok(rows)
}

pub async fn list_linked_without_transcript(db: &Db) -> Result<Vec<EpisodeRow>> {
	let sql = format!(
		"\
SELECT {EPISODE_COLUMNS}
FROM episodes
WHERE (transcript IS NULL OR trim(transcript) = '')
	AND mental_model_id IS NOT NULL
	AND mental_model_id <> 0
ORDER BY id"
	);
	let rows = sqlx::query_as::<_, EpisodeRow>(&sql).fetch_all(&db.pool).await?;

	Ok(rows)
}

pub async fn count_episodes_with_transcript(db: &Db) -> Result<i64> {
	let count = sqlx::query_scalar(
		"SELECT count(*) FROM episodes WHERE transcript IS NOT NULL AND trim(transcript) <> ''",
	)
	.fetch_one(&db.pool)
	.await?;

	Ok(count)
}

pub async fn get_episode(db: &Db, id: i64) -> Result<Option<EpisodeRow>> {
	let sql = format!("SELECT {EPISODE_COLUMNS} FROM episodes WHERE id = ?1");
	let row = sqlx::query_as::<_, EpisodeRow>(&sql).bind(id).fetch_optional(&db.pool).await?;

	Ok(row)
}

pub async fn find_episode_by_guid(db: &Db, guid: &str) -> Result<Option<EpisodeRow>> {
	let sql = format!("SELECT {EPISODE_COLUMNS} FROM episodes WHERE rss_guid = ?1 LIMIT 1");
	let row = sqlx::query_as::<_, EpisodeRow>(&sql).bind(guid).fetch_optional(&db.pool).await?;

	Ok(row)
}

pub async fn find_episode_by_title(db: &Db, title: &str) -> Result<Option<EpisodeRow>> {
	let sql =
		format!("SELECT {EPISODE_COLUMNS} FROM episodes WHERE title = ?1 ORDER BY id LIMIT 1");
	let row = sqlx::query_as::<_, EpisodeRow>(&sql).bind(title).fetch_optional(&db.pool).await?;

	Ok(row)
}

pub async fn insert_feed_episode(
	db: &Db,
	fields: &FeedEpisodeFields,
	now: OffsetDateTime,
) -> Result<i64> {
	let result = sqlx::query(
		"\
INSERT INTO episodes (
	title,
	description,
	rss_guid,
	rss_link,
	rss_pubdate,
	mental_model_id,
	created_at,
	updated_at
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
	)
	.bind(fields.title.as_deref())
	.bind(fields.description.as_deref())
	.bind(fields.rss_guid.as_deref())
	.bind(fields.rss_link.as_deref())
	.bind(fields.rss_pubdate.as_deref())
	.bind(fields.mental_model_id)
	.bind(now)
	.execute(&db.pool)
	.await?;

	Ok(result.last_insert_rowid())
}

/// Merges feed fields into an existing episode. Absent fields and an absent link never clear
/// stored values.
pub async fn merge_feed_episode(
	db: &Db,
	id: i64,
	fields: &FeedEpisodeFields,
	now: OffsetDateTime,
) -> Result<()> {
	sqlx::query(
		"\
UPDATE episodes
SET
	title = COALESCE(?1, title),
	description = COALESCE(?2, description),
	rss_guid = COALESCE(?3, rss_guid),
	rss_link = COALESCE(?4, rss_link),
	rss_pubdate = COALESCE(?5, rss_pubdate),
	mental_model_id = COALESCE(?6, mental_model_id),
	updated_at = ?7
WHERE id = ?8",
	)
	.bind(fields.title.as_deref())
	.bind(fields.description.as_deref())
	.bind(fields.rss_guid.as_deref())
	.bind(fields.rss_link.as_deref())
	.bind(fields.rss_pubdate.as_deref())
	.bind(fields.mental_model_id)
	.bind(now)
	.bind(id)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn insert_transcript_episode(
	db: &Db,
	title: &str,
	mental_model_id: Option<i64>,
	transcript: &TranscriptFields,
	now: OffsetDateTime,
) -> Result<i64> {
	let result = sqlx::query(
		"\
INSERT INTO episodes (
	mental_model_id,
	title,
	transcript,
	transcript_source,
	transcript_index,
	created_at,
	updated_at
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
	)
	.bind(mental_model_id)
	.bind(title)
	.bind(transcript.transcript.as_str())
	.bind(transcript.source.as_str())
	.bind(transcript.index)
	.bind(now)
	.execute(&db.pool)
	.await?;

	Ok(result.last_insert_rowid())
}

pub async fn attach_transcript(
	db: &Db,
	id: i64,
	transcript: &TranscriptFields,
	now: OffsetDateTime,
) -> Result<()> {
	sqlx::query(
		"\
UPDATE episodes
SET
	transcript = ?1,
	transcript_source = ?2,
	transcript_index = ?3,
	updated_at = ?4
WHERE id = ?5",
	)
	.bind(transcript.transcript.as_str())
	.bind(transcript.source.as_str())
	.bind(transcript.index)
	.bind(now)
	.bind(id)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Links an episode to a concept, replacing its title when `title` is given.
pub async fn link_episode(
	db: &Db,
	id: i64,
	mental_model_id: i64,
	title: Option<&str>,
	now: OffsetDateTime,
) -> Result<()> {
	let result = sqlx::query(
		"\
UPDATE episodes
SET
	mental_model_id = ?1,
	title = COALESCE(?2, title),
	updated_at = ?3
WHERE id = ?4",
	)
	.bind(mental_model_id)
	.bind(title)
	.bind(now)
	.bind(id)
	.execute(&db.pool)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::InvalidArgument(format!("Episode {id} does not exist.")));
	}

	Ok(())
}
