use serde_json::json;
use time::OffsetDateTime;

use mm_config::Sqlite;
use mm_storage::{
	Error,
	db::Db,
	models::{ConceptFields, FeedEpisodeFields, TranscriptFields},
	queries,
};
use mm_testkit::TestDatabase;

async fn connect(test_db: &TestDatabase) -> Db {
	let cfg = Sqlite { path: test_db.path().to_path_buf(), pool_max_conns: 1 };

	Db::connect(&cfg).await.expect("Failed to connect to SQLite.")
}

async fn bootstrapped(test_db: &TestDatabase) -> Db {
	let db = connect(test_db).await;

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

fn concept(name: &str) -> ConceptFields {
	ConceptFields { name: name.to_string(), ..ConceptFields::default() }
}

#[tokio::test]
async fn bootstrap_is_repeatable() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let db = bootstrapped(&test_db).await;

	db.ensure_schema().await.expect("Failed to re-run schema bootstrap.");

	let count: i64 = sqlx::query_scalar(
		"\
SELECT count(*)
FROM sqlite_master
WHERE type = 'table' AND name IN ('mental_models', 'episodes')",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 2);

	db.pool.close().await;
	test_db.cleanup().expect("Failed to clean up test database.");
}

#[tokio::test]
async fn legacy_tables_gain_missing_columns() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let db = connect(&test_db).await;

	for statement in [
		"CREATE TABLE mental_models (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE)",
		"CREATE TABLE episodes (id INTEGER PRIMARY KEY, mental_model_id INTEGER, title TEXT)",
		"INSERT INTO episodes (mental_model_id, title) VALUES (0, 'Old episode')",
	] {
		sqlx::query(statement).execute(&db.pool).await.expect("Failed to seed legacy schema.");
	}

	let err = db.verify_schema().await.expect_err("Expected a missing column.");

	assert!(
		matches!(err, Error::MissingColumn { table: "mental_models", column: "category" }),
		"Unexpected error: {err}"
	);

	db.ensure_schema().await.expect("Failed to upgrade legacy schema.");

	let unlinked = queries::list_unlinked_episodes(&db).await.expect("Failed to list episodes.");

	assert_eq!(unlinked.len(), 1);
	assert_eq!(unlinked[0].title_str(), "Old episode");
	assert_eq!(unlinked[0].concept_id(), None);
	assert!(!unlinked[0].has_transcript());

	db.pool.close().await;
}

#[tokio::test]
async fn concepts_are_found_case_insensitively_and_updated_in_place() {
	mm_testkit::with_test_db(|test_db| {
		let path = test_db.path().to_path_buf();

		async move {
			let db = Db::connect(&Sqlite { path, pool_max_conns: 1 })
				.await
				.expect("Failed to connect to SQLite.");

			db.ensure_schema().await.expect("Failed to ensure schema.");

			let now = OffsetDateTime::now_utc();
			let fields = ConceptFields {
				category: Some("Thinking".to_string()),
				metadata: Some(json!({ "source": "catalog" })),
				..concept("Occam's Razor")
			};
			let id = queries::insert_concept(&db, &fields, now).await.expect("Failed to insert.");
			let found = queries::find_concept_by_name(&db, "  occam's razor ")
				.await
				.expect("Failed to look up concept.")
				.expect("Expected the concept to exist.");

			assert_eq!(found.id, id);
			assert_eq!(found.metadata.as_ref().map(|value| value.0.clone()), fields.metadata);

			let update = ConceptFields {
				description: Some("Prefer the simplest explanation.".to_string()),
				..concept("Occam's Razor")
			};

			queries::update_concept(&db, id, &update, now).await.expect("Failed to update.");

			let concepts = queries::list_concepts(&db).await.expect("Failed to list concepts.");

			assert_eq!(concepts.len(), 1);
			assert_eq!(concepts[0].category.as_deref(), Some("Thinking"));
			assert_eq!(
				concepts[0].description.as_deref(),
				Some("Prefer the simplest explanation.")
			);

			let err = queries::insert_concept(&db, &concept("OCCAM'S RAZOR"), now)
				.await
				.expect_err("Expected a uniqueness violation.");

			assert!(matches!(err, Error::Sqlx(_)), "Unexpected error: {err}");

			db.pool.close().await;

			Ok(())
		}
	})
	.await
	.expect("Test database run failed.");
}

#[tokio::test]
async fn feed_merge_never_clears_links_or_fields() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let db = bootstrapped(&test_db).await;
	let now = OffsetDateTime::now_utc();
	let concept_id =
		queries::insert_concept(&db, &concept("Inversion"), now).await.expect("Failed to insert.");
	let episode_id = queries::insert_feed_episode(
		&db,
		&FeedEpisodeFields {
			title: Some("Inversion".to_string()),
			description: Some("Think backwards.".to_string()),
			rss_guid: Some("guid-1".to_string()),
			mental_model_id: Some(concept_id),
			..FeedEpisodeFields::default()
		},
		now,
	)
	.await
	.expect("Failed to insert episode.");

	queries::merge_feed_episode(
		&db,
		episode_id,
		&FeedEpisodeFields {
			rss_link: Some("https://example.com/inversion".to_string()),
			..FeedEpisodeFields::default()
		},
		now,
	)
	.await
	.expect("Failed to merge episode.");

	let episode = queries::find_episode_by_guid(&db, "guid-1")
		.await
		.expect("Failed to look up episode.")
		.expect("Expected the episode to exist.");

	assert_eq!(episode.id, episode_id);
	assert_eq!(episode.concept_id(), Some(concept_id));
	assert_eq!(episode.description.as_deref(), Some("Think backwards."));
	assert_eq!(episode.rss_link.as_deref(), Some("https://example.com/inversion"));
	assert!(episode.updated_at.is_some());

	db.pool.close().await;
}

#[tokio::test]
async fn transcripts_and_links_are_written() {
	let test_db = TestDatabase::new().expect("Failed to create test database.");
	let db = bootstrapped(&test_db).await;
	let now = OffsetDateTime::now_utc();
	let concept_id = queries::insert_concept(&db, &concept("Hindsight Bias"), now)
		.await
		.expect("Failed to insert.");
	let transcript = TranscriptFields {
		transcript: "Welcome to Mental Models Daily.".to_string(),
		source: "season-1/batch.txt".to_string(),
		index: 2,
	};
	let episode_id = queries::insert_transcript_episode(&db, "12", None, &transcript, now)
		.await
		.expect("Failed to insert episode.");

	assert_eq!(queries::count_episodes_with_transcript(&db).await.expect("Failed to count."), 1);

	queries::link_episode(&db, episode_id, concept_id, Some("Hindsight Bias"), now)
		.await
		.expect("Failed to link episode.");

	let episode = queries::get_episode(&db, episode_id)
		.await
		.expect("Failed to load episode.")
		.expect("Expected the episode to exist.");

	assert_eq!(episode.title_str(), "Hindsight Bias");
	assert_eq!(episode.concept_id(), Some(concept_id));
	assert_eq!(episode.transcript_index, Some(2));
	assert!(queries::list_unlinked_episodes(&db).await.expect("Failed to list.").is_empty());

	let err = queries::link_episode(&db, episode_id + 100, concept_id, None, now)
		.await
		.expect_err("Expected a missing episode.");

	assert!(matches!(err, Error::InvalidArgument(_)), "Unexpected error: {err}");

	db.pool.close().await;
}
