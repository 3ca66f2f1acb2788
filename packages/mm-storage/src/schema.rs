pub const MENTAL_MODELS: &str = "mental_models";
pub const EPISODES: &str = "episodes";

/// Every column the queries in this crate read or write, per table.
pub const REQUIRED_COLUMNS: [(&str, &[&str]); 2] = [
	(
		MENTAL_MODELS,
		&["id", "name", "category", "description", "notes", "metadata", "created_at", "updated_at"],
	),
	(
		EPISODES,
		&[
			"id",
			"mental_model_id",
			"title",
			"description",
			"rss_guid",
			"rss_link",
			"rss_pubdate",
			"transcript",
			"transcript_source",
			"transcript_index",
			"created_at",
			"updated_at",
		],
	),
];

/// Columns added to databases created by older releases. Keys and constrained columns are not
/// listed because SQLite cannot add them after the fact.
pub const BACKFILL_COLUMNS: [(&str, &str, &str); 17] = [
	(MENTAL_MODELS, "category", "TEXT"),
	(MENTAL_MODELS, "description", "TEXT"),
	(MENTAL_MODELS, "notes", "TEXT"),
	(MENTAL_MODELS, "metadata", "TEXT"),
	(MENTAL_MODELS, "created_at", "TEXT"),
	(MENTAL_MODELS, "updated_at", "TEXT"),
	(EPISODES, "mental_model_id", "INTEGER REFERENCES mental_models (id)"),
	(EPISODES, "title", "TEXT"),
	(EPISODES, "description", "TEXT"),
	(EPISODES, "rss_guid", "TEXT"),
	(EPISODES, "rss_link", "TEXT"),
	(EPISODES, "rss_pubdate", "TEXT"),
	(EPISODES, "transcript", "TEXT"),
	(EPISODES, "transcript_source", "TEXT"),
	(EPISODES, "transcript_index", "INTEGER"),
	(EPISODES, "created_at", "TEXT"),
	(EPISODES, "updated_at", "TEXT"),
];

pub fn render_schema() -> String {
	expand_includes(include_str!("../../../sql/init.sql"))
}

pub fn render_indexes() -> String {
	include_str!("../../../sql/indexes.sql").to_string()
}

/// Splits a rendered script into executable statements.
pub fn statements(sql: &str) -> impl Iterator<Item = &str> {
	sql.split(';').map(str::trim).filter(|statement| !statement.is_empty())
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_mental_models.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_mental_models.sql")),
				"tables/002_episodes.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_episodes.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn includes_are_expanded() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS mental_models"));
		assert!(sql.contains("CREATE TABLE IF NOT EXISTS episodes"));
		assert_eq!(statements(&sql).count(), 2);
	}

	#[test]
	fn every_backfilled_column_is_required() {
		for (table, column, _) in BACKFILL_COLUMNS {
			let required = REQUIRED_COLUMNS
				.iter()
				.find(|(name, _)| *name == table)
				.map(|(_, columns)| columns.contains(&column))
				.unwrap_or(false);

			assert!(required, "{table}.{column} is backfilled but not required.");
		}
	}
}
