use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::{CatalogService, Result};
use mm_storage::{models::ConceptFields, queries};

/// One catalog entry as authored in an import file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConceptImport {
	pub name: String,
	pub category: Option<String>,
	pub description: Option<String>,
	pub notes: Option<String>,
	pub metadata: Option<Value>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ImportConceptsReport {
	pub inserted: usize,
	pub updated: usize,
	pub skipped: usize,
	pub failed: usize,
}

impl CatalogService {
	/// Reads a JSON array of [`ConceptImport`] and upserts it.
	pub async fn import_concepts_file(&self, path: &Path) -> Result<ImportConceptsReport> {
		let raw = tokio::fs::read_to_string(path).await?;
		let entries: Vec<ConceptImport> = serde_json::from_str(&raw)?;

		tracing::info!(path = %path.display(), entries = entries.len(), "Importing concepts.");

		self.import_concepts(&entries).await
	}

	/// Upserts concepts matched case-insensitively by name. Entries without a name are skipped.
	pub async fn import_concepts(&self, entries: &[ConceptImport]) -> Result<ImportConceptsReport> {
		let now = OffsetDateTime::now_utc();
		let mut report = ImportConceptsReport::default();

		for entry in entries {
			let name = entry.name.trim();

			if name.is_empty() {
				report.skipped += 1;

				continue;
			}

			let fields = ConceptFields {
				name: name.to_string(),
				category: non_blank(entry.category.as_deref()),
				description: non_blank(entry.description.as_deref()),
				notes: non_blank(entry.notes.as_deref()),
				metadata: entry.metadata.clone().filter(|value| !value.is_null()),
			};

			match self.upsert_concept(&fields, now).await {
				Ok(true) => report.inserted += 1,
				Ok(false) => report.updated += 1,
				Err(err) => {
					tracing::warn!(name, error = %err, "Failed to store concept.");

					report.failed += 1;
				},
			}
		}

		tracing::info!(
			inserted = report.inserted,
			updated = report.updated,
			skipped = report.skipped,
			failed = report.failed,
			"Concept import finished."
		);

		Ok(report)
	}

	/// Returns `true` when a new concept was inserted.
	async fn upsert_concept(
		&self,
		fields: &ConceptFields,
		now: OffsetDateTime,
	) -> mm_storage::Result<bool> {
		match queries::find_concept_by_name(&self.db, &fields.name).await? {
			Some(existing) => {
				queries::update_concept(&self.db, existing.id, fields, now).await?;

				Ok(false)
			},
			None => {
				queries::insert_concept(&self.db, fields, now).await?;

				Ok(true)
			},
		}
	}
}

fn non_blank(value: Option<&str>) -> Option<String> {
	value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}
