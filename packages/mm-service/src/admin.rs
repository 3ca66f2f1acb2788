use serde::Serialize;

use crate::{CatalogService, Result};
use mm_storage::queries;

#[derive(Clone, Debug, Serialize)]
pub struct InitReport {
	pub database: String,
	pub concepts: usize,
	pub episodes: usize,
}

impl CatalogService {
	/// Creates missing tables, adds missing columns, then verifies the result.
	pub async fn init_db(&self) -> Result<InitReport> {
		self.db.ensure_schema().await?;

		let concepts = queries::list_concepts(&self.db).await?.len();
		let episodes = queries::list_episodes(&self.db).await?.len();

		tracing::info!(concepts, episodes, "Database schema is ready.");

		Ok(InitReport {
			database: self.cfg.storage.sqlite.path.display().to_string(),
			concepts,
			episodes,
		})
	}

	/// Fails when a table or required column is missing.
	pub async fn verify_db(&self) -> Result<()> {
		self.db.verify_schema().await?;

		Ok(())
	}
}
