use serde::Serialize;
use time::OffsetDateTime;

use crate::{CatalogService, Result};
use mm_domain::{ColonPolicy, Matcher};
use mm_providers::FeedEntry;
use mm_storage::{models::FeedEpisodeFields, queries};

#[derive(Clone, Debug, Default, Serialize)]
pub struct ImportRssReport {
	pub url: String,
	pub entries: usize,
	pub inserted: usize,
	pub updated: usize,
	/// Entries whose title matched a concept.
	pub linked: usize,
	pub failed: usize,
}

impl CatalogService {
	/// Fetches a feed and merges its entries into the episode table.
	///
	/// Existing episodes are found by guid, then by exact title. Blank entry values never
	/// overwrite stored ones and an existing link is never cleared.
	pub async fn import_rss(&self, url: &str) -> Result<ImportRssReport> {
		let matcher = self.load_matcher().await?;
		let entries = self.providers.feeds.fetch(&self.cfg.feeds, url).await?;
		let now = OffsetDateTime::now_utc();
		let mut report =
			ImportRssReport { url: url.to_string(), entries: entries.len(), ..Default::default() };

		tracing::info!(url, entries = entries.len(), "Importing feed entries.");

		for entry in &entries {
			let fields = feed_fields(&matcher, entry);

			if fields.mental_model_id.is_some() {
				report.linked += 1;
			}

			match self.merge_entry(entry, &fields, now).await {
				Ok(true) => report.inserted += 1,
				Ok(false) => report.updated += 1,
				Err(err) => {
					tracing::warn!(
						title = %entry.title,
						error = %err,
						"Failed to store feed entry."
					);

					report.failed += 1;
				},
			}
		}

		tracing::info!(
			inserted = report.inserted,
			updated = report.updated,
			linked = report.linked,
			failed = report.failed,
			"Feed import finished."
		);

		Ok(report)
	}

	/// Returns `true` when a new episode was inserted.
	async fn merge_entry(
		&self,
		entry: &FeedEntry,
		fields: &FeedEpisodeFields,
		now: OffsetDateTime,
	) -> mm_storage::Result<bool> {
		let mut existing = None;

		if let Some(guid) = entry.guid.as_deref() {
			existing = queries::find_episode_by_guid(&self.db, guid).await?;
		}
		if existing.is_none() && !entry.title.is_empty() {
			existing = queries::find_episode_by_title(&self.db, &entry.title).await?;
		}

		match existing {
			Some(episode) => {
				queries::merge_feed_episode(&self.db, episode.id, fields, now).await?;

				Ok(false)
			},
			None => {
				queries::insert_feed_episode(&self.db, fields, now).await?;

				Ok(true)
			},
		}
	}
}

fn feed_fields(matcher: &Matcher, entry: &FeedEntry) -> FeedEpisodeFields {
	let matched = if entry.title.is_empty() {
		None
	} else {
		matcher.match_query(&entry.title, ColonPolicy::TruncateAfterColon)
	};

	if let Some(result) = &matched {
		tracing::debug!(
			title = %entry.title,
			concept = %result.concept.name,
			class = result.class.as_str(),
			confidence = result.confidence,
			"Feed entry matched."
		);
	}

	FeedEpisodeFields {
		title: (!entry.title.is_empty()).then(|| entry.title.clone()),
		description: entry.description.clone(),
		rss_guid: entry.guid.clone(),
		rss_link: entry.link.clone(),
		rss_pubdate: entry.published.clone(),
		mental_model_id: matched.map(|result| result.concept.id),
	}
}
