use serde::Serialize;
use time::OffsetDateTime;

use crate::{CatalogService, Error, Result};
use mm_domain::{ConceptRef, MatchClass, MatchOutcome};
use mm_storage::queries;

#[derive(Clone, Debug, Default, Serialize)]
pub struct AutoLinkReport {
	pub dry_run: bool,
	pub scanned: usize,
	pub already_linked: usize,
	pub linked: usize,
	pub no_match: usize,
	pub ambiguous: usize,
	pub skipped_no_transcript: usize,
	pub failed: usize,
	pub samples: Vec<LinkSample>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LinkSample {
	pub episode_id: i64,
	pub title: String,
	pub concept: ConceptRef,
	pub class: MatchClass,
	pub confidence: f64,
}

impl CatalogService {
	/// Links every unlinked episode that has a transcript, using the title, then a guessed
	/// phrase, then variant search over title and transcript.
	///
	/// Ambiguous episodes are counted and left alone. Nothing is written when `dry_run` is set.
	pub async fn auto_link(&self, dry_run: bool) -> Result<AutoLinkReport> {
		let matcher = self.load_matcher().await?;

		if matcher.variants().is_empty() {
			return Err(Error::NoVariants);
		}

		let guesser = self.guesser();
		let episodes = queries::list_episodes(&self.db).await?;
		let now = OffsetDateTime::now_utc();
		let mut report =
			AutoLinkReport { dry_run, scanned: episodes.len(), ..Default::default() };

		for episode in &episodes {
			if !episode.has_transcript() {
				report.skipped_no_transcript += 1;

				continue;
			}
			if episode.concept_id().is_some() {
				report.already_linked += 1;

				continue;
			}

			let result = match matcher.match_episode(
				episode.title_str(),
				episode.transcript_str(),
				&guesser,
			) {
				MatchOutcome::Matched(result) => result,
				MatchOutcome::Ambiguous { candidates } => {
					let concept_ids =
						candidates.iter().map(|hit| hit.concept.id).collect::<Vec<_>>();

					tracing::debug!(
						episode_id = episode.id,
						candidates = ?concept_ids,
						"Ambiguous episode skipped."
					);

					report.ambiguous += 1;

					continue;
				},
				MatchOutcome::NoMatch => {
					report.no_match += 1;

					continue;
				},
			};

			if !dry_run
				&& let Err(err) =
					queries::link_episode(&self.db, episode.id, result.concept.id, None, now).await
			{
				tracing::warn!(episode_id = episode.id, error = %err, "Failed to link episode.");

				report.failed += 1;

				continue;
			}

			tracing::debug!(
				episode_id = episode.id,
				concept = %result.concept.name,
				class = result.class.as_str(),
				confidence = result.confidence,
				"Episode linked."
			);

			report.linked += 1;

			if report.samples.len() < self.cfg.linking.sample_limit {
				report.samples.push(LinkSample {
					episode_id: episode.id,
					title: episode.title_str().to_string(),
					concept: result.concept,
					class: result.class,
					confidence: result.confidence,
				});
			}
		}

		tracing::info!(
			dry_run,
			scanned = report.scanned,
			already_linked = report.already_linked,
			linked = report.linked,
			no_match = report.no_match,
			ambiguous = report.ambiguous,
			"Auto-link finished."
		);

		Ok(report)
	}
}
