use std::cmp::Ordering;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{CatalogService, Result};
use mm_domain::{
	CandidateSource, ConceptRef, MatchClass, MatchResult, Matcher, extract_candidates,
	title_looks_bad,
};
use mm_storage::queries;

#[derive(Clone, Debug, Default, Serialize)]
pub struct RepairReport {
	pub dry_run: bool,
	pub examined: usize,
	pub fixed: usize,
	pub retitled: usize,
	pub skipped: usize,
	pub failed: usize,
	pub samples: Vec<RepairSample>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RepairSample {
	pub episode_id: i64,
	pub title: String,
	/// Set when the old title was a placeholder and got replaced by the concept name.
	pub new_title: Option<String>,
	pub concept: ConceptRef,
	pub class: MatchClass,
	pub source: CandidateSource,
}

impl CatalogService {
	/// Links unlinked episodes, with or without transcripts, through phrases pulled out of their
	/// titles and transcripts. Placeholder titles are replaced by the concept name.
	pub async fn repair_links(&self, dry_run: bool) -> Result<RepairReport> {
		let matcher = self.load_matcher().await?;
		let episodes = queries::list_unlinked_episodes(&self.db).await?;
		let now = OffsetDateTime::now_utc();
		let mut report = RepairReport { dry_run, examined: episodes.len(), ..Default::default() };

		for episode in &episodes {
			let title = episode.title_str();
			let Some((source, result)) = best_candidate(&matcher, title, episode.transcript_str())
			else {
				tracing::debug!(episode_id = episode.id, title, "No candidate matched.");

				report.skipped += 1;

				continue;
			};
			let new_title = title_looks_bad(title).then(|| result.concept.name.clone());

			if !dry_run
				&& let Err(err) = queries::link_episode(
					&self.db,
					episode.id,
					result.concept.id,
					new_title.as_deref(),
					now,
				)
				.await
			{
				tracing::warn!(episode_id = episode.id, error = %err, "Failed to repair link.");

				report.failed += 1;

				continue;
			}

			tracing::debug!(
				episode_id = episode.id,
				concept = %result.concept.name,
				class = result.class.as_str(),
				source = ?source,
				"Episode link repaired."
			);

			report.fixed += 1;

			if new_title.is_some() {
				report.retitled += 1;
			}
			if report.samples.len() < self.cfg.linking.sample_limit {
				report.samples.push(RepairSample {
					episode_id: episode.id,
					title: title.to_string(),
					new_title,
					concept: result.concept,
					class: result.class,
					source,
				});
			}
		}

		tracing::info!(
			dry_run,
			examined = report.examined,
			fixed = report.fixed,
			retitled = report.retitled,
			skipped = report.skipped,
			"Link repair finished."
		);

		Ok(report)
	}
}

/// Best match over all candidates: most trusted class, then confidence, then the longer key.
fn best_candidate(
	matcher: &Matcher,
	title: &str,
	transcript: &str,
) -> Option<(CandidateSource, MatchResult)> {
	let mut best: Option<(CandidateSource, MatchResult)> = None;

	for candidate in extract_candidates(title, transcript) {
		let Some(result) = matcher.match_key(&candidate.key) else { continue };

		if best.as_ref().is_none_or(|(_, incumbent)| compare(&result, incumbent).is_gt()) {
			best = Some((candidate.source, result));
		}
	}

	best
}

fn compare(a: &MatchResult, b: &MatchResult) -> Ordering {
	b.class
		.rank()
		.cmp(&a.class.rank())
		.then(a.confidence.total_cmp(&b.confidence))
		.then(a.key.chars().count().cmp(&b.key.chars().count()))
}
