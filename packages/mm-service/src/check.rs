use serde::Serialize;

use crate::{CatalogService, Result};
use mm_domain::MatchResult;
use mm_storage::queries;

const SNIPPET_CHARS: usize = 220;

#[derive(Clone, Debug, Serialize)]
pub struct MissingReport {
	pub episodes_with_transcript: i64,
	/// Episodes with a transcript but no concept.
	pub unlinked: Vec<UnlinkedEpisode>,
	/// Linked episodes still waiting for a transcript.
	pub without_transcript: Vec<EpisodeBrief>,
}

#[derive(Clone, Debug, Serialize)]
pub struct UnlinkedEpisode {
	pub id: i64,
	pub title: String,
	pub guessed: Option<String>,
	/// What auto-linking would pick today, if anything.
	pub suggestion: Option<MatchResult>,
	pub snippet: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct EpisodeBrief {
	pub id: i64,
	pub title: String,
}

impl CatalogService {
	pub async fn check_missing(&self) -> Result<MissingReport> {
		let matcher = self.load_matcher().await?;
		let guesser = self.guesser();
		let episodes_with_transcript = queries::count_episodes_with_transcript(&self.db).await?;
		let unlinked = queries::list_unlinked_episodes(&self.db)
			.await?
			.into_iter()
			.filter(|episode| episode.has_transcript())
			.map(|episode| {
				let transcript = episode.transcript_str();
				let suggestion = matcher
					.match_episode(episode.title_str(), transcript, &guesser)
					.matched()
					.cloned();

				UnlinkedEpisode {
					id: episode.id,
					title: episode.title_str().to_string(),
					guessed: guesser.guess(transcript),
					suggestion,
					snippet: crate::snippet(transcript, SNIPPET_CHARS),
				}
			})
			.collect::<Vec<_>>();
		let without_transcript = queries::list_linked_without_transcript(&self.db)
			.await?
			.into_iter()
			.map(|episode| EpisodeBrief { id: episode.id, title: episode.title_str().to_string() })
			.collect::<Vec<_>>();

		tracing::info!(
			episodes_with_transcript,
			unlinked = unlinked.len(),
			without_transcript = without_transcript.len(),
			"Missing-link check finished."
		);

		Ok(MissingReport { episodes_with_transcript, unlinked, without_transcript })
	}
}
