use serde::Serialize;

use crate::{CatalogService, Result};
use mm_domain::{Guess, MatchOutcome, title_looks_bad};

/// Decision for one episode-like input, with the intermediate signals that led to it.
#[derive(Clone, Debug, Serialize)]
pub struct MatchReport {
	pub title: String,
	pub title_looks_bad: bool,
	pub guess: Option<Guess>,
	#[serde(flatten)]
	pub outcome: MatchOutcome,
}

impl CatalogService {
	pub async fn match_one(&self, title: &str, transcript: Option<&str>) -> Result<MatchReport> {
		let matcher = self.load_matcher().await?;
		let guesser = self.guesser();
		let transcript = transcript.unwrap_or_default();

		Ok(MatchReport {
			title: title.to_string(),
			title_looks_bad: title_looks_bad(title),
			guess: guesser.guess_detailed(transcript),
			outcome: matcher.match_episode(title, transcript, &guesser),
		})
	}
}
