//! Candidate concept phrases pulled out of an episode title and transcript.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::canonical::{self, ColonPolicy};

/// Captures this short are too noisy to be names.
const MIN_CAPTURE_CHARS: usize = 4;

static TITLE_PATTERNS: LazyLock<[(CandidateSource, Regex); 4]> = LazyLock::new(|| {
	[
		(
			CandidateSource::AfterColonBeforeAlias,
			Regex::new(r"(?i):\s*([^:.,]+?)(?:,|\.|$| also known as)")
				.expect("colon alias pattern must compile"),
		),
		(
			CandidateSource::AfterColon,
			Regex::new(r"(?i):\s*([^:.,]+?)(?:\.|$)").expect("colon pattern must compile"),
		),
		(
			CandidateSource::BeforeAlias,
			Regex::new(r"(?i)([^,]+?)(?:\s*,?\s*also known as\s+[^,]+)")
				.expect("alias pattern must compile"),
		),
		(
			CandidateSource::BeforeParenthetical,
			Regex::new(r"(?i)([^(]+?)(?:\s*\([^)]+\))?$")
				.expect("parenthetical pattern must compile"),
		),
	]
});
static TRANSCRIPT_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)also known as\s+([^,.;]+)").expect("transcript alias pattern must compile")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
	/// `X: Y, also known as Z` yields `Y`.
	AfterColonBeforeAlias,
	/// `X: Y` yields `Y`.
	AfterColon,
	/// `X, also known as Y` yields `X`.
	BeforeAlias,
	/// `X (Y)` yields `X`.
	BeforeParenthetical,
	TranscriptAlias,
	FullTitle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Candidate {
	pub source: CandidateSource,
	/// Canonical key of the captured phrase.
	pub key: String,
}

/// Extracts distinct canonical candidates, title patterns first and the whole title last.
pub fn extract_candidates(title: &str, transcript: &str) -> Vec<Candidate> {
	let mut out: Vec<Candidate> = Vec::new();
	let mut push = |source: CandidateSource, key: String| {
		if !key.is_empty() && !out.iter().any(|candidate| candidate.key == key) {
			out.push(Candidate { source, key });
		}
	};

	for (source, pattern) in TITLE_PATTERNS.iter() {
		for captures in pattern.captures_iter(title) {
			let Some(found) = captures.get(1) else { continue };
			let phrase = found.as_str().trim();

			if phrase.chars().count() < MIN_CAPTURE_CHARS {
				continue;
			}

			push(*source, canonical::canonicalize(phrase, ColonPolicy::ShorterSideOfColon));
		}
	}

	for captures in TRANSCRIPT_ALIAS.captures_iter(transcript) {
		let Some(found) = captures.get(1) else { continue };

		push(
			CandidateSource::TranscriptAlias,
			canonical::canonicalize(found.as_str().trim(), ColonPolicy::ShorterSideOfColon),
		);
	}

	push(
		CandidateSource::FullTitle,
		canonical::canonicalize(title, ColonPolicy::TruncateAfterColon),
	);

	out
}
