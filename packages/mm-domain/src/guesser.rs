//! Best-effort extraction of a concept name from the opening of a transcript.
//!
//! Patterns run in a fixed order and the first one that produces a phrase decides. Only the
//! first `window_chars` grapheme clusters are scanned.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

const GENERIC_SUBJECTS: [&str; 5] =
	["this concept", "this principle", "this model", "this idea", "this bias"];
const TRIM_CHARS: &[char] = &[
	' ', '.', ':', '"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}', '*', '_', ',', ';',
	'!', '?',
];
const ARTICLE_NAME_CHARS: std::ops::RangeInclusive<usize> = 4..=81;

static TEMPORAL_OPENER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(concat!(
		r"(?is)\btoday,?\s+we(?:'|’|\s+a)re\s+",
		r"(?:diving\s+into|examining|exploring|discussing|delving\s+into|focusing\s+on|unraveling|looking\s+at)",
		r"\s+(?:the\s+concept\s+of\s+)?(?P<name>.+?)(?:[.!?\n]|$)",
	))
	.expect("temporal opener pattern must compile")
});
static COLON_OPENER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i:\btoday\b)[^\n]*?:\s*(?P<name>[A-Z][^.!?\n]+)")
		.expect("colon opener pattern must compile")
});
static DIVING_INTO: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"(?is)\bwe(?:'|’|\s+a)re\s+diving\s+into\s+(?:the\s+concept\s+of\s+)?(?P<name>.+?)(?:[.!?\n]|$)",
	)
	.expect("diving-into pattern must compile")
});
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?:#+\s*)?(?:\*\*|__)?(?P<name>[A-Z][A-Za-z0-9'’ \-/&]{3,79})(?:\*\*|__)?\s*$")
		.expect("heading pattern must compile")
});
static COPULA: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"\b(?P<name>[A-Z][A-Za-z0-9'’ \-/&]{3,79}?)\s+(?:is|are|teaches|highlights|explains)\b",
	)
	.expect("copula pattern must compile")
});
static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"["“‘'](?P<name>[A-Z][A-Za-z0-9'’ \-/&]{2,80})["”’']"#)
		.expect("quoted pattern must compile")
});
static DEFINITE_ARTICLE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(concat!(
		r"\b[Tt]he\s+(?P<name>[A-Z][A-Za-z0-9'’\-/&]*",
		r"(?:\s+(?:(?:of|the|and|in|on|to|for|vs|a|an)\s+)*[A-Z][A-Za-z0-9'’\-/&]*)*)",
	))
	.expect("definite article pattern must compile")
});
static LONG_PHRASE_CUT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r",|\bwhich\b|\bthat\b").expect("long phrase cut pattern must compile")
});

/// Which heuristic produced a guess.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessPattern {
	/// `Today, we're exploring ...`
	TemporalOpener,
	/// `Today ...: Name`
	ColonOpener,
	/// `We're diving into ...` without `today`.
	DivingInto,
	Heading,
	Copula,
	Quoted,
	DefiniteArticle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Guess {
	pub phrase: String,
	pub pattern: GuessPattern,
}

#[derive(Clone, Debug)]
pub struct NameGuesser {
	window_chars: usize,
	max_phrase_chars: usize,
	/// Lowercased.
	boilerplate: Vec<String>,
}
impl NameGuesser {
	pub fn new(cfg: &mm_config::Guessing) -> Self {
		Self {
			window_chars: cfg.window_chars,
			max_phrase_chars: cfg.max_phrase_chars,
			boilerplate: cfg
				.boilerplate_phrases
				.iter()
				.map(|phrase| phrase.trim().to_lowercase())
				.filter(|phrase| !phrase.is_empty())
				.collect(),
		}
	}

	pub fn guess(&self, text: &str) -> Option<String> {
		self.guess_detailed(text).map(|guess| guess.phrase)
	}

	pub fn guess_detailed(&self, text: &str) -> Option<Guess> {
		let window = self.window(text);

		if window.trim().is_empty() {
			return None;
		}

		for (pattern, regex) in [
			(GuessPattern::TemporalOpener, &*TEMPORAL_OPENER),
			(GuessPattern::ColonOpener, &*COLON_OPENER),
			(GuessPattern::DivingInto, &*DIVING_INTO),
		] {
			if let Some(captures) = regex.captures(&window) {
				return self.finish(&captures["name"], pattern);
			}
		}

		if let Some(line) = window.trim_start().lines().next()
			&& let Some(captures) = HEADING.captures(line.trim_end())
		{
			let name = &captures["name"];

			if !self.is_boilerplate(name) && !name.to_lowercase().starts_with("welcome") {
				return self.finish(name, GuessPattern::Heading);
			}
		}

		for captures in COPULA.captures_iter(&window) {
			let name = clean(&captures["name"]);
			let lower = name.to_lowercase();

			if GENERIC_SUBJECTS.iter().any(|subject| lower.starts_with(subject))
				|| self.is_boilerplate(name)
			{
				continue;
			}

			return self.finish(name, GuessPattern::Copula);
		}

		if let Some(captures) = QUOTED.captures(&window) {
			return self.finish(&captures["name"], GuessPattern::Quoted);
		}

		for captures in DEFINITE_ARTICLE.captures_iter(&window) {
			let name = clean(&captures["name"]);

			if !ARTICLE_NAME_CHARS.contains(&name.chars().count()) || self.is_boilerplate(name) {
				continue;
			}

			return self.finish(name, GuessPattern::DefiniteArticle);
		}

		None
	}

	fn window(&self, text: &str) -> String {
		let head = text.graphemes(true).take(self.window_chars).collect::<String>();

		head.nfkd().collect()
	}

	fn finish(&self, raw: &str, pattern: GuessPattern) -> Option<Guess> {
		let mut phrase = clean(raw);

		if phrase.chars().count() > self.max_phrase_chars
			&& let Some(cut) = LONG_PHRASE_CUT.find(phrase)
		{
			phrase = clean(&phrase[..cut.start()]);
		}

		if phrase.is_empty() {
			return None;
		}

		Some(Guess { phrase: phrase.to_string(), pattern })
	}

	fn is_boilerplate(&self, name: &str) -> bool {
		let lower = name.to_lowercase();

		self.boilerplate.iter().any(|phrase| {
			lower.strip_prefix(phrase.as_str()).is_some_and(|rest| {
				rest.chars().next().is_none_or(|ch| !ch.is_alphanumeric())
			})
		})
	}
}
impl Default for NameGuesser {
	fn default() -> Self {
		Self::new(&mm_config::Guessing::default())
	}
}

fn clean(raw: &str) -> &str {
	raw.trim().trim_matches(TRIM_CHARS).trim()
}
