//! Canonical matching keys for concept names and free-form titles.
//!
//! A key only ever contains `[a-z0-9 ]`, single-spaced and trimmed. Every stage after the colon
//! policy maps that alphabet onto itself, which keeps `canonicalize` idempotent.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// How text around the first colon is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColonPolicy {
	/// Drop everything from the first colon on. Episode and feed titles carry taglines there.
	#[default]
	TruncateAfterColon,
	/// Keep the shorter side of the first colon. Used for phrases guessed from transcripts.
	ShorterSideOfColon,
}

/// A left side longer than this is treated as a descriptive preamble.
const LONG_PREAMBLE_CHARS: usize = 40;

static SPEAKER_LABEL: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s*(?:host|narrator|speaker(?:\s*\d+)?)\s*:\s*")
		.expect("speaker label pattern must compile")
});
static GREETING: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s*welcome(?:\s+back)?\s+to\s+[^,.!?;\n]*[,.!?;]\s*(?:where\b\s*)?")
		.expect("greeting pattern must compile")
});
static VERSUS: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\bversus\b").expect("versus pattern must compile"));
static LEAD_INS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
	[
		Regex::new(
			r"^(?:today\s+)?we\s*(?:re|are)\s+(?:diving into|examining|exploring|discussing|delving into|focusing on|unraveling|looking at)\b\s*",
		)
		.expect("temporal opener pattern must compile"),
		Regex::new(r"^imagine\s+you(?:\s*re|\s+are)?\b\s*")
			.expect("imagine opener pattern must compile"),
		Regex::new(concat!(
			r"^(?:a|an|the)\s+",
			r"(?:(?:powerful|fascinating|fundamental|revolutionary|strategic|economic|psychological)\s+)+",
			r"(?:concept|principle|tool|idea|thought experiment|framework|pattern|phenomenon|lens|force|paradox|bias|model)\b",
			r"(?:\s+(?:of|called|known\s+as)\b)?\s*",
		))
		.expect("descriptive opener pattern must compile"),
		Regex::new(
			r"^(?:a|an|the)\s+(?:concept|idea|tool|framework|thought experiment)\s+(?:of|called|known\s+as)\b\s*",
		)
		.expect("generic noun opener pattern must compile"),
		// Head nouns such as "paradox" belong to names like "The Paradox of Choice".
		Regex::new(
			r"^(?:a|an|the)\s+(?:paradox|bias|pattern|model|principle|phenomenon|force|lens)\s+(?:called|known\s+as)\b\s*",
		)
		.expect("named noun opener pattern must compile"),
	]
});

/// Computes the canonical matching key of `text`.
///
/// Never fails. Text that normalizes to nothing yields an empty key, which callers must treat
/// as unmatchable.
pub fn canonicalize(text: &str, policy: ColonPolicy) -> String {
	if text.trim().is_empty() {
		return String::new();
	}

	let folded = fold_case(text);
	let without_speaker = strip_speaker_label(&folded);
	let mut rest = apply_colon_policy(without_speaker, policy);

	while let Some(found) = GREETING.find(rest) {
		rest = &rest[found.end()..];
	}

	let connected = rest.replace(['/', '&', '+'], " and ");
	let cleaned = clean_symbols(&connected);
	let versus = VERSUS.replace_all(&cleaned, "vs");

	strip_lead_ins(&versus).to_string()
}

pub fn canonicalize_opt(text: Option<&str>, policy: ColonPolicy) -> String {
	text.map(|value| canonicalize(value, policy)).unwrap_or_default()
}

/// Canonicalizes raw bytes, replacing undecodable sequences before normalization.
pub fn canonicalize_bytes(bytes: &[u8], policy: ColonPolicy) -> String {
	canonicalize(&String::from_utf8_lossy(bytes), policy)
}

fn fold_case(text: &str) -> String {
	text.nfkd()
		.flat_map(char::to_lowercase)
		.nfkd()
		.filter(|ch| !is_combining_mark(*ch))
		.collect()
}

fn strip_speaker_label(text: &str) -> &str {
	match SPEAKER_LABEL.find(text) {
		Some(found) => &text[found.end()..],
		None => text,
	}
}

fn apply_colon_policy(text: &str, policy: ColonPolicy) -> &str {
	let Some((left, right)) = text.split_once(':') else { return text };

	match policy {
		ColonPolicy::TruncateAfterColon => left,
		ColonPolicy::ShorterSideOfColon => {
			let left = left.trim();
			let right = right.trim();
			let left_len = left.chars().count();
			let right_len = right.chars().count();

			if !right.is_empty() && (right_len <= left_len || left_len > LONG_PREAMBLE_CHARS) {
				right
			} else {
				left
			}
		},
	}
}

fn clean_symbols(text: &str) -> String {
	let mut out = String::with_capacity(text.len());

	for ch in text.chars() {
		match ch {
			// Apostrophes join their word: "occam's" becomes "occams".
			'\'' | '\u{2018}' | '\u{2019}' | '`' => {},
			'a'..='z' | '0'..='9' => out.push(ch),
			_ => out.push(' '),
		}
	}

	out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_lead_ins(text: &str) -> &str {
	let mut rest = text;

	loop {
		let before = rest.len();

		for pattern in LEAD_INS.iter() {
			if let Some(found) = pattern.find(rest) {
				rest = &rest[found.end()..];
			}
		}

		if rest.len() == before {
			return rest.trim_end();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn title(text: &str) -> String {
		canonicalize(text, ColonPolicy::TruncateAfterColon)
	}

	fn phrase(text: &str) -> String {
		canonicalize(text, ColonPolicy::ShorterSideOfColon)
	}

	#[test]
	fn apostrophes_join_words() {
		assert_eq!(title("Occam's Razor"), "occams razor");
		assert_eq!(title("Hanlon\u{2019}s Razor"), "hanlons razor");
	}

	#[test]
	fn title_policy_drops_tagline() {
		assert_eq!(title("occams razor: the simplicity principle"), "occams razor");
	}

	#[test]
	fn phrase_policy_keeps_shorter_side() {
		assert_eq!(
			phrase("a powerful tool for thinking about uncertainty: Error Bars"),
			"error bars"
		);
		assert_eq!(phrase("Error Bars: a powerful concept for reading charts"), "error bars");
	}

	#[test]
	fn phrase_policy_prefers_right_side_after_long_preamble() {
		let text = "Today we are looking at something that shapes every decision: Opportunity Cost \
		            and what it quietly hides from view in every single choice";

		assert_eq!(
			phrase(text),
			"opportunity cost and what it quietly hides from view in every single choice"
		);
	}

	#[test]
	fn connectors_become_and() {
		assert_eq!(title("Supply & Demand"), "supply and demand");
		assert_eq!(title("Risk/Reward"), "risk and reward");
		assert_eq!(title("Habits + Systems"), "habits and systems");
	}

	#[test]
	fn versus_spellings_converge() {
		assert_eq!(title("Fox versus Hedgehog"), "fox vs hedgehog");
		assert_eq!(title("Fox vs. Hedgehog"), "fox vs hedgehog");
		assert_eq!(title("Fox VS Hedgehog"), "fox vs hedgehog");
	}

	#[test]
	fn accents_are_folded() {
		assert_eq!(title("Café Économie"), "cafe economie");
		assert_eq!(title("Ｆｕｌｌｗｉｄｔｈ Razor"), "fullwidth razor");
	}

	#[test]
	fn lead_ins_are_stripped_from_the_start_only() {
		assert_eq!(
			phrase("Today, we're exploring the concept of Opportunity Cost"),
			"opportunity cost"
		);
		assert_eq!(phrase("We\u{2019}re diving into Inversion."), "inversion");
		assert_eq!(
			phrase("a powerful concept called Second-Order Thinking"),
			"second order thinking"
		);
		assert_eq!(
			title("Thinking about the concept of time"),
			"thinking about the concept of time"
		);
	}

	#[test]
	fn article_openers_keep_content_words() {
		assert_eq!(
			title("The Fundamental Attribution Error"),
			"the fundamental attribution error"
		);
		assert_eq!(title("The Fundamental Idea of Leverage"), "leverage");
	}

	#[test]
	fn head_nouns_of_names_are_kept() {
		assert_eq!(title("The Paradox of Choice"), "the paradox of choice");
		assert_eq!(title("A Pattern Language"), "a pattern language");
		assert_eq!(title("The Model T Problem"), "the model t problem");
		assert_eq!(title("The Principle of Least Effort"), "the principle of least effort");
		assert_eq!(phrase("the bias known as Anchoring"), "anchoring");
		assert_eq!(phrase("the concept of Opportunity Cost"), "opportunity cost");
		assert_eq!(phrase("a fundamental paradox called Jevons Paradox"), "jevons paradox");
	}

	#[test]
	fn greeting_and_speaker_label_are_removed() {
		assert_eq!(
			phrase("Host: Welcome to the show, where today we're discussing Hindsight Bias."),
			"hindsight bias"
		);
	}

	#[test]
	fn decorative_punctuation_and_hyphens_become_spaces() {
		assert_eq!(
			title("\u{201C}First-Principles\u{201D} \u{2022} Thinking #1 **bold**"),
			"first principles thinking 1 bold"
		);
	}

	#[test]
	fn blank_and_absent_inputs_are_empty() {
		assert_eq!(title(""), "");
		assert_eq!(title("   "), "");
		assert_eq!(canonicalize_opt(None, ColonPolicy::TruncateAfterColon), "");
		assert_eq!(title("!!! ??? ..."), "");
		assert_eq!(title(": only a tagline"), "");
	}

	#[test]
	fn invalid_utf8_is_decoded_lossily() {
		assert_eq!(
			canonicalize_bytes(b"Occam\xFFs Razor", ColonPolicy::TruncateAfterColon),
			"occam s razor"
		);
	}

	#[test]
	fn canonical_keys_are_fixed_points() {
		for input in [
			"Today, we're exploring the concept of Opportunity Cost",
			"Host: Welcome back to Mental Models Daily, today we are diving into Inversion!",
			"The Paradox of Choice",
			"Fox versus Hedgehog (a field guide)",
			"\u{2018}Occam\u{2019}s\u{2019} Razor: explained",
		] {
			for policy in [ColonPolicy::TruncateAfterColon, ColonPolicy::ShorterSideOfColon] {
				let once = canonicalize(input, policy);

				assert_eq!(canonicalize(&once, policy), once, "not idempotent for {input:?}");
			}
		}
	}
}
