//! Ordered matching strategies over a [`ConceptIndex`] and its variants.
//!
//! Strategies are tried in a fixed order and the first acceptable result wins. Scores from
//! different strategies are never blended.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
	canonical::{self, ColonPolicy},
	concept::ConceptRef,
	guesser::NameGuesser,
	index::{self, ConceptIndex, ConceptVariant},
	similarity,
	title::title_looks_bad,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchClass {
	Exact,
	Containment,
	Fuzzy,
	/// A title strategy that succeeded on a phrase guessed from the transcript.
	PatternDerived,
	VariantSubstring,
}
impl MatchClass {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Exact => "exact",
			Self::Containment => "containment",
			Self::Fuzzy => "fuzzy",
			Self::PatternDerived => "pattern_derived",
			Self::VariantSubstring => "variant_substring",
		}
	}

	/// Lower ranks are more trustworthy.
	pub fn rank(self) -> u8 {
		match self {
			Self::Exact => 0,
			Self::Containment => 1,
			Self::PatternDerived => 2,
			Self::Fuzzy => 3,
			Self::VariantSubstring => 4,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchResult {
	pub concept: ConceptRef,
	pub class: MatchClass,
	pub confidence: f64,
	/// Canonical key or variant text the query matched on.
	pub key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VariantHit {
	pub concept: ConceptRef,
	pub variant: String,
	pub len: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
	Matched(MatchResult),
	/// Several concepts matched with no clear winner. Nothing should be written.
	Ambiguous {
		candidates: Vec<VariantHit>,
	},
	NoMatch,
}
impl MatchOutcome {
	pub fn matched(&self) -> Option<&MatchResult> {
		match self {
			Self::Matched(result) => Some(result),
			_ => None,
		}
	}
}
impl From<Option<MatchResult>> for MatchOutcome {
	fn from(value: Option<MatchResult>) -> Self {
		value.map_or(Self::NoMatch, Self::Matched)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchThresholds {
	pub containment_min_similarity: f64,
	pub fuzzy_min_similarity: f64,
	pub ambiguity_margin_chars: usize,
	pub min_variant_chars: usize,
}
impl Default for MatchThresholds {
	fn default() -> Self {
		Self::from(&mm_config::Linking::default())
	}
}
impl From<&mm_config::Linking> for MatchThresholds {
	fn from(cfg: &mm_config::Linking) -> Self {
		Self {
			containment_min_similarity: cfg.containment_min_similarity,
			fuzzy_min_similarity: cfg.fuzzy_min_similarity,
			ambiguity_margin_chars: cfg.ambiguity_margin_chars,
			min_variant_chars: cfg.min_variant_chars,
		}
	}
}

/// Immutable snapshot of the catalog used to match titles, phrases, and transcript blobs.
#[derive(Clone, Debug)]
pub struct Matcher {
	index: ConceptIndex,
	variants: Vec<ConceptVariant>,
	thresholds: MatchThresholds,
}
impl Matcher {
	pub fn new(concepts: &[ConceptRef], thresholds: MatchThresholds) -> Self {
		Self {
			index: ConceptIndex::build(concepts),
			variants: index::build_variants(concepts, thresholds.min_variant_chars),
			thresholds,
		}
	}

	pub fn index(&self) -> &ConceptIndex {
		&self.index
	}

	pub fn variants(&self) -> &[ConceptVariant] {
		&self.variants
	}

	pub fn thresholds(&self) -> &MatchThresholds {
		&self.thresholds
	}

	/// Runs the exact, containment, and fuzzy strategies against an already canonical key.
	pub fn match_key(&self, key: &str) -> Option<MatchResult> {
		if key.is_empty() || self.index.is_empty() {
			return None;
		}

		if let Some(concept) = self.index.get(key) {
			return Some(MatchResult {
				concept: concept.clone(),
				class: MatchClass::Exact,
				confidence: 1.0,
				key: key.to_string(),
			});
		}

		if let Some((score, found, concept)) =
			self.best_scored(key, |candidate| key.contains(candidate) || candidate.contains(key))
			&& score >= self.thresholds.containment_min_similarity
		{
			return Some(MatchResult {
				concept: concept.clone(),
				class: MatchClass::Containment,
				confidence: score,
				key: found.to_string(),
			});
		}

		if let Some((score, found, concept)) = self.best_scored(key, |_| true)
			&& score >= self.thresholds.fuzzy_min_similarity
		{
			return Some(MatchResult {
				concept: concept.clone(),
				class: MatchClass::Fuzzy,
				confidence: score,
				key: found.to_string(),
			});
		}

		None
	}

	pub fn match_query(&self, text: &str, policy: ColonPolicy) -> Option<MatchResult> {
		self.match_key(&canonical::canonicalize(text, policy))
	}

	/// Variant substring search over free text.
	///
	/// Each concept is represented by its longest variant found in the blob. A lone concept is
	/// accepted outright. Otherwise the longest must lead the runner-up by the ambiguity margin.
	pub fn match_blob(&self, blob: &str) -> MatchOutcome {
		let haystack = index::fold_apostrophes(&blob.to_lowercase());
		let mut by_concept: BTreeMap<i64, &ConceptVariant> = BTreeMap::new();

		for variant in &self.variants {
			if !haystack.contains(&variant.text) {
				continue;
			}

			let longer =
				by_concept.get(&variant.concept_id).is_none_or(|prev| variant.len > prev.len);

			if longer {
				by_concept.insert(variant.concept_id, variant);
			}
		}

		let mut hits = by_concept
			.into_values()
			.map(|variant| VariantHit {
				concept: ConceptRef::new(variant.concept_id, variant.concept_name.clone()),
				variant: variant.text.clone(),
				len: variant.len,
			})
			.collect::<Vec<_>>();

		hits.sort_by(|a, b| b.len.cmp(&a.len).then(a.concept.id.cmp(&b.concept.id)));

		let Some(top) = hits.first() else { return MatchOutcome::NoMatch };
		let total = hits.iter().map(|hit| hit.len).sum::<usize>();

		if let Some(second) = hits.get(1)
			&& top.len < second.len + self.thresholds.ambiguity_margin_chars
		{
			return MatchOutcome::Ambiguous { candidates: hits };
		}

		MatchOutcome::Matched(MatchResult {
			concept: top.concept.clone(),
			class: MatchClass::VariantSubstring,
			confidence: top.len as f64 / total as f64,
			key: top.variant.clone(),
		})
	}

	/// Full decision for one episode: its title, then a phrase guessed from the transcript,
	/// then variant search over title and transcript together.
	pub fn match_episode(
		&self,
		title: &str,
		transcript: &str,
		guesser: &NameGuesser,
	) -> MatchOutcome {
		if !title_looks_bad(title)
			&& let Some(result) = self.match_query(title, ColonPolicy::TruncateAfterColon)
		{
			return MatchOutcome::Matched(result);
		}

		if let Some(phrase) = guesser.guess(transcript)
			&& let Some(mut result) = self.match_query(&phrase, ColonPolicy::ShorterSideOfColon)
		{
			result.class = MatchClass::PatternDerived;

			return MatchOutcome::Matched(result);
		}

		self.match_blob(&format!("{title}\n{transcript}"))
	}

	fn best_scored<F>(&self, key: &str, admit: F) -> Option<(f64, &str, &ConceptRef)>
	where
		F: Fn(&str) -> bool,
	{
		let mut best: Option<(f64, &str, &ConceptRef)> = None;

		for (candidate, concept) in self.index.iter() {
			if !admit(candidate) {
				continue;
			}

			let score = similarity::similarity_ratio(key, candidate);

			if outranks(score, candidate, best.map(|(score, key, _)| (score, key))) {
				best = Some((score, candidate, concept));
			}
		}

		best
	}
}

/// Higher score wins, then the longer key. Anything else keeps the incumbent, so with keys
/// visited in ascending order a full tie resolves to the lexicographically smallest key.
fn outranks(score: f64, key: &str, best: Option<(f64, &str)>) -> bool {
	let Some((best_score, best_key)) = best else { return true };

	if score != best_score {
		return score > best_score;
	}

	key.chars().count() > best_key.chars().count()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn matcher(names: &[(i64, &str)]) -> Matcher {
		let concepts =
			names.iter().map(|(id, name)| ConceptRef::new(*id, *name)).collect::<Vec<_>>();

		Matcher::new(&concepts, MatchThresholds::default())
	}

	#[test]
	fn exact_key_is_found_first() {
		let matcher = matcher(&[(1, "Inversion"), (2, "Inversion Thinking")]);
		let result = matcher.match_key("inversion").expect("Expected an exact match.");

		assert_eq!(result.concept.id, 1);
		assert_eq!(result.class, MatchClass::Exact);
		assert_eq!(result.confidence, 1.0);
	}

	#[test]
	fn containment_needs_enough_similarity() {
		let matcher = matcher(&[(1, "Inversion")]);
		let result = matcher.match_key("inversions").expect("Expected a containment match.");

		assert_eq!(result.class, MatchClass::Containment);
		assert!((result.confidence - 0.9).abs() < 1e-9);
		assert!(matcher.match_key("mental inversion").is_none());
		assert!(matcher.match_key("inversion thinking tools").is_none());
	}

	#[test]
	fn fuzzy_accepts_near_spellings_only() {
		let matcher = matcher(&[(1, "Occam's Razor"), (2, "Hanlon's Razor")]);
		let result = matcher.match_key("hanlon razor").expect("Expected a fuzzy match.");

		assert_eq!(result.concept.id, 2);
		assert_eq!(result.class, MatchClass::Fuzzy);
		assert!(matcher.match_key("sunk cost fallacy").is_none());
	}

	#[test]
	fn empty_key_and_empty_index_never_match() {
		assert!(matcher(&[(1, "Inversion")]).match_key("").is_none());
		assert!(matcher(&[]).match_key("inversion").is_none());
		assert_eq!(matcher(&[]).match_blob("inversion"), MatchOutcome::NoMatch);
	}

	#[test]
	fn ties_prefer_longer_then_earlier_keys() {
		assert!(outranks(0.9, "abc", Some((0.8, "abcdef"))));
		assert!(!outranks(0.8, "abc", Some((0.9, "a"))));
		assert!(outranks(0.8, "abcd", Some((0.8, "abc"))));
		assert!(!outranks(0.8, "abd", Some((0.8, "abc"))));
		assert!(outranks(0.1, "a", None));
	}

	#[test]
	fn blob_winner_share_is_its_confidence() {
		let matcher = matcher(&[(1, "Inversion"), (2, "Inversion Thinking")]);
		let outcome = matcher.match_blob("We practice Inversion Thinking daily.");
		let result = outcome.matched().expect("Expected a variant match.");

		assert_eq!(result.concept.id, 2);
		assert_eq!(result.class, MatchClass::VariantSubstring);
		assert!((result.confidence - 18.0 / 27.0).abs() < 1e-9);
	}

	#[test]
	fn blob_keeps_only_the_longest_variant_per_concept() {
		let matcher = matcher(&[(1, "The Lindy Effect")]);
		let outcome = matcher.match_blob("the lindy effect again");
		let result = outcome.matched().expect("Expected a variant match.");

		assert_eq!(result.key, "the lindy effect");
		assert_eq!(result.confidence, 1.0);
	}

	#[test]
	fn close_lengths_are_ambiguous() {
		let matcher = matcher(&[(1, "Sunk Cost"), (2, "Loss Aversion")]);
		let outcome = matcher.match_blob("sunk cost and loss aversion");

		let MatchOutcome::Ambiguous { candidates } = outcome else {
			panic!("Expected an ambiguous outcome.");
		};

		assert_eq!(candidates.len(), 2);
		assert_eq!(candidates[0].concept.id, 2);
	}

	#[test]
	fn outcome_serializes_with_a_tag() {
		let outcome = MatchOutcome::NoMatch;
		let json = serde_json::to_value(&outcome).expect("Failed to serialize outcome.");

		assert_eq!(json["outcome"], "no_match");
	}
}
