use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::{
	canonical::{self, ColonPolicy},
	concept::ConceptRef,
};

const VERSUS_SPELLINGS: [&str; 3] = [" vs ", " vs. ", " versus "];

/// Canonical key to concept lookup, rebuilt for every linking run.
///
/// When two concepts share a canonical key the one inserted later wins. Every overwrite is
/// recorded in [`ConceptIndex::collisions`] so callers can report the shadowed concepts.
#[derive(Clone, Debug, Default)]
pub struct ConceptIndex {
	keys: BTreeMap<String, ConceptRef>,
	collisions: Vec<KeyCollision>,
}
impl ConceptIndex {
	pub fn build<'a, I>(concepts: I) -> Self
	where
		I: IntoIterator<Item = &'a ConceptRef>,
	{
		let mut index = Self::default();

		for concept in concepts {
			let key = canonical::canonicalize(&concept.name, ColonPolicy::TruncateAfterColon);

			if key.is_empty() {
				continue;
			}

			if let Some(shadowed) = index.keys.insert(key.clone(), concept.clone())
				&& shadowed.id != concept.id
			{
				index.collisions.push(KeyCollision { key, shadowed, winner: concept.clone() });
			}
		}

		index
	}

	pub fn get(&self, key: &str) -> Option<&ConceptRef> {
		self.keys.get(key)
	}

	/// Entries in ascending key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &ConceptRef)> {
		self.keys.iter().map(|(key, concept)| (key.as_str(), concept))
	}

	pub fn len(&self) -> usize {
		self.keys.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	/// Overwrites that happened while building, in insertion order.
	pub fn collisions(&self) -> &[KeyCollision] {
		&self.collisions
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyCollision {
	pub key: String,
	pub shadowed: ConceptRef,
	pub winner: ConceptRef,
}

/// A lowercase alternate spelling of a concept name used for literal substring search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConceptVariant {
	pub concept_id: i64,
	pub concept_name: String,
	pub text: String,
	/// Length in characters. Longer variants are more specific.
	pub len: usize,
}

/// Expands every concept name into its substring-search variants.
///
/// Variants shorter than `min_chars` characters are dropped.
pub fn build_variants<'a, I>(concepts: I, min_chars: usize) -> Vec<ConceptVariant>
where
	I: IntoIterator<Item = &'a ConceptRef>,
{
	let mut out = Vec::new();

	for concept in concepts {
		for text in name_variants(&concept.name) {
			let len = text.chars().count();

			if len < min_chars {
				continue;
			}

			out.push(ConceptVariant {
				concept_id: concept.id,
				concept_name: concept.name.clone(),
				text,
				len,
			});
		}
	}

	out
}

fn name_variants(name: &str) -> BTreeSet<String> {
	let mut variants = BTreeSet::new();
	let base = fold_apostrophes(&name.trim().to_lowercase());

	if base.is_empty() {
		return variants;
	}

	if let Some(rest) = base.strip_prefix("the ") {
		variants.insert(rest.trim().to_string());
	}
	if let Some((before_paren, _)) = base.split_once('(') {
		let before_paren = before_paren.trim();

		if !before_paren.is_empty() {
			variants.insert(before_paren.to_string());
		}
	}

	for from in VERSUS_SPELLINGS {
		if !base.contains(from) {
			continue;
		}

		for to in VERSUS_SPELLINGS.iter().filter(|to| **to != from) {
			variants.insert(base.replace(from, to).trim().to_string());
		}
	}

	variants.insert(base);

	variants
}

/// Maps typographic single quotes onto `'` so variants and blobs agree on apostrophes.
pub(crate) fn fold_apostrophes(text: &str) -> String {
	text.replace(['\u{2018}', '\u{2019}'], "'")
}
