use mm_domain::{
	ColonPolicy, ConceptRef, MatchClass, MatchOutcome, MatchThresholds, Matcher, NameGuesser,
	canonicalize,
};

fn matcher(names: &[(i64, &str)]) -> Matcher {
	let concepts = names.iter().map(|(id, name)| ConceptRef::new(*id, *name)).collect::<Vec<_>>();

	Matcher::new(&concepts, MatchThresholds::default())
}

fn razors() -> Matcher {
	matcher(&[(1, "Occam's Razor"), (2, "Hanlon's Razor")])
}

#[test]
fn display_name_matches_exactly() {
	let result = razors()
		.match_query("Occam's Razor", ColonPolicy::TruncateAfterColon)
		.expect("Expected an exact match.");

	assert_eq!(result.concept.id, 1);
	assert_eq!(result.class, MatchClass::Exact);
	assert_eq!(result.confidence, 1.0);
}

#[test]
fn title_tagline_is_truncated_before_matching() {
	let result = razors()
		.match_query("occams razor: the simplicity principle", ColonPolicy::TruncateAfterColon)
		.expect("Expected an exact match.");

	assert_eq!(result.key, "occams razor");
	assert_eq!(result.concept.id, 1);
	assert_eq!(result.class, MatchClass::Exact);
}

#[test]
fn exact_match_dominates_containment_candidates() {
	let matcher =
		matcher(&[(1, "Inversion Thinking"), (2, "Inversion"), (3, "Mental Inversion")]);
	let result = matcher
		.match_query("Inversion", ColonPolicy::TruncateAfterColon)
		.expect("Expected an exact match.");

	assert_eq!(result.concept.id, 2);
	assert_eq!(result.class, MatchClass::Exact);
	assert_eq!(result.confidence, 1.0);
}

#[test]
fn equal_length_variants_are_ambiguous() {
	let matcher = matcher(&[(1, "Anchoring"), (2, "Inversion")]);
	let outcome = matcher.match_blob("Anchoring and inversion both came up today.");

	let MatchOutcome::Ambiguous { candidates } = outcome else {
		panic!("Expected an ambiguous outcome.");
	};

	assert_eq!(candidates.len(), 2);
	assert_eq!(candidates[0].len, candidates[1].len);
}

#[test]
fn longer_variant_wins_by_margin() {
	let matcher = matcher(&[(1, "Inversion"), (2, "Inversion Thinking")]);
	let outcome = matcher.match_blob("Today we practice inversion thinking on a hard problem.");
	let result = outcome.matched().expect("Expected the more specific concept.");

	assert_eq!(result.concept.id, 2);
	assert_eq!(result.class, MatchClass::VariantSubstring);
}

#[test]
fn ambiguity_margin_is_inclusive() {
	let accepted = matcher(&[(1, "Inversion"), (2, "Moat Inversion")])
		.match_blob("we discussed moat inversion");
	let result = accepted.matched().expect("Expected a five-character lead to win.");

	assert_eq!(result.concept.id, 2);
	assert!((result.confidence - 14.0 / 23.0).abs() < 1e-9);

	let rejected = matcher(&[(1, "Anchoring"), (2, "Loss Aversion")])
		.match_blob("anchoring and loss aversion");

	let MatchOutcome::Ambiguous { candidates } = rejected else {
		panic!("Expected a four-character lead to be ambiguous.");
	};

	assert_eq!(candidates[0].len - candidates[1].len, 4);
}

#[test]
fn typographic_apostrophes_match_ascii_names() {
	let outcome = razors().match_blob("Today we reach for Occam\u{2019}s Razor again.");
	let result = outcome.matched().expect("Expected a variant match.");

	assert_eq!(result.concept.id, 1);
	assert_eq!(result.key, "occam's razor");
}

#[test]
fn names_with_descriptive_head_nouns_keep_their_own_keys() {
	let matcher =
		matcher(&[(1, "The Paradox of Choice"), (2, "Choice"), (3, "A Pattern Language")]);
	let result = matcher
		.match_query("The Paradox of Choice", ColonPolicy::TruncateAfterColon)
		.expect("Expected an exact match.");

	assert!(matcher.index().collisions().is_empty());
	assert_eq!(result.concept.id, 1);
	assert_eq!(result.class, MatchClass::Exact);
	assert_eq!(matcher.index().get("a pattern language").map(|concept| concept.id), Some(3));
}

#[test]
fn only_present_variant_is_matched() {
	let matcher = matcher(&[(1, "Inversion"), (2, "First Principles")]);
	let outcome = matcher.match_blob("Today we apply first principles thinking to pricing.");
	let result = outcome.matched().expect("Expected a single variant match.");

	assert_eq!(result.concept.id, 2);
	assert_eq!(result.class, MatchClass::VariantSubstring);
	assert_eq!(result.confidence, 1.0);
}

#[test]
fn guessed_phrase_canonicalizes_to_concept_key() {
	let phrase = NameGuesser::default()
		.guess("Today, we're exploring the concept of Opportunity Cost. It changes everything.")
		.expect("Expected a guessed phrase.");

	assert_eq!(phrase, "Opportunity Cost");
	assert_eq!(canonicalize(&phrase, ColonPolicy::ShorterSideOfColon), "opportunity cost");
}

#[test]
fn every_name_matches_itself_except_shadowed_collisions() {
	let concepts = vec![
		ConceptRef::new(1, "Occam's Razor"),
		ConceptRef::new(2, "Hanlon's Razor"),
		ConceptRef::new(3, "Second-Order Thinking"),
		ConceptRef::new(4, "The Map Is Not the Territory"),
		ConceptRef::new(5, "Supply & Demand"),
		ConceptRef::new(6, "Second Order Thinking"),
	];
	let matcher = Matcher::new(&concepts, MatchThresholds::default());
	let shadowed = matcher
		.index()
		.collisions()
		.iter()
		.map(|collision| collision.shadowed.id)
		.collect::<Vec<_>>();

	assert_eq!(shadowed, vec![3]);

	for concept in &concepts {
		let result = matcher
			.match_query(&concept.name, ColonPolicy::TruncateAfterColon)
			.expect("Expected every name to match.");

		assert_eq!(result.class, MatchClass::Exact);

		if shadowed.contains(&concept.id) {
			assert_eq!(result.concept.id, 6);
		} else {
			assert_eq!(result.concept.id, concept.id);
		}
	}
}

#[test]
fn empty_catalog_never_matches() {
	let matcher = matcher(&[]);
	let guesser = NameGuesser::default();

	assert!(matcher.match_query("Occam's Razor", ColonPolicy::TruncateAfterColon).is_none());
	assert_eq!(
		matcher.match_episode("Occam's Razor", "occam's razor again", &guesser),
		MatchOutcome::NoMatch
	);
}

#[test]
fn episode_prefers_title_then_guess_then_blob() {
	let matcher = matcher(&[(1, "Opportunity Cost"), (2, "First Principles")]);
	let guesser = NameGuesser::default();
	let by_title = matcher.match_episode(
		"Opportunity Cost: what you give up",
		"Today, we're exploring the concept of First Principles.",
		&guesser,
	);
	let by_guess = matcher.match_episode(
		"Episode from batch-1.txt",
		"Today, we're exploring the concept of Opportunity Cost. It changes everything.",
		&guesser,
	);
	let by_blob =
		matcher.match_episode("12", "we spent the hour on first principles thinking.", &guesser);

	let by_title = by_title.matched().expect("Expected a title match.");
	let by_guess = by_guess.matched().expect("Expected a guessed match.");
	let by_blob = by_blob.matched().expect("Expected a variant match.");

	assert_eq!((by_title.concept.id, by_title.class), (1, MatchClass::Exact));
	assert_eq!((by_guess.concept.id, by_guess.class), (1, MatchClass::PatternDerived));
	assert_eq!((by_blob.concept.id, by_blob.class), (2, MatchClass::VariantSubstring));
}

#[test]
fn bad_titles_are_not_matched_on_their_own() {
	let matcher = matcher(&[(1, "Moat")]);
	let outcome = matcher.match_episode("moat", "", &NameGuesser::default());

	// The title is too short to trust, but the blob still carries the variant.
	assert_eq!(outcome.matched().map(|result| result.class), Some(MatchClass::VariantSubstring));
}
