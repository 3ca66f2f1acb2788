use std::sync::LazyLock;

use regex::Regex;

static BARE_NUMBER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^\d+(?:\.\ds?)?$").expect("bare number pattern must compile"));

/// Titles at or below this many characters carry no usable name.
const MIN_TITLE_CHARS: usize = 4;

/// Whether an episode title is a placeholder that should neither be matched nor kept.
///
/// Empty titles, generated `Episode from <file>` titles, bare numbers such as `12` or `3.5s`, and
/// titles of four characters or fewer all qualify.
pub fn title_looks_bad(title: &str) -> bool {
	let trimmed = title.trim();

	if trimmed.is_empty() {
		return true;
	}
	if trimmed.to_lowercase().starts_with("episode from ") {
		return true;
	}
	if BARE_NUMBER.is_match(trimmed) {
		return true;
	}

	trimmed.chars().count() <= MIN_TITLE_CHARS
}

/// Title given to an episode created from a transcript file with no recognizable concept.
pub fn placeholder_title(file_name: &str) -> String {
	format!("Episode from {file_name}")
}
