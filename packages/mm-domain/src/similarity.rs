//! Character-level similarity between canonical keys.

/// Normalized Levenshtein similarity in `[0.0, 1.0]`, counted in characters. Zero when either
/// side is empty.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
	if a.is_empty() || b.is_empty() {
		return 0.0;
	}

	strsim::normalized_levenshtein(a, b)
}
