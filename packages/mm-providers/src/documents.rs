use std::path::Path;

use crate::{Error, Result};

/// Reads a plain-text or Markdown transcript with line endings normalized to `\n`.
pub async fn read_text(path: &Path) -> Result<String> {
	let raw = tokio::fs::read(path)
		.await
		.map_err(|source| Error::ReadDocument { path: path.to_path_buf(), source })?;
	let text = String::from_utf8_lossy(&raw);

	Ok(normalize_newlines(text.trim_start_matches('\u{FEFF}')))
}

pub fn normalize_newlines(text: &str) -> String {
	text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Whether `path` carries one of `extensions` (lowercase, no leading dot).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
	path.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn newlines_are_normalized() {
		assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
	}

	#[test]
	fn extensions_match_case_insensitively() {
		let extensions = vec!["txt".to_string(), "md".to_string()];

		assert!(has_extension(Path::new("season-1/Batch.TXT"), &extensions));
		assert!(has_extension(Path::new("notes.md"), &extensions));
		assert!(!has_extension(Path::new("episode.docx"), &extensions));
		assert!(!has_extension(Path::new("README"), &extensions));
	}
}
