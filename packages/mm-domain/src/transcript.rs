//! Splitting multi-episode transcript documents into episode blocks.

use regex::Regex;

/// Cuts a transcript document at lines that open with an episode marker phrase.
#[derive(Clone, Debug)]
pub struct EpisodeSplitter {
	marker: Option<Regex>,
}
impl EpisodeSplitter {
	pub fn new<S>(markers: &[S]) -> Result<Self, regex::Error>
	where
		S: AsRef<str>,
	{
		let alternatives = markers
			.iter()
			.map(|marker| marker.as_ref().trim())
			.filter(|marker| !marker.is_empty())
			.map(regex::escape)
			.collect::<Vec<_>>();

		if alternatives.is_empty() {
			return Ok(Self { marker: None });
		}

		let pattern = format!(r"(?m)^[ \t]*(?:{})", alternatives.join("|"));

		Ok(Self { marker: Some(Regex::new(&pattern)?) })
	}

	/// Returns one block per marker, each running up to the next marker.
	///
	/// Text before the first marker is treated as front matter and dropped. A document with no
	/// markers at all is a single block.
	pub fn split(&self, text: &str) -> Vec<String> {
		let text = text.replace("\r\n", "\n");
		let Some(marker) = &self.marker else { return single_block(&text) };
		let starts = marker.find_iter(&text).map(|found| found.start()).collect::<Vec<_>>();

		if starts.is_empty() {
			return single_block(&text);
		}

		starts
			.iter()
			.enumerate()
			.filter_map(|(i, start)| {
				let end = starts.get(i + 1).copied().unwrap_or(text.len());
				let block = text[*start..end].trim();

				(!block.is_empty()).then(|| block.to_string())
			})
			.collect()
	}
}

fn single_block(text: &str) -> Vec<String> {
	let trimmed = text.trim();

	if trimmed.is_empty() { Vec::new() } else { vec![trimmed.to_string()] }
}
