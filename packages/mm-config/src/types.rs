use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub linking: Linking,
	#[serde(default)]
	pub guessing: Guessing,
	#[serde(default)]
	pub transcripts: Transcripts,
	#[serde(default)]
	pub feeds: Feeds,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub sqlite: Sqlite,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Sqlite {
	/// Database file. Created on first connect when missing.
	pub path: PathBuf,
	#[serde(default = "default_pool_max_conns")]
	pub pool_max_conns: u32,
}

/// Thresholds used when deciding whether a candidate concept is accepted.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Linking {
	/// Minimum similarity for a containment candidate to be accepted.
	pub containment_min_similarity: f64,
	/// Minimum similarity for a candidate with no containment signal.
	pub fuzzy_min_similarity: f64,
	/// Length lead, in characters, the longest variant needs over the runner-up.
	pub ambiguity_margin_chars: usize,
	/// Variants shorter than this are never used for substring matching.
	pub min_variant_chars: usize,
	/// Number of sample links kept in batch summaries.
	pub sample_limit: usize,
}
impl Default for Linking {
	fn default() -> Self {
		Self {
			containment_min_similarity: 0.70,
			fuzzy_min_similarity: 0.80,
			ambiguity_margin_chars: 5,
			min_variant_chars: 4,
			sample_limit: 15,
		}
	}
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Guessing {
	/// Only this many leading characters of a transcript are scanned.
	pub window_chars: usize,
	pub max_phrase_chars: usize,
	/// Phrases that look like names but belong to the show itself, e.g. its title.
	pub boilerplate_phrases: Vec<String>,
}
impl Default for Guessing {
	fn default() -> Self {
		Self {
			window_chars: 2_000,
			max_phrase_chars: 140,
			boilerplate_phrases: vec!["Mental Models Daily".to_string(), "Host".to_string()],
		}
	}
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Transcripts {
	/// Line prefixes that open a new episode inside a transcript document.
	pub episode_markers: Vec<String>,
	/// File extensions picked up by the transcript scan, without the leading dot.
	pub extensions: Vec<String>,
}
impl Default for Transcripts {
	fn default() -> Self {
		Self {
			episode_markers: vec![
				"Welcome to Mental Models Daily".to_string(),
				"Welcome back to Mental Models Daily".to_string(),
				"Host: Welcome to Mental Models Daily".to_string(),
			],
			extensions: vec!["txt".to_string(), "md".to_string()],
		}
	}
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Feeds {
	pub timeout_ms: u64,
	pub user_agent: String,
}
impl Default for Feeds {
	fn default() -> Self {
		Self {
			timeout_ms: 30_000,
			user_agent: concat!("mm-tool/", env!("CARGO_PKG_VERSION")).to_string(),
		}
	}
}

fn default_pool_max_conns() -> u32 {
	1
}
