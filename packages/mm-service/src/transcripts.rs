use std::{
	collections::HashMap,
	path::{Component, Path, PathBuf},
};

use serde::Serialize;
use time::OffsetDateTime;

use crate::{CatalogService, Error, Result};
use mm_domain::{
	ColonPolicy, ConceptRef, EpisodeSplitter, Matcher, NameGuesser, canonicalize, placeholder_title,
};
use mm_providers::documents;
use mm_storage::{models::TranscriptFields, queries};

#[derive(Clone, Debug, Default, Serialize)]
pub struct ScanReport {
	pub root: String,
	pub files: usize,
	pub unreadable_files: usize,
	pub blocks: usize,
	pub updated: usize,
	pub inserted: usize,
	pub failed: usize,
}

/// Episodes already in the table, keyed the ways a transcript block can find them.
///
/// The first episode seen for a key keeps it. Lookups try the linked concept, then the
/// canonical title, then the block's previous location, so a rescan updates in place.
#[derive(Default)]
struct EpisodeLookup {
	by_concept: HashMap<i64, i64>,
	by_title: HashMap<String, i64>,
	by_source: HashMap<(String, i64), i64>,
}
impl EpisodeLookup {
	fn remember(&mut self, episode_id: i64, concept_id: Option<i64>, title: &str) {
		if let Some(concept_id) = concept_id {
			self.by_concept.entry(concept_id).or_insert(episode_id);
		}

		let key = canonicalize(title, ColonPolicy::TruncateAfterColon);

		if !key.is_empty() {
			self.by_title.entry(key).or_insert(episode_id);
		}
	}

	fn remember_source(&mut self, episode_id: i64, source: &str, index: i64) {
		self.by_source.entry((source.to_string(), index)).or_insert(episode_id);
	}

	fn find(
		&self,
		concept_id: Option<i64>,
		guess_key: &str,
		source: &str,
		index: i64,
	) -> Option<i64> {
		concept_id
			.and_then(|id| self.by_concept.get(&id))
			.or_else(|| self.by_title.get(guess_key))
			.or_else(|| self.by_source.get(&(source.to_string(), index)))
			.copied()
	}
}

enum BlockWrite {
	Attached,
	Inserted,
}

/// What one transcript block resolved to.
struct BlockDecision {
	guess: Option<String>,
	guess_key: String,
	concept: Option<ConceptRef>,
}

impl CatalogService {
	/// Walks `root` for transcript documents, splits each into episode blocks, and attaches
	/// every block to an existing episode or a new one.
	pub async fn scan_transcripts(&self, root: &Path) -> Result<ScanReport> {
		let matcher = self.load_matcher().await?;
		let guesser = self.guesser();
		let splitter = EpisodeSplitter::new(&self.cfg.transcripts.episode_markers)
			.map_err(|err| Error::InvalidConfig { message: err.to_string() })?;
		let files = collect_files(root, &self.cfg.transcripts.extensions).await?;
		let mut lookup = EpisodeLookup::default();
		let mut report = ScanReport {
			root: root.display().to_string(),
			files: files.len(),
			..Default::default()
		};

		for episode in queries::list_episodes(&self.db).await? {
			lookup.remember(episode.id, episode.concept_id(), episode.title_str());

			if let (Some(source), Some(index)) =
				(episode.transcript_source.as_deref(), episode.transcript_index)
			{
				lookup.remember_source(episode.id, source, index);
			}
		}

		tracing::info!(root = %root.display(), files = files.len(), "Scanning transcripts.");

		for path in &files {
			let source = relative_source(root, path);
			let text = match self.providers.documents.read_text(path).await {
				Ok(text) => text,
				Err(err) => {
					tracing::warn!(source = %source, error = %err, "Failed to read transcript.");

					report.unreadable_files += 1;

					continue;
				},
			};
			let blocks = splitter.split(&text);

			if blocks.is_empty() {
				tracing::warn!(source = %source, "No episode blocks detected.");

				continue;
			}

			tracing::info!(source = %source, blocks = blocks.len(), "Transcript file split.");

			for (index, block) in (1_i64..).zip(blocks) {
				report.blocks += 1;

				let decision = decide_block(&matcher, &guesser, &block);
				let transcript =
					TranscriptFields { transcript: block, source: source.clone(), index };

				match self.store_block(&mut lookup, &decision, &transcript, path).await {
					Ok(BlockWrite::Attached) => report.updated += 1,
					Ok(BlockWrite::Inserted) => report.inserted += 1,
					Err(err) => {
						tracing::warn!(
							source = %source,
							index,
							error = %err,
							"Failed to store transcript block."
						);

						report.failed += 1;
					},
				}
			}
		}

		tracing::info!(
			blocks = report.blocks,
			updated = report.updated,
			inserted = report.inserted,
			unreadable_files = report.unreadable_files,
			failed = report.failed,
			"Transcript scan finished."
		);

		Ok(report)
	}

	async fn store_block(
		&self,
		lookup: &mut EpisodeLookup,
		decision: &BlockDecision,
		transcript: &TranscriptFields,
		path: &Path,
	) -> mm_storage::Result<BlockWrite> {
		let now = OffsetDateTime::now_utc();
		let concept_id = decision.concept.as_ref().map(|concept| concept.id);

		if let Some(episode_id) =
			lookup.find(concept_id, &decision.guess_key, &transcript.source, transcript.index)
		{
			queries::attach_transcript(&self.db, episode_id, transcript, now).await?;

			tracing::debug!(episode_id, index = transcript.index, "Transcript attached.");

			return Ok(BlockWrite::Attached);
		}

		let title = decision
			.concept
			.as_ref()
			.map(|concept| concept.name.clone())
			.or_else(|| decision.guess.clone())
			.unwrap_or_else(|| placeholder_title(&file_name(path)));
		let episode_id =
			queries::insert_transcript_episode(&self.db, &title, concept_id, transcript, now)
				.await?;

		tracing::debug!(
			episode_id,
			title = %title,
			guess = ?decision.guess,
			index = transcript.index,
			"Episode created from transcript."
		);

		lookup.remember(episode_id, concept_id, &title);
		lookup.remember_source(episode_id, &transcript.source, transcript.index);

		Ok(BlockWrite::Inserted)
	}
}

fn decide_block(matcher: &Matcher, guesser: &NameGuesser, block: &str) -> BlockDecision {
	let Some(guess) = guesser.guess(block) else {
		return BlockDecision { guess: None, guess_key: String::new(), concept: None };
	};
	let guess_key = canonicalize(&guess, ColonPolicy::ShorterSideOfColon);
	let concept = matcher.match_key(&guess_key).map(|result| result.concept);

	BlockDecision { guess: Some(guess), guess_key, concept }
}

/// Every file under `root` with a wanted extension, in path order.
async fn collect_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
	let metadata = tokio::fs::metadata(root).await?;

	if !metadata.is_dir() {
		return Err(Error::InvalidRequest {
			message: format!("{} is not a directory.", root.display()),
		});
	}

	let mut pending = vec![root.to_path_buf()];
	let mut files = Vec::new();

	while let Some(dir) = pending.pop() {
		let mut entries = tokio::fs::read_dir(&dir).await?;

		while let Some(entry) = entries.next_entry().await? {
			let path = entry.path();
			let file_type = entry.file_type().await?;

			if file_type.is_dir() {
				pending.push(path);
			} else if file_type.is_file() && documents::has_extension(&path, extensions) {
				files.push(path);
			}
		}
	}

	files.sort();

	Ok(files)
}

fn relative_source(root: &Path, path: &Path) -> String {
	let relative = path.strip_prefix(root).unwrap_or(path);

	relative
		.components()
		.filter_map(|component| match component {
			Component::Normal(part) => Some(part.to_string_lossy()),
			_ => None,
		})
		.collect::<Vec<_>>()
		.join("/")
}

fn file_name(path: &Path) -> String {
	path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sources_are_relative_with_forward_slashes() {
		let root = Path::new("/data/transcripts");

		assert_eq!(
			relative_source(root, &root.join("season-1").join("batch.txt")),
			"season-1/batch.txt"
		);
		assert_eq!(relative_source(root, Path::new("/elsewhere/a.md")), "elsewhere/a.md");
	}

	#[test]
	fn lookup_prefers_the_linked_concept() {
		let mut lookup = EpisodeLookup::default();

		lookup.remember(1, None, "Inversion");
		lookup.remember(2, Some(7), "Second-Order Thinking");

		lookup.remember_source(3, "batch.txt", 2);

		assert_eq!(lookup.find(Some(7), "inversion", "batch.txt", 2), Some(2));
		assert_eq!(lookup.find(Some(8), "inversion", "batch.txt", 2), Some(1));
		assert_eq!(lookup.find(None, "second order thinking", "batch.txt", 2), Some(2));
		assert_eq!(lookup.find(None, "", "batch.txt", 2), Some(3));
		assert_eq!(lookup.find(None, "", "batch.txt", 3), None);
	}
}
