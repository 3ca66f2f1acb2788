pub mod admin;
pub mod auto_link;
pub mod check;
pub mod concepts;
pub mod feeds;
pub mod matching;
pub mod repair;
pub mod transcripts;

mod error;

pub use admin::InitReport;
pub use auto_link::{AutoLinkReport, LinkSample};
pub use check::{EpisodeBrief, MissingReport, UnlinkedEpisode};
pub use concepts::{ConceptImport, ImportConceptsReport};
pub use error::{Error, Result};
pub use feeds::ImportRssReport;
pub use matching::MatchReport;
pub use repair::{RepairReport, RepairSample};
pub use transcripts::ScanReport;

use std::{future::Future, path::Path, pin::Pin, sync::Arc};

use mm_config::{Config, Feeds};
use mm_domain::{ConceptRef, MatchThresholds, Matcher, NameGuesser};
use mm_providers::{FeedEntry, documents, feed};
use mm_storage::{db::Db, queries};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait FeedSource
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		cfg: &'a Feeds,
		url: &'a str,
	) -> BoxFuture<'a, mm_providers::Result<Vec<FeedEntry>>>;
}

/// Turns a transcript file into plain text. Formats without a bundled reader plug in here.
pub trait DocumentReader
where
	Self: Send + Sync,
{
	fn read_text<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, mm_providers::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub feeds: Arc<dyn FeedSource>,
	pub documents: Arc<dyn DocumentReader>,
}
impl Providers {
	pub fn new(feeds: Arc<dyn FeedSource>, documents: Arc<dyn DocumentReader>) -> Self {
		Self { feeds, documents }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { feeds: provider.clone(), documents: provider }
	}
}

pub struct CatalogService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}
impl CatalogService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}

	pub(crate) fn guesser(&self) -> NameGuesser {
		NameGuesser::new(&self.cfg.guessing)
	}

	/// Loads the catalog and builds a matcher over it. Fails when the catalog is empty.
	pub(crate) async fn load_matcher(&self) -> Result<Matcher> {
		let concepts = queries::list_concepts(&self.db)
			.await?
			.into_iter()
			.map(|row| ConceptRef::new(row.id, row.name))
			.collect::<Vec<_>>();

		if concepts.is_empty() {
			return Err(Error::NoConcepts);
		}

		let matcher = Matcher::new(&concepts, MatchThresholds::from(&self.cfg.linking));

		for collision in matcher.index().collisions() {
			tracing::warn!(
				key = %collision.key,
				shadowed_id = collision.shadowed.id,
				shadowed = %collision.shadowed.name,
				winner_id = collision.winner.id,
				winner = %collision.winner.name,
				"Concept key collision. The later concept shadows the earlier one."
			);
		}

		tracing::info!(
			concepts = concepts.len(),
			keys = matcher.index().len(),
			variants = matcher.variants().len(),
			"Concept index built."
		);

		Ok(matcher)
	}
}

struct DefaultProviders;
impl FeedSource for DefaultProviders {
	fn fetch<'a>(
		&'a self,
		cfg: &'a Feeds,
		url: &'a str,
	) -> BoxFuture<'a, mm_providers::Result<Vec<FeedEntry>>> {
		Box::pin(feed::fetch(cfg, url))
	}
}
impl DocumentReader for DefaultProviders {
	fn read_text<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, mm_providers::Result<String>> {
		Box::pin(documents::read_text(path))
	}
}

/// Collapses whitespace and keeps at most `max_chars` characters.
pub(crate) fn snippet(text: &str, max_chars: usize) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ").chars().take(max_chars).collect()
}
