use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use mm_service::CatalogService;
use mm_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = mm_cli::VERSION,
	rename_all = "kebab",
	styles = mm_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Create or upgrade the database schema.
	InitDb,
	/// Upsert concepts from a JSON array of `{name, category, description, notes, metadata}`.
	ImportConcepts {
		#[arg(long, value_name = "FILE")]
		file: PathBuf,
	},
	/// Merge episodes announced by an RSS or Atom feed.
	ImportRss {
		#[arg(long)]
		url: String,
	},
	/// Attach transcript documents under a directory to episodes.
	ScanTranscripts {
		#[arg(long, value_name = "DIR")]
		root: PathBuf,
	},
	/// List transcripts without a concept and linked episodes without a transcript.
	CheckMissing,
	/// Link unlinked episodes from their titles and transcripts.
	AutoLink {
		#[arg(long)]
		dry_run: bool,
	},
	/// Link unlinked episodes from phrases in their titles and fix placeholder titles.
	RepairLinks {
		#[arg(long)]
		dry_run: bool,
	},
	/// Print the decision for a single title and optional transcript.
	Match {
		#[arg(long)]
		title: String,
		#[arg(long, value_name = "FILE")]
		transcript_file: Option<PathBuf>,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = mm_config::load(&args.config)?;

	init_tracing(&config);

	let db = Db::connect(&config.storage.sqlite).await?;
	let service = CatalogService::new(config, db);

	// Every command but init-db needs a complete schema.
	if !matches!(args.command, Command::InitDb) {
		service.verify_db().await?;
	}

	dispatch(&service, args.command).await
}

async fn dispatch(service: &CatalogService, command: Command) -> color_eyre::Result<()> {
	match command {
		Command::InitDb => print_json(&service.init_db().await?),
		Command::ImportConcepts { file } => print_json(&service.import_concepts_file(&file).await?),
		Command::ImportRss { url } => print_json(&service.import_rss(&url).await?),
		Command::ScanTranscripts { root } => print_json(&service.scan_transcripts(&root).await?),
		Command::CheckMissing => print_json(&service.check_missing().await?),
		Command::AutoLink { dry_run } => print_json(&service.auto_link(dry_run).await?),
		Command::RepairLinks { dry_run } => print_json(&service.repair_links(dry_run).await?),
		Command::Match { title, transcript_file } => {
			let transcript = match transcript_file {
				Some(path) => Some(service.providers.documents.read_text(&path).await?),
				None => None,
			};

			print_json(&service.match_one(&title, transcript.as_deref()).await?)
		},
	}
}

fn init_tracing(config: &mm_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn print_json<T>(value: &T) -> color_eyre::Result<()>
where
	T: Serialize,
{
	println!("{}", serde_json::to_string_pretty(value)?);

	Ok(())
}
