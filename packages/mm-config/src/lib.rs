mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Feeds, Guessing, Linking, Service, Sqlite, Storage, Transcripts};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.sqlite.path.as_os_str().is_empty() {
		return Err(Error::Validation {
			message: "storage.sqlite.path must be non-empty.".to_string(),
		});
	}
	if cfg.storage.sqlite.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.sqlite.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("linking.containment_min_similarity", cfg.linking.containment_min_similarity),
		("linking.fuzzy_min_similarity", cfg.linking.fuzzy_min_similarity),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if cfg.linking.fuzzy_min_similarity < cfg.linking.containment_min_similarity {
		return Err(Error::Validation {
			message: "linking.fuzzy_min_similarity must be at least linking.containment_min_similarity."
				.to_string(),
		});
	}
	if cfg.linking.min_variant_chars == 0 {
		return Err(Error::Validation {
			message: "linking.min_variant_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.guessing.window_chars == 0 {
		return Err(Error::Validation {
			message: "guessing.window_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.guessing.max_phrase_chars == 0 {
		return Err(Error::Validation {
			message: "guessing.max_phrase_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.transcripts.episode_markers.is_empty() {
		return Err(Error::Validation {
			message: "transcripts.episode_markers must be non-empty.".to_string(),
		});
	}
	if cfg.transcripts.extensions.is_empty() {
		return Err(Error::Validation {
			message: "transcripts.extensions must be non-empty.".to_string(),
		});
	}
	if cfg.feeds.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "feeds.timeout_ms must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.transcripts.extensions = cfg
		.transcripts
		.extensions
		.iter()
		.map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
		.filter(|ext| !ext.is_empty())
		.collect();
	cfg.transcripts.episode_markers.retain(|marker| !marker.trim().is_empty());
	cfg.guessing.boilerplate_phrases.retain(|phrase| !phrase.trim().is_empty());
}
