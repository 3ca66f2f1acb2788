use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	Xml(#[from] quick_xml::Error),
	#[error("Failed to read {path:?}.")]
	ReadDocument {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("{message}")]
	InvalidResponse { message: String },
}
