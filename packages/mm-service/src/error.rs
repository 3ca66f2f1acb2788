pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("No concepts are loaded. Import concepts before linking.")]
	NoConcepts,
	#[error("No usable concept name variants could be built from the catalog.")]
	NoVariants,
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Invalid configuration: {message}")]
	InvalidConfig { message: String },
	#[error("Schema error: {message}")]
	Schema { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error(transparent)]
	Json(#[from] serde_json::Error),
}
impl From<mm_storage::Error> for Error {
	fn from(err: mm_storage::Error) -> Self {
		match err {
			mm_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			mm_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			err @ (mm_storage::Error::MissingTable(_) | mm_storage::Error::MissingColumn { .. }) =>
				Self::Schema { message: err.to_string() },
		}
	}
}

impl From<mm_providers::Error> for Error {
	fn from(err: mm_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
