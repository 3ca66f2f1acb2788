#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Table {table} is missing required column {column}.")]
	MissingColumn { table: &'static str, column: &'static str },
	#[error("Table {0} does not exist.")]
	MissingTable(&'static str),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
}
