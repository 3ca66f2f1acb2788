mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	future::Future,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use uuid::Uuid;

const SIDECAR_SUFFIXES: [&str; 3] = ["", "-wal", "-shm"];

/// A throwaway SQLite database file under the system temp directory.
pub struct TestDatabase {
	path: PathBuf,
	cleaned: bool,
}
impl TestDatabase {
	pub fn new() -> Result<Self> {
		let path = env::temp_dir().join(format!("mm_test_{}.db", Uuid::new_v4().simple()));

		fs::File::create(&path).map_err(|err| {
			Error::Message(format!("Failed to create test database {}: {err}.", path.display()))
		})?;

		Ok(Self { path, cleaned: false })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner()
	}

	fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		remove_database_files(&self.path)?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if let Err(err) = self.cleanup_inner() {
			eprintln!("Test database cleanup failed: {err}.");
		}
	}
}

pub async fn with_test_db<F, Fut, T>(f: F) -> Result<T>
where
	F: FnOnce(&TestDatabase) -> Fut,
	Fut: Future<Output = Result<T>>,
{
	let db = TestDatabase::new()?;
	let result = f(&db).await;
	let mut db = db;

	if let Err(err) = db.cleanup_inner() {
		eprintln!("Test database cleanup warning: {err}.");

		if result.is_ok() {
			return Err(err);
		}
	}

	result
}

fn remove_database_files(path: &Path) -> Result<()> {
	for suffix in SIDECAR_SUFFIXES {
		let mut target = path.as_os_str().to_owned();

		target.push(suffix);

		match fs::remove_file(&target) {
			Ok(()) => {},
			Err(err) if err.kind() == ErrorKind::NotFound => {},
			Err(err) => return Err(err.into()),
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cleanup_removes_the_file() {
		let db = TestDatabase::new().expect("Failed to create test database.");
		let path = db.path().to_path_buf();

		assert!(path.exists());

		db.cleanup().expect("Failed to clean up test database.");

		assert!(!path.exists());
	}

	#[test]
	fn drop_removes_the_file() {
		let path = {
			let db = TestDatabase::new().expect("Failed to create test database.");

			db.path().to_path_buf()
		};

		assert!(!path.exists());
	}
}
