use sqlx::{
	SqlitePool,
	sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{Error, Result, schema};

pub struct Db {
	pub pool: SqlitePool,
}
impl Db {
	pub async fn connect(cfg: &mm_config::Sqlite) -> Result<Self> {
		let options = SqliteConnectOptions::new()
			.filename(&cfg.path)
			.create_if_missing(true)
			.foreign_keys(true);
		let pool = SqlitePoolOptions::new()
			.max_connections(cfg.pool_max_conns)
			.connect_with(options)
			.await?;

		Ok(Self { pool })
	}

	/// Creates missing tables, adds columns older databases lack, then verifies the result.
	pub async fn ensure_schema(&self) -> Result<()> {
		let mut tx = self.pool.begin().await?;

		for statement in schema::statements(&schema::render_schema()) {
			sqlx::query(statement).execute(&mut *tx).await?;
		}

		for (table, column, definition) in schema::BACKFILL_COLUMNS {
			let existing = table_columns(&mut tx, table).await?;

			if existing.iter().any(|name| name == column) {
				continue;
			}

			tracing::info!(table, column, "Adding missing column.");

			sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))
				.execute(&mut *tx)
				.await?;
		}

		for statement in schema::statements(&schema::render_indexes()) {
			sqlx::query(statement).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		self.verify_schema().await
	}

	/// Fails when a table or column the queries depend on is absent.
	pub async fn verify_schema(&self) -> Result<()> {
		let mut conn = self.pool.acquire().await?;

		for (table, columns) in schema::REQUIRED_COLUMNS {
			let existing = table_columns(&mut conn, table).await?;

			if existing.is_empty() {
				return Err(Error::MissingTable(table));
			}

			for &column in columns {
				if !existing.iter().any(|name| name == column) {
					return Err(Error::MissingColumn { table, column });
				}
			}
		}

		Ok(())
	}
}

async fn table_columns(conn: &mut sqlx::SqliteConnection, table: &str) -> Result<Vec<String>> {
	let names = sqlx::query_scalar("SELECT name FROM pragma_table_info(?1)")
		.bind(table)
		.fetch_all(conn)
		.await?;

	Ok(names)
}
