//! Scratch Postgres databases and Qdrant collections for integration tests.
//!
//! Both are opt-in through environment variables; tests skip themselves when unset.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread, time::Duration};

use qdrant_client::Qdrant;
use sqlx::{
	ConnectOptions, Connection,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

pub const PG_DSN_VAR: &str = "AUGUR_PG_DSN";
pub const QDRANT_URL_VAR: &str = "AUGUR_QDRANT_URL";

const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];
const QDRANT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn env_dsn() -> Option<String> {
	non_empty_var(PG_DSN_VAR)
}

pub fn env_qdrant_url() -> Option<String> {
	non_empty_var(QDRANT_URL_VAR)
}

/// A database created for one test and dropped on [`TestDatabase::cleanup`] or drop.
pub struct TestDatabase {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Invalid {PG_DSN_VAR}: {err}.")))?;
		let (maintenance, mut conn) = maintenance_connection(&base).await?;
		let name = format!("augur_test_{}", Uuid::new_v4().simple());

		sqlx::query(&format!(r#"CREATE DATABASE "{name}""#)).execute(&mut conn).await?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.name, &self.maintenance).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let maintenance = self.maintenance.clone();

		block_on_side_runtime(async move {
			if let Err(err) = drop_database(&name, &maintenance).await {
				eprintln!("Failed to drop test database {name}: {err}.");
			}
		});
	}
}

/// Uniquely named match-history and prediction collections on a live Qdrant.
pub struct TestCollections {
	url: String,
	match_history: String,
	predictions: String,
	deleted: bool,
}
impl TestCollections {
	pub fn new(url: impl Into<String>) -> Self {
		let suffix = Uuid::new_v4().simple().to_string();

		Self {
			url: url.into(),
			match_history: format!("augur_test_history_{suffix}"),
			predictions: format!("augur_test_predictions_{suffix}"),
			deleted: false,
		}
	}

	/// Qdrant settings pointing at these collections.
	pub fn config(&self, vector_dim: u32) -> augur_config::Qdrant {
		augur_config::Qdrant {
			enabled: true,
			url: self.url.clone(),
			match_history_collection: self.match_history.clone(),
			predictions_collection: self.predictions.clone(),
			vector_dim,
		}
	}

	pub async fn cleanup(mut self) -> Result<()> {
		delete_collections(&self.url, &self.names()).await?;

		self.deleted = true;

		Ok(())
	}

	fn names(&self) -> [String; 2] {
		[self.match_history.clone(), self.predictions.clone()]
	}
}
impl Drop for TestCollections {
	fn drop(&mut self) {
		if self.deleted {
			return;
		}

		let url = self.url.clone();
		let names = self.names();

		block_on_side_runtime(async move {
			if let Err(err) = delete_collections(&url, &names).await {
				eprintln!("Failed to delete test collections: {err}.");
			}
		});
	}
}

fn non_empty_var(key: &str) -> Option<String> {
	env::var(key).ok().filter(|value| !value.trim().is_empty())
}

// Drop may run while the test runtime is shutting down, so cleanup gets a runtime of its own.
fn block_on_side_runtime<F>(fut: F)
where
	F: Future<Output = ()> + Send + 'static,
{
	let handle = thread::spawn(move || match Builder::new_current_thread().enable_all().build() {
		Ok(runtime) => runtime.block_on(fut),
		Err(err) => eprintln!("Failed to start cleanup runtime: {err}."),
	});
	let _ = handle.join();
}

async fn maintenance_connection(
	base: &PgConnectOptions,
) -> Result<(PgConnectOptions, PgConnection)> {
	let mut failures = Vec::new();

	for database in MAINTENANCE_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => failures.push(format!("{database}: {err}")),
		}
	}

	Err(Error::Message(format!("No maintenance database reachable ({}).", failures.join("; "))))
}

async fn drop_database(name: &str, maintenance: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance).await?;

	// Lingering pool connections would block the drop.
	sqlx::query(
		"SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
		 WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(name)
	.execute(&mut conn)
	.await?;
	sqlx::query(&format!(r#"DROP DATABASE IF EXISTS "{name}""#)).execute(&mut conn).await?;

	Ok(())
}

async fn delete_collections(url: &str, names: &[String]) -> Result<()> {
	let client = Qdrant::from_url(url).build()?;

	for name in names {
		let deleted = tokio::time::timeout(QDRANT_TIMEOUT, client.delete_collection(name.clone()))
			.await
			.map_err(|_| Error::Message(format!("Timed out deleting collection {name}.")))?;

		deleted?;
	}

	Ok(())
}
