use anyhow::Context;

use crate::config::MessageStoreConfig;
use crate::database::{Message, SetupOutcome};

pub struct Global {
	config: MessageStoreConfig,
	database: mongodb::Database,
}

impl Global {
	pub async fn new(config: MessageStoreConfig) -> anyhow::Result<Self> {
		let timeout = config.database.timeout;

		tracing::debug!("setting up mongo client");

		let client = tokio::time::timeout(timeout, mongodb::Client::with_uri_str(&config.database.uri))
			.await
			.context("mongodb timeout")?
			.context("mongodb")?;

		let database = match &config.database.name {
			Some(name) => client.database(name),
			None => {
				let Some(database) = client.default_database() else {
					anyhow::bail!("no default database")
				};
				database
			}
		};

		Ok(Self { config, database })
	}

	pub fn database(&self) -> &mongodb::Database {
		&self.database
	}

	/// Round-trips a `ping` so a bad address fails here rather than mid setup.
	pub async fn ping(&self) -> anyhow::Result<()> {
		tokio::time::timeout(
			self.config.database.timeout,
			self.database.run_command(bson::doc! { "ping": 1 }, None),
		)
		.await
		.context("ping timeout")?
		.context("ping")?;

		Ok(())
	}

	#[tracing::instrument(skip(self), fields(database = self.database.name()))]
	pub async fn setup(&self, fail_if_exists: bool) -> anyhow::Result<SetupOutcome> {
		let timeout = self.config.database.timeout;

		if fail_if_exists {
			tokio::time::timeout(timeout, Message::create_collection(&self.database))
				.await
				.context("messages collection timeout")?
				.context("messages collection")?;

			return Ok(SetupOutcome::Created);
		}

		tokio::time::timeout(timeout, Message::setup_collection(&self.database))
			.await
			.context("messages collection timeout")?
			.context("messages collection")
	}
}
