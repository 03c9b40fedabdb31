use bson::oid::ObjectId;

use crate::config::MessageStoreConfig;
use crate::global::Global;

const TEST_URI_ENV: &str = "MESSAGE_STORE_TEST_MONGODB_URI";

/// Connects to a fresh, uniquely named database on the server named by
/// `MESSAGE_STORE_TEST_MONGODB_URI`. Returns `None` when the variable is not
/// set so database tests can be skipped on machines without MongoDB.
pub async fn test_global() -> Option<Global> {
	let Ok(uri) = std::env::var(TEST_URI_ENV) else {
		eprintln!("{TEST_URI_ENV} not set, skipping database test");
		return None;
	};

	let mut config = MessageStoreConfig::default();
	config.database.uri = uri;
	config.database.name = Some(format!("message_store_test_{}", ObjectId::new().to_hex()));

	let global = Global::new(config).await.expect("failed to set up global");
	global.ping().await.expect("database unreachable");

	Some(global)
}

pub async fn teardown(global: Global) {
	global.database().drop(None).await.expect("failed to drop test database");
}
