use std::time::Duration;

use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::options::{CreateCollectionOptions, FindOptions, ValidationAction, ValidationLevel};
use mongodb::{Collection, Database};

use crate::error::{is_namespace_exists, MessageError, SetupError};
use crate::schema::{StructuralSchema, MESSAGES_COLLECTION};

/// How far back [`Message::undelivered`] looks by default.
pub const UNDELIVERED_WINDOW: Duration = Duration::from_secs(5 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Message {
	#[serde(rename = "_id")]
	/// The id of the message
	pub id: ObjectId,
	/// The user that sent the message
	pub sender_id: String,
	/// The user the message is addressed to
	pub receiver_id: String,
	/// The message body
	pub content: String,
	/// When the message was written, stored as a BSON date
	pub created_at: bson::DateTime,
	/// An optional attachment
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_url: Option<String>,
	/// Whether the receiver has been handed the message
	#[serde(default)]
	pub delivered: bool,
	/// When the message was handed to the receiver
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub delivered_at: Option<bson::DateTime>,
}

/// What [`Message::setup_collection`] found or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
	Created,
	Existing,
}

impl Message {
	pub fn new(sender_id: impl Into<String>, receiver_id: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			id: ObjectId::new(),
			sender_id: sender_id.into(),
			receiver_id: receiver_id.into(),
			content: content.into(),
			created_at: chrono::Utc::now().into(),
			file_url: None,
			delivered: false,
			delivered_at: None,
		}
	}

	pub fn with_file_url(mut self, file_url: impl Into<String>) -> Self {
		self.file_url = Some(file_url.into());
		self
	}

	fn collection(database: &Database) -> Collection<Message> {
		database.collection(MESSAGES_COLLECTION)
	}

	/// Creates the collection with the message schema attached as its
	/// validator. Fails with [`SetupError::AlreadyExists`] if the collection
	/// is already there.
	#[tracing::instrument(skip(database), fields(database = database.name()))]
	pub async fn create_collection(database: &Database) -> Result<(), SetupError> {
		let options = CreateCollectionOptions::builder()
			.validator(Some(StructuralSchema::messages().validator()))
			.validation_level(Some(ValidationLevel::Strict))
			.validation_action(Some(ValidationAction::Error))
			.build();

		match database.create_collection(MESSAGES_COLLECTION, options).await {
			Ok(()) => {
				tracing::info!("created {MESSAGES_COLLECTION} collection with schema validation");
				Ok(())
			}
			Err(err) if is_namespace_exists(&err) => Err(SetupError::AlreadyExists {
				collection: MESSAGES_COLLECTION,
			}),
			Err(err) => Err(err.into()),
		}
	}

	/// Creates the collection unless it already exists. An existing
	/// collection is left untouched, including its validator.
	#[tracing::instrument(skip(database), fields(database = database.name()))]
	pub async fn setup_collection(database: &Database) -> Result<SetupOutcome, SetupError> {
		let existing = database
			.list_collection_names(Some(bson::doc! { "name": MESSAGES_COLLECTION }))
			.await?;

		if existing.iter().any(|name| name == MESSAGES_COLLECTION) {
			tracing::info!("{MESSAGES_COLLECTION} collection already exists, skipping");
			return Ok(SetupOutcome::Existing);
		}

		match Self::create_collection(database).await {
			Ok(()) => Ok(SetupOutcome::Created),
			// another process created it between the listing and the create
			Err(SetupError::AlreadyExists { .. }) => {
				tracing::info!("{MESSAGES_COLLECTION} collection was created concurrently");
				Ok(SetupOutcome::Existing)
			}
			Err(err) => Err(err),
		}
	}

	/// Writes the message. Documents the validator refuses come back as
	/// [`MessageError::Rejected`].
	pub async fn insert(&self, database: &Database) -> Result<(), MessageError> {
		Self::collection(database).insert_one(self, None).await?;
		Ok(())
	}

	pub async fn find(database: &Database, id: ObjectId) -> Result<Option<Self>, MessageError> {
		Ok(Self::collection(database).find_one(bson::doc! { "_id": id }, None).await?)
	}

	/// Messages exchanged between two users in either direction, oldest
	/// first.
	pub async fn conversation(
		database: &Database,
		user_a: &str,
		user_b: &str,
		limit: i64,
		offset: u64,
	) -> Result<Vec<Self>, MessageError> {
		let filter = bson::doc! {
			"$or": [
				{ "sender_id": user_a, "receiver_id": user_b },
				{ "sender_id": user_b, "receiver_id": user_a },
			],
		};

		let options = FindOptions::builder()
			.sort(Some(bson::doc! { "created_at": 1, "_id": 1 }))
			.limit(Some(limit))
			.skip(Some(offset))
			.build();

		let cursor = Self::collection(database).find(filter, options).await?;

		Ok(cursor.try_collect::<Vec<_>>().await?)
	}

	/// Messages for `receiver_id` that have not been delivered and were
	/// written within `window`.
	pub async fn undelivered(database: &Database, receiver_id: &str, window: Duration) -> Result<Vec<Self>, MessageError> {
		let since = bson::DateTime::from_millis(
			bson::DateTime::now()
				.timestamp_millis()
				.saturating_sub(window.as_millis().try_into().unwrap_or(i64::MAX)),
		);

		let cursor = Self::collection(database)
			.find(
				bson::doc! {
					"receiver_id": receiver_id,
					"delivered": false,
					"created_at": { "$gte": since },
				},
				Some(FindOptions::builder().sort(Some(bson::doc! { "created_at": 1 })).build()),
			)
			.await?;

		Ok(cursor.try_collect::<Vec<_>>().await?)
	}

	/// Marks the message as delivered
	/// # Returns
	/// Whether a message was modified, false if the id is unknown or the
	/// message was already delivered
	pub async fn mark_delivered(database: &Database, id: ObjectId) -> Result<bool, MessageError> {
		let result = Self::collection(database)
			.update_one(
				bson::doc! {
					"_id": id,
					"delivered": false,
				},
				bson::doc! {
					"$set": {
						"delivered": true,
						"delivered_at": bson::DateTime::now(),
					},
				},
				None,
			)
			.await?;

		Ok(result.modified_count == 1)
	}
}
