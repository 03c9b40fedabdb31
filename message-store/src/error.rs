use mongodb::error::{ErrorKind, WriteFailure};

/// `NamespaceExists`, returned by `create` for a collection that is already there.
const NAMESPACE_EXISTS: i32 = 48;
/// `DocumentValidationFailure`, returned when a write does not satisfy the validator.
const DOCUMENT_VALIDATION_FAILURE: i32 = 121;

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
	#[error("collection already exists: {collection}")]
	AlreadyExists { collection: &'static str },
	#[error("database: {0}")]
	Database(#[from] mongodb::error::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
	#[error("document rejected by validator: {message}")]
	Rejected { message: String },
	#[error("database: {0}")]
	Database(mongodb::error::Error),
}

impl From<mongodb::error::Error> for MessageError {
	fn from(err: mongodb::error::Error) -> Self {
		match validation_failure(&err) {
			Some(message) => MessageError::Rejected { message },
			None => MessageError::Database(err),
		}
	}
}

pub(crate) fn is_namespace_exists(err: &mongodb::error::Error) -> bool {
	matches!(err.kind.as_ref(), ErrorKind::Command(command) if command.code == NAMESPACE_EXISTS)
}

fn validation_failure(err: &mongodb::error::Error) -> Option<String> {
	match err.kind.as_ref() {
		ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DOCUMENT_VALIDATION_FAILURE => {
			Some(write.message.clone())
		}
		_ => None,
	}
}
