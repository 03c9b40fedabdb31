use bson::{doc, Bson, Document};

use crate::database::Message;
use crate::schema::{FieldType, StructuralSchema, Violation, MESSAGES_COLLECTION};

fn valid_document() -> Document {
	doc! {
		"sender_id": "u1",
		"receiver_id": "u2",
		"content": "hello",
		"created_at": bson::DateTime::now(),
	}
}

#[test]
fn collection_name() {
	assert_eq!(MESSAGES_COLLECTION, "messages");
}

#[test]
fn validator_matches_declared_schema() {
	let expected = doc! {
		"$jsonSchema": {
			"bsonType": "object",
			"required": ["sender_id", "receiver_id", "content", "created_at"],
			"properties": {
				"sender_id": {
					"bsonType": "string",
					"description": "must be a string and is required",
				},
				"receiver_id": {
					"bsonType": "string",
					"description": "must be a string and is required",
				},
				"content": {
					"bsonType": "string",
					"description": "must be a string and is required",
				},
				"created_at": {
					"bsonType": "date",
					"description": "must be a date and is required",
				},
			},
		},
	};

	assert_eq!(StructuralSchema::messages().validator(), expected);
}

#[test]
fn accepts_well_typed_document() {
	assert_eq!(StructuralSchema::messages().validate(&valid_document()), Ok(()));
}

#[test]
fn accepts_extra_fields() {
	let mut document = valid_document();
	document.insert("delivered", false);
	document.insert("file_url", "https://example.com/cat.png");

	assert!(StructuralSchema::messages().validate(&document).is_ok());
}

#[test]
fn rejects_each_missing_field() {
	let schema = StructuralSchema::messages();

	for field in schema.required() {
		let mut document = valid_document();
		document.remove(field);

		let violations = schema.validate(&document).expect_err(field).0;
		assert_eq!(violations, vec![Violation::Missing { field }], "field: {field}");
	}
}

#[test]
fn rejects_non_string_ids_and_content() {
	let schema = StructuralSchema::messages();

	for field in ["sender_id", "receiver_id", "content"] {
		for value in [Bson::Int32(1), Bson::Null, Bson::Boolean(true), Bson::DateTime(bson::DateTime::now())] {
			let mut document = valid_document();
			document.insert(field, value.clone());

			let violations = schema.validate(&document).expect_err(field).0;
			assert_eq!(violations.len(), 1, "field: {field}, value: {value:?}");
			assert!(
				matches!(
					violations[0],
					Violation::WrongType {
						field: f,
						expected: FieldType::String,
						..
					} if f == field
				),
				"field: {field}, value: {value:?}"
			);
		}
	}
}

#[test]
fn rejects_non_date_created_at() {
	let schema = StructuralSchema::messages();

	for value in [
		Bson::String("2024-01-01T00:00:00Z".to_string()),
		Bson::Int64(1_700_000_000_000),
		Bson::Timestamp(bson::Timestamp { time: 1, increment: 1 }),
	] {
		let mut document = valid_document();
		document.insert("created_at", value.clone());

		let violations = schema.validate(&document).expect_err("created_at").0;
		assert_eq!(violations.len(), 1, "value: {value:?}");
		assert_eq!(violations[0].field(), "created_at");
	}
}

#[test]
fn reports_every_violation() {
	let document = doc! {
		"sender_id": 42,
		"content": "hello",
		"created_at": "yesterday",
	};

	let err = StructuralSchema::messages().validate(&document).unwrap_err();

	assert_eq!(
		err.0,
		vec![
			Violation::WrongType {
				field: "sender_id",
				expected: FieldType::String,
				found: "int",
			},
			Violation::Missing { field: "receiver_id" },
			Violation::WrongType {
				field: "created_at",
				expected: FieldType::Date,
				found: "string",
			},
		]
	);
	assert_eq!(
		err.to_string(),
		"sender_id: expected string, found int; receiver_id: is required; created_at: expected date, found string"
	);
}

#[test]
fn message_serializes_to_valid_document() {
	let message = Message::new("u1", "u2", "hello");
	let document = bson::to_document(&message).expect("serialize message");

	assert!(matches!(document.get("created_at"), Some(Bson::DateTime(_))));
	assert!(matches!(document.get("_id"), Some(Bson::ObjectId(_))));
	assert!(!document.contains_key("file_url"));
	assert!(!document.contains_key("delivered_at"));
	assert_eq!(document.get_bool("delivered").ok(), Some(false));
	assert_eq!(StructuralSchema::messages().validate(&document), Ok(()));

	let decoded: Message = bson::from_document(document).expect("deserialize message");
	assert_eq!(decoded, message);
}
