use std::fmt;

use bson::{doc, Bson, Document};

/// The collection every message document is written to.
pub const MESSAGES_COLLECTION: &str = "messages";

/// The BSON types a schema field can be constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
	String,
	Date,
}

impl FieldType {
	/// The `bsonType` alias understood by `$jsonSchema`.
	pub const fn bson_type(self) -> &'static str {
		match self {
			FieldType::String => "string",
			FieldType::Date => "date",
		}
	}

	pub fn matches(self, value: &Bson) -> bool {
		matches!(
			(self, value),
			(FieldType::String, Bson::String(_)) | (FieldType::Date, Bson::DateTime(_))
		)
	}
}

impl fmt::Display for FieldType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.bson_type())
	}
}

/// A required, typed property of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
	pub name: &'static str,
	pub field_type: FieldType,
	pub description: &'static str,
}

impl FieldRule {
	const fn required(name: &'static str, field_type: FieldType) -> Self {
		Self {
			name,
			field_type,
			description: match field_type {
				FieldType::String => "must be a string and is required",
				FieldType::Date => "must be a date and is required",
			},
		}
	}
}

const MESSAGE_FIELDS: &[FieldRule] = &[
	FieldRule::required("sender_id", FieldType::String),
	FieldRule::required("receiver_id", FieldType::String),
	FieldRule::required("content", FieldType::String),
	FieldRule::required("created_at", FieldType::Date),
];

/// An object schema made of required, typed fields.
///
/// The same field table renders the validator handed to the database and
/// drives [`StructuralSchema::validate`], so both always agree on what a
/// valid document is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralSchema {
	fields: &'static [FieldRule],
}

impl StructuralSchema {
	/// The schema enforced on the `messages` collection.
	pub const fn messages() -> Self {
		Self { fields: MESSAGE_FIELDS }
	}

	pub fn required(&self) -> impl Iterator<Item = &'static str> {
		self.fields.iter().map(|field| field.name)
	}

	/// The body of the `$jsonSchema` operator.
	pub fn json_schema(&self) -> Document {
		let mut properties = Document::new();
		for field in self.fields {
			properties.insert(
				field.name,
				doc! {
					"bsonType": field.field_type.bson_type(),
					"description": field.description,
				},
			);
		}

		doc! {
			"bsonType": "object",
			"required": self.required().collect::<Vec<_>>(),
			"properties": properties,
		}
	}

	/// The validator document attached to the collection.
	pub fn validator(&self) -> Document {
		doc! {
			"$jsonSchema": self.json_schema(),
		}
	}

	/// Checks a document the way the database engine does on write.
	/// Every violation is reported, not only the first. Fields the schema
	/// does not name are allowed.
	pub fn validate(&self, document: &Document) -> Result<(), SchemaViolations> {
		let violations = self
			.fields
			.iter()
			.filter_map(|field| match document.get(field.name) {
				None => Some(Violation::Missing { field: field.name }),
				Some(value) if !field.field_type.matches(value) => Some(Violation::WrongType {
					field: field.name,
					expected: field.field_type,
					found: bson_type_name(value),
				}),
				Some(_) => None,
			})
			.collect::<Vec<_>>();

		if violations.is_empty() {
			Ok(())
		} else {
			Err(SchemaViolations(violations))
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
	Missing {
		field: &'static str,
	},
	WrongType {
		field: &'static str,
		expected: FieldType,
		found: &'static str,
	},
}

impl Violation {
	pub fn field(&self) -> &'static str {
		match self {
			Violation::Missing { field } | Violation::WrongType { field, .. } => *field,
		}
	}
}

impl fmt::Display for Violation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Violation::Missing { field } => write!(f, "{field}: is required"),
			Violation::WrongType { field, expected, found } => write!(f, "{field}: expected {expected}, found {found}"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", display_violations(.0))]
pub struct SchemaViolations(pub Vec<Violation>);

fn display_violations(violations: &[Violation]) -> String {
	violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[allow(unreachable_patterns)]
fn bson_type_name(value: &Bson) -> &'static str {
	match value {
		Bson::Double(_) => "double",
		Bson::String(_) => "string",
		Bson::Array(_) => "array",
		Bson::Document(_) => "object",
		Bson::Boolean(_) => "bool",
		Bson::Null => "null",
		Bson::RegularExpression(_) => "regex",
		Bson::JavaScriptCode(_) => "javascript",
		Bson::JavaScriptCodeWithScope(_) => "javascriptWithScope",
		Bson::Int32(_) => "int",
		Bson::Int64(_) => "long",
		Bson::Timestamp(_) => "timestamp",
		Bson::Binary(_) => "binData",
		Bson::ObjectId(_) => "objectId",
		Bson::DateTime(_) => "date",
		Bson::Symbol(_) => "symbol",
		Bson::Decimal128(_) => "decimal",
		Bson::Undefined => "undefined",
		Bson::MaxKey => "maxKey",
		Bson::MinKey => "minKey",
		Bson::DbPointer(_) => "dbPointer",
		_ => "unknown",
	}
}
