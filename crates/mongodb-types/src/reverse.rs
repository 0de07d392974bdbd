//! Reverse conversion: BSON value → SourceValue.

use bson::{Bson, Document};
use sync_core::{SourceDocument, SourceValue};

/// Convert one BSON value into a tagged source value.
///
/// Scalars keep their kind. Identifiers, symbols and decimals become text;
/// arrays and embedded documents are rendered as relaxed extended JSON.
pub fn bson_to_source_value(value: &Bson) -> SourceValue {
    match value {
        Bson::Null | Bson::Undefined => SourceValue::Absent,

        Bson::Boolean(b) => SourceValue::Boolean(*b),
        Bson::Int32(i) => SourceValue::Integer(i64::from(*i)),
        Bson::Int64(i) => SourceValue::Integer(*i),
        Bson::Double(f) => SourceValue::Float(*f),

        Bson::String(s) | Bson::Symbol(s) | Bson::JavaScriptCode(s) => {
            SourceValue::Text(s.clone())
        }
        Bson::ObjectId(oid) => SourceValue::Text(oid.to_hex()),
        Bson::Decimal128(d) => SourceValue::Text(d.to_string()),

        Bson::DateTime(dt) => SourceValue::Date(dt.to_chrono()),
        Bson::Timestamp(ts) => SourceValue::Timestamp {
            seconds: ts.time,
            increment: ts.increment,
        },

        Bson::Binary(bin) => SourceValue::Binary(bin.bytes.clone()),

        // Arrays, documents and the remaining special types
        other => SourceValue::Text(other.clone().into_relaxed_extjson().to_string()),
    }
}

/// A BSON document read through the [`SourceDocument`] interface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BsonDocument(pub Document);

impl BsonDocument {
    pub fn into_inner(self) -> Document {
        self.0
    }
}

impl From<Document> for BsonDocument {
    fn from(doc: Document) -> Self {
        Self(doc)
    }
}

impl SourceDocument for BsonDocument {
    fn field(&self, name: &str) -> SourceValue {
        self.0
            .get(name)
            .map(bson_to_source_value)
            .unwrap_or(SourceValue::Absent)
    }
}
