use bson::oid::ObjectId;
use bson::{Bson, Document};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};

/// A predicate value as supplied by the caller, before coercion to BSON.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A calendar instant. The caller's offset is kept until coercion.
    Date(DateTime<FixedOffset>),
    Array(Vec<QueryValue>),
    /// A value already expressed in the store's own vocabulary (operator
    /// documents, object ids, regexes). Never looked into.
    Native(Bson),
}

impl QueryValue {
    /// Map this value to its store-native BSON representation.
    ///
    /// - Dates become a UTC millisecond `DateTime`, whatever their offset.
    /// - Integers that fit in 32 bits encode as `Int32`, the rest as `Int64`.
    /// - Arrays coerce element-wise.
    /// - `Native` values pass through untouched.
    pub fn coerce(&self) -> Bson {
        match self {
            QueryValue::Null => Bson::Null,
            QueryValue::Bool(b) => Bson::Boolean(*b),
            QueryValue::Int(n) => int_bson(*n),
            QueryValue::Float(f) => Bson::Double(*f),
            QueryValue::String(s) => Bson::String(s.clone()),
            QueryValue::Date(dt) => Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis())),
            QueryValue::Array(items) => Bson::Array(items.iter().map(QueryValue::coerce).collect()),
            QueryValue::Native(raw) => raw.clone(),
        }
    }

    pub fn as_array(&self) -> Option<&[QueryValue]> {
        match self {
            QueryValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_native_document(&self) -> bool {
        matches!(self, QueryValue::Native(Bson::Document(_)))
    }
}

/// Shorthand for [`QueryValue::coerce`].
pub fn coerce(value: &QueryValue) -> Bson {
    value.coerce()
}

/// Encode an integer the way the wire driver does: `Int32` when it fits.
pub fn int_bson(n: i64) -> Bson {
    match i32::try_from(n) {
        Ok(small) => Bson::Int32(small),
        Err(_) => Bson::Int64(n),
    }
}

// ── Conversions ───────────────────────────────────────────────

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::String(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::String(s)
    }
}

impl From<&String> for QueryValue {
    fn from(s: &String) -> Self {
        QueryValue::String(s.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        QueryValue::Bool(b)
    }
}

impl From<i32> for QueryValue {
    fn from(n: i32) -> Self {
        QueryValue::Int(n.into())
    }
}

impl From<i64> for QueryValue {
    fn from(n: i64) -> Self {
        QueryValue::Int(n)
    }
}

impl From<u32> for QueryValue {
    fn from(n: u32) -> Self {
        QueryValue::Int(n.into())
    }
}

impl From<f64> for QueryValue {
    fn from(f: f64) -> Self {
        QueryValue::Float(f)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for QueryValue {
    fn from(dt: DateTime<Tz>) -> Self {
        let offset = dt.offset().fix();
        QueryValue::Date(dt.with_timezone(&offset))
    }
}

/// Naive timestamps are read as UTC.
impl From<NaiveDateTime> for QueryValue {
    fn from(naive: NaiveDateTime) -> Self {
        Utc.from_utc_datetime(&naive).into()
    }
}

impl From<Document> for QueryValue {
    fn from(doc: Document) -> Self {
        QueryValue::Native(Bson::Document(doc))
    }
}

impl From<Bson> for QueryValue {
    fn from(raw: Bson) -> Self {
        QueryValue::Native(raw)
    }
}

impl From<ObjectId> for QueryValue {
    fn from(oid: ObjectId) -> Self {
        QueryValue::Native(Bson::ObjectId(oid))
    }
}

impl From<bson::DateTime> for QueryValue {
    fn from(dt: bson::DateTime) -> Self {
        QueryValue::Native(Bson::DateTime(dt))
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Null, Into::into)
    }
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(items: Vec<T>) -> Self {
        QueryValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<QueryValue>, const N: usize> From<[T; N]> for QueryValue {
    fn from(items: [T; N]) -> Self {
        QueryValue::Array(items.into_iter().map(Into::into).collect())
    }
}
