use bson::{Bson, Document};

use crate::error::QueryError;

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
    /// Sort on projected metadata, e.g. `{ "$meta": "textScore" }`.
    Meta(Document),
}

impl SortDirection {
    pub fn to_bson(&self) -> Bson {
        match self {
            SortDirection::Asc => Bson::Int32(1),
            SortDirection::Desc => Bson::Int32(-1),
            SortDirection::Meta(meta) => Bson::Document(meta.clone()),
        }
    }
}

/// A direction as the caller spells it, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectionArg {
    Keyword(String),
    Number(i64),
    Native(Document),
}

impl From<&str> for DirectionArg {
    fn from(s: &str) -> Self {
        DirectionArg::Keyword(s.to_string())
    }
}

impl From<String> for DirectionArg {
    fn from(s: String) -> Self {
        DirectionArg::Keyword(s)
    }
}

impl From<i32> for DirectionArg {
    fn from(n: i32) -> Self {
        DirectionArg::Number(n.into())
    }
}

impl From<i64> for DirectionArg {
    fn from(n: i64) -> Self {
        DirectionArg::Number(n)
    }
}

impl From<Document> for DirectionArg {
    fn from(doc: Document) -> Self {
        DirectionArg::Native(doc)
    }
}

impl From<SortDirection> for DirectionArg {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => DirectionArg::Number(1),
            SortDirection::Desc => DirectionArg::Number(-1),
            SortDirection::Meta(meta) => DirectionArg::Native(meta),
        }
    }
}

impl TryFrom<DirectionArg> for SortDirection {
    type Error = QueryError;

    fn try_from(arg: DirectionArg) -> Result<Self, Self::Error> {
        match arg {
            DirectionArg::Keyword(word) if word.eq_ignore_ascii_case("asc") => Ok(SortDirection::Asc),
            DirectionArg::Keyword(word) if word.eq_ignore_ascii_case("desc") => Ok(SortDirection::Desc),
            DirectionArg::Number(1) => Ok(SortDirection::Asc),
            DirectionArg::Number(-1) => Ok(SortDirection::Desc),
            DirectionArg::Native(meta) => Ok(SortDirection::Meta(meta)),
            _ => Err(QueryError::invalid_direction()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderClause {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderClause {
    pub fn new(column: impl Into<String>, direction: impl Into<DirectionArg>) -> Result<Self, QueryError> {
        Ok(Self {
            column: column.into(),
            direction: SortDirection::try_from(direction.into())?,
        })
    }

    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}
