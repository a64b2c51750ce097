use std::fmt;

/// Message carried by every sort-direction validation failure.
pub const INVALID_DIRECTION: &str = r#"Order direction must be "asc" or "desc""#;

/// Message carried by every unsupported relational method.
pub const NOT_SUPPORTED: &str = "This method is not supported by MongoDB";

// ── UnsupportedMethod ─────────────────────────────────────────

/// Relational builder methods that have no document-store translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsupportedMethod {
    ToSql,
    ToRawSql,
    WhereRaw,
    OrWhereRaw,
    WhereColumn,
    OrWhereColumn,
    WhereFulltext,
    OrWhereFulltext,
    GroupByRaw,
    OrderByRaw,
    SelectRaw,
    InRandomOrder,
    Union,
    UnionAll,
    Having,
    OrHaving,
    HavingRaw,
    OrHavingRaw,
    HavingBetween,
}

impl UnsupportedMethod {
    pub const ALL: [UnsupportedMethod; 19] = [
        Self::ToSql,
        Self::ToRawSql,
        Self::WhereRaw,
        Self::OrWhereRaw,
        Self::WhereColumn,
        Self::OrWhereColumn,
        Self::WhereFulltext,
        Self::OrWhereFulltext,
        Self::GroupByRaw,
        Self::OrderByRaw,
        Self::SelectRaw,
        Self::InRandomOrder,
        Self::Union,
        Self::UnionAll,
        Self::Having,
        Self::OrHaving,
        Self::HavingRaw,
        Self::OrHavingRaw,
        Self::HavingBetween,
    ];

    /// The builder method name, as it appears on the builder.
    pub fn name(self) -> &'static str {
        match self {
            Self::ToSql => "to_sql",
            Self::ToRawSql => "to_raw_sql",
            Self::WhereRaw => "where_raw",
            Self::OrWhereRaw => "or_where_raw",
            Self::WhereColumn => "where_column",
            Self::OrWhereColumn => "or_where_column",
            Self::WhereFulltext => "where_fulltext",
            Self::OrWhereFulltext => "or_where_fulltext",
            Self::GroupByRaw => "group_by_raw",
            Self::OrderByRaw => "order_by_raw",
            Self::SelectRaw => "select_raw",
            Self::InRandomOrder => "in_random_order",
            Self::Union => "union",
            Self::UnionAll => "union_all",
            Self::Having => "having",
            Self::OrHaving => "or_having",
            Self::HavingRaw => "having_raw",
            Self::OrHavingRaw => "or_having_raw",
            Self::HavingBetween => "having_between",
        }
    }
}

impl fmt::Display for UnsupportedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── QueryError ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Malformed input to a clause-adding call.
    InvalidArgument(String),
    /// A relational feature with no document-store translation.
    UnsupportedOperation(UnsupportedMethod),
}

impl QueryError {
    pub fn invalid_direction() -> Self {
        QueryError::InvalidArgument(INVALID_DIRECTION.to_string())
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::InvalidArgument(msg) => f.write_str(msg),
            QueryError::UnsupportedOperation(_) => f.write_str(NOT_SUPPORTED),
        }
    }
}

impl std::error::Error for QueryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_message_is_fixed() {
        for method in UnsupportedMethod::ALL {
            let err = QueryError::UnsupportedOperation(method);
            assert_eq!(err.to_string(), "This method is not supported by MongoDB");
        }
    }

    #[test]
    fn invalid_direction_names_both_keywords() {
        let err = QueryError::invalid_direction();
        assert_eq!(err.to_string(), r#"Order direction must be "asc" or "desc""#);
    }

    #[test]
    fn method_names_are_unique() {
        let mut names: Vec<_> = UnsupportedMethod::ALL.iter().map(|m| m.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), UnsupportedMethod::ALL.len());
    }
}
