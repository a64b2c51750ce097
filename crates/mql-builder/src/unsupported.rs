use mql_query::{QueryError, QueryValue, UnsupportedMethod};

fn reject(method: UnsupportedMethod) -> QueryError {
    tracing::warn!(method = method.name(), "relational method has no document-store translation");
    QueryError::UnsupportedOperation(method)
}

/// Relational builder methods with no translation to the document store.
///
/// Every method fails before touching the builder, so implementors get the
/// whole set by writing `impl RelationalOnly for T {}`.
pub trait RelationalOnly {
    fn to_sql(&self) -> Result<String, QueryError> {
        Err(reject(UnsupportedMethod::ToSql))
    }

    fn to_raw_sql(&self) -> Result<String, QueryError> {
        Err(reject(UnsupportedMethod::ToRawSql))
    }

    fn where_raw(&mut self, _sql: &str, _bindings: &[QueryValue]) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::WhereRaw))
    }

    fn or_where_raw(
        &mut self,
        _sql: &str,
        _bindings: &[QueryValue],
    ) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::OrWhereRaw))
    }

    fn where_column(&mut self, _first: &str, _second: &str) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::WhereColumn))
    }

    fn or_where_column(&mut self, _first: &str, _second: &str) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::OrWhereColumn))
    }

    fn where_fulltext(&mut self, _columns: &[&str], _text: &str) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::WhereFulltext))
    }

    fn or_where_fulltext(
        &mut self,
        _columns: &[&str],
        _text: &str,
    ) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::OrWhereFulltext))
    }

    fn group_by_raw(&mut self, _sql: &str) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::GroupByRaw))
    }

    fn order_by_raw(&mut self, _sql: &str, _bindings: &[QueryValue]) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::OrderByRaw))
    }

    fn select_raw(&mut self, _sql: &str) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::SelectRaw))
    }

    fn in_random_order(&mut self) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::InRandomOrder))
    }

    fn union(&mut self, _other: &Self) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::Union))
    }

    fn union_all(&mut self, _other: &Self) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::UnionAll))
    }

    fn having(
        &mut self,
        _column: &str,
        _operator: &str,
        _value: QueryValue,
    ) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::Having))
    }

    fn or_having(
        &mut self,
        _column: &str,
        _operator: &str,
        _value: QueryValue,
    ) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::OrHaving))
    }

    fn having_raw(&mut self, _sql: &str) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::HavingRaw))
    }

    fn or_having_raw(&mut self, _sql: &str) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::OrHavingRaw))
    }

    fn having_between(
        &mut self,
        _column: &str,
        _bounds: [QueryValue; 2],
    ) -> Result<&mut Self, QueryError> {
        Err(reject(UnsupportedMethod::HavingBetween))
    }
}
