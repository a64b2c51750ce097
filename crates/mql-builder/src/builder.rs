use bson::{Bson, Document};
use mql_query::{
    Boolean, ClauseModel, DirectionArg, NestedWhere, Operator, OrderClause, QueryError,
    QueryValue, Where, WhereClause,
};

use crate::command::CompiledCommand;
use crate::compiler::{self, AggregateFunction};
use crate::config::BuilderConfig;
use crate::unsupported::RelationalOnly;

/// Fluent query builder over a single collection.
///
/// Chained calls mutate the builder in place. Calls that can reject their
/// input return `Result` and leave the builder untouched on error.
///
/// A builder is meant to be driven by one caller at a time; share it across
/// threads only behind your own synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct Builder {
    collection: String,
    model: ClauseModel,
}

impl Builder {
    pub fn new(collection: impl Into<String>) -> Self {
        Self::with_config(&BuilderConfig::new(collection))
    }

    pub fn with_config(config: &BuilderConfig) -> Self {
        let mut model = ClauseModel::default();
        model.options.max_time_ms = config.max_time_ms;
        model.options.comment = config.comment.clone();
        Self {
            collection: config.collection.clone(),
            model,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn model(&self) -> &ClauseModel {
        &self.model
    }

    /// Direct access to the accumulated clauses.
    pub fn model_mut(&mut self) -> &mut ClauseModel {
        &mut self.model
    }

    pub fn set_collection(&mut self, collection: impl Into<String>) -> &mut Self {
        self.collection = collection.into();
        self
    }

    // ── Predicates ──────────────────────────────────────────────

    /// `column = value`. A `$`-prefixed column with a native document value
    /// is a store directive and goes into the filter verbatim.
    pub fn where_eq(&mut self, column: impl Into<String>, value: impl Into<QueryValue>) -> &mut Self {
        self.push_eq(column.into(), value.into(), Boolean::And)
    }

    pub fn or_where_eq(
        &mut self,
        column: impl Into<String>,
        value: impl Into<QueryValue>,
    ) -> &mut Self {
        self.push_eq(column.into(), value.into(), Boolean::Or)
    }

    pub fn where_op(
        &mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<QueryValue>,
    ) -> Result<&mut Self, QueryError> {
        let clause = WhereClause::new(column, operator, value.into(), Boolean::And)?;
        Ok(self.push_where(clause))
    }

    pub fn or_where_op(
        &mut self,
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<QueryValue>,
    ) -> Result<&mut Self, QueryError> {
        let clause = WhereClause::new(column, operator, value.into(), Boolean::Or)?;
        Ok(self.push_where(clause))
    }

    pub fn where_in<I, V>(&mut self, column: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.push_set(column.into(), Operator::In, values, Boolean::And)
    }

    pub fn or_where_in<I, V>(&mut self, column: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.push_set(column.into(), Operator::In, values, Boolean::Or)
    }

    pub fn where_not_in<I, V>(&mut self, column: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.push_set(column.into(), Operator::NotIn, values, Boolean::And)
    }

    pub fn or_where_not_in<I, V>(&mut self, column: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.push_set(column.into(), Operator::NotIn, values, Boolean::Or)
    }

    pub fn where_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.push_where(WhereClause {
            column: column.into(),
            operator: Operator::Eq,
            value: QueryValue::Null,
            boolean: Boolean::And,
        })
    }

    pub fn where_not_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.push_where(WhereClause {
            column: column.into(),
            operator: Operator::Ne,
            value: QueryValue::Null,
            boolean: Boolean::And,
        })
    }

    pub fn where_between(
        &mut self,
        column: impl Into<String>,
        low: impl Into<QueryValue>,
        high: impl Into<QueryValue>,
    ) -> &mut Self {
        self.push_where(WhereClause {
            column: column.into(),
            operator: Operator::Between,
            value: QueryValue::Array(vec![low.into(), high.into()]),
            boolean: Boolean::And,
        })
    }

    pub fn where_not_between(
        &mut self,
        column: impl Into<String>,
        low: impl Into<QueryValue>,
        high: impl Into<QueryValue>,
    ) -> &mut Self {
        self.push_where(WhereClause {
            column: column.into(),
            operator: Operator::NotBetween,
            value: QueryValue::Array(vec![low.into(), high.into()]),
            boolean: Boolean::And,
        })
    }

    /// Group the predicates added by `build` as one parenthesised predicate.
    ///
    /// `build` gets a fresh builder, and only the predicates it adds are kept.
    /// Orders, limits, projections, groups and options set on that builder
    /// are discarded; set them on the outer builder instead.
    pub fn where_nested<F>(&mut self, build: F) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut Builder) -> Result<(), QueryError>,
    {
        self.push_nested(Boolean::And, build)
    }

    /// Like [`where_nested`](Self::where_nested), joined with `or`.
    pub fn or_where_nested<F>(&mut self, build: F) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut Builder) -> Result<(), QueryError>,
    {
        self.push_nested(Boolean::Or, build)
    }

    fn push_eq(&mut self, column: String, value: QueryValue, boolean: Boolean) -> &mut Self {
        let operator = if column.starts_with('$') && value.is_native_document() {
            Operator::Raw
        } else {
            Operator::Eq
        };
        self.push_where(WhereClause {
            column,
            operator,
            value,
            boolean,
        })
    }

    fn push_set<I, V>(
        &mut self,
        column: String,
        operator: Operator,
        values: I,
        boolean: Boolean,
    ) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.push_where(WhereClause {
            column,
            operator,
            value: QueryValue::Array(values),
            boolean,
        })
    }

    fn push_nested<F>(&mut self, boolean: Boolean, build: F) -> Result<&mut Self, QueryError>
    where
        F: FnOnce(&mut Builder) -> Result<(), QueryError>,
    {
        let mut inner = Builder::new(self.collection.clone());
        build(&mut inner)?;
        // Everything but the predicates is dropped with `inner`.
        self.model.wheres.push(Where::Nested(NestedWhere {
            wheres: inner.model.wheres,
            boolean,
        }));
        Ok(self)
    }

    fn push_where(&mut self, clause: WhereClause) -> &mut Self {
        self.model.wheres.push(Where::Basic(clause));
        self
    }

    // ── Ordering ────────────────────────────────────────────────

    pub fn order_by(&mut self, column: impl Into<String>) -> &mut Self {
        self.model.push_order(OrderClause::asc(column));
        self
    }

    pub fn order_by_desc(&mut self, column: impl Into<String>) -> &mut Self {
        self.model.push_order(OrderClause::desc(column));
        self
    }

    /// Order by `column` in `direction`: `"asc"`/`"desc"`, `1`/`-1`, or a
    /// metadata document such as `{ "$meta": "textScore" }`.
    pub fn order_by_with(
        &mut self,
        column: impl Into<String>,
        direction: impl Into<DirectionArg>,
    ) -> Result<&mut Self, QueryError> {
        let order = OrderClause::new(column, direction)?;
        self.model.push_order(order);
        Ok(self)
    }

    pub fn latest(&mut self, column: impl Into<String>) -> &mut Self {
        self.order_by_desc(column)
    }

    pub fn oldest(&mut self, column: impl Into<String>) -> &mut Self {
        self.order_by(column)
    }

    /// Drop every ordering.
    pub fn reorder(&mut self) -> &mut Self {
        self.model.orders = None;
        self
    }

    /// Replace every ordering with a single one.
    pub fn reorder_by(
        &mut self,
        column: impl Into<String>,
        direction: impl Into<DirectionArg>,
    ) -> Result<&mut Self, QueryError> {
        let order = OrderClause::new(column, direction)?;
        self.model.orders = Some(vec![order]);
        Ok(self)
    }

    pub fn set_orders(&mut self, orders: Option<Vec<OrderClause>>) -> &mut Self {
        self.model.orders = orders;
        self
    }

    // ── Pagination / projection / grouping ─────────────────────

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.model.limit = Some(limit);
        self
    }

    pub fn take(&mut self, limit: u64) -> &mut Self {
        self.limit(limit)
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.model.offset = Some(offset);
        self
    }

    pub fn skip(&mut self, offset: u64) -> &mut Self {
        self.offset(offset)
    }

    /// One-based page of `per_page` documents.
    pub fn for_page(&mut self, page: u64, per_page: u64) -> &mut Self {
        let page = page.max(1);
        self.offset((page - 1).saturating_mul(per_page)).limit(per_page)
    }

    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn add_select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model
            .columns
            .get_or_insert_with(Vec::new)
            .extend(columns.into_iter().map(Into::into));
        self
    }

    /// Extra projection entries, merged after the selected columns.
    pub fn project(&mut self, projection: Document) -> &mut Self {
        let current = self.model.projections.get_or_insert_with(Document::new);
        for (key, value) in projection {
            current.insert(key, value);
        }
        self
    }

    pub fn group_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model.groups.extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn distinct(&mut self, column: impl Into<String>) -> &mut Self {
        self.model.distinct = Some(column.into());
        self
    }

    // ── Command options ────────────────────────────────────────

    pub fn hint(&mut self, index: impl Into<Bson>) -> &mut Self {
        self.model.options.hint = Some(index.into());
        self
    }

    pub fn timeout_ms(&mut self, ms: u64) -> &mut Self {
        self.model.options.max_time_ms = Some(ms);
        self
    }

    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.model.options.comment = Some(comment.into());
        self
    }

    pub fn allow_disk_use(&mut self, allow: bool) -> &mut Self {
        self.model.options.allow_disk_use = Some(allow);
        self
    }

    // ── Compilation ────────────────────────────────────────────

    /// The command this builder currently stands for. Never executes anything.
    pub fn to_mql(&self) -> CompiledCommand {
        compiler::compile(&self.collection, &self.model)
    }

    pub fn to_aggregate_mql(&self, function: AggregateFunction, column: &str) -> CompiledCommand {
        compiler::compile_aggregate(&self.collection, &self.model, function, column)
    }
}

impl RelationalOnly for Builder {}
