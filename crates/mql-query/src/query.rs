use bson::{Bson, Document};

use crate::filter::Where;
use crate::sort::OrderClause;

/// Everything a builder has accumulated, prior to compilation.
///
/// `orders` distinguishes "never set" (`None`) from "cleared" (`Some(vec![])`)
/// only so callers can mirror either state; both compile to no sort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseModel {
    pub wheres: Vec<Where>,
    pub orders: Option<Vec<OrderClause>>,
    /// `None` selects every column.
    pub columns: Option<Vec<String>>,
    /// Extra projection entries (`$slice`, `$elemMatch`, `$meta`, ...).
    pub projections: Option<Document>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub groups: Vec<String>,
    pub distinct: Option<String>,
    pub options: QueryOptions,
}

/// Command options that are not part of the relational model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Index name or key pattern.
    pub hint: Option<Bson>,
    pub max_time_ms: Option<u64>,
    pub comment: Option<String>,
    /// Aggregate only.
    pub allow_disk_use: Option<bool>,
}

impl ClauseModel {
    pub fn has_orders(&self) -> bool {
        self.orders.as_ref().is_some_and(|orders| !orders.is_empty())
    }

    pub fn push_order(&mut self, order: OrderClause) {
        self.orders.get_or_insert_with(Vec::new).push(order);
    }
}
