mod error;
mod filter;
mod operator;
mod query;
mod sort;
mod value;

pub use error::{INVALID_DIRECTION, NOT_SUPPORTED, QueryError, UnsupportedMethod};
pub use filter::{Boolean, NestedWhere, Where, WhereClause};
pub use operator::Operator;
pub use query::{ClauseModel, QueryOptions};
pub use sort::{DirectionArg, OrderClause, SortDirection};
pub use value::{QueryValue, coerce, int_bson};
