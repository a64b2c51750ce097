//! Compiles a relational-style query builder into MongoDB commands.
//!
//! ```
//! use mql_builder::{Builder, CompiledCommand};
//! use bson::doc;
//!
//! let mut users = Builder::new("users");
//! users.where_eq("status", "active").order_by_desc("created_at").limit(10);
//!
//! match users.to_mql() {
//!     CompiledCommand::Find { filter, options, .. } => {
//!         assert_eq!(filter, doc! { "status": "active" });
//!         assert_eq!(options, doc! { "sort": { "created_at": -1 }, "limit": 10 });
//!     }
//!     other => panic!("unexpected {other}"),
//! }
//! ```

mod builder;
mod command;
pub mod compiler;
mod config;
mod error;
mod unsupported;

pub use builder::Builder;
pub use command::CompiledCommand;
pub use compiler::{AggregateFunction, compile, compile_filter, compile_sort};
pub use config::BuilderConfig;
pub use error::ConfigError;
pub use mql_query::{
    Boolean, ClauseModel, DirectionArg, INVALID_DIRECTION, NOT_SUPPORTED, Operator, OrderClause,
    QueryError, QueryOptions, QueryValue, SortDirection, UnsupportedMethod, Where, WhereClause,
};
pub use unsupported::RelationalOnly;
