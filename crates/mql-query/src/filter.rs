use bson::Bson;

use crate::error::QueryError;
use crate::operator::Operator;
use crate::value::QueryValue;

/// How a predicate joins the ones before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Boolean {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub column: String,
    pub operator: Operator,
    pub value: QueryValue,
    pub boolean: Boolean,
}

impl WhereClause {
    /// Build a clause, checking that `operator` and `value` fit together.
    pub fn new(
        column: impl Into<String>,
        operator: Operator,
        value: QueryValue,
        boolean: Boolean,
    ) -> Result<Self, QueryError> {
        let column = column.into();
        check_operand(&column, operator, &value)?;
        Ok(Self {
            column,
            operator,
            value,
            boolean,
        })
    }
}

fn check_operand(column: &str, operator: Operator, value: &QueryValue) -> Result<(), QueryError> {
    let invalid = |expected: &str| {
        Err(QueryError::InvalidArgument(format!(
            "operator {operator:?} on \"{column}\" requires {expected}"
        )))
    };

    match operator {
        Operator::Between | Operator::NotBetween | Operator::Mod => match value.as_array() {
            Some(items) if items.len() == 2 => Ok(()),
            _ => invalid("a sequence of exactly two values"),
        },
        op if op.takes_sequence() => match value {
            QueryValue::Array(_) => Ok(()),
            _ => invalid("a sequence of values"),
        },
        Operator::Like | Operator::NotLike => match value {
            QueryValue::String(_) => Ok(()),
            _ => invalid("a string pattern"),
        },
        Operator::Regex => match value {
            QueryValue::String(_) | QueryValue::Native(Bson::RegularExpression(_)) => Ok(()),
            _ => invalid("a string pattern or a native regex"),
        },
        Operator::Exists => match value {
            QueryValue::Bool(_) => Ok(()),
            _ => invalid("a boolean"),
        },
        Operator::Size => match value {
            QueryValue::Int(n) if *n >= 0 => Ok(()),
            _ => invalid("a non-negative integer"),
        },
        Operator::ElemMatch | Operator::Raw => {
            if value.is_native_document() {
                Ok(())
            } else {
                invalid("a native document")
            }
        }
        _ => Ok(()),
    }
}

/// A parenthesised group of predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedWhere {
    pub wheres: Vec<Where>,
    pub boolean: Boolean,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Where {
    Basic(WhereClause),
    Nested(NestedWhere),
}

impl Where {
    pub fn boolean(&self) -> Boolean {
        match self {
            Where::Basic(clause) => clause.boolean,
            Where::Nested(group) => group.boolean,
        }
    }

    /// Nested groups with nothing inside contribute nothing to a filter.
    pub fn is_empty_group(&self) -> bool {
        match self {
            Where::Basic(_) => false,
            Where::Nested(group) => group.wheres.iter().all(Where::is_empty_group),
        }
    }
}

impl From<WhereClause> for Where {
    fn from(clause: WhereClause) -> Self {
        Where::Basic(clause)
    }
}
