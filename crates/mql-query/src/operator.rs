use std::str::FromStr;

use crate::error::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Between,
    NotBetween,
    Like,
    NotLike,
    Regex,
    Exists,
    Size,
    All,
    ElemMatch,
    Type,
    Mod,
    /// The column is itself a store directive (`$text`, `$expr`, ...) and
    /// the value is merged into the filter verbatim.
    Raw,
}

impl Operator {
    /// The MongoDB query operator this maps to one-to-one, if any.
    pub fn mongo_name(self) -> Option<&'static str> {
        match self {
            Operator::Ne => Some("$ne"),
            Operator::Gt => Some("$gt"),
            Operator::Gte => Some("$gte"),
            Operator::Lt => Some("$lt"),
            Operator::Lte => Some("$lte"),
            Operator::In => Some("$in"),
            Operator::NotIn => Some("$nin"),
            Operator::Regex => Some("$regex"),
            Operator::Exists => Some("$exists"),
            Operator::Size => Some("$size"),
            Operator::All => Some("$all"),
            Operator::ElemMatch => Some("$elemMatch"),
            Operator::Type => Some("$type"),
            Operator::Mod => Some("$mod"),
            Operator::Eq
            | Operator::Between
            | Operator::NotBetween
            | Operator::Like
            | Operator::NotLike
            | Operator::Raw => None,
        }
    }

    /// Whether the value must be an ordered sequence.
    pub fn takes_sequence(self) -> bool {
        matches!(
            self,
            Operator::In
                | Operator::NotIn
                | Operator::All
                | Operator::Between
                | Operator::NotBetween
                | Operator::Mod
        )
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    /// Parse the relational spelling of an operator (`=`, `>=`, `not in`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim().to_ascii_lowercase().as_str() {
            "=" | "==" => Operator::Eq,
            "!=" | "<>" => Operator::Ne,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            "in" => Operator::In,
            "not in" => Operator::NotIn,
            "between" => Operator::Between,
            "not between" => Operator::NotBetween,
            "like" => Operator::Like,
            "not like" => Operator::NotLike,
            "regex" => Operator::Regex,
            "exists" => Operator::Exists,
            "size" => Operator::Size,
            "all" => Operator::All,
            "elemmatch" => Operator::ElemMatch,
            "type" => Operator::Type,
            "mod" => Operator::Mod,
            other => {
                return Err(QueryError::InvalidArgument(format!(
                    "unknown operator: {other}"
                )));
            }
        };
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comparison_spellings() {
        assert_eq!("=".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!(">".parse::<Operator>().unwrap(), Operator::Gt);
        assert_eq!(">=".parse::<Operator>().unwrap(), Operator::Gte);
        assert_eq!("<".parse::<Operator>().unwrap(), Operator::Lt);
        assert_eq!("<=".parse::<Operator>().unwrap(), Operator::Lte);
        assert_eq!("<>".parse::<Operator>().unwrap(), Operator::Ne);
        assert_eq!("!=".parse::<Operator>().unwrap(), Operator::Ne);
    }

    #[test]
    fn parses_word_operators_case_insensitively() {
        assert_eq!("NOT IN".parse::<Operator>().unwrap(), Operator::NotIn);
        assert_eq!("Like".parse::<Operator>().unwrap(), Operator::Like);
        assert_eq!("elemMatch".parse::<Operator>().unwrap(), Operator::ElemMatch);
    }

    #[test]
    fn unknown_operator_is_invalid_argument() {
        let err = "~=".parse::<Operator>().unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument(ref m) if m.contains("~=")));
    }

    #[test]
    fn raw_is_not_parseable() {
        assert!("raw".parse::<Operator>().is_err());
    }

    #[test]
    fn eq_has_no_wrapper() {
        assert_eq!(Operator::Eq.mongo_name(), None);
        assert_eq!(Operator::NotIn.mongo_name(), Some("$nin"));
    }
}
