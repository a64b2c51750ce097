//! Translation of a [`ClauseModel`] into a native command.
//!
//! Selection happens once per call, in this order:
//! - a distinct target → `distinct(field, filter, options)`
//! - group keys → `aggregate([$match?, $group], options)`
//! - otherwise → `find(filter, options)`

use std::collections::HashSet;

use bson::{Bson, Document, doc};
use mql_query::{
    Boolean, ClauseModel, OrderClause, Operator, QueryValue, Where, WhereClause, int_bson,
};

use crate::command::CompiledCommand;

/// Aggregate functions available through [`compile_aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    fn accumulator(self) -> &'static str {
        match self {
            AggregateFunction::Count | AggregateFunction::Sum => "$sum",
            AggregateFunction::Avg => "$avg",
            AggregateFunction::Min => "$min",
            AggregateFunction::Max => "$max",
        }
    }
}

pub fn compile(collection: &str, model: &ClauseModel) -> CompiledCommand {
    let filter = compile_filter(&model.wheres);

    let command = if let Some(field) = &model.distinct {
        CompiledCommand::Distinct {
            collection: collection.to_string(),
            field: field.clone(),
            filter,
            options: distinct_options(model),
        }
    } else if !model.groups.is_empty() {
        let mut pipeline = match_stage(filter);
        pipeline.push(doc! { "$group": group_stage(&model.groups) });
        CompiledCommand::Aggregate {
            collection: collection.to_string(),
            pipeline,
            options: aggregate_options(model),
        }
    } else {
        CompiledCommand::Find {
            collection: collection.to_string(),
            filter,
            options: find_options(model),
        }
    };

    tracing::debug!(
        collection,
        command = command.name(),
        wheres = model.wheres.len(),
        orders = model.orders.as_ref().map_or(0, Vec::len),
        "compiled query"
    );
    tracing::trace!(mql = %command, "compiled mql");
    command
}

/// Compile an aggregate function over the current filter and grouping.
///
/// Group keys become the `_id`; without any the whole match set is one group.
pub fn compile_aggregate(
    collection: &str,
    model: &ClauseModel,
    function: AggregateFunction,
    column: &str,
) -> CompiledCommand {
    let mut group = if model.groups.is_empty() {
        doc! { "_id": Bson::Null }
    } else {
        group_stage(&model.groups)
    };
    let operand = match function {
        AggregateFunction::Count => Bson::Int32(1),
        _ => Bson::String(field_ref(column)),
    };
    let mut accumulator = Document::new();
    accumulator.insert(function.accumulator(), operand);
    group.insert("aggregate", accumulator);

    let mut pipeline = match_stage(compile_filter(&model.wheres));
    pipeline.push(doc! { "$group": group });

    let command = CompiledCommand::Aggregate {
        collection: collection.to_string(),
        pipeline,
        options: aggregate_options(model),
    };
    tracing::debug!(collection, ?function, column, "compiled aggregate function");
    command
}

// ── Filter ───────────────────────────────────────────────────

/// Compile a where list into a filter document.
///
/// Consecutive `and` predicates merge into one document; an `or` predicate
/// starts a new branch and the branches are joined under `$or`. When two
/// predicates in one branch cannot share a document (same column, clashing
/// operators), that branch falls back to an explicit `$and`.
pub fn compile_filter(wheres: &[Where]) -> Document {
    let mut branches: Vec<Vec<Part>> = Vec::new();

    for node in wheres.iter().filter(|w| !w.is_empty_group()) {
        let part = Part {
            doc: compile_where(node),
            combinable: combinable(node),
        };
        match branches.last_mut() {
            Some(branch) if node.boolean() == Boolean::And => branch.push(part),
            _ => branches.push(vec![part]),
        }
    }

    let mut branches: Vec<Document> = branches.into_iter().map(merge_branch).collect();
    match branches.len() {
        0 => Document::new(),
        1 => branches.remove(0),
        _ => doc! { "$or": branches },
    }
}

fn compile_where(node: &Where) -> Document {
    match node {
        Where::Basic(clause) => compile_clause(clause),
        Where::Nested(group) => compile_filter(&group.wheres),
    }
}

fn compile_clause(clause: &WhereClause) -> Document {
    let column = clause.column.as_str();
    let value = &clause.value;

    let condition = match clause.operator {
        Operator::Eq | Operator::Raw => value.coerce(),
        Operator::In | Operator::NotIn | Operator::All => {
            operator_doc(clause.operator, sequence(value))
        }
        Operator::Between => {
            let (low, high) = bounds(value);
            Bson::Document(doc! { "$gte": low, "$lte": high })
        }
        Operator::NotBetween => {
            let (low, high) = bounds(value);
            return doc! {
                "$or": [
                    field(column, doc! { "$lte": low }),
                    field(column, doc! { "$gte": high }),
                ]
            };
        }
        Operator::Like => Bson::Document(like_regex(value)),
        Operator::NotLike => Bson::Document(doc! { "$not": like_regex(value) }),
        op => operator_doc(op, value.coerce()),
    };

    field(column, condition)
}

fn operator_doc(op: Operator, operand: Bson) -> Bson {
    let mut wrapped = Document::new();
    if let Some(name) = op.mongo_name() {
        wrapped.insert(name, operand);
    }
    Bson::Document(wrapped)
}

fn field(column: &str, value: impl Into<Bson>) -> Document {
    let mut doc = Document::new();
    doc.insert(column, value);
    doc
}

fn field_ref(column: &str) -> String {
    format!("${column}")
}

/// Coerce a sequence operand; a lone value becomes a one-element array.
fn sequence(value: &QueryValue) -> Bson {
    match value.coerce() {
        Bson::Array(items) => Bson::Array(items),
        single => Bson::Array(vec![single]),
    }
}

fn bounds(value: &QueryValue) -> (Bson, Bson) {
    match value.as_array() {
        Some([low, high, ..]) => (low.coerce(), high.coerce()),
        Some([only]) => (only.coerce(), only.coerce()),
        _ => (value.coerce(), value.coerce()),
    }
}

fn like_regex(value: &QueryValue) -> Document {
    let pattern = value.as_str().map(like_pattern).unwrap_or_default();
    doc! { "$regex": pattern, "$options": "i" }
}

/// Translate a SQL `LIKE` pattern into a regex, anchored unless it starts or
/// ends with `%`.
///
/// `%` matches any run, `_` any single character, `\` escapes the next one.
fn like_pattern(like: &str) -> String {
    enum Token {
        Literal(char),
        Any,
        One,
    }

    let mut tokens = Vec::new();
    let mut chars = like.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            '%' => Token::Any,
            '_' => Token::One,
            other => Token::Literal(other),
        });
    }

    let leading = matches!(tokens.first(), Some(Token::Any));
    let trailing = matches!(tokens.last(), Some(Token::Any));
    let from = usize::from(leading);
    let to = if trailing && tokens.len() > from {
        tokens.len() - 1
    } else {
        tokens.len()
    };

    let mut pattern = String::new();
    if !leading {
        pattern.push('^');
    }
    let mut buf = [0u8; 4];
    for token in &tokens[from..to] {
        match token {
            Token::Literal(c) => pattern.push_str(&regex::escape(c.encode_utf8(&mut buf))),
            Token::Any => pattern.push_str(".*"),
            Token::One => pattern.push('.'),
        }
    }
    if !trailing {
        pattern.push('$');
    }
    pattern
}

/// A compiled predicate and whether its operator document may share a
/// column with another one.
struct Part {
    doc: Document,
    combinable: bool,
}

/// Only operator documents the compiler builds itself can be merged.
/// Equality and raw values are caller documents and stay opaque, and
/// `NOT BETWEEN` or a nested group yields a top-level `$or`.
fn combinable(node: &Where) -> bool {
    match node {
        Where::Basic(clause) => !matches!(
            clause.operator,
            Operator::Eq | Operator::Raw | Operator::NotBetween
        ),
        Where::Nested(_) => false,
    }
}

fn merge_branch(parts: Vec<Part>) -> Document {
    let mut merged = Document::new();
    let mut opaque = HashSet::new();
    for part in &parts {
        match merge(&merged, part, &opaque) {
            Some(next) => merged = next,
            None => {
                let docs: Vec<Document> = parts.iter().map(|p| p.doc.clone()).collect();
                return doc! { "$and": docs };
            }
        }
        if !part.combinable {
            opaque.extend(part.doc.keys().cloned());
        }
    }
    merged
}

/// Merge `incoming` into a copy of `base`, or `None` on a clash.
///
/// Two operator documents on the same column combine when both came from
/// combinable predicates and their operators are disjoint
/// (`{ $gt: 1 }` + `{ $lt: 5 }`).
fn merge(base: &Document, incoming: &Part, opaque: &HashSet<String>) -> Option<Document> {
    let mut merged = base.clone();
    for (key, value) in &incoming.doc {
        if let Some(current) = merged.get_mut(key) {
            if !incoming.combinable || opaque.contains(key) {
                return None;
            }
            match (current, value) {
                (Bson::Document(existing), Bson::Document(extra))
                    if is_operator_doc(existing)
                        && is_operator_doc(extra)
                        && extra.keys().all(|k| !existing.contains_key(k)) =>
                {
                    for (op, operand) in extra {
                        existing.insert(op.clone(), operand.clone());
                    }
                }
                _ => return None,
            }
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }
    Some(merged)
}

fn is_operator_doc(doc: &Document) -> bool {
    !doc.is_empty() && doc.keys().all(|k| k.starts_with('$'))
}

// ── Sort / projection / options ─────────────────────────────

/// `None` when nothing is ordered; the sort option is then left out entirely.
pub fn compile_sort(orders: Option<&[OrderClause]>) -> Option<Document> {
    let orders = orders.filter(|orders| !orders.is_empty())?;
    let mut sort = Document::new();
    for order in orders {
        sort.insert(order.column.clone(), order.direction.to_bson());
    }
    Some(sort)
}

pub fn compile_projection(model: &ClauseModel) -> Option<Document> {
    let mut projection = Document::new();
    for column in model.columns.iter().flatten() {
        if column != "*" {
            projection.insert(column.clone(), Bson::Int32(1));
        }
    }
    if let Some(extra) = &model.projections {
        for (key, value) in extra {
            projection.insert(key.clone(), value.clone());
        }
    }
    (!projection.is_empty()).then_some(projection)
}

fn find_options(model: &ClauseModel) -> Document {
    let mut options = Document::new();
    if let Some(limit) = model.limit {
        options.insert("limit", count_bson(limit));
    }
    if let Some(skip) = model.offset {
        options.insert("skip", count_bson(skip));
    }
    if let Some(projection) = compile_projection(model) {
        options.insert("projection", projection);
    }
    if let Some(sort) = compile_sort(model.orders.as_deref()) {
        options.insert("sort", sort);
    }
    if let Some(hint) = &model.options.hint {
        options.insert("hint", hint.clone());
    }
    common_options(model, &mut options);
    options
}

fn aggregate_options(model: &ClauseModel) -> Document {
    let mut options = Document::new();
    if let Some(allow) = model.options.allow_disk_use {
        options.insert("allowDiskUse", allow);
    }
    if let Some(hint) = &model.options.hint {
        options.insert("hint", hint.clone());
    }
    common_options(model, &mut options);
    options
}

fn distinct_options(model: &ClauseModel) -> Document {
    let mut options = Document::new();
    common_options(model, &mut options);
    options
}

fn common_options(model: &ClauseModel, options: &mut Document) {
    if let Some(ms) = model.options.max_time_ms {
        options.insert("maxTimeMS", count_bson(ms));
    }
    if let Some(comment) = &model.options.comment {
        options.insert("comment", comment.clone());
    }
}

fn count_bson(n: u64) -> Bson {
    i64::try_from(n).map_or(Bson::Int64(i64::MAX), int_bson)
}

// ── Pipeline ────────────────────────────────────────────────

fn match_stage(filter: Document) -> Vec<Document> {
    if filter.is_empty() {
        Vec::new()
    } else {
        vec![doc! { "$match": filter }]
    }
}

/// `{ _id: { k: "$k", .. }, k: { $last: "$k" }, .. }`
fn group_stage(groups: &[String]) -> Document {
    let mut id = Document::new();
    for column in groups {
        id.insert(column.clone(), field_ref(column));
    }
    let mut group = doc! { "_id": id };
    for column in groups {
        group.insert(column.clone(), doc! { "$last": field_ref(column) });
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use mql_query::{NestedWhere, SortDirection};

    fn clause(column: &str, operator: Operator, value: impl Into<QueryValue>) -> Where {
        WhereClause::new(column, operator, value.into(), Boolean::And)
            .unwrap()
            .into()
    }

    fn or_clause(column: &str, operator: Operator, value: impl Into<QueryValue>) -> Where {
        WhereClause::new(column, operator, value.into(), Boolean::Or)
            .unwrap()
            .into()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert_eq!(compile_filter(&[]), doc! {});
    }

    #[test]
    fn equality_has_no_operator_wrapper() {
        let filter = compile_filter(&[clause("foo", Operator::Eq, "bar")]);
        assert_eq!(filter, doc! { "foo": "bar" });
    }

    #[test]
    fn comparison_operators_map_to_mongo_names() {
        let cases = [
            (Operator::Gt, "$gt"),
            (Operator::Gte, "$gte"),
            (Operator::Lt, "$lt"),
            (Operator::Lte, "$lte"),
            (Operator::Ne, "$ne"),
        ];
        for (op, name) in cases {
            let filter = compile_filter(&[clause("age", op, 21)]);
            let mut expected = Document::new();
            expected.insert(name, 21);
            assert_eq!(filter, doc! { "age": expected }, "{op:?}");
        }
    }

    #[test]
    fn in_and_not_in() {
        let filter = compile_filter(&[clause("foo", Operator::In, ["bar", "baz"])]);
        assert_eq!(filter, doc! { "foo": { "$in": ["bar", "baz"] } });

        let filter = compile_filter(&[clause("foo", Operator::NotIn, vec![1, 2])]);
        assert_eq!(filter, doc! { "foo": { "$nin": [1, 2] } });
    }

    #[test]
    fn raw_directive_is_verbatim() {
        let filter = compile_filter(&[clause(
            "$text",
            Operator::Raw,
            doc! { "$search": "operating" },
        )]);
        assert_eq!(filter, doc! { "$text": { "$search": "operating" } });
    }

    #[test]
    fn and_clauses_merge() {
        let filter = compile_filter(&[
            clause("a", Operator::Eq, 1),
            clause("b", Operator::Gt, 2),
        ]);
        assert_eq!(filter, doc! { "a": 1, "b": { "$gt": 2 } });
    }

    #[test]
    fn range_on_one_column_merges_operators() {
        let filter = compile_filter(&[
            clause("age", Operator::Gt, 18),
            clause("age", Operator::Lt, 65),
        ]);
        assert_eq!(filter, doc! { "age": { "$gt": 18, "$lt": 65 } });
    }

    #[test]
    fn clashing_columns_fall_back_to_and() {
        let filter = compile_filter(&[
            clause("tag", Operator::Eq, "a"),
            clause("tag", Operator::Eq, "b"),
        ]);
        assert_eq!(filter, doc! { "$and": [{ "tag": "a" }, { "tag": "b" }] });
    }

    #[test]
    fn raw_expr_directives_are_not_spliced() {
        let filter = compile_filter(&[
            clause("$expr", Operator::Raw, doc! { "$gt": ["$spent", "$budget"] }),
            clause("$expr", Operator::Raw, doc! { "$lt": ["$spent", 100] }),
        ]);
        assert_eq!(
            filter,
            doc! {
                "$and": [
                    { "$expr": { "$gt": ["$spent", "$budget"] } },
                    { "$expr": { "$lt": ["$spent", 100] } },
                ]
            }
        );
    }

    #[test]
    fn raw_text_directives_are_not_spliced() {
        let filter = compile_filter(&[
            clause("$text", Operator::Raw, doc! { "$search": "coffee" }),
            clause("$text", Operator::Raw, doc! { "$language": "es" }),
        ]);
        assert_eq!(
            filter,
            doc! {
                "$and": [
                    { "$text": { "$search": "coffee" } },
                    { "$text": { "$language": "es" } },
                ]
            }
        );
    }

    #[test]
    fn native_equality_document_stays_opaque() {
        let native = QueryValue::Native(Bson::Document(doc! { "$gt": 5 }));
        let eq_first = compile_filter(&[
            clause("n", Operator::Eq, native.clone()),
            clause("n", Operator::Lt, 10),
        ]);
        assert_eq!(
            eq_first,
            doc! { "$and": [{ "n": { "$gt": 5 } }, { "n": { "$lt": 10 } }] }
        );

        let eq_last = compile_filter(&[
            clause("n", Operator::Lt, 10),
            clause("n", Operator::Eq, native),
        ]);
        assert_eq!(
            eq_last,
            doc! { "$and": [{ "n": { "$lt": 10 } }, { "n": { "$gt": 5 } }] }
        );
    }

    #[test]
    fn or_nests_branches() {
        let filter = compile_filter(&[
            clause("a", Operator::Eq, 1),
            or_clause("b", Operator::Eq, 2),
        ]);
        assert_eq!(filter, doc! { "$or": [{ "a": 1 }, { "b": 2 }] });
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let filter = compile_filter(&[
            clause("a", Operator::Eq, 1),
            clause("b", Operator::Eq, 2),
            or_clause("c", Operator::Eq, 3),
        ]);
        assert_eq!(filter, doc! { "$or": [{ "a": 1, "b": 2 }, { "c": 3 }] });
    }

    #[test]
    fn nested_group_compiles_as_one_predicate() {
        let nested = Where::Nested(NestedWhere {
            wheres: vec![clause("b", Operator::Eq, 2), or_clause("c", Operator::Eq, 3)],
            boolean: Boolean::And,
        });
        let filter = compile_filter(&[clause("a", Operator::Eq, 1), nested]);
        assert_eq!(
            filter,
            doc! { "a": 1, "$or": [{ "b": 2 }, { "c": 3 }] }
        );
    }

    #[test]
    fn empty_nested_group_is_dropped() {
        let nested = Where::Nested(NestedWhere {
            wheres: vec![],
            boolean: Boolean::Or,
        });
        let filter = compile_filter(&[clause("a", Operator::Eq, 1), nested]);
        assert_eq!(filter, doc! { "a": 1 });
    }

    #[test]
    fn between_and_not_between() {
        let filter = compile_filter(&[clause("n", Operator::Between, [1, 9])]);
        assert_eq!(filter, doc! { "n": { "$gte": 1, "$lte": 9 } });

        let filter = compile_filter(&[clause("n", Operator::NotBetween, [1, 9])]);
        assert_eq!(
            filter,
            doc! { "$or": [{ "n": { "$lte": 1 } }, { "n": { "$gte": 9 } }] }
        );
    }

    #[test]
    fn like_patterns_translate_to_regex() {
        assert_eq!(like_pattern("foo"), "^foo$");
        assert_eq!(like_pattern("foo%"), "^foo");
        assert_eq!(like_pattern("%foo"), "foo$");
        assert_eq!(like_pattern("%foo%"), "foo");
        assert_eq!(like_pattern("f_o"), "^f.o$");
        assert_eq!(like_pattern("a%b"), "^a.*b$");
        assert_eq!(like_pattern("1.5%"), r"^1\.5");
        assert_eq!(like_pattern(r"50\%"), "^50%$");
        assert_eq!(like_pattern("%"), "");
    }

    #[test]
    fn like_and_not_like_filters() {
        let filter = compile_filter(&[clause("name", Operator::Like, "jo%")]);
        assert_eq!(filter, doc! { "name": { "$regex": "^jo", "$options": "i" } });

        let filter = compile_filter(&[clause("name", Operator::NotLike, "jo%")]);
        assert_eq!(
            filter,
            doc! { "name": { "$not": { "$regex": "^jo", "$options": "i" } } }
        );
    }

    #[test]
    fn document_operators() {
        assert_eq!(
            compile_filter(&[clause("tags", Operator::Size, 3)]),
            doc! { "tags": { "$size": 3 } }
        );
        assert_eq!(
            compile_filter(&[clause("email", Operator::Exists, false)]),
            doc! { "email": { "$exists": false } }
        );
        assert_eq!(
            compile_filter(&[clause("n", Operator::Mod, [4, 0])]),
            doc! { "n": { "$mod": [4, 0] } }
        );
        assert_eq!(
            compile_filter(&[clause("tags", Operator::All, ["a", "b"])]),
            doc! { "tags": { "$all": ["a", "b"] } }
        );
    }

    #[test]
    fn sort_keeps_insertion_order() {
        let orders = vec![
            OrderClause::asc("email"),
            OrderClause::desc("age"),
            OrderClause {
                column: "score".into(),
                direction: SortDirection::Meta(doc! { "$meta": "textScore" }),
            },
        ];
        let sort = compile_sort(Some(orders.as_slice())).unwrap();
        let keys: Vec<&str> = sort.keys().map(String::as_str).collect();
        assert_eq!(keys, ["email", "age", "score"]);
        assert_eq!(
            sort,
            doc! { "email": 1, "age": -1, "score": { "$meta": "textScore" } }
        );
    }

    #[test]
    fn no_orders_means_no_sort() {
        assert_eq!(compile_sort(None), None);
        assert_eq!(compile_sort(Some(&[][..])), None);
    }

    #[test]
    fn star_column_is_not_projected() {
        let model = ClauseModel {
            columns: Some(vec!["*".into()]),
            ..Default::default()
        };
        assert_eq!(compile_projection(&model), None);
    }

    #[test]
    fn group_stage_shape() {
        assert_eq!(
            group_stage(&["foo".to_string(), "bar".to_string()]),
            doc! {
                "_id": { "foo": "$foo", "bar": "$bar" },
                "foo": { "$last": "$foo" },
                "bar": { "$last": "$bar" },
            }
        );
    }

    #[test]
    fn compile_never_mutates_the_model() {
        let model = ClauseModel {
            wheres: vec![clause("a", Operator::Eq, 1)],
            limit: Some(3),
            ..Default::default()
        };
        let before = model.clone();
        let first = compile("c", &model);
        let second = compile("c", &model);
        assert_eq!(model, before);
        assert_eq!(first, second);
    }
}
