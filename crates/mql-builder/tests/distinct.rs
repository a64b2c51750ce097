mod common;
use common::*;

use bson::doc;
use mql_builder::CompiledCommand;

#[test]
fn distinct_without_filter() {
    let mut b = builder();
    b.distinct("foo");
    assert_eq!(b.to_mql().to_mql(), doc! { "distinct": ["foo", {}, {}] });
}

#[test]
fn distinct_with_filter() {
    let mut b = builder();
    b.where_eq("status", "active").distinct("country");
    match b.to_mql() {
        CompiledCommand::Distinct {
            field,
            filter,
            options,
            ..
        } => {
            assert_eq!(field, "country");
            assert_eq!(filter, doc! { "status": "active" });
            assert_eq!(options, doc! {});
        }
        other => panic!("expected distinct, got {other}"),
    }
}

#[test]
fn distinct_wins_over_group_by() {
    let mut b = builder();
    b.group_by(["foo"]).distinct("bar");
    assert_eq!(b.to_mql().name(), "distinct");
}

#[test]
fn distinct_carries_comment() {
    let mut b = builder();
    b.distinct("foo").comment("audit");
    assert_eq!(b.to_mql().options(), &doc! { "comment": "audit" });
}
