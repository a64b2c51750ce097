mod common;
use common::*;

use bson::doc;
use mql_builder::{Builder, BuilderConfig, ConfigError};

#[test]
fn config_from_json() {
    let config = BuilderConfig::from_json(
        r#"{ "collection": "orders", "max_time_ms": 2000, "comment": "nightly" }"#,
    )
    .unwrap();
    assert_eq!(config.collection, "orders");
    assert_eq!(config.max_time_ms, Some(2000));
    assert_eq!(config.comment.as_deref(), Some("nightly"));
}

#[test]
fn optional_fields_default_to_none() {
    let config = BuilderConfig::from_json(r#"{ "collection": "orders" }"#).unwrap();
    assert_eq!(config, BuilderConfig::new("orders"));
}

#[test]
fn missing_collection_is_an_error() {
    let err = BuilderConfig::from_json(r#"{ "max_time_ms": 5 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
    assert!(err.to_string().starts_with("invalid builder config"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn configured_defaults_reach_find_options() {
    let config = BuilderConfig {
        collection: "orders".into(),
        max_time_ms: Some(2000),
        comment: None,
    };
    let mut b = Builder::with_config(&config);
    b.where_eq("paid", true);
    let (filter, options) = find_parts(b.to_mql());
    assert_eq!(filter, doc! { "paid": true });
    assert_eq!(options, doc! { "maxTimeMS": 2000 });
}

#[test]
fn per_query_timeout_overrides_config() {
    let config = BuilderConfig {
        collection: "orders".into(),
        max_time_ms: Some(2000),
        comment: None,
    };
    let mut b = Builder::with_config(&config);
    b.timeout_ms(50);
    let (_, options) = find_parts(b.to_mql());
    assert_eq!(options, doc! { "maxTimeMS": 50 });
}

#[test]
fn default_config_leaves_options_empty() {
    let (_, options) = find_parts(builder().to_mql());
    assert_eq!(options, doc! {});
}
