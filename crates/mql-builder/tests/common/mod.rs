#![allow(dead_code)]

use bson::Document;
use mql_builder::{Builder, CompiledCommand};

pub const COLLECTION: &str = "users";

pub fn builder() -> Builder {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
    Builder::new(COLLECTION)
}

/// Unwrap a `find` command into `(filter, options)`.
pub fn find_parts(command: CompiledCommand) -> (Document, Document) {
    match command {
        CompiledCommand::Find {
            filter, options, ..
        } => (filter, options),
        other => panic!("expected find, got {other}"),
    }
}

/// Unwrap an `aggregate` command into `(pipeline, options)`.
pub fn aggregate_parts(command: CompiledCommand) -> (Vec<Document>, Document) {
    match command {
        CompiledCommand::Aggregate {
            pipeline, options, ..
        } => (pipeline, options),
        other => panic!("expected aggregate, got {other}"),
    }
}

pub fn keys(doc: &Document) -> Vec<&str> {
    doc.keys().map(String::as_str).collect()
}
