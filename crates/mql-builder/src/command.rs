use std::fmt;

use bson::{Bson, Document, doc};

/// The native call a builder compiles to, with its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledCommand {
    /// `find(filter, options)`
    Find {
        collection: String,
        filter: Document,
        options: Document,
    },
    /// `aggregate(pipeline, options)`
    Aggregate {
        collection: String,
        pipeline: Vec<Document>,
        options: Document,
    },
    /// `distinct(field, filter, options)`
    Distinct {
        collection: String,
        field: String,
        filter: Document,
        options: Document,
    },
}

impl CompiledCommand {
    pub fn name(&self) -> &'static str {
        match self {
            CompiledCommand::Find { .. } => "find",
            CompiledCommand::Aggregate { .. } => "aggregate",
            CompiledCommand::Distinct { .. } => "distinct",
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            CompiledCommand::Find { collection, .. }
            | CompiledCommand::Aggregate { collection, .. }
            | CompiledCommand::Distinct { collection, .. } => collection,
        }
    }

    pub fn options(&self) -> &Document {
        match self {
            CompiledCommand::Find { options, .. }
            | CompiledCommand::Aggregate { options, .. }
            | CompiledCommand::Distinct { options, .. } => options,
        }
    }

    /// The positional arguments, in call order.
    pub fn arguments(&self) -> Vec<Bson> {
        match self {
            CompiledCommand::Find {
                filter, options, ..
            } => vec![filter.clone().into(), options.clone().into()],
            CompiledCommand::Aggregate {
                pipeline, options, ..
            } => vec![pipeline.clone().into(), options.clone().into()],
            CompiledCommand::Distinct {
                field,
                filter,
                options,
                ..
            } => vec![
                field.clone().into(),
                filter.clone().into(),
                options.clone().into(),
            ],
        }
    }

    /// `{ <name>: [args...] }`, suitable for logging or snapshotting.
    pub fn to_mql(&self) -> Document {
        let mut mql = Document::new();
        mql.insert(self.name(), self.arguments());
        mql
    }

    /// The command wrapped with the collection it targets.
    pub fn to_envelope(&self) -> Document {
        doc! {
            "collection": self.collection(),
            "command": self.to_mql(),
        }
    }
}

impl fmt::Display for CompiledCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_mql())
    }
}
