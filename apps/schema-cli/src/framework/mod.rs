//! The reconciliation engine: the schema model, the differ/planner/executor
//! pipeline, and the declarative schema-file parsers.

pub mod core;
pub mod schema_files;
