pub mod diff;
pub mod durations;
pub mod execute;
pub mod plan;
pub mod reconcile;
pub mod schema;
