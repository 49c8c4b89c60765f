// ABOUTME: Built-in executor implementations for common task classes
// ABOUTME: Pluggable Executor impls; the scheduler knows them only by capability

pub mod api;
pub mod data;

pub use api::ApiWorker;
pub use data::DataWorker;
