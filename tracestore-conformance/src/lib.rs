//! A backend-agnostic conformance suite: the same handful of scenarios
//! run against any combination of `SpanReader`/`SpanWriter`/
//! `DependencyReader`/`DependencyWriter`, driven by fixtures embedded at
//! compile time. Every in-tree backend's own test module calls into this
//! crate rather than re-deriving the scenarios.

mod fixtures;
mod options;
mod scenarios;
mod wait;

pub use fixtures::{load_example_trace, rewrite_fixture_dates};
pub use options::ConformanceOptions;
pub use scenarios::{
    dependencies_round_trip, get_operations_with_kinds, get_services, large_trace, trace_not_found,
};
pub use wait::wait_for;
