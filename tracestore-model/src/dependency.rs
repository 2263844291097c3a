/// A directed edge in the service dependency graph, as returned by
/// `GetDependencies`.
///
/// Invariant: `call_count` is always greater than zero — edges with no
/// observed calls are never materialized.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DependencyLink {
    /// The calling service.
    pub parent: String,
    /// The called service.
    pub child: String,
    /// How many calls were observed along this edge. Always `> 0`.
    pub call_count: u64,
    /// Where the link was derived from, e.g. `"jaeger"` or `"otel-traces"`.
    pub source: String,
}

impl DependencyLink {
    /// Construct a new link. Panics if `call_count` is zero, since a
    /// zero-count edge has no observations to report.
    pub fn new(
        parent: impl Into<String>,
        child: impl Into<String>,
        call_count: u64,
        source: impl Into<String>,
    ) -> Self {
        assert!(call_count > 0, "DependencyLink::call_count must be > 0");
        DependencyLink {
            parent: parent.into(),
            child: child.into(),
            call_count,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "call_count must be > 0")]
    fn rejects_zero_call_count() {
        DependencyLink::new("a", "b", 0, "jaeger");
    }
}
