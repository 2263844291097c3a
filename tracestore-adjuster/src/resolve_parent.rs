use tracestore_model::{RefType, Trace};

use crate::Adjuster;

/// When a span carries more than one `ChildOf` reference — ambiguous
/// because a span has exactly one logical parent — keeps the first
/// `ChildOf` and demotes the rest to `FollowsFrom`. Spans with at most one
/// `ChildOf` reference are left untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResolveAmbiguousParent;

impl Adjuster for ResolveAmbiguousParent {
    fn adjust(&self, mut trace: Trace) -> Trace {
        for span in &mut trace.spans {
            let mut seen_child_of = false;
            for reference in &mut span.references {
                if reference.ref_type == RefType::ChildOf {
                    if seen_child_of {
                        reference.ref_type = RefType::FollowsFrom;
                    } else {
                        seen_child_of = true;
                    }
                }
            }
        }
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracestore_model::testing::new_test_trace;
    use tracestore_model::{SpanId, SpanRef, TraceId};

    #[test]
    fn keeps_only_the_first_child_of_reference() {
        let mut trace = new_test_trace(TraceId::new(0, 1));
        let trace_id = TraceId::new(0, 1);
        trace.spans[0].references = vec![
            SpanRef { trace_id, span_id: SpanId::new(10), ref_type: RefType::ChildOf },
            SpanRef { trace_id, span_id: SpanId::new(20), ref_type: RefType::ChildOf },
            SpanRef { trace_id, span_id: SpanId::new(30), ref_type: RefType::FollowsFrom },
        ];

        let adjusted = ResolveAmbiguousParent.adjust(trace);
        let refs = &adjusted.spans[0].references;

        assert_eq!(refs[0].ref_type, RefType::ChildOf);
        assert_eq!(refs[1].ref_type, RefType::FollowsFrom);
        assert_eq!(refs[2].ref_type, RefType::FollowsFrom);
    }
}
