use tracestore_model::{KeyValue, Trace};

use crate::Adjuster;

/// The `ip`/`peer.ipv4` tags that carry an address worth resolving.
const IP_TAG_KEYS: &[&str] = &["ip", "peer.ipv4", "peer.address"];

/// Resolves a tag's raw IP address to a hostname. Implementations must be
/// pure with respect to a fixed address space (same input, same output)
/// so the adjuster stays a deterministic function of the `Trace`; real
/// reverse-DNS lookups should be cached by the caller before wiring one in
/// here.
pub trait HostnameResolver: Send + Sync {
    /// Resolve `ip` to a hostname, or `None` if it cannot be resolved.
    fn resolve(&self, ip: &str) -> Option<String>;
}

/// Attaches a `hostname` tag next to any tag in [`IP_TAG_KEYS`] that
/// resolves through the given [`HostnameResolver`]. Unresolvable
/// addresses are left as-is; this adjuster never removes a tag.
pub struct IpToHostname<R: HostnameResolver> {
    resolver: R,
}

impl<R: HostnameResolver> IpToHostname<R> {
    /// Build the adjuster around the given resolver.
    pub fn new(resolver: R) -> Self {
        IpToHostname { resolver }
    }
}

impl<R: HostnameResolver> Adjuster for IpToHostname<R> {
    fn adjust(&self, mut trace: Trace) -> Trace {
        for span in &mut trace.spans {
            let mut additions = Vec::new();
            for tag in &span.tags {
                if IP_TAG_KEYS.contains(&tag.key.as_str()) {
                    let ip = tag.value.as_display();
                    if let Some(hostname) = self.resolver.resolve(&ip) {
                        additions.push(KeyValue::new("hostname", hostname));
                    }
                }
            }
            span.tags.extend(additions);
        }
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tracestore_model::testing::new_test_trace;
    use tracestore_model::TraceId;

    struct StaticResolver(HashMap<&'static str, &'static str>);

    impl HostnameResolver for StaticResolver {
        fn resolve(&self, ip: &str) -> Option<String> {
            self.0.get(ip).map(|s| s.to_string())
        }
    }

    #[test]
    fn attaches_hostname_for_resolvable_ip_tags() {
        let mut trace = new_test_trace(TraceId::new(0, 1));
        trace.spans[0].tags = vec![KeyValue::new("peer.ipv4", "10.0.0.1")];

        let mut known = HashMap::new();
        known.insert("10.0.0.1", "db-primary.internal");
        let adjuster = IpToHostname::new(StaticResolver(known));

        let adjusted = adjuster.adjust(trace);
        let tags = &adjusted.spans[0].tags;
        assert!(tags.iter().any(|t| t.key == "hostname"
            && t.value.as_display() == "db-primary.internal"));
    }

    #[test]
    fn leaves_unresolvable_tags_untouched() {
        let mut trace = new_test_trace(TraceId::new(0, 1));
        trace.spans[0].tags = vec![KeyValue::new("peer.ipv4", "10.0.0.99")];
        let adjuster = IpToHostname::new(StaticResolver(HashMap::new()));

        let adjusted = adjuster.adjust(trace);
        assert_eq!(adjusted.spans[0].tags.len(), 1);
    }
}
