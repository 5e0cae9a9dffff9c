//! Registered route entries

use super::Segment;
use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::params::PathParams;

/// One registered (pattern, method) pair with its ordered handler chain.
///
/// Entries are created during registration and never mutated afterwards;
/// the route tree owns each entry exclusively.
pub(crate) struct RouteEntry {
    pub method: Method,
    pub pattern: Vec<Segment>,
    /// (segment index, parameter name) pairs, in pattern order.
    pub param_slots: Vec<(usize, String)>,
    /// Ordered handler chain; never empty.
    pub handlers: Vec<BoxedHandler>,
    /// Global registration order; decides precedence among overlapping
    /// wildcard patterns.
    pub sequence: usize,
}

impl RouteEntry {
    pub fn new(
        method: Method,
        pattern: Vec<Segment>,
        handlers: Vec<BoxedHandler>,
        sequence: usize,
    ) -> Self {
        let param_slots = pattern
            .iter()
            .enumerate()
            .filter_map(|(i, seg)| match seg {
                Segment::Param(name) => Some((i, name.clone())),
                _ => None,
            })
            .collect();
        Self {
            method,
            pattern,
            param_slots,
            handlers,
            sequence,
        }
    }

    /// Bind parameter values against the concrete path segments.
    ///
    /// A wildcard match can hand us a path shorter than the pattern, so
    /// every slot is bounds-checked; out-of-range slots are skipped.
    pub fn bind_params(&self, segments: &[&str]) -> PathParams {
        let mut params = PathParams::new();
        for (idx, name) in &self.param_slots {
            if let Some(value) = segments.get(*idx) {
                params.insert(name.clone(), (*value).to_string());
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerStatus, IntoHandlerChain};
    use crate::request::Request;
    use crate::response::Response;

    fn entry(pattern: &str) -> RouteEntry {
        let handler = |_req: Request, _res: Response| async { HandlerStatus::Final };
        RouteEntry::new(
            Method::Get,
            super::super::parse_pattern(pattern),
            handler.into_chain(),
            0,
        )
    }

    #[test]
    fn test_param_slots_follow_pattern_order() {
        let e = entry("/users/:id/posts/:post");
        assert_eq!(
            e.param_slots,
            vec![(1, "id".to_string()), (3, "post".to_string())]
        );
    }

    #[test]
    fn test_bind_params() {
        let e = entry("/users/:id/posts/:post");
        let params = e.bind_params(&["users", "42", "posts", "7"]);
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("post"), Some("7"));
    }

    #[test]
    fn test_bind_skips_out_of_range_slots() {
        // A catch-all match can resolve with fewer concrete segments than
        // the pattern has slots.
        let e = entry("/users/:id/posts/:post");
        let params = e.bind_params(&["users", "42"]);
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("post"), None);
        assert_eq!(params.len(), 1);
    }
}
