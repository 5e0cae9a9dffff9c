//! Per-method trees and best-match resolution
//!
//! One tree exists per routing method. Lookup walks one path segment at a
//! time, preferring a literal child, then the parameter child; when neither
//! exists the walk falls back to the nearest registered catch-all along the
//! chain of nodes actually traversed. When several ancestors carry a
//! catch-all, the earliest-registered one wins: precedence among
//! overlapping wildcard patterns follows registration order, not path
//! depth. Trees are built single-threaded during registration and are
//! read-only afterwards, so concurrent lookups need no locking.

use super::node::RouteNode;
use super::{parse_pattern, RouteEntry, Segment};
use crate::error::RouteError;
use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::params::PathParams;
use std::collections::HashMap;

/// A prefix tree over path segments for one routing method.
pub(crate) struct RouteTree {
    /// Arena; index 0 is the root.
    nodes: Vec<RouteNode>,
}

/// Internal result of a tree walk.
enum Resolution<'a> {
    /// A route ends exactly at the walked-to node.
    Exact(&'a RouteEntry),
    /// A catch-all along the traversed chain covers the path.
    Wildcard(&'a RouteEntry),
    Miss,
}

impl RouteTree {
    fn new() -> Self {
        Self {
            nodes: vec![RouteNode::new(None)],
        }
    }

    fn push_node(&mut self, parent: usize) -> usize {
        self.nodes.push(RouteNode::new(Some(parent)));
        self.nodes.len() - 1
    }

    /// Return (creating if necessary) the child of `parent` for one
    /// pattern segment.
    fn add_branch(&mut self, parent: usize, segment: &Segment) -> usize {
        match segment {
            Segment::Wildcard => match self.nodes[parent].wildcard_child {
                Some(idx) => idx,
                None => {
                    let idx = self.push_node(parent);
                    self.nodes[parent].wildcard_child = Some(idx);
                    idx
                }
            },
            Segment::Param(_) => match self.nodes[parent].param_child {
                Some(idx) => idx,
                None => {
                    let idx = self.push_node(parent);
                    self.nodes[parent].param_child = Some(idx);
                    idx
                }
            },
            Segment::Literal(text) => match self.nodes[parent].children.get(text) {
                Some(&idx) => idx,
                None => {
                    let idx = self.push_node(parent);
                    self.nodes[parent].children.insert(text.clone(), idx);
                    idx
                }
            },
        }
    }

    /// Walk the full pattern, creating the node chain, and attach the
    /// entry at the final node.
    fn insert(&mut self, entry: RouteEntry, pattern_text: &str) -> Result<(), RouteError> {
        let mut cur = 0;
        for segment in &entry.pattern {
            cur = self.add_branch(cur, segment);
        }
        if self.nodes[cur].terminal.is_some() {
            return Err(RouteError::DuplicateRoute {
                method: entry.method,
                pattern: pattern_text.to_string(),
            });
        }
        self.nodes[cur].terminal = Some(entry);
        Ok(())
    }

    fn resolve(&self, segments: &[&str]) -> Resolution<'_> {
        let mut cur = 0usize;
        for segment in segments {
            if let Some(&child) = self.nodes[cur].children.get(*segment) {
                cur = child;
                continue;
            }
            if let Some(child) = self.nodes[cur].param_child {
                cur = child;
                continue;
            }
            return match self.ancestor_wildcard(cur) {
                Some(entry) => Resolution::Wildcard(entry),
                None => Resolution::Miss,
            };
        }
        if let Some(entry) = self.nodes[cur].terminal.as_ref() {
            return Resolution::Exact(entry);
        }
        match self.ancestor_wildcard(cur) {
            Some(entry) => Resolution::Wildcard(entry),
            None => Resolution::Miss,
        }
    }

    /// Search upward from `from` (inclusive) along parent links for nodes
    /// carrying a catch-all terminal. Among several candidates the one with
    /// the lowest registration sequence wins.
    fn ancestor_wildcard(&self, from: usize) -> Option<&RouteEntry> {
        let mut best: Option<&RouteEntry> = None;
        let mut cursor = Some(from);
        while let Some(idx) = cursor {
            if let Some(wc) = self.nodes[idx].wildcard_child {
                if let Some(entry) = self.nodes[wc].terminal.as_ref() {
                    if best.map_or(true, |b| entry.sequence < b.sequence) {
                        best = Some(entry);
                    }
                }
            }
            cursor = self.nodes[idx].parent;
        }
        best
    }
}

/// Outcome of resolving a (method, path) pair.
pub(crate) struct Resolved<'a> {
    pub entry: Option<&'a RouteEntry>,
    /// True when the match came from a catch-all, or when there was no
    /// match at all: the dispatcher may consult the generic fallback
    /// handler before (or instead of) running the entry's chain.
    pub wildcard_fallback: bool,
    pub params: PathParams,
}

/// One route tree per method, plus the shared registration sequence.
pub(crate) struct RouteTreeManager {
    trees: HashMap<Method, RouteTree>,
    next_sequence: usize,
}

impl RouteTreeManager {
    pub fn new() -> Self {
        Self {
            trees: HashMap::new(),
            next_sequence: 0,
        }
    }

    /// Insert a route. Fails on an empty handler chain, a misplaced
    /// wildcard segment, or a duplicate pattern structure for the method.
    pub fn insert(
        &mut self,
        method: Method,
        pattern: &str,
        handlers: Vec<BoxedHandler>,
    ) -> Result<(), RouteError> {
        if handlers.is_empty() {
            return Err(RouteError::EmptyHandlerChain {
                method,
                pattern: pattern.to_string(),
            });
        }
        let segments = parse_pattern(pattern);
        let misplaced = segments
            .iter()
            .position(|s| matches!(s, Segment::Wildcard))
            .is_some_and(|i| i + 1 != segments.len());
        if misplaced {
            return Err(RouteError::WildcardNotLast {
                method,
                pattern: pattern.to_string(),
            });
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let entry = RouteEntry::new(method, segments, handlers, sequence);
        self.trees
            .entry(method)
            .or_insert_with(RouteTree::new)
            .insert(entry, pattern)
    }

    /// Resolve the pre-split path segments against `method`'s tree.
    ///
    /// A missing tree behaves like a full miss: `(None, true)`, forcing the
    /// caller onto the generic fallback path.
    pub fn resolve<'a>(&'a self, method: Method, segments: &[&str]) -> Resolved<'a> {
        let Some(tree) = self.trees.get(&method) else {
            return Resolved {
                entry: None,
                wildcard_fallback: true,
                params: PathParams::new(),
            };
        };
        match tree.resolve(segments) {
            Resolution::Exact(entry) => Resolved {
                entry: Some(entry),
                wildcard_fallback: false,
                params: entry.bind_params(segments),
            },
            Resolution::Wildcard(entry) => Resolved {
                entry: Some(entry),
                wildcard_fallback: true,
                params: entry.bind_params(segments),
            },
            Resolution::Miss => Resolved {
                entry: None,
                wildcard_fallback: true,
                params: PathParams::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HandlerStatus;
    use crate::request::Request;
    use crate::response::Response;
    use crate::router::split_segments;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn noop() -> Vec<BoxedHandler> {
        vec![Arc::new(|_req: Request, _res: Response| async {
            HandlerStatus::Final
        })]
    }

    fn manager(patterns: &[&str]) -> RouteTreeManager {
        let mut mgr = RouteTreeManager::new();
        for pattern in patterns {
            mgr.insert(Method::Get, pattern, noop()).unwrap();
        }
        mgr
    }

    /// Resolve and return the matched entry's registration index plus the
    /// fallback flag.
    fn hit(mgr: &RouteTreeManager, path: &str) -> Option<(usize, bool)> {
        let segments = split_segments(path);
        let resolved = mgr.resolve(Method::Get, &segments);
        resolved
            .entry
            .map(|e| (e.sequence, resolved.wildcard_fallback))
    }

    #[test]
    fn test_root_and_literal() {
        // Scenario: "/" and "/hello" registered; "//" collapses to "/".
        let mgr = manager(&["/", "/hello"]);
        assert_eq!(hit(&mgr, "/"), Some((0, false)));
        assert_eq!(hit(&mgr, "//"), Some((0, false)));
        assert_eq!(hit(&mgr, "/hello"), Some((1, false)));
    }

    #[test]
    fn test_literal_and_parameter_coexist() {
        // /test, /:kind/test, /:kind
        let mgr = manager(&["/test", "/:kind/test", "/:kind"]);
        assert_eq!(hit(&mgr, "/test"), Some((0, false)));
        assert_eq!(hit(&mgr, "/banana/test"), Some((1, false)));
        assert_eq!(hit(&mgr, "/apple"), Some((2, false)));
        assert_eq!(hit(&mgr, "/peach/test"), Some((1, false)));
    }

    #[test]
    fn test_uncovered_paths_miss() {
        let mgr = manager(&["/test", "/:kind/test"]);
        assert_eq!(hit(&mgr, "/test/blah"), None);
        assert_eq!(hit(&mgr, "/blah/blah"), None);
        assert_eq!(hit(&mgr, "/"), None);
        assert_eq!(hit(&mgr, "/test"), Some((0, false)));
    }

    #[test]
    fn test_literal_beats_parameter_either_order() {
        let mgr = manager(&["/apple", "/:kind"]);
        assert_eq!(hit(&mgr, "/apple"), Some((0, false)));
        assert_eq!(hit(&mgr, "/pear"), Some((1, false)));

        let mgr = manager(&["/:kind", "/apple"]);
        assert_eq!(hit(&mgr, "/apple"), Some((1, false)));
        assert_eq!(hit(&mgr, "/pear"), Some((0, false)));
    }

    #[test]
    fn test_parameter_beats_wildcard() {
        let mgr = manager(&["/*", "/:kind"]);
        assert_eq!(hit(&mgr, "/anything"), Some((1, false)));
        // The catch-all still covers deeper paths the parameter cannot.
        assert_eq!(hit(&mgr, "/a/b"), Some((0, true)));
    }

    #[test]
    fn test_wildcard_precedence_follows_registration_order() {
        // Registered specific-first: the deeper catch-all wins for /hello.
        let mgr = manager(&["/hello/world", "/hello/*", "/*"]);
        assert_eq!(hit(&mgr, "/hello"), Some((1, true)));
        assert_eq!(hit(&mgr, "/hello/world"), Some((0, false)));

        // Registered root-first: the root catch-all wins for the same path.
        let mgr = manager(&["/*", "/hello/*", "/hello/world"]);
        assert_eq!(hit(&mgr, "/hello"), Some((0, true)));
        assert_eq!(hit(&mgr, "/hello/world"), Some((2, false)));
    }

    #[test]
    fn test_wildcard_matches_zero_segments() {
        let mgr = manager(&["/files/*"]);
        assert_eq!(hit(&mgr, "/files"), Some((0, true)));
        assert_eq!(hit(&mgr, "/files/a/b/c"), Some((0, true)));
        assert_eq!(hit(&mgr, "/other"), None);
    }

    #[test]
    fn test_wildcard_fallback_on_mid_path_mismatch() {
        let mgr = manager(&["/api/*", "/api/users/list"]);
        // Walk reaches /api/users then fails on "detail"; the upward
        // search finds the catch-all registered at /api.
        assert_eq!(hit(&mgr, "/api/users/detail"), Some((0, true)));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mgr = manager(&["/a/:b/c", "/a/*", "/d"]);
        for path in ["/a/x/c", "/a/x", "/d", "/missing"] {
            let first = hit(&mgr, path);
            for _ in 0..3 {
                assert_eq!(hit(&mgr, path), first);
            }
        }
    }

    #[test]
    fn test_parameter_binding() {
        let mgr = manager(&["/users/:id/posts/:post"]);
        let segments = split_segments("/users/42/posts/7");
        let resolved = mgr.resolve(Method::Get, &segments);
        assert_eq!(resolved.params.get("id"), Some("42"));
        assert_eq!(resolved.params.get("post"), Some("7"));
    }

    #[test]
    fn test_missing_tree_forces_fallback() {
        let mgr = manager(&["/x"]);
        let resolved = mgr.resolve(Method::Post, &["x"]);
        assert!(resolved.entry.is_none());
        assert!(resolved.wildcard_fallback);
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let mut mgr = RouteTreeManager::new();
        mgr.insert(Method::Get, "/users/:id", noop()).unwrap();
        let err = mgr.insert(Method::Get, "/users/:name", noop()).unwrap_err();
        assert!(matches!(err, RouteError::DuplicateRoute { .. }));
        // The same structure under another method is fine.
        mgr.insert(Method::Post, "/users/:id", noop()).unwrap();
    }

    #[test]
    fn test_empty_handler_chain_is_rejected() {
        let mut mgr = RouteTreeManager::new();
        let err = mgr.insert(Method::Get, "/x", Vec::new()).unwrap_err();
        assert!(matches!(err, RouteError::EmptyHandlerChain { .. }));
    }

    #[test]
    fn test_misplaced_wildcard_is_rejected() {
        let mut mgr = RouteTreeManager::new();
        let err = mgr.insert(Method::Get, "/a/*/b", noop()).unwrap_err();
        assert!(matches!(err, RouteError::WildcardNotLast { .. }));
        // Trailing wildcard stays valid.
        mgr.insert(Method::Get, "/a/*", noop()).unwrap();
    }

    #[test]
    fn test_literal_matching_is_case_sensitive() {
        let mgr = manager(&["/Users"]);
        assert_eq!(hit(&mgr, "/Users"), Some((0, false)));
        assert_eq!(hit(&mgr, "/users"), None);
    }

    proptest! {
        // A literal route wins over a parameter route at the same depth for
        // any segment text and either registration order.
        #[test]
        fn prop_literal_always_beats_parameter(seg in "[a-z][a-z0-9]{0,11}") {
            let literal = format!("/{}", seg);

            let mgr = manager(&[literal.as_str(), "/:p"]);
            prop_assert_eq!(hit(&mgr, &literal), Some((0, false)));

            let mgr = manager(&["/:p", literal.as_str()]);
            prop_assert_eq!(hit(&mgr, &literal), Some((1, false)));
        }

        // Resolution of an unchanged tree is deterministic.
        #[test]
        fn prop_resolution_idempotent(parts in proptest::collection::vec("[a-z]{1,6}", 1..4)) {
            let mgr = manager(&["/a/:b", "/a/*", "/c"]);
            let path = format!("/{}", parts.join("/"));
            let first = hit(&mgr, &path);
            prop_assert_eq!(hit(&mgr, &path), first);
        }
    }
}
