//! Route tree: registration-time trie construction and per-request
//! resolution
//!
//! Patterns are `/`-delimited. A segment prefixed with `:` captures one
//! path segment under the given name; a bare `*` as the final segment
//! catches the remainder of the path, including nothing at all. Literal
//! segments match case-sensitively.
//!
//! Resolution prefers, per segment, a literal child, then the parameter
//! child, then falls back to the nearest registered catch-all along the
//! traversed chain of nodes. Precedence among overlapping catch-alls
//! follows registration order (see [`tree`]).

mod entry;
mod node;
mod tree;

pub(crate) use entry::RouteEntry;
pub(crate) use tree::RouteTreeManager;

/// One parsed pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    /// Matches the exact segment text.
    Literal(String),
    /// Matches any single segment, binding it under the given name.
    Param(String),
    /// Matches the remainder of the path.
    Wildcard,
}

/// Split a path or pattern on `/`, dropping empty segments.
pub(crate) fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Parse a registration pattern into segments.
pub(crate) fn parse_pattern(pattern: &str) -> Vec<Segment> {
    split_segments(pattern)
        .into_iter()
        .map(|seg| {
            if seg == "*" {
                Segment::Wildcard
            } else if let Some(name) = seg.strip_prefix(':') {
                Segment::Param(name.to_string())
            } else {
                Segment::Literal(seg.to_string())
            }
        })
        .collect()
}

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn test_split_drops_empty_segments() {
        assert_eq!(split_segments("/"), Vec::<&str>::new());
        assert_eq!(split_segments("//"), Vec::<&str>::new());
        assert_eq!(split_segments("/a//b/"), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_pattern_forms() {
        assert_eq!(
            parse_pattern("/users/:id/*"),
            vec![
                Segment::Literal("users".to_string()),
                Segment::Param("id".to_string()),
                Segment::Wildcard,
            ]
        );
    }
}
