//! Path parameter storage
//!
//! Resolved parameters are bound once per request during route matching.
//! Uses stack allocation for the common case of four or fewer captures.

use smallvec::SmallVec;

/// Maximum number of path parameters kept on the stack. Most routes carry
/// 1-4 captures, so this covers the majority of cases without heap
/// allocation.
const STACK_PARAMS_CAPACITY: usize = 4;

/// Path parameters bound during route resolution.
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    inner: SmallVec<[(String, String); STACK_PARAMS_CAPACITY]>,
}

impl PathParams {
    /// Create an empty parameter set.
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: SmallVec::new(),
        }
    }

    /// Bind a parameter value.
    #[inline]
    pub fn insert(&mut self, name: String, value: String) {
        self.inner.push((name, value));
    }

    /// Look up a parameter by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a parameter is bound.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.iter().any(|(n, _)| n == name)
    }

    /// Number of bound parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True when nothing is bound.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over (name, value) pairs in binding order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_params_stay_on_stack() {
        let mut params = PathParams::new();
        params.insert("id".to_string(), "123".to_string());
        params.insert("name".to_string(), "test".to_string());

        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.get("name"), Some("test"));
        assert_eq!(params.len(), 2);
        assert!(!params.inner.spilled());
    }

    #[test]
    fn test_many_params_spill_to_heap() {
        let mut params = PathParams::new();
        for i in 0..10 {
            params.insert(format!("key{}", i), format!("value{}", i));
        }

        assert_eq!(params.len(), 10);
        assert!(params.inner.spilled());
    }

    #[test]
    fn test_missing_param_is_none() {
        let params = PathParams::new();
        assert_eq!(params.get("absent"), None);
        assert!(!params.contains("absent"));
    }
}
