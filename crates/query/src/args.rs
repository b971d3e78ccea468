//! Argument normalization for builder calls.
//!
//! Most builder calls take either one name or an ordered sequence of names.
//! Both shapes normalize to an ordered `Vec<String>` here.

use crate::column::{ColumnRef, FilterCond};

/// A single name or an ordered sequence of names.
pub trait IntoNames {
    fn into_names(self) -> Vec<String>;
}

impl IntoNames for &str {
    fn into_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoNames for String {
    fn into_names(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoNames for &String {
    fn into_names(self) -> Vec<String> {
        vec![self.clone()]
    }
}

impl IntoNames for &ColumnRef {
    fn into_names(self) -> Vec<String> {
        vec![self.name().to_string()]
    }
}

impl IntoNames for Vec<String> {
    fn into_names(self) -> Vec<String> {
        self
    }
}

impl IntoNames for Vec<&str> {
    fn into_names(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoNames for &[&str] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoNames for &[String] {
    fn into_names(self) -> Vec<String> {
        self.to_vec()
    }
}

impl<const N: usize> IntoNames for [&str; N] {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoNames for Vec<ColumnRef> {
    fn into_names(self) -> Vec<String> {
        self.iter().map(|c| c.name().to_string()).collect()
    }
}

/// One predicate or an ordered sequence of predicates.
pub trait IntoPredicates {
    fn into_predicates(self) -> Vec<String>;
}

impl IntoPredicates for &str {
    fn into_predicates(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoPredicates for String {
    fn into_predicates(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoPredicates for FilterCond {
    fn into_predicates(self) -> Vec<String> {
        vec![self.as_str().to_string()]
    }
}

impl IntoPredicates for &FilterCond {
    fn into_predicates(self) -> Vec<String> {
        vec![self.as_str().to_string()]
    }
}

impl IntoPredicates for Vec<FilterCond> {
    fn into_predicates(self) -> Vec<String> {
        self.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl IntoPredicates for Vec<&str> {
    fn into_predicates(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoPredicates for Vec<String> {
    fn into_predicates(self) -> Vec<String> {
        self
    }
}

impl<const N: usize> IntoPredicates for [&str; N] {
    fn into_predicates(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_sequence_names() {
        assert_eq!("a".into_names(), vec!["a"]);
        assert_eq!(["a", "b"].into_names(), vec!["a", "b"]);
        assert_eq!(vec!["b".to_string(), "a".to_string()].into_names(), vec!["b", "a"]);
        assert!(Vec::<String>::new().into_names().is_empty());
    }

    #[test]
    fn test_predicates() {
        assert_eq!("x>1".into_predicates(), vec!["x>1"]);
        assert_eq!(
            vec![FilterCond::new("x>1"), FilterCond::new("y<2")].into_predicates(),
            vec!["x>1", "y<2"]
        );
    }
}
