//! Ordering shared by partial numbering and the search vocabulary.

use std::cmp::Ordering;

/// Compare by uppercase form, falling back to the raw strings for a total order.
pub fn upper_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_uppercase)
        .cmp(b.chars().flat_map(char::to_uppercase))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_cmp() {
        let mut words = vec!["b", "B", "a", "_", "A"];
        words.sort_by(|a, b| upper_cmp(a, b));
        assert_eq!(words, vec!["A", "a", "B", "b", "_"]);
    }

    #[test]
    fn test_upper_cmp_equal_only_when_identical() {
        assert_eq!(upper_cmp("Rust", "Rust"), Ordering::Equal);
        assert_ne!(upper_cmp("Rust", "rust"), Ordering::Equal);
    }
}
