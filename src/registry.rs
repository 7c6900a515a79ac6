//! Registry of country pairs already linked by an arrow.
//!
//! Pairs are unordered: `("FR", "DE")` and `("DE", "FR")` share one entry. The registry
//! hands out [`Occurrence::First`] for the first arrow of a pair, [`Occurrence::Repeat`]
//! for the second, and refuses any further arrow so that a pair never carries more than
//! two.

use std::collections::HashMap;

use crate::geometry::Occurrence;

/// Maximum number of arrows drawn between two countries
pub const MAX_ARROWS_PER_PAIR: u8 = 2;

/// Canonical unordered pair of country codes (lexicographically ordered)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(String, String);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

/// Tracks how many arrows each unordered pair has received during one rendering pass
#[derive(Debug, Default)]
pub struct DrawnPairs {
    counts: HashMap<PairKey, u8>,
}

impl DrawnPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an arrow between `a` and `b`.
    ///
    /// Returns `None` when the pair already carries [`MAX_ARROWS_PER_PAIR`] arrows; the
    /// registry is left unchanged in that case.
    pub fn register(&mut self, a: &str, b: &str) -> Option<Occurrence> {
        let count = self.counts.entry(PairKey::new(a, b)).or_insert(0);
        let occurrence = match *count {
            0 => Occurrence::First,
            n if n < MAX_ARROWS_PER_PAIR => Occurrence::Repeat,
            _ => return None,
        };
        *count += 1;
        Some(occurrence)
    }

    /// Number of arrows recorded for the pair
    pub fn count(&self, a: &str, b: &str) -> u8 {
        self.counts.get(&PairKey::new(a, b)).copied().unwrap_or(0)
    }

    /// Number of distinct pairs seen
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_unordered() {
        assert_eq!(PairKey::new("FR", "DE"), PairKey::new("DE", "FR"));
        assert_eq!(PairKey::new("FR", "DE"), PairKey("DE".to_string(), "FR".to_string()));
    }

    #[test]
    fn test_pair_key_has_no_concatenation_collisions() {
        // "AB"+"C" and "A"+"BC" concatenate to the same string
        assert_ne!(PairKey::new("AB", "C"), PairKey::new("A", "BC"));
    }

    #[test]
    fn test_register_first_then_repeat() {
        let mut drawn = DrawnPairs::new();
        assert!(drawn.is_empty());

        assert_eq!(drawn.register("FR", "DE"), Some(Occurrence::First));
        assert_eq!(drawn.register("DE", "FR"), Some(Occurrence::Repeat));
        assert_eq!(drawn.register("FR", "ES"), Some(Occurrence::First));

        assert_eq!(drawn.count("DE", "FR"), 2);
        assert_eq!(drawn.len(), 2);
        assert_eq!(drawn.count("ES", "FR"), 1);
        assert_eq!(drawn.count("ES", "DE"), 0);
    }

    #[test]
    fn test_third_arrow_is_refused() {
        let mut drawn = DrawnPairs::new();
        drawn.register("IT", "AT");
        drawn.register("IT", "AT");
        assert_eq!(drawn.register("AT", "IT"), None);
        assert_eq!(drawn.count("IT", "AT"), MAX_ARROWS_PER_PAIR);
    }
}
