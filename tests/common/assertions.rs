//! Assertion utilities for testing.
//!
//! This module provides helper functions for making assertions in tests,
//! particularly for floating-point comparisons.

/// Default epsilon for floating-point comparisons
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Assert that two floating-point values are approximately equal.
///
/// # Panics
///
/// Panics if the absolute difference between `actual` and `expected` is greater than `epsilon`.
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    let diff = (actual - expected).abs();

    assert!(
        diff <= epsilon,
        "Values not approximately equal: actual = {}, expected = {}, diff = {}, epsilon = {}",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Assert that two points are approximately equal, coordinate by coordinate
pub fn assert_point_approx_eq(actual: tracemap::Point, expected: (f64, f64), epsilon: Option<f64>) {
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    assert!(
        (actual.x() - expected.0).abs() <= eps && (actual.y() - expected.1).abs() <= eps,
        "Points not approximately equal: actual = ({}, {}), expected = ({}, {}), epsilon = {}",
        actual.x(),
        actual.y(),
        expected.0,
        expected.1,
        eps
    );
}

/// Assert that a value is within expected bounds (inclusive)
pub fn assert_in_range(actual: f64, min: f64, max: f64) {
    assert!(
        actual >= min && actual <= max,
        "Value not in range: actual = {}, min = {}, max = {}",
        actual,
        min,
        max
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0, None);
        assert_approx_eq(1.0, 1.0 + 1e-12, None);
        assert_approx_eq(1.0, 1.001, Some(0.01));
    }

    #[test]
    fn test_assert_in_range() {
        assert_in_range(5.0, 0.0, 10.0);
        assert_in_range(0.0, 0.0, 10.0);
        assert_in_range(10.0, 0.0, 10.0);
    }
}
