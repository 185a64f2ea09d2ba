//! Approximate comparison of table rows in tests.

/// Asserts that two rows are equal up to `epsilon`, with missing values only equal to each other.
macro_rules! assert_approx_eq {
    ($lhs:expr, $rhs:expr, epsilon = $epsilon:expr) => {{
        let (lhs, rhs): (&[f64], &[f64]) = (&$lhs, &$rhs);

        assert!(
            $crate::approx::rows_approx_eq(lhs, rhs, $epsilon),
            r#"assertion failed: `({} ≈ {})`
  left: `{:?}`,
 right: `{:?}`"#,
            stringify!($lhs),
            stringify!($rhs),
            lhs,
            rhs,
        )
    }};
}

pub fn values_approx_eq(lhs: f64, rhs: f64, epsilon: f64) -> bool {
    match (lhs.is_nan(), rhs.is_nan()) {
        (true, true) => true,
        (false, false) => (lhs - rhs).abs() < epsilon,
        _ => false,
    }
}

pub fn rows_approx_eq(lhs: &[f64], rhs: &[f64], epsilon: f64) -> bool {
    lhs.len() == rhs.len()
        && lhs
            .iter()
            .zip(rhs)
            .all(|(&x, &y)| values_approx_eq(x, y, epsilon))
}

#[test]
fn test_missing_values() {
    assert!(rows_approx_eq(&[1.0, f64::NAN], &[1.0, f64::NAN], 1e-12));
    assert!(!rows_approx_eq(&[1.0, f64::NAN], &[1.0, 2.0], 1e-12));
    assert!(!rows_approx_eq(&[1.0], &[1.0, f64::NAN], 1e-12));
}
