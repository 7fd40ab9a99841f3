//! Custom assertion macros for testing.
//!
//! Float fields are never compared with `==`; these macros compare within a
//! tolerance and print both sides on failure.

/// Assert that two floating-point values are approximately equal.
///
/// # Example
///
/// ```rust
/// use haptic_test_helpers::assert_approx_eq;
///
/// assert_approx_eq!(0.1_f64 * 3.0, 0.3, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $tolerance:expr $(,)?) => {
        let left = $left;
        let right = $right;
        let tolerance = $tolerance;
        let diff = (left - right).abs();
        if !(diff <= tolerance) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`",
                left, right, diff, tolerance
            );
        }
    };
    ($left:expr, $right:expr, $tolerance:expr, $($arg:tt)+) => {
        let left = $left;
        let right = $right;
        let tolerance = $tolerance;
        let diff = (left - right).abs();
        if !(diff <= tolerance) {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}`,\n  tolerance: `{:?}`: {}",
                left, right, diff, tolerance, format_args!($($arg)+)
            );
        }
    };
}

/// Assert that a force vector matches `(fx, fy, fz)` component-wise.
///
/// Works with any value exposing `fx`, `fy` and `fz` fields.
///
/// # Example
///
/// ```rust,ignore
/// use haptic_test_helpers::assert_force_approx;
///
/// assert_force_approx!(state.force, (0.0, 0.3, 0.0), 1e-9);
/// ```
#[macro_export]
macro_rules! assert_force_approx {
    ($force:expr, ($fx:expr, $fy:expr, $fz:expr), $tolerance:expr $(,)?) => {
        let force = $force;
        let expected: (f64, f64, f64) = ($fx, $fy, $fz);
        let tolerance: f64 = $tolerance;
        let within = |a: f64, b: f64| (a - b).abs() <= tolerance;
        if !(within(force.fx, expected.0) && within(force.fy, expected.1) && within(force.fz, expected.2)) {
            panic!(
                "assertion failed: force mismatch\n  actual: `({:?}, {:?}, {:?})`,\n  expected: `{:?}`,\n  tolerance: `{:?}`",
                force.fx, force.fy, force.fz, expected, tolerance
            );
        }
    };
}

/// Assert that a sequence is strictly increasing.
///
/// # Example
///
/// ```rust
/// use haptic_test_helpers::assert_monotonic;
///
/// assert_monotonic!(&[1, 2, 3, 4]);
/// ```
#[macro_export]
macro_rules! assert_monotonic {
    ($collection:expr $(,)?) => {
        let collection = $collection;
        let mut iter = collection.iter();
        if let Some(mut prev) = iter.next() {
            for (i, curr) in iter.enumerate() {
                if prev >= curr {
                    panic!(
                        "assertion failed: sequence is not strictly monotonic\n  violation at index {}: {:?} >= {:?}",
                        i, prev, curr
                    );
                }
                prev = curr;
            }
        }
    };
    ($collection:expr, $($arg:tt)+) => {
        let collection = $collection;
        let mut iter = collection.iter();
        if let Some(mut prev) = iter.next() {
            for (i, curr) in iter.enumerate() {
                if prev >= curr {
                    panic!(
                        "assertion failed: sequence is not strictly monotonic\n  violation at index {}: {:?} >= {:?}: {}",
                        i, prev, curr, format_args!($($arg)+)
                    );
                }
                prev = curr;
            }
        }
    };
}
