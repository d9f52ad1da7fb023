//! Interval budget arithmetic.
//!
//! A job's `duration_hours` is split into contiguous blocks of
//! `invoice_interval_hours`, numbered from 1. Each block is billed by exactly
//! one invoice; a nonzero remainder makes the last block partial.

use gigforge_core::{CoreError, CoreResult};

/// Number of billable intervals for a job.
///
/// `interval_hours` must be nonzero (enforced at job creation).
pub fn max_intervals(duration_hours: u32, interval_hours: u32) -> u32 {
    let full = duration_hours / interval_hours;
    if duration_hours % interval_hours != 0 {
        full + 1
    } else {
        full
    }
}

/// Billable hours of interval `n` (1-based).
///
/// The last interval covers only the remainder when the duration does not
/// divide evenly.
pub fn interval_hours(n: u32, duration_hours: u32, interval: u32) -> u32 {
    let remainder = duration_hours % interval;
    if n == max_intervals(duration_hours, interval) && remainder != 0 {
        remainder
    } else {
        interval
    }
}

/// Invoice value: `rate * hours + adjustment`, floored at zero.
///
/// Overflow is an input problem, not a store problem.
pub fn invoice_value(rate: i64, hours: u32, adjustment: i64) -> CoreResult<i64> {
    let base = rate
        .checked_mul(i64::from(hours))
        .ok_or_else(|| CoreError::invalid_argument("invoice value overflow"))?;
    let value = base
        .checked_add(adjustment)
        .ok_or_else(|| CoreError::invalid_argument("invoice adjustment overflow"))?;
    Ok(value.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn even_division_has_no_partial_interval() {
        assert_eq!(max_intervals(40, 10), 4);
        assert_eq!(interval_hours(4, 40, 10), 10);
    }

    #[test]
    fn remainder_adds_a_partial_final_interval() {
        // 35h in 10h blocks: 3 full + 1 partial of 5h.
        assert_eq!(max_intervals(35, 10), 4);
        assert_eq!(interval_hours(3, 35, 10), 10);
        assert_eq!(interval_hours(4, 35, 10), 5);
    }

    #[test]
    fn interval_longer_than_duration_is_one_block() {
        assert_eq!(max_intervals(5, 10), 1);
        assert_eq!(interval_hours(1, 5, 10), 5);
    }

    #[test]
    fn value_is_rate_times_hours_plus_adjustment() {
        assert_eq!(invoice_value(100, 5, 0).unwrap(), 500);
        assert_eq!(invoice_value(100, 5, 25).unwrap(), 525);
        assert_eq!(invoice_value(100, 5, -200).unwrap(), 300);
    }

    #[test]
    fn value_floors_at_zero() {
        assert_eq!(invoice_value(100, 5, -1_000).unwrap(), 0);
    }

    #[test]
    fn overflowing_adjustment_is_rejected() {
        let err = invoice_value(i64::MAX / 2, 3, 0).unwrap_err();
        assert_eq!(err.kind(), gigforge_core::ErrorKind::InvalidArgument);
    }

    proptest! {
        #[test]
        fn interval_hours_sum_to_duration(
            duration in 1u32..10_000,
            interval in 1u32..10_000,
        ) {
            let n = max_intervals(duration, interval);
            let total: u64 = (1..=n)
                .map(|i| u64::from(interval_hours(i, duration, interval)))
                .sum();
            prop_assert_eq!(total, u64::from(duration));
        }

        #[test]
        fn every_interval_is_nonempty_and_bounded(
            duration in 1u32..10_000,
            interval in 1u32..10_000,
        ) {
            let n = max_intervals(duration, interval);
            for i in 1..=n {
                let h = interval_hours(i, duration, interval);
                prop_assert!(h >= 1);
                prop_assert!(h <= interval);
            }
        }

        #[test]
        fn value_is_never_negative(
            rate in 1i64..1_000_000,
            hours in 1u32..10_000,
            adjustment in -1_000_000_000i64..1_000_000_000,
        ) {
            prop_assert!(invoice_value(rate, hours, adjustment).unwrap() >= 0);
        }
    }
}
