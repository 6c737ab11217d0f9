use crate::DomainError;
use statrs::statistics::Statistics;
use uibench_types::SampleSummary;

/// Summarize raw timing samples (seconds).
///
/// `stdev` is the population standard deviation. A constant sequence always reports
/// `mean == min` and `stdev == 0.0` exactly.
pub fn summarize(values: &[f64]) -> Result<SampleSummary, DomainError> {
    let mut v = values.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    let (Some(&min), Some(&max)) = (v.first(), v.last()) else {
        return Err(DomainError::EmptySampleSet);
    };
    let median = median_sorted(&v);

    if min == max {
        return Ok(SampleSummary {
            count: v.len(),
            median,
            mean: min,
            stdev: 0.0,
            min,
            max,
        });
    }

    // Running-mean rounding can land an ulp outside the extrema.
    let mean = values.iter().mean().max(min).min(max);
    let stdev = values.iter().population_std_dev();

    Ok(SampleSummary {
        count: v.len(),
        median,
        mean,
        stdev,
        min,
        max,
    })
}

fn median_sorted(sorted: &[f64]) -> f64 {
    debug_assert!(!sorted.is_empty());
    let n = sorted.len();
    let mid = n / 2;
    if n % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Seconds to whole milliseconds, halves rounded up.
///
/// Saturates at the `i64` range; NaN maps to 0.
pub fn round_ms(seconds: f64) -> i64 {
    let ms = seconds * 1000.0;
    if ms.is_nan() {
        return 0;
    }
    let floor = ms.floor();
    let rounded = if ms - floor >= 0.5 { floor + 1.0 } else { floor };
    // Float-to-int `as` saturates at the bounds.
    rounded as i64
}
