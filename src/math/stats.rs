//! Small descriptive statistics over sample slices.
//!
//! NaN samples are skipped by the extremum searches so that a single dropped
//! reading does not poison a peak search.

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean spacing between consecutive coordinates: `(x[n-1] - x[0]) / (n - 1)`.
pub fn mean_spacing(x: &[f64]) -> Option<f64> {
    if x.len() < 2 {
        return None;
    }
    let dx = (x[x.len() - 1] - x[0]) / (x.len() - 1) as f64;
    dx.is_finite().then_some(dx)
}

/// Index of the maximum value; the leftmost index wins on ties.
pub fn argmax(values: &[f64]) -> Option<usize> {
    arg_best(values, |candidate, best| candidate > best)
}

/// Index of the minimum value; the leftmost index wins on ties.
pub fn argmin(values: &[f64]) -> Option<usize> {
    arg_best(values, |candidate, best| candidate < best)
}

fn arg_best(values: &[f64], better: impl Fn(f64, f64) -> bool) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        // Strict comparison keeps the first occurrence.
        match best {
            Some((_, b)) if !better(v, b) => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// `(min, max)` over the non-NaN values.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let lo = argmin(values)?;
    let hi = argmax(values)?;
    Some((values[lo], values[hi]))
}

/// Total sum of squares about the mean.
pub fn total_sum_of_squares(values: &[f64]) -> f64 {
    let Some(m) = mean(values) else {
        return 0.0;
    };
    values.iter().map(|v| (v - m) * (v - m)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_occurrence() {
        assert_eq!(argmax(&[1.0, 3.0, 2.0, 3.0]), Some(1));
        assert_eq!(argmin(&[2.0, 0.0, 0.0, 5.0]), Some(1));
    }

    #[test]
    fn argmax_skips_nan() {
        assert_eq!(argmax(&[f64::NAN, 1.0, 0.5]), Some(1));
        assert_eq!(argmax(&[f64::NAN, f64::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn spacing_and_mean() {
        assert_eq!(mean_spacing(&[0.0, 0.5, 1.0, 1.5]), Some(0.5));
        assert_eq!(mean_spacing(&[1.0]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(min_max(&[3.0, -1.0, 4.0]), Some((-1.0, 4.0)));
    }

    #[test]
    fn total_sum_of_squares_about_mean() {
        assert!((total_sum_of_squares(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
        assert_eq!(total_sum_of_squares(&[]), 0.0);
    }
}
