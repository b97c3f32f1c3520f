//! Rolling-window statistics over a single series and row-wise combiners
//! across several series.
//!
//! Window semantics match the usual dataframe conventions: each output row
//! aggregates the `window` values ending at that row, rows with fewer than
//! `window` preceding values yield NaN, and any NaN inside the window makes
//! the output NaN.

/// Apply a statistic over every full window of `window` consecutive values
fn roll<F>(values: &[f64], window: usize, stat: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if window == 0 || window > n {
        return out;
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = stat(slice);
    }
    out
}

pub fn max(values: &[f64], window: usize) -> Vec<f64> {
    roll(values, window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn min(values: &[f64], window: usize) -> Vec<f64> {
    roll(values, window, |w| {
        w.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

pub fn sum(values: &[f64], window: usize) -> Vec<f64> {
    roll(values, window, |w| w.iter().sum())
}

pub fn mean(values: &[f64], window: usize) -> Vec<f64> {
    roll(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

pub fn median(values: &[f64], window: usize) -> Vec<f64> {
    roll(values, window, |w| {
        let mut sorted = w.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        }
    })
}

/// Sample variance (ddof = 1); NaN for windows shorter than 2
pub fn var(values: &[f64], window: usize) -> Vec<f64> {
    roll(values, window, sample_var)
}

/// Sample standard deviation (ddof = 1); NaN for windows shorter than 2
pub fn std(values: &[f64], window: usize) -> Vec<f64> {
    roll(values, window, |w| sample_var(w).sqrt())
}

/// Adjusted Fisher-Pearson skewness; NaN for windows shorter than 3 or with
/// zero variance
pub fn skew(values: &[f64], window: usize) -> Vec<f64> {
    roll(values, window, |w| {
        let n = w.len() as f64;
        if w.len() < 3 {
            return f64::NAN;
        }
        let (m2, m3, _) = central_moments(w);
        if m2 <= 0.0 {
            return f64::NAN;
        }
        let g1 = m3 / m2.powf(1.5);
        g1 * (n * (n - 1.0)).sqrt() / (n - 2.0)
    })
}

/// Unbiased excess kurtosis; NaN for windows shorter than 4 or with zero
/// variance
pub fn kurt(values: &[f64], window: usize) -> Vec<f64> {
    roll(values, window, |w| {
        let n = w.len() as f64;
        if w.len() < 4 {
            return f64::NAN;
        }
        let (m2, _, m4) = central_moments(w);
        if m2 <= 0.0 {
            return f64::NAN;
        }
        let g2 = m4 / (m2 * m2) - 3.0;
        ((n - 1.0) / ((n - 2.0) * (n - 3.0))) * ((n + 1.0) * g2 + 6.0)
    })
}

/// Rolling quantile with linear interpolation between order statistics
pub fn quantile(values: &[f64], window: usize, q: f64) -> Vec<f64> {
    roll(values, window, |w| {
        let mut sorted = w.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let h = (sorted.len() - 1) as f64 * q;
        let lo = h.floor() as usize;
        let frac = h - lo as f64;
        if lo + 1 < sorted.len() {
            sorted[lo] + frac * (sorted[lo + 1] - sorted[lo])
        } else {
            sorted[lo]
        }
    })
}

/// First difference; the leading row is NaN
pub fn diff(values: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        out[i] = values[i] - values[i - 1];
    }
    out
}

fn sample_var(w: &[f64]) -> f64 {
    let n = w.len() as f64;
    if w.len() < 2 {
        return f64::NAN;
    }
    let mean = w.iter().sum::<f64>() / n;
    w.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
}

fn central_moments(w: &[f64]) -> (f64, f64, f64) {
    let n = w.len() as f64;
    let mean = w.iter().sum::<f64>() / n;
    let mut m2 = 0.0;
    let mut m3 = 0.0;
    let mut m4 = 0.0;
    for v in w {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

/// Row-wise maximum across series, skipping NaN; all-NaN rows stay NaN
pub fn rowwise_max(series: &[Vec<f64>]) -> Vec<f64> {
    let rows = series.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(rows);
    for row in 0..rows {
        let mut best = f64::NAN;
        for s in series {
            let v = s[row];
            if v.is_nan() {
                continue;
            }
            best = if best.is_nan() { v } else { best.max(v) };
        }
        out.push(best);
    }
    out
}

/// Row-wise arithmetic mean across series, skipping NaN; all-NaN rows stay NaN
pub fn rowwise_mean(series: &[Vec<f64>]) -> Vec<f64> {
    let rows = series.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(rows);
    for row in 0..rows {
        let mut sum = 0.0;
        let mut count = 0usize;
        for s in series {
            let v = s[row];
            if v.is_nan() {
                continue;
            }
            sum += v;
            count += 1;
        }
        out.push(if count == 0 { f64::NAN } else { sum / count as f64 });
    }
    out
}

/// Row-wise arithmetic mean across series where any NaN poisons the row
pub fn rowwise_mean_strict(series: &[Vec<f64>]) -> Vec<f64> {
    let rows = series.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(rows);
    for row in 0..rows {
        let sum: f64 = series.iter().map(|s| s[row]).sum();
        out.push(sum / series.len() as f64);
    }
    out
}

/// Row-wise sum across series, skipping NaN; all-NaN rows sum to 0.0
pub fn rowwise_sum(series: &[Vec<f64>]) -> Vec<f64> {
    let rows = series.first().map_or(0, Vec::len);
    let mut out = Vec::with_capacity(rows);
    for row in 0..rows {
        let sum: f64 = series
            .iter()
            .map(|s| s[row])
            .filter(|v| !v.is_nan())
            .sum();
        out.push(sum);
    }
    out
}
