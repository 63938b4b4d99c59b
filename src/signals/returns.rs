//! Return series and correlation primitives.

/// Simple period-over-period returns. Same length as `closes`; the first
/// element is 0 since it has no prior observation.
///
/// A zero previous close yields a non-finite return, which [`pearson`]
/// rejects downstream.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    let mut returns = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return returns;
    }

    returns.push(0.0);
    for pair in closes.windows(2) {
        returns.push((pair[1] - pair[0]) / pair[0]);
    }
    returns
}

/// Pearson correlation coefficient of two equal-length samples.
///
/// Returns `None` when the coefficient is undefined: mismatched lengths,
/// fewer than two points, non-finite input, or a zero-variance side.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
        return None;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    if r.is_finite() {
        Some(r.clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Percentage change from `base` to `last`.
pub fn pct_change(base: f64, last: f64) -> Option<f64> {
    if !base.is_finite() || !last.is_finite() || base == 0.0 {
        return None;
    }
    Some((last - base) / base * 100.0)
}
