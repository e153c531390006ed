//! Shared geometry helpers for pattern predicates.

use crate::{OHLCV, OHLCVExt};

/// Slope of the ordinary-least-squares line through `(0, values[0])`,
/// `(1, values[1])`, ... Returns 0.0 for fewer than two points.
pub fn ols_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / nf;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    num / den
}

/// True when `a` and `b` sit within `tolerance` of each other, measured in
/// absolute price units.
pub fn near(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Midpoint of the real body.
pub fn body_mid<T: OHLCV>(candle: &T) -> f64 {
    (candle.open() + candle.close()) / 2.0
}

/// True when `inner`'s real body sits entirely within `outer`'s real body.
pub fn body_inside<T: OHLCV>(inner: &T, outer: &T) -> bool {
    inner.body_top() <= outer.body_top() && inner.body_bottom() >= outer.body_bottom()
}
