//! Indicator engine: rolling computations over a candle series.
//!
//! Every column is a `Vec<Option<f64>>` aligned with the input candles.
//! Warm-up rows (where a window has not yet filled) are `None`, never a
//! placeholder zero. All computations look strictly backward: the value at
//! index `i` depends only on candles `0..=i`.

use crate::config::IndicatorConfig;
use crate::{OHLCV, Result, Trend};

/// Per-candle indicator columns. Produced once per evaluation and shared
/// with the scoring stage.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IndicatorFrame {
    pub atr: Vec<Option<f64>>,
    pub adx: Vec<Option<f64>>,
    pub ema_fast: Vec<Option<f64>>,
    pub ema_slow: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    /// StochRSI %K on a 0..=100 scale
    pub stoch_k: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    /// Parabolic-SAR trend state (price above SAR = Up)
    pub trend: Vec<Option<Trend>>,
}

/// One fully-defined row of the frame. `None` from [`IndicatorFrame::row`]
/// when any column is still warming up at that index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub atr: f64,
    pub adx: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub stoch_k: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub trend: Trend,
}

impl IndicatorFrame {
    /// Compute all columns for the series.
    pub fn compute<T: OHLCV>(config: &IndicatorConfig, candles: &[T]) -> Result<Self> {
        config.validate()?;

        let closes: Vec<f64> = candles.iter().map(|c| c.close()).collect();

        let atr = rolling_atr(candles, config.atr_window.get());
        let adx = wilder_adx(candles, config.adx_window.get());
        let ema_fast = ema(&closes, config.ema_fast.get());
        let ema_slow = ema(&closes, config.ema_slow.get());
        let rsi = wilder_rsi(&closes, config.rsi_window.get());
        let stoch_k = stoch_of(&rsi, config.stoch_window.get());
        let (bb_upper, bb_lower) =
            bollinger(&closes, config.bollinger_window.get(), config.bollinger_mult);
        let (macd, macd_signal) = macd(
            &closes,
            config.macd_fast.get(),
            config.macd_slow.get(),
            config.macd_signal.get(),
        );
        let trend = parabolic_sar_trend(candles, config.sar_step, config.sar_max);

        Ok(Self {
            atr,
            adx,
            ema_fast,
            ema_slow,
            rsi,
            stoch_k,
            bb_upper,
            bb_lower,
            macd,
            macd_signal,
            trend,
        })
    }

    pub fn len(&self) -> usize {
        self.atr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atr.is_empty()
    }

    /// Fully-defined row at `index`, or `None` while any column is warming up.
    pub fn row(&self, index: usize) -> Option<IndicatorRow> {
        Some(IndicatorRow {
            atr: *self.atr.get(index)?.as_ref()?,
            adx: *self.adx.get(index)?.as_ref()?,
            ema_fast: *self.ema_fast.get(index)?.as_ref()?,
            ema_slow: *self.ema_slow.get(index)?.as_ref()?,
            rsi: *self.rsi.get(index)?.as_ref()?,
            stoch_k: *self.stoch_k.get(index)?.as_ref()?,
            bb_upper: *self.bb_upper.get(index)?.as_ref()?,
            bb_lower: *self.bb_lower.get(index)?.as_ref()?,
            macd: *self.macd.get(index)?.as_ref()?,
            macd_signal: *self.macd_signal.get(index)?.as_ref()?,
            trend: *self.trend.get(index)?.as_ref()?,
        })
    }

    /// Mean of the defined ATR values, used by the volatility confirmation.
    pub fn mean_atr(&self) -> Option<f64> {
        let defined: Vec<f64> = self.atr.iter().filter_map(|v| *v).collect();
        if defined.is_empty() {
            return None;
        }
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    }
}

// ============================================================
// MOVING AVERAGES
// ============================================================

/// EMA seeded with the SMA of the first `window` values, defined from index
/// `window - 1`.
fn ema(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if values.len() < window {
        return out;
    }

    let alpha = 2.0 / (window as f64 + 1.0);
    let mut current = values[..window].iter().sum::<f64>() / window as f64;
    out[window - 1] = Some(current);

    for i in window..values.len() {
        current = alpha * values[i] + (1.0 - alpha) * current;
        out[i] = Some(current);
    }
    out
}

/// EMA over an already-partial series: seeds with the SMA of the first
/// `window` defined values and stays `None` before that.
fn ema_opt(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    let alpha = 2.0 / (window as f64 + 1.0);

    let mut seed: Vec<f64> = Vec::with_capacity(window);
    let mut current: Option<f64> = None;

    for (i, value) in values.iter().enumerate() {
        let Some(v) = *value else { continue };
        match current {
            Some(prev) => {
                let next = alpha * v + (1.0 - alpha) * prev;
                current = Some(next);
                out[i] = Some(next);
            }
            None => {
                seed.push(v);
                if seed.len() == window {
                    let sma = seed.iter().sum::<f64>() / window as f64;
                    current = Some(sma);
                    out[i] = Some(sma);
                }
            }
        }
    }
    out
}

// ============================================================
// OSCILLATORS
// ============================================================

/// Wilder RSI, defined from index `window`.
fn wilder_rsi(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if closes.len() <= window {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=window {
        let delta = closes[i] - closes[i - 1];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss += -delta;
        }
    }
    avg_gain /= window as f64;
    avg_loss /= window as f64;
    out[window] = Some(rsi_from_averages(avg_gain, avg_loss));

    let w = window as f64;
    for i in (window + 1)..closes.len() {
        let delta = closes[i] - closes[i - 1];
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);
        avg_gain = (avg_gain * (w - 1.0) + gain) / w;
        avg_loss = (avg_loss * (w - 1.0) + loss) / w;
        out[i] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            // flat window, neither side dominates
            return 50.0;
        }
        return 100.0;
    }
    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

/// Stochastic %K of a series over a rolling min/max window, on a 0..=100
/// scale. A zero-range window (flat input) maps to 50, not 0.
fn stoch_of(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];

    for i in 0..values.len() {
        if i + 1 < window {
            continue;
        }
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_none()) {
            continue;
        }
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in slice.iter().flatten() {
            lo = lo.min(*v);
            hi = hi.max(*v);
        }
        let current = values[i].unwrap_or(lo);
        let range = hi - lo;
        out[i] = Some(if range == 0.0 {
            50.0
        } else {
            (current - lo) / range * 100.0
        });
    }
    out
}

// ============================================================
// VOLATILITY
// ============================================================

fn true_range<T: OHLCV>(curr: &T, prev_close: f64) -> f64 {
    let hl = curr.high() - curr.low();
    let hc = (curr.high() - prev_close).abs();
    let lc = (curr.low() - prev_close).abs();
    hl.max(hc).max(lc)
}

/// ATR as a rolling mean of the true range, defined from index `window`
/// (the first TR value needs a previous close).
fn rolling_atr<T: OHLCV>(candles: &[T], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; candles.len()];
    if candles.len() <= window {
        return out;
    }

    let trs: Vec<f64> = (1..candles.len())
        .map(|i| true_range(&candles[i], candles[i - 1].close()))
        .collect();

    for i in window..candles.len() {
        let sum: f64 = trs[i - window..i].iter().sum();
        out[i] = Some(sum / window as f64);
    }
    out
}

/// Rolling mean and sample standard deviation bands.
fn bollinger(closes: &[f64], window: usize, mult: f64) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let mut upper = vec![None; closes.len()];
    let mut lower = vec![None; closes.len()];

    for i in 0..closes.len() {
        if i + 1 < window {
            continue;
        }
        let slice = &closes[i + 1 - window..=i];
        let mean = slice.iter().sum::<f64>() / window as f64;
        let std = if window > 1 {
            let var =
                slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window as f64 - 1.0);
            var.sqrt()
        } else {
            0.0
        };
        upper[i] = Some(mean + mult * std);
        lower[i] = Some(mean - mult * std);
    }
    (upper, lower)
}

// ============================================================
// TREND
// ============================================================

/// Wilder ADX, defined once both the DI smoothing and the DX smoothing have
/// filled (index `2 * window - 1` onward).
fn wilder_adx<T: OHLCV>(candles: &[T], window: usize) -> Vec<Option<f64>> {
    let n = candles.len();
    let mut out = vec![None; n];
    if n < 2 * window + 1 {
        return out;
    }

    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    let mut trs = Vec::with_capacity(n - 1);
    for i in 1..n {
        let up = candles[i].high() - candles[i - 1].high();
        let down = candles[i - 1].low() - candles[i].low();
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
        trs.push(true_range(&candles[i], candles[i - 1].close()));
    }

    // Wilder smoothing of the directional components and TR
    let mut sm_plus: f64 = plus_dm[..window].iter().sum();
    let mut sm_minus: f64 = minus_dm[..window].iter().sum();
    let mut sm_tr: f64 = trs[..window].iter().sum();
    let w = window as f64;

    let mut dx_values: Vec<f64> = Vec::new();
    let mut adx: Option<f64> = None;

    for i in window - 1..plus_dm.len() {
        if i >= window {
            sm_plus = sm_plus - sm_plus / w + plus_dm[i];
            sm_minus = sm_minus - sm_minus / w + minus_dm[i];
            sm_tr = sm_tr - sm_tr / w + trs[i];
        }
        let (plus_di, minus_di) = if sm_tr == 0.0 {
            (0.0, 0.0)
        } else {
            (100.0 * sm_plus / sm_tr, 100.0 * sm_minus / sm_tr)
        };
        let di_sum = plus_di + minus_di;
        let dx = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };

        match adx {
            Some(prev) => {
                let next = (prev * (w - 1.0) + dx) / w;
                adx = Some(next);
                out[i + 1] = Some(next);
            }
            None => {
                dx_values.push(dx);
                if dx_values.len() == window {
                    let seed = dx_values.iter().sum::<f64>() / w;
                    adx = Some(seed);
                    out[i + 1] = Some(seed);
                }
            }
        }
    }
    out
}

/// Parabolic-SAR trend state. Only the binary above/below relation is kept;
/// the SAR level itself is not exposed.
fn parabolic_sar_trend<T: OHLCV>(candles: &[T], step: f64, max_af: f64) -> Vec<Option<Trend>> {
    let n = candles.len();
    let mut out = vec![None; n];
    if n < 2 {
        return out;
    }

    let mut rising = candles[1].close() >= candles[0].close();
    let mut sar = if rising {
        candles[0].low()
    } else {
        candles[0].high()
    };
    let mut ep = if rising {
        candles[1].high()
    } else {
        candles[1].low()
    };
    let mut af = step;

    out[1] = Some(if rising { Trend::Up } else { Trend::Down });

    for i in 2..n {
        sar += af * (ep - sar);

        if rising {
            // SAR may not enter the prior two candles' range
            sar = sar.min(candles[i - 1].low()).min(candles[i - 2].low());
            if candles[i].low() < sar {
                rising = false;
                sar = ep;
                ep = candles[i].low();
                af = step;
            } else if candles[i].high() > ep {
                ep = candles[i].high();
                af = (af + step).min(max_af);
            }
        } else {
            sar = sar.max(candles[i - 1].high()).max(candles[i - 2].high());
            if candles[i].high() > sar {
                rising = true;
                sar = ep;
                ep = candles[i].high();
                af = step;
            } else if candles[i].low() < ep {
                ep = candles[i].low();
                af = (af + step).min(max_af);
            }
        }

        out[i] = Some(if rising { Trend::Up } else { Trend::Down });
    }
    out
}

// ============================================================
// MACD
// ============================================================

fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);

    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let signal_line = ema_opt(&line, signal);
    (line, signal_line)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Candle;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle {
                time: i as i64 * 60,
                open: c,
                high: c + 0.5,
                low: c - 0.5,
                close: c,
                volume: None,
            })
            .collect()
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = ema(&values, 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_eq!(out[2], Some(2.0));
        // alpha = 0.5: 0.5 * 4 + 0.5 * 2 = 3
        assert_eq!(out[3], Some(3.0));
        assert_eq!(out[4], Some(4.0));
    }

    #[test]
    fn test_rsi_warmup_and_bounds() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let out = wilder_rsi(&closes, 5);
        for v in &out[..5] {
            assert_eq!(*v, None);
        }
        for v in out[5..].iter().flatten() {
            assert!((0.0..=100.0).contains(v), "rsi out of bounds: {v}");
        }
    }

    #[test]
    fn test_rsi_monotone_rise_saturates() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = wilder_rsi(&closes, 5);
        assert_eq!(out[19], Some(100.0));
    }

    #[test]
    fn test_stoch_flat_series_is_midpoint() {
        let flat = vec![Some(55.0); 20];
        let out = stoch_of(&flat, 14);
        assert_eq!(out[19], Some(50.0));
        assert_eq!(out[12], None);
    }

    #[test]
    fn test_stoch_bounds() {
        let values: Vec<Option<f64>> =
            (0..40).map(|i| Some(50.0 + (i as f64 * 0.9).cos() * 20.0)).collect();
        for v in stoch_of(&values, 14).iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn test_bollinger_flat_series_collapses() {
        let closes = vec![100.0; 10];
        let (upper, lower) = bollinger(&closes, 5, 1.5);
        assert_eq!(upper[3], None);
        assert_eq!(upper[4], Some(100.0));
        assert_eq!(lower[9], Some(100.0));
    }

    #[test]
    fn test_bollinger_sample_std() {
        // window [1, 2, 3, 4, 5]: mean 3, sample std sqrt(2.5)
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
        let (upper, lower) = bollinger(&closes, 5, 1.5);
        let std = 2.5_f64.sqrt();
        let u = upper[4].unwrap();
        let l = lower[4].unwrap();
        assert!((u - (3.0 + 1.5 * std)).abs() < 1e-12);
        assert!((l - (3.0 - 1.5 * std)).abs() < 1e-12);
    }

    #[test]
    fn test_atr_constant_range() {
        // every candle spans exactly 1.0 and closes where it opened
        let candles = candles_from_closes(&vec![100.0; 12]);
        let atr = rolling_atr(&candles, 5);
        assert_eq!(atr[4], None);
        assert_eq!(atr[5], Some(1.0));
        assert_eq!(atr[11], Some(1.0));
    }

    #[test]
    fn test_adx_warmup() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.5).sin() * 3.0).collect();
        let candles = candles_from_closes(&closes);
        let adx = wilder_adx(&candles, 5);
        for v in &adx[..9] {
            assert_eq!(*v, None);
        }
        assert!(adx[10].is_some());
        for v in adx.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn test_adx_strong_trend_is_high() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64 * 2.0).collect();
        let candles = candles_from_closes(&closes);
        let adx = wilder_adx(&candles, 5);
        let last = adx.last().unwrap().unwrap();
        assert!(last > 25.0, "sustained trend should score high ADX, got {last}");
    }

    #[test]
    fn test_sar_trend_follows_direction() {
        let rising: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let candles = candles_from_closes(&rising);
        let trend = parabolic_sar_trend(&candles, 0.02, 0.2);
        assert_eq!(trend[0], None);
        assert_eq!(trend[19], Some(Trend::Up));

        let falling: Vec<f64> = (0..20).map(|i| 120.0 - i as f64).collect();
        let candles = candles_from_closes(&falling);
        let trend = parabolic_sar_trend(&candles, 0.02, 0.2);
        assert_eq!(trend[19], Some(Trend::Down));
    }

    #[test]
    fn test_macd_signal_lags_line() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let (line, signal) = macd(&closes, 6, 12, 9);
        assert_eq!(line[10], None);
        assert!(line[11].is_some());
        // signal needs 9 defined MACD values
        assert_eq!(signal[18], None);
        assert!(signal[19].is_some());
    }

    #[test]
    fn test_frame_row_none_during_warmup() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.4).sin() * 2.0).collect();
        let candles = candles_from_closes(&closes);
        let frame = IndicatorFrame::compute(&IndicatorConfig::default(), &candles).unwrap();

        assert_eq!(frame.len(), 30);
        assert!(frame.row(0).is_none());
        assert!(frame.row(10).is_none());
        let row = frame.row(29).expect("last row should be fully defined");
        assert!((0.0..=100.0).contains(&row.rsi));
        assert!((0.0..=100.0).contains(&row.stoch_k));
        assert!(row.bb_upper >= row.bb_lower);
    }

    #[test]
    fn test_mean_atr_ignores_warmup() {
        let candles = candles_from_closes(&vec![100.0; 12]);
        let frame = IndicatorFrame::compute(&IndicatorConfig::default(), &candles).unwrap();
        assert_eq!(frame.mean_atr(), Some(1.0));
    }
}
