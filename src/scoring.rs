//! Signal scoring: turns the indicator frame and the matched patterns at
//! the most recent closed candle into a directional signal with a strength
//! percentage and an audit trail of reasons.
//!
//! Two policies are implemented. The continuous policy sums bounded
//! contribution terms per side and is the default; the discrete policy
//! counts hard confirmations against fixed thresholds.

use crate::config::{ScoringConfig, ScoringPolicy, SignalConfig};
use crate::indicators::{IndicatorFrame, IndicatorRow};
use crate::{Direction, OHLCV, PatternMatch, Signal, SignalDirection, Trend};

// ============================================================
// REASON LABELS
// ============================================================

const EMA_BULL_CROSS: &str = "EMA Bullish Cross";
const EMA_BEAR_CROSS: &str = "EMA Bearish Cross";
const RSI_LOW: &str = "RSI < 50";
const RSI_HIGH: &str = "RSI > 50";
const STOCH_OVERSOLD: &str = "StochRSI Oversold";
const STOCH_OVERBOUGHT: &str = "StochRSI Overbought";
const MACD_BULL_CROSS: &str = "MACD Bullish Cross";
const MACD_BEAR_CROSS: &str = "MACD Bearish Cross";
const VOLATILITY_OK: &str = "Volatility Confirmed";
const BREAKOUT_DOWN: &str = "Bollinger Breakout Down";
const BREAKOUT_UP: &str = "Bollinger Breakout Up";
const DIVERGENCE_BULL: &str = "Bullish Divergence";
const DIVERGENCE_BEAR: &str = "Bearish Divergence";
const BELOW_GATE: &str = "Below Minimum Strength";
const STRONG_LABEL: &str = "STRONG";
const WEAK_LABEL: &str = "WEAK";

// ============================================================
// ENTRY POINT
// ============================================================

/// Score the last candle of the series. `grouped` is the per-candle pattern
/// match table from the scan stage.
pub(crate) fn score<T: OHLCV>(
    config: &SignalConfig,
    candles: &[T],
    frame: &IndicatorFrame,
    grouped: &[Vec<PatternMatch>],
) -> Signal {
    let Some(last) = candles.len().checked_sub(1) else {
        return no_signal();
    };
    let Some(row) = frame.row(last) else {
        return no_signal();
    };

    let empty: Vec<PatternMatch> = Vec::new();
    let matches = grouped.get(last).unwrap_or(&empty);

    let close = candles[last].close();
    let ema_cross = ema_cross_at(frame, last);
    let divergence = divergence_at(candles, frame, last);

    match config.policy {
        ScoringPolicy::Continuous => continuous(
            &config.scoring,
            close,
            &row,
            frame.mean_atr(),
            matches,
            ema_cross,
            divergence,
        ),
        ScoringPolicy::Discrete => discrete(
            &config.scoring,
            close,
            &row,
            frame.mean_atr(),
            matches,
            ema_cross,
            divergence,
        ),
    }
}

fn no_signal() -> Signal {
    Signal {
        direction: SignalDirection::None,
        strength: 0.0,
        reasons: Vec::new(),
    }
}

// ============================================================
// SHARED OBSERVATIONS
// ============================================================

/// EMA fast/slow cross completed on the last candle, if both rows are
/// defined there and on the candle before.
fn ema_cross_at(frame: &IndicatorFrame, index: usize) -> Option<SignalDirection> {
    if index == 0 {
        return None;
    }
    let fast_prev = (*frame.ema_fast.get(index - 1)?)?;
    let slow_prev = (*frame.ema_slow.get(index - 1)?)?;
    let fast = (*frame.ema_fast.get(index)?)?;
    let slow = (*frame.ema_slow.get(index)?)?;

    if fast_prev <= slow_prev && fast > slow {
        Some(SignalDirection::Buy)
    } else if fast_prev >= slow_prev && fast < slow {
        Some(SignalDirection::Sell)
    } else {
        None
    }
}

/// Price/MACD disagreement over the last step. Informational only.
fn divergence_at<T: OHLCV>(
    candles: &[T],
    frame: &IndicatorFrame,
    index: usize,
) -> Option<&'static str> {
    if index == 0 {
        return None;
    }
    let macd_prev = (*frame.macd.get(index - 1)?)?;
    let macd = (*frame.macd.get(index)?)?;
    let close_delta = candles[index].close() - candles[index - 1].close();
    let macd_delta = macd - macd_prev;

    if close_delta < 0.0 && macd_delta > 0.0 {
        Some(DIVERGENCE_BULL)
    } else if close_delta > 0.0 && macd_delta < 0.0 {
        Some(DIVERGENCE_BEAR)
    } else {
        None
    }
}

/// Clamp a contribution term into [0, 1]; NaN and infinities fall to zero.
fn term(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn pattern_labels(matches: &[PatternMatch], direction: Direction) -> Vec<&'static str> {
    matches
        .iter()
        .filter(|m| m.direction == direction)
        .map(|m| m.label())
        .collect()
}

// ============================================================
// CONTINUOUS POLICY
// ============================================================

/// Mean-reversion contribution sums. The buy side accumulates oversold
/// evidence, the sell side overbought evidence; the trend filter scales
/// each side before pattern and trend bonuses are added on top.
#[allow(clippy::too_many_arguments)]
fn continuous(
    cfg: &ScoringConfig,
    close: f64,
    row: &IndicatorRow,
    mean_atr: Option<f64>,
    matches: &[PatternMatch],
    ema_cross: Option<SignalDirection>,
    divergence: Option<&'static str>,
) -> Signal {
    // base terms, one value per side
    let rsi_bull = term((50.0 - row.rsi) / 50.0);
    let rsi_bear = term((row.rsi - 50.0) / 50.0);

    let stoch_bull = term((cfg.stoch_oversold - row.stoch_k) / cfg.stoch_oversold);
    let stoch_bear = term((row.stoch_k - cfg.stoch_overbought) / (100.0 - cfg.stoch_overbought));

    let macd_gap = row.macd - row.macd_signal;
    let macd_bull = term(macd_gap / cfg.macd_scale);
    let macd_bear = term(-macd_gap / cfg.macd_scale);

    // shared volatility/trend-strength term, mean of the two threshold ratios
    let vol = match mean_atr {
        Some(mean) if mean > 0.0 => {
            let atr_ratio = row.atr / (cfg.atr_threshold_factor * mean);
            let adx_ratio = row.adx / cfg.adx_threshold;
            term((atr_ratio + adx_ratio) / 2.0)
        }
        _ => 0.0,
    };
    let vol_confirmed = mean_atr
        .map(|mean| row.atr > cfg.atr_threshold_factor * mean && row.adx > cfg.adx_threshold)
        .unwrap_or(false);

    let breakout_down = close < row.bb_lower;
    let breakout_up = close > row.bb_upper;

    let base_bull =
        rsi_bull + stoch_bull + macd_bull + vol + if breakout_down { 1.0 } else { 0.0 };
    let base_bear =
        rsi_bear + stoch_bear + macd_bear + vol + if breakout_up { 1.0 } else { 0.0 };

    let (aligned, opposed) = cfg.trend_multipliers;
    let (bull_mult, bear_mult) = match row.trend {
        Trend::Up => (aligned, opposed),
        Trend::Down => (opposed, aligned),
    };

    let bull_patterns = pattern_labels(matches, Direction::Bullish);
    let bear_patterns = pattern_labels(matches, Direction::Bearish);
    let bull_bonus = (bull_patterns.len() as f64 * cfg.pattern_weight).min(cfg.pattern_bonus_cap);
    let bear_bonus = (bear_patterns.len() as f64 * cfg.pattern_weight).min(cfg.pattern_bonus_cap);

    let mut bull_total = base_bull * bull_mult + bull_bonus;
    let mut bear_total = base_bear * bear_mult + bear_bonus;
    match row.trend {
        Trend::Up => bull_total += cfg.trend_bonus,
        Trend::Down => bear_total += cfg.trend_bonus,
    }

    let buy = if bull_total != bear_total {
        bull_total > bear_total
    } else {
        // dead tie, fall back to the RSI side
        row.rsi < 50.0
    };
    let total = if buy { bull_total } else { bear_total };
    let strength = (total / cfg.max_total * 100.0).clamp(0.0, 100.0);

    if strength < cfg.min_strength_pct {
        return Signal {
            direction: SignalDirection::None,
            strength,
            reasons: vec![BELOW_GATE],
        };
    }

    let mut reasons = Vec::new();
    reasons.extend(if buy { &bull_patterns } else { &bear_patterns });
    match (buy, ema_cross) {
        (true, Some(SignalDirection::Buy)) => reasons.push(EMA_BULL_CROSS),
        (false, Some(SignalDirection::Sell)) => reasons.push(EMA_BEAR_CROSS),
        _ => {}
    }
    if buy {
        if row.rsi < 50.0 {
            reasons.push(RSI_LOW);
        }
        if row.stoch_k < cfg.stoch_oversold {
            reasons.push(STOCH_OVERSOLD);
        }
        if macd_gap > 0.0 {
            reasons.push(MACD_BULL_CROSS);
        }
    } else {
        if row.rsi > 50.0 {
            reasons.push(RSI_HIGH);
        }
        if row.stoch_k > cfg.stoch_overbought {
            reasons.push(STOCH_OVERBOUGHT);
        }
        if macd_gap < 0.0 {
            reasons.push(MACD_BEAR_CROSS);
        }
    }
    if vol_confirmed {
        reasons.push(VOLATILITY_OK);
    }
    if buy && breakout_down {
        reasons.push(BREAKOUT_DOWN);
    }
    if !buy && breakout_up {
        reasons.push(BREAKOUT_UP);
    }
    if let Some(note) = divergence {
        reasons.push(note);
    }
    reasons.extend(pattern_labels(matches, Direction::Neutral));

    Signal {
        direction: if buy {
            SignalDirection::Buy
        } else {
            SignalDirection::Sell
        },
        strength,
        reasons,
    }
}

// ============================================================
// DISCRETE POLICY
// ============================================================

/// Patterns strong enough to open a signal on their own.
const PRIMARY_IDS: [&str; 8] = [
    "ENGULFING",
    "HAMMER",
    "SHOOTING_STAR",
    "THREE_WHITE_SOLDIERS",
    "THREE_BLACK_CROWS",
    "MORNING_STAR",
    "EVENING_STAR",
    "MARUBOZU",
];

/// Confirmation counting: a primary pattern or an EMA cross opens the
/// signal, four hard checks confirm it, and a band breakout adds one bonus
/// point. No primary and no cross falls back to the RSI side at half
/// strength.
#[allow(clippy::too_many_arguments)]
fn discrete(
    cfg: &ScoringConfig,
    close: f64,
    row: &IndicatorRow,
    mean_atr: Option<f64>,
    matches: &[PatternMatch],
    ema_cross: Option<SignalDirection>,
    divergence: Option<&'static str>,
) -> Signal {
    let primary_of = |direction: Direction| -> Vec<&'static str> {
        matches
            .iter()
            .filter(|m| m.direction == direction && PRIMARY_IDS.contains(&m.pattern_id.0))
            .map(|m| m.label())
            .collect()
    };
    let bull_primary = primary_of(Direction::Bullish);
    let bear_primary = primary_of(Direction::Bearish);

    let mut reasons: Vec<&'static str> = Vec::new();
    let buy = if bull_primary.len() != bear_primary.len() {
        let buy = bull_primary.len() > bear_primary.len();
        reasons.extend(if buy { &bull_primary } else { &bear_primary });
        buy
    } else if !bull_primary.is_empty() {
        // conflicting primaries, fall back to the RSI side
        let buy = row.rsi < 50.0;
        reasons.extend(if buy { &bull_primary } else { &bear_primary });
        buy
    } else {
        match ema_cross {
            Some(SignalDirection::Buy) => {
                reasons.push(EMA_BULL_CROSS);
                true
            }
            Some(SignalDirection::Sell) => {
                reasons.push(EMA_BEAR_CROSS);
                false
            }
            _ => {
                // no primary evidence at all
                let buy = row.rsi < 50.0;
                let mut reasons = vec![if buy { RSI_LOW } else { RSI_HIGH }];
                if let Some(note) = divergence {
                    reasons.push(note);
                }
                return Signal {
                    direction: if buy {
                        SignalDirection::Buy
                    } else {
                        SignalDirection::Sell
                    },
                    strength: 50.0,
                    reasons,
                };
            }
        }
    };

    let mut confirmations = 0.0;
    if buy && row.rsi < 50.0 {
        confirmations += 1.0;
        reasons.push(RSI_LOW);
    }
    if !buy && row.rsi > 50.0 {
        confirmations += 1.0;
        reasons.push(RSI_HIGH);
    }
    if buy && row.stoch_k < cfg.stoch_oversold {
        confirmations += 1.0;
        reasons.push(STOCH_OVERSOLD);
    }
    if !buy && row.stoch_k > cfg.stoch_overbought {
        confirmations += 1.0;
        reasons.push(STOCH_OVERBOUGHT);
    }
    let macd_gap = row.macd - row.macd_signal;
    if buy && macd_gap > 0.0 {
        confirmations += 1.0;
        reasons.push(MACD_BULL_CROSS);
    }
    if !buy && macd_gap < 0.0 {
        confirmations += 1.0;
        reasons.push(MACD_BEAR_CROSS);
    }
    if let Some(mean) = mean_atr {
        if row.atr > cfg.atr_threshold_factor * mean && row.adx > cfg.adx_threshold {
            confirmations += 1.0;
            reasons.push(VOLATILITY_OK);
        }
    }

    let breakout = (buy && close < row.bb_lower) || (!buy && close > row.bb_upper);
    if breakout {
        reasons.push(if buy { BREAKOUT_DOWN } else { BREAKOUT_UP });
    }
    reasons.push(if confirmations >= 3.0 || breakout {
        STRONG_LABEL
    } else {
        WEAK_LABEL
    });

    if let Some(note) = divergence {
        reasons.push(note);
    }
    reasons.extend(pattern_labels(matches, Direction::Neutral));

    // four hard checks, plus the band breakout as a fifth when it fires
    let (total, max_possible) = if breakout {
        (confirmations + 1.0, 5.0)
    } else {
        (confirmations, 4.0)
    };
    let strength = total / max_possible * 100.0;

    Signal {
        direction: if buy {
            SignalDirection::Buy
        } else {
            SignalDirection::Sell
        },
        strength,
        reasons,
    }
}

// ============================================================
// TESTS
// ============================================================
