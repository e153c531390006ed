//! Engine configuration: indicator windows, scoring thresholds and weights.
//!
//! Every threshold and window the engine consults is a named field here,
//! serde-loadable for tuning and backtesting. Defaults are the values tuned
//! for 1-minute candles.
//!
//! # Example
//!
//! ```rust
//! use candlesig::config::SignalConfig;
//!
//! let mut config = SignalConfig::default();
//! config.scoring.min_strength_pct = 40.0;
//! config.validate().unwrap();
//! ```

use crate::{Period, Result, SignalError};

// ============================================================
// INDICATOR CONFIG
// ============================================================

/// Windows and parameters for the indicator engine. All rolling computations
/// look strictly backward; warm-up rows are undefined, never zero.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// ATR window (rolling mean of true range)
    pub atr_window: Period,
    /// ADX window (Wilder smoothing)
    pub adx_window: Period,
    /// Fast trend EMA window
    pub ema_fast: Period,
    /// Slow trend EMA window
    pub ema_slow: Period,
    /// Wilder RSI window
    pub rsi_window: Period,
    /// StochRSI rolling min/max window over the RSI series
    pub stoch_window: Period,
    /// Bollinger band window
    pub bollinger_window: Period,
    /// Bollinger band stddev multiplier
    pub bollinger_mult: f64,
    /// MACD fast EMA window
    pub macd_fast: Period,
    /// MACD slow EMA window
    pub macd_slow: Period,
    /// MACD signal-line EMA window
    pub macd_signal: Period,
    /// Parabolic SAR acceleration step
    pub sar_step: f64,
    /// Parabolic SAR maximum acceleration
    pub sar_max: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            atr_window: Period::new_const(5),
            adx_window: Period::new_const(5),
            ema_fast: Period::new_const(3),
            ema_slow: Period::new_const(5),
            rsi_window: Period::new_const(5),
            stoch_window: Period::new_const(14),
            bollinger_window: Period::new_const(5),
            bollinger_mult: 1.5,
            macd_fast: Period::new_const(6),
            macd_slow: Period::new_const(12),
            macd_signal: Period::new_const(9),
            sar_step: 0.02,
            sar_max: 0.2,
        }
    }
}

impl IndicatorConfig {
    /// Minimum series length for every indicator column to be defined on the
    /// last row, plus two candles of slack for cross/divergence lookbacks.
    pub fn required_history(&self) -> usize {
        let atr = self.atr_window.get() + 1;
        let adx = 2 * self.adx_window.get();
        let stoch = self.rsi_window.get() + self.stoch_window.get();
        let macd = self.macd_slow.get() + self.macd_signal.get() - 1;
        let boll = self.bollinger_window.get();
        let ema = self.ema_slow.get();

        atr.max(adx).max(stoch).max(macd).max(boll).max(ema) + 2
    }

    pub fn validate(&self) -> Result<()> {
        if self.ema_fast >= self.ema_slow {
            return Err(SignalError::InvalidConfig(format!(
                "ema_fast ({}) must be shorter than ema_slow ({})",
                self.ema_fast.get(),
                self.ema_slow.get()
            )));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(SignalError::InvalidConfig(format!(
                "macd_fast ({}) must be shorter than macd_slow ({})",
                self.macd_fast.get(),
                self.macd_slow.get()
            )));
        }
        if !self.bollinger_mult.is_finite() || self.bollinger_mult <= 0.0 {
            return Err(SignalError::InvalidConfig(
                "bollinger_mult must be a positive finite number".into(),
            ));
        }
        if !self.sar_step.is_finite() || self.sar_step <= 0.0 {
            return Err(SignalError::InvalidConfig(
                "sar_step must be a positive finite number".into(),
            ));
        }
        if !self.sar_max.is_finite() || self.sar_max < self.sar_step {
            return Err(SignalError::InvalidConfig(
                "sar_max must be finite and >= sar_step".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================
// SCORING CONFIG
// ============================================================

/// Thresholds and weights for the signal engine.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// ADX value above which the trend-strength confirmation holds
    pub adx_threshold: f64,
    /// ATR confirmation threshold as a factor of the series mean ATR
    pub atr_threshold_factor: f64,
    /// Scale for the MACD-minus-signal contribution: a gap of this size
    /// maps to a full 1.0 contribution
    pub macd_scale: f64,
    /// StochRSI %K oversold bound (bull extreme zone)
    pub stoch_oversold: f64,
    /// StochRSI %K overbought bound (bear extreme zone)
    pub stoch_overbought: f64,
    /// Bonus weight per matched directional pattern on the last candle
    pub pattern_weight: f64,
    /// Ceiling for the summed pattern bonus
    pub pattern_bonus_cap: f64,
    /// Bonus added to the side the trend filter agrees with
    pub trend_bonus: f64,
    /// Multipliers applied to a side's base total: (trend-aligned, opposed)
    pub trend_multipliers: (f64, f64),
    /// Minimum strength percent below which the continuous policy emits
    /// `SignalDirection::None`
    pub min_strength_pct: f64,
    /// Theoretical ceiling of base + pattern + trend contributions. A fixed
    /// constant of the weight choice, not re-derived per call: with defaults,
    /// 5 base terms + 1.0 pattern cap + 0.2 trend bonus = 6.2.
    pub max_total: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            adx_threshold: 20.0,
            atr_threshold_factor: 0.5,
            macd_scale: 0.5,
            stoch_oversold: 20.0,
            stoch_overbought: 80.0,
            pattern_weight: 0.25,
            pattern_bonus_cap: 1.0,
            trend_bonus: 0.2,
            trend_multipliers: (1.0, 0.5),
            min_strength_pct: 30.0,
            max_total: 6.2,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        let positive_finite: [(&str, f64); 5] = [
            ("adx_threshold", self.adx_threshold),
            ("atr_threshold_factor", self.atr_threshold_factor),
            ("macd_scale", self.macd_scale),
            ("pattern_bonus_cap", self.pattern_bonus_cap),
            ("max_total", self.max_total),
        ];
        for (name, value) in positive_finite {
            if !value.is_finite() || value <= 0.0 {
                return Err(SignalError::InvalidConfig(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        if !self.pattern_weight.is_finite() || self.pattern_weight < 0.0 {
            return Err(SignalError::InvalidConfig(
                "pattern_weight must be finite and >= 0".into(),
            ));
        }
        if !self.trend_bonus.is_finite() || self.trend_bonus < 0.0 {
            return Err(SignalError::InvalidConfig(
                "trend_bonus must be finite and >= 0".into(),
            ));
        }
        let (aligned, opposed) = self.trend_multipliers;
        if !aligned.is_finite() || !opposed.is_finite() || aligned <= 0.0 || opposed <= 0.0 {
            return Err(SignalError::InvalidConfig(
                "trend_multipliers must both be positive finite numbers".into(),
            ));
        }
        if opposed > aligned {
            return Err(SignalError::InvalidConfig(
                "opposed trend multiplier must not exceed the aligned one".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.min_strength_pct) {
            return Err(SignalError::OutOfRange {
                field: "min_strength_pct",
                value: self.min_strength_pct,
                min: 0.0,
                max: 100.0,
            });
        }
        if !(0.0..=100.0).contains(&self.stoch_oversold)
            || !(0.0..=100.0).contains(&self.stoch_overbought)
            || self.stoch_oversold >= self.stoch_overbought
        {
            return Err(SignalError::InvalidConfig(
                "stoch_oversold must be below stoch_overbought, both within 0..=100".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================
// POLICY + TOP-LEVEL CONFIG
// ============================================================

/// Which scoring strategy the signal engine runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Contribution-sum scoring with trend multipliers and pattern bonuses.
    #[default]
    Continuous,
    /// Confirmation-count scoring with an RSI-side fallback.
    Discrete,
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub indicators: IndicatorConfig,
    pub scoring: ScoringConfig,
    pub policy: ScoringPolicy,
}

impl SignalConfig {
    pub fn validate(&self) -> Result<()> {
        self.indicators.validate()?;
        self.scoring.validate()
    }

    /// Metadata for the scoring tunables, for grid-search tuning.
    pub fn tunables() -> &'static [ParamMeta] {
        const TUNABLES: &[ParamMeta] = &[
            ParamMeta::new("adx_threshold", 20.0, (10.0, 40.0, 5.0), "ADX trend-strength gate"),
            ParamMeta::new(
                "atr_threshold_factor",
                0.5,
                (0.25, 1.0, 0.25),
                "ATR gate as factor of mean ATR",
            ),
            ParamMeta::new("macd_scale", 0.5, (0.25, 1.0, 0.25), "MACD gap to full contribution"),
            ParamMeta::new("pattern_weight", 0.25, (0.1, 0.5, 0.05), "Bonus per matched pattern"),
            ParamMeta::new("trend_bonus", 0.2, (0.0, 0.5, 0.1), "Bonus for trend agreement"),
            ParamMeta::new(
                "min_strength_pct",
                30.0,
                (10.0, 60.0, 10.0),
                "Minimum strength gate (percent)",
            ),
        ];
        TUNABLES
    }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

/// Metadata for a single scoring tunable: name, default, and grid-search
/// range `(min, max, step)`.
#[derive(Debug, Clone)]
pub struct ParamMeta {
    pub name: &'static str,
    pub default: f64,
    pub range: (f64, f64, f64),
    pub description: &'static str,
}

impl ParamMeta {
    pub const fn new(
        name: &'static str,
        default: f64,
        range: (f64, f64, f64),
        description: &'static str,
    ) -> Self {
        Self {
            name,
            default,
            range,
            description,
        }
    }

    /// Generate all values for grid search
    pub fn generate_grid(&self) -> Vec<f64> {
        let (min, max, step) = self.range;
        let mut values = Vec::new();
        let mut v = min;
        while v <= max + f64::EPSILON {
            values.push(v);
            v += step;
        }
        values
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SignalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_required_history_defaults() {
        let cfg = IndicatorConfig::default();
        // MACD (12 + 9 - 1 = 20) is the longest warm-up with defaults
        assert_eq!(cfg.required_history(), 22);
    }

    #[test]
    fn test_ema_order_enforced() {
        let mut cfg = IndicatorConfig::default();
        cfg.ema_fast = Period::new_const(8);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_macd_order_enforced() {
        let mut cfg = IndicatorConfig::default();
        cfg.macd_fast = Period::new_const(12);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_trend_multipliers_validated() {
        let mut cfg = ScoringConfig::default();
        cfg.trend_multipliers = (0.5, 1.0);
        assert!(cfg.validate().is_err());

        cfg.trend_multipliers = (1.0, 0.0);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_min_strength_bounds() {
        let mut cfg = ScoringConfig::default();
        cfg.min_strength_pct = 101.0;
        assert!(cfg.validate().is_err());
        cfg.min_strength_pct = -1.0;
        assert!(cfg.validate().is_err());
        cfg.min_strength_pct = 0.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = SignalConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SignalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_invalid_period_rejected_on_load() {
        let err = serde_json::from_str::<SignalConfig>(r#"{"indicators":{"rsi_window":0}}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_generate_grid() {
        let meta = ParamMeta::new("test", 0.5, (0.3, 0.7, 0.2), "Test");
        let grid = meta.generate_grid();
        assert_eq!(grid.len(), 3);
        assert!((grid[0] - 0.3).abs() < f64::EPSILON);
        assert!((grid[2] - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_tunables_cover_scoring_weights() {
        let names: Vec<_> = SignalConfig::tunables().iter().map(|p| p.name).collect();
        assert!(names.contains(&"adx_threshold"));
        assert!(names.contains(&"min_strength_pct"));
    }

    #[test]
    fn test_tunables_slice_is_static() {
        let first = SignalConfig::tunables();
        let second = SignalConfig::tunables();
        assert!(std::ptr::eq(first.as_ptr(), second.as_ptr()));
        assert_eq!(first.len(), 6);
    }
}
