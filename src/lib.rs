//! # candlesig - Candlestick Signal Engine
//!
//! Deterministic signal generation for 1-minute OHLC candle series: rolling
//! technical indicators, candlestick pattern detection, and a confidence-scored
//! trade signal with a human-readable reason trail.
//!
//! ## Quick Start
//!
//! ```rust
//! use candlesig::prelude::*;
//!
//! // A stretch of 60-second candles (ascending, most recent last, closed).
//! let candles: Vec<Candle> = (0..60i64)
//!     .map(|i| {
//!         let base = 100.0 + i as f64 * 0.1;
//!         Candle::new(i * 60, base, base + 0.3, base - 0.3, base + 0.1)
//!     })
//!     .collect();
//!
//! let engine = EngineBuilder::new()
//!     .with_all_defaults()
//!     .build()
//!     .unwrap();
//!
//! let eval = engine.evaluate(&candles).unwrap();
//! println!("{} ({:.1}%): {}", eval.signal.direction, eval.signal.strength, eval.signal.reason());
//! ```
//!
//! The engine is a pure function of its input: no I/O, no clocks, no shared
//! state. Callers own scheduling, order execution, and stake management.

pub mod config;
pub mod detectors;
pub mod indicators;

mod scoring;

pub mod prelude {
    pub use crate::{
        config::{IndicatorConfig, ParamMeta, ScoringConfig, ScoringPolicy, SignalConfig},
        detectors::*,
        drop_open_candle, evaluate_parallel,
        indicators::{IndicatorFrame, IndicatorRow},
        BuiltinDetector, Candle, Direction, DynPatternDetector, EngineBuilder, Evaluation,
        InstrumentError, InstrumentSignal, OHLCVExt, PatternDetector, PatternId, PatternMatch,
        Period, Ratio, Result, Signal, SignalDirection, SignalEngine, SignalError, Trend, OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, SignalError>;

/// Errors that can occur during signal evaluation
#[derive(Debug, Clone, thiserror::Error)]
pub enum SignalError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Insufficient history: need {need} closed candles, got {got}")]
    InsufficientHistory { need: usize, got: usize },

    #[error("Invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(SignalError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(SignalError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Window length in candles (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(SignalError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLC data trait. Volume and timestamp are optional: the upstream
/// candle feed may omit both.
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    fn volume(&self) -> Option<f64> {
        None
    }

    /// Unix timestamp (seconds) of the candle's open, if known.
    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Blanket impl for references to dyn OHLCV
impl OHLCV for &dyn OHLCV {
    fn open(&self) -> f64 {
        (*self).open()
    }

    fn high(&self) -> f64 {
        (*self).high()
    }

    fn low(&self) -> f64 {
        (*self).low()
    }

    fn close(&self) -> f64 {
        (*self).close()
    }

    fn volume(&self) -> Option<f64> {
        (*self).volume()
    }

    fn timestamp(&self) -> Option<i64> {
        (*self).timestamp()
    }
}

/// Extension trait with computed properties for OHLC data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_wick(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_wick(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    #[inline]
    fn body_top(&self) -> f64 {
        self.open().max(self.close())
    }

    #[inline]
    fn body_bottom(&self) -> f64 {
        self.open().min(self.close())
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Body as ratio of range. Returns None if range is 0
    #[inline]
    fn body_ratio(&self) -> Option<f64> {
        let range = self.range();
        (range > f64::EPSILON).then(|| self.body() / range)
    }

    /// Validate OHLC consistency: `high >= max(open, close)`,
    /// `low <= min(open, close)`, all values finite.
    fn validate(&self) -> Result<()> {
        if self.open().is_nan()
            || self.high().is_nan()
            || self.low().is_nan()
            || self.close().is_nan()
        {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if self.open().is_infinite()
            || self.high().is_infinite()
            || self.low().is_infinite()
            || self.close().is_infinite()
        {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "infinite value in OHLC",
            });
        }
        if self.high() < self.open().max(self.close()) {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "high below body",
            });
        }
        if self.low() > self.open().min(self.close()) {
            return Err(SignalError::InvalidCandle {
                index: 0,
                reason: "low above body",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Concrete serde-friendly candle record, for callers ingesting broker API
/// payloads directly.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }
}

impl OHLCV for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> Option<f64> {
        self.volume
    }

    fn timestamp(&self) -> Option<i64> {
        Some(self.time)
    }
}

/// Drop a trailing in-progress candle, if any. The signal engine requires the
/// last element to be a closed interval; feeds that include the accumulating
/// candle should be trimmed through this before evaluation.
pub fn drop_open_candle<T: OHLCV>(candles: &[T], now: i64, interval_secs: i64) -> &[T] {
    match candles.last().and_then(|c| c.timestamp()) {
        Some(ts) if ts + interval_secs > now => &candles[..candles.len() - 1],
        _ => candles,
    }
}

// ============================================================
// PATTERN MATCH - result of detection (Copy, no allocations)
// ============================================================

/// Unique identifier for a pattern type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternId(pub &'static str);

impl PatternId {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Direction/bias of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

/// Result of pattern detection - Copy, no allocations
#[derive(Debug, Clone, Copy)]
pub struct PatternMatch {
    pub pattern_id: PatternId,
    pub direction: Direction,
    pub start_index: usize,
    pub end_index: usize,
}

impl PatternMatch {
    /// Display label for the reason trail. Bidirectional patterns resolve to
    /// their directional name.
    pub fn label(&self) -> &'static str {
        match (self.pattern_id.0, self.direction) {
            ("MARUBOZU", Direction::Bullish) => "Bullish Marubozu",
            ("MARUBOZU", _) => "Bearish Marubozu",
            ("BELT_HOLD", Direction::Bullish) => "Bullish Belt Hold",
            ("BELT_HOLD", _) => "Bearish Belt Hold",
            ("ENGULFING", Direction::Bullish) => "Bullish Engulfing",
            ("ENGULFING", _) => "Bearish Engulfing",
            ("HARAMI", Direction::Bullish) => "Bullish Harami",
            ("HARAMI", _) => "Bearish Harami",
            ("KICKER", Direction::Bullish) => "Bullish Kicker",
            ("KICKER", _) => "Bearish Kicker",
            ("THREE_INSIDE", Direction::Bullish) => "Three Inside Up",
            ("THREE_INSIDE", _) => "Three Inside Down",
            ("ABANDONED_BABY", Direction::Bullish) => "Bullish Abandoned Baby",
            ("ABANDONED_BABY", _) => "Bearish Abandoned Baby",
            ("FAKEY", Direction::Bullish) => "Bullish Fakey",
            ("FAKEY", _) => "Bearish Fakey",
            ("RAILROAD_TRACKS", _) => "Railroad Tracks",
            ("HAMMER", _) => "Hammer",
            ("SHOOTING_STAR", _) => "Shooting Star",
            ("DOJI", _) => "Doji",
            ("SPINNING_TOP", _) => "Spinning Top",
            ("DRAGONFLY_DOJI", _) => "Dragonfly Doji",
            ("GRAVESTONE_DOJI", _) => "Gravestone Doji",
            ("HARAMI_CROSS", _) => "Harami Cross",
            ("PIERCING", _) => "Piercing Line",
            ("DARK_CLOUD_COVER", _) => "Dark Cloud Cover",
            ("TWEEZER_TOP", _) => "Tweezer Top",
            ("TWEEZER_BOTTOM", _) => "Tweezer Bottom",
            ("MORNING_STAR", _) => "Morning Star",
            ("EVENING_STAR", _) => "Evening Star",
            ("THREE_WHITE_SOLDIERS", _) => "Three White Soldiers",
            ("THREE_BLACK_CROWS", _) => "Three Black Crows",
            ("RISING_WEDGE", _) => "Rising Wedge",
            ("FALLING_WEDGE", _) => "Falling Wedge",
            (other, _) => other,
        }
    }
}

// ============================================================
// TREND FILTER
// ============================================================

/// Binary trend classification from the parabolic stop-and-reverse filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, Trend::Up)
    }

    #[inline]
    pub fn is_down(self) -> bool {
        matches!(self, Trend::Down)
    }
}

// ============================================================
// SIGNAL
// ============================================================

/// Trade direction emitted by the signal engine. `None` means no actionable
/// signal this cycle (strength below the configured gate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SignalDirection {
    Buy,
    Sell,
    None,
}

impl std::fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SignalDirection::Buy => "BUY",
            SignalDirection::Sell => "SELL",
            SignalDirection::None => "NONE",
        })
    }
}

/// Signal for the most recent closed candle.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Signal {
    pub direction: SignalDirection,
    /// Confidence in percent, 0.0..=100.0
    pub strength: f64,
    /// Triggered pattern/condition labels in stable audit order: primary
    /// patterns, EMA cross, confirmations, breakout, divergence note,
    /// secondary patterns.
    pub reasons: Vec<&'static str>,
}

impl Signal {
    pub fn reason(&self) -> String {
        self.reasons.join(", ")
    }
}

/// Full evaluation output: the signal plus the augmented candle table for
/// presentation-layer charting.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub signal: Signal,
    pub frame: indicators::IndicatorFrame,
    /// Pattern matches grouped by candle index.
    pub patterns: Vec<Vec<PatternMatch>>,
}

// ============================================================
// PATTERN DETECTOR TRAITS
// ============================================================

/// Generic pattern detector trait - for concrete types
pub trait PatternDetector: Send + Sync {
    fn id(&self) -> PatternId;
    fn min_candles(&self) -> usize;
    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

/// Object-safe pattern detector trait - for custom detectors
pub trait DynPatternDetector: Send + Sync {
    fn id(&self) -> PatternId;
    fn min_candles(&self) -> usize;
    fn detect(&self, candles: &[&dyn OHLCV], index: usize) -> Option<PatternMatch>;
    fn validate_config(&self) -> Result<()>;
}

impl<D: PatternDetector> DynPatternDetector for D {
    fn id(&self) -> PatternId {
        PatternDetector::id(self)
    }

    fn min_candles(&self) -> usize {
        PatternDetector::min_candles(self)
    }

    fn detect(&self, candles: &[&dyn OHLCV], index: usize) -> Option<PatternMatch> {
        PatternDetector::detect(self, candles, index)
    }

    fn validate_config(&self) -> Result<()> {
        PatternDetector::validate_config(self)
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate BuiltinDetector enum without boilerplate
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin detectors - fast path via enum dispatch
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            #[inline]
            pub fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
                match self {
                    $(Self::$variant(d) => PatternDetector::detect(d, candles, index)),*
                }
            }

            #[inline]
            pub fn id(&self) -> PatternId {
                match self {
                    $(Self::$variant(d) => PatternDetector::id(d)),*
                }
            }

            #[inline]
            pub fn min_candles(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::min_candles(d)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => PatternDetector::validate_config(d)),*
                }
            }
        }
    };
}

define_builtin_detectors! {
    // Single candle (8)
    Hammer(HammerDetector),
    ShootingStar(ShootingStarDetector),
    Doji(DojiDetector),
    SpinningTop(SpinningTopDetector),
    Marubozu(MarubozuDetector),
    DragonflyDoji(DragonflyDojiDetector),
    GravestoneDoji(GravestoneDojiDetector),
    BeltHold(BeltHoldDetector),

    // Two candle (10)
    Engulfing(EngulfingDetector),
    Harami(HaramiDetector),
    HaramiCross(HaramiCrossDetector),
    Piercing(PiercingDetector),
    DarkCloudCover(DarkCloudCoverDetector),
    TweezerTop(TweezerTopDetector),
    TweezerBottom(TweezerBottomDetector),
    RailroadTracks(RailroadTracksDetector),
    Kicker(KickerDetector),
    Fakey(FakeyDetector),

    // Three candle (6)
    MorningStar(MorningStarDetector),
    EveningStar(EveningStarDetector),
    ThreeWhiteSoldiers(ThreeWhiteSoldiersDetector),
    ThreeBlackCrows(ThreeBlackCrowsDetector),
    ThreeInside(ThreeInsideDetector),
    AbandonedBaby(AbandonedBabyDetector),

    // Five-candle trend shapes (2)
    RisingWedge(RisingWedgeDetector),
    FallingWedge(FallingWedgeDetector),
}

// ============================================================
// SIGNAL ENGINE
// ============================================================

use config::SignalConfig;

/// Main engine: indicator computation, pattern detection, and signal scoring
/// over an ascending closed-candle series.
pub struct SignalEngine {
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn DynPatternDetector>>,
    config: SignalConfig,
}

impl SignalEngine {
    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Minimum series length `evaluate` will accept.
    pub fn required_history(&self) -> usize {
        self.config.indicators.required_history()
    }

    // ===========================================
    // MID-LEVEL: Pattern scanning
    // ===========================================

    /// Detect patterns at a single candle index.
    pub fn scan_at<T: OHLCV>(&self, candles: &[T], index: usize) -> Vec<PatternMatch> {
        if self.custom.is_empty() {
            self.scan_at_internal(candles, &[], index)
        } else {
            let refs: Vec<&dyn OHLCV> = candles.iter().map(|c| c as &dyn OHLCV).collect();
            self.scan_at_internal(candles, &refs, index)
        }
    }

    /// Scan all candles and return matches grouped by candle index.
    pub fn scan_grouped<T: OHLCV>(&self, candles: &[T]) -> Vec<Vec<PatternMatch>> {
        let mut grouped = vec![Vec::new(); candles.len()];

        if self.custom.is_empty() {
            for (i, slot) in grouped.iter_mut().enumerate() {
                *slot = self.scan_at_internal(candles, &[], i);
            }
        } else {
            let refs: Vec<&dyn OHLCV> = candles.iter().map(|c| c as &dyn OHLCV).collect();
            for (i, slot) in grouped.iter_mut().enumerate() {
                *slot = self.scan_at_internal(candles, &refs, i);
            }
        }

        grouped
    }

    // ===========================================
    // HIGH-LEVEL: Full evaluation
    // ===========================================

    /// Run the full pipeline: validate candles, compute indicators, detect
    /// patterns, and score the most recent closed candle.
    ///
    /// The last element of `candles` must be a closed interval; trim an
    /// accumulating candle first (see [`drop_open_candle`]).
    pub fn evaluate<T: OHLCV>(&self, candles: &[T]) -> Result<Evaluation> {
        self.validate_candles(candles)?;

        let need = self.required_history();
        if candles.len() < need {
            return Err(SignalError::InsufficientHistory {
                need,
                got: candles.len(),
            });
        }

        let frame = indicators::IndicatorFrame::compute(&self.config.indicators, candles)?;
        let patterns = self.scan_grouped(candles);
        let signal = scoring::score(&self.config, candles, &frame, &patterns);

        Ok(Evaluation {
            signal,
            frame,
            patterns,
        })
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn scan_at_internal<T: OHLCV>(
        &self,
        candles: &[T],
        refs: &[&dyn OHLCV],
        index: usize,
    ) -> Vec<PatternMatch> {
        let mut results = Vec::new();

        // Fast path: builtin detectors (enum dispatch, no vtable)
        for detector in &self.builtin {
            if index + 1 >= detector.min_candles() {
                if let Some(m) = detector.detect(candles, index) {
                    results.push(m);
                }
            }
        }

        // Slow path: custom detectors (vtable)
        if !self.custom.is_empty() && !refs.is_empty() {
            for detector in &self.custom {
                if index + 1 >= detector.min_candles() {
                    if let Some(m) = detector.detect(refs, index) {
                        results.push(m);
                    }
                }
            }
        }

        results
    }

    fn validate_candles<T: OHLCV>(&self, candles: &[T]) -> Result<()> {
        for (i, candle) in candles.iter().enumerate() {
            candle.validate().map_err(|e| match e {
                SignalError::InvalidCandle { reason, .. } => {
                    SignalError::InvalidCandle { index: i, reason }
                }
                other => other,
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        for d in &self.builtin {
            d.validate_config()?;
        }
        for d in &self.custom {
            d.validate_config()?;
        }
        Ok(())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating SignalEngine instances
pub struct EngineBuilder {
    config: SignalConfig,
    builtin: Vec<BuiltinDetector>,
    custom: Vec<Box<dyn DynPatternDetector>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate an array of `BuiltinDetector` variants using `Default::default()` for each inner type.
macro_rules! builtin_defaults {
  ($($variant:ident),* $(,)?) => {
    [$(BuiltinDetector::$variant(Default::default())),*]
  };
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: SignalConfig::default(),
            builtin: Vec::new(),
            custom: Vec::new(),
        }
    }

    /// Add all builtin patterns with default tolerances
    pub fn with_all_defaults(self) -> Self {
        self.with_single_candle_defaults()
            .with_two_candle_defaults()
            .with_three_candle_defaults()
            .with_shape_defaults()
    }

    /// Add only single-candle patterns with defaults (8)
    pub fn with_single_candle_defaults(mut self) -> Self {
        self.builtin.extend(builtin_defaults![
            Hammer,
            ShootingStar,
            Doji,
            SpinningTop,
            Marubozu,
            DragonflyDoji,
            GravestoneDoji,
            BeltHold,
        ]);
        self
    }

    /// Add two-candle patterns with defaults (10)
    pub fn with_two_candle_defaults(mut self) -> Self {
        self.builtin.extend(builtin_defaults![
            Engulfing,
            Harami,
            HaramiCross,
            Piercing,
            DarkCloudCover,
            TweezerTop,
            TweezerBottom,
            RailroadTracks,
            Kicker,
            Fakey,
        ]);
        self
    }

    /// Add three-candle patterns with defaults (6)
    pub fn with_three_candle_defaults(mut self) -> Self {
        self.builtin.extend(builtin_defaults![
            MorningStar,
            EveningStar,
            ThreeWhiteSoldiers,
            ThreeBlackCrows,
            ThreeInside,
            AbandonedBaby,
        ]);
        self
    }

    /// Add five-candle trend-shape patterns with defaults (2)
    pub fn with_shape_defaults(mut self) -> Self {
        self.builtin
            .extend(builtin_defaults![RisingWedge, FallingWedge]);
        self
    }

    /// Replace the full configuration
    pub fn config(mut self, config: SignalConfig) -> Self {
        self.config = config;
        self
    }

    /// Select the scoring policy
    pub fn policy(mut self, policy: config::ScoringPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Set the minimum-strength gate (percent) for the continuous policy
    pub fn min_strength_pct(mut self, pct: f64) -> Self {
        self.config.scoring.min_strength_pct = pct;
        self
    }

    /// Add a builtin detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: BuiltinDetector) -> Self {
        self.builtin.push(detector);
        self
    }

    /// Add a custom detector (slow path)
    pub fn add_custom<D: DynPatternDetector + 'static>(mut self, detector: D) -> Self {
        self.custom.push(Box::new(detector));
        self
    }

    /// Build the engine, validating configuration
    pub fn build(self) -> Result<SignalEngine> {
        let engine = SignalEngine {
            builtin: self.builtin,
            custom: self.custom,
            config: self.config,
        };
        engine.validate()?;
        Ok(engine)
    }
}

// ============================================================
// PARALLEL EVALUATION
// ============================================================

use rayon::prelude::*;

/// Signal for a single instrument from a batch run
#[derive(Debug)]
pub struct InstrumentSignal {
    pub symbol: String,
    pub signal: Signal,
}

/// Error from evaluating a single instrument
#[derive(Debug)]
pub struct InstrumentError {
    pub symbol: String,
    pub error: SignalError,
}

/// Evaluate many instruments in parallel. Each series is independent, so a
/// failure on one symbol never affects the others.
pub fn evaluate_parallel<'a, T, I>(
    engine: &SignalEngine,
    instruments: I,
) -> (Vec<InstrumentSignal>, Vec<InstrumentError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, candles)| {
            engine
                .evaluate(candles)
                .map(|eval| InstrumentSignal {
                    symbol: symbol.to_string(),
                    signal: eval.signal,
                })
                .map_err(|error| InstrumentError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
