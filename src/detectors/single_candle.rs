//! Single-candle patterns.
//!
//! All thresholds are proportions of the candle's own high-low range, so
//! detection behaves identically across price scales.

use super::impl_with_defaults;
use crate::{Direction, OHLCV, OHLCVExt, PatternDetector, PatternId, PatternMatch, Ratio};

fn single_match(id: &'static str, direction: Direction, index: usize) -> Option<PatternMatch> {
    Some(PatternMatch {
        pattern_id: PatternId(id),
        direction,
        start_index: index,
        end_index: index,
    })
}

// ============================================================
// HAMMER / SHOOTING STAR
// ============================================================

/// Bullish rejection candle: long lower shadow, small body near the top.
#[derive(Debug, Clone)]
pub struct HammerDetector {
    /// Maximum upper shadow as a proportion of range
    pub max_upper_wick: Ratio,
}

impl_with_defaults!(HammerDetector {
    max_upper_wick: 0.1,
});

impl PatternDetector for HammerDetector {
    fn id(&self) -> PatternId {
        PatternId("HAMMER")
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let c = candles.get(index)?;
        let range = c.range();
        let body = c.body();

        let shape = c.is_bullish()
            && range > 2.0 * body
            && c.lower_wick() > 2.0 * body
            && c.upper_wick() <= self.max_upper_wick.get() * range;

        shape.then(|| single_match("HAMMER", Direction::Bullish, index))?
    }
}

/// Bearish rejection candle: long upper shadow, small body near the bottom.
#[derive(Debug, Clone)]
pub struct ShootingStarDetector {
    /// Maximum lower shadow as a proportion of range
    pub max_lower_wick: Ratio,
}

impl_with_defaults!(ShootingStarDetector {
    max_lower_wick: 0.1,
});

impl PatternDetector for ShootingStarDetector {
    fn id(&self) -> PatternId {
        PatternId("SHOOTING_STAR")
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let c = candles.get(index)?;
        let range = c.range();
        let body = c.body();

        let shape = c.is_bearish()
            && range > 2.0 * body
            && c.upper_wick() > 2.0 * body
            && c.lower_wick() <= self.max_lower_wick.get() * range;

        shape.then(|| single_match("SHOOTING_STAR", Direction::Bearish, index))?
    }
}

// ============================================================
// DOJI FAMILY
// ============================================================

/// Indecision candle: real body is a sliver of the range.
#[derive(Debug, Clone)]
pub struct DojiDetector {
    /// Maximum body as a proportion of range
    pub max_body: Ratio,
}

impl_with_defaults!(DojiDetector {
    max_body: 0.1,
});

impl PatternDetector for DojiDetector {
    fn id(&self) -> PatternId {
        PatternId("DOJI")
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let c = candles.get(index)?;
        let range = c.range();
        let shape = range > 0.0 && c.body() <= self.max_body.get() * range;

        shape.then(|| single_match("DOJI", Direction::Neutral, index))?
    }
}

/// Doji with the body pinned at the top of the range: buyers defended the
/// low for the whole session.
#[derive(Debug, Clone)]
pub struct DragonflyDojiDetector {
    pub max_body: Ratio,
    pub max_upper_wick: Ratio,
    /// Minimum lower shadow as a proportion of range
    pub min_lower_wick: Ratio,
}

impl_with_defaults!(DragonflyDojiDetector {
    max_body: 0.1,
    max_upper_wick: 0.1,
    min_lower_wick: 0.6,
});

impl PatternDetector for DragonflyDojiDetector {
    fn id(&self) -> PatternId {
        PatternId("DRAGONFLY_DOJI")
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let c = candles.get(index)?;
        let range = c.range();
        let shape = range > 0.0
            && c.body() <= self.max_body.get() * range
            && c.upper_wick() <= self.max_upper_wick.get() * range
            && c.lower_wick() >= self.min_lower_wick.get() * range;

        shape.then(|| single_match("DRAGONFLY_DOJI", Direction::Bullish, index))?
    }
}

/// Mirror of the dragonfly: body pinned at the bottom, sellers rejected the
/// whole advance.
#[derive(Debug, Clone)]
pub struct GravestoneDojiDetector {
    pub max_body: Ratio,
    pub max_lower_wick: Ratio,
    pub min_upper_wick: Ratio,
}

impl_with_defaults!(GravestoneDojiDetector {
    max_body: 0.1,
    max_lower_wick: 0.1,
    min_upper_wick: 0.6,
});

impl PatternDetector for GravestoneDojiDetector {
    fn id(&self) -> PatternId {
        PatternId("GRAVESTONE_DOJI")
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let c = candles.get(index)?;
        let range = c.range();
        let shape = range > 0.0
            && c.body() <= self.max_body.get() * range
            && c.lower_wick() <= self.max_lower_wick.get() * range
            && c.upper_wick() >= self.min_upper_wick.get() * range;

        shape.then(|| single_match("GRAVESTONE_DOJI", Direction::Bearish, index))?
    }
}

// ============================================================
// SPINNING TOP / MARUBOZU / BELT HOLD
// ============================================================

/// Small body with shadows on both sides, larger than a doji.
#[derive(Debug, Clone)]
pub struct SpinningTopDetector {
    /// Bodies at or below this proportion are dojis, not spinning tops
    pub min_body: Ratio,
    pub max_body: Ratio,
}

impl_with_defaults!(SpinningTopDetector {
    min_body: 0.1,
    max_body: 0.3,
});

impl PatternDetector for SpinningTopDetector {
    fn id(&self) -> PatternId {
        PatternId("SPINNING_TOP")
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let c = candles.get(index)?;
        let range = c.range();
        let body = c.body();
        let shape = range > 0.0
            && body > self.min_body.get() * range
            && body <= self.max_body.get() * range
            && c.upper_wick() > 0.0
            && c.lower_wick() > 0.0;

        shape.then(|| single_match("SPINNING_TOP", Direction::Neutral, index))?
    }

    fn validate_config(&self) -> crate::Result<()> {
        if self.min_body >= self.max_body {
            return Err(crate::SignalError::InvalidConfig(
                "spinning top min_body must be below max_body".into(),
            ));
        }
        Ok(())
    }
}

/// Full-conviction candle: the body fills the range, shadows are negligible.
#[derive(Debug, Clone)]
pub struct MarubozuDetector {
    /// Maximum shadow on either side as a proportion of range
    pub max_wick: Ratio,
}

impl_with_defaults!(MarubozuDetector {
    max_wick: 0.05,
});

impl PatternDetector for MarubozuDetector {
    fn id(&self) -> PatternId {
        PatternId("MARUBOZU")
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let c = candles.get(index)?;
        let range = c.range();
        let tol = self.max_wick.get() * range;
        let shape =
            range > 0.0 && c.body() > 0.0 && c.upper_wick() <= tol && c.lower_wick() <= tol;
        if !shape {
            return None;
        }

        let direction = if c.is_bullish() {
            Direction::Bullish
        } else {
            Direction::Bearish
        };
        single_match("MARUBOZU", direction, index)
    }
}

/// Opens at one extreme of the range and drives away from it: no shadow on
/// the open side, body at least half the range.
#[derive(Debug, Clone)]
pub struct BeltHoldDetector {
    pub min_body: Ratio,
    /// Maximum shadow on the open side as a proportion of range
    pub max_open_wick: Ratio,
}

impl_with_defaults!(BeltHoldDetector {
    min_body: 0.5,
    max_open_wick: 0.03,
});

impl PatternDetector for BeltHoldDetector {
    fn id(&self) -> PatternId {
        PatternId("BELT_HOLD")
    }

    fn min_candles(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let c = candles.get(index)?;
        let range = c.range();
        if range <= 0.0 || c.body() < self.min_body.get() * range {
            return None;
        }
        let tol = self.max_open_wick.get() * range;

        if c.is_bullish() && c.lower_wick() <= tol {
            return single_match("BELT_HOLD", Direction::Bullish, index);
        }
        if c.is_bearish() && c.upper_wick() <= tol {
            return single_match("BELT_HOLD", Direction::Bearish, index);
        }
        None
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Candle;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            time: 0,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    #[test]
    fn test_hammer() {
        let detector = HammerDetector::default();
        let hammer = [candle(100.0, 101.2, 95.0, 101.0)];
        let m = detector.detect(&hammer, 0).expect("should match");
        assert_eq!(m.direction, Direction::Bullish);
        assert_eq!(m.label(), "Hammer");

        // same shadows, bearish body
        let inverted = [candle(101.0, 101.2, 95.0, 100.0)];
        assert!(detector.detect(&inverted, 0).is_none());
    }

    #[test]
    fn test_shooting_star() {
        let detector = ShootingStarDetector::default();
        let star = [candle(101.0, 106.0, 99.8, 100.0)];
        let m = detector.detect(&star, 0).expect("should match");
        assert_eq!(m.direction, Direction::Bearish);

        // long lower shadow disqualifies
        let tailed = [candle(101.0, 106.0, 95.0, 100.0)];
        assert!(detector.detect(&tailed, 0).is_none());
    }

    #[test]
    fn test_doji_and_spinning_top_are_disjoint() {
        let doji_det = DojiDetector::default();
        let top_det = SpinningTopDetector::default();

        // body 0.05 of a 2.0 range
        let doji = [candle(100.0, 101.0, 99.0, 100.1)];
        assert!(doji_det.detect(&doji, 0).is_some());
        assert!(top_det.detect(&doji, 0).is_none());

        // body 0.25 of a 2.0 range, shadows both sides
        let top = [candle(100.0, 101.0, 99.0, 100.5)];
        assert!(doji_det.detect(&top, 0).is_none());
        assert!(top_det.detect(&top, 0).is_some());
    }

    #[test]
    fn test_doji_rejects_zero_range() {
        let detector = DojiDetector::default();
        let flat = [candle(100.0, 100.0, 100.0, 100.0)];
        assert!(detector.detect(&flat, 0).is_none());
    }

    #[test]
    fn test_marubozu_direction() {
        let detector = MarubozuDetector::default();

        let bull = [candle(100.0, 110.5, 99.8, 110.0)];
        let m = detector.detect(&bull, 0).expect("should match");
        assert_eq!(m.direction, Direction::Bullish);
        assert_eq!(m.label(), "Bullish Marubozu");

        let bear = [candle(110.0, 110.2, 99.5, 100.0)];
        let m = detector.detect(&bear, 0).expect("should match");
        assert_eq!(m.direction, Direction::Bearish);

        // large upper shadow breaks the shape
        let wicked = [candle(100.0, 114.0, 99.8, 110.0)];
        assert!(detector.detect(&wicked, 0).is_none());
    }

    #[test]
    fn test_dragonfly_and_gravestone() {
        let fly = DragonflyDojiDetector::default();
        let stone = GravestoneDojiDetector::default();

        let dragonfly = [candle(100.0, 100.1, 97.0, 100.05)];
        assert_eq!(fly.detect(&dragonfly, 0).unwrap().direction, Direction::Bullish);
        assert!(stone.detect(&dragonfly, 0).is_none());

        let gravestone = [candle(100.0, 103.0, 99.9, 100.05)];
        assert_eq!(stone.detect(&gravestone, 0).unwrap().direction, Direction::Bearish);
        assert!(fly.detect(&gravestone, 0).is_none());
    }

    #[test]
    fn test_belt_hold_sides() {
        let detector = BeltHoldDetector::default();

        // opens on the low, closes near the high
        let bull = [candle(100.0, 106.0, 99.95, 105.0)];
        let m = detector.detect(&bull, 0).expect("should match");
        assert_eq!(m.direction, Direction::Bullish);

        let bear = [candle(106.0, 106.05, 100.0, 101.0)];
        let m = detector.detect(&bear, 0).expect("should match");
        assert_eq!(m.direction, Direction::Bearish);

        // bullish with a real lower shadow fails
        let tailed = [candle(100.0, 106.0, 98.0, 105.0)];
        assert!(detector.detect(&tailed, 0).is_none());
    }

    #[test]
    fn test_spinning_top_config_validation() {
        let bad = SpinningTopDetector {
            min_body: crate::Ratio::new_const(0.4),
            max_body: crate::Ratio::new_const(0.3),
        };
        assert!(bad.validate_config().is_err());
    }
}
