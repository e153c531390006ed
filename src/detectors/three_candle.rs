//! Three-candle patterns. `index` is the last candle of the triple.

use super::helpers::{body_inside, body_mid};
use super::impl_with_defaults;
use crate::{Direction, OHLCV, OHLCVExt, PatternDetector, PatternId, PatternMatch, Ratio};

fn triple_match(id: &'static str, direction: Direction, index: usize) -> Option<PatternMatch> {
    Some(PatternMatch {
        pattern_id: PatternId(id),
        direction,
        start_index: index - 2,
        end_index: index,
    })
}

fn triple<'a, T: OHLCV>(candles: &'a [T], index: usize) -> Option<(&'a T, &'a T, &'a T)> {
    if index < 2 {
        return None;
    }
    Some((
        candles.get(index - 2)?,
        candles.get(index - 1)?,
        candles.get(index)?,
    ))
}

// ============================================================
// STARS
// ============================================================

/// Bullish reversal: a strong bearish candle, a small-bodied pause, then a
/// bullish candle recovering past the first body's midpoint.
#[derive(Debug, Clone)]
pub struct MorningStarDetector {
    /// Maximum middle body as a proportion of the first candle's body
    pub max_star_body: Ratio,
}

impl_with_defaults!(MorningStarDetector {
    max_star_body: 0.5,
});

impl PatternDetector for MorningStarDetector {
    fn id(&self) -> PatternId {
        PatternId("MORNING_STAR")
    }

    fn min_candles(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (a, b, c) = triple(candles, index)?;

        let shape = a.is_bearish()
            && a.body() > 0.0
            && b.body() <= self.max_star_body.get() * a.body()
            && c.is_bullish()
            && c.close() > body_mid(a);

        shape.then(|| triple_match("MORNING_STAR", Direction::Bullish, index))?
    }
}

/// Bearish mirror of the morning star.
#[derive(Debug, Clone)]
pub struct EveningStarDetector {
    pub max_star_body: Ratio,
}

impl_with_defaults!(EveningStarDetector {
    max_star_body: 0.5,
});

impl PatternDetector for EveningStarDetector {
    fn id(&self) -> PatternId {
        PatternId("EVENING_STAR")
    }

    fn min_candles(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (a, b, c) = triple(candles, index)?;

        let shape = a.is_bullish()
            && a.body() > 0.0
            && b.body() <= self.max_star_body.get() * a.body()
            && c.is_bearish()
            && c.close() < body_mid(a);

        shape.then(|| triple_match("EVENING_STAR", Direction::Bearish, index))?
    }
}

// ============================================================
// SOLDIERS AND CROWS
// ============================================================

/// Three consecutive bullish candles, each closing above the last.
#[derive(Debug, Clone, Default)]
pub struct ThreeWhiteSoldiersDetector;

impl PatternDetector for ThreeWhiteSoldiersDetector {
    fn id(&self) -> PatternId {
        PatternId("THREE_WHITE_SOLDIERS")
    }

    fn min_candles(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (a, b, c) = triple(candles, index)?;

        let shape = a.is_bullish()
            && b.is_bullish()
            && c.is_bullish()
            && b.close() > a.close()
            && c.close() > b.close();

        shape.then(|| triple_match("THREE_WHITE_SOLDIERS", Direction::Bullish, index))?
    }
}

/// Three consecutive bearish candles, each closing below the last.
#[derive(Debug, Clone, Default)]
pub struct ThreeBlackCrowsDetector;

impl PatternDetector for ThreeBlackCrowsDetector {
    fn id(&self) -> PatternId {
        PatternId("THREE_BLACK_CROWS")
    }

    fn min_candles(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (a, b, c) = triple(candles, index)?;

        let shape = a.is_bearish()
            && b.is_bearish()
            && c.is_bearish()
            && b.close() < a.close()
            && c.close() < b.close();

        shape.then(|| triple_match("THREE_BLACK_CROWS", Direction::Bearish, index))?
    }
}

// ============================================================
// THREE INSIDE / ABANDONED BABY
// ============================================================

/// Harami confirmed by a third candle closing beyond the mother's open.
#[derive(Debug, Clone, Default)]
pub struct ThreeInsideDetector;

impl PatternDetector for ThreeInsideDetector {
    fn id(&self) -> PatternId {
        PatternId("THREE_INSIDE")
    }

    fn min_candles(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (a, b, c) = triple(candles, index)?;
        if a.body() <= 0.0 || !body_inside(b, a) {
            return None;
        }

        if a.is_bearish() && b.is_bullish() && c.is_bullish() && c.close() > a.open() {
            return triple_match("THREE_INSIDE", Direction::Bullish, index);
        }
        if a.is_bullish() && b.is_bearish() && c.is_bearish() && c.close() < a.open() {
            return triple_match("THREE_INSIDE", Direction::Bearish, index);
        }
        None
    }
}

/// Doji island separated from both neighbors by full-range gaps.
#[derive(Debug, Clone)]
pub struct AbandonedBabyDetector {
    pub max_doji_body: Ratio,
}

impl_with_defaults!(AbandonedBabyDetector {
    max_doji_body: 0.1,
});

impl PatternDetector for AbandonedBabyDetector {
    fn id(&self) -> PatternId {
        PatternId("ABANDONED_BABY")
    }

    fn min_candles(&self) -> usize {
        3
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (a, b, c) = triple(candles, index)?;

        let doji = b.range() > 0.0 && b.body() <= self.max_doji_body.get() * b.range();
        if !doji {
            return None;
        }

        // gap below both neighbors, then a bullish recovery
        if a.is_bearish() && c.is_bullish() && b.high() < a.low() && b.high() < c.low() {
            return triple_match("ABANDONED_BABY", Direction::Bullish, index);
        }
        // gap above both neighbors, then a bearish break
        if a.is_bullish() && c.is_bearish() && b.low() > a.high() && b.low() > c.high() {
            return triple_match("ABANDONED_BABY", Direction::Bearish, index);
        }
        None
    }
}

// ============================================================
// TESTS
// ============================================================
