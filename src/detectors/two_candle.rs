//! Two-candle patterns. `index` is the later candle of the pair.

use super::helpers::{body_inside, body_mid, near};
use super::impl_with_defaults;
use crate::{Direction, OHLCV, OHLCVExt, PatternDetector, PatternId, PatternMatch, Ratio};

fn pair_match(id: &'static str, direction: Direction, index: usize) -> Option<PatternMatch> {
    Some(PatternMatch {
        pattern_id: PatternId(id),
        direction,
        start_index: index - 1,
        end_index: index,
    })
}

fn pair<'a, T: OHLCV>(candles: &'a [T], index: usize) -> Option<(&'a T, &'a T)> {
    if index == 0 {
        return None;
    }
    Some((candles.get(index - 1)?, candles.get(index)?))
}

// ============================================================
// ENGULFING / HARAMI
// ============================================================

/// Current real body wraps the previous, opposite-color real body.
#[derive(Debug, Clone, Default)]
pub struct EngulfingDetector;

impl PatternDetector for EngulfingDetector {
    fn id(&self) -> PatternId {
        PatternId("ENGULFING")
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(candles, index)?;

        let opposite = (prev.is_bearish() && curr.is_bullish())
            || (prev.is_bullish() && curr.is_bearish());
        let wraps = curr.body_top() >= prev.body_top()
            && curr.body_bottom() <= prev.body_bottom()
            && curr.body() > prev.body();
        if !(opposite && wraps) {
            return None;
        }

        let direction = if curr.is_bullish() {
            Direction::Bullish
        } else {
            Direction::Bearish
        };
        pair_match("ENGULFING", direction, index)
    }
}

/// Current real body sits inside the previous, larger body. Signals against
/// the previous candle's direction.
#[derive(Debug, Clone)]
pub struct HaramiDetector {
    /// Maximum current body as a proportion of the previous body
    pub max_body_ratio: Ratio,
}

impl_with_defaults!(HaramiDetector {
    max_body_ratio: 0.5,
});

impl PatternDetector for HaramiDetector {
    fn id(&self) -> PatternId {
        PatternId("HARAMI")
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(candles, index)?;

        let shape = prev.body() > 0.0
            && body_inside(curr, prev)
            && curr.body() <= self.max_body_ratio.get() * prev.body();
        if !shape {
            return None;
        }

        // reversal against the mother candle
        let direction = if prev.is_bearish() {
            Direction::Bullish
        } else {
            Direction::Bearish
        };
        pair_match("HARAMI", direction, index)
    }
}

/// Harami whose inside candle is a doji.
#[derive(Debug, Clone)]
pub struct HaramiCrossDetector {
    pub max_doji_body: Ratio,
}

impl_with_defaults!(HaramiCrossDetector {
    max_doji_body: 0.1,
});

impl PatternDetector for HaramiCrossDetector {
    fn id(&self) -> PatternId {
        PatternId("HARAMI_CROSS")
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(candles, index)?;

        let doji = curr.range() > 0.0 && curr.body() <= self.max_doji_body.get() * curr.range();
        let shape = prev.body() > 0.0 && doji && body_inside(curr, prev);
        if !shape {
            return None;
        }

        let direction = if prev.is_bearish() {
            Direction::Bullish
        } else {
            Direction::Bearish
        };
        pair_match("HARAMI_CROSS", direction, index)
    }
}

// ============================================================
// PIERCING / DARK CLOUD COVER
// ============================================================

/// Bullish reversal: opens below the prior bearish close, recovers past the
/// midpoint of the prior body without fully engulfing it.
#[derive(Debug, Clone, Default)]
pub struct PiercingDetector;

impl PatternDetector for PiercingDetector {
    fn id(&self) -> PatternId {
        PatternId("PIERCING")
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(candles, index)?;

        let shape = prev.is_bearish()
            && curr.is_bullish()
            && curr.open() < prev.close()
            && curr.close() > body_mid(prev)
            && curr.close() < prev.open();

        shape.then(|| pair_match("PIERCING", Direction::Bullish, index))?
    }
}

/// Bearish mirror of the piercing line.
#[derive(Debug, Clone, Default)]
pub struct DarkCloudCoverDetector;

impl PatternDetector for DarkCloudCoverDetector {
    fn id(&self) -> PatternId {
        PatternId("DARK_CLOUD_COVER")
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(candles, index)?;

        let shape = prev.is_bullish()
            && curr.is_bearish()
            && curr.open() > prev.close()
            && curr.close() < body_mid(prev)
            && curr.close() > prev.open();

        shape.then(|| pair_match("DARK_CLOUD_COVER", Direction::Bearish, index))?
    }
}

// ============================================================
// TWEEZERS
// ============================================================

/// Two candles rejecting the same high: bullish then bearish.
#[derive(Debug, Clone)]
pub struct TweezerTopDetector {
    /// Level-match tolerance as a proportion of the current candle's range
    pub tolerance: Ratio,
}

impl_with_defaults!(TweezerTopDetector {
    tolerance: 0.05,
});

impl PatternDetector for TweezerTopDetector {
    fn id(&self) -> PatternId {
        PatternId("TWEEZER_TOP")
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(candles, index)?;

        let shape = curr.range() > 0.0
            && prev.is_bullish()
            && curr.is_bearish()
            && near(curr.high(), prev.high(), self.tolerance.get() * curr.range());

        shape.then(|| pair_match("TWEEZER_TOP", Direction::Bearish, index))?
    }
}

/// Two candles defending the same low: bearish then bullish.
#[derive(Debug, Clone)]
pub struct TweezerBottomDetector {
    pub tolerance: Ratio,
}

impl_with_defaults!(TweezerBottomDetector {
    tolerance: 0.05,
});

impl PatternDetector for TweezerBottomDetector {
    fn id(&self) -> PatternId {
        PatternId("TWEEZER_BOTTOM")
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(candles, index)?;

        let shape = curr.range() > 0.0
            && prev.is_bearish()
            && curr.is_bullish()
            && near(curr.low(), prev.low(), self.tolerance.get() * curr.range());

        shape.then(|| pair_match("TWEEZER_BOTTOM", Direction::Bullish, index))?
    }
}

// ============================================================
// RAILROAD TRACKS / KICKER / FAKEY
// ============================================================

/// Two same-direction candles with matching opens and closes, printed back
/// to back.
#[derive(Debug, Clone)]
pub struct RailroadTracksDetector {
    pub tolerance: Ratio,
}

impl_with_defaults!(RailroadTracksDetector {
    tolerance: 0.05,
});

impl PatternDetector for RailroadTracksDetector {
    fn id(&self) -> PatternId {
        PatternId("RAILROAD_TRACKS")
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(candles, index)?;
        if curr.range() <= 0.0 || curr.body() <= 0.0 {
            return None;
        }
        let tol = self.tolerance.get() * curr.range();

        let same_color = (prev.is_bullish() && curr.is_bullish())
            || (prev.is_bearish() && curr.is_bearish());
        let shape = same_color
            && near(curr.open(), prev.open(), tol)
            && near(curr.close(), prev.close(), tol);
        if !shape {
            return None;
        }

        let direction = if curr.is_bullish() {
            Direction::Bullish
        } else {
            Direction::Bearish
        };
        pair_match("RAILROAD_TRACKS", direction, index)
    }
}

/// Real-body gap straight through the prior candle's body, with the colors
/// flipping.
#[derive(Debug, Clone, Default)]
pub struct KickerDetector;

impl PatternDetector for KickerDetector {
    fn id(&self) -> PatternId {
        PatternId("KICKER")
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(candles, index)?;

        if prev.is_bearish() && curr.is_bullish() && curr.body_bottom() > prev.body_top() {
            return pair_match("KICKER", Direction::Bullish, index);
        }
        if prev.is_bullish() && curr.is_bearish() && curr.body_top() < prev.body_bottom() {
            return pair_match("KICKER", Direction::Bearish, index);
        }
        None
    }
}

/// False-break setup: a long shadow probes beyond the prior candle's body
/// and the close comes back inside it. The rejecting excursion must exceed
/// twice the current real body to count as a wick, not a drift.
#[derive(Debug, Clone, Default)]
pub struct FakeyDetector;

impl PatternDetector for FakeyDetector {
    fn id(&self) -> PatternId {
        PatternId("FAKEY")
    }

    fn min_candles(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(candles, index)?;

        let body = curr.body();
        let close_inside =
            curr.close() >= prev.body_bottom() && curr.close() <= prev.body_top();
        if !close_inside {
            return None;
        }

        // downside probe rejected
        let down_excursion = prev.body_bottom() - curr.low();
        if down_excursion > 2.0 * body {
            return pair_match("FAKEY", Direction::Bullish, index);
        }
        // upside probe rejected
        let up_excursion = curr.high() - prev.body_top();
        if up_excursion > 2.0 * body {
            return pair_match("FAKEY", Direction::Bearish, index);
        }
        None
    }
}

// ============================================================
// TESTS
// ============================================================
