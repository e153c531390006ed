//! Five-candle trend shapes fitted by least squares.
//!
//! A wedge is read off the slopes of the high and low series over the
//! window: both slopes share a sign and the lines converge. Slopes come from
//! an ordinary-least-squares fit with the candle offset as x, so the test is
//! scale-free in time and only the relative ordering of the slopes matters.

use super::helpers::ols_slope;
use crate::{Direction, OHLCV, PatternDetector, PatternId, PatternMatch, Period};

const DEFAULT_WINDOW: usize = 5;

fn fit_window<T: OHLCV>(candles: &[T], index: usize, window: usize) -> Option<(f64, f64)> {
    if index + 1 < window {
        return None;
    }
    let slice = candles.get(index + 1 - window..=index)?;
    let highs: Vec<f64> = slice.iter().map(|c| c.high()).collect();
    let lows: Vec<f64> = slice.iter().map(|c| c.low()).collect();
    Some((ols_slope(&highs), ols_slope(&lows)))
}

fn shape_match(
    id: &'static str,
    direction: Direction,
    index: usize,
    window: usize,
) -> Option<PatternMatch> {
    Some(PatternMatch {
        pattern_id: PatternId(id),
        direction,
        start_index: index + 1 - window,
        end_index: index,
    })
}

/// Both boundary lines rising with the lows gaining faster than the highs:
/// the advance is being squeezed from below and tends to resolve down.
#[derive(Debug, Clone)]
pub struct RisingWedgeDetector {
    pub window: Period,
}

impl Default for RisingWedgeDetector {
    fn default() -> Self {
        Self {
            window: Period::new_const(DEFAULT_WINDOW),
        }
    }
}

impl PatternDetector for RisingWedgeDetector {
    fn id(&self) -> PatternId {
        PatternId("RISING_WEDGE")
    }

    fn min_candles(&self) -> usize {
        self.window.get()
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (high_slope, low_slope) = fit_window(candles, index, self.window.get())?;

        let shape = high_slope > 0.0 && low_slope > 0.0 && low_slope > high_slope;
        shape.then(|| shape_match("RISING_WEDGE", Direction::Bearish, index, self.window.get()))?
    }
}

/// Mirror shape: both lines falling with the highs dropping faster, price
/// being squeezed from above and tending to resolve up.
#[derive(Debug, Clone)]
pub struct FallingWedgeDetector {
    pub window: Period,
}

impl Default for FallingWedgeDetector {
    fn default() -> Self {
        Self {
            window: Period::new_const(DEFAULT_WINDOW),
        }
    }
}

impl PatternDetector for FallingWedgeDetector {
    fn id(&self) -> PatternId {
        PatternId("FALLING_WEDGE")
    }

    fn min_candles(&self) -> usize {
        self.window.get()
    }

    fn detect<T: OHLCV>(&self, candles: &[T], index: usize) -> Option<PatternMatch> {
        let (high_slope, low_slope) = fit_window(candles, index, self.window.get())?;

        let shape = high_slope < 0.0 && low_slope < 0.0 && high_slope < low_slope;
        shape.then(|| shape_match("FALLING_WEDGE", Direction::Bullish, index, self.window.get()))?
    }
}
