//! Builtin candlestick pattern detectors.
//!
//! Detectors are pure predicates over a candle window ending at `index`. All
//! proportional measures (body ratio, wick ratio, near-equality of levels)
//! are scale-free: they compare against the candle's own range, so the same
//! tolerances work on any instrument and price scale.
//!
//! Submodules by window size:
//! - [`single_candle`]: one-candle shapes (hammer, doji family, marubozu, ...)
//! - [`two_candle`]: pairwise formations (engulfing, harami, tweezers, ...)
//! - [`three_candle`]: triple formations (stars, soldiers and crows, ...)
//! - [`multi_candle`]: five-candle trend shapes fitted by least squares

pub mod helpers;
pub mod multi_candle;
pub mod single_candle;
pub mod three_candle;
pub mod two_candle;

pub use multi_candle::{FallingWedgeDetector, RisingWedgeDetector};
pub use single_candle::{
    BeltHoldDetector, DojiDetector, DragonflyDojiDetector, GravestoneDojiDetector, HammerDetector,
    MarubozuDetector, ShootingStarDetector, SpinningTopDetector,
};
pub use three_candle::{
    AbandonedBabyDetector, EveningStarDetector, MorningStarDetector, ThreeBlackCrowsDetector,
    ThreeInsideDetector, ThreeWhiteSoldiersDetector,
};
pub use two_candle::{
    DarkCloudCoverDetector, EngulfingDetector, FakeyDetector, HaramiCrossDetector, HaramiDetector,
    KickerDetector, PiercingDetector, RailroadTracksDetector, TweezerBottomDetector,
    TweezerTopDetector,
};

/// Implements `Default` plus a validated `new` for a detector whose fields
/// are all `Ratio` tolerances.
macro_rules! impl_with_defaults {
    ($type:ty { $($field:ident: $default:expr),* $(,)? }) => {
        impl Default for $type {
            fn default() -> Self {
                Self {
                    $($field: $crate::Ratio::new_const($default)),*
                }
            }
        }

        impl $type {
            /// Create with explicit tolerances, validating each is in 0..=1
            pub fn new($($field: f64),*) -> $crate::Result<Self> {
                Ok(Self {
                    $($field: $crate::Ratio::new($field)?),*
                })
            }
        }
    };
}

pub(crate) use impl_with_defaults;
