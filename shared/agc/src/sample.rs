//! Sample types accepted by the two controllers.
//!
//! The feedback controller only makes sense on floating point samples. The
//! block controller accepts integers and floats; the way it turns a peak
//! amplitude into a gain differs between the two families, so that choice
//! lives on [`BlockSample`].

use std::fmt::Debug;
use std::ops::{Mul, Sub};

/// Index of the highest set bit of `x`, with `floor_log2(0) == 0`.
pub fn floor_log2(x: u32) -> u32 {
    floor_log2_u64(u64::from(x))
}

/// 64-bit variant of [`floor_log2`].
pub fn floor_log2_u64(x: u64) -> u32 {
    if x == 0 {
        return 0;
    }
    x.ilog2()
}

mod sealed {
    pub trait Sealed {}

    macro_rules! sealed {
        ($($t:ty),*) => { $(impl Sealed for $t {})* };
    }

    sealed!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);
}

/// Floating point sample driven through [`crate::FeedbackGainController`].
pub trait FeedbackSample:
    sealed::Sealed + Copy + Debug + PartialOrd + Mul<Output = Self> + Sub<Output = Self> + Send + Sync + 'static
{
    const ZERO: Self;
    const ONE: Self;
    /// Smallest gain the controller will hold.
    const GAIN_FLOOR: Self;

    fn abs(self) -> Self;
    fn is_finite(self) -> bool;
    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
}

macro_rules! feedback_sample {
    ($t:ty) => {
        impl FeedbackSample for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const GAIN_FLOOR: Self = 1e-6;

            #[inline]
            fn abs(self) -> Self {
                <$t>::abs(self)
            }

            #[inline]
            fn is_finite(self) -> bool {
                <$t>::is_finite(self)
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

feedback_sample!(f32);
feedback_sample!(f64);

/// Sample stored in the delay line of [`crate::DelayedBlockGainController`].
pub trait BlockSample: sealed::Sealed + Copy + Debug + PartialOrd + Send + Sync + 'static {
    const ZERO: Self;
    const ONE: Self;

    /// Absolute value, saturating where the type has no positive counterpart.
    fn magnitude(self) -> Self;

    /// `self * gain`, saturating for integers.
    fn scale(self, gain: Self) -> Self;

    /// Next gain for a delay line whose peak magnitude is `peak`. Never below one.
    fn gain_for_peak(reference: Self, peak: Self) -> Self;
}

macro_rules! block_sample_int {
    ($t:ty, $abs:expr) => {
        impl BlockSample for $t {
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            fn magnitude(self) -> Self {
                $abs(self)
            }

            #[inline]
            fn scale(self, gain: Self) -> Self {
                self.saturating_mul(gain)
            }

            #[inline]
            fn gain_for_peak(reference: Self, peak: Self) -> Self {
                // peak came from magnitude() so the cast keeps its value
                let shift = floor_log2_u64(peak as u64);
                reference.checked_shr(shift).unwrap_or(0).max(1)
            }
        }
    };
}

block_sample_int!(i8, i8::saturating_abs);
block_sample_int!(i16, i16::saturating_abs);
block_sample_int!(i32, i32::saturating_abs);
block_sample_int!(i64, i64::saturating_abs);
block_sample_int!(u8, core::convert::identity);
block_sample_int!(u16, core::convert::identity);
block_sample_int!(u32, core::convert::identity);
block_sample_int!(u64, core::convert::identity);

macro_rules! block_sample_float {
    ($t:ty) => {
        impl BlockSample for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            #[inline]
            fn magnitude(self) -> Self {
                self.abs()
            }

            #[inline]
            fn scale(self, gain: Self) -> Self {
                self * gain
            }

            /// Float counterpart of `reference >> floor_log2(peak)`: the
            /// exponent may go negative, so quiet float signals still get
            /// boosted by an exact power of two.
            #[inline]
            fn gain_for_peak(reference: Self, peak: Self) -> Self {
                let exponent = if peak > 0.0 { peak.log2().floor() } else { 0.0 };
                let gain = reference * (-exponent).exp2();
                if gain.is_finite() {
                    gain.max(1.0)
                } else {
                    <$t>::MAX
                }
            }
        }
    };
}

block_sample_float!(f32);
block_sample_float!(f64);
