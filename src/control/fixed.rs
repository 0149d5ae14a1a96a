//! Scaled-integer fixed point.
//!
//! Setpoints, deadbands, offsets and most sensor readings travel as
//! integers scaled by [`SCALE`] (`235` is 23.5). Keeping them integral
//! end to end means repeated evaluations never accumulate rounding drift.

use core::fmt;

/// Fixed-point scale factor: one unit is 1/10.
pub const SCALE: i32 = 10;

/// A value scaled by [`SCALE`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fixed10(i32);

impl Fixed10 {
    pub const ZERO: Self = Self(0);

    /// Wrap an already-scaled integer.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Twice the raw value, widened. Halving terms (`deadband / 2`) become
    /// exact when every operand of a comparison is doubled.
    pub(crate) const fn doubled(self) -> i64 {
        self.0 as i64 * 2
    }
}

impl From<i32> for Fixed10 {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Fixed10 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCALE.unsigned_abs();
        write!(f, "{}{}.{}", sign, abs / scale, abs % scale)
    }
}
