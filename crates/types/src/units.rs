//! Unit-tagged lengths.
//!
//! Each unit is its own newtype so that adding millimeters to pixels is a
//! compile error. Conversions always go through an explicit method and
//! produce a new value in the target unit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub};

const MM_PER_INCH: f64 = 25.4;
/// CSS reference pixel density used by the rendering engine.
const PX_PER_INCH: f64 = 96.0;
/// PDF user-space units per inch.
const PT_PER_INCH: f64 = 72.0;

/// Slack applied before `ceil`/`floor` so that values which are whole
/// numbers up to floating-point noise are not pushed to the next integer.
const ROUNDING_EPSILON: f64 = 1e-9;

/// How a conversion into millimeters is rounded.
///
/// Page dimensions are rounded up so that a reserved band is never smaller
/// than the content it must hold; display measurements are usually kept exact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    #[default]
    None,
    Floor,
    Ceil,
}

impl Rounding {
    fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::None => value,
            Rounding::Floor => (value + ROUNDING_EPSILON).floor(),
            Rounding::Ceil => (value - ROUNDING_EPSILON).ceil(),
        }
    }
}

macro_rules! length_unit {
    ($(#[$meta:meta])* $name:ident, $suffix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl $name {
            pub const ZERO: $name = $name(0.0);

            pub const fn new(value: f64) -> Self {
                $name(value)
            }

            /// The raw magnitude, stripped of its unit.
            pub const fn value(self) -> f64 {
                self.0
            }

            pub fn max(self, other: Self) -> Self {
                $name(self.0.max(other.0))
            }

            pub fn min(self, other: Self) -> Self {
                $name(self.0.min(other.0))
            }

            pub fn is_zero(self) -> bool {
                self.0 == 0.0
            }
        }

        impl Add for $name {
            type Output = $name;
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: $name) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;
            fn mul(self, factor: f64) -> $name {
                $name(self.0 * factor)
            }
        }

        impl Div<f64> for $name {
            type Output = $name;
            fn div(self, divisor: f64) -> $name {
                $name(self.0 / divisor)
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = $name>>(iter: I) -> $name {
                $name(iter.map(|v| v.0).sum())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", self.0, $suffix)
            }
        }
    };
}

length_unit!(
    /// Device pixels as reported by the rendering engine (96 per inch).
    Px,
    "px"
);
length_unit!(
    /// Millimeters, the unit callers use to describe pages and margins.
    Mm,
    "mm"
);
length_unit!(
    /// PDF points (72 per inch), the unit of PDF user space.
    Pt,
    "pt"
);

impl Px {
    pub fn to_mm(self, rounding: Rounding) -> Mm {
        Mm(rounding.apply(self.0 * MM_PER_INCH / PX_PER_INCH))
    }

    pub fn to_pt(self) -> Pt {
        Pt(self.0 * PT_PER_INCH / PX_PER_INCH)
    }

    /// Whole device pixels, truncated toward zero. Viewports are integral.
    pub fn floor(self) -> Px {
        Px(self.0.floor())
    }
}

impl Mm {
    pub fn to_px(self) -> Px {
        Px(self.0 * PX_PER_INCH / MM_PER_INCH)
    }

    pub fn to_pt(self) -> Pt {
        Pt(self.0 * PT_PER_INCH / MM_PER_INCH)
    }
}

impl Pt {
    pub fn to_mm(self, rounding: Rounding) -> Mm {
        Mm(rounding.apply(self.0 * MM_PER_INCH / PT_PER_INCH))
    }

    pub fn to_px(self) -> Px {
        Px(self.0 * PX_PER_INCH / PT_PER_INCH)
    }
}
