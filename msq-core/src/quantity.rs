//! Physical-quantity newtypes.
//!
//! The teacher crate (`mzcore::system`) builds these on top of `uom`'s
//! generated unit system. This workspace stands up lighter `f64` newtypes
//! instead (see `DESIGN.md` for why), but keeps the same shape: one type per
//! quantity, `Ord` via `ordered-float` so they can be used as map keys or
//! sorted, and arithmetic that reads like plain numbers.

use ordered_float::OrderedFloat;
use std::ops::{Add, Sub};

macro_rules! quantity {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
        pub struct $name(pub f64);

        impl $name {
            /// The raw numeric value.
            #[must_use]
            pub const fn value(self) -> f64 {
                self.0
            }

            /// An ordering key, usable where `f64`'s lack of `Ord` is in the way.
            #[must_use]
            pub fn ordered(self) -> OrderedFloat<f64> {
                OrderedFloat(self.0)
            }
        }

        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                Self(value)
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }
    };
}

quantity!(Mass, "A mass, in Daltons.");
quantity!(MassOverCharge, "A mass-to-charge ratio (Thomson).");
quantity!(RetentionTime, "A retention time, in seconds.");
quantity!(Ratio, "A dimensionless ratio (e.g. fold change, ppm/1e6).");
quantity!(Intensity, "A detector intensity/counts value.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_reads_like_numbers() {
        let a = Mass(100.0);
        let b = Mass(18.0105);
        assert!((a + b).value() - 118.0105 < 1e-9);
        assert!((a - b).value() - 81.9895 < 1e-9);
    }

    #[test]
    fn ordered_enables_sorting() {
        let mut values = vec![RetentionTime(30.0), RetentionTime(10.0), RetentionTime(20.0)];
        values.sort_by_key(|rt| rt.ordered());
        assert_eq!(values.iter().map(|v| v.value()).collect::<Vec<_>>(), vec![10.0, 20.0, 30.0]);
    }
}
