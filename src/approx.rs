//! Utilities to approximate equality of floating point values.
//!
//! Matrix equality itself is exact; these helpers exist for tests that compare
//! two computations whose floating-point summation order legitimately differs,
//! such as batched versus per-example gradient accumulation.

/// The max epsilon accepted on `f64`s.
pub const F64_MAX_ERROR: f64 = 1e-3;

/// The expected minimum epsilon accepted on `f64`s.
pub const F64_AVG_ERROR: f64 = 1e-6;

/// The best expected epsilon accepted on `f64`s.
pub const F64_MIN_ERROR: f64 = 1e-13;

/// Checks the relative distance based off epsilon.
pub trait RelativeEq<Rhs: ?Sized> {
    /// Enumerates the equality of `self`
    fn approx_eq(&self, rhs: &Rhs) -> ApproxEquality;
}

impl RelativeEq<Self> for f64 {
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality
    where
        Self: Sized,
    {
        let dif = (self - rhs).abs();

        if dif < F64_MIN_ERROR {
            ApproxEquality::Precise
        } else if dif < F64_AVG_ERROR {
            ApproxEquality::Partial
        } else if dif < F64_MAX_ERROR {
            ApproxEquality::Relative
        } else {
            ApproxEquality::Scarce
        }
    }
}

impl RelativeEq<[f64]> for [f64] {
    fn approx_eq(&self, rhs: &[f64]) -> ApproxEquality {
        if self.len() != rhs.len() {
            return ApproxEquality::Scarce;
        }
        let mut eq = ApproxEquality::Precise;
        for (a, b) in self.iter().zip(rhs.iter()) {
            let eq_rating = a.approx_eq(b);
            match eq_rating {
                ApproxEquality::Precise => {
                    // already the best, can't change equality for the worse; leave it as-is
                }
                ApproxEquality::Partial => {
                    if eq != ApproxEquality::Relative {
                        eq = eq_rating;
                    }
                }
                ApproxEquality::Relative => {
                    eq = eq_rating;
                }
                ApproxEquality::Scarce => {
                    return ApproxEquality::Scarce;
                }
            }
        }
        eq
    }
}

/// The approximated equality enumerated. Grades order from strongest to
/// weakest, so `Precise < Partial < Relative < Scarce`.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ApproxEquality {
    /// Very strong epsilon.
    Precise = 0,

    /// Good epsilon.
    Partial = 1,

    /// Acceptable epsilon
    Relative = 2,

    /// No relative equality.
    Scarce = 3,
}

/// Approximates equality based off the relative difference.
pub fn approx_eq<A: RelativeEq<B> + ?Sized, B: ?Sized>(a: &A, b: &B) -> bool {
    let eq = a.approx_eq(b);
    eq == ApproxEquality::Precise
}

/// Approximates equality accepting any grade at least as strong as `worst`,
/// for comparisons where differences are expected to accumulate (several
/// training steps, long reductions).
pub fn approx_eq_within<A: RelativeEq<B> + ?Sized, B: ?Sized>(
    a: &A,
    b: &B,
    worst: ApproxEquality,
) -> bool {
    a.approx_eq(b) <= worst
}
