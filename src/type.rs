use std::fmt::Debug;

use num_traits::{Bounded, Num, NumCast, ToPrimitive};

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Coordinates are stored in
/// their native type, but every derived metric (areas, distances) is evaluated in `f64`, so the
/// set of allowed types is limited to those that convert losslessly enough for that purpose.
pub trait IndexableNum:
    private::Sealed + Num + NumCast + ToPrimitive + PartialOrd + Copy + Debug + Bounded
{
    /// Widen this coordinate to `f64` for metric computations.
    #[inline]
    fn as_f64(self) -> f64 {
        // All sealed implementors are primitive numbers, for which this never fails.
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl IndexableNum for i8 {}
impl IndexableNum for u8 {}
impl IndexableNum for i16 {}
impl IndexableNum for u16 {}
impl IndexableNum for i32 {}
impl IndexableNum for u32 {}
impl IndexableNum for i64 {}
impl IndexableNum for f32 {}
impl IndexableNum for f64 {}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
    impl Sealed for u16 {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
