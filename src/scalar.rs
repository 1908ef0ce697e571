//! Numeric capabilities shared by real and complex element types.
//!
//! Every kernel is written once against [`Element`]. Real types are their own
//! conjugate and their squared magnitude is the plain square; complex types
//! conjugate the imaginary part and use `re^2 + im^2`.

use num_complex::Complex;
use num_traits::{Float, NumAssign, Zero};
use rustfft::FftNum;
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, Sub};

/// Real floating-point type used for coefficients, statistics and FFTs.
pub trait Real: FftNum + Float + NumAssign + Default {
    /// Relative variance below which a window counts as flat.
    fn default_variance_tolerance() -> Self {
        Self::epsilon().sqrt()
    }

    /// Lossy conversion from `f64` used for configuration values.
    fn from_f64_lossy(value: f64) -> Self;

    /// Lossy conversion of an element count.
    fn from_count(count: usize) -> Self;
}

impl Real for f32 {
    fn from_f64_lossy(value: f64) -> Self {
        value as f32
    }

    fn from_count(count: usize) -> Self {
        count as f32
    }
}

impl Real for f64 {
    fn from_f64_lossy(value: f64) -> Self {
        value
    }

    fn from_count(count: usize) -> Self {
        count as f64
    }
}

/// Tensor element: a real float or a complex float.
pub trait Element:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + Zero
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + 'static
{
    /// Underlying real type.
    type Real: Real;

    /// Complex conjugate (identity for real types).
    fn conj(self) -> Self;

    /// Squared magnitude, `x * conj(x)`.
    fn norm_sqr(self) -> Self::Real;

    /// Multiplies by a real factor.
    fn scale(self, factor: Self::Real) -> Self;

    /// Promotes the value to a complex number for transforms.
    fn to_complex(self) -> Complex<Self::Real>;

    /// Recovers an element from a transform result; real types keep `re`.
    fn from_complex(value: Complex<Self::Real>) -> Self;

    /// Magnitude of a normalized correlation ratio.
    ///
    /// Taking the magnitude makes the coefficient invariant to the sign of a
    /// real gain and to the phase of a complex one.
    fn coefficient(self) -> Self::Real;
}

macro_rules! impl_real_element {
    ($t:ty) => {
        impl Element for $t {
            type Real = $t;

            #[inline]
            fn conj(self) -> Self {
                self
            }

            #[inline]
            fn norm_sqr(self) -> Self::Real {
                self * self
            }

            #[inline]
            fn scale(self, factor: Self::Real) -> Self {
                self * factor
            }

            #[inline]
            fn to_complex(self) -> Complex<Self::Real> {
                Complex::new(self, 0.0)
            }

            #[inline]
            fn from_complex(value: Complex<Self::Real>) -> Self {
                value.re
            }

            #[inline]
            fn coefficient(self) -> Self::Real {
                self.abs()
            }
        }
    };
}

impl_real_element!(f32);
impl_real_element!(f64);

impl<R: Real> Element for Complex<R> {
    type Real = R;

    #[inline]
    fn conj(self) -> Self {
        Complex::conj(&self)
    }

    #[inline]
    fn norm_sqr(self) -> R {
        Complex::norm_sqr(&self)
    }

    #[inline]
    fn scale(self, factor: R) -> Self {
        Complex::new(self.re * factor, self.im * factor)
    }

    #[inline]
    fn to_complex(self) -> Complex<R> {
        self
    }

    #[inline]
    fn from_complex(value: Complex<R>) -> Self {
        value
    }

    #[inline]
    fn coefficient(self) -> R {
        self.norm()
    }
}
