//! N-dimensional complex FFTs assembled from per-axis `rustfft` plans.
//!
//! Axes are transformed one at a time. The last axis is contiguous and is
//! handed to `rustfft` as a batch of rows; every other axis is transposed into
//! a scratch block first so each line becomes contiguous.

use crate::scalar::{Element, Real};
use crate::tensor::index::{contiguous_strides, for_each_index, offset_of};
use crate::tensor::{Shape, TensorView};
use crate::util::math::fast_len;
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Forward and inverse plans for one padded shape.
#[derive(Clone)]
pub(crate) struct FftNd<R: Real> {
    shape: Shape,
    forward: Vec<Arc<dyn Fft<R>>>,
    inverse: Vec<Arc<dyn Fft<R>>>,
}

impl<R: Real> FftNd<R> {
    /// Plans transforms for `shape` (every extent must be non-zero).
    pub(crate) fn new(shape: Shape) -> Self {
        let mut planner = FftPlanner::new();
        let forward = shape
            .dims()
            .iter()
            .map(|&len| planner.plan_fft_forward(len))
            .collect();
        let inverse = shape
            .dims()
            .iter()
            .map(|&len| planner.plan_fft_inverse(len))
            .collect();
        Self {
            shape,
            forward,
            inverse,
        }
    }

    /// Plans transforms large enough to hold the linear correlation of
    /// `outer` with `window` without circular aliasing.
    pub(crate) fn for_correlation(outer: &Shape, window: &Shape) -> Self {
        let dims: Vec<usize> = outer
            .dims()
            .iter()
            .zip(window.dims())
            .map(|(&o, &w)| fast_len(o + w - 1))
            .collect();
        Self::new(Shape::new(dims))
    }

    /// Returns the padded transform shape.
    pub(crate) fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Unnormalized forward transform in place.
    pub(crate) fn forward(&self, buffer: &mut [Complex<R>]) {
        self.process(buffer, &self.forward);
    }

    /// Inverse transform in place, scaled by `1 / len` so it undoes `forward`.
    pub(crate) fn inverse(&self, buffer: &mut [Complex<R>]) {
        self.process(buffer, &self.inverse);
        let scale = R::one() / R::from_count(buffer.len());
        for value in buffer.iter_mut() {
            *value = *value * scale;
        }
    }

    /// Zero-pads `view` into a fresh buffer of the padded shape.
    pub(crate) fn pad<T: Element<Real = R>>(&self, view: &TensorView<'_, T>) -> Vec<Complex<R>> {
        self.pad_with(view, |value| value.to_complex())
    }

    /// Zero-pads `map(view)` into a fresh buffer of the padded shape.
    pub(crate) fn pad_with<T>(
        &self,
        view: &TensorView<'_, T>,
        mut map: impl FnMut(T) -> Complex<R>,
    ) -> Vec<Complex<R>>
    where
        T: Copy,
    {
        let mut buffer = vec![Complex::new(R::zero(), R::zero()); self.shape.len()];
        let padded_strides = contiguous_strides(self.shape.dims());
        let data = view.as_slice();
        let strides = view.strides();
        for_each_index(view.shape().dims(), |idx| {
            buffer[offset_of(idx, &padded_strides)] = map(data[offset_of(idx, strides)]);
        });
        buffer
    }

    /// Spectrum of a unit box of `window` shape, anchored at the origin.
    pub(crate) fn box_spectrum(&self, window: &Shape) -> Vec<Complex<R>> {
        let mut buffer = vec![Complex::new(R::zero(), R::zero()); self.shape.len()];
        let padded_strides = contiguous_strides(self.shape.dims());
        for_each_index(window.dims(), |idx| {
            buffer[offset_of(idx, &padded_strides)] = Complex::new(R::one(), R::zero());
        });
        self.forward(&mut buffer);
        buffer
    }

    /// Copies the region `[0, out)` of a padded buffer, mapped to elements.
    pub(crate) fn crop<T: Element<Real = R>>(
        &self,
        buffer: &[Complex<R>],
        out: &Shape,
    ) -> Vec<T> {
        self.crop_with(buffer, out, T::from_complex)
    }

    /// Copies the region `[0, out)` of a padded buffer through `map`.
    pub(crate) fn crop_with<V>(
        &self,
        buffer: &[Complex<R>],
        out: &Shape,
        mut map: impl FnMut(Complex<R>) -> V,
    ) -> Vec<V> {
        let padded_strides = contiguous_strides(self.shape.dims());
        let mut data = Vec::with_capacity(out.len());
        for_each_index(out.dims(), |idx| {
            data.push(map(buffer[offset_of(idx, &padded_strides)]));
        });
        data
    }

    fn process(&self, buffer: &mut [Complex<R>], plans: &[Arc<dyn Fft<R>>]) {
        debug_assert_eq!(buffer.len(), self.shape.len());
        let dims = self.shape.dims();
        let scratch_len = plans
            .iter()
            .map(|p| p.get_inplace_scratch_len())
            .max()
            .unwrap_or(0);
        let mut scratch = vec![Complex::new(R::zero(), R::zero()); scratch_len];
        let mut block = Vec::new();

        for (axis, plan) in plans.iter().enumerate() {
            let len = dims[axis];
            if len <= 1 {
                continue;
            }
            let inner: usize = dims[axis + 1..].iter().product();
            if inner == 1 {
                plan.process_with_scratch(buffer, &mut scratch);
                continue;
            }
            // Each outer block is a `len x inner` matrix; transpose it so the
            // axis runs contiguously, transform, transpose back.
            let block_len = len * inner;
            block.resize(block_len, Complex::new(R::zero(), R::zero()));
            for chunk in buffer.chunks_exact_mut(block_len) {
                for i in 0..len {
                    for r in 0..inner {
                        block[r * len + i] = chunk[i * inner + r];
                    }
                }
                plan.process_with_scratch(&mut block, &mut scratch);
                for i in 0..len {
                    for r in 0..inner {
                        chunk[i * inner + r] = block[r * len + i];
                    }
                }
            }
        }
    }
}

/// Multiplies `lhs` by `rhs` element-wise in place.
pub(crate) fn multiply_in_place<R: Real>(lhs: &mut [Complex<R>], rhs: &[Complex<R>]) {
    for (a, b) in lhs.iter_mut().zip(rhs) {
        *a = *a * *b;
    }
}

/// Conjugates every element in place.
///
/// Multiplying by a conjugated spectrum turns convolution into correlation,
/// the frequency-domain form of reversing and conjugating the kernel.
pub(crate) fn conjugate_in_place<R: Real>(buffer: &mut [Complex<R>]) {
    for value in buffer.iter_mut() {
        value.im = -value.im;
    }
}
