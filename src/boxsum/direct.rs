//! Separable box filter evaluated directly in the spatial domain.

use crate::boxsum::WindowSums;
use crate::scalar::Element;
use crate::tensor::{Shape, Tensor, TensorView};
use num_traits::Zero;
use std::ops::AddAssign;

pub(super) fn window_sums<T: Element>(tensor: &TensorView<'_, T>, window: &Shape) -> WindowSums<T> {
    let len = tensor.shape().len();
    let mut values = Vec::with_capacity(len);
    let mut squares = Vec::with_capacity(len);
    tensor.for_each(|&value| {
        values.push(value);
        squares.push(value.norm_sqr());
    });

    let dims = tensor.shape().dims();
    let (sums, out_dims) = box_filter(values, dims, window.dims());
    let (sums_sq, _) = box_filter(squares, dims, window.dims());
    let shape = Shape::new(out_dims);
    WindowSums::from_parts(
        Tensor::from_raw(sums, shape.clone()),
        Tensor::from_raw(sums_sq, shape),
        window.len(),
    )
}

/// Sums every `window`-shaped box of a contiguous row-major buffer.
///
/// One pass per axis: each output element adds `window[axis]` inputs directly,
/// so there is no running-sum drift. Returns the filtered buffer and its dims.
pub(crate) fn box_filter<V>(mut data: Vec<V>, dims: &[usize], window: &[usize]) -> (Vec<V>, Vec<usize>)
where
    V: Copy + Zero + AddAssign,
{
    let mut dims = dims.to_vec();
    for axis in 0..dims.len() {
        let width = window[axis];
        if width == 1 {
            continue;
        }
        let len = dims[axis];
        let out_len = len - width + 1;
        let inner: usize = dims[axis + 1..].iter().product();
        let src_block = len * inner;
        let dst_block = out_len * inner;

        let mut out = vec![V::zero(); data.len() / src_block * dst_block];
        for (src, dst) in data.chunks_exact(src_block).zip(out.chunks_exact_mut(dst_block)) {
            for (i, row) in dst.chunks_exact_mut(inner).enumerate() {
                for k in 0..width {
                    let start = (i + k) * inner;
                    for (acc, &value) in row.iter_mut().zip(&src[start..start + inner]) {
                        *acc += value;
                    }
                }
            }
        }
        data = out;
        dims[axis] = out_len;
    }
    (data, dims)
}
