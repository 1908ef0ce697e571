//! Row-major multi-index helpers.

/// Calls `f` for every multi-index of `dims` in row-major order.
///
/// A rank-0 shape visits the single empty index; any zero extent visits
/// nothing.
pub(crate) fn for_each_index(dims: &[usize], mut f: impl FnMut(&[usize])) {
    if dims.contains(&0) {
        return;
    }
    let mut index = vec![0usize; dims.len()];
    loop {
        f(&index);
        let mut axis = dims.len();
        loop {
            if axis == 0 {
                return;
            }
            axis -= 1;
            index[axis] += 1;
            if index[axis] < dims[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
}

/// Dot product of a multi-index with element strides.
#[inline]
pub(crate) fn offset_of(index: &[usize], strides: &[usize]) -> usize {
    index.iter().zip(strides).map(|(i, s)| i * s).sum()
}

/// Converts a row-major linear index into a multi-index.
pub(crate) fn unravel(mut linear: usize, dims: &[usize], out: &mut [usize]) {
    for axis in (0..dims.len()).rev() {
        let extent = dims[axis];
        out[axis] = linear % extent;
        linear /= extent;
    }
}

/// Row-major strides for a contiguous buffer.
pub(crate) fn contiguous_strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1usize; dims.len()];
    for axis in (0..dims.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * dims[axis + 1];
    }
    strides
}
