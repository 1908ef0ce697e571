//! N-dimensional tensors and borrowed strided views.
//!
//! `Tensor` owns a contiguous row-major buffer. `TensorView` borrows a buffer
//! with explicit element strides, so a window cut out of a larger tensor with
//! [`TensorView::roi`] is zero-copy and keeps its parent's strides. The rank is
//! fixed when a shape is built and every kernel loops over it generically.

use crate::scalar::Real;
use crate::util::math::checked_product;
use crate::util::{FlccError, FlccResult};
use num_traits::Float;

pub(crate) mod index;

use index::{contiguous_strides, for_each_index, offset_of, unravel};

/// Extents of a tensor, one per axis.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Creates a shape from per-axis extents.
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        Self { dims: dims.into() }
    }

    /// Returns the per-axis extents.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the number of axes.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the element count, or `None` if it overflows.
    pub fn checked_len(&self) -> Option<usize> {
        checked_product(&self.dims)
    }

    /// Returns the element count (saturating on overflow).
    pub fn len(&self) -> usize {
        self.checked_len().unwrap_or(usize::MAX)
    }

    /// Returns true if some axis has zero extent.
    pub fn is_empty(&self) -> bool {
        self.dims.contains(&0)
    }

    /// Returns the shape of valid placements of `window` inside `self`.
    ///
    /// `None` if the ranks differ or the window does not fit on some axis.
    pub fn valid_positions(&self, window: &Shape) -> Option<Shape> {
        if self.rank() != window.rank() {
            return None;
        }
        let dims = self
            .dims
            .iter()
            .zip(&window.dims)
            .map(|(&outer, &inner)| outer.checked_sub(inner).map(|d| d + 1))
            .collect::<Option<Vec<_>>>()?;
        Some(Self { dims })
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self { dims }
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self {
            dims: dims.to_vec(),
        }
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self {
            dims: dims.to_vec(),
        }
    }
}

impl From<&Shape> for Shape {
    fn from(shape: &Shape) -> Self {
        shape.clone()
    }
}

/// Owned N-dimensional tensor in contiguous row-major order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "TensorParts<T>",
        bound(deserialize = "T: serde::Deserialize<'de>")
    )
)]
pub struct Tensor<T> {
    shape: Shape,
    data: Vec<T>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct TensorParts<T> {
    shape: Shape,
    data: Vec<T>,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<TensorParts<T>> for Tensor<T> {
    type Error = FlccError;

    fn try_from(parts: TensorParts<T>) -> FlccResult<Self> {
        Tensor::new(parts.data, parts.shape)
    }
}

impl<T> Tensor<T> {
    /// Wraps a row-major buffer; its length must equal the element count.
    pub fn new(data: Vec<T>, shape: impl Into<Shape>) -> FlccResult<Self> {
        let shape = shape.into();
        let needed = element_count(&shape)?;
        if data.len() != needed {
            return Err(FlccError::LengthMismatch {
                shape: shape.dims,
                needed,
                got: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Wraps a buffer whose length is already known to match `shape`.
    pub(crate) fn from_raw(data: Vec<T>, shape: Shape) -> Self {
        debug_assert_eq!(shape.checked_len(), Some(data.len()));
        Self { shape, data }
    }

    /// Builds a tensor by evaluating `f` at every multi-index.
    pub fn from_fn(shape: impl Into<Shape>, mut f: impl FnMut(&[usize]) -> T) -> FlccResult<Self> {
        let shape = shape.into();
        let needed = element_count(&shape)?;
        let mut data = Vec::with_capacity(needed);
        for_each_index(shape.dims(), |idx| data.push(f(idx)));
        Ok(Self { shape, data })
    }

    /// Returns the tensor shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the tensor holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the row-major element buffer.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consumes the tensor and returns its buffer.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Returns the element at a multi-index, if in bounds.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        if !in_bounds(index, self.shape.dims()) {
            return None;
        }
        let strides = contiguous_strides(self.shape.dims());
        self.data.get(offset_of(index, &strides))
    }

    /// Returns a contiguous borrowed view.
    pub fn view(&self) -> TensorView<'_, T> {
        TensorView {
            data: &self.data,
            strides: contiguous_strides(self.shape.dims()),
            shape: self.shape.clone(),
        }
    }

    /// Applies `f` element-wise.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Tensor<U> {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Clone> Tensor<T> {
    /// Creates a tensor with every element set to `value`.
    pub fn filled(shape: impl Into<Shape>, value: T) -> FlccResult<Self> {
        let shape = shape.into();
        let needed = element_count(&shape)?;
        Ok(Self {
            shape,
            data: vec![value; needed],
        })
    }
}

impl<R: Real> Tensor<R> {
    /// Returns the multi-index of the largest element.
    ///
    /// Ties resolve to the first element in row-major order and NaNs are
    /// skipped; `None` if no element is comparable.
    pub fn argmax(&self) -> Option<Vec<usize>> {
        let mut best: Option<(usize, R)> = None;
        for (linear, &value) in self.data.iter().enumerate() {
            if value.is_nan() {
                continue;
            }
            match best {
                Some((_, top)) if value <= top => {}
                _ => best = Some((linear, value)),
            }
        }
        let (linear, _) = best?;
        let mut index = vec![0usize; self.shape.rank()];
        unravel(linear, self.shape.dims(), &mut index);
        Some(index)
    }

    /// Returns the largest non-NaN element.
    pub fn max(&self) -> Option<R> {
        let index = self.argmax()?;
        self.get(&index).copied()
    }
}

/// Borrowed N-dimensional view with explicit element strides.
#[derive(Clone, Debug)]
pub struct TensorView<'a, T> {
    data: &'a [T],
    shape: Shape,
    strides: Vec<usize>,
}

impl<'a, T> TensorView<'a, T> {
    /// Creates a contiguous row-major view; `data` must match the shape exactly.
    pub fn from_slice(data: &'a [T], shape: impl Into<Shape>) -> FlccResult<Self> {
        let shape = shape.into();
        let needed = element_count(&shape)?;
        if data.len() != needed {
            return Err(FlccError::LengthMismatch {
                shape: shape.dims,
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            strides: contiguous_strides(shape.dims()),
            shape,
        })
    }

    /// Creates a view with explicit strides (in elements, one per axis).
    pub fn new(data: &'a [T], shape: impl Into<Shape>, strides: Vec<usize>) -> FlccResult<Self> {
        let shape = shape.into();
        if strides.len() != shape.rank() {
            return Err(FlccError::InvalidInput("one stride per axis is required"));
        }
        let needed = required_len(&shape, &strides)?;
        if data.len() < needed {
            return Err(FlccError::LengthMismatch {
                shape: shape.dims,
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            shape,
            strides,
        })
    }

    /// Returns the view shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the element strides.
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Returns the number of axes.
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Returns the backing slice, including elements outside the view.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns true if the view is row-major without gaps.
    pub fn is_contiguous(&self) -> bool {
        self.strides == contiguous_strides(self.shape.dims())
    }

    /// Returns the element at a multi-index, if in bounds.
    pub fn get(&self, index: &[usize]) -> Option<&'a T> {
        if !in_bounds(index, self.shape.dims()) {
            return None;
        }
        self.data.get(offset_of(index, &self.strides))
    }

    /// Returns a zero-copy view of the window at `origin` with `shape`.
    pub fn roi(&self, origin: &[usize], shape: impl Into<Shape>) -> FlccResult<TensorView<'a, T>> {
        let shape = shape.into();
        let out_of_bounds = || FlccError::RoiOutOfBounds {
            origin: origin.to_vec(),
            shape: shape.dims().to_vec(),
            bounds: self.shape.dims().to_vec(),
        };
        if origin.len() != self.rank() || shape.rank() != self.rank() {
            return Err(out_of_bounds());
        }
        for ((&start, &extent), &bound) in origin.iter().zip(shape.dims()).zip(self.shape.dims()) {
            match start.checked_add(extent) {
                Some(end) if end <= bound => {}
                _ => return Err(out_of_bounds()),
            }
        }
        let data = if shape.is_empty() {
            &self.data[..0]
        } else {
            let start = offset_of(origin, &self.strides);
            self.data.get(start..).ok_or_else(out_of_bounds)?
        };
        Ok(TensorView {
            data,
            shape,
            strides: self.strides.clone(),
        })
    }

    /// Calls `f` with every element in row-major order.
    pub(crate) fn for_each(&self, mut f: impl FnMut(&'a T)) {
        let data = self.data;
        let strides = &self.strides;
        for_each_index(self.shape.dims(), |idx| f(&data[offset_of(idx, strides)]));
    }

    /// Applies `f` element-wise into an owned contiguous tensor.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Tensor<U> {
        let mut data = Vec::with_capacity(self.shape.len());
        self.for_each(|value| data.push(f(value)));
        Tensor {
            shape: self.shape.clone(),
            data,
        }
    }
}

impl<T: Clone> TensorView<'_, T> {
    /// Copies the view into an owned contiguous tensor.
    pub fn to_tensor(&self) -> Tensor<T> {
        self.map(T::clone)
    }
}

impl<'a, T> From<&'a Tensor<T>> for TensorView<'a, T> {
    fn from(tensor: &'a Tensor<T>) -> Self {
        tensor.view()
    }
}

fn element_count(shape: &Shape) -> FlccResult<usize> {
    shape.checked_len().ok_or_else(|| FlccError::InvalidDimensions {
        shape: shape.dims().to_vec(),
    })
}

fn in_bounds(index: &[usize], dims: &[usize]) -> bool {
    index.len() == dims.len() && index.iter().zip(dims).all(|(i, d)| i < d)
}

fn required_len(shape: &Shape, strides: &[usize]) -> FlccResult<usize> {
    let overflow = || FlccError::InvalidDimensions {
        shape: shape.dims().to_vec(),
    };
    element_count(shape)?;
    if shape.is_empty() {
        return Ok(0);
    }
    let mut last = 0usize;
    for (&extent, &stride) in shape.dims().iter().zip(strides) {
        let reach = (extent - 1).checked_mul(stride).ok_or_else(overflow)?;
        last = last.checked_add(reach).ok_or_else(overflow)?;
    }
    last.checked_add(1).ok_or_else(overflow)
}
