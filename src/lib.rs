//! flcc computes local normalized cross-correlation coefficients of a needle
//! against every valid placement in an N-dimensional haystack.
//!
//! Inputs are real (`f32`, `f64`) or complex (`Complex<f32>`, `Complex<f64>`)
//! tensors of any rank. Four entry points share one result contract:
//!
//! - [`lcc`]: direct sliding-window evaluation, the reference.
//! - [`flcc`]: the same field via zero-padded FFTs.
//! - [`flcc_prepare`] / [`flcc_complete`]: haystack work done once in a
//!   [`FlccSession`], then one cheap completion per needle.
//!
//! Coefficients are magnitudes in `[0, 1]`, so a needle scaled by any
//! nonzero real or complex gain and shifted by any offset still scores `1`
//! at its source. Flat windows and flat needles score `0`.
//! Row-parallel direct evaluation is available with the `rayon` feature and
//! spans/events with the `tracing` feature.
//!
//! ```
//! use flcc::{flcc, Tensor};
//!
//! let haystack = Tensor::from_fn([64, 48], |i| {
//!     ((31 * i[0] * i[0] + 17 * i[1] * i[1] + 7 * i[0] * i[1]) % 101) as f64
//! })
//! .unwrap();
//! let needle = haystack.view().roi(&[20, 9], [6, 5]).unwrap().to_tensor();
//! let field = flcc(haystack.view(), needle.view()).unwrap();
//! assert_eq!(field.argmax(), Some(vec![20, 9]));
//! ```

pub mod boxsum;
pub mod candidate;
pub(crate) mod fft;
pub mod kernel;
pub mod lowlevel;
pub mod normalize;
pub mod scalar;
pub mod search;
pub mod session;
pub mod tensor;
mod trace;
pub mod util;

pub use boxsum::{window_sums, BoxSumMode, WindowSums};
pub use kernel::direct::{lcc, lcc_at, lcc_with_tolerance};
pub use kernel::fft::{flcc, flcc_with_tolerance};
pub use kernel::{DirectKernel, FftKernel, Kernel};
pub use normalize::NeedleStats;
pub use scalar::{Element, Real};
pub use search::{CorrelationConfig, Correlator, Method};
pub use session::{flcc_complete, flcc_prepare, FlccSession};
pub use tensor::{Shape, Tensor, TensorView};
pub use util::{FlccError, FlccResult};

pub use candidate::topk::Peak;
pub use num_complex::Complex;

#[cfg(feature = "rayon")]
pub use kernel::rayon::{lcc_par, lcc_par_with_tolerance};
#[cfg(feature = "rayon")]
pub use kernel::ParallelDirectKernel;
