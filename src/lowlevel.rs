//! Building blocks for custom correlation pipelines.
//!
//! These expose the window-sum engine, the normalization step and the peak
//! helpers separately, for callers that compute raw cross terms themselves
//! (for example on another device) against the mean-removed needle from
//! [`NeedleStats::center`] and only need the local normalization.
//! Most users should prefer [`crate::flcc`], [`crate::FlccSession`] or
//! [`crate::Correlator`].

pub use crate::boxsum::{window_sums, BoxSumMode, WindowSums};
pub use crate::candidate::nms::nms_nd;
pub use crate::candidate::topk::{Peak, TopK};
pub use crate::candidate::{select_peaks, top_peaks};
pub use crate::kernel::{DirectKernel, FftKernel, Kernel};
pub use crate::normalize::{correlate, NeedleStats};
