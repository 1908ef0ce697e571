//! Configurable front end over the correlation kernels.
//!
//! `Correlator` picks the direct or FFT kernel (or lets a cost model decide),
//! resolves the flat-window tolerance for the element type, and extracts
//! peaks from the resulting field.

use crate::candidate::select_peaks;
use crate::candidate::topk::Peak;
use crate::kernel::{resolve_tolerance, validate_pair, DirectKernel, FftKernel, Kernel};
use crate::scalar::Element;
use crate::session::FlccSession;
use crate::tensor::{Shape, Tensor, TensorView};
use crate::trace::trace_event;
use crate::util::math::fast_len;
use crate::util::FlccResult;

/// Relative cost of one padded FFT element against one direct multiply-add.
///
/// Covers the five transforms of a one-shot FLCC plus padding and cropping.
const FFT_COST_FACTOR: f64 = 12.0;

/// Correlation method selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// Direct sliding-window sums and inner products.
    Direct,
    /// FFT-accelerated computation.
    Fft,
    /// Choose per call from the estimated cost of each method.
    Auto,
}

/// Configuration for correlation runs.
#[derive(Clone, Debug)]
pub struct CorrelationConfig {
    /// Kernel selection.
    pub method: Method,
    /// Relative variance below which a window or needle counts as flat.
    /// `None` uses `sqrt(epsilon)` of the element's real type.
    pub variance_tolerance: Option<f64>,
    /// Run the direct kernel row-parallel (requires the `rayon` feature,
    /// otherwise ignored).
    pub parallel: bool,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            method: Method::Auto,
            variance_tolerance: None,
            parallel: false,
        }
    }
}

/// Local correlation front end.
#[derive(Clone, Debug, Default)]
pub struct Correlator {
    cfg: CorrelationConfig,
}

impl Correlator {
    /// Creates a correlator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: CorrelationConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CorrelationConfig {
        &self.cfg
    }

    /// Computes the correlation field of `needle` over `haystack`.
    pub fn correlate<T: Element>(
        &self,
        haystack: TensorView<'_, T>,
        needle: TensorView<'_, T>,
    ) -> FlccResult<Tensor<T::Real>> {
        let tolerance = resolve_tolerance::<T::Real>(self.cfg.variance_tolerance)?;
        let method = self.resolve_method(haystack.shape(), needle.shape())?;
        trace_event!(
            "correlate",
            fft = method == Method::Fft,
            parallel = self.cfg.parallel
        );
        match method {
            Method::Fft => FftKernel::correlate(haystack, needle, tolerance),
            _ => self.correlate_direct(haystack, needle, tolerance),
        }
    }

    /// Prepares a reusable session for needles of shape `window`.
    pub fn prepare<T: Element>(
        &self,
        haystack: TensorView<'_, T>,
        window: &Shape,
    ) -> FlccResult<FlccSession<T>> {
        let tolerance = resolve_tolerance::<T::Real>(self.cfg.variance_tolerance)?;
        FlccSession::prepare_with_tolerance(haystack, window, tolerance)
    }

    /// Returns the best-matching placement, or `None` if every score is NaN.
    pub fn best_match<T: Element>(
        &self,
        haystack: TensorView<'_, T>,
        needle: TensorView<'_, T>,
    ) -> FlccResult<Option<Peak<T::Real>>> {
        Ok(self.top_matches(haystack, needle, 1, 0)?.into_iter().next())
    }

    /// Returns up to `k` placements, best first, pairwise farther apart than
    /// `nms_radius` on some axis.
    pub fn top_matches<T: Element>(
        &self,
        haystack: TensorView<'_, T>,
        needle: TensorView<'_, T>,
        k: usize,
        nms_radius: usize,
    ) -> FlccResult<Vec<Peak<T::Real>>> {
        let field = self.correlate(haystack, needle)?;
        Ok(select_peaks(&field, k, nms_radius))
    }

    /// Method that `correlate` would use for these shapes.
    pub fn resolve_method(&self, haystack: &Shape, needle: &Shape) -> FlccResult<Method> {
        let valid = validate_pair(haystack, needle)?;
        Ok(match self.cfg.method {
            Method::Auto => {
                if direct_cost(&valid, needle) <= fft_cost(haystack, needle) {
                    Method::Direct
                } else {
                    Method::Fft
                }
            }
            method => method,
        })
    }

    #[cfg(feature = "rayon")]
    fn correlate_direct<T: Element>(
        &self,
        haystack: TensorView<'_, T>,
        needle: TensorView<'_, T>,
        tolerance: T::Real,
    ) -> FlccResult<Tensor<T::Real>> {
        if self.cfg.parallel {
            crate::kernel::ParallelDirectKernel::correlate(haystack, needle, tolerance)
        } else {
            DirectKernel::correlate(haystack, needle, tolerance)
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn correlate_direct<T: Element>(
        &self,
        haystack: TensorView<'_, T>,
        needle: TensorView<'_, T>,
        tolerance: T::Real,
    ) -> FlccResult<Tensor<T::Real>> {
        DirectKernel::correlate(haystack, needle, tolerance)
    }
}

fn direct_cost(valid: &Shape, needle: &Shape) -> f64 {
    valid.len() as f64 * needle.len() as f64
}

fn fft_cost(haystack: &Shape, needle: &Shape) -> f64 {
    let padded: f64 = haystack
        .dims()
        .iter()
        .zip(needle.dims())
        .map(|(&h, &n)| fast_len(h + n - 1) as f64)
        .product();
    FFT_COST_FACTOR * padded * padded.log2().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::{CorrelationConfig, Correlator, Method};
    use crate::tensor::{Shape, Tensor};
    use crate::util::FlccError;

    #[test]
    fn auto_prefers_direct_for_tiny_needles_and_fft_for_large_ones() {
        let correlator = Correlator::new();
        let small = correlator
            .resolve_method(&Shape::from([64, 64]), &Shape::from([2, 2]))
            .unwrap();
        assert_eq!(small, Method::Direct);
        let large = correlator
            .resolve_method(&Shape::from([512, 512]), &Shape::from([64, 64]))
            .unwrap();
        assert_eq!(large, Method::Fft);
    }

    #[test]
    fn explicit_method_is_respected() {
        let correlator = Correlator::new().with_config(CorrelationConfig {
            method: Method::Fft,
            ..CorrelationConfig::default()
        });
        let method = correlator
            .resolve_method(&Shape::from([8]), &Shape::from([2]))
            .unwrap();
        assert_eq!(method, Method::Fft);
    }

    #[test]
    fn invalid_tolerance_is_rejected() {
        let correlator = Correlator::new().with_config(CorrelationConfig {
            variance_tolerance: Some(-0.5),
            ..CorrelationConfig::default()
        });
        let haystack = Tensor::from_fn([10], |i| i[0] as f64).unwrap();
        let needle = Tensor::from_fn([3], |i| i[0] as f64).unwrap();
        let err = correlator
            .correlate(haystack.view(), needle.view())
            .unwrap_err();
        assert!(matches!(err, FlccError::InvalidInput(_)));
    }

    #[test]
    fn best_match_locates_planted_needle() {
        let haystack = Tensor::from_fn([40, 30], |i| {
            ((i[0] * 31 + i[1] * 17) % 23) as f64 + (i[1] as f64).sin() + (i[0] as f64 * 0.37).cos()
        })
        .unwrap();
        let needle = haystack
            .view()
            .roi(&[11, 7], [5, 4])
            .unwrap()
            .to_tensor()
            .map(|v| 3.0 * v - 1.0);
        for method in [Method::Direct, Method::Fft, Method::Auto] {
            let correlator = Correlator::new().with_config(CorrelationConfig {
                method,
                ..CorrelationConfig::default()
            });
            let best = correlator
                .best_match(haystack.view(), needle.view())
                .unwrap()
                .unwrap();
            assert_eq!(best.index, vec![11, 7]);
            assert!((best.score - 1.0).abs() < 1e-9);
        }
    }
}
