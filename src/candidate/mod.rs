//! Peak extraction from correlation fields.

pub mod nms;
pub mod topk;

use crate::scalar::Real;
use crate::tensor::index::unravel;
use crate::tensor::Tensor;
use nms::greedy_select;
use num_traits::Float;
use std::cmp::Ordering;
use topk::{Peak, TopK};

/// Returns the `k` highest-scoring placements of `field`, best first.
pub fn top_peaks<R: Real>(field: &Tensor<R>, k: usize) -> Vec<Peak<R>> {
    let dims = field.shape().dims();
    let mut topk = TopK::new(k);
    for (linear, &score) in field.data().iter().enumerate() {
        if !topk.accepts(score) {
            continue;
        }
        let mut index = vec![0usize; dims.len()];
        unravel(linear, dims, &mut index);
        topk.push(Peak { index, score });
    }
    topk.into_sorted_desc()
}

/// Returns up to `k` peaks that are pairwise farther apart than `radius`
/// (Chebyshev distance), best first.
///
/// With `radius == 0` this is [`top_peaks`].
pub fn select_peaks<R: Real>(field: &Tensor<R>, k: usize, radius: usize) -> Vec<Peak<R>> {
    if radius == 0 || k == 0 {
        return top_peaks(field, k);
    }
    let data = field.data();
    let dims = field.shape().dims();
    let mut order: Vec<usize> = (0..data.len()).filter(|&i| !data[i].is_nan()).collect();
    order.sort_by(|&a, &b| {
        data[b]
            .partial_cmp(&data[a])
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.cmp(&b))
    });

    // Row-major linear order matches the index tie-break of `nms_nd`.
    let candidates = order.into_iter().map(|linear| {
        let mut index = vec![0usize; dims.len()];
        unravel(linear, dims, &mut index);
        Peak {
            index,
            score: data[linear],
        }
    });
    greedy_select(candidates, radius, k)
}
