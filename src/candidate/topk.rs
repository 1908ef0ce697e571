//! Top-K tracking of correlation peaks.

use crate::scalar::Real;
use num_traits::Float;
use std::cmp::Ordering;

/// A placement in a correlation field and its coefficient.
#[derive(Clone, Debug, PartialEq)]
pub struct Peak<R> {
    /// Multi-index of the placement (window origin in the haystack).
    pub index: Vec<usize>,
    /// Correlation coefficient at the placement.
    pub score: R,
}

/// Descending score, then ascending row-major index.
pub(crate) fn peak_cmp_desc<R: Real>(a: &Peak<R>, b: &Peak<R>) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.index.cmp(&b.index))
}

/// Sorts peaks by descending score with deterministic tie-breaking.
pub(crate) fn sort_peaks_desc<R: Real>(peaks: &mut [Peak<R>]) {
    peaks.sort_by(peak_cmp_desc);
}

/// Top-K container; insertion is O(1) when the candidate loses to the
/// current worst entry and O(k) when it replaces it.
pub struct TopK<R> {
    k: usize,
    items: Vec<Peak<R>>,
    worst: usize,
}

impl<R: Real> TopK<R> {
    /// Creates a new Top-K collector.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            items: Vec::with_capacity(k),
            worst: 0,
        }
    }

    /// Returns true if `score` would enter the collector.
    pub fn accepts(&self, score: R) -> bool {
        if self.k == 0 || score.is_nan() {
            return false;
        }
        self.items.len() < self.k || score >= self.items[self.worst].score
    }

    /// Pushes a peak, evicting the lowest-ranked one if at capacity.
    /// NaN scores are ignored.
    pub fn push(&mut self, peak: Peak<R>) {
        if !self.accepts(peak.score) {
            return;
        }
        if self.items.len() < self.k {
            self.items.push(peak);
        } else if peak_cmp_desc(&peak, &self.items[self.worst]) == Ordering::Less {
            self.items[self.worst] = peak;
        } else {
            return;
        }
        self.refresh_worst();
    }

    /// Returns peaks sorted by descending score.
    pub fn into_sorted_desc(mut self) -> Vec<Peak<R>> {
        sort_peaks_desc(&mut self.items);
        self.items
    }

    fn refresh_worst(&mut self) {
        let mut worst = 0usize;
        for (idx, item) in self.items.iter().enumerate().skip(1) {
            if peak_cmp_desc(item, &self.items[worst]) == Ordering::Greater {
                worst = idx;
            }
        }
        self.worst = worst;
    }
}

#[cfg(test)]
mod tests {
    use super::{Peak, TopK};

    fn peak(index: &[usize], score: f64) -> Peak<f64> {
        Peak {
            index: index.to_vec(),
            score,
        }
    }

    #[test]
    fn keeps_highest_scores_in_order() {
        let mut topk = TopK::new(2);
        topk.push(peak(&[0, 1], 0.2));
        topk.push(peak(&[3, 3], 0.9));
        topk.push(peak(&[1, 0], 0.5));
        topk.push(peak(&[2, 2], f64::NAN));
        let peaks = topk.into_sorted_desc();
        assert_eq!(peaks, vec![peak(&[3, 3], 0.9), peak(&[1, 0], 0.5)]);
    }

    #[test]
    fn ties_prefer_lower_index() {
        let mut topk = TopK::new(1);
        topk.push(peak(&[4], 0.7));
        topk.push(peak(&[2], 0.7));
        topk.push(peak(&[9], 0.7));
        assert_eq!(topk.into_sorted_desc(), vec![peak(&[2], 0.7)]);
    }

    #[test]
    fn zero_capacity_collects_nothing() {
        let mut topk = TopK::new(0);
        topk.push(peak(&[0], 1.0));
        assert!(topk.into_sorted_desc().is_empty());
    }
}
