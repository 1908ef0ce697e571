//! Non-maximum suppression over N-dimensional placements.

use crate::candidate::topk::{sort_peaks_desc, Peak};
use crate::scalar::Real;

/// Chebyshev distance between two multi-indices of equal rank.
pub(crate) fn chebyshev(a: &[usize], b: &[usize]) -> usize {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}

/// Applies non-maximum suppression using Chebyshev distance on every axis.
///
/// Peaks are sorted by descending score and kept if they are farther than
/// `radius` from all previously kept peaks.
pub fn nms_nd<R: Real>(peaks: &mut [Peak<R>], radius: usize) -> Vec<Peak<R>> {
    sort_peaks_desc(peaks);
    if radius == 0 {
        return peaks.to_vec();
    }
    greedy_select(peaks.iter().cloned(), radius, usize::MAX)
}

/// Greedy suppression over `candidates` already in descending score order.
///
/// Keeps a candidate when it is farther than `radius` from every kept peak and
/// stops after `limit` peaks.
pub(crate) fn greedy_select<R: Real>(
    candidates: impl IntoIterator<Item = Peak<R>>,
    radius: usize,
    limit: usize,
) -> Vec<Peak<R>> {
    let mut kept: Vec<Peak<R>> = Vec::new();
    if limit == 0 {
        return kept;
    }
    for peak in candidates {
        if kept
            .iter()
            .all(|k| chebyshev(&k.index, &peak.index) > radius)
        {
            kept.push(peak);
            if kept.len() == limit {
                break;
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::{chebyshev, greedy_select, nms_nd};
    use crate::candidate::topk::Peak;

    #[test]
    fn chebyshev_uses_largest_axis_gap() {
        assert_eq!(chebyshev(&[1, 5, 2], &[4, 4, 2]), 3);
        assert_eq!(chebyshev(&[], &[]), 0);
    }

    #[test]
    fn suppresses_neighbours_in_3d() {
        let mut peaks = vec![
            Peak { index: vec![5, 5, 5], score: 0.8 },
            Peak { index: vec![5, 6, 4], score: 0.95 },
            Peak { index: vec![0, 0, 0], score: 0.5 },
            Peak { index: vec![5, 8, 5], score: 0.7 },
        ];
        let kept = nms_nd(&mut peaks, 1);
        let indices: Vec<Vec<usize>> = kept.iter().map(|p| p.index.clone()).collect();
        assert_eq!(indices, vec![vec![5, 6, 4], vec![5, 8, 5], vec![0, 0, 0]]);
    }

    #[test]
    fn greedy_select_stops_at_limit() {
        let peaks = vec![
            Peak { index: vec![0, 0], score: 0.9 },
            Peak { index: vec![0, 1], score: 0.8 },
            Peak { index: vec![4, 4], score: 0.6 },
            Peak { index: vec![9, 9], score: 0.5 },
        ];
        let kept = greedy_select(peaks.clone(), 1, 2);
        let indices: Vec<Vec<usize>> = kept.iter().map(|p| p.index.clone()).collect();
        assert_eq!(indices, vec![vec![0, 0], vec![4, 4]]);
        assert!(greedy_select(peaks, 1, 0).is_empty());
    }
}
