//! Integer helpers for shapes and transform sizes.

/// Returns the product of `dims`, or `None` on overflow.
pub(crate) fn checked_product(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Returns true when `n` has no prime factor above 7.
fn is_smooth(mut n: usize) -> bool {
    if n == 0 {
        return false;
    }
    for p in [2, 3, 5, 7] {
        while n % p == 0 {
            n /= p;
        }
    }
    n == 1
}

/// Smallest 7-smooth length that is at least `n`.
///
/// Mixed-radix FFTs on 7-smooth lengths stay close to power-of-two speed
/// while padding far less than `next_power_of_two`.
pub(crate) fn fast_len(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    let mut len = n;
    while !is_smooth(len) {
        len += 1;
    }
    len
}
