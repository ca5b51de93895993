//! Deterministic frame index selection.

/// Pick up to `k` evenly spaced frame indices in `[0, total)`.
///
/// - `total == 0` yields nothing.
/// - `k >= total` yields every index.
/// - otherwise index `i` is `i * (total - 1) / (k - 1)` with integer
///   truncation, so the first and last frame are always included for `k >= 2`.
///
/// The output is strictly increasing.
pub fn sample_indices(total: u64, k: usize) -> Vec<u64> {
    if total == 0 || k == 0 {
        return Vec::new();
    }
    if k as u64 >= total {
        return (0..total).collect();
    }
    if k == 1 {
        return vec![0];
    }
    let span = (total - 1) as u128;
    let steps = (k - 1) as u128;
    (0..k as u128)
        .map(|i| (i * span / steps) as u64)
        .collect()
}
