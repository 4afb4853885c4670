//! Sliding-window dataset construction.

/// Builds (window, next value) training pairs from a series.
///
/// Window `i` covers `data[i..i + window]` and its target is
/// `data[i + window]`. A series of length `n` yields `n - window - 1`
/// pairs, so the final observation is never used as a target.
pub fn create_dataset(data: &[f64], window: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    if data.len() < window + 2 {
        return (Vec::new(), Vec::new());
    }

    let pairs = data.len() - window - 1;
    let mut windows = Vec::with_capacity(pairs);
    let mut targets = Vec::with_capacity(pairs);
    for i in 0..pairs {
        windows.push(data[i..i + window].to_vec());
        targets.push(data[i + window]);
    }
    (windows, targets)
}

/// Number of leading pairs assigned to the training set.
///
/// Truncates toward zero, so small datasets can end up with an empty
/// training set.
pub fn train_len(pairs: usize, split: f64) -> usize {
    (pairs as f64 * split) as usize
}
