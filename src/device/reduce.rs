//! Reduction of one group's per-worker partial sums to a single total.
//!
//! The partial sums live in the group's shared memory, one slot per worker.
//! Each stage halves the number of active workers: worker `w < active` adds the
//! slot of worker `w + active` into its own. Stages are separated by barriers,
//! all the way down to the last pair, so the result does not depend on workers
//! executing in lock-step. For a fixed group size the order of additions is
//! fixed, so the result is deterministic.

/// Sum of `partials`, whose length must be a power of two. The slots are used
/// as scratch space and are left in an unspecified state.
pub fn reduce_group(partials: &mut [f64]) -> f64 {
    debug_assert!(partials.len().is_power_of_two(), "group size {} is not a power of two", partials.len());
    let mut active = partials.len() / 2;
    while active > 0 {
        let (low, high) = partials.split_at_mut(active);
        for (mine, theirs) in low.iter_mut().zip(&high[..active]) {
            *mine += *theirs;
        }
        // -- barrier --
        active /= 2;
    }
    partials.first().copied().unwrap_or(0.0)
}
