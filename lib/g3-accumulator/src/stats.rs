/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub(crate) struct AccumulatorStats {
    stored: AtomicU64,
    dropped: AtomicU64,
    discarded: AtomicU64,
    errors: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccumulatorStatsSnapshot {
    pub stored: u64,
    /// measurements without any field
    pub dropped: u64,
    pub discarded: u64,
    pub errors: u64,
}

impl AccumulatorStats {
    pub(crate) fn add_stored(&self) {
        self.stored.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> AccumulatorStatsSnapshot {
        AccumulatorStatsSnapshot {
            stored: self.stored.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn initial_state() {
        let stats = AccumulatorStats::default();
        assert_eq!(stats.snapshot(), AccumulatorStatsSnapshot::default());
    }

    #[test]
    fn concurrent_updates() {
        let stats = Arc::new(AccumulatorStats::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = stats.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        stats.add_stored();
                        stats.add_dropped();
                    }
                    stats.add_error();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snap = stats.snapshot();
        assert_eq!(snap.stored, 400);
        assert_eq!(snap.dropped, 400);
        assert_eq!(snap.discarded, 0);
        assert_eq!(snap.errors, 4);
    }
}
