/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::Accumulator;

// Both waits hold the main lock while checking, keep them off hot paths.
impl Accumulator {
    /// Block until at least `n` submissions have been seen.
    pub fn wait_for_count(&self, n: u64) {
        let state = self.state.lock().unwrap();
        let _state = self
            .cond
            .wait_while(state, |_| self.count() < n)
            .unwrap();
    }

    /// Block until at least `n` errors have been recorded.
    pub fn wait_for_error_count(&self, n: usize) {
        let state = self.state.lock().unwrap();
        let _state = self
            .cond
            .wait_while(state, |state| state.errors.len() < n)
            .unwrap();
    }
}
