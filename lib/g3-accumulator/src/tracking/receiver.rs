/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use super::DeliveryInfo;

/// Read side of the delivery notification queue.
#[derive(Clone)]
pub struct DeliveryReceiver {
    inner: kanal::Receiver<DeliveryInfo>,
}

impl DeliveryReceiver {
    pub(super) fn new(inner: kanal::Receiver<DeliveryInfo>) -> Self {
        DeliveryReceiver { inner }
    }

    /// Block until a notification is available.
    ///
    /// Returns `None` once tracking has been closed or re-enabled and all
    /// queued notifications have been drained.
    pub fn recv(&self) -> Option<DeliveryInfo> {
        self.inner.recv().ok()
    }

    pub fn try_recv(&self) -> Option<DeliveryInfo> {
        self.inner.try_recv().ok().flatten()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }
}

impl Iterator for DeliveryReceiver {
    type Item = DeliveryInfo;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}
