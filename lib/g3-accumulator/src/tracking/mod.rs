/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use foldhash::fast::FixedState;
use log::{debug, error, warn};

mod receiver;
pub use receiver::DeliveryReceiver;

static ATOMIC_TRACKING_ID: AtomicU64 = AtomicU64::new(1); // start from 1

/// Opaque handle correlating a tracked submission with its notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackingId(u64);

impl TrackingId {
    /// Create a TrackingId that is unique in current process
    fn new_unique() -> Self {
        TrackingId(ATOMIC_TRACKING_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Terminal message for a resolved obligation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeliveryInfo {
    id: TrackingId,
    delivered: bool,
    accepted: usize,
}

impl DeliveryInfo {
    #[inline]
    pub fn id(&self) -> TrackingId {
        self.id
    }

    #[inline]
    pub fn delivered(&self) -> bool {
        self.delivered
    }

    /// Number of members that were reported as accepted.
    #[inline]
    pub fn accepted(&self) -> usize {
        self.accepted
    }
}

struct Obligation {
    members: usize,
    acknowledged: usize,
    accepted: usize,
}

struct DeliveryQueue {
    capacity: usize,
    sender: Option<kanal::Sender<DeliveryInfo>>,
    receiver: kanal::Receiver<DeliveryInfo>,
    delivered: Vec<DeliveryInfo>,
}

/// Bookkeeping for tracked submissions.
///
/// The queue lock only guards (re)initialization and the resolved history,
/// the obligation table has its own lock. Neither is ever taken while the
/// accumulator lock is held.
pub struct DeliveryTracker {
    queue: Mutex<Option<DeliveryQueue>>,
    obligations: Mutex<HashMap<TrackingId, Obligation, FixedState>>,
}

impl Default for DeliveryTracker {
    fn default() -> Self {
        DeliveryTracker {
            queue: Mutex::new(None),
            obligations: Mutex::new(HashMap::with_hasher(FixedState::with_seed(0))),
        }
    }
}

impl DeliveryTracker {
    pub fn new() -> Self {
        DeliveryTracker::default()
    }

    /// Allocate a notification queue able to hold `capacity` pending
    /// notifications.
    ///
    /// Calling this again drops the previous queue and every unresolved
    /// obligation. Doing so while deliveries are still in flight is a caller
    /// error, resolving one of the dropped ids afterwards will panic.
    pub fn enable(&self, capacity: usize) {
        let (sender, receiver) = kanal::bounded(capacity);

        let mut queue = self.queue.lock().unwrap();
        let mut ht = self.obligations.lock().unwrap();
        if !ht.is_empty() {
            warn!(
                "tracking re-enabled with {} unresolved obligation(s), they are dropped",
                ht.len()
            );
            ht.clear();
        }
        *queue = Some(DeliveryQueue {
            capacity,
            sender: Some(sender),
            receiver,
            delivered: Vec::with_capacity(capacity),
        });
        debug!("delivery tracking enabled with capacity {capacity}");
    }

    pub fn is_enabled(&self) -> bool {
        let queue = self.queue.lock().unwrap();
        queue.as_ref().is_some_and(|q| q.sender.is_some())
    }

    /// Stop accepting new notifications.
    ///
    /// Readers drain what is already queued and then see the end of the
    /// stream.
    pub fn close(&self) {
        let mut queue = self.queue.lock().unwrap();
        if let Some(q) = queue.as_mut() {
            if q.sender.take().is_some() {
                debug!("delivery tracking closed");
            }
        }
    }

    pub fn notifications(&self) -> DeliveryReceiver {
        let receiver = {
            let queue = self.queue.lock().unwrap();
            queue.as_ref().map(|q| q.receiver.clone())
        };
        match receiver {
            Some(receiver) => DeliveryReceiver::new(receiver),
            None => fatal("delivery notifications requested before tracking is enabled"),
        }
    }

    /// Register a new obligation covering `members` measurements.
    ///
    /// An obligation without members is resolved right away.
    pub fn register(&self, members: usize) -> TrackingId {
        let closed = {
            let queue = self.queue.lock().unwrap();
            queue.as_ref().map(|q| q.sender.is_none())
        };
        match closed {
            None => fatal("tracked submission before tracking is enabled"),
            Some(true) => fatal("tracked submission after tracking was closed"),
            Some(false) => {}
        }

        let id = TrackingId::new_unique();
        if members == 0 {
            self.deliver(DeliveryInfo {
                id,
                delivered: true,
                accepted: 0,
            });
            return id;
        }

        let mut ht = self.obligations.lock().unwrap();
        ht.insert(
            id,
            Obligation {
                members,
                acknowledged: 0,
                accepted: 0,
            },
        );
        id
    }

    /// Report the delivery outcome of one member of obligation `id`.
    ///
    /// The notification is queued when the last member reports.
    pub fn on_member_delivered(&self, id: TrackingId, accepted: bool) {
        let resolved = {
            let mut ht = self.obligations.lock().unwrap();
            match ht.get_mut(&id) {
                Some(o) => {
                    o.acknowledged += 1;
                    if accepted {
                        o.accepted += 1;
                    }
                    if o.acknowledged < o.members {
                        return;
                    }
                    let accepted = o.accepted;
                    ht.remove(&id);
                    Some(DeliveryInfo {
                        id,
                        delivered: true,
                        accepted,
                    })
                }
                None => None,
            }
        };

        match resolved {
            Some(info) => self.deliver(info),
            None => fatal(&format!("delivery reported for unknown tracking id {id}")),
        }
    }

    fn deliver(&self, info: DeliveryInfo) {
        let r = {
            let mut queue = self.queue.lock().unwrap();
            match queue.as_mut() {
                Some(q) => match q.sender.as_ref() {
                    Some(sender) => match sender.try_send(info) {
                        Ok(true) => {
                            q.delivered.push(info);
                            Ok(())
                        }
                        // more items were tracked than space was reserved for
                        Ok(false) => Err(format!(
                            "delivery notification queue is full (capacity {}), \
                             unable to queue the notification for obligation {}",
                            q.capacity, info.id
                        )),
                        Err(e) => Err(format!(
                            "unable to queue the notification for obligation {}: {e}",
                            info.id
                        )),
                    },
                    None => Err(format!(
                        "obligation {} resolved after tracking was closed",
                        info.id
                    )),
                },
                None => Err(format!(
                    "obligation {} resolved while tracking is not enabled",
                    info.id
                )),
            }
        };

        if let Err(msg) = r {
            fatal(&msg);
        }
    }

    /// Number of obligations still waiting for member reports.
    pub fn pending(&self) -> usize {
        self.obligations.lock().unwrap().len()
    }

    /// All notifications queued since tracking was last enabled.
    pub fn delivered(&self) -> Vec<DeliveryInfo> {
        let queue = self.queue.lock().unwrap();
        queue
            .as_ref()
            .map(|q| q.delivered.clone())
            .unwrap_or_default()
    }

    pub fn delivered_count(&self) -> usize {
        let queue = self.queue.lock().unwrap();
        queue.as_ref().map(|q| q.delivered.len()).unwrap_or_default()
    }
}

fn fatal(msg: &str) -> ! {
    error!("{msg}");
    panic!("{msg}");
}
