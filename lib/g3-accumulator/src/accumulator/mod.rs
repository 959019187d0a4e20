/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use chrono::{DateTime, Utc};
use log::trace;

use crate::config::AccumulatorConfig;
use crate::metric::{FieldMap, Measurement, TagMap, ValueType};
use crate::registry::Input;
use crate::stats::{AccumulatorStats, AccumulatorStatsSnapshot};
use crate::tracking::{DeliveryInfo, DeliveryReceiver, DeliveryTracker, TrackingId};

mod query;
mod wait;

pub type TimeFunc = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// A recorded error handed back out of the accumulator.
///
/// The source chain of the recorded error is kept.
#[derive(Clone, Debug)]
pub struct SharedError(Arc<anyhow::Error>);

impl SharedError {
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }
}

impl fmt::Display for SharedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self.0, f)
    }
}

impl Error for SharedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        (**self.0).source()
    }
}

#[derive(Default)]
struct AccumulatorState {
    metrics: Vec<Measurement>,
    errors: Vec<Arc<anyhow::Error>>,
    discard: bool,
}

/// The thread safe funnel every producer submits into.
///
/// Stored measurements, errors and the discard flag live behind a single
/// mutex. The submission counter is kept outside of it so that it can be
/// polled cheaply, but it is only ever incremented while the mutex is held,
/// which is what the waiters rely on.
pub struct Accumulator {
    added: AtomicU64,
    state: Mutex<AccumulatorState>,
    cond: Condvar,
    tracker: DeliveryTracker,
    stats: AccumulatorStats,
    time_func: TimeFunc,
}

impl Default for Accumulator {
    fn default() -> Self {
        Accumulator {
            added: AtomicU64::new(0),
            state: Mutex::new(AccumulatorState::default()),
            cond: Condvar::new(),
            tracker: DeliveryTracker::new(),
            stats: AccumulatorStats::default(),
            time_func: Box::new(Utc::now),
        }
    }
}

impl Accumulator {
    pub fn new() -> Self {
        Accumulator::default()
    }

    pub fn with_config(config: &AccumulatorConfig) -> Self {
        let acc = Accumulator::new();
        acc.set_discard(config.discard());
        if let Some(capacity) = config.tracking_capacity() {
            acc.enable_tracking(capacity);
        }
        acc
    }

    /// Replace the clock used for measurements submitted without timestamp.
    pub fn with_time_func<F>(mut self, f: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.time_func = Box::new(f);
        self
    }

    fn add_measurement(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        kind: ValueType,
        timestamp: Option<DateTime<Utc>>,
    ) {
        let time = timestamp.unwrap_or_else(|| (self.time_func)());
        self.store(Measurement::new(name, tags, fields, time, kind));
    }

    /// Count the submission, wake the waiters, and keep the measurement
    /// unless it is discarded. Returns whether it has been stored.
    fn store(&self, m: Measurement) -> bool {
        let mut state = self.state.lock().unwrap();
        self.added.fetch_add(1, Ordering::AcqRel);
        self.cond.notify_all();

        if state.discard {
            self.stats.add_discarded();
            return false;
        }
        if m.fields().is_empty() {
            trace!("measurement {} has no field, dropped", m.name());
            self.stats.add_dropped();
            return false;
        }

        state.metrics.push(m);
        self.stats.add_stored();
        true
    }

    pub fn add_fields(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    ) {
        self.add_measurement(name, fields, tags, ValueType::Untyped, timestamp)
    }

    pub fn add_counter(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    ) {
        self.add_measurement(name, fields, tags, ValueType::Counter, timestamp)
    }

    pub fn add_gauge(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    ) {
        self.add_measurement(name, fields, tags, ValueType::Gauge, timestamp)
    }

    pub fn add_summary(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    ) {
        self.add_measurement(name, fields, tags, ValueType::Summary, timestamp)
    }

    pub fn add_histogram(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    ) {
        self.add_measurement(name, fields, tags, ValueType::Histogram, timestamp)
    }

    pub fn add_metric(&self, m: Measurement) {
        self.store(m);
    }

    pub fn add_metrics<I>(&self, metrics: I)
    where
        I: IntoIterator<Item = Measurement>,
    {
        for m in metrics {
            self.store(m);
        }
    }

    pub fn add_error<E: Into<anyhow::Error>>(&self, err: E) {
        let mut state = self.state.lock().unwrap();
        state.errors.push(Arc::new(err.into()));
        self.stats.add_error();
        self.cond.notify_all();
    }

    /// Record the error of a failed operation, if any.
    ///
    /// Nothing is recorded and no waiter is woken for an `Ok` value.
    pub fn add_result<T, E>(&self, r: Result<T, E>) -> Option<T>
    where
        E: Into<anyhow::Error>,
    {
        match r {
            Ok(v) => Some(v),
            Err(e) => {
                self.add_error(e);
                None
            }
        }
    }

    /// Number of submissions seen so far, dropped ones included.
    #[inline]
    pub fn count(&self) -> u64 {
        self.added.load(Ordering::Acquire)
    }

    /// A copy of every stored measurement, in submission order.
    pub fn snapshot(&self) -> Vec<Measurement> {
        let state = self.state.lock().unwrap();
        state.metrics.clone()
    }

    pub fn set_discard(&self, discard: bool) {
        let mut state = self.state.lock().unwrap();
        state.discard = discard;
    }

    pub fn discard(&self) -> bool {
        self.state.lock().unwrap().discard
    }

    pub fn errors(&self) -> Vec<Arc<anyhow::Error>> {
        let state = self.state.lock().unwrap();
        state.errors.clone()
    }

    pub fn first_error(&self) -> Option<Arc<anyhow::Error>> {
        let state = self.state.lock().unwrap();
        state.errors.first().cloned()
    }

    pub fn error_count(&self) -> usize {
        self.state.lock().unwrap().errors.len()
    }

    /// Drop all stored measurements and reset the submission counter.
    ///
    /// Recorded errors are kept.
    pub fn clear_metrics(&self) {
        let mut state = self.state.lock().unwrap();
        self.added.store(0, Ordering::Release);
        state.metrics = Vec::new();
    }

    /// Total number of fields across all stored measurements.
    pub fn field_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.metrics.iter().map(|m| m.fields().len()).sum()
    }

    /// Run a gather pass of `input` against this accumulator.
    ///
    /// Returns the error of the pass itself, or else the first error ever
    /// recorded.
    pub fn gather_error(&self, input: &dyn Input) -> anyhow::Result<()> {
        input.gather(self)?;
        match self.first_error() {
            Some(e) => Err(anyhow::Error::new(SharedError(e))),
            None => Ok(()),
        }
    }

    pub fn stats(&self) -> AccumulatorStatsSnapshot {
        self.stats.snapshot()
    }

    #[inline]
    pub fn tracker(&self) -> &DeliveryTracker {
        &self.tracker
    }

    /// Reserve room for `capacity` delivery notifications.
    ///
    /// Must be called before any tracked submission. See
    /// [`DeliveryTracker::enable`] for the effect of calling it again.
    pub fn enable_tracking(&self, capacity: usize) {
        self.tracker.enable(capacity);
    }

    pub fn close_tracking(&self) {
        self.tracker.close();
    }

    pub fn add_tracking_metric(&self, m: Measurement) -> TrackingId {
        let id = self.tracker.register(1);
        self.add_tracked(m, id);
        id
    }

    /// Submit all measurements of `group` under one shared obligation.
    ///
    /// A single notification is emitted once every member has been reported.
    pub fn add_tracking_metric_group(&self, group: Vec<Measurement>) -> TrackingId {
        let id = self.tracker.register(group.len());
        for m in group {
            self.add_tracked(m, id);
        }
        id
    }

    fn add_tracked(&self, m: Measurement, id: TrackingId) {
        // a member that is never stored can never be delivered
        if !self.store(m.with_tracking(id)) {
            self.tracker.on_member_delivered(id, false);
        }
    }

    #[inline]
    pub fn on_member_delivered(&self, id: TrackingId, accepted: bool) {
        self.tracker.on_member_delivered(id, accepted);
    }

    pub fn notifications(&self) -> DeliveryReceiver {
        self.tracker.notifications()
    }

    pub fn delivered(&self) -> Vec<DeliveryInfo> {
        self.tracker.delivered()
    }

    pub fn delivered_count(&self) -> usize {
        self.tracker.delivered_count()
    }
}
