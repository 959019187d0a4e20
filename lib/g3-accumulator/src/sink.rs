/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use chrono::{DateTime, Utc};

use crate::Accumulator;
use crate::metric::{FieldMap, Measurement, TagMap};

/// The submission interface handed to producers.
pub trait Accumulate {
    fn add_fields(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    );
    fn add_counter(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    );
    fn add_gauge(&self, name: &str, fields: FieldMap, tags: TagMap, timestamp: Option<DateTime<Utc>>);
    fn add_summary(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    );
    fn add_histogram(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    );
    fn add_metric(&self, m: Measurement);
    fn add_error(&self, err: anyhow::Error);
}

impl Accumulate for Accumulator {
    fn add_fields(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    ) {
        Accumulator::add_fields(self, name, fields, tags, timestamp)
    }

    fn add_counter(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    ) {
        Accumulator::add_counter(self, name, fields, tags, timestamp)
    }

    fn add_gauge(&self, name: &str, fields: FieldMap, tags: TagMap, timestamp: Option<DateTime<Utc>>) {
        Accumulator::add_gauge(self, name, fields, tags, timestamp)
    }

    fn add_summary(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    ) {
        Accumulator::add_summary(self, name, fields, tags, timestamp)
    }

    fn add_histogram(
        &self,
        name: &str,
        fields: FieldMap,
        tags: TagMap,
        timestamp: Option<DateTime<Utc>>,
    ) {
        Accumulator::add_histogram(self, name, fields, tags, timestamp)
    }

    fn add_metric(&self, m: Measurement) {
        Accumulator::add_metric(self, m)
    }

    fn add_error(&self, err: anyhow::Error) {
        Accumulator::add_error(self, err)
    }
}

/// Accepts and forgets everything, to measure a producer on its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct NopAccumulator;

impl Accumulate for NopAccumulator {
    fn add_fields(&self, _: &str, _: FieldMap, _: TagMap, _: Option<DateTime<Utc>>) {}
    fn add_counter(&self, _: &str, _: FieldMap, _: TagMap, _: Option<DateTime<Utc>>) {}
    fn add_gauge(&self, _: &str, _: FieldMap, _: TagMap, _: Option<DateTime<Utc>>) {}
    fn add_summary(&self, _: &str, _: FieldMap, _: TagMap, _: Option<DateTime<Utc>>) {}
    fn add_histogram(&self, _: &str, _: FieldMap, _: TagMap, _: Option<DateTime<Utc>>) {}
    fn add_metric(&self, _m: Measurement) {}
    fn add_error(&self, _err: anyhow::Error) {}
}
