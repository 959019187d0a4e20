/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod yaml;

pub mod metric;
pub mod tracking;

mod accumulator;
pub use accumulator::{Accumulator, SharedError, TimeFunc};

mod config;
pub use config::AccumulatorConfig;

mod stats;
pub use stats::AccumulatorStatsSnapshot;

mod sink;
pub use sink::{Accumulate, NopAccumulator};

mod registry;
pub use registry::{Input, InputFactory, InputRegistry};
