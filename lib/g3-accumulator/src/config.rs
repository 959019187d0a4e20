/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use yaml_rust::{Yaml, yaml};

const CONFIG_KEY_DISCARD: &str = "discard";
const CONFIG_KEY_TRACKING_CAPACITY: &str = "tracking_capacity";
const CONFIG_KEY_MAX_TRACKED: &str = "max_tracked";

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccumulatorConfig {
    discard: bool,
    tracking_capacity: Option<usize>,
}

impl AccumulatorConfig {
    pub fn parse(map: &yaml::Hash) -> anyhow::Result<Self> {
        let mut config = AccumulatorConfig::default();
        crate::yaml::foreach_kv(map, |k, v| config.set(k, v))?;
        config.check()?;
        Ok(config)
    }

    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        match v {
            Yaml::Hash(map) => AccumulatorConfig::parse(map),
            Yaml::Null => Ok(AccumulatorConfig::default()),
            _ => Err(anyhow!(
                "yaml value type for 'accumulator config' should be 'map'"
            )),
        }
    }

    pub fn load_str(s: &str) -> anyhow::Result<Self> {
        let doc = crate::yaml::load_doc(s)?;
        AccumulatorConfig::parse_yaml(&doc)
    }

    fn set(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match crate::yaml::normalize_key(k).as_str() {
            CONFIG_KEY_DISCARD => {
                self.discard = crate::yaml::as_bool(v)?;
                Ok(())
            }
            CONFIG_KEY_TRACKING_CAPACITY | CONFIG_KEY_MAX_TRACKED => {
                self.tracking_capacity = Some(crate::yaml::as_usize(v)?);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }

    fn check(&mut self) -> anyhow::Result<()> {
        if self.discard && self.tracking_capacity.is_some() {
            // tracked members would all be resolved as rejected
            return Err(anyhow!(
                "{CONFIG_KEY_TRACKING_CAPACITY} can not be used together with {CONFIG_KEY_DISCARD}"
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn discard(&self) -> bool {
        self.discard
    }

    #[inline]
    pub fn tracking_capacity(&self) -> Option<usize> {
        self.tracking_capacity
    }

    pub fn set_discard(mut self, discard: bool) -> Self {
        self.discard = discard;
        self
    }

    pub fn set_tracking_capacity(mut self, capacity: usize) -> Self {
        self.tracking_capacity = Some(capacity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ok() {
        let config = AccumulatorConfig::load_str("discard: yes").unwrap();
        assert!(config.discard());
        assert_eq!(config.tracking_capacity(), None);

        let config = AccumulatorConfig::load_str("max-tracked: 64").unwrap();
        assert!(!config.discard());
        assert_eq!(config.tracking_capacity(), Some(64));

        let config = AccumulatorConfig::load_str("tracking_capacity: \"8\"").unwrap();
        assert_eq!(config.tracking_capacity(), Some(8));

        let config = AccumulatorConfig::load_str("~").unwrap();
        assert_eq!(config, AccumulatorConfig::default());
    }

    #[test]
    fn parse_err() {
        assert!(AccumulatorConfig::load_str("discard: maybe").is_err());
        assert!(AccumulatorConfig::load_str("tracking_capacity: -1").is_err());
        assert!(AccumulatorConfig::load_str("unknown: 1").is_err());
        assert!(AccumulatorConfig::load_str("- discard").is_err());
        assert!(AccumulatorConfig::load_str("discard: true\nmax_tracked: 4").is_err());
    }
}
