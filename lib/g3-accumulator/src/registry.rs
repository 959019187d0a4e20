/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::HashMap;

use anyhow::{Context, anyhow};
use foldhash::fast::FixedState;
use log::debug;
use yaml_rust::{Yaml, yaml};

use crate::sink::Accumulate;

const CONFIG_KEY_INPUT_TYPE: &str = "type";

/// A producer plugin.
pub trait Input: Send + Sync {
    fn input_type(&self) -> &'static str;

    fn gather(&self, acc: &dyn Accumulate) -> anyhow::Result<()>;
}

pub type InputFactory = Box<dyn Fn(&yaml::Hash) -> anyhow::Result<Box<dyn Input>> + Send + Sync>;

/// Maps input type names to their factories.
///
/// Built once at startup and passed to whoever creates the inputs, so that
/// several independent agents can live in the same process.
pub struct InputRegistry {
    factories: HashMap<String, InputFactory, FixedState>,
}

impl Default for InputRegistry {
    fn default() -> Self {
        InputRegistry {
            factories: HashMap::with_hasher(FixedState::with_seed(0)),
        }
    }
}

impl InputRegistry {
    pub fn new() -> Self {
        InputRegistry::default()
    }

    pub fn register<F>(&mut self, input_type: &str, factory: F) -> anyhow::Result<()>
    where
        F: Fn(&yaml::Hash) -> anyhow::Result<Box<dyn Input>> + Send + Sync + 'static,
    {
        if self.factories.contains_key(input_type) {
            return Err(anyhow!("input type {input_type} has already been registered"));
        }
        self.factories
            .insert(input_type.to_string(), Box::new(factory));
        debug!("input type {input_type} registered");
        Ok(())
    }

    pub fn contains(&self, input_type: &str) -> bool {
        self.factories.contains_key(input_type)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn build(&self, input_type: &str, map: &yaml::Hash) -> anyhow::Result<Box<dyn Input>> {
        let Some(factory) = self.factories.get(input_type) else {
            return Err(anyhow!("unsupported input type {input_type}"));
        };
        factory(map).context(format!("failed to create input of type {input_type}"))
    }

    /// Build an input from a config map that names its type under `type`.
    pub fn build_from_yaml(&self, v: &Yaml) -> anyhow::Result<Box<dyn Input>> {
        let Yaml::Hash(map) = v else {
            return Err(anyhow!("yaml value type for 'input' should be 'map'"));
        };
        let input_type = crate::yaml::get_required_str(map, CONFIG_KEY_INPUT_TYPE)?;
        self.build(input_type, map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Accumulator;
    use crate::metric::{FieldMap, TagMap};

    struct ConstInput {
        value: i64,
    }

    impl Input for ConstInput {
        fn input_type(&self) -> &'static str {
            "const"
        }

        fn gather(&self, acc: &dyn Accumulate) -> anyhow::Result<()> {
            let fields: FieldMap = [("value", self.value)].into_iter().collect();
            acc.add_gauge("const", fields, TagMap::new(), None);
            Ok(())
        }
    }

    struct BrokenInput;

    impl Input for BrokenInput {
        fn input_type(&self) -> &'static str {
            "broken"
        }

        fn gather(&self, acc: &dyn Accumulate) -> anyhow::Result<()> {
            acc.add_error(anyhow!("sensor offline"));
            Ok(())
        }
    }

    fn registry() -> InputRegistry {
        let mut registry = InputRegistry::new();
        registry
            .register("const", |map| {
                let mut value = 0;
                crate::yaml::foreach_kv(map, |k, v| match crate::yaml::normalize_key(k).as_str() {
                    CONFIG_KEY_INPUT_TYPE => Ok(()),
                    "value" => {
                        value = v.as_i64().ok_or_else(|| anyhow!("invalid integer value"))?;
                        Ok(())
                    }
                    _ => Err(anyhow!("invalid key {k}")),
                })?;
                Ok(Box::new(ConstInput { value }))
            })
            .unwrap();
        registry
            .register("broken", |_| Ok(Box::new(BrokenInput)))
            .unwrap();
        registry
    }

    #[test]
    fn register_and_build() {
        let mut registry = registry();
        assert!(registry.contains("const"));
        assert_eq!(registry.names(), vec!["broken", "const"]);
        assert!(registry.register("const", |_| Ok(Box::new(BrokenInput))).is_err());

        let doc = crate::yaml::load_doc("type: const\nvalue: 7").unwrap();
        let input = registry.build_from_yaml(&doc).unwrap();
        assert_eq!(input.input_type(), "const");

        let acc = Accumulator::new();
        acc.gather_error(input.as_ref()).unwrap();
        assert_eq!(acc.i64_field("const", "value"), Some(7));
    }

    #[test]
    fn build_errors() {
        let registry = registry();
        let doc = crate::yaml::load_doc("type: disk").unwrap();
        assert!(registry.build_from_yaml(&doc).is_err());
        let doc = crate::yaml::load_doc("value: 1").unwrap();
        assert!(registry.build_from_yaml(&doc).is_err());
        let doc = crate::yaml::load_doc("type: const\nvalue: x").unwrap();
        assert!(registry.build_from_yaml(&doc).is_err());
    }

    #[test]
    fn gather_reports_first_error() {
        let registry = registry();
        let doc = crate::yaml::load_doc("type: broken").unwrap();
        let input = registry.build_from_yaml(&doc).unwrap();

        let acc = Accumulator::new();
        let err = acc.gather_error(input.as_ref()).unwrap_err();
        assert_eq!(err.to_string(), "sensor offline");
    }

    #[test]
    fn independent_registries() {
        let a = registry();
        let b = InputRegistry::new();
        assert!(a.contains("const"));
        assert!(!b.contains("const"));
    }
}
