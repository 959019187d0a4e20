/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use chrono::{DateTime, Utc};

use super::Accumulator;
use crate::metric::{FieldMap, FieldValue, FromFieldValue, Measurement, TagMap};

impl Accumulator {
    fn find_map<T, F>(&self, name: &str, f: F) -> Option<T>
    where
        F: FnMut(&Measurement) -> Option<T>,
    {
        let state = self.state.lock().unwrap();
        state
            .metrics
            .iter()
            .filter(|m| m.name() == name)
            .find_map(f)
    }

    fn any<F>(&self, f: F) -> bool
    where
        F: Fn(&Measurement) -> bool,
    {
        let state = self.state.lock().unwrap();
        state.metrics.iter().any(f)
    }

    /// The first stored measurement with the given name.
    pub fn get(&self, name: &str) -> Option<Measurement> {
        self.find_map(name, |m| Some(m.clone()))
    }

    pub fn has_measurement(&self, name: &str) -> bool {
        self.any(|m| m.name() == name)
    }

    /// Whether the first measurement with the given name has tag `key`.
    pub fn has_tag(&self, name: &str, key: &str) -> bool {
        self.find_map(name, |m| Some(m.tags().contains(key)))
            .unwrap_or(false)
    }

    /// The value of tag `key` of the first measurement named `name`.
    pub fn tag_value(&self, name: &str, key: &str) -> Option<String> {
        self.find_map(name, |m| Some(m.tag(key).map(|v| v.to_string())))
            .flatten()
    }

    /// The value of tag `key` of any measurement named `name` carrying it.
    pub fn tag_set_value(&self, name: &str, key: &str) -> Option<String> {
        self.find_map(name, |m| m.tag(key).map(|v| v.to_string()))
    }

    pub fn has_field(&self, name: &str, key: &str) -> bool {
        self.find_map(name, |m| m.fields().contains(key).then_some(()))
            .is_some()
    }

    /// The value of field `key` of the first measurement named `name`
    /// carrying it.
    pub fn field(&self, name: &str, key: &str) -> Option<FieldValue> {
        self.find_map(name, |m| m.field(key).cloned())
    }

    /// The typed value of field `key`, `None` if it is absent or of a
    /// different type.
    pub fn typed_field<T: FromFieldValue>(&self, name: &str, key: &str) -> Option<T> {
        self.field(name, key)
            .and_then(|v| T::from_field_value(&v))
    }

    pub fn i64_field(&self, name: &str, key: &str) -> Option<i64> {
        self.typed_field(name, key)
    }

    pub fn i32_field(&self, name: &str, key: &str) -> Option<i32> {
        self.typed_field(name, key)
    }

    pub fn u64_field(&self, name: &str, key: &str) -> Option<u64> {
        self.typed_field(name, key)
    }

    pub fn f64_field(&self, name: &str, key: &str) -> Option<f64> {
        self.typed_field(name, key)
    }

    pub fn string_field(&self, name: &str, key: &str) -> Option<String> {
        self.typed_field(name, key)
    }

    pub fn bool_field(&self, name: &str, key: &str) -> Option<bool> {
        self.typed_field(name, key)
    }

    pub fn has_i64_field(&self, name: &str, key: &str) -> bool {
        self.i64_field(name, key).is_some()
    }

    pub fn has_i32_field(&self, name: &str, key: &str) -> bool {
        self.i32_field(name, key).is_some()
    }

    pub fn has_u64_field(&self, name: &str, key: &str) -> bool {
        self.u64_field(name, key).is_some()
    }

    pub fn has_f64_field(&self, name: &str, key: &str) -> bool {
        self.f64_field(name, key).is_some()
    }

    pub fn has_string_field(&self, name: &str, key: &str) -> bool {
        self.field(name, key)
            .is_some_and(|v| matches!(v, FieldValue::String(_)))
    }

    pub fn has_bool_field(&self, name: &str, key: &str) -> bool {
        self.bool_field(name, key).is_some()
    }

    /// Whether a measurement with exactly these tags has field `key` set to
    /// `value`.
    pub fn has_point(&self, name: &str, tags: &TagMap, key: &str, value: &FieldValue) -> bool {
        self.any(|m| m.name() == name && m.tags() == tags && m.field(key) == Some(value))
    }

    /// Whether the first measurement named `name` has timestamp `time`.
    pub fn has_timestamp(&self, name: &str, time: DateTime<Utc>) -> bool {
        self.find_map(name, |m| Some(m.time() == time))
            .unwrap_or(false)
    }

    /// Whether a measurement with exactly these fields and tags is stored.
    pub fn contains_tagged_fields(&self, name: &str, fields: &FieldMap, tags: &TagMap) -> bool {
        self.any(|m| m.name() == name && m.tags() == tags && m.fields() == fields)
    }

    /// Whether the first measurement named `name` has exactly these fields.
    pub fn contains_fields(&self, name: &str, fields: &FieldMap) -> bool {
        self.find_map(name, |m| Some(m.fields() == fields))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn populated() -> Accumulator {
        let acc = Accumulator::new().with_time_func(|| Utc.timestamp_opt(100, 0).unwrap());
        let mut fields = FieldMap::new();
        fields.insert("usage", 12.5);
        fields.insert("cores", 8i64);
        fields.insert("online", 4i32);
        fields.insert("bytes", 1024u64);
        fields.insert("model", "epyc");
        fields.insert("smt", true);
        let tags: TagMap = [("host", "a")].into_iter().collect();
        acc.add_gauge("cpu", fields, tags, None);

        let tags: TagMap = [("host", "b"), ("zone", "z1")].into_iter().collect();
        let fields: FieldMap = [("usage", 50.0)].into_iter().collect();
        acc.add_gauge("cpu", fields, tags, Some(Utc.timestamp_opt(200, 0).unwrap()));
        acc
    }

    #[test]
    fn by_name_and_tag() {
        let acc = populated();
        assert!(acc.has_measurement("cpu"));
        assert!(!acc.has_measurement("mem"));
        assert_eq!(acc.get("cpu").unwrap().tag("host"), Some("a"));

        assert!(acc.has_tag("cpu", "host"));
        assert!(!acc.has_tag("cpu", "zone"));
        assert_eq!(acc.tag_value("cpu", "host").as_deref(), Some("a"));
        assert_eq!(acc.tag_value("cpu", "zone"), None);
        assert_eq!(acc.tag_set_value("cpu", "zone").as_deref(), Some("z1"));
    }

    #[test]
    fn typed_probes() {
        let acc = populated();
        assert_eq!(acc.f64_field("cpu", "usage"), Some(12.5));
        assert_eq!(acc.i64_field("cpu", "cores"), Some(8));
        assert_eq!(acc.i32_field("cpu", "online"), Some(4));
        assert_eq!(acc.u64_field("cpu", "bytes"), Some(1024));
        assert_eq!(acc.string_field("cpu", "model").as_deref(), Some("epyc"));
        assert_eq!(acc.bool_field("cpu", "smt"), Some(true));

        assert!(acc.has_i64_field("cpu", "cores"));
        assert!(!acc.has_i64_field("cpu", "online"));
        assert!(acc.has_i32_field("cpu", "online"));
        assert!(acc.has_u64_field("cpu", "bytes"));
        assert!(!acc.has_f64_field("cpu", "cores"));
        assert!(acc.has_string_field("cpu", "model"));
        assert!(acc.has_bool_field("cpu", "smt"));
        assert!(acc.has_field("cpu", "usage"));
        assert!(!acc.has_field("cpu", "steal"));
        assert_eq!(acc.typed_field::<u32>("cpu", "bytes"), None);
    }

    #[test]
    fn points_and_timestamps() {
        let acc = populated();
        let tags: TagMap = [("host", "b"), ("zone", "z1")].into_iter().collect();
        assert!(acc.has_point("cpu", &tags, "usage", &FieldValue::Double(50.0)));
        assert!(!acc.has_point("cpu", &tags, "usage", &FieldValue::Double(12.5)));

        assert!(acc.has_timestamp("cpu", Utc.timestamp_opt(100, 0).unwrap()));
        assert!(!acc.has_timestamp("cpu", Utc.timestamp_opt(200, 0).unwrap()));

        let fields: FieldMap = [("usage", 50.0)].into_iter().collect();
        assert!(acc.contains_tagged_fields("cpu", &fields, &tags));
        assert!(!acc.contains_tagged_fields("cpu", &fields, &TagMap::new()));
        assert!(!acc.contains_fields("cpu", &fields));
    }
}
