/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use chrono::{DateTime, Utc};

use crate::tracking::TrackingId;

mod escape;

mod value;
pub use value::{FieldError, FieldValue, FromFieldValue};

mod tag;
pub use tag::TagMap;

mod field;
pub use field::FieldMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValueType {
    #[default]
    Untyped,
    Counter,
    Gauge,
    Summary,
    Histogram,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Untyped => "untyped",
            ValueType::Counter => "counter",
            ValueType::Gauge => "gauge",
            ValueType::Summary => "summary",
            ValueType::Histogram => "histogram",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observation as submitted by a producer.
///
/// A measurement is treated as immutable once handed to the accumulator.
/// Tracked measurements carry the id of the obligation they belong to, the
/// consumer reports its delivery outcome against that id.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    name: String,
    tags: TagMap,
    fields: FieldMap,
    time: DateTime<Utc>,
    kind: ValueType,
    tracking: Option<TrackingId>,
}

impl Measurement {
    pub fn new<N: Into<String>>(
        name: N,
        tags: TagMap,
        fields: FieldMap,
        time: DateTime<Utc>,
        kind: ValueType,
    ) -> Self {
        Measurement {
            name: name.into(),
            tags,
            fields,
            time,
            kind,
            tracking: None,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn tags(&self) -> &TagMap {
        &self.tags
    }

    #[inline]
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    #[inline]
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    #[inline]
    pub fn kind(&self) -> ValueType {
        self.kind
    }

    #[inline]
    pub fn tracking_id(&self) -> Option<TrackingId> {
        self.tracking
    }

    #[inline]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key)
    }

    #[inline]
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn field_as<T: FromFieldValue>(&self, key: &str) -> Result<T, FieldError> {
        let Some(v) = self.fields.get(key) else {
            return Err(FieldError::NotFound(key.to_string()));
        };
        T::from_field_value(v).ok_or_else(|| FieldError::TypeMismatch {
            field: key.to_string(),
            expected: T::TYPE_NAME,
            actual: v.type_name(),
        })
    }

    pub(crate) fn with_tracking(mut self, id: TrackingId) -> Self {
        self.tracking = Some(id);
        self
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        escape::write_escaped(f, &self.name, escape::MEASUREMENT_SPECIALS)?;
        if !self.tags.is_empty() {
            write!(f, ",{}", self.tags)?;
        }
        write!(
            f,
            " {} {}",
            self.fields,
            self.time.timestamp_nanos_opt().unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cpu() -> Measurement {
        Measurement::new(
            "cpu",
            [("host", "a")].into_iter().collect(),
            [("time_idle", FieldValue::from(42i64))].into_iter().collect(),
            Utc.timestamp_opt(1, 0).unwrap(),
            ValueType::Counter,
        )
    }

    #[test]
    fn field_as() {
        let m = cpu();
        assert_eq!(m.field_as::<i64>("time_idle"), Ok(42));
        assert_eq!(
            m.field_as::<f64>("time_idle"),
            Err(FieldError::TypeMismatch {
                field: "time_idle".to_string(),
                expected: "f64",
                actual: "i64",
            })
        );
        assert_eq!(
            m.field_as::<i64>("time_user"),
            Err(FieldError::NotFound("time_user".to_string()))
        );
    }

    #[test]
    fn display() {
        assert_eq!(cpu().to_string(), "cpu,host=a time_idle=42i 1000000000");
    }

    #[test]
    fn display_escaped() {
        let m = Measurement::new(
            "disk io",
            [("path", "/mnt/a b"), ("k=v", "x,y")].into_iter().collect(),
            [("last error", FieldValue::from("\"no space\""))].into_iter().collect(),
            Utc.timestamp_opt(0, 5).unwrap(),
            ValueType::Untyped,
        );
        assert_eq!(
            m.to_string(),
            "disk\\ io,k\\=v=x\\,y,path=/mnt/a\\ b last\\ error=\"\\\"no space\\\"\" 5"
        );
    }
}
