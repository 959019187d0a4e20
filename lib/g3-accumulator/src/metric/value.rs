/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::{self, Write};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("no field {0} found")]
    NotFound(String),
    #[error("field {field} type mismatch: expect {expected}, actual {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// A single typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Signed(i64),
    Signed32(i32),
    Unsigned(u64),
    Unsigned32(u32),
    Double(f64),
    String(String),
    Bool(bool),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Signed(_) => "i64",
            FieldValue::Signed32(_) => "i32",
            FieldValue::Unsigned(_) => "u64",
            FieldValue::Unsigned32(_) => "u32",
            FieldValue::Double(_) => "f64",
            FieldValue::String(_) => "string",
            FieldValue::Bool(_) => "bool",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Signed(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            FieldValue::Signed32(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Unsigned(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            FieldValue::Unsigned32(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Double(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Signed(i) => {
                f.write_str(itoa::Buffer::new().format(*i))?;
                f.write_str("i")
            }
            FieldValue::Signed32(i) => {
                f.write_str(itoa::Buffer::new().format(*i))?;
                f.write_str("i")
            }
            FieldValue::Unsigned(u) => {
                f.write_str(itoa::Buffer::new().format(*u))?;
                f.write_str("u")
            }
            FieldValue::Unsigned32(u) => {
                f.write_str(itoa::Buffer::new().format(*u))?;
                f.write_str("u")
            }
            FieldValue::Double(v) => f.write_str(ryu::Buffer::new().format(*v)),
            FieldValue::String(s) => {
                f.write_char('"')?;
                super::escape::write_escaped(f, s, super::escape::STRING_SPECIALS)?;
                f.write_char('"')
            }
            FieldValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

macro_rules! impl_from {
    ($t:ty, $variant:ident) => {
        impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                FieldValue::$variant(v)
            }
        }
    };
}

impl_from!(i64, Signed);
impl_from!(i32, Signed32);
impl_from!(u64, Unsigned);
impl_from!(u32, Unsigned32);
impl_from!(f64, Double);
impl_from!(String, String);
impl_from!(bool, Bool);

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<&FieldValue> for FieldValue {
    fn from(v: &FieldValue) -> Self {
        v.clone()
    }
}

/// Conversion used by the typed field getters.
pub trait FromFieldValue: Sized {
    const TYPE_NAME: &'static str;

    fn from_field_value(v: &FieldValue) -> Option<Self>;
}

macro_rules! impl_from_field_value {
    ($t:ty, $name:literal, $method:ident) => {
        impl FromFieldValue for $t {
            const TYPE_NAME: &'static str = $name;

            fn from_field_value(v: &FieldValue) -> Option<Self> {
                v.$method()
            }
        }
    };
}

impl_from_field_value!(i64, "i64", as_i64);
impl_from_field_value!(i32, "i32", as_i32);
impl_from_field_value!(u64, "u64", as_u64);
impl_from_field_value!(u32, "u32", as_u32);
impl_from_field_value!(f64, "f64", as_f64);
impl_from_field_value!(bool, "bool", as_bool);

impl FromFieldValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_field_value(v: &FieldValue) -> Option<Self> {
        v.as_str().map(|s| s.to_string())
    }
}
