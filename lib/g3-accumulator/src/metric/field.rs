/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use super::FieldValue;
use super::escape::{KEY_SPECIALS, write_escaped};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldMap {
    inner: BTreeMap<String, FieldValue>,
}

impl FieldMap {
    #[inline]
    pub fn new() -> Self {
        FieldMap::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn insert<K, V>(&mut self, name: K, value: V) -> Option<FieldValue>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.inner.insert(name.into(), value.into())
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.inner.get(key)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.inner.remove(name)
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        FieldMap {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for FieldMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.inner.iter();
        let Some((name, value)) = iter.next() else {
            return Ok(());
        };
        write_escaped(f, name, KEY_SPECIALS)?;
        write!(f, "={value}")?;
        for (name, value) in iter {
            f.write_char(',')?;
            write_escaped(f, name, KEY_SPECIALS)?;
            write!(f, "={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_types() {
        let mut fields = FieldMap::new();
        fields.insert("usage", 0.5);
        fields.insert("cores", 8u32);
        fields.insert("model", "x86");
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.get("cores"), Some(&FieldValue::Unsigned32(8)));
        assert_eq!(fields.to_string(), "cores=8u,model=\"x86\",usage=0.5");
    }

    #[test]
    fn collect_from_borrowed() {
        let src: FieldMap = [("a", 1i64)].into_iter().collect();
        let copy: FieldMap = src.iter().collect();
        assert_eq!(src, copy);
    }
}
