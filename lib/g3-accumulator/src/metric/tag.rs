/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use super::escape::{KEY_SPECIALS, write_escaped};

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagMap {
    inner: BTreeMap<String, String>,
}

impl TagMap {
    #[inline]
    pub fn new() -> Self {
        TagMap::default()
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
    pub fn insert<K, V>(&mut self, name: K, value: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner.insert(name.into(), value.into())
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(|v| v.as_str())
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.inner.remove(name)
    }
}

impl<K, V> FromIterator<(K, V)> for TagMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        TagMap {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl fmt::Display for TagMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.inner.iter();
        let Some((name, value)) = iter.next() else {
            return Ok(());
        };
        write_escaped(f, name, KEY_SPECIALS)?;
        f.write_char('=')?;
        write_escaped(f, value, KEY_SPECIALS)?;

        for (name, value) in iter {
            f.write_char(',')?;
            write_escaped(f, name, KEY_SPECIALS)?;
            f.write_char('=')?;
            write_escaped(f, value, KEY_SPECIALS)?;
        }
        Ok(())
    }
}
