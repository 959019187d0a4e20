/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt::{self, Write};

pub(super) const MEASUREMENT_SPECIALS: &[char] = &[',', ' '];
pub(super) const KEY_SPECIALS: &[char] = &[',', '=', ' '];
pub(super) const STRING_SPECIALS: &[char] = &['"', '\\'];

/// Write `s` with a backslash before each char in `specials`.
pub(super) fn write_escaped<W: Write>(w: &mut W, s: &str, specials: &[char]) -> fmt::Result {
    let mut last = 0;
    for (i, m) in s.match_indices(specials) {
        w.write_str(&s[last..i])?;
        w.write_char('\\')?;
        w.write_str(m)?;
        last = i + m.len();
    }
    w.write_str(&s[last..])
}
