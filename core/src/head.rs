//! Case-insensitive multi-valued header store.
//!
//! # Design
//! Keys are stored as given and canonicalized lazily, when an operation
//! needs to unify spellings. This avoids converting keys that are never
//! looked up, while guaranteeing that after any mutation the map never
//! holds both a canonical and a non-canonical spelling of the same key
//! with split data.

use std::borrow::Cow;
use std::collections::HashMap;

/// RFC 7230 `tchar`: the characters allowed in a header field name.
fn is_token_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

/// Returns the MIME-canonical form of a header key: each hyphen-separated
/// word capitalized, the rest lowercased (`content-type` → `Content-Type`).
///
/// Keys containing characters outside the header-name token set are
/// returned unchanged. Idempotent; borrows when the key is already
/// canonical.
pub fn canonical_key(key: &str) -> Cow<'_, str> {
    let bytes = key.as_bytes();
    if bytes.iter().any(|byte| !is_token_byte(*byte)) {
        return Cow::Borrowed(key);
    }

    let mut upper = true;
    let already_canonical = bytes.iter().all(|&byte| {
        let want = if upper {
            byte.to_ascii_uppercase()
        } else {
            byte.to_ascii_lowercase()
        };
        upper = byte == b'-';
        byte == want
    });
    if already_canonical {
        return Cow::Borrowed(key);
    }

    let mut out = String::with_capacity(key.len());
    let mut upper = true;
    for &byte in bytes {
        let mapped = if upper {
            byte.to_ascii_uppercase()
        } else {
            byte.to_ascii_lowercase()
        };
        out.push(mapped as char);
        upper = byte == b'-';
    }
    Cow::Owned(out)
}

/// HTTP header collection keyed case-insensitively.
///
/// All lookups try the exact key first and fall back to its canonical
/// form, so entries created from raw mappings with arbitrary casing stay
/// reachable. Mutations always leave the affected entry under the
/// canonical key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadMap {
    entries: HashMap<String, Vec<String>>,
}

impl HeadMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First value under the exact key, then under its canonical form.
    /// Returns `""` when the key is absent or has no values.
    pub fn get(&self, key: &str) -> &str {
        if let Some(vals) = self.entries.get(key) {
            return vals.first().map(String::as_str).unwrap_or_default();
        }
        match self.entries.get(canonical_key(key).as_ref()) {
            Some(vals) => vals.first().map(String::as_str).unwrap_or_default(),
            None => "",
        }
    }

    /// Full value sequence, same lookup order as [`HeadMap::get`].
    /// `None` means the key is absent; `Some(&[])` means present with
    /// zero values.
    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.entries
            .get(key)
            .or_else(|| self.entries.get(canonical_key(key).as_ref()))
            .map(Vec::as_slice)
    }

    /// True if either the exact key or its canonical form is stored,
    /// regardless of value count.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key) || self.entries.contains_key(canonical_key(key).as_ref())
    }

    /// Removes both the exact key and its canonical form. Idempotent.
    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.entries.remove(canonical_key(key).as_ref());
    }

    /// Appends the value under the canonical key. An entry stored under
    /// the exact non-canonical spelling is merged in: previous canonical
    /// values first, then the exact-key values, then the new value.
    /// Canonical entries are primary; the order is a compatibility
    /// contract, not an accident.
    pub fn add(&mut self, key: &str, val: impl Into<String>) {
        let canon = canonical_key(key);
        if canon == key {
            self.entries.entry(key.to_string()).or_default().push(val.into());
            return;
        }

        let exact = self.entries.remove(key);
        let entry = self.entries.entry(canon.into_owned()).or_default();
        if let Some(exact) = exact {
            entry.extend(exact);
        }
        entry.push(val.into());
    }

    /// Replaces the canonical entry with a single value and deletes the
    /// exact non-canonical spelling.
    pub fn set(&mut self, key: &str, val: impl Into<String>) {
        let canon = canonical_key(key);
        if canon != key {
            self.entries.remove(key);
        }
        self.entries.insert(canon.into_owned(), vec![val.into()]);
    }

    /// Replaces the canonical entry with the given vector, stored as-is.
    /// With an empty vector this is exactly [`HeadMap::remove`].
    pub fn replace(&mut self, key: &str, vals: Vec<String>) {
        if vals.is_empty() {
            self.remove(key);
            return;
        }
        let canon = canonical_key(key);
        if canon != key {
            self.entries.remove(key);
        }
        self.entries.insert(canon.into_owned(), vals);
    }

    /// Applies [`HeadMap::replace`] per pair, in the input's own order.
    /// Later pairs win when their keys canonicalize to the same key.
    pub fn patch<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        for (key, vals) in entries {
            self.replace(&key, vals);
        }
    }

    /// Iterates stored entries as they are, canonical or not.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(key, vals)| (key.as_str(), vals.as_slice()))
    }
}

/// Wraps an existing raw mapping verbatim, without canonicalizing keys.
impl From<HashMap<String, Vec<String>>> for HeadMap {
    fn from(entries: HashMap<String, Vec<String>>) -> Self {
        Self { entries }
    }
}
