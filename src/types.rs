//! Core data types for decoded request parameters and form fields.

use std::collections::HashMap;

// =============================================================================
// Ordered multi-map
// =============================================================================

/// Ordered mapping from key to a non-empty list of values.
///
/// Keys keep the order of their first occurrence, values keep the order in
/// which they appeared. A side index keeps lookups O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiMap<V> {
    entries: Vec<(String, Vec<V>)>,
    index: HashMap<String, usize>,
}

impl<V> Default for MultiMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> MultiMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `key`, creating the entry on first occurrence.
    pub fn push(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1.push(value),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![value]));
            }
        }
    }

    /// Values recorded for `key`, in input order.
    pub fn get(&self, key: &str) -> Option<&[V]> {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[V])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Keys in first-occurrence order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Entries sorted by key (byte order), for deterministic display.
    pub fn sorted(&self) -> Vec<(&str, &[V])> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Apply `f` to every value, keeping keys and order.
    pub fn map_values<U>(self, mut f: impl FnMut(V) -> U) -> MultiMap<U> {
        MultiMap {
            entries: self
                .entries
                .into_iter()
                .map(|(key, values)| (key, values.into_iter().map(&mut f).collect()))
                .collect(),
            index: self.index,
        }
    }
}

/// Decoded query string or URL-encoded body: key -> values.
pub type ParameterMap = MultiMap<String>;

/// Decoded form body: key -> fields.
pub type FieldMap = MultiMap<FormField>;

// =============================================================================
// Form fields
// =============================================================================

/// A single decoded form field.
///
/// A multipart part carrying a `filename` attribute is always an
/// [`FormField::UploadedFile`]; its content is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    /// Plain text value.
    Value(String),
    /// Uploaded file, identified by its client-supplied filename.
    UploadedFile(String),
}

// =============================================================================
// Body decoding result
// =============================================================================

/// Outcome of decoding a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyResult {
    /// The request method does not carry a form body.
    NotApplicable,
    /// No body was declared (missing, zero, negative or non-numeric length).
    Empty,
    /// Decoded fields (possibly none).
    Fields(FieldMap),
    /// The body could not be decoded; the message is shown to the user.
    DecodeError(String),
}
