//! Type-change compatibility whitelist
//!
//! A field type change is non-breaking only when the `(from, to)` pair is
//! listed here. Anything else, including the reverse of a listed pair, is
//! classified as breaking.

use archsync_core::FieldType;
use std::collections::BTreeSet;

/// Set of one-directional safe type widenings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCompatibility {
    safe: BTreeSet<(FieldType, FieldType)>,
}

impl TypeCompatibility {
    /// A whitelist with no safe transitions: every type change is breaking
    pub fn empty() -> Self {
        Self {
            safe: BTreeSet::new(),
        }
    }

    /// Mark `from → to` as a safe widening
    pub fn with_safe(mut self, from: FieldType, to: FieldType) -> Self {
        self.safe.insert((from, to));
        self
    }

    /// Add several safe widenings
    pub fn extend(&mut self, pairs: impl IntoIterator<Item = (FieldType, FieldType)>) {
        self.safe.extend(pairs);
    }

    /// Whether changing a column from `from` to `to` keeps existing data valid
    pub fn is_safe(&self, from: FieldType, to: FieldType) -> bool {
        self.safe.contains(&(from, to))
    }

    /// Iterate the whitelisted pairs in a stable order
    pub fn pairs(&self) -> impl Iterator<Item = &(FieldType, FieldType)> {
        self.safe.iter()
    }
}

impl Default for TypeCompatibility {
    fn default() -> Self {
        Self::empty()
            .with_safe(FieldType::String, FieldType::Text)
            .with_safe(FieldType::Integer, FieldType::Decimal)
    }
}
