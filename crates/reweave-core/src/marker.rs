// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Extensible metadata attached to tree nodes.
//!
//! Every node carries a [`Markers`] store: an ordered, immutable bag of typed
//! values. Marker types are open: any type implementing [`Marker`] can be
//! attached, and equality between markers is structural, supplied by the
//! marker type itself.
//!
//! ## Invariants
//!
//! - No operation mutates the receiver; each returns a new store (or the
//!   receiver itself when nothing changed).
//! - [`Markers::add`] is idempotent: adding a marker structurally equal to one
//!   already present returns the receiver, sharing its allocation.
//! - Iteration order is first-insertion order.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use sha2::{Digest, Sha256};

// ============================================================================
// Marker capability
// ============================================================================

/// A typed metadata value that can be attached to a node.
///
/// Structural equality and hashing come from the implementing type, so a
/// plain `#[derive(Debug, PartialEq, Eq, Hash)]` plus an empty impl is all a
/// marker needs.
pub trait Marker: fmt::Debug + PartialEq + Hash + Send + Sync + 'static {
    /// Stable name of this marker kind, used for lookup by name and in logs.
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Object-safe view of a [`Marker`].
///
/// Implemented for every `Marker` through a blanket impl; callers never
/// implement it directly.
pub trait DynMarker: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynMarker) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn dyn_kind(&self) -> &'static str;
}

impl<T: Marker> DynMarker for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynMarker) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }

    fn dyn_kind(&self) -> &'static str {
        self.kind()
    }
}

// ============================================================================
// Markers store
// ============================================================================

/// Ordered, immutable collection of markers.
///
/// Cloning is cheap: the entries are shared behind an `Arc`.
#[derive(Clone, Default)]
pub struct Markers(Arc<Vec<Arc<dyn DynMarker>>>);

impl Markers {
    /// An empty store.
    pub fn new() -> Self {
        Markers::default()
    }

    /// Store holding a single marker.
    pub fn of<M: Marker>(marker: M) -> Self {
        Markers(Arc::new(vec![Arc::new(marker)]))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all markers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn DynMarker> {
        self.0.iter().map(|m| m.as_ref())
    }

    /// True if both stores share the same allocation.
    pub fn ptr_eq(&self, other: &Markers) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// True if a marker structurally equal to `marker` is present.
    pub fn contains<M: Marker>(&self, marker: &M) -> bool {
        self.iter().any(|m| m.dyn_eq(marker))
    }

    /// Add a marker unless a structurally equal one is already present.
    ///
    /// Returns the receiver (sharing its allocation) when the marker is
    /// already present, otherwise a new store with the marker appended.
    pub fn add<M: Marker>(&self, marker: M) -> Markers {
        if self.contains(&marker) {
            return self.clone();
        }
        self.appended(Arc::new(marker))
    }

    /// Add a marker only if no marker of the same type is present.
    pub fn add_if_absent<M: Marker>(&self, marker: M) -> Markers {
        if self.find_first::<M>().is_some() {
            return self.clone();
        }
        self.appended(Arc::new(marker))
    }

    /// Replace every marker of the same type with `marker`.
    ///
    /// The replacement takes the position of the first replaced marker, or is
    /// appended if there was none.
    pub fn set<M: Marker>(&self, marker: M) -> Markers {
        if self.find_all::<M>().count() == 1 && self.contains(&marker) {
            return self.clone();
        }
        let mut marker: Option<Arc<dyn DynMarker>> = Some(Arc::new(marker));
        let mut entries = Vec::with_capacity(self.0.len() + 1);
        for existing in self.0.iter() {
            if existing.as_any().is::<M>() {
                if let Some(m) = marker.take() {
                    entries.push(m);
                }
            } else {
                entries.push(Arc::clone(existing));
            }
        }
        if let Some(m) = marker {
            entries.push(m);
        }
        Markers(Arc::new(entries))
    }

    /// Remove every marker of type `M`.
    pub fn remove<M: Marker>(&self) -> Markers {
        if self.find_first::<M>().is_none() {
            return self.clone();
        }
        let entries = self
            .0
            .iter()
            .filter(|m| !m.as_any().is::<M>())
            .cloned()
            .collect();
        Markers(Arc::new(entries))
    }

    /// All markers of type `M`, in insertion order.
    pub fn find_all<M: Marker>(&self) -> impl Iterator<Item = &M> {
        self.0.iter().filter_map(|m| m.as_any().downcast_ref::<M>())
    }

    /// First marker of type `M`.
    pub fn find_first<M: Marker>(&self) -> Option<&M> {
        self.find_all::<M>().next()
    }

    /// All markers whose [`Marker::kind`] equals `kind`.
    pub fn find_all_by_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a dyn DynMarker> {
        self.iter().filter(move |m| m.dyn_kind() == kind)
    }

    fn appended(&self, marker: Arc<dyn DynMarker>) -> Markers {
        let mut entries = Vec::with_capacity(self.0.len() + 1);
        entries.extend(self.0.iter().cloned());
        entries.push(marker);
        Markers(Arc::new(entries))
    }
}

impl PartialEq for Markers {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.len() == other.len()
                && self.iter().zip(other.iter()).all(|(a, b)| a.dyn_eq(b)))
    }
}

impl Eq for Markers {}

impl Hash for Markers {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for marker in self.iter() {
            marker.dyn_hash(state);
        }
    }
}

impl fmt::Debug for Markers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

// ============================================================================
// Built-in markers
// ============================================================================

/// Where a node started in the text it was parsed from.
///
/// Lines and columns are 1-indexed, the offset is a 0-indexed byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Marker for SourcePosition {
    fn kind(&self) -> &'static str {
        "SourcePosition"
    }
}

/// SHA-256 hash of file content, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash of the text a source file was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Checksum(pub ContentHash);

impl Checksum {
    pub fn of(text: &str) -> Self {
        Checksum(ContentHash::compute(text.as_bytes()))
    }
}

impl Marker for Checksum {
    fn kind(&self) -> &'static str {
        "Checksum"
    }
}

/// Marks a node found by a search-style recipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchResult {
    pub description: Option<String>,
}

impl SearchResult {
    pub fn new(description: impl Into<String>) -> Self {
        SearchResult {
            description: Some(description.into()),
        }
    }
}

impl Marker for SearchResult {
    fn kind(&self) -> &'static str {
        "SearchResult"
    }
}

// ============================================================================
// Tests
// ============================================================================
