//! String interning for task and worker ids.
//!
//! Ids are resolved once into dense indices so that the placement loop works
//! on plain vectors instead of string-keyed maps.

use rustc_hash::FxHashMap;

/// Dense index into an interner (and into any vector built in the same order).
pub type Idx = u32;

/// Bidirectional map between string ids and dense indices.
#[derive(Debug, Clone)]
pub struct IdInterner {
    to_idx: FxHashMap<String, Idx>,
    from_idx: Vec<String>,
}

impl IdInterner {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_idx: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            from_idx: Vec::with_capacity(capacity),
        }
    }

    /// Intern a string, returning its index.
    /// If already interned, returns the existing index.
    pub fn intern(&mut self, s: &str) -> Idx {
        if let Some(&idx) = self.to_idx.get(s) {
            return idx;
        }
        self.push(s)
    }

    /// Intern a string that must not be present yet.
    ///
    /// Returns `None` when the id was already interned.
    pub fn intern_unique(&mut self, s: &str) -> Option<Idx> {
        if self.to_idx.contains_key(s) {
            return None;
        }
        Some(self.push(s))
    }

    fn push(&mut self, s: &str) -> Idx {
        let idx = self.from_idx.len() as Idx;
        self.from_idx.push(s.to_string());
        self.to_idx.insert(s.to_string(), idx);
        idx
    }

    #[inline]
    pub fn get(&self, s: &str) -> Option<Idx> {
        self.to_idx.get(s).copied()
    }

    /// Get the string for an index.
    ///
    /// Indices handed out by this interner always resolve.
    #[inline]
    pub fn resolve(&self, idx: Idx) -> &str {
        &self.from_idx[idx as usize]
    }

    pub fn len(&self) -> usize {
        self.from_idx.len()
    }
}

impl Default for IdInterner {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
