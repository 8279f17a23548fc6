//! Sharded string interner.
//!
//! O(1) interning and lookup with per-shard locking, so one interner can be
//! shared by concurrent parses of different modules. Within a single parse
//! the interner is only ever appended to.

use crate::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Shard {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

impl Shard {
    fn new() -> Self {
        Shard {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(64),
        }
    }

    /// Shard 0 holds the pre-interned empty string at local index 0.
    fn with_empty() -> Self {
        let mut shard = Self::new();
        shard.map.insert("", 0);
        shard.strings.push("");
        shard
    }
}

/// Sharded string interner.
///
/// Interned text is leaked into `'static` storage; the interner is expected
/// to live for the whole compilation.
pub struct StringInterner {
    shards: [RwLock<Shard>; Name::NUM_SHARDS],
    total: AtomicUsize,
}

impl StringInterner {
    pub fn new() -> Self {
        let shards = std::array::from_fn(|i| {
            RwLock::new(if i == 0 { Shard::with_empty() } else { Shard::new() })
        });
        StringInterner {
            shards,
            total: AtomicUsize::new(1),
        }
    }

    fn shard_of(s: &str) -> usize {
        if s.is_empty() {
            return 0;
        }
        // Cheap byte-mix; only needs to spread load, not be collision-free.
        let mut h = 0xcbf2u16;
        for &b in s.as_bytes().iter().take(8) {
            h = h.rotate_left(3) ^ u16::from(b);
        }
        (h as usize) % Name::NUM_SHARDS
    }

    /// Intern a string, returning its compact identifier.
    pub fn intern(&self, s: &str) -> Name {
        let idx = Self::shard_of(s);
        {
            let shard = self.shards[idx].read();
            if let Some(&local) = shard.map.get(s) {
                return Name::new(idx as u32, local);
            }
        }
        let mut shard = self.shards[idx].write();
        if let Some(&local) = shard.map.get(s) {
            return Name::new(idx as u32, local);
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let local = shard.strings.len() as u32;
        debug_assert!(local <= Name::MAX_LOCAL, "interner shard overflow");
        shard.strings.push(leaked);
        shard.map.insert(leaked, local);
        self.total.fetch_add(1, Ordering::Relaxed);
        Name::new(idx as u32, local)
    }

    /// Intern an owned string without re-allocating on a miss.
    pub fn intern_owned(&self, s: String) -> Name {
        let idx = Self::shard_of(&s);
        let mut shard = self.shards[idx].write();
        if let Some(&local) = shard.map.get(s.as_str()) {
            return Name::new(idx as u32, local);
        }
        let leaked: &'static str = Box::leak(s.into_boxed_str());
        let local = shard.strings.len() as u32;
        debug_assert!(local <= Name::MAX_LOCAL, "interner shard overflow");
        shard.strings.push(leaked);
        shard.map.insert(leaked, local);
        self.total.fetch_add(1, Ordering::Relaxed);
        Name::new(idx as u32, local)
    }

    /// Resolve an identifier back to its text.
    pub fn resolve(&self, name: Name) -> &'static str {
        let shard = self.shards[name.shard()].read();
        shard.strings.get(name.local()).copied().unwrap_or("")
    }

    /// Total number of interned strings.
    pub fn len(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
