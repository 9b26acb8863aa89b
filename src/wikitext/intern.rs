//! String interning pools
//!
//! Batch pipelines see the same template and namespace names millions of
//! times; interning deduplicates them into cheap copyable [`Symbol`]
//! handles. Pools are explicitly constructed and explicitly passed;
//! there is no ambient global pool. [`SharedInterner`] is internally
//! synchronized and safe to share across concurrent parses;
//! [`LocalInterner`] drops the lock for single-threaded pipelines.
//!
//! Handles are only valid for the pool that issued them, and only until
//! that pool is cleared: [`Interner::clear`] bumps an internal generation
//! and every outstanding symbol resolves to `None` afterwards. That is a
//! caller-visible contract, not an implementation detail.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::RwLock;

/// A handle to an interned string.
///
/// Symbols are meaningful only to the pool that issued them; resolving a
/// symbol against another pool, or against its pool after a clear,
/// returns `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    index: u32,
    generation: u32,
}

/// The interning capability both pool variants implement.
pub trait Interner {
    /// Intern `text`, returning the existing symbol if it is already in
    /// the pool.
    fn intern(&self, text: &str) -> Symbol;

    /// Look a symbol back up. `None` for symbols from another pool or
    /// an earlier generation.
    fn resolve(&self, symbol: Symbol) -> Option<String>;

    /// Drop every interned string and invalidate all outstanding
    /// symbols.
    fn clear(&self);

    /// Number of distinct strings currently interned.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Storage shared by both pool variants.
#[derive(Debug, Default)]
struct Pool {
    strings: Vec<String>,
    lookup: HashMap<String, u32>,
    generation: u32,
}

impl Pool {
    fn intern(&mut self, text: &str) -> Symbol {
        let generation = self.generation;
        if let Some(&index) = self.lookup.get(text) {
            return Symbol { index, generation };
        }
        let index = self.strings.len() as u32;
        self.strings.push(text.to_string());
        self.lookup.insert(text.to_string(), index);
        Symbol { index, generation }
    }

    fn resolve(&self, symbol: Symbol) -> Option<String> {
        if symbol.generation != self.generation {
            return None;
        }
        self.strings.get(symbol.index as usize).cloned()
    }

    fn clear(&mut self) {
        self.strings.clear();
        self.lookup.clear();
        self.generation += 1;
    }
}

/// An internally synchronized pool, safe for concurrent interning from
/// multiple parses.
#[derive(Debug, Default)]
pub struct SharedInterner {
    pool: RwLock<Pool>,
}

impl SharedInterner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Interner for SharedInterner {
    fn intern(&self, text: &str) -> Symbol {
        self.pool.write().expect("interner lock").intern(text)
    }

    fn resolve(&self, symbol: Symbol) -> Option<String> {
        self.pool.read().expect("interner lock").resolve(symbol)
    }

    fn clear(&self) {
        self.pool.write().expect("interner lock").clear()
    }

    fn len(&self) -> usize {
        self.pool.read().expect("interner lock").strings.len()
    }
}

/// An unsynchronized pool for single-threaded batch pipelines, trading
/// the lock for throughput.
#[derive(Debug, Default)]
pub struct LocalInterner {
    pool: RefCell<Pool>,
}

impl LocalInterner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Interner for LocalInterner {
    fn intern(&self, text: &str) -> Symbol {
        self.pool.borrow_mut().intern(text)
    }

    fn resolve(&self, symbol: Symbol) -> Option<String> {
        self.pool.borrow().resolve(symbol)
    }

    fn clear(&self) {
        self.pool.borrow_mut().clear()
    }

    fn len(&self) -> usize {
        self.pool.borrow().strings.len()
    }
}
