// tarn-vm - Symbol type with interning
// Copyright (c) 2026 The Tarn Authors. MIT licensed.

//! Interned Scheme identifiers.
//!
//! Two symbols with the same spelling share the same underlying storage,
//! so equality and hashing are pointer operations. Interned symbols are
//! never deallocated: the global interner keeps a strong reference to every
//! symbol created during the program's lifetime. Scheme programs use a
//! bounded set of identifiers fixed at read time, so the overhead is modest.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, OnceLock};

/// An interned identifier.
#[derive(Clone)]
pub struct Symbol {
    inner: Arc<str>,
}

/// Global symbol interner.
static SYMBOL_INTERNER: OnceLock<Mutex<HashMap<String, Arc<str>>>> = OnceLock::new();

fn get_interner() -> &'static Mutex<HashMap<String, Arc<str>>> {
    SYMBOL_INTERNER.get_or_init(|| Mutex::new(HashMap::new()))
}

impl Symbol {
    /// Intern `name` and return the canonical symbol for it.
    pub fn new(name: &str) -> Self {
        let mut interner = get_interner()
            .lock()
            .expect("symbol interner mutex poisoned: a thread panicked while interning");
        if let Some(existing) = interner.get(name) {
            return Symbol {
                inner: Arc::clone(existing),
            };
        }
        let interned: Arc<str> = Arc::from(name);
        interner.insert(name.to_string(), Arc::clone(&interned));
        Symbol { inner: interned }
    }

    /// Get the symbol's spelling.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self)
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        // Interning makes pointer comparison sufficient.
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}
