//! Interned names, wrapping [`string_interner`].
//!
//! Every name in the system (program variables, type-constructor names,
//! base-type names) is a [`Symbol`]. Symbols are cheap to copy and compare,
//! and resolve back to strings only at the display edge.

use string_interner::{self, backend, symbol};

/// The initial capacity of a [`StringInterner`].
///
/// Sized for a REPL session: the builtin names plus a few hundred user
/// identifiers fit without reallocation.
const INTERNER_CAPACITY: usize = 512;

#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Symbol(symbol::SymbolU32);

#[derive(Debug)]
pub struct StringInterner(
    string_interner::StringInterner<backend::StringBackend<symbol::SymbolU32>>,
);

impl StringInterner {
    pub fn new() -> Self {
        StringInterner(string_interner::StringInterner::with_capacity(
            INTERNER_CAPACITY,
        ))
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        let raw_symbol = self.0.get_or_intern(s);
        Symbol(raw_symbol)
    }

    pub fn intern_static(&mut self, s: &'static str) -> Symbol {
        let raw_symbol = self.0.get_or_intern_static(s);
        Symbol(raw_symbol)
    }

    /// Resolves a symbol previously produced by this interner.
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.0
            .resolve(sym.0)
            .expect("symbols are interned before they are resolved")
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
