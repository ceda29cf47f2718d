//! Types: monotypes, polytypes, and the constructor universe.
//!
//! # Terminology
//!
//! A _monotype_ ([`Ty`]) is a type variable, a base literal type, or a
//! constructor application. A _polytype_ ([`Poly`]) is a monotype optionally
//! preceded by universal quantification over a set of type variables; the
//! body of a [`Scheme`] is always a monotype, so quantifiers never nest.
//!
//! Type constructors are registered in a [`Universe`] with a fixed arity.
//! The universe is an explicit, per-session object rather than process-global
//! state, so independent inference sessions cannot interfere with each
//! other's constructor tables.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
};

use crate::{
    infer::TypeError,
    symbol::{StringInterner, Symbol},
};

pub mod display;

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// A type variable, unique by construction.
///
/// The wrapped id exists only to make variables distinct and orderable; it is
/// never shown to users. Display names (`a`, `b`, …) are assigned per print
/// call by [`display`].
#[derive(Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TyVar(u32);

impl TyVar {
    /// Mints a fresh variable, distinct from every other variable in the
    /// process.
    pub fn fresh() -> TyVar {
        TyVar(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Debug for TyVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// A registered type constructor: an interned name with a fixed arity.
///
/// Values of this type are only handed out by [`Universe::register`], so a
/// `Ctor` in circulation is always consistent with its universe's table.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ctor {
    name: Symbol,
    arity: usize,
}

impl Ctor {
    pub fn name(&self) -> Symbol {
        self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Applies the constructor to `args`.
    ///
    /// # Panics
    /// Panics if `args.len()` differs from the registered arity. This is a
    /// configuration error at construction time, not an inference-time
    /// failure: no surface program can reach it.
    pub fn apply(&self, args: Vec<Ty>) -> Ty {
        assert_eq!(
            args.len(),
            self.arity,
            "type constructor applied to the wrong number of arguments"
        );

        Ty::App(App {
            ctor: *self,
            args: args.into(),
        })
    }
}

/// A monotype.
#[derive(Debug, Hash, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Ty {
    Var(TyVar),
    Lit(Symbol),
    App(App),
}

/// A constructor application. `args.len()` equals `ctor.arity()` by
/// construction.
///
/// Arguments are a shared slice: the union-find store clones whole types
/// for its keys, so clones must be cheap. Equality, ordering, and hashing
/// are structural.
#[derive(Debug, Hash, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct App {
    pub ctor: Ctor,
    pub args: Arc<[Ty]>,
}

/// A polytype: either a bare monotype or a quantified scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poly {
    Mono(Ty),
    Scheme(Scheme),
}

/// A universally quantified type scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheme {
    /// The quantified variables, in ascending order.
    pub vars: Box<[TyVar]>,
    /// The body; always a monotype, never another scheme.
    pub body: Ty,
}

/// The per-session type universe: the interner, the constructor registry,
/// and handles for the built-in constructors and base types.
#[derive(Debug)]
pub struct Universe {
    pub interner: StringInterner,
    ctors: HashMap<Symbol, usize>,

    /// The function arrow, `from -> to`.
    pub arrow: Ctor,
    /// Mutable references, `ref t`.
    pub reference: Ctor,
    /// Effectful computations, `io t`.
    pub io: Ctor,
    /// Homogeneous lists, `list t`.
    pub list: Ctor,

    /// The base literal types.
    pub integer: Ty,
    pub real: Ty,
    pub boolean: Ty,
    pub string: Ty,
    pub unit: Ty,

    /// The fixpoint combinator's scheme, `forall a. (a -> a) -> a`.
    /// Instantiated fresh at every use site.
    pub fix: Scheme,
}

impl Universe {
    pub fn new() -> Self {
        let mut interner = StringInterner::new();
        let mut ctors = HashMap::new();

        let mut builtin = |name: &'static str, arity: usize| {
            let ctor = Ctor {
                name: interner.intern_static(name),
                arity,
            };
            ctors.insert(ctor.name, ctor.arity);
            ctor
        };

        let arrow = builtin("->", 2);
        let reference = builtin("ref", 1);
        let io = builtin("io", 1);
        let list = builtin("list", 1);

        let integer = Ty::Lit(interner.intern_static("int"));
        let real = Ty::Lit(interner.intern_static("real"));
        let boolean = Ty::Lit(interner.intern_static("bool"));
        let string = Ty::Lit(interner.intern_static("str"));
        let unit = Ty::Lit(interner.intern_static("unit"));

        let fix = {
            let a = TyVar::fresh();
            let inner = arrow.apply(vec![Ty::Var(a), Ty::Var(a)]);
            let body = arrow.apply(vec![inner, Ty::Var(a)]);
            Scheme {
                vars: Box::new([a]),
                body,
            }
        };

        Universe {
            interner,
            ctors,
            arrow,
            reference,
            io,
            list,
            integer,
            real,
            boolean,
            string,
            unit,
            fix,
        }
    }

    /// Registers the constructor `name` with the given arity, or returns the
    /// existing handle if it was already registered at the same arity.
    ///
    /// Re-registering a name at a different arity is a
    /// [constructor-redefinition error](TypeError::Redefinition).
    pub fn register(
        &mut self,
        name: Symbol,
        arity: usize,
    ) -> Result<Ctor, TypeError> {
        match self.ctors.get(&name) {
            Some(&registered) if registered != arity => {
                Err(TypeError::Redefinition {
                    name,
                    registered,
                    conflicting: arity,
                })
            }
            _ => {
                self.ctors.insert(name, arity);
                Ok(Ctor { name, arity })
            }
        }
    }

    /// `from -> to`.
    pub fn func(&self, from: Ty, to: Ty) -> Ty {
        self.arrow.apply(vec![from, to])
    }

    /// The right-associated chain `p1 -> p2 -> … -> ret`.
    pub fn func_chain<I>(&self, params: I, ret: Ty) -> Ty
    where
        I: IntoIterator<Item = Ty>,
        I::IntoIter: DoubleEndedIterator,
    {
        params
            .into_iter()
            .rev()
            .fold(ret, |to, from| self.func(from, to))
    }
}

impl Default for Universe {
    fn default() -> Self {
        Self::new()
    }
}
