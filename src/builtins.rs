//! The seed typing context.
//!
//! Installs the primitive operators into a context's root frame. Everything
//! here is ordinary data in the context; there is no other configuration
//! surface, and a host can just as well seed its own context from scratch.

use std::collections::BTreeSet;

use crate::{
    context::Context,
    infer::generalize,
    ty::{Ty, TyVar, Universe},
};

/// Installs the built-in operators and primitives into `ctx`'s root frame.
pub fn install(uni: &mut Universe, ctx: &mut Context) {
    let root = ctx.root();
    let no_exclusions = BTreeSet::new();

    let mut define = |uni: &mut Universe, name: &'static str, ty: Ty| {
        let name = uni.interner.intern_static(name);
        let poly = generalize(ctx, root, ty, &no_exclusions);
        ctx.set(root, name, poly);
    };

    // integer arithmetic and comparison
    for op in ["+", "-", "*"] {
        let ty = uni.func_chain(
            vec![uni.integer.clone(), uni.integer.clone()],
            uni.integer.clone(),
        );
        define(uni, op, ty);
    }
    {
        let ty = uni.func_chain(
            vec![uni.integer.clone(), uni.integer.clone()],
            uni.boolean.clone(),
        );
        define(uni, "=", ty);
    }

    // mutable references
    {
        let a = Ty::Var(TyVar::fresh());
        let ty = uni.func(a.clone(), uni.reference.apply(vec![a.clone()]));
        define(uni, "ref", ty);
    }
    {
        let a = Ty::Var(TyVar::fresh());
        let ty = uni.func(uni.reference.apply(vec![a.clone()]), a.clone());
        define(uni, "!", ty);
    }
    {
        let a = Ty::Var(TyVar::fresh());
        let ty = uni.func_chain(
            vec![uni.reference.apply(vec![a.clone()]), a.clone()],
            uni.io.apply(vec![uni.unit.clone()]),
        );
        define(uni, "set!", ty);
    }

    // effects
    {
        let a = Ty::Var(TyVar::fresh());
        let ty = uni.func(uni.io.apply(vec![a.clone()]), a.clone());
        define(uni, "unsafe", ty);
    }
    {
        let a = Ty::Var(TyVar::fresh());
        let ty = uni.func(a.clone(), uni.io.apply(vec![uni.unit.clone()]));
        define(uni, "print", ty);
    }
    {
        // the target of do-notation desugaring
        let a = Ty::Var(TyVar::fresh());
        let b = Ty::Var(TyVar::fresh());
        let ty = uni.func_chain(
            vec![
                uni.io.apply(vec![a.clone()]),
                uni.func(a.clone(), uni.io.apply(vec![b.clone()])),
            ],
            uni.io.apply(vec![b.clone()]),
        );
        define(uni, "bind", ty);
    }
    {
        let a = Ty::Var(TyVar::fresh());
        let ty = uni.func(a.clone(), uni.io.apply(vec![a.clone()]));
        define(uni, "return", ty);
    }

    // lists
    {
        let a = Ty::Var(TyVar::fresh());
        define(uni, "nil", uni.list.apply(vec![a]));
    }
    {
        let a = Ty::Var(TyVar::fresh());
        let ty = uni.func_chain(
            vec![a.clone(), uni.list.apply(vec![a.clone()])],
            uni.list.apply(vec![a.clone()]),
        );
        define(uni, "cons", ty);
    }
    {
        let a = Ty::Var(TyVar::fresh());
        let ty = uni.func(uni.list.apply(vec![a.clone()]), a.clone());
        define(uni, "head", ty);
    }
    {
        let a = Ty::Var(TyVar::fresh());
        let ty = uni.func(
            uni.list.apply(vec![a.clone()]),
            uni.list.apply(vec![a.clone()]),
        );
        define(uni, "tail", ty);
    }

    // the target of if desugaring
    {
        let a = Ty::Var(TyVar::fresh());
        let ty = uni.func_chain(
            vec![uni.boolean.clone(), a.clone(), a.clone()],
            a.clone(),
        );
        define(uni, "if", ty);
    }
}

#[cfg(test)]
mod tests {
    use super::install;
    use crate::{context::Context, ty::Universe};

    #[test]
    fn seed_context_types_are_as_declared() {
        let mut uni = Universe::new();
        let mut ctx = Context::new();
        install(&mut uni, &mut ctx);

        let show = |uni: &mut Universe, name: &str| {
            let sym = uni.interner.intern(name);
            let poly = ctx
                .find(ctx.root(), sym)
                .expect("builtin should be installed");
            uni.show_poly(poly)
        };

        assert_eq!(show(&mut uni, "+"), "int -> int -> int");
        assert_eq!(show(&mut uni, "="), "int -> int -> bool");
        assert_eq!(show(&mut uni, "ref"), "forall a. a -> ref a");
        assert_eq!(show(&mut uni, "!"), "forall a. ref a -> a");
        assert_eq!(
            show(&mut uni, "set!"),
            "forall a. ref a -> a -> io unit"
        );
        assert_eq!(show(&mut uni, "unsafe"), "forall a. io a -> a");
        assert_eq!(
            show(&mut uni, "bind"),
            "forall a b. io a -> (a -> io b) -> io b"
        );
        assert_eq!(show(&mut uni, "cons"), "forall a. a -> list a -> list a");
        assert_eq!(show(&mut uni, "if"), "forall a. bool -> a -> a -> a");
    }
}
