//! Rendering types for the REPL and diagnostics.
//!
//! Variables get short names (`a`, `b`, …, then `t26`, `t27`, …) assigned in
//! order of first appearance and scoped to a single print call; the raw
//! variable identities never leak into output. Arrows render as
//! right-associative infix, every other constructor renders prefix.

use std::collections::HashMap;

use pretty::RcDoc;

use super::{Poly, Ty, TyVar, Universe};

/// Rendering width. Types are small; this mostly never wraps.
const WIDTH: usize = 80;

/// Display positions, from loosest to tightest binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Top level, or the right-hand side of an arrow.
    Top,
    /// The left-hand side of an arrow: nested arrows need parentheses.
    ArrowLhs,
    /// An argument of a prefix constructor: any application needs
    /// parentheses.
    CtorArg,
}

/// Assigns per-call display names to type variables.
#[derive(Debug, Default)]
struct Namer {
    names: HashMap<TyVar, usize>,
}

impl Namer {
    fn name(&mut self, var: TyVar) -> String {
        let next = self.names.len();
        let index = *self.names.entry(var).or_insert(next);

        if index < 26 {
            char::from(b'a' + index as u8).to_string()
        } else {
            format!("t{index}")
        }
    }
}

impl Universe {
    /// Renders a polytype on one logical line.
    pub fn show_poly(&self, poly: &Poly) -> String {
        let mut namer = Namer::default();
        format!("{}", self.poly_doc(&mut namer, poly).pretty(WIDTH))
    }

    /// Renders a monotype.
    pub fn show_ty(&self, ty: &Ty) -> String {
        let mut namer = Namer::default();
        let doc = self.ty_doc(&mut namer, ty, Position::Top);
        format!("{}", doc.pretty(WIDTH))
    }

    /// Renders two monotypes with a shared variable namer, so that the same
    /// variable gets the same letter on both sides of a diagnostic.
    pub fn show_ty_pair(&self, left: &Ty, right: &Ty) -> (String, String) {
        let mut namer = Namer::default();
        let left = self.ty_doc(&mut namer, left, Position::Top);
        let left = format!("{}", left.pretty(WIDTH));
        let right = self.ty_doc(&mut namer, right, Position::Top);
        let right = format!("{}", right.pretty(WIDTH));
        (left, right)
    }

    fn poly_doc(&self, namer: &mut Namer, poly: &Poly) -> RcDoc<'static, ()> {
        match poly {
            Poly::Mono(ty) => self.ty_doc(namer, ty, Position::Top),
            Poly::Scheme(scheme) => {
                // quantified variables are named first, in quantifier order
                let vars = scheme
                    .vars
                    .iter()
                    .map(|&var| RcDoc::text(namer.name(var)));

                RcDoc::text("forall")
                    .append(RcDoc::space())
                    .append(RcDoc::intersperse(vars, RcDoc::space()))
                    .append(RcDoc::text(". "))
                    .append(self.ty_doc(namer, &scheme.body, Position::Top))
            }
        }
    }

    fn ty_doc(
        &self,
        namer: &mut Namer,
        ty: &Ty,
        position: Position,
    ) -> RcDoc<'static, ()> {
        match ty {
            Ty::Var(var) => RcDoc::text(namer.name(*var)),
            Ty::Lit(name) => {
                RcDoc::text(self.interner.resolve(*name).to_string())
            }
            Ty::App(app) if app.ctor == self.arrow => {
                let from =
                    self.ty_doc(namer, &app.args[0], Position::ArrowLhs);
                let to = self.ty_doc(namer, &app.args[1], Position::Top);

                let doc = from.append(RcDoc::text(" -> ")).append(to);
                match position {
                    Position::Top => doc,
                    _ => parens(doc),
                }
            }
            Ty::App(app) => {
                let name = self.interner.resolve(app.ctor.name()).to_string();
                let doc = app.args.iter().fold(
                    RcDoc::<'static, ()>::text(name),
                    |doc, arg| {
                        doc.append(RcDoc::space()).append(self.ty_doc(
                            namer,
                            arg,
                            Position::CtorArg,
                        ))
                    },
                );

                match position {
                    Position::CtorArg => parens(doc),
                    _ => doc,
                }
            }
        }
    }
}

fn parens(doc: RcDoc<'static, ()>) -> RcDoc<'static, ()> {
    RcDoc::text("(").append(doc).append(RcDoc::text(")"))
}

#[cfg(test)]
mod tests {
    use super::super::{Poly, Scheme, Ty, TyVar, Universe};

    #[test]
    fn base_types_render_by_name() {
        let uni = Universe::new();
        assert_eq!(uni.show_ty(&uni.integer), "int");
        assert_eq!(uni.show_ty(&uni.unit), "unit");
    }

    #[test]
    fn arrows_render_right_associated() {
        let uni = Universe::new();

        // int -> int -> bool needs no parentheses
        let chain = uni.func_chain(
            vec![uni.integer.clone(), uni.integer.clone()],
            uni.boolean.clone(),
        );
        assert_eq!(uni.show_ty(&chain), "int -> int -> bool");

        // (int -> int) -> int parenthesizes the left-nested arrow
        let inner = uni.func(uni.integer.clone(), uni.integer.clone());
        let nested = uni.func(inner, uni.integer.clone());
        assert_eq!(uni.show_ty(&nested), "(int -> int) -> int");
    }

    #[test]
    fn prefix_constructors_bind_tighter_than_arrows() {
        let uni = Universe::new();
        let a = Ty::Var(TyVar::fresh());

        // ref a -> a
        let deref =
            uni.func(uni.reference.apply(vec![a.clone()]), a.clone());
        assert_eq!(uni.show_ty(&deref), "ref a -> a");

        // ref (list a)
        let nested = uni.reference.apply(vec![uni.list.apply(vec![a])]);
        assert_eq!(uni.show_ty(&nested), "ref (list a)");
    }

    #[test]
    fn variable_names_are_scoped_to_one_call() {
        let uni = Universe::new();
        let v = Ty::Var(TyVar::fresh());
        let w = Ty::Var(TyVar::fresh());

        // first-appearance order decides the letters, whatever the ids are
        let pair = uni.func(w.clone(), v.clone());
        assert_eq!(uni.show_ty(&pair), "a -> b");

        // and each call starts over
        assert_eq!(uni.show_ty(&v), "a");
        assert_eq!(uni.show_ty(&w), "a");
    }

    #[test]
    fn schemes_quantify_in_prefix_order() {
        let uni = Universe::new();
        let a = TyVar::fresh();
        let b = TyVar::fresh();

        let scheme = Poly::Scheme(Scheme {
            vars: Box::new([a, b]),
            body: uni.func(Ty::Var(a), Ty::Var(b)),
        });
        assert_eq!(uni.show_poly(&scheme), "forall a b. a -> b");
    }

    #[test]
    fn fix_combinator_renders_with_parenthesized_domain() {
        let uni = Universe::new();
        let fix = Poly::Scheme(uni.fix.clone());
        assert_eq!(uni.show_poly(&fix), "forall a. (a -> a) -> a");
    }

    #[test]
    fn shared_namer_keeps_letters_aligned_across_a_pair() {
        let uni = Universe::new();
        let v = Ty::Var(TyVar::fresh());

        let left = uni.reference.apply(vec![v.clone()]);
        let (l, r) = uni.show_ty_pair(&left, &v);
        assert_eq!(l, "ref a");
        assert_eq!(r, "a");
    }
}
