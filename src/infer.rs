//! Algorithm W over the core AST.
//!
//! # Structure
//! Inference proceeds in a single syntax-directed pass:
//!
//! 1. [`Infer::infer`] walks an expression and produces a monotype per node,
//!    merging equivalence classes in the run's [`UnionFind`] store as it
//!    unifies;
//! 2. [`represent`] resolves the result against the store into a canonical,
//!    store-independent deep copy;
//! 3. [`generalize`] quantifies the variables that are free in the result
//!    but unbound in the context, minus the set [`dangerous`] says must
//!    stay monomorphic.
//!
//! The dangerous-variable analysis is the value-restriction guard: a
//! `let`-bound mutable reference (or an effectful function's argument) never
//! has its type variables generalized, since a polymorphic cell could be
//! written at one type and read at another.

use std::collections::{BTreeSet, HashMap};

use crate::{
    ast,
    context::{Context, FrameId},
    symbol::Symbol,
    ty::{App, Poly, Scheme, Ty, TyVar, Universe},
    union_find::UnionFind,
};

/// The ways an inference run can fail.
///
/// Every variant is terminal for the current run: errors propagate straight
/// out of the recursion and nothing is retried or partially recovered.
/// Rendering happens at the driver edge via [`TypeError::render`], where the
/// owning universe's interner is available.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeError {
    /// A variable reference found no binding up the entire context chain.
    Unbound { name: Symbol },
    /// Unification met two applications with different head constructors.
    CtorMismatch { left: App, right: App },
    /// Linking the variable into the application would have produced an
    /// infinite type.
    Occurs { var: TyVar, ty: App },
    /// A structural mismatch: distinct base literals, a literal against an
    /// application, or the resolved outer pair from a failed argument
    /// unification.
    Mismatch { left: Ty, right: Ty },
    /// A known constructor symbol was re-registered at a different arity.
    Redefinition {
        name: Symbol,
        registered: usize,
        conflicting: usize,
    },
}

impl TypeError {
    /// Renders a user-facing message against the universe that owns the
    /// names involved.
    pub fn render(&self, uni: &Universe) -> String {
        match self {
            TypeError::Unbound { name } => {
                format!("undeclared variable: {}", uni.interner.resolve(*name))
            }
            TypeError::CtorMismatch { left, right } => {
                let (left, right) = uni.show_ty_pair(
                    &Ty::App(left.clone()),
                    &Ty::App(right.clone()),
                );
                format!("cannot match {left} with {right}")
            }
            TypeError::Occurs { var, ty } => {
                let (var, ty) =
                    uni.show_ty_pair(&Ty::Var(*var), &Ty::App(ty.clone()));
                format!("cannot construct the infinite type {var} = {ty}")
            }
            TypeError::Mismatch { left, right } => {
                let (left, right) = uni.show_ty_pair(left, right);
                format!("cannot match {left} with {right}")
            }
            TypeError::Redefinition {
                name,
                registered,
                conflicting,
            } => format!(
                "constructor {} is already registered with arity {} \
                 (attempted arity {})",
                uni.interner.resolve(*name),
                registered,
                conflicting
            ),
        }
    }
}

/// Unifies two monotypes, merging their equivalence classes in `store`.
pub fn unify(
    store: &mut UnionFind,
    a: &Ty,
    b: &Ty,
) -> Result<(), TypeError> {
    let a = store.find(a);
    let b = store.find(b);

    if a == b {
        return Ok(());
    }

    match (&a, &b) {
        (Ty::App(left), Ty::App(right)) => {
            if left.ctor != right.ctor {
                return Err(TypeError::CtorMismatch {
                    left: left.clone(),
                    right: right.clone(),
                });
            }

            // arities agree because the constructors do
            for (x, y) in left.args.iter().zip(right.args.iter()) {
                if let Err(inner) = unify(store, x, y) {
                    return Err(enrich(store, inner, &a, &b));
                }
            }

            // record that the outer terms are equal too; both are terms, so
            // either representative keeps a term canonical
            store.link(&a, &b);
            Ok(())
        }

        // two variables: either orientation is legal
        (Ty::Var(_), Ty::Var(_)) => {
            store.link(&a, &b);
            Ok(())
        }

        // exactly one variable: it joins the other side's class, so a term
        // rather than a variable stays canonical
        (Ty::Var(var), other) | (other, Ty::Var(var)) => {
            link_var(store, *var, other)
        }

        // distinct literals, or a literal against an application
        _ => Err(TypeError::Mismatch { left: a, right: b }),
    }
}

/// Links `var` into `other`'s class after the occurs check.
///
/// The occurs check is deliberately shallow: it inspects only `other`'s
/// immediate arguments, not arguments nested inside those arguments.
/// Cycles buried deeper than one constructor are not detected.
fn link_var(
    store: &mut UnionFind,
    var: TyVar,
    other: &Ty,
) -> Result<(), TypeError> {
    if let Ty::App(app) = other {
        let occurs = app
            .args
            .iter()
            .any(|arg| matches!(arg, Ty::Var(v) if *v == var));

        if occurs {
            return Err(TypeError::Occurs {
                var,
                ty: app.clone(),
            });
        }
    }

    store.link(&Ty::Var(var), other);
    Ok(())
}

/// Upgrades a failed argument unification to report the (now more resolved)
/// outer pair, but only once both outer types are fully concrete, so that
/// half-solved types never leak into diagnostics.
fn enrich(
    store: &mut UnionFind,
    inner: TypeError,
    left: &Ty,
    right: &Ty,
) -> TypeError {
    let left = represent(store, left);
    let right = represent(store, right);

    if variables(&left).is_empty() && variables(&right).is_empty() {
        TypeError::Mismatch { left, right }
    } else {
        inner
    }
}

/// Resolves `t` to its canonical form: the representative of its class,
/// with application arguments themselves recursively resolved.
///
/// The result is a deep copy sharing no classes-in-progress with the store,
/// so it stays meaningful after the store is dropped.
pub fn represent(store: &mut UnionFind, t: &Ty) -> Ty {
    match store.find(t) {
        Ty::App(app) => {
            let args: Vec<Ty> =
                app.args.iter().map(|arg| represent(store, arg)).collect();

            Ty::App(App {
                ctor: app.ctor,
                args: args.into(),
            })
        }
        other => other,
    }
}

/// Every type variable reachable inside `t`.
pub fn variables(t: &Ty) -> BTreeSet<TyVar> {
    fn walk(t: &Ty, out: &mut BTreeSet<TyVar>) {
        match t {
            Ty::Var(var) => {
                out.insert(*var);
            }
            Ty::Lit(_) => {}
            Ty::App(app) => {
                for arg in app.args.iter() {
                    walk(arg, out);
                }
            }
        }
    }

    let mut out = BTreeSet::new();
    walk(t, &mut out);
    out
}

/// Replaces each of the scheme's quantified variables with a brand-new
/// variable throughout the body.
pub fn instantiate(scheme: &Scheme) -> Ty {
    let substitution: HashMap<TyVar, TyVar> = scheme
        .vars
        .iter()
        .map(|&var| (var, TyVar::fresh()))
        .collect();

    rename(&substitution, &scheme.body)
}

fn rename(substitution: &HashMap<TyVar, TyVar>, ty: &Ty) -> Ty {
    match ty {
        Ty::Var(var) => match substitution.get(var) {
            Some(&fresh) => Ty::Var(fresh),
            None => ty.clone(),
        },
        Ty::Lit(_) => ty.clone(),
        Ty::App(app) => {
            let args: Vec<Ty> = app
                .args
                .iter()
                .map(|arg| rename(substitution, arg))
                .collect();

            Ty::App(App {
                ctor: app.ctor,
                args: args.into(),
            })
        }
    }
}

/// Quantifies over the variables of `t` that are neither in `exclude` nor
/// already bound by a scheme visible from `frame`. With nothing to
/// quantify, `t` is returned unchanged as a bare monotype.
pub fn generalize(
    ctx: &Context,
    frame: FrameId,
    t: Ty,
    exclude: &BTreeSet<TyVar>,
) -> Poly {
    let quantified: Vec<TyVar> = variables(&t)
        .into_iter()
        .filter(|var| !exclude.contains(var) && !ctx.bound(frame, *var))
        .collect();

    if quantified.is_empty() {
        Poly::Mono(t)
    } else {
        Poly::Scheme(Scheme {
            vars: quantified.into(),
            body: t,
        })
    }
}

/// The variables of `t` that generalization must exclude to stay sound in
/// the presence of mutable references and effects:
///
/// - everything inside a `ref` argument;
/// - everything in the domain of an arrow whose codomain is an `io`
///   application;
/// - recursively, the dangerous variables of every other application's
///   arguments. This treats every ordinary constructor as
///   dangerous-propagating in all positions; it is a conservative
///   approximation, not a variance analysis.
pub fn dangerous(uni: &Universe, t: &Ty) -> BTreeSet<TyVar> {
    let mut out = BTreeSet::new();
    walk_dangerous(uni, t, &mut out);
    out
}

fn walk_dangerous(uni: &Universe, t: &Ty, out: &mut BTreeSet<TyVar>) {
    let Ty::App(app) = t else { return };

    if app.ctor == uni.reference {
        // mutable cell contents must stay monomorphic
        out.extend(variables(&app.args[0]));
    } else if app.ctor == uni.arrow
        && matches!(&app.args[1], Ty::App(ret) if ret.ctor == uni.io)
    {
        // effectful arrow: its domain is the unsafe position
        out.extend(variables(&app.args[0]));
    } else {
        for arg in app.args.iter() {
            walk_dangerous(uni, arg, out);
        }
    }
}

/// The Algorithm W engine for one inference run.
pub struct Infer<'a> {
    uni: &'a Universe,
    store: &'a mut UnionFind,
    ctx: &'a mut Context,
}

impl<'a> Infer<'a> {
    pub fn new(
        uni: &'a Universe,
        store: &'a mut UnionFind,
        ctx: &'a mut Context,
    ) -> Self {
        Infer { uni, store, ctx }
    }

    /// Infers a monotype for `expr` in `frame`, merging equivalence classes
    /// in the store as a side effect.
    pub fn infer(
        &mut self,
        frame: FrameId,
        expr: &ast::Expr,
    ) -> Result<Ty, TypeError> {
        match expr {
            ast::Expr::Var(name) => self.infer_var(frame, *name),
            ast::Expr::App(app) => self.infer_app(frame, app),
            ast::Expr::Abs(abs) => {
                self.infer_abs(frame, &abs.params, &abs.body)
            }
            ast::Expr::Let(binding) => self.infer_let(frame, binding),
            ast::Expr::Lit(lit) => Ok(self.infer_lit(lit)),
        }
    }

    fn infer_var(
        &mut self,
        frame: FrameId,
        name: Symbol,
    ) -> Result<Ty, TypeError> {
        match self.ctx.find(frame, name) {
            Some(Poly::Scheme(scheme)) => Ok(instantiate(scheme)),
            // monomorphic bindings (e.g. from a value-restricted let) read
            // through the store instead
            Some(Poly::Mono(ty)) => Ok(represent(self.store, ty)),
            None => Err(TypeError::Unbound { name }),
        }
    }

    fn infer_app(
        &mut self,
        frame: FrameId,
        app: &ast::App,
    ) -> Result<Ty, TypeError> {
        let func = self.infer(frame, &app.func)?;

        let mut args = Vec::with_capacity(app.args.len().max(1));
        for arg in &app.args {
            args.push(self.infer(frame, arg)?);
        }

        // a zero-argument call passes a synthetic unit
        if args.is_empty() {
            args.push(self.uni.unit.clone());
        }

        let result = Ty::Var(TyVar::fresh());
        let expected = self.uni.func_chain(args, result.clone());

        unify(self.store, &func, &expected)?;
        Ok(result)
    }

    fn infer_abs(
        &mut self,
        frame: FrameId,
        params: &[Symbol],
        body: &ast::Expr,
    ) -> Result<Ty, TypeError> {
        match params {
            // a zero-parameter function takes unit
            [] => {
                let to = self.infer(frame, body)?;
                Ok(self.uni.func(self.uni.unit.clone(), to))
            }
            // one frame per binding
            [param, rest @ ..] => {
                let from = Ty::Var(TyVar::fresh());
                let inner = self.ctx.child(frame);
                self.ctx.set(inner, *param, Poly::Mono(from.clone()));

                let to = if rest.is_empty() {
                    self.infer(inner, body)?
                } else {
                    self.infer_abs(inner, rest, body)?
                };

                Ok(self.uni.func(from, to))
            }
        }
    }

    fn infer_let(
        &mut self,
        frame: FrameId,
        binding: &ast::Let,
    ) -> Result<Ty, TypeError> {
        let value = self.infer(frame, &binding.value)?;
        let value = represent(self.store, &value);

        // generalize as far as the context and the value restriction allow
        let exclude = dangerous(self.uni, &value);
        let poly = generalize(self.ctx, frame, value, &exclude);

        let inner = self.ctx.child(frame);
        self.ctx.set(inner, binding.name, poly);

        self.infer(inner, &binding.body)
    }

    fn infer_lit(&mut self, lit: &ast::Lit) -> Ty {
        match lit {
            ast::Lit::Int(_) => self.uni.integer.clone(),
            ast::Lit::Real(_) => self.uni.real.clone(),
            ast::Lit::Bool(_) => self.uni.boolean.clone(),
            ast::Lit::Str(_) => self.uni.string.clone(),
            ast::Lit::Unit => self.uni.unit.clone(),
            ast::Lit::Fix => instantiate(&self.uni.fix),
        }
    }
}

/// Runs Algorithm W over one top-level expression and returns its most
/// general polytype.
///
/// `store` is expected to be fresh for this call; the result is resolved
/// with [`represent`], so nothing reachable from it depends on the store
/// afterward. A top-level `let` generalizes under its dangerous-variable
/// exclusion set; any other expression generalizes unrestricted.
pub fn hindley_milner(
    uni: &Universe,
    store: &mut UnionFind,
    ctx: &mut Context,
    frame: FrameId,
    expr: &ast::Expr,
) -> Result<Poly, TypeError> {
    let ty = Infer::new(uni, store, ctx).infer(frame, expr)?;
    let ty = represent(store, &ty);

    let exclude = match expr {
        ast::Expr::Let(_) => dangerous(uni, &ty),
        _ => BTreeSet::new(),
    };

    Ok(generalize(ctx, frame, ty, &exclude))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;

    // AST construction shorthand

    fn var(name: Symbol) -> ast::Expr {
        ast::Expr::Var(name)
    }

    fn app(func: ast::Expr, args: Vec<ast::Expr>) -> ast::Expr {
        ast::Expr::App(ast::App {
            func: Box::new(func),
            args,
        })
    }

    fn abs(params: Vec<Symbol>, body: ast::Expr) -> ast::Expr {
        ast::Expr::Abs(ast::Abs {
            params,
            body: Box::new(body),
        })
    }

    fn let_(name: Symbol, value: ast::Expr, body: ast::Expr) -> ast::Expr {
        ast::Expr::Let(ast::Let {
            name,
            value: Box::new(value),
            body: Box::new(body),
        })
    }

    fn int(value: i64) -> ast::Expr {
        ast::Expr::Lit(ast::Lit::Int(value))
    }

    fn boolean(value: bool) -> ast::Expr {
        ast::Expr::Lit(ast::Lit::Bool(value))
    }

    /// A universe and a context seeded with the builtins.
    fn session() -> (Universe, Context) {
        let mut uni = Universe::new();
        let mut ctx = Context::new();
        builtins::install(&mut uni, &mut ctx);
        (uni, ctx)
    }

    fn infer_poly(
        uni: &Universe,
        ctx: &mut Context,
        expr: &ast::Expr,
    ) -> Result<Poly, TypeError> {
        let mut store = UnionFind::new();
        let root = ctx.root();
        hindley_milner(uni, &mut store, ctx, root, expr)
    }

    /// Structural equality up to a consistent renaming of variables.
    fn alpha_eq(a: &Ty, b: &Ty) -> bool {
        fn go(
            a: &Ty,
            b: &Ty,
            forward: &mut HashMap<TyVar, TyVar>,
            backward: &mut HashMap<TyVar, TyVar>,
        ) -> bool {
            match (a, b) {
                (Ty::Lit(x), Ty::Lit(y)) => x == y,
                (Ty::Var(x), Ty::Var(y)) => {
                    *forward.entry(*x).or_insert(*y) == *y
                        && *backward.entry(*y).or_insert(*x) == *x
                }
                (Ty::App(x), Ty::App(y)) => {
                    x.ctor == y.ctor
                        && x.args
                            .iter()
                            .zip(y.args.iter())
                            .all(|(x, y)| go(x, y, forward, backward))
                }
                _ => false,
            }
        }

        go(a, b, &mut HashMap::new(), &mut HashMap::new())
    }

    // CORE SCENARIOS

    #[test]
    fn identity_function_is_polymorphic() {
        let (mut uni, mut ctx) = session();
        let x = uni.interner.intern("x");

        let expr = abs(vec![x], var(x));
        let poly = infer_poly(&uni, &mut ctx, &expr).unwrap();
        assert_eq!(uni.show_poly(&poly), "forall a. a -> a");
    }

    #[test]
    fn let_polymorphism_instantiates_independently() {
        let (mut uni, mut ctx) = session();
        let x = uni.interner.intern("x");
        let id = uni.interner.intern("id");

        // (let (id (fn (x) x)) (id 1))
        let expr = let_(
            id,
            abs(vec![x], var(x)),
            app(var(id), vec![int(1)]),
        );
        let poly = infer_poly(&uni, &mut ctx, &expr).unwrap();
        assert_eq!(uni.show_poly(&poly), "int");

        // and at two different types within one body:
        // (let (id (fn (x) x)) ((id (fn (x) x)) (id 1)))
        let expr = let_(
            id,
            abs(vec![x], var(x)),
            app(
                app(var(id), vec![abs(vec![x], var(x))]),
                vec![app(var(id), vec![int(1)])],
            ),
        );
        let poly = infer_poly(&uni, &mut ctx, &expr).unwrap();
        assert_eq!(uni.show_poly(&poly), "int");
    }

    #[test]
    fn self_application_fails_the_occurs_check() {
        let (mut uni, mut ctx) = session();
        let x = uni.interner.intern("x");

        // ((fn (x) (x x)) (fn (x) x))
        let expr = app(
            abs(vec![x], app(var(x), vec![var(x)])),
            vec![abs(vec![x], var(x))],
        );
        let error = infer_poly(&uni, &mut ctx, &expr).unwrap_err();
        assert!(matches!(error, TypeError::Occurs { .. }));
    }

    #[test]
    fn arithmetic_rejects_a_boolean_argument() {
        let (mut uni, mut ctx) = session();
        let plus = uni.interner.intern("+");

        // (+ 1 true)
        let expr = app(var(plus), vec![int(1), boolean(true)]);
        let error = infer_poly(&uni, &mut ctx, &expr).unwrap_err();

        let TypeError::Mismatch { left, right } = error else {
            panic!("expected a mismatch, got {error:?}");
        };
        assert_eq!(left, uni.integer);
        assert_eq!(right, uni.boolean);
    }

    #[test]
    fn undeclared_variables_are_reported_by_name() {
        let (mut uni, mut ctx) = session();
        let y = uni.interner.intern("y");

        let error = infer_poly(&uni, &mut ctx, &var(y)).unwrap_err();
        assert_eq!(error, TypeError::Unbound { name: y });
        assert_eq!(error.render(&uni), "undeclared variable: y");
    }

    #[test]
    fn let_bound_references_stay_monomorphic() {
        let (mut uni, mut ctx) = session();
        let r = uni.interner.intern("r");
        let reference = uni.interner.intern("ref");

        // (let (r (ref 1)) r): concrete contents, but the exclusion path
        // runs and must not quantify anything
        let expr = let_(r, app(var(reference), vec![int(1)]), var(r));
        let poly = infer_poly(&uni, &mut ctx, &expr).unwrap();
        assert!(matches!(poly, Poly::Mono(_)));
        assert_eq!(uni.show_poly(&poly), "ref int");
    }

    #[test]
    fn dangerous_variables_block_generalization() {
        let (mut uni, mut ctx) = session();
        let r = uni.interner.intern("r");
        let nil = uni.interner.intern("nil");
        let reference = uni.interner.intern("ref");

        // (let (r (ref nil)) r): the element type is still free, and must
        // not be quantified
        let expr = let_(r, app(var(reference), vec![var(nil)]), var(r));
        let poly = infer_poly(&uni, &mut ctx, &expr).unwrap();
        assert!(matches!(poly, Poly::Mono(_)));
        assert_eq!(uni.show_poly(&poly), "ref (list a)");
    }

    // FURTHER ENGINE BEHAVIOR

    #[test]
    fn multi_parameter_functions_curry() {
        let (mut uni, mut ctx) = session();
        let x = uni.interner.intern("x");
        let y = uni.interner.intern("y");

        // ((fn (x y) x) 1 true)
        let expr = app(
            abs(vec![x, y], var(x)),
            vec![int(1), boolean(true)],
        );
        let poly = infer_poly(&uni, &mut ctx, &expr).unwrap();
        assert_eq!(uni.show_poly(&poly), "int");

        // (fn (x y) x) alone
        let expr = abs(vec![x, y], var(x));
        let poly = infer_poly(&uni, &mut ctx, &expr).unwrap();
        assert_eq!(uni.show_poly(&poly), "forall a b. a -> b -> a");
    }

    #[test]
    fn thunks_take_and_receive_unit() {
        let (mut uni, mut ctx) = session();
        let thunk = uni.interner.intern("thunk");

        // (fn () 5)
        let expr = abs(vec![], int(5));
        let poly = infer_poly(&uni, &mut ctx, &expr).unwrap();
        assert_eq!(uni.show_poly(&poly), "unit -> int");

        // (let (thunk (fn () 5)) (thunk))
        let expr = let_(
            thunk,
            abs(vec![], int(5)),
            app(var(thunk), vec![]),
        );
        let poly = infer_poly(&uni, &mut ctx, &expr).unwrap();
        assert_eq!(uni.show_poly(&poly), "int");
    }

    #[test]
    fn fixpoint_literal_types_recursion() {
        let (mut uni, mut ctx) = session();
        let f = uni.interner.intern("f");

        // (fix (fn (f) (fn (x) (f x)))), plain knot-tying
        let x = uni.interner.intern("x");
        let expr = app(
            ast::Expr::Lit(ast::Lit::Fix),
            vec![abs(vec![f], abs(vec![x], app(var(f), vec![var(x)])))],
        );
        let poly = infer_poly(&uni, &mut ctx, &expr).unwrap();
        assert_eq!(uni.show_poly(&poly), "forall a b. a -> b");
    }

    // PROPERTIES

    #[test]
    fn represent_is_idempotent() {
        let uni = Universe::new();
        let mut store = UnionFind::new();

        let a = Ty::Var(TyVar::fresh());
        let b = Ty::Var(TyVar::fresh());
        let arrow = uni.func(Ty::Var(TyVar::fresh()), b.clone());

        unify(&mut store, &a, &arrow).unwrap();
        unify(&mut store, &b, &uni.integer).unwrap();

        let once = represent(&mut store, &a);
        let twice = represent(&mut store, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn unification_is_symmetric() {
        let uni = Universe::new();

        let check = |make_a: &dyn Fn() -> Ty, make_b: &dyn Fn() -> Ty| {
            let mut forward = UnionFind::new();
            let mut backward = UnionFind::new();
            let (a, b) = (make_a(), make_b());

            let left = unify(&mut forward, &a, &b);
            let right = unify(&mut backward, &b, &a);
            assert_eq!(left.is_ok(), right.is_ok());

            if left.is_ok() {
                assert_eq!(forward.find(&a), forward.find(&b));
                assert_eq!(backward.find(&a), backward.find(&b));
            }
        };

        let v = Ty::Var(TyVar::fresh());
        let arrow = uni.func(uni.integer.clone(), uni.boolean.clone());

        check(&|| v.clone(), &|| arrow.clone());
        check(&|| uni.integer.clone(), &|| uni.boolean.clone());
        check(&|| arrow.clone(), &|| arrow.clone());
        check(
            &|| uni.func(v.clone(), uni.integer.clone()),
            &|| uni.func(uni.boolean.clone(), uni.integer.clone()),
        );
    }

    #[test]
    fn shallow_occurs_check_catches_immediate_cycles() {
        let uni = Universe::new();
        let mut store = UnionFind::new();

        let v = TyVar::fresh();
        let cyclic = uni.func(Ty::Var(v), uni.integer.clone());

        let error = unify(&mut store, &Ty::Var(v), &cyclic).unwrap_err();
        assert!(matches!(error, TypeError::Occurs { var, .. } if var == v));
    }

    #[test]
    fn generalization_is_closed_over_the_context() {
        let uni = Universe::new();
        let mut ctx = Context::new();

        let bound_var = TyVar::fresh();
        let mut interner = crate::symbol::StringInterner::new();
        ctx.set(
            ctx.root(),
            interner.intern("f"),
            Poly::Scheme(Scheme {
                vars: Box::new([bound_var]),
                body: Ty::Var(bound_var),
            }),
        );

        let free = TyVar::fresh();
        let t = uni.func(Ty::Var(bound_var), Ty::Var(free));

        let poly =
            generalize(&ctx, ctx.root(), t.clone(), &BTreeSet::new());
        let Poly::Scheme(scheme) = poly else {
            panic!("expected a scheme");
        };

        for var in variables(&scheme.body) {
            assert!(
                scheme.vars.contains(&var) || ctx.bound(ctx.root(), var),
                "{var:?} is neither quantified nor bound in the context"
            );
        }

        // and the context-bound variable was not captured
        assert_eq!(scheme.vars.as_ref(), &[free]);
    }

    #[test]
    fn instantiation_inverts_generalization_up_to_renaming() {
        let uni = Universe::new();
        let ctx = Context::new();

        let t = uni.func(
            Ty::Var(TyVar::fresh()),
            uni.list.apply(vec![Ty::Var(TyVar::fresh())]),
        );

        match generalize(&ctx, ctx.root(), t.clone(), &BTreeSet::new()) {
            Poly::Scheme(scheme) => {
                let instance = instantiate(&scheme);
                assert!(alpha_eq(&t, &instance));
                // genuinely fresh, not shared
                assert!(variables(&t)
                    .is_disjoint(&variables(&instance)));
            }
            Poly::Mono(_) => panic!("expected a scheme"),
        }
    }

    #[test]
    fn dangerous_flags_reference_contents_and_effectful_domains() {
        let uni = Universe::new();

        let a = TyVar::fresh();
        let b = TyVar::fresh();

        // ref (list a): a is dangerous
        let cell = uni
            .reference
            .apply(vec![uni.list.apply(vec![Ty::Var(a)])]);
        assert_eq!(dangerous(&uni, &cell), BTreeSet::from([a]));

        // a -> io b: a is dangerous, b is not
        let effectful = uni.func(
            Ty::Var(a),
            uni.io.apply(vec![Ty::Var(b)]),
        );
        assert_eq!(dangerous(&uni, &effectful), BTreeSet::from([a]));

        // a -> b: nothing is dangerous
        let pure = uni.func(Ty::Var(a), Ty::Var(b));
        assert!(dangerous(&uni, &pure).is_empty());

        // list (ref a): the reference is reached through the list
        let nested = uni
            .list
            .apply(vec![uni.reference.apply(vec![Ty::Var(a)])]);
        assert_eq!(dangerous(&uni, &nested), BTreeSet::from([a]));
    }

    #[test]
    fn failed_argument_unification_reports_concrete_outer_types() {
        let uni = Universe::new();
        let mut store = UnionFind::new();

        let left = uni.func(uni.integer.clone(), uni.boolean.clone());
        let right = uni.func(uni.integer.clone(), uni.integer.clone());

        let error = unify(&mut store, &left, &right).unwrap_err();
        let TypeError::Mismatch { left: l, right: r } = error else {
            panic!("expected a mismatch");
        };

        // both sides are concrete, so the report was upgraded to the
        // resolved outer pair
        assert_eq!(l, left);
        assert_eq!(r, right);
    }
}
