//! Surface-to-core lowering.
//!
//! Eliminates every surface form the inference engine does not know about:
//!
//! - `(fn (a b …) body)`, `(let (x e) body)`, and n-ary application map
//!   directly onto their core counterparts;
//! - `(if c t e)` becomes an application of the builtin conditional;
//! - `(do …)` sequences become right-nested applications of the builtin
//!   `bind`, with `(with x e)` naming the bound result and `_` standing in
//!   for discarded ones;
//! - a `let` (or `def`) whose bound name occurs free in its own definition
//!   is rewritten through the fixpoint literal:
//!   `let f = e` becomes `let f = fix (fn (f) e)`.
//!
//! Keywords are reserved: using one as a variable is a syntax error here,
//! not a type error later.

use thiserror::Error;

use crate::{
    ast::{Abs, App, Def, Expr, Let, Lit, Node},
    sexpr::Sexpr,
    symbol::Symbol,
    ty::Universe,
};

/// The reserved words of the surface syntax.
const KEYWORDS: [&str; 6] = ["fn", "let", "def", "do", "if", "with"];

fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("{0} is a reserved keyword")]
    ReservedWord(String),
    #[error("expected a symbol for a variable name")]
    ExpectedSymbol,
    #[error("malformed let: expected (let (name value) body)")]
    MalformedLet,
    #[error("malformed fn: expected (fn (params…) body)")]
    MalformedFn,
    #[error("malformed def: expected (def name value)")]
    MalformedDef,
    #[error("malformed if: expected (if condition consequence alternative)")]
    MalformedIf,
    #[error("malformed with: expected (with name value)")]
    MalformedWith,
    #[error("'with' cannot end a sequence")]
    WithEndsSequence,
    #[error("empty do sequence")]
    EmptyDo,
    #[error("expected a function in application position")]
    HeadNotCallable,
    #[error("def is only meaningful at the top level")]
    NestedDef,
}

/// Lowers surface forms into core AST nodes, interning names as it goes.
pub struct Lowerer<'a> {
    uni: &'a mut Universe,
}

impl<'a> Lowerer<'a> {
    pub fn new(uni: &'a mut Universe) -> Self {
        Lowerer { uni }
    }

    /// Lowers one top-level form.
    pub fn lower(&mut self, form: &Sexpr) -> Result<Node, SyntaxError> {
        match form {
            Sexpr::List(items) => match items.first() {
                Some(Sexpr::Symbol(head)) if head == "def" => {
                    self.def_form(items).map(Node::Def)
                }
                _ => self.expr(form).map(Node::Expr),
            },
            _ => self.expr(form).map(Node::Expr),
        }
    }

    fn expr(&mut self, form: &Sexpr) -> Result<Expr, SyntaxError> {
        match form {
            Sexpr::Int(value) => Ok(Expr::Lit(Lit::Int(*value))),
            Sexpr::Real(value) => Ok(Expr::Lit(Lit::Real(*value))),
            Sexpr::Bool(value) => Ok(Expr::Lit(Lit::Bool(*value))),
            Sexpr::Str(value) => Ok(Expr::Lit(Lit::Str(value.clone()))),
            Sexpr::Symbol(name) => self.variable(name).map(Expr::Var),
            Sexpr::List(items) => match items.first() {
                // the empty list is the unit literal
                None => Ok(Expr::Lit(Lit::Unit)),
                Some(Sexpr::Symbol(head)) => match head.as_str() {
                    "fn" => self.fn_form(items),
                    "let" => self.let_form(items),
                    "do" => self.do_form(items),
                    "if" => self.if_form(items),
                    "def" => Err(SyntaxError::NestedDef),
                    _ => self.app_form(items),
                },
                Some(_) => self.app_form(items),
            },
        }
    }

    fn variable(&mut self, name: &str) -> Result<Symbol, SyntaxError> {
        if is_keyword(name) {
            return Err(SyntaxError::ReservedWord(String::from(name)));
        }

        Ok(self.uni.interner.intern(name))
    }

    fn binder(&mut self, form: &Sexpr) -> Result<Symbol, SyntaxError> {
        match form {
            Sexpr::Symbol(name) => self.variable(name),
            _ => Err(SyntaxError::ExpectedSymbol),
        }
    }

    /// `(fn (a b …) body)`
    fn fn_form(&mut self, items: &[Sexpr]) -> Result<Expr, SyntaxError> {
        let [_, Sexpr::List(params), body] = items else {
            return Err(SyntaxError::MalformedFn);
        };

        let params = params
            .iter()
            .map(|param| self.binder(param))
            .collect::<Result<Vec<_>, _>>()?;
        let body = self.expr(body)?;

        Ok(Expr::Abs(Abs {
            params,
            body: Box::new(body),
        }))
    }

    /// `(let (x e) body)`
    fn let_form(&mut self, items: &[Sexpr]) -> Result<Expr, SyntaxError> {
        let [_, Sexpr::List(binding), body] = items else {
            return Err(SyntaxError::MalformedLet);
        };
        let [name, value] = binding.as_slice() else {
            return Err(SyntaxError::MalformedLet);
        };

        let name = self.binder(name)?;
        let value = self.expr(value)?;
        let value = rec_binding(name, value);
        let body = self.expr(body)?;

        Ok(Expr::Let(Let {
            name,
            value: Box::new(value),
            body: Box::new(body),
        }))
    }

    /// `(def x e)`
    fn def_form(&mut self, items: &[Sexpr]) -> Result<Def, SyntaxError> {
        let [_, name, value] = items else {
            return Err(SyntaxError::MalformedDef);
        };

        let name = self.binder(name)?;
        let value = self.expr(value)?;
        let value = rec_binding(name, value);

        Ok(Def {
            name,
            value: Box::new(value),
        })
    }

    /// `(if c t e)` lowers to an application of the builtin conditional.
    fn if_form(&mut self, items: &[Sexpr]) -> Result<Expr, SyntaxError> {
        let [_, condition, consequence, alternative] = items else {
            return Err(SyntaxError::MalformedIf);
        };

        let conditional = self.uni.interner.intern_static("if");
        Ok(Expr::App(App {
            func: Box::new(Expr::Var(conditional)),
            args: vec![
                self.expr(condition)?,
                self.expr(consequence)?,
                self.expr(alternative)?,
            ],
        }))
    }

    /// `(do t1 … tn)` lowers right-to-left into nested `bind` applications.
    fn do_form(&mut self, items: &[Sexpr]) -> Result<Expr, SyntaxError> {
        let [_, terms @ ..] = items else {
            return Err(SyntaxError::EmptyDo);
        };
        let [leading @ .., last] = terms else {
            return Err(SyntaxError::EmptyDo);
        };

        if as_with(last).is_some() {
            return Err(SyntaxError::WithEndsSequence);
        }

        let bind = self.uni.interner.intern_static("bind");
        let discard = self.uni.interner.intern_static("_");

        let mut acc = self.expr(last)?;
        for term in leading.iter().rev() {
            let (name, value) = match as_with(term) {
                Some(with) => {
                    let [_, name, value] = with else {
                        return Err(SyntaxError::MalformedWith);
                    };
                    (self.binder(name)?, self.expr(value)?)
                }
                None => (discard, self.expr(term)?),
            };

            let rest = Expr::Abs(Abs {
                params: vec![name],
                body: Box::new(acc),
            });
            acc = Expr::App(App {
                func: Box::new(Expr::Var(bind)),
                args: vec![value, rest],
            });
        }

        Ok(acc)
    }

    /// `(f a b …)`
    fn app_form(&mut self, items: &[Sexpr]) -> Result<Expr, SyntaxError> {
        let func = self.expr(&items[0])?;

        // only things that can evaluate to functions may sit in head
        // position; literals are rejected here rather than by the checker
        if !matches!(func, Expr::Var(_) | Expr::Abs(_) | Expr::App(_)) {
            return Err(SyntaxError::HeadNotCallable);
        }

        let args = items[1..]
            .iter()
            .map(|arg| self.expr(arg))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Expr::App(App {
            func: Box::new(func),
            args,
        }))
    }
}

/// Rewrites a self-referential binding through the fixpoint literal.
fn rec_binding(name: Symbol, value: Expr) -> Expr {
    if !occurs_free(&value, name) {
        return value;
    }

    Expr::App(App {
        func: Box::new(Expr::Lit(Lit::Fix)),
        args: vec![Expr::Abs(Abs {
            params: vec![name],
            body: Box::new(value),
        })],
    })
}

/// Matches a `(with name value)` term inside a `do` sequence.
fn as_with(form: &Sexpr) -> Option<&[Sexpr]> {
    match form {
        Sexpr::List(items)
            if matches!(items.first(), Some(Sexpr::Symbol(s)) if s == "with") =>
        {
            Some(items)
        }
        _ => None,
    }
}

/// Does `name` occur free in `expr`?
fn occurs_free(expr: &Expr, name: Symbol) -> bool {
    match expr {
        Expr::Var(var) => *var == name,
        Expr::Lit(_) => false,
        Expr::App(app) => {
            occurs_free(&app.func, name)
                || app.args.iter().any(|arg| occurs_free(arg, name))
        }
        Expr::Abs(abs) => {
            !abs.params.contains(&name) && occurs_free(&abs.body, name)
        }
        Expr::Let(binding) => {
            occurs_free(&binding.value, name)
                || (binding.name != name && occurs_free(&binding.body, name))
        }
    }
}
