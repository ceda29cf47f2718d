//! Central plumbing between the CLI and the inference core.
//!
//! A [`Session`] owns the universe and the root typing context. Each
//! top-level form is lowered and inferred against a fresh union-find store;
//! since every result is resolved out of its store before being kept, the
//! stores really are disposable per form. Syntax and type failures are
//! terminal for their form but not for the session: the driver prints the
//! diagnostic and moves on, which the core itself never does.

use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use thiserror::Error;

use minnow::{
    ast, builtins,
    context::Context,
    infer::hindley_milner,
    sexpr::{self, Sexpr},
    syntax,
    ty::Universe,
    union_find::UnionFind,
};

/// The public result type of the [`driver`] module.
///
/// [`driver`]: self
pub type Result<T = ()> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Read(#[from] sexpr::ReadError),
}

/// One checking session: a universe plus a root context seeded with the
/// builtins.
pub struct Session {
    uni: Universe,
    ctx: Context,
}

impl Session {
    pub fn new() -> Self {
        let mut uni = Universe::new();
        let mut ctx = Context::new();
        builtins::install(&mut uni, &mut ctx);

        Session { uni, ctx }
    }

    /// Types one top-level form. `Ok` carries the line to print; `Err`
    /// carries a diagnostic. The session stays usable either way.
    pub fn process(
        &mut self,
        form: &Sexpr,
    ) -> std::result::Result<String, String> {
        let node = syntax::Lowerer::new(&mut self.uni)
            .lower(form)
            .map_err(|error| format!("syntax error: {error}"))?;

        let mut store = UnionFind::new();
        let root = self.ctx.root();

        match node {
            ast::Node::Expr(expr) => {
                let poly = hindley_milner(
                    &self.uni, &mut store, &mut self.ctx, root, &expr,
                )
                .map_err(|error| {
                    format!("type error: {}", error.render(&self.uni))
                })?;

                Ok(format!(" :: {}", self.uni.show_poly(&poly)))
            }
            ast::Node::Def(def) => {
                // (def x e) types as (let (x e) x)
                let expr = ast::Expr::Let(ast::Let {
                    name: def.name,
                    value: def.value,
                    body: Box::new(ast::Expr::Var(def.name)),
                });

                let poly = hindley_milner(
                    &self.uni, &mut store, &mut self.ctx, root, &expr,
                )
                .map_err(|error| {
                    format!("type error: {}", error.render(&self.uni))
                })?;

                self.ctx.set(root, def.name, poly.clone());

                Ok(format!(
                    "{} :: {}",
                    self.uni.interner.resolve(def.name),
                    self.uni.show_poly(&poly)
                ))
            }
        }
    }

    /// Checks every form in `path`, printing one line per form.
    pub fn run_file(&mut self, path: &Path) -> Result {
        let source = std::fs::read_to_string(path)?;
        let forms = sexpr::parse_forms(&source)?;

        for form in &forms {
            match self.process(form) {
                Ok(line) => println!("{line}"),
                Err(diagnostic) => println!("{diagnostic}"),
            }
        }

        Ok(())
    }

    /// A line-based read-infer-print loop over stdin.
    pub fn repl(&mut self) -> Result {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        loop {
            write!(stdout, "> ")?;
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Ok(());
            }

            let forms = match sexpr::parse_forms(&line) {
                Ok(forms) => forms,
                Err(error) => {
                    println!("{error}");
                    continue;
                }
            };

            for form in &forms {
                match self.process(form) {
                    Ok(line) => println!("{line}"),
                    Err(diagnostic) => println!("{diagnostic}"),
                }
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
