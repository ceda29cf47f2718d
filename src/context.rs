//! The typing context: a forest of binding frames.
//!
//! Frames live in an arena and point at their parents by index, so a child
//! frame can never outlive (or dangle into) an ancestor. A frame owns the
//! bindings made at one scope step plus a cache of the type variables
//! quantified by schemes bound there; [`Context::bound`] consults only these
//! caches instead of re-walking every visible scheme.
//!
//! One frame is created per binding. This is a correctness requirement, not
//! an optimization: the cache must track exactly the scheme variables that
//! one binding introduced, so that overwriting the binding can evict them.
//!
//! A frame never mutates its parent; ancestor chains can be shared read-only.

use std::collections::{HashMap, HashSet, hash_map};

use crate::{
    symbol::Symbol,
    ty::{Poly, TyVar},
};

/// An index into a [`Context`]'s frame arena.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub struct FrameId(usize);

#[derive(Debug, Default)]
struct Frame {
    parent: Option<FrameId>,
    bindings: HashMap<Symbol, Poly>,
    /// Variables quantified by schemes bound in this frame.
    bound_vars: HashSet<TyVar>,
}

/// An arena of parent-linked binding frames.
#[derive(Debug)]
pub struct Context {
    frames: Vec<Frame>,
}

impl Context {
    /// Creates a context holding a single empty root frame.
    pub fn new() -> Self {
        Context {
            frames: vec![Frame::default()],
        }
    }

    pub fn root(&self) -> FrameId {
        FrameId(0)
    }

    /// Creates a fresh empty frame with `parent` as its parent.
    pub fn child(&mut self, parent: FrameId) -> FrameId {
        let id = FrameId(self.frames.len());
        self.frames.push(Frame {
            parent: Some(parent),
            ..Frame::default()
        });
        id
    }

    /// Hierarchical lookup: searches `frame` and then its ancestors, so
    /// inner bindings shadow outer ones. `None` means the name is unbound
    /// all the way to the root.
    pub fn find(&self, frame: FrameId, name: Symbol) -> Option<&Poly> {
        let mut current = Some(frame);

        while let Some(id) = current {
            let frame = &self.frames[id.0];
            if let Some(poly) = frame.bindings.get(&name) {
                return Some(poly);
            }
            current = frame.parent;
        }

        None
    }

    /// Binds `name` locally in `frame`, overwriting any previous local
    /// binding and keeping the frame's scheme-variable cache in sync.
    pub fn set(&mut self, frame: FrameId, name: Symbol, poly: Poly) {
        let frame = &mut self.frames[frame.0];

        // evict the displaced scheme's variables before admitting the new
        if let Some(Poly::Scheme(old)) = frame.bindings.get(&name) {
            for var in old.vars.iter() {
                frame.bound_vars.remove(var);
            }
        }

        if let Poly::Scheme(scheme) = &poly {
            frame.bound_vars.extend(scheme.vars.iter().copied());
        }

        frame.bindings.insert(name, poly);
    }

    /// Is `var` quantified by some scheme visible from `frame`?
    ///
    /// Walks the ancestor chain but consults only the cached variable sets,
    /// never the bindings themselves.
    pub fn bound(&self, frame: FrameId, var: TyVar) -> bool {
        let mut current = Some(frame);

        while let Some(id) = current {
            let frame = &self.frames[id.0];
            if frame.bound_vars.contains(&var) {
                return true;
            }
            current = frame.parent;
        }

        false
    }

    /// Iterates over every binding visible from `frame`, innermost first,
    /// with shadowed outer bindings skipped.
    pub fn iter(&self, frame: FrameId) -> Bindings<'_> {
        Bindings {
            ctx: self,
            frame: &self.frames[frame.0],
            entries: self.frames[frame.0].bindings.iter(),
            seen: HashSet::new(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the bindings visible from a frame. See [`Context::iter`].
pub struct Bindings<'a> {
    ctx: &'a Context,
    frame: &'a Frame,
    entries: hash_map::Iter<'a, Symbol, Poly>,
    seen: HashSet<Symbol>,
}

impl<'a> Iterator for Bindings<'a> {
    type Item = (Symbol, &'a Poly);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.entries.next() {
                Some((&name, poly)) => {
                    if self.seen.insert(name) {
                        return Some((name, poly));
                    }
                }
                None => {
                    let parent = self.frame.parent?;
                    self.frame = &self.ctx.frames[parent.0];
                    self.entries = self.frame.bindings.iter();
                }
            }
        }
    }
}
