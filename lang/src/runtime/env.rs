//! Lexical environments.
//!
//! An environment is a chain of immutable frames. Extending one allocates a
//! single frame that points at its parent, so closures capturing an
//! environment share it instead of copying it.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Formatter,
    rc::Rc,
};

use crate::{
    runtime::{stack::ensure_sufficient_stack, Value},
    syntax::tree::Ident,
};

#[derive(Clone, Default)]
pub struct Environment(Option<Rc<Scope>>);

pub struct Scope {
    pub vars: HashMap<Ident, Value>,
    parent: Environment,
}

impl Environment {
    pub fn new() -> Environment {
        Environment(None)
    }

    /// Returns a new environment whose innermost frame holds `bindings`.
    /// `self` is left untouched.
    pub fn extend<I>(&self, bindings: I) -> Environment
    where
        I: IntoIterator<Item = (Ident, Value)>,
    {
        Environment(Some(Rc::new(Scope {
            vars: bindings.into_iter().collect(),
            parent: self.clone(),
        })))
    }

    /// Nearest binding wins.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes().find_map(|scope| scope.vars.get(name))
    }

    pub fn scopes(&self) -> Scopes<'_> {
        Scopes(self.0.as_deref())
    }

    pub fn depth(&self) -> usize {
        self.scopes().count()
    }

    /// Every visible binding, with shadowed ones hidden.
    pub fn bindings(&self) -> BTreeMap<&str, &Value> {
        let mut visible = BTreeMap::new();
        for scope in self.scopes() {
            for (name, value) in &scope.vars {
                visible.entry(name.as_str()).or_insert(value);
            }
        }
        visible
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        match (&self.0, &other.0) {
            (Some(lhs), Some(rhs)) => Rc::ptr_eq(lhs, rhs),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Drop for Scope {
    // A closure held here may own the frame it was created in, so releasing
    // a long chain nests one drop per link.
    fn drop(&mut self) {
        let vars = std::mem::take(&mut self.vars);
        let parent = std::mem::take(&mut self.parent);
        ensure_sufficient_stack(move || {
            drop(vars);
            drop(parent);
        });
    }
}

pub struct Scopes<'a>(Option<&'a Scope>);

impl<'a> Iterator for Scopes<'a> {
    type Item = &'a Scope;

    fn next(&mut self) -> Option<Self::Item> {
        let scope = self.0?;
        self.0 = scope.parent.0.as_deref();
        Some(scope)
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.scopes().map(|scope| {
                let mut names: Vec<&str> = scope.vars.keys().map(|k| k.as_str()).collect();
                names.sort_unstable();
                names
            }))
            .finish()
    }
}
