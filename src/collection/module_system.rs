//! The scope-module builder: a parameterised factory over runtime externals
//! and an optional root implementation, handed to
//! [`crate::Container::create_scope`].

use std::rc::Rc;

use crate::container::Container;
use crate::error::DiResult;
use crate::key::RegKey;
use crate::registration::{AnyRc, Constructor};
use crate::token::Token;

/// Accumulated externals (and an optional root) for one `createScope` call.
#[derive(Default)]
pub struct ScopeModule {
    pub(crate) id: Option<String>,
    pub(crate) externals: Vec<(RegKey, AnyRc)>,
    pub(crate) root: Option<Rc<Constructor>>,
}

#[derive(Default)]
pub struct ScopeModuleBuilder {
    module: ScopeModule,
}

impl ScopeModuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.module.id = Some(id.into());
        self
    }

    /// Supplies a pre-built value for `key`, bypassing construction — the
    /// external-override path (end-to-end scenario 3).
    pub fn external<T: 'static>(mut self, key: RegKey, value: T) -> Self {
        self.module.externals.push((key, Rc::new(value) as AnyRc));
        self
    }

    pub fn root(mut self, ctor: Rc<Constructor>) -> Self {
        self.module.root = Some(ctor);
        self
    }

    pub fn build(self) -> ScopeModule {
        self.module
    }
}

/// A callable produced by resolving a keyed-registration's token. Each call
/// builds a fresh instance (factory semantics); an unknown key fails with
/// every available key listed.
pub struct KeyedFactory {
    pub(crate) container: Rc<Container>,
    pub(crate) token: Token,
}

impl KeyedFactory {
    pub fn call(&self, key: &str) -> DiResult<AnyRc> {
        self.container.clone().resolve_keyed_instance(self.token, key)
    }

    pub fn get<T: 'static>(&self, key: &str) -> DiResult<Rc<T>> {
        let any = self.call(key)?;
        any.downcast::<T>()
            .map_err(|_| crate::error::DiError::constructor(self.token.description(), "keyed factory produced an unexpected type"))
    }
}
