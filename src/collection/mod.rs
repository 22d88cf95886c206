//! The registration builder DSL. Produces [`Module`] records that
//! [`crate::Container::use_module`] merges into the container; this module
//! never touches the container directly, keeping the accumulator
//! (`ModuleBuilder`) separate from the thing that actually resolves
//! (`Container`).

pub mod module_system;
pub use module_system::{KeyedFactory, ScopeModule, ScopeModuleBuilder};

use std::any::TypeId;
use std::cell::RefCell;
use std::rc::Rc;

use crate::capabilities::CapabilityProbes;
use crate::error::DiResult;
use crate::key::RegKey;
use crate::lifetime::Lifetime;
use crate::metadata::{Metadata, ParamSource};
use crate::registration::{AnyRc, Constructor, Registration};
use crate::token::Token;

/// Builds the type-erased constructor and metadata for one implementation.
/// `params[i]` is the source for positional parameter `i`; the constructor
/// itself only ever sees the already-resolved argument slice.
pub fn constructor<T: 'static>(
    params: Vec<ParamSource>,
    capabilities: CapabilityProbes,
    ctor: impl Fn(&[AnyRc]) -> DiResult<T> + 'static,
) -> (Rc<Constructor>, Metadata) {
    let impl_id = TypeId::of::<T>();
    let impl_name = std::any::type_name::<T>();
    let assemble = Box::new(move |args: &[AnyRc]| -> DiResult<AnyRc> {
        ctor(args).map(|v| Rc::new(v) as AnyRc)
    });
    let built = Rc::new(Constructor { impl_id, impl_name, assemble, capabilities });
    let mut meta = Metadata { arity: params.len(), ..Metadata::default() };
    for (i, p) in params.into_iter().enumerate() {
        meta.params.insert(i, p);
    }
    (built, meta)
}

/// A value already in hand, registered with no dependencies. Only sound for
/// `Lifetime::Singleton` — the wrapping cell can only be drained once.
fn value_constructor<T: 'static>(value: T) -> (Rc<Constructor>, Metadata) {
    let cell = RefCell::new(Some(value));
    let name = std::any::type_name::<T>();
    constructor(Vec::new(), CapabilityProbes::none(), move |_args| {
        cell.borrow_mut()
            .take()
            .ok_or_else(|| crate::error::DiError::constructor(name, "value registration constructed more than once"))
    })
}

/// Accumulated registrations ready to merge into a container.
#[derive(Default)]
pub struct Module {
    pub(crate) singles: Vec<(RegKey, Registration)>,
    pub(crate) multi: Vec<(Token, Vec<Rc<Constructor>>)>,
    pub(crate) keyed: Vec<(Token, Vec<(String, Rc<Constructor>)>)>,
    pub(crate) metadata: Vec<(TypeId, Metadata)>,
}

/// A registration just added to a [`ModuleBuilder`], with a continuation to
/// bind one additional token key sharing the same singleton cache cell.
pub struct Bound<'a> {
    module: &'a mut Module,
    index: usize,
}

impl<'a> Bound<'a> {
    pub fn bind(self, token: Token) -> Self {
        let reg = self.module.singles[self.index].1.alias();
        self.module.singles.push((RegKey::Token(token), reg));
        self
    }
}

/// Accumulates registration records; handed to [`crate::Container::use_module`].
#[derive(Default)]
pub struct ModuleBuilder {
    module: Module,
}

impl ModuleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(self) -> Module {
        self.module
    }

    fn push(&mut self, lifetime: Lifetime, ctor: Rc<Constructor>, meta: Metadata) -> Bound<'_> {
        let impl_id = ctor.impl_id;
        self.module.metadata.push((impl_id, meta));
        let key = RegKey::Type(impl_id, ctor.impl_name);
        let reg = Registration::new(lifetime, ctor);
        self.module.singles.push((key, reg));
        let index = self.module.singles.len() - 1;
        Bound { module: &mut self.module, index }
    }

    /// Registers a ready-made value as a singleton.
    pub fn single<T: 'static>(&mut self, value: T) -> Bound<'_> {
        let (ctor, meta) = value_constructor(value);
        self.push(Lifetime::Singleton, ctor, meta)
    }

    /// Registers a dependency-built singleton.
    pub fn single_with<T: 'static>(
        &mut self,
        params: Vec<ParamSource>,
        capabilities: CapabilityProbes,
        ctor: impl Fn(&[AnyRc]) -> DiResult<T> + 'static,
    ) -> Bound<'_> {
        let (built, meta) = constructor(params, capabilities, ctor);
        self.push(Lifetime::Singleton, built, meta)
    }

    pub fn scoped<T: 'static>(
        &mut self,
        params: Vec<ParamSource>,
        capabilities: CapabilityProbes,
        ctor: impl Fn(&[AnyRc]) -> DiResult<T> + 'static,
    ) -> Bound<'_> {
        let (built, meta) = constructor(params, capabilities, ctor);
        self.push(Lifetime::Scoped, built, meta)
    }

    /// Registers a factory-lifetime implementation: a fresh instance on
    /// every resolve, never cached or tracked.
    pub fn factory<T: 'static>(
        &mut self,
        params: Vec<ParamSource>,
        capabilities: CapabilityProbes,
        ctor: impl Fn(&[AnyRc]) -> DiResult<T> + 'static,
    ) -> Bound<'_> {
        let (built, meta) = constructor(params, capabilities, ctor);
        self.push(Lifetime::Factory, built, meta)
    }

    /// Appends one member to `token`'s multi-registration.
    pub fn multi(&mut self, token: Token, member: Rc<Constructor>, meta: Metadata) -> &mut Self {
        self.module.metadata.push((member.impl_id, meta));
        self.module.multi.entry_or_push(token, member);
        self
    }

    /// Adds one string-keyed entry to `token`'s keyed-registration.
    pub fn keyed(&mut self, token: Token, key: impl Into<String>, member: Rc<Constructor>, meta: Metadata) -> &mut Self {
        self.module.metadata.push((member.impl_id, meta));
        self.module.keyed.entry_or_push(token, (key.into(), member));
        self
    }
}

trait PushInto<K, V> {
    fn entry_or_push(&mut self, key: K, value: V);
}

impl PushInto<Token, Rc<Constructor>> for Vec<(Token, Vec<Rc<Constructor>>)> {
    fn entry_or_push(&mut self, key: Token, value: Rc<Constructor>) {
        if let Some((_, v)) = self.iter_mut().find(|(k, _)| *k == key) {
            v.push(value);
        } else {
            self.push((key, vec![value]));
        }
    }
}

impl PushInto<Token, (String, Rc<Constructor>)> for Vec<(Token, Vec<(String, Rc<Constructor>)>)> {
    fn entry_or_push(&mut self, key: Token, value: (String, Rc<Constructor>)) {
        if let Some((_, v)) = self.iter_mut().find(|(k, _)| *k == key) {
            v.push(value);
        } else {
            self.push((key, vec![value]));
        }
    }
}
