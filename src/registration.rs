//! Registration record types: constructors, single/multi/keyed registrations,
//! and the hybrid registry that stores them.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::capabilities::CapabilityProbes;
use crate::error::DiResult;
use crate::key::RegKey;
use crate::lifetime::Lifetime;
use crate::token::Token;

/// Type-erased, reference-counted instance. `Rc` rather than `Arc`: the host
/// is single-threaded cooperative (see concurrency model), so there is no
/// need to pay atomic-refcount overhead the way the multi-threaded source
/// does with `Arc`.
pub type AnyRc = Rc<dyn Any>;

/// A constructor: an identity (the implementation's `TypeId`) plus a
/// type-erased assembler invoked with the already-resolved positional
/// argument list, plus whatever lifecycle capabilities the registration call
/// site declared for it.
pub struct Constructor {
    pub impl_id: TypeId,
    pub impl_name: &'static str,
    pub assemble: Box<dyn Fn(&[AnyRc]) -> DiResult<AnyRc>>,
    pub capabilities: CapabilityProbes,
}

/// A single/scoped/factory registration.
pub struct Registration {
    pub lifetime: Lifetime,
    pub ctor: Rc<Constructor>,
    /// Populated only for `Lifetime::Singleton`. An `Rc<RefCell<_>>` rather
    /// than a plain `RefCell<_>` so a type-keyed registration and a
    /// token-bound alias of it (`.bind(token)`) share one cache cell and
    /// therefore one cached instance.
    pub singleton_cache: Rc<RefCell<Option<AnyRc>>>,
}

impl Registration {
    pub fn new(lifetime: Lifetime, ctor: Rc<Constructor>) -> Self {
        Self { lifetime, ctor, singleton_cache: Rc::new(RefCell::new(None)) }
    }

    /// Builds an alias registration sharing this one's singleton cache cell —
    /// used when a type registration is additionally bound to a token.
    pub fn alias(&self) -> Self {
        Self { lifetime: self.lifetime, ctor: self.ctor.clone(), singleton_cache: self.singleton_cache.clone() }
    }
}

/// A multi-registration: resolving the token returns every member, in
/// registration order. Each member is cached as a true singleton — the
/// first resolve builds it, every subsequent resolve of that token returns
/// the same list of instances (see design notes).
pub struct MultiRegistration {
    pub token: Token,
    pub members: Vec<Rc<Constructor>>,
    pub caches: RefCell<Vec<Option<AnyRc>>>,
}

impl MultiRegistration {
    pub fn new(token: Token, members: Vec<Rc<Constructor>>) -> Self {
        let len = members.len();
        Self { token, members, caches: RefCell::new(vec![None; len]) }
    }
}

/// A keyed-registration: resolving the token yields a callable that builds a
/// fresh instance (factory semantics) for a given string key on every call.
pub struct KeyedRegistration {
    pub token: Token,
    pub entries: Vec<(String, Rc<Constructor>)>,
}

impl KeyedRegistration {
    pub fn available_keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn find(&self, key: &str) -> Option<&Rc<Constructor>> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, c)| c)
    }
}

/// Holds all registrations for one container. A hybrid Vec-then-HashMap
/// shape: a linear scan over a small Vec is cache-friendlier than a hash
/// lookup until the table grows past a handful of entries.
#[derive(Default)]
pub struct Registry {
    small: Vec<(RegKey, Registration)>,
    large: HashMap<RegKey, Registration>,
    small_threshold: usize,
    pub multi: HashMap<Token, MultiRegistration>,
    pub keyed: HashMap<Token, KeyedRegistration>,
}

impl Registry {
    pub fn new() -> Self {
        Self { small_threshold: 16, ..Default::default() }
    }

    pub fn insert(&mut self, key: RegKey, registration: Registration) -> Result<(), ()> {
        if self.contains_key(&key) {
            return Err(());
        }
        if self.small.len() < self.small_threshold {
            self.small.push((key, registration));
        } else {
            self.large.insert(key, registration);
        }
        Ok(())
    }

    pub fn get(&self, key: &RegKey) -> Option<&Registration> {
        self.small.iter().find(|(k, _)| k == key).map(|(_, r)| r).or_else(|| self.large.get(key))
    }

    pub fn contains_key(&self, key: &RegKey) -> bool {
        self.small.iter().any(|(k, _)| k == key) || self.large.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegKey, &Registration)> {
        self.small.iter().map(|(k, r)| (k, r)).chain(self.large.iter())
    }

    /// Order in which registrations were made, used by `launch()`'s
    /// singleton-start pass.
    pub fn insertion_order(&self) -> impl Iterator<Item = (&RegKey, &Registration)> {
        self.iter()
    }
}
