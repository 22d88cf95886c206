//! The container: root registry, resolution algorithm, validation, and the
//! `launch`/`createScope`/`tickDispatcher` entry points.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::ContainerConfig;
use crate::error::{DiError, DiResult};
use crate::internal::Chain;
use crate::key::RegKey;
use crate::lifetime::Lifetime;
use crate::log::{DiagnosticsSink, StderrSink};
use crate::metadata::ParamSource;
use crate::reflection::Reflection;
use crate::registration::{AnyRc, Constructor, Registry};
use crate::scope::ScopeNode;
use crate::tick::TickDispatcher;
use crate::token::Token;

/// Root of the dependency graph.
///
/// Owns the registry, the [`Reflection`] handle (token registry + metadata
/// store), and the single shared [`TickDispatcher`]. Always held behind an
/// `Rc` since scopes borrow it for the lifetime of the application.
pub struct Container {
    pub(crate) registry: RefCell<Registry>,
    pub(crate) reflection: RefCell<Reflection>,
    validated: Cell<bool>,
    pub(crate) tick_dispatcher: Rc<TickDispatcher>,
    pub(crate) config: ContainerConfig,
    pub(crate) sink: Rc<dyn DiagnosticsSink>,
}

impl Container {
    pub fn new() -> Rc<Self> {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Rc<Self> {
        let sink: Rc<dyn DiagnosticsSink> = Rc::new(StderrSink);
        Rc::new(Self {
            registry: RefCell::new(Registry::new()),
            reflection: RefCell::new(Reflection::new()),
            validated: Cell::new(false),
            tick_dispatcher: TickDispatcher::new(sink.clone()),
            config,
            sink,
        })
    }

    pub fn create_token(&self, description: &'static str) -> Token {
        self.reflection.borrow_mut().tokens.create_token(description)
    }

    pub fn is_token(&self, value: &Token) -> bool {
        self.reflection.borrow().tokens.is_token(value)
    }

    pub fn tick_dispatcher(&self) -> Rc<TickDispatcher> {
        self.tick_dispatcher.clone()
    }

    /// Merges a module's accumulated registrations into this container.
    /// Marks the container unvalidated.
    pub fn use_module(self: &Rc<Self>, module: crate::collection::Module) -> DiResult<()> {
        {
            let mut reflection = self.reflection.borrow_mut();
            for (impl_id, meta) in module.metadata {
                reflection.metadata.set(impl_id, meta);
            }
        }
        let mut registry = self.registry.borrow_mut();
        for (key, reg) in module.singles {
            registry.insert(key.clone(), reg).map_err(|_| DiError::duplicate(key.display_name()))?;
        }
        for (token, members) in module.multi {
            registry
                .multi
                .entry(token)
                .or_insert_with(|| crate::registration::MultiRegistration::new(token, Vec::new()))
                .members
                .extend(members);
        }
        for (token, entries) in module.keyed {
            let existing = registry
                .keyed
                .entry(token)
                .or_insert_with(|| crate::registration::KeyedRegistration { token, entries: Vec::new() });
            // Cross-module collisions are last-write-wins and not diagnosed
            // (see design notes).
            for (k, ctor) in entries {
                existing.entries.retain(|(existing_key, _)| existing_key != &k);
                existing.entries.push((k, ctor));
            }
        }
        drop(registry);
        self.validated.set(false);
        Ok(())
    }

    /// Runs `validate()`, then instantiates every singleton whose
    /// implementation exposes `Startable`, in registration order, calling
    /// `start()` on each.
    pub fn launch(self: &Rc<Self>) -> DiResult<()> {
        self.validate()?;
        let keys: Vec<RegKey> = self.registry.borrow().insertion_order().map(|(k, _)| k.clone()).collect();
        for key in keys {
            let has_start = {
                let registry = self.registry.borrow();
                registry.get(&key).map(|r| r.ctor.capabilities.start.is_some()).unwrap_or(false)
            };
            if !has_start {
                continue;
            }
            let instance = self.resolve(key.clone(), None)?;
            let probe = {
                let registry = self.registry.borrow();
                registry.get(&key).and_then(|r| r.ctor.capabilities.start.clone())
            };
            if let Some(probe) = probe {
                if let Some(startable) = probe(&instance) {
                    startable.start();
                }
            }
        }
        Ok(())
    }

    /// Accumulates one error per dependency a registration names that isn't
    /// itself registered as a single/multi/keyed entry. A result-list
    /// accumulator rather than throw/catch (see design notes), and shared
    /// between `validate()` and `resolve()`'s own missing-dependency check.
    pub fn validate(self: &Rc<Self>) -> DiResult<()> {
        if self.validated.get() {
            return Ok(());
        }
        let mut errors = Vec::new();
        let registry = self.registry.borrow();
        let reflection = self.reflection.borrow();
        for (key, reg) in registry.iter() {
            let impl_id = reg.ctor.impl_id;
            let arity = reflection.metadata.arity(impl_id);
            for i in 0..arity {
                match reflection.metadata.param(impl_id, i) {
                    Some(ParamSource::Dependency(dep_key)) => {
                        if !self.key_exists(&registry, dep_key) {
                            errors.push(format!(
                                "{}: parameter {} depends on {} which is not registered",
                                key.display_name(),
                                i,
                                dep_key.display_name()
                            ));
                        }
                    }
                    Some(ParamSource::Runtime) => {}
                    None => errors.push(format!(
                        "{}: parameter {} has no declared dependency or runtime marker",
                        key.display_name(),
                        i
                    )),
                }
            }
        }
        drop(reflection);
        drop(registry);
        if errors.is_empty() {
            self.validated.set(true);
            Ok(())
        } else {
            Err(DiError::constructor("validate", errors.join("; ")))
        }
    }

    fn key_exists(&self, registry: &Registry, key: &RegKey) -> bool {
        match key {
            RegKey::Token(t) => registry.contains_key(key) || registry.multi.contains_key(t) || registry.keyed.contains_key(t),
            _ => registry.contains_key(key),
        }
    }

    /// Creates a scope whose parent-chain resolution bottoms out at this
    /// container. `scope_module` supplies externals and, if present, a root
    /// implementation to resolve immediately.
    pub fn create_scope(self: &Rc<Self>, scope_module: crate::collection::ScopeModule) -> DiResult<Rc<ScopeNode>> {
        self.validate()?;
        let scope = ScopeNode::new_root_child(self.clone(), scope_module.id);
        for (key, value) in scope_module.externals {
            scope.provide_external(key, value);
        }
        if let Some(root) = scope_module.root {
            let instance = self.resolve_ctor(&root, &[], Chain::new(), Some(&scope))?;
            scope.track_lifecycle(&instance, &root.capabilities);
        }
        scope.start_all();
        Ok(scope)
    }

    /// Resolves `key` with no scope context (singleton/factory/multi/keyed
    /// only — a `Scoped` registration resolved this way is a lifetime
    /// violation).
    pub fn resolve(self: &Rc<Self>, key: RegKey, scope: Option<&Rc<ScopeNode>>) -> DiResult<AnyRc> {
        self.resolve_chain(key, Chain::new(), scope)
    }

    pub fn resolve_token(self: &Rc<Self>, token: Token, scope: Option<&Rc<ScopeNode>>) -> DiResult<AnyRc> {
        if !self.is_token(&token) {
            return Err(DiError::invalid_token(format!("{token:?} was not minted by this container")));
        }
        self.resolve(RegKey::Token(token), scope)
    }

    pub fn resolve_multi(self: &Rc<Self>, token: Token) -> DiResult<Vec<AnyRc>> {
        let member_count = self.registry.borrow().multi.get(&token).map(|m| m.members.len()).unwrap_or(0);
        let mut out = Vec::with_capacity(member_count);
        for idx in 0..member_count {
            let cached = self.registry.borrow().multi.get(&token).and_then(|m| m.caches.borrow()[idx].clone());
            if let Some(v) = cached {
                out.push(v);
                continue;
            }
            let ctor = self
                .registry
                .borrow()
                .multi
                .get(&token)
                .map(|m| m.members[idx].clone())
                .expect("member count computed above");
            let chain = Chain::new().pushed(&format!("{}[{}]", token.description(), idx));
            let instance = self.resolve_ctor(&ctor, &[], chain, None)?;
            self.registry.borrow().multi.get(&token).unwrap().caches.borrow_mut()[idx] = Some(instance.clone());
            out.push(instance);
        }
        Ok(out)
    }

    /// Resolves a keyed-registration token to a factory closure; unknown
    /// string keys fail with every available key listed.
    pub fn resolve_keyed(self: &Rc<Self>, token: Token) -> DiResult<crate::collection::KeyedFactory> {
        if !self.registry.borrow().keyed.contains_key(&token) {
            return Err(DiError::missing(token.description(), "no keyed registration for this token"));
        }
        Ok(crate::collection::KeyedFactory { container: self.clone(), token })
    }

    pub(crate) fn resolve_keyed_instance(self: &Rc<Self>, token: Token, key: &str) -> DiResult<AnyRc> {
        let registry = self.registry.borrow();
        let entry = registry.keyed.get(&token).ok_or_else(|| DiError::missing(token.description(), "no keyed registration for this token"))?;
        let ctor = entry.find(key).cloned();
        let available = entry.available_keys().join(", ");
        drop(registry);
        let ctor = ctor.ok_or_else(|| {
            DiError::missing(format!("{}[{key}]", token.description()), format!("unknown key; available keys: {available}"))
        })?;
        self.resolve_ctor(&ctor, &[], Chain::new(), None)
    }

    pub(crate) fn resolve_chain(self: &Rc<Self>, key: RegKey, chain: Chain, scope: Option<&Rc<ScopeNode>>) -> DiResult<AnyRc> {
        if let RegKey::Token(t) = &key {
            if self.registry.borrow().multi.contains_key(t) {
                // A bare resolve of a multi-bound token has no natural
                // single-instance answer; callers use `resolve_multi`.
                return Err(DiError::lifetime_violation(key.display_name(), "token is multi-registered; use resolve_multi"));
            }
            if self.registry.borrow().keyed.contains_key(t) {
                return Err(DiError::lifetime_violation(key.display_name(), "token is keyed-registered; use resolve_keyed"));
            }
        }

        let label = key.display_name();
        if let Some(cycle) = chain.detect(&label) {
            return Err(DiError::circular(cycle));
        }
        if chain.depth() >= self.config.max_resolution_depth {
            return Err(DiError::lifetime_violation(
                label,
                format!("resolution depth exceeded max_resolution_depth ({})", self.config.max_resolution_depth),
            ));
        }

        let registration_lifetime = self.registry.borrow().get(&key).map(|r| r.lifetime);
        let lifetime = match registration_lifetime {
            Some(lt) => lt,
            None => {
                if let Some(scope) = scope {
                    if let Some(parent) = scope.parent_scope() {
                        return self.resolve_chain(key, chain, Some(&parent));
                    }
                }
                return Err(DiError::missing(label, "no registration found in this container or any parent scope"));
            }
        };

        match lifetime {
            Lifetime::Singleton => {
                let cached = self.registry.borrow().get(&key).and_then(|r| r.singleton_cache.borrow().clone());
                if let Some(v) = cached {
                    return Ok(v);
                }
                let ctor = self.registry.borrow().get(&key).map(|r| r.ctor.clone()).expect("checked above");
                let next_chain = chain.pushed(&label);
                let instance = self.resolve_ctor(&ctor, &[], next_chain, scope)?;
                self.check_warmup(&key, &lifetime, &ctor, &instance)?;
                self.registry.borrow().get(&key).unwrap().singleton_cache.borrow_mut().replace(instance.clone());
                Ok(instance)
            }
            Lifetime::Scoped => {
                let scope = scope.ok_or_else(|| DiError::lifetime_violation(label.clone(), "scoped resolve requires a scope"))?;
                if let Some(v) = scope.cached(&key) {
                    return Ok(v);
                }
                if let Some(v) = scope.external(&key) {
                    return Ok(v);
                }
                let ctor = self.registry.borrow().get(&key).map(|r| r.ctor.clone()).expect("checked above");
                let next_chain = chain.pushed(&label);
                let instance = self.resolve_ctor(&ctor, &[], next_chain, Some(scope))?;
                scope.cache(key, instance.clone());
                scope.track_lifecycle(&instance, &ctor.capabilities);
                Ok(instance)
            }
            Lifetime::Factory => {
                let ctor = self.registry.borrow().get(&key).map(|r| r.ctor.clone()).expect("checked above");
                let next_chain = chain.pushed(&label);
                let instance = self.resolve_ctor(&ctor, &[], next_chain, scope)?;
                self.check_warmup(&key, &lifetime, &ctor, &instance)?;
                Ok(instance)
            }
        }
    }

    fn check_warmup(&self, key: &RegKey, lifetime: &Lifetime, ctor: &Rc<Constructor>, instance: &AnyRc) -> DiResult<()> {
        if *lifetime != Lifetime::Singleton && ctor.capabilities.is_warmup(instance) {
            return Err(DiError::lifetime_violation(key.display_name(), "Warmup capability requires Singleton lifetime"));
        }
        Ok(())
    }

    /// Assembles a constructor's positional argument list per metadata, then
    /// invokes it. `runtime_args` supplies values for parameters marked
    /// `Runtime`, consumed in ascending parameter-index order.
    pub(crate) fn resolve_ctor(
        self: &Rc<Self>,
        ctor: &Rc<Constructor>,
        runtime_args: &[AnyRc],
        chain: Chain,
        scope: Option<&Rc<ScopeNode>>,
    ) -> DiResult<AnyRc> {
        let impl_id = ctor.impl_id;
        let arity = self.reflection.borrow().metadata.arity(impl_id);
        let mut args = Vec::with_capacity(arity);
        let mut runtime_cursor = 0usize;
        for i in 0..arity {
            let source = {
                let reflection = self.reflection.borrow();
                reflection.metadata.param(impl_id, i).cloned()
            };
            match source {
                Some(ParamSource::Dependency(dep_key)) => {
                    let value = self.resolve_chain(dep_key, chain.clone(), scope)?;
                    args.push(value);
                }
                Some(ParamSource::Runtime) => {
                    let value = runtime_args.get(runtime_cursor).cloned().ok_or_else(|| {
                        DiError::constructor(ctor.impl_name, format!("missing runtime argument at index {i}"))
                    })?;
                    runtime_cursor += 1;
                    args.push(value);
                }
                None => {
                    return Err(DiError::constructor(ctor.impl_name, format!("parameter {i} has no declared source")));
                }
            }
        }
        (ctor.assemble)(&args).map_err(|e| DiError::wrap_constructor(ctor.impl_name, e))
    }

}
