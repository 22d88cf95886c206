//! Scope tree: per-entity instance caches with independent, ordered
//! destruction.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use crate::capabilities::CapabilityProbes;
use crate::container::Container;
use crate::diagnostics::ScopeDebug;
use crate::error::{DiError, DiResult};
use crate::internal::{Chain, DestroyBag};
use crate::key::RegKey;
use crate::registration::AnyRc;

/// One node in the scope tree.
pub struct ScopeNode {
    pub id: String,
    container: Rc<Container>,
    parent: Option<Rc<ScopeNode>>,
    children: RefCell<Vec<Rc<ScopeNode>>>,
    cache: RefCell<HashMap<RegKey, AnyRc>>,
    externals: RefCell<HashMap<RegKey, AnyRc>>,
    destroyables: RefCell<DestroyBag>,
    tick_tickables: RefCell<Vec<Rc<dyn crate::capabilities::Tickable>>>,
    tick_fixed: RefCell<Vec<Rc<dyn crate::capabilities::FixedTickable>>>,
    tick_render: RefCell<Vec<Rc<dyn crate::capabilities::RenderTickable>>>,
    pending_start: RefCell<Vec<Rc<dyn crate::capabilities::Startable>>>,
    destroyed: Cell<bool>,
    created_at: Instant,
}

impl ScopeNode {
    pub(crate) fn new_root_child(container: Rc<Container>, id: Option<String>) -> Rc<Self> {
        Rc::new(Self {
            id: id.unwrap_or_else(|| "scope".to_string()),
            container,
            parent: None,
            children: RefCell::new(Vec::new()),
            cache: RefCell::new(HashMap::new()),
            externals: RefCell::new(HashMap::new()),
            destroyables: RefCell::new(DestroyBag::default()),
            tick_tickables: RefCell::new(Vec::new()),
            tick_fixed: RefCell::new(Vec::new()),
            tick_render: RefCell::new(Vec::new()),
            pending_start: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
            created_at: Instant::now(),
        })
    }

    pub fn create_child_scope(self: &Rc<Self>, id: Option<String>) -> DiResult<Rc<Self>> {
        self.ensure_alive()?;
        let child = Rc::new(Self {
            id: id.unwrap_or_else(|| "scope".to_string()),
            container: self.container.clone(),
            parent: Some(self.clone()),
            children: RefCell::new(Vec::new()),
            cache: RefCell::new(HashMap::new()),
            externals: RefCell::new(HashMap::new()),
            destroyables: RefCell::new(DestroyBag::default()),
            tick_tickables: RefCell::new(Vec::new()),
            tick_fixed: RefCell::new(Vec::new()),
            tick_render: RefCell::new(Vec::new()),
            pending_start: RefCell::new(Vec::new()),
            destroyed: Cell::new(false),
            created_at: Instant::now(),
        });
        self.children.borrow_mut().push(child.clone());
        Ok(child)
    }

    pub fn provide_external(self: &Rc<Self>, key: RegKey, value: AnyRc) {
        self.provide_external_with_capabilities(key, value, CapabilityProbes::none());
    }

    pub fn provide_external_with_capabilities(self: &Rc<Self>, key: RegKey, value: AnyRc, capabilities: CapabilityProbes) {
        self.externals.borrow_mut().insert(key, value.clone());
        self.track_lifecycle(&value, &capabilities);
    }

    pub fn resolve(self: &Rc<Self>, key: RegKey) -> DiResult<AnyRc> {
        self.ensure_alive()?;
        self.container.clone().resolve_chain(key, Chain::new(), Some(self))
    }

    pub fn resolve_token(self: &Rc<Self>, token: crate::token::Token) -> DiResult<AnyRc> {
        self.resolve(RegKey::Token(token))
    }

    pub fn debug(&self) -> ScopeDebug {
        ScopeDebug {
            scope_id: self.id.clone(),
            created_at: self.created_at,
            parent_scope_id: self.parent.as_ref().map(|p| p.id.clone()),
            service_count: self.cache.borrow().len() + self.externals.borrow().len(),
            child_scope_count: self.children.borrow().len(),
        }
    }

    /// Idempotent. Order: unregister tickables, destroy children, run
    /// destroyables, clear caches, mark destroyed.
    pub fn destroy(self: &Rc<Self>) {
        if self.destroyed.get() {
            return;
        }
        let dispatcher = self.container.tick_dispatcher();
        for t in self.tick_tickables.borrow().iter() {
            dispatcher.unregister_tickable(t);
        }
        for t in self.tick_fixed.borrow().iter() {
            dispatcher.unregister_fixed_tickable(t);
        }
        for t in self.tick_render.borrow().iter() {
            dispatcher.unregister_render_tickable(t);
        }

        for child in self.children.borrow().iter() {
            child.destroy();
        }

        self.destroyables.borrow_mut().run_all_reverse(&self.id, &*self.container.sink);

        self.cache.borrow_mut().clear();
        self.externals.borrow_mut().clear();
        self.children.borrow_mut().clear();
        self.tick_tickables.borrow_mut().clear();
        self.tick_fixed.borrow_mut().clear();
        self.tick_render.borrow_mut().clear();
        self.destroyed.set(true);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    pub(crate) fn parent_scope(&self) -> Option<Rc<ScopeNode>> {
        self.parent.clone()
    }

    pub(crate) fn cached(&self, key: &RegKey) -> Option<AnyRc> {
        self.cache.borrow().get(key).cloned()
    }

    pub(crate) fn external(&self, key: &RegKey) -> Option<AnyRc> {
        self.externals.borrow().get(key).cloned()
    }

    pub(crate) fn cache(&self, key: RegKey, value: AnyRc) {
        self.cache.borrow_mut().insert(key, value);
    }

    pub(crate) fn track_lifecycle(&self, instance: &AnyRc, capabilities: &CapabilityProbes) {
        if let Some(probe) = &capabilities.start {
            if let Some(s) = probe(instance) {
                self.pending_start.borrow_mut().push(s);
            }
        }
        if let Some(probe) = &capabilities.destroy {
            if let Some(destroyable) = probe(instance) {
                self.destroyables.borrow_mut().push(Box::new(move || destroyable.destroy()));
            }
        }
        if let Some(probe) = &capabilities.tick {
            if let Some(t) = probe(instance) {
                self.container.tick_dispatcher().register_tickable(t.clone());
                self.tick_tickables.borrow_mut().push(t);
            }
        }
        if let Some(probe) = &capabilities.fixed_tick {
            if let Some(t) = probe(instance) {
                self.container.tick_dispatcher().register_fixed_tickable(t.clone());
                self.tick_fixed.borrow_mut().push(t);
            }
        }
        if let Some(probe) = &capabilities.render_tick {
            if let Some(t) = probe(instance) {
                self.container.tick_dispatcher().register_render_tickable(t.clone());
                self.tick_render.borrow_mut().push(t);
            }
        }
    }

    /// Calls `start()` on every instance registered via `track_lifecycle`
    /// since the last call (the scope's root resolve and any externals).
    /// Individual failures (panics) are logged and do not abort the loop.
    pub(crate) fn start_all(&self) {
        let pending: Vec<_> = self.pending_start.borrow_mut().drain(..).collect();
        for startable in pending {
            if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| startable.start())).is_err() {
                self.container.sink.log(&format!("start() panicked in scope '{}', continuing", self.id));
            }
        }
    }

    fn ensure_alive(&self) -> DiResult<()> {
        if self.destroyed.get() {
            Err(DiError::lifetime_violation(self.id.clone(), "scope has been destroyed"))
        } else {
            Ok(())
        }
    }
}
