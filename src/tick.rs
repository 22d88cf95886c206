//! The shared tick dispatcher: one subscription to the host's logic/render
//! signals, fanned out to every registered tickable instance regardless of
//! how many scopes created them.

use std::cell::RefCell;
use std::rc::Rc;

use crate::capabilities::{FixedTickable, RenderTickable, Tickable};
use crate::log::DiagnosticsSink;

/// Abstracts the host runtime's periodic signals so the dispatcher (and
/// tests) never depend on a real frame loop: a narrow trait standing in
/// for an external collaborator.
pub trait HostClock {
    fn subscribe_logic(&self, on_tick: Rc<dyn Fn(f64)>);
    fn subscribe_render(&self, on_tick: Rc<dyn Fn(f64)>);
    fn supports_render(&self) -> bool;
}

/// A deterministic clock double for tests: fires ticks only when told to.
#[derive(Default)]
pub struct ManualClock {
    logic: RefCell<Vec<Rc<dyn Fn(f64)>>>,
    render: RefCell<Vec<Rc<dyn Fn(f64)>>>,
    render_supported: bool,
}

impl ManualClock {
    pub fn new(render_supported: bool) -> Self {
        Self { render_supported, ..Default::default() }
    }

    pub fn fire_logic(&self, delta_time: f64) {
        for cb in self.logic.borrow().iter() {
            cb(delta_time);
        }
    }

    pub fn fire_render(&self, delta_time: f64) {
        for cb in self.render.borrow().iter() {
            cb(delta_time);
        }
    }
}

impl HostClock for ManualClock {
    fn subscribe_logic(&self, on_tick: Rc<dyn Fn(f64)>) {
        self.logic.borrow_mut().push(on_tick);
    }

    fn subscribe_render(&self, on_tick: Rc<dyn Fn(f64)>) {
        self.render.borrow_mut().push(on_tick);
    }

    fn supports_render(&self) -> bool {
        self.render_supported
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TickDebugInfo {
    pub logic_subscribers: usize,
    pub fixed_subscribers: usize,
    pub render_subscribers: usize,
    pub paused: bool,
    pub subscription_count: usize,
}

struct Subscribers {
    logic: Vec<Rc<dyn Tickable>>,
    fixed: Vec<Rc<dyn FixedTickable>>,
    render: Vec<Rc<dyn RenderTickable>>,
}

impl Default for Subscribers {
    fn default() -> Self {
        Self { logic: Vec::new(), fixed: Vec::new(), render: Vec::new() }
    }
}

/// The single shared tick dispatcher. Holds at most two subscriptions to the
/// host clock (logic, and render if the host supports it) no matter how
/// many tickables are registered.
pub struct TickDispatcher {
    subs: RefCell<Subscribers>,
    paused: RefCell<bool>,
    logic_subscribed: RefCell<bool>,
    render_subscribed: RefCell<bool>,
    sink: Rc<dyn DiagnosticsSink>,
}

impl TickDispatcher {
    pub fn new(sink: Rc<dyn DiagnosticsSink>) -> Rc<Self> {
        Rc::new(Self {
            subs: RefCell::new(Subscribers::default()),
            paused: RefCell::new(false),
            logic_subscribed: RefCell::new(false),
            render_subscribed: RefCell::new(false),
            sink,
        })
    }

    /// Connects this dispatcher to a host clock. Must be called at most
    /// once; idempotent in practice since subscriptions are only opened
    /// lazily by `register_*` below, but callers drive the real clock
    /// through this handle so `self` can dispatch on its callbacks.
    pub fn attach(self: &Rc<Self>, clock: &dyn HostClock) {
        if !*self.logic_subscribed.borrow() {
            let me = self.clone();
            clock.subscribe_logic(Rc::new(move |dt| me.dispatch_logic(dt)));
            *self.logic_subscribed.borrow_mut() = true;
        }
        if clock.supports_render() && !*self.render_subscribed.borrow() {
            let me = self.clone();
            clock.subscribe_render(Rc::new(move |dt| me.dispatch_render(dt)));
            *self.render_subscribed.borrow_mut() = true;
        }
    }

    pub fn register_tickable(&self, instance: Rc<dyn Tickable>) {
        self.subs.borrow_mut().logic.push(instance);
    }

    pub fn register_fixed_tickable(&self, instance: Rc<dyn FixedTickable>) {
        self.subs.borrow_mut().fixed.push(instance);
    }

    pub fn register_render_tickable(&self, instance: Rc<dyn RenderTickable>) {
        self.subs.borrow_mut().render.push(instance);
    }

    /// Unordered removal (swap with last, pop) — ordering across frames is
    /// not stable, matching the dispatch-order guarantee in the concurrency
    /// model.
    pub fn unregister_tickable(&self, instance: &Rc<dyn Tickable>) {
        let mut subs = self.subs.borrow_mut();
        if let Some(pos) = subs.logic.iter().position(|t| Rc::ptr_eq(t, instance)) {
            subs.logic.swap_remove(pos);
        }
    }

    pub fn unregister_fixed_tickable(&self, instance: &Rc<dyn FixedTickable>) {
        let mut subs = self.subs.borrow_mut();
        if let Some(pos) = subs.fixed.iter().position(|t| Rc::ptr_eq(t, instance)) {
            subs.fixed.swap_remove(pos);
        }
    }

    pub fn unregister_render_tickable(&self, instance: &Rc<dyn RenderTickable>) {
        let mut subs = self.subs.borrow_mut();
        if let Some(pos) = subs.render.iter().position(|t| Rc::ptr_eq(t, instance)) {
            subs.render.swap_remove(pos);
        }
    }

    pub fn pause(&self) {
        *self.paused.borrow_mut() = true;
    }

    pub fn resume(&self) {
        *self.paused.borrow_mut() = false;
    }

    pub fn debug_info(&self) -> TickDebugInfo {
        let subs = self.subs.borrow();
        let subscriptions = *self.logic_subscribed.borrow() as usize + *self.render_subscribed.borrow() as usize;
        TickDebugInfo {
            logic_subscribers: subs.logic.len(),
            fixed_subscribers: subs.fixed.len(),
            render_subscribers: subs.render.len(),
            paused: *self.paused.borrow(),
            subscription_count: subscriptions,
        }
    }

    pub fn destroy(&self) {
        let mut subs = self.subs.borrow_mut();
        subs.logic.clear();
        subs.fixed.clear();
        subs.render.clear();
        *self.logic_subscribed.borrow_mut() = false;
        *self.render_subscribed.borrow_mut() = false;
    }

    fn dispatch_logic(&self, delta_time: f64) {
        if *self.paused.borrow() {
            return;
        }
        let logic: Vec<_> = self.subs.borrow().logic.clone();
        for t in &logic {
            self.guard(|| t.tick(delta_time));
        }
        let fixed: Vec<_> = self.subs.borrow().fixed.clone();
        for t in &fixed {
            self.guard(|| t.fixed_tick(delta_time));
        }
    }

    fn dispatch_render(&self, delta_time: f64) {
        if *self.paused.borrow() {
            return;
        }
        let render: Vec<_> = self.subs.borrow().render.clone();
        for t in &render {
            self.guard(|| t.render_tick(delta_time));
        }
    }

    fn guard(&self, f: impl FnOnce()) {
        if std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).is_err() {
            self.sink.log("tick callback panicked, continuing");
        }
    }
}
