//! Lifecycle capabilities and the probe pattern used to detect them.
//!
//! An implementation "has" a capability (start, tick, destroy, …) when it
//! implements the matching trait. The container never learns the concrete
//! type twice: the registration call site is the only place that statically
//! knows it, so it builds a small downcast closure there and hands the
//! container data, not behavior.

use std::rc::Rc;

use crate::registration::AnyRc;

/// Runs once, the first time a singleton is instantiated during `launch()`.
pub trait Startable {
    fn start(&self);
}

/// Runs on every logic/physics tick.
pub trait Tickable {
    fn tick(&self, delta_time: f64);
}

/// Runs on every fixed-step tick, after the logic-tick list for that frame.
pub trait FixedTickable {
    fn fixed_tick(&self, delta_time: f64);
}

/// Runs on every render tick (client hosts only).
pub trait RenderTickable {
    fn render_tick(&self, delta_time: f64);
}

/// Runs once when the owning scope is destroyed.
pub trait Destroyable {
    fn destroy(&self);
}

/// Marker capability: an implementation that is a lifetime error to
/// register as anything other than `Singleton`.
pub trait Warmup {}

type StartProbe = Rc<dyn Fn(&AnyRc) -> Option<Rc<dyn Startable>>>;
type TickProbe = Rc<dyn Fn(&AnyRc) -> Option<Rc<dyn Tickable>>>;
type FixedTickProbe = Rc<dyn Fn(&AnyRc) -> Option<Rc<dyn FixedTickable>>>;
type RenderTickProbe = Rc<dyn Fn(&AnyRc) -> Option<Rc<dyn RenderTickable>>>;
type DestroyProbe = Rc<dyn Fn(&AnyRc) -> Option<Rc<dyn Destroyable>>>;
type WarmupProbe = Rc<dyn Fn(&AnyRc) -> bool>;

/// The set of capability probes captured for one registration. Each field is
/// populated only when the builder call site declared that capability for
/// the implementation type.
#[derive(Clone, Default)]
pub struct CapabilityProbes {
    pub start: Option<StartProbe>,
    pub tick: Option<TickProbe>,
    pub fixed_tick: Option<FixedTickProbe>,
    pub render_tick: Option<RenderTickProbe>,
    pub destroy: Option<DestroyProbe>,
    pub warmup: Option<WarmupProbe>,
}

impl CapabilityProbes {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_start<T: Startable + 'static>(mut self) -> Self {
        self.start = Some(Rc::new(|any: &AnyRc| {
            any.clone().downcast::<T>().ok().map(|rc| rc as Rc<dyn Startable>)
        }));
        self
    }

    pub fn with_tick<T: Tickable + 'static>(mut self) -> Self {
        self.tick = Some(Rc::new(|any: &AnyRc| {
            any.clone().downcast::<T>().ok().map(|rc| rc as Rc<dyn Tickable>)
        }));
        self
    }

    pub fn with_fixed_tick<T: FixedTickable + 'static>(mut self) -> Self {
        self.fixed_tick = Some(Rc::new(|any: &AnyRc| {
            any.clone().downcast::<T>().ok().map(|rc| rc as Rc<dyn FixedTickable>)
        }));
        self
    }

    pub fn with_render_tick<T: RenderTickable + 'static>(mut self) -> Self {
        self.render_tick = Some(Rc::new(|any: &AnyRc| {
            any.clone().downcast::<T>().ok().map(|rc| rc as Rc<dyn RenderTickable>)
        }));
        self
    }

    pub fn with_destroy<T: Destroyable + 'static>(mut self) -> Self {
        self.destroy = Some(Rc::new(|any: &AnyRc| {
            any.clone().downcast::<T>().ok().map(|rc| rc as Rc<dyn Destroyable>)
        }));
        self
    }

    pub fn with_warmup<T: Warmup + 'static>(mut self) -> Self {
        self.warmup = Some(Rc::new(|any: &AnyRc| any.clone().downcast::<T>().is_ok()));
        self
    }

    pub fn is_warmup(&self, instance: &AnyRc) -> bool {
        self.warmup.as_ref().map(|probe| probe(instance)).unwrap_or(false)
    }
}
