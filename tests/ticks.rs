use forge_di::{CapabilityProbes, Container, ManualClock, ModuleBuilder, RegKey, Tickable};
use std::cell::Cell;
use std::rc::Rc;

struct Mover {
    ticks: Rc<Cell<u32>>,
}

impl Tickable for Mover {
    fn tick(&self, _delta_time: f64) {
        self.ticks.set(self.ticks.get() + 1);
    }
}

#[test]
fn tick_is_unregistered_when_its_scope_is_destroyed() {
    let ticks = Rc::new(Cell::new(0));
    let container = Container::new();
    let clock = ManualClock::new(false);
    container.tick_dispatcher().attach(&clock);

    let mut module = ModuleBuilder::new();
    let ticks_for_ctor = ticks.clone();
    module.scoped::<Mover>(Vec::new(), CapabilityProbes::none().with_tick::<Mover>(), move |_| {
        Ok(Mover { ticks: ticks_for_ctor.clone() })
    });
    container.use_module(module.build()).unwrap();

    let scope = container.create_scope(Default::default()).unwrap();
    let _ = scope.resolve(RegKey::of_type::<Mover>()).unwrap();

    clock.fire_logic(1.0 / 60.0);
    assert_eq!(ticks.get(), 1);

    scope.destroy();
    clock.fire_logic(1.0 / 60.0);
    assert_eq!(ticks.get(), 1, "tick must not fire for a destroyed scope's instances");
}

#[test]
fn dispatcher_never_exceeds_two_host_subscriptions_regardless_of_tickable_count() {
    let container = Container::new();
    let clock = ManualClock::new(true);
    container.tick_dispatcher().attach(&clock);
    container.tick_dispatcher().attach(&clock);

    let mut module = ModuleBuilder::new();
    module.scoped::<Mover>(Vec::new(), CapabilityProbes::none().with_tick::<Mover>(), |_| {
        Ok(Mover { ticks: Rc::new(Cell::new(0)) })
    });
    container.use_module(module.build()).unwrap();

    for _ in 0..5 {
        let scope = container.create_scope(Default::default()).unwrap();
        let _ = scope.resolve(RegKey::of_type::<Mover>()).unwrap();
    }

    let info = container.tick_dispatcher().debug_info();
    assert_eq!(info.logic_subscribers, 5);
    assert!(info.subscription_count <= 2);
}
