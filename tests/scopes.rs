use forge_di::{CapabilityProbes, Container, ModuleBuilder, RegKey};
use std::rc::Rc;

struct Player;

#[test]
fn scope_isolation_yields_distinct_instances_per_scope() {
    let container = Container::new();
    let mut module = ModuleBuilder::new();
    module.scoped::<Player>(Vec::new(), CapabilityProbes::none(), |_| Ok(Player));
    container.use_module(module.build()).unwrap();

    let s1 = container.create_scope(Default::default()).unwrap();
    let s2 = container.create_scope(Default::default()).unwrap();

    let a1 = s1.resolve(RegKey::of_type::<Player>()).unwrap();
    let a2 = s1.resolve(RegKey::of_type::<Player>()).unwrap();
    let b1 = s2.resolve(RegKey::of_type::<Player>()).unwrap();

    assert!(Rc::ptr_eq(&a1, &a2));
    assert!(!Rc::ptr_eq(&a1, &b1));
}

#[test]
fn destroying_a_scope_does_not_evict_container_singletons() {
    struct Shared;

    let container = Container::new();
    let mut module = ModuleBuilder::new();
    module.single(Shared);
    container.use_module(module.build()).unwrap();

    let scope = container.create_scope(Default::default()).unwrap();
    let before = container.resolve(RegKey::of_type::<Shared>(), Some(&scope)).unwrap();
    scope.destroy();

    let after = container.resolve(RegKey::of_type::<Shared>(), None).unwrap();
    assert!(Rc::ptr_eq(&before, &after));
}

#[test]
fn destroyed_scope_rejects_new_child_scopes_and_resolves() {
    let container = Container::new();
    let mut module = ModuleBuilder::new();
    module.scoped::<Player>(Vec::new(), CapabilityProbes::none(), |_| Ok(Player));
    container.use_module(module.build()).unwrap();

    let scope = container.create_scope(Default::default()).unwrap();
    scope.destroy();
    scope.destroy(); // idempotent

    assert!(scope.create_child_scope(None).is_err());
    assert!(scope.resolve(RegKey::of_type::<Player>()).is_err());
}
