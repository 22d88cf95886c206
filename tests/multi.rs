use forge_di::{constructor, CapabilityProbes, Container, ModuleBuilder};
use std::rc::Rc;

struct PluginA;
struct PluginB;

#[test]
fn multi_registration_preserves_order_and_caches_as_true_singletons() {
    let container = Container::new();
    let token = container.create_token("Plugin");
    let mut module = ModuleBuilder::new();
    let (a_ctor, a_meta) = constructor(Vec::new(), CapabilityProbes::none(), |_| Ok(PluginA));
    let (b_ctor, b_meta) = constructor(Vec::new(), CapabilityProbes::none(), |_| Ok(PluginB));
    module.multi(token, a_ctor, a_meta);
    module.multi(token, b_ctor, b_meta);
    container.use_module(module.build()).unwrap();

    let first = container.resolve_multi(token).unwrap();
    assert_eq!(first.len(), 2);
    assert!(first[0].downcast_ref::<PluginA>().is_some());
    assert!(first[1].downcast_ref::<PluginB>().is_some());

    let second = container.resolve_multi(token).unwrap();
    assert!(Rc::ptr_eq(&first[0], &second[0]));
    assert!(Rc::ptr_eq(&first[1], &second[1]));
}

#[test]
fn bare_resolve_of_a_multi_token_is_a_lifetime_violation() {
    let container = Container::new();
    let token = container.create_token("Plugin");
    let mut module = ModuleBuilder::new();
    let (a_ctor, a_meta) = constructor(Vec::new(), CapabilityProbes::none(), |_| Ok(PluginA));
    module.multi(token, a_ctor, a_meta);
    container.use_module(module.build()).unwrap();

    let err = container.resolve_token(token, None).unwrap_err();
    assert!(matches!(err, forge_di::DiError::LifetimeViolation { .. }));
}
