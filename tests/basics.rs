use forge_di::{Container, ModuleBuilder, RegKey};

struct Greeter {
    greeting: &'static str,
}

#[test]
fn bind_by_interface_returns_same_singleton() {
    let container = Container::new();
    let token = container.create_token("Greeter");
    let mut module = ModuleBuilder::new();
    module.single(Greeter { greeting: "hi" }).bind(token);
    container.use_module(module.build()).unwrap();

    let a = container.resolve_token(token, None).unwrap();
    let b = container.resolve_token(token, None).unwrap();
    assert!(std::rc::Rc::ptr_eq(&a, &b));
    assert_eq!(a.downcast_ref::<Greeter>().unwrap().greeting, "hi");
}

#[test]
fn launch_twice_instantiates_each_singleton_at_most_once() {
    use std::cell::Cell;

    struct Counted;

    impl forge_di::Startable for Counted {
        fn start(&self) {}
    }

    thread_local! {
        static BUILDS: Cell<u32> = Cell::new(0);
    }

    let container = Container::new();
    let mut module = ModuleBuilder::new();
    module.single_with::<Counted>(
        Vec::new(),
        forge_di::CapabilityProbes::none().with_start::<Counted>(),
        |_| {
            BUILDS.with(|b| b.set(b.get() + 1));
            Ok(Counted)
        },
    );
    container.use_module(module.build()).unwrap();

    container.launch().unwrap();
    container.launch().unwrap();
    let _ = container.resolve(RegKey::of_type::<Counted>(), None).unwrap();

    BUILDS.with(|b| assert_eq!(b.get(), 1));
}

#[test]
fn validate_is_idempotent() {
    let container = Container::new();
    let mut module = ModuleBuilder::new();
    module.single(Greeter { greeting: "hi" });
    container.use_module(module.build()).unwrap();
    container.validate().unwrap();
    container.validate().unwrap();
}

#[test]
fn duplicate_registration_is_rejected() {
    let container = Container::new();
    let mut module = ModuleBuilder::new();
    module.single(Greeter { greeting: "a" });
    module.single(Greeter { greeting: "b" });
    let err = container.use_module(module.build()).unwrap_err();
    assert!(matches!(err, forge_di::DiError::DuplicateRegistration { .. }));
}
