//! # forge-di
//!
//! A dependency-injection core for single-threaded, cooperative interactive
//! runtimes (the shape of a game engine's frame loop): token-based
//! interface binding, lifetime-managed object graphs, a scope tree for
//! per-entity state, and a tick dispatcher that amortises one host
//! subscription across every ticking instance in the graph.
//!
//! ## Quick start
//!
//! ```
//! use forge_di::{Container, ModuleBuilder};
//!
//! struct Greeter;
//!
//! let container = Container::new();
//! let token = container.create_token("Greeter");
//! let mut module = ModuleBuilder::new();
//! module.single(Greeter).bind(token);
//! container.use_module(module.build()).unwrap();
//!
//! let instance = container.resolve_token(token, None).unwrap();
//! assert!(instance.downcast_ref::<Greeter>().is_some());
//! ```
//!
//! ## Lifetimes
//!
//! - **Singleton**: one instance for the whole container, cached forever.
//! - **Scoped**: one instance per scope, cached for that scope's lifetime.
//! - **Factory**: a fresh instance on every resolve, never cached.
//!
//! ## Scopes and the tick dispatcher
//!
//! A [`Scope`] is a node in a tree of per-entity instance caches. Destroying
//! a scope unregisters its tickables from the shared [`TickDispatcher`],
//! destroys child scopes, then runs its own destroyables — in that order.

pub mod capabilities;
pub mod collection;
pub mod config;
pub mod container;
pub mod diagnostics;
pub mod error;
pub(crate) mod internal;
pub mod key;
pub mod lifetime;
pub mod log;
pub mod metadata;
pub mod reflection;
pub mod registration;
pub mod scope;
pub mod tick;
pub mod token;

pub use capabilities::{
    CapabilityProbes, Destroyable, FixedTickable, RenderTickable, Startable, Tickable, Warmup,
};
pub use collection::{constructor, KeyedFactory, Module, ModuleBuilder, ScopeModule, ScopeModuleBuilder};
pub use config::ContainerConfig;
pub use container::Container;
pub use diagnostics::ScopeDebug;
pub use error::{DiError, DiResult};
pub use key::RegKey;
pub use lifetime::Lifetime;
pub use log::DiagnosticsSink;
pub use metadata::{Metadata, ParamSource};
pub use reflection::Reflection;
pub use registration::{AnyRc, Constructor, Registration};
pub use scope::ScopeNode as Scope;
pub use tick::{HostClock, ManualClock, TickDebugInfo, TickDispatcher};
pub use token::{create_token, is_token, Token, TokenRegistry};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::CapabilityProbes;
    use crate::error::DiError;
    use crate::metadata::ParamSource;
    use std::rc::Rc;

    struct Sword;
    struct Bow;

    #[test]
    fn keyed_factory_builds_distinct_instances_per_call() {
        let container = Container::new();
        let token = container.create_token("Weapon");
        let mut module = ModuleBuilder::new();
        let (sword_ctor, sword_meta) = constructor(Vec::new(), CapabilityProbes::none(), |_| Ok(Sword));
        let (bow_ctor, bow_meta) = constructor(Vec::new(), CapabilityProbes::none(), |_| Ok(Bow));
        module.keyed(token, "Sword", sword_ctor, sword_meta);
        module.keyed(token, "Bow", bow_ctor, bow_meta);
        container.use_module(module.build()).unwrap();

        let factory = container.resolve_keyed(token).unwrap();
        let a = factory.get::<Sword>("Sword").unwrap();
        let b = factory.get::<Sword>("Sword").unwrap();
        assert!(!Rc::ptr_eq(&a, &b));

        let err = factory.call("Axe").unwrap_err();
        match err {
            DiError::MissingRegistration { detail, .. } => {
                assert!(detail.contains("Sword"));
                assert!(detail.contains("Bow"));
            }
            other => panic!("expected MissingRegistration, got {other:?}"),
        }
    }

    struct A;
    struct B;

    #[test]
    fn cycle_renders_with_arrow_chain() {
        let container = Container::new();
        let mut module = ModuleBuilder::new();
        module.single_with::<A>(
            vec![ParamSource::Dependency(RegKey::of_type::<B>())],
            CapabilityProbes::none(),
            |_args| Ok(A),
        );
        module.single_with::<B>(
            vec![ParamSource::Dependency(RegKey::of_type::<A>())],
            CapabilityProbes::none(),
            |_args| Ok(B),
        );
        container.use_module(module.build()).unwrap();

        let err = container.resolve(RegKey::of_type::<A>(), None).unwrap_err();
        match err {
            DiError::CircularDependency { chain } => {
                let rendered = chain.join(" → ");
                assert!(rendered.contains("→"));
                assert_eq!(chain.first(), chain.last());
            }
            other => panic!("expected CircularDependency, got {other:?}"),
        }
    }
}
