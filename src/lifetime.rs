//! Registration lifetimes controlling instance caching behavior.

/// How an implementation's instances are cached and shared.
///
/// # Examples
///
/// ```
/// use forge_di::Lifetime;
///
/// assert_ne!(Lifetime::Singleton, Lifetime::Scoped);
/// assert_ne!(Lifetime::Scoped, Lifetime::Factory);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// One instance for the whole container, cached forever.
    Singleton,
    /// One instance per scope, cached for that scope's lifetime.
    Scoped,
    /// A fresh instance on every resolve; never cached, never tracked.
    Factory,
}
