//! Opaque token identities for interface bindings.
//!
//! A token stands in for an interface the way a trait object would in a
//! language with structural trait dispatch: it carries no behavior, only an
//! identity and a description used in diagnostics.

use std::cell::RefCell;
use std::fmt;

/// An opaque, identity-distinct handle minted by [`create_token`].
///
/// Two tokens created from the same description are distinct values —
/// equality is by minted identity, never by description text.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    id: u64,
    description: &'static str,
}

impl Token {
    /// The description the token was minted with. Not unique; two tokens
    /// may share a description.
    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(#{}, {:?})", self.id, self.description)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Mints and recognises [`Token`] values.
///
/// The container owns one of these (via [`crate::reflection::Reflection`])
/// so tests can construct an isolated registry instead of depending on
/// hidden global state; a thread-local default backs the free functions
/// below for callers who mint tokens as module-level values before any
/// container exists.
#[derive(Default)]
pub struct TokenRegistry {
    next_id: u64,
    minted: std::collections::HashSet<u64>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_token(&mut self, description: &'static str) -> Token {
        let id = self.next_id;
        self.next_id += 1;
        self.minted.insert(id);
        Token { id, description }
    }

    pub fn is_token(&self, value: &Token) -> bool {
        self.minted.contains(&value.id)
    }
}

thread_local! {
    static DEFAULT_REGISTRY: RefCell<TokenRegistry> = RefCell::new(TokenRegistry::new());
}

/// Mints a fresh token from the thread-local default registry.
pub fn create_token(description: &'static str) -> Token {
    DEFAULT_REGISTRY.with(|r| r.borrow_mut().create_token(description))
}

/// Reports whether `value` was minted by the thread-local default registry.
pub fn is_token(value: &Token) -> bool {
    DEFAULT_REGISTRY.with(|r| r.borrow().is_token(value))
}
