//! Registration key types.
//!
//! A registration is keyed by either a concrete implementation type or a
//! [`Token`] bound to an implementation. Multi- and keyed-registrations carry
//! an extra discriminant so each member has its own identity in caches.

use std::any::TypeId;

use crate::token::Token;

/// Key identifying a registration or a resolve target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegKey {
    /// A concrete implementation type, keyed by its own `TypeId`.
    Type(TypeId, &'static str),
    /// A token bound to some implementation.
    Token(Token),
    /// One member of a multi-registration, identified by its token and
    /// position in the registered list.
    MultiMember(Token, usize),
}

impl RegKey {
    #[inline(always)]
    pub fn of_type<T: 'static>() -> Self {
        RegKey::Type(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    pub fn display_name(&self) -> String {
        match self {
            RegKey::Type(_, name) => (*name).to_string(),
            RegKey::Token(t) => t.description().to_string(),
            RegKey::MultiMember(t, idx) => format!("{}[{}]", t.description(), idx),
        }
    }
}
