//! The `Reflection` handle: token registry + metadata store bundled behind
//! one owned object instead of hidden process globals, so each container
//! owns one `Reflection` per root and tests can build an isolated container
//! without cross-test leakage.

use crate::metadata::MetadataStore;
use crate::token::TokenRegistry;

#[derive(Default)]
pub struct Reflection {
    pub tokens: TokenRegistry,
    pub metadata: MetadataStore,
}

impl Reflection {
    pub fn new() -> Self {
        Self::default()
    }
}
