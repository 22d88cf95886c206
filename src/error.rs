//! Error types for the dependency injection container.

use std::fmt;

const LIB_PREFIX: &str = "[forge-di]";

/// The container's error taxonomy.
///
/// Every variant carries the offending key (as a display string so it
/// survives past the registration that produced it), a rendered resolution
/// chain when one was available, and a human-readable detail.
///
/// # Examples
///
/// ```
/// use forge_di::DiError;
///
/// let err = DiError::circular(vec!["A".to_string(), "B".to_string(), "A".to_string()]);
/// assert_eq!(err.to_string(), "[forge-di] circular dependency: A → B → A");
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// A→B→…→A was found while walking the constructor graph.
    CircularDependency { chain: Vec<String> },
    /// No registration exists for the requested key (and no parent scope
    /// supplied one either).
    MissingRegistration { key: String, detail: String },
    /// A value claimed to be a token failed the token-registry membership
    /// check, or a resolve target was neither a token nor a constructor.
    InvalidToken { detail: String },
    /// A lifetime rule was violated: a scoped resolve without a scope, or a
    /// non-singleton implementation exposing the `Warmup` capability.
    LifetimeViolation { key: String, detail: String },
    /// The user-supplied constructor body returned an error or the
    /// parameter list could not be assembled.
    ConstructorError { key: String, detail: String },
    /// A second registration was attempted for a key that already has one.
    DuplicateRegistration { key: String },
}

impl DiError {
    pub fn circular(chain: Vec<String>) -> Self {
        DiError::CircularDependency { chain }
    }

    pub fn missing(key: impl Into<String>, detail: impl Into<String>) -> Self {
        DiError::MissingRegistration { key: key.into(), detail: detail.into() }
    }

    pub fn invalid_token(detail: impl Into<String>) -> Self {
        DiError::InvalidToken { detail: detail.into() }
    }

    pub fn lifetime_violation(key: impl Into<String>, detail: impl Into<String>) -> Self {
        DiError::LifetimeViolation { key: key.into(), detail: detail.into() }
    }

    pub fn constructor(key: impl Into<String>, detail: impl Into<String>) -> Self {
        DiError::ConstructorError { key: key.into(), detail: detail.into() }
    }

    pub fn duplicate(key: impl Into<String>) -> Self {
        DiError::DuplicateRegistration { key: key.into() }
    }

    /// Wraps a constructor failure with the current resolution chain,
    /// unless `detail` already carries the library prefix (a double wrap,
    /// which this suppresses rather than nesting).
    pub fn wrap_constructor(key: impl Into<String>, detail: impl fmt::Display) -> Self {
        let rendered = detail.to_string();
        if rendered.starts_with(LIB_PREFIX) {
            DiError::ConstructorError { key: key.into(), detail: rendered }
        } else {
            DiError::ConstructorError { key: key.into(), detail: format!("{LIB_PREFIX} {rendered}") }
        }
    }
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{LIB_PREFIX} ")?;
        match self {
            DiError::CircularDependency { chain } => {
                write!(f, "circular dependency: {}", chain.join(" → "))
            }
            DiError::MissingRegistration { key, detail } => {
                write!(f, "no registration for {key}: {detail}")
            }
            DiError::InvalidToken { detail } => write!(f, "invalid token: {detail}"),
            DiError::LifetimeViolation { key, detail } => {
                write!(f, "lifetime violation for {key}: {detail}")
            }
            DiError::ConstructorError { key, detail } => {
                write!(f, "constructor for {key} failed: {detail}")
            }
            DiError::DuplicateRegistration { key } => {
                write!(f, "duplicate registration for {key}")
            }
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for DI operations.
pub type DiResult<T> = Result<T, DiError>;
