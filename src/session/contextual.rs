//! Contextual identities and their normalization to store keys.

use std::borrow::Cow;
use std::fmt;
use tracing::warn;

/// Prefix of passivation ids derived by [`ManagedBean`]
pub const PASSIVATION_ID_PREFIX: &str = "BEANCTX_";

/// An identity-bearing bean definition whose instances live in a context
pub trait Contextual: fmt::Debug + Send + Sync {
    /// Stable string identity, or `None` if the bean is not passivation capable
    fn passivation_id(&self) -> Option<String>;
}

/// A store key as callers hand it in: either an already-normalized token or
/// a contextual to derive one from
#[derive(Clone, Copy)]
pub enum KeyRef<'a> {
    Token(&'a str),
    Contextual(&'a dyn Contextual),
}

impl<'a> From<&'a str> for KeyRef<'a> {
    fn from(token: &'a str) -> Self {
        KeyRef::Token(token)
    }
}

impl<'a> From<&'a dyn Contextual> for KeyRef<'a> {
    fn from(contextual: &'a dyn Contextual) -> Self {
        KeyRef::Contextual(contextual)
    }
}

impl<'a, C: Contextual> From<&'a C> for KeyRef<'a> {
    fn from(contextual: &'a C) -> Self {
        KeyRef::Contextual(contextual)
    }
}

impl fmt::Debug for KeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRef::Token(token) => f.debug_tuple("Token").field(token).finish(),
            KeyRef::Contextual(c) => f.debug_tuple("Contextual").field(c).finish(),
        }
    }
}

/// Normalize `key` to the string the backing store is keyed by.
///
/// Tokens pass through untouched so nested calls do not re-derive. A
/// contextual without a passivation id falls back to its debug rendering,
/// which keeps the store usable at the price of a key that is only as stable
/// as that rendering.
pub fn key_of<'a>(key: impl Into<KeyRef<'a>>) -> Cow<'a, str> {
    match key.into() {
        KeyRef::Token(token) => Cow::Borrowed(token),
        KeyRef::Contextual(contextual) => match contextual.passivation_id() {
            Some(id) => Cow::Owned(id),
            None => {
                let fallback = format!("{:?}", contextual);
                warn!(key = %fallback, "contextual has no passivation id; using debug representation");
                Cow::Owned(fallback)
            }
        },
    }
}

/// A managed bean identified by class and qualifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManagedBean {
    bean_class: String,
    qualifiers: Vec<String>,
    passivating: bool,
}

impl ManagedBean {
    pub fn new(bean_class: impl Into<String>) -> Self {
        Self {
            bean_class: bean_class.into(),
            qualifiers: Vec::new(),
            passivating: true,
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifiers.push(qualifier.into());
        self.qualifiers.sort();
        self.qualifiers.dedup();
        self
    }

    /// A bean that cannot be passivated and so has no passivation id
    pub fn non_passivating(mut self) -> Self {
        self.passivating = false;
        self
    }

    pub fn bean_class(&self) -> &str {
        &self.bean_class
    }
}

impl Contextual for ManagedBean {
    fn passivation_id(&self) -> Option<String> {
        if !self.passivating {
            return None;
        }
        Some(format!(
            "{}ManagedBean#{}#{}",
            PASSIVATION_ID_PREFIX,
            self.bean_class,
            self.qualifiers.join(",")
        ))
    }
}
