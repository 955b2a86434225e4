//! Errors attached to a chain node as its cause or as extras

use std::fmt;
use std::sync::Arc;

use crate::ErrorChain;

/// An error attached to a node, either another chain or any foreign error.
///
/// Foreign errors are rendered with their own `Display` form and are never
/// walked as part of the chain, but identity checks still look through them
/// for chains wrapped inside (see [`crate::is`]).
#[derive(Clone)]
pub enum Cause {
    /// Another error chain, with its own ancestry, causes and extras
    Chain(ErrorChain),
    /// Any other error
    Foreign(Arc<anyhow::Error>),
}

impl Cause {
    /// Wrap any standard error as a cause.
    pub fn foreign<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Cause::Foreign(Arc::new(anyhow::Error::new(err)))
    }

    /// The chain, if this cause is one
    pub fn as_chain(&self) -> Option<&ErrorChain> {
        match self {
            Cause::Chain(chain) => Some(chain),
            Cause::Foreign(_) => None,
        }
    }

    /// The foreign error, if this cause is one
    pub fn as_foreign(&self) -> Option<&anyhow::Error> {
        match self {
            Cause::Chain(_) => None,
            Cause::Foreign(err) => Some(&**err),
        }
    }

    /// Check whether this cause is, or derives from, `target`.
    pub fn is(&self, target: &ErrorChain) -> bool {
        match self {
            Cause::Chain(chain) => chain.is(target),
            Cause::Foreign(err) => crate::is(err, target),
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Chain(chain) => write!(f, "{}", chain),
            Cause::Foreign(err) => write!(f, "{}", err),
        }
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Chain(chain) => write!(f, "Chain({:?})", chain.render()),
            Cause::Foreign(err) => write!(f, "Foreign({:?})", err.to_string()),
        }
    }
}

impl From<ErrorChain> for Cause {
    fn from(chain: ErrorChain) -> Self {
        Cause::Chain(chain)
    }
}

impl From<&ErrorChain> for Cause {
    fn from(chain: &ErrorChain) -> Self {
        Cause::Chain(chain.clone())
    }
}

/// A chain boxed into `anyhow::Error` comes back out as a chain, unless
/// context was added on top of it.
impl From<anyhow::Error> for Cause {
    fn from(err: anyhow::Error) -> Self {
        let outermost_is_chain = err
            .chain()
            .next()
            .is_some_and(|e| e.is::<ErrorChain>());
        if !outermost_is_chain {
            return Cause::Foreign(Arc::new(err));
        }
        match err.downcast::<ErrorChain>() {
            Ok(chain) => Cause::Chain(chain),
            Err(err) => Cause::Foreign(Arc::new(err)),
        }
    }
}

impl From<std::io::Error> for Cause {
    fn from(err: std::io::Error) -> Self {
        Cause::foreign(err)
    }
}
