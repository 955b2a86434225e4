//! Wrapping helpers for plain errors
//!
//! For when a full [`ErrorChain`](crate::ErrorChain) is more than needed: these
//! take any error, return `None` for `None`, and produce an error that displays
//! the original text with a message and/or cause appended, while `source()`
//! still leads back to the original error.

use std::fmt;

/// An error with a message and/or cause appended to its display text
pub struct Wrapped {
    inner: anyhow::Error,
    message: String,
    cause: Option<anyhow::Error>,
}

impl Wrapped {
    /// Get the wrapped error
    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }

    /// Get the appended message, empty if only a cause was appended
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the appended cause
    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }
}

impl fmt::Display for Wrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {}", cause)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Wrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self)?;
        writeln!(f)?;
        writeln!(f, "    Inner: {}", self.inner)?;
        if !self.message.is_empty() {
            writeln!(f, "    Message: {}", self.message)?;
        }
        if let Some(cause) = &self.cause {
            writeln!(f, "    Cause: {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for Wrapped {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let inner: &(dyn std::error::Error + 'static) = &*self.inner;
        Some(inner)
    }
}

/// Append `message` to `err`.
///
/// Returns `None` if `err` is `None`, and `err` itself if `message` is empty.
///
/// ```rust
/// use errex_chain::wrap_message;
///
/// let err = wrap_message(Some(anyhow::anyhow!("test")), "message").unwrap();
/// assert_eq!(err.to_string(), "test: message");
/// ```
pub fn wrap_message<E>(err: Option<E>, message: &str) -> Option<anyhow::Error>
where
    E: Into<anyhow::Error>,
{
    let inner = err?.into();
    if message.is_empty() {
        return Some(inner);
    }
    Some(anyhow::Error::new(Wrapped {
        inner,
        message: message.to_string(),
        cause: None,
    }))
}

/// Append `message` and `cause` to `err`, displayed as `"<err>: <message>: <cause>"`.
///
/// Returns `None` if `err` is `None`. Without a cause this is
/// [`wrap_message`]; with an empty message only the cause is appended.
pub fn wrap_with_cause<E, C>(
    err: Option<E>,
    cause: Option<C>,
    message: &str,
) -> Option<anyhow::Error>
where
    E: Into<anyhow::Error>,
    C: Into<anyhow::Error>,
{
    let Some(cause) = cause else {
        return wrap_message(err, message);
    };
    let inner = err?.into();
    Some(anyhow::Error::new(Wrapped {
        inner,
        message: message.to_string(),
        cause: Some(cause.into()),
    }))
}
