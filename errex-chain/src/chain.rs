//! The ErrorChain type

use std::any::Any;
use std::fmt::{self, Display, Write};
use std::sync::Arc;

use crate::template::{concat_args, format_template};
use crate::Cause;

/// Opaque payload attached to a node
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Immutable part of a node, shared by every handle to it.
struct Node {
    text: String,
    template: bool,
    wrapped: Option<ErrorChain>,
    cause: Option<Cause>,
    data: Option<Payload>,
}

impl Node {
    /// Printed text of this node: its message followed by `< cause`, or just
    /// `< cause` when the message is empty or a template.
    fn entry(&self) -> String {
        let text = if self.template { "" } else { self.text.as_str() };
        match &self.cause {
            Some(cause) if text.is_empty() => format!("< {}", cause),
            Some(cause) => format!("{} < {}", text, cause),
            None => text.to_string(),
        }
    }
}

/// Unlink ancestors iteratively so that dropping a long chain does not
/// recurse once per node.
impl Drop for Node {
    fn drop(&mut self) {
        let mut next = self.wrapped.take();
        while let Some(parent) = next {
            next = Arc::into_inner(parent.node).and_then(|mut node| node.wrapped.take());
        }
    }
}

/// An error derived step by step from a base error.
///
/// Every derivation allocates a new node that keeps its parent, so a derived
/// error answers [`is`](ErrorChain::is) for each of its ancestors and for
/// anything in their causes. Cloning a handle does not create a new node.
///
/// Rendering joins the lineage into a single line:
/// - the root-most message is followed by `:`
/// - intermediate messages are separated with `;`
/// - the final message is set off with `>`
/// - causes follow their node after `<`
/// - extras are appended after `+`
///
/// ```rust
/// use errex_chain::ErrorChain;
///
/// let pkg = ErrorChain::new("mypkg");
/// let io = pkg.wrap("io");
/// let err = io.wrap("read").wrap_cause("header", ErrorChain::new("eof"));
///
/// assert_eq!(err.to_string(), "mypkg: io; read > header < eof");
/// assert!(err.is(&pkg));
/// assert!(err.is(&io));
/// ```
#[derive(Clone)]
pub struct ErrorChain {
    node: Arc<Node>,
    extra: Vec<Cause>,
}

impl ErrorChain {
    /// Create a base error with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self::root(message.into(), false)
    }

    /// Create a base error whose text is a template for errors derived from it.
    ///
    /// The template node itself renders as an empty string but stays in the
    /// chain for identity checks.
    pub fn new_template(format: impl Into<String>) -> Self {
        Self::root(format.into(), true)
    }

    fn root(text: String, template: bool) -> Self {
        Self {
            node: Arc::new(Node {
                text,
                template,
                wrapped: None,
                cause: None,
                data: None,
            }),
            extra: Vec::new(),
        }
    }

    fn derive(
        &self,
        text: String,
        template: bool,
        cause: Option<Cause>,
        data: Option<Payload>,
    ) -> Self {
        Self {
            node: Arc::new(Node {
                text,
                template,
                wrapped: Some(self.clone()),
                cause,
                data,
            }),
            extra: Vec::new(),
        }
    }

    /// Text for a node filled from this one: the formatted template, or the
    /// concatenated args if this node is not a template.
    fn fill(&self, args: &[&dyn Display]) -> String {
        if self.node.template {
            format_template(&self.node.text, args)
        } else {
            concat_args(args)
        }
    }

    // =========================================================================
    // Derivation
    // =========================================================================

    /// Derive a new error with the given message
    pub fn wrap(&self, message: impl Into<String>) -> Self {
        self.derive(message.into(), false, None, None)
    }

    /// Derive a new template error; see [`new_template`](ErrorChain::new_template).
    pub fn wrap_template(&self, format: impl Into<String>) -> Self {
        self.derive(format.into(), true, None, None)
    }

    /// Derive a new error whose message is this template filled with `args`.
    ///
    /// ```rust
    /// use errex_chain::ErrorChain;
    ///
    /// let err = ErrorChain::new("db").wrap_template("table %s missing").with_args(&[&"users"]);
    /// assert_eq!(err.to_string(), "db: table users missing");
    /// ```
    pub fn with_args(&self, args: &[&dyn Display]) -> Self {
        self.derive(self.fill(args), false, None, None)
    }

    /// Derive a new error that carries `cause`.
    pub fn wrap_cause(&self, message: impl Into<String>, cause: impl Into<Cause>) -> Self {
        self.derive(message.into(), false, Some(cause.into()), None)
    }

    /// [`with_args`](ErrorChain::with_args) and [`wrap_cause`](ErrorChain::wrap_cause) in one step
    pub fn wrap_cause_with_args(&self, cause: impl Into<Cause>, args: &[&dyn Display]) -> Self {
        self.derive(self.fill(args), false, Some(cause.into()), None)
    }

    /// Derive a new error that carries a data payload.
    pub fn wrap_data<T>(&self, message: impl Into<String>, data: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.derive(message.into(), false, None, Some(Arc::new(data)))
    }

    /// [`with_args`](ErrorChain::with_args) and [`wrap_data`](ErrorChain::wrap_data) in one step
    pub fn wrap_data_with_args<T>(&self, data: T, args: &[&dyn Display]) -> Self
    where
        T: Any + Send + Sync,
    {
        self.derive(self.fill(args), false, None, Some(Arc::new(data)))
    }

    /// Derive a new template error that carries a data payload. Errors filled
    /// from it find the payload through [`any_data`](ErrorChain::any_data).
    pub fn wrap_data_template<T>(&self, format: impl Into<String>, data: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.derive(format.into(), true, None, Some(Arc::new(data)))
    }

    /// Append an extra error reported alongside this one.
    ///
    /// Extras belong to this handle only: they are rendered after the message
    /// but take no part in ancestry or identity, and the returned handle is
    /// still the same node.
    pub fn with_extra(mut self, err: impl Into<Cause>) -> Self {
        self.extra.push(err.into());
        self
    }

    // =========================================================================
    // Getters
    // =========================================================================

    /// Get this node's text, or its format string if it is a template
    pub fn text(&self) -> &str {
        &self.node.text
    }

    /// Check if this node is a template
    pub fn is_template(&self) -> bool {
        self.node.template
    }

    /// Get the error this one was derived from
    pub fn wrapped(&self) -> Option<&ErrorChain> {
        self.node.wrapped.as_ref()
    }

    /// Get the cause attached to this node
    pub fn cause(&self) -> Option<&Cause> {
        self.node.cause.as_ref()
    }

    /// Get the extras, in the order they were appended
    pub fn extras(&self) -> &[Cause] {
        &self.extra
    }

    /// Get the payload attached to this node
    pub fn payload(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.node.data.as_deref()
    }

    /// Get the payload attached to this node, if it is a `T`
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.payload()?.downcast_ref::<T>()
    }

    /// Get the first payload found walking from this node towards the root
    pub fn any_payload(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.ancestors().find_map(ErrorChain::payload)
    }

    /// Get the first payload found walking towards the root, if it is a `T`
    pub fn any_data<T: Any>(&self) -> Option<&T> {
        self.any_payload()?.downcast_ref::<T>()
    }

    /// Iterate over this node and then each node it was derived from
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Check if `other` is a handle to this very node
    pub fn same_node(&self, other: &ErrorChain) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Check if this error is `target` or derives from it, either through its
    /// ancestors or through the cause of any of them.
    ///
    /// Comparison is by identity: an error built separately with the same
    /// message is not a match. Extras are not considered.
    pub fn is(&self, target: &ErrorChain) -> bool {
        self.ancestors().any(|node| {
            node.same_node(target) || node.cause().is_some_and(|cause| cause.is(target))
        })
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Render the whole chain into one line
    pub fn render(&self) -> String {
        let message = self.node.entry();

        // Nearest ancestor first
        let mut stack = Vec::new();
        for node in self.ancestors().skip(1) {
            let entry = node.node.entry();
            if !entry.is_empty() {
                stack.push(entry);
            }
        }

        let mut out = match stack.split_last() {
            None => message,
            Some((root, [])) if message.is_empty() => root.clone(),
            Some((root, [])) => format!("{}: {}", root, message),
            Some((root, middle)) => {
                let mut prefix = format!("{}:", root);
                for (i, entry) in middle.iter().rev().enumerate() {
                    if i > 0 {
                        prefix.push(';');
                    }
                    prefix.push(' ');
                    prefix.push_str(entry);
                }
                if message.is_empty() {
                    prefix
                } else {
                    format!("{} > {}", prefix, message)
                }
            }
        };

        for extra in &self.extra {
            let _ = write!(out, " + {}", extra);
        }
        out
    }
}

/// Iterator returned by [`ErrorChain::ancestors`]
pub struct Ancestors<'a> {
    next: Option<&'a ErrorChain>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ErrorChain;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.wrapped();
        Some(current)
    }
}

/// Check whether any error in `err`'s source chain is, or derives from, `target`.
///
/// This is the identity check for errors that have been boxed or given extra
/// context, e.g. an [`ErrorChain`] returned through `anyhow::Result`.
pub fn is(err: &anyhow::Error, target: &ErrorChain) -> bool {
    err.chain()
        .filter_map(|e| e.downcast_ref::<ErrorChain>())
        .any(|chain| chain.is(target))
}

// =============================================================================
// Display - compact, single-line format for logs
// =============================================================================

impl fmt::Display for ErrorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

// =============================================================================
// Debug - verbose, multi-line format for debugging
// =============================================================================

impl fmt::Debug for ErrorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.render())?;

        for (depth, node) in self.ancestors().enumerate() {
            writeln!(f)?;
            write!(f, "    [{}] {:?}", depth, node.node.text)?;
            if node.node.template {
                write!(f, " (template)")?;
            }
            if node.node.data.is_some() {
                write!(f, " (data)")?;
            }
            writeln!(f)?;
            if let Some(cause) = &node.node.cause {
                writeln!(f, "        Cause: {}", cause)?;
            }
        }

        if !self.extra.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Extras:")?;
            for extra in &self.extra {
                writeln!(f, "        {}", extra)?;
            }
        }

        Ok(())
    }
}

// =============================================================================
// std::error::Error implementation
// =============================================================================

impl std::error::Error for ErrorChain {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.wrapped().map(|e| e as &(dyn std::error::Error + 'static))
    }
}
