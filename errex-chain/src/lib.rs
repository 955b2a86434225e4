//! # errex-chain
//!
//! Errors built by derivation: start from a base error, wrap it with more
//! specific messages, attach causes, payloads and extra errors, and still
//! match the result against any error it was derived from.
//!
//! ## Design Philosophy
//!
//! - **Derivation**: every `wrap*` call returns a new error that keeps its parent
//! - **Identity**: `is` compares nodes, not messages, so sentinels work by reference
//! - **Cause**: a separate error explaining why a node exists, matched by `is` too
//! - **Rendering**: the whole tree becomes one greppable line
//!
//! ## Usage
//!
//! ```rust
//! use errex_chain::ErrorChain;
//!
//! let storage = ErrorChain::new("storage");
//! let not_found = storage.wrap_template("key %q not found");
//!
//! let err = not_found
//!     .with_args(&[&"users/7"])
//!     .wrap_cause("lookup failed", ErrorChain::new("index").wrap("stale"));
//!
//! assert_eq!(
//!     err.to_string(),
//!     "storage: key \"users/7\" not found > lookup failed < index: stale"
//! );
//! assert!(err.is(&storage));
//! assert!(err.is(&not_found));
//! ```
//!
//! ## Rendering
//!
//! - `base` alone renders as `base`
//! - one derivation: `base: sub1`
//! - two: `base: sub1 > sub2`
//! - more: `base: sub1; sub2 > sub3`
//! - causes follow their node: `base: sub1 > fail < cause`
//! - extras follow the message: `base + extra1 + extra2`
//!
//! Template nodes are skipped, as are nodes with empty text.

mod cause;
mod chain;
mod template;
mod wrap;

pub use cause::Cause;
pub use chain::{is, Ancestors, ErrorChain, Payload};
pub use wrap::{wrap_message, wrap_with_cause, Wrapped};

/// Result type alias using ErrorChain
pub type Result<T> = std::result::Result<T, ErrorChain>;
