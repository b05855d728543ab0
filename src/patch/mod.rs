//! Scoped replacement of named values.
//!
//! A [`Namespace`] is a table of named slots that code under test looks its
//! collaborators up in. Patching swaps a slot's value for a substitute and
//! guarantees the original comes back:
//!
//! - [`begin`] / [`end`] - Swap in a given substitute, undo explicitly
//! - [`Patch`] - Builder that generates a mock, optionally from a spec
//! - [`PatchGuard`] - The active binding; restores on drop, even on panic
//! - [`Patcher`] - Owns every patch of one test and undoes them in reverse
//!
//! A slot can be patched by only one guard at a time.
//!
//! # Example
//!
//! ```rust
//! use testkit_double::call;
//! use testkit_double::patch::{Namespace, Patch};
//!
//! let ns = Namespace::new("billing");
//! ns.define("charge", "real charge");
//!
//! {
//!     let guard = Patch::object(&ns, "charge").start().unwrap();
//!     ns.call("charge", call!(100)).unwrap();
//!     guard.mock().unwrap().assert_called_once_with(&call!(100)).unwrap();
//! }
//!
//! assert_eq!(ns.get("charge"), Some("real charge".into()));
//! ```

mod builder;
mod guard;
mod namespace;
mod patcher;

pub use builder::Patch;
pub use guard::{begin, end, PatchGuard};
pub use namespace::Namespace;
pub use patcher::Patcher;
