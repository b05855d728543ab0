//! # testkit-double 🧰
//!
//! > Test doubles for Rust
//!
//! **testkit-double** provides mocks that record how they are called, checks
//! them against a declared shape, and swaps them into named slots for the
//! duration of a test.
//!
//! ## Quick Start
//!
//! ```rust
//! use testkit_double::prelude::*;
//!
//! let ns = Namespace::new("shop");
//! ns.define_with_spec(
//!     "Payments",
//!     "real payments",
//!     Spec::class("Payments").method("charge").method("refund"),
//! );
//!
//! let mut patcher = Patcher::new();
//! let payments = patcher
//!     .start(Patch::object(&ns, "Payments").autospec())
//!     .unwrap()
//!     .into_mock()
//!     .unwrap();
//!
//! // Code under test
//! let client = ns.call("Payments", call!()).unwrap().into_mock().unwrap();
//! client.call_method("charge", call!(100; currency = "EUR")).unwrap();
//!
//! payments.assert_called_once_with(&call!()).unwrap();
//! client
//!     .child("charge")
//!     .unwrap()
//!     .assert_called_once_with(&call!(100; currency = "EUR"))
//!     .unwrap();
//! assert!(client.child("cancel").is_err());
//!
//! patcher.stop_all();
//! assert_eq!(ns.get("Payments"), Some("real payments".into()));
//! ```
//!
//! ## Features
//!
//! - 🎭 **Mocks** - Callable and non-callable doubles with lazily created members
//! - 📐 **Specs** - Restrict a mock to the members of a declared class or object
//! - 📼 **Call Recording** - Ordered history with `assert_called_*` helpers
//! - 🩹 **Patching** - Scoped replacement that always restores the original
//! - 🔍 **Matchers** - Flexible argument assertions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assertions;
pub mod call;
pub mod error;
pub mod mock;
pub mod patch;
pub mod spec;

/// Prelude for convenient imports
///
/// ```rust
/// use testkit_double::prelude::*;
/// ```
pub mod prelude {
    pub use crate::assertions::matcher::{
        all_of, any_of, anything, contains_str, eq, gt, lt, not, of_kind, satisfies, CallMatcher,
        Matcher,
    };
    pub use crate::call::{Call, MockCall, Value};
    pub use crate::error::{Error, Result};
    pub use crate::mock::{create_autospec, create_autospec_set, Flavor, Mock, SideEffect};
    pub use crate::patch::{begin, end, Namespace, Patch, PatchGuard, Patcher};
    pub use crate::spec::Spec;
    pub use crate::{assert_that, call};
}

// Re-exports
pub use error::{Error, Result};

// Re-export the test macro when macros feature is enabled
#[cfg(feature = "macros")]
pub use testkit_double_macros::test;

#[doc(hidden)]
pub mod __private {
    pub use futures::executor::block_on;
}
