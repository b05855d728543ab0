//! Mock objects and call recording.
//!
//! This module provides the test doubles themselves:
//!
//! - [`Mock`] - A substitute object with a declared capability set
//! - [`MockBuilder`] - Configuration for a mock
//! - [`create_autospec`] - Build a mock tree from a [`Spec`](crate::spec::Spec)
//! - [`CallRecorder`] - Ordered call history and call assertions
//!
//! # Mocks
//!
//! ```rust
//! use testkit_double::call;
//! use testkit_double::mock::Mock;
//!
//! let client = Mock::new();
//! client.call_method("get", call!("/health")).unwrap();
//!
//! client.child("get").unwrap().assert_called_once_with(&call!("/health")).unwrap();
//! ```
//!
//! # Non-callable mocks
//!
//! ```rust
//! use testkit_double::mock::Mock;
//!
//! let config = Mock::non_callable();
//! assert!(config.call0().is_err());
//!
//! // Members of a non-callable mock are still callable.
//! assert!(config.child("reload").unwrap().call0().is_ok());
//! ```

mod autospec;
mod builder;
mod magic;
mod recorder;
mod substitute;

pub use autospec::{create_autospec, create_autospec_set};
pub(crate) use autospec::autospec_builder;
pub use builder::MockBuilder;
pub use recorder::{CallRecord, CallRecorder, Outcome};
pub use substitute::{CallFn, Flavor, Mock, MockId, SideEffect};
