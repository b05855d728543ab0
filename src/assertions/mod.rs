//! Assertions over recorded calls.
//!
//! Equality-based call assertions live on
//! [`CallRecorder`](crate::mock::CallRecorder) and [`Mock`](crate::mock::Mock).
//! This module adds [`matcher`], a matcher system for the cases where exact
//! equality is too strict:
//!
//! ```rust
//! use testkit_double::{assert_that, call};
//! use testkit_double::assertions::matcher::{anything, of_kind, CallMatcher};
//! use testkit_double::mock::Mock;
//!
//! let mock = Mock::new();
//! mock.call(call!(1, "generated-id")).unwrap();
//!
//! let expected = CallMatcher::new().arg(of_kind("int")).arg(anything());
//! mock.assert_called_once_matching(&expected).unwrap();
//! assert_that!(mock.call_args().unwrap(), expected);
//! ```

pub mod matcher;
