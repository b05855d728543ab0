#![allow(clippy::must_use_candidate)]

//! Call recording and call assertions.
//!
//! Every mock owns a [`CallRecorder`]. It can also be used on its own to
//! track calls made through a hand-written fake:
//!
//! ```rust
//! use testkit_double::call;
//! use testkit_double::mock::{CallRecorder, Outcome};
//!
//! let recorder = CallRecorder::named("fetch");
//! recorder.record(call!("a"), Outcome::Returned(1.into()));
//!
//! assert_eq!(recorder.call_count(), 1);
//! assert!(recorder.assert_called_once_with(&call!("a")).is_ok());
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

use crate::assertions::matcher::Matcher;
use crate::call::{Call, Value};
use crate::error::{Error, Result};

/// How a recorded call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The call returned a value.
    Returned(Value),
    /// The call failed with a raised side effect.
    Raised(String),
}

/// A record of a single call.
#[derive(Debug, Clone)]
pub struct CallRecord {
    /// The arguments passed to the call.
    pub call: Call,
    /// How the call ended.
    pub outcome: Outcome,
    /// When the call was made (relative to recorder creation).
    pub timestamp: Duration,
}

/// Ordered, append-only record of the calls made to one mock.
pub struct CallRecorder {
    name: String,
    calls: Mutex<Vec<CallRecord>>,
    call_count: AtomicUsize,
    created_at: Instant,
}

impl CallRecorder {
    /// Create a recorder labelled `mock`.
    pub fn new() -> Self {
        Self::named("mock")
    }

    /// Create a recorder whose assertion messages use `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
            created_at: Instant::now(),
        }
    }

    /// The label used in assertion messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a call.
    pub fn record(&self, call: Call, outcome: Outcome) {
        trace!(mock = %self.name, %call, "recorded call");
        self.calls.lock().push(CallRecord {
            call,
            outcome,
            timestamp: self.created_at.elapsed(),
        });
        self.call_count.fetch_add(1, Ordering::SeqCst);
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().clone()
    }

    /// Arguments of every recorded call, oldest first.
    pub fn call_args_list(&self) -> Vec<Call> {
        self.calls.lock().iter().map(|r| r.call.clone()).collect()
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Check if any call was recorded.
    #[must_use]
    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Check if called exactly N times.
    #[must_use]
    pub fn was_called_times(&self, n: usize) -> bool {
        self.call_count() == n
    }

    /// Check if any recorded call equals `expected`.
    pub fn was_called_with(&self, expected: &Call) -> bool {
        self.calls.lock().iter().any(|r| &r.call == expected)
    }

    /// The Nth recorded call (0-indexed).
    pub fn nth_call(&self, n: usize) -> Option<CallRecord> {
        self.calls.lock().get(n).cloned()
    }

    /// Arguments of the most recent call.
    pub fn call_args(&self) -> Option<Call> {
        self.calls.lock().last().map(|r| r.call.clone())
    }

    /// Clear the history.
    pub fn reset(&self) {
        self.calls.lock().clear();
        self.call_count.store(0, Ordering::SeqCst);
    }

    /// Fail unless at least one call was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] if nothing was recorded.
    pub fn assert_called(&self) -> Result<()> {
        if self.was_called() {
            Ok(())
        } else {
            Err(Error::assertion(format!(
                "Expected '{}' to have been called.",
                self.name
            )))
        }
    }

    /// Fail if any call was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] if something was recorded.
    pub fn assert_not_called(&self) -> Result<()> {
        match self.call_count() {
            0 => Ok(()),
            n => Err(Error::assertion(format!(
                "Expected '{}' to not have been called. Called {n} times.",
                self.name
            ))),
        }
    }

    /// Fail unless exactly one call was recorded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] for zero or several calls.
    pub fn assert_called_once(&self) -> Result<()> {
        match self.call_count() {
            1 => Ok(()),
            n => Err(Error::assertion(format!(
                "Expected '{}' to have been called once. Called {n} times.",
                self.name
            ))),
        }
    }

    /// Fail unless the most recent call equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] if there is no call or the last
    /// call differs.
    pub fn assert_called_with(&self, expected: &Call) -> Result<()> {
        match self.call_args() {
            None => Err(Error::assertion(format!(
                "expected call not found.\nExpected: {expected}\nActual: not called."
            ))),
            Some(actual) if &actual == expected => Ok(()),
            Some(actual) => Err(Error::assertion(format!(
                "expected call not found.\nExpected: {expected}\nActual: {actual}"
            ))),
        }
    }

    /// Fail unless exactly one call was recorded and it equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] otherwise.
    pub fn assert_called_once_with(&self, expected: &Call) -> Result<()> {
        let count = self.call_count();
        if count != 1 {
            return Err(Error::assertion(format!(
                "Expected '{}' to be called once. Called {count} times.",
                self.name
            )));
        }
        self.assert_called_with(expected)
    }

    /// Fail unless some recorded call equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] if no call matches.
    pub fn assert_any_call(&self, expected: &Call) -> Result<()> {
        if self.was_called_with(expected) {
            Ok(())
        } else {
            Err(Error::assertion(format!("{expected} call not found")))
        }
    }

    /// Fail unless `expected` appears in the history.
    ///
    /// Without `any_order` the calls must appear as one contiguous run, in
    /// order. With `any_order` each expected call must match a distinct
    /// recorded call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] if the calls are not found.
    pub fn assert_has_calls(&self, expected: &[Call], any_order: bool) -> Result<()> {
        let actual = self.call_args_list();
        let found = if any_order {
            contains_all(&actual, expected)
        } else {
            expected.is_empty() || actual.windows(expected.len()).any(|w| w == expected)
        };

        if found {
            Ok(())
        } else {
            Err(Error::assertion(format!(
                "Calls not found.\nExpected: {}\nActual: {}",
                format_calls(expected),
                format_calls(&actual)
            )))
        }
    }

    /// Fail unless exactly one call was recorded and it satisfies `matcher`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssertionMismatch`] otherwise.
    pub fn assert_called_once_matching(&self, matcher: &dyn Matcher<Call>) -> Result<()> {
        self.assert_called_once()?;
        match self.call_args() {
            Some(actual) if matcher.matches(&actual) => Ok(()),
            Some(actual) => Err(Error::assertion(format!(
                "{}\nExpected: {}",
                matcher.describe_mismatch(&actual),
                matcher.describe()
            ))),
            None => Err(Error::assertion(format!(
                "Expected '{}' to be called once. Called 0 times.",
                self.name
            ))),
        }
    }
}

fn contains_all(actual: &[Call], expected: &[Call]) -> bool {
    let mut remaining: Vec<&Call> = actual.iter().collect();
    expected.iter().all(|call| {
        match remaining.iter().position(|c| *c == call) {
            Some(i) => {
                remaining.swap_remove(i);
                true
            }
            None => false,
        }
    })
}

fn format_calls(calls: &[Call]) -> String {
    let parts: Vec<String> = calls.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

impl Default for CallRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for CallRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallRecorder")
            .field("name", &self.name)
            .field("call_count", &self.call_count.load(Ordering::SeqCst))
            .field("calls", &*self.calls.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertions::matcher::{anything, eq, CallMatcher};
    use crate::call;

    fn ok() -> Outcome {
        Outcome::Returned(Value::None)
    }

    #[test]
    fn test_record_and_count() {
        let recorder = CallRecorder::new();

        assert!(!recorder.was_called());

        recorder.record(call!(1), ok());
        recorder.record(call!(2), ok());
        recorder.record(call!(3), ok());

        assert!(recorder.was_called());
        assert_eq!(recorder.call_count(), 3);
        assert!(recorder.was_called_times(3));
    }

    #[test]
    fn test_records_keep_order_and_outcome() {
        let recorder = CallRecorder::new();

        recorder.record(call!("a"), Outcome::Returned(1.into()));
        recorder.record(call!("b"), Outcome::Raised("boom".to_string()));

        let calls = recorder.calls();
        assert_eq!(calls[0].call, call!("a"));
        assert_eq!(calls[0].outcome, Outcome::Returned(1.into()));
        assert_eq!(calls[1].outcome, Outcome::Raised("boom".to_string()));
        assert!(calls[0].timestamp <= calls[1].timestamp);
        assert_eq!(recorder.nth_call(1).unwrap().call, call!("b"));
        assert!(recorder.nth_call(2).is_none());
    }

    #[test]
    fn test_assert_called_once_with() {
        let recorder = CallRecorder::named("fetch");

        let err = recorder.assert_called_once_with(&call!()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Assertion failed: Expected 'fetch' to be called once. Called 0 times."
        );

        recorder.record(call!(3, 2, 1), ok());
        assert!(recorder.assert_called_once_with(&call!(3, 2, 1)).is_ok());

        let err = recorder.assert_called_once_with(&call!(1, 2, 3)).unwrap_err();
        assert!(err.to_string().contains("Expected: call(1, 2, 3)"));
        assert!(err.to_string().contains("Actual: call(3, 2, 1)"));

        recorder.record(call!(3, 2, 1), ok());
        assert!(recorder.assert_called_once_with(&call!(3, 2, 1)).is_err());
    }

    #[test]
    fn test_assert_called_with_checks_last_call() {
        let recorder = CallRecorder::new();
        assert!(recorder
            .assert_called_with(&call!())
            .unwrap_err()
            .to_string()
            .contains("not called"));

        recorder.record(call!(1), ok());
        recorder.record(call!(2), ok());

        assert!(recorder.assert_called_with(&call!(2)).is_ok());
        assert!(recorder.assert_called_with(&call!(1)).is_err());
        assert!(recorder.assert_any_call(&call!(1)).is_ok());
        assert!(recorder.assert_any_call(&call!(5)).is_err());
    }

    #[test]
    fn test_assert_called_and_not_called() {
        let recorder = CallRecorder::new();

        assert!(recorder.assert_not_called().is_ok());
        assert!(recorder.assert_called().is_err());
        assert!(recorder.assert_called_once().is_err());

        recorder.record(call!(), ok());

        assert!(recorder.assert_called().is_ok());
        assert!(recorder.assert_called_once().is_ok());
        assert!(recorder.assert_not_called().is_err());
    }

    #[test]
    fn test_assert_has_calls() {
        let recorder = CallRecorder::new();
        for i in 1..=4 {
            recorder.record(call!(i), ok());
        }

        assert!(recorder.assert_has_calls(&[call!(2), call!(3)], false).is_ok());
        assert!(recorder.assert_has_calls(&[call!(3), call!(2)], false).is_err());
        assert!(recorder.assert_has_calls(&[call!(3), call!(2)], true).is_ok());
        assert!(recorder.assert_has_calls(&[call!(2), call!(2)], true).is_err());
        assert!(recorder.assert_has_calls(&[], false).is_ok());
    }

    #[test]
    fn test_assert_called_once_matching() {
        let recorder = CallRecorder::new();
        recorder.record(call!(7, "x"), ok());

        let matcher = CallMatcher::new().arg(eq(Value::from(7))).arg(anything());
        assert!(recorder.assert_called_once_matching(&matcher).is_ok());

        let matcher = CallMatcher::new().arg(eq(Value::from(8))).arg(anything());
        assert!(recorder.assert_called_once_matching(&matcher).is_err());
    }

    #[test]
    fn test_reset() {
        let recorder = CallRecorder::new();

        recorder.record(call!(1), ok());
        recorder.record(call!(2), ok());
        assert_eq!(recorder.call_count(), 2);

        recorder.reset();

        assert_eq!(recorder.call_count(), 0);
        assert!(recorder.calls().is_empty());
        assert!(recorder.call_args().is_none());
    }

    #[test]
    fn test_record_from_many_threads() {
        let recorder = CallRecorder::named("worker");

        std::thread::scope(|scope| {
            for i in 0..4 {
                let recorder = &recorder;
                scope.spawn(move || {
                    for _ in 0..25 {
                        recorder.record(call!(i), ok());
                    }
                });
            }
        });

        assert_eq!(recorder.call_count(), 100);
        assert_eq!(recorder.calls().len(), 100);
        assert!(recorder.was_called_with(&call!(3)));
    }

    #[test]
    fn test_debug() {
        let recorder = CallRecorder::new();
        recorder.record(call!(42), ok());

        let debug = format!("{recorder:?}");
        assert!(debug.contains("CallRecorder"));
        assert!(debug.contains("call_count"));
    }
}
